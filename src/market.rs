//! Market-wide book container and cross-publisher aggregation.
//!
//! The [`Market`] owns one [`Book`] per (instrument, publisher) pair,
//! created lazily on first use, and combines each instrument's books into
//! the aggregated MBP view.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::book::Book;
use crate::error::Result;
use crate::types::{MboEvent, PriceLevel, Side};

/// Statistics for market-level routing.
#[derive(Debug, Clone, Default)]
pub struct MarketStats {
    /// Events routed to a book
    pub events_routed: u64,

    /// Synthetic trades aimed at an instrument or publisher with no book
    pub missing_book_trades: u64,
}

/// Container indexing books by instrument and publisher.
#[derive(Debug, Clone, Default)]
pub struct Market {
    /// instrument_id -> publisher_id -> Book
    books: AHashMap<u32, AHashMap<u16, Book>>,

    /// Statistics
    stats: MarketStats,
}

impl Market {
    /// Create a new empty market.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event to its book, creating the book if needed.
    ///
    /// # Errors
    ///
    /// Propagates fatal book faults (duplicate Add, side change).
    pub fn apply(&mut self, event: &MboEvent) -> Result<()> {
        self.books
            .entry(event.instrument_id)
            .or_default()
            .entry(event.publisher_id)
            .or_default()
            .apply(event)?;

        self.stats.events_routed += 1;
        Ok(())
    }

    /// Apply a synthetic trade to the matching book.
    ///
    /// An absent instrument or publisher book is a recoverable anomaly.
    pub fn process_synthetic_trade(
        &mut self,
        instrument_id: u32,
        publisher_id: u16,
        price: i64,
        size: u32,
        side: Side,
    ) {
        let Some(publishers) = self.books.get_mut(&instrument_id) else {
            self.stats.missing_book_trades += 1;
            log::warn!("Synthetic trade for unknown instrument {instrument_id}, ignoring");
            return;
        };
        let Some(book) = publishers.get_mut(&publisher_id) else {
            self.stats.missing_book_trades += 1;
            log::warn!(
                "Synthetic trade for unknown book (instrument {instrument_id}, publisher {publisher_id}), ignoring"
            );
            return;
        };

        book.process_synthetic_trade(price, size, side);
    }

    /// Depth of the level at `price` on `side` in one publisher's book.
    ///
    /// Returns 0 when the book is absent or the side is non-directional.
    pub fn level_depth(
        &self,
        instrument_id: u32,
        publisher_id: u16,
        price: i64,
        side: Side,
    ) -> u32 {
        let Some(book) = self.book(instrument_id, publisher_id) else {
            return 0;
        };
        match side {
            Side::Bid => book.bid_depth(price),
            Side::Ask => book.ask_depth(price),
            Side::None | Side::Unknown(_) => 0,
        }
    }

    /// Aggregated best-first bid levels for an instrument across all of
    /// its publishers.
    ///
    /// Each publisher contributes its local top `n`; sizes and order
    /// counts are summed per price, and the best `n` aggregate prices are
    /// returned. A price outside every publisher's local top `n` is not
    /// surfaced.
    pub fn aggregated_bid_levels(&self, instrument_id: u32, n: usize) -> Vec<PriceLevel> {
        let agg = self.aggregate(instrument_id, n, Side::Bid);
        agg.into_values().rev().take(n).collect()
    }

    /// Aggregated best-first ask levels for an instrument across all of
    /// its publishers.
    pub fn aggregated_ask_levels(&self, instrument_id: u32, n: usize) -> Vec<PriceLevel> {
        let agg = self.aggregate(instrument_id, n, Side::Ask);
        agg.into_values().take(n).collect()
    }

    fn aggregate(&self, instrument_id: u32, n: usize, side: Side) -> BTreeMap<i64, PriceLevel> {
        let mut agg: BTreeMap<i64, PriceLevel> = BTreeMap::new();

        if let Some(publishers) = self.books.get(&instrument_id) {
            for book in publishers.values() {
                let levels = match side {
                    Side::Bid => book.bid_levels(n),
                    Side::Ask => book.ask_levels(n),
                    Side::None | Side::Unknown(_) => Vec::new(),
                };
                for level in levels {
                    let entry = agg
                        .entry(level.price)
                        .or_insert_with(|| PriceLevel::new(level.price, 0, 0));
                    entry.size += level.size;
                    entry.count += level.count;
                }
            }
        }

        agg
    }

    /// Look up one publisher's book.
    pub fn book(&self, instrument_id: u32, publisher_id: u16) -> Option<&Book> {
        self.books.get(&instrument_id)?.get(&publisher_id)
    }

    /// Number of instruments with at least one book.
    pub fn instrument_count(&self) -> usize {
        self.books.len()
    }

    /// Total number of (instrument, publisher) books.
    pub fn book_count(&self) -> usize {
        self.books.values().map(|p| p.len()).sum()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &MarketStats {
        &self.stats
    }
}
