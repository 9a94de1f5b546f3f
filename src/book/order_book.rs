//! Per-(instrument, publisher) order book.
//!
//! High-performance implementation using:
//! - BTreeMap for sorted price levels
//! - ahash HashMap for fast order-id lookups
//! - FIFO level queues preserving time priority
//! - Minimal allocations on hot path
//!
//! The book distinguishes two failure classes. Faults that indicate an
//! invalid input stream (duplicate Add, Modify changing side) surface as
//! errors. Anomalies the stream can recover from (unknown-id Cancel,
//! oversized partial cancel, synthetic trade at a missing level) are
//! logged, counted in [`BookStats`], and otherwise ignored.

use ahash::AHashMap;
use std::collections::BTreeMap;

use crate::book::level::LevelQueue;
use crate::error::{MbpError, Result};
use crate::types::{Action, MboEvent, PriceLevel, Side, PRICE_SCALE};

type LevelMap = BTreeMap<i64, LevelQueue>;

/// Location of a live order: which side and price level it rests at.
///
/// Pure lookup data; the authoritative entry lives in the level queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLocation {
    pub price: i64,
    pub side: Side,
}

/// Statistics for monitoring book health.
#[derive(Debug, Clone, Default)]
pub struct BookStats {
    /// Total events applied
    pub events_applied: u64,

    /// Synthetic trades processed
    pub synthetic_trades: u64,

    /// Book clears processed
    pub clears: u64,

    /// Cancels for order ids not in the book
    pub unknown_cancels: u64,

    /// Partial cancels whose size exceeded the resting size
    pub oversized_cancels: u64,

    /// Synthetic trades aimed at a price level that does not exist
    pub missing_trade_levels: u64,

    /// Events carrying an unrecognized action byte
    pub unknown_actions: u64,
}

/// Order book for a single (instrument, publisher) pair.
///
/// Maintains two price-sorted sides of FIFO level queues plus an order-id
/// index, and exposes mutations, depth queries, and top-N extraction.
#[derive(Debug, Clone, Default)]
pub struct Book {
    /// Bid levels, keyed by price (best bid = highest key)
    bids: LevelMap,

    /// Ask levels, keyed by price (best ask = lowest key)
    asks: LevelMap,

    /// Order tracking: order_id -> location
    orders: AHashMap<u64, OrderLocation>,

    /// Statistics (for monitoring)
    stats: BookStats,
}

impl Book {
    /// Create a new empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single MBO event to the book.
    ///
    /// Trade, Fill, and None actions do not touch the book; trade
    /// sequencing happens upstream and reaches the book only as
    /// [`Book::process_synthetic_trade`].
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input streams: an Add for an order id
    /// that is already live, or a Modify that reports a different side
    /// than the resting order.
    pub fn apply(&mut self, event: &MboEvent) -> Result<()> {
        match event.action {
            Action::Clear => self.clear(),
            Action::Add => self.add(event)?,
            Action::Cancel => self.cancel(event),
            Action::Modify => self.modify(event)?,
            Action::Trade | Action::Fill | Action::None => {}
            Action::Unknown(byte) => {
                self.stats.unknown_actions += 1;
                log::warn!("Unknown action {:?}, ignoring", byte as char);
            }
        }

        self.stats.events_applied += 1;
        Ok(())
    }

    /// Remove all orders and levels from both sides.
    fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.stats.clears += 1;
    }

    /// Add a new order at the tail of its price level.
    fn add(&mut self, event: &MboEvent) -> Result<()> {
        if self.orders.contains_key(&event.order_id) {
            return Err(MbpError::DuplicateOrderId(event.order_id));
        }

        let levels = match event.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None | Side::Unknown(_) => {
                log::warn!(
                    "Add for order {} with side {}, ignoring",
                    event.order_id,
                    event.side.as_char()
                );
                return Ok(());
            }
        };

        levels
            .entry(event.price)
            .or_default()
            .push_back(event.order_id, event.size);

        self.orders.insert(
            event.order_id,
            OrderLocation {
                price: event.price,
                side: event.side,
            },
        );

        Ok(())
    }

    /// Cancel (reduce or remove) a resting order.
    fn cancel(&mut self, event: &MboEvent) {
        let Some(loc) = self.orders.get(&event.order_id).copied() else {
            self.stats.unknown_cancels += 1;
            log::warn!("Cancel for unknown order id {}, ignoring", event.order_id);
            return;
        };

        let levels = match loc.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None | Side::Unknown(_) => return,
        };

        let Some(queue) = levels.get_mut(&loc.price) else {
            log::error!(
                "order {} indexed at missing level {:.9}",
                event.order_id,
                loc.price as f64 / PRICE_SCALE
            );
            return;
        };

        let Some(remaining) = queue.size_of(event.order_id) else {
            log::error!("order {} in index but not at its level", event.order_id);
            return;
        };

        let new_size = if event.size > remaining {
            self.stats.oversized_cancels += 1;
            log::warn!(
                "Partial cancel of {} exceeds remaining {} for order {}, capping at 0",
                event.size,
                remaining,
                event.order_id
            );
            0
        } else {
            remaining - event.size
        };

        if new_size == 0 {
            queue.remove(event.order_id);
            let now_empty = queue.is_empty();
            self.orders.remove(&event.order_id);
            if now_empty {
                levels.remove(&loc.price);
            }
        } else {
            queue.set_size(event.order_id, new_size);
        }
    }

    /// Modify a resting order's size and/or price.
    ///
    /// Unknown order ids behave as Add. A price change moves the order to
    /// the tail of the new level. At the same price, a size increase
    /// re-queues the order to the tail while a decrease keeps its place.
    fn modify(&mut self, event: &MboEvent) -> Result<()> {
        let Some(loc) = self.orders.get(&event.order_id).copied() else {
            return self.add(event);
        };

        if loc.side != event.side {
            return Err(MbpError::OrderSideChanged(event.order_id));
        }

        let levels = match loc.side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None | Side::Unknown(_) => return Ok(()),
        };

        if loc.price != event.price {
            let now_empty = match levels.get_mut(&loc.price) {
                Some(queue) => {
                    if queue.remove(event.order_id).is_none() {
                        log::error!("order {} in index but not at its level", event.order_id);
                        return Ok(());
                    }
                    queue.is_empty()
                }
                None => {
                    log::error!(
                        "order {} indexed at missing level {:.9}",
                        event.order_id,
                        loc.price as f64 / PRICE_SCALE
                    );
                    return Ok(());
                }
            };
            if now_empty {
                levels.remove(&loc.price);
            }

            levels
                .entry(event.price)
                .or_default()
                .push_back(event.order_id, event.size);

            self.orders.insert(
                event.order_id,
                OrderLocation {
                    price: event.price,
                    side: loc.side,
                },
            );
        } else {
            let Some(queue) = levels.get_mut(&loc.price) else {
                log::error!(
                    "order {} indexed at missing level {:.9}",
                    event.order_id,
                    loc.price as f64 / PRICE_SCALE
                );
                return Ok(());
            };
            let Some(current) = queue.size_of(event.order_id) else {
                log::error!("order {} in index but not at its level", event.order_id);
                return Ok(());
            };

            if event.size > current {
                // Size increase loses time priority.
                queue.move_to_tail(event.order_id, event.size);
            } else {
                queue.set_size(event.order_id, event.size);
            }
        }

        Ok(())
    }

    /// Apply a synthetic trade: consume `size` units from the FIFO head of
    /// the level at `price` on `side`.
    ///
    /// Fully consumed orders leave the book; a missing level is a
    /// recoverable anomaly (warned and ignored).
    pub fn process_synthetic_trade(&mut self, price: i64, size: u32, side: Side) {
        let levels = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
            Side::None | Side::Unknown(_) => {
                log::warn!("Synthetic trade with side {}, ignoring", side.as_char());
                return;
            }
        };

        let Some(queue) = levels.get_mut(&price) else {
            self.stats.missing_trade_levels += 1;
            log::warn!(
                "Synthetic trade at non-existent {:?} level {:.9}, size {}, ignoring",
                side,
                price as f64 / PRICE_SCALE,
                size
            );
            return;
        };

        let removed = queue.consume(size);
        let now_empty = queue.is_empty();
        for order_id in removed {
            self.orders.remove(&order_id);
        }
        if now_empty {
            levels.remove(&price);
        }

        self.stats.synthetic_trades += 1;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Best bid and ask level views.
    pub fn best_bid_ask(&self) -> (Option<PriceLevel>, Option<PriceLevel>) {
        (self.bid_level(0), self.ask_level(0))
    }

    /// The idx-th best bid level (0 = highest price).
    pub fn bid_level(&self, idx: usize) -> Option<PriceLevel> {
        self.bids
            .iter()
            .rev()
            .nth(idx)
            .map(|(&price, queue)| queue.as_price_level(price))
    }

    /// The idx-th best ask level (0 = lowest price).
    pub fn ask_level(&self, idx: usize) -> Option<PriceLevel> {
        self.asks
            .iter()
            .nth(idx)
            .map(|(&price, queue)| queue.as_price_level(price))
    }

    /// Up to `n` best bid levels, best first.
    pub fn bid_levels(&self, n: usize) -> Vec<PriceLevel> {
        self.bids
            .iter()
            .rev()
            .take(n)
            .map(|(&price, queue)| queue.as_price_level(price))
            .collect()
    }

    /// Up to `n` best ask levels, best first.
    pub fn ask_levels(&self, n: usize) -> Vec<PriceLevel> {
        self.asks
            .iter()
            .take(n)
            .map(|(&price, queue)| queue.as_price_level(price))
            .collect()
    }

    /// Zero-based index of the bid level at exactly `price`, best first.
    ///
    /// Returns 0 when no such level exists; callers that need to
    /// distinguish "best level" from "absent" must check presence
    /// themselves.
    pub fn bid_depth(&self, price: i64) -> u32 {
        let mut depth = 0u32;
        for &level_price in self.bids.keys().rev() {
            if level_price == price {
                return depth;
            }
            if level_price < price {
                return 0;
            }
            depth += 1;
        }
        0
    }

    /// Zero-based index of the ask level at exactly `price`, best first.
    ///
    /// Returns 0 when no such level exists.
    pub fn ask_depth(&self, price: i64) -> u32 {
        if !self.asks.contains_key(&price) {
            return 0;
        }
        self.asks.range(..price).count() as u32
    }

    /// Number of live orders.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of price levels on the bid side.
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of price levels on the ask side.
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Check if both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty() && self.orders.is_empty()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Verify the book invariants hold. Test support.
    #[cfg(test)]
    fn assert_consistent(&self) {
        use std::collections::HashSet;

        let mut queued: HashSet<u64> = HashSet::new();
        for (side, levels) in [(Side::Bid, &self.bids), (Side::Ask, &self.asks)] {
            for (&price, queue) in levels {
                assert!(!queue.is_empty(), "empty level present at {price}");
                for entry in queue.iter() {
                    assert!(entry.size > 0, "zero-size entry at rest");
                    assert!(queued.insert(entry.order_id), "order queued twice");
                    let loc = self.orders.get(&entry.order_id).expect("order not indexed");
                    assert_eq!(loc.price, price);
                    assert_eq!(loc.side, side);
                }
            }
        }
        assert_eq!(queued.len(), self.orders.len(), "index/queue count mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price_from_f64;

    fn create_test_event(
        order_id: u64,
        action: Action,
        side: Side,
        price_dollars: f64,
        size: u32,
    ) -> MboEvent {
        MboEvent::new(order_id, action, side, price_from_f64(price_dollars), size)
    }

    #[test]
    fn test_new_book_is_empty() {
        let book = Book::new();
        assert!(book.is_empty());
        assert_eq!(book.order_count(), 0);
        assert_eq!(book.best_bid_ask(), (None, None));
    }

    #[test]
    fn test_add_bid_order() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();

        let (bid, ask) = book.best_bid_ask();
        let bid = bid.unwrap();
        assert_eq!(bid.price, 100_000_000_000);
        assert_eq!(bid.size, 5);
        assert_eq!(bid.count, 1);
        assert!(ask.is_none());
        book.assert_consistent();
    }

    #[test]
    fn test_duplicate_add_is_fatal() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();

        let err = book
            .apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap_err();
        assert!(matches!(err, MbpError::DuplicateOrderId(1)));
    }

    #[test]
    fn test_add_cancel_roundtrip_is_noop() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(1, Action::Cancel, Side::Bid, 100.0, 5))
            .unwrap();

        assert!(book.is_empty());
        assert_eq!(book.bid_level_count(), 0);
        book.assert_consistent();
    }

    #[test]
    fn test_partial_cancel_keeps_position() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Ask, 101.0, 10))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Ask, 101.0, 20))
            .unwrap();
        book.apply(&create_test_event(1, Action::Cancel, Side::Ask, 101.0, 4))
            .unwrap();

        let level = book.ask_level(0).unwrap();
        assert_eq!(level.size, 26);
        assert_eq!(level.count, 2);
        book.assert_consistent();
    }

    #[test]
    fn test_oversized_cancel_caps_to_zero() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(1, Action::Cancel, Side::Bid, 100.0, 99))
            .unwrap();

        assert!(book.is_empty());
        assert_eq!(book.stats().oversized_cancels, 1);
        book.assert_consistent();
    }

    #[test]
    fn test_unknown_cancel_is_recoverable() {
        let mut book = Book::new();
        book.apply(&create_test_event(999, Action::Cancel, Side::Bid, 100.0, 1))
            .unwrap();

        assert!(book.is_empty());
        assert_eq!(book.stats().unknown_cancels, 1);
    }

    #[test]
    fn test_modify_unknown_id_behaves_as_add() {
        let mut add_book = Book::new();
        add_book
            .apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();

        let mut modify_book = Book::new();
        modify_book
            .apply(&create_test_event(1, Action::Modify, Side::Bid, 100.0, 5))
            .unwrap();

        assert_eq!(add_book.best_bid_ask(), modify_book.best_bid_ask());
        assert_eq!(add_book.order_count(), modify_book.order_count());
        modify_book.assert_consistent();
    }

    #[test]
    fn test_modify_changing_side_is_fatal() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();

        let err = book
            .apply(&create_test_event(1, Action::Modify, Side::Ask, 100.0, 5))
            .unwrap_err();
        assert!(matches!(err, MbpError::OrderSideChanged(1)));
    }

    #[test]
    fn test_modify_price_move_appends_at_tail() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Ask, 101.0, 2))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Ask, 102.0, 3))
            .unwrap();
        book.apply(&create_test_event(1, Action::Modify, Side::Ask, 102.0, 2))
            .unwrap();

        assert_eq!(book.ask_level_count(), 1);
        let level = book.ask_level(0).unwrap();
        assert_eq!(level.price, 102_000_000_000);
        assert_eq!(level.size, 5);
        assert_eq!(level.count, 2);

        // Order 2 arrived at 102.0 first and keeps time priority.
        book.process_synthetic_trade(price_from_f64(102.0), 3, Side::Ask);
        assert_eq!(book.order_count(), 1);
        let level = book.ask_level(0).unwrap();
        assert_eq!(level.size, 2);
        assert_eq!(level.count, 1);
        book.assert_consistent();
    }

    #[test]
    fn test_modify_move_preserves_total() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 99.0, 4))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Bid, 99.0, 6))
            .unwrap();
        book.apply(&create_test_event(1, Action::Modify, Side::Bid, 98.0, 4))
            .unwrap();

        let best = book.bid_level(0).unwrap();
        assert_eq!(best.price, 99_000_000_000);
        assert_eq!(best.size, 6);
        assert_eq!(best.count, 1);

        let second = book.bid_level(1).unwrap();
        assert_eq!(second.price, 98_000_000_000);
        assert_eq!(second.size, 4);
        assert_eq!(second.count, 1);
        book.assert_consistent();
    }

    #[test]
    fn test_modify_size_up_requeues_to_tail() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Bid, 100.0, 7))
            .unwrap();
        book.apply(&create_test_event(1, Action::Modify, Side::Bid, 100.0, 8))
            .unwrap();

        // Order 1 lost priority; a trade for 7 consumes order 2 entirely.
        book.process_synthetic_trade(price_from_f64(100.0), 7, Side::Bid);
        assert_eq!(book.order_count(), 1);
        let level = book.bid_level(0).unwrap();
        assert_eq!(level.size, 8);
        book.assert_consistent();
    }

    #[test]
    fn test_modify_size_down_keeps_priority() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Bid, 100.0, 7))
            .unwrap();
        book.apply(&create_test_event(1, Action::Modify, Side::Bid, 100.0, 3))
            .unwrap();

        // Order 1 keeps the front of the queue; a trade for 3 removes it.
        book.process_synthetic_trade(price_from_f64(100.0), 3, Side::Bid);
        assert_eq!(book.order_count(), 1);
        let level = book.bid_level(0).unwrap();
        assert_eq!(level.size, 7);
        book.assert_consistent();
    }

    #[test]
    fn test_clear_empties_book_and_is_idempotent() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Ask, 101.0, 3))
            .unwrap();

        book.apply(&create_test_event(0, Action::Clear, Side::None, 0.0, 0))
            .unwrap();
        assert!(book.is_empty());

        book.apply(&create_test_event(0, Action::Clear, Side::None, 0.0, 0))
            .unwrap();
        assert!(book.is_empty());
        assert_eq!(book.stats().clears, 2);
    }

    #[test]
    fn test_trade_fill_none_do_not_mutate() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        let before = book.best_bid_ask();

        book.apply(&create_test_event(1, Action::Trade, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(1, Action::Fill, Side::Bid, 100.0, 5))
            .unwrap();
        book.apply(&create_test_event(1, Action::None, Side::None, 0.0, 0))
            .unwrap();

        assert_eq!(book.best_bid_ask(), before);
        assert_eq!(book.order_count(), 1);
    }

    #[test]
    fn test_add_with_side_none_is_ignored() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::None, 100.0, 5))
            .unwrap();

        assert!(book.is_empty());
        assert_eq!(book.order_count(), 0);
        assert_eq!(book.bid_level_count(), 0);
        assert_eq!(book.ask_level_count(), 0);

        // The id was never indexed, so a later Add may reuse it.
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        assert_eq!(book.order_count(), 1);
        book.assert_consistent();
    }

    #[test]
    fn test_unknown_action_is_ignored_with_warning() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 5))
            .unwrap();
        let before = book.best_bid_ask();

        book.apply(&create_test_event(2, Action::Unknown(b'X'), Side::Bid, 100.0, 5))
            .unwrap();

        assert_eq!(book.best_bid_ask(), before);
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.stats().unknown_actions, 1);
        book.assert_consistent();
    }

    #[test]
    fn test_synthetic_trade_consumes_fifo() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 99.5, 4))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Bid, 99.5, 6))
            .unwrap();

        book.process_synthetic_trade(price_from_f64(99.5), 7, Side::Bid);
        assert_eq!(book.order_count(), 1);
        let level = book.bid_level(0).unwrap();
        assert_eq!(level.size, 3);
        assert_eq!(level.count, 1);
        book.assert_consistent();
    }

    #[test]
    fn test_synthetic_trade_empties_level() {
        let mut book = Book::new();
        book.apply(&create_test_event(10, Action::Add, Side::Bid, 99.5, 4))
            .unwrap();

        book.process_synthetic_trade(price_from_f64(99.5), 4, Side::Bid);
        assert!(book.is_empty());
        assert_eq!(book.bid_depth(price_from_f64(99.5)), 0);
    }

    #[test]
    fn test_synthetic_trade_missing_level_is_recoverable() {
        let mut book = Book::new();
        book.process_synthetic_trade(price_from_f64(99.5), 4, Side::Bid);

        assert!(book.is_empty());
        assert_eq!(book.stats().missing_trade_levels, 1);
        assert_eq!(book.stats().synthetic_trades, 0);
    }

    #[test]
    fn test_bid_depth() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Bid, 100.0, 1))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Bid, 99.0, 1))
            .unwrap();
        book.apply(&create_test_event(3, Action::Add, Side::Bid, 98.0, 1))
            .unwrap();

        assert_eq!(book.bid_depth(price_from_f64(100.0)), 0);
        assert_eq!(book.bid_depth(price_from_f64(99.0)), 1);
        assert_eq!(book.bid_depth(price_from_f64(98.0)), 2);
        // Absent level reports 0.
        assert_eq!(book.bid_depth(price_from_f64(99.5)), 0);
        assert_eq!(book.bid_depth(price_from_f64(97.0)), 0);
    }

    #[test]
    fn test_ask_depth() {
        let mut book = Book::new();
        book.apply(&create_test_event(1, Action::Add, Side::Ask, 101.0, 1))
            .unwrap();
        book.apply(&create_test_event(2, Action::Add, Side::Ask, 102.0, 1))
            .unwrap();
        book.apply(&create_test_event(3, Action::Add, Side::Ask, 103.0, 1))
            .unwrap();

        assert_eq!(book.ask_depth(price_from_f64(101.0)), 0);
        assert_eq!(book.ask_depth(price_from_f64(102.0)), 1);
        assert_eq!(book.ask_depth(price_from_f64(103.0)), 2);
        assert_eq!(book.ask_depth(price_from_f64(101.5)), 0);
        assert_eq!(book.ask_depth(price_from_f64(104.0)), 0);
    }

    #[test]
    fn test_top_n_extraction() {
        let mut book = Book::new();
        for (id, px) in [(1u64, 100.0), (2, 99.0), (3, 98.0)] {
            book.apply(&create_test_event(id, Action::Add, Side::Bid, px, 10))
                .unwrap();
        }

        let levels = book.bid_levels(2);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].price, 100_000_000_000);
        assert_eq!(levels[1].price, 99_000_000_000);

        let levels = book.bid_levels(10);
        assert_eq!(levels.len(), 3);
        assert!(book.bid_level(3).is_none());
    }
}
