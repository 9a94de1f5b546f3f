//! Trade/Fill/Cancel triplet sequencing.
//!
//! Producers report a matched trade as three MBO rows sharing one order
//! id: a Trade and a Fill describing the taker side, then a Cancel
//! removing the resting order on the opposite side. The book must be
//! mutated exactly once per triplet, against the resting side.
//!
//! The [`EventSequencer`] sits between the decoder and the [`Market`] and
//! performs that rewrite. Trade and Fill rows are stashed by order id
//! without touching the book; the matching Cancel converts the stashed
//! event into a single synthetic trade against the opposite side of the
//! reported taker side. Cancels with no stashed match pass through as
//! ordinary book cancels.
//!
//! State machine for an order id:
//!
//! ```text
//! [absent]  --Trade|Fill--> [pending]
//! [pending] --Cancel-->     [absent]    (emits synthetic trade)
//! [pending] --Trade|Fill--> [pending]   (overwrite)
//! [absent]  --Cancel-->     [absent]    (ordinary book cancel)
//! ```

use ahash::AHashMap;

use crate::error::Result;
use crate::market::Market;
use crate::types::{Action, MboEvent, Side};

/// Statistics for sequencer activity.
#[derive(Debug, Clone, Default)]
pub struct SequencerStats {
    /// Events processed
    pub events_sequenced: u64,

    /// Synthetic trades emitted from completed triplets
    pub synthetic_trades: u64,

    /// Trade/Fill events that replaced an already pending event
    pub pending_overwrites: u64,

    /// Trade events with side None (never stashed, never applied)
    pub sideless_trades: u64,

    /// Completed triplets whose pending event carried side None
    pub sideless_pendings: u64,
}

/// Stateful filter rewriting T/F/C triplets into synthetic trades.
#[derive(Debug, Clone, Default)]
pub struct EventSequencer {
    /// Pending Trade/Fill events awaiting their matching Cancel
    pending_tf: AHashMap<u64, MboEvent>,

    /// Statistics
    stats: SequencerStats,
}

impl EventSequencer {
    /// Create a new sequencer with no pending events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event in input order: mutate the market as the event
    /// requires and return the depth value for the output row.
    ///
    /// # Errors
    ///
    /// Propagates fatal book faults from ordinary event application.
    pub fn process(&mut self, market: &mut Market, event: &MboEvent) -> Result<u32> {
        self.stats.events_sequenced += 1;

        let depth = if event.action == Action::Trade && event.side == Side::None {
            // Non-directional trade report: no book effect, no stash.
            self.stats.sideless_trades += 1;
            0
        } else if matches!(event.action, Action::Trade | Action::Fill) {
            if self
                .pending_tf
                .insert(event.order_id, event.clone())
                .is_some()
            {
                self.stats.pending_overwrites += 1;
            }
            0
        } else if event.action == Action::Cancel {
            match self.pending_tf.remove(&event.order_id) {
                Some(prior) => self.complete_triplet(market, event, &prior),
                None => {
                    market.apply(event)?;
                    market.level_depth(
                        event.instrument_id,
                        event.publisher_id,
                        event.price,
                        event.side,
                    )
                }
            }
        } else {
            market.apply(event)?;
            match event.action {
                Action::Add | Action::Modify => market.level_depth(
                    event.instrument_id,
                    event.publisher_id,
                    event.price,
                    event.side,
                ),
                _ => 0,
            }
        };

        Ok(depth)
    }

    /// Apply the synthetic trade for a completed T/F/C triplet.
    ///
    /// The Cancel removes the resting order, so the affected side is the
    /// opposite of the side the Trade/Fill reported.
    fn complete_triplet(&mut self, market: &mut Market, cancel: &MboEvent, prior: &MboEvent) -> u32 {
        let Some(side_affected) = prior.side.opposite() else {
            self.stats.sideless_pendings += 1;
            log::warn!(
                "Pending Trade/Fill for order {} has side {}, skipping synthetic trade",
                cancel.order_id,
                prior.side.as_char()
            );
            return 0;
        };

        market.process_synthetic_trade(
            cancel.instrument_id,
            cancel.publisher_id,
            prior.price,
            prior.size,
            side_affected,
        );
        self.stats.synthetic_trades += 1;

        market.level_depth(
            cancel.instrument_id,
            cancel.publisher_id,
            prior.price,
            side_affected,
        )
    }

    /// Number of order ids with a stashed Trade/Fill.
    pub fn pending_count(&self) -> usize {
        self.pending_tf.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &SequencerStats {
        &self.stats
    }
}
