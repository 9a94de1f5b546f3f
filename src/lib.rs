//! # MBP-Reconstructor
//!
//! MBO → MBP-10 order book reconstruction for market data processing.
//!
//! This library replays a Market-By-Order (MBO) event stream and rebuilds
//! the aggregated Market-By-Price (MBP) view: the ten best bid and ask
//! price levels per instrument, summed across all publishers. Every input
//! event yields exactly one output row with the event's identity, the
//! depth of the affected price level, and the top-10 snapshot.
//!
//! ## Features
//!
//! - **MBO → MBP-10 reconstruction**: order-level events to aggregated price levels
//! - **Per-publisher books**: one book per (instrument, publisher) pair
//! - **Cross-publisher aggregation**: per-price size and order-count sums
//! - **T/F/C sequencing**: Trade/Fill/Cancel triplets applied as one synthetic trade
//! - **Time priority**: FIFO level queues with the standard re-queue-on-size-up rule
//! - **Streaming CSV I/O**: constant-memory decode and encode
//!
//! ## Quick Start
//!
//! ```rust
//! use mbp_reconstructor::{Action, EventSequencer, Market, MboEvent, Side};
//!
//! let mut market = Market::new();
//! let mut sequencer = EventSequencer::new();
//!
//! // Process an MBO event ($100.00 in fixed-point, size 100).
//! let event = MboEvent::new(1001, Action::Add, Side::Bid, 100_000_000_000, 100);
//! let depth = sequencer.process(&mut market, &event).unwrap();
//! assert_eq!(depth, 0);
//!
//! // Read the aggregated top-of-book.
//! let bids = market.aggregated_bid_levels(event.instrument_id, 10);
//! assert_eq!(bids[0].price, 100_000_000_000);
//! assert_eq!(bids[0].size, 100);
//! assert_eq!(bids[0].count, 1);
//! ```
//!
//! ## End-to-end runs
//!
//! ```rust
//! use mbp_reconstructor::pipeline;
//!
//! let input = "\
//! ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol
//! t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,1,SYM
//! ";
//!
//! let mut output = Vec::new();
//! let stats = pipeline::run(input.as_bytes(), &mut output).unwrap();
//! assert_eq!(stats.rows_written, 1);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: `MboEvent`, `PriceLevel`, `Action`, `Side` |
//! | [`book`] | Per-publisher order book: `Book`, `LevelQueue` |
//! | [`market`] | Book routing and cross-publisher aggregation: `Market` |
//! | [`sequencer`] | T/F/C triplet rewrite: `EventSequencer` |
//! | [`decode`] | MBO CSV input: `MboReader` |
//! | [`encode`] | MBP-10 CSV output: `MbpWriter` |
//! | [`pipeline`] | End-to-end driver: `run` |

pub mod book;
pub mod decode;
pub mod encode;
pub mod error;
pub mod market;
pub mod pipeline;
pub mod sequencer;
pub mod types;

// Re-exports - Core types
pub use error::{MbpError, Result};
pub use types::{
    price_from_f64, price_to_f64, Action, MboEvent, PriceLevel, Side, MBP_DEPTH, UNDEFINED_PRICE,
};

// Re-exports - Reconstruction engine
pub use book::{Book, BookStats};
pub use market::{Market, MarketStats};
pub use sequencer::{EventSequencer, SequencerStats};

// Re-exports - I/O
pub use decode::MboReader;
pub use encode::MbpWriter;
pub use pipeline::PipelineStats;
