//! Core data types for MBO events and MBP price levels.
//!
//! These types are designed to be:
//! - Memory efficient (use smallest types possible)
//! - Cache-friendly where it matters (fixed-size fields first)
//! - Compatible with the Databento-style MBO CSV format

use serde::{Deserialize, Serialize};

/// Sentinel for prices that are undefined or not applicable.
///
/// Matches the wire convention of `-(2^63 - 1)`; rendered as an empty
/// field on output.
pub const UNDEFINED_PRICE: i64 = -i64::MAX;

/// Scale factor between nanoscale fixed-point prices and decimal prices.
pub const PRICE_SCALE: f64 = 1e9;

/// Number of price levels carried in the MBP output view.
pub const MBP_DEPTH: usize = 10;

/// Convert a nanoscale fixed-point price to decimal dollars.
///
/// Returns `None` for [`UNDEFINED_PRICE`].
#[inline]
pub fn price_to_f64(price: i64) -> Option<f64> {
    if price == UNDEFINED_PRICE {
        None
    } else {
        Some(price as f64 / PRICE_SCALE)
    }
}

/// Convert a decimal price to its nanoscale fixed-point representation,
/// rounding to the nearest integer (half away from zero).
#[inline]
pub fn price_from_f64(value: f64) -> i64 {
    (value * PRICE_SCALE).round() as i64
}

/// MBO action type (what happened to the order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Add new order to book
    Add,
    /// Cancel or reduce a resting order
    Cancel,
    /// Modify size and/or price of a resting order
    Modify,
    /// Clear the book
    Clear,
    /// Trade report against a resting order
    Trade,
    /// Fill report on a resting order
    Fill,
    /// Non-action sentinel
    None,
    /// Unrecognized action byte, preserved so it can be re-emitted
    Unknown(u8),
}

impl Action {
    /// Parse action from its single-character wire form.
    ///
    /// Unrecognized bytes are kept in [`Action::Unknown`] so the event
    /// can still flow through to output.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'A' => Action::Add,
            b'C' => Action::Cancel,
            b'M' => Action::Modify,
            b'R' => Action::Clear,
            b'T' => Action::Trade,
            b'F' => Action::Fill,
            b'N' => Action::None,
            other => Action::Unknown(other),
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        match self {
            Action::Add => b'A',
            Action::Cancel => b'C',
            Action::Modify => b'M',
            Action::Clear => b'R',
            Action::Trade => b'T',
            Action::Fill => b'F',
            Action::None => b'N',
            Action::Unknown(byte) => byte,
        }
    }

    /// Single-character form used on output.
    #[inline]
    pub fn as_char(self) -> char {
        self.to_byte() as char
    }
}

/// Order side (bid or ask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order (bid)
    Bid,
    /// Sell order (ask)
    Ask,
    /// Non-directional (used for some trade types)
    None,
    /// Unrecognized side byte, preserved so it can be re-emitted
    Unknown(u8),
}

impl Side {
    /// Parse side from its single-character wire form.
    ///
    /// Unrecognized bytes are kept in [`Side::Unknown`] so the event can
    /// still flow through to output.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'B' => Side::Bid,
            b'A' => Side::Ask,
            b'N' => Side::None,
            other => Side::Unknown(other),
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        match self {
            Side::Bid => b'B',
            Side::Ask => b'A',
            Side::None => b'N',
            Side::Unknown(byte) => byte,
        }
    }

    /// Single-character form used on output.
    #[inline]
    pub fn as_char(self) -> char {
        self.to_byte() as char
    }

    /// The side a matched trade rests against, if directional.
    #[inline]
    pub fn opposite(self) -> Option<Side> {
        match self {
            Side::Bid => Some(Side::Ask),
            Side::Ask => Some(Side::Bid),
            Side::None | Side::Unknown(_) => None,
        }
    }

    /// Check if this is a bid.
    #[inline(always)]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }

    /// Check if this is an ask.
    #[inline(always)]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }
}

/// Market By Order (MBO) event.
///
/// One decoded input row. Timestamps and the symbol are carried verbatim
/// as strings so they can be re-emitted byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MboEvent {
    /// Capture-server receive timestamp (verbatim)
    pub ts_recv: String,

    /// Matching-engine event timestamp (verbatim)
    pub ts_event: String,

    /// Record type of the input row
    pub rtype: u8,

    /// Publisher identifier
    pub publisher_id: u16,

    /// Instrument identifier
    pub instrument_id: u32,

    /// Event action
    pub action: Action,

    /// Event side
    pub side: Side,

    /// Price in nanoscale fixed-point format, or [`UNDEFINED_PRICE`]
    pub price: i64,

    /// Order size in shares/contracts
    pub size: u32,

    /// Channel identifier
    pub channel_id: u8,

    /// Unique order identifier
    pub order_id: u64,

    /// Bit field of event flags
    pub flags: u8,

    /// Delta between capture and send time (nanoseconds)
    pub ts_in_delta: i32,

    /// Message sequence number
    pub sequence: u32,

    /// Instrument symbol (verbatim)
    pub symbol: String,
}

impl MboEvent {
    /// Create an event with the book-relevant fields set and neutral
    /// metadata. Primarily a test convenience.
    pub fn new(order_id: u64, action: Action, side: Side, price: i64, size: u32) -> Self {
        Self {
            ts_recv: String::new(),
            ts_event: String::new(),
            rtype: 160,
            publisher_id: 1,
            instrument_id: 1,
            action,
            side,
            price,
            size,
            channel_id: 0,
            order_id,
            flags: 0,
            ts_in_delta: 0,
            sequence: 0,
            symbol: String::new(),
        }
    }

    /// Set the publisher identifier.
    pub fn with_publisher(mut self, publisher_id: u16) -> Self {
        self.publisher_id = publisher_id;
        self
    }

    /// Set the instrument identifier.
    pub fn with_instrument(mut self, instrument_id: u32) -> Self {
        self.instrument_id = instrument_id;
        self
    }

    /// Get price as floating point dollars, if defined.
    #[inline]
    pub fn price_as_f64(&self) -> Option<f64> {
        price_to_f64(self.price)
    }
}

/// Aggregated view of one price level: total resting size and order count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price in nanoscale fixed-point, or [`UNDEFINED_PRICE`]
    pub price: i64,

    /// Total resting size at this price
    pub size: u32,

    /// Number of resting orders at this price
    pub count: u32,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self {
            price: UNDEFINED_PRICE,
            size: 0,
            count: 0,
        }
    }
}

impl PriceLevel {
    /// Create a level view.
    pub fn new(price: i64, size: u32, count: u32) -> Self {
        Self { price, size, count }
    }

    /// A level with an undefined price carries no liquidity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.price == UNDEFINED_PRICE
    }
}
