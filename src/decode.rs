//! MBO CSV decoding.
//!
//! Streams `MboEvent`s from comma-separated input. The expected field
//! order is:
//!
//! ```text
//! ts_recv, ts_event, rtype, publisher_id, instrument_id, action, side,
//! price, size, channel_id, order_id, flags, ts_in_delta, sequence, symbol
//! ```
//!
//! The first line is a header and is discarded. Timestamps and the symbol
//! are kept verbatim; the price is a decimal number converted to
//! nanoscale fixed-point (an empty field means undefined). Unrecognized
//! action and side bytes are preserved (`Action::Unknown`/`Side::Unknown`)
//! rather than rejected, so every input row still produces an event.
//! Records with malformed fields are yielded as errors; the caller
//! decides whether to skip or abort.

use std::io::Read;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{MbpError, Result};
use crate::types::{price_from_f64, Action, MboEvent, Side, UNDEFINED_PRICE};

/// Number of fields in one MBO input record.
pub const MBO_FIELD_COUNT: usize = 15;

/// Streaming MBO event reader over any `io::Read`.
pub struct MboReader<R: Read> {
    reader: csv::Reader<R>,

    /// Reused record buffer (avoids per-row allocations in the CSV layer)
    record: StringRecord,

    /// One-based number of the current data record (header excluded)
    records_read: u64,
}

impl<R: Read> MboReader<R> {
    /// Create a reader over raw CSV input.
    pub fn new(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        Self {
            reader,
            record: StringRecord::new(),
            records_read: 0,
        }
    }

    /// Number of data records pulled from the input so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl<R: Read> Iterator for MboReader<R> {
    type Item = Result<MboEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.records_read += 1;
                Some(parse_record(&self.record, self.records_read))
            }
            Ok(false) => None,
            Err(e) => {
                self.records_read += 1;
                Some(Err(e.into()))
            }
        }
    }
}

/// Parse one CSV record into an `MboEvent`.
pub fn parse_record(record: &StringRecord, number: u64) -> Result<MboEvent> {
    if record.len() != MBO_FIELD_COUNT {
        return Err(MbpError::MalformedRecord {
            record: number,
            expected: MBO_FIELD_COUNT,
            actual: record.len(),
        });
    }

    Ok(MboEvent {
        ts_recv: field(record, 0).to_string(),
        ts_event: field(record, 1).to_string(),
        rtype: parse_num(record, 2, "rtype", number)?,
        publisher_id: parse_num(record, 3, "publisher_id", number)?,
        instrument_id: parse_num(record, 4, "instrument_id", number)?,
        action: parse_action(record, 5, number)?,
        side: parse_side(record, 6, number)?,
        price: parse_price(record, 7, number)?,
        size: parse_num(record, 8, "size", number)?,
        channel_id: parse_num(record, 9, "channel_id", number)?,
        order_id: parse_num(record, 10, "order_id", number)?,
        flags: parse_num(record, 11, "flags", number)?,
        ts_in_delta: parse_num(record, 12, "ts_in_delta", number)?,
        sequence: parse_num(record, 13, "sequence", number)?,
        symbol: field(record, 14).to_string(),
    })
}

#[inline]
fn field<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("")
}

fn parse_num<T: FromStr>(
    record: &StringRecord,
    idx: usize,
    name: &'static str,
    number: u64,
) -> Result<T> {
    let raw = field(record, idx);
    raw.parse().map_err(|_| MbpError::InvalidField {
        name,
        value: raw.to_string(),
        record: number,
    })
}

fn parse_action(record: &StringRecord, idx: usize, number: u64) -> Result<Action> {
    let raw = field(record, idx);
    let byte = single_char(raw, "action", number)?;
    Ok(Action::from_byte(byte))
}

fn parse_side(record: &StringRecord, idx: usize, number: u64) -> Result<Side> {
    let raw = field(record, idx);
    let byte = single_char(raw, "side", number)?;
    Ok(Side::from_byte(byte))
}

fn single_char(raw: &str, name: &'static str, number: u64) -> Result<u8> {
    let mut bytes = raw.bytes();
    match (bytes.next(), bytes.next()) {
        (Some(byte), None) => Ok(byte),
        _ => Err(MbpError::InvalidField {
            name,
            value: raw.to_string(),
            record: number,
        }),
    }
}

/// Parse the price field: empty means undefined, otherwise a decimal
/// number scaled to nanoscale fixed-point.
fn parse_price(record: &StringRecord, idx: usize, number: u64) -> Result<i64> {
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(UNDEFINED_PRICE);
    }
    let value: f64 = raw.parse().map_err(|_| MbpError::InvalidField {
        name: "price",
        value: raw.to_string(),
        record: number,
    })?;
    Ok(price_from_f64(value))
}
