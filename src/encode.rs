//! MBP-10 CSV encoding.
//!
//! Emits the output contract exactly: a header row, then one row per
//! event carrying a running row index, the event metadata, the computed
//! depth, and ten interleaved bid/ask level quadruples. Prices render
//! with fixed precision 9; the undefined-price sentinel and absent book
//! levels render as empty price fields.

use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::types::{MboEvent, PriceLevel, MBP_DEPTH, PRICE_SCALE, UNDEFINED_PRICE};

/// Record type stamped on every output row, independent of input rtype.
pub const OUTPUT_RTYPE: u8 = 10;

/// Buffered MBP-10 row writer over any `io::Write`.
pub struct MbpWriter<W: Write> {
    writer: BufWriter<W>,

    /// Rows written so far; doubles as the next row index
    rows_written: u64,
}

impl<W: Write> MbpWriter<W> {
    /// Create a writer over raw output.
    pub fn new(output: W) -> Self {
        Self {
            writer: BufWriter::new(output),
            rows_written: 0,
        }
    }

    /// Write the MBP-10 header row.
    pub fn write_header(&mut self) -> Result<()> {
        write!(
            self.writer,
            ",ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,depth,price,size,flags,ts_in_delta,sequence,"
        )?;
        for i in 0..MBP_DEPTH {
            write!(
                self.writer,
                "bid_px_{i:02},bid_sz_{i:02},bid_ct_{i:02},ask_px_{i:02},ask_sz_{i:02},ask_ct_{i:02}"
            )?;
            if i < MBP_DEPTH - 1 {
                write!(self.writer, ",")?;
            }
        }
        writeln!(self.writer, ",symbol,order_id")?;
        Ok(())
    }

    /// Write one output row for `event` with its depth and the aggregated
    /// top-10 views current after the event was applied.
    pub fn write_row(
        &mut self,
        event: &MboEvent,
        depth: u32,
        bids: &[PriceLevel],
        asks: &[PriceLevel],
    ) -> Result<()> {
        write!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},",
            self.rows_written,
            event.ts_recv,
            event.ts_event,
            OUTPUT_RTYPE,
            event.publisher_id,
            event.instrument_id,
            event.action.as_char(),
            event.side.as_char(),
            depth
        )?;

        self.write_price(event.price)?;
        write!(
            self.writer,
            ",{},{},{},{},",
            event.size, event.flags, event.ts_in_delta, event.sequence
        )?;

        for i in 0..MBP_DEPTH {
            match bids.get(i).filter(|level| !level.is_empty()) {
                Some(level) => {
                    self.write_price(level.price)?;
                    write!(self.writer, ",{},{},", level.size, level.count)?;
                }
                None => write!(self.writer, ",0,0,")?,
            }
            match asks.get(i).filter(|level| !level.is_empty()) {
                Some(level) => {
                    self.write_price(level.price)?;
                    write!(self.writer, ",{},{}", level.size, level.count)?;
                }
                None => write!(self.writer, ",0,0")?,
            }
            if i < MBP_DEPTH - 1 {
                write!(self.writer, ",")?;
            }
        }

        writeln!(self.writer, ",{},{}", event.symbol, event.order_id)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write a price with fixed precision 9, or nothing when undefined.
    fn write_price(&mut self, price: i64) -> Result<()> {
        if price != UNDEFINED_PRICE {
            write!(self.writer, "{:.9}", price as f64 / PRICE_SCALE)?;
        }
        Ok(())
    }

    /// Flush buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of data rows written (header excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and recover the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::MbpError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Side};

    /// Total columns per row: index + 13 metadata + 10 level quadruples
    /// of 6 + symbol + order_id.
    const COLUMN_COUNT: usize = 1 + 13 + MBP_DEPTH * 6 + 2;

    fn render<F: FnOnce(&mut MbpWriter<Vec<u8>>)>(build: F) -> String {
        let mut writer = MbpWriter::new(Vec::new());
        build(&mut writer);
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    fn test_event() -> MboEvent {
        let mut event = MboEvent::new(817593, Action::Add, Side::Bid, 5_510_000_000, 100);
        event.ts_recv = "t_recv".to_string();
        event.ts_event = "t_event".to_string();
        event.publisher_id = 2;
        event.instrument_id = 1108;
        event.flags = 130;
        event.ts_in_delta = 165200;
        event.sequence = 851012;
        event.symbol = "ARL".to_string();
        event
    }

    #[test]
    fn test_header_shape() {
        let text = render(|w| w.write_header().unwrap());
        let header = text.strip_suffix('\n').unwrap();

        assert!(header.starts_with(
            ",ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,depth,price,size,flags,ts_in_delta,sequence,bid_px_00,bid_sz_00,bid_ct_00,ask_px_00,ask_sz_00,ask_ct_00,bid_px_01"
        ));
        assert!(header.ends_with("bid_px_09,bid_sz_09,bid_ct_09,ask_px_09,ask_sz_09,ask_ct_09,symbol,order_id"));
        assert_eq!(header.split(',').count(), COLUMN_COUNT);
    }

    #[test]
    fn test_row_with_one_bid_level() {
        let bids = [PriceLevel::new(5_510_000_000, 100, 1)];
        let text = render(|w| w.write_row(&test_event(), 0, &bids, &[]).unwrap());
        let row = text.strip_suffix('\n').unwrap();

        assert!(row.starts_with(
            "0,t_recv,t_event,10,2,1108,A,B,0,5.510000000,100,130,165200,851012,5.510000000,100,1,,0,0,"
        ));
        assert!(row.ends_with(",0,0,,0,0,ARL,817593"));
        assert_eq!(row.split(',').count(), COLUMN_COUNT);
    }

    #[test]
    fn test_row_index_increments() {
        let text = render(|w| {
            w.write_row(&test_event(), 0, &[], &[]).unwrap();
            w.write_row(&test_event(), 0, &[], &[]).unwrap();
        });

        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("0,"));
        assert!(rows[1].starts_with("1,"));
    }

    #[test]
    fn test_undefined_price_renders_empty() {
        let mut event = test_event();
        event.price = UNDEFINED_PRICE;
        event.action = Action::Clear;
        event.side = Side::None;

        let text = render(|w| w.write_row(&event, 0, &[], &[]).unwrap());
        let fields: Vec<&str> = text.trim_end().split(',').collect();

        // action, side, depth, price
        assert_eq!(fields[6], "R");
        assert_eq!(fields[7], "N");
        assert_eq!(fields[8], "0");
        assert_eq!(fields[9], "");
    }

    #[test]
    fn test_rtype_is_hardcoded_to_ten() {
        let mut event = test_event();
        event.rtype = 160;

        let text = render(|w| w.write_row(&event, 0, &[], &[]).unwrap());
        let fields: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(fields[3], "10");
    }

    #[test]
    fn test_empty_book_renders_empty_levels() {
        let text = render(|w| w.write_row(&test_event(), 0, &[], &[]).unwrap());
        let fields: Vec<&str> = text.trim_end().split(',').collect();

        assert_eq!(fields.len(), COLUMN_COUNT);
        // Every level quadruple is (empty, 0, 0) on both sides.
        for i in 0..MBP_DEPTH {
            let base = 14 + i * 6;
            assert_eq!(&fields[base..base + 6], &["", "0", "0", "", "0", "0"]);
        }
    }
}
