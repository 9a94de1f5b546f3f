//! End-to-end reconstruction driver.
//!
//! A strict single-threaded pipeline: decode, sequence, apply, aggregate,
//! encode. Every decoded event produces exactly one output row, including
//! events carrying unrecognized action or side bytes (those are warned,
//! ignored by the book, and re-emitted verbatim). Records with malformed
//! fields are logged and skipped. Fatal book faults flush everything
//! written so far and propagate to the caller.

use std::io::{Read, Write};

use crate::decode::MboReader;
use crate::encode::MbpWriter;
use crate::error::Result;
use crate::market::Market;
use crate::sequencer::EventSequencer;
use crate::types::MBP_DEPTH;

/// Statistics for one reconstruction run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Events decoded and processed
    pub events_processed: u64,

    /// Output rows written (header excluded)
    pub rows_written: u64,

    /// Input records skipped because they failed to decode
    pub records_skipped: u64,

    /// Synthetic trades applied from completed T/F/C triplets
    pub synthetic_trades: u64,
}

/// Run the full MBO to MBP-10 reconstruction from `input` to `output`.
///
/// # Errors
///
/// Returns an error on I/O failure or on a fatal input fault (duplicate
/// Add for a live order id, Modify changing side). Output written before
/// the fault is flushed.
pub fn run<R: Read, W: Write>(input: R, output: W) -> Result<PipelineStats> {
    let reader = MboReader::new(input);
    let mut writer = MbpWriter::new(output);
    writer.write_header()?;

    let mut market = Market::new();
    let mut sequencer = EventSequencer::new();
    let mut stats = PipelineStats::default();

    for decoded in reader {
        let event = match decoded {
            Ok(event) => event,
            Err(e) => {
                stats.records_skipped += 1;
                log::warn!("Skipping undecodable record: {e}");
                continue;
            }
        };

        let depth = match sequencer.process(&mut market, &event) {
            Ok(depth) => depth,
            Err(e) => {
                writer.flush()?;
                return Err(e);
            }
        };

        let bids = market.aggregated_bid_levels(event.instrument_id, MBP_DEPTH);
        let asks = market.aggregated_ask_levels(event.instrument_id, MBP_DEPTH);
        writer.write_row(&event, depth, &bids, &asks)?;
        stats.events_processed += 1;
    }

    writer.flush()?;
    stats.rows_written = writer.rows_written();
    stats.synthetic_trades = sequencer.stats().synthetic_trades;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MbpError;

    const HEADER: &str =
        "ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol\n";

    fn run_over(rows: &str) -> (Result<PipelineStats>, String) {
        let input = format!("{HEADER}{rows}");
        let mut output = Vec::new();
        let result = run(input.as_bytes(), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_one_row_per_event() {
        let (result, output) = run_over(
            "t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,1,SYM\n\
             t1,t2,160,1,1,A,A,101.0,3,0,2,0,0,2,SYM\n",
        );

        let stats = result.unwrap();
        assert_eq!(stats.events_processed, 2);
        assert_eq!(stats.rows_written, 2);
        assert_eq!(stats.records_skipped, 0);
        // Header plus two data rows.
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_malformed_record_is_skipped_without_a_row() {
        let (result, output) = run_over(
            "t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,1,SYM\n\
             t1,t2,160,1,1,A,B,100.0,lots,0,2,0,0,2,SYM\n\
             t1,t2,160,1,1,A,B,99.0,5,0,3,0,0,3,SYM\n",
        );

        let stats = result.unwrap();
        assert_eq!(stats.events_processed, 2);
        assert_eq!(stats.records_skipped, 1);
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_unknown_action_byte_still_emits_a_row() {
        let (result, output) = run_over(
            "t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,1,SYM\n\
             t1,t2,160,1,1,X,B,100.0,5,0,2,0,0,2,SYM\n",
        );

        let stats = result.unwrap();
        assert_eq!(stats.events_processed, 2);
        assert_eq!(stats.rows_written, 2);
        assert_eq!(stats.records_skipped, 0);
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_fatal_fault_flushes_partial_output() {
        let (result, output) = run_over(
            "t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,1,SYM\n\
             t1,t2,160,1,1,A,B,100.0,5,0,1,0,0,2,SYM\n",
        );

        let err = result.unwrap_err();
        assert!(matches!(err, MbpError::DuplicateOrderId(1)));
        // Header and the first completed row survive.
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_synthetic_trades_counted() {
        let (result, _) = run_over(
            "t1,t2,160,1,1,A,B,99.5,4,0,10,0,0,1,SYM\n\
             t1,t2,160,1,1,T,A,99.5,4,0,77,0,0,2,SYM\n\
             t1,t2,160,1,1,F,A,99.5,4,0,77,0,0,3,SYM\n\
             t1,t2,160,1,1,C,A,99.5,4,0,77,0,0,4,SYM\n",
        );

        let stats = result.unwrap();
        assert_eq!(stats.events_processed, 4);
        assert_eq!(stats.synthetic_trades, 1);
    }
}
