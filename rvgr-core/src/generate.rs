//! Shape list to command stream
//!
//! One pass over the scanlines covered by any shape, top to bottom. Each
//! scanline collects spans from every scanner positioned on it, resolves
//! them into runs and encodes them. Scanners are dropped as they finish.

use alloc::vec::Vec;

use crate::config::RasterConfig;
use crate::encoder::CommandEncoder;
use crate::runs::RunCollector;
use crate::scan::{Scan, ShapeScanner};
use crate::shape::Shape;
use crate::stream::CommandStream;

/// What happened during one compile
///
/// Every counter but `lines_emitted` and `opcodes` records output that
/// was lost to a fixed capacity or limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RasterStats {
    /// Scanlines that produced at least one run
    pub lines_emitted: u32,
    /// Opcodes written, end marker included
    pub opcodes: u32,
    /// Spans dropped because a scanline's run buffer was full
    pub runs_dropped: u32,
    /// Polygon edges dropped because the active set was full
    pub edges_dropped: u32,
    /// Merged runs dropped as narrower than the minimum width
    pub slivers_dropped: u32,
    /// Spans cut short at column 65535, the end of the coordinate range
    pub runs_clipped: u32,
    /// First scanline that could not be addressed; it and all below are missing
    pub truncated_at_row: Option<i32>,
}

impl RasterStats {
    /// Whether any output was lost
    pub fn is_lossy(&self) -> bool {
        self.runs_dropped > 0
            || self.edges_dropped > 0
            || self.slivers_dropped > 0
            || self.runs_clipped > 0
            || self.truncated_at_row.is_some()
    }
}

/// Result of [`generate_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub stream: CommandStream,
    pub stats: RasterStats,
}

/// Compile `shapes` into a stream for the overlay at `address`
///
/// Later shapes paint over earlier ones. Uses the default configuration.
pub fn generate(address: u16, shapes: &[Shape]) -> CommandStream {
    generate_with(address, shapes, &RasterConfig::default()).stream
}

/// Compile `shapes` with an explicit configuration, reporting statistics
pub fn generate_with(address: u16, shapes: &[Shape], config: &RasterConfig) -> Generated {
    let config = config.sanitized();
    let mut encoder = CommandEncoder::begin(address, config.limits);
    let mut collector = RunCollector::new();
    let mut stats = RasterStats::default();

    let mut scanners: Vec<Option<ShapeScanner>> =
        shapes.iter().map(|s| Some(ShapeScanner::new(s))).collect();

    while let Some(y) = lowest_line(&mut scanners, &mut stats) {
        if !encoder.addressable(y) {
            stats.truncated_at_row = Some(y);
            break;
        }

        collector.clear();
        for (order, slot) in scanners.iter_mut().enumerate() {
            if let Some(scanner) = slot {
                if scanner.next_line() == Some(y) {
                    collector.collect_from(scanner, y, order as u32);
                }
            }
        }

        let runs = collector.resolve(config.min_run_width);
        encoder.encode_line(y as u16, runs);
    }

    // Scanners left behind by truncation
    for scanner in scanners.iter().flatten() {
        stats.edges_dropped += scanner.edges_dropped();
    }

    stats.runs_dropped = collector.dropped();
    stats.slivers_dropped = collector.slivers();
    stats.runs_clipped = collector.clipped();
    let (stream, lines, opcodes) = encoder.finish_counted();
    stats.lines_emitted = lines;
    stats.opcodes = opcodes;

    #[cfg(feature = "defmt")]
    {
        defmt::debug!(
            "generate: {} shapes, {} lines, {} opcodes, {} bytes",
            shapes.len(),
            stats.lines_emitted,
            stats.opcodes,
            stream.len()
        );
        if stats.is_lossy() {
            defmt::warn!("generate: output truncated {}", stats);
        }
    }

    Generated { stream, stats }
}

/// Lowest scanline any live scanner is on
///
/// Exhausted scanners are dropped here.
fn lowest_line(scanners: &mut [Option<ShapeScanner>], stats: &mut RasterStats) -> Option<i32> {
    let mut lowest: Option<i32> = None;
    for slot in scanners.iter_mut() {
        let Some(scanner) = slot else {
            continue;
        };
        match scanner.next_line() {
            Some(y) => lowest = Some(lowest.map_or(y, |l| l.min(y))),
            None => {
                stats.edges_dropped += scanner.edges_dropped();
                *slot = None;
            }
        }
    }
    lowest
}
