//! Run collection and merging
//!
//! For one scanline, spans from every live scanner are gathered into a
//! bounded buffer tagged with their shape's draw order, sorted by left
//! edge, then resolved into non-overlapping runs. Where runs overlap the
//! one drawn last wins.

use heapless::Vec;

use crate::scan::{Scan, ShapeScanner, Span};

/// Maximum runs collected on one scanline
pub const MAX_RUNS: usize = 128;

/// Upper bound on resolved runs: overlap can split runs but each input
/// run contributes at most two boundaries
pub const MAX_RESOLVED_RUNS: usize = 2 * MAX_RUNS;

/// A horizontal run `[x1, x2)` in one palette colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Run {
    pub x1: u16,
    pub x2: u16,
    pub color: u8,
}

impl Run {
    pub fn len(&self) -> u16 {
        self.x2 - self.x1
    }

    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1
    }
}

/// A collected run with the position of its shape in the draw list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tagged {
    run: Run,
    order: u32,
}

/// Scanline run buffer
///
/// Reused across scanlines within one compile; cleared per line.
#[derive(Debug, Clone, Default)]
pub struct RunCollector {
    runs: Vec<Tagged, MAX_RUNS>,
    resolved: Vec<Run, MAX_RESOLVED_RUNS>,
    dropped: u32,
    slivers: u32,
    clipped: u32,
}

impl RunCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs that did not fit the buffer, over the collector's life
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Resolved runs discarded as narrower than the minimum width
    pub fn slivers(&self) -> u32 {
        self.slivers
    }

    /// Spans that reached past the last addressable column, over the
    /// collector's life
    pub fn clipped(&self) -> u32 {
        self.clipped
    }

    /// Start a new scanline
    pub fn clear(&mut self) {
        self.runs.clear();
        self.resolved.clear();
    }

    /// Add one span from the shape at `order` in the draw list
    ///
    /// Spans are clamped to the 16-bit coordinate range; empty spans are
    /// ignored. Spans cut at the right end of the range are counted in
    /// [`clipped`](Self::clipped). Returns `false` if the buffer was full
    /// and the span was dropped.
    pub fn push(&mut self, span: Span, order: u32) -> bool {
        if span.x2 > u16::MAX as i32 && span.x1 < span.x2 {
            self.clipped += 1;
        }
        let x1 = span.x1.clamp(0, u16::MAX as i32) as u16;
        let x2 = span.x2.clamp(0, u16::MAX as i32) as u16;
        if x2 <= x1 {
            return true;
        }
        let tagged = Tagged {
            run: Run {
                x1,
                x2,
                color: span.color,
            },
            order,
        };
        if self.runs.push(tagged).is_err() {
            self.dropped += 1;
            return false;
        }
        true
    }

    /// Drain every span `scanner` has on line `y`
    ///
    /// The scanner is always drained to the end of the line, even once
    /// the buffer is full, so it moves on to its next line.
    pub fn collect_from(&mut self, scanner: &mut ShapeScanner, y: i32, order: u32) {
        while let Some(span) = scanner.next_run(y) {
            self.push(span, order);
        }
    }

    /// Number of runs collected on this line
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Resolve the collected runs into the runs to paint
    ///
    /// Returns runs in strictly increasing x with no overlap. Adjacent
    /// pieces of the same colour are joined. Pieces narrower than
    /// `min_width` are discarded.
    pub fn resolve(&mut self, min_width: u16) -> &[Run] {
        self.sort_by_left();
        self.resolved.clear();

        let mut bounds: Vec<u16, MAX_RESOLVED_RUNS> = Vec::new();
        for t in &self.runs {
            insert_bound(&mut bounds, t.run.x1);
            insert_bound(&mut bounds, t.run.x2);
        }

        for w in bounds.windows(2) {
            let (lo, hi) = (w[0], w[1]);
            let Some(color) = self.top_color(lo, hi) else {
                continue;
            };
            match self.resolved.last_mut() {
                Some(last) if last.x2 == lo && last.color == color => last.x2 = hi,
                _ => {
                    let _ = self.resolved.push(Run { x1: lo, x2: hi, color });
                }
            }
        }

        if min_width > 1 {
            let before = self.resolved.len();
            self.resolved.retain(|r| r.len() >= min_width);
            self.slivers += (before - self.resolved.len()) as u32;
        }

        &self.resolved
    }

    /// Stable insertion sort by left edge
    fn sort_by_left(&mut self) {
        for i in 1..self.runs.len() {
            let mut j = i;
            while j > 0 && self.runs[j - 1].run.x1 > self.runs[j].run.x1 {
                self.runs.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Colour of the last-drawn run covering all of `[lo, hi)`
    ///
    /// `lo` and `hi` are adjacent boundaries, so any run overlapping the
    /// interval covers it entirely.
    fn top_color(&self, lo: u16, hi: u16) -> Option<u8> {
        let mut best: Option<Tagged> = None;
        for t in &self.runs {
            if t.run.x1 > lo {
                // Sorted by left edge: nothing further can cover `lo`
                break;
            }
            if t.run.x2 >= hi && best.map_or(true, |b| t.order >= b.order) {
                best = Some(*t);
            }
        }
        best.map(|t| t.run.color)
    }
}

/// Insert into a sorted set of boundaries
fn insert_bound(bounds: &mut Vec<u16, MAX_RESOLVED_RUNS>, x: u16) {
    let pos = match bounds.binary_search(&x) {
        Ok(_) => return,
        Err(pos) => pos,
    };
    // Capacity is twice the run capacity, so this never fails
    let _ = bounds.insert(pos, x);
}
