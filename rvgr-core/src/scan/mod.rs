//! Scan iterators
//!
//! Every shape is turned into a scanner that walks its scanlines top to
//! bottom. For each line the scanner hands out horizontal spans; the run
//! collector pulls spans from all live scanners on the same line.

pub mod edge;
pub mod polygon;
pub mod rect;

pub use polygon::PolygonScanner;
pub use rect::RectScanner;

use crate::shape::Shape;

/// Half-open horizontal interval `[x1, x2)` on one scanline
///
/// Spans with `x2 <= x1` carry no pixels and are discarded by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Span {
    pub x1: i32,
    pub x2: i32,
    pub color: u8,
}

impl Span {
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1
    }
}

/// Scanline iteration shared by all shape kinds
///
/// Lines are produced in strictly ascending order and never revisited.
pub trait Scan {
    /// The scanline this scanner has spans for next, or `None` once exhausted
    ///
    /// Repeated calls without [`next_run`](Scan::next_run) return the same line.
    fn next_line(&mut self) -> Option<i32>;

    /// Next span on line `y`
    ///
    /// Returns `None` when line `y` has no more spans; the scanner then
    /// moves on to its next line. Asking for any line other than the
    /// current one yields `None` and changes nothing.
    fn next_run(&mut self, y: i32) -> Option<Span>;
}

/// Scanner for any [`Shape`]
pub enum ShapeScanner {
    Rect(RectScanner),
    Polygon(PolygonScanner),
}

impl ShapeScanner {
    /// Create the scanner for a shape
    pub fn new(shape: &Shape) -> Self {
        match shape {
            Shape::Rect(rect) => ShapeScanner::Rect(RectScanner::new(rect)),
            Shape::Polygon(poly) => ShapeScanner::Polygon(PolygonScanner::new(poly)),
        }
    }

    /// Polygon edges dropped because the active set was full
    pub fn edges_dropped(&self) -> u32 {
        match self {
            ShapeScanner::Rect(_) => 0,
            ShapeScanner::Polygon(p) => p.edges_dropped(),
        }
    }
}

impl Scan for ShapeScanner {
    fn next_line(&mut self) -> Option<i32> {
        match self {
            ShapeScanner::Rect(r) => r.next_line(),
            ShapeScanner::Polygon(p) => p.next_line(),
        }
    }

    fn next_run(&mut self, y: i32) -> Option<Span> {
        match self {
            ShapeScanner::Rect(r) => r.next_run(y),
            ShapeScanner::Polygon(p) => p.next_run(y),
        }
    }
}
