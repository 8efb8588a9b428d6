//! Polygon scanner
//!
//! Active-edge scan conversion. On each scanline the scanner retires
//! edges that ended above it, activates edges that start on it, orders
//! the active set by x and pairs consecutive crossings into spans.

use heapless::Vec;

use super::edge::EdgeTable;
use super::{Scan, Span};
use crate::shape::Polygon;

/// Maximum edges crossing one scanline
pub const MAX_ACTIVE_EDGES: usize = 8;

/// Scanner for one polygon
#[derive(Debug, Clone)]
pub struct PolygonScanner {
    table: EdgeTable,
    /// Arena indices of active edges, ordered by pixel x
    active: Vec<usize, MAX_ACTIVE_EDGES>,
    row: Option<i32>,
    spans: Vec<Span, MAX_ACTIVE_EDGES>,
    emitted: usize,
    filled: bool,
    color: u8,
    edges_dropped: u32,
}

impl PolygonScanner {
    pub fn new(polygon: &Polygon) -> Self {
        let filled = polygon.is_filled();
        let mut scanner = Self {
            table: EdgeTable::build(polygon.vertices(), !filled),
            active: Vec::new(),
            row: None,
            spans: Vec::new(),
            emitted: 0,
            filled,
            color: polygon.color(),
            edges_dropped: 0,
        };
        // Scanlines above 0 are never visited
        if let Some(top) = scanner.table.next_top() {
            scanner.enter_row(top.max(0));
        }
        scanner
    }

    /// Edges dropped because the active set was full
    pub fn edges_dropped(&self) -> u32 {
        self.edges_dropped
    }

    fn enter_row(&mut self, row: i32) {
        self.row = Some(row);

        let table = &self.table;
        self.active.retain(|&i| table.get(i).bottom >= row);

        while let Some(index) = self.table.activate(row) {
            if self.table.get(index).bottom < row {
                // Entirely above scanline 0
                continue;
            }
            if self.active.push(index).is_err() {
                self.edges_dropped += 1;
                #[cfg(feature = "defmt")]
                defmt::trace!("active edge set full at row {}", row);
            }
        }

        self.sort_active();
        self.collect_spans(row);
    }

    /// Insertion sort; the set is tiny and nearly ordered between rows
    fn sort_active(&mut self) {
        for i in 1..self.active.len() {
            let mut j = i;
            while j > 0
                && self.table.get(self.active[j - 1]).pixel()
                    > self.table.get(self.active[j]).pixel()
            {
                self.active.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    fn collect_spans(&mut self, row: i32) {
        self.spans.clear();
        self.emitted = 0;

        if self.filled {
            // Even-odd over sloped crossings, in x order
            let mut open: Option<i32> = None;
            for &index in &self.active {
                let edge = self.table.get(index);
                if edge.is_flat() {
                    continue;
                }
                let x = edge.pixel();
                match open.take() {
                    None => open = Some(x),
                    Some(a) => {
                        let _ = self.spans.push(Span {
                            x1: a.min(x),
                            x2: a.max(x) + 1,
                            color: self.color,
                        });
                    }
                }
            }
            // Horizontal sides are boundary too; skip those already inside a span
            for &index in &self.active {
                let edge = self.table.get(index);
                if !edge.is_flat() {
                    continue;
                }
                let (x1, x2) = edge.outline_extent(row);
                if !self.spans.iter().any(|s| s.x1 <= x1 && x2 <= s.x2) {
                    let _ = self.spans.push(Span {
                        x1,
                        x2,
                        color: self.color,
                    });
                }
            }
        } else {
            for &index in &self.active {
                let (x1, x2) = self.table.get(index).outline_extent(row);
                let _ = self.spans.push(Span {
                    x1,
                    x2,
                    color: self.color,
                });
            }
        }
    }

    fn finish_row(&mut self, row: i32) {
        for &index in &self.active {
            self.table.get_mut(index).step();
        }

        let next = row + 1;
        let table = &self.table;
        let still_active = self.active.iter().any(|&i| table.get(i).bottom >= next);

        match (still_active, self.table.next_top()) {
            (true, _) => self.enter_row(next),
            (false, Some(top)) => self.enter_row(top.max(next)),
            (false, None) => {
                self.active.clear();
                self.spans.clear();
                self.row = None;
            }
        }
    }
}

impl Scan for PolygonScanner {
    fn next_line(&mut self) -> Option<i32> {
        self.row
    }

    fn next_run(&mut self, y: i32) -> Option<Span> {
        let row = self.row.filter(|&r| r == y)?;
        if let Some(span) = self.spans.get(self.emitted) {
            self.emitted += 1;
            return Some(*span);
        }
        self.finish_row(row);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Point;

    fn px(x: i32, y: i32) -> Point {
        Point::from_pixels(x, y)
    }

    /// Drain one line, returning (y, spans)
    fn line(scan: &mut PolygonScanner) -> Option<(i32, Vec<Span, 8>)> {
        let y = scan.next_line()?;
        let mut spans = Vec::new();
        while let Some(span) = scan.next_run(y) {
            spans.push(span).unwrap();
        }
        Some((y, spans))
    }

    #[test]
    fn test_triangle_rows() {
        let poly = Polygon::new(&[px(0, 0), px(4, 0), px(0, 4)], 7).unwrap();
        let mut scan = PolygonScanner::new(&poly);

        for y in 0..=4 {
            let (row, spans) = line(&mut scan).unwrap();
            assert_eq!(row, y);
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0], Span { x1: 0, x2: 5 - y, color: 7 });
        }
        assert!(line(&mut scan).is_none());
    }

    #[test]
    fn test_concave_polygon_splits_rows() {
        // A "U": two prongs joined at the bottom
        let poly = Polygon::new(
            &[px(0, 0), px(2, 0), px(2, 3), px(6, 3), px(6, 0), px(8, 0), px(8, 5), px(0, 5)],
            3,
        )
        .unwrap();
        let mut scan = PolygonScanner::new(&poly);

        let (y, spans) = line(&mut scan).unwrap();
        assert_eq!(y, 0);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].x1, spans[0].x2), (0, 3));
        assert_eq!((spans[1].x1, spans[1].x2), (6, 9));

        // Rows below the notch are a single span
        let mut last = None;
        while let Some((y, spans)) = line(&mut scan) {
            last = Some((y, spans));
        }
        let (y, spans) = last.unwrap();
        assert_eq!(y, 5);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].x1, spans[0].x2), (0, 9));
    }

    #[test]
    fn test_rows_above_zero_skipped() {
        let poly = Polygon::new(&[px(0, -10), px(10, -10), px(10, 2), px(0, 2)], 1).unwrap();
        let mut scan = PolygonScanner::new(&poly);

        assert_eq!(scan.next_line(), Some(0));
        let (_, spans) = line(&mut scan).unwrap();
        assert_eq!((spans[0].x1, spans[0].x2), (0, 11));
    }

    #[test]
    fn test_polygon_entirely_above_zero() {
        let poly = Polygon::new(&[px(0, -10), px(10, -10), px(10, -2)], 1).unwrap();
        let mut scan = PolygonScanner::new(&poly);
        assert_eq!(scan.next_line(), Some(0));
        assert!(line(&mut scan).unwrap().1.is_empty());
        assert_eq!(scan.next_line(), None);
    }

    #[test]
    fn test_active_edge_overflow_counted() {
        // Comb with 5 teeth: 10 edges cross row 0
        let mut pts: Vec<Point, 32> = Vec::new();
        for t in 0..5 {
            pts.push(px(t * 4, 0)).unwrap();
            pts.push(px(t * 4 + 2, 0)).unwrap();
            pts.push(px(t * 4 + 2, 4)).unwrap();
            pts.push(px(t * 4 + 4, 4)).unwrap();
        }
        pts.push(px(20, 8)).unwrap();
        pts.push(px(0, 8)).unwrap();
        let poly = Polygon::new(&pts, 2).unwrap();
        let mut scan = PolygonScanner::new(&poly);

        let (_, spans) = line(&mut scan).unwrap();
        assert!(spans.len() <= MAX_ACTIVE_EDGES);
        assert!(scan.edges_dropped() > 0);
    }

    #[test]
    fn test_flat_side_across_step_is_painted() {
        // The right side steps out along (4,2)→(6,2)
        let poly = Polygon::new(
            &[px(0, 0), px(4, 0), px(4, 2), px(6, 2), px(6, 4), px(0, 4)],
            5,
        )
        .unwrap();
        let mut scan = PolygonScanner::new(&poly);

        let mut rows: [(i32, i32); 5] = [(0, 0); 5];
        while let Some((y, spans)) = line(&mut scan) {
            let lo = spans.iter().map(|s| s.x1).min().unwrap();
            let hi = spans.iter().map(|s| s.x2).max().unwrap();
            // Spans on a row are contiguous here
            let covered: i32 = spans.iter().map(|s| s.x2 - s.x1).sum();
            assert!(covered >= hi - lo);
            rows[y as usize] = (lo, hi);
        }
        assert_eq!(rows, [(0, 5), (0, 5), (0, 7), (0, 7), (0, 7)]);
    }

    #[test]
    fn test_outline_square() {
        let poly = Polygon::outline(&[px(0, 0), px(4, 0), px(4, 4), px(0, 4)], 9).unwrap();
        let mut scan = PolygonScanner::new(&poly);

        // Top row: flat side plus both vertical sides
        let (y, spans) = line(&mut scan).unwrap();
        assert_eq!(y, 0);
        assert!(spans.iter().any(|s| (s.x1, s.x2) == (0, 5)));

        // Middle rows: just the two vertical sides
        let (y, spans) = line(&mut scan).unwrap();
        assert_eq!(y, 1);
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].x1, spans[0].x2), (0, 1));
        assert_eq!((spans[1].x1, spans[1].x2), (4, 5));
    }

    #[test]
    fn test_next_run_wrong_line() {
        let poly = Polygon::new(&[px(0, 2), px(4, 2), px(0, 6)], 1).unwrap();
        let mut scan = PolygonScanner::new(&poly);
        assert_eq!(scan.next_run(0), None);
        assert_eq!(scan.next_line(), Some(2));
    }
}
