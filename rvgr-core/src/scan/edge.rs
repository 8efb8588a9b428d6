//! Polygon edge table
//!
//! Edges are built once per polygon into a fixed-capacity arena sorted by
//! top scanline. The scanner walks the arena with a cursor: every edge
//! before the cursor has been activated, every edge after it is still
//! pending. Scanline `y` samples the polygon at sub-pixel row
//! `y << SUBPIXEL_BITS`.

use heapless::Vec;

use crate::shape::{Point, MAX_POLYGON_VERTICES, SUBPIXEL_BITS, SUBPIXEL_SCALE};

/// Integer x stepper for one edge
///
/// Holds the edge's x in sub-pixel units as a whole part plus a
/// remainder over `den` (the edge's sub-pixel height). Each step moves
/// one scanline down; the remainder carries into the whole part so there
/// is no accumulated drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepper {
    x: i64,
    rem: i64,
    whole_step: i64,
    rem_step: i64,
    den: i64,
    dir: i64,
}

impl Stepper {
    /// Stepper for the edge `top` → `bottom`, positioned on scanline `row`
    ///
    /// `bottom.y` must be greater than `top.y`.
    pub fn new(top: Point, bottom: Point, row: i32) -> Self {
        let den = bottom.y as i64 - top.y as i64;
        let dx = bottom.x as i64 - top.x as i64;
        let dir = dx.signum();
        let adx = dx.abs();

        let offset = ((row as i64) << SUBPIXEL_BITS) - top.y as i64;
        let num = offset * adx;
        let per_row = adx * SUBPIXEL_SCALE as i64;

        Self {
            x: top.x as i64 + dir * (num / den),
            rem: num % den,
            whole_step: per_row / den,
            rem_step: per_row % den,
            den,
            dir,
        }
    }

    /// Move down one scanline
    pub fn step(&mut self) {
        self.x += self.dir * self.whole_step;
        self.rem += self.rem_step;
        if self.rem >= self.den {
            self.rem -= self.den;
            self.x += self.dir;
        }
    }

    /// Move down `rows` scanlines at once
    pub fn advance(&mut self, rows: i32) {
        let rows = rows as i64;
        let total = self.rem + rows * self.rem_step;
        self.x += self.dir * (rows * self.whole_step + total / self.den);
        self.rem = total % self.den;
    }

    /// Pixel column containing the edge on the current scanline
    pub fn pixel(&self) -> i32 {
        // Leftward edges sit slightly left of the whole part
        let x = if self.dir < 0 && self.rem > 0 {
            self.x - 1
        } else {
            self.x
        };
        (x >> SUBPIXEL_BITS) as i32
    }
}

/// How an edge contributes on a scanline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Non-horizontal edge: one crossing per scanline
    Sloped {
        stepper: Stepper,
        /// Pixel column of the bottom vertex
        end_pixel: i32,
    },
    /// Horizontal edge: `[x1, x2)` on its single line
    Flat { x1: i32, x2: i32 },
}

/// One polygon edge with its inclusive scanline extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub top: i32,
    pub bottom: i32,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn is_flat(&self) -> bool {
        matches!(self.kind, EdgeKind::Flat { .. })
    }

    /// Pixel column used to order the active set
    pub fn pixel(&self) -> i32 {
        match self.kind {
            EdgeKind::Sloped { stepper, .. } => stepper.pixel(),
            EdgeKind::Flat { x1, .. } => x1,
        }
    }

    /// Move down one scanline
    pub fn step(&mut self) {
        if let EdgeKind::Sloped { stepper, .. } = &mut self.kind {
            stepper.step();
        }
    }

    /// Move down `rows` scanlines
    pub fn advance(&mut self, rows: i32) {
        if let EdgeKind::Sloped { stepper, .. } = &mut self.kind {
            stepper.advance(rows);
        }
    }

    /// Pixels this edge covers on scanline `row` when drawn as an outline
    ///
    /// A sloped edge covers its x travel from this scanline to the next,
    /// ending at its bottom vertex on its last scanline.
    pub fn outline_extent(&self, row: i32) -> (i32, i32) {
        match self.kind {
            EdgeKind::Sloped { stepper, end_pixel } => {
                let here = stepper.pixel();
                let there = if row >= self.bottom {
                    end_pixel
                } else {
                    let mut next = stepper;
                    next.step();
                    next.pixel()
                };
                (here.min(there), here.max(there) + 1)
            }
            EdgeKind::Flat { x1, x2 } => (x1, x2),
        }
    }
}

/// Vertical direction of the side `a` → `b`
fn direction(a: Point, b: Point) -> i32 {
    b.y.cmp(&a.y) as i32
}

/// First scanline at or below sub-pixel `y`
fn row_at_or_below(y: i32) -> i32 {
    // Widened: the rounding add overflows near `i32::MAX`
    ((y as i64 + SUBPIXEL_SCALE as i64 - 1) >> SUBPIXEL_BITS) as i32
}

/// Last scanline at or above sub-pixel `y`
fn row_at_or_above(y: i32) -> i32 {
    y >> SUBPIXEL_BITS
}

/// Edges of one polygon, sorted by top scanline
#[derive(Debug, Clone)]
pub struct EdgeTable {
    edges: Vec<Edge, MAX_POLYGON_VERTICES>,
    /// Index of the first edge not yet activated
    next: usize,
}

impl EdgeTable {
    /// Build the table for a closed vertex loop
    ///
    /// Horizontal sides become [`EdgeKind::Flat`] edges on their single
    /// line; they never take part in crossing parity. For filled polygons,
    /// an edge whose top vertex continues a neighbour heading the same
    /// vertical way starts one scanline lower when both would sample that
    /// vertex, so the crossing is counted once.
    pub fn build(vertices: &[Point], outline: bool) -> Self {
        let n = vertices.len();
        let mut edges = Vec::new();

        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let dir = direction(a, b);

            if dir == 0 {
                let row = row_at_or_above(a.y);
                let _ = edges.push(Edge {
                    top: row,
                    bottom: row,
                    kind: EdgeKind::Flat {
                        x1: (a.x.min(b.x)) >> SUBPIXEL_BITS,
                        x2: ((a.x.max(b.x)) >> SUBPIXEL_BITS) + 1,
                    },
                });
                continue;
            }

            let (top_pt, bottom_pt) = if dir > 0 { (a, b) } else { (b, a) };
            let mut top = row_at_or_below(top_pt.y);
            let bottom = row_at_or_above(bottom_pt.y);

            let mut stepper = Stepper::new(top_pt, bottom_pt, top);
            if !outline
                && top_pt.y.rem_euclid(SUBPIXEL_SCALE) == 0
                && neighbour_across_top(vertices, i, dir) == dir
            {
                top += 1;
                stepper.step();
            }

            if top > bottom {
                continue;
            }

            let _ = edges.push(Edge {
                top,
                bottom,
                kind: EdgeKind::Sloped {
                    stepper,
                    end_pixel: bottom_pt.x >> SUBPIXEL_BITS,
                },
            });
        }

        edges.sort_unstable_by_key(|e| e.top);
        Self { edges, next: 0 }
    }

    /// Number of edges in the table
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Top scanline of the next pending edge
    pub fn next_top(&self) -> Option<i32> {
        self.edges.get(self.next).map(|e| e.top)
    }

    /// Activate the next pending edge if it starts at or above `row`
    ///
    /// The edge is advanced to `row` first. Returns its arena index.
    pub fn activate(&mut self, row: i32) -> Option<usize> {
        let edge = self.edges.get_mut(self.next)?;
        if edge.top > row {
            return None;
        }
        if edge.top < row {
            edge.advance(row - edge.top);
        }
        self.next += 1;
        Some(self.next - 1)
    }

    pub fn get(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Edge {
        &mut self.edges[index]
    }
}

/// Vertical direction of the nearest non-horizontal side sharing the top
/// vertex of side `i`, walking past horizontal sides
///
/// Side `i` heads down from its start (`dir > 0`) or up to its end.
fn neighbour_across_top(vertices: &[Point], i: usize, dir: i32) -> i32 {
    let n = vertices.len();
    for k in 1..n {
        let j = if dir > 0 { (i + n - k) % n } else { (i + k) % n };
        let d = direction(vertices[j], vertices[(j + 1) % n]);
        if d != 0 {
            return d;
        }
    }
    0
}
