//! Rectangle scanner

use super::{Scan, Span};
use crate::shape::Rect;

/// One span `[x, x+w)` on every line of `[y, y+h)`
#[derive(Debug, Clone)]
pub struct RectScanner {
    y: i32,
    y_end: i32,
    x1: i32,
    x2: i32,
    color: u8,
    emitted: bool,
}

impl RectScanner {
    pub fn new(rect: &Rect) -> Self {
        let y = rect.y() as i32;
        let x1 = rect.x() as i32;
        let (y_end, x2) = if rect.is_empty() {
            (y, x1)
        } else {
            (y + rect.height() as i32, x1 + rect.width() as i32)
        };
        Self {
            y,
            y_end,
            x1,
            x2,
            color: rect.color(),
            emitted: false,
        }
    }
}

impl Scan for RectScanner {
    fn next_line(&mut self) -> Option<i32> {
        (self.y < self.y_end).then_some(self.y)
    }

    fn next_run(&mut self, y: i32) -> Option<Span> {
        if y != self.y || self.y >= self.y_end {
            return None;
        }
        if !self.emitted {
            self.emitted = true;
            return Some(Span {
                x1: self.x1,
                x2: self.x2,
                color: self.color,
            });
        }
        self.emitted = false;
        self.y += 1;
        None
    }
}
