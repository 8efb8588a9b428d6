//! Shape compiler for the rvgr graphics overlay
//!
//! This crate turns a list of rectangles and polygons into the opcode
//! stream the overlay paints from:
//!
//! - Shape model ([`Rect`], [`Polygon`])
//! - Scanline iterators, including active-edge polygon filling
//! - Run collection with painter's-order overlap resolution
//! - Opcode encoding within the protocol's field limits
//! - Configuration and per-compile statistics
//!
//! ```ignore
//! let shapes = [Shape::from(Rect::new(2, 3, 4, 2, 5)?)];
//! let stream = rvgr_core::generate(0x1000, &shapes);
//! stream.transmit(&mut link)?;
//! ```
//!
//! Working memory per scanline is fixed; anything that does not fit is
//! dropped and counted in [`RasterStats`]. Only the output stream and the
//! per-shape scanners are heap allocated.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod encoder;
pub mod generate;
pub mod runs;
pub mod scan;
pub mod shape;
pub mod stream;

pub use config::{ConfigError, RasterConfig};
pub use generate::{generate, generate_with, Generated, RasterStats};
pub use runs::{Run, MAX_RUNS};
pub use shape::{Point, Polygon, Rect, Shape, ShapeError};
pub use stream::CommandStream;
