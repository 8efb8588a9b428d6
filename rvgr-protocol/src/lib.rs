//! rvgr Graphics Overlay Command Protocol
//!
//! This crate defines the opcode stream the host sends to the display
//! controller's graphics overlay. The overlay paints scanlines from a
//! run-length description: move the cursor, paint N pixels in a palette
//! colour, move to another line.
//!
//! # Stream Overview
//!
//! ```text
//! ┌──────────┬──────────┬─────┬──────────┬────────┐
//! │ ADDR HI  │ ADDR LO  │ OP… │ OP (BE)  │ 0xFFFF │
//! │ 1B       │ 1B       │ 2B  │ 2B       │ 2B     │
//! └──────────┴──────────┴─────┴──────────┴────────┘
//! ```
//!
//! Every opcode is one big-endian 16-bit word, discriminated by its
//! leading bits:
//!
//! ```text
//! 0ccc cccc llll llll  PAINT        colour c (0-15), length l
//! 100x xxxx xxxx xxxx  SKIP         advance cursor x pixels
//! 101x xxxx xxxx xxxx  NEXT LINE    y = previous + 1, cursor = x
//! 110l llll llll llll  CONTINUE     extend current run by l pixels
//! 1110 .... .... ....  (reserved)
//! 1111 yyyy yyyy yyyy  JUMP LINE    y = y, cursor = 0
//! 1111 1111 1111 1111  END
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod decode;
pub mod opcode;

pub use decode::{decode_stream, DecodeError, LineDecoder, PaintedSpan, StreamEvent, StreamParser};
pub use opcode::{Opcode, OpcodeError, ProtocolLimits, END_OF_STREAM};
