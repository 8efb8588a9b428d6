//! Stream decoding
//!
//! The overlay consumes the stream byte by byte. [`StreamParser`] mirrors
//! that: it takes one byte at a time and yields the target address and
//! then each opcode. [`LineDecoder`] tracks the line and cursor the same
//! way the overlay does and turns opcodes into painted spans.

use crate::opcode::{Opcode, OpcodeError};

/// Errors that can occur while decoding a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// A word could not be decoded
    Opcode(OpcodeError),
    /// Cursor or paint opcode before any line was started
    NoLine,
    /// CONTINUE not directly after PAINT or CONTINUE
    NoRun,
    /// NEXT LINE past the last addressable scanline
    LineOverflow,
    /// Cursor moved past the 16-bit coordinate range
    CursorOverflow,
    /// Bytes after the end marker
    TrailingData,
    /// Stream ended without an end marker
    Incomplete,
}

impl From<OpcodeError> for DecodeError {
    fn from(e: OpcodeError) -> Self {
        DecodeError::Opcode(e)
    }
}

/// Item produced by [`StreamParser`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamEvent {
    /// Target address header
    Address(u16),
    /// One opcode
    Opcode(Opcode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for address high byte
    AddressHigh,
    /// Got high byte, waiting for low byte
    AddressLow(u8),
    /// Waiting for opcode high byte
    OpcodeHigh,
    /// Got high byte, waiting for low byte
    OpcodeLow(u8),
    /// End marker seen
    Done,
}

/// Byte-fed stream parser
#[derive(Debug, Clone)]
pub struct StreamParser {
    state: ParseState,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    /// Create a parser expecting an address header
    pub fn new() -> Self {
        Self {
            state: ParseState::AddressHigh,
        }
    }

    /// Reset to expect a new stream
    pub fn reset(&mut self) {
        self.state = ParseState::AddressHigh;
    }

    /// Whether the end marker has been seen
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(event))` when a header or opcode completes,
    /// `Ok(None)` when more bytes are needed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<StreamEvent>, DecodeError> {
        match self.state {
            ParseState::AddressHigh => {
                self.state = ParseState::AddressLow(byte);
                Ok(None)
            }
            ParseState::AddressLow(high) => {
                self.state = ParseState::OpcodeHigh;
                Ok(Some(StreamEvent::Address(u16::from_be_bytes([high, byte]))))
            }
            ParseState::OpcodeHigh => {
                self.state = ParseState::OpcodeLow(byte);
                Ok(None)
            }
            ParseState::OpcodeLow(high) => {
                let op = Opcode::decode(u16::from_be_bytes([high, byte]))?;
                self.state = if op == Opcode::End {
                    ParseState::Done
                } else {
                    ParseState::OpcodeHigh
                };
                Ok(Some(StreamEvent::Opcode(op)))
            }
            ParseState::Done => Err(DecodeError::TrailingData),
        }
    }
}

/// A horizontal interval painted by the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaintedSpan {
    /// Scanline
    pub y: u16,
    /// First painted pixel
    pub x1: u16,
    /// One past the last painted pixel
    pub x2: u16,
    /// Palette index
    pub color: u8,
}

/// Line and cursor state of the overlay's run engine
#[derive(Debug, Clone, Default)]
pub struct LineDecoder {
    line: Option<u16>,
    cursor: u16,
    run_color: Option<u8>,
}

impl LineDecoder {
    /// Create a decoder with no current line
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scanline, if one has been started
    pub fn line(&self) -> Option<u16> {
        self.line
    }

    /// Current cursor position
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    /// Apply one opcode
    ///
    /// Returns the span painted by PAINT or CONTINUE, if non-empty.
    pub fn apply(&mut self, op: Opcode) -> Result<Option<PaintedSpan>, DecodeError> {
        let run_color = self.run_color.take();
        match op {
            Opcode::Skip { dx } => {
                self.require_line()?;
                self.advance(dx)?;
                Ok(None)
            }
            Opcode::NextLine { x } => {
                let y = self.require_line()?;
                let next = y.checked_add(1).ok_or(DecodeError::LineOverflow)?;
                self.line = Some(next);
                self.cursor = x;
                Ok(None)
            }
            Opcode::JumpLine { y } => {
                self.line = Some(y);
                self.cursor = 0;
                Ok(None)
            }
            Opcode::Paint { color, len } => {
                self.run_color = Some(color);
                self.paint(color, len as u16)
            }
            Opcode::Continue { len } => {
                let color = run_color.ok_or(DecodeError::NoRun)?;
                self.run_color = Some(color);
                self.paint(color, len)
            }
            Opcode::End => Ok(None),
        }
    }

    fn require_line(&self) -> Result<u16, DecodeError> {
        self.line.ok_or(DecodeError::NoLine)
    }

    fn advance(&mut self, by: u16) -> Result<(), DecodeError> {
        self.cursor = self
            .cursor
            .checked_add(by)
            .ok_or(DecodeError::CursorOverflow)?;
        Ok(())
    }

    fn paint(&mut self, color: u8, len: u16) -> Result<Option<PaintedSpan>, DecodeError> {
        let y = self.require_line()?;
        let x1 = self.cursor;
        self.advance(len)?;
        if len == 0 {
            return Ok(None);
        }
        Ok(Some(PaintedSpan {
            y,
            x1,
            x2: self.cursor,
            color,
        }))
    }
}

/// Decode a complete stream, passing every painted span to `on_span`
///
/// Returns the target address from the header. The stream must end with
/// the end marker and carry nothing after it.
pub fn decode_stream<F>(bytes: &[u8], mut on_span: F) -> Result<u16, DecodeError>
where
    F: FnMut(PaintedSpan),
{
    let mut parser = StreamParser::new();
    let mut lines = LineDecoder::new();
    let mut address = None;

    for &byte in bytes {
        match parser.feed(byte)? {
            Some(StreamEvent::Address(addr)) => address = Some(addr),
            Some(StreamEvent::Opcode(op)) => {
                if let Some(span) = lines.apply(op)? {
                    on_span(span);
                }
            }
            None => {}
        }
    }

    match address {
        Some(addr) if parser.is_done() => Ok(addr),
        _ => Err(DecodeError::Incomplete),
    }
}
