//! Opcode encoding and decoding
//!
//! Field widths:
//! - SKIP / NEXT LINE / CONTINUE: 13-bit magnitude
//! - JUMP LINE: 12-bit scanline, `0xFFF` excluded (it would read as END)
//! - PAINT: 4-bit colour, 8-bit length

/// Leading bits for SKIP
pub const SKIP_PREFIX: u16 = 0x8000;
/// Leading bits for NEXT LINE
pub const NEXT_LINE_PREFIX: u16 = 0xA000;
/// Leading bits for CONTINUE
pub const CONTINUE_PREFIX: u16 = 0xC000;
/// Leading bits for JUMP LINE
pub const JUMP_LINE_PREFIX: u16 = 0xF000;
/// End of stream marker
pub const END_OF_STREAM: u16 = 0xFFFF;

const PREFIX3_MASK: u16 = 0xE000;
const FIELD13_MASK: u16 = 0x1FFF;
const FIELD12_MASK: u16 = 0x0FFF;

/// Largest cursor advance in one SKIP
pub const MAX_SKIP: u16 = FIELD13_MASK;
/// Largest initial cursor carried by NEXT LINE
pub const MAX_LINE_X: u16 = FIELD13_MASK;
/// Largest extension carried by one CONTINUE
pub const MAX_SPAN: u16 = FIELD13_MASK;
/// Largest scanline addressable by JUMP LINE
pub const MAX_LINE_Y: u16 = FIELD12_MASK - 1;
/// Largest length carried by one PAINT
pub const MAX_RUN: u16 = 0xFF;
/// Largest palette index
pub const MAX_COLOR: u8 = 15;

/// Errors that can occur encoding or decoding a single opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpcodeError {
    /// A field value does not fit its opcode's field width
    FieldOverflow,
    /// Colour index above [`MAX_COLOR`]
    InvalidColor,
    /// Word uses a reserved leading-bit pattern
    Reserved(u16),
}

/// One overlay command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Advance the cursor without painting
    Skip { dx: u16 },
    /// Start the line after the previous one with the cursor at `x`
    NextLine { x: u16 },
    /// Start line `y` with the cursor at 0
    JumpLine { y: u16 },
    /// Extend the current run by `len` pixels in the same colour
    Continue { len: u16 },
    /// Paint `len` pixels in palette colour `color`
    Paint { color: u8, len: u8 },
    /// End of stream
    End,
}

impl Opcode {
    /// Encode into a 16-bit word
    pub fn encode(self) -> Result<u16, OpcodeError> {
        match self {
            Opcode::Skip { dx } => field(SKIP_PREFIX, dx, MAX_SKIP),
            Opcode::NextLine { x } => field(NEXT_LINE_PREFIX, x, MAX_LINE_X),
            Opcode::JumpLine { y } => field(JUMP_LINE_PREFIX, y, MAX_LINE_Y),
            Opcode::Continue { len } => field(CONTINUE_PREFIX, len, MAX_SPAN),
            Opcode::Paint { color, len } => {
                if color > MAX_COLOR {
                    return Err(OpcodeError::InvalidColor);
                }
                Ok(((color as u16) << 8) | len as u16)
            }
            Opcode::End => Ok(END_OF_STREAM),
        }
    }

    /// Decode a 16-bit word
    pub fn decode(word: u16) -> Result<Self, OpcodeError> {
        if word == END_OF_STREAM {
            return Ok(Opcode::End);
        }
        if word & 0x8000 == 0 {
            // PAINT leaves bits 14..12 clear
            if word & 0x7000 != 0 {
                return Err(OpcodeError::Reserved(word));
            }
            return Ok(Opcode::Paint {
                color: (word >> 8) as u8,
                len: word as u8,
            });
        }
        match word & PREFIX3_MASK {
            SKIP_PREFIX => Ok(Opcode::Skip {
                dx: word & FIELD13_MASK,
            }),
            NEXT_LINE_PREFIX => Ok(Opcode::NextLine {
                x: word & FIELD13_MASK,
            }),
            CONTINUE_PREFIX => Ok(Opcode::Continue {
                len: word & FIELD13_MASK,
            }),
            _ if word & 0xF000 == JUMP_LINE_PREFIX => Ok(Opcode::JumpLine {
                y: word & FIELD12_MASK,
            }),
            _ => Err(OpcodeError::Reserved(word)),
        }
    }

    /// Encode into big-endian wire bytes
    pub fn to_bytes(self) -> Result<[u8; 2], OpcodeError> {
        self.encode().map(u16::to_be_bytes)
    }
}

fn field(prefix: u16, value: u16, max: u16) -> Result<u16, OpcodeError> {
    if value > max {
        return Err(OpcodeError::FieldOverflow);
    }
    Ok(prefix | value)
}

/// Per-opcode magnitude limits used when building a stream
///
/// Defaults are the protocol's field maxima. Older overlay builds decode
/// narrower fields; a stream for them is produced by lowering these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolLimits {
    /// Largest SKIP distance
    pub max_skip: u16,
    /// Largest NEXT LINE cursor; lines starting further right use JUMP LINE
    pub max_line_x: u16,
    /// Largest addressable scanline
    pub max_line_y: u16,
    /// Largest PAINT length
    pub max_run: u16,
    /// Largest CONTINUE length
    pub max_span: u16,
}

impl Default for ProtocolLimits {
    fn default() -> Self {
        Self {
            max_skip: MAX_SKIP,
            max_line_x: MAX_LINE_X,
            max_line_y: MAX_LINE_Y,
            max_run: MAX_RUN,
            max_span: MAX_SPAN,
        }
    }
}

impl ProtocolLimits {
    /// Clamp every limit into what the opcode fields can carry
    ///
    /// Magnitude limits are kept at 1 or more so field splitting always
    /// makes progress. `max_line_x` and `max_line_y` may be 0.
    pub fn sanitized(self) -> Self {
        Self {
            max_skip: self.max_skip.clamp(1, MAX_SKIP),
            max_line_x: self.max_line_x.min(MAX_LINE_X),
            max_line_y: self.max_line_y.min(MAX_LINE_Y),
            max_run: self.max_run.clamp(1, MAX_RUN),
            max_span: self.max_span.clamp(1, MAX_SPAN),
        }
    }
}
