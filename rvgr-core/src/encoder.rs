//! Command encoder
//!
//! Turns resolved runs into opcodes. The encoder remembers the last line
//! it framed and where the overlay's cursor stands, so each line starts
//! with the cheapest framing opcode and each run with the shortest skip.

use rvgr_protocol::{Opcode, ProtocolLimits};

use crate::runs::Run;
use crate::stream::CommandStream;

/// Opcode writer for one stream
#[derive(Debug)]
pub struct CommandEncoder {
    stream: CommandStream,
    limits: ProtocolLimits,
    prev_line: Option<u16>,
    cursor: u16,
    lines: u32,
    opcodes: u32,
}

impl CommandEncoder {
    /// Begin a stream targeting `address`
    pub fn begin(address: u16, limits: ProtocolLimits) -> Self {
        Self {
            stream: CommandStream::with_address(address),
            limits: limits.sanitized(),
            prev_line: None,
            cursor: 0,
            lines: 0,
            opcodes: 0,
        }
    }

    pub fn limits(&self) -> &ProtocolLimits {
        &self.limits
    }

    /// Scanlines framed so far
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Opcodes written so far, end marker included once written
    pub fn opcodes(&self) -> u32 {
        self.opcodes
    }

    /// Whether scanline `y` can be framed at all
    pub fn addressable(&self, y: i32) -> bool {
        (0..=self.limits.max_line_y as i32).contains(&y)
    }

    /// Encode one scanline
    ///
    /// `runs` must be strictly increasing and non-overlapping. Lines with
    /// no runs produce no opcodes. The caller checks
    /// [`addressable`](Self::addressable) first; an unaddressable line is
    /// ignored.
    pub fn encode_line(&mut self, y: u16, runs: &[Run]) {
        let Some(first) = runs.first() else {
            return;
        };
        if y > self.limits.max_line_y {
            return;
        }

        let follows = self.prev_line.map_or(false, |prev| prev.wrapping_add(1) == y);
        if follows && first.x1 <= self.limits.max_line_x {
            self.emit(Opcode::NextLine { x: first.x1 });
            self.cursor = first.x1;
        } else {
            self.emit(Opcode::JumpLine { y });
            self.cursor = 0;
        }
        self.prev_line = Some(y);
        self.lines += 1;

        for run in runs {
            self.encode_run(run);
        }
    }

    fn encode_run(&mut self, run: &Run) {
        debug_assert!(run.x1 >= self.cursor);
        let mut gap = run.x1.saturating_sub(self.cursor);
        while gap > 0 {
            let dx = gap.min(self.limits.max_skip);
            self.emit(Opcode::Skip { dx });
            gap -= dx;
        }

        let mut left = run.len();
        if left > 0 {
            let len = left.min(self.limits.max_run);
            self.emit(Opcode::Paint {
                color: run.color,
                len: len as u8,
            });
            left -= len;
        }
        while left > 0 {
            let len = left.min(self.limits.max_span);
            self.emit(Opcode::Continue { len });
            left -= len;
        }

        self.cursor = run.x2;
    }

    fn emit(&mut self, op: Opcode) {
        match op.encode() {
            Ok(word) => {
                self.stream.push_word(word);
                self.opcodes += 1;
            }
            Err(_e) => {
                debug_assert!(false, "encoder built an invalid opcode");
                #[cfg(feature = "defmt")]
                defmt::error!("invalid opcode dropped: {}", _e);
            }
        }
    }

    /// Write the end marker and hand back the stream
    pub fn finish(mut self) -> CommandStream {
        self.emit(Opcode::End);
        self.stream
    }

    /// Counters and stream, for callers that report statistics
    pub(crate) fn finish_counted(mut self) -> (CommandStream, u32, u32) {
        self.emit(Opcode::End);
        (self.stream, self.lines, self.opcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn run(x1: u16, x2: u16, color: u8) -> Run {
        Run { x1, x2, color }
    }

    fn words(stream: &CommandStream) -> Vec<u16> {
        stream.words().collect()
    }

    #[test]
    fn test_first_line_jumps() {
        let mut enc = CommandEncoder::begin(0x1000, ProtocolLimits::default());
        enc.encode_line(3, &[run(2, 6, 5)]);
        let stream = enc.finish();

        assert_eq!(words(&stream), [0xF003, 0x8002, 0x0504, 0xFFFF]);
    }

    #[test]
    fn test_following_line_uses_next_line() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(3, &[run(2, 6, 5)]);
        enc.encode_line(4, &[run(2, 6, 5)]);
        let stream = enc.finish();

        assert_eq!(
            words(&stream),
            [0xF003, 0x8002, 0x0504, 0xA002, 0x0504, 0xFFFF]
        );
    }

    #[test]
    fn test_gap_in_lines_jumps() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(1, &[run(0, 1, 1)]);
        enc.encode_line(5, &[run(0, 1, 1)]);
        let stream = enc.finish();

        assert_eq!(words(&stream), [0xF001, 0x0101, 0xF005, 0x0101, 0xFFFF]);
    }

    #[test]
    fn test_next_line_cursor_limit() {
        let limits = ProtocolLimits {
            max_line_x: 4,
            ..ProtocolLimits::default()
        };
        let mut enc = CommandEncoder::begin(0, limits);
        enc.encode_line(0, &[run(0, 1, 1)]);
        enc.encode_line(1, &[run(10, 11, 1)]);
        let stream = enc.finish();

        assert_eq!(words(&stream), [0xF000, 0x0101, 0xF001, 0x800A, 0x0101, 0xFFFF]);
    }

    #[test]
    fn test_empty_line_emits_nothing() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(2, &[]);
        assert_eq!(enc.lines(), 0);
        assert_eq!(words(&enc.finish()), [0xFFFF]);
    }

    #[test]
    fn test_long_run_split() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(0, &[run(0, 600, 2)]);
        let stream = enc.finish();

        // 255 painted, then the remaining 345 in one continue
        assert_eq!(words(&stream), [0xF000, 0x02FF, 0xC159, 0xFFFF]);
    }

    #[test]
    fn test_lowered_limits_split_every_field() {
        let limits = ProtocolLimits {
            max_skip: 4,
            max_run: 3,
            max_span: 2,
            ..ProtocolLimits::default()
        };
        let mut enc = CommandEncoder::begin(0, limits);
        enc.encode_line(0, &[run(10, 18, 1)]);
        let stream = enc.finish();

        assert_eq!(
            words(&stream),
            [0xF000, 0x8004, 0x8004, 0x8002, 0x0103, 0xC002, 0xC002, 0xC001, 0xFFFF]
        );
    }

    #[test]
    fn test_cursor_carries_between_runs() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(0, &[run(2, 4, 1), run(4, 6, 2), run(9, 10, 3)]);
        let stream = enc.finish();

        assert_eq!(
            words(&stream),
            [0xF000, 0x8002, 0x0102, 0x0202, 0x8003, 0x0301, 0xFFFF]
        );
    }

    #[test]
    fn test_unaddressable_line_ignored() {
        let limits = ProtocolLimits {
            max_line_y: 10,
            ..ProtocolLimits::default()
        };
        let mut enc = CommandEncoder::begin(0, limits);
        assert!(enc.addressable(10));
        assert!(!enc.addressable(11));
        assert!(!enc.addressable(-1));
        enc.encode_line(11, &[run(0, 1, 1)]);
        assert_eq!(words(&enc.finish()), [0xFFFF]);
    }

    #[test]
    fn test_counts() {
        let mut enc = CommandEncoder::begin(0, ProtocolLimits::default());
        enc.encode_line(0, &[run(0, 1, 1)]);
        enc.encode_line(1, &[run(0, 1, 1)]);
        let (stream, lines, opcodes) = enc.finish_counted();
        assert_eq!(lines, 2);
        assert_eq!(opcodes, 5);
        assert_eq!(stream.words().count(), 5);
    }
}
