//! Command stream buffer

use alloc::vec::Vec;

use rvgr_hal::CommandChannel;
use rvgr_protocol::END_OF_STREAM;

/// Size of the address header
pub const HEADER_LEN: usize = 2;

/// Encoded command stream, ready to send to the overlay
///
/// Two big-endian address bytes followed by big-endian 16-bit opcodes.
/// A stream produced by [`generate`](crate::generate) always ends with the
/// end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStream {
    bytes: Vec<u8>,
}

impl CommandStream {
    /// Start a stream targeting `address`
    pub(crate) fn with_address(address: u16) -> Self {
        let mut bytes = Vec::with_capacity(64);
        bytes.extend_from_slice(&address.to_be_bytes());
        Self { bytes }
    }

    pub(crate) fn push_word(&mut self, word: u16) {
        self.bytes.extend_from_slice(&word.to_be_bytes());
    }

    /// Target address from the header
    pub fn address(&self) -> u16 {
        u16::from_be_bytes([self.bytes[0], self.bytes[1]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes, header included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the stream carries no opcodes at all
    pub fn is_empty(&self) -> bool {
        self.bytes.len() <= HEADER_LEN
    }

    /// Opcode bytes after the header
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Opcode words after the header, end marker included
    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        self.bytes[HEADER_LEN..]
            .chunks_exact(2)
            .map(|w| u16::from_be_bytes([w[0], w[1]]))
    }

    /// Whether the last word is the end marker
    pub fn is_terminated(&self) -> bool {
        self.words().last() == Some(END_OF_STREAM)
    }

    /// Send the stream through `channel`
    ///
    /// The header is the write address; only the opcodes travel as
    /// payload, in whole-word chunks no larger than the channel accepts.
    /// Stops at the first failed write.
    pub fn transmit<C: CommandChannel>(&self, channel: &mut C) -> Result<(), C::Error> {
        channel.send_chunked(self.address(), self.payload())
    }
}

impl AsRef<[u8]> for CommandStream {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Capture {
        writes: Vec<(u16, Vec<u8>)>,
    }

    impl CommandChannel for Capture {
        type Error = ();
        const MAX_WRITE: usize = 3;

        fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), ()> {
            self.writes.push((address, payload.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_header_and_words() {
        let mut s = CommandStream::with_address(0x1234);
        assert!(s.is_empty());
        s.push_word(0x0504);
        s.push_word(END_OF_STREAM);

        assert_eq!(s.address(), 0x1234);
        assert_eq!(s.as_bytes(), &[0x12, 0x34, 0x05, 0x04, 0xFF, 0xFF]);
        assert_eq!(s.words().collect::<Vec<_>>(), [0x0504, 0xFFFF]);
        assert!(s.is_terminated());
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn test_transmit_addresses_header_and_sends_words() {
        let mut s = CommandStream::with_address(0x4500);
        s.push_word(0x0102);
        s.push_word(END_OF_STREAM);
        assert_eq!(s.payload(), &[0x01, 0x02, 0xFF, 0xFF]);

        let mut channel = Capture { writes: Vec::new() };
        s.transmit(&mut channel).unwrap();

        // Header never repeats as payload; odd channel limit rounds down to one word
        assert_eq!(
            channel.writes,
            [(0x4500, alloc::vec![0x01, 0x02]), (0x4500, alloc::vec![0xFF, 0xFF])]
        );
    }
}
