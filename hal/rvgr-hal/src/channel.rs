//! Command channel abstraction
//!
//! The display controller accepts addressed writes of a bounded size.
//! Anything that can deliver such a write implements [`CommandChannel`].

/// Addressed, byte-oriented write path into the display controller
///
/// One call to [`write`](CommandChannel::write) is one write transaction
/// on the wire. Implementations reject payloads longer than
/// [`MAX_WRITE`](CommandChannel::MAX_WRITE); callers split larger streams.
pub trait CommandChannel {
    /// Error type for channel operations
    type Error;

    /// Largest payload accepted by a single `write`
    const MAX_WRITE: usize;

    /// Deliver `payload` to `address` in one transaction
    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error>;

    /// Deliver `payload` to `address` as consecutive writes
    ///
    /// Chunks hold a whole number of 16-bit words, so no opcode is split
    /// across transactions. Stops at the first failed write. An empty
    /// payload sends nothing.
    fn send_chunked(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        for part in payload.chunks(word_chunk(Self::MAX_WRITE)) {
            self.write(address, part)?;
        }
        Ok(())
    }
}

/// Largest even chunk no bigger than `max_write`, at least one word
pub const fn word_chunk(max_write: usize) -> usize {
    let even = max_write & !1;
    if even < 2 {
        2
    } else {
        even
    }
}

impl<T: CommandChannel + ?Sized> CommandChannel for &mut T {
    type Error = T::Error;
    const MAX_WRITE: usize = T::MAX_WRITE;

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, payload)
    }
}
