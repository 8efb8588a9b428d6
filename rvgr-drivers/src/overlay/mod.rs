//! Display controller overlay access
//!
//! # Wire format
//!
//! Every access is one SPI transaction with chip select held throughout:
//!
//! ```text
//! write:  ADDR HI | ADDR LO | payload (1-255 bytes)
//! read:   ADDR HI | ADDR LO | <clock in N bytes>
//! ```
//!
//! The address high byte selects a controller feature, the low byte a
//! register within it. Reading a feature's register 0 returns its status
//! byte. A command stream is written to its overlay's address in chunks
//! of whole opcode words, so [`STREAM_CHUNK`] is the largest even payload.
//!
//! The controller samples in SPI mode 0 at up to 8 MHz. The links take an
//! already configured `SpiDevice`.

mod discovery;
mod link;
mod link_async;

pub use discovery::{FeatureStatus, OverlayApi, Overlays, FIRST_OVERLAY_FEATURE};
pub use link::OverlayLink;
pub use link_async::OverlayLinkAsync;

/// Largest payload in one transaction
pub const MAX_PAYLOAD: usize = 255;

/// Largest command stream chunk: `MAX_PAYLOAD` rounded down to whole words
pub const STREAM_CHUNK: usize = rvgr_hal::channel::word_chunk(MAX_PAYLOAD);

/// Errors from an overlay link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Underlying SPI device error
    Spi(E),
    /// Payload longer than [`MAX_PAYLOAD`]
    PayloadTooLarge,
}

/// Address of register `register` of controller feature `feature`
pub const fn feature_address(feature: u8, register: u8) -> u16 {
    ((feature as u16) << 8) | register as u16
}

fn check_len<E>(len: usize) -> Result<(), LinkError<E>> {
    if len > MAX_PAYLOAD {
        return Err(LinkError::PayloadTooLarge);
    }
    Ok(())
}
