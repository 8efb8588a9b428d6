//! Async SPI link
//!
//! Same framing as [`OverlayLink`](super::OverlayLink) over an
//! `embedded-hal-async` device. Command streams are sent with
//! [`send_stream`](OverlayLinkAsync::send_stream) in [`STREAM_CHUNK`]
//! pieces to the address in the stream header.

use embedded_hal_async::spi::{Operation, SpiDevice};
use rvgr_core::CommandStream;

use super::discovery::{FeatureStatus, Overlays, FIRST_OVERLAY_FEATURE};
use super::{check_len, feature_address, LinkError, STREAM_CHUNK};

/// Display controller link over an async SPI device
pub struct OverlayLinkAsync<D> {
    spi: D,
}

impl<D: SpiDevice> OverlayLinkAsync<D> {
    pub fn new(spi: D) -> Self {
        Self { spi }
    }

    pub fn release(self) -> D {
        self.spi
    }

    /// Write `payload` to `address` in one transaction
    pub async fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), LinkError<D::Error>> {
        check_len(payload.len())?;
        let addr = address.to_be_bytes();
        self.spi
            .transaction(&mut [Operation::Write(&addr), Operation::Write(payload)])
            .await
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("overlay write to {=u16:#x} failed", address);
                LinkError::Spi(e)
            })
    }

    /// Read `buf.len()` bytes from `address` in one transaction
    pub async fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), LinkError<D::Error>> {
        check_len(buf.len())?;
        let addr = address.to_be_bytes();
        self.spi
            .transaction(&mut [Operation::Write(&addr), Operation::Read(buf)])
            .await
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("overlay read from {=u16:#x} failed", address);
                LinkError::Spi(e)
            })
    }

    /// Send `payload` to `address` in whole-word chunks
    pub async fn send(&mut self, address: u16, payload: &[u8]) -> Result<(), LinkError<D::Error>> {
        for chunk in payload.chunks(STREAM_CHUNK) {
            self.write(address, chunk).await?;
        }
        Ok(())
    }

    /// Send a command stream's opcodes to the address in its header
    pub async fn send_stream(&mut self, stream: &CommandStream) -> Result<(), LinkError<D::Error>> {
        self.send(stream.address(), stream.payload()).await
    }

    pub async fn probe_api(&mut self, feature: u8) -> Result<FeatureStatus, LinkError<D::Error>> {
        let mut status = [0u8; 1];
        self.read(feature_address(feature, 0), &mut status).await?;
        Ok(FeatureStatus::from_byte(status[0]))
    }

    /// Walk the overlay features
    pub async fn discover(&mut self) -> Result<Overlays, LinkError<D::Error>> {
        let mut found = Overlays::default();
        for feature in FIRST_OVERLAY_FEATURE..=u8::MAX {
            let status = self.probe_api(feature).await?;
            if !found.record(feature, status) {
                break;
            }
        }
        #[cfg(feature = "defmt")]
        defmt::info!("overlays: {}", found);
        Ok(found)
    }

    /// Address to generate graphics command streams for
    pub async fn discover_graphics_overlay(&mut self) -> Result<Option<u16>, LinkError<D::Error>> {
        Ok(self.discover().await?.graphics_address())
    }
}
