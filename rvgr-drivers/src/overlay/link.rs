//! Blocking SPI link

use embedded_hal::spi::{Operation, SpiDevice};
use rvgr_hal::CommandChannel;

use super::discovery::{FeatureStatus, Overlays, FIRST_OVERLAY_FEATURE};
use super::{check_len, feature_address, LinkError, MAX_PAYLOAD};

/// Display controller link over a blocking SPI device
///
/// As a [`CommandChannel`], a command stream is written to the address in
/// its own header.
pub struct OverlayLink<D> {
    spi: D,
}

impl<D: SpiDevice> OverlayLink<D> {
    pub fn new(spi: D) -> Self {
        Self { spi }
    }

    /// Release the SPI device
    pub fn release(self) -> D {
        self.spi
    }

    /// Write `payload` to `address` in one transaction
    pub fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), LinkError<D::Error>> {
        check_len(payload.len())?;
        let addr = address.to_be_bytes();
        self.spi
            .transaction(&mut [Operation::Write(&addr), Operation::Write(payload)])
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("overlay write to {=u16:#x} failed", address);
                LinkError::Spi(e)
            })
    }

    /// Read `buf.len()` bytes from `address` in one transaction
    pub fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), LinkError<D::Error>> {
        check_len(buf.len())?;
        let addr = address.to_be_bytes();
        self.spi
            .transaction(&mut [Operation::Write(&addr), Operation::Read(buf)])
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("overlay read from {=u16:#x} failed", address);
                LinkError::Spi(e)
            })
    }

    /// Read the status byte of `feature`
    pub fn probe_api(&mut self, feature: u8) -> Result<FeatureStatus, LinkError<D::Error>> {
        let mut status = [0u8; 1];
        self.read(feature_address(feature, 0), &mut status)?;
        Ok(FeatureStatus::from_byte(status[0]))
    }

    /// Walk the overlay features
    pub fn discover(&mut self) -> Result<Overlays, LinkError<D::Error>> {
        let mut found = Overlays::default();
        for feature in FIRST_OVERLAY_FEATURE..=u8::MAX {
            let status = self.probe_api(feature)?;
            if !found.record(feature, status) {
                break;
            }
        }
        #[cfg(feature = "defmt")]
        defmt::info!("overlays: {}", found);
        Ok(found)
    }

    /// Address to generate graphics command streams for
    ///
    /// Returns `None` if the controller has no graphics overlay.
    pub fn discover_graphics_overlay(&mut self) -> Result<Option<u16>, LinkError<D::Error>> {
        Ok(self.discover()?.graphics_address())
    }
}

impl<D: SpiDevice> CommandChannel for OverlayLink<D> {
    type Error = LinkError<D::Error>;
    const MAX_WRITE: usize = MAX_PAYLOAD;

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        OverlayLink::write(self, address, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusFault, MockSpi};
    use crate::overlay::STREAM_CHUNK;
    use rvgr_core::{generate, Rect, Shape};
    use rvgr_protocol::{decode_stream, Opcode, PaintedSpan};
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn test_write_frames_address() {
        let mut link = OverlayLink::new(MockSpi::new());
        link.write(0x1234, &[1, 2, 3]).unwrap();

        assert_eq!(link.release().transactions, vec![vec![0x12, 0x34, 1, 2, 3]]);
    }

    #[test]
    fn test_payload_limit() {
        let mut link = OverlayLink::new(MockSpi::new());
        let big = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(link.write(0, &big), Err(LinkError::PayloadTooLarge));
        assert!(link.write(0, &big[..MAX_PAYLOAD]).is_ok());
    }

    #[test]
    fn test_send_chunked_whole_words() {
        let mut link = OverlayLink::new(MockSpi::new());
        let data = [7u8; 300];
        link.send_chunked(0x4500, &data).unwrap();

        let spi = link.release();
        assert_eq!(spi.transactions.len(), 2);
        assert_eq!(spi.transactions[0].len(), 2 + STREAM_CHUNK);
        assert_eq!(&spi.transactions[0][..2], &[0x45, 0x00]);
        assert_eq!(spi.transactions[1].len(), 2 + 300 - STREAM_CHUNK);
    }

    #[test]
    fn test_spi_error_propagates() {
        let mut spi = MockSpi::new();
        spi.fail_at = Some(0);
        let mut link = OverlayLink::new(spi);
        assert_eq!(link.write(0, &[1]), Err(LinkError::Spi(BusFault)));
    }

    #[test]
    fn test_discover_graphics_overlay() {
        // 0x44 text, 0x45 graphics, 0x46 absent
        let spi = MockSpi::new().respond(&[0x30]).respond(&[0x10]).respond(&[0x00]);
        let mut link = OverlayLink::new(spi);

        assert_eq!(link.discover_graphics_overlay(), Ok(Some(0x4500)));

        let spi = link.release();
        assert_eq!(
            spi.transactions,
            vec![vec![0x44, 0x00], vec![0x45, 0x00], vec![0x46, 0x00]]
        );
    }

    #[test]
    fn test_no_graphics_overlay() {
        let spi = MockSpi::new().respond(&[0x30]).respond(&[0x00]);
        let mut link = OverlayLink::new(spi);
        assert_eq!(link.discover_graphics_overlay(), Ok(None));
    }

    #[test]
    fn test_stream_payload_is_opcodes() {
        let shapes = [Shape::from(Rect::new(2, 3, 4, 2, 5).unwrap())];
        let stream = generate(0x4500, &shapes);
        let mut link = OverlayLink::new(MockSpi::new());
        stream.transmit(&mut link).unwrap();

        let spi = link.release();
        assert_eq!(spi.transactions.len(), 1);
        let wire = &spi.transactions[0];
        assert_eq!(&wire[..2], &[0x45, 0x00]);

        // Everything after the SPI address is opcode words
        let payload = &wire[2..];
        assert_eq!(payload, stream.payload());
        let first = u16::from_be_bytes([payload[0], payload[1]]);
        assert_eq!(Opcode::decode(first), Ok(Opcode::JumpLine { y: 3 }));
    }

    #[test]
    fn test_long_stream_reassembles_on_the_wire() {
        // 200 lines of two runs each: several transactions
        let shapes = [
            Shape::from(Rect::new(0, 0, 8, 200, 3).unwrap()),
            Shape::from(Rect::new(20, 0, 8, 200, 4).unwrap()),
        ];
        let stream = generate(0x4500, &shapes);
        let mut link = OverlayLink::new(MockSpi::new());
        stream.transmit(&mut link).unwrap();

        let spi = link.release();
        assert!(spi.transactions.len() > 1);

        // Rebuild the stream as the overlay sees it: address once, then words
        let mut seen: Vec<u8> = vec![0x45, 0x00];
        for t in &spi.transactions {
            assert_eq!(&t[..2], &[0x45, 0x00]);
            assert_eq!((t.len() - 2) % 2, 0);
            assert!(t.len() - 2 <= STREAM_CHUNK);
            seen.extend_from_slice(&t[2..]);
        }
        let mut spans = Vec::new();
        decode_stream(&seen, |s| spans.push(s)).unwrap();
        assert_eq!(spans.len(), 400);
        assert_eq!(spans[1], PaintedSpan { y: 0, x1: 20, x2: 28, color: 4 });
    }
}
