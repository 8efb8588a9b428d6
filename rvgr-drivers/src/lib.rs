//! Transport drivers for the rvgr display controller
//!
//! This crate provides concrete implementations of the
//! [`CommandChannel`](rvgr_hal::CommandChannel) seam defined in rvgr-hal:
//!
//! - Blocking SPI link over `embedded-hal` 1.0 `SpiDevice`
//! - Async SPI link over `embedded-hal-async` 1.0 `SpiDevice`
//! - Feature discovery on the controller (locating the graphics overlay)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod overlay;

#[cfg(test)]
mod mock;

pub use overlay::{
    FeatureStatus, LinkError, OverlayApi, OverlayLink, OverlayLinkAsync, Overlays, MAX_PAYLOAD,
    STREAM_CHUNK,
};
