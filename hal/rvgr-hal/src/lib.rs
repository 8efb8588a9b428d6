//! rvgr Hardware Abstraction Layer
//!
//! This crate defines the one hardware seam the rvgr compiler needs: an
//! addressed, byte-oriented command channel into the display controller.
//! Concrete transports (SPI today) live in `rvgr-drivers`; the compiler
//! itself only ever talks to [`CommandChannel`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rvgr-core (shapes → CommandStream)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rvgr-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ OverlayLink   │       │ test doubles  │
//! │ (SPI device)  │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`channel::CommandChannel`] - bounded-size writes to a controller address

#![no_std]
#![deny(unsafe_code)]

pub mod channel;

// Re-export key traits at crate root for convenience
pub use channel::CommandChannel;
