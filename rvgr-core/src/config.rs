//! Compiler configuration
//!
//! [`RasterConfig`] bundles the opcode field limits with the run filter.
//! With the `serde` feature it can be persisted as postcard binary.

use rvgr_protocol::ProtocolLimits;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stored bytes could not be decoded
    Deserialize,
    /// Output buffer too small
    BufferTooSmall,
}

/// Settings for one [`generate_with`](crate::generate_with) call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterConfig {
    /// Opcode field limits for the target overlay
    pub limits: ProtocolLimits,
    /// Runs narrower than this are dropped after merging
    pub min_run_width: u16,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            limits: ProtocolLimits::default(),
            min_run_width: 1,
        }
    }
}

impl RasterConfig {
    /// Configuration targeting an overlay with narrower fields
    pub fn with_limits(limits: ProtocolLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Clamp every setting into its usable range
    pub fn sanitized(self) -> Self {
        Self {
            limits: self.limits.sanitized(),
            min_run_width: self.min_run_width.max(1),
        }
    }
}

#[cfg(feature = "serde")]
impl RasterConfig {
    /// Decode a stored configuration; the result is already sanitised
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes::<RasterConfig>(bytes)
            .map(RasterConfig::sanitized)
            .map_err(|_| ConfigError::Deserialize)
    }

    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)
    }
}
