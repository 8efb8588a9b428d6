//! Overlay feature discovery
//!
//! Overlay features occupy consecutive feature ids from
//! [`FIRST_OVERLAY_FEATURE`]. Probing walks them until one reports
//! absent; each present feature's API number says what kind of overlay
//! it is.

/// Feature id of the first overlay slot
pub const FIRST_OVERLAY_FEATURE: u8 = 0x44;

/// Status bit: feature present
const PRESENT_BIT: u8 = 0x10;

/// Status bits 7..5: API number
const API_SHIFT: u8 = 5;

/// Decoded feature status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeatureStatus {
    pub present: bool,
    pub api: u8,
}

impl FeatureStatus {
    pub fn from_byte(status: u8) -> Self {
        Self {
            present: status & PRESENT_BIT != 0,
            api: status >> API_SHIFT,
        }
    }
}

/// Kind of overlay behind a feature id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverlayApi {
    /// Run-length graphics overlay, fed by rvgr command streams
    Graphics,
    /// Character overlay
    Text,
    /// API this crate does not know
    Unknown(u8),
}

impl From<u8> for OverlayApi {
    fn from(api: u8) -> Self {
        match api {
            0 => OverlayApi::Graphics,
            1 => OverlayApi::Text,
            other => OverlayApi::Unknown(other),
        }
    }
}

/// Overlay features found on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overlays {
    /// Feature id of the graphics overlay
    pub graphics: Option<u8>,
    /// Feature id of the text overlay
    pub text: Option<u8>,
}

impl Overlays {
    /// Record the probe result for `feature`
    ///
    /// Returns `false` once the feature is absent and the walk should stop.
    /// When several features share an API the last one found is kept.
    pub(crate) fn record(&mut self, feature: u8, status: FeatureStatus) -> bool {
        if !status.present {
            return false;
        }
        match OverlayApi::from(status.api) {
            OverlayApi::Graphics => self.graphics = Some(feature),
            OverlayApi::Text => self.text = Some(feature),
            OverlayApi::Unknown(_api) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("feature {=u8:#x}: unknown overlay api {}", feature, _api);
            }
        }
        true
    }

    /// Command stream target address of the graphics overlay
    pub fn graphics_address(&self) -> Option<u16> {
        self.graphics.map(|f| super::feature_address(f, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bits() {
        assert_eq!(
            FeatureStatus::from_byte(0x10),
            FeatureStatus { present: true, api: 0 }
        );
        assert_eq!(
            FeatureStatus::from_byte(0x30),
            FeatureStatus { present: true, api: 1 }
        );
        assert_eq!(
            FeatureStatus::from_byte(0xE0),
            FeatureStatus { present: false, api: 7 }
        );
    }

    #[test]
    fn test_api_kinds() {
        assert_eq!(OverlayApi::from(0), OverlayApi::Graphics);
        assert_eq!(OverlayApi::from(1), OverlayApi::Text);
        assert_eq!(OverlayApi::from(5), OverlayApi::Unknown(5));
    }

    #[test]
    fn test_record_stops_on_absent() {
        let mut found = Overlays::default();
        assert!(found.record(0x44, FeatureStatus::from_byte(0x30)));
        assert!(found.record(0x45, FeatureStatus::from_byte(0x10)));
        assert!(!found.record(0x46, FeatureStatus::from_byte(0x00)));

        assert_eq!(found.text, Some(0x44));
        assert_eq!(found.graphics, Some(0x45));
        assert_eq!(found.graphics_address(), Some(0x4500));
    }

    #[test]
    fn test_last_graphics_overlay_wins() {
        let mut found = Overlays::default();
        assert!(found.record(0x44, FeatureStatus::from_byte(0x10)));
        assert!(found.record(0x45, FeatureStatus::from_byte(0x30)));
        assert!(found.record(0x46, FeatureStatus::from_byte(0x10)));

        assert_eq!(found.graphics_address(), Some(0x4600));
        assert_eq!(found.text, Some(0x45));
    }
}
