//! Simulated device viewports.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// The device profile a layout is being designed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    /// Phone portrait screen.
    #[default]
    Phone,
    /// Tablet portrait screen.
    Tablet,
    /// Laptop landscape screen.
    Laptop,
}

/// Physical dimensions of a simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    /// Marketing name of the modelled device.
    pub name: &'static str,
    /// Usable screen width in CSS pixels.
    pub screen_width: u32,
    /// Usable screen height in CSS pixels.
    pub screen_height: u32,
    /// Width including the device frame.
    pub device_width: u32,
    /// Height including the device frame.
    pub device_height: u32,
    /// Whether the frame draws a notch.
    pub has_notch: bool,
    /// Corner radius of the frame.
    pub border_radius: u32,
}

impl Viewport {
    /// All viewports.
    pub const ALL: [Self; 3] = [Self::Phone, Self::Tablet, Self::Laptop];

    /// Name used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Tablet => "tablet",
            Self::Laptop => "laptop",
        }
    }

    /// The device this viewport simulates.
    #[must_use]
    pub const fn profile(self) -> DeviceProfile {
        match self {
            Self::Phone => DeviceProfile {
                name: "iPhone 12 Pro",
                screen_width: 390,
                screen_height: 844,
                device_width: 410,
                device_height: 884,
                has_notch: true,
                border_radius: 25,
            },
            Self::Tablet => DeviceProfile {
                name: "iPad Air",
                screen_width: 820,
                screen_height: 1180,
                device_width: 860,
                device_height: 1220,
                has_notch: false,
                border_radius: 16,
            },
            Self::Laptop => DeviceProfile {
                name: "MacBook Pro 13",
                screen_width: 1280,
                screen_height: 800,
                device_width: 1320,
                device_height: 850,
                has_notch: false,
                border_radius: 8,
            },
        }
    }
}

impl FromStr for Viewport {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| BuilderError::Unsupported(format!("unknown viewport: {s}")))
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_names_round_trip() {
        for viewport in Viewport::ALL {
            assert_eq!(viewport.as_str().parse::<Viewport>().ok(), Some(viewport));
            let json = serde_json::to_string(&viewport).expect("serialize");
            assert_eq!(json, format!("\"{viewport}\""));
        }
        assert!("watch".parse::<Viewport>().is_err());
    }

    #[test]
    fn test_profiles() {
        assert_eq!(Viewport::default(), Viewport::Phone);
        assert_eq!(Viewport::Phone.profile().screen_width, 390);
        assert!(Viewport::Phone.profile().has_notch);
        assert_eq!(Viewport::Laptop.profile().screen_height, 800);
        assert_eq!(Viewport::Tablet.profile().device_height, 1220);
    }
}
