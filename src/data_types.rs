//! Data types shared by the board facade and its collaborators.

use crate::pins::POWER_OFF_LONG_PRESS_MS;

/// Why the chip came out of deep sleep (or booted).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WakeupCause {
    /// EXT0 wakeup from the 'PRG' button.
    Button,
    /// RTC timer expired.
    Timer,
    /// Power-on reset or any other source.
    Other,
}

/// OLED panel geometry.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisplayGeometry {
    G128x64,
    G64x32,
}

impl DisplayGeometry {
    /// Width and height in pixels.
    pub fn size(self) -> (u8, u8) {
        match self {
            DisplayGeometry::G128x64 => (128, 64),
            DisplayGeometry::G64x32 => (64, 32),
        }
    }
}

/// Supported boards in the family.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BoardVariant {
    /// WiFi LoRa 32 V3, 128x64 OLED.
    #[default]
    WifiLora32V3,
    /// Wireless Stick, 64x32 OLED fed from the VEXT rail.
    WirelessStick,
    /// Wireless Stick Lite, no display.
    WirelessStickLite,
}

impl BoardVariant {
    pub fn display_geometry(self) -> Option<DisplayGeometry> {
        match self {
            BoardVariant::WifiLora32V3 => Some(DisplayGeometry::G128x64),
            BoardVariant::WirelessStick => Some(DisplayGeometry::G64x32),
            BoardVariant::WirelessStickLite => None,
        }
    }

    pub fn has_display(self) -> bool {
        self.display_geometry().is_some()
    }

    /// The Wireless Stick hangs its display off VEXT instead of the 3V3 rail.
    pub fn display_on_vext(self) -> bool {
        matches!(self, BoardVariant::WirelessStick)
    }
}

/// Board facade configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoardConfig {
    pub variant: BoardVariant,
    /// Long-press the button to power off; wake from deep sleep on a press.
    pub power_button: bool,
    pub long_press_ms: u32,
    pub display_contrast: u8,
    pub flip_display: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            variant: BoardVariant::default(),
            power_button: false,
            long_press_ms: POWER_OFF_LONG_PRESS_MS,
            display_contrast: 255,
            flip_display: true,
        }
    }
}

impl BoardConfig {
    pub fn with_variant(mut self, variant: BoardVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_power_button(mut self, enabled: bool) -> Self {
        self.power_button = enabled;
        self
    }
}

/// One calibration window of the chip temperature sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TemperatureRange {
    /// Lower bound of the calibrated window (°C).
    pub start: i8,
    /// Upper bound of the calibrated window (°C).
    pub end: i8,
    /// Highest reading (°C) still trusted from this window.
    pub cutoff: i16,
}
