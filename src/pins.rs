//! Board constants for the Heltec WiFi LoRa 32 V3 and conversion helpers.
//! GPIO numbers are documentation for wiring a HAL to the collaborator traits;
//! the crate itself never touches a pin by number.

/// 'PRG' button, active low.
pub const BUTTON_GPIO: u8 = 0;
/// White user LED, PWM driven.
pub const LED_GPIO: u8 = 35;
/// External power switch (VEXT), active low.
pub const VEXT_GPIO: u8 = 36;
/// Battery divider enable, active low.
pub const VBAT_CTRL_GPIO: u8 = 37;
/// Battery divider ADC input.
pub const VBAT_ADC_GPIO: u8 = 1;
/// SX1262 DIO1 interrupt line.
pub const RADIO_DIO1_GPIO: u8 = 14;
/// SSD1306 reset line.
pub const OLED_RST_GPIO: u8 = 21;

/// SSD1306 I2C address.
pub const DISPLAY_I2C_ADDRESS: u8 = 0x3C;

/// LED PWM characteristics.
pub const LED_PWM_FREQ_HZ: u32 = 5_000;
pub const LED_PWM_RESOLUTION_BITS: u8 = 8;
pub const LED_DUTY_MAX: u8 = 255;

/// Raw ADC counts per volt at the battery terminal (divider plus ADC scale).
pub const VBAT_ADC_DIVISOR: f32 = 238.7;
/// Settle time after enabling the battery divider.
pub const VBAT_SETTLE_MS: u32 = 5;

/// Display reset pulse timing.
pub const OLED_RESET_PRE_MS: u32 = 1;
pub const OLED_RESET_HOLD_MS: u32 = 20;
/// Wireless Stick display rail settle time after VEXT comes up.
pub const VEXT_SETTLE_MS: u32 = 5;

pub const SERIAL_BAUD: u32 = 115_200;

/// Hold time on the button before the board powers itself off.
pub const POWER_OFF_LONG_PRESS_MS: u32 = 1_000;

bitflags::bitflags! {
    /// Sources armed to bring the chip out of deep sleep.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct WakeupSources: u8 {
        /// EXT0 wakeup on the 'PRG' button going low.
        const BUTTON = 1 << 0;
        /// RTC timer wakeup.
        const TIMER  = 1 << 1;
    }
}

/// Convert LED brightness (%) to an 8-bit duty value. Clamps to 100 %.
pub fn led_percent_to_duty(percent: u8) -> u8 {
    let percent = u16::from(percent.min(100));
    (percent * u16::from(LED_DUTY_MAX) / 100) as u8
}

/// Convert a raw battery ADC sample to volts.
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw) / VBAT_ADC_DIVISOR
}

/// Convert a sleep duration in seconds to the RTC timer wakeup period (µs).
pub fn seconds_to_wakeup_us(seconds: u32) -> u64 {
    u64::from(seconds) * 1_000_000
}
