//! Board facade tying the peripherals together the way a sketch uses them:
//! `setup()` once, `tick()` (or `delay_ms()`) from the main loop, and
//! `deep_sleep()` to power down.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::battery::{BatteryGauge, DischargeCurve, VoltageSource};
use crate::console::Both;
use crate::data_types::{BoardConfig, WakeupCause};
use crate::error::BoardError;
use crate::peripherals::{Button, Display, ExternalPower, Led, Radio, SleepController};
use crate::pins::{
    seconds_to_wakeup_us, WakeupSources, OLED_RESET_HOLD_MS, OLED_RESET_PRE_MS, VEXT_SETTLE_MS,
};
use crate::temperature::{TemperatureEstimator, TemperatureRangeTable, TemperatureSensor};

/// Peripherals handed to [`Heltec::new`].
pub struct BoardParts<LED, VEXT, VBAT, TS, DISP, RST, RADIO, BTN, SLP, D> {
    /// PWM channel on the LED pin.
    pub led: LED,
    /// VEXT switch (open-drain output).
    pub vext: VEXT,
    /// Battery voltage reader, usually a [`crate::VbatMonitor`].
    pub vbat: VBAT,
    pub temperature: TS,
    pub display: DISP,
    /// OLED reset line.
    pub display_reset: RST,
    pub radio: RADIO,
    pub button: BTN,
    pub sleep: SLP,
    pub delay: D,
}

/// Heltec ESP32 LoRa board.
pub struct Heltec<LED, VEXT, VBAT, TS, DISP, RST, RADIO, BTN, SLP, D> {
    config: BoardConfig,
    gauge: BatteryGauge,
    led: Led<LED>,
    vext: ExternalPower<VEXT>,
    vbat: VBAT,
    temperature: TemperatureEstimator<TS>,
    display: DISP,
    display_reset: RST,
    radio: RADIO,
    button: BTN,
    sleep: SLP,
    delay: D,
}

impl<LED, VEXT, VBAT, TS, DISP, RST, RADIO, BTN, SLP, D> Heltec<LED, VEXT, VBAT, TS, DISP, RST, RADIO, BTN, SLP, D>
where
    LED: SetDutyCycle,
    VEXT: OutputPin,
    VBAT: VoltageSource,
    TS: TemperatureSensor,
    DISP: Display,
    RST: OutputPin,
    RADIO: Radio,
    BTN: Button,
    SLP: SleepController,
    D: DelayNs,
{
    /// Create the board with the stock LiPo curve and ESP32 sensor windows.
    pub fn new(config: BoardConfig, parts: BoardParts<LED, VEXT, VBAT, TS, DISP, RST, RADIO, BTN, SLP, D>) -> Self {
        Self {
            config,
            gauge: BatteryGauge::default(),
            led: Led::new(parts.led),
            vext: ExternalPower::new(parts.vext),
            vbat: parts.vbat,
            temperature: TemperatureEstimator::new(parts.temperature),
            display: parts.display,
            display_reset: parts.display_reset,
            radio: parts.radio,
            button: parts.button,
            sleep: parts.sleep,
            delay: parts.delay,
        }
    }

    /// Replace the battery discharge curve.
    pub fn with_discharge_curve(mut self, curve: DischargeCurve) -> Self {
        self.gauge = BatteryGauge::new(curve);
        self
    }

    /// Replace the temperature sensor calibration windows.
    pub fn with_temperature_ranges(mut self, table: TemperatureRangeTable) -> Self {
        self.temperature.set_table(table);
        self
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn display_mut(&mut self) -> &mut DISP {
        &mut self.display
    }

    pub fn radio_mut(&mut self) -> &mut RADIO {
        &mut self.radio
    }

    /// Text sink printing to `serial` and to the display alike. Boards built
    /// with [`crate::peripherals::NoDisplay`] print to `serial` only.
    pub fn console<W: core::fmt::Write>(&mut self, serial: W) -> Both<W, &mut DISP> {
        Both::new(serial, &mut self.display)
    }

    /// Bring up the display (when the variant has one). Call first.
    pub fn setup(&mut self) -> Result<(), BoardError> {
        info!("board setup");
        if !self.config.variant.has_display() {
            return Ok(());
        }
        self.display_power(true)?;
        self.display.init().map_err(|e| BoardError::Display.caused_by(e))?;
        self.display
            .set_contrast(self.config.display_contrast)
            .map_err(|e| BoardError::Display.caused_by(e))?;
        if self.config.flip_display {
            self.display
                .flip_vertically()
                .map_err(|e| BoardError::Display.caused_by(e))?;
        }
        Ok(())
    }

    /// Power the display up (with a reset pulse) or down.
    pub fn display_power(&mut self, on: bool) -> Result<(), BoardError> {
        let variant = self.config.variant;
        if !variant.has_display() {
            return Ok(());
        }
        if !on {
            return if variant.display_on_vext() {
                self.external_power(false)
            } else {
                self.display.display_off().map_err(|e| BoardError::Display.caused_by(e))
            };
        }
        if variant.display_on_vext() {
            self.external_power(true)?;
            self.delay.delay_ms(VEXT_SETTLE_MS);
        }
        self.reset_display().map_err(|e| BoardError::Display.caused_by(e))
    }

    fn reset_display(&mut self) -> Result<(), RST::Error> {
        self.display_reset.set_high()?;
        self.delay.delay_ms(OLED_RESET_PRE_MS);
        self.display_reset.set_low()?;
        self.delay.delay_ms(OLED_RESET_HOLD_MS);
        self.display_reset.set_high()
    }

    /// LED brightness in percent; 0 is off.
    pub fn led(&mut self, percent: u8) -> Result<(), BoardError> {
        self.led.set(percent).map_err(|e| BoardError::Led.caused_by(e))
    }

    /// Switch the external 3V3 rail (VEXT).
    pub fn external_power(&mut self, enabled: bool) -> Result<(), BoardError> {
        self.vext.set(enabled).map_err(|e| BoardError::ExternalPower.caused_by(e))
    }

    /// Battery voltage in volts.
    pub fn vbat(&mut self) -> Result<f32, BoardError> {
        self.vbat.read_voltage().map_err(|e| BoardError::Battery.caused_by(e))
    }

    /// Battery state of charge for `vbat`, measuring it when `None`.
    pub fn battery_percent(&mut self, vbat: Option<f32>) -> Result<u8, BoardError> {
        match vbat {
            Some(vbat) => Ok(self.gauge.percent(vbat)),
            None => self
                .gauge
                .percent_from_source(&mut self.vbat)
                .map_err(|e| BoardError::Battery.caused_by(e)),
        }
    }

    /// Chip temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, BoardError> {
        self.temperature
            .estimate_celsius()
            .map_err(|e| BoardError::Temperature.caused_by(e))
    }

    pub fn wakeup_cause(&self) -> WakeupCause {
        self.sleep.wakeup_cause()
    }

    pub fn wakeup_was_button(&self) -> bool {
        self.wakeup_cause() == WakeupCause::Button
    }

    pub fn wakeup_was_timer(&self) -> bool {
        self.wakeup_cause() == WakeupCause::Timer
    }

    /// Power everything down and enter deep sleep, waking after `seconds`
    /// (0 for no timer) or on a button press if the power button is enabled.
    ///
    /// Shutting down the peripherals is best effort; only failures to arm the
    /// wakeup sources or to enter sleep are returned.
    pub fn deep_sleep(&mut self, seconds: u32) -> Result<(), BoardError> {
        self.power_down();

        let mut sources = WakeupSources::empty();
        if self.config.power_button {
            sources |= WakeupSources::BUTTON;
            // Otherwise the held button wakes us straight back up.
            self.button.wait_for_release();
        }
        let mut timer_us = 0;
        if seconds > 0 {
            sources |= WakeupSources::TIMER;
            timer_us = seconds_to_wakeup_us(seconds);
        }
        info!("entering deep sleep, wakeup sources {}, timer {} s", sources.bits(), seconds);

        if !sources.is_empty() {
            self.sleep
                .enable_wakeup(sources, timer_us)
                .map_err(|e| BoardError::Sleep.caused_by(e))?;
        }
        self.sleep.start().map_err(|e| BoardError::Sleep.caused_by(e))
    }

    fn power_down(&mut self) {
        if self.config.variant.has_display() {
            let _ = self.display.display_off().map_err(|e| BoardError::Display.caused_by(e));
        }
        // An untouched SX1262 ignores a bare sleep command and draws ~800 µA
        // extra, so begin() first. Cold start: it is re-initialised after wakeup.
        let _ = self.radio.begin().map_err(|e| BoardError::Radio.caused_by(e));
        let _ = self.radio.sleep(false).map_err(|e| BoardError::Radio.caused_by(e));
        let _ = self.external_power(false);
        let _ = self.led(0);
        let _ = self.sleep.park_pins().map_err(|e| BoardError::Sleep.caused_by(e));
    }

    /// Service the button. Call every loop iteration; with the power button
    /// enabled a long press powers the board off.
    pub fn tick(&mut self) -> Result<(), BoardError> {
        self.button.update();
        if self.config.power_button && self.button.pressed_for(self.config.long_press_ms) {
            info!("power button held, powering off");
            if self.config.variant.has_display() {
                // Blank at once so the user lets go.
                let _ = self.display.display_off().map_err(|e| BoardError::Display.caused_by(e));
            }
            return self.deep_sleep(0);
        }
        Ok(())
    }

    /// Wait `ms` milliseconds while keeping the button serviced.
    pub fn delay_ms(&mut self, ms: u32) -> Result<(), BoardError> {
        let mut elapsed = 0;
        loop {
            self.tick()?;
            self.delay.delay_ms(1);
            elapsed += 1;
            if elapsed >= ms {
                return Ok(());
            }
        }
    }
}
