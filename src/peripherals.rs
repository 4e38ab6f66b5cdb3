//! Board peripherals: LED, external power switch, and the collaborator traits
//! for the vendor drivers (display, radio, button, sleep controller).

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::data_types::WakeupCause;
use crate::error::Error;
use crate::pins::{led_percent_to_duty, WakeupSources, LED_DUTY_MAX};

/// PWM-driven user LED.
pub struct Led<P> {
    pwm: P,
    percent: u8,
}

impl<P: SetDutyCycle> Led<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, percent: 0 }
    }

    /// Set brightness in percent (clamped to 100). 0 switches the LED off.
    pub fn set(&mut self, percent: u8) -> Result<(), Error<P::Error>> {
        if percent > 0 {
            let duty = led_percent_to_duty(percent);
            self.pwm
                .set_duty_cycle_fraction(u16::from(duty), u16::from(LED_DUTY_MAX))
                .map_err(Error::Pwm)?;
        } else {
            self.pwm.set_duty_cycle_fully_off().map_err(Error::Pwm)?;
        }
        self.percent = percent.min(100);
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), Error<P::Error>> {
        self.set(0)
    }

    /// Last brightness written.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

/// VEXT switch feeding the external 3V3 rail. Active low; released high the
/// board pull-up keeps it off.
pub struct ExternalPower<P> {
    pin: P,
    enabled: bool,
}

impl<P: OutputPin> ExternalPower<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, enabled: false }
    }

    pub fn set(&mut self, enabled: bool) -> Result<(), Error<P::Error>> {
        if enabled {
            self.pin.set_low().map_err(Error::Pin)?;
        } else {
            self.pin.set_high().map_err(Error::Pin)?;
        }
        self.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn release(self) -> P {
        self.pin
    }
}

/// Placeholder output for lines a board variant does not wire up.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// OLED panel driver. Text written through [`core::fmt::Write`] appears on
/// the panel.
pub trait Display: core::fmt::Write {
    type Error: core::fmt::Debug;

    fn init(&mut self) -> Result<(), Self::Error>;
    fn set_contrast(&mut self, contrast: u8) -> Result<(), Self::Error>;
    fn flip_vertically(&mut self) -> Result<(), Self::Error>;
    fn display_off(&mut self) -> Result<(), Self::Error>;
}

/// Stand-in for boards built without a display. Discards text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl core::fmt::Write for NoDisplay {
    fn write_str(&mut self, _s: &str) -> core::fmt::Result {
        Ok(())
    }
}

impl Display for NoDisplay {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_contrast(&mut self, _contrast: u8) -> Result<(), Infallible> {
        Ok(())
    }

    fn flip_vertically(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn display_off(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// LoRa transceiver driver.
pub trait Radio {
    type Error: core::fmt::Debug;

    fn begin(&mut self) -> Result<(), Self::Error>;
    /// Put the transceiver to sleep; `warm_start` retains its configuration.
    fn sleep(&mut self, warm_start: bool) -> Result<(), Self::Error>;
}

/// Stand-in for boards built without a radio.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRadio;

impl Radio for NoRadio {
    type Error = Infallible;

    fn begin(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn sleep(&mut self, _warm_start: bool) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Debounced 'PRG' button.
pub trait Button {
    /// Sample the pin and advance debounce state.
    fn update(&mut self);
    /// True while the button has been held for at least `ms`.
    fn pressed_for(&self, ms: u32) -> bool;
    /// Block until the button is released.
    fn wait_for_release(&mut self);
}

/// Deep sleep entry and wakeup bookkeeping.
pub trait SleepController {
    type Error: core::fmt::Debug;

    /// Float every board pin that could leak current while asleep.
    fn park_pins(&mut self) -> Result<(), Self::Error>;
    /// Arm `sources`; `timer_us` is only meaningful with [`WakeupSources::TIMER`].
    fn enable_wakeup(&mut self, sources: WakeupSources, timer_us: u64) -> Result<(), Self::Error>;
    /// Enter deep sleep. Does not return on hardware.
    fn start(&mut self) -> Result<(), Self::Error>;
    fn wakeup_cause(&self) -> WakeupCause;
}
