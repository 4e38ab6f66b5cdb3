//! Error definitions for the board support layer.

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub enum Error<E> {
    /// Driving a GPIO failed.
    Pin(E),
    /// Updating a PWM channel failed.
    Pwm(E),
    /// The chip temperature sensor driver reported a failure.
    Sensor(E),
    /// A discharge curve or temperature range table failed validation.
    InvalidConfig,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Pin(e) => write!(f, "GPIO error: {:?}", e),
            Error::Pwm(e) => write!(f, "PWM error: {:?}", e),
            Error::Sensor(e) => write!(f, "temperature sensor error: {:?}", e),
            Error::InvalidConfig => write!(f, "invalid calibration data"),
        }
    }
}

/// Failure of a board-level operation, naming the subsystem that failed.
///
/// Board operations touch several collaborators with unrelated error types;
/// the concrete error is logged where it happens and collapsed into this.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoardError {
    Led,
    ExternalPower,
    Battery,
    Temperature,
    Display,
    Radio,
    Sleep,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            BoardError::Led => "LED",
            BoardError::ExternalPower => "external power (VEXT)",
            BoardError::Battery => "battery voltage measurement",
            BoardError::Temperature => "chip temperature sensor",
            BoardError::Display => "display",
            BoardError::Radio => "radio",
            BoardError::Sleep => "deep sleep",
        };
        write!(f, "{} failed", name)
    }
}

impl BoardError {
    /// Log `err` as the cause of this failure and return `self`.
    pub(crate) fn caused_by<E: core::fmt::Debug>(self, err: E) -> Self {
        #[cfg(feature = "defmt")]
        defmt::warn!("{}: {}", self, defmt::Debug2Format(&err));
        #[cfg(feature = "log")]
        log::warn!("{}: {:?}", self, err);
        #[cfg(not(any(feature = "defmt", feature = "log")))]
        let _ = err;
        self
    }
}
