//! Battery voltage measurement and state-of-charge estimation.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::Error;
use crate::pins::{adc_to_volts, VBAT_SETTLE_MS};

/// Number of percentile points in a discharge curve.
pub const CURVE_POINTS: usize = 100;

/// Divisions of the voltage span used by the curve entries.
const CURVE_STEPS: f32 = 256.0;

/// Empirical discharge curve of a cell.
///
/// Entry `n` is the average terminal voltage after `n` percent of the discharge
/// time, expressed in 1/256 steps between `min_voltage` and `max_voltage`.
/// Entries are expected to be non-increasing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DischargeCurve {
    min_voltage: f32,
    max_voltage: f32,
    scaled: [u8; CURVE_POINTS],
}

impl DischargeCurve {
    /// Single-cell LiPo, measured on a WiFi LoRa 32 V3 discharging at constant load.
    #[rustfmt::skip]
    pub const LIPO_1S: DischargeCurve = DischargeCurve {
        min_voltage: 3.04,
        max_voltage: 4.26,
        scaled: [
            254, 242, 230, 227, 223, 219, 215, 213, 210, 207,
            206, 202, 202, 200, 200, 199, 198, 198, 196, 196,
            195, 195, 194, 192, 191, 188, 187, 185, 185, 185,
            183, 182, 180, 179, 178, 175, 175, 174, 172, 171,
            170, 169, 168, 166, 166, 165, 165, 164, 161, 161,
            159, 158, 158, 157, 156, 155, 151, 148, 147, 145,
            143, 142, 140, 140, 136, 132, 130, 130, 129, 126,
            125, 124, 121, 120, 118, 116, 115, 114, 112, 112,
            110, 110, 108, 106, 106, 104, 102, 101, 99, 97,
            94, 90, 81, 80, 76, 73, 66, 52, 32, 7,
        ],
    };

    /// Build a curve from measured data. Fails with [`Error::InvalidConfig`]
    /// unless both bounds are finite and `min_voltage < max_voltage`.
    pub fn new(
        min_voltage: f32,
        max_voltage: f32,
        scaled: [u8; CURVE_POINTS],
    ) -> Result<Self, Error<Infallible>> {
        if !min_voltage.is_finite() || !max_voltage.is_finite() || min_voltage >= max_voltage {
            return Err(Error::InvalidConfig);
        }
        Ok(Self {
            min_voltage,
            max_voltage,
            scaled,
        })
    }

    pub fn min_voltage(&self) -> f32 {
        self.min_voltage
    }

    pub fn max_voltage(&self) -> f32 {
        self.max_voltage
    }

    pub fn points(&self) -> &[u8; CURVE_POINTS] {
        &self.scaled
    }

    /// Voltage span covered by one curve unit.
    pub fn step(&self) -> f32 {
        (self.max_voltage - self.min_voltage) / CURVE_STEPS
    }

    /// Terminal voltage at curve point `n`, or `None` past the last point.
    pub fn threshold(&self, n: usize) -> Option<f32> {
        let scaled = self.scaled.get(n)?;
        Some(self.min_voltage + self.step() * f32::from(*scaled))
    }

    /// True when the entries never rise with the percentile index.
    pub fn is_monotonic(&self) -> bool {
        self.scaled.windows(2).all(|w| w[0] >= w[1])
    }
}

impl Default for DischargeCurve {
    fn default() -> Self {
        Self::LIPO_1S
    }
}

/// Anything that can report the battery terminal voltage.
pub trait VoltageSource {
    type Error: core::fmt::Debug;

    /// Measure the battery voltage in volts.
    fn read_voltage(&mut self) -> Result<f32, Self::Error>;
}

/// A single ADC channel returning raw counts.
pub trait AdcChannel {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Converts battery voltage into state of charge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatteryGauge {
    curve: DischargeCurve,
}

impl BatteryGauge {
    pub fn new(curve: DischargeCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &DischargeCurve {
        &self.curve
    }

    /// State of charge (0..=100 %) for a battery voltage.
    ///
    /// Returns `100 - n` for the first curve point `n` whose voltage lies below
    /// `vbat`, or 0 when `vbat` is at or below every point. No interpolation is
    /// done between points.
    pub fn percent(&self, vbat: f32) -> u8 {
        let curve = &self.curve;
        let step = curve.step();
        curve
            .scaled
            .iter()
            .position(|&scaled| vbat > curve.min_voltage + step * f32::from(scaled))
            .map_or(0, |n| (CURVE_POINTS - n) as u8)
    }

    /// Measure through `source` and convert.
    pub fn percent_from_source<V: VoltageSource>(&self, source: &mut V) -> Result<u8, V::Error> {
        let vbat = source.read_voltage()?;
        let percent = self.percent(vbat);
        debug!("battery: {} V -> {} %", vbat, percent);
        Ok(percent)
    }
}

/// Failure while sampling the battery divider.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub enum VbatError<P, A> {
    /// Driving the divider control pin failed.
    Pin(P),
    /// Sampling the ADC failed.
    Adc(A),
}

/// Battery voltage reader behind the board's switched divider.
///
/// `ctrl` should be an open-drain output: driving it low enables the divider,
/// releasing it high lets the board pull-up switch the divider off again.
pub struct VbatMonitor<CTRL, ADC, D> {
    ctrl: CTRL,
    adc: ADC,
    delay: D,
}

impl<CTRL, ADC, D> VbatMonitor<CTRL, ADC, D>
where
    CTRL: OutputPin,
    ADC: AdcChannel,
    D: DelayNs,
{
    pub fn new(ctrl: CTRL, adc: ADC, delay: D) -> Self {
        Self { ctrl, adc, delay }
    }

    /// Release the underlying peripherals.
    pub fn release(self) -> (CTRL, ADC, D) {
        (self.ctrl, self.adc, self.delay)
    }

    fn sample(&mut self) -> Result<u16, VbatError<CTRL::Error, ADC::Error>> {
        self.ctrl.set_low().map_err(VbatError::Pin)?;
        self.delay.delay_ms(VBAT_SETTLE_MS);
        let raw = self.adc.read_raw();
        // Switch the divider off even when the sample failed.
        let released = self.ctrl.set_high();
        let raw = raw.map_err(VbatError::Adc)?;
        released.map_err(VbatError::Pin)?;
        Ok(raw)
    }
}

impl<CTRL, ADC, D> VoltageSource for VbatMonitor<CTRL, ADC, D>
where
    CTRL: OutputPin,
    ADC: AdcChannel,
    D: DelayNs,
{
    type Error = VbatError<CTRL::Error, ADC::Error>;

    fn read_voltage(&mut self) -> Result<f32, Self::Error> {
        let raw = self.sample()?;
        let vbat = adc_to_volts(raw);
        trace!("vbat raw={} -> {} V", raw, vbat);
        Ok(vbat)
    }
}
