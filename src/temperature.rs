//! Chip temperature acquisition across the sensor's calibration windows.
//!
//! The on-die sensor is most accurate in narrow windows that saturate outside
//! their range. Readings are taken coldest window first, since heat from a
//! waking CPU spoils the cold windows quickest, widening until a reading falls
//! under the window's cutoff.

use core::convert::Infallible;

use crate::data_types::TemperatureRange;
use crate::error::Error;

/// Number of calibration windows in a range table.
pub const RANGE_COUNT: usize = 5;

/// Driver for the on-die temperature sensor.
///
/// The estimator calls `configure`, `enable`, `read_celsius`, `disable`,
/// `release` in that order for every window it tries.
pub trait TemperatureSensor {
    type Error: core::fmt::Debug;

    /// Install the sensor calibrated for `start..=end` °C.
    fn configure(&mut self, start: i8, end: i8) -> Result<(), Self::Error>;
    fn enable(&mut self) -> Result<(), Self::Error>;
    fn read_celsius(&mut self) -> Result<f32, Self::Error>;
    fn disable(&mut self) -> Result<(), Self::Error>;
    /// Uninstall the sensor configured by `configure`.
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Ordered calibration windows, narrowest and coldest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TemperatureRangeTable {
    ranges: [TemperatureRange; RANGE_COUNT],
}

impl TemperatureRangeTable {
    /// ESP32-S3 sensor windows. The last cutoff is beyond any chip temperature.
    pub const ESP32: TemperatureRangeTable = TemperatureRangeTable {
        ranges: [
            TemperatureRange { start: -40, end: 20, cutoff: -30 },
            TemperatureRange { start: -30, end: 50, cutoff: -10 },
            TemperatureRange { start: -10, end: 80, cutoff: 80 },
            TemperatureRange { start: 20, end: 100, cutoff: 100 },
            TemperatureRange { start: 50, end: 125, cutoff: 2500 },
        ],
    };

    /// Build a table. Inverted windows or cutoffs that do not strictly
    /// increase are rejected with [`Error::InvalidConfig`].
    pub fn new(ranges: [TemperatureRange; RANGE_COUNT]) -> Result<Self, Error<Infallible>> {
        let windows_ok = ranges.iter().all(|r| r.start < r.end);
        let cutoffs_ok = ranges.windows(2).all(|w| w[0].cutoff < w[1].cutoff);
        if !(windows_ok && cutoffs_ok) {
            return Err(Error::InvalidConfig);
        }
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[TemperatureRange; RANGE_COUNT] {
        &self.ranges
    }
}

impl Default for TemperatureRangeTable {
    fn default() -> Self {
        Self::ESP32
    }
}

/// An installed sensor. Dropping it without [`SensorSession::finish`]
/// disables and uninstalls the sensor, ignoring further errors.
struct SensorSession<'a, S: TemperatureSensor> {
    sensor: &'a mut S,
    enabled: bool,
    installed: bool,
}

impl<'a, S: TemperatureSensor> SensorSession<'a, S> {
    fn open(sensor: &'a mut S, range: &TemperatureRange) -> Result<Self, S::Error> {
        sensor.configure(range.start, range.end)?;
        let mut session = Self {
            sensor,
            enabled: false,
            installed: true,
        };
        session.sensor.enable()?;
        session.enabled = true;
        Ok(session)
    }

    fn read_celsius(&mut self) -> Result<f32, S::Error> {
        self.sensor.read_celsius()
    }

    fn finish(mut self) -> Result<(), S::Error> {
        self.enabled = false;
        self.sensor.disable()?;
        self.installed = false;
        self.sensor.release()
    }
}

impl<S: TemperatureSensor> Drop for SensorSession<'_, S> {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.sensor.disable();
        }
        if self.installed {
            let _ = self.sensor.release();
        }
    }
}

/// Reads chip temperature using the narrowest window that can be trusted.
pub struct TemperatureEstimator<S> {
    sensor: S,
    table: TemperatureRangeTable,
}

impl<S: TemperatureSensor> TemperatureEstimator<S> {
    pub fn new(sensor: S) -> Self {
        Self::with_table(sensor, TemperatureRangeTable::default())
    }

    pub fn with_table(sensor: S, table: TemperatureRangeTable) -> Self {
        Self { sensor, table }
    }

    pub fn table(&self) -> &TemperatureRangeTable {
        &self.table
    }

    pub fn set_table(&mut self, table: TemperatureRangeTable) {
        self.table = table;
    }

    pub fn release(self) -> S {
        self.sensor
    }

    /// Chip temperature in °C.
    ///
    /// Returns the first reading at or below its window's cutoff; the widest
    /// window's reading is returned unconditionally. Any driver failure aborts
    /// the scan, after the sensor has been disabled and uninstalled.
    pub fn estimate_celsius(&mut self) -> Result<f32, Error<S::Error>> {
        let table = self.table;
        let mut celsius = 0.0;
        for (n, range) in table.ranges.iter().enumerate() {
            celsius = self.read_range(range)?;
            if celsius <= f32::from(range.cutoff) {
                debug!("temperature: {} C accepted from window {}", celsius, n);
                return Ok(celsius);
            }
            trace!("temperature: {} C above cutoff {} of window {}", celsius, range.cutoff, n);
        }
        Ok(celsius)
    }

    fn read_range(&mut self, range: &TemperatureRange) -> Result<f32, Error<S::Error>> {
        let mut session = SensorSession::open(&mut self.sensor, range).map_err(Error::Sensor)?;
        let celsius = session.read_celsius().map_err(Error::Sensor)?;
        session.finish().map_err(Error::Sensor)?;
        Ok(celsius)
    }
}
