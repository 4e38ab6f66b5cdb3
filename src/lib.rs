//! Heltec ESP32 LoRa board support
//!
//! Thin glue for the Heltec WiFi LoRa 32 V3 family: LED and external power
//! control, battery voltage and state-of-charge, multi-range chip temperature,
//! display power sequencing and deep sleep. Hardware is reached through
//! `embedded-hal` 1.0 traits and the small collaborator traits defined here,
//! so every piece can be driven by a real HAL or by test doubles.

#![no_std]

#[macro_use]
mod fmt;

pub mod battery;
pub mod board;
pub mod console;
pub mod data_types;
pub mod error;
pub mod peripherals;
pub mod pins;
pub mod temperature;

pub use battery::{BatteryGauge, DischargeCurve, VbatMonitor, VoltageSource, CURVE_POINTS};
pub use board::{BoardParts, Heltec};
pub use console::Both;
pub use error::{BoardError, Error};
pub use temperature::{TemperatureEstimator, TemperatureRangeTable, TemperatureSensor, RANGE_COUNT};
