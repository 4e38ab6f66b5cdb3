use std::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTrans};
use heltec_lora32_rs::battery::{AdcChannel, BatteryGauge, VbatError, VbatMonitor, VoltageSource};
use heltec_lora32_rs::peripherals::{ExternalPower, Led};

struct FakeAdc {
    raw: Result<u16, ()>,
}

impl AdcChannel for FakeAdc {
    type Error = ();

    fn read_raw(&mut self) -> Result<u16, ()> {
        self.raw
    }
}

/// 8-bit PWM channel recording every duty written.
struct FakePwm {
    duties: Vec<u16>,
}

impl ErrorType for FakePwm {
    type Error = Infallible;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duties.push(duty);
        Ok(())
    }
}

#[test]
fn vbat_enables_divider_samples_then_releases() {
    let expectations = [PinTrans::set(PinState::Low), PinTrans::set(PinState::High)];
    let mut ctrl = PinMock::new(&expectations);
    // 955 counts / 238.7 = 4.0 V
    let mut monitor = VbatMonitor::new(ctrl.clone(), FakeAdc { raw: Ok(955) }, NoopDelay::new());
    let vbat = monitor.read_voltage().unwrap();
    assert!((vbat - 4.0).abs() < 0.01, "got {}", vbat);
    ctrl.done();
}

#[test]
fn vbat_adc_failure_still_releases_divider() {
    let expectations = [PinTrans::set(PinState::Low), PinTrans::set(PinState::High)];
    let mut ctrl = PinMock::new(&expectations);
    let mut monitor = VbatMonitor::new(ctrl.clone(), FakeAdc { raw: Err(()) }, NoopDelay::new());
    assert!(matches!(monitor.read_voltage(), Err(VbatError::Adc(()))));
    ctrl.done();
}

#[test]
fn gauge_reads_through_voltage_source() {
    let expectations = [PinTrans::set(PinState::Low), PinTrans::set(PinState::High)];
    let mut ctrl = PinMock::new(&expectations);
    // 1017 counts = 4.26 V, a full cell.
    let mut monitor = VbatMonitor::new(ctrl.clone(), FakeAdc { raw: Ok(1017) }, NoopDelay::new());
    let percent = BatteryGauge::default().percent_from_source(&mut monitor).unwrap();
    assert_eq!(percent, 100);
    ctrl.done();
}

#[test]
fn external_power_is_active_low() {
    let expectations = [PinTrans::set(PinState::Low), PinTrans::set(PinState::High)];
    let mut pin = PinMock::new(&expectations);
    let mut vext = ExternalPower::new(pin.clone());
    assert!(!vext.is_enabled());
    vext.set(true).unwrap();
    assert!(vext.is_enabled());
    vext.set(false).unwrap();
    assert!(!vext.is_enabled());
    pin.done();
}

#[test]
fn led_maps_percent_to_eight_bit_duty() {
    let mut led = Led::new(FakePwm { duties: Vec::new() });
    led.set(100).unwrap();
    led.set(50).unwrap();
    led.set(1).unwrap();
    led.set(0).unwrap();
    led.set(250).unwrap();
    assert_eq!(led.percent(), 100);
    assert_eq!(led.release().duties, vec![255, 127, 2, 0, 255]);
}
