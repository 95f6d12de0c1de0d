//! Thermostat and switch inputs
//!
//! 24VAC thermostat calls reach the controller through optocouplers, which
//! usually pull the GPIO low when the call is present. Each line carries its
//! own inversion so mixed boards work.

use embedded_hal::digital::InputPin;
use plenum_core::config::PinConfig;
use plenum_core::state::DemandSignals;
use plenum_core::traits::{IoError, ThermostatInput};

/// One digital input with optional inversion
pub struct InputLine<P> {
    pin: P,
    /// If true, asserted = pin LOW
    inverted: bool,
}

impl<P: InputPin> InputLine<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Create from a pin binding, taking its inversion flag
    pub fn from_config(pin: P, config: &PinConfig) -> Self {
        Self::new(pin, config.inverted)
    }

    /// Read the logical level
    pub fn is_asserted(&mut self) -> Result<bool, P::Error> {
        Ok(self.pin.is_high()? != self.inverted)
    }
}

/// The four thermostat lines of one zone
///
/// Unbound lines read as released.
pub struct ThermostatInputs<P> {
    pub y1: Option<InputLine<P>>,
    pub y2: Option<InputLine<P>>,
    pub g: Option<InputLine<P>>,
    pub ob: Option<InputLine<P>>,
}

impl<P: InputPin> ThermostatInputs<P> {
    pub fn new(
        y1: Option<InputLine<P>>,
        y2: Option<InputLine<P>>,
        g: Option<InputLine<P>>,
        ob: Option<InputLine<P>>,
    ) -> Self {
        Self { y1, y2, g, ob }
    }

    fn sample(line: &mut Option<InputLine<P>>) -> Result<bool, IoError> {
        match line {
            Some(line) => line.is_asserted().map_err(|_| IoError::Pin),
            None => Ok(false),
        }
    }
}

impl<P: InputPin> ThermostatInput for ThermostatInputs<P> {
    fn read(&mut self) -> Result<DemandSignals, IoError> {
        Ok(DemandSignals {
            y1: Self::sample(&mut self.y1)?,
            y2: Self::sample(&mut self.y2)?,
            g: Self::sample(&mut self.g)?,
            ob: Self::sample(&mut self.ob)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::mock::MockPin;

    fn line(high: bool, inverted: bool) -> Option<InputLine<MockPin>> {
        Some(InputLine::new(MockPin::at(high), inverted))
    }

    #[test]
    fn test_inverted_line() {
        let mut active_low = InputLine::from_config(MockPin::at(false), &PinConfig::inverted(3));
        assert!(active_low.is_asserted().unwrap());

        let mut active_high = InputLine::new(MockPin::at(false), false);
        assert!(!active_high.is_asserted().unwrap());
    }

    #[test]
    fn test_read_heating_call() {
        let mut inputs = ThermostatInputs::new(
            line(true, false),
            line(false, false),
            line(false, true),
            line(true, false),
        );
        let demand = inputs.read().unwrap();
        assert_eq!(demand, DemandSignals::new(true, false, true, true));
    }

    #[test]
    fn test_unbound_lines_read_released() {
        let mut inputs: ThermostatInputs<MockPin> =
            ThermostatInputs::new(line(true, false), None, None, None);
        let demand = inputs.read().unwrap();
        assert!(demand.y1);
        assert!(demand.stage_without_fan());
    }
}
