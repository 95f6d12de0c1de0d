//! Central-unit output bank
//!
//! Equipment terminals (Y1, Y2, G, O/B, W1e, W2, W3) and the heat, cool,
//! fan and error lamps. Any of them may be left unbound.

use embedded_hal::digital::OutputPin;
use plenum_core::state::OutputPattern;
use plenum_core::traits::{EquipmentOutput, IoError};

use crate::relay::GpioRelay;

/// Bound equipment outputs and lamps
pub struct EquipmentBank<P> {
    pub y1: Option<GpioRelay<P>>,
    pub y2: Option<GpioRelay<P>>,
    pub g: Option<GpioRelay<P>>,
    pub ob: Option<GpioRelay<P>>,
    pub w1e: Option<GpioRelay<P>>,
    pub w2: Option<GpioRelay<P>>,
    pub w3: Option<GpioRelay<P>>,
    pub heat_led: Option<GpioRelay<P>>,
    pub cool_led: Option<GpioRelay<P>>,
    pub fan_led: Option<GpioRelay<P>>,
    pub error_led: Option<GpioRelay<P>>,
}

impl<P: OutputPin> Default for EquipmentBank<P> {
    fn default() -> Self {
        Self {
            y1: None,
            y2: None,
            g: None,
            ob: None,
            w1e: None,
            w2: None,
            w3: None,
            heat_led: None,
            cool_led: None,
            fan_led: None,
            error_led: None,
        }
    }
}

fn set<P: OutputPin>(output: &mut Option<GpioRelay<P>>, on: bool) -> Result<(), IoError> {
    match output {
        Some(relay) => relay.set_on(on).map_err(|_| IoError::Pin),
        None => Ok(()),
    }
}

impl<P: OutputPin> EquipmentOutput for EquipmentBank<P> {
    fn apply(&mut self, pattern: &OutputPattern) -> Result<(), IoError> {
        // Stages drop before the blower and valve, and come up after them
        if !pattern.y2 {
            set(&mut self.y2, false)?;
        }
        if !pattern.y1 {
            set(&mut self.y1, false)?;
        }
        set(&mut self.w1e, pattern.w1e)?;
        set(&mut self.w2, pattern.w2)?;
        set(&mut self.w3, pattern.w3)?;
        set(&mut self.ob, pattern.ob)?;
        set(&mut self.g, pattern.g)?;
        set(&mut self.y1, pattern.y1)?;
        set(&mut self.y2, pattern.y2)?;

        set(&mut self.fan_led, pattern.fan_lamp)?;
        set(&mut self.heat_led, pattern.heat_lamp)?;
        set(&mut self.cool_led, pattern.cool_lamp)
    }

    fn set_error_indicator(&mut self, on: bool) -> Result<(), IoError> {
        set(&mut self.error_led, on)
    }
}
