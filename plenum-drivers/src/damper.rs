//! Interlocked damper relay pair
//!
//! A damper motor is driven by two relays, one per direction. Energizing
//! both would short the motor supply, so every drive releases the opposite
//! relay first and stops if that fails.

use embedded_hal::digital::OutputPin;
use plenum_core::damper::{DamperPosition, RelayPhase};
use plenum_core::traits::{DamperActuator, IoError};

use crate::relay::GpioRelay;

/// Open/close relay pair for one zone damper
pub struct RelayDamper<P> {
    open: GpioRelay<P>,
    close: GpioRelay<P>,
}

impl<P: OutputPin> RelayDamper<P> {
    /// Create from two released relays
    pub fn new(open: GpioRelay<P>, close: GpioRelay<P>) -> Self {
        Self { open, close }
    }

    fn release(&mut self) -> Result<(), IoError> {
        self.open.set_on(false).map_err(|_| IoError::Pin)?;
        self.close.set_on(false).map_err(|_| IoError::Pin)
    }

    fn drive(&mut self, position: DamperPosition) -> Result<(), IoError> {
        let (on, off) = match position {
            DamperPosition::Open => (&mut self.open, &mut self.close),
            DamperPosition::Closed => (&mut self.close, &mut self.open),
            DamperPosition::Unknown => return self.release(),
        };

        off.set_on(false).map_err(|_| IoError::Pin)?;
        on.set_on(true).map_err(|_| IoError::Pin)
    }
}

impl<P: OutputPin> DamperActuator for RelayDamper<P> {
    fn apply(&mut self, phase: RelayPhase) -> Result<(), IoError> {
        match phase {
            RelayPhase::Release => self.release(),
            RelayPhase::Energize(position) => self.drive(position),
        }
    }

    fn relays(&self) -> (bool, bool) {
        (self.open.is_on(), self.close.is_on())
    }
}
