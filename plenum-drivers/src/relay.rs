//! GPIO relay output
//!
//! A single relay coil (or lamp) driven from a GPIO pin, directly or through
//! a relay board. Many relay boards are active-low, so the logical state is
//! tracked separately from the pin level.

use embedded_hal::digital::OutputPin;

/// GPIO relay output
pub struct GpioRelay<P> {
    pin: P,
    /// If true, relay ON = pin LOW
    inverted: bool,
    /// Current logical state (true = energized)
    on: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Create a relay output, released
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, relay is ON when pin is LOW
    pub fn new(pin: P, inverted: bool) -> Result<Self, P::Error> {
        let mut relay = Self {
            pin,
            inverted,
            on: true,
        };
        relay.set_on(false)?;
        Ok(relay)
    }

    /// Energize or release the relay
    pub fn set_on(&mut self, on: bool) -> Result<(), P::Error> {
        if on != self.inverted {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}
