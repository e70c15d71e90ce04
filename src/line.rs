//! The single data line shared with the sensor, and the clock used to time it.
//!
//! The protocol code only ever talks to a [`Line`] and a [`Clock`]. Any
//! open-drain GPIO pin implementing the `embedded-hal` digital traits can be
//! turned into a [`Line`] with [`OpenDrainLine`].

use core::fmt::Debug;

use embedded_hal::digital::{InputPin, OutputPin};

/// Logic level of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Line pulled to ground.
    Low,
    /// Line at the supply voltage.
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Whether the host drives the line or listens to it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The sensor drives the line; the host samples it.
    Input,
    /// The host drives the line.
    Output,
}

/// A bidirectional digital line.
///
/// `set_level` is only meaningful while the line is an output and
/// `read_level` only while it is an input.
pub trait Line {
    /// Error raised by the underlying hardware.
    type Error: Debug;

    /// Switches the line between driving and listening.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Drives the line to `level`.
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Samples the current level of the line.
    fn read_level(&mut self) -> Result<Level, Self::Error>;
}

/// Monotonic microsecond counter.
///
/// The counter may wrap; callers only ever look at differences between two
/// readings taken a few hundred microseconds apart.
pub trait Clock {
    /// Current counter value in microseconds.
    fn now_us(&mut self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_us(&mut self) -> u32 {
        T::now_us(self)
    }
}

/// [`Line`] over an open-drain pin with an external pull-up.
///
/// An open-drain pin can be read while it is released, so switching to
/// input simply lets go of the line (writes High) and switching to output
/// needs no reconfiguration.
pub struct OpenDrainLine<PIN> {
    pin: PIN,
}

impl<PIN, E> OpenDrainLine<PIN>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    E: Debug,
{
    /// Wraps an open-drain pin connected to the sensor's data line.
    pub fn new(pin: PIN) -> Self {
        OpenDrainLine { pin }
    }

    /// Gives the pin back.
    pub fn into_inner(self) -> PIN {
        self.pin
    }
}

impl<PIN, E> Line for OpenDrainLine<PIN>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    E: Debug,
{
    type Error = E;

    fn set_direction(&mut self, direction: Direction) -> Result<(), E> {
        match direction {
            Direction::Input => self.pin.set_high(),
            Direction::Output => Ok(()),
        }
    }

    fn set_level(&mut self, level: Level) -> Result<(), E> {
        match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        }
    }

    fn read_level(&mut self) -> Result<Level, E> {
        self.pin.is_high().map(Level::from)
    }
}
