use core::fmt::Debug;
use core::ops::RangeInclusive;

use crate::error::Am2301Error;

/// Relative humidity the sensor can report, in percent.
pub const HUMIDITY_RANGE: RangeInclusive<f32> = 0.0..=100.0;
/// Temperature the sensor can report, in degrees Celsius.
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = -40.0..=80.0;

/// Reading returned by the AM2301 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

/// The five bytes sent by the sensor, unvalidated.
///
/// Layout: humidity high, humidity low, temperature high, temperature low,
/// checksum.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame(pub [u8; 5]);

impl Frame {
    /// Humidity in tenths of a percent.
    pub fn humidity_raw(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    /// Temperature in tenths of a degree.
    pub fn temperature_raw(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    /// The checksum byte as received.
    pub fn checksum(&self) -> u8 {
        self.0[4]
    }

    /// The checksum the data bytes call for.
    pub fn expected_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Validates the frame and converts it into a [`Reading`].
    ///
    /// The checksum is checked first; a frame that fails it is never
    /// decoded. Values on the range boundaries are accepted.
    pub fn decode<E: Debug>(&self) -> Result<Reading, Am2301Error<E>> {
        let expected = self.expected_checksum();
        if expected != self.checksum() {
            return Err(Am2301Error::ChecksumMismatch {
                expected,
                received: self.checksum(),
            });
        }

        let humidity_raw = self.humidity_raw();
        let relative_humidity = humidity_raw as f32 / 10.0;
        if !HUMIDITY_RANGE.contains(&relative_humidity) {
            return Err(Am2301Error::HumidityOutOfRange { raw: humidity_raw });
        }

        let temperature_raw = self.temperature_raw();
        let temperature = temperature_raw as f32 / 10.0;
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(Am2301Error::TemperatureOutOfRange {
                raw: temperature_raw,
            });
        }

        Ok(Reading {
            temperature,
            relative_humidity,
        })
    }
}

impl From<[u8; 5]> for Frame {
    fn from(bytes: [u8; 5]) -> Self {
        Frame(bytes)
    }
}
