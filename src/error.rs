use core::fmt::Debug;

use crate::line::Level;

/// Possible errors from the AM2301 driver.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Am2301Error<E: Debug> {
    /// The line did not settle at the expected level in time.
    #[error("timed out after {timeout_us}us waiting for line to go {expected:?}")]
    Timeout { expected: Level, timeout_us: u32 },
    /// Checksum byte does not match the sum of the four data bytes.
    #[error("checksum mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch { expected: u8, received: u8 },
    /// Humidity outside 0.0..=100.0 %. `raw` is in tenths of a percent.
    #[error("relative humidity out of range: {raw} tenths of a percent")]
    HumidityOutOfRange { raw: u16 },
    /// Temperature outside -40.0..=80.0 °C. `raw` is in tenths of a degree.
    #[error("temperature out of range: {raw} tenths of a degree")]
    TemperatureOutOfRange { raw: u16 },
    /// Error from the data line (input/output).
    #[error("line error: {0:?}")]
    Line(E),
}

impl<E: Debug> Am2301Error<E> {
    /// Whether another attempt may succeed.
    ///
    /// Protocol failures are transient; a failing line is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Am2301Error::Line(_))
    }
}

impl<E: Debug> From<E> for Am2301Error<E> {
    fn from(value: E) -> Self {
        Self::Line(value)
    }
}

#[cfg(feature = "defmt")]
impl<E: Debug> defmt::Format for Am2301Error<E> {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Am2301Error::Timeout {
                expected,
                timeout_us,
            } => defmt::write!(f, "Timeout({}, {}us)", expected, timeout_us),
            Am2301Error::ChecksumMismatch { expected, received } => {
                defmt::write!(f, "ChecksumMismatch({=u8:#x} != {=u8:#x})", received, expected)
            }
            Am2301Error::HumidityOutOfRange { raw } => {
                defmt::write!(f, "HumidityOutOfRange({})", raw)
            }
            Am2301Error::TemperatureOutOfRange { raw } => {
                defmt::write!(f, "TemperatureOutOfRange({})", raw)
            }
            Am2301Error::Line(e) => defmt::write!(f, "Line({})", defmt::Debug2Format(e)),
        }
    }
}
