//! Start signal sent by the host and the sensor's acknowledgment.

use embedded_hal::delay::DelayNs;

use crate::error::Am2301Error;
use crate::line::{Clock, Direction, Level, Line};
use crate::wait::wait_for;

/// How long the line idles High before the start signal.
pub const IDLE_HIGH_US: u32 = 100;
/// Length of the start signal.
pub const START_LOW_US: u32 = 1000;

/// Sensor acknowledgment: release seen, ack low, ack high.
const ACK: [(Level, u32); 3] = [(Level::High, 100), (Level::Low, 100), (Level::High, 100)];
/// Start bit preceding the data.
const START_BIT: [(Level, u32); 2] = [(Level::Low, 200), (Level::High, 200)];

/// Whether the start bit is awaited after the acknowledgment.
///
/// When restarting within one physical session the start bit appears to
/// be consumed already, so [`Handshake::Restart`] skips it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Handshake {
    #[default]
    Full,
    Restart,
}

/// Sends the start signal and waits for the sensor to answer.
///
/// On success the line is an input and the sensor is about to send the
/// first data bit. The sequence never retries; the first timeout is
/// returned as is.
pub fn start<L, C, D>(
    line: &mut L,
    clock: &mut C,
    delay: &mut D,
    handshake: Handshake,
) -> Result<(), Am2301Error<L::Error>>
where
    L: Line,
    C: Clock,
    D: DelayNs,
{
    // Leave it high for a while
    line.set_direction(Direction::Output)?;
    line.set_level(Level::High)?;
    delay.delay_us(IDLE_HIGH_US);

    // Start signal
    line.set_level(Level::Low)?;
    delay.delay_us(START_LOW_US);

    // Let the sensor talk
    line.set_level(Level::High)?;
    line.set_direction(Direction::Input)?;

    let phases: &[(Level, u32)] = match handshake {
        Handshake::Full => &START_BIT,
        Handshake::Restart => &[],
    };
    for &(level, timeout_us) in ACK.iter().chain(phases) {
        wait_for(line, clock, level, timeout_us)?;
    }
    Ok(())
}
