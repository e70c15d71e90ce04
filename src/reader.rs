//! Pulse-width decoding of the 40 data bits.

use crate::error::Am2301Error;
use crate::frame::Frame;
use crate::line::{Clock, Direction, Level, Line};
use crate::wait::wait_for;

/// High phases at least this long (in microseconds) encode a 1.
pub const HIGH_BIT_THRESHOLD_US: u32 = 50;

/// Maximum time (in microseconds) spent in either phase of a bit.
pub const BIT_TIMEOUT_US: u32 = 500;

/// Reads the five frame bytes once the handshake has completed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameReader {
    debug: bool,
}

impl FrameReader {
    /// Creates a reader. With `debug` set, every byte and its bit timings
    /// are logged.
    pub const fn new(debug: bool) -> Self {
        FrameReader { debug }
    }

    /// Reads a frame and hands the line back to the host.
    ///
    /// The returned frame is not validated. On a timeout the line is left
    /// as it was; the caller is responsible for returning it to idle.
    pub fn read<L, C>(&self, line: &mut L, clock: &mut C) -> Result<Frame, Am2301Error<L::Error>>
    where
        L: Line,
        C: Clock,
    {
        let mut frame = Frame::default();

        for (index, byte) in frame.0.iter_mut().enumerate() {
            *byte = self.read_byte(line, clock, index)?;
        }

        line.set_direction(Direction::Output)?;
        line.set_level(Level::High)?;

        Ok(frame)
    }

    /// Reads one byte, most significant bit first.
    fn read_byte<L, C>(
        &self,
        line: &mut L,
        clock: &mut C,
        index: usize,
    ) -> Result<u8, Am2301Error<L::Error>>
    where
        L: Line,
        C: Clock,
    {
        let mut byte: u8 = 0;
        let mut timings = [0u32; 8];

        for (i, timing) in timings.iter_mut().enumerate() {
            *timing = read_high_phase(line, clock)?;
            if *timing >= HIGH_BIT_THRESHOLD_US {
                byte |= 1 << (7 - i);
            }
        }

        if self.debug {
            debug!("byte {}: {=u8:#x}", index, byte);
            trace!("high phases (us): {}", timings);
        }

        Ok(byte)
    }
}

/// Measures one bit's high phase.
///
/// The line is High when this is called. The wait for Low lasts exactly as
/// long as the high phase; the wait for High then covers the low phase
/// that precedes the next bit.
fn read_high_phase<L, C>(line: &mut L, clock: &mut C) -> Result<u32, Am2301Error<L::Error>>
where
    L: Line,
    C: Clock,
{
    let high_us = wait_for(line, clock, Level::Low, BIT_TIMEOUT_US)?;
    wait_for(line, clock, Level::High, BIT_TIMEOUT_US)?;
    Ok(high_us)
}
