//! Debounced, time-bounded waiting for a line level.

use crate::error::Am2301Error;
use crate::line::{Clock, Level, Line};

/// Samples the line three times back to back.
///
/// Returns the level only when all three samples agree, which rejects
/// single-sample glitches without smearing edge timing.
pub fn stable_level<L: Line>(line: &mut L) -> Result<Option<Level>, L::Error> {
    let first = line.read_level()?;
    let second = line.read_level()?;
    let third = line.read_level()?;

    if first == second && second == third {
        Ok(Some(first))
    } else {
        Ok(None)
    }
}

/// Busy-polls until the line is stably at `expected`.
///
/// Returns the time spent waiting, always below `timeout_us`.
///
/// # Errors
///
/// Returns [`Am2301Error::Timeout`] if `timeout_us` microseconds pass
/// without a stable match.
pub fn wait_for<L, C>(
    line: &mut L,
    clock: &mut C,
    expected: Level,
    timeout_us: u32,
) -> Result<u32, Am2301Error<L::Error>>
where
    L: Line,
    C: Clock,
{
    let start = clock.now_us();
    loop {
        let elapsed = clock.now_us().wrapping_sub(start);
        if elapsed >= timeout_us {
            return Err(Am2301Error::Timeout {
                expected,
                timeout_us,
            });
        }
        if stable_level(line)? == Some(expected) {
            return Ok(elapsed);
        }
    }
}
