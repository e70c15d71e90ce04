use embedded_hal::delay::DelayNs;

use crate::error::Am2301Error;
use crate::frame::Reading;
use crate::handshake::{self, Handshake};
use crate::line::{Clock, Direction, Level, Line};
use crate::reader::FrameReader;

/// Retry and logging behaviour of [`Am2301::read`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Attempts per read; 0 behaves like 1.
    pub max_attempts: u8,
    /// Wait between failed attempts, in milliseconds.
    pub backoff_ms: u32,
    /// Log every byte and bit timing, and every failed attempt.
    pub debug: bool,
    /// Handshake used by the first attempt.
    pub handshake: Handshake,
    /// Handshake used by retries.
    pub retry_handshake: Handshake,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Ten attempts, two seconds apart.
    pub const fn new() -> Self {
        Self {
            max_attempts: 10,
            backoff_ms: 2000,
            debug: false,
            handshake: Handshake::Full,
            retry_handshake: Handshake::Full,
        }
    }

    /// One attempt and no backoff.
    pub const fn single_shot() -> Self {
        Self::new().with_max_attempts(1).with_backoff_ms(0)
    }

    /// Sets the number of attempts per read.
    pub const fn with_max_attempts(mut self, max_attempts: u8) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the wait between failed attempts, in milliseconds.
    pub const fn with_backoff_ms(mut self, backoff_ms: u32) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// Enables verbose logging.
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the handshake of the first attempt.
    pub const fn with_handshake(mut self, handshake: Handshake) -> Self {
        self.handshake = handshake;
        self
    }

    /// Sets the handshake of every retry.
    pub const fn with_retry_handshake(mut self, retry_handshake: Handshake) -> Self {
        self.retry_handshake = retry_handshake;
        self
    }
}

/// Driver for the AM2301 temperature and humidity sensor.
///
/// The driver owns the data line for its whole lifetime, so nothing else
/// can drive or sample it in the middle of a transfer.
pub struct Am2301<LINE, CLOCK, D> {
    line: LINE,
    clock: CLOCK,
    delay: D,
    config: Config,
    reader: FrameReader,
}

impl<LINE, CLOCK, DELAY> Am2301<LINE, CLOCK, DELAY>
where
    LINE: Line,
    CLOCK: Clock,
    DELAY: DelayNs,
{
    /// Creates a new instance of the AM2301 driver with the default
    /// [`Config`].
    ///
    /// # Arguments
    ///
    /// * `line` - The data line connected to the sensor.
    /// * `clock` - A free-running microsecond counter used to time pulses.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    pub fn new(line: LINE, clock: CLOCK, delay: DELAY) -> Self {
        Self::with_config(line, clock, delay, Config::default())
    }

    /// Creates a new instance of the AM2301 driver.
    pub fn with_config(line: LINE, clock: CLOCK, delay: DELAY, config: Config) -> Self {
        Am2301 {
            line,
            clock,
            delay,
            config,
            reader: FrameReader::new(config.debug),
        }
    }

    /// The configuration this driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the line, clock and delay.
    pub fn release(self) -> (LINE, CLOCK, DELAY) {
        (self.line, self.clock, self.delay)
    }

    /// Reads a measurement, retrying according to the [`Config`].
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` from the first successful attempt.
    /// * `Err(Am2301Error)` from the last attempt once all have failed, or
    ///   immediately on a line error.
    pub fn read(&mut self) -> Result<Reading, Am2301Error<LINE::Error>> {
        self.read_with(|_, _| {})
    }

    /// Like [`read`](Self::read), but hands every failed attempt to
    /// `on_failure` along with its 1-based attempt number.
    pub fn read_with<F>(&mut self, mut on_failure: F) -> Result<Reading, Am2301Error<LINE::Error>>
    where
        F: FnMut(u8, &Am2301Error<LINE::Error>),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut handshake = self.config.handshake;
        let mut attempt: u8 = 1;

        loop {
            let error = match self.exchange(handshake) {
                Ok(reading) => return Ok(reading),
                Err(e) => e,
            };

            on_failure(attempt, &error);
            if self.config.debug {
                warn!("attempt {} of {} failed: {}", attempt, max_attempts, error);
            }
            self.idle()?;

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            self.delay.delay_ms(self.config.backoff_ms);
            handshake = self.config.retry_handshake;
            attempt += 1;
        }
    }

    /// Reads the temperature in degrees Celsius.
    pub fn read_temperature(&mut self) -> Result<f32, Am2301Error<LINE::Error>> {
        self.read().map(|reading| reading.temperature)
    }

    /// Reads the relative humidity in percent.
    pub fn read_relative_humidity(&mut self) -> Result<f32, Am2301Error<LINE::Error>> {
        self.read().map(|reading| reading.relative_humidity)
    }

    /// Performs one complete exchange: handshake, 40 data bits, checksum
    /// and range checks.
    ///
    /// Whatever the outcome, the line is left driven High as an output.
    /// If that fails after a failed exchange, the line error is returned
    /// and the exchange error is logged.
    pub fn attempt(&mut self, handshake: Handshake) -> Result<Reading, Am2301Error<LINE::Error>> {
        match self.exchange(handshake) {
            Ok(reading) => Ok(reading),
            Err(e) => {
                if let Err(line_error) = self.idle() {
                    warn!("could not return line to idle after: {}", e);
                    return Err(line_error.into());
                }
                Err(e)
            }
        }
    }

    fn exchange(&mut self, handshake: Handshake) -> Result<Reading, Am2301Error<LINE::Error>> {
        handshake::start(&mut self.line, &mut self.clock, &mut self.delay, handshake)?;
        let frame = self.reader.read(&mut self.line, &mut self.clock)?;
        if self.config.debug {
            debug!("frame: {}", frame);
        }
        frame.decode()
    }

    fn idle(&mut self) -> Result<(), LINE::Error> {
        self.line.set_direction(Direction::Output)?;
        self.line.set_level(Level::High)
    }
}
