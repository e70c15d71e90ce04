//! Virtual time, delay and sensor line for timing tests.
//!
//! All three share one microsecond counter. The clock ticks by one
//! microsecond every time it is read, delays jump it forward, and the line
//! replays the next queued waveform each time the host releases it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::line::{Clock, Direction, Level, Line};

/// A run of constant line level, in microseconds.
pub type Segment = (Level, u32);

/// Sensor low phase preceding every data bit.
pub const BIT_LOW_US: u32 = 50;
/// High phase of a 0 bit.
pub const ZERO_HIGH_US: u32 = 26;
/// High phase of a 1 bit.
pub const ONE_HIGH_US: u32 = 70;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimFault;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Direction(Direction),
    Level(Level),
}

#[derive(Default)]
pub struct Sim {
    time: Rc<Cell<u32>>,
    delays: Rc<RefCell<Vec<u32>>>,
}

impl Sim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u32 {
        self.time.get()
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            time: self.time.clone(),
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            time: self.time.clone(),
            delays: self.delays.clone(),
        }
    }

    /// A line that plays `waveforms` in order, one per release.
    ///
    /// Once a waveform runs out the pull-up holds the line High. Releases
    /// beyond the queued waveforms see a silent sensor.
    pub fn line(&self, waveforms: Vec<Vec<Segment>>) -> SimLine {
        SimLine {
            time: self.time.clone(),
            direction: Direction::Output,
            driven: Level::High,
            queue: waveforms.into(),
            current: Vec::new(),
            released_at: 0,
            releases: 0,
            ops: Vec::new(),
            faulty: false,
            unreclaimable: false,
        }
    }

    /// Every delay requested so far, in microseconds.
    pub fn delays_us(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }
}

pub struct SimClock {
    time: Rc<Cell<u32>>,
}

impl Clock for SimClock {
    fn now_us(&mut self) -> u32 {
        let now = self.time.get();
        self.time.set(now.wrapping_add(1));
        now
    }
}

pub struct SimDelay {
    time: Rc<Cell<u32>>,
    delays: Rc<RefCell<Vec<u32>>>,
}

impl SimDelay {
    fn advance(&mut self, us: u32) {
        self.delays.borrow_mut().push(us);
        self.time.set(self.time.get().wrapping_add(us));
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms.saturating_mul(1_000));
    }
}

pub struct SimLine {
    time: Rc<Cell<u32>>,
    direction: Direction,
    driven: Level,
    queue: VecDeque<Vec<Segment>>,
    current: Vec<Segment>,
    released_at: u32,
    releases: usize,
    ops: Vec<Op>,
    faulty: bool,
    unreclaimable: bool,
}

impl SimLine {
    /// Makes every subsequent read fail.
    pub fn faulty(mut self) -> Self {
        self.faulty = true;
        self
    }

    /// Makes switching from input back to output fail.
    pub fn unreclaimable(mut self) -> Self {
        self.unreclaimable = true;
        self
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn driven(&self) -> Level {
        self.driven
    }

    pub fn released_at(&self) -> u32 {
        self.released_at
    }

    pub fn releases(&self) -> usize {
        self.releases
    }

    fn sensor_level(&self) -> Level {
        let elapsed = self.time.get().wrapping_sub(self.released_at);
        let mut end = 0u32;
        for &(level, duration) in &self.current {
            end = end.saturating_add(duration);
            if elapsed < end {
                return level;
            }
        }
        Level::High
    }
}

impl Line for SimLine {
    type Error = SimFault;

    fn set_direction(&mut self, direction: Direction) -> Result<(), SimFault> {
        if self.unreclaimable
            && direction == Direction::Output
            && self.direction == Direction::Input
        {
            return Err(SimFault);
        }
        self.ops.push(Op::Direction(direction));
        if direction == Direction::Input && self.direction == Direction::Output {
            self.current = self.queue.pop_front().unwrap_or_default();
            self.released_at = self.time.get();
            self.releases += 1;
        }
        self.direction = direction;
        Ok(())
    }

    fn set_level(&mut self, level: Level) -> Result<(), SimFault> {
        assert_eq!(self.direction, Direction::Output, "driving an input line");
        self.ops.push(Op::Level(level));
        self.driven = level;
        Ok(())
    }

    fn read_level(&mut self) -> Result<Level, SimFault> {
        if self.faulty {
            return Err(SimFault);
        }
        Ok(match self.direction {
            Direction::Input => self.sensor_level(),
            Direction::Output => self.driven,
        })
    }
}

/// Data bits only: a high phase encoding the bit, then the next low phase.
pub fn bits(bytes: &[u8]) -> Vec<Segment> {
    let mut wave = Vec::new();
    for byte in bytes {
        for i in 0..8 {
            let high = if (byte >> (7 - i)) & 1 == 1 {
                ONE_HIGH_US
            } else {
                ZERO_HIGH_US
            };
            wave.push((Level::High, high));
            wave.push((Level::Low, BIT_LOW_US));
        }
    }
    wave
}

/// Complete sensor answer to a full handshake.
pub fn response(frame: [u8; 5]) -> Vec<Segment> {
    let mut wave = vec![
        // pull-up takes over after release
        (Level::High, 20),
        // acknowledgment
        (Level::Low, 80),
        (Level::High, 80),
        // start bit
        (Level::Low, BIT_LOW_US),
    ];
    wave.extend(bits(&frame));
    wave
}

/// Sensor answer when the start bit is not awaited: the acknowledgment
/// high phase runs straight into the first data bit.
pub fn restart_response(frame: [u8; 5]) -> Vec<Segment> {
    let mut wave = vec![(Level::High, 20), (Level::Low, 80)];
    wave.extend(bits(&frame));
    wave
}

/// A sensor holding the line Low forever.
pub fn stuck_low() -> Vec<Segment> {
    vec![(Level::Low, u32::MAX)]
}
