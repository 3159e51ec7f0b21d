/// Turns variable frame times into a whole number of fixed ticks.
#[derive(Clone, Copy, Debug)]
pub struct FixedTimestep {
    tick_rate: u32,
    dt: f32,
    max_frame: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32, max_frame: f32) -> Self {
        Self {
            tick_rate,
            dt: 1.0 / tick_rate as f32,
            max_frame,
            accumulator: 0.0,
        }
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Add a frame's elapsed seconds, clamped so one long stall cannot queue
    /// up an unbounded burst of ticks.
    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.clamp(0.0, self.max_frame);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    /// Fraction of a tick left over, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
