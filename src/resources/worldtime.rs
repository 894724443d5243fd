//! Frame timing shared with every update pass.
//!
//! Time is tracked in whole milliseconds so that interval-based logic (health
//! decay, colour flips) is deterministic across runs.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTime {
    /// Scaled milliseconds since the game started.
    pub elapsed_ms: u64,
    /// Scaled milliseconds of the current frame.
    pub delta_ms: u64,
    pub time_scale: f32,
    /// Number of frames advanced so far.
    pub frame: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed_ms: 0,
            delta_ms: 0,
            time_scale: 1.0,
            frame: 0,
        }
    }
}

impl WorldTime {
    /// Advance by an unscaled frame delta, applying `time_scale`.
    pub fn advance(&mut self, dt_ms: u64) {
        let scaled = (dt_ms as f64 * f64::from(self.time_scale.max(0.0))).round() as u64;
        self.delta_ms = scaled;
        self.elapsed_ms += scaled;
        self.frame += 1;
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_applies_time_scale() {
        let mut time = WorldTime::default();
        time.advance(16);
        assert_eq!(time.delta_ms, 16);

        time.time_scale = 0.5;
        time.advance(20);
        assert_eq!(time.delta_ms, 10);
        assert_eq!(time.elapsed_ms, 26);
        assert_eq!(time.frame, 2);
    }
}
