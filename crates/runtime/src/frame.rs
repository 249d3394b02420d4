use foundation::time::Time;
use serde::{Deserialize, Serialize};

/// Frame metadata handed to every per-frame callback.
///
/// `dt_s` is the already-clamped delta since the previous frame; consumers
/// never see raw wall-clock spikes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time (seconds).
    pub dt_s: f64,
    /// Engine time at the end of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }

    /// A frame from a fixed-step timeline. Useful for deterministic replays.
    pub fn fixed(index: u64, dt_s: f64) -> Self {
        Self::new(index, dt_s, Time(index as f64 * dt_s))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameClockConfig {
    /// Upper bound for a single frame delta (seconds). Tab switches and
    /// debugger pauses otherwise produce multi-second jumps.
    pub max_dt_s: f64,
}

impl Default for FrameClockConfig {
    fn default() -> Self {
        Self { max_dt_s: 0.1 }
    }
}

/// Turns raw wall-clock deltas into a sequence of [`Frame`]s.
#[derive(Debug, Clone)]
pub struct FrameClock {
    config: FrameClockConfig,
    next_index: u64,
    time: Time,
}

impl FrameClock {
    pub fn new(config: FrameClockConfig) -> Self {
        Self {
            config,
            next_index: 0,
            time: Time::default(),
        }
    }

    /// Produce the next frame. Negative or non-finite deltas count as zero.
    pub fn tick(&mut self, raw_dt_s: f64) -> Frame {
        let dt_s = if raw_dt_s.is_finite() {
            raw_dt_s.clamp(0.0, self.config.max_dt_s)
        } else {
            0.0
        };
        self.time = self.time.advanced_by(dt_s);
        let frame = Frame::new(self.next_index, dt_s, self.time);
        self.next_index += 1;
        frame
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.next_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FrameClockConfig::default())
    }
}
