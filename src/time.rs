/// Frame timer that refuses to hand out huge deltas.
///
/// The host measures each frame's elapsed time and feeds it through [`FrameClock::advance`].
/// A backgrounded window or a debugger break can stall the frame loop for seconds; fed to
/// the wiggle springs unclamped, that would launch every tip to its stretch limit.
pub struct FrameClock {
    max_delta: f32,
    elapsed: f32,
    frames: u64,
    clamped_frames: u64,
}

impl FrameClock {
    pub const DEFAULT_MAX_DELTA: f32 = 0.1;

    pub fn new(max_delta: f32) -> Self {
        let max_delta = if max_delta.is_finite() && max_delta > 0.0 { max_delta } else { Self::DEFAULT_MAX_DELTA };
        Self { max_delta, elapsed: 0.0, frames: 0, clamped_frames: 0 }
    }

    /// Clamps a measured frame delta to `[0, max_delta]` and records it.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        let mut delta = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        if delta > self.max_delta {
            log::warn!("[time] frame delta {:.3}s clamped to {:.3}s", delta, self.max_delta);
            delta = self.max_delta;
            self.clamped_frames += 1;
        }
        self.elapsed += delta;
        self.frames += 1;
        delta
    }

    /// Simulated time: the sum of clamped deltas.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clamped_frames(&self) -> u64 {
        self.clamped_frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELTA)
    }
}
