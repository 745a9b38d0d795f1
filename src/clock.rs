//! Frame timing for the animation-frame loop.

/// FrameClock turns `requestAnimationFrame` timestamps into update deltas.
pub struct FrameClock {
    last_ms: Option<f64>, // timestamp of the previous frame
    max_dt: f64,          // seconds; longer frames are clamped to this
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        Self { last_ms: None, max_dt }
    }

    /// Seconds since the previous frame, clamped to `[0, max_dt]`. The first
    /// frame yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last) / 1000.0,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() { dt.clamp(0.0, self.max_dt) } else { 0.0 }
    }

    /// Forget the previous frame, e.g. after the tab was hidden.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
