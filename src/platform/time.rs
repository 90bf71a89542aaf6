//! Frame timing

use crate::consts::MAX_FRAME_DT;

/// Turns animation-frame timestamps into clamped frame deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous call, in `[0, max_dt]`. The first call returns 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, self.max_dt)
    }

    /// Forget the last timestamp so a resumed tab does not see one huge frame
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Wall clock in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(5000.0), 0.0);
        assert!((clock.tick(5016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_long_and_backward_frames() {
        let mut clock = FrameClock::default();
        clock.tick(0.0);
        assert_eq!(clock.tick(2000.0), MAX_FRAME_DT);
        assert_eq!(clock.tick(1000.0), 0.0);

        clock.reset();
        assert_eq!(clock.tick(9000.0), 0.0);
    }
}
