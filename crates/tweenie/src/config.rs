//! Scheduler configuration

/// Frame-time settings applied by [`Tweenie::update`](crate::Tweenie::update)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TweenieConfig {
    /// Multiplier applied to every frame delta (1.0 = real time)
    pub time_scale: f32,
    /// Upper bound for a single frame delta in seconds, to absorb hitches
    pub max_delta: Option<f32>,
}

impl TweenieConfig {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: None,
        }
    }

    /// Builder: set the time scale
    pub fn time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Builder: clamp frame deltas to `seconds`
    pub fn max_delta(mut self, seconds: f32) -> Self {
        self.max_delta = Some(seconds);
        self
    }

    /// Turn a raw host delta into the delta tweeners are ticked with
    pub(crate) fn scale_delta(&self, delta_seconds: f32) -> f32 {
        if !delta_seconds.is_finite() {
            return 0.0;
        }
        let mut dt = delta_seconds.max(0.0);
        if let Some(max) = self.max_delta {
            dt = dt.min(max.max(0.0));
        }
        (dt * self.time_scale).max(0.0)
    }
}

impl Default for TweenieConfig {
    fn default() -> Self {
        Self::new()
    }
}
