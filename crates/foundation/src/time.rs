/// Time primitives
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn advance(self, dt_s: f64) -> Self {
        Time(self.0 + dt_s.max(0.0))
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A non-positive duration is complete immediately.
pub fn progress(elapsed: Time, duration: Time) -> f64 {
    if duration.0 <= 0.0 {
        return 1.0;
    }
    (elapsed.0 / duration.0).clamp(0.0, 1.0)
}

/// Symmetric cubic easing: slow start, slow end.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, ease_cubic_in_out, progress};

    #[test]
    fn progress_is_clamped() {
        let d = Time::from_millis(1250.0);
        assert_eq!(progress(Time::ZERO, d), 0.0);
        assert_eq!(progress(Time(0.625), d), 0.5);
        assert_eq!(progress(Time(10.0), d), 1.0);
        assert_eq!(progress(Time(1.0), Time::ZERO), 1.0);
    }

    #[test]
    fn advance_ignores_negative_steps() {
        let t = Time(1.0).advance(-5.0).advance(0.5);
        assert_eq!(t, Time(1.5));
    }

    #[test]
    fn cubic_easing_endpoints_and_symmetry() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        let a = ease_cubic_in_out(0.2);
        let b = ease_cubic_in_out(0.8);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!(a < 0.2);
    }
}
