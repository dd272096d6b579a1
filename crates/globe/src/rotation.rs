use foundation::math::{GreatCircle, LonLat};
use foundation::time::{Time, ease_cubic_in_out, progress};
use serde::{Deserialize, Serialize};

pub const MAX_LATITUDE_DEG: f64 = 90.0;

/// Orthographic rotation `[lambda, phi]` in degrees.
///
/// A rotation of `(-lon, -lat)` puts the geographic position `(lon, lat)` at
/// the centre of the view.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl Rotation {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Rotation that centres the view on `center`.
    pub fn centered_on(center: LonLat) -> Self {
        let n = center.negated();
        Self::new(n.lon_deg, n.lat_deg)
    }

    pub fn view_center(self) -> LonLat {
        LonLat::new(-self.lon_deg, -self.lat_deg)
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.lon_deg,
            self.lat_deg.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG),
        )
    }

    pub fn offset(self, delta: Rotation) -> Self {
        Self::new(self.lon_deg + delta.lon_deg, self.lat_deg + delta.lat_deg)
    }
}

pub type CompletionCallback = Box<dyn FnOnce()>;

/// Eased rotation from a start to a target, stepped by the host frame loop.
///
/// The view centre travels the great circle between the two centres, so the
/// globe never spins through a pole on the way.
pub(crate) struct RotationTransition {
    path: GreatCircle,
    target: Rotation,
    duration: Time,
    elapsed: Time,
    on_complete: Option<CompletionCallback>,
}

pub(crate) enum TransitionStep {
    Running(Rotation),
    Finished(Rotation, Option<CompletionCallback>),
}

impl RotationTransition {
    pub(crate) fn new(
        from: Rotation,
        target: Rotation,
        duration: Time,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        Self {
            path: GreatCircle::new(from.view_center(), target.view_center()),
            target,
            duration,
            elapsed: Time::ZERO,
            on_complete,
        }
    }

    pub(crate) fn target(&self) -> Rotation {
        self.target
    }

    pub(crate) fn advance(&mut self, dt_s: f64) -> TransitionStep {
        self.elapsed = self.elapsed.advance(dt_s);
        let t = progress(self.elapsed, self.duration);
        if t >= 1.0 {
            return TransitionStep::Finished(self.target, self.on_complete.take());
        }
        let center = self.path.at(ease_cubic_in_out(t));
        TransitionStep::Running(Rotation::centered_on(center).clamped())
    }
}

impl std::fmt::Debug for RotationTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationTransition")
            .field("target", &self.target)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Rotation, RotationTransition, TransitionStep};
    use foundation::math::LonLat;
    use foundation::time::Time;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn clamps_latitude_only() {
        assert_eq!(Rotation::new(400.0, 95.0).clamped(), Rotation::new(400.0, 90.0));
        assert_eq!(Rotation::new(-10.0, -200.0).clamped(), Rotation::new(-10.0, -90.0));
        assert_eq!(Rotation::new(1.0, 2.0).clamped(), Rotation::new(1.0, 2.0));
    }

    #[test]
    fn centred_rotation_is_negated_position() {
        let r = Rotation::centered_on(LonLat::new(30.0, -12.0));
        assert_eq!(r, Rotation::new(-30.0, 12.0));
        assert_eq!(r.view_center(), LonLat::new(30.0, -12.0));
    }

    #[test]
    fn transition_runs_along_great_circle_and_lands_on_target() {
        let target = Rotation::new(-60.0, 0.0);
        let mut t = RotationTransition::new(Rotation::new(0.0, 0.0), target, Time(1.0), None);

        let TransitionStep::Running(mid) = t.advance(0.5) else {
            panic!("finished early");
        };
        assert_close(mid.lon_deg, -30.0, 1e-9);
        assert_close(mid.lat_deg, 0.0, 1e-9);

        match t.advance(0.6) {
            TransitionStep::Finished(end, callback) => {
                assert_eq!(end, target);
                assert!(callback.is_none());
            }
            TransitionStep::Running(_) => panic!("still running"),
        }
    }

    #[test]
    fn transition_avoids_polar_detour() {
        // Per-component interpolation would sweep the centre through lat 45.
        let mut t = RotationTransition::new(
            Rotation::new(-170.0, 0.0),
            Rotation::new(170.0, 0.0),
            Time(1.0),
            None,
        );
        for _ in 0..9 {
            let TransitionStep::Running(r) = t.advance(0.1) else {
                panic!("finished early");
            };
            assert_close(r.lat_deg, 0.0, 1e-9);
            assert!(r.lon_deg.abs() >= 170.0 - 1e-9, "lon {}", r.lon_deg);
        }
    }

    #[test]
    fn zero_duration_finishes_immediately_with_callback() {
        let mut t = RotationTransition::new(
            Rotation::default(),
            Rotation::new(10.0, 10.0),
            Time::ZERO,
            Some(Box::new(|| {})),
        );
        assert!(matches!(t.advance(0.0), TransitionStep::Finished(_, Some(_))));
    }
}
