//! Keyframed translation curves.

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

use super::component::{Capabilities, Component, UpdateContext, component_boilerplate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time_ms: u64,
    pub position: [f32; 3],
}

/// Piecewise linear 3D curve over time. Keys are kept sorted by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve3 {
    keys: Vec<Keyframe>,
}

impl Curve3 {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by_key(|k| k.time_ms);
        Self { keys }
    }

    pub fn add(&mut self, time_ms: u64, position: Vec3) {
        let key = Keyframe {
            time_ms,
            position: position.to_array(),
        };
        let at = self.keys.partition_point(|k| k.time_ms <= time_ms);
        self.keys.insert(at, key);
    }

    pub fn duration_ms(&self) -> u64 {
        self.keys.last().map_or(0, |k| k.time_ms)
    }

    /// Position at `time_ms`, holding the end keys outside the range.
    pub fn evaluate(&self, time_ms: u64) -> Option<Vec3> {
        let first = self.keys.first()?;
        if time_ms <= first.time_ms {
            return Some(Vec3::from_array(first.position));
        }
        let next = self.keys.partition_point(|k| k.time_ms <= time_ms);
        let Some(b) = self.keys.get(next) else {
            return self.keys.last().map(|k| Vec3::from_array(k.position));
        };
        let a = &self.keys[next - 1];
        let span = (b.time_ms - a.time_ms) as f32;
        let t = if span > 0.0 {
            (time_ms - a.time_ms) as f32 / span
        } else {
            1.0
        };
        Some(Vec3::from_array(a.position).lerp(Vec3::from_array(b.position), t))
    }
}

/// Drives the owner's translation along a [`Curve3`].
#[derive(Debug, Clone)]
pub struct CurveController {
    pub curve: Curve3,
    pub looped: bool,
    elapsed_ms: u64,
    enabled: bool,
}

impl CurveController {
    pub fn new(curve: Curve3, looped: bool) -> Self {
        Self {
            curve,
            looped,
            elapsed_ms: 0,
            enabled: true,
        }
    }
}

impl Component for CurveController {
    component_boilerplate!("CurveController");

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATABLE
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.elapsed_ms += ctx.time.delta_ms;
        let duration = self.curve.duration_ms();
        if self.looped && duration > 0 {
            self.elapsed_ms %= duration;
        }
        if let Some(position) = self.curve.evaluate(self.elapsed_ms) {
            ctx.transform.translation = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_interpolates_and_holds_ends() {
        let mut curve = Curve3::default();
        curve.add(1000, Vec3::new(10.0, 0.0, 0.0));
        curve.add(0, Vec3::ZERO);

        assert_eq!(curve.evaluate(0), Some(Vec3::ZERO));
        assert_eq!(curve.evaluate(500), Some(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(curve.evaluate(5000), Some(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(Curve3::default().evaluate(10), None);
    }
}
