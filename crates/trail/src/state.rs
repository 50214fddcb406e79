use std::cell::RefCell;
use std::rc::Rc;

use na::Point2;

use crate::sample_buffer::SampleBuffer;

pub const POINT_SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Scalars read by the renderer once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarUniforms {
    point_scale: f32,
    pointer_position: Point2<f32>,
}

impl Default for ScalarUniforms {
    fn default() -> Self {
        Self {
            point_scale: 1.0,
            pointer_position: Point2::origin(),
        }
    }
}

impl ScalarUniforms {
    pub fn point_scale(&self) -> f32 {
        self.point_scale
    }

    pub fn set_point_scale(&mut self, scale: f32) {
        if scale.is_nan() {
            return;
        }
        self.point_scale = scale.clamp(*POINT_SCALE_RANGE.start(), *POINT_SCALE_RANGE.end());
    }

    pub fn pointer_position(&self) -> Point2<f32> {
        self.pointer_position
    }

    pub fn set_pointer_position(&mut self, position: Point2<f32>) {
        self.pointer_position = clamp_ndc(position);
    }
}

fn clamp_ndc(p: Point2<f32>) -> Point2<f32> {
    Point2::new(p.x.clamp(-1.0, 1.0), p.y.clamp(-1.0, 1.0))
}

/// State shared between the input handlers and the frame driver.
///
/// Each field has a single writer: pointer moves write `samples` and the pointer
/// position, the control panel writes the point scale. The driver only prunes
/// `samples` and reads the rest.
#[derive(Clone, Debug, Default)]
pub struct TrailState {
    pub samples: SampleBuffer,
    pub uniforms: ScalarUniforms,
}

pub type SharedState = Rc<RefCell<TrailState>>;

impl TrailState {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: SampleBuffer::new(capacity),
            uniforms: ScalarUniforms::default(),
        }
    }

    pub fn shared(self) -> SharedState {
        Rc::new(RefCell::new(self))
    }

    /// Pointer moved to `position` (NDC) at `timestamp`.
    pub fn on_pointer_move(&mut self, position: Point2<f32>, timestamp: f64) {
        let position = clamp_ndc(position);
        self.samples.append(position, timestamp);
        self.uniforms.set_pointer_position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_scale_is_clamped() {
        let mut uniforms = ScalarUniforms::default();
        assert_eq!(uniforms.point_scale(), 1.0);
        uniforms.set_point_scale(3.5);
        assert_eq!(uniforms.point_scale(), 2.0);
        uniforms.set_point_scale(-1.0);
        assert_eq!(uniforms.point_scale(), 0.0);
        uniforms.set_point_scale(f32::NAN);
        assert_eq!(uniforms.point_scale(), 0.0);
    }

    #[test]
    fn pointer_move_appends_and_tracks_position() {
        let mut state = TrailState::new(2);
        state.on_pointer_move(Point2::new(0.25, -0.75), 1.0);
        state.on_pointer_move(Point2::new(1.5, 0.5), 1.1);
        state.on_pointer_move(Point2::new(-0.5, 0.5), 1.2);

        assert_eq!(state.samples.len(), 2);
        assert_eq!(state.uniforms.pointer_position(), Point2::new(-0.5, 0.5));
        let first = state.samples.snapshot().next().unwrap();
        assert_eq!(first.position, Point2::new(1.0, 0.5));
    }
}
