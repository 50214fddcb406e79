use trail::{UniformPayload, Viewport, MAX_TRAIL_CAPACITY};

/// Trail positions are packed two per `vec4` to meet uniform array stride rules.
pub const TRAIL_SLOTS: usize = MAX_TRAIL_CAPACITY / 2;

/// Mirrors `struct Uniforms` in `sprite_shader.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniform {
    pub viewport_size: [f32; 2],
    pub pointer: [f32; 2],
    pub point_scale: f32,
    pub trail_count: u32,
    pub _pad: [u32; 2],
    pub trail: [[f32; 4]; TRAIL_SLOTS],
}

impl Uniform {
    pub fn new(viewport: Viewport, payload: &UniformPayload<'_>) -> Self {
        let mut uniform = Self {
            viewport_size: [viewport.width, viewport.height],
            pointer: [payload.pointer_position.x, payload.pointer_position.y],
            point_scale: payload.point_scale,
            ..Default::default()
        };
        let written = payload.trail.pack_vec4(&mut uniform.trail);
        uniform.trail_count = written as u32;
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};
    use trail::{FlattenedTrail, Point2};

    #[test]
    fn layout_matches_shader() {
        assert_eq!(offset_of!(Uniform, point_scale), 16);
        assert_eq!(offset_of!(Uniform, trail_count), 20);
        assert_eq!(offset_of!(Uniform, trail), 32);
        assert_eq!(size_of::<Uniform>(), 32 + 16 * TRAIL_SLOTS);
        assert_eq!(size_of::<Uniform>() % 16, 0);
    }

    #[test]
    fn shader_array_fits_trail_capacity() {
        let shader = include_str!("./sprite_shader.wgsl");
        assert!(shader.contains(&format!("array<vec4<f32>, {TRAIL_SLOTS}>")));
        assert!(shader.contains(&format!("const TRAIL_LEN: u32 = {MAX_TRAIL_CAPACITY}u;")));
    }

    #[test]
    fn packs_payload() {
        let trail = FlattenedTrail {
            positions: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            count: 3,
        };
        let payload = UniformPayload {
            point_scale: 0.5,
            pointer_position: Point2::new(0.5, 0.6),
            trail: &trail,
        };
        let uniform = Uniform::new(Viewport::new(320.0, 240.0), &payload);

        assert_eq!(uniform.viewport_size, [320.0, 240.0]);
        assert_eq!(uniform.pointer, [0.5, 0.6]);
        assert_eq!(uniform.point_scale, 0.5);
        assert_eq!(uniform.trail_count, 3);
        assert_eq!(uniform.trail[0], [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(uniform.trail[1], [0.5, 0.6, 0.0, 0.0]);
        assert!(uniform.trail[2..].iter().all(|slot| *slot == [0.0; 4]));
    }

    #[test]
    fn empty_trail_has_zero_count() {
        let trail = FlattenedTrail::default();
        let payload = UniformPayload {
            point_scale: 1.0,
            pointer_position: Point2::origin(),
            trail: &trail,
        };
        let uniform = Uniform::new(Viewport::new(1.0, 1.0), &payload);
        assert_eq!(uniform.trail_count, 0);
        assert_eq!(uniform.trail, [[0.0; 4]; TRAIL_SLOTS]);
    }
}
