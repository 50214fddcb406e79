use std::sync::Arc;

use crate::viewport::Viewport;

pub const DEFAULT_RESOLUTION: u32 = 200;
pub const DEFAULT_POINT_COLOR: [f32; 4] = [0.0, 0.0, 0.5, 0.6];

/// One static point sprite. Laid out to be uploaded as-is into an instance buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridPoint {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub size: f32,
}

/// Lays out `resolution * resolution` points over [-1, 1]², x-major.
///
/// A resolution of 1 puts its single point at the origin.
pub fn generate(resolution: u32) -> Vec<GridPoint> {
    let n = resolution as usize;
    let coord = |k: usize| -> f32 {
        if n <= 1 {
            0.0
        } else {
            -1.0 + 2.0 * k as f32 / (n - 1) as f32
        }
    };

    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        let x = coord(i);
        for j in 0..n {
            points.push(GridPoint {
                position: [x, coord(j), 0.0],
                color: DEFAULT_POINT_COLOR,
                size: 1.0,
            });
        }
    }
    points
}

/// The grid currently handed to the renderer.
///
/// Every regeneration swaps in a fresh allocation and bumps `generation`, so
/// consumers holding the previous `Arc` keep seeing the old grid unchanged.
#[derive(Clone, Debug)]
pub struct PointField {
    resolution: u32,
    viewport: Viewport,
    generation: u64,
    points: Arc<[GridPoint]>,
}

impl PointField {
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            viewport: Viewport::default(),
            generation: 0,
            points: generate(resolution).into(),
        }
    }

    /// Records the new canvas size and rebuilds the grid. An empty viewport is
    /// remembered but leaves the grid alone, there is nothing to draw into.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if viewport.is_empty() {
            log::debug!("viewport {viewport:?} is empty, keeping current field");
            return;
        }
        self.regenerate();
    }

    pub fn set_resolution(&mut self, resolution: u32) {
        self.resolution = resolution;
        self.regenerate();
    }

    fn regenerate(&mut self) {
        self.points = generate(self.resolution).into();
        self.generation += 1;
        log::debug!(
            "regenerated {}x{} field (generation {})",
            self.resolution,
            self.resolution,
            self.generation
        );
    }

    pub fn points(&self) -> &Arc<[GridPoint]> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_square_grid_in_row_major_order() {
        let points = generate(3);
        assert_eq!(points.len(), 9);
        let positions: Vec<[f32; 2]> = points
            .iter()
            .map(|p| [p.position[0], p.position[1]])
            .collect();
        assert_eq!(
            positions,
            vec![
                [-1.0, -1.0],
                [-1.0, 0.0],
                [-1.0, 1.0],
                [0.0, -1.0],
                [0.0, 0.0],
                [0.0, 1.0],
                [1.0, -1.0],
                [1.0, 0.0],
                [1.0, 1.0],
            ]
        );
        assert!(points
            .iter()
            .all(|p| p.position[2] == 0.0 && p.size == 1.0 && p.color == DEFAULT_POINT_COLOR));
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(57), generate(57));
        assert_eq!(generate(200).len(), 40_000);
    }

    #[test]
    fn single_point_sits_at_origin() {
        assert_eq!(
            generate(1),
            vec![GridPoint {
                position: [0.0, 0.0, 0.0],
                color: DEFAULT_POINT_COLOR,
                size: 1.0,
            }]
        );
        assert!(generate(0).is_empty());
    }

    #[test]
    fn grid_spans_unit_square() {
        let points = generate(200);
        assert_eq!(points.first().unwrap().position, [-1.0, -1.0, 0.0]);
        assert_eq!(points.last().unwrap().position, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn resize_replaces_points() {
        let mut field = PointField::new(DEFAULT_RESOLUTION);
        let before = Arc::clone(field.points());
        let snapshot = before.to_vec();

        field.resize(Viewport::new(1024.0, 768.0));

        assert!(!Arc::ptr_eq(&before, field.points()));
        assert_eq!(before.to_vec(), snapshot);
        assert_eq!(&field.points()[..], &snapshot[..]);
        assert_eq!(field.generation(), 1);
        assert_eq!(field.viewport(), Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn empty_resize_keeps_points() {
        let mut field = PointField::new(4);
        let before = Arc::clone(field.points());
        field.resize(Viewport::new(0.0, 0.0));
        assert!(Arc::ptr_eq(&before, field.points()));
        assert_eq!(field.generation(), 0);
        assert!(field.viewport().is_empty());
    }

    #[test]
    fn resolution_change_regenerates() {
        let mut field = PointField::new(4);
        field.set_resolution(2);
        assert_eq!(field.len(), 4);
        assert_eq!(field.resolution(), 2);
        assert_eq!(field.generation(), 1);
    }
}
