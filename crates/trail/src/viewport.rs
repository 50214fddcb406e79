use na::{Point2, Vector2};

/// Size of the drawable canvas in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl From<[f32; 2]> for Viewport {
    fn from(size: [f32; 2]) -> Self {
        Self {
            width: size[0],
            height: size[1],
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vector2<f32> {
        Vector2::new(self.width, self.height)
    }

    /// A viewport with no area (or a non-finite side) has nothing to draw into.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Maps a position relative to the top-left corner of the canvas to normalized
    /// device coordinates. Screen y grows downwards, NDC y grows upwards.
    ///
    /// Positions outside the canvas are clamped to the [-1, 1] square. Returns `None`
    /// for an empty viewport.
    pub fn to_ndc(&self, local: &Point2<f32>) -> Option<Point2<f32>> {
        if self.is_empty() {
            return None;
        }
        let unit = local.coords.component_div(&self.size());
        let ndc = unit.scale(2.0) - Vector2::new(1.0, 1.0);
        Some(Point2::new(
            ndc.x.clamp(-1.0, 1.0),
            (-ndc.y).clamp(-1.0, 1.0),
        ))
    }
}
