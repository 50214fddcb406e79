//! Pointer trail bookkeeping for the point field renderer.
//!
//! Pointer moves land in a bounded [`SampleBuffer`]. Every frame the
//! [`FrameDriver`] ages the buffer through a [`TrailWindow`], flattens what is
//! left and hands it, together with the static [`PointField`], to a
//! [`RenderStage`]. Nothing in here touches the GPU.
extern crate nalgebra as na;

pub mod clock;
pub mod config;
pub mod driver;
pub mod field;
pub mod sample_buffer;
pub mod state;
pub mod viewport;
pub mod window;

pub use clock::{Clock, MonotonicClock};
pub use config::{TrailConfig, MAX_RESOLUTION, MAX_TRAIL_CAPACITY};
pub use driver::{DriverState, FrameDriver, RenderStage, Tick, UniformPayload};
pub use field::{GridPoint, PointField};
pub use na::Point2;
pub use sample_buffer::{Sample, SampleBuffer};
pub use state::{ScalarUniforms, SharedState, TrailState, POINT_SCALE_RANGE};
pub use viewport::Viewport;
pub use window::{FlattenedTrail, TrailWindow};
