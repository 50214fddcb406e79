use anyhow::{bail, Result};
use na::Point2;

use crate::clock::Clock;
use crate::config::TrailConfig;
use crate::field::PointField;
use crate::state::SharedState;
use crate::viewport::Viewport;
use crate::window::{FlattenedTrail, TrailWindow};

/// Everything the sprite shader reads per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformPayload<'a> {
    pub point_scale: f32,
    pub pointer_position: Point2<f32>,
    pub trail: &'a FlattenedTrail,
}

/// The GPU-facing side of a frame. Calls arrive in the order
/// `bind`, `set_attributes`, `set_uniforms`, `draw`.
pub trait RenderStage {
    /// Makes the sprite program current.
    fn bind(&mut self);

    /// Per-point attributes. Implementations should only re-upload when
    /// [`PointField::generation`] changed.
    fn set_attributes(&mut self, field: &PointField);

    fn set_uniforms(&mut self, payload: &UniformPayload<'_>);

    /// Draws `point_count` sprites.
    fn draw(&mut self, point_count: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Not started yet.
    Idle,
    Running,
    /// Stopped for good, there is no way back to `Running`.
    Stopped,
}

/// Whether the host should schedule another tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Scheduled,
    Halted,
}

pub struct FrameDriver<C: Clock> {
    state: DriverState,
    clock: C,
    shared: SharedState,
    window: TrailWindow,
    field: PointField,
    trail: FlattenedTrail,
    frame_count: u64,
}

impl<C: Clock> FrameDriver<C> {
    /// Fails if `config` asks for more trail samples than the shader can read.
    pub fn new(shared: SharedState, config: &TrailConfig, clock: C) -> Result<Self> {
        let config = config.validated()?;
        shared.borrow_mut().samples.set_capacity(config.capacity);
        Ok(Self {
            state: DriverState::Idle,
            clock,
            shared,
            window: TrailWindow::new(config.max_age),
            field: PointField::new(config.resolution),
            trail: FlattenedTrail::default(),
            frame_count: 0,
        })
    }

    /// Enters `Running`. Call once the render stage's resources exist.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            DriverState::Idle => {
                log::info!("frame driver running ({} points)", self.field.len());
                self.state = DriverState::Running;
                Ok(())
            }
            DriverState::Running => Ok(()),
            DriverState::Stopped => bail!("frame driver was stopped and cannot restart"),
        }
    }

    /// Prevents further ticks. A tick already in progress still completes.
    pub fn stop(&mut self) {
        if self.state == DriverState::Running {
            log::info!("frame driver stopped after {} frames", self.frame_count);
        }
        self.state = DriverState::Stopped;
    }

    pub fn tick<S: RenderStage + ?Sized>(&mut self, stage: &mut S) -> Tick {
        if self.state != DriverState::Running {
            return Tick::Halted;
        }

        let now = self.clock.now();
        let (point_scale, pointer_position) = {
            let mut shared = self.shared.borrow_mut();
            let evicted = self.window.prune(&mut shared.samples, now);
            self.window.flatten_into(&shared.samples, &mut self.trail);
            log::trace!(
                "frame {} at {now:.3}s: {} trail samples, {evicted} evicted",
                self.frame_count,
                self.trail.count
            );
            (
                shared.uniforms.point_scale(),
                shared.uniforms.pointer_position(),
            )
        };

        if !self.field.viewport().is_empty() {
            let payload = UniformPayload {
                point_scale,
                pointer_position,
                trail: &self.trail,
            };
            stage.bind();
            stage.set_attributes(&self.field);
            stage.set_uniforms(&payload);
            stage.draw(u32::try_from(self.field.len()).unwrap_or(u32::MAX));
        }
        self.frame_count += 1;

        match self.state {
            DriverState::Running => Tick::Scheduled,
            _ => Tick::Halted,
        }
    }

    /// Regenerates the field if the canvas size changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport == self.field.viewport() {
            return false;
        }
        log::info!("viewport resized to {}x{}", viewport.width, viewport.height);
        self.field.resize(viewport);
        true
    }

    pub fn set_resolution(&mut self, resolution: u32) {
        if resolution != self.field.resolution() {
            self.field.set_resolution(resolution);
        }
    }

    /// Ignored unless `max_age` is a positive number of seconds.
    pub fn set_max_age(&mut self, max_age: f64) {
        if max_age.is_finite() && max_age > 0.0 {
            self.window.set_max_age(max_age);
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The trail flattened by the most recent tick.
    pub fn trail(&self) -> &FlattenedTrail {
        &self.trail
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn window(&self) -> &TrailWindow {
        &self.window
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }
}
