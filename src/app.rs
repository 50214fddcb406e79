use anyhow::Result;
use sprites::SpriteRenderer;
use trail::{
    Clock, DriverState, FrameDriver, MonotonicClock, Point2, SharedState, Tick, TrailState,
    Viewport, MAX_RESOLUTION, POINT_SCALE_RANGE,
};

use crate::settings::Settings;
use crate::trail_plot::TrailPlot;

pub struct TrailApp {
    settings: Settings,
    shared: SharedState,
    driver: FrameDriver<MonotonicClock>,
    renderer: SpriteRenderer,
    trail_plot: TrailPlot,
}

impl TrailApp {
    /// Called once before the first frame. Fails if the GPU side can't be set up.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let settings = Settings::load(cc.storage);
        let renderer = SpriteRenderer::new(cc)?;

        let shared = TrailState::new(settings.trail.capacity).shared();
        shared
            .borrow_mut()
            .uniforms
            .set_point_scale(settings.point_scale);

        let mut driver = FrameDriver::new(
            SharedState::clone(&shared),
            &settings.trail,
            MonotonicClock::default(),
        )?;
        driver.start()?;

        Ok(Self {
            settings,
            shared,
            driver,
            renderer,
            trail_plot: TrailPlot::default(),
        })
    }
}

impl eframe::App for TrailApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.point_scale = self.shared.borrow().uniforms.point_scale();
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);

                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                self.trail_plot.options_ui(ui);
            });
        });

        egui::SidePanel::left("controls").show(ctx, |ui| {
            self.controls_ui(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.canvas_ui(ui);
            });

        if self.settings.show_inspector {
            let mut open = true;
            egui::Window::new("Trail inspector")
                .open(&mut open)
                .default_size([320.0, 320.0])
                .show(ctx, |ui| {
                    self.trail_plot.ui(ui);
                });
            self.settings.show_inspector = open;
        }
    }
}

impl TrailApp {
    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Point field");

        let mut point_scale = self.shared.borrow().uniforms.point_scale();
        if ui
            .add(egui::Slider::new(&mut point_scale, POINT_SCALE_RANGE).text("point scale"))
            .changed()
        {
            self.shared.borrow_mut().uniforms.set_point_scale(point_scale);
        }

        let mut resolution = self.settings.trail.resolution;
        if ui
            .add(egui::Slider::new(&mut resolution, 1..=MAX_RESOLUTION).text("grid resolution"))
            .on_hover_text("Points per edge. The whole grid is rebuilt on change.")
            .changed()
        {
            self.settings.trail.resolution = resolution;
            self.driver.set_resolution(resolution);
        }

        let mut max_age_ms = self.settings.trail.max_age * 1000.0;
        if ui
            .add(
                egui::Slider::new(&mut max_age_ms, 10.0..=1000.0)
                    .text("trail age")
                    .suffix(" ms"),
            )
            .changed()
        {
            self.settings.trail.max_age = max_age_ms / 1000.0;
            self.driver.set_max_age(self.settings.trail.max_age);
        }

        ui.separator();

        let field = self.driver.field();
        ui.label(format!("points: {}", field.len()));
        ui.label(format!(
            "viewport: {:.0}x{:.0}",
            field.viewport().width,
            field.viewport().height
        ));
        ui.label(format!(
            "trail: {}/{} samples, {:.0} ms window",
            self.driver.trail().count,
            self.settings.trail.capacity,
            self.driver.window().max_age() * 1000.0
        ));
        ui.label(format!("frames: {}", self.driver.frame_count()));
        ui.label(format!("target: {:?}", self.renderer.target_format()));

        ui.separator();

        ui.checkbox(&mut self.settings.show_inspector, "Show trail inspector");

        let running = self.driver.state() == DriverState::Running;
        if ui
            .add_enabled(running, egui::Button::new("Stop animation"))
            .on_hover_text("Freezes the field. The animation cannot be restarted.")
            .clicked()
        {
            self.driver.stop();
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            egui::warn_if_debug_build(ui);
        });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let viewport = Viewport::new(rect.width(), rect.height());
        self.driver.resize(viewport);

        // pointer moves since the last frame, oldest first
        let now = self.driver.clock().now();
        if response.hovered() {
            let moves: Vec<Point2<f32>> = ui.input(|i| {
                i.events
                    .iter()
                    .filter_map(|e| match e {
                        egui::Event::PointerMoved(pos) => Some(*pos - rect.min),
                        _ => None,
                    })
                    .filter_map(|local| viewport.to_ndc(&Point2::new(local.x, local.y)))
                    .collect()
            });
            let mut shared = self.shared.borrow_mut();
            for position in moves {
                shared.on_pointer_move(position, now);
            }
        }

        let tick = self
            .renderer
            .paint_frame(&mut self.driver, ui.painter(), rect);
        if tick == Tick::Scheduled {
            ui.ctx().request_repaint();
        }

        if self.settings.show_inspector {
            let shared = self.shared.borrow();
            let pointer = shared.uniforms.pointer_position();
            self.trail_plot.set_data(
                &shared.samples,
                [pointer.x, pointer.y],
                now,
                self.driver.window().max_age(),
            );
        }
    }
}
