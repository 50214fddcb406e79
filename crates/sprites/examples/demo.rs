use sprites::SpriteRenderer;
use trail::{Clock, FrameDriver, MonotonicClock, Point2, Tick, TrailConfig, TrailState, Viewport};

/// Point field with a trail that follows a synthetic orbit instead of the mouse.
struct Demo {
    renderer: SpriteRenderer,
    driver: FrameDriver<MonotonicClock>,
}

impl eframe::App for Demo {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.driver.clock().now();
        let angle = now as f32 * 3.0;
        let orbit = Point2::new(0.6 * angle.cos(), 0.6 * (2.0 * angle).sin());
        self.driver.shared().borrow_mut().on_pointer_move(orbit, now);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, _response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            self.driver.resize(Viewport::new(rect.width(), rect.height()));
            let tick = self
                .renderer
                .paint_frame(&mut self.driver, ui.painter(), rect);
            if tick == Tick::Scheduled {
                ctx.request_repaint();
            }
        });
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Sprites Demo",
        native_options,
        Box::new(|cc| {
            let renderer = SpriteRenderer::new(cc)?;
            let config = TrailConfig {
                resolution: 120,
                ..Default::default()
            };
            let shared = TrailState::default().shared();
            let mut driver = FrameDriver::new(shared, &config, MonotonicClock::default())?;
            driver.start()?;
            Ok(Box::new(Demo { renderer, driver }))
        }),
    )
}
