use egui::epaint::Hsva;
use egui::{Color32, Response, TextWrapMode};
use egui_plot::{CoordinatesFormatter, Corner, Legend, Plot, PlotPoints, Points};
use trail::{Sample, SampleBuffer};

/// Debug view of the live trail, drawn in plot space rather than on the canvas.
#[derive(Clone, PartialEq)]
pub struct TrailPlot {
    coordinates: bool,
    show_axes: bool,
    show_pointer: bool,
    radius: f32,

    samples: Vec<Sample>,
    pointer: [f64; 2],
    max_age: f64,
    now: f64,
}

impl Default for TrailPlot {
    fn default() -> Self {
        Self {
            coordinates: true,
            show_axes: true,
            show_pointer: true,
            radius: 3.0,

            samples: Vec::new(),
            pointer: [0.0, 0.0],
            max_age: trail::window::DEFAULT_MAX_AGE,
            now: 0.0,
        }
    }
}

impl TrailPlot {
    pub fn options_ui(&mut self, ui: &mut egui::Ui) {
        let Self {
            coordinates,
            show_axes,
            show_pointer,
            radius,
            ..
        } = self;

        ui.menu_button("View", |ui| {
            ui.checkbox(show_axes, "Show axes");
            ui.checkbox(coordinates, "Show coordinates on hover");

            ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
            ui.checkbox(show_pointer, "Show pointer")
                .on_hover_text("Marks the latest pointer position.");
            ui.add(egui::Slider::new(radius, 1.0..=8.0).text("Sample radius"));
        });
    }

    /// Copies the samples still alive at `now` out of the shared buffer.
    pub fn set_data(&mut self, samples: &SampleBuffer, pointer: [f32; 2], now: f64, max_age: f64) {
        self.samples.clear();
        self.samples.extend(samples.snapshot().copied());
        self.pointer = [pointer[0] as f64, pointer[1] as f64];
        self.now = now;
        self.max_age = max_age;
    }

    /// Fades from the newest sample (1.0) to one about to expire (0.0).
    fn freshness(&self, sample: &Sample) -> f32 {
        if self.max_age <= 0.0 {
            return 0.0;
        }
        (1.0 - (self.now - sample.timestamp) / self.max_age).clamp(0.0, 1.0) as f32
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> Response {
        let plot = Plot::new("trail_plot")
            .legend(Legend::default())
            .show_axes(self.show_axes)
            .show_grid(true)
            .data_aspect(1.0)
            .include_x(-1.0)
            .include_x(1.0)
            .include_y(-1.0)
            .include_y(1.0);

        let plot = if self.coordinates {
            plot.coordinates_formatter(Corner::LeftBottom, CoordinatesFormatter::default())
        } else {
            plot
        };

        plot.show(ui, |plot_ui| {
            for sample in &self.samples {
                let freshness = self.freshness(sample);
                let color: Color32 = Hsva::new(0.55, 0.8, 0.4 + 0.6 * freshness, 1.0).into();
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[
                        sample.position.x as f64,
                        sample.position.y as f64,
                    ]]))
                    .radius(self.radius * (0.5 + freshness))
                    .color(color)
                    .name("trail"),
                );
            }

            if self.show_pointer {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![self.pointer]))
                        .radius(self.radius)
                        .color(Color32::YELLOW)
                        .name("pointer"),
                );
            }
        })
        .response
    }
}
