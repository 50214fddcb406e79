#![warn(clippy::all, rust_2018_idioms)]

mod app;
mod settings;
mod trail_plot;

pub use app::TrailApp;
