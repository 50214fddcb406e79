use trail::{TrailConfig, POINT_SCALE_RANGE};

/// User-tweakable settings, persisted by eframe between runs. Trail samples are
/// never stored.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub(crate) struct Settings {
    pub(crate) point_scale: f32,
    pub(crate) show_inspector: bool,
    pub(crate) trail: TrailConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            point_scale: 1.0,
            show_inspector: false,
            trail: TrailConfig::default(),
        }
    }
}

impl Settings {
    pub(crate) fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let stored: Self = storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        stored.sanitized()
    }

    /// Brings values restored from an older or hand-edited state back in range.
    pub(crate) fn sanitized(self) -> Self {
        let point_scale = if self.point_scale.is_finite() {
            self.point_scale
                .clamp(*POINT_SCALE_RANGE.start(), *POINT_SCALE_RANGE.end())
        } else {
            1.0
        };
        Self {
            point_scale,
            trail: self.trail.or_default(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_storage_gives_defaults() {
        assert_eq!(Settings::load(None), Settings::default());
    }

    #[test]
    fn out_of_range_values_are_repaired() {
        let settings = Settings {
            point_scale: 7.0,
            show_inspector: true,
            trail: TrailConfig {
                capacity: 500,
                ..Default::default()
            },
        }
        .sanitized();
        assert_eq!(settings.point_scale, 2.0);
        assert!(settings.show_inspector);
        assert_eq!(settings.trail, TrailConfig::default());
    }

    #[test]
    fn nan_scale_resets() {
        let settings = Settings {
            point_scale: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.point_scale, 1.0);
    }
}
