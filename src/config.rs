//! Physics and interaction tuning.
//!
//! The defaults reproduce the reference layout for small personal networks
//! (a few dozen nodes). They are product choices rather than invariants, so
//! all of them can be overridden from a JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub charge_strength: f32,
    pub charge_theta: f32,
    pub charge_distance_min: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub collision_iterations: u32,
    /// Only used while no node anchors the layout.
    pub center_strength: f32,
    pub velocity_decay: f32,
    pub max_speed: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub drag_alpha_target: f32,
    pub recenter_alpha: f32,
    pub resize_alpha: f32,
    pub warmup_steps: u32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            charge_strength: -1500.0,
            charge_theta: 0.9,
            charge_distance_min: 1.0,
            link_distance: 180.0,
            link_strength: 1.0,
            collision_radius: 100.0,
            collision_strength: 1.0,
            collision_iterations: 2,
            center_strength: 1.0,
            velocity_decay: 0.4,
            max_speed: 60.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            drag_alpha_target: 0.3,
            recenter_alpha: 1.0,
            resize_alpha: 0.2,
            warmup_steps: 100,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("charge_strength", self.charge_strength),
            ("charge_theta", self.charge_theta),
            ("charge_distance_min", self.charge_distance_min),
            ("link_distance", self.link_distance),
            ("link_strength", self.link_strength),
            ("collision_radius", self.collision_radius),
            ("collision_strength", self.collision_strength),
            ("center_strength", self.center_strength),
            ("max_speed", self.max_speed),
            ("alpha_min", self.alpha_min),
            ("drag_alpha_target", self.drag_alpha_target),
            ("recenter_alpha", self.recenter_alpha),
            ("resize_alpha", self.resize_alpha),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    expected: "finite",
                    value,
                });
            }
        }

        let positive = [
            ("link_distance", self.link_distance),
            ("collision_radius", self.collision_radius),
            ("max_speed", self.max_speed),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid {
                    field,
                    expected: "positive",
                    value,
                });
            }
        }

        for (field, value) in [
            ("velocity_decay", self.velocity_decay),
            ("alpha_decay", self.alpha_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    expected: "within [0, 1]",
                    value,
                });
            }
        }

        if self.max_zoom < self.min_zoom {
            return Err(ConfigError::Invalid {
                field: "max_zoom",
                expected: "at least min_zoom",
                value: self.max_zoom,
            });
        }

        Ok(())
    }
}
