use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite number",
        })
    }
}

fn ensure(field: &'static str, holds: bool, reason: &'static str) -> Result<(), ConfigError> {
    if holds {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
}

impl ExplorerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the layout or view transform cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        self.interaction.validate()
    }
}

/// Force and cooling parameters of the layout simulation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rest length of relation springs.
    pub link_distance: f32,
    /// Many-body strength; negative values repel.
    pub charge_strength: f32,
    /// Barnes-Hut opening angle for the charge force.
    pub charge_theta: f32,
    /// Extra clearance added to every node radius by the collision force.
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    /// Alpha used when resizing or dragging wakes the simulation.
    pub reheat_alpha: f32,
}

impl LayoutConfig {
    /// Ticks the default decay takes to cool from 1 to `alpha_min`.
    pub const COOLING_TICKS: f32 = 300.0;

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("layout.link_distance", self.link_distance),
            ("layout.charge_strength", self.charge_strength),
            ("layout.charge_theta", self.charge_theta),
            ("layout.collision_padding", self.collision_padding),
            ("layout.collision_strength", self.collision_strength),
            ("layout.alpha_min", self.alpha_min),
            ("layout.alpha_decay", self.alpha_decay),
            ("layout.velocity_decay", self.velocity_decay),
            ("layout.reheat_alpha", self.reheat_alpha),
        ] {
            finite(field, value)?;
        }

        ensure(
            "layout.alpha_min",
            self.alpha_min > 0.0 && self.alpha_min < 1.0,
            "must lie in (0, 1)",
        )?;
        ensure(
            "layout.alpha_decay",
            self.alpha_decay > 0.0 && self.alpha_decay <= 1.0,
            "must lie in (0, 1]",
        )?;
        ensure(
            "layout.velocity_decay",
            (0.0..=1.0).contains(&self.velocity_decay),
            "must lie in [0, 1]",
        )?;
        ensure(
            "layout.reheat_alpha",
            (0.0..=1.0).contains(&self.reheat_alpha),
            "must lie in [0, 1]",
        )
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 200.0,
            charge_strength: -200.0,
            charge_theta: 0.9,
            collision_padding: 20.0,
            collision_strength: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / Self::COOLING_TICKS),
            velocity_decay: 0.4,
            reheat_alpha: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Screen distance a press may travel and still count as a click.
    pub drag_threshold: f32,
    pub scroll_zoom_rate: f32,
}

impl InteractionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("interaction.min_zoom", self.min_zoom),
            ("interaction.max_zoom", self.max_zoom),
            ("interaction.drag_threshold", self.drag_threshold),
            ("interaction.scroll_zoom_rate", self.scroll_zoom_rate),
        ] {
            finite(field, value)?;
        }

        ensure("interaction.min_zoom", self.min_zoom > 0.0, "must be positive")?;
        ensure(
            "interaction.max_zoom",
            self.max_zoom >= self.min_zoom,
            "must not be below min_zoom",
        )?;
        ensure(
            "interaction.drag_threshold",
            self.drag_threshold >= 0.0,
            "must not be negative",
        )
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 3.0,
            drag_threshold: 3.0,
            scroll_zoom_rate: 0.0018,
        }
    }
}
