//! Runtime configuration.
//!
//! Every cadence, path and draw constant lives here so the page can override
//! a subset through `start_game_with_config(json)`. Missing keys keep their
//! defaults.

use serde::Deserialize;

use crate::error::GameError;

/// What happens to heroes that no longer appear in the latest snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Heroes persist (and keep animating) until the level changes.
    #[default]
    Retain,
    /// Heroes absent from the latest snapshot are dropped on the next update.
    Prune,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub fetch_interval_ms: i32,
    pub frame_interval_ms: i32,
    pub api_base: String,
    pub asset_base: String,
    pub canvas_id: String,
    pub repo_owner_id: String,
    pub repo_name_id: String,
    pub retention: RetentionPolicy,
    pub log_level: String,
    pub layout: Layout,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fetch_interval_ms: 10_000,
            frame_interval_ms: 250,
            api_base: "/api".to_string(),
            asset_base: "/static/images".to_string(),
            canvas_id: "game".to_string(),
            repo_owner_id: "repo-owner".to_string(),
            repo_name_id: "repo-name".to_string(),
            retention: RetentionPolicy::Retain,
            log_level: "info".to_string(),
            layout: Layout::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(GameError::Config)
    }

    /// Unknown level names fall back to `Info`.
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

/// Sprite sheet geometry and scene placement (canvas pixels).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Width of one frame in a sprite sheet (source pixels).
    pub frame_width: f64,
    pub frame_height: f64,
    pub scale: f64,
    /// Extra multiplier applied on top of `scale` for the boss.
    pub boss_scale: f64,
    pub hero_columns: usize,
    pub hero_origin: (f64, f64),
    pub hero_spacing: (f64, f64),
    /// Top-left of the boss sprite.
    pub boss_origin: (f64, f64),
    pub health_bar_width: f64,
    pub health_bar_height: f64,
    pub font: String,
    pub title_font: String,
    pub text_color: String,
    pub placeholder: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            frame_width: 100.0,
            frame_height: 100.0,
            scale: 3.0,
            boss_scale: 1.5,
            hero_columns: 4,
            hero_origin: (0.0, 120.0),
            hero_spacing: (110.0, 130.0),
            boss_origin: (620.0, 40.0),
            health_bar_width: 300.0,
            health_bar_height: 18.0,
            font: "14px monospace".to_string(),
            title_font: "bold 20px monospace".to_string(),
            text_color: "#ffffff".to_string(),
            placeholder: "No heroes yet. Push a commit to join the fight!".to_string(),
        }
    }
}

impl Layout {
    pub fn hero_size(&self) -> (f64, f64) {
        (self.frame_width * self.scale, self.frame_height * self.scale)
    }

    pub fn boss_size(&self) -> (f64, f64) {
        let s = self.scale * self.boss_scale;
        (self.frame_width * s, self.frame_height * s)
    }

    /// Top-left canvas position for the hero at display `position`.
    /// Heroes fill rows left to right, `hero_columns` per row.
    pub fn hero_slot(&self, position: usize) -> (f64, f64) {
        let columns = self.hero_columns.max(1);
        let col = (position % columns) as f64;
        let row = (position / columns) as f64;
        (
            self.hero_origin.0 + col * self.hero_spacing.0,
            self.hero_origin.1 + row * self.hero_spacing.1,
        )
    }
}
