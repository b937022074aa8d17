use crate::normalize::Bounds;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_NUM_COLORS: usize = 7;
pub const MAX_NUM_COLORS: usize = 7;
pub const DEFAULT_PIECES_PER_COLOR: usize = 7;
pub const DEFAULT_EPSILON: f64 = 1e-9;
pub const DEFAULT_CLEARANCE: f64 = 0.03;
pub const DEFAULT_RESOLUTION: usize = 100;
pub const DEFAULT_PIECE_RADIUS: f64 = 14.0;

/// Tokens per player in the classic game
pub const LACUNA_TOKENS_PER_PLAYER: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Layout has {rows} colors with {per_row:?} pieces, expected {colors} x {pieces}")]
    LayoutMismatch {
        rows: usize,
        per_row: Vec<usize>,
        colors: usize,
        pieces: usize,
    },
    #[error("Could not place piece {index} of color {color} without overlap")]
    LayoutFailed { color: usize, index: usize },
    #[error("Piece {index} of color {color} lies outside the board")]
    OutOfBounds { color: usize, index: usize },
}

/// How the winner is decided once the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Most captured pieces, then most distinct colors captured.
    #[default]
    TotalThenColors,
    /// Most colors in which the player holds a strict majority of the
    /// pieces, falling back to `TotalThenColors`.
    ColorMajorities,
}

/// Which token points a move may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Any point on the open segment.
    #[default]
    Free,
    /// Only points matching one of the sampler's points.
    Sampled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_colors: usize,
    pub pieces_per_color: usize,
    /// `None` means unlimited.
    pub tokens_per_player: Option<usize>,
    /// Geometric tolerance in normalized units.
    pub epsilon: f64,
    /// Minimum distance between a new token and any piece or token.
    pub clearance: f64,
    pub resolution: usize,
    pub placement_mode: PlacementMode,
    pub scoring: ScoringRule,
    /// Award leftover pieces to the owner of the nearest token at game end.
    pub collect_remaining: bool,
    pub bounds: Bounds,
    /// Physical radius, only used when generating random layouts.
    pub piece_radius: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            num_colors: DEFAULT_NUM_COLORS,
            pieces_per_color: DEFAULT_PIECES_PER_COLOR,
            tokens_per_player: None,
            epsilon: DEFAULT_EPSILON,
            clearance: DEFAULT_CLEARANCE,
            resolution: DEFAULT_RESOLUTION,
            placement_mode: PlacementMode::Free,
            scoring: ScoringRule::TotalThenColors,
            collect_remaining: false,
            bounds: Bounds::default(),
            piece_radius: DEFAULT_PIECE_RADIUS,
        }
    }
}

impl GameConfig {
    /// The classic rules: a limited token supply, body-sized line of
    /// sight, leftover collection and scoring by color majorities.
    pub fn lacuna() -> Self {
        let defaults = GameConfig::default();
        let board_width = defaults.bounds.width;
        GameConfig {
            tokens_per_player: Some(LACUNA_TOKENS_PER_PLAYER),
            epsilon: DEFAULT_PIECE_RADIUS / board_width,
            // token (10 + 3 border) touching a piece (14)
            clearance: 27.0 / board_width,
            scoring: ScoringRule::ColorMajorities,
            collect_remaining: true,
            ..defaults
        }
    }

    /// Shorthand for tests and small boards.
    pub fn with_size(num_colors: usize, pieces_per_color: usize) -> Self {
        GameConfig {
            num_colors,
            pieces_per_color,
            ..GameConfig::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_colors == 0 || self.num_colors > MAX_NUM_COLORS {
            return Err(ConfigError::Invalid(format!(
                "num_colors must be in 1..={}, got {}",
                MAX_NUM_COLORS, self.num_colors
            )));
        }
        if self.pieces_per_color == 0 {
            return Err(ConfigError::Invalid(
                "pieces_per_color must be positive".to_string(),
            ));
        }
        if self.tokens_per_player == Some(0) {
            return Err(ConfigError::Invalid(
                "tokens_per_player must be positive when set".to_string(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if !(self.clearance.is_finite() && self.clearance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "clearance must be non-negative, got {}",
                self.clearance
            )));
        }
        if self.resolution == 0 {
            return Err(ConfigError::Invalid(
                "resolution must be positive".to_string(),
            ));
        }
        if !(self.bounds.width > 0.0 && self.bounds.height > 0.0) {
            return Err(ConfigError::Invalid(
                "bounds must have a positive width and height".to_string(),
            ));
        }
        if !(self.piece_radius.is_finite() && self.piece_radius > 0.0) {
            return Err(ConfigError::Invalid(
                "piece_radius must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Radius used for the `PositionOccupied` check.
    pub fn occupancy_radius(&self) -> f64 {
        self.clearance.max(self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_colors, 7);
        assert_eq!(config.pieces_per_color, 7);
        assert_eq!(config.occupancy_radius(), DEFAULT_CLEARANCE);
    }

    #[test]
    fn test_lacuna_preset() {
        let config = GameConfig::lacuna();
        assert!(config.validate().is_ok());
        assert_eq!(config.tokens_per_player, Some(6));
        assert_eq!(config.scoring, ScoringRule::ColorMajorities);
        assert!(config.collect_remaining);
        assert!(config.clearance > config.epsilon);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            num_colors = 3
            pieces_per_color = 5
            tokens_per_player = 4
            scoring = "color_majorities"
            placement_mode = "sampled"
            "#,
        )
        .unwrap();

        assert_eq!(config.num_colors, 3);
        assert_eq!(config.pieces_per_color, 5);
        assert_eq!(config.tokens_per_player, Some(4));
        assert_eq!(config.scoring, ScoringRule::ColorMajorities);
        assert_eq!(config.placement_mode, PlacementMode::Sampled);
        assert_eq!(config.resolution, DEFAULT_RESOLUTION);
        assert_eq!(config.bounds, Bounds::default());
    }

    #[test]
    fn test_toml_bounds_table() {
        let config = GameConfig::from_toml_str(
            r#"
            [bounds]
            min_x = 0.0
            min_y = 0.0
            width = 100.0
            height = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(config.bounds, Bounds::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str("num_colors = 8"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("pieces_per_color = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("epsilon = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("tokens_per_player = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("num_colors = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
