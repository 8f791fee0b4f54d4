// Configuration module for reading Snake.toml
// This module provides OOP-style configuration management for the Battlesnake bot

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub decision: DecisionConfig,
    pub appearance: AppearanceConfig,
    pub debug: DebugConfig,
}

/// Response time budget
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// How much room a region bounded only by our own body must offer.
///
/// Worst case we enter, eat every disc inside and grow by that much, and
/// still need to turn around without biting ourselves.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpaceThreshold {
    /// `length / 2 - food`
    Subtractive,
    /// `length / 2 + food`
    Additive,
}

impl SpaceThreshold {
    /// Minimum region size for a self-bounded region to be enterable
    pub fn minimum_size(&self, length: usize, food: usize) -> i64 {
        let half = (length / 2) as i64;
        match self {
            SpaceThreshold::Subtractive => half - food as i64,
            SpaceThreshold::Additive => half + food as i64,
        }
    }
}

/// Decision cascade constants
#[derive(Debug, Deserialize, Clone)]
pub struct DecisionConfig {
    pub space_threshold: SpaceThreshold,
    /// Move returned when our head is completely enclosed
    pub fallback_direction: Direction,
    /// Turns during which every snake is assumed to be growing
    pub growth_opening_turns: i32,
    /// Contested food is skipped while at least this many snakes remain
    pub contested_food_min_snakes: usize,
    /// Extra weight of a food cell among a rival's escape options
    pub escape_food_bonus: u32,
}

/// A named display color
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: String,
    pub hex: String,
}

impl Default for PaletteColor {
    fn default() -> Self {
        PaletteColor {
            name: "gray".to_string(),
            hex: "#888888".to_string(),
        }
    }
}

/// Appearance reported to the game server
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub head_type: String,
    pub tail_type: String,
    pub palette: Vec<PaletteColor>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
            },
            decision: DecisionConfig {
                space_threshold: SpaceThreshold::Subtractive,
                fallback_direction: Direction::Left,
                growth_opening_turns: 2,
                contested_food_min_snakes: 3,
                escape_food_bonus: 4,
            },
            appearance: AppearanceConfig {
                author: "spacey-snake".to_string(),
                head_type: "evil".to_string(),
                tail_type: "skinny".to_string(),
                palette: vec![
                    PaletteColor { name: "red".to_string(), hex: "#cc0000".to_string() },
                    PaletteColor { name: "blue".to_string(), hex: "#0000cc".to_string() },
                    PaletteColor { name: "green".to_string(), hex: "#006600".to_string() },
                    PaletteColor { name: "tan".to_string(), hex: "#996633".to_string() },
                    PaletteColor { name: "pink".to_string(), hex: "#ff66ff".to_string() },
                    PaletteColor { name: "yellow".to_string(), hex: "#ffff00".to_string() },
                    PaletteColor { name: "violet".to_string(), hex: "#cc0099".to_string() },
                ],
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "spacey_snake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
