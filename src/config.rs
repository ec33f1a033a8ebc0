//! Game configuration
//!
//! Tunables load from a RON file next to the executable's assets. Every
//! field has a default and the file may omit any of them, so an empty or
//! missing file runs the stock demo. Values are validated after parsing;
//! a config that parses but asks for nonsense (negative speed, a thousand
//! enemies) is rejected with a message naming the field.

use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hard caps on configurable values.
pub mod limits {
    /// Enemy count cap, keeps a typo'd spawn list from melting the frame.
    pub const MAX_ENEMIES: usize = 64;
    /// Largest coordinate magnitude accepted for a spawn point.
    pub const MAX_COORD: f32 = 500.0;
    /// Ground plane edge length bounds.
    pub const MIN_GROUND_SIZE: f32 = 10.0;
    pub const MAX_GROUND_SIZE: f32 = 1000.0;
    /// Movement speed bounds, player and enemy alike.
    pub const MAX_SPEED: f32 = 100.0;

    pub fn validate_speed(label: &str, speed: f32) -> Result<(), String> {
        if !speed.is_finite() || speed <= 0.0 || speed > MAX_SPEED {
            return Err(format!("{} must be in (0, {}], got {}", label, MAX_SPEED, speed));
        }
        Ok(())
    }

    pub fn validate_coord(label: &str, value: f32) -> Result<(), String> {
        if !value.is_finite() || value.abs() > MAX_COORD {
            return Err(format!("{} must be within +/-{}, got {}", label, MAX_COORD, value));
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "config io error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::IoError(e.to_string())
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e.to_string())
    }
}

// ============================================================================
// Config structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub jump_force: f32,
    pub mouse_sensitivity: f32,
    pub health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            jump_force: 8.0,
            mouse_sensitivity: 0.0025,
            health: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Spawn points, one enemy each.
    pub positions: Vec<[f32; 3]>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            damage: 10.0,
            attack_range: 2.0,
            attack_cooldown: 1.0,
            positions: vec![
                [8.0, 0.9, 12.0],
                [-10.0, 0.9, 8.0],
                [4.0, 0.9, -14.0],
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub size: f32,
    pub color: [f32; 3],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            color: [0.25, 0.35, 0.22],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub ground: GroundConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        limits::validate_speed("player.speed", self.player.speed)
            .map_err(ConfigError::ValidationError)?;
        limits::validate_speed("enemy.speed", self.enemy.speed)
            .map_err(ConfigError::ValidationError)?;

        if !self.player.health.is_finite()
            || self.player.health <= 0.0
            || self.player.health > 100.0
        {
            return Err(ConfigError::ValidationError(format!(
                "player.health must be in (0, 100], got {}",
                self.player.health
            )));
        }
        if !self.player.jump_force.is_finite() || self.player.jump_force <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "player.jump_force must be positive, got {}",
                self.player.jump_force
            )));
        }
        if !self.player.mouse_sensitivity.is_finite() || self.player.mouse_sensitivity <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "player.mouse_sensitivity must be positive, got {}",
                self.player.mouse_sensitivity
            )));
        }

        if !self.enemy.damage.is_finite() || self.enemy.damage < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "enemy.damage must be non-negative, got {}",
                self.enemy.damage
            )));
        }
        if !self.enemy.attack_range.is_finite() || self.enemy.attack_range <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "enemy.attack_range must be positive, got {}",
                self.enemy.attack_range
            )));
        }
        if !self.enemy.attack_cooldown.is_finite() || self.enemy.attack_cooldown <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "enemy.attack_cooldown must be positive, got {}",
                self.enemy.attack_cooldown
            )));
        }
        if self.enemy.positions.len() > limits::MAX_ENEMIES {
            return Err(ConfigError::ValidationError(format!(
                "at most {} enemies, got {}",
                limits::MAX_ENEMIES,
                self.enemy.positions.len()
            )));
        }
        for (i, pos) in self.enemy.positions.iter().enumerate() {
            for (axis, &v) in ["x", "y", "z"].iter().zip(pos.iter()) {
                limits::validate_coord(&format!("enemy.positions[{}].{}", i, axis), v)
                    .map_err(ConfigError::ValidationError)?;
            }
        }

        if !self.ground.size.is_finite()
            || self.ground.size < limits::MIN_GROUND_SIZE
            || self.ground.size > limits::MAX_GROUND_SIZE
        {
            return Err(ConfigError::ValidationError(format!(
                "ground.size must be in [{}, {}], got {}",
                limits::MIN_GROUND_SIZE,
                limits::MAX_GROUND_SIZE,
                self.ground.size
            )));
        }
        for &c in &self.ground.color {
            if !c.is_finite() || !(0.0..=1.0).contains(&c) {
                return Err(ConfigError::ValidationError(format!(
                    "ground.color channels must be in [0, 1], got {}",
                    c
                )));
            }
        }

        Ok(())
    }
}

/// Load a config from `path`. A missing file is the stock demo, not an
/// error; anything else wrong with the file is.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GameConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(GameConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let config: GameConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = load_config("/nonexistent/skirmish.ron").unwrap();
        assert_eq!(config.player.speed, PlayerConfig::default().speed);
        assert_eq!(config.enemy.positions.len(), 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config("(player: (speed: 12.0))");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.player.speed, 12.0);
        assert_eq!(config.player.health, 100.0);
        assert_eq!(config.enemy.speed, 3.0);
    }

    #[test]
    fn test_full_roundtrip() {
        let stock = GameConfig::default();
        let text = ron::ser::to_string_pretty(&stock, Default::default()).unwrap();
        let file = write_config(&text);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.ground.size, stock.ground.size);
        assert_eq!(config.enemy.positions, stock.enemy.positions);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let file = write_config("not ron at all {{{");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_bad_values_are_validation_errors() {
        for bad in [
            "(player: (speed: -1.0))",
            "(player: (health: 0.0))",
            "(player: (health: 150.0))",
            "(enemy: (attack_cooldown: 0.0))",
            "(ground: (size: 2.0))",
            "(ground: (color: (2.0, 0.0, 0.0)))",
        ] {
            let file = write_config(bad);
            assert!(
                matches!(load_config(file.path()), Err(ConfigError::ValidationError(_))),
                "{} should fail validation",
                bad
            );
        }
    }

    #[test]
    fn test_enemy_cap_enforced() {
        let positions: Vec<String> = (0..limits::MAX_ENEMIES + 1)
            .map(|i| format!("({}.0, 0.9, 0.0)", i))
            .collect();
        let text = format!("(enemy: (positions: [{}]))", positions.join(", "));
        let file = write_config(&text);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
