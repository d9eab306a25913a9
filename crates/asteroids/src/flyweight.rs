//! # Flyweight Catalog
//!
//! Per-actor-type configuration loaded once at startup.
//!
//! ```toml
//! [[enemies]]
//! name = "rock_large"
//! kind = "simple"
//! mass = 4.0
//! scale = 1.5
//! sprites = ["rock_a", "rock_b"]
//! score = 20
//! split = { into = "rock_small", amount = 2, speed = 1.5 }
//!
//! [[projectiles]]
//! name = "bullet"
//! sprites = ["bullet"]
//! speed = 8.0
//! lifetime = 1.2
//! ```

use std::path::Path;

use asteroids_core::{ConfigError, Flyweight, VariantId};
use serde::{Deserialize, Serialize};

/// Behaviour family of an enemy type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Drifts in a straight line.
    #[default]
    Simple,
    /// Faces its heading and drops bombs.
    Bomber,
}

/// What an enemy breaks into when killed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitParams {
    /// Enemy type of the pieces.
    pub into: String,
    /// Number of pieces.
    pub amount: u32,
    /// Speed of each piece.
    pub speed: f32,
}

/// Extra parameters of bombers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BomberParams {
    /// Projectile type dropped.
    pub projectile: String,
    /// Seconds between two bombs.
    pub fire_interval: f32,
}

/// Shared configuration of one enemy type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyFlyweight {
    /// Actor type name.
    pub name: String,
    /// Behaviour family.
    #[serde(default)]
    pub kind: EnemyKind,
    /// Rigid body mass.
    #[serde(default = "unit")]
    pub mass: f32,
    /// Uniform scale, also the collision diameter.
    #[serde(default = "unit")]
    pub scale: f32,
    /// Sprite paths; the variant id indexes this list.
    pub sprites: Vec<String>,
    /// Sound played on death.
    #[serde(default)]
    pub death_sound: Option<String>,
    /// Physics layer.
    #[serde(default)]
    pub layer: u32,
    /// Points awarded for a kill.
    #[serde(default)]
    pub score: u32,
    /// Pieces spawned on death.
    #[serde(default)]
    pub split: Option<SplitParams>,
    /// Bomber parameters, required for bombers.
    #[serde(default)]
    pub bomber: Option<BomberParams>,
}

impl Flyweight for EnemyFlyweight {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Shared configuration of one projectile type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileFlyweight {
    /// Actor type name.
    pub name: String,
    /// Rigid body mass.
    #[serde(default = "unit")]
    pub mass: f32,
    /// Uniform scale, also the collision diameter.
    #[serde(default = "unit")]
    pub scale: f32,
    /// Sprite paths.
    pub sprites: Vec<String>,
    /// Physics layer.
    #[serde(default)]
    pub layer: u32,
    /// Launch speed.
    pub speed: f32,
    /// Seconds before the projectile returns to its pool.
    pub lifetime: f32,
    /// Whether the projectile hurts enemies (false for bombs).
    #[serde(default = "yes")]
    pub hits_enemies: bool,
}

impl Flyweight for ProjectileFlyweight {
    fn name(&self) -> &str {
        &self.name
    }
}

fn unit() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

/// Every actor type of a level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlyweightCatalog {
    /// Enemy types.
    #[serde(default)]
    pub enemies: Vec<EnemyFlyweight>,
    /// Projectile types.
    #[serde(default)]
    pub projectiles: Vec<ProjectileFlyweight>,
}

impl FlyweightCatalog {
    /// Parses and validates a TOML catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads, parses and validates a TOML catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks cross references and value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for enemy in &self.enemies {
            if enemy.sprites.is_empty() {
                return Err(invalid(&enemy.name, "has no sprites"));
            }
            if let Some(split) = &enemy.split {
                if self.enemy(&split.into).is_none() {
                    return Err(invalid(&enemy.name, &format!("splits into unknown {}", split.into)));
                }
            }
            match (enemy.kind, &enemy.bomber) {
                (EnemyKind::Bomber, None) => return Err(invalid(&enemy.name, "is a bomber without bomber parameters")),
                (EnemyKind::Bomber, Some(bomber)) => {
                    if self.projectile(&bomber.projectile).is_none() {
                        return Err(invalid(&enemy.name, &format!("drops unknown {}", bomber.projectile)));
                    }
                    if !(bomber.fire_interval > 0.0) {
                        return Err(invalid(&enemy.name, "needs a positive fire_interval"));
                    }
                }
                (EnemyKind::Simple, _) => {}
            }
        }
        for projectile in &self.projectiles {
            if projectile.sprites.is_empty() {
                return Err(invalid(&projectile.name, "has no sprites"));
            }
            if !(projectile.lifetime > 0.0) {
                return Err(invalid(&projectile.name, "needs a positive lifetime"));
            }
        }
        Ok(())
    }

    /// Looks up an enemy type.
    #[must_use]
    pub fn enemy(&self, name: &str) -> Option<&EnemyFlyweight> {
        self.enemies.iter().find(|e| e.name == name)
    }

    /// Looks up a projectile type.
    #[must_use]
    pub fn projectile(&self, name: &str) -> Option<&ProjectileFlyweight> {
        self.projectiles.iter().find(|p| p.name == name)
    }
}

fn invalid(name: &str, problem: &str) -> ConfigError {
    ConfigError::Invalid(format!("{name} {problem}"))
}

/// Sprite path of a variant, if the flyweight has one at that index.
#[must_use]
pub fn sprite_path(sprites: &[String], variant: VariantId) -> Option<&str> {
    sprites.get(variant.0 as usize).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        [[enemies]]
        name = "rock"
        sprites = ["rock_a", "rock_b"]
        score = 10

        [[enemies]]
        name = "bomber"
        kind = "bomber"
        sprites = ["bomber"]
        bomber = { projectile = "bomb", fire_interval = 2.0 }

        [[projectiles]]
        name = "bomb"
        sprites = ["bomb"]
        speed = 2.0
        lifetime = 3.0
        hits_enemies = false
    "#;

    #[test]
    fn test_parse_catalog_with_defaults() {
        let catalog = FlyweightCatalog::from_toml_str(CATALOG).unwrap();

        let rock = catalog.enemy("rock").unwrap();
        assert_eq!(rock.kind, EnemyKind::Simple);
        assert_eq!(rock.mass, 1.0);
        assert_eq!(rock.split, None);

        let bomber = catalog.enemy("bomber").unwrap();
        assert_eq!(bomber.kind, EnemyKind::Bomber);
        assert!(!catalog.projectile("bomb").unwrap().hits_enemies);
    }

    #[test]
    fn test_bomber_needs_parameters() {
        let source = r#"
            [[enemies]]
            name = "bomber"
            kind = "bomber"
            sprites = ["bomber"]
        "#;
        assert!(matches!(
            FlyweightCatalog::from_toml_str(source),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_split_target_must_exist() {
        let source = r#"
            [[enemies]]
            name = "rock"
            sprites = ["rock"]
            split = { into = "pebble", amount = 2, speed = 1.0 }
        "#;
        let err = FlyweightCatalog::from_toml_str(source).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("rock splits into unknown pebble".into()));
    }

    #[test]
    fn test_sprite_path_by_variant() {
        let sprites = vec!["a".to_string(), "b".to_string()];
        assert_eq!(sprite_path(&sprites, VariantId(1)), Some("b"));
        assert_eq!(sprite_path(&sprites, VariantId(2)), None);
    }
}
