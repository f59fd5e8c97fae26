//! Settings sources for a balance run.
//!
//! Three ways to obtain [`GameSettings`]: the built-in defaults, a JSON
//! document, or a scan of the game's JavaScript sources. The scanner never
//! fails on a missing file or constant; it keeps the default and warns.
use gemtd_game::{
    BalanceEngine, BalancePolicy, DefaultSettings, EngineError, GameSettings, SettingsSource,
};
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TOWERS_FILE: &str = "towers.js";
pub const ENEMIES_FILE: &str = "enemies.js";
pub const GAME_FILE: &str = "game.js";

const DAMAGE_PATTERN: &str = r"damage:\s*(\d+(?:\.\d+)?)";
const POISON_DAMAGE_PATTERN: &str = r#"['"]?poison['"]?\s*:\s*\{[^}]*damage:\s*(\d+(?:\.\d+)?)"#;
const FIRE_RATE_PATTERN: &str = r"fireRate:\s*(\d+(?:\.\d+)?)";
const HEALTH_PATTERN: &str = r"health:\s*(\d+)";
const MONEY_PATTERN: &str = r"(?i)(?:money|currency|cash).*?=\s*(\d+)";

const DIMINISHING_MARKER: &str = "diminishingFactor";
const INFLATION_MARKER: &str = "inflationFactor";
const POISON_STACKING_MARKER: &str = "existingPoison";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings document on disk; fields it omits keep their defaults.
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for JsonSettingsFile {
    type Error = ConfigError;

    fn load_settings(&self) -> Result<GameSettings, Self::Error> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        GameSettings::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Regex scan of `towers.js`, `enemies.js` and `game.js` under one directory.
#[derive(Debug, Clone)]
pub struct SourceScan {
    dir: PathBuf,
}

impl SourceScan {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_optional(&self, name: &str) -> Result<Option<String>, ConfigError> {
        let path = self.dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::warn!("{} not found, using default constants", path.display());
                Ok(None)
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

impl SettingsSource for SourceScan {
    type Error = ConfigError;

    fn load_settings(&self) -> Result<GameSettings, Self::Error> {
        let mut settings = GameSettings::default();
        if let Some(towers) = self.read_optional(TOWERS_FILE)? {
            scan_towers(&towers, &mut settings);
        }
        if let Some(enemies) = self.read_optional(ENEMIES_FILE)? {
            scan_enemies(&enemies, &mut settings);
        }
        if let Some(game) = self.read_optional(GAME_FILE)? {
            scan_game(&game, &mut settings);
        }
        Ok(settings)
    }
}

/// Which source a run reads its settings from.
#[derive(Debug, Clone)]
pub enum SettingsChoice {
    Defaults,
    Json(PathBuf),
    Scan(PathBuf),
}

impl SettingsChoice {
    pub fn from_paths(settings: Option<&Path>, source_dir: Option<&Path>) -> Self {
        match (settings, source_dir) {
            (Some(path), _) => Self::Json(path.to_path_buf()),
            (None, Some(dir)) => Self::Scan(dir.to_path_buf()),
            (None, None) => Self::Defaults,
        }
    }

    /// Load, validate and bind the chosen settings to `policy`.
    ///
    /// # Errors
    ///
    /// Fails if the settings file cannot be read or parsed, a game source
    /// exists but is unreadable, or the resulting settings are invalid.
    pub fn engine(&self, policy: BalancePolicy) -> Result<BalanceEngine, EngineError> {
        match self {
            Self::Defaults => BalanceEngine::from_source(&DefaultSettings, policy),
            Self::Json(path) => BalanceEngine::from_source(&JsonSettingsFile::new(path), policy),
            Self::Scan(dir) => BalanceEngine::from_source(&SourceScan::new(dir), policy),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Defaults => "built-in defaults".to_string(),
            Self::Json(path) => format!("settings file {}", path.display()),
            Self::Scan(dir) => format!("game sources in {}", dir.display()),
        }
    }
}

fn captures<'a>(pattern: &str, haystack: &'a str) -> Vec<&'a str> {
    Regex::new(pattern)
        .map(|re| {
            re.captures_iter(haystack)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

fn first_capture<'a>(pattern: &str, haystack: &'a str) -> Option<&'a str> {
    captures(pattern, haystack).into_iter().next()
}

fn apply<T>(file: &str, what: &str, raw: Option<&str>, slot: &mut T)
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(text) = raw else {
        log::warn!("{file}: no {what} found, keeping default {slot}");
        return;
    };
    match text.parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => log::warn!("{file}: unreadable {what} {text:?}, keeping default {slot}"),
    }
}

/// First `damage:` and `fireRate:` belong to the basic tower.
pub fn scan_towers(content: &str, settings: &mut GameSettings) {
    apply(
        TOWERS_FILE,
        "basic tower damage",
        first_capture(DAMAGE_PATTERN, content),
        &mut settings.basic_tower_damage,
    );
    apply(
        TOWERS_FILE,
        "poison tower damage",
        first_capture(POISON_DAMAGE_PATTERN, content),
        &mut settings.poison_tower_damage,
    );
    apply(
        TOWERS_FILE,
        "fire rate",
        first_capture(FIRE_RATE_PATTERN, content),
        &mut settings.basic_tower_fire_rate,
    );
    settings.has_cost_inflation = content.contains(INFLATION_MARKER);
}

/// Health values in declaration order: basic, fast, armored.
pub fn scan_enemies(content: &str, settings: &mut GameSettings) {
    let healths = captures(HEALTH_PATTERN, content);
    let slots = [
        ("basic enemy health", &mut settings.basic_enemy_health),
        ("fast enemy health", &mut settings.fast_enemy_health),
        ("armored enemy health", &mut settings.armored_enemy_health),
    ];
    for (idx, (what, slot)) in slots.into_iter().enumerate() {
        apply(ENEMIES_FILE, what, healths.get(idx).copied(), slot);
    }
    settings.has_poison_stacking_prevention = content.contains(POISON_STACKING_MARKER);
}

pub fn scan_game(content: &str, settings: &mut GameSettings) {
    apply(
        GAME_FILE,
        "starting money",
        first_capture(MONEY_PATTERN, content),
        &mut settings.starting_money,
    );
    settings.has_diminishing_returns = content.contains(DIMINISHING_MARKER);
}
