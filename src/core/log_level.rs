//! Log level definitions and the process-wide level registry
//!
//! A [`Level`] is a plain integer severity. Names are resolved through a
//! [`LevelRegistry`]; the six built-in levels are always present and further
//! names can be registered at runtime. Registration is append-only.

use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Numeric severity of a log record
///
/// Serialized as its bare integer, which is the `level` field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u32);

impl Level {
    pub const TRACE: Level = Level(10);
    pub const DEBUG: Level = Level(20);
    pub const INFO: Level = Level(30);
    pub const WARN: Level = Level(40);
    pub const ERROR: Level = Level(50);
    pub const FATAL: Level = Level(60);

    /// Effective level of a logger with no destinations: nothing passes.
    pub const OFF: Level = Level(u32::MAX);

    pub const fn new(value: u32) -> Self {
        Level(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Lowercase registered name, if any
    pub fn name(self) -> Option<String> {
        level_name(self)
    }

    /// Uppercase name, or `LVL<n>` for unnamed levels
    pub fn upper_name(self) -> String {
        match self.name() {
            Some(name) => name.to_uppercase(),
            None => format!("LVL{}", self.0),
        }
    }

    /// Uppercase name right-aligned to five columns (` INFO`, `ERROR`)
    pub fn upper_padded_name(self) -> String {
        format!("{:>5}", self.upper_name())
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "LVL{}", self.0),
        }
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<u32>() {
            Ok(n) => Ok(Level(n)),
            Err(_) => resolve_level(s.trim()),
        }
    }
}

/// Anything a caller may hand to a level-accepting operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelArg {
    Name(String),
    Number(u32),
}

impl From<&str> for LevelArg {
    fn from(s: &str) -> Self {
        LevelArg::Name(s.to_string())
    }
}

impl From<String> for LevelArg {
    fn from(s: String) -> Self {
        LevelArg::Name(s)
    }
}

impl From<u32> for LevelArg {
    fn from(n: u32) -> Self {
        LevelArg::Number(n)
    }
}

impl From<Level> for LevelArg {
    fn from(level: Level) -> Self {
        LevelArg::Number(level.0)
    }
}

impl fmt::Display for LevelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelArg::Name(name) => write!(f, "{}", name),
            LevelArg::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Names that would shadow logger operations if used as level names
pub const RESERVED_NAMES: &[&str] = &[
    "add_stream",
    "at",
    "child",
    "child_fast",
    "close",
    "enabled",
    "fields",
    "flush",
    "level",
    "levels",
    "log",
    "metrics",
    "name",
    "on_error",
    "serializers",
    "src",
    "stream_levels",
    "streams",
];

const BUILTIN_LEVELS: &[(&str, Level)] = &[
    ("trace", Level::TRACE),
    ("debug", Level::DEBUG),
    ("info", Level::INFO),
    ("warn", Level::WARN),
    ("error", Level::ERROR),
    ("fatal", Level::FATAL),
];

/// Bidirectional name <-> number table
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    by_name: HashMap<String, Level>,
    by_level: BTreeMap<Level, String>,
}

impl LevelRegistry {
    /// Registry holding only the built-in levels
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut by_level = BTreeMap::new();
        for (name, level) in BUILTIN_LEVELS {
            by_name.insert(name.to_string(), *level);
            by_level.insert(*level, name.to_string());
        }
        Self { by_name, by_level }
    }

    /// Resolve a name (case-insensitive) or a raw number
    ///
    /// Raw numbers are always accepted, even when no name maps to them; they
    /// act as unnamed filtering thresholds. Only names are checked strictly.
    pub fn resolve(&self, arg: impl Into<LevelArg>) -> Result<Level> {
        match arg.into() {
            LevelArg::Number(n) => Ok(Level(n)),
            LevelArg::Name(name) => self
                .by_name
                .get(&name.to_lowercase())
                .copied()
                .ok_or_else(|| LoggerError::invalid_level(name)),
        }
    }

    /// Register a new named level
    pub fn register(&mut self, name: &str, level: u32) -> Result<Level> {
        let trimmed = name.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
            return Err(LoggerError::invalid_name(name));
        }
        let lower = trimmed.to_lowercase();
        if self.by_name.contains_key(&lower) || RESERVED_NAMES.contains(&lower.as_str()) {
            return Err(LoggerError::duplicate_level(lower));
        }
        let level = Level(level);
        if let Some(existing) = self.by_level.get(&level) {
            return Err(LoggerError::conflicting_level(lower, existing.clone(), level.0));
        }
        self.by_name.insert(lower.clone(), level);
        self.by_level.insert(level, lower);
        Ok(level)
    }

    pub fn name_of(&self, level: Level) -> Option<&str> {
        self.by_level.get(&level).map(String::as_str)
    }

    /// All registered levels in ascending order
    pub fn levels(&self) -> Vec<(Level, String)> {
        self.by_level
            .iter()
            .map(|(level, name)| (*level, name.clone()))
            .collect()
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: OnceLock<RwLock<LevelRegistry>> = OnceLock::new();

/// The process-wide registry, created with the built-in levels on first use
pub fn registry() -> &'static RwLock<LevelRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(LevelRegistry::new()))
}

/// Resolve against the process-wide registry
pub fn resolve_level(arg: impl Into<LevelArg>) -> Result<Level> {
    registry().read().resolve(arg)
}

/// Lowercase name of `level` in the process-wide registry
pub fn level_name(level: Level) -> Option<String> {
    registry().read().name_of(level).map(str::to_string)
}

/// Register a level in the process-wide registry
pub fn register_level(name: &str, level: u32) -> Result<Level> {
    registry().write().register(name, level)
}
