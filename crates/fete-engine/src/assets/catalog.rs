use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Well-known asset keys used by the built-in catalog and the cue tables.
pub mod keys {
    pub const THEME_BIRTHDAY: &str = "theme-birthday";
    pub const CELEBRATION: &str = "celebration";
    pub const GENTLE_PIANO: &str = "gentle-piano";
    pub const AMBIENT_MAGICAL: &str = "ambient-magical";

    pub const BALLOON_POP: &str = "balloon-pop";
    pub const BUTTON_CLICK: &str = "button-click";
    pub const CAKE_CUT: &str = "cake-cut";
    pub const HAPPY_BIRTHDAY: &str = "happy-birthday";
    pub const SPARKLE: &str = "sparkle";
    pub const WORD_HOVER: &str = "word-hover";
    pub const CONFETTI: &str = "confetti";
    pub const COUNTDOWN_TICK: &str = "countdown-tick";
    pub const COUNTDOWN_COMPLETE: &str = "countdown-complete";
    pub const PAGE_TRANSITION: &str = "page-transition";
}

/// Whether an asset is a long looping track or a short one-shot effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Music,
    Sound,
}

/// A single named audio asset. Identity is `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Unique lookup key (e.g., "balloon-pop").
    pub key: String,
    /// Path relative to the asset root (e.g., "sounds/balloon-pop.mp3").
    pub path: String,
    /// Music or sound classification.
    pub class: AssetClass,
}

/// Errors from catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate asset key: {0}")]
    DuplicateKey(String),
}

/// Static, immutable list of audio assets.
/// Loaded from a JSON file at startup or taken from the built-in list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCatalog {
    assets: Vec<AssetDescriptor>,
}

impl AssetCatalog {
    /// Build a catalog from a descriptor list, rejecting duplicate keys.
    pub fn new(assets: Vec<AssetDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for desc in &assets {
            if !seen.insert(desc.key.as_str()) {
                return Err(CatalogError::DuplicateKey(desc.key.clone()));
            }
        }
        Ok(Self { assets })
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: Vec<AssetDescriptor> = serde_json::from_str(json)?;
        Self::new(parsed)
    }

    /// The fixed product catalog: four background tracks and ten effects.
    pub fn builtin() -> Self {
        fn music(key: &str, file: &str) -> AssetDescriptor {
            AssetDescriptor {
                key: key.to_string(),
                path: format!("music/{file}"),
                class: AssetClass::Music,
            }
        }
        fn sound(key: &str, file: &str) -> AssetDescriptor {
            AssetDescriptor {
                key: key.to_string(),
                path: format!("sounds/{file}"),
                class: AssetClass::Sound,
            }
        }
        Self {
            assets: vec![
                music(keys::THEME_BIRTHDAY, "theme-birthday.mp3"),
                music(keys::CELEBRATION, "celebration.mp3"),
                music(keys::GENTLE_PIANO, "gentle-piano.mp3"),
                music(keys::AMBIENT_MAGICAL, "ambient-magical.mp3"),
                sound(keys::BALLOON_POP, "balloon-pop.mp3"),
                sound(keys::BUTTON_CLICK, "button-click.mp3"),
                sound(keys::CAKE_CUT, "cake-cut.mp3"),
                sound(keys::HAPPY_BIRTHDAY, "happy-birthday.mp3"),
                sound(keys::SPARKLE, "sparkle.mp3"),
                sound(keys::WORD_HOVER, "word-hover.mp3"),
                sound(keys::CONFETTI, "confetti.mp3"),
                sound(keys::COUNTDOWN_TICK, "countdown-tick.mp3"),
                sound(keys::COUNTDOWN_COMPLETE, "countdown-complete.mp3"),
                sound(keys::PAGE_TRANSITION, "page-transition.mp3"),
            ],
        }
    }

    /// Look up a descriptor by key. Returns None if not found.
    pub fn get(&self, key: &str) -> Option<&AssetDescriptor> {
        self.assets.iter().find(|d| d.key == key)
    }

    /// The relative path for a key, used as the ad hoc load fallback.
    pub fn path_of(&self, key: &str) -> Option<&str> {
        self.get(key).map(|d| d.path.as_str())
    }

    /// Iterate over all descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &AssetDescriptor> {
        self.assets.iter()
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
