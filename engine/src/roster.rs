use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{BattleError, BattleResult};
use crate::Dice;

/// One identity supplied by a roster source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterEntry {
    pub id: String,
    #[serde(alias = "username", alias = "displayName")]
    pub display_name: String,
    #[serde(
        default,
        alias = "profile_picture_url",
        alias = "avatarRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<String>,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Json,
    Yaml,
}

impl RosterFormat {
    /// Guess from a file extension; anything that isn't YAML is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                RosterFormat::Yaml
            }
            _ => RosterFormat::Json,
        }
    }
}

/// Ordered set of identities, unique by id.
///
/// An empty roster can be built and serialized, but the engine refuses to
/// load it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<RosterEntry>", try_from = "Vec<RosterEntry>")]
pub struct Roster {
    entries: IndexMap<String, RosterEntry>,
}

impl Roster {
    pub fn new(entries: impl IntoIterator<Item = RosterEntry>) -> BattleResult<Self> {
        let mut map = IndexMap::new();
        for entry in entries {
            if map.contains_key(&entry.id) {
                return Err(BattleError::InvalidRoster(format!(
                    "duplicate participant id '{}'",
                    entry.id
                )));
            }
            map.insert(entry.id.clone(), entry);
        }
        Ok(Self { entries: map })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RosterEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.values()
    }

    pub fn parse(text: &str, format: RosterFormat) -> Result<Self> {
        let roster = match format {
            RosterFormat::Json => {
                serde_json::from_str(text).context("failed to parse roster JSON")?
            }
            RosterFormat::Yaml => {
                serde_yaml::from_str(text).context("failed to parse roster YAML")?
            }
        };
        Ok(roster)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read roster: {}", path.display()))?;
        Self::parse(&text, RosterFormat::from_path(path))
            .with_context(|| format!("invalid roster file: {}", path.display()))
    }

    /// Roster compiled into the crate under `name`.
    pub fn builtin(name: &str) -> Result<Self> {
        let text = crate::content::builtin_rosters()
            .get(name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("builtin roster '{}' not found", name))?;
        Self::parse(text, RosterFormat::Json)
            .with_context(|| format!("builtin roster '{}' is malformed", name))
    }

    /// Synthetic roster of `count` made-up fighter handles.
    ///
    /// Names may repeat; ids never do.
    pub fn generate(count: usize, dice: &mut Dice) -> Self {
        let entries = (0..count).map(|i| {
            let base = BASE_NAMES[dice.index(BASE_NAMES.len())];
            let suffix = if dice.chance(0.5) {
                SUFFIXES[dice.index(SUFFIXES.len())]
            } else {
                ""
            };
            let number = if dice.chance(0.3) {
                dice.between(0, 998).to_string()
            } else {
                String::new()
            };
            RosterEntry::new(format!("fighter_{i}"), format!("{base}{suffix}{number}"))
                .with_avatar(format!("https://picsum.photos/150/150?random={i}"))
        });
        let entries: IndexMap<_, _> = entries.map(|e| (e.id.clone(), e)).collect();
        Self { entries }
    }
}

impl From<Roster> for Vec<RosterEntry> {
    fn from(roster: Roster) -> Self {
        roster.entries.into_values().collect()
    }
}

impl TryFrom<Vec<RosterEntry>> for Roster {
    type Error = BattleError;

    fn try_from(entries: Vec<RosterEntry>) -> BattleResult<Self> {
        Roster::new(entries)
    }
}

const BASE_NAMES: &[&str] = &[
    "fighter", "warrior", "champion", "gladiator", "boxer", "martial", "combat", "battle",
    "strong", "power", "force", "energy", "spirit", "soul", "heart", "mind", "club", "team",
    "squad", "crew", "gang", "group", "family", "brotherhood",
];

const SUFFIXES: &[&str] = &[
    "_oficial", "_real", "_br", "_sp", "_rj", "_mg", "123", "456", "789", "_fighter",
];
