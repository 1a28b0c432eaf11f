use serde::{Deserialize, Serialize};

use crate::roster::RosterEntry;

/// Health every participant starts (and is reseeded) with.
pub const MAX_HEALTH: u32 = 100;

/// Coarse health band used by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vitality {
    Healthy,
    Wounded,
    Critical,
}

/// Engine-owned combat record for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: String,
    display_name: String,
    avatar: Option<String>,
    health: u32,
}

impl Participant {
    /// Copies the entry; nothing is shared with the roster afterwards.
    pub fn from_entry(entry: &RosterEntry) -> Self {
        Self {
            id: entry.id.clone(),
            display_name: entry.display_name.clone(),
            avatar: entry.avatar.clone(),
            health: MAX_HEALTH,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn vitality(&self) -> Vitality {
        match self.health {
            71.. => Vitality::Healthy,
            31..=70 => Vitality::Wounded,
            _ => Vitality::Critical,
        }
    }

    /// Lowers health to `value`. Health never rises here, so a larger value
    /// leaves it unchanged. Returns true if this call dropped it to 0.
    pub(crate) fn lower_health_to(&mut self, value: u32) -> bool {
        let before = self.health;
        self.health = value.min(before);
        tracing::trace!(
            participant = %self.display_name,
            before,
            after = self.health,
            "health applied"
        );
        before > 0 && self.health == 0
    }
}
