use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combat::Blow;

pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Immutable record of one resolved round.
///
/// Names are snapshots taken when the round resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CombatEvent {
    pub sequence: u64,
    pub attacker: String,
    pub defender: String,
    pub damage: u32,
    pub occurred_at: DateTime<Utc>,
}

impl CombatEvent {
    pub fn blow(&self) -> Blow {
        Blow::from_damage(self.damage)
    }
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.blow() {
            Blow::Miss => write!(f, "@{} missed @{}", self.attacker, self.defender),
            _ => write!(
                f,
                "@{} attacked @{} for {} damage",
                self.attacker, self.defender, self.damage
            ),
        }
    }
}

/// Append-only, newest-first, capped history of rounds.
///
/// Entries past the capacity are discarded. Sequence numbers keep counting
/// across [`BattleLog::clear`].
#[derive(Debug, Clone)]
pub struct BattleLog {
    events: VecDeque<CombatEvent>,
    capacity: usize,
    next_sequence: u64,
}

impl Default for BattleLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl BattleLog {
    /// `capacity` is raised to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 1,
        }
    }

    pub fn record(
        &mut self,
        attacker: impl Into<String>,
        defender: impl Into<String>,
        damage: u32,
    ) -> &CombatEvent {
        let event = CombatEvent {
            sequence: self.next_sequence,
            attacker: attacker.into(),
            defender: defender.into(),
            damage,
            occurred_at: Utc::now(),
        };
        self.next_sequence += 1;
        self.events.push_front(event);
        self.events.truncate(self.capacity);
        &self.events[0]
    }

    pub fn latest(&self) -> Option<&CombatEvent> {
        self.events.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
