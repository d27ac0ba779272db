use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Actor {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum LogAction {
    Attack,
    Heal,
    Fail,
    Draw,
    Item,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleLogEntry {
    /// 1-based position in the log.
    pub turn: u32,
    pub actor: Actor,
    pub action: LogAction,
    pub damage: Option<u32>,
    pub heal: Option<u32>,
    pub message: String,
}

/// Append-only battle log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleLog {
    entries: Vec<BattleLogEntry>,
}

impl BattleLog {
    pub fn append(
        &mut self,
        actor: Actor,
        action: LogAction,
        message: impl Into<String>,
        damage: Option<u32>,
        heal: Option<u32>,
    ) -> &BattleLogEntry {
        let entry = BattleLogEntry {
            turn: self.entries.len() as u32 + 1,
            actor,
            action,
            damage,
            heal,
            message: message.into(),
        };
        log::debug!("battle log #{}: {}", entry.turn, entry.message);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[BattleLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&BattleLogEntry> {
        self.entries.last()
    }

    /// Entries with `turn >= from_turn`, at most `limit` of them.
    pub fn page(&self, from_turn: u32, limit: usize) -> &[BattleLogEntry] {
        let start = (from_turn.max(1) as usize - 1).min(self.entries.len());
        let end = start.saturating_add(limit).min(self.entries.len());
        &self.entries[start..end]
    }
}
