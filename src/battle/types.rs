use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::battle_log::BattleLog;
use super::content::Enemy;
use super::rewards::VictoryRewards;
use crate::progression::types::WordCard;
use crate::quiz::exam::ExamQuestion;
use crate::quiz::QuizQuestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum BattlePhase {
    /// Pre-battle exam question after a power item was used.
    ItemQuiz,
    SelectAction,
    Quiz,
    Result,
    BattleEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum CardAction {
    Attack,
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// The card(s) committed for the current quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Single {
        card: WordCard,
        declared_action: CardAction,
    },
    Burst {
        first: WordCard,
        second: WordCard,
    },
}

impl Selection {
    pub fn cards(&self) -> Vec<&WordCard> {
        match self {
            Selection::Single { card, .. } => vec![card],
            Selection::Burst { first, second } => vec![first, second],
        }
    }

    pub fn is_burst(&self) -> bool {
        matches!(self, Selection::Burst { .. })
    }

    /// Action chosen with a single card. Bursts declare none.
    pub fn declared_action(&self) -> Option<CardAction> {
        match self {
            Selection::Single {
                declared_action, ..
            } => Some(*declared_action),
            Selection::Burst { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct AnswerResult {
    pub correct: bool,
    pub damage: u32,
    pub heal: u32,
}

/// What the store must fold back into progression after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuiz {
    pub result: AnswerResult,
    pub card_ids: Vec<String>,
    pub term_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Enemy has acted; the player picks again.
    Continue,
    Ended(BattleOutcome),
}

/// One battle from start to `BattleEnd`. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleState {
    pub stage_id: u32,
    /// Mutable copy of the static enemy definition.
    pub enemy: Enemy,
    pub player_hp: u32,
    pub player_max_hp: u32,
    pub player_level: u32,
    pub hand_size: u32,
    pub enemy_hp: u32,
    pub phase: BattlePhase,
    pub current_hand: Vec<WordCard>,
    pub remaining_deck: Vec<WordCard>,
    pub used_cards: Vec<String>,
    pub selection: Option<Selection>,
    pub quiz: Option<QuizQuestion>,
    pub exam_question: Option<ExamQuestion>,
    pub log: BattleLog,
    pub earned_cards: Vec<WordCard>,
    pub earned_exp: u32,
    pub earned_gold: u32,
    pub exp_multiplier: f64,
    pub outcome: Option<BattleOutcome>,
    /// Filled in when the battle is won.
    pub rewards: Option<VictoryRewards>,
}
