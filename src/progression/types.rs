use chrono::NaiveDate;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::battle::types::BattleState;

pub const MAX_UPGRADE_LEVEL: u8 = 5;
pub const MAX_DECK_CAPACITY: u32 = 15;
pub const MAX_HAND_SIZE: u32 = 6;
pub const INITIAL_MAX_HP: u32 = 100;
pub const INITIAL_EXP_TO_NEXT_LEVEL: u32 = 100;
pub const HP_PER_LEVEL: u32 = 10;
pub const FIRST_STAGE_ID: u32 = 1;

/// Deck slots available at `level`; grows every two levels up to 15.
pub fn deck_capacity_for(level: u32) -> u32 {
    (5 + level / 2).min(MAX_DECK_CAPACITY)
}

/// Cards held in hand at `level`; grows every three levels up to 6.
pub fn hand_size_for(level: u32) -> u32 {
    (2 + level / 3).min(MAX_HAND_SIZE)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn all() -> [Rarity; 5] {
        [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ]
    }

    pub fn base_attack(self) -> u32 {
        match self {
            Rarity::Common => 10,
            Rarity::Uncommon => 20,
            Rarity::Rare => 35,
            Rarity::Epic => 50,
            Rarity::Legendary => 80,
        }
    }

    pub fn base_heal(self) -> u32 {
        match self {
            Rarity::Common => 5,
            Rarity::Uncommon => 10,
            Rarity::Rare => 20,
            Rarity::Epic => 30,
            Rarity::Legendary => 50,
        }
    }

    /// The next tier up, or `None` at Legendary.
    pub fn promoted(self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Uncommon),
            Rarity::Uncommon => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Legendary),
            Rarity::Legendary => None,
        }
    }

    /// Gold needed to go from upgrade level `i` to `i + 1`.
    pub fn upgrade_costs(self) -> [u32; 5] {
        let common = [50, 100, 200, 400, 800];
        let scale = match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 4,
            Rarity::Epic => 8,
            Rarity::Legendary => return [1000, 2000, 4000, 8000, 16000],
        };
        common.map(|c| c * scale)
    }
}

/// A player-owned instance of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct WordCard {
    pub id: String,
    pub term_id: String,
    /// English term, copied at mint time.
    pub term: String,
    pub term_ja: String,
    pub rarity: Rarity,
    pub attack_power: u32,
    pub heal_power: u32,
    /// Unix milliseconds.
    pub acquired_at: i64,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub upgrade_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum ItemType {
    /// Pre-battle exam question; a correct answer multiplies victory EXP by 10.
    PowerSurge,
}

impl ItemType {
    pub fn price(self) -> u32 {
        match self {
            ItemType::PowerSurge => 500,
        }
    }

    /// Catalogue entry with a quantity of one.
    pub fn definition(self) -> GameItem {
        match self {
            ItemType::PowerSurge => GameItem {
                item_type: self,
                name: "Power Surge".to_string(),
                name_ja: "パワーサージ".to_string(),
                description: "試験問題に正解すると、勝利時の獲得EXPが10倍になる".to_string(),
                quantity: 1,
                price: self.price(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameItem {
    pub item_type: ItemType,
    pub name: String,
    pub name_ja: String,
    pub description: String,
    pub quantity: u32,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", default)]
pub struct PlayerState {
    pub hp: u32,
    pub max_hp: u32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next_level: u32,
    pub total_battles: u32,
    pub total_wins: u32,
    pub gold: u32,
    pub cards: Vec<WordCard>,
    /// Ordered card ids; every id is present in `cards`.
    pub current_deck: Vec<String>,
    pub deck_capacity: u32,
    pub hand_size: u32,
    pub items: Vec<GameItem>,
    pub active_item: Option<ItemType>,
    /// Source of `card_<n>` ids; never reused.
    pub next_card_seq: u64,
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState {
            hp: INITIAL_MAX_HP,
            max_hp: INITIAL_MAX_HP,
            level: 1,
            exp: 0,
            exp_to_next_level: INITIAL_EXP_TO_NEXT_LEVEL,
            total_battles: 0,
            total_wins: 0,
            gold: 0,
            cards: Vec::new(),
            current_deck: Vec::new(),
            deck_capacity: deck_capacity_for(1),
            hand_size: hand_size_for(1),
            items: Vec::new(),
            active_item: None,
            next_card_seq: 0,
        }
    }
}

impl PlayerState {
    pub fn card(&self, card_id: &str) -> Option<&WordCard> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut WordCard> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// Deck cards in deck order; ids without a card are skipped.
    pub fn deck_cards(&self) -> Vec<WordCard> {
        self.current_deck
            .iter()
            .filter_map(|id| self.card(id).cloned())
            .collect()
    }

    pub fn allocate_card_id(&mut self) -> String {
        self.next_card_seq += 1;
        format!("card_{}", self.next_card_seq)
    }

    pub fn item_count(&self, item_type: ItemType) -> u32 {
        self.items
            .iter()
            .find(|i| i.item_type == item_type)
            .map_or(0, |i| i.quantity)
    }

    /// Add EXP and resolve every level-up it pays for. Returns levels gained.
    pub fn gain_exp(&mut self, amount: u32) -> u32 {
        self.exp += amount;
        let mut gained = 0;
        while self.exp_to_next_level > 0 && self.exp >= self.exp_to_next_level {
            self.exp -= self.exp_to_next_level;
            self.level += 1;
            self.max_hp += HP_PER_LEVEL;
            self.hp = self.max_hp;
            self.exp_to_next_level = (f64::from(self.exp_to_next_level) * 1.2).floor() as u32;
            self.deck_capacity = deck_capacity_for(self.level);
            self.hand_size = hand_size_for(self.level);
            gained += 1;
        }
        if gained > 0 {
            log::info!("player reached level {}", self.level);
        }
        gained
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum MissionType {
    BattleWins,
    QuizCorrect,
    CardCollect,
    GoldEarn,
    BossDefeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DailyMission {
    pub id: String,
    pub mission_type: MissionType,
    pub name: String,
    pub description: String,
    pub target: u32,
    pub current: u32,
    pub completed: bool,
    pub claimed: bool,
    pub reward_gold: u32,
    pub reward_exp: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", default)]
pub struct DailyMissionState {
    pub missions: Vec<DailyMission>,
    pub last_reset_date: Option<NaiveDate>,
    pub total_completed: u32,
}

/// Everything the store owns. All fields except `battle` are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", default)]
pub struct GameState {
    pub player: PlayerState,
    pub unlocked_stages: Vec<u32>,
    pub current_stage: u32,
    pub daily_missions: DailyMissionState,
    pub boss_defeated: Vec<String>,
    #[serde(skip)]
    pub battle: Option<BattleState>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            player: PlayerState::default(),
            unlocked_stages: vec![FIRST_STAGE_ID],
            current_stage: FIRST_STAGE_ID,
            daily_missions: DailyMissionState::default(),
            boss_defeated: Vec::new(),
            battle: None,
        }
    }
}

impl GameState {
    pub fn is_unlocked(&self, stage_id: u32) -> bool {
        self.unlocked_stages.contains(&stage_id)
    }

    pub fn is_boss_defeated(&self, boss_id: &str) -> bool {
        self.boss_defeated.iter().any(|b| b == boss_id)
    }

    /// Record a boss kill once; returns false if it was already recorded.
    pub fn record_boss_defeat(&mut self, boss_id: &str) -> bool {
        if self.is_boss_defeated(boss_id) {
            return false;
        }
        self.boss_defeated.push(boss_id.to_string());
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct UpgradeResult {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct FusionResult {
    pub success: bool,
    pub new_card: Option<WordCard>,
    pub consumed_cards: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ClaimResult {
    pub success: bool,
    pub gold: u32,
    pub exp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct FusionCandidate {
    pub term_id: String,
    pub cards: Vec<WordCard>,
}
