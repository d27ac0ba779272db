//! # Progression store
//!
//! [`GameStore`] is the single writer of all game state. Every command either
//! applies completely or returns a neutral value (`false`, a default result,
//! `None`) and leaves state untouched. After a mutation the persistent part of
//! the state is saved and subscribers are called synchronously.
//!
//! The active battle is held in memory only and is lost on restart.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::battle::content::{stage_by_id, stages, Enemy, Stage};
use crate::battle::rewards::{resolve_defeat, resolve_victory};
use crate::battle::types::{AnswerResult, BattleOutcome, BattleState, CardAction, TurnOutcome};
use crate::clock::{Clock, LocalClock};
use crate::config::AppConfig;
use crate::corpus::{Corpus, Term};
use crate::error::CorpusError;
use crate::player_seed::boxed_rng;
use crate::quiz::exam::ExamBank;
use crate::quiz::QuizQuestion;
use crate::review::{self, LearningStatistics, ProgressBook};

pub mod cards;
pub mod endpoints;
pub mod missions;
pub mod persistence;
pub mod types;

use persistence::{
    load_json_or_default, open_store, save_json, KeyValueStore, GAME_STATE_KEY, PROGRESS_KEY,
};
use types::{
    ClaimResult, DailyMission, FusionCandidate, FusionResult, GameState, ItemType, MissionType,
    PlayerState, UpgradeResult, WordCard,
};

pub const STARTER_CARD_COUNT: usize = 5;

pub type Listener = Box<dyn FnMut(&GameState) + Send>;

/// The store as managed by Rocket; requests serialize on the lock.
pub type SharedStore = std::sync::Arc<rocket::futures::lock::Mutex<GameStore>>;

/// Handle returned by [`GameStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct GameStore {
    state: GameState,
    progress: ProgressBook,
    corpus: Corpus,
    exam_bank: ExamBank,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener_id: u64,
}

impl std::fmt::Debug for GameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &self.state)
            .field("terms", &self.corpus.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl GameStore {
    /// A store with default state. Call [`GameStore::load_state`] to pick up saved data.
    pub fn new(
        storage: Box<dyn KeyValueStore>,
        corpus: Corpus,
        clock: Box<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let exam_bank = ExamBank::embedded().unwrap_or_else(|e| {
            log::warn!("exam question bank unavailable: {}", e);
            ExamBank::default()
        });
        GameStore {
            state: GameState::default(),
            progress: ProgressBook::default(),
            corpus,
            exam_bank,
            storage,
            clock,
            rng,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Build and load a store from runtime configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, CorpusError> {
        let corpus = match &config.corpus_dir {
            Some(dir) => Corpus::from_json_files(dir)?,
            None => Corpus::embedded()?,
        };
        let qa = corpus.validate();
        if qa.passed {
            log::info!("corpus loaded: {} terms", qa.total_terms);
        } else {
            log::warn!(
                "corpus quality check failed: {} duplicates, {} missing definitions, {} orphan relations",
                qa.duplicate_count,
                qa.missing_definition.len(),
                qa.orphan_relations.len()
            );
        }
        let mut store = GameStore::new(
            open_store(config),
            corpus,
            Box::new(LocalClock),
            boxed_rng(config.seed),
        );
        store.load_state();
        Ok(store)
    }

    pub fn with_exam_bank(mut self, exam_bank: ExamBank) -> Self {
        self.exam_bank = exam_bank;
        self
    }

    /// Replace the RNG with a deterministic one.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = boxed_rng(Some(seed));
        log::info!("game RNG reseeded with {}", seed);
    }

    // ----- reads -----

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> &PlayerState {
        &self.state.player
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.state.battle.as_ref()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub fn stages(&self) -> &'static [Stage] {
        stages()
    }

    pub fn stage_boss(&self, stage_id: u32) -> Option<&'static Enemy> {
        stage_by_id(stage_id).and_then(|s| s.boss.as_ref())
    }

    pub fn is_boss_defeated(&self, boss_id: &str) -> bool {
        self.state.is_boss_defeated(boss_id)
    }

    pub fn item_count(&self, item_type: ItemType) -> u32 {
        self.state.player.item_count(item_type)
    }

    pub fn deck_cards(&self) -> Vec<WordCard> {
        self.state.player.deck_cards()
    }

    pub fn upgrade_cost(&self, card_id: &str) -> Option<u32> {
        self.state
            .player
            .card(card_id)
            .and_then(cards::upgrade_cost)
    }

    pub fn fusion_candidates(&self) -> Vec<FusionCandidate> {
        cards::fusion_candidates(&self.state.player.cards)
    }

    pub fn due_terms(&self) -> Vec<&Term> {
        review::due_terms(
            self.corpus.terms(),
            &self.progress.entries,
            self.clock.today(),
        )
    }

    pub fn statistics(&self) -> LearningStatistics {
        review::statistics(
            self.corpus.terms(),
            &self.progress,
            self.corpus.topics(),
            self.clock.today(),
        )
    }

    fn battle_in_progress(&self) -> bool {
        self.state.battle.as_ref().map_or(false, |b| !b.is_over())
    }

    // ----- persistence and notification -----

    /// Replace in-memory state with the saved snapshot, filling missing fields
    /// with defaults. Any active battle is dropped.
    pub fn load_state(&mut self) {
        let mut state: GameState = load_json_or_default(self.storage.as_ref(), GAME_STATE_KEY);
        let player = &mut state.player;
        let owned: HashSet<String> = player.cards.iter().map(|c| c.id.clone()).collect();
        let mut seen = HashSet::new();
        player
            .current_deck
            .retain(|id| owned.contains(id) && seen.insert(id.clone()));
        player.current_deck.truncate(player.deck_capacity as usize);
        if state.unlocked_stages.is_empty() {
            state.unlocked_stages.push(types::FIRST_STAGE_ID);
        }
        self.state = state;
        self.progress = load_json_or_default(self.storage.as_ref(), PROGRESS_KEY);
        log::info!(
            "loaded game state: level {}, {} cards, {} studied terms",
            self.state.player.level,
            self.state.player.cards.len(),
            self.progress.entries.len()
        );
        self.notify();
    }

    fn save_state(&mut self) {
        if let Err(e) = save_json(self.storage.as_mut(), GAME_STATE_KEY, &self.state) {
            log::warn!("failed to save game state: {}", e);
        }
    }

    fn save_progress(&mut self) {
        if let Err(e) = save_json(self.storage.as_mut(), PROGRESS_KEY, &self.progress) {
            log::warn!("failed to save learning progress: {}", e);
        }
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&self.state);
        }
        self.listeners = listeners;
    }

    fn commit(&mut self) {
        self.save_state();
        self.notify();
    }

    /// Register a callback run after every state change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameState) + Send + 'static,
    {
        self.next_listener_id += 1;
        let id = SubscriptionId(self.next_listener_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Clear game state and its saved snapshot. Learning progress is kept.
    pub fn reset_game(&mut self) {
        self.state = GameState::default();
        if let Err(e) = self.storage.remove(GAME_STATE_KEY) {
            log::warn!("failed to remove saved game state: {}", e);
        }
        log::info!("game reset");
        self.notify();
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    // ----- learning progress -----

    /// Record a study event outside battle. False for unknown terms.
    pub fn record_study(&mut self, term_id: &str, correct: bool) -> bool {
        if self.corpus.term(term_id).is_none() {
            return false;
        }
        let today = self.clock.today();
        self.progress.record_study(term_id, correct, today);
        self.save_progress();
        self.notify();
        true
    }

    pub fn toggle_bookmark(&mut self, term_id: &str) -> Option<bool> {
        self.corpus.term(term_id)?;
        let today = self.clock.today();
        let flag = self.progress.toggle_bookmark(term_id, today);
        self.save_progress();
        self.notify();
        Some(flag)
    }

    pub fn toggle_difficult(&mut self, term_id: &str) -> Option<bool> {
        self.corpus.term(term_id)?;
        let today = self.clock.today();
        let flag = self.progress.toggle_difficult(term_id, today);
        self.save_progress();
        self.notify();
        Some(flag)
    }

    // ----- cards and deck -----

    /// Give a new player Common cards for the first corpus terms and put them
    /// in the deck. Does nothing once the player owns any card, or when the
    /// corpus has no terms to mint from.
    pub fn grant_starter_cards(&mut self) -> bool {
        if !self.state.player.cards.is_empty() || self.corpus.is_empty() {
            return false;
        }
        let now = Self::now_ms();
        let player = &mut self.state.player;
        for term in self.corpus.terms().iter().take(STARTER_CARD_COUNT) {
            let id = player.allocate_card_id();
            let card = cards::starter_card(term, id, now);
            if player.current_deck.len() < player.deck_capacity as usize {
                player.current_deck.push(card.id.clone());
            }
            player.cards.push(card);
        }
        log::info!("granted {} starter cards", player.cards.len());
        self.commit();
        true
    }

    pub fn add_to_deck(&mut self, card_id: &str) -> bool {
        let player = &mut self.state.player;
        if player.card(card_id).is_none()
            || player.current_deck.iter().any(|id| id == card_id)
            || player.current_deck.len() >= player.deck_capacity as usize
        {
            return false;
        }
        player.current_deck.push(card_id.to_string());
        self.commit();
        true
    }

    pub fn remove_from_deck(&mut self, card_id: &str) -> bool {
        let deck = &mut self.state.player.current_deck;
        let before = deck.len();
        deck.retain(|id| id != card_id);
        if deck.len() == before {
            return false;
        }
        self.commit();
        true
    }

    pub fn upgrade_card(&mut self, card_id: &str) -> UpgradeResult {
        let Some(index) = self.state.player.cards.iter().position(|c| c.id == card_id) else {
            return UpgradeResult {
                success: false,
                message: format!("Card {} not found", card_id),
            };
        };
        let Some(cost) = cards::upgrade_cost(&self.state.player.cards[index]) else {
            return UpgradeResult {
                success: false,
                message: "Card is already at the maximum upgrade level".to_string(),
            };
        };
        if self.state.player.gold < cost {
            return UpgradeResult {
                success: false,
                message: format!("Not enough gold (need {}G)", cost),
            };
        }

        self.state.player.gold -= cost;
        let card = &mut self.state.player.cards[index];
        let promoted = cards::apply_upgrade(card, &mut *self.rng);
        let message = if promoted {
            format!("Upgrade succeeded! Rarity rose to {:?}", card.rarity)
        } else {
            format!("Upgrade succeeded! Now level {}", card.upgrade_level)
        };
        log::info!("card {}: {}", card_id, message);
        self.commit();
        UpgradeResult {
            success: true,
            message,
        }
    }

    /// Consume two or more distinct cards of one term and mint their fusion.
    pub fn fuse_cards(&mut self, card_ids: &[String]) -> FusionResult {
        if card_ids.len() < cards::MIN_FUSION_CARDS {
            return FusionResult::default();
        }
        let unique: HashSet<&str> = card_ids.iter().map(String::as_str).collect();
        if unique.len() != card_ids.len() {
            return FusionResult::default();
        }
        let Some(materials) = card_ids
            .iter()
            .map(|id| self.state.player.card(id).cloned())
            .collect::<Option<Vec<WordCard>>>()
        else {
            return FusionResult::default();
        };
        if !materials.iter().all(|c| c.term_id == materials[0].term_id) {
            return FusionResult::default();
        }

        let id = self.state.player.allocate_card_id();
        let Some(new_card) = cards::fuse(&materials, id, Self::now_ms(), &mut *self.rng) else {
            return FusionResult::default();
        };
        let player = &mut self.state.player;
        player.cards.retain(|c| !unique.contains(c.id.as_str()));
        player
            .current_deck
            .retain(|id| !unique.contains(id.as_str()));
        player.cards.push(new_card.clone());
        log::info!(
            "fused {} cards of {} into {:?} {}",
            materials.len(),
            new_card.term_id,
            new_card.rarity,
            new_card.id
        );
        self.commit();
        FusionResult {
            success: true,
            new_card: Some(new_card),
            consumed_cards: card_ids.to_vec(),
        }
    }

    // ----- items -----

    pub fn buy_item(&mut self, item_type: ItemType) -> bool {
        let price = item_type.price();
        let player = &mut self.state.player;
        if player.gold < price {
            return false;
        }
        player.gold -= price;
        match player.items.iter_mut().find(|i| i.item_type == item_type) {
            Some(item) => item.quantity += 1,
            None => player.items.push(item_type.definition()),
        }
        self.commit();
        true
    }

    /// Spend one item before a battle; its effect applies to the next battle.
    pub fn use_item(&mut self, item_type: ItemType) -> bool {
        if self.battle_in_progress() {
            return false;
        }
        let player = &mut self.state.player;
        let Some(item) = player
            .items
            .iter_mut()
            .find(|i| i.item_type == item_type && i.quantity > 0)
        else {
            return false;
        };
        item.quantity -= 1;
        player.items.retain(|i| i.quantity > 0);
        player.active_item = Some(item_type);
        self.commit();
        true
    }

    // ----- battle -----

    fn begin_battle(&mut self, stage_id: u32, enemy: &Enemy) {
        let exam_question = match self.state.player.active_item {
            Some(_) => self.exam_bank.random_question(&mut *self.rng).cloned(),
            None => None,
        };
        let battle = BattleState::start(
            stage_id,
            enemy,
            self.state.player.deck_cards(),
            &self.state.player,
            exam_question,
            &mut *self.rng,
        );
        self.state.battle = Some(battle);
        self.state.current_stage = stage_id;
        self.commit();
    }

    fn can_start_on(&self, stage_id: u32) -> bool {
        if self.battle_in_progress() {
            log::debug!("battle already in progress");
            return false;
        }
        if !self.state.is_unlocked(stage_id) {
            log::debug!("stage {} is locked", stage_id);
            return false;
        }
        !self.state.player.current_deck.is_empty()
    }

    /// Fight a random ordinary enemy of an unlocked stage.
    pub fn start_battle(&mut self, stage_id: u32) -> bool {
        let Some(stage) = stage_by_id(stage_id) else {
            return false;
        };
        if !self.can_start_on(stage_id) {
            return false;
        }
        let Some(enemy) = stage.enemies.choose(&mut *self.rng) else {
            return false;
        };
        self.begin_battle(stage_id, enemy);
        true
    }

    /// Fight the stage boss. Refused once that boss has been defeated.
    pub fn start_boss_battle(&mut self, stage_id: u32) -> bool {
        let Some(boss) = self.stage_boss(stage_id) else {
            return false;
        };
        if self.state.is_boss_defeated(&boss.id) || !self.can_start_on(stage_id) {
            return false;
        }
        self.begin_battle(stage_id, boss);
        true
    }

    pub fn answer_item_quiz(&mut self, answer: &str) -> bool {
        let Some(battle) = self.state.battle.as_mut() else {
            return false;
        };
        match battle.answer_item_quiz(answer) {
            Ok(correct) => {
                self.notify();
                correct
            }
            Err(e) => {
                log::debug!("item quiz answer rejected: {}", e);
                false
            }
        }
    }

    pub fn select_card(&mut self, card_id: &str, action: CardAction) -> Option<QuizQuestion> {
        let battle = self.state.battle.as_mut()?;
        match battle.select_card(card_id, action, &self.corpus, &mut *self.rng) {
            Ok(quiz) => {
                let quiz = quiz.clone();
                self.notify();
                Some(quiz)
            }
            Err(e) => {
                log::debug!("card selection rejected: {}", e);
                None
            }
        }
    }

    pub fn select_burst_cards(&mut self, first_id: &str, second_id: &str) -> Option<QuizQuestion> {
        let battle = self.state.battle.as_mut()?;
        match battle.select_burst_cards(first_id, second_id, &self.corpus, &mut *self.rng) {
            Ok(quiz) => {
                let quiz = quiz.clone();
                self.notify();
                Some(quiz)
            }
            Err(e) => {
                log::debug!("burst selection rejected: {}", e);
                None
            }
        }
    }

    /// Grade the pending quiz. Records a study event per participating term
    /// and updates card usage counters.
    pub fn answer_quiz(&mut self, answer: &str, action: CardAction) -> AnswerResult {
        let Some(battle) = self.state.battle.as_mut() else {
            return AnswerResult::default();
        };
        let answered = match battle.answer_quiz(answer, action) {
            Ok(a) => a,
            Err(e) => {
                log::debug!("quiz answer rejected: {}", e);
                return AnswerResult::default();
            }
        };
        let correct = answered.result.correct;
        let today = self.clock.today();
        for term_id in &answered.term_ids {
            self.progress.record_study(term_id, correct, today);
        }
        for card_id in &answered.card_ids {
            if let Some(card) = self.state.player.card_mut(card_id) {
                card.usage_count += 1;
                if correct {
                    card.success_count += 1;
                }
            }
        }
        if correct {
            self.record_mission(MissionType::QuizCorrect, 1);
        }
        self.save_progress();
        self.commit();
        answered.result
    }

    /// Advance past the result screen. False when no result is pending.
    pub fn proceed_to_next_turn(&mut self) -> bool {
        let Some(battle) = self.state.battle.as_mut() else {
            return false;
        };
        match battle.proceed_to_next_turn() {
            Ok(TurnOutcome::Continue) => {
                self.notify();
                true
            }
            Ok(TurnOutcome::Ended(outcome)) => {
                self.end_battle(outcome);
                true
            }
            Err(e) => {
                log::debug!("next turn rejected: {}", e);
                false
            }
        }
    }

    fn end_battle(&mut self, outcome: BattleOutcome) {
        let Some(mut battle) = self.state.battle.take() else {
            return;
        };
        match outcome {
            BattleOutcome::Victory => {
                let rewards = resolve_victory(
                    &mut self.state,
                    &mut battle,
                    &self.corpus,
                    &mut *self.rng,
                    Self::now_ms(),
                );
                if rewards.boss_recorded {
                    self.record_mission(MissionType::BossDefeat, 1);
                }
                self.record_mission(MissionType::BattleWins, 1);
                self.record_mission(MissionType::GoldEarn, rewards.gold);
                if rewards.dropped_card.is_some() {
                    self.record_mission(MissionType::CardCollect, 1);
                }
            }
            BattleOutcome::Defeat => resolve_defeat(&mut self.state, &mut battle),
        }
        self.state.battle = Some(battle);
        self.commit();
    }

    /// Discard the battle unconditionally.
    pub fn reset_battle(&mut self) {
        if self.state.battle.take().is_some() {
            log::info!("battle discarded");
        }
        self.notify();
    }

    // ----- daily missions -----

    fn record_mission(&mut self, mission_type: MissionType, amount: u32) {
        let today = self.clock.today();
        self.state
            .daily_missions
            .refresh_if_stale(today, &mut *self.rng);
        self.state
            .daily_missions
            .record_progress(mission_type, amount);
    }

    /// Today's missions, rolling a new set on a new day.
    pub fn daily_missions(&mut self) -> Vec<DailyMission> {
        let today = self.clock.today();
        if self
            .state
            .daily_missions
            .refresh_if_stale(today, &mut *self.rng)
        {
            self.commit();
        }
        self.state.daily_missions.missions.clone()
    }

    pub fn claim_mission_reward(&mut self, mission_id: &str) -> ClaimResult {
        let Some((gold, exp)) = self.state.daily_missions.claim(mission_id) else {
            return ClaimResult::default();
        };
        self.state.player.gold += gold;
        self.state.player.gain_exp(exp);
        self.commit();
        ClaimResult {
            success: true,
            gold,
            exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::persistence::MemoryStore;
    use super::types::{DailyMissionState, Rarity};
    use super::*;
    use crate::battle::types::BattlePhase;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use rand::rngs::mock::StepRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn store_on(storage: MemoryStore, clock: FixedClock) -> GameStore {
        GameStore::new(
            Box::new(storage),
            Corpus::embedded().unwrap(),
            Box::new(clock),
            Box::new(StepRng::new(0, 0)),
        )
    }

    fn store() -> GameStore {
        store_on(MemoryStore::new(), FixedClock::new(day(1)))
    }

    /// Play the first hand card and answer correctly.
    fn correct_attack(store: &mut GameStore) -> AnswerResult {
        let card_id = store.battle().unwrap().current_hand[0].id.clone();
        let quiz = store.select_card(&card_id, CardAction::Attack).unwrap();
        store.answer_quiz(&quiz.correct_answer, CardAction::Attack)
    }

    #[test]
    fn starter_cards_fill_the_deck_once() {
        let mut store = store();
        assert!(store.grant_starter_cards());
        assert_eq!(store.player().cards.len(), STARTER_CARD_COUNT);
        assert_eq!(store.player().current_deck.len(), STARTER_CARD_COUNT);
        assert!(store
            .player()
            .cards
            .iter()
            .all(|c| c.rarity == Rarity::Common));
        assert_eq!(
            store.player().cards[0].term_id,
            store.corpus().terms()[0].term_id
        );
        assert!(!store.grant_starter_cards());
        assert_eq!(store.player().cards.len(), STARTER_CARD_COUNT);
    }

    #[test]
    fn empty_corpus_grants_nothing() {
        let mut store = GameStore::new(
            Box::new(MemoryStore::new()),
            Corpus::from_parts(Vec::new(), Vec::new(), Vec::new()),
            Box::new(FixedClock::new(day(1))),
            Box::new(StepRng::new(0, 0)),
        );
        assert!(!store.grant_starter_cards());
        assert!(store.player().cards.is_empty());
        assert_eq!(store.player().next_card_seq, 0);
    }

    #[test]
    fn battle_needs_an_unlocked_stage_and_a_deck() {
        let mut store = store();
        assert!(!store.start_battle(1));
        store.grant_starter_cards();
        assert!(!store.start_battle(2));
        assert!(!store.start_battle(99));
        assert!(store.start_battle(1));
        assert!(!store.start_battle(1));
        assert_eq!(store.battle().unwrap().enemy.id, "eq1");
    }

    #[test]
    fn four_correct_attacks_beat_the_first_enemy() {
        let mut store = store();
        store.grant_starter_cards();
        assert!(store.start_battle(1));
        for _ in 0..3 {
            let result = correct_attack(&mut store);
            assert_eq!(result.damage, 10);
            assert!(store.proceed_to_next_turn());
            assert_eq!(store.battle().unwrap().phase, BattlePhase::SelectAction);
        }
        correct_attack(&mut store);
        assert!(store.proceed_to_next_turn());

        let battle = store.battle().unwrap();
        assert_eq!(battle.outcome, Some(BattleOutcome::Victory));
        let rewards = battle.rewards.clone().unwrap();
        assert_eq!(rewards.exp, 15);
        assert_eq!(rewards.gold, 20);
        // a zero roll always drops, and drops at the top rarity
        assert_eq!(rewards.dropped_card.unwrap().rarity, Rarity::Legendary);

        let player = store.player();
        assert_eq!(player.total_wins, 1);
        assert_eq!(player.gold, 20);
        assert_eq!(player.exp, 15);
        assert_eq!(player.cards.len(), STARTER_CARD_COUNT + 1);
        assert_eq!(player.hp, player.max_hp);
        assert!(player
            .cards
            .iter()
            .any(|c| c.usage_count == 1 && c.success_count == 1));
        assert_eq!(store.progress().entries.len(), 4);
    }

    #[test]
    fn out_of_phase_commands_are_neutral() {
        let mut store = store();
        assert_eq!(
            store.answer_quiz("x", CardAction::Attack),
            AnswerResult::default()
        );
        assert!(!store.proceed_to_next_turn());
        store.grant_starter_cards();
        store.start_battle(1);
        let before = store.battle().cloned();
        assert!(!store.proceed_to_next_turn());
        assert!(!store.answer_item_quiz("9.0%"));
        assert!(store.select_card("card_999", CardAction::Attack).is_none());
        assert_eq!(store.battle().cloned(), before);
    }

    #[test]
    fn defeat_restores_half_hp() {
        let mut store = store();
        store.grant_starter_cards();
        store.state.player.hp = 1;
        store.start_battle(1);
        let played = store.battle().unwrap().current_hand[0].clone();
        store.select_card(&played.id, CardAction::Attack).unwrap();
        let result = store.answer_quiz("definitely wrong", CardAction::Attack);
        assert!(!result.correct);
        assert!(store.proceed_to_next_turn());
        assert_eq!(store.battle().unwrap().outcome, Some(BattleOutcome::Defeat));
        assert_eq!(store.player().hp, store.player().max_hp / 2);
        assert_eq!(store.player().total_battles, 1);
        assert_eq!(store.player().total_wins, 0);
        assert_eq!(
            store
                .progress()
                .get(&played.term_id)
                .unwrap()
                .incorrect_count,
            1
        );
    }

    #[test]
    fn power_surge_multiplies_victory_exp() {
        let mut store = store();
        store.grant_starter_cards();
        store.state.player.gold = 500;
        assert!(store.buy_item(ItemType::PowerSurge));
        assert_eq!(store.player().gold, 0);
        assert!(!store.buy_item(ItemType::PowerSurge));
        assert!(store.use_item(ItemType::PowerSurge));
        assert_eq!(store.item_count(ItemType::PowerSurge), 0);
        assert!(!store.use_item(ItemType::PowerSurge));

        for card in store.state.player.cards.iter_mut() {
            card.attack_power = 100;
        }
        assert!(store.start_battle(1));
        assert_eq!(store.battle().unwrap().phase, BattlePhase::ItemQuiz);
        let answer = store
            .battle()
            .and_then(|b| b.exam_question.as_ref())
            .map(|q| q.correct_answer.clone())
            .unwrap();
        assert!(store.answer_item_quiz(&answer));
        correct_attack(&mut store);
        store.proceed_to_next_turn();

        assert_eq!(store.battle().unwrap().rewards.as_ref().unwrap().exp, 150);
        assert_eq!(store.player().level, 2);
        assert_eq!(store.player().exp, 50);
        assert_eq!(store.player().active_item, None);
    }

    #[test]
    fn boss_can_only_be_beaten_once() {
        let mut store = store();
        store.grant_starter_cards();
        for card in store.state.player.cards.iter_mut() {
            card.attack_power = 500;
        }
        assert!(store.start_boss_battle(1));
        assert!(store.battle().unwrap().enemy.is_boss);
        correct_attack(&mut store);
        store.proceed_to_next_turn();
        assert!(store
            .battle()
            .unwrap()
            .rewards
            .as_ref()
            .unwrap()
            .boss_recorded);
        assert!(store.is_boss_defeated("eq_king"));
        assert!(!store.start_boss_battle(1));
        assert_eq!(store.state().boss_defeated, vec!["eq_king".to_string()]);
        assert!(store.start_battle(1));
    }

    #[test]
    fn reset_battle_discards_everything() {
        let mut store = store();
        store.grant_starter_cards();
        store.start_battle(1);
        store.reset_battle();
        assert!(store.battle().is_none());
        assert!(store.start_battle(1));
    }

    #[test]
    fn use_item_is_refused_mid_battle() {
        let mut store = store();
        store.grant_starter_cards();
        store.state.player.gold = 500;
        store.buy_item(ItemType::PowerSurge);
        store.start_battle(1);
        assert!(!store.use_item(ItemType::PowerSurge));
        assert_eq!(store.item_count(ItemType::PowerSurge), 1);
    }

    #[test]
    fn upgrade_spends_gold_and_reports_shortfall() {
        let mut store = store();
        store.grant_starter_cards();
        let id = store.player().cards[0].id.clone();
        assert_eq!(store.upgrade_cost(&id), Some(50));
        let result = store.upgrade_card(&id);
        assert!(!result.success);
        assert!(result.message.contains("50"));

        store.state.player.gold = 60;
        assert!(store.upgrade_card(&id).success);
        assert_eq!(store.player().gold, 10);
        assert_eq!(store.player().card(&id).unwrap().upgrade_level, 1);
        assert!(!store.upgrade_card("missing").success);
    }

    #[test]
    fn fusion_consumes_materials() {
        let mut store = store();
        store.grant_starter_cards();
        let term = store.corpus().terms()[0].clone();
        let extra_id = store.state.player.allocate_card_id();
        store
            .state
            .player
            .cards
            .push(cards::starter_card(&term, extra_id.clone(), 0));
        let first_id = store.player().cards[0].id.clone();

        let candidates = store.fusion_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].term_id, term.term_id);

        assert!(!store.fuse_cards(&[first_id.clone()]).success);
        assert!(
            !store
                .fuse_cards(&[first_id.clone(), first_id.clone()])
                .success
        );

        let result = store.fuse_cards(&[first_id.clone(), extra_id.clone()]);
        assert!(result.success);
        let fused = result.new_card.unwrap();
        assert_eq!(fused.rarity, Rarity::Uncommon);
        assert!(store.player().card(&first_id).is_none());
        assert!(store.player().card(&extra_id).is_none());
        assert!(!store.player().current_deck.contains(&first_id));
        assert!(store.player().card(&fused.id).is_some());
        assert_eq!(store.player().cards.len(), STARTER_CARD_COUNT);
    }

    #[test]
    fn fusion_rejects_mixed_terms() {
        let mut store = store();
        store.grant_starter_cards();
        let ids: Vec<String> = store.player().cards[..2]
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert!(!store.fuse_cards(&ids).success);
        assert_eq!(store.player().cards.len(), STARTER_CARD_COUNT);
    }

    #[test]
    fn deck_edits_respect_capacity() {
        let mut store = store();
        store.grant_starter_cards();
        let first = store.player().current_deck[0].clone();
        assert!(!store.add_to_deck(&first));
        let term = store.corpus().terms()[10].clone();
        let id = store.state.player.allocate_card_id();
        store
            .state
            .player
            .cards
            .push(cards::starter_card(&term, id.clone(), 0));
        // deck is full at level 1
        assert!(!store.add_to_deck(&id));
        assert!(store.remove_from_deck(&first));
        assert!(!store.remove_from_deck(&first));
        assert!(store.add_to_deck(&id));
        assert!(!store.add_to_deck("card_404"));
        assert_eq!(store.deck_cards().len(), 5);
    }

    #[test]
    fn claims_pay_out_once() {
        let mut store = store();
        store.daily_missions();
        let mission = store.state.daily_missions.missions[0].clone();
        assert!(!store.claim_mission_reward(&mission.id).success);
        store
            .state
            .daily_missions
            .record_progress(mission.mission_type, mission.target);

        let claim = store.claim_mission_reward(&mission.id);
        assert!(claim.success);
        assert_eq!(claim.gold, mission.reward_gold);
        assert_eq!(store.player().gold, mission.reward_gold);
        assert_eq!(store.state().daily_missions.total_completed, 1);
        assert!(!store.claim_mission_reward(&mission.id).success);
        assert!(!store.claim_mission_reward("daily_nope").success);
        assert_eq!(store.player().gold, mission.reward_gold);
    }

    #[test]
    fn missions_roll_over_with_the_clock() {
        let clock = FixedClock::new(day(1));
        let mut store = store_on(MemoryStore::new(), clock.clone());
        let first = store.daily_missions();
        assert_eq!(first.len(), missions::MISSIONS_PER_DAY);
        assert_eq!(store.daily_missions(), first);
        clock.set(day(2));
        let second = store.daily_missions();
        assert_ne!(second[0].id, first[0].id);
        assert_eq!(store.state().daily_missions.last_reset_date, Some(day(2)));
    }

    #[test]
    fn state_survives_a_reload() {
        let storage = MemoryStore::new();
        let clock = FixedClock::new(day(1));
        let mut store = store_on(storage.clone(), clock.clone());
        store.grant_starter_cards();
        store.state.boss_defeated.push("eq_king".into());
        store.state.daily_missions = DailyMissionState::default();
        store.state.player.gold = 577;
        assert!(store.buy_item(ItemType::PowerSurge));
        store.record_study("EQ001", true);

        let mut reloaded = store_on(storage, clock);
        reloaded.load_state();
        assert_eq!(reloaded.player(), store.player());
        assert!(reloaded.is_boss_defeated("eq_king"));
        assert_eq!(reloaded.progress().get("EQ001").unwrap().correct_count, 1);
        assert!(reloaded.battle().is_none());
    }

    #[test]
    fn load_drops_unknown_deck_ids() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                GAME_STATE_KEY,
                r#"{"player": {"current_deck": ["card_1", "card_1", "ghost"], "cards": [
                    {"id": "card_1", "term_id": "EQ001", "term": "P/E", "term_ja": "株価収益率",
                     "rarity": "common", "attack_power": 10, "heal_power": 5, "acquired_at": 0}
                ]}, "unlocked_stages": []}"#,
            )
            .unwrap();
        let mut store = store_on(storage, FixedClock::new(day(1)));
        store.load_state();
        assert_eq!(store.player().current_deck, vec!["card_1".to_string()]);
        assert_eq!(store.state().unlocked_stages, vec![types::FIRST_STAGE_ID]);
        assert_eq!(store.player().hp, types::INITIAL_MAX_HP);
    }

    #[test]
    fn reset_game_keeps_learning_progress() {
        let storage = MemoryStore::new();
        let mut store = store_on(storage.clone(), FixedClock::new(day(1)));
        store.grant_starter_cards();
        store.record_study("EQ002", false);
        store.reset_game();
        assert!(store.player().cards.is_empty());
        assert!(storage.get(GAME_STATE_KEY).unwrap().is_none());
        assert!(store.progress().get("EQ002").is_some());
    }

    #[test]
    fn subscribers_hear_mutations_until_unsubscribed() {
        let mut store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let id = store.subscribe(move |state: &GameState| {
            assert!(state.unlocked_stages.contains(&types::FIRST_STAGE_ID));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        store.grant_starter_cards();
        store.start_battle(1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.reset_battle();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn study_changes_reach_subscribers() {
        let mut store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        store.subscribe(move |_: &GameState| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(store.record_study("EQ001", true));
        assert_eq!(store.toggle_bookmark("EQ001"), Some(true));
        assert_eq!(store.toggle_difficult("EQ001"), Some(true));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!store.record_study("ZZ999", false));
        assert_eq!(store.toggle_difficult("ZZ999"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn bookmarks_need_a_known_term() {
        let mut store = store();
        assert_eq!(store.toggle_bookmark("EQ001"), Some(true));
        assert_eq!(store.toggle_bookmark("EQ001"), Some(false));
        assert_eq!(store.toggle_bookmark("ZZ999"), None);
        assert!(!store.record_study("ZZ999", true));
    }

    #[test]
    fn studying_takes_terms_off_the_due_list() {
        let mut store = store();
        let total = store.corpus().len();
        assert_eq!(store.due_terms().len(), total);
        store.record_study("EQ001", true);
        assert_eq!(store.due_terms().len(), total - 1);
        let stats = store.statistics();
        assert_eq!(stats.learned, 1);
        assert_eq!(stats.review_due, total - 1);
    }
}
