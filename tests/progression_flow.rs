use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rand::rngs::mock::StepRng;
use rand::RngCore;
use serde_json::json;
use vocab_quest::battle::types::CardAction;
use vocab_quest::clock::FixedClock;
use vocab_quest::config::AppConfig;
use vocab_quest::corpus::Corpus;
use vocab_quest::progression::persistence::{
    FileStore, KeyValueStore, MemoryStore, GAME_STATE_KEY, PROGRESS_KEY,
};
use vocab_quest::progression::types::{GameState, Rarity};
use vocab_quest::progression::GameStore;

fn constant_roll(p: f64) -> StepRng {
    StepRng::new(((p * (1u64 << 53) as f64) as u64) << 11, 0)
}

fn card_json(id: &str, term_id: &str, attack: u32) -> serde_json::Value {
    json!({
        "id": id, "term_id": term_id, "term": format!("{term_id} en"), "term_ja": format!("{term_id} jp"),
        "rarity": "common", "attack_power": attack, "heal_power": 5, "acquired_at": 0
    })
}

/// A store loaded from a saved snapshot holding `cards`, all in the deck.
fn store_with_cards(
    cards: Vec<serde_json::Value>,
    rng: impl RngCore + Send + 'static,
) -> GameStore {
    let deck: Vec<String> = cards
        .iter()
        .take(5)
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    let snapshot = json!({
        "player": {"cards": cards, "current_deck": deck, "next_card_seq": 100}
    });
    let mut storage = MemoryStore::new();
    storage
        .set(GAME_STATE_KEY, &snapshot.to_string())
        .expect("memory store");
    let mut store = GameStore::new(
        Box::new(storage),
        Corpus::embedded().unwrap(),
        Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())),
        Box::new(rng),
    );
    store.load_state();
    store
}

fn three_of_a_kind() -> Vec<serde_json::Value> {
    vec![
        card_json("a", "EQ001", 10),
        card_json("b", "EQ001", 10),
        card_json("c", "EQ001", 10),
    ]
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn fusing_three_commons_promotes_below_sixty_percent() {
    let mut store = store_with_cards(three_of_a_kind(), constant_roll(0.55));
    let result = store.fuse_cards(&ids(&["a", "b", "c"]));
    assert!(result.success);
    assert_eq!(result.consumed_cards, ids(&["a", "b", "c"]));
    let card = result.new_card.unwrap();
    assert_eq!(card.rarity, Rarity::Uncommon);
    assert_eq!(card.term_id, "EQ001");
    assert_eq!(card.term, "EQ001 en");
    assert_eq!(card.term_ja, "EQ001 jp");
    assert_eq!(store.player().cards, vec![card]);
    assert!(store.player().current_deck.is_empty());
}

#[test]
fn fusing_three_commons_stays_common_above_sixty_percent() {
    let mut store = store_with_cards(three_of_a_kind(), constant_roll(0.65));
    let result = store.fuse_cards(&ids(&["a", "b", "c"]));
    assert!(result.success);
    assert_eq!(result.new_card.unwrap().rarity, Rarity::Common);
}

#[test]
fn fusion_rejects_unknown_cards_and_keeps_state() {
    let mut store = store_with_cards(three_of_a_kind(), StepRng::new(0, 0));
    let before = store.player().clone();
    assert!(!store.fuse_cards(&ids(&["a", "zzz"])).success);
    assert_eq!(store.player(), &before);
    assert_eq!(store.fusion_candidates()[0].cards.len(), 3);
}

fn beat_stage_one_boss(store: &mut GameStore) {
    assert!(store.start_boss_battle(1));
    let card_id = store.battle().unwrap().current_hand[0].id.clone();
    let quiz = store.select_card(&card_id, CardAction::Attack).unwrap();
    store.answer_quiz(&quiz.correct_answer, CardAction::Attack);
    assert!(store.proceed_to_next_turn());
}

#[test]
fn boss_is_recorded_once_and_blocks_a_rematch() {
    let mut store = store_with_cards(vec![card_json("hero", "EQ001", 500)], StepRng::new(0, 0));
    assert!(!store.is_boss_defeated("eq_king"));
    beat_stage_one_boss(&mut store);
    assert!(store.is_boss_defeated("eq_king"));
    assert!(!store.start_boss_battle(1));
    assert!(!store.start_boss_battle(42));
    assert_eq!(store.state().boss_defeated.len(), 1);
}

#[test]
fn mission_rewards_pay_out_once() {
    let mut store = store_with_cards(vec![card_json("hero", "EQ001", 500)], StepRng::new(0, 0));
    beat_stage_one_boss(&mut store);
    let completed = store
        .daily_missions()
        .into_iter()
        .find(|m| m.completed)
        .expect("a boss win completes at least one mission");

    let gold_before = store.player().gold;
    let first = store.claim_mission_reward(&completed.id);
    assert!(first.success);
    assert_eq!(first.gold, completed.reward_gold);
    assert_eq!(store.player().gold, gold_before + completed.reward_gold);

    let second = store.claim_mission_reward(&completed.id);
    assert!(!second.success);
    assert_eq!(store.player().gold, gold_before + completed.reward_gold);
}

#[test]
fn subscribers_see_each_committed_state() {
    let mut store = store_with_cards(three_of_a_kind(), StepRng::new(0, 0));
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = store.subscribe(move |state: &GameState| {
        sink.lock().unwrap().push(state.player.cards.len());
    });
    store.fuse_cards(&ids(&["a", "b"]));
    store.remove_from_deck("c");
    store.unsubscribe(id);
    store.add_to_deck("c");
    assert_eq!(*seen.lock().unwrap(), vec![2, 2]);
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("vocab_quest_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn file_store_round_trips_across_sessions() {
    let dir = temp_dir("sessions");
    let config = AppConfig {
        data_dir: Some(dir.clone()),
        seed: Some(11),
        corpus_dir: None,
    };

    let mut first = GameStore::from_config(&config).expect("embedded corpus loads");
    assert!(first.grant_starter_cards());
    assert!(first.record_study("EQ002", true));
    assert!(first.start_battle(1));
    let player = first.player().clone();
    drop(first);

    assert!(dir.join(format!("{GAME_STATE_KEY}.json")).exists());
    assert!(dir.join(format!("{PROGRESS_KEY}.json")).exists());

    let second = GameStore::from_config(&config).expect("embedded corpus loads");
    assert_eq!(second.player(), &player);
    assert!(second.battle().is_none());
    assert_eq!(second.progress().get("EQ002").unwrap().repetitions, 1);

    let files = FileStore::new(&dir).unwrap();
    assert!(files.get(GAME_STATE_KEY).unwrap().is_some());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_data_dir_starts_fresh() {
    let dir = temp_dir("fresh");
    let config = AppConfig {
        data_dir: Some(dir.clone()),
        ..AppConfig::default()
    };
    let store = GameStore::from_config(&config).unwrap();
    assert_eq!(store.player().level, 1);
    assert!(store.player().cards.is_empty());
    assert_eq!(store.state().unlocked_stages, vec![1]);
    let _ = std::fs::remove_dir_all(&dir);
}
