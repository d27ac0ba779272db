//! Folding a finished battle back into the persistent game state.

use rand::seq::SliceRandom;
use rand::Rng;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::battle_log::{Actor, LogAction};
use super::content::stage_by_id;
use super::types::BattleState;
use crate::corpus::{Corpus, Term};
use crate::progression::cards::mint_card;
use crate::progression::types::{GameState, WordCard};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct VictoryRewards {
    pub exp: u32,
    pub gold: u32,
    pub levels_gained: u32,
    pub dropped_card: Option<WordCard>,
    pub unlocked_stage: Option<u32>,
    /// True only the first time a given boss is beaten.
    pub boss_recorded: bool,
}

/// Apply a win: EXP with level-ups, gold, card drop, next-stage unlock and
/// boss record. Clears the active item and restores full HP.
pub fn resolve_victory<R: Rng + ?Sized>(
    game: &mut GameState,
    battle: &mut BattleState,
    corpus: &Corpus,
    rng: &mut R,
    now_ms: i64,
) -> VictoryRewards {
    let player = &mut game.player;
    player.total_battles += 1;
    player.total_wins += 1;

    let exp = (f64::from(battle.enemy.exp_reward) * battle.exp_multiplier).floor() as u32;
    let gold = battle.enemy.gold_reward;
    battle.earned_exp = exp;
    battle.earned_gold = gold;
    let levels_gained = player.gain_exp(exp);
    player.gold += gold;

    let mut dropped_card = None;
    if rng.gen::<f64>() < battle.enemy.card_drop_rate {
        let topic = stage_by_id(battle.stage_id).map(|s| s.topic_code.as_str());
        let mut pool: Vec<&Term> = match topic {
            Some(code) => corpus.terms_in_topic(code).collect(),
            None => Vec::new(),
        };
        if pool.is_empty() {
            pool = corpus.terms().iter().collect();
        }
        if let Some(term) = pool.choose(rng) {
            let id = player.allocate_card_id();
            let card = mint_card(term, id, now_ms, rng);
            log::info!(
                "dropped {:?} card {} for {}",
                card.rarity,
                card.id,
                card.term_id
            );
            player.cards.push(card.clone());
            battle.earned_cards.push(card.clone());
            dropped_card = Some(card);
        }
    }

    let mut unlocked_stage = None;
    if let Some(next) = stage_by_id(battle.stage_id + 1) {
        if player.level >= next.required_level && !game.unlocked_stages.contains(&next.id) {
            game.unlocked_stages.push(next.id);
            unlocked_stage = Some(next.id);
            log::info!("unlocked stage {}", next.id);
        }
    }

    let boss_recorded = battle.enemy.is_boss && game.record_boss_defeat(&battle.enemy.id);

    game.player.active_item = None;
    game.player.hp = game.player.max_hp;

    let exp_text = if battle.exp_multiplier > 1.0 {
        format!("{} EXP (x{})", exp, battle.exp_multiplier)
    } else {
        format!("{} EXP", exp)
    };
    battle.log.append(
        Actor::Player,
        LogAction::Victory,
        format!("Victory! Earned {} and {} gold", exp_text, gold),
        None,
        None,
    );

    let rewards = VictoryRewards {
        exp,
        gold,
        levels_gained,
        dropped_card,
        unlocked_stage,
        boss_recorded,
    };
    battle.rewards = Some(rewards.clone());
    rewards
}

/// Apply a loss: no rewards, active item cleared, HP restored to half.
pub fn resolve_defeat(game: &mut GameState, battle: &mut BattleState) {
    game.player.total_battles += 1;
    game.player.active_item = None;
    game.player.hp = game.player.max_hp / 2;
    battle
        .log
        .append(Actor::Enemy, LogAction::Defeat, "Defeated...", None, None);
}
