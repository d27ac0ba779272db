//! Card minting, upgrades and fusion.

use std::collections::BTreeMap;

use rand::Rng;

use super::types::{FusionCandidate, Rarity, WordCard, MAX_UPGRADE_LEVEL};
use crate::corpus::Term;

/// Added to the rare-tier thresholds for terms that carry a formula.
pub const FORMULA_RARITY_BOOST: f64 = 0.1;
pub const UPGRADE_ATTACK_BONUS: f64 = 0.2;
pub const UPGRADE_HEAL_BONUS: f64 = 0.15;
pub const PROMOTION_CHANCE: f64 = 0.3;
/// Upgrade levels that roll for a rarity promotion.
pub const PROMOTION_LEVELS: [u8; 2] = [3, 5];
pub const MIN_FUSION_CARDS: usize = 2;

pub fn roll_rarity<R: Rng + ?Sized>(term: &Term, rng: &mut R) -> Rarity {
    let boost = if term.formula.as_deref().map_or(false, |f| !f.is_empty()) {
        FORMULA_RARITY_BOOST
    } else {
        0.0
    };
    let roll: f64 = rng.gen();
    if roll < 0.01 + boost {
        Rarity::Legendary
    } else if roll < 0.05 + boost {
        Rarity::Epic
    } else if roll < 0.20 + boost {
        Rarity::Rare
    } else if roll < 0.50 {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

fn blank_card(term: &Term, id: String, rarity: Rarity, now_ms: i64) -> WordCard {
    WordCard {
        id,
        term_id: term.term_id.clone(),
        term: term.canonical_en.clone(),
        term_ja: term.headword_jp.clone(),
        rarity,
        attack_power: rarity.base_attack(),
        heal_power: rarity.base_heal(),
        acquired_at: now_ms,
        usage_count: 0,
        success_count: 0,
        upgrade_level: 0,
    }
}

/// A dropped card: random rarity, base stats plus a small random bonus.
pub fn mint_card<R: Rng + ?Sized>(term: &Term, id: String, now_ms: i64, rng: &mut R) -> WordCard {
    let rarity = roll_rarity(term, rng);
    let mut card = blank_card(term, id, rarity, now_ms);
    card.attack_power += rng.gen_range(0..10);
    card.heal_power += rng.gen_range(0..5);
    card
}

/// Starter cards are always Common with base stats.
pub fn starter_card(term: &Term, id: String, now_ms: i64) -> WordCard {
    blank_card(term, id, Rarity::Common, now_ms)
}

/// Stats for `rarity` at `level`: `floor(base * (1 + bonus * level))`.
pub fn upgraded_stats(rarity: Rarity, level: u8) -> (u32, u32) {
    let scale =
        |base: u32, bonus: f64| (f64::from(base) * (1.0 + bonus * f64::from(level))).floor() as u32;
    (
        scale(rarity.base_attack(), UPGRADE_ATTACK_BONUS),
        scale(rarity.base_heal(), UPGRADE_HEAL_BONUS),
    )
}

/// Gold needed for the next upgrade, `None` at the cap.
pub fn upgrade_cost(card: &WordCard) -> Option<u32> {
    card.rarity
        .upgrade_costs()
        .get(card.upgrade_level as usize)
        .copied()
        .filter(|_| card.upgrade_level < MAX_UPGRADE_LEVEL)
}

/// Raise the upgrade level by one and recompute stats. Returns true when the
/// card was promoted to the next rarity.
pub fn apply_upgrade<R: Rng + ?Sized>(card: &mut WordCard, rng: &mut R) -> bool {
    card.upgrade_level += 1;
    let mut promoted = false;
    if PROMOTION_LEVELS.contains(&card.upgrade_level) {
        if let Some(next) = card.rarity.promoted() {
            if rng.gen::<f64>() < PROMOTION_CHANCE {
                card.rarity = next;
                promoted = true;
            }
        }
    }
    let (attack, heal) = upgraded_stats(card.rarity, card.upgrade_level);
    card.attack_power = attack;
    card.heal_power = heal;
    promoted
}

/// Promotion chance when fusing `card_count` cards.
pub fn fusion_chance(card_count: usize) -> f64 {
    let extra = card_count.saturating_sub(1) as f64;
    (0.3 + 0.15 * extra).min(0.8)
}

/// Build the fusion output for `materials`, which must share one term.
///
/// The result takes the highest input rarity, possibly promoted one tier, with
/// that tier's base stats, the highest input upgrade level and fresh counters.
pub fn fuse<R: Rng + ?Sized>(
    materials: &[WordCard],
    id: String,
    now_ms: i64,
    rng: &mut R,
) -> Option<WordCard> {
    let base = materials.iter().max_by_key(|c| c.rarity)?;
    let mut rarity = base.rarity;
    if let Some(next) = rarity.promoted() {
        if rng.gen::<f64>() < fusion_chance(materials.len()) {
            rarity = next;
        }
    }
    Some(WordCard {
        id,
        term_id: base.term_id.clone(),
        term: base.term.clone(),
        term_ja: base.term_ja.clone(),
        rarity,
        attack_power: rarity.base_attack(),
        heal_power: rarity.base_heal(),
        acquired_at: now_ms,
        usage_count: 0,
        success_count: 0,
        upgrade_level: materials.iter().map(|c| c.upgrade_level).max().unwrap_or(0),
    })
}

/// Terms owning two or more cards, ordered by term id.
pub fn fusion_candidates(cards: &[WordCard]) -> Vec<FusionCandidate> {
    let mut by_term: BTreeMap<&str, Vec<WordCard>> = BTreeMap::new();
    for card in cards {
        by_term.entry(&card.term_id).or_default().push(card.clone());
    }
    by_term
        .into_iter()
        .filter(|(_, cards)| cards.len() >= MIN_FUSION_CARDS)
        .map(|(term_id, cards)| FusionCandidate {
            term_id: term_id.to_string(),
            cards,
        })
        .collect()
}
