//! # Battle engine
//!
//! A battle is a small state machine over [`BattlePhase`]:
//!
//! | From | Call | To |
//! |---|---|---|
//! | `ItemQuiz` | `answer_item_quiz` | `SelectAction` |
//! | `SelectAction` | `select_card` / `select_burst_cards` | `Quiz` |
//! | `Quiz` | `answer_quiz` | `Result` |
//! | `Result` | `proceed_to_next_turn` | `SelectAction` or `BattleEnd` |
//!
//! Any other call returns a [`BattleError`] and leaves the battle untouched.
//! Rewards are not applied here; see [`rewards`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::corpus::Corpus;
use crate::error::BattleError;
use crate::progression::types::{PlayerState, WordCard};
use crate::quiz::exam::ExamQuestion;
use crate::quiz::{self, QuizQuestion};

pub mod battle_log;
pub mod content;
pub mod endpoints;
pub mod rewards;
pub mod types;

use battle_log::{Actor, BattleLog, LogAction};
use content::Enemy;
use types::{
    AnswerResult, AnsweredQuiz, BattleOutcome, BattlePhase, BattleState, CardAction, Selection,
    TurnOutcome,
};

/// EXP multiplier granted by a correct item-quiz answer.
pub const ITEM_EXP_MULTIPLIER: f64 = 10.0;
pub const BURST_MULTIPLIER: u32 = 2;

impl BattleState {
    /// Shuffle `deck` and deal the opening hand. With an exam question the
    /// battle opens in `ItemQuiz`, otherwise in `SelectAction`.
    pub fn start<R: Rng + ?Sized>(
        stage_id: u32,
        enemy: &Enemy,
        mut deck: Vec<WordCard>,
        player: &PlayerState,
        exam_question: Option<ExamQuestion>,
        rng: &mut R,
    ) -> BattleState {
        deck.shuffle(rng);
        let hand_len = (player.hand_size as usize).min(deck.len());
        let remaining_deck = deck.split_off(hand_len);
        let phase = if exam_question.is_some() {
            BattlePhase::ItemQuiz
        } else {
            BattlePhase::SelectAction
        };
        log::info!(
            "battle started on stage {} against {} ({} hp)",
            stage_id,
            enemy.id,
            enemy.hp
        );
        BattleState {
            stage_id,
            enemy: enemy.clone(),
            player_hp: player.hp,
            player_max_hp: player.max_hp,
            player_level: player.level,
            hand_size: player.hand_size,
            enemy_hp: enemy.hp,
            phase,
            current_hand: deck,
            remaining_deck,
            used_cards: Vec::new(),
            selection: None,
            quiz: None,
            exam_question,
            log: BattleLog::default(),
            earned_cards: Vec::new(),
            earned_exp: 0,
            earned_gold: 0,
            exp_multiplier: 1.0,
            outcome: None,
            rewards: None,
        }
    }

    fn expect_phase(&self, phase: BattlePhase) -> Result<(), BattleError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(BattleError::WrongPhase(self.phase))
        }
    }

    fn hand_position(&self, card_id: &str) -> Result<usize, BattleError> {
        self.current_hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| BattleError::CardNotInHand(card_id.to_string()))
    }

    pub fn is_over(&self) -> bool {
        self.phase == BattlePhase::BattleEnd
    }

    /// Action declared with the pending single-card selection, if any.
    pub fn declared_action(&self) -> Option<CardAction> {
        self.selection.as_ref().and_then(Selection::declared_action)
    }

    /// Resolve the pre-battle exam question. Returns whether it was answered correctly.
    pub fn answer_item_quiz(&mut self, answer: &str) -> Result<bool, BattleError> {
        self.expect_phase(BattlePhase::ItemQuiz)?;
        let question = self.exam_question.take().ok_or(BattleError::NoQuiz)?;
        let correct = question.is_correct(answer);
        if correct {
            self.exp_multiplier = ITEM_EXP_MULTIPLIER;
            self.log.append(
                Actor::Player,
                LogAction::Item,
                "Power surge! Victory EXP x10",
                None,
                None,
            );
        } else {
            self.exp_multiplier = 1.0;
            self.log.append(
                Actor::Player,
                LogAction::Item,
                "The power surge fizzled",
                None,
                None,
            );
        }
        self.phase = BattlePhase::SelectAction;
        Ok(correct)
    }

    /// Commit one hand card and pose a question on its term.
    pub fn select_card<R: Rng + ?Sized>(
        &mut self,
        card_id: &str,
        action: CardAction,
        corpus: &Corpus,
        rng: &mut R,
    ) -> Result<&QuizQuestion, BattleError> {
        self.expect_phase(BattlePhase::SelectAction)?;
        let pos = self.hand_position(card_id)?;
        let term_id = &self.current_hand[pos].term_id;
        let term = corpus
            .term(term_id)
            .ok_or_else(|| BattleError::UnknownTerm(term_id.clone()))?;
        let question = quiz::generate(term, corpus, rng);

        let card = self.current_hand.remove(pos);
        self.used_cards.push(card.id.clone());
        self.selection = Some(Selection::Single {
            card,
            declared_action: action,
        });
        self.phase = BattlePhase::Quiz;
        Ok(self.quiz.insert(question))
    }

    /// Commit two different hand cards for a burst question.
    pub fn select_burst_cards<R: Rng + ?Sized>(
        &mut self,
        first_id: &str,
        second_id: &str,
        corpus: &Corpus,
        rng: &mut R,
    ) -> Result<&QuizQuestion, BattleError> {
        self.expect_phase(BattlePhase::SelectAction)?;
        if first_id == second_id {
            return Err(BattleError::DuplicateBurstCard);
        }
        let first_pos = self.hand_position(first_id)?;
        let second_pos = self.hand_position(second_id)?;
        let lookup = |pos: usize| {
            let term_id = &self.current_hand[pos].term_id;
            corpus
                .term(term_id)
                .ok_or_else(|| BattleError::UnknownTerm(term_id.clone()))
        };
        let question = quiz::generate_burst(lookup(first_pos)?, lookup(second_pos)?, corpus, rng);

        // remove the later index first so the earlier one stays valid
        let (first, second) = if first_pos > second_pos {
            let first = self.current_hand.remove(first_pos);
            (first, self.current_hand.remove(second_pos))
        } else {
            let second = self.current_hand.remove(second_pos);
            (self.current_hand.remove(first_pos), second)
        };
        self.used_cards.push(first.id.clone());
        self.used_cards.push(second.id.clone());
        self.selection = Some(Selection::Burst { first, second });
        self.phase = BattlePhase::Quiz;
        Ok(self.quiz.insert(question))
    }

    /// Grade `answer` and apply `action`. The action given here wins over the
    /// one declared at selection time.
    pub fn answer_quiz(
        &mut self,
        answer: &str,
        action: CardAction,
    ) -> Result<AnsweredQuiz, BattleError> {
        self.expect_phase(BattlePhase::Quiz)?;
        if self.quiz.is_none() || self.selection.is_none() {
            return Err(BattleError::NoQuiz);
        }
        let quiz = self.quiz.take().ok_or(BattleError::NoQuiz)?;
        let selection = self.selection.take().ok_or(BattleError::NoQuiz)?;

        let correct = quiz.is_correct(answer);
        let cards = selection.cards();
        let burst = selection.is_burst();
        let attack: u32 = cards.iter().map(|c| c.attack_power).sum();
        let heal: u32 = cards.iter().map(|c| c.heal_power).sum();
        let multiplier = if burst { BURST_MULTIPLIER } else { 1 };
        let name = &cards[0].term;

        let mut result = AnswerResult {
            correct,
            ..AnswerResult::default()
        };
        match (correct, action) {
            (true, CardAction::Attack) => {
                result.damage = attack * multiplier;
                self.enemy_hp = self.enemy_hp.saturating_sub(result.damage);
                let message = if burst {
                    format!("Burst attack! {} damage", result.damage)
                } else {
                    format!("{} strikes for {} damage", name, result.damage)
                };
                self.log.append(
                    Actor::Player,
                    LogAction::Attack,
                    message,
                    Some(result.damage),
                    None,
                );
            }
            (true, CardAction::Heal) => {
                result.heal = heal * multiplier;
                self.player_hp = (self.player_hp + result.heal).min(self.player_max_hp);
                self.log.append(
                    Actor::Player,
                    LogAction::Heal,
                    format!("{} restores {} HP", name, result.heal),
                    None,
                    Some(result.heal),
                );
            }
            (false, _) => {
                // floor(0.5 * attack), doubled for bursts
                let recoil = attack * multiplier / 2;
                self.player_hp = self.player_hp.saturating_sub(recoil);
                let message = if burst {
                    format!("Burst failed! {} recoil damage", recoil)
                } else {
                    format!("Wrong answer! {} recoil damage", recoil)
                };
                self.log
                    .append(Actor::Player, LogAction::Fail, message, Some(recoil), None);
            }
        }
        self.phase = BattlePhase::Result;

        Ok(AnsweredQuiz {
            result,
            card_ids: cards.iter().map(|c| c.id.clone()).collect(),
            term_ids: cards.iter().map(|c| c.term_id.clone()).collect(),
        })
    }

    /// Check for a knockout, otherwise refill the hand and let the enemy act.
    pub fn proceed_to_next_turn(&mut self) -> Result<TurnOutcome, BattleError> {
        self.expect_phase(BattlePhase::Result)?;
        if self.enemy_hp == 0 {
            return Ok(self.finish(BattleOutcome::Victory));
        }
        if self.player_hp == 0 {
            return Ok(self.finish(BattleOutcome::Defeat));
        }
        self.refill_hand();
        self.enemy_turn();
        if self.player_hp == 0 {
            return Ok(self.finish(BattleOutcome::Defeat));
        }
        self.phase = BattlePhase::SelectAction;
        Ok(TurnOutcome::Continue)
    }

    /// Draw from the front of the remaining deck until the hand is full.
    fn refill_hand(&mut self) {
        let missing = (self.hand_size as usize).saturating_sub(self.current_hand.len());
        let drawn = missing.min(self.remaining_deck.len());
        if drawn == 0 {
            return;
        }
        self.current_hand.extend(self.remaining_deck.drain(..drawn));
        self.log.append(
            Actor::Player,
            LogAction::Draw,
            format!("Drew {} card(s)", drawn),
            None,
            None,
        );
    }

    /// Enemy damage is `max(1, attack - floor(level / 2))`.
    pub fn enemy_damage(&self) -> u32 {
        self.enemy
            .attack
            .saturating_sub(self.player_level / 2)
            .max(1)
    }

    fn enemy_turn(&mut self) {
        let damage = self.enemy_damage();
        self.player_hp = self.player_hp.saturating_sub(damage);
        let message = format!("{} attacks for {} damage", self.enemy.name, damage);
        self.log
            .append(Actor::Enemy, LogAction::Attack, message, Some(damage), None);
    }

    fn finish(&mut self, outcome: BattleOutcome) -> TurnOutcome {
        self.phase = BattlePhase::BattleEnd;
        self.outcome = Some(outcome);
        self.selection = None;
        self.quiz = None;
        log::info!("battle against {} ended: {:?}", self.enemy.id, outcome);
        TurnOutcome::Ended(outcome)
    }
}
