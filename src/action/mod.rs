use either::{Either, Left, Right};
use rocket::response::status::{BadRequest, NotFound};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use crate::battle::content::stage_by_id;
use crate::battle::rewards::VictoryRewards;
use crate::battle::types::{AnswerResult, BattleOutcome, BattlePhase, CardAction};
use crate::progression::types::{ClaimResult, FusionResult, ItemType, UpgradeResult};
use crate::progression::{GameStore, SharedStore};
use crate::quiz::QuizQuestion;
use crate::status_messages::{new_status, Status};

/// Player actions
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema, Hash)]
#[serde(crate = "rocket::serde", tag = "action_type")]
pub enum PlayerActions {
    GrantStarterCards,
    StartBattle {
        stage_id: u32,
    },
    StartBossBattle {
        stage_id: u32,
    },
    AnswerItemQuiz {
        answer: String,
    },
    SelectCard {
        card_id: String,
        action: CardAction,
    },
    SelectBurstCards {
        first_card_id: String,
        second_card_id: String,
    },
    AnswerQuiz {
        answer: String,
        /// Falls back to the action declared with `SelectCard`, then to attack.
        action: Option<CardAction>,
    },
    ProceedToNextTurn,
    ResetBattle,
    BuyItem {
        item_type: ItemType,
    },
    UseItem {
        item_type: ItemType,
    },
    UpgradeCard {
        card_id: String,
    },
    FuseCards {
        card_ids: Vec<String>,
    },
    ClaimMissionReward {
        mission_id: String,
    },
    AddToDeck {
        card_id: String,
    },
    RemoveFromDeck {
        card_id: String,
    },
    RecordStudy {
        term_id: String,
        correct: bool,
    },
    ToggleBookmark {
        term_id: String,
    },
    ToggleDifficult {
        term_id: String,
    },
    ResetGame,
    SetSeed {
        seed: u64,
    },
}

/// What an accepted action produced.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "result_type")]
pub enum ActionResponse {
    Done {
        message: String,
    },
    Quiz {
        quiz: QuizQuestion,
    },
    ItemQuiz {
        correct: bool,
    },
    Answer {
        result: AnswerResult,
    },
    Turn {
        phase: BattlePhase,
        outcome: Option<BattleOutcome>,
        rewards: Option<VictoryRewards>,
    },
    Upgrade(UpgradeResult),
    Fusion(FusionResult),
    Claim(ClaimResult),
    Flag {
        term_id: String,
        value: bool,
    },
}

type ActionError = Either<NotFound<Json<Status>>, BadRequest<Json<Status>>>;

fn not_found(message: impl Into<String>) -> ActionError {
    Left(NotFound(new_status(message)))
}

fn bad_request(message: impl Into<String>) -> ActionError {
    Right(BadRequest(new_status(message)))
}

fn done(message: impl Into<String>) -> Result<ActionResponse, ActionError> {
    Ok(ActionResponse::Done {
        message: message.into(),
    })
}

/// Rejects a battle command when there is no battle or it is in another phase.
fn require_phase(store: &GameStore, phase: BattlePhase) -> Result<(), ActionError> {
    match store.battle() {
        None => Err(not_found("No battle in progress")),
        Some(b) if b.phase != phase => Err(bad_request(format!(
            "Action not allowed in phase {:?}",
            b.phase
        ))),
        Some(_) => Ok(()),
    }
}

fn apply(store: &mut GameStore, action: PlayerActions) -> Result<ActionResponse, ActionError> {
    match action {
        PlayerActions::GrantStarterCards => {
            if store.grant_starter_cards() {
                done(format!("Granted {} starter cards", store.player().cards.len()))
            } else if store.corpus().is_empty() {
                Err(bad_request("No terms to mint starter cards from"))
            } else {
                Err(bad_request("Player already owns cards"))
            }
        }
        PlayerActions::StartBattle { stage_id } => {
            if stage_by_id(stage_id).is_none() {
                return Err(not_found(format!("Stage {} not found", stage_id)));
            }
            if store.start_battle(stage_id) {
                done(format!("Battle started on stage {}", stage_id))
            } else {
                Err(bad_request(format!("Cannot start a battle on stage {}", stage_id)))
            }
        }
        PlayerActions::StartBossBattle { stage_id } => {
            if store.stage_boss(stage_id).is_none() {
                return Err(not_found(format!("Stage {} has no boss", stage_id)));
            }
            if store.start_boss_battle(stage_id) {
                done(format!("Boss battle started on stage {}", stage_id))
            } else {
                Err(bad_request(format!("Cannot start the boss battle on stage {}", stage_id)))
            }
        }
        PlayerActions::AnswerItemQuiz { answer } => {
            require_phase(store, BattlePhase::ItemQuiz)?;
            let correct = store.answer_item_quiz(&answer);
            Ok(ActionResponse::ItemQuiz { correct })
        }
        PlayerActions::SelectCard { card_id, action } => {
            require_phase(store, BattlePhase::SelectAction)?;
            match store.select_card(&card_id, action) {
                Some(quiz) => Ok(ActionResponse::Quiz { quiz }),
                None => Err(bad_request(format!(
                    "Card {} cannot be played from the current hand",
                    card_id
                ))),
            }
        }
        PlayerActions::SelectBurstCards {
            first_card_id,
            second_card_id,
        } => {
            require_phase(store, BattlePhase::SelectAction)?;
            match store.select_burst_cards(&first_card_id, &second_card_id) {
                Some(quiz) => Ok(ActionResponse::Quiz { quiz }),
                None => Err(bad_request(format!(
                    "Cards {} and {} cannot be played as a burst",
                    first_card_id,
                    second_card_id
                ))),
            }
        }
        PlayerActions::AnswerQuiz { answer, action } => {
            require_phase(store, BattlePhase::Quiz)?;
            let action = action
                .or_else(|| store.battle().and_then(|b| b.declared_action()))
                .unwrap_or(CardAction::Attack);
            let result = store.answer_quiz(&answer, action);
            Ok(ActionResponse::Answer { result })
        }
        PlayerActions::ProceedToNextTurn => {
            require_phase(store, BattlePhase::Result)?;
            if !store.proceed_to_next_turn() {
                return Err(bad_request("Cannot advance the battle"));
            }
            match store.battle() {
                Some(b) => Ok(ActionResponse::Turn {
                    phase: b.phase,
                    outcome: b.outcome,
                    rewards: b.rewards.clone(),
                }),
                None => Err(not_found("No battle in progress")),
            }
        }
        PlayerActions::ResetBattle => {
            store.reset_battle();
            done("Battle discarded")
        }
        PlayerActions::BuyItem { item_type } => {
            if store.buy_item(item_type) {
                done(format!(
                    "Bought {:?}, now holding {}",
                    item_type,
                    store.item_count(item_type)
                ))
            } else {
                Err(bad_request(format!("Not enough gold (need {}G)", item_type.price())))
            }
        }
        PlayerActions::UseItem { item_type } => {
            if store.use_item(item_type) {
                done(format!("{:?} is active for the next battle", item_type))
            } else {
                Err(bad_request(format!("Cannot use {:?} now", item_type)))
            }
        }
        PlayerActions::UpgradeCard { card_id } => {
            if store.player().card(&card_id).is_none() {
                return Err(not_found(format!("Card {} not found", card_id)));
            }
            let result = store.upgrade_card(&card_id);
            if result.success {
                Ok(ActionResponse::Upgrade(result))
            } else {
                Err(bad_request(result.message))
            }
        }
        PlayerActions::FuseCards { card_ids } => {
            let result = store.fuse_cards(&card_ids);
            if result.success {
                Ok(ActionResponse::Fusion(result))
            } else {
                Err(bad_request(
                    "Fusion needs two or more distinct owned cards of the same term",
                ))
            }
        }
        PlayerActions::ClaimMissionReward { mission_id } => {
            let result = store.claim_mission_reward(&mission_id);
            if result.success {
                Ok(ActionResponse::Claim(result))
            } else {
                Err(bad_request(format!("Mission {} has no reward to claim", mission_id)))
            }
        }
        PlayerActions::AddToDeck { card_id } => {
            if store.player().card(&card_id).is_none() {
                return Err(not_found(format!("Card {} not found", card_id)));
            }
            if store.add_to_deck(&card_id) {
                done(format!("Card {} added to deck", card_id))
            } else {
                Err(bad_request(format!(
                    "Card {} is already in the deck or the deck is full",
                    card_id
                )))
            }
        }
        PlayerActions::RemoveFromDeck { card_id } => {
            if store.remove_from_deck(&card_id) {
                done(format!("Card {} removed from deck", card_id))
            } else {
                Err(not_found(format!("Card {} is not in the deck", card_id)))
            }
        }
        PlayerActions::RecordStudy { term_id, correct } => {
            if store.record_study(&term_id, correct) {
                done(format!("Recorded study of {}", term_id))
            } else {
                Err(not_found(format!("Term {} not found", term_id)))
            }
        }
        PlayerActions::ToggleBookmark { term_id } => match store.toggle_bookmark(&term_id) {
            Some(value) => Ok(ActionResponse::Flag { term_id, value }),
            None => Err(not_found(format!("Term {} not found", term_id))),
        },
        PlayerActions::ToggleDifficult { term_id } => match store.toggle_difficult(&term_id) {
            Some(value) => Ok(ActionResponse::Flag { term_id, value }),
            None => Err(not_found(format!("Term {} not found", term_id))),
        },
        PlayerActions::ResetGame => {
            store.reset_game();
            done("Game reset")
        }
        PlayerActions::SetSeed { seed } => {
            store.reseed(seed);
            done(format!("Seed set to {}", seed))
        }
    }
}

#[openapi]
#[post("/action", format = "json", data = "<player_action>")]
pub async fn play(
    store: &State<SharedStore>,
    player_action: Json<PlayerActions>,
) -> Result<(rocket::http::Status, Json<ActionResponse>), ActionError> {
    let action = player_action.0;
    log::debug!("action: {:?}", action);
    let mut store = store.lock().await;
    let response = apply(&mut *store, action)?;
    Ok((rocket::http::Status::Created, Json(response)))
}
