use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::types::{DailyMission, FusionCandidate, PlayerState, WordCard};
use super::SharedStore;
use crate::battle::content::Stage;

/// A stage together with the player's standing on it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct StageStatus {
    pub stage: Stage,
    pub unlocked: bool,
    pub boss_defeated: bool,
}

#[openapi]
#[get("/player")]
pub async fn get_player(store: &State<SharedStore>) -> Json<PlayerState> {
    let store = store.lock().await;
    Json(store.player().clone())
}

/// Deck cards in deck order.
#[openapi]
#[get("/player/deck")]
pub async fn get_deck(store: &State<SharedStore>) -> Json<Vec<WordCard>> {
    let store = store.lock().await;
    Json(store.deck_cards())
}

#[openapi]
#[get("/stages")]
pub async fn list_stages(store: &State<SharedStore>) -> Json<Vec<StageStatus>> {
    let store = store.lock().await;
    let stages = store
        .stages()
        .iter()
        .map(|stage| StageStatus {
            stage: stage.clone(),
            unlocked: store.state().is_unlocked(stage.id),
            boss_defeated: stage
                .boss
                .as_ref()
                .map_or(false, |b| store.is_boss_defeated(&b.id)),
        })
        .collect();
    Json(stages)
}

/// Today's missions. Rolls a new set on the first call of a day.
#[openapi]
#[get("/missions")]
pub async fn list_missions(store: &State<SharedStore>) -> Json<Vec<DailyMission>> {
    let mut store = store.lock().await;
    Json(store.daily_missions())
}

#[openapi]
#[get("/cards/fusion-candidates")]
pub async fn list_fusion_candidates(store: &State<SharedStore>) -> Json<Vec<FusionCandidate>> {
    let store = store.lock().await;
    Json(store.fusion_candidates())
}
