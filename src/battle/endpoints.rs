use rocket::response::status::NotFound;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::battle_log::BattleLogEntry;
use super::types::BattleState;
use crate::progression::SharedStore;
use crate::status_messages::{new_status, Status};

pub const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Serialize, Deserialize, JsonSchema, Debug)]
#[serde(crate = "rocket::serde")]
pub struct BattleLogResponse {
    pub entries: Vec<BattleLogEntry>,
    /// Turn to pass as `from_turn` for the next page, if any.
    pub next_turn: Option<u32>,
    pub limit: usize,
}

/// The current battle, including one that just ended.
#[openapi]
#[get("/battle")]
pub async fn get_battle(
    store: &State<SharedStore>,
) -> Result<Json<BattleState>, NotFound<Json<Status>>> {
    let store = store.lock().await;
    match store.battle() {
        Some(battle) => Ok(Json(battle.clone())),
        None => Err(NotFound(new_status("No battle in progress"))),
    }
}

/// Page through the battle log: `?from_turn=1&limit=20`.
#[openapi]
#[get("/battle/log?<from_turn>&<limit>")]
pub async fn list_battle_log(
    from_turn: Option<u32>,
    limit: Option<usize>,
    store: &State<SharedStore>,
) -> Result<Json<BattleLogResponse>, NotFound<Json<Status>>> {
    let store = store.lock().await;
    let Some(battle) = store.battle() else {
        return Err(NotFound(new_status("No battle in progress")));
    };
    let max = limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let entries = battle.log.page(from_turn.unwrap_or(1), max).to_vec();
    let next_turn = match entries.last() {
        Some(last) if (last.turn as usize) < battle.log.len() => Some(last.turn + 1),
        _ => None,
    };
    Ok(Json(BattleLogResponse {
        entries,
        next_turn,
        limit: max,
    }))
}
