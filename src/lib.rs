//! # Vocab Quest
//!
//! A vocabulary-learning battle RPG for CFA exam terms, served as a web API.
//!
//! ## Overview
//!
//! Players memorize finance vocabulary by answering multiple-choice questions
//! during turn-based battles. Every answer feeds an SM-2 review scheduler and
//! the battle outcome feeds a small progression economy: EXP and levels, gold,
//! collectible word cards with rarities, upgrades and fusion, one consumable
//! item, daily missions and stage bosses.
//!
//! ## Architecture
//!
//! All state lives in a single [`progression::GameStore`]. The Rocket layer
//! holds it in an `Arc<Mutex<GameStore>>` so concurrent requests serialize,
//! reads come from `GET` routes and every command goes through `POST /action`.
//! OpenAPI documentation is served at `/openapi.json` with Swagger UI at `/swagger`.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod action;
pub mod battle;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod error;
pub mod player_seed;
pub mod progression;
pub mod quiz;
pub mod review;
pub mod status_messages;

use crate::config::AppConfig;
use crate::corpus::Corpus;
use crate::progression::GameStore;

/// Initializes the Rocket web server from environment configuration.
///
/// A corpus that fails to load is logged and replaced by an empty one so the
/// server still starts.
///
/// # Example
///
/// ```no_run
/// use vocab_quest::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     rocket_initialize().launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    let config = AppConfig::from_env();
    let store = GameStore::from_config(&config).unwrap_or_else(|e| {
        log::error!("failed to load corpus: {}", e);
        let mut store = GameStore::new(
            progression::persistence::open_store(&config),
            Corpus::from_parts(Vec::new(), Vec::new(), Vec::new()),
            Box::new(clock::LocalClock),
            player_seed::boxed_rng(config.seed),
        );
        store.load_state();
        store
    });
    rocket_with_store(store)
}

/// Builds the Rocket instance around an already constructed store.
pub fn rocket_with_store(store: GameStore) -> rocket::Rocket<rocket::Build> {
    use crate::action::okapi_add_operation_for_play_;
    use crate::action::play;
    use crate::battle::endpoints::okapi_add_operation_for_get_battle_;
    use crate::battle::endpoints::okapi_add_operation_for_list_battle_log_;
    use crate::battle::endpoints::{get_battle, list_battle_log};
    use crate::corpus::endpoints::okapi_add_operation_for_corpus_anki_;
    use crate::corpus::endpoints::okapi_add_operation_for_corpus_qa_;
    use crate::corpus::endpoints::okapi_add_operation_for_get_term_;
    use crate::corpus::endpoints::okapi_add_operation_for_list_terms_;
    use crate::corpus::endpoints::okapi_add_operation_for_list_topics_;
    use crate::corpus::endpoints::{corpus_anki, corpus_qa, get_term, list_terms, list_topics};
    use crate::progression::endpoints::okapi_add_operation_for_get_deck_;
    use crate::progression::endpoints::okapi_add_operation_for_get_player_;
    use crate::progression::endpoints::okapi_add_operation_for_list_fusion_candidates_;
    use crate::progression::endpoints::okapi_add_operation_for_list_missions_;
    use crate::progression::endpoints::okapi_add_operation_for_list_stages_;
    use crate::progression::endpoints::{
        get_deck, get_player, list_fusion_candidates, list_missions, list_stages,
    };
    use crate::review::endpoints::okapi_add_operation_for_get_statistics_;
    use crate::review::endpoints::okapi_add_operation_for_list_bookmarks_;
    use crate::review::endpoints::okapi_add_operation_for_list_due_terms_;
    use crate::review::endpoints::{get_statistics, list_bookmarks, list_due_terms};

    let shared: progression::SharedStore =
        std::sync::Arc::new(rocket::futures::lock::Mutex::new(store));

    rocket::build()
        .mount(
            "/",
            openapi_get_routes![
                play,
                get_player,
                get_deck,
                list_stages,
                list_missions,
                list_fusion_candidates,
                get_battle,
                list_battle_log,
                list_terms,
                get_term,
                list_topics,
                corpus_qa,
                corpus_anki,
                list_due_terms,
                get_statistics,
                list_bookmarks
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(shared)
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
