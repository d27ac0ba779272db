use rocket::response::status::NotFound;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::{Example, QaReport, Relation, Term, Topic};
use crate::progression::SharedStore;
use crate::review::LearningProgress;
use crate::status_messages::{new_status, Status};

/// A term with its examples, relations and the player's study record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct TermDetail {
    pub term: Term,
    pub examples: Vec<Example>,
    pub relations: Vec<Relation>,
    pub progress: Option<LearningProgress>,
}

/// List terms, optionally only those of one topic (`?topic=EQ`).
#[openapi]
#[get("/terms?<topic>")]
pub async fn list_terms(
    topic: Option<String>,
    store: &State<SharedStore>,
) -> Result<Json<Vec<Term>>, NotFound<Json<Status>>> {
    let store = store.lock().await;
    let corpus = store.corpus();
    match topic {
        Some(code) => {
            if corpus.topic(&code).is_none() {
                return Err(NotFound(new_status(format!("Topic {} not found", code))));
            }
            Ok(Json(corpus.terms_in_topic(&code).cloned().collect()))
        }
        None => Ok(Json(corpus.terms().to_vec())),
    }
}

#[openapi]
#[get("/terms/<term_id>")]
pub async fn get_term(
    term_id: &str,
    store: &State<SharedStore>,
) -> Result<Json<TermDetail>, NotFound<Json<Status>>> {
    let store = store.lock().await;
    let corpus = store.corpus();
    match corpus.term(term_id) {
        Some(term) => Ok(Json(TermDetail {
            term: term.clone(),
            examples: corpus.examples_for(term_id).into_iter().cloned().collect(),
            relations: corpus.relations_for(term_id).into_iter().cloned().collect(),
            progress: store.progress().get(term_id).cloned(),
        })),
        None => Err(NotFound(new_status(format!("Term {} not found", term_id)))),
    }
}

/// Topic taxonomy with per-topic term counts.
#[openapi]
#[get("/topics")]
pub async fn list_topics(store: &State<SharedStore>) -> Json<Vec<Topic>> {
    let store = store.lock().await;
    Json(store.corpus().topics().to_vec())
}

#[openapi]
#[get("/corpus/qa")]
pub async fn corpus_qa(store: &State<SharedStore>) -> Json<QaReport> {
    let store = store.lock().await;
    Json(store.corpus().validate())
}

/// Anki import file: `front \t back \t topic` per line.
#[openapi]
#[get("/corpus/anki")]
pub async fn corpus_anki(store: &State<SharedStore>) -> String {
    let store = store.lock().await;
    store.corpus().export_anki_tsv()
}
