use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::LearningStatistics;
use crate::corpus::Term;
use crate::progression::SharedStore;

/// Terms due for review today, in corpus order.
#[openapi]
#[get("/review/due?<limit>")]
pub async fn list_due_terms(limit: Option<usize>, store: &State<SharedStore>) -> Json<Vec<Term>> {
    let store = store.lock().await;
    let mut due: Vec<Term> = store.due_terms().into_iter().cloned().collect();
    if let Some(max) = limit {
        due.truncate(max);
    }
    Json(due)
}

#[openapi]
#[get("/review/stats")]
pub async fn get_statistics(store: &State<SharedStore>) -> Json<LearningStatistics> {
    let store = store.lock().await;
    Json(store.statistics())
}

/// Bookmarked term ids, sorted.
#[openapi]
#[get("/review/bookmarks")]
pub async fn list_bookmarks(store: &State<SharedStore>) -> Json<Vec<String>> {
    let store = store.lock().await;
    Json(
        store
            .progress()
            .bookmarked()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}
