use chrono::NaiveDate;
use rand::rngs::mock::StepRng;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};
use vocab_quest::clock::FixedClock;
use vocab_quest::corpus::Corpus;
use vocab_quest::progression::persistence::MemoryStore;
use vocab_quest::progression::GameStore;
use vocab_quest::rocket_with_store;

fn client() -> Client {
    let store = GameStore::new(
        Box::new(MemoryStore::new()),
        Corpus::embedded().expect("embedded corpus"),
        Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())),
        Box::new(StepRng::new(0, 0)),
    );
    Client::tracked(rocket_with_store(store)).expect("valid rocket instance")
}

fn act(client: &Client, body: Value) -> (Status, Value) {
    let response = client
        .post("/action")
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    let status = response.status();
    let body = response.into_string().expect("response body");
    (status, serde_json::from_str(&body).expect("valid json"))
}

fn get_json(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch();
    let status = response.status();
    let body = response.into_string().expect("response body");
    (status, serde_json::from_str(&body).expect("valid json"))
}

#[test]
fn fresh_player_defaults() {
    let client = client();
    let (status, player) = get_json(&client, "/player");
    assert_eq!(status, Status::Ok);
    assert_eq!(player["level"], 1);
    assert_eq!(player["hp"], 100);
    assert_eq!(player["deck_capacity"], 5);
    assert_eq!(player["hand_size"], 2);
}

#[test]
fn starter_cards_are_granted_once() {
    let client = client();
    let (status, body) = act(&client, json!({"action_type": "GrantStarterCards"}));
    assert_eq!(status, Status::Created);
    assert_eq!(body["result_type"], "Done");
    let (status, body) = act(&client, json!({"action_type": "GrantStarterCards"}));
    assert_eq!(status, Status::BadRequest);
    assert!(body["message"].as_str().unwrap().contains("already"));
    let (_, deck) = get_json(&client, "/player/deck");
    assert_eq!(deck.as_array().unwrap().len(), 5);
}

#[test]
fn start_battle_errors() {
    let client = client();
    act(&client, json!({"action_type": "GrantStarterCards"}));
    let (status, _) = act(
        &client,
        json!({"action_type": "StartBattle", "stage_id": 99}),
    );
    assert_eq!(status, Status::NotFound);
    let (status, _) = act(
        &client,
        json!({"action_type": "StartBattle", "stage_id": 2}),
    );
    assert_eq!(status, Status::BadRequest);
    let response = client.get("/battle").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn play_a_turn_over_http() {
    let client = client();
    act(&client, json!({"action_type": "GrantStarterCards"}));
    let (status, _) = act(
        &client,
        json!({"action_type": "StartBattle", "stage_id": 1}),
    );
    assert_eq!(status, Status::Created);

    let (_, battle) = get_json(&client, "/battle");
    assert_eq!(battle["phase"], "select_action");
    let card_id = battle["current_hand"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = act(
        &client,
        json!({"action_type": "AnswerQuiz", "answer": "x", "action": "attack"}),
    );
    assert_eq!(status, Status::BadRequest);

    let (status, body) = act(
        &client,
        json!({"action_type": "SelectCard", "card_id": card_id, "action": "attack"}),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(body["result_type"], "Quiz");
    assert_eq!(body["quiz"]["options"].as_array().unwrap().len(), 4);
    let answer = body["quiz"]["correct_answer"].clone();

    let (_, body) = act(
        &client,
        json!({"action_type": "AnswerQuiz", "answer": answer, "action": "attack"}),
    );
    assert_eq!(body["result"]["correct"], true);
    assert_eq!(body["result"]["damage"], 10);

    let (_, body) = act(&client, json!({"action_type": "ProceedToNextTurn"}));
    assert_eq!(body["result_type"], "Turn");
    assert_eq!(body["phase"], "select_action");

    let (status, log) = get_json(&client, "/battle/log?from_turn=1&limit=2");
    assert_eq!(status, Status::Ok);
    assert_eq!(log["entries"].as_array().unwrap().len(), 2);
    assert_eq!(log["next_turn"], 3);
    let (_, rest) = get_json(&client, "/battle/log?from_turn=3");
    assert_eq!(rest["entries"][0]["actor"], "enemy");
    assert!(rest["next_turn"].is_null());

    let (_, stats) = get_json(&client, "/review/stats");
    assert_eq!(stats["learned"], 1);

    let (status, _) = act(&client, json!({"action_type": "ResetBattle"}));
    assert_eq!(status, Status::Created);
    assert_eq!(client.get("/battle").dispatch().status(), Status::NotFound);
}

#[test]
fn answer_without_action_uses_the_selected_one() {
    let client = client();
    act(&client, json!({"action_type": "GrantStarterCards"}));
    act(
        &client,
        json!({"action_type": "StartBattle", "stage_id": 1}),
    );
    let (_, battle) = get_json(&client, "/battle");
    let card_id = battle["current_hand"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, body) = act(
        &client,
        json!({"action_type": "SelectCard", "card_id": card_id, "action": "heal"}),
    );
    let answer = body["quiz"]["correct_answer"].clone();
    let (status, body) = act(
        &client,
        json!({"action_type": "AnswerQuiz", "answer": answer}),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(body["result"]["correct"], true);
    assert_eq!(body["result"]["heal"], 5);
    assert_eq!(body["result"]["damage"], 0);
}

#[test]
fn shop_and_card_actions_report_failures() {
    let client = client();
    act(&client, json!({"action_type": "GrantStarterCards"}));
    let (status, body) = act(
        &client,
        json!({"action_type": "BuyItem", "item_type": "power_surge"}),
    );
    assert_eq!(status, Status::BadRequest);
    assert!(body["message"].as_str().unwrap().contains("500"));
    let (status, _) = act(
        &client,
        json!({"action_type": "UseItem", "item_type": "power_surge"}),
    );
    assert_eq!(status, Status::BadRequest);
    let (status, _) = act(
        &client,
        json!({"action_type": "UpgradeCard", "card_id": "card_1"}),
    );
    assert_eq!(status, Status::BadRequest);
    let (status, _) = act(
        &client,
        json!({"action_type": "UpgradeCard", "card_id": "nope"}),
    );
    assert_eq!(status, Status::NotFound);
    let (status, _) = act(
        &client,
        json!({"action_type": "FuseCards", "card_ids": ["card_1", "card_2"]}),
    );
    assert_eq!(status, Status::BadRequest);
    let (status, _) = act(
        &client,
        json!({"action_type": "ClaimMissionReward", "mission_id": "daily_x"}),
    );
    assert_eq!(status, Status::BadRequest);
    let (status, _) = act(
        &client,
        json!({"action_type": "RemoveFromDeck", "card_id": "card_1"}),
    );
    assert_eq!(status, Status::Created);
    let (status, _) = act(
        &client,
        json!({"action_type": "AddToDeck", "card_id": "card_1"}),
    );
    assert_eq!(status, Status::Created);
    let (status, _) = act(
        &client,
        json!({"action_type": "AddToDeck", "card_id": "card_1"}),
    );
    assert_eq!(status, Status::BadRequest);
}

#[test]
fn learning_actions_and_views() {
    let client = client();
    let (_, due) = get_json(&client, "/review/due");
    let total = due.as_array().unwrap().len();
    assert_eq!(total, 48);

    let (status, body) = act(
        &client,
        json!({"action_type": "ToggleBookmark", "term_id": "EQ001"}),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(body["value"], true);
    let (status, _) = act(
        &client,
        json!({"action_type": "ToggleBookmark", "term_id": "NOPE"}),
    );
    assert_eq!(status, Status::NotFound);
    let (_, bookmarks) = get_json(&client, "/review/bookmarks");
    assert_eq!(bookmarks, json!(["EQ001"]));

    act(
        &client,
        json!({"action_type": "RecordStudy", "term_id": "EQ002", "correct": true}),
    );
    let (_, due) = get_json(&client, "/review/due?limit=100");
    assert!(due
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["term_id"] != "EQ002"));

    let (_, detail) = get_json(&client, "/terms/EQ002");
    assert_eq!(detail["progress"]["repetitions"], 1);
    assert_eq!(
        client.get("/terms/NOPE").dispatch().status(),
        Status::NotFound
    );
}

#[test]
fn corpus_views() {
    let client = client();
    let (_, topics) = get_json(&client, "/topics");
    assert_eq!(topics.as_array().unwrap().len(), 10);
    let (_, eq) = get_json(&client, "/terms?topic=EQ");
    assert!(eq
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["topic_code"] == "EQ"));
    assert_eq!(
        client.get("/terms?topic=XX").dispatch().status(),
        Status::NotFound
    );
    let (_, qa) = get_json(&client, "/corpus/qa");
    assert_eq!(qa["passed"], true);
    let anki = client.get("/corpus/anki").dispatch().into_string().unwrap();
    assert_eq!(anki.lines().count(), 48);
}

#[test]
fn progression_views() {
    let client = client();
    let (_, stages) = get_json(&client, "/stages");
    let stages = stages.as_array().unwrap().clone();
    assert_eq!(stages.len(), 9);
    assert_eq!(stages[0]["unlocked"], true);
    assert_eq!(stages[1]["unlocked"], false);
    assert_eq!(stages[0]["stage"]["boss"]["is_boss"], true);

    let (_, missions) = get_json(&client, "/missions");
    assert_eq!(missions.as_array().unwrap().len(), 3);
    let (_, again) = get_json(&client, "/missions");
    assert_eq!(missions, again);

    let (_, candidates) = get_json(&client, "/cards/fusion-candidates");
    assert_eq!(candidates, json!([]));
}

#[test]
fn openapi_document_is_served() {
    let client = client();
    let response = client.get("/openapi.json").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let doc: Value = serde_json::from_str(&response.into_string().unwrap()).unwrap();
    assert!(doc["paths"]["/action"].is_object());
}

#[test]
fn set_seed_and_reset_game() {
    let client = client();
    let (status, _) = act(&client, json!({"action_type": "SetSeed", "seed": 42}));
    assert_eq!(status, Status::Created);
    act(&client, json!({"action_type": "GrantStarterCards"}));
    let (status, _) = act(&client, json!({"action_type": "ResetGame"}));
    assert_eq!(status, Status::Created);
    let (_, player) = get_json(&client, "/player");
    assert_eq!(player["cards"], json!([]));
}
