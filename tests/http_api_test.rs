// Integration tests for the HTTP surface
//
// Uses Rocket's blocking local client against the same Rocket instance the
// server binary launches.

use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

use spacey_snake::bot::Bot;
use spacey_snake::config::Config;
use spacey_snake::handler;

fn client() -> Client {
    let bot = Bot::new(Config::default_hardcoded());
    Client::tracked(handler::build(bot)).expect("valid rocket instance")
}

fn game_state(turn: i32) -> Value {
    let me = json!({
        "id": "me",
        "name": "Spacey",
        "health": 90,
        "body": [{"x": 1, "y": 1}, {"x": 1, "y": 0}]
    });
    json!({
        "game": {"id": "http-game"},
        "turn": turn,
        "board": {
            "height": 3,
            "width": 3,
            "food": [{"x": 0, "y": 0}],
            "snakes": [me.clone()]
        },
        "you": me
    })
}

#[test]
fn test_index_reports_appearance() {
    let client = client();
    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Server"),
        Some("battlesnake/spacey-snake")
    );

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["color"], "#cc0000");
    assert_eq!(body["head"], "evil");
}

#[test]
fn test_ping() {
    let client = client();
    let response = client.get("/ping").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().as_deref(), Some("One ping only please."));
}

#[test]
fn test_start_move_end_round() {
    let client = client();

    let response = client
        .post("/start")
        .header(ContentType::JSON)
        .body(game_state(0).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let start: Value = response.into_json().expect("json body");
    assert_eq!(start["color"], "#0000cc");
    assert_eq!(start["headType"], "evil");
    assert_eq!(start["tailType"], "skinny");

    let response = client
        .post("/move")
        .header(ContentType::JSON)
        .body(game_state(5).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().expect("json body");
    assert_eq!(body, json!({"move": "left"}));

    let response = client
        .post("/end")
        .header(ContentType::JSON)
        .body(game_state(6).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn test_move_rejects_non_json() {
    let client = client();
    let response = client.post("/move").body("hello").dispatch();
    assert_ne!(response.status(), Status::Ok);
}
