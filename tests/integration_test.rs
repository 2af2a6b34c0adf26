use autoguessr::api::{router, USER_KEY_HEADER};
use autoguessr::catalog::{CatalogFixture, StaticCatalog};
use autoguessr::state::AppState;
use autoguessr::types::{Make, Vehicle, YearRange};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn vehicle(id: &str, make_id: &str, model: &str, year: i32, attrs: &[(&str, &str)]) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        make_id: make_id.to_string(),
        model: model.to_string(),
        year,
        attributes: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// One-car catalog: every seed selects the 2000 Ford Focus
fn focus_catalog() -> StaticCatalog {
    StaticCatalog::new(CatalogFixture {
        years: Some(YearRange { min: 2000, max: 2000 }),
        makes: vec![Make {
            id: "ford".to_string(),
            display_name: "Ford".to_string(),
        }],
        vehicles: vec![vehicle(
            "123",
            "ford",
            "Focus",
            2000,
            &[
                ("make_country", "USA"),
                ("model_engine_l", "2.0"),
                ("model_engine_cyl", "4"),
                ("model_engine_type", "in-line"),
                ("model_engine_power_hp", "110"),
                ("model_weight_lbs", "2564"),
                ("model_body", "Hatchback"),
                ("model_drive", "Front"),
                ("model_transmission_type", "Manual"),
                ("model_seats", "5"),
            ],
        )],
    })
}

/// Several makes and models for search and ranking
fn showroom_catalog() -> StaticCatalog {
    StaticCatalog::new(CatalogFixture {
        years: Some(YearRange { min: 1995, max: 1995 }),
        makes: vec![
            Make {
                id: "ford".to_string(),
                display_name: "Ford".to_string(),
            },
            Make {
                id: "ferrari".to_string(),
                display_name: "Ferrari".to_string(),
            },
            Make {
                id: "honda".to_string(),
                display_name: "Honda".to_string(),
            },
        ],
        vehicles: vec![
            vehicle("1", "ford", "Mustang", 1995, &[("model_engine_power_hp", "215")]),
            vehicle("2", "ford", "Mustang", 1995, &[("model_engine_power_hp", "240")]),
            vehicle("3", "ford", "Fiesta", 1995, &[("model_engine_power_hp", "60")]),
            vehicle("4", "ferrari", "F355", 1995, &[("model_engine_power_hp", "375")]),
            vehicle("5", "honda", "Civic", 1995, &[("model_engine_power_hp", "102")]),
        ],
    })
}

fn app(catalog: StaticCatalog) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_catalog(Arc::new(catalog)));
    (router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_KEY_HEADER, user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_as(uri: &str, user: &str) -> Request<Body> {
    Request::get(uri)
        .header(USER_KEY_HEADER, user)
        .body(Body::empty())
        .unwrap()
}

async fn new_game(app: &Router, difficulty: &str, user: Option<&str>) -> (String, Value) {
    let (status, game) = send(
        app,
        post(
            "/api/autoguessr/games",
            json!({ "difficulty": difficulty, "seed": 20240615 }),
            user,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (game["id"].as_str().unwrap().to_string(), game)
}

async fn guess(app: &Router, id: &str, make: &str, model: &str, year: Value) -> (StatusCode, Value) {
    send(
        app,
        post(
            &format!("/api/autoguessr/games/{}/guesses", id),
            json!({ "make": make, "model": model, "year": year }),
            None,
        ),
    )
    .await
}

#[tokio::test]
async fn test_random_car_for_seed() {
    let (app, _) = app(focus_catalog());
    let (status, body) = send(&app, get("/api/autoguessr/random-car?seed=20240615")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "model_id": "123",
            "make": "ford",
            "model": "Focus",
            "year": 2000,
            "seed": 20240615,
        })
    );
}

#[tokio::test]
async fn test_random_car_rejects_bad_seed() {
    let (app, _) = app(focus_catalog());
    for seed in ["-1", "tomorrow"] {
        let (status, body) =
            send(&app, get(&format!("/api/autoguessr/random-car?seed={}", seed))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    // No seed falls back to today's date
    let (status, body) = send(&app, get("/api/autoguessr/random-car")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["seed"].as_i64().unwrap() > 20_000_000);
}

#[tokio::test]
async fn test_empty_catalog_level_is_not_found() {
    let empty = StaticCatalog::new(CatalogFixture {
        years: Some(YearRange { min: 2000, max: 2000 }),
        makes: vec![],
        vehicles: vec![],
    });
    let (app1, _) = app(empty);
    let (status, body) = send(&app1, get("/api/autoguessr/random-car?seed=1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "makes");

    // No vehicles at all means there are no years either
    let (app, _) = app(StaticCatalog::from_vehicles(vec![]));
    let (status, body) = send(&app, get("/api/autoguessr/random-car?seed=1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "years");
}

#[tokio::test]
async fn test_car_lookup() {
    let (app, _) = app(focus_catalog());
    let (status, body) = send(&app, get("/api/autoguessr/car/123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "Focus");
    assert_eq!(body["attributes"]["model_body"], "Hatchback");

    let (status, _) = send(&app, get("/api/autoguessr/car/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_game_end_to_end_win() {
    let (app, state) = app(focus_catalog());
    let (id, game) = new_game(&app, "easy", Some("sam")).await;

    assert_eq!(game["status"], "playing");
    assert_eq!(game["seed"], 20240615);
    assert_eq!(game["total_specs"], 11);
    assert_eq!(game["max_guesses"], 6);
    assert_eq!(game["reveals_remaining"], 6);
    assert!(game.get("answer").is_none());

    let labels: Vec<&str> = game["visible_specs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec!["Drive Type", "Country", "Horsepower", "Body Style", "Decade"]
    );
    assert_eq!(game["visible_specs"][2]["value"], "110 hp");

    let (status, body) = guess(&app, &id, "Chevy", "Cavalier", json!(1998)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["record"]["feedback"],
        json!({ "make": "wrong", "model": "wrong", "year": "close" })
    );
    assert_eq!(body["record"]["direction"], "higher");
    assert_eq!(body["game"]["visible_specs"].as_array().unwrap().len(), 6);
    assert_eq!(body["game"]["visible_specs"][5]["label"], "Engine Type");

    let (status, body) = guess(&app, &id, "FORD", "Focus", json!("2000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["record"]["feedback"],
        json!({ "make": "correct", "model": "correct", "year": "correct" })
    );
    assert!(body["record"].get("direction").is_none());
    assert_eq!(body["game"]["status"], "won");
    assert_eq!(body["game"]["reveals_remaining"], 0);
    assert_eq!(body["game"]["answer"]["model_id"], "123");

    // The game is over; more guesses conflict
    let (status, _) = guess(&app, &id, "Ford", "Focus", json!(2000)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, get(&format!("/api/autoguessr/games/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["guesses"].as_array().unwrap().len(), 2);

    // Streak recorded once, through the store and the stats endpoint
    let streaks = state.streaks.get_streaks(&"sam".to_string()).await.unwrap();
    assert_eq!(streaks.autoguessr.current, 1);
    let (status, stats) = send(&app, get_as("/api/stats", "sam")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "autoguessr_current_streak": 1,
            "autoguessr_max_streak": 1,
            "autorank_current_streak": 0,
            "autorank_max_streak": 0,
        })
    );
}

#[tokio::test]
async fn test_game_lost_after_six_guesses() {
    let (app, state) = app(focus_catalog());
    state
        .streaks
        .record_result(&"lee".to_string(), autoguessr::types::GameKind::Autoguessr, true)
        .await
        .unwrap();
    let (id, _) = new_game(&app, "hard", Some("lee")).await;

    for round in 1..=6 {
        let (status, body) = guess(&app, &id, "Ford", "Fiesta", json!(1980)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["feedback"]["year"], "wrong");
        // Hard never reveals more than three specs
        assert_eq!(body["game"]["visible_specs"].as_array().unwrap().len(), 3);
        let expected = if round == 6 { "lost" } else { "playing" };
        assert_eq!(body["game"]["status"], expected);
    }

    let (status, _) = guess(&app, &id, "Ford", "Focus", json!(2000)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = send(&app, get_as("/api/stats", "lee")).await;
    assert_eq!(stats["autoguessr_current_streak"], 0);
    assert_eq!(stats["autoguessr_max_streak"], 1);
}

#[tokio::test]
async fn test_invalid_guess_is_rejected_without_recording() {
    let (app, _) = app(focus_catalog());
    let (id, _) = new_game(&app, "medium", None).await;

    for (make, model, year) in [
        ("", "Focus", json!(2000)),
        ("Ford", "   ", json!(2000)),
        ("Ford", "Focus", json!("two thousand")),
        ("Ford", "Focus", json!(-2000)),
    ] {
        let (status, body) = guess(&app, &id, make, model, year).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", make, model);
        assert!(body["error"].as_str().unwrap().contains("Invalid guess"));
    }

    // Missing, null and fractional fields get the same typed rejection
    let uri = format!("/api/autoguessr/games/{}/guesses", id);
    for body in [
        json!({ "make": "Ford", "model": "Focus" }),
        json!({ "make": "Ford", "year": 2000 }),
        json!({ "make": "Ford", "model": "Focus", "year": null }),
        json!({ "make": "Ford", "model": "Focus", "year": 2000.5 }),
    ] {
        let (status, reply) = send(&app, post(&uri, body.clone(), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(reply["error"].as_str().unwrap().contains("Invalid guess"));
    }

    let (_, game) = send(&app, get(&format!("/api/autoguessr/games/{}", id))).await;
    assert!(game["guesses"].as_array().unwrap().is_empty());
    assert_eq!(game["visible_specs"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_forfeit() {
    let (app, _) = app(focus_catalog());
    let (id, _) = new_game(&app, "medium", Some("kim")).await;

    let uri = format!("/api/autoguessr/games/{}/forfeit", id);
    let (status, body) = send(&app, post(&uri, json!({}), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "lost");
    assert_eq!(body["answer"]["model"], "Focus");

    let (status, _) = send(&app, post(&uri, json!({}), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_game() {
    let (app, _) = app(focus_catalog());
    let (status, _) = send(&app, get("/api/autoguessr/games/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = guess(&app, "nope", "Ford", "Focus", json!(2000)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_require_user_key() {
    let (app, _) = app(focus_catalog());
    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(
        &app,
        post("/api/stats/update", json!({ "game": "autorank", "won": true }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post(
            "/api/stats/update",
            json!({ "game": "autorank", "won": true }),
            Some("ada"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, stats) = send(&app, get_as("/api/stats", "ada")).await;
    assert_eq!(stats["autorank_current_streak"], 1);
    assert_eq!(stats["autorank_max_streak"], 1);
}

#[tokio::test]
async fn test_search() {
    let (app, _) = app(showroom_catalog());

    let (status, body) = send(&app, get("/api/autoguessr/search?type=make&query=f")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["results"],
        json!([
            { "value": "Ford", "label": "Ford" },
            { "value": "Ferrari", "label": "Ferrari" },
        ])
    );

    // Models de-duplicated, restricted to the named make
    let (_, body) = send(
        &app,
        get("/api/autoguessr/search?type=model&query=TAN&make=ford"),
    )
    .await;
    assert_eq!(body["results"], json!([{ "value": "Mustang", "label": "Mustang" }]));

    let (_, body) = send(&app, get("/api/autoguessr/search?type=model&query=f")).await;
    let values: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["Fiesta", "F355"]);

    for uri in [
        "/api/autoguessr/search?type=make",
        "/api/autoguessr/search?query=f",
        "/api/autoguessr/search?type=trim&query=f",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "results": [] }));
    }
}

#[tokio::test]
async fn test_autorank_pool_and_check() {
    let (app, state) = app(showroom_catalog());

    let (status, pool) = send(&app, get("/api/autorank/pool?stat=horsepower&count=3&seed=77")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pool["seed"], 77);
    assert_eq!(pool["year"], 1995);
    let vehicles = pool["vehicles"].as_array().unwrap();
    assert_eq!(vehicles.len(), 3);
    // The 60 hp Fiesta is under the horsepower minimum
    assert!(vehicles.iter().all(|v| v["id"] != "3"));

    let (_, again) = send(&app, get("/api/autorank/pool?stat=horsepower&count=3&seed=77")).await;
    assert_eq!(pool, again);

    let mut ids: Vec<(String, f64)> = vehicles
        .iter()
        .map(|v| {
            let hp = v["attributes"]["model_engine_power_hp"]
                .as_str()
                .unwrap()
                .parse()
                .unwrap();
            (v["id"].as_str().unwrap().to_string(), hp)
        })
        .collect();
    ids.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    let order: Vec<String> = ids.into_iter().map(|(id, _)| id).collect();

    let (status, body) = send(
        &app,
        post(
            "/api/autorank/check",
            json!({ "seed": 77, "stat": "horsepower", "count": 3, "order": order }),
            Some("max"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["correct"], true);
    assert_eq!(body["correct_order"], json!(order));

    let streaks = state.streaks.get_streaks(&"max".to_string()).await.unwrap();
    assert_eq!(streaks.autorank.current, 1);

    let reversed: Vec<String> = order.iter().rev().cloned().collect();
    let (_, body) = send(
        &app,
        post(
            "/api/autorank/check",
            json!({ "seed": 77, "count": 3, "order": reversed }),
            Some("max"),
        ),
    )
    .await;
    assert_eq!(body["correct"], false);
    let streaks = state.streaks.get_streaks(&"max".to_string()).await.unwrap();
    assert_eq!(streaks.autorank.current, 0);
    assert_eq!(streaks.autorank.max, 1);
}

#[tokio::test]
async fn test_autorank_pool_without_seed() {
    let (app, _) = app(showroom_catalog());
    let (status, pool) = send(&app, get("/api/autorank/pool")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(pool["seed"].as_i64().unwrap() >= 0);
    // Default stat and size; only four trims clear the minimum
    assert_eq!(pool["stat"], "horsepower");
    assert_eq!(pool["vehicles"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, get("/api/autorank/pool?stat=weight")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["level"], "trims");
}
