use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(engine)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Creates an author, a donor and a question; returns `(donor_id, question_id)`.
async fn seed(app: &Router) -> (i64, i64) {
    let (status, author) = post(app, "/person", json!({"name": "Alice"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, donor) = post(app, "/person", json!({"name": "Bob", "phone": "555-0101"})).await;
    let (status, question) = post(
        app,
        "/forum-question",
        json!({
            "author_id": author["id"],
            "title": "New roof for the library",
            "body": "The roof leaks every winter."
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        donor["id"].as_i64().unwrap(),
        question["question_id"].as_i64().unwrap(),
    )
}

async fn open_fundraiser(app: &Router, question_id: i64, goal: Value) -> i64 {
    let (status, body) = post(
        app,
        "/fundraiser",
        json!({"question_id": question_id, "goal_amount": goal}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["fundraiser_id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_answers() {
    let app = app().await;
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn donations_reach_goal() {
    let app = app().await;
    let (donor_id, question_id) = seed(&app).await;
    let fundraiser_id = open_fundraiser(&app, question_id, json!(100)).await;

    let (status, created) = post(
        &app,
        "/donation",
        json!({"fundraiser_id": fundraiser_id, "donor_id": donor_id, "amount": 40}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["amount"], "40.00");
    assert_eq!(created["fundraiser_id"], fundraiser_id);

    let (_, summary) = get(&app, &format!("/fundraiser/{fundraiser_id}/summary")).await;
    assert_eq!(summary["status"], "open");
    assert_eq!(summary["total_donated"], "40.00");

    let (status, _) = post(
        &app,
        "/donation",
        json!({"fundraiser_id": fundraiser_id, "amount": "61"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = get(&app, &format!("/fundraiser/{fundraiser_id}/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "reached");
    assert_eq!(summary["total_donated"], "101.00");
    assert_eq!(summary["goal_amount"], "100.00");
}

#[tokio::test]
async fn detail_lists_donations_newest_first() {
    let app = app().await;
    let (donor_id, question_id) = seed(&app).await;
    let fundraiser_id = open_fundraiser(&app, question_id, json!("50.00")).await;

    post(
        &app,
        "/donation",
        json!({"fundraiser_id": fundraiser_id, "donor_id": donor_id, "amount": 10}),
    )
    .await;
    post(
        &app,
        "/donation",
        json!({"fundraiser_id": fundraiser_id, "amount": "2,50"}),
    )
    .await;

    let (status, detail) = get(&app, &format!("/fundraiser/{fundraiser_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["total_donated"], "12.50");
    assert_eq!(detail["fundraiser"]["title"], "New roof for the library");
    assert_eq!(detail["fundraiser"]["author_name"], "Alice");

    let donations = detail["donations"].as_array().unwrap();
    assert_eq!(donations.len(), 2);
    assert_eq!(donations[0]["amount"], "2.50");
    assert_eq!(donations[0]["donor_name"], Value::Null);
    assert_eq!(donations[1]["amount"], "10.00");
    assert_eq!(donations[1]["donor_name"], "Bob");
}

#[tokio::test]
async fn empty_fundraiser_totals_zero() {
    let app = app().await;
    let (_, question_id) = seed(&app).await;
    let fundraiser_id = open_fundraiser(&app, question_id, json!(75)).await;

    let (status, detail) = get(&app, &format!("/fundraiser/{fundraiser_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["total_donated"], "0.00");
    assert_eq!(detail["donations"], json!([]));

    let (_, list) = get(&app, "/fundraiser").await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["total_donated"], "0.00");
    assert_eq!(list[0]["question_author"], "Alice");
    assert_eq!(list[0]["status"], "open");
}

#[tokio::test]
async fn unknown_fundraiser_is_404() {
    let app = app().await;
    seed(&app).await;

    let (status, body) = get(&app, "/fundraiser/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("fundraiser 999"));

    let (status, _) = get(&app, "/fundraiser/999/summary").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/donation",
        json!({"fundraiser_id": 999, "amount": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_amounts_are_400() {
    let app = app().await;
    let (_, question_id) = seed(&app).await;

    let (status, body) = post(
        &app,
        "/fundraiser",
        json!({"question_id": question_id, "goal_amount": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let fundraiser_id = open_fundraiser(&app, question_id, json!(10)).await;
    for amount in [json!(0), json!(-5), json!("abc"), json!("1.234")] {
        let (status, _) = post(
            &app,
            "/donation",
            json!({"fundraiser_id": fundraiser_id, "amount": amount}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount}");
    }

    let (_, detail) = get(&app, &format!("/fundraiser/{fundraiser_id}")).await;
    assert_eq!(detail["donations"], json!([]));
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = app().await;
    let (_, question_id) = seed(&app).await;

    // unknown field
    let (status, body) = post(
        &app,
        "/fundraiser",
        json!({"question_id": question_id, "goal_amount": 10, "status": "reached"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // missing field
    let (status, _) = post(&app, "/donation", json!({"fundraiser_id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/donation")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_fundraiser_on_question_is_409() {
    let app = app().await;
    let (_, question_id) = seed(&app).await;
    open_fundraiser(&app, question_id, json!(10)).await;

    let (status, _) = post(
        &app,
        "/fundraiser",
        json!({"question_id": question_id, "goal_amount": 20}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn fundraiser_on_unknown_question_is_404() {
    let app = app().await;
    let (status, _) = post(
        &app,
        "/fundraiser",
        json!({"question_id": 42, "goal_amount": 20}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn question_details_embed_fundraiser() {
    let app = app().await;
    let (donor_id, question_id) = seed(&app).await;

    let (status, details) = get(&app, &format!("/forum-question/{question_id}/details")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["title"], "New roof for the library");
    assert_eq!(details["fundraiser"], Value::Null);

    let fundraiser_id = open_fundraiser(&app, question_id, json!(20)).await;
    post(
        &app,
        "/donation",
        json!({"fundraiser_id": fundraiser_id, "donor_id": donor_id, "amount": 25}),
    )
    .await;

    let (_, details) = get(&app, &format!("/forum-question/{question_id}/details")).await;
    assert_eq!(details["author_name"], "Alice");
    assert_eq!(details["fundraiser"]["status"], "reached");
    assert_eq!(details["fundraiser"]["total_donated"], "25.00");
    assert_eq!(details["fundraiser"]["donations"][0]["donor_name"], "Bob");

    let (status, _) = get(&app, "/forum-question/999/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn people_and_topics() {
    let app = app().await;

    let (status, _) = post(&app, "/person", json!({"name": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, zoe) = post(&app, "/person", json!({"name": "Zoe"})).await;
    post(&app, "/person", json!({"name": "Ann"})).await;

    let (_, people) = get(&app, "/person").await;
    let names: Vec<_> = people
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Ann", "Zoe"]);

    let (status, person) = get(&app, &format!("/person/{}", zoe["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(person["name"], "Zoe");
    let (status, _) = get(&app, "/person/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, topic) = post(
        &app,
        "/forum-topic",
        json!({"topic_name": "Repairs", "description": "Fix things"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(&app, "/forum-topic", json!({"topic_name": "repairs"})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, question) = post(
        &app,
        "/forum-question",
        json!({"author_id": zoe["id"], "topic_id": topic["topic_id"], "title": "Broken gate"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(question["topic_name"], "Repairs");

    let (_, topics) = get(&app, "/forum-topic").await;
    assert_eq!(topics.as_array().unwrap().len(), 1);
    let (_, questions) = get(&app, "/forum-question").await;
    assert_eq!(questions[0]["title"], "Broken gate");
}

#[tokio::test]
async fn malformed_path_ids_are_400_with_error_body() {
    let app = app().await;

    for uri in [
        "/fundraiser/abc",
        "/fundraiser/abc/summary",
        "/person/abc",
        "/forum-question/abc/details",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn oversized_amounts_are_400() {
    let app = app().await;
    let (_, question_id) = seed(&app).await;

    let (status, body) = post(
        &app,
        "/fundraiser",
        json!({"question_id": question_id, "goal_amount": "1000000000.01"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let fundraiser_id = open_fundraiser(&app, question_id, json!(100)).await;
    for _ in 0..2 {
        let (status, body) = post(
            &app,
            "/donation",
            json!({"fundraiser_id": fundraiser_id, "amount": "90000000000000000.00"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at most"));
    }

    for _ in 0..2 {
        let (status, _) = post(
            &app,
            "/donation",
            json!({"fundraiser_id": fundraiser_id, "amount": "1000000000.00"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, summary) = get(&app, &format!("/fundraiser/{fundraiser_id}/summary")).await;
    assert_eq!(summary["total_donated"], "2000000000.00");
    assert_eq!(summary["status"], "reached");
}
