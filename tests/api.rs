//! Integration tests for the JSON API, driven through the router with an
//! in-memory database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use choir_songbook::api::{build_router, AppState};
use choir_songbook::open_in_memory;

const TOKEN: &str = "let-me-in";

fn setup_app(admin_token: Option<&str>) -> Router {
    let conn = open_in_memory().expect("in-memory database");
    build_router(AppState::new(
        conn,
        admin_token.map(str::to_string),
        "director",
    ))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn authorized(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {TOKEN}").parse().unwrap(),
    );
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn create(app: &Router, title: &str, alternate_titles: &[&str]) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/songs",
            Some(json!({
                "title": title,
                "alternateTitles": alternate_titles,
                "lyrics": format!("{title} lyrics"),
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_app(None);
    let (status, body) = send(&app, request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "choir-songbook");
}

#[tokio::test]
async fn create_song_returns_201_with_array_alternate_titles() {
    let app = setup_app(None);
    let body = create(&app, "యూదా స్తుతి", &["yudha", "yudha stuti"]).await;

    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["alternateTitles"], json!(["yudha", "yudha stuti"]));
    assert_eq!(body["lyrics"], "యూదా స్తుతి lyrics");
}

#[tokio::test]
async fn create_song_without_lyrics_is_400() {
    let app = setup_app(None);
    let (status, body) = send(
        &app,
        request("POST", "/api/songs", Some(json!({ "title": "No words" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and lyrics are required");
}

#[tokio::test]
async fn list_songs_sorts_and_searches() {
    let app = setup_app(None);
    create(&app, "Zion", &[]).await;
    create(&app, "యూదా స్తుతి", &["yudha stuti"]).await;
    create(&app, "Amazing Grace", &[]).await;

    let (status, all) = send(&app, request("GET", "/api/songs", None)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|song| song["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Amazing Grace", "Zion", "యూదా స్తుతి"]);

    let (_, found) = send(&app, request("GET", "/api/songs?search=YUDHA", None)).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn song_lifecycle_get_update_delete() {
    let app = setup_app(None);
    let song = create(&app, "Old title", &["alias"]).await;
    let uri = format!("/api/songs/{}", song["id"]);

    let (status, updated) = send(
        &app,
        request("PUT", &uri, Some(json!({ "title": "New title" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "New title");
    assert_eq!(updated["alternateTitles"], json!(["alias"]));
    assert_eq!(updated["lyrics"], "Old title lyrics");

    let (status, fetched) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, body) = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song deleted successfully");

    let (status, _) = send(&app, request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Song not found");
}

#[tokio::test]
async fn weekly_songs_empty_then_created_then_partially_updated() {
    let app = setup_app(None);

    let (status, empty) = send(&app, request("GET", "/api/weekly-songs", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        empty,
        json!({ "starting": null, "music": null, "worship": null, "weekStart": null })
    );

    let a = create(&app, "A", &[]).await;
    let b = create(&app, "B", &[]).await;
    let c = create(&app, "C", &[]).await;
    let d = create(&app, "D", &[]).await;

    let (status, body) = send(
        &app,
        request("POST", "/api/weekly-songs", Some(json!({ "startingSong": a["id"] }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("All three songs"));

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/weekly-songs",
            Some(json!({ "startingSong": a["id"], "musicSong": b["id"], "worshipSong": 9999 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "One or more songs not found");

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/api/weekly-songs",
            Some(json!({ "startingSong": a["id"], "musicSong": b["id"], "worshipSong": c["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["starting"]["title"], "A");
    assert!(created["weekStart"].is_string());

    let (status, updated) = send(
        &app,
        request("POST", "/api/weekly-songs", Some(json!({ "musicSong": d["id"] }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["starting"]["title"], "A");
    assert_eq!(updated["music"]["title"], "D");
    assert_eq!(updated["worship"]["title"], "C");

    let (_, current) = send(&app, request("GET", "/api/weekly-songs", None)).await;
    assert_eq!(current, updated);
}

#[tokio::test]
async fn weekly_songs_requires_at_least_one_song() {
    let app = setup_app(None);
    let (status, body) = send(&app, request("POST", "/api/weekly-songs", Some(json!({})))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one song must be provided");
}

#[tokio::test]
async fn writes_need_the_admin_token_when_configured() {
    let app = setup_app(Some(TOKEN));
    let payload = json!({ "title": "Hymn", "lyrics": "words" });

    let (status, _) = send(&app, request("POST", "/api/songs", Some(payload.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut wrong = request("POST", "/api/songs", Some(payload.clone()));
    wrong
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, authorized(request("POST", "/api/songs", Some(payload)))).await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads stay public.
    let (status, songs) = send(&app, request("GET", "/api/songs", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(songs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_song_accepts_null_alternate_titles() {
    let app = setup_app(None);
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/songs",
            Some(json!({ "title": "A", "lyrics": "x", "alternateTitles": null })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["alternateTitles"], json!([]));
}

#[tokio::test]
async fn mistyped_bodies_are_400_with_json_error() {
    let app = setup_app(None);

    let (status, body) = send(
        &app,
        request("POST", "/api/weekly-songs", Some(json!({ "startingSong": "abc" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let (status, body) = send(
        &app,
        request("POST", "/api/songs", Some(json!({ "title": 5, "lyrics": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_is_400_with_json_error() {
    let app = setup_app(None);
    let malformed = Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn non_numeric_song_id_is_json_404() {
    let app = setup_app(None);

    let (status, body) = send(&app, request("GET", "/api/songs/abc", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Song not found");

    let (status, body) = send(
        &app,
        request("PUT", "/api/songs/abc", Some(json!({ "title": "New" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Song not found");
}
