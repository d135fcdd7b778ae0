use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use mapvote_client::{ApiClient, ApiError, ElectionApi, VoteFeedback, VoteSession};
use mapvote_common::{CaptchaProvider, VoteRequest};

async fn serve(router: Router) -> ApiClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    ApiClient::new(&format!("http://{}/", addr)).unwrap()
}

fn seat_json(no: u32) -> Value {
    json!({
        "constituency_no": no,
        "division": "Dhaka",
        "seat": format!("Dhaka-{}", no),
        "notes": null,
        "is_disabled": false,
        "candidates": [
            {"candidate_id": "c1", "name": "A", "party": "BNP", "alliance_key": "BNP"},
            {"candidate_id": "c2", "name": "B", "party": "NCP", "alliance_key": null}
        ],
        "totals": {"c1": 3, "c2": 1},
        "leader": null,
        "is_tied": false
    })
}

fn election_router() -> Router {
    Router::new()
        .route(
            "/api/constituencies",
            get(|| async {
                Json(json!([
                    {"constituency_no": 1, "division": "Dhaka", "seat": "Dhaka-1", "is_disabled": false},
                    {"constituency_no": 2, "division": "Dhaka", "seat": "Dhaka-2", "seat_bn": "ঢাকা-২", "is_disabled": true}
                ]))
            }),
        )
        .route(
            "/api/constituencies/:id",
            get(|Path(id): Path<u32>| async move {
                if id == 1 {
                    Json(seat_json(1)).into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response()
                }
            }),
        )
        .route(
            "/api/config",
            get(|| async {
                Json(json!({"captcha_provider": "turnstile", "captcha_site_key": "0xSITE"}))
            }),
        )
        .route(
            "/api/results/overall",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded\n") }),
        )
        .route(
            "/api/news",
            get(|| async { (StatusCode::BAD_GATEWAY, Json(json!({"message": "Feed down"}))) }),
        )
}

#[tokio::test]
async fn test_reads_directory_and_detail() {
    let client = serve(election_router()).await;

    let seats = client.constituencies().await.unwrap();
    assert_eq!(seats.len(), 2);
    assert_eq!(seats[1].seat_bn.as_deref(), Some("ঢাকা-২"));
    assert!(seats[1].is_disabled);

    let detail = client.constituency(1).await.unwrap();
    assert_eq!(detail.candidates.len(), 2);
    assert_eq!(detail.totals.votes_for("c1"), 3);

    let config = client.captcha_config().await.unwrap();
    assert_eq!(config.captcha_provider, CaptchaProvider::Turnstile);
    assert_eq!(config.site_key(), "0xSITE");
}

#[tokio::test]
async fn test_failure_bodies_are_normalized() {
    let client = serve(election_router()).await;

    let err = client.constituency(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), Some("Not found"));

    let err = client.news().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.message(), Some("Feed down"));

    let err = client.overall_results().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), Some("upstream exploded"));
}

#[tokio::test]
async fn test_vote_body_and_receipt() {
    let seen = Arc::new(parking_lot::Mutex::new(None::<Value>));
    let sink = seen.clone();
    let router = Router::new().route(
        "/api/vote",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock() = Some(body);
                Json(json!({
                    "ok": true,
                    "new_tallies": {"c1": 4, "c2": 1},
                    "leader": {"candidate_id": "c1", "name": "A", "party": "BNP", "alliance_key": "BNP", "votes": 4},
                    "is_tied": false
                }))
            }
        }),
    );
    let client = serve(router).await;

    let receipt = client
        .submit_vote(&VoteRequest {
            constituency_no: 1,
            candidate_id: "c1".to_string(),
            captcha_token: "dev".to_string(),
        })
        .await
        .unwrap();
    assert!(receipt.ok);
    assert_eq!(receipt.new_tallies.votes_for("c1"), 4);

    assert_eq!(
        seen.lock().clone(),
        Some(json!({"constituency_no": 1, "candidate_id": "c1", "captcha_token": "dev"}))
    );
}

#[tokio::test]
async fn test_conflict_maps_to_already_voted() {
    let router = election_router().route(
        "/api/vote",
        post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({"error": "You already voted from this device/browser."})),
            )
        }),
    );
    let client = Arc::new(serve(router).await);

    let err = client
        .submit_vote(&VoteRequest {
            constituency_no: 1,
            candidate_id: "c1".to_string(),
            captcha_token: String::new(),
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let session = VoteSession::new(client);
    session.select_seat(1).await;
    session.choose_candidate("c2").await.unwrap();
    assert_eq!(session.submit_vote().await, Ok(VoteFeedback::AlreadyVoted));
    assert_eq!(session.snapshot().await.tallies().votes_for("c2"), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.constituencies().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}
