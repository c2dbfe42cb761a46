//! Integration tests for the `ArenaClient` facade: the full
//! bootstrap → create → fight flow and the credential recovery policy.

use std::sync::Arc;

use arena::prelude::*;
use arena_transport::{
    Method, MockReply, MockTransport, PLAYER_ID_KEY, PLAYER_SECRET_KEY, TransportError,
};
use serde_json::{Value, json};

// =========================================================================
// Helpers
// =========================================================================

type TestClient = ArenaClient<MockTransport, MemoryCredentialStore>;

fn client() -> (TestClient, MockTransport, Arc<MemoryCredentialStore>) {
    let mock = MockTransport::new();
    let store = Arc::new(MemoryCredentialStore::new());
    let client = ArenaClientBuilder::new().build_with(mock.clone(), Arc::clone(&store));
    (client, mock, store)
}

fn player_json(id: &str, secret: &str) -> Value {
    json!({"ID": id, "UserName": "Player7654321", "UserNameSuffix": 1, "Secret": secret})
}

fn hero_json(id: &str, owner: &str, elo: u32) -> Value {
    json!({
        "ID": id, "PlayerID": owner, "Title": "Musashi",
        "Description": "A wandering swordsman", "Country": "JP", "Elo": elo
    })
}

fn fight_result_json(elo_gain: i32) -> Value {
    json!({
        "fight": {
            "ID": "f1",
            "AttackerID": "h1",
            "Attacker": hero_json("h1", "p1", 1000),
            "DefenderID": "h9",
            "Defender": hero_json("h9", "p9", 1020),
            "Timestamp": "2025-06-01T12:30:00Z",
            "Outcome": 2,
            "Transcript": "Musashi slipped on the first exchange."
        },
        "victory": false,
        "elo_gain": elo_gain
    })
}

// =========================================================================
// Flow
// =========================================================================

#[tokio::test]
async fn test_first_run_create_and_fight() {
    let (client, mock, store) = client();
    mock.on(Method::Post, "/player", MockReply::json(201, &player_json("p1", "s1")));
    mock.on(Method::Get, "/player/p1/heroes", MockReply::json(200, &json!([])));
    mock.on(
        Method::Get,
        "/player/p1/heroes",
        MockReply::json(200, &json!([hero_json("h1", "p1", 1000)])),
    );
    mock.on(Method::Post, "/hero", MockReply::json(201, &hero_json("h1", "p1", 1000)));
    mock.on(Method::Post, "/hero/h1/fight", MockReply::json(200, &fight_result_json(-12)));

    client.bootstrap().await.unwrap();
    assert!(client.snapshot().await.roster.is_empty());

    let hero = client.create_hero("Musashi", "A wandering swordsman").await.unwrap();
    client.select_hero(hero.clone()).await;
    let report = client.start_fight(&hero.id).await.unwrap();

    assert_eq!(report.rating_after, Some(988));
    assert_eq!(report.fight.outcome, FightOutcome::Defeat);
    let state = client.snapshot().await;
    assert_eq!(state.status, LifecycleStatus::Ready);
    assert_eq!(state.roster.len(), 1);
    assert_eq!(state.roster[0].rating, 988);
    assert_eq!(state.selected_hero.map(|h| h.rating), Some(1000));
    assert_eq!(store.get(PLAYER_ID_KEY).as_deref(), Some("p1"));
    assert!(!client.is_fighting(&hero.id));
}

#[tokio::test]
async fn test_second_run_reuses_stored_identity() {
    let mock = MockTransport::new();
    let store = Arc::new(MemoryCredentialStore::with_entries([
        (PLAYER_ID_KEY, "p1"),
        (PLAYER_SECRET_KEY, "s1"),
    ]));
    let client = ArenaClientBuilder::new().build_with(mock.clone(), store);
    mock.on(Method::Get, "/player/p1", MockReply::json(200, &player_json("p1", "")));
    mock.on(
        Method::Get,
        "/player/p1/heroes",
        MockReply::json(200, &json!([hero_json("h1", "p1", 1000)])),
    );

    client.bootstrap().await.unwrap();

    assert_eq!(mock.count(Method::Post, "/player"), 0);
    assert_eq!(client.snapshot().await.roster.len(), 1);
}

// =========================================================================
// Credential recovery
// =========================================================================

#[tokio::test]
async fn test_rejected_fight_provisions_new_identity_and_returns_error() {
    let (client, mock, store) = client();
    mock.on(Method::Post, "/player", MockReply::json(201, &player_json("p1", "s1")));
    mock.on(Method::Post, "/player", MockReply::json(201, &player_json("p2", "s2")));
    mock.on(
        Method::Get,
        "/player/p1/heroes",
        MockReply::json(200, &json!([hero_json("h1", "p1", 1000)])),
    );
    mock.on(Method::Get, "/player/p2/heroes", MockReply::json(200, &json!([])));
    mock.on(Method::Post, "/hero/h1/fight", MockReply::text(401, "Unauthorized"));
    client.bootstrap().await.unwrap();

    let err = client.start_fight(&HeroId::new("h1")).await.unwrap_err();

    assert!(matches!(err, ArenaError::Fight(FightError::Api(_))));
    assert!(err.is_credential_rejected());
    let state = client.snapshot().await;
    assert_eq!(state.player.map(|p| p.id), Some(PlayerId::new("p2")));
    assert!(state.roster.is_empty());
    assert_eq!(store.get(PLAYER_SECRET_KEY).as_deref(), Some("s2"));
    assert_eq!(mock.count(Method::Post, "/player"), 2);
}

#[tokio::test]
async fn test_other_failures_keep_identity() {
    let (client, mock, _store) = client();
    mock.on(Method::Post, "/player", MockReply::json(201, &player_json("p1", "s1")));
    mock.on(
        Method::Get,
        "/player/p1/heroes",
        MockReply::json(200, &json!([hero_json("h1", "p1", 1000)])),
    );
    mock.on(Method::Post, "/hero/h1/fight", MockReply::text(500, "No opponent found"));
    mock.on(Method::Post, "/hero", MockReply::text(400, "Title is required"));
    client.bootstrap().await.unwrap();

    assert!(client.start_fight(&HeroId::new("h1")).await.is_err());
    assert!(client.create_hero("Musashi", "A wandering swordsman").await.is_err());

    assert_eq!(mock.count(Method::Post, "/player"), 1);
    assert_eq!(
        client.snapshot().await.player.map(|p| p.id),
        Some(PlayerId::new("p1"))
    );
}

#[tokio::test]
async fn test_local_validation_error_makes_no_requests() {
    let (client, mock, _store) = client();

    let err = client.create_hero("   ", "A wandering swordsman").await.unwrap_err();

    assert!(matches!(err, ArenaError::Session(SessionError::InvalidHero("title"))));
    assert_eq!(mock.total(), 0);
}

// =========================================================================
// Builder
// =========================================================================

#[tokio::test]
async fn test_build_rejects_non_http_base_url() {
    let result = ArenaClient::builder().base_url("ftp://arena.example.com").build();

    assert!(matches!(
        result,
        Err(ArenaError::Transport(TransportError::InvalidUrl(_)))
    ));
}

#[tokio::test]
async fn test_builder_page_limit_reaches_history_requests() {
    let mock = MockTransport::new();
    let client = ArenaClientBuilder::new()
        .page_limit(5)
        .build_with(mock.clone(), Arc::new(MemoryCredentialStore::new()));
    mock.on(
        Method::Get,
        "/hero/h1/fights",
        MockReply::json(200, &json!({"fights": [], "has_more": false})),
    );

    let page = client.fights(&HeroId::new("h1"), None, None).await.unwrap();

    assert!(page.fights.is_empty());
    assert_eq!(mock.requests()[0].path, "/hero/h1/fights?limit=5");
}
