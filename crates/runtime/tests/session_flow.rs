use std::time::Duration;

use game_core::{ErrorKind, Patch, Phase, SessionCode};
use runtime::{
    ClientConfig, DocumentStore, MemoryConnection, MemoryStore, SessionClient, StoreConfig,
};
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(30);

fn store() -> MemoryStore {
    MemoryStore::new(StoreConfig {
        liveness_timeout: Duration::from_millis(500),
        sweep_interval: Duration::from_millis(100),
    })
}

fn client(store: &MemoryStore, seed: u64) -> SessionClient<MemoryConnection> {
    let config = ClientConfig {
        heartbeat_interval: Duration::from_millis(100),
        rng_seed: Some(seed),
        ..ClientConfig::default()
    };
    let connection = store.connect().expect("store should accept connections");
    SessionClient::new(connection, config).expect("client should build")
}

/// Create → join → host drops out → new host drives the game to the end.
#[tokio::test(start_paused = true)]
async fn host_handover_and_full_game() {
    let store = store();
    let _supervisor = store.start_supervisor();

    // ================================================================
    // Lobby
    // ================================================================
    let ann_client = client(&store, 1);
    let ann = ann_client
        .create_session_with_code(SessionCode::parse("K7QZ").unwrap(), "Ann")
        .await
        .expect("create should succeed");
    assert_eq!(ann.code().as_str(), "K7QZ");

    let bo = client(&store, 2)
        .join_session("k7qz", "Bo")
        .await
        .expect("join should succeed");

    let session = bo.snapshot().await.unwrap();
    assert_eq!(session.players.len(), 2);
    assert!(session.is_host(ann.player_id()));
    assert!(!session.is_host(bo.player_id()));

    // ================================================================
    // Ann's connection dies; the store drops her and Bo takes over
    // ================================================================
    ann_client.store().sever();

    let bo_id = bo.player_id().clone();
    let session = timeout(WAIT, bo.wait_until(|s| s.is_host(&bo_id)))
        .await
        .expect("host should be reassigned")
        .unwrap();
    assert_eq!(session.players.len(), 1);
    assert_eq!(session.hosts().count(), 1);

    // ================================================================
    // Bo runs the game
    // ================================================================
    bo.start_submitting().await.unwrap();
    assert_eq!(bo.snapshot().await.unwrap().phase, Phase::Submitting);

    bo.add_slip("I juggle").await.unwrap();
    assert_eq!(bo.my_slips().await.unwrap(), vec!["I juggle".to_string()]);

    bo.start_playing().await.unwrap();
    let session = bo.snapshot().await.unwrap();
    assert_eq!(session.phase, Phase::Playing);
    assert_eq!(session.draw_pile, vec!["I juggle".to_string()]);
    assert!(!session.revealed);

    bo.reveal_current().await.unwrap();
    assert_eq!(bo.snapshot().await.unwrap().revealed_slip(), Some("I juggle"));

    bo.advance_slip().await.unwrap();
    let session = bo.snapshot().await.unwrap();
    assert!(session.draw_pile.is_empty());
    assert_eq!(session.discard_pile, vec!["I juggle".to_string()]);
    assert_eq!(session.phase, Phase::Ended);
}

#[tokio::test(start_paused = true)]
async fn operations_are_gated_by_role_and_phase() {
    let store = store();
    let ann = client(&store, 1).create_session("Ann").await.unwrap();
    let bo = client(&store, 2)
        .join_session(ann.code().as_str(), "Bo")
        .await
        .unwrap();

    let err = bo.start_submitting().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = ann.reveal_current().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPhase);

    let err = bo.add_slip("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    bo.add_slip("I have three cats").await.unwrap();

    ann.start_submitting().await.unwrap();
    ann.start_playing().await.unwrap();

    let err = bo.add_slip("too late").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPhase);

    let err = ann.retreat_slip().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Nothing was written by the rejected calls.
    let session = ann.snapshot().await.unwrap();
    assert_eq!(session.draw_pile, vec!["I have three cats".to_string()]);
    assert!(session.discard_pile.is_empty());
}

#[tokio::test(start_paused = true)]
async fn usurp_moves_host_without_touching_others() {
    let store = store();
    let ann = client(&store, 1).create_session("Ann").await.unwrap();
    let code = ann.code().as_str().to_string();
    let bo = client(&store, 2).join_session(&code, "Bo").await.unwrap();
    let cy = client(&store, 3).join_session(&code, "Cy").await.unwrap();

    bo.usurp_host().await.unwrap();

    let session = cy.snapshot().await.unwrap();
    assert!(!session.is_host(ann.player_id()));
    assert!(session.is_host(bo.player_id()));
    assert!(!session.is_host(cy.player_id()));
    assert!(bo.is_host().await.unwrap());

    // Usurping again changes nothing, and the old host lost its powers.
    bo.usurp_host().await.unwrap();
    assert_eq!(cy.snapshot().await.unwrap(), session);
    let err = ann.start_submitting().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test(start_paused = true)]
async fn joining_unknown_session_is_not_found() {
    let store = store();
    let err = client(&store, 1)
        .join_session("NOPE", "Ann")
        .await
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = client(&store, 1)
        .join_session("not a code!", "Ann")
        .await
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test(start_paused = true)]
async fn leaving_removes_player_and_hands_over_host() {
    let store = store();
    let ann_client = client(&store, 1);
    let ann = ann_client.create_session("Ann").await.unwrap();
    let code = ann.code().clone();
    let bo = client(&store, 2)
        .join_session(code.as_str(), "Bo")
        .await
        .unwrap();

    ann.leave().await.expect("leave should succeed");
    assert_eq!(ann_client.profiles().load(&code).unwrap(), None);

    let bo_id = bo.player_id().clone();
    let session = timeout(WAIT, bo.wait_until(|s| s.is_host(&bo_id)))
        .await
        .expect("host should be reassigned")
        .unwrap();
    assert_eq!(session.players.len(), 1);

    // Ann's connection stays live but must not remove anything else later.
    assert!(ann_client.store().is_live());
    ann_client.store().disconnect();
    assert_eq!(bo.snapshot().await.unwrap().players.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn waiting_skips_undecodable_snapshots() {
    let store = store();
    let ann = client(&store, 1).create_session("Ann").await.unwrap();
    let raw = store.connect().unwrap();

    let writer = async {
        raw.patch(ann.path(), &Patch::new().set("phase", "bogus"))
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;
        raw.patch(ann.path(), &Patch::new().set("phase", "submitting"))
            .await
            .unwrap();
    };
    let (waited, ()) = tokio::join!(
        timeout(WAIT, ann.wait_until(|s| s.phase == Phase::Submitting)),
        writer
    );

    let session = waited.expect("wait should outlast the bad snapshot").unwrap();
    assert_eq!(session.phase, Phase::Submitting);
}
