//! Tests for the store actor.

use super::*;
use crate::catalog::BuiltinCatalog;
use crate::domain::{Hat, Lens, OnboardingAnswers, Persona, ProcessStatus};
use crate::kv::MemoryKvStore;

const LEGACY_USER: &str = r#"{
    "id": "user_1_legacy1",
    "name": "Ana",
    "lenses": ["health"],
    "agent": {"id": "agent_1_legacy1", "name": "Nobody", "persona": "friendly", "hats": ["health", "wizard", "health"]},
    "processes": [{
        "id": "process_1_legacy1",
        "title": "Run 5k",
        "lens": "health",
        "createdAt": "2024-01-01T00:00:00Z",
        "summary": null,
        "messages": null,
        "fields": null,
        "timeline": null
    }]
}"#;

fn create_actor_args(
    kv: Arc<MemoryKvStore>,
) -> (
    StoreActorArgs,
    watch::Receiver<Option<User>>,
    broadcast::Receiver<StoreNotification>,
) {
    let catalog = Arc::new(BuiltinCatalog::new());
    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (event_tx, event_rx) = broadcast::channel(16);
    let args = StoreActorArgs {
        kv,
        protocols: catalog.clone(),
        providers: catalog,
        services: EngineServices::default(),
        agent_name: "Nobody".to_string(),
        snapshot_tx,
        event_tx,
        logger: None,
    };
    (args, snapshot_rx, event_rx)
}

fn answers() -> OnboardingAnswers {
    OnboardingAnswers {
        name: "Ana".to_string(),
        persona: Some(Persona::Friendly),
        lenses: vec![Lens::Health],
        desire: "Run 5k".to_string(),
    }
}

async fn send(
    actor: &ActorRef<StoreMessage>,
    command: StoreCommand,
) -> Result<MutationOutcome, EngineError> {
    let (tx, rx) = oneshot::channel();
    actor
        .send_message(StoreMessage::Command(Box::new(command), tx))
        .expect("send failed");
    rx.await.expect("receive failed")
}

#[tokio::test]
async fn test_load_user_normalizes_legacy_shape() {
    let kv = MemoryKvStore::with_entries([(USER_KEY, LEGACY_USER)]);

    let user = load_user(&kv).await.expect("user loads");
    assert_eq!(user.agent.hats, vec![Hat::Base, Hat::Health]);
    let process = &user.processes[0];
    assert_eq!(process.status, ProcessStatus::Active);
    assert!(process.messages.is_empty());
    assert!(process.timeline.is_empty());
    assert_eq!(process.summary, "");
}

#[tokio::test]
async fn test_load_user_treats_garbage_as_absent() {
    let kv = MemoryKvStore::with_entries([(USER_KEY, "{not json")]);
    assert!(load_user(&kv).await.is_none());
    assert!(load_user(&MemoryKvStore::new()).await.is_none());
}

#[tokio::test]
async fn test_pre_start_publishes_loaded_user() {
    let kv = Arc::new(MemoryKvStore::with_entries([(USER_KEY, LEGACY_USER)]));
    let (args, snapshot_rx, _event_rx) = create_actor_args(kv.clone());

    let (actor_ref, _handle) = StoreActor::spawn(None, StoreActor, args)
        .await
        .expect("actor spawn failed");

    let snapshot = snapshot_rx.borrow().clone().expect("snapshot");
    assert_eq!(snapshot.id, "user_1_legacy1");

    let (tx, rx) = oneshot::channel();
    actor_ref
        .send_message(StoreMessage::GetUser(tx))
        .expect("send failed");
    assert_eq!(rx.await.expect("receive failed"), Some(snapshot));
    assert_eq!(kv.write_count(), 0);
}

#[tokio::test]
async fn test_command_persists_then_publishes() {
    let kv = Arc::new(MemoryKvStore::new());
    let (args, mut snapshot_rx, mut event_rx) = create_actor_args(kv.clone());

    let (actor_ref, _handle) = StoreActor::spawn(None, StoreActor, args)
        .await
        .expect("actor spawn failed");

    let outcome = send(&actor_ref, StoreCommand::CreateUser { answers: answers() })
        .await
        .expect("create user");
    let user = match outcome {
        MutationOutcome::UserCreated(user) => user,
        other => panic!("expected user created, got {:?}", other),
    };

    snapshot_rx.changed().await.expect("snapshot changed");
    assert_eq!(snapshot_rx.borrow().as_ref(), Some(user.as_ref()));

    let stored = kv.peek(USER_KEY).expect("persisted");
    let reloaded: User = serde_json::from_str(&stored).expect("valid json");
    assert_eq!(&reloaded, user.as_ref());

    assert_eq!(
        event_rx.recv().await.expect("notification"),
        StoreNotification::UserCreated {
            user_id: user.id.clone()
        }
    );
}

#[tokio::test]
async fn test_failed_write_keeps_state_and_snapshot() {
    let kv = Arc::new(MemoryKvStore::new());
    let (args, snapshot_rx, mut event_rx) = create_actor_args(kv.clone());

    let (actor_ref, _handle) = StoreActor::spawn(None, StoreActor, args)
        .await
        .expect("actor spawn failed");
    send(&actor_ref, StoreCommand::CreateUser { answers: answers() })
        .await
        .expect("create user");
    let _ = event_rx.recv().await;
    let before = snapshot_rx.borrow().clone().expect("user");

    kv.set_fail_writes(true);
    let result = send(
        &actor_ref,
        StoreCommand::SetStatus {
            process_id: before.processes[0].id.clone(),
            status: ProcessStatus::Done,
        },
    )
    .await;
    assert!(matches!(
        result,
        Err(EngineError::PersistenceUnavailable { .. })
    ));
    assert_eq!(snapshot_rx.borrow().as_ref(), Some(&before));
    assert!(event_rx.try_recv().is_err());

    let result = send(&actor_ref, StoreCommand::Clear).await;
    assert!(result.is_err());
    assert!(snapshot_rx.borrow().is_some());

    kv.set_fail_writes(false);
    let (tx, rx) = oneshot::channel();
    actor_ref
        .send_message(StoreMessage::GetUser(tx))
        .expect("send failed");
    let current = rx.await.expect("receive failed").expect("user kept");
    assert_eq!(current.processes[0].status, ProcessStatus::Active);
}
