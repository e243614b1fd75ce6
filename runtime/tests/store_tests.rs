//! Store runtime tests: command serialization, effect feedback, shutdown,
//! and applied-action broadcasting.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use mediflow_core::effect::Effect;
use mediflow_core::reducer::{Effects, Reducer};
use mediflow_core::smallvec;
use mediflow_runtime::{Store, StoreConfig, StoreError};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
struct TallyState {
    count: i64,
    echoes: Vec<String>,
}

#[derive(Clone, Debug)]
enum TallyAction {
    Increment,
    EchoLater { text: String, delay: Duration },
    Echoed(String),
    IncrementAsync,
}

#[derive(Clone)]
struct TallyReducer;

impl Reducer for TallyReducer {
    type State = TallyState;
    type Action = TallyAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            TallyAction::Increment => {
                state.count += 1;
                smallvec![Effect::None]
            },
            TallyAction::EchoLater { text, delay } => {
                smallvec![Effect::Delay {
                    duration: delay,
                    action: Box::new(TallyAction::Echoed(text)),
                }]
            },
            TallyAction::Echoed(text) => {
                state.echoes.push(text);
                smallvec![Effect::None]
            },
            TallyAction::IncrementAsync => {
                smallvec![Effect::Future(Box::pin(async {
                    Some(TallyAction::Increment)
                }))]
            },
        }
    }
}

fn tally_store() -> Store<TallyState, TallyAction, (), TallyReducer> {
    Store::new(TallyState::default(), TallyReducer, ())
}

#[tokio::test]
async fn concurrent_sends_serialize_at_the_reducer() {
    let store = tally_store();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store.send(TallyAction::Increment).await.unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let count = store.state(|s| s.count).await;
    assert_eq!(count, 50);
}

#[tokio::test]
async fn delay_effect_feeds_action_back() {
    let store = tally_store();

    let mut handle = store
        .send(TallyAction::EchoLater {
            text: "hello".to_string(),
            delay: Duration::from_millis(20),
        })
        .await
        .unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(2))
        .await
        .unwrap();

    // The feedback action re-enters through send; give it one turn.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let echoes = store.state(|s| s.echoes.clone()).await;
    assert_eq!(echoes, vec!["hello".to_string()]);
}

#[tokio::test]
async fn future_effect_feeds_action_back() {
    let store = tally_store();

    let mut handle = store.send(TallyAction::IncrementAsync).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(2))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let count = store.state(|s| s.count).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn shutdown_rejects_subsequent_sends() {
    let store = tally_store();
    store.send(TallyAction::Increment).await.unwrap();

    store.shutdown(Duration::from_secs(1)).await.unwrap();

    let result = store.send(TallyAction::Increment).await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));

    // State stays queryable after shutdown.
    let count = store.state(|s| s.count).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn shutdown_waits_for_pending_effects() {
    let store = tally_store();

    store
        .send(TallyAction::EchoLater {
            text: "late".to_string(),
            delay: Duration::from_millis(50),
        })
        .await
        .unwrap();

    // Shutdown must block until the delay task finished; its feedback send
    // is then rejected by the shutdown flag.
    store.shutdown(Duration::from_secs(2)).await.unwrap();
    let echoes = store.state(|s| s.echoes.clone()).await;
    assert!(echoes.is_empty());
}

#[tokio::test]
async fn shutdown_times_out_when_effects_outlast_it() {
    let store = tally_store();

    store
        .send(TallyAction::EchoLater {
            text: "slow".to_string(),
            delay: Duration::from_secs(5),
        })
        .await
        .unwrap();

    let result = store.shutdown(Duration::from_millis(50)).await;
    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
}

#[tokio::test]
async fn applied_actions_broadcast_in_application_order() {
    let store = Store::with_config(
        TallyState::default(),
        TallyReducer,
        (),
        StoreConfig::default().with_broadcast_capacity(128),
    );
    let mut rx = store.subscribe_actions();

    store.send(TallyAction::Increment).await.unwrap();
    store
        .send(TallyAction::EchoLater {
            text: "x".to_string(),
            delay: Duration::from_millis(1),
        })
        .await
        .unwrap();

    assert!(matches!(rx.recv().await.unwrap(), TallyAction::Increment));
    assert!(matches!(
        rx.recv().await.unwrap(),
        TallyAction::EchoLater { .. }
    ));
    // The delayed feedback is broadcast too, once it re-enters send.
    assert!(matches!(rx.recv().await.unwrap(), TallyAction::Echoed(_)));
}

#[tokio::test]
async fn effect_handle_completed_is_immediately_done() {
    let mut handle = mediflow_runtime::EffectHandle::completed();
    handle
        .wait_with_timeout(Duration::from_millis(10))
        .await
        .unwrap();
}
