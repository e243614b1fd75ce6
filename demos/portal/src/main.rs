//! Portal demo binary
//!
//! Wires the seeded portal store to the simulated event source, streams
//! every applied command to stdout, and prints a per-role notification
//! summary on exit. Runs until Ctrl+C or for 30 seconds, whichever comes
//! first.

use mediflow_core::environment::{Clock, SystemClock};
use mediflow_domain::{
    PortalEnvironment, PortalReducer, Role, SimulatedEventSource, SimulatorConfig, seed,
};
use mediflow_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal=info,mediflow_domain=debug,mediflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== MediFlow Portal: workflow & notification pipeline ===\n");

    let clock = Arc::new(SystemClock);
    let env = PortalEnvironment::new(clock.clone());
    let store = Store::new(seed::seeded(clock.now()), PortalReducer::new(), env);

    let seeded = store
        .state(|s| {
            (
                s.medications.requests().len(),
                s.prescriptions.prescriptions().len(),
                s.labs.orders().len(),
                s.inventory.items().len(),
                s.inventory.alerts().len(),
            )
        })
        .await;
    println!(
        "Seeded: {} medication requests, {} prescriptions, {} lab orders, {} items, {} open alerts\n",
        seeded.0, seeded.1, seeded.2, seeded.3, seeded.4
    );

    // Stream applied commands as they happen.
    let mut actions = store.subscribe_actions();
    let printer = tokio::spawn(async move {
        while let Ok(action) = actions.recv().await {
            println!(">>> {action:?}");
        }
    });

    let simulator = SimulatedEventSource::spawn(
        store.clone(),
        SimulatorConfig::default()
            .with_tick_interval(Duration::from_secs(2))
            .with_fire_probability(0.6),
        &Role::ALL,
    );
    println!("Simulated event source running for all roles. Ctrl+C to stop.\n");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nReceived Ctrl+C");
        },
        () = tokio::time::sleep(Duration::from_secs(30)) => {
            println!("\nDemo window elapsed");
        },
    }

    simulator.stop().await;
    if let Err(e) = store.shutdown(Duration::from_secs(5)).await {
        tracing::warn!(error = %e, "store shutdown incomplete");
    }
    printer.abort();

    println!("\n--- Notification summary ---");
    let summary = store
        .state(|s| {
            let per_role: Vec<(Role, usize)> = Role::ALL
                .iter()
                .map(|&role| (role, s.notifications.visible_to(role).count()))
                .collect();
            (per_role, s.notifications.unread_count())
        })
        .await;
    for (role, count) in summary.0 {
        println!("{role:>12}: {count} visible");
    }
    println!("{:>12}: {}", "unread", summary.1);
}
