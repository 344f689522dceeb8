//! Lifecycle tests: breaker trip and recovery, re-registration, tag lookup,
//! probing against live mock services, snapshot restarts, shutdown.

use std::sync::atomic::Ordering;
use std::time::Duration;

use svc_registry::{RegistryError, ServiceMetadata, ServiceRegistry, ServiceStatus};

mod common;

fn tagged(tags: &[&str]) -> ServiceMetadata {
    ServiceMetadata {
        version: Some("1.0.0".into()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        endpoints: vec![],
    }
}

#[tokio::test]
async fn breaker_trips_then_recovers_through_half_open() {
    let mut config = common::test_config("breaker-trip");
    config.breaker.failure_threshold = 3;
    config.breaker.open_timeout_secs = 2;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("item-service", "http://localhost:3002", tagged(&["items"]))
        .await;

    // Below the threshold the circuit stays closed.
    registry.record_failure("item-service").await;
    registry.record_failure("item-service").await;
    assert!(registry.resolve("item-service").await.is_ok());

    // Third consecutive failure trips it.
    registry.record_failure("item-service").await;
    match registry.resolve("item-service").await {
        Err(RegistryError::CircuitOpen(name)) => assert_eq!(name, "item-service"),
        other => panic!("expected CircuitOpen, got {:?}", other),
    }

    // After the open timeout the next lookup is the half-open trial.
    tokio::time::sleep(Duration::from_millis(2100)).await;
    let entry = registry.resolve("item-service").await.unwrap();
    assert_eq!(entry.address, "http://localhost:3002");

    // Trial success closes the breaker for good.
    registry.record_success("item-service").await;
    for _ in 0..5 {
        assert!(registry.resolve("item-service").await.is_ok());
    }
}

#[tokio::test]
async fn trial_failure_reopens_the_circuit() {
    let mut config = common::test_config("trial-failure");
    config.breaker.failure_threshold = 1;
    config.breaker.open_timeout_secs = 1;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("flaky", "http://localhost:4000", ServiceMetadata::default())
        .await;

    registry.record_failure("flaky").await;
    assert!(matches!(
        registry.resolve("flaky").await,
        Err(RegistryError::CircuitOpen(_))
    ));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(registry.resolve("flaky").await.is_ok());

    // The trial failed: open again, window restarted.
    registry.record_failure("flaky").await;
    assert!(matches!(
        registry.resolve("flaky").await,
        Err(RegistryError::CircuitOpen(_))
    ));
}

#[tokio::test]
async fn reregistration_is_idempotent_and_resets_the_breaker() {
    let mut config = common::test_config("reregister");
    config.breaker.failure_threshold = 1;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("svc", "http://localhost:5000", ServiceMetadata::default())
        .await;
    registry.record_failure("svc").await;
    assert!(registry.resolve("svc").await.is_err());

    let entry = registry
        .register("svc", "http://localhost:5000", ServiceMetadata::default())
        .await;
    assert_eq!(entry.consecutive_failures, 0);
    assert_eq!(entry.status, ServiceStatus::Healthy);
    assert!(registry.resolve("svc").await.is_ok());
    assert_eq!(registry.list_all().await.len(), 1);
}

#[tokio::test]
async fn unregister_unknown_changes_nothing() {
    let config = common::test_config("unregister-unknown");
    let snapshot_path = config.snapshot.path.clone();
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("svc", "http://localhost:5000", ServiceMetadata::default())
        .await;
    let before = tokio::fs::read_to_string(&snapshot_path).await.unwrap();

    assert!(!registry.unregister("ghost").await);
    assert_eq!(registry.list_all().await.len(), 1);
    let after = tokio::fs::read_to_string(&snapshot_path).await.unwrap();
    assert_eq!(before, after);

    assert!(registry.unregister("svc").await);
    assert!(registry.list_all().await.is_empty());
}

#[tokio::test]
async fn resolve_distinguishes_not_found_from_circuit_open() {
    let mut config = common::test_config("error-taxonomy");
    config.breaker.failure_threshold = 1;
    let registry = ServiceRegistry::new(config).await;

    assert!(matches!(
        registry.resolve("never-registered").await,
        Err(RegistryError::NotFound(_))
    ));

    registry
        .register("svc", "http://localhost:5000", ServiceMetadata::default())
        .await;
    registry.record_failure("svc").await;
    assert!(matches!(
        registry.resolve("svc").await,
        Err(RegistryError::CircuitOpen(_))
    ));
}

#[tokio::test]
async fn tag_lookup_shrinks_when_status_flips() {
    let mut config = common::test_config("tag-shrink");
    config.breaker.failure_threshold = 1;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("item-service", "http://localhost:3002", tagged(&["items"]))
        .await;
    assert_eq!(registry.find_by_tag("items").await.len(), 1);

    registry.record_failure("item-service").await;

    // Gone from tag lookup, still in the table.
    assert!(registry.find_by_tag("items").await.is_empty());
    assert_eq!(registry.list_all().await.len(), 1);
    assert!(registry.list_healthy().await.is_empty());
}

#[tokio::test]
async fn prober_tracks_a_live_service() {
    let (addr, healthy) = common::start_toggle_backend().await;

    let mut config = common::test_config("prober-live");
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("probe-svc", &format!("http://{}", addr), ServiceMetadata::default())
        .await;
    registry.start().await;

    tokio::time::sleep(Duration::from_millis(1800)).await;
    let healthy_now = registry.list_healthy().await;
    assert_eq!(healthy_now.len(), 1);
    assert!(healthy_now[0].last_health_check.is_some());

    // Service goes down: next sweep marks it unhealthy and records the error.
    healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let entries = registry.list_all().await;
    assert_eq!(entries[0].status, ServiceStatus::Unhealthy);
    assert!(entries[0].last_error.is_some());
    assert!(entries[0].consecutive_failures >= 1);

    // Recovery flips it back.
    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(registry.list_healthy().await.len(), 1);

    registry.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_probing_deterministically() {
    let (addr, healthy) = common::start_toggle_backend().await;

    let mut config = common::test_config("shutdown-prober");
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    let registry = ServiceRegistry::new(config).await;

    registry
        .register("probe-svc", &format!("http://{}", addr), ServiceMetadata::default())
        .await;
    registry.start().await;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    registry.shutdown().await;
    // Repeated shutdown is a no-op.
    registry.shutdown().await;

    // No tick fires after shutdown returns: the backend going down is
    // never observed.
    healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2000)).await;
    let entries = registry.list_all().await;
    assert_eq!(entries[0].status, ServiceStatus::Healthy);
}

#[tokio::test]
async fn restart_restores_entries_with_closed_breakers() {
    let mut config = common::test_config("restart");
    config.breaker.failure_threshold = 1;

    {
        let registry = ServiceRegistry::new(config.clone()).await;
        registry
            .register("svc-a", "http://localhost:7000", tagged(&["items"]))
            .await;
        registry.record_failure("svc-a").await;
        assert!(registry.resolve("svc-a").await.is_err());
        registry.shutdown().await;
    }

    let restarted = ServiceRegistry::new(config).await;
    let entries = restarted.list_all().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "svc-a");
    assert_eq!(entries[0].metadata.tags, vec!["items".to_string()]);
    // Status survives the restart, the breaker does not: resolve is
    // admitted because every breaker starts closed.
    assert_eq!(entries[0].status, ServiceStatus::Unhealthy);
    assert!(restarted.resolve("svc-a").await.is_ok());
}
