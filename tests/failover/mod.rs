use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use prometheus::Registry;
use sentinel_watch::metrics_body;
use sentinel_watch::register_custom_metrics;
use sentinel_watch::TopologyWatcher;
use tokio::time::sleep;

use crate::common::sentinels;
use crate::common::LocalSentinels;
use crate::common::MASTER_ID;
use crate::enable_logger;

fn watcher(network: &LocalSentinels) -> TopologyWatcher {
    TopologyWatcher::builder(sentinels(3), MASTER_ID)
        .connector(Arc::new(network.clone()))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_full_failover_refreshes_once() {
    enable_logger();
    let network = LocalSentinels::new();
    let endpoints = sentinels(3);
    let watcher = watcher(&network);
    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = refreshes.clone();
    watcher
        .bind(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    // Every Sentinel announces the same failover
    for endpoint in &endpoints {
        network.publish(endpoint, "+elected-leader", "master mymaster 10.0.0.5 6380");
    }
    sleep(Duration::from_millis(800)).await;
    for endpoint in &endpoints {
        network.publish(endpoint, "fix-slave-config", "slave 10.0.0.7:6382 10.0.0.7 6382 @ mymaster 10.0.0.5 6380");
        network.publish(endpoint, "+switch-master", "mymaster 10.0.0.5 6380 10.0.0.6 6381");
    }
    sleep(Duration::from_millis(800)).await;
    for endpoint in &endpoints {
        network.publish(endpoint, "failover-end", "master mymaster 10.0.0.6 6381");
    }

    sleep(Duration::from_secs(20)).await;
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    watcher.close();
    assert_eq!(network.open_sessions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_lost_sentinel_is_recovered_on_sentinel_event() {
    let network = LocalSentinels::new();
    let endpoints = sentinels(3);
    network.take_down(&endpoints[2]);
    let watcher = watcher(&network);
    watcher.bind(|| {}).await.unwrap();
    assert_eq!(watcher.live_endpoints().len(), 2);

    network.bring_up(&endpoints[2]);
    network.publish(&endpoints[0], "+sentinel", "sentinel 127.0.0.1:26381 127.0.0.1 26381 @ mymaster 10.0.0.5 6380");
    sleep(Duration::from_secs(6)).await;

    assert_eq!(network.dials(&endpoints[2]), 2);
    assert_eq!(watcher.live_endpoints().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_metrics_exposed_after_refresh() {
    let network = LocalSentinels::new();
    let endpoints = sentinels(3);
    let watcher = watcher(&network);
    watcher.bind(|| {}).await.unwrap();

    network.publish(&endpoints[1], "+switch-master", "mymaster 10.0.0.5 6380 10.0.0.6 6381");
    sleep(Duration::from_secs(6)).await;

    let registry = Registry::new();
    register_custom_metrics(&registry).unwrap();
    let body = metrics_body(&registry);
    assert!(body.contains("refresh_topology"));
    assert!(body.contains("scheduled"));
}
