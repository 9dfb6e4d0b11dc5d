use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::Endpoint;
use crate::RefreshCallback;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub const MASTER_ID: &str = "mymaster";

/// `count` local Sentinel endpoints on consecutive ports from 26379.
pub fn sentinel_endpoints(count: u16) -> Vec<Endpoint> {
    (0..count)
        .map(|i| Endpoint::new("127.0.0.1", 26379 + i))
        .collect()
}

/// Refresh callback that counts its invocations.
pub fn counting_callback(counter: &Arc<AtomicUsize>) -> RefreshCallback {
    let counter = counter.clone();
    Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}
