use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static STORE_READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("storeroom_store_reads_total", "Total store reads served")
        .expect("register store_reads_total")
});

pub static STORE_MUTATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "storeroom_store_mutations_total",
        "Total merge updates applied to the store"
    )
    .expect("register store_mutations_total")
});

pub static STORE_DELETES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("storeroom_store_deletes_total", "Total boxes deleted")
        .expect("register store_deletes_total")
});

pub static PERSIST_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "storeroom_persist_failures_total",
        "Total failed writes of the store file"
    )
    .expect("register persist_failures_total")
});

pub static AUTH_CHALLENGES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "storeroom_auth_challenges_total",
        "Total 401 challenges issued with a fresh nonce"
    )
    .expect("register auth_challenges_total")
});

pub static AUTH_SUCCESSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "storeroom_auth_successes_total",
        "Total requests that passed OTP verification"
    )
    .expect("register auth_successes_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
