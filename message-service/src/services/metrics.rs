//! Prometheus metrics for message-service.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::{Mutex, OnceLock};

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Installs the global Prometheus recorder once; later calls return `Ok(())`.
pub fn init_metrics() -> Result<(), AppError> {
    // Serializes installers so only one reaches `install_recorder`.
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Counts a message store operation by outcome (`ok`, `not_found`, `error`, ...).
pub fn record_message_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "message_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_operations_are_rendered() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_message_operation("create", "ok");

        let output = get_metrics();
        assert!(
            output.contains("message_operations_total"),
            "Unexpected metrics output: {}",
            output
        );
        assert!(output.contains(r#"operation="create""#));
    }

    #[test]
    fn concurrent_initialization_succeeds() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(init_metrics))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    }
}
