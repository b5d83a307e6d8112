use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels `cancellation` on ctrl-c. Returns early once something else cancels it, so a session
/// that ends on its own doesn't keep waiting for a signal.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => (),
    };
}
