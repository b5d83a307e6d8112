use anyhow::Result;

/// River runs everything on one cooperative thread: the activity clock and the stdin reader
/// share a single event loop.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
