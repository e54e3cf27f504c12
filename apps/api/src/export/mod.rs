//! Layout preview, payment and PDF export endpoints.
//!
//! Layout and PDF serialization are CPU-bound and run on the blocking pool;
//! the only async I/O is the payment gateway.

pub mod handlers;

use anyhow::anyhow;

use crate::errors::AppError;

/// Runs `job` on tokio's blocking pool and flattens the join error into `AppError`.
pub async fn run_blocking<T, F>(job: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in export: {e}")))?
}

/// `attachment; filename="…"` with quotes, backslashes and non-ASCII replaced.
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
