//! Request handlers for the swatch API.

pub mod filter;
pub mod health;
pub mod materials;
pub mod proxy;
pub mod search;

pub use filter::*;
pub use health::*;
pub use materials::*;
pub use proxy::*;
pub use search::*;

use tokio::task;

use crate::error::ApiResult;

/// Run a store call on the blocking pool.
///
/// SQLite work holds the store mutex for its whole duration, so it must not
/// run on the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> swatch::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(task::spawn_blocking(f).await??)
}
