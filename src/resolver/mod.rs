//! SRV resolver backends.
//!
//! A backend owns the transport: it issues the query however it likes
//! and drives the session it was handed, delivering raw answer records
//! and exactly one completion or failure signal. [`resolve`] is the
//! caller-facing surface over that contract.

use crate::session::{Query, Resolution, SessionError};
use async_trait::async_trait;

mod canned;
pub use canned::{CannedAnswer, CannedResolver, DEFAULT_TTL};

/// Represents the ability to act as a SRV resolver backend.
#[async_trait]
pub trait SrvResolver: Send + Sync {
    /// Errors encountered while dispatching a query.
    type Error: std::error::Error + Send + 'static;

    /// Takes ownership of a query and starts resolving it.
    ///
    /// Returns once the query is in flight; records and the completion
    /// signal arrive through the handle from whatever execution context
    /// the backend uses. A backend that drops every clone of the handle
    /// without completing it abandons the session.
    async fn dispatch(&self, query: Query) -> Result<(), Self::Error>;

    /// Requests cancellation of an in-flight query.
    ///
    /// The default implementation reports that cancellation is
    /// unsupported rather than silently ignoring the request.
    async fn cancel(&self, query: &Query) -> Result<(), CancelError> {
        let _ = query;
        Err(CancelError::Unsupported)
    }
}

/// Errors encountered when cancelling a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    /// The backend cannot cancel in-flight queries.
    #[error("backend cannot cancel in-flight queries")]
    Unsupported,
    /// The session already reached a terminal state; its result stands.
    #[error("query already reached a terminal state")]
    AlreadyComplete,
}

/// Errors encountered during SRV resolution.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError<E: std::error::Error> {
    /// The backend refused the query outright.
    #[error("dispatching query to backend: {0}")]
    Dispatch(E),
    /// The session ended in failure after dispatch.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Resolves the SRV record set for `name` into a [`Resolution`] whose
/// records are in final order: ascending priority, weighted-random within
/// equal priority.
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// use srv_resolve::resolver::{CannedAnswer, CannedResolver};
///
/// let backend = CannedResolver::new(
///     CannedAnswer::new("example.com")
///         .srv(10, 60, 5060, "a.example.com")
///         .srv(10, 20, 5060, "b.example.com")
///         .srv(20, 0, 5060, "backup.example.com"),
/// );
/// let resolution = srv_resolve::resolve(&backend, "_sip._udp.example.com")
///     .await
///     .unwrap();
/// let last = resolution.records().last().unwrap();
/// assert_eq!(last.target(), "backup.example.com");
/// # }
/// ```
pub async fn resolve<R>(resolver: &R, name: &str) -> Result<Resolution, ResolveError<R::Error>>
where
    R: SrvResolver + ?Sized,
{
    let (query, completion) = Query::new(name);
    resolver
        .dispatch(query)
        .await
        .map_err(ResolveError::Dispatch)?;
    completion.await.map_err(ResolveError::from)
}
