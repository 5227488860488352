//! Resolution sessions.
//!
//! A [`Query`] is the handle a backend drives: it accepts raw answer
//! records one at a time and exactly one completion (or failure) signal.
//! Completion runs validation and ordering, then resolves the paired
//! [`Completion`] future with the outcome. Each session reaches exactly
//! one terminal state; everything delivered afterwards is ignored.

use crate::{order, record::SrvRecord, wire};
use futures_channel::oneshot;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

type SessionResult = Result<Resolution, SessionError>;

/// Terminal failure of a resolution session.
///
/// Distinct from a resolution that succeeds with zero valid records,
/// which is reported as an empty [`Resolution`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The backend reported a transport or protocol failure instead of
    /// completing the query.
    #[error("backend reported failure (code {code})")]
    Backend {
        /// Backend-defined failure code.
        code: u16,
    },
    /// Every backend handle was dropped before the session completed.
    #[error("backend abandoned the query without completing it")]
    Abandoned,
}

/// Lifecycle phase of a session. `Finalizing` is transient and runs
/// entirely inside [`Query::complete`], so it needs no variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending,
    Collecting,
    Completed,
    Failed,
}

struct RawRecord {
    ttl: u32,
    rdata: Box<[u8]>,
}

struct Inner {
    phase: Phase,
    completion: Option<oneshot::Sender<SessionResult>>,
    raw: Vec<RawRecord>,
    skipped: usize,
}

struct Shared {
    name: String,
    cancel: AtomicBool,
    inner: Mutex<Inner>,
}

/// Handle to an in-flight resolution session.
///
/// Cloneable so a backend can move it into whatever execution context
/// delivers its results. Only delivery calls mutate the accumulating
/// record set, and ordering runs only after the completion signal, so
/// there is no concurrent read/write on the set.
#[derive(Clone)]
pub struct Query {
    shared: Arc<Shared>,
}

impl Query {
    /// Creates a session for `name`, returning the backend-facing handle
    /// and the future that resolves with the session's outcome.
    pub fn new(name: impl Into<String>) -> (Query, Completion) {
        let (tx, rx) = oneshot::channel();
        let query = Query {
            shared: Arc::new(Shared {
                name: name.into(),
                cancel: AtomicBool::new(false),
                inner: Mutex::new(Inner {
                    phase: Phase::Pending,
                    completion: Some(tx),
                    raw: Vec::new(),
                    skipped: 0,
                }),
            }),
        };
        (query, Completion { receiver: rx })
    }

    /// The service name being resolved.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers one raw answer record to the session.
    ///
    /// Only SRV records of the Internet class are kept as candidates;
    /// others are counted and skipped. Deliveries after a terminal state
    /// are ignored.
    pub fn deliver_record(&self, record_type: u16, record_class: u16, ttl: u32, rdata: &[u8]) {
        let mut inner = self.inner();
        match inner.phase {
            Phase::Pending | Phase::Collecting => {
                inner.phase = Phase::Collecting;
                if record_type == wire::TYPE_SRV && record_class == wire::CLASS_IN {
                    inner.raw.push(RawRecord {
                        ttl,
                        rdata: rdata.into(),
                    });
                } else {
                    inner.skipped += 1;
                    #[cfg(feature = "log")]
                    tracing::debug!(
                        name = %self.shared.name,
                        record_type,
                        record_class,
                        "skipping non-SRV answer record"
                    );
                }
            }
            Phase::Completed | Phase::Failed => {
                #[cfg(feature = "log")]
                tracing::debug!(
                    name = %self.shared.name,
                    "record delivered after terminal state; ignoring"
                );
            }
        }
    }

    /// Signals that the answer is complete.
    ///
    /// `answer` is the full encoded answer message; candidate records are
    /// validated against it (compression pointers in target names resolve
    /// into it), invalid ones are dropped, and the survivors are ordered
    /// by priority and weight before the outcome is handed to the caller.
    /// Exactly the first completion or failure signal takes effect.
    pub fn complete(&self, response_code: u16, canonical_name: &str, answer: &[u8]) {
        let (completion, raw, skipped) = {
            let mut inner = self.inner();
            if let Phase::Completed | Phase::Failed = inner.phase {
                #[cfg(feature = "log")]
                tracing::debug!(
                    name = %self.shared.name,
                    "completion after terminal state; ignoring"
                );
                return;
            }
            inner.phase = Phase::Completed;
            (
                inner.completion.take(),
                mem::take(&mut inner.raw),
                inner.skipped,
            )
        };
        let Some(completion) = completion else { return };

        let mut records = Vec::with_capacity(raw.len());
        let mut rejected = 0usize;
        let mut min_ttl: Option<u32> = None;
        for candidate in &raw {
            match wire::decode_srv_rdata(&candidate.rdata, answer) {
                Ok(record) => {
                    min_ttl = Some(min_ttl.map_or(candidate.ttl, |ttl| ttl.min(candidate.ttl)));
                    records.push(record);
                }
                Err(_reason) => {
                    rejected += 1;
                    #[cfg(feature = "log")]
                    tracing::debug!(
                        name = %self.shared.name,
                        reason = %_reason,
                        "dropping invalid SRV record"
                    );
                }
            }
        }

        let records = order::order_records(records, &mut rand::rng());
        let resolution = Resolution {
            records,
            canonical_name: canonical_name.to_owned(),
            response_code,
            answer: answer.into(),
            min_ttl: min_ttl.map(|ttl| Duration::from_secs(u64::from(ttl))),
            rejected,
            skipped,
        };
        let _ = completion.send(Ok(resolution));
    }

    /// Signals that the backend could not complete the query, with a
    /// backend-defined failure code. Ignored after a terminal state.
    pub fn fail(&self, code: u16) {
        let completion = {
            let mut inner = self.inner();
            if let Phase::Completed | Phase::Failed = inner.phase {
                #[cfg(feature = "log")]
                tracing::debug!(
                    name = %self.shared.name,
                    "failure after terminal state; ignoring"
                );
                return;
            }
            inner.phase = Phase::Failed;
            inner.raw = Vec::new();
            inner.completion.take()
        };
        #[cfg(feature = "log")]
        tracing::warn!(name = %self.shared.name, code, "backend failed to complete query");
        if let Some(completion) = completion {
            let _ = completion.send(Err(SessionError::Backend { code }));
        }
    }

    /// Requests cooperative cancellation.
    ///
    /// Returns whether the session was still in flight. A session that
    /// has already reached a terminal state ignores the request (the
    /// result is committed) and `false` is returned.
    pub fn request_cancel(&self) -> bool {
        let inner = self.inner();
        match inner.phase {
            Phase::Completed | Phase::Failed => false,
            Phase::Pending | Phase::Collecting => {
                self.shared.cancel.store(true, Ordering::Relaxed);
                true
            }
        }
    }

    /// Whether cancellation has been requested. Backends should check
    /// this before each delivery.
    pub fn cancel_requested(&self) -> bool {
        self.shared.cancel.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.shared.name)
            .finish_non_exhaustive()
    }
}

/// Future resolving to the outcome of a resolution session.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Completion {
    receiver: oneshot::Receiver<SessionResult>,
}

impl Future for Completion {
    type Output = SessionResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|result| match result {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(SessionError::Abandoned),
        })
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

/// Successful outcome of a resolution session.
///
/// Owns the ordered record sequence; ownership transfers to the caller,
/// wholesale via [`Resolution::into_records`] or borrowed through
/// [`Resolution::records`]. May be empty when the answer held no valid
/// SRV records, which is still a success.
#[derive(Clone, Debug)]
pub struct Resolution {
    records: Vec<SrvRecord>,
    canonical_name: String,
    response_code: u16,
    answer: Box<[u8]>,
    min_ttl: Option<Duration>,
    rejected: usize,
    skipped: usize,
}

impl Resolution {
    /// The records in final order: ascending priority, weighted-random
    /// within equal priority.
    pub fn records(&self) -> &[SrvRecord] {
        &self.records
    }

    /// Consumes the resolution, returning the ordered records.
    pub fn into_records(self) -> Vec<SrvRecord> {
        self.records
    }

    /// The canonical name the backend resolved the query to.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// The DNS response code the backend completed with.
    pub fn response_code(&self) -> u16 {
        self.response_code
    }

    /// The raw encoded answer, for out-of-band inspection.
    pub fn answer(&self) -> &[u8] {
        &self.answer
    }

    /// Minimum TTL across the accepted records, or `None` if there were
    /// none. An ordering derived from this resolution should not outlive
    /// it.
    pub fn min_ttl(&self) -> Option<Duration> {
        self.min_ttl
    }

    /// Number of candidate SRV records dropped by validation.
    pub fn rejected_records(&self) -> usize {
        self.rejected
    }

    /// Number of non-SRV answer records skipped before validation.
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }
}
