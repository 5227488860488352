//! Backend serving a prebaked answer, for tests and stubs.

use super::{CancelError, SrvResolver};
use crate::session::Query;
use crate::wire;
use async_trait::async_trait;
use std::convert::Infallible;

/// Default TTL for records built with [`CannedAnswer::srv`].
pub const DEFAULT_TTL: u32 = 300;

/// A fixed answer for a [`CannedResolver`] to serve.
#[derive(Clone, Debug, Default)]
pub struct CannedAnswer {
    canonical_name: String,
    response_code: u16,
    answer: Vec<u8>,
    records: Vec<CannedRecord>,
}

#[derive(Clone, Debug)]
struct CannedRecord {
    record_type: u16,
    record_class: u16,
    ttl: u32,
    rdata: Vec<u8>,
}

impl CannedAnswer {
    /// Creates an empty successful answer resolved to `canonical_name`.
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            response_code: wire::RCODE_NO_ERROR,
            answer: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Appends a well-formed SRV record with [`DEFAULT_TTL`].
    pub fn srv(self, priority: u16, weight: u16, port: u16, target: &str) -> Self {
        self.record(
            wire::TYPE_SRV,
            wire::CLASS_IN,
            DEFAULT_TTL,
            wire::encode_srv_rdata(priority, weight, port, target),
        )
    }

    /// Appends a raw answer record, which may be of any type or class and
    /// need not decode cleanly.
    pub fn record(mut self, record_type: u16, record_class: u16, ttl: u32, rdata: Vec<u8>) -> Self {
        self.records.push(CannedRecord {
            record_type,
            record_class,
            ttl,
            rdata,
        });
        self
    }

    /// Sets the DNS response code the answer completes with.
    pub fn response_code(mut self, code: u16) -> Self {
        self.response_code = code;
        self
    }

    /// Sets the raw encoded answer message handed to the session on
    /// completion; target-name compression pointers resolve into it.
    pub fn answer_bytes(mut self, answer: Vec<u8>) -> Self {
        self.answer = answer;
        self
    }
}

#[derive(Clone, Debug)]
enum Canned {
    Answer(CannedAnswer),
    Failure(u16),
}

/// Backend that serves a fixed answer without touching the network.
///
/// Records are delivered inline from [`dispatch`], so the session is
/// terminal by the time `dispatch` returns.
///
/// [`dispatch`]: SrvResolver::dispatch
#[derive(Clone, Debug)]
pub struct CannedResolver(Canned);

impl CannedResolver {
    /// Creates a backend serving `answer` for every query.
    pub fn new(answer: CannedAnswer) -> Self {
        Self(Canned::Answer(answer))
    }

    /// Creates a backend that fails every query with `code`.
    pub fn failing(code: u16) -> Self {
        Self(Canned::Failure(code))
    }
}

#[async_trait]
impl SrvResolver for CannedResolver {
    type Error = Infallible;

    async fn dispatch(&self, query: Query) -> Result<(), Self::Error> {
        match &self.0 {
            Canned::Failure(code) => query.fail(*code),
            Canned::Answer(answer) => {
                for record in &answer.records {
                    if query.cancel_requested() {
                        query.fail(wire::RCODE_SERVER_FAILURE);
                        return Ok(());
                    }
                    query.deliver_record(
                        record.record_type,
                        record.record_class,
                        record.ttl,
                        &record.rdata,
                    );
                }
                query.complete(answer.response_code, &answer.canonical_name, &answer.answer);
            }
        }
        Ok(())
    }

    async fn cancel(&self, query: &Query) -> Result<(), CancelError> {
        if query.request_cancel() {
            Ok(())
        } else {
            Err(CancelError::AlreadyComplete)
        }
    }
}
