//! Shared fixtures for resolution integration tests.

use async_trait::async_trait;
use srv_resolve::wire::{self, CLASS_IN, RCODE_NO_ERROR, RCODE_SERVER_FAILURE, TYPE_SRV};
use srv_resolve::{CancelError, Query, SrvRecord, SrvResolver};
use std::convert::Infallible;

/// TTL used for every record the task backend serves.
pub const TEST_TTL: u32 = 12345;

/// Static SRV record definition for use in test configurations, with
/// per-field omission flags for building corrupt RDATA.
#[derive(Clone, Copy, Debug)]
pub struct TestSrv {
    /// Priority value
    pub priority: u16,
    /// Weight value
    pub weight: u16,
    /// Port number
    pub port: u16,
    /// Target hostname
    pub host: &'static str,
    /// Leave the weight field out of the wire encoding
    pub omit_weight: bool,
    /// Leave the port field out of the wire encoding
    pub omit_port: bool,
    /// Leave the host out of the wire encoding
    pub omit_host: bool,
}

impl TestSrv {
    /// Create a new well-formed SRV record.
    pub const fn new(priority: u16, weight: u16, port: u16, host: &'static str) -> Self {
        Self {
            priority,
            weight,
            port,
            host,
            omit_weight: false,
            omit_port: false,
            omit_host: false,
        }
    }

    /// Mark trailing fields as omitted from the wire encoding.
    pub const fn omitting(mut self, weight: bool, port: bool, host: bool) -> Self {
        self.omit_weight = weight;
        self.omit_port = port;
        self.omit_host = host;
        self
    }

    /// Encode the record's RDATA, leaving out any omitted fields.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.priority.to_be_bytes());
        if !self.omit_weight {
            buf.extend_from_slice(&self.weight.to_be_bytes());
        }
        if !self.omit_port {
            buf.extend_from_slice(&self.port.to_be_bytes());
        }
        if !self.omit_host {
            wire::encode_name(self.host, &mut buf);
        }
        buf
    }
}

/// [`PartialEq`] against resolved records, for test assertions. Compares
/// the four SRV fields only.
impl PartialEq<SrvRecord> for TestSrv {
    fn eq(&self, other: &SrvRecord) -> bool {
        self.priority == other.priority()
            && self.weight == other.weight()
            && self.port == other.port()
            && self.host == other.target()
    }
}

/// Backend that posts records from a detached task and then completes,
/// the way a worker-per-query resolver delivers results.
#[derive(Clone)]
pub struct TaskResolver {
    canonical_name: &'static str,
    records: Vec<TestSrv>,
}

impl TaskResolver {
    /// Create a backend serving `records` for every query.
    pub fn new(canonical_name: &'static str, records: &[TestSrv]) -> Self {
        Self {
            canonical_name,
            records: records.to_vec(),
        }
    }
}

#[async_trait]
impl SrvResolver for TaskResolver {
    type Error = Infallible;

    async fn dispatch(&self, query: Query) -> Result<(), Self::Error> {
        let records = self.records.clone();
        let canonical_name = self.canonical_name;
        tokio::spawn(async move {
            for record in &records {
                if query.cancel_requested() {
                    query.fail(RCODE_SERVER_FAILURE);
                    return;
                }
                query.deliver_record(TYPE_SRV, CLASS_IN, TEST_TTL, &record.encode());
            }
            query.complete(RCODE_NO_ERROR, canonical_name, &[]);
        });
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
