//! SRV records.

use http::uri::{PathAndQuery, Scheme, Uri};

/// A validated SRV record.
///
/// Holds the four mandatory fields of an SRV resource record as defined in
/// [RFC 2782](https://tools.ietf.org/html/rfc2782). Values are created by
/// the wire decoder (or [`SrvRecord::new`]) and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SrvRecord {
    priority: u16,
    weight: u16,
    port: u16,
    target: String,
}

impl SrvRecord {
    /// Creates a record from its four fields.
    pub fn new(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        Self {
            priority,
            weight,
            port,
            target: target.into(),
        }
    }

    /// Gets a record's priority. Lower values are tried first.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Gets a record's weight, the relative selection probability among
    /// records of the same priority.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Gets a record's port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gets a record's target host. The root name is represented as an
    /// empty string.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Builds a URI pointing at a record's target with a given scheme
    /// (e.g. https) and `path_and_query` (used as a suffix in the URI).
    ///
    /// ```
    /// # fn srv_record_to_uri() -> Result<(), http::Error> {
    /// use srv_resolve::SrvRecord;
    /// let record = SrvRecord::new(1, 100, 8211, "api.example.com");
    /// assert_eq!(
    ///     &record.to_uri("https", "/")?.to_string(),
    ///     "https://api.example.com:8211/"
    /// );
    /// assert_eq!(
    ///     &record.to_uri("http", "/bar")?.to_string(),
    ///     "http://api.example.com:8211/bar"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_uri(
        &self,
        scheme: impl TryInto<Scheme, Error = impl Into<http::Error>>,
        path_and_query: impl TryInto<PathAndQuery, Error = impl Into<http::Error>>,
    ) -> Result<Uri, http::Error> {
        let scheme: Scheme = scheme.try_into().map_err(Into::into)?;
        let path_and_query: PathAndQuery = path_and_query.try_into().map_err(Into::into)?;
        Uri::builder()
            .scheme(scheme)
            .path_and_query(path_and_query)
            .authority(format!("{}:{}", self.target, self.port).as_str())
            .build()
    }
}
