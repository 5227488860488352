#![deny(missing_docs)]

/*!
Validation and RFC 2782 ordering of DNS SRV record sets.

# Introduction

SRV Records, as defined in [RFC 2782](https://tools.ietf.org/html/rfc2782),
are DNS records of the form

`_Service._Proto.Name TTL Class SRV Priority Weight Port Target`

For instance, a DNS server might respond with the following SRV records for
`_sip._udp.example.com`:

```text
_sip._udp.example.com. 60 IN SRV 1 100 5060 test1.example.com.
_sip._udp.example.com. 60 IN SRV 2 50  5060 test2.example.com.
_sip._udp.example.com. 60 IN SRV 2 50  5060 test3.example.com.
```

A client wanting to communicate with this example service would first try
`test1.example.com:5060` (the record with the lowest priority), then the
other two (in a weighted-random order, since they share a priority) should
the first be unavailable.

`srv-resolve` turns the unordered, possibly malformed record set a resolver
backend hands back into that failover order: each raw record is validated
([`wire::decode_srv_rdata`]), survivors are grouped by ascending priority,
and each priority group is arranged by repeated weighted-random selection
([`order_records`]), so that zero-weight records land at the back of their
group. Malformed records are dropped, never fatal: a resolution with zero
valid records still succeeds with an empty sequence.

# Resolution sessions

Transport belongs to a backend implementing [`SrvResolver`]. A backend is
handed a [`Query`] and drives it from whatever execution context delivers
its results: zero or more [`Query::deliver_record`] calls followed by
exactly one [`Query::complete`] or [`Query::fail`]. [`resolve`] wraps the
session in a synchronous-looking call:

```
# #[tokio::main]
# async fn main() {
use srv_resolve::resolver::{CannedAnswer, CannedResolver};

let backend = CannedResolver::new(
    CannedAnswer::new("example.com")
        .srv(1, 100, 5060, "test1.example.com")
        .srv(2, 50, 5060, "test2.example.com")
        .srv(2, 50, 5060, "test3.example.com"),
);
let resolution = srv_resolve::resolve(&backend, "_sip._udp.example.com")
    .await
    .unwrap();
assert_eq!(resolution.records()[0].target(), "test1.example.com");
# }
```

The [`CannedResolver`] above serves a fixed answer inline; a production
backend would dispatch a task per outstanding query and post results from
it.

[`CannedResolver`]: resolver::CannedResolver
*/

mod order;
pub use order::{group_by_priority, order_records, select_by_weight};

mod record;
pub use record::SrvRecord;

mod session;
pub use session::{Completion, Query, Resolution, SessionError};

pub mod resolver;
pub use resolver::{resolve, CancelError, ResolveError, SrvResolver};

pub mod wire;
pub use wire::RecordError;
