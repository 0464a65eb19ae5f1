//! Request catcher.
//!
//! Accepts any method on any path, records the request, and echoes the
//! record back. No request that reaches the catcher is rejected.

pub mod log;
pub mod record;

use axum::http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use self::log::{RecordError, RequestLog};
pub use record::RequestRecord;

/// Acknowledgement returned for every caught request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchResponse {
    pub ok: bool,
    pub received: RequestRecord,
}

/// Records inbound requests into a [`RequestLog`].
#[derive(Debug, Clone)]
pub struct Catcher {
    log: RequestLog,
}

impl Catcher {
    pub fn new(log: RequestLog) -> Self {
        Self { log }
    }

    /// Capture, log, and acknowledge a request.
    ///
    /// The file append is detached; the acknowledgement does not wait for it.
    pub fn handle(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: &[u8],
    ) -> CatchResponse {
        let record = RequestRecord::capture(method, uri, headers, body);

        info!(
            method = %record.method,
            path = %record.path,
            body_length = body.len(),
            "request_caught"
        );

        drop(self.log.record(&record));

        CatchResponse {
            ok: true,
            received: record,
        }
    }
}
