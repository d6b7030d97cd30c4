//! Collaborator service seam.

use std::future::Future;

use crate::{Request, Response, ServiceError};

/// Executes requests against the collaborator service.
///
/// Implementations own the transport and the session credential. Calls are
/// independent and may complete in any order; the [`crate::Client`] copes with
/// late and out-of-order results.
///
/// # Implementations
///
/// - **HTTP**: [`crate::transport::HttpService`] (feature `transport`)
/// - **Simulation**: in-process fake with latency and failure injection
pub trait ChatService: Clone + Send + Sync + 'static {
    /// Execute one request.
    fn call(&self, request: Request) -> impl Future<Output = Result<Response, ServiceError>> + Send;
}
