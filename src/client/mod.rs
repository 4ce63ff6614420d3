pub mod http;

pub use http::ReportClient;

use serde_json::Value;

use crate::error::ClientResult;
use crate::model::GenerationRequest;

/// Where report payloads come from. [`ReportClient`] talks to the backend over
/// HTTP; the controller only sees this trait.
#[async_trait::async_trait]
pub trait ReportSource: Send + Sync {
    /// Performs exactly one fetch for `request` and returns the decoded body,
    /// not yet normalized. Never retries.
    async fn fetch_report(&self, request: &GenerationRequest) -> ClientResult<Value>;
    fn name(&self) -> &str;
}
