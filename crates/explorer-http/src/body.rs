//! Provides utility functions for handling [`Body`] types
//!
//! Upstream bodies are read whole so they can be relayed to the browser as-is,
//! or kept on [`HttpServiceError::BadStatusCode`](crate::HttpServiceError::BadStatusCode) for diagnostics.

use bytes::Bytes;
use http_body::Body;
use http_body_util::BodyExt;

/// Reads a [`Body`] to [`Bytes`], request or response alike
pub async fn body_to_bytes<B>(body: &mut B) -> Result<Bytes, B::Error>
where
    B: Body<Data = Bytes> + Unpin,
{
    BodyExt::collect(body).await.map(|buf| buf.to_bytes())
}
