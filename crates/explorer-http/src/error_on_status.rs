//! Turns non-2xx responses into [`HttpServiceError::BadStatusCode`]

use explorer_tower::ResponseFuture;
use tower::{Layer, Service};

use crate::{HttpRequest, HttpResponse, HttpServiceError, body::body_to_bytes};

/// [`Layer`] that wraps a service in [`ErrorOnStatus`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorOnStatusLayer;

impl ErrorOnStatusLayer {
    /// Creates a new [`ErrorOnStatusLayer`]
    pub const fn new() -> ErrorOnStatusLayer {
        ErrorOnStatusLayer
    }
}

impl<S> Layer<S> for ErrorOnStatusLayer {
    type Service = ErrorOnStatus<S>;
    fn layer(&self, inner: S) -> Self::Service {
        ErrorOnStatus { inner }
    }
}

/// Fails any response whose status is not in the 2xx range, keeping its body for diagnostics
#[derive(Clone, Debug)]
pub struct ErrorOnStatus<S> {
    inner: S,
}

impl<S> Service<HttpRequest> for ErrorOnStatus<S>
where
    S: Service<HttpRequest, Response = HttpResponse, Error = HttpServiceError>,
    S::Future: Send + 'static,
{
    type Response = HttpResponse;
    type Error = HttpServiceError;
    type Future = ResponseFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: HttpRequest) -> Self::Future {
        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut resp = fut.await?;
            let status_code = resp.status();
            if status_code.is_success() {
                Ok(resp)
            } else {
                let data = body_to_bytes(resp.body_mut())
                    .await
                    .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
                Err(HttpServiceError::BadStatusCode { status_code, data })
            }
        })
    }
}
