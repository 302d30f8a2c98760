use std::{pin::Pin, time::Duration};

use buildstructor::buildstructor;
use futures::Future;
use http_body_util::Full;
use reqwest::ClientBuilder;
use tower::{Service, ServiceBuilder, util::BoxCloneSyncService};

use crate::{
    DEFAULT_TIMEOUT, HttpRequest, HttpResponse, HttpService, HttpServiceConfig, HttpServiceError,
    body::body_to_bytes,
};

/// A [`Service`] that wraps a [`reqwest`] client and uses [`http`] constructs for requests and responses
#[derive(Clone, Debug)]
pub struct ReqwestService {
    client: BoxCloneSyncService<reqwest::Request, reqwest::Response, HttpServiceError>,
    timeout: Duration,
}

#[buildstructor]
impl ReqwestService {
    /// Constructs a new [`ReqwestService`]
    ///
    /// Passing an existing `client` lets several services with different timeouts
    /// share one connection pool.
    #[builder]
    pub fn new(
        config: Option<HttpServiceConfig>,
        client: Option<reqwest::Client>,
    ) -> Result<ReqwestService, reqwest::Error> {
        let config = config.unwrap_or_default();
        let client = match client {
            Some(client) => client,
            None => ClientBuilder::new().build()?,
        };
        let timeout = (*config.timeout()).unwrap_or(DEFAULT_TIMEOUT);
        tracing::trace!(?timeout, "building reqwest service");
        let client = BoxCloneSyncService::new(
            ServiceBuilder::new()
                .map_err(HttpServiceError::from)
                .service(client),
        );
        Ok(ReqwestService { client, timeout })
    }
}

impl From<reqwest::Error> for HttpServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_body() {
            HttpServiceError::Body(value.into())
        } else if value.is_connect() {
            HttpServiceError::Connect(value.into())
        } else if value.is_timeout() {
            HttpServiceError::TimedOut(value.into())
        } else {
            HttpServiceError::Unexpected(value.into())
        }
    }
}

impl Service<HttpRequest> for ReqwestService {
    type Response = HttpResponse;
    type Error = HttpServiceError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.client.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest) -> Self::Future {
        // https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services
        let mut client =
            explorer_tower::take_ready_service::<_, reqwest::Request>(&mut self.client);
        let timeout = self.timeout;
        let fut = async move {
            let bytes = body_to_bytes(req.body_mut())
                .await
                .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
            let body = reqwest::Body::from(bytes);
            let req = req.map(move |_| body);
            let req = reqwest::Request::try_from(req)?;
            let mut resp = http::Response::from(client.call(req).await?);
            let bytes = body_to_bytes(resp.body_mut())
                .await
                .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
            Ok(resp.map(|_| Full::new(bytes)))
        };
        // the deadline covers reading the response body, not just its headers
        Box::pin(async move {
            tokio::time::timeout(timeout, fut)
                .await
                .map_err(|elapsed| HttpServiceError::TimedOut(Box::new(elapsed)))?
        })
    }
}

impl From<ReqwestService> for HttpService {
    fn from(value: ReqwestService) -> Self {
        HttpService::new(value)
    }
}
