use {
    std::{convert::Infallible, pin::Pin},
    tracing::{info, error},
    hyper::{Request, Response, body::{Incoming, Bytes}, http::StatusCode, header::{self, HeaderValue}},
    http_body_util::Full,
    tally_core::{CountResponse, ErrorResponse},
    crate::{
        config::StoreProvider,
        counter,
        error::TallyError,
        metrics::Metrics,
    },
};

#[derive(Clone)]
pub struct CounterHandler {
    provider: StoreProvider,
    metrics: Metrics,
}

impl CounterHandler {
    pub fn new(provider: StoreProvider, metrics: Metrics) -> Self {
        Self {
            provider,
            metrics,
        }
    }

    /// The whole endpoint. The request itself carries no information the
    /// handler consumes: every call is one increment.
    pub fn handle(&self) -> Response<Full<Bytes>> {
        self.metrics.http_requests_total.inc();

        let result = self.provider.get()
            .and_then(|store| counter::increment(&store).map_err(|error| TallyError::StorageError { error }));

        match result {
            Ok(count) => {
                info!("processed visit counter request, count is now {count}");
                self.metrics.visits_total.inc();
                response_count(count)
            },
            Err(err @ TallyError::ConfigurationError { .. }) => {
                error!("failed to serve visit counter request: {err:?}");
                response_error(err.to_string())
            },
            Err(err) => {
                // full detail goes to the log only, the client gets a canned message
                error!("failed to serve visit counter request: {err:?}");
                response_error("internal storage error".to_owned())
            },
        }
    }
}

impl hyper::service::Service<Request<Incoming>> for CounterHandler {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, _req: Request<Incoming>) -> Self::Future {
        let response = self.handle();
        Box::pin(async move { Ok(response) })
    }
}

fn response_count(count: u64) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, serde_json::to_vec(&CountResponse { count }).unwrap())
}

fn response_error(error: String) -> Response<Full<Bytes>> {
    json_response(StatusCode::INTERNAL_SERVER_ERROR, serde_json::to_vec(&ErrorResponse { error }).unwrap())
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    response
}
