use {
    std::net::SocketAddr,
    tracing::error,
    tokio::net::TcpListener,
    hyper::server::conn::http1,
    hyper_util::rt::{TokioIo, TokioTimer},
    crate::{
        config::StoreProvider,
        http::CounterHandler,
        metrics::{Metrics, run_metrics_server},
    },
};

#[derive(Clone)]
pub struct TallyServer {
    provider: StoreProvider,
    metrics: Metrics,
}

impl TallyServer {
    pub fn new(provider: StoreProvider) -> Self {
        Self {
            provider,
            metrics: Metrics::new(),
        }
    }

    pub fn handler(&self) -> CounterHandler {
        CounterHandler::new(self.provider.clone(), self.metrics.clone())
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn run_http(&self, port: u16) {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let listener = match TcpListener::bind(addr).await {
            Ok(v) => v,
            Err(err) => {
                error!("failed to create TcpListener for visit counter server: {err:?}");
                return;
            }
        };

        let handler = self.handler();

        println!("running on {addr:?}");
        loop {
            let (tcp, _) = match listener.accept().await {
                Ok(v) => v,
                Err(err) => {
                    error!("failed to accept connection: {err:?}");
                    continue;
                }
            };
            let io = TokioIo::new(tcp);

            let handler = handler.clone();
            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(io, handler)
                    .await {
                        if err.is_timeout() {
                            // timeouts can be caused by the client, ignore those
                        } else {
                            error!("error while handling http request: {err:?}");
                        }
                    }
            });
        }
    }

    pub async fn run_metrics(&self, port: u16) {
        run_metrics_server(self.metrics.clone(), port).await
    }
}
