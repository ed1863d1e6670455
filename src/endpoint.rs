//! Lifecycle of a running mock endpoint
//!
//! A [`MockEndpoint`] owns the listening socket and the serving task. Tests
//! drive it through accessors and [`MockEndpoint::set_response`], then release
//! the socket with [`MockEndpoint::stop`].

use std::{net::SocketAddr, time::Duration};

use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle, time};
use tracing::{error, info, warn};

use crate::{
    build_app,
    config::EndpointConfig,
    errors::EndpointError,
    state::{EndpointState, MockResponse, RecordedRequest},
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct MockEndpoint {
    addr: SocketAddr,
    state: EndpointState,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl MockEndpoint {
    /// Starts serving on an ephemeral loopback port.
    ///
    /// # Panics
    ///
    /// Panics if no listener can be bound.
    pub async fn start() -> Self {
        Self::start_with(EndpointConfig::new()).await
    }

    /// Starts serving on `addr` (`host:port`). A failed bind is retried once
    /// after a short delay to ride out a previous listener still releasing
    /// the port.
    ///
    /// # Panics
    ///
    /// Panics if the address is malformed or still unavailable after the retry.
    pub async fn start_at(addr: &str) -> Self {
        Self::start_with(EndpointConfig::new().with_bind_addr(addr)).await
    }

    pub async fn start_with(config: EndpointConfig) -> Self {
        match Self::try_start_with(config).await {
            Ok(endpoint) => endpoint,
            Err(err) => panic!("mock endpoint failed to start: {err}"),
        }
    }

    pub async fn try_start() -> Result<Self, EndpointError> {
        Self::try_start_with(EndpointConfig::new()).await
    }

    pub async fn try_start_at(addr: &str) -> Result<Self, EndpointError> {
        Self::try_start_with(EndpointConfig::new().with_bind_addr(addr)).await
    }

    pub async fn try_start_with(config: EndpointConfig) -> Result<Self, EndpointError> {
        let target = config.bind_target()?;
        let listener = bind_with_retry(&target, config.bind_retry_delay).await?;
        let addr = listener.local_addr().map_err(EndpointError::LocalAddr)?;

        let state = EndpointState::new();
        let app = build_app(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(
                async move {
                    let _ = shutdown_rx.await;
                },
            );
            if let Err(err) = serve.await {
                error!(addr = %addr, error = %err, "mock endpoint server failed");
            }
        });

        info!(addr = %addr, "mock endpoint started");

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Scheme, host and port, e.g. `http://127.0.0.1:41234`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn last_method(&self) -> String {
        self.state.last_method()
    }

    pub fn last_path(&self) -> String {
        self.state.last_path()
    }

    pub fn last_body(&self) -> String {
        self.state.last_body()
    }

    /// Method, path and body of the most recent request, read together.
    pub fn last_request(&self) -> RecordedRequest {
        self.state.last_request()
    }

    pub fn set_response(&self, response: MockResponse) {
        self.state.set_response(response);
    }

    pub fn state(&self) -> &EndpointState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Stops accepting connections and releases the listening socket.
    /// Calling it again is a no-op.
    pub async fn stop(&mut self) {
        let Some(mut server) = self.server.take() else {
            return;
        };

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            warn!(addr = %self.addr, "graceful shutdown timed out, aborting server task");
            server.abort();
            let _ = server.await;
        }

        info!(addr = %self.addr, "mock endpoint stopped");
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

async fn bind_with_retry(
    target: &str,
    retry_delay: Duration,
) -> Result<TcpListener, EndpointError> {
    match TcpListener::bind(target).await {
        Ok(listener) => Ok(listener),
        Err(err) => {
            warn!(
                addr = %target,
                error = %err,
                retry_in_ms = retry_delay.as_millis(),
                "bind failed, retrying once"
            );
            time::sleep(retry_delay).await;
            TcpListener::bind(target)
                .await
                .map_err(|source| EndpointError::bind(target, source))
        }
    }
}
