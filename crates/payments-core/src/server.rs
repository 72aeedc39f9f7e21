//! Native HTTP server implementation
//!
//! hyper HTTP/1.1 on a multi-threaded tokio runtime:
//! - Handler-ID routing with pre-rendered static responses
//! - SO_REUSEADDR + TCP_NODELAY on the listening socket
//! - One task per connection, tracked for graceful shutdown
//! - On shutdown idle keep-alive connections close at once, busy ones after
//!   their current response

use crate::{Error, Request, Response, ResponseBuilder, Result};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use payments_router::{Match, Router};
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub hostname: String,
    pub workers: usize,
    /// How long in-flight connections may take to finish after shutdown
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            hostname: "0.0.0.0".to_string(),
            workers: num_cpus::get(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Resolve `hostname:port` to the first matching socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let target = format!("{}:{}", self.hostname, self.port);
        (self.hostname.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", target, e)))?
            .next()
            .ok_or(Error::InvalidAddress(target))
    }
}

/// Static route configuration
#[derive(Debug, Clone)]
pub struct StaticRoute {
    /// HTTP method, or `*` for any method
    pub method: String,
    pub path: String,
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub handler_id: u32,
}

impl StaticRoute {
    /// Render the fixed response served by this route
    pub fn to_response(&self) -> Result<Response> {
        let status = StatusCode::from_u16(self.status).map_err(|_| Error::InvalidStatus(self.status))?;
        Ok(ResponseBuilder::new(status)
            .header("content-type", self.content_type.as_str())
            .body(self.body.clone())
            .build())
    }
}

/// Server state shared across all connections
///
/// The router resolves a request to a handler ID; the response table maps
/// that ID to the pre-rendered response.
pub struct ServerState {
    /// Router using handler IDs
    pub router: RwLock<Router>,
    /// Static responses indexed by handler ID
    pub static_responses: RwLock<HashMap<u32, Response>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            router: RwLock::new(Router::new()),
            static_responses: RwLock::new(HashMap::new()),
        }
    }

    /// State serving the payment routes
    pub fn payments() -> Result<Self> {
        let state = Self::new();
        for route in crate::payment_routes() {
            state.add_static(route)?;
        }
        Ok(state)
    }

    /// Add a static route
    pub fn add_static(&self, route: StaticRoute) -> Result<()> {
        let response = route.to_response()?;
        {
            let mut responses = self.static_responses.write();
            if responses.contains_key(&route.handler_id) {
                return Err(Error::DuplicateHandler(route.handler_id));
            }
            responses.insert(route.handler_id, response);
        }
        self.router.write().insert(&route.method, &route.path, route.handler_id);
        Ok(())
    }

    /// Match and handle a request
    pub fn handle(&self, req: &Request) -> Response {
        self.get_static_response(req.method.as_str(), &req.path)
            .unwrap_or_else(Response::not_found)
    }

    /// Get pre-rendered static response if available
    pub fn get_static_response(&self, method: &str, path: &str) -> Option<Response> {
        let matched = self.match_route(method, path)?;
        self.static_responses.read().get(&matched.handler_id).cloned()
    }

    /// Get matched route info
    pub fn match_route(&self, method: &str, path: &str) -> Option<Match> {
        self.router.read().find(method, path)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a listening TCP socket with optimizations
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - disable Nagle's algorithm for lower latency
    socket.set_nodelay(true)?;

    // tokio requires a non-blocking socket
    socket.set_nonblocking(true)?;

    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// Convert a hyper request head to our Request type. The body is left untouched.
pub fn from_hyper_request<B>(req: &hyper::Request<B>) -> Request {
    Request::new(req.method().clone(), req.uri().path())
}

/// Convert our Response to hyper Response
///
/// Headers that are not valid HTTP tokens are dropped.
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut response = hyper::Response::new(Full::new(res.body));
    *response.status_mut() = res.status;

    let headers = response.headers_mut();
    for (name, value) in &res.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }

    response
}

async fn handle_request(
    state: Arc<ServerState>,
    req: hyper::Request<Incoming>,
) -> std::result::Result<hyper::Response<Full<Bytes>>, Infallible> {
    let request = from_hyper_request(&req);
    let response = state.handle(&request);

    tracing::debug!(
        method = %request.method,
        path = %request.path,
        status = response.status.as_u16(),
        "request handled"
    );

    Ok(to_hyper_response(response))
}

// ============================================================================
// Connection Tracking for Graceful Shutdown
// ============================================================================

/// Tracks active connections for graceful shutdown
///
/// Used to:
/// - Count active connections
/// - Broadcast shutdown to the accept loop and every connection task
/// - Wait for existing connections to drain
#[derive(Debug)]
pub struct ConnectionTracker {
    /// Active connection count
    active: AtomicU64,
    /// Flips to true once shutdown starts; never flips back
    shutdown: watch::Sender<bool>,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Create a new connection tracker
    pub fn new() -> Self {
        Self {
            active: AtomicU64::new(0),
            shutdown: watch::channel(false).0,
        }
    }

    /// Count a connection until the returned guard is dropped
    pub fn track(self: &Arc<Self>) -> ConnectionGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            tracker: self.clone(),
        }
    }

    /// Get current active connection count
    #[inline]
    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Signal that shutdown is in progress
    ///
    /// The accept loop stops and every open connection is asked to close
    /// once its current response is written.
    pub fn start_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once shutdown has started, immediately if it already has
    pub async fn shutdown_started(&self) {
        let mut rx = self.shutdown.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|started| *started).await;
    }

    /// Wait for active connections to reach zero
    ///
    /// `Duration::ZERO` waits forever. Returns false if the timeout elapsed
    /// first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let start = Instant::now();

        loop {
            if self.count() == 0 {
                return true;
            }
            if !timeout.is_zero() && start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Keeps a connection counted by its [`ConnectionTracker`]
///
/// Decrements on drop, so a panicking connection task still releases it.
#[derive(Debug)]
pub struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Server
// ============================================================================

/// Bound HTTP server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
    tracker: Arc<ConnectionTracker>,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listener described by `config`
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &ServerConfig, state: Arc<ServerState>) -> Result<Self> {
        let addr = config.socket_addr()?;
        let socket = create_optimized_socket(&addr).map_err(|source| Error::Bind { addr, source })?;
        let listener = TcpListener::from_std(socket.into())?;
        let local_addr = listener.local_addr()?;

        tracing::info!(%local_addr, "payments service listening");

        Ok(Self {
            listener,
            state,
            tracker: Arc::new(ConnectionTracker::new()),
            local_addr,
        })
    }

    /// Address the listener is bound to (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared tracker; calling `start_shutdown` on it stops the server just
    /// like the `shutdown` future passed to [`Server::serve`]
    pub fn tracker(&self) -> Arc<ConnectionTracker> {
        self.tracker.clone()
    }

    /// Accept connections until `shutdown` resolves or the tracker is told
    /// to shut down
    ///
    /// The listener is closed on return. Connections already accepted finish
    /// their current response and then close; idle keep-alive connections
    /// close right away.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            state,
            tracker,
            ..
        } = self;
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    tracker.start_shutdown();
                    break;
                }
                _ = tracker.shutdown_started() => break,
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        // Back off so descriptor exhaustion does not spin the loop
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                },
            };

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(%peer, error = %e, "failed to set TCP_NODELAY");
            }

            let state = state.clone();
            let conn_tracker = tracker.clone();
            let guard = tracker.track();

            tokio::spawn(async move {
                let _guard = guard;
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle_request(state.clone(), req));

                let conn = http1::Builder::new().serve_connection(io, service);
                tokio::pin!(conn);

                let mut closing = false;
                let result = loop {
                    tokio::select! {
                        res = conn.as_mut() => break res,
                        _ = conn_tracker.shutdown_started(), if !closing => {
                            closing = true;
                            conn.as_mut().graceful_shutdown();
                        }
                    }
                };

                if let Err(e) = result {
                    // Clients hanging up mid-request are routine
                    if !e.is_incomplete_message() {
                        tracing::warn!(%peer, error = %e, "connection error");
                    }
                }
            });
        }

        tracing::info!(active = tracker.count(), "shutdown requested, no longer accepting");
    }

    /// Serve until `shutdown` resolves, then wait up to `drain_timeout` for
    /// in-flight connections. Returns true if every connection finished.
    pub async fn serve_with_graceful_shutdown<F>(self, shutdown: F, drain_timeout: Duration) -> bool
    where
        F: Future<Output = ()>,
    {
        let tracker = self.tracker();
        self.serve(shutdown).await;

        let drained = tracker.drain(drain_timeout).await;
        if drained {
            tracing::info!("all connections drained");
        } else {
            tracing::warn!(active = tracker.count(), "drain timeout reached, dropping connections");
        }
        drained
    }
}
