use super::connection::{self, ConnectionLimits};
use crate::dispatcher::Dispatcher;
use may::coroutine::{self, JoinHandle};
use may::net::TcpListener;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

/// Coroutine-per-connection HTTP/1.1 listener in front of a [`Dispatcher`].
pub struct HttpServer<S> {
    dispatcher: Dispatcher<S>,
    limits: ConnectionLimits,
    stack_size: usize,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it,
/// or joining the accept coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to, with the real port when `:0` was requested.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the server address by attempting TCP connections until successful.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` error if the server doesn't become ready within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting connections.
    ///
    /// Cancels the accept coroutine and waits for it to finish. Connections
    /// already accepted run to completion on their own coroutines.
    pub fn stop(self) {
        // SAFETY: may::CoroutineHandle::coroutine().cancel() is marked unsafe by the may runtime.
        // The handle is owned here, so the coroutine is still valid, and cancellation
        // only unwinds the accept loop.
        #[allow(unsafe_code)]
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            debug!(addr = %self.addr, "Accept coroutine ended by cancellation");
        }
        info!(addr = %self.addr, "Server stopped accepting connections");
    }

    /// Block until the accept coroutine finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<S: Send + Sync + 'static> HttpServer<S> {
    #[must_use]
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self {
            dispatcher,
            limits: ConnectionLimits::default(),
            stack_size: may::config().get_stack_size(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ConnectionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Stack size for connection coroutines.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Bind `addr` and start accepting connections.
    ///
    /// Each accepted connection is served on its own coroutine; the accept
    /// loop applies no throttling beyond the listen backlog.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;

        info!(
            addr = %addr,
            routes_count = self.dispatcher.table().len(),
            stack_size = self.stack_size,
            max_head_bytes = self.limits.max_head_bytes,
            max_body_bytes = self.limits.max_body_bytes,
            "Server listening"
        );

        // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
        // The closure owns everything it touches (listener, dispatcher, limits) and is
        // Send + 'static, so no references outlive their owners.
        #[allow(unsafe_code)]
        let handle = unsafe {
            coroutine::Builder::new()
                .name("switchyard-accept".to_string())
                .spawn(move || self.accept_loop(listener))
        }?;

        Ok(ServerHandle { addr, handle })
    }

    fn accept_loop(self, listener: TcpListener) {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    continue;
                }
            };
            let accepted_at = SystemTime::now();
            let remote = stream.peer_addr().ok();
            if let Some(timeout) = self.limits.read_timeout {
                if let Err(e) = stream.set_read_timeout(Some(timeout)) {
                    debug!(remote = ?remote, error = %e, "Failed to set read timeout");
                }
            }
            debug!(remote = ?remote, "Connection accepted");

            let dispatcher = self.dispatcher.clone();
            let limits = self.limits;
            // SAFETY: see `start`; the connection closure owns its stream and dispatcher.
            #[allow(unsafe_code)]
            let spawned = unsafe {
                coroutine::Builder::new()
                    .stack_size(self.stack_size)
                    .spawn(move || {
                        connection::serve(&mut stream, remote, &dispatcher, &limits, accepted_at);
                    })
            };
            if let Err(e) = spawned {
                error!(
                    remote = ?remote,
                    error = %e,
                    stack_size = self.stack_size,
                    "Failed to spawn connection coroutine - CRITICAL"
                );
            }
        }
    }
}
