//! Stdio server loop.
//!
//! The loop is strictly sequential: read a line, dispatch it, write the
//! response, then read the next line. A request (including its store round
//! trip) always completes before the next one is read.
//!
//! ```text
//! Idle ──▶ Reading ──▶ Dispatching ──▶ Writing ──▶ Idle
//!             │
//!             └── EOF ──▶ Stopped
//! ```
//!
//! Lines that are not UTF-8 or not JSON are logged to stderr and skipped
//! without a reply, since no request id can be recovered from them.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{parse_message, IncomingMessage, ParseFailure};
use crate::mcp::transport::{LineTransport, StdioTransport};

/// Server state in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for the next line.
    Idle,
    /// Input closed or shutdown requested.
    Stopped,
}

/// The MCP server: a dispatcher bound to a line transport.
pub struct McpServer<R, W> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: LineTransport<R, W>,
    /// Request router.
    dispatcher: Dispatcher,
}

impl McpServer<tokio::io::BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Creates a server on the process's standard streams.
    #[must_use]
    pub fn stdio(dispatcher: Dispatcher) -> Self {
        Self::new(dispatcher, StdioTransport::stdio())
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let interrupted = tokio::select! {
            result = self.serve() => {
                result?;
                false
            }
            () = shutdown_signal() => true,
        };

        if interrupted {
            self.state = ServerState::Stopped;
        }
        Ok(())
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over an arbitrary transport.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher, transport: LineTransport<R, W>) -> Self {
        Self {
            state: ServerState::Idle,
            transport,
            dispatcher,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Consumes the server, returning its transport.
    pub fn into_transport(self) -> LineTransport<R, W> {
        self.transport
    }

    /// Serves requests until the input is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails. Malformed input is not
    /// an error.
    pub async fn serve(&mut self) -> std::io::Result<()> {
        while self.state != ServerState::Stopped {
            let Some(frame) = self.transport.read_frame().await? else {
                tracing::info!("Input closed, stopping server");
                self.state = ServerState::Stopped;
                break;
            };

            let line = match String::from_utf8(frame) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unparsable input line");
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            self.handle_line(&line).await?;
        }
        Ok(())
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        let parsed = parse_message(line);
        if let Ok(message) = &parsed {
            tracing::trace!(method = message.method(), id = ?message.id(), "Message received");
        }

        match parsed {
            Ok(IncomingMessage::Request(req)) => {
                let response = self.dispatcher.handle(&req);
                self.transport.write_message(&response).await
            }
            Ok(IncomingMessage::Notification(notif)) => {
                tracing::debug!(method = %notif.method, "Notification received");
                Ok(())
            }
            Err(ParseFailure::Invalid(response)) => {
                tracing::warn!(id = ?response.id, "Invalid JSON-RPC request");
                self.transport.write_message(&response).await
            }
            Err(ParseFailure::Unparsable(reason)) => {
                tracing::warn!(error = %reason, "Discarding unparsable input line");
                Ok(())
            }
        }
    }
}

/// Resolves when the process is asked to stop.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut sigint), Ok(mut sigterm)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        tracing::warn!("Could not install signal handlers; running until input closes");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// Resolves when the process is asked to stop.
#[cfg(windows)]
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    } else {
        std::future::pending::<()>().await;
    }
}
