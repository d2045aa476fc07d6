//! Websocket client for the live job log.

use futures::StreamExt;
use jobwatch_core::{RenderSurface, Terminal, TransportEvent};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors raised while opening the log stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection cancelled")]
    Cancelled,
}

/// A live websocket connection delivering job log lines.
pub struct LogStream {
    url: String,
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl LogStream {
    pub async fn connect(url: &str) -> Result<Self, StreamError> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| StreamError::Connection(format!("Failed to connect to {}: {e}", url)))?;

        info!(target: "jobwatch::stream", "Connected to {}", url);
        Ok(Self {
            url: url.to_string(),
            ws,
        })
    }

    /// Feed frames into `terminal` until the server closes the connection,
    /// the transport fails, or `cancel` fires.
    ///
    /// The terminal always sees `Connected` first and `Closed` last. A
    /// transport error is reported once and ends the stream.
    pub async fn run<S: RenderSurface>(
        mut self,
        terminal: &mut Terminal<S>,
        cancel: &CancellationToken,
    ) {
        terminal.handle(TransportEvent::Connected);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(target: "jobwatch::stream", "Closing {}", self.url);
                    if let Err(e) = self.ws.close(None).await {
                        debug!(target: "jobwatch::stream", "Close handshake failed: {}", e);
                    }
                    break;
                }
                frame = self.ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        terminal.handle(TransportEvent::Message(text));
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        terminal.handle(TransportEvent::Message(text));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(
                            target: "jobwatch::stream",
                            "Server closed {}: {:?}", self.url, frame
                        );
                        // The close reply is queued; polling flushes it and
                        // ends once the handshake completes.
                        while let Some(Ok(_)) = self.ws.next().await {}
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(target: "jobwatch::stream", "Stream error on {}: {}", self.url, e);
                        terminal.handle(TransportEvent::Error(e.to_string()));
                        break;
                    }
                    None => break,
                },
            }
        }

        terminal.handle(TransportEvent::Closed);
        info!(
            target: "jobwatch::stream",
            "Disconnected from {} after {} lines",
            self.url,
            terminal.lines_seen()
        );
    }
}

/// Connect to `url` and stream it into `terminal`.
///
/// A failed connection is shown in the terminal as an error line followed by
/// the closed line, the same way a dropped connection is.
pub async fn watch_log<S: RenderSurface>(
    url: &str,
    terminal: &mut Terminal<S>,
    cancel: &CancellationToken,
) {
    let connected = tokio::select! {
        _ = cancel.cancelled() => Err(StreamError::Cancelled),
        result = LogStream::connect(url) => result,
    };

    match connected {
        Ok(stream) => stream.run(terminal, cancel).await,
        Err(StreamError::Cancelled) => {
            debug!(target: "jobwatch::stream", "Connection to {} cancelled", url);
        }
        Err(e) => {
            warn!(target: "jobwatch::stream", "{}", e);
            terminal.handle(TransportEvent::Error(e.to_string()));
            terminal.handle(TransportEvent::Closed);
        }
    }
}
