//! Touchscreen WebSocket Server
//!
//! Bridges the front end to the orchestrator. Each connection gets the
//! current screen snapshot, then every render command as it is issued.
//! Intents from the front end are forwarded to the orchestrator's queue.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::session::events::EventSender;
use crate::session::render::BroadcastSurface;

/// Time allowed to flush the last messages to a closing connection.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// UI server errors.
#[derive(Debug, thiserror::Error)]
pub enum UiServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// WebSocket bridge for touchscreen front ends.
pub struct UiServer {
    bind_addr: SocketAddr,
    surface: Arc<BroadcastSurface>,
    events: EventSender,
    connections: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
}

impl UiServer {
    /// Server pushing `surface`'s commands and posting intents to `events`.
    pub fn new(bind_addr: SocketAddr, surface: Arc<BroadcastSurface>, events: EventSender) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            bind_addr,
            surface,
            events,
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self), fields(addr = %self.bind_addr))]
    pub async fn run(&self) -> Result<(), UiServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), UiServerError> {
        info!("UI server listening on {}", listener.local_addr()?);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            info!("Front end connected from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("UI server stopping");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let surface = self.surface.clone();
        let events = self.events.clone();
        let connections = self.connections.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };
            connections.fetch_add(1, Ordering::SeqCst);

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = ws_sender.close().await;
            });

            // Bring the new front end up to the current screen
            let (snapshot, mut render_rx) = surface.subscribe();
            for command in snapshot {
                let _ = msg_tx.send(command.into()).await;
            }

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let client_msg = match ClientMessage::from_json(&text) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        let _ = msg_tx.send(ServerMessage::Error {
                                            message: format!("Invalid message: {}", e),
                                        }).await;
                                        continue;
                                    }
                                };
                                if let ClientMessage::Ping { timestamp } = client_msg {
                                    let _ = msg_tx.send(ServerMessage::Pong {
                                        timestamp,
                                        server_time: chrono::Utc::now().timestamp_millis().max(0) as u64,
                                    }).await;
                                    continue;
                                }
                                if let Some(event) = client_msg.into_event() {
                                    if events.send(event).is_err() {
                                        warn!("Orchestrator gone, closing {}", addr);
                                        break;
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Front end {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    command = render_rx.recv() => {
                        match command {
                            Ok(command) => {
                                if msg_tx.send(command.into()).await.is_err() {
                                    break;
                                }
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                warn!("Front end {} lagged, {} commands skipped", addr, skipped);
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Kiosk shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            drop(msg_tx);
            if tokio::time::timeout(FLUSH_TIMEOUT, sender_task).await.is_err() {
                debug!("Gave up flushing {}", addr);
            }
            connections.fetch_sub(1, Ordering::SeqCst);
            info!("Front end {} cleaned up", addr);
        });
    }

    /// Stop accepting and close every connection.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Open front-end connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::{channel, KioskEvent};
    use crate::session::render::{RenderCommand, ScreenId, Surface};
    use tokio_tungstenite::connect_async;

    async fn start() -> (Arc<UiServer>, SocketAddr, Arc<BroadcastSurface>, crate::session::EventReceiver) {
        let surface = Arc::new(BroadcastSurface::new(16));
        let (tx, rx) = channel();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(UiServer::new(addr, surface.clone(), tx));
        let serving = server.clone();
        tokio::spawn(async move { serving.serve(listener).await });
        (server, addr, surface, rx)
    }

    async fn next_server_message<S>(ws: &mut S) -> ServerMessage
    where
        S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(text) => return ServerMessage::from_json(&text).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_then_live_commands() {
        let (server, addr, surface, _rx) = start().await;
        surface.render(RenderCommand::SetScreen { screen: ScreenId::Welcome });

        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        assert_eq!(
            next_server_message(&mut ws).await,
            ServerMessage::Render { command: RenderCommand::SetScreen { screen: ScreenId::Welcome } }
        );

        // Wait for the subscription before rendering again
        while surface.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        surface.render(RenderCommand::Countdown { value: 3 });
        assert_eq!(
            next_server_message(&mut ws).await,
            ServerMessage::Render { command: RenderCommand::Countdown { value: 3 } }
        );
        server.shutdown();
    }

    #[tokio::test]
    async fn test_intents_reach_orchestrator() {
        let (server, addr, _surface, mut rx) = start().await;
        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        ws.send(Message::Text(r#"{"type":"proceed"}"#.into())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"answer","option":1}"#.into())).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), KioskEvent::Proceed);
        assert_eq!(rx.recv().await.unwrap(), KioskEvent::Answer { option: 1 });
        server.shutdown();
    }

    #[tokio::test]
    async fn test_bad_message_and_ping() {
        let (server, addr, _surface, mut rx) = start().await;
        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        ws.send(Message::Text("garbage".into())).await.unwrap();
        assert!(matches!(next_server_message(&mut ws).await, ServerMessage::Error { .. }));

        ws.send(Message::Text(r#"{"type":"ping","timestamp":7}"#.into())).await.unwrap();
        assert!(matches!(next_server_message(&mut ws).await, ServerMessage::Pong { timestamp: 7, .. }));

        assert!(rx.try_recv().is_err());
        server.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_notifies_front_end() {
        let (server, addr, _surface, _rx) = start().await;
        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        while server.connection_count() == 0 {
            tokio::task::yield_now().await;
        }
        server.shutdown();
        assert!(matches!(next_server_message(&mut ws).await, ServerMessage::Shutdown { .. }));
    }
}
