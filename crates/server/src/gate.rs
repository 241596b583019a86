use arena_gameroom::ConnId;
use arena_gameroom::Endpoint;
use arena_gameroom::Intent;
use futures::StreamExt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Front door between sockets and the room.
///
/// Mints connection ids, registers each socket's outbox with the room, and
/// pumps frames both ways. The bridge is deliberately dumb: all protocol
/// understanding lives in the room task.
pub struct Gate {
    intents: UnboundedSender<Intent>,
    counter: AtomicU64,
}

impl Gate {
    pub fn new(intents: UnboundedSender<Intent>) -> Self {
        Self {
            intents,
            counter: AtomicU64::new(0),
        }
    }
    /// Announces a fresh connection to the room and returns its id plus
    /// the stream of frames the room will address to it.
    pub fn admit(&self, endpoint: Endpoint) -> (ConnId, UnboundedReceiver<String>) {
        let conn = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let (outbox, rx) = unbounded_channel();
        let _ = self.intents.send(Intent::Opened {
            conn,
            endpoint,
            outbox,
        });
        (conn, rx)
    }
    /// Spawns the bidirectional pump for one upgraded WebSocket.
    /// Outbound frames win ties so event bursts drain before new input.
    pub fn bridge(
        &self,
        endpoint: Endpoint,
        mut session: actix_ws::Session,
        mut frames: actix_ws::MessageStream,
    ) {
        let (conn, mut rx) = self.admit(endpoint);
        let intents = self.intents.clone();
        log::debug!("[bridge {}] connected to {:?}", conn, endpoint);
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Some(json) => if session.text(json).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = frames.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => {
                            if intents.send(Intent::Frame { conn, text: text.to_string() }).is_err() {
                                break 'sesh;
                            }
                        }
                        Some(Ok(actix_ws::Message::Ping(bytes))) => {
                            if session.pong(&bytes).await.is_err() { break 'sesh }
                        }
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            let _ = intents.send(Intent::Closed { conn });
            let _ = session.close(None).await;
            log::debug!("[bridge {}] disconnected", conn);
        });
    }
}
