use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, warn};

use crate::consts;

/// Why a publish did not go out: rejected before send because the connection
/// is down, or reported as failed by the client. Either way the command is
/// dropped, never retried.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("not connected to the broker")]
    NotConnected,
    #[error("publish rejected: {0}")]
    Rejected(String),
}

/// The broker surface the rest of the crate depends on. Best-effort,
/// at-most-once: a `publish` that returns `Ok` means the client accepted the
/// message, not that the controller saw it.
#[allow(async_fn_in_trait)]
pub trait Transport {
    fn is_connected(&self) -> bool;
    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError>;
}

/// Inbound messages forwarded from the broker.
#[derive(Debug)]
pub enum Incoming {
    /// A report on the status topic, already parsed as JSON.
    Status { payload: serde_json::Value },
}

/// First connection phase: holds the event loop until `start` hands it to a
/// background task.
pub struct Initiator {
    client: AsyncClient,
    event_loop: EventLoop,
    connected: Arc<AtomicBool>,
}

impl Initiator {
    pub async fn new(
        id: &str,
        host: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let mut options = MqttOptions::new(id, host, port);
        options.set_keep_alive(Duration::from_secs(5));
        if !username.is_empty() {
            options.set_credentials(username, password);
        }

        let (client, mut event_loop) = AsyncClient::new(options, 10);
        client
            .subscribe(consts::TOPIC_STATUS, QoS::AtMostOnce)
            .await?;

        // Fail early if parameters are invalid.
        if let Err(err) = event_loop.poll().await {
            anyhow::bail!("initial connection to the broker failed: {err}");
        }

        Ok(Self {
            client,
            event_loop,
            connected: Arc::new(AtomicBool::new(true)),
        })
    }

    async fn receiver(
        mut event_loop: EventLoop,
        client: AsyncClient,
        connected: Arc<AtomicBool>,
        queue: mpsc::Sender<Incoming>,
    ) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected.store(true, Ordering::SeqCst);
                    // Subscriptions do not survive a reconnect.
                    if client
                        .subscribe(consts::TOPIC_STATUS, QoS::AtMostOnce)
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    if msg.topic != consts::TOPIC_STATUS {
                        debug!("Ignoring message on unexpected topic {}", msg.topic);
                        continue;
                    }
                    let payload: serde_json::Value = match serde_json::from_slice(&msg.payload) {
                        Ok(value) => value,
                        Err(err) => {
                            warn!("Discarding malformed status message: {err}");
                            continue;
                        }
                    };
                    if queue.send(Incoming::Status { payload }).await.is_err() {
                        // The consuming end is gone.
                        return;
                    }
                }
                Ok(_) => {
                    // Silence acks, pings and outgoing echoes.
                    continue;
                }
                Err(err) => {
                    connected.store(false, Ordering::SeqCst);
                    warn!("Broker connection lost: {err:?}");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Spawn the polling task and return the publish handle plus the inbound
    /// status channel.
    pub fn start(self) -> (Mqtt, mpsc::Receiver<Incoming>) {
        let (tx, rx) = mpsc::channel(10);
        task::spawn(Self::receiver(
            self.event_loop,
            self.client.clone(),
            self.connected.clone(),
            tx,
        ));

        (
            Mqtt {
                client: self.client,
                connected: self.connected,
            },
            rx,
        )
    }
}

/// Running broker connection. Cheap to clone.
#[derive(Clone)]
pub struct Mqtt {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl Mqtt {
    /// Tell the broker we are leaving and mark the connection down.
    pub async fn disconnect(&self) -> anyhow::Result<()> {
        self.client.disconnect().await?;
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Transport for Mqtt {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        if !self.is_connected() {
            return Err(PublishError::NotConnected);
        }
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|err| PublishError::Rejected(err.to_string()))
    }
}
