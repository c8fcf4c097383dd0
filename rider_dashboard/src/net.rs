use crate::config::{DashboardConfig, TransportKind};
use crate::protocol::LinkEvent;
use crate::transport::{LinkError, Transport};
use crossbeam_channel::{Sender, TrySendError};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CAP: usize = 64;
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// MQTT connection driven on its own thread. Inbound traffic is forwarded to
/// the main loop as `LinkEvent`s; reconnection happens here, never in the core.
pub struct MqttLink {
    client: Client,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl MqttLink {
    pub fn spawn(
        config: &DashboardConfig,
        client_id: &str,
        in_tx: Sender<LinkEvent>,
    ) -> Result<Self, LinkError> {
        let mut options =
            MqttOptions::new(client_id, config.broker_address(), config.transport_port);
        options.set_keep_alive(KEEP_ALIVE);
        if config.transport == TransportKind::WebSocket {
            options.set_transport(rumqttc::Transport::Ws);
        }

        let (client, connection) = Client::new(options, REQUEST_CAP);
        let connected = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        let connected_for_thread = Arc::clone(&connected);
        let shutdown_for_thread = Arc::clone(&shutdown);
        let join_handle = thread::Builder::new()
            .name("mqtt-link".to_string())
            .spawn(move || run_link(connection, in_tx, connected_for_thread, shutdown_for_thread))?;

        info!(broker = %config.broker_address(), client_id, "mqtt link started");

        Ok(Self {
            client,
            connected,
            shutdown,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::Relaxed) {
            return;
        }
        // Wakes the event loop so the thread observes the flag.
        let _ = self.client.disconnect();
        if let Ok(mut h) = self.join_handle.lock() {
            if let Some(h) = h.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Transport for MqttLink {
    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        self.client.try_subscribe(topic, QoS::AtMostOnce)?;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        self.client.try_publish(topic, QoS::AtMostOnce, false, payload)?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

fn run_link(
    mut connection: Connection,
    in_tx: Sender<LinkEvent>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
) {
    let mut backoff = Backoff::default();

    for event in connection.iter() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let forwarded = match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::Relaxed);
                backoff.reset();
                info!("mqtt connected");
                forward(&in_tx, LinkEvent::Connected)
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, bytes = publish.payload.len(), "mqtt message");
                forward(
                    &in_tx,
                    LinkEvent::Message {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    },
                )
            }
            Ok(_) => true,
            Err(e) => {
                let forwarded = if connected.swap(false, Ordering::Relaxed) {
                    warn!(error = %e, "mqtt connection lost");
                    forward(&in_tx, LinkEvent::ConnectionLost { reason: e.to_string() })
                } else {
                    warn!(error = %e, "mqtt connect failed");
                    true
                };
                let retry = backoff.next_delay();
                debug!(retry_in = retry.as_secs(), "mqtt reconnect scheduled");
                sleep_unless_shutdown(retry, &shutdown);
                forwarded
            }
        };
        if !forwarded {
            break;
        }
    }

    connected.store(false, Ordering::Relaxed);
}

/// Returns false once the main loop has gone away.
fn forward(in_tx: &Sender<LinkEvent>, event: LinkEvent) -> bool {
    match in_tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("inbound queue full, dropping link event");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now() + total;
    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(SHUTDOWN_POLL.min(deadline - now));
    }
}

#[derive(Default)]
pub struct Backoff {
    idx: usize,
}

impl Backoff {
    pub fn reset(&mut self) {
        self.idx = 0;
    }

    pub fn next_delay(&mut self) -> Duration {
        let delays = [1, 2, 5, 10];
        let secs = delays.get(self.idx).copied().unwrap_or(10);
        self.idx = (self.idx + 1).min(delays.len());
        Duration::from_secs(secs)
    }
}
