use crossbeam_channel::{bounded, RecvTimeoutError};
use rand::Rng;
use rider_dashboard::config::{DashboardConfig, TransportKind};
use rider_dashboard::protocol::{self, subscription, topic, InboundMessage, LinkEvent};
use rider_dashboard::router;
use rider_dashboard::transport::Transport;
use rider_dashboard::MqttLink;
use std::time::{Duration, Instant};
use trainer_protocol::{suffix, DeviceList, MeasuredCadence, MeasuredPower};

const DEFAULT_TRAINER_ID: &str = "mock-trainer-1";
const PUBLISH_EVERY: Duration = Duration::from_secs(1);
const POLL: Duration = Duration::from_millis(50);

fn parse_arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

struct Trainer {
    id: String,
    ftp: f64,
    cadence: f64,
}

impl Trainer {
    fn telemetry(&self, rng: &mut impl Rng) -> [InboundMessage; 2] {
        let power = (self.ftp * 0.85 + rng.gen_range(-15.0..15.0)).max(0.0).round();
        let cadence = (self.cadence + rng.gen_range(-4.0..4.0)).max(0.0).round();
        [
            InboundMessage::SetMeasuredPower(MeasuredPower {
                uuid_trainer: Some(self.id.clone()),
                measured_power: power,
            }),
            InboundMessage::SetMeasuredCadence(MeasuredCadence {
                uuid_trainer: Some(self.id.clone()),
                measured_cadence: cadence,
            }),
        ]
    }
}

fn publish(link: &mut MqttLink, app_id: &str, msg: &InboundMessage) {
    let payload = match msg.encode() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("encode failed: {e}");
            return;
        }
    };
    if let Err(e) = link.publish(&topic(app_id, msg.kind().suffix()), payload) {
        eprintln!("publish failed: {e}");
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut config = DashboardConfig::default();
    if let Some(host) = parse_arg_value(&args, "--host") {
        config.transport_host = host;
    }
    if let Some(port) = parse_arg_value(&args, "--port").and_then(|s| s.parse().ok()) {
        config.transport_port = port;
    }
    if let Some(app_id) = parse_arg_value(&args, "--app-id") {
        config.app_id = app_id;
    }
    if let Some(kind) = parse_arg_value(&args, "--transport").and_then(|s| s.parse::<TransportKind>().ok()) {
        config.transport = kind;
    }
    let run_for_ms = parse_arg_value(&args, "--run-for-ms")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis);

    let mut trainer = Trainer {
        id: parse_arg_value(&args, "--trainer-id").unwrap_or_else(|| DEFAULT_TRAINER_ID.to_string()),
        ftp: 200.0,
        cadence: 88.0,
    };

    let (in_tx, in_rx) = bounded(protocol::INBOUND_CAP);
    let client_id = format!("mock_trainer_{}", trainer.id);
    let mut link = match MqttLink::spawn(&config, &client_id, in_tx) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!(
        "mock_trainer {} on {} ({})",
        trainer.id,
        config.broker_address(),
        config.app_id
    );

    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut next_publish = start + PUBLISH_EVERY;
    loop {
        match in_rx.recv_timeout(POLL) {
            Ok(LinkEvent::Connected) => {
                if let Err(e) = link.subscribe(&subscription(&config.app_id)) {
                    eprintln!("subscribe failed: {e}");
                }
            }
            Ok(LinkEvent::ConnectionLost { reason }) => eprintln!("connection lost: {reason}"),
            Ok(LinkEvent::Message { topic, payload }) => {
                if topic.rsplit('/').next() == Some(suffix::LIST_DEVICES) {
                    let reply = InboundMessage::DeviceList(DeviceList {
                        device_list: vec![trainer.id.clone()],
                    });
                    publish(&mut link, &config.app_id, &reply);
                } else if let Ok(Some(InboundMessage::SetFtp(p))) =
                    router::decode(&config.app_id, &topic, &payload)
                {
                    if p.uuid_trainer.as_deref() == Some(trainer.id.as_str()) && p.ftp > 0.0 {
                        println!("ftp -> {}", p.ftp);
                        trainer.ftp = p.ftp;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        if now >= next_publish {
            next_publish = now + PUBLISH_EVERY;
            if link.is_connected() {
                for msg in trainer.telemetry(&mut rng) {
                    publish(&mut link, &config.app_id, &msg);
                }
            }
        }

        if let Some(max) = run_for_ms {
            if start.elapsed() >= max {
                break;
            }
        }
    }

    link.shutdown();
}
