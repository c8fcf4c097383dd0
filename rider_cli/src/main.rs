mod commands;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use commands::Command;
use rider_dashboard::pairing::generate_client_id;
use rider_dashboard::protocol::INBOUND_CAP;
use rider_dashboard::recorder::DEFAULT_EXPORT_NAME;
use rider_dashboard::{
    DashboardConfig, FileStore, LoopConfig, MainLoop, MqttLink, SvgSurface, TransportKind,
    UiEvent,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(name = "rider-dashboard", about = "Live power and cadence dials for a paired trainer")]
struct Args {
    /// Broker host; overrides the stored `mqtt_hostname`.
    #[arg(long, env = "RIDER_MQTT_HOST")]
    host: Option<String>,

    #[arg(long, env = "RIDER_MQTT_PORT")]
    port: Option<u16>,

    #[arg(long, env = "RIDER_APP_ID")]
    app_id: Option<String>,

    /// `ws` (default) or `tcp`.
    #[arg(long, env = "RIDER_TRANSPORT")]
    transport: Option<TransportKind>,

    /// Persisted pairing and connection settings.
    #[arg(long, value_name = "PATH", default_value = "rider_store.json")]
    store: PathBuf,

    /// Rewritten with the latest frame as SVG.
    #[arg(long, value_name = "PATH")]
    frame_out: Option<PathBuf>,

    #[arg(long, default_value_t = 10)]
    frame_rate: u32,

    #[arg(long, value_name = "PATH", default_value = DEFAULT_EXPORT_NAME)]
    gpx_out: PathBuf,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 1200.0)]
    height: f64,

    #[arg(long)]
    client_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut store = FileStore::open(&args.store);
    let mut config = DashboardConfig::from_store(&mut store);
    if let Some(host) = args.host.clone() {
        config.transport_host = host;
    }
    if let Some(port) = args.port.filter(|p| *p != 0) {
        config.transport_port = port;
    }
    if let Some(app_id) = args.app_id.clone() {
        config.app_id = app_id;
    }
    if let Some(kind) = args.transport {
        config.transport = kind;
    }
    config.log_summary();

    let client_id = args.client_id.clone().unwrap_or_else(generate_client_id);
    let (in_tx, in_rx) = crossbeam_channel::bounded(INBOUND_CAP);
    let mut link = MqttLink::spawn(&config, &client_id, in_tx)?;

    let loop_config = LoopConfig {
        frame_interval: Duration::from_secs_f64(1.0 / f64::from(args.frame_rate.max(1))),
        width: args.width,
        height: args.height,
        ..LoopConfig::default()
    };
    let mut main_loop = MainLoop::new(
        in_rx,
        Box::new(store),
        config.app_id.clone(),
        client_id.clone(),
        loop_config,
    );
    if main_loop.start(&mut link) {
        info!(trainer = ?main_loop.pairing().paired_id(), "pairing restored");
    }
    info!(%client_id, "dashboard running, type `help` for commands");

    let mut surface = SvgSurface::new();
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = main_loop.tick(&mut link, &mut surface, Instant::now(), Utc::now());
                if report.frame.is_some() {
                    if let Some(path) = &args.frame_out {
                        if let Err(e) = write_atomic(path, &surface.document()) {
                            warn!(path = %path.display(), error = %e, "frame not written");
                        }
                    }
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match commands::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(cmd)) => run_command(cmd, &mut main_loop, &mut link, &args),
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    main_loop
        .recorder()
        .write_gpx(&args.gpx_out)
        .with_context(|| format!("failed to write {}", args.gpx_out.display()))?;
    link.shutdown();
    Ok(())
}

fn run_command(cmd: Command, main_loop: &mut MainLoop, link: &mut MqttLink, args: &Args) {
    match cmd {
        Command::Pair(id) => main_loop.apply_ui(UiEvent::SelectTrainer(id), link),
        Command::Unpair => main_loop.apply_ui(UiEvent::SelectTrainer(String::new()), link),
        Command::Ftp(raw) => main_loop.apply_ui(UiEvent::ThresholdText(raw), link),
        Command::Slider(v) => main_loop.apply_ui(UiEvent::ThresholdSlider(v), link),
        Command::Resize(width, height) => {
            main_loop.apply_ui(UiEvent::Resize { width, height }, link)
        }
        Command::Devices => {
            let devices = main_loop.devices();
            for id in devices.options() {
                let marker = if devices.selected() == Some(id) { "*" } else { " " };
                let label = if id.is_empty() { "(Select Trainer)" } else { id };
                println!("{marker} {label}");
            }
        }
        Command::Status => {
            let s = main_loop.state();
            println!(
                "power {} W / target {}% / ftp {} W | cadence {} / {} rpm | paired {} | {} samples",
                s.current_power(),
                s.target_power(),
                s.threshold_power(),
                s.current_cadence(),
                s.target_cadence(),
                main_loop.pairing().paired_id().unwrap_or("-"),
                main_loop.recorder().samples().len(),
            );
        }
        Command::Export(path) => {
            let path = path.unwrap_or_else(|| args.gpx_out.clone());
            if let Err(e) = main_loop.recorder().write_gpx(&path) {
                eprintln!("export failed: {e}");
            }
        }
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("svg.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
