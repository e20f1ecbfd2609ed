//! Headless operator console for a running economic simulation
//!
//! Wires the settings store, telemetry link, and dashboard state together,
//! logs one indicator line per inbound tick, and accepts control commands
//! on stdin:
//!
//! ```text
//! start | stop | reset | status | quit
//! speed <steps-per-second>
//! manual on|off
//! set income_tax|corp_tax|ubi <value>
//! models
//! model <name>
//! ```

use ecosim_monitor_core::{
    metrics, ActionField, ConnectionStatus, DashboardState, LinkEvent, RegistryClient,
    SettingsStore, TelemetryLink, TrendDirection,
};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_STREAM_ENDPOINT: &str = "ws://127.0.0.1:8000/ws";
const DEFAULT_REGISTRY_BASE: &str = "http://127.0.0.1:8000";
const DEFAULT_SETTINGS_PATH: &str = "ecosim-console.json";

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const USAGE: &str = "Usage: ecosim-monitor [--endpoint <ws-url>] [--registry <http-url>] \
                     [--settings <path>] [--start]";

struct Options {
    endpoint: String,
    registry: String,
    settings_path: String,
    autostart: bool,
}

/// A line of operator intent read from stdin.
enum ConsoleCommand {
    Start,
    Stop,
    Reset,
    Status,
    Speed(f64),
    Manual(bool),
    Set(ActionField, f64),
    Models,
    Model(String),
    Quit,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        error!(error = %err, "monitor exited");
        std::process::exit(1);
    }
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        endpoint: DEFAULT_STREAM_ENDPOINT.to_string(),
        registry: DEFAULT_REGISTRY_BASE.to_string(),
        settings_path: DEFAULT_SETTINGS_PATH.to_string(),
        autostart: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--endpoint" => {
                options.endpoint = args.next().ok_or("--endpoint requires a value")?;
            }
            "--registry" => {
                options.registry = args.next().ok_or("--registry requires a value")?;
            }
            "--settings" => {
                options.settings_path = args.next().ok_or("--settings requires a value")?;
            }
            "--start" => options.autostart = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(options)
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let settings = SettingsStore::open(&options.settings_path)?;

    let registry = match RegistryClient::new(&options.registry) {
        Ok(registry) => Some(registry),
        Err(err) => {
            warn!(error = %err, "invalid registry base; model management disabled");
            None
        }
    };

    // Fire-and-forget: an unreachable registry never blocks monitoring
    if let Some(registry) = &registry {
        match registry.models() {
            Ok(models) => info!(?models, "model registry reachable"),
            Err(err) => warn!(error = %err, "model registry unavailable"),
        }
        if let Some(name) = settings.selected_model() {
            match registry.activate(name) {
                Ok(detail) => info!(model = name, %detail, "activated persisted model"),
                Err(err) => warn!(model = name, error = %err, "failed to activate persisted model"),
            }
        }
    }

    let link = TelemetryLink::connect(&options.endpoint)?;
    let mut dashboard = DashboardState::new(settings, link.command_channel());
    let console = spawn_console_reader();
    let mut pending_start = options.autostart;

    info!(endpoint = %options.endpoint, "monitoring simulation stream");

    loop {
        if let Some(event) = link.poll_event(EVENT_POLL_INTERVAL) {
            let frame_arrived = matches!(event, LinkEvent::Frame(_));
            dashboard.handle_event(event);
            if frame_arrived {
                report_tick(&dashboard);
            }
        }

        if pending_start && dashboard.connection_status().is_open() {
            if dashboard.start() {
                pending_start = false;
                info!("simulation started");
            }
        }

        loop {
            match console.try_recv() {
                Ok(command) => {
                    if dispatch(command, &mut dashboard, registry.as_ref())? {
                        link.close();
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // stdin closed; keep monitoring without a console
                    break;
                }
            }
        }
    }
}

/// Apply one console command. Returns true when the operator asked to
/// quit.
fn dispatch(
    command: ConsoleCommand,
    dashboard: &mut DashboardState,
    registry: Option<&RegistryClient>,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        ConsoleCommand::Start => {
            if !dashboard.start() {
                warn!("cannot start: link is offline");
            }
        }
        ConsoleCommand::Stop => {
            if !dashboard.stop() {
                warn!("cannot stop: link is offline");
            }
        }
        ConsoleCommand::Reset => {
            dashboard.reset();
            info!("history cleared; simulation reset requested");
        }
        ConsoleCommand::Status => report_status(dashboard),
        ConsoleCommand::Speed(value) => {
            dashboard.set_speed(value)?;
            info!(value, "speed updated");
        }
        ConsoleCommand::Manual(enabled) => {
            dashboard.set_manual(enabled)?;
            info!(enabled, "manual override");
        }
        ConsoleCommand::Set(field, value) => {
            dashboard.set_action_field(field, value)?;
            let action = dashboard.settings().manual_action();
            info!(
                income_tax = action.income_tax,
                corp_tax = action.corp_tax,
                ubi = action.ubi,
                "manual action updated"
            );
        }
        ConsoleCommand::Models => match registry {
            Some(registry) => match registry.models() {
                Ok(models) => info!(?models, "available models"),
                Err(err) => warn!(error = %err, "model registry unavailable"),
            },
            None => warn!("model management disabled"),
        },
        ConsoleCommand::Model(name) => {
            dashboard.select_model(&name)?;
            match registry {
                Some(registry) => match registry.activate(&name) {
                    Ok(detail) => info!(model = %name, %detail, "model activated"),
                    Err(err) => warn!(model = %name, error = %err, "model activation failed"),
                },
                None => warn!("model selection saved, but model management is disabled"),
            }
        }
        ConsoleCommand::Quit => return Ok(true),
    }
    Ok(false)
}

fn spawn_console_reader() -> Receiver<ConsoleCommand> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || read_console_lines(tx))
        .expect("failed to spawn console reader");
    rx
}

fn read_console_lines(tx: Sender<ConsoleCommand>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => return,
        };
        match parse_console_line(line.trim()) {
            Ok(Some(command)) => {
                if tx.send(command).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
}

fn parse_console_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };

    let command = match verb {
        "start" => ConsoleCommand::Start,
        "stop" => ConsoleCommand::Stop,
        "reset" => ConsoleCommand::Reset,
        "status" => ConsoleCommand::Status,
        "quit" | "exit" => ConsoleCommand::Quit,
        "models" => ConsoleCommand::Models,
        "model" => {
            let name = parts.next().ok_or("model requires a name")?;
            ConsoleCommand::Model(name.to_string())
        }
        "speed" => {
            let value = parse_number(parts.next(), "speed")?;
            ConsoleCommand::Speed(value)
        }
        "manual" => match parts.next() {
            Some("on") => ConsoleCommand::Manual(true),
            Some("off") => ConsoleCommand::Manual(false),
            _ => return Err("manual requires on|off".to_string()),
        },
        "set" => {
            let field = match parts.next() {
                Some("income_tax") => ActionField::IncomeTax,
                Some("corp_tax") => ActionField::CorpTax,
                Some("ubi") => ActionField::Ubi,
                _ => return Err("set requires income_tax|corp_tax|ubi <value>".to_string()),
            };
            let value = parse_number(parts.next(), "set")?;
            ConsoleCommand::Set(field, value)
        }
        other => return Err(format!("unknown command: {other}")),
    };

    Ok(Some(command))
}

fn parse_number(raw: Option<&str>, verb: &str) -> Result<f64, String> {
    raw.ok_or_else(|| format!("{verb} requires a numeric value"))?
        .parse::<f64>()
        .map_err(|_| format!("{verb} requires a numeric value"))
}

fn report_tick(dashboard: &DashboardState) {
    let Some(snapshot) = dashboard.current_snapshot() else {
        return;
    };

    let real_gdp: Vec<f64> = dashboard.history().series(|s| s.real_gdp).collect();
    let trend = metrics::trend(&real_gdp);
    let arrow = match trend.direction {
        TrendDirection::Up => "↑",
        TrendDirection::Down => "↓",
        TrendDirection::Neutral => "→",
    };

    info!(
        step = snapshot.step,
        real_gdp = %format!("{:.0} {} {:+.1}%", snapshot.real_gdp, arrow, trend.percent),
        unemployment = %format!("{:.1}%", snapshot.unemployment * 100.0),
        avg_price = %format!("{:.2}", snapshot.avg_price),
        gini = %format!("{:.3}", snapshot.gini),
        "tick"
    );
}

fn report_status(dashboard: &DashboardState) {
    let action = dashboard.active_action();
    info!(
        connection = %dashboard.connection_status(),
        running = dashboard.is_running(),
        history = dashboard.history().len(),
        dropped_frames = dashboard.dropped_frames(),
        manual = dashboard.settings().manual_mode(),
        income_tax = action.income_tax,
        corp_tax = action.corp_tax,
        ubi = action.ubi,
        "console status"
    );
}
