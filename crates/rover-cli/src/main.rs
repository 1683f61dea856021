mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{info, warn};

use rover_energy::doctor as energy_doctor;
use rover_energy::predict::{predict_sol_energy, SolModel};
use rover_energy::{ComponentPriority, PowerComponent, PowerManager, Registry, Thresholds, TickReport};
use rover_proto::telemetry::{EventKind, PowerEvent};

use input::{EventSource, SensorEvent};

#[derive(Debug, Parser)]
#[command(name = "roverpwr", version, about = "Rover power budgeting - mode control & priority allocation")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sanity-check the config: thresholds, catalog, forecast model, input.
    Doctor,
    /// Drive the control and prediction loops against the configured input.
    Run,
    /// One-shot advisory forecast for the next sol.
    Predict,
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    thresholds: Option<Thresholds>,
    predict: Option<SolModel>,
    ticks: Option<TicksCfg>,
    components: Option<Vec<ComponentCfg>>,
    input: InputCfg,
}

#[derive(Debug, serde::Deserialize)]
struct TicksCfg {
    control_ms: Option<u64>,
    predict_ms: Option<u64>,
}

#[derive(Debug, serde::Deserialize)]
struct ComponentCfg {
    name: String,
    priority: ComponentPriority,
    nominal_power: f32,
    #[serde(default)]
    essential: bool,
    /// Draw before the first allocation pass; defaults to nominal.
    initial_power: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct InputCfg {
    source: String,
    replay_file: Option<String>,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    Ok(toml::from_str(&s).context("parse config toml")?)
}

fn build_registry(cfg: &Config) -> Registry {
    match &cfg.components {
        None => Registry::default_catalog(),
        Some(comps) => Registry::new(
            comps
                .iter()
                .map(|c| PowerComponent {
                    name: c.name.clone(),
                    priority: c.priority,
                    nominal_power: c.nominal_power,
                    current_power: c.initial_power.unwrap_or(c.nominal_power),
                    is_enabled: true,
                    is_essential: c.essential,
                })
                .collect(),
        ),
    }
}

fn resolve_input(cfg: &InputCfg) -> Result<EventSource> {
    match cfg.source.as_str() {
        "replay-file" => {
            EventSource::file(cfg.replay_file.as_ref().context("input.replay_file missing")?)
        }
        "stdin" => Ok(EventSource::stdin()),
        other => anyhow::bail!("unknown input.source: {}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Run => run(&cfg).await?,
        Command::Predict => predict(&cfg)?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    energy_doctor::check_thresholds(&cfg.thresholds.clone().unwrap_or_default())?;
    energy_doctor::check_catalog(&build_registry(cfg))?;
    energy_doctor::check_sol_model(&cfg.predict.clone().unwrap_or_default())?;
    resolve_input(&cfg.input).map(|_| ())?;

    if let Some(ticks) = &cfg.ticks {
        anyhow::ensure!(ticks.control_ms.unwrap_or(100) > 0, "ticks.control_ms must be positive");
        anyhow::ensure!(ticks.predict_ms.unwrap_or(1000) > 0, "ticks.predict_ms must be positive");
    }

    info!("doctor: OK");
    Ok(())
}

fn predict(cfg: &Config) -> Result<()> {
    let model = cfg.predict.clone().unwrap_or_default();
    energy_doctor::check_sol_model(&model)?;
    let wh = predict_sol_energy(&model);
    println!("predicted net energy for next sol: {:.2} Wh", wh);
    Ok(())
}

fn now_ms() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() as i64 / 1_000_000
}

fn emit(ev: &PowerEvent) {
    match serde_json::to_string(ev) {
        Ok(line) => println!("{}", line),
        Err(e) => warn!("telemetry encode failed: {:#}", e),
    }
}

fn emit_tick(report: &TickReport) {
    if let Some((old, new)) = report.mode_change {
        let mut ev = PowerEvent::new(
            now_ms(),
            EventKind::ModeChange,
            format!("power mode {} -> {}", old, new),
        );
        ev.mode = Some(new.label().to_string());
        emit(&ev);
    }

    let mut ev = PowerEvent::new(
        now_ms(),
        EventKind::Budget,
        format!(
            "balance {:.1} W, consumption {:.1} W",
            report.power_balance, report.power_consumption
        ),
    );
    ev.mode = Some(report.mode.label().to_string());
    ev.available_w = Some(report.available_power);
    emit(&ev);
}

async fn run(cfg: &Config) -> Result<()> {
    info!("run: starting");

    let registry = build_registry(cfg);
    energy_doctor::check_catalog(&registry)?;
    let thresholds = cfg.thresholds.clone().unwrap_or_default();
    energy_doctor::check_thresholds(&thresholds)?;
    let model = cfg.predict.clone().unwrap_or_default();
    energy_doctor::check_sol_model(&model)?;

    let control_ms = cfg.ticks.as_ref().and_then(|t| t.control_ms).unwrap_or(100);
    let predict_ms = cfg.ticks.as_ref().and_then(|t| t.predict_ms).unwrap_or(1000);

    let manager = Arc::new(Mutex::new(PowerManager::new(registry, thresholds)));

    // Sensor events flow in from a background reader task; all state
    // mutation happens under the one manager lock.
    let (tx, mut rx) = mpsc::channel::<SensorEvent>(32);
    let mut src = resolve_input(&cfg.input)?;
    tokio::spawn(async move {
        loop {
            match src.next_event().await {
                Ok(ev) => {
                    if tx.send(ev).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("input source failed: {:#}", e);
                    return;
                }
            }
        }
    });

    let mut control = tokio::time::interval(std::time::Duration::from_millis(control_ms));
    let mut forecast = tokio::time::interval(std::time::Duration::from_millis(predict_ms));

    loop {
        tokio::select! {
            _ = control.tick() => {
                let report = manager.lock().unwrap().tick();
                emit_tick(&report);
            }
            _ = forecast.tick() => {
                let snap = manager.lock().unwrap().snapshot();
                let wh = predict_sol_energy(&model);
                info!(
                    "energy prediction for next sol: {:.2} Wh | SOC: {:.1}% | mode: {}",
                    wh, snap.battery_soc, snap.mode
                );
                let mut ev = PowerEvent::new(
                    now_ms(),
                    EventKind::Forecast,
                    format!(
                        "next sol {:.2} Wh | SOC {:.1}% | mode {}",
                        wh, snap.battery_soc, snap.mode
                    ),
                );
                ev.mode = Some(snap.mode.label().to_string());
                ev.soc_pct = Some(snap.battery_soc);
                ev.predicted_wh = Some(wh);
                emit(&ev);
            }
            Some(sensor_ev) = rx.recv() => {
                apply_sensor_event(&manager, sensor_ev);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("run: shutting down");
                return Ok(());
            }
        }
    }
}

fn apply_sensor_event(manager: &Arc<Mutex<PowerManager>>, ev: SensorEvent) {
    let mut pm = manager.lock().unwrap();
    match ev {
        SensorEvent::BatteryVoltage(v) => match pm.handle_battery_voltage(v) {
            Ok(soc) => {
                let mut out = PowerEvent::new(
                    now_ms(),
                    EventKind::Battery,
                    format!("voltage {:.2} V", v),
                );
                out.soc_pct = Some(soc);
                emit(&out);
            }
            Err(e) => warn!("battery reading rejected: {}", e),
        },
        SensorEvent::SolarPower(w) => {
            if let Err(e) = pm.handle_solar_power(w) {
                warn!("solar reading rejected: {}", e);
            }
        }
        SensorEvent::CmdVel { linear_x, angular_z } => {
            if let Err(e) = pm.handle_velocity(linear_x, angular_z) {
                warn!("velocity command rejected: {}", e);
            }
        }
    }
}
