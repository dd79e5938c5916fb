use anyhow::{Context, Result};
use clap::Parser;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing::{info, warn};
use wildfire_spread_core::feeds::load_firms_csv;
use wildfire_spread_core::{
    geo_point, ClockEvent, EngineConfig, GeoPoint, RecordContext, SeedConfiguration,
    SimulationClock, SimulationError, TickReport, WeatherState,
};

/// Wildfire spread simulation without a map
#[derive(Parser, Debug)]
#[command(name = "wildfire-spread-demo")]
#[command(about = "Point-based wildfire spread simulation", long_about = None)]
struct Args {
    /// Air temperature in °C
    #[arg(short, long, default_value_t = 25.0)]
    temperature: f64,

    /// Relative humidity in %
    #[arg(long, default_value_t = 50.0)]
    humidity: f64,

    /// Wind speed in km/h
    #[arg(short, long, default_value_t = 10.0)]
    wind_speed: f64,

    /// Wind direction in degrees (0=North, 90=East)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f64,

    /// Multiplier on per-tick spread distance
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Fire point as `lat,lng` (repeatable); defaults to the map centre
    #[arg(short, long = "fire", value_parser = parse_fire)]
    fires: Vec<GeoPoint>,

    /// Seed for the spread jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks before the run stops on its own
    #[arg(short, long)]
    duration: Option<u32>,

    /// Milliseconds between ticks in realtime mode
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Wait the tick interval between ticks instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Engine config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repeat the run stored in this record file
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the run record here when the run stops
    #[arg(long)]
    save: Option<PathBuf>,

    /// Satellite detections CSV to show alongside the run
    #[arg(long)]
    firms: Option<PathBuf>,

    /// Volunteer name stored in the record
    #[arg(long, default_value = "")]
    volunteer: String,

    /// Label stored in the record
    #[arg(long)]
    name: Option<String>,
}

fn parse_fire(value: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got `{value}`"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude `{lat}`: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude `{lng}`: {e}"))?;
    Ok(geo_point(lat, lng))
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(duration) = args.duration {
        config.clock.auto_stop_duration = duration;
    }
    if let Some(interval) = args.tick_interval_ms {
        config.clock.tick_interval_ms = interval;
    }
    Ok(config)
}

/// Log user-level rejections and carry on; anything else aborts the run.
fn allow_rejection<T>(result: Result<T, SimulationError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_user_rejection() => {
            warn!("{e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &TickReport) {
    let metrics = &report.metrics;
    println!(
        "{:>4}  {:>6}  {:>6}  {:>4}  {:>10}",
        report.elapsed, metrics.population, metrics.active_count, metrics.fire_risk, metrics.volunteers
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    println!("=== Wildfire Spread Simulation ===\n");

    let config = engine_config(&args)?;
    let mut clock = SimulationClock::new(config, args.seed)?;
    let context = RecordContext {
        volunteer_name: args.volunteer.clone(),
        name: args.name.clone(),
        ..RecordContext::default()
    };

    if let Some(path) = &args.firms {
        let detections =
            load_firms_csv(path).with_context(|| format!("reading detections {}", path.display()))?;
        println!("Reference detections: {}", detections.len());
        for detection in detections.iter().take(5) {
            println!(
                "  ({:.4}, {:.4}) on {}",
                detection.lat, detection.lng, detection.date
            );
        }
        println!();
    }

    if let Some(path) = &args.load {
        let mut seed = SeedConfiguration::load(path)
            .with_context(|| format!("loading run {}", path.display()))?;
        if let Some(duration) = args.duration {
            seed.duration = duration;
        }
        info!("Repeating {} seed fronts from {}", seed.initial_fires.len(), path.display());
        clock.repeat(seed)?;
    } else {
        clock.set_weather(WeatherState::new(
            args.temperature,
            args.humidity,
            args.wind_speed,
            args.wind_direction,
            args.speed,
        ))?;

        let fires = if args.fires.is_empty() {
            vec![geo_point(context.coordinates.lat, context.coordinates.lng)]
        } else {
            args.fires.clone()
        };
        for position in fires {
            allow_rejection(clock.add_fire(position))?;
        }
        clock.start()?;
    }

    let weather = clock.state().weather;
    println!(
        "Weather: {:.1}°C, {:.0}% humidity, wind {:.1} km/h heading {} ({:.0}°), speed ×{}",
        weather.temperature.value(),
        weather.humidity.value(),
        weather.wind_speed.value(),
        weather.wind_direction_label(),
        weather.wind_direction.value(),
        weather.simulation_speed
    );
    println!(
        "Seed fronts: {}, auto-stop after {} ticks\n",
        clock.state().initial_fires.len(),
        clock.state().auto_stop_duration
    );
    println!("tick  fronts  active  risk  volunteers");

    let hook = |report: &TickReport| {
        print_report(report);
        ControlFlow::Continue(())
    };
    let event = if args.realtime {
        clock.run_realtime(hook)
    } else {
        clock.run_to_completion(hook)
    };

    match event {
        Some(ClockEvent::AutoStop) => println!("\nRun complete after {} ticks", clock.state().elapsed),
        Some(ClockEvent::ManualStop) => println!("\nRun stopped after {} ticks", clock.state().elapsed),
        None => println!("\nRun did not start"),
    }

    let metrics = clock.metrics();
    println!("\nFronts: {} ({} active)", metrics.population, metrics.active_count);
    for fire in clock.state().fires.iter().filter(|fire| fire.active).take(10) {
        let [r, g, b] = fire.heat_color();
        println!(
            "  {:<24} ({:.4}, {:.4})  intensity {:.2}  area {:.1}  rgb({}, {}, {})",
            fire.id.as_str(),
            fire.lat(),
            fire.lng(),
            fire.intensity,
            fire.area(),
            r,
            g,
            b
        );
    }

    println!("\nAdvisories:");
    for advisory in &metrics.advisories {
        println!("  - {advisory}");
    }

    if let Some(path) = &args.save {
        if let Some(record) = allow_rejection(clock.record(&context))? {
            record
                .save(path)
                .with_context(|| format!("saving run record {}", path.display()))?;
            println!("\nRecord saved to {}", path.display());
        }
    }

    Ok(())
}
