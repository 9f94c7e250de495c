use clap::Parser;
use firewatch_core::prediction::{self, MlClientConfig, PredictionClient};
use firewatch_core::simulation::{SimulationConfig, SpreadSimulation, TickScheduler};
use firewatch_core::{
    EnvironmentFields, FirePoint, RecordingRenderer, SimulationContext, TracingNotifier, VirtualClock,
    VirtualScheduler, WallClockScheduler,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fire spread dashboard demo with configurable conditions
#[derive(Parser, Debug)]
#[command(name = "firewatch-demo")]
#[command(about = "Headless wildfire spread and risk demo", long_about = None)]
struct Args {
    /// Simulated minutes to run
    #[arg(short, long, default_value_t = 120)]
    minutes: u32,

    /// Speed multiplier (1 = one simulated minute every 2 s)
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Wind speed field, e.g. "15" or "15 km/h"
    #[arg(short, long, default_value = "15 km/h")]
    wind_speed: String,

    /// Wind direction (N, NE, E, SE, S, SW, W, NW)
    #[arg(long, default_value = "NE")]
    wind_direction: String,

    /// Temperature field in °C
    #[arg(short, long, default_value = "32°C")]
    temperature: String,

    /// Relative humidity field in %
    #[arg(long, default_value = "45%")]
    humidity: String,

    /// Ignition latitude
    #[arg(long, default_value_t = 30.0668)]
    lat: f64,

    /// Ignition longitude
    #[arg(long, default_value_t = 79.0193)]
    lng: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Prediction service base URL
    #[arg(long, default_value = "http://localhost:5001")]
    ml_url: String,

    /// Skip the prediction service and use local predictions only
    #[arg(long)]
    offline: bool,

    /// Run on the wall clock instead of a virtual one
    #[arg(long)]
    realtime: bool,

    /// Report interval in simulated minutes
    #[arg(short, long, default_value_t = 10)]
    report_interval: u32,

    /// Refresh the risk prediction every N simulated minutes
    #[arg(long, default_value_t = 60)]
    predict_every: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    println!("=== Fire Watch Demo ===\n");

    let renderer = RecordingRenderer::new();
    let mut ctx = SimulationContext::new()
        .with_map(renderer.clone())
        .with_charts(renderer.clone())
        .with_notifier(TracingNotifier);

    let config = SimulationConfig::default();
    let clock = VirtualClock::new();
    let scheduler: Box<dyn TickScheduler> = if args.realtime {
        Box::new(WallClockScheduler::new())
    } else {
        Box::new(VirtualScheduler::new(clock.clone()))
    };
    let mut sim = match args.seed {
        Some(seed) => SpreadSimulation::with_seed(config, scheduler, seed),
        None => SpreadSimulation::new(config, scheduler),
    };

    sim.set_environment(
        EnvironmentFields::default()
            .with_wind_speed(args.wind_speed.clone())
            .with_wind_direction(args.wind_direction.clone())
            .with_temperature(args.temperature.clone())
            .with_humidity(args.humidity.clone()),
    );
    let env = sim.environment();
    println!(
        "Conditions: wind {} from {}, {}, humidity {}",
        env.wind_speed, env.wind_direction, env.temperature, env.humidity
    );

    let client_config = MlClientConfig::default().with_base_url(args.ml_url.clone());
    let client = if args.offline {
        PredictionClient::offline(client_config)
    } else {
        PredictionClient::new(client_config)
    };

    if !FirePoint::is_valid_location(args.lat, args.lng) {
        return Err(format!("invalid ignition location ({}, {})", args.lat, args.lng).into());
    }
    if args.offline {
        sim.ignite(&mut ctx, args.lat, args.lng);
    } else {
        runtime.block_on(prediction::initialize_ml(&client, &mut ctx));
        runtime.block_on(sim.ignite_with_ml(&mut ctx, &client, args.lat, args.lng));
    }
    println!("Ignition at ({:.4}, {:.4})\n", args.lat, args.lng);

    let source = runtime.block_on(sim.refresh_predictions(&mut ctx, &client));
    info!("Initial risk prediction ({:?})", source);

    sim.set_speed(&mut ctx, args.speed);
    sim.play(&mut ctx);

    println!("Time         | Points | Burned(ha) | Perimeter(km) | Rate(ha/hr) | Sources");
    println!("-------------|--------|------------|---------------|-------------|--------");

    let report_every = args.report_interval.max(1);
    let predict_every = args.predict_every.max(1);
    while sim.elapsed_minutes() < args.minutes {
        if args.realtime {
            runtime.block_on(tokio::time::sleep(Duration::from_millis(50)));
        } else if let Some(interval) = sim.interval() {
            clock.advance(interval);
        }

        let before = sim.elapsed_minutes();
        sim.update(&mut ctx);
        let now = sim.elapsed_minutes();

        for minute in (before + 1)..=now {
            if minute % report_every == 0 {
                let stats = sim.monitoring();
                println!(
                    "{:12} | {:6} | {:10.0} | {:13.1} | {:11.1} | {:7}",
                    sim.elapsed_label(),
                    sim.point_count(),
                    stats.burned_area_ha,
                    stats.perimeter_km,
                    stats.spread_rate_ha_per_hr,
                    stats.active_source_count
                );
            }
        }

        if (before + 1..=now).any(|minute| minute % predict_every == 0) {
            let source = runtime.block_on(sim.refresh_predictions(&mut ctx, &client));
            info!("Risk prediction refreshed ({:?})", source);
        }
    }

    sim.pause();

    println!("\n=== Simulation Complete ===");
    println!("Elapsed: {}", sim.elapsed_label());
    println!("Fire points: {}", sim.point_count());
    println!("Map layers drawn: {} ({} removed)", renderer.layer_count(), renderer.removed_count());
    println!("Chart points: {}", sim.series().len());

    if let Some(prediction) = ctx.predictions.latest() {
        println!(
            "\nRisk: {:.2} ({}, confidence {}){}",
            prediction.ensemble_risk_score,
            prediction.ml_prediction.risk_category,
            prediction.confidence_display(),
            if prediction.is_fallback() { " [local]" } else { "" }
        );
        for recommendation in &prediction.recommendations {
            println!("  - {}", recommendation);
        }
    }
    if let Some(simulation) = ctx.predictions.last_simulation() {
        println!(
            "Service simulation: {} hours, final area {:.1} ha",
            simulation.hourly_progression.len(),
            simulation.final_state.burned_area_hectares
        );
    }

    ctx.teardown();
    Ok(())
}
