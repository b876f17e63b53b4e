//! Conway Torus CLI - Run lattice experiments from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use conway_torus::{
    compute::{CentroidTracker, EquilibriumDetector, Lattice, StepEngine},
    export::{
        OscillatorArchive, save_centroids, save_column, save_displacements, save_summary,
    },
    schema::{EquilibriumConfig, ExperimentConfig, GliderConfig, TraceConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Run Game of Life experiments from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to experiment configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: ExperimentConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = fs::create_dir_all(&config.output_dir) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }

    if let Some(trace) = &config.trace {
        run_trace(trace);
    }
    if let Some(equilibrium) = &config.equilibrium {
        run_equilibrium(equilibrium, &config.output_dir);
    }
    if let Some(glider) = &config.glider {
        run_glider(glider, &config.output_dir);
    }
}

fn run_trace(config: &TraceConfig) {
    println!("Population Trace");
    println!("================");
    println!("Lattice: {}x{}", config.size, config.size);
    println!("Steps: {}", config.steps);
    println!();

    let mut lattice = Lattice::from_seed(&config.seed, config.size);
    let mut engine = StepEngine::new(config.size);

    println!("  Generation 0: population={}", lattice.population());
    engine.run_with_callback(&mut lattice, config.steps, |l| {
        println!("  Generation {}: population={}", l.generation(), l.population());
    });
    println!();
}

fn run_equilibrium(config: &EquilibriumConfig, output_dir: &Path) {
    println!("Equilibrium Measurement");
    println!("=======================");
    println!("Lattice: {}x{}", config.size, config.size);
    println!("Trials: {}", config.trials);
    println!(
        "Window: {} (max period {}, notable above {})",
        config.window, config.max_period, config.notable_period
    );
    match config.max_steps {
        Some(cap) => println!("Step cap: {}", cap),
        None => println!("Step cap: none (unsettled trials run indefinitely)"),
    }
    println!();

    let mut detector = EquilibriumDetector::new(config.clone()).unwrap_or_else(|e| {
        eprintln!("Invalid equilibrium configuration: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let report = detector
        .run_with_callback(|outcome| {
            println!(
                "  Measurement {}: settled after {} steps, population {:.2}, window {:?}",
                outcome.trial, outcome.settling_time, outcome.settled_population, outcome.window
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Equilibrium run failed: {}", e);
            std::process::exit(1);
        });
    let elapsed = start.elapsed();

    let result = (|| -> std::io::Result<usize> {
        save_column(
            output_dir.join("equilibrium_active.csv"),
            &report.settled_populations(),
        )?;
        save_column(
            output_dir.join("equilibrium_times.csv"),
            &report.settling_times(),
        )?;
        save_summary(output_dir.join("equilibrium_summary.json"), &report.summary())?;

        let mut archive = OscillatorArchive::new().with_output_dir(output_dir)?;
        for oscillator in report.oscillators() {
            archive.add(oscillator);
        }
        Ok(archive.save_all()?.len())
    })();

    let saved = result.unwrap_or_else(|e| {
        eprintln!("Error writing equilibrium results: {}", e);
        std::process::exit(1);
    });

    let summary = report.summary();
    println!();
    println!("Summary:");
    println!("  Mean settling time: {:.2}", summary.mean_settling_time);
    println!("  Max settling time: {}", summary.max_settling_time);
    println!(
        "  Mean settled population: {:.3}",
        summary.mean_settled_population
    );
    println!("  Periods: {:?}", summary.periods);
    println!("  Notable oscillators saved: {}", saved);
    println!("Time: {:.2}s", elapsed.as_secs_f32());
    println!();
}

fn run_glider(config: &GliderConfig, output_dir: &Path) {
    println!("Glider Drift Measurement");
    println!("========================");
    println!("Lattice: {}x{}", config.size, config.size);
    println!("Steps: {}", config.steps);
    println!("Unwrap: {:?}", config.unwrap);
    println!();

    let mut tracker = CentroidTracker::from_config(config).unwrap_or_else(|e| {
        eprintln!("Invalid glider configuration: {}", e);
        std::process::exit(1);
    });

    let report = tracker.track(config.steps).unwrap_or_else(|e| {
        eprintln!("Tracking failed: {}", e);
        std::process::exit(1);
    });

    let result = save_centroids(output_dir.join("glider_centroids.csv"), &report.centroids)
        .and_then(|_| {
            save_displacements(
                output_dir.join("glider_displacements.csv"),
                &report.displacements,
            )
        })
        .and_then(|_| save_summary(output_dir.join("glider_summary.json"), &report.summary()));

    if let Err(e) = result {
        eprintln!("Error writing glider results: {}", e);
        std::process::exit(1);
    }

    println!(
        "Velocity: ({:.6}, {:.6})",
        report.velocity.row, report.velocity.col
    );
    println!("Speed: {:.6}", report.speed);
    println!(
        "This would be correct in a continuous space, but the game of life runs on a discrete \
         lattice. The norm of the velocity is not the speed of the glider."
    );
}

fn print_example_config() {
    let config = ExperimentConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example config: {}", e),
    }
}
