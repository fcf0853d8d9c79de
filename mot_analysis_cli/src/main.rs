//! # mot_analysis_cli
//!
//! Part of the mot_analysis crate family.
//!
//! Command line application for analyzing MOT camera shot data. Point it at a
//! YAML configuration and it runs the configured analysis, rendering plots and
//! videos to the configured output directory.
//!
//! ## Use
//!
//! Write a template configuration:
//!
//! ```bash
//! mot_analysis_cli -p config.yml new
//! ```
//!
//! Edit the paths, crop bounds, and analysis mode, then run it:
//!
//! ```bash
//! mot_analysis_cli -p config.yml
//! ```
use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libmot_analysis::config::Config;
use libmot_analysis::process::process;

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could not create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("mot_analysis_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );

        make_template_config(&config_path);
        log::info!("Done.");
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    log::info!("Analysis: {}", config.analysis.name());
    log::info!("Data Path: {}", config.data_path.to_string_lossy());
    log::info!("Output Path: {}", config.output_path.to_string_lossy());
    log::info!("Frame Dataset: {}", config.frame_dataset);
    match &config.crop {
        Some(crop) => log::info!(
            "Crop Region: rows {}..{} cols {}..{}",
            crop.top,
            crop.bottom,
            crop.left,
            crop.right
        ),
        None => log::info!("Crop Region: full frame"),
    }
    log::info!("Experiment Name: {}", config.experiment);

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let status = Arc::new(Mutex::new(0.0f32));
    let sent_status = status.clone();
    // Spawn the task!
    let handle = std::thread::spawn(|| process(config, sent_status));

    loop {
        // Ugh since we don't have a UI here, I manually sleep for ~ 1 sec before trying to update
        std::thread::sleep(std::time::Duration::from_secs(1));
        match status.lock() {
            Ok(stat) => pb.set_position((*stat * 100.0) as u64),
            Err(e) => log::error!("{e}"),
        }

        if handle.is_finished() {
            match handle.join() {
                Ok(result) => match result {
                    Ok(report) => log::info!(
                        "Successfully analyzed {} shot(s)!",
                        report.shots_processed
                    ),
                    Err(e) => log::error!("Analysis failed with error: {e}"),
                },
                Err(_) => log::error!("Failed to join analysis task!"),
            }
            break;
        }
    }

    pb.finish();

    log::info!("Done.");
}
