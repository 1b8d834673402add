mod app;
mod classifier;
mod palette;
mod parser;
mod sensor;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::app::App;
use crate::classifier::ColorClassifier;
use crate::sensor::SensorConfig;

const DEFAULT_BAUDRATE: u32 = 9600;
const DEFAULT_MODEL_PATH: &str = "color_model.json";
const DEFAULT_LABELS_PATH: &str = "color_labels.json";
const LOG_PATH: &str = "color-monitor.log";

fn get_default_serial_port() -> String {
    #[cfg(target_os = "macos")]
    {
        "/dev/tty.usbmodem14101".to_string()
    }
    #[cfg(target_os = "linux")]
    {
        "/dev/ttyACM0".to_string()
    }
    #[cfg(target_os = "windows")]
    {
        "COM13".to_string()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        panic!("Unsupported OS for default serial port")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The UI owns the terminal, so diagnostics go to a file.
    tracing_subscriber::fmt()
        .with_writer(std::fs::File::create(LOG_PATH)?)
        .with_ansi(false)
        .init();

    info!("starting color-monitor");

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let simulation_mode = args.contains(&"--sim".to_string()) || args.contains(&"-s".to_string());

    // Parse serial port (--serial-port <path>)
    let serial_port = if let Some(pos) = args.iter().position(|a| a == "--serial-port" || a == "-p")
    {
        args.get(pos + 1).map(|s| s.to_string())
    } else {
        None
    }
    .unwrap_or_else(get_default_serial_port);

    // Parse baudrate (--baudrate <rate>)
    let baudrate = if let Some(pos) = args.iter().position(|a| a == "--baudrate" || a == "-b") {
        args.get(pos + 1)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_BAUDRATE)
    } else {
        DEFAULT_BAUDRATE
    };

    // Parse model artifact paths (--model <path>, --labels <path>)
    let model_path = if let Some(pos) = args.iter().position(|a| a == "--model") {
        args.get(pos + 1).map(PathBuf::from)
    } else {
        None
    }
    .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

    let labels_path = if let Some(pos) = args.iter().position(|a| a == "--labels") {
        args.get(pos + 1).map(PathBuf::from)
    } else {
        None
    }
    .unwrap_or_else(|| PathBuf::from(DEFAULT_LABELS_PATH));

    // The model is required before anything is shown; a broken artifact is
    // fatal here, not a status-line condition.
    let classifier = match ColorClassifier::load(&model_path, &labels_path) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("failed to load the color classifier: {e:#}");
            eprintln!("Failed to load the color classifier: {e:#}");
            eprintln!("Make sure you have:");
            eprintln!("  - {} (model weights)", model_path.display());
            eprintln!("  - {} (label vocabulary)", labels_path.display());
            return Err(e);
        }
    };
    info!(
        "classifier loaded with {} color classes: {}",
        classifier.labels().len(),
        classifier.labels().join(", ")
    );

    // Create app state and the worker -> UI update channel
    let mut app = App::new(simulation_mode);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    if simulation_mode {
        sensor::spawn_simulator(classifier, tx);
    } else {
        let config = SensorConfig {
            port_path: serial_port,
            baudrate,
        };
        sensor::spawn_reader(config, classifier, tx);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = ui::run_app(&mut terminal, &mut app, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if app.interrupted {
        println!("Program stopped by user. Goodbye!");
    }

    info!("color-monitor exiting");
    result
}
