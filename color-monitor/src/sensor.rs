use std::io::{BufRead, BufReader, ErrorKind};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::SerialPort;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::app::UiMessage;
use crate::classifier::{ColorClassifier, Prediction};
use crate::palette;
use crate::parser::{self, RgbReading};

/// Serial link parameters, fixed for the life of the worker.
#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub port_path: String,
    pub baudrate: u32,
}

const READ_TIMEOUT: Duration = Duration::from_secs(1);
const SIMULATION_INTERVAL: Duration = Duration::from_millis(750);

/// Status-line errors are cut to this many characters; the log keeps the
/// full detail.
const STATUS_ERROR_WIDTH: usize = 50;

/// Spawn the device reader. The thread is detached on purpose: it carries no
/// shutdown signal, and the process must be able to exit without waiting on
/// a read that is blocked on the port.
pub fn spawn_reader(
    config: SensorConfig,
    classifier: ColorClassifier,
    updates: UnboundedSender<UiMessage>,
) {
    thread::spawn(move || reader_worker(config, classifier, updates));
}

fn reader_worker(
    config: SensorConfig,
    classifier: ColorClassifier,
    updates: UnboundedSender<UiMessage>,
) {
    info!(
        "opening serial connection to {} at {} baud",
        config.port_path, config.baudrate
    );

    let port = match open_sensor_port(&config) {
        Ok(port) => port,
        Err(e) => {
            error!("failed to open serial connection: {e:#}");
            let _ = updates.send(UiMessage::Error {
                message: format!(
                    "Serial error: {}",
                    truncate(&e.to_string(), STATUS_ERROR_WIDTH)
                ),
            });
            return;
        }
    };

    info!("serial connection established, streaming readings");
    let _ = updates.send(UiMessage::Status {
        message: format!("Connected to sensor at {}", config.port_path),
    });

    // No reconnect: the first fatal read error ends the worker and the UI
    // freezes on its last state.
    if let Err(e) = stream_readings(port, &classifier, &updates) {
        error!("serial read failed: {e}");
        let _ = updates.send(UiMessage::Error {
            message: format!(
                "Serial error: {}",
                truncate(&e.to_string(), STATUS_ERROR_WIDTH)
            ),
        });
    }

    info!("sensor worker exiting");
}

fn open_sensor_port(config: &SensorConfig) -> Result<Box<dyn SerialPort>> {
    serialport::new(&config.port_path, config.baudrate)
        .timeout(READ_TIMEOUT)
        .open()
        .context(format!("failed to open serial port {}", config.port_path))
}

/// Streaming loop: runs until the port fails. Read timeouts and empty reads
/// are normal, and lines that don't carry an RGB triple are dropped without
/// comment.
fn stream_readings(
    port: Box<dyn SerialPort>,
    classifier: &ColorClassifier,
    updates: &UnboundedSender<UiMessage>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(port);

    loop {
        let mut line_buf = String::new();
        match reader.read_line(&mut line_buf) {
            Ok(0) => {
                // No data, continue
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            Ok(_) => {
                let Some(reading) = parser::parse_sensor_line(line_buf.trim()) else {
                    continue;
                };

                let prediction = classifier.predict(&reading);
                info!(
                    "classified RGB({},{},{}) as {} ({:.1}%)",
                    reading.r, reading.g, reading.b, prediction.name, prediction.confidence
                );

                let _ = updates.send(reading_update(&reading, &prediction));
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Build the display update for one classified reading.
///
/// When resolution lands on the fallback gray for a name that isn't actually
/// gray, the raw reading is substituted so a novel class still renders a
/// representative color.
pub fn reading_update(reading: &RgbReading, prediction: &Prediction) -> UiMessage {
    let mut code = palette::resolve(&prediction.name);

    let name = prediction.name.to_ascii_lowercase();
    if code == palette::DEFAULT_GRAY && !name.contains("gray") && !name.contains("grey") {
        code = reading.display_code();
    }

    UiMessage::Reading {
        name: prediction.name.to_uppercase(),
        code,
        status: format!(
            "RGB({},{},{}) - {:.1}% confident",
            reading.r, reading.g, reading.b, prediction.confidence
        ),
    }
}

/// Readings the simulator cycles through, one per trained class.
const SIMULATED_READINGS: &[(u32, u32, u32)] = &[
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 165, 0),
    (128, 0, 128),
    (255, 192, 203),
    (124, 226, 99),
    (0, 100, 0),
    (144, 238, 144),
    (139, 69, 19),
    (0, 255, 255),
    (255, 255, 255),
    (30, 30, 30),
    (128, 128, 128),
];

/// Spawn the simulated sensor: same detached-thread shape as the reader, but
/// the lines come from a fixed cycle instead of a port.
pub fn spawn_simulator(classifier: ColorClassifier, updates: UnboundedSender<UiMessage>) {
    thread::spawn(move || simulator_worker(classifier, updates));
}

fn simulator_worker(classifier: ColorClassifier, updates: UnboundedSender<UiMessage>) {
    info!("starting simulated sensor");
    let _ = updates.send(UiMessage::Status {
        message: "Running in simulation mode".to_string(),
    });

    for &(r, g, b) in SIMULATED_READINGS.iter().cycle() {
        thread::sleep(SIMULATION_INTERVAL);

        // Synthesized lines go through the same parse/classify/resolve path
        // as real sensor output.
        let line = simulated_line(r, g, b);
        let Some(reading) = parser::parse_sensor_line(&line) else {
            continue;
        };
        let prediction = classifier.predict(&reading);
        let _ = updates.send(reading_update(&reading, &prediction));
    }
}

fn simulated_line(r: u32, g: u32, b: u32) -> String {
    format!("Color -> R: {r}  G: {g}  B: {b}  |  HEX: #{r:02X}{g:02X}{b:02X}")
}

/// First `limit` characters of `message`, with an ellipsis when cut.
fn truncate(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let cut: String = message.chars().take(limit).collect();
    format!("{cut}...")
}
