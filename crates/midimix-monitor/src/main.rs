//! MIDI Mix monitor
//!
//! Connects to the surface and logs every mixer and transport call the
//! driver would make, without a host attached.
//!
//! ## Command line flags
//!
//! - `--config <path>`: Load driver config from `path` instead of the default location
//! - `--list-ports`: Print available MIDI input ports and exit

use std::path::PathBuf;

use midimix::{LoggingMixer, LoggingTransport, MidiConnection, MidiMixDriver};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let list_ports = args.iter().any(|arg| arg == "--list-ports");
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    // Initialize logger - set RUST_LOG=debug to see decoded controls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if list_ports {
        match MidiConnection::list_input_ports() {
            Ok(ports) if ports.is_empty() => println!("No MIDI input ports found"),
            Ok(ports) => {
                for port in ports {
                    println!("{}", port);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    log::info!("midimix-monitor starting up");

    let mut driver = match MidiMixDriver::new(config_path.as_deref(), LoggingMixer, LoggingTransport)
    {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("Failed to start driver: {}", e);
            std::process::exit(1);
        }
    };

    if !driver.is_connected() {
        log::error!(
            "No MIDI input matching '{}' (use --list-ports to see what is available)",
            driver.config().port_match
        );
        std::process::exit(1);
    }

    log::info!(
        "Listening on '{}', press Ctrl-C to quit",
        driver.port_name().unwrap_or_default()
    );
    driver.run();
}
