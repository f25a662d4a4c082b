//! Read a full snapshot from a fan and print it.
//!
//! Usage: `cargo run --example read_device -- AA:BB:CC:DD:EE:FF [authcode]`

use std::env;

use freshvent_core::{BleConnector, SnapshotReader};
use freshvent_types::AuthCode;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freshvent_core=debug".into()),
        )
        .init();

    let mut args = env::args().skip(1);
    let identity = args.next().unwrap_or_else(|| "Intellivent SKY".to_string());

    let connector = BleConnector::first_adapter().await?;
    let mut reader = SnapshotReader::new(connector);
    if let Some(code) = args.next() {
        reader = reader.with_auth_code(AuthCode::from_hex(&code)?);
    }

    println!("Reading {identity}...");
    let snapshot = reader.read_snapshot(&identity).await?;

    println!("Name:         {}", snapshot.name.as_deref().unwrap_or("-"));
    println!("Model:        {}", snapshot.model);
    println!(
        "Manufacturer: {}",
        snapshot.manufacturer.as_deref().unwrap_or("-")
    );
    println!(
        "Firmware:     {}",
        snapshot.fw_version.as_deref().unwrap_or("-")
    );

    if let Some(sensors) = snapshot.sensors {
        println!("Mode:         {} ({} rpm)", sensors.mode, sensors.rpm);
        println!("Temperature:  {:.1} °C", sensors.temperature);
        match sensors.humidity {
            Some(h) => println!("Humidity:     {h:.1}%"),
            None => println!("Humidity:     no reading"),
        }
        println!("Authenticated: {}", sensors.authenticated);
    }

    if let Some(boost) = snapshot.modes.boost {
        println!(
            "Boost:        {} ({} rpm, {} s)",
            if boost.enabled { "on" } else { "off" },
            boost.rpm,
            boost.seconds
        );
    }

    Ok(())
}
