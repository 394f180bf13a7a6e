//! Example demonstrating live, layered properties.
//!
//! This example shows how to:
//! - Layer a YAML file under in-memory overrides
//! - Bind typed props with defaults, validation and secrets
//! - Observe refreshed values without restarting
//! - Pin a prop to a single source
//!
//! Run with: cargo run --example live_props

use hotswap_props::converters::{DurationConverter, ListConverter, ParseConverter, StringConverter};
use hotswap_props::prelude::*;
use hotswap_props::sources::FileSource;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Live Props Example ===\n");

    let dir = std::env::temp_dir().join("hotswap-props-demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("service.yaml");
    std::fs::write(
        &path,
        r#"
server:
  port: 8080
  timeout: 5s
  allowed_hosts: [alpha.internal, beta.internal]
database:
  password: s3cr3t
"#,
    )?;

    let overrides = Arc::new(InMemorySource::new());

    let registry = PropRegistry::builder()
        .with_source("FILE", FileSource::new(&path))
        .with_source("OVERRIDES", Arc::clone(&overrides))
        .refresh_interval(Duration::from_secs(1))
        .build()?;

    println!("Sources by priority: {:?}\n", registry.source_ids());

    let port = registry
        .prop_with("server.port", ParseConverter::<u16>::new())
        .required(true)
        .validate_on_set(|port: &u16| {
            if *port < 1024 {
                return Err(ValidationError::invalid_value("server.port", "privileged port"));
            }
            Ok(())
        })
        .build()
        .await?;

    let timeout = registry
        .prop_with("server.timeout", DurationConverter)
        .default_value(Duration::from_secs(30))
        .build()
        .await?;

    let hosts = registry
        .prop_with(
            "server.allowed_hosts",
            ListConverter::new(StringConverter, ","),
        )
        .description("Hosts allowed to connect")
        .build()
        .await?;

    let password = registry
        .prop("database.password")
        .secret(true)
        .source("FILE")?
        .build()
        .await?;

    println!("Initial values:");
    println!("  port:     {:?}", port.get()?);
    println!("  timeout:  {:?}", timeout.get()?);
    println!("  hosts:    {:?}", hosts.get()?);
    println!("  password: {}", password);
    println!();

    println!("--- Overriding server.port and database.password in memory ---");
    overrides.set("server.port", "9090");
    overrides.set("database.password", "ignored");
    tokio::time::sleep(Duration::from_millis(1500)).await;

    println!("  port:     {:?}", port.get()?);
    println!("  password: {} (pinned to FILE)", password);
    println!("  layers for server.port: {:?}", registry.resolve_layers("server.port"));
    println!();

    println!("--- Trying a privileged port ---");
    overrides.set("server.port", "80");
    let updated = registry.refresh().await;
    println!("  props updated: {}", updated);
    println!("  port kept at:  {:?}", port.get()?);
    println!();

    println!("--- Removing the override ---");
    overrides.remove("server.port");
    registry.refresh().await;
    println!("  port:     {:?}", port.get()?);

    registry.close().await;
    std::fs::remove_file(&path)?;

    println!("\n=== Example Complete ===");
    Ok(())
}
