//! rbus-dump
//!
//! Introspects a D-Bus service (bluez by default) on a remote host over SSH
//! and saves the XML definition of every interface it exposes:
//! - one recursive `gdbus introspect` call to discover interfaces
//! - one XML introspection call per interface, written to `<interface>.xml`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use rbus_core::{BusType, DumpConfig};
use rbus_introspection::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "rbus-dump")]
#[command(about = "Save the XML introspection of every interface a D-Bus service exposes")]
struct Args {
    /// SSH host to connect to (defaults to $RBUS_HOST)
    host: Option<String>,

    /// SSH user
    #[arg(short, long)]
    user: Option<String>,

    /// SSH port
    #[arg(short, long)]
    port: Option<u16>,

    /// SSH identity file
    #[arg(short, long)]
    identity: Option<PathBuf>,

    /// Bus name to introspect
    #[arg(long)]
    service: Option<String>,

    /// Object path the tree walk starts from
    #[arg(long)]
    root: Option<String>,

    /// Use the session bus instead of the system bus
    #[arg(long)]
    session: bool,

    /// Directory for the XML files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Introspect the local bus instead of going through SSH
    #[arg(long)]
    local: bool,

    /// Only print the interface -> path mapping
    #[arg(long)]
    list: bool,

    /// Print the mapping or the dump report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Layer command-line flags over `config`.
    fn apply(&self, mut config: DumpConfig) -> DumpConfig {
        if let Some(ref host) = self.host {
            config.host = Some(host.clone());
        }
        if let Some(ref user) = self.user {
            config.user = Some(user.clone());
        }
        if let Some(port) = self.port {
            config.port = Some(port);
        }
        if let Some(ref identity) = self.identity {
            config.identity = Some(identity.clone());
        }
        if let Some(ref service) = self.service {
            config.service = service.clone();
        }
        if let Some(ref root) = self.root {
            config.root = root.clone();
        }
        if self.session {
            config.bus = BusType::Session;
        }
        if let Some(ref output_dir) = self.output_dir {
            config.output_dir = output_dir.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from /etc/rbus/environment (if exists)
    rbus_core::config::load_environment();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rbus_dump=info".parse()?)
                .add_directive("rbus_introspection=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = args.apply(DumpConfig::from_env()?);

    if args.local {
        if config.host.is_some() {
            warn!("--local given, ignoring SSH host");
        }
        info!(service = %config.service, bus = %config.bus, "Introspecting local bus");
        execute(LocalTransport::from_config(&config), &config, &args).await
    } else {
        let transport = SshTransport::from_config(&config)
            .context("a host is required unless --local is given")?;
        info!(
            host = %config.destination().unwrap_or_default(),
            service = %config.service,
            bus = %config.bus,
            "Introspecting remote bus"
        );
        execute(transport, &config, &args).await
    }
}

async fn execute<T: IntrospectionTransport>(
    transport: T,
    config: &DumpConfig,
    args: &Args,
) -> Result<()> {
    let dumper = InterfaceDumper::new(transport, &config.output_dir);

    if args.list {
        let map = dumper.build_map().await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&map)?);
        } else {
            for (interface, path) in &map {
                println!("{} {}", interface, path);
            }
        }
        return Ok(());
    }

    let report = dumper.run().await?;
    info!(
        "Wrote {} interface definitions to {}",
        report.len(),
        dumper.output_dir().display()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "rbus-dump",
            "raspberrypi",
            "-u",
            "pi",
            "-p",
            "2222",
            "--service",
            "org.freedesktop.NetworkManager",
            "--session",
            "-o",
            "/tmp/xml",
        ])
        .unwrap();

        let config = args.apply(DumpConfig {
            host: Some("from-env".to_string()),
            ..Default::default()
        });
        assert_eq!(config.destination().as_deref(), Some("pi@raspberrypi"));
        assert_eq!(config.port, Some(2222));
        assert_eq!(config.service, "org.freedesktop.NetworkManager");
        assert_eq!(config.bus, BusType::Session);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/xml"));
        assert_eq!(config.root, "/");
    }

    #[test]
    fn test_config_kept_without_flags() {
        let args = Args::try_parse_from(["rbus-dump", "--list", "--json"]).unwrap();
        assert!(args.list && args.json && !args.local);

        let env_config = DumpConfig {
            host: Some("bluebox".to_string()),
            root: "/org/bluez".to_string(),
            ..Default::default()
        };
        assert_eq!(args.apply(env_config.clone()), env_config);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Args::try_parse_from(["rbus-dump", "host", "-p", "99999"]).is_err());
    }
}
