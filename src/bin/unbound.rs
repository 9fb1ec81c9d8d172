use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use tracing::info;
use unbound_overrides::{
    config::{AppConfig, default_config_path},
    endpoint::Endpoint,
    plan,
    unbound::Unbound,
};

#[derive(Parser, Debug)]
#[command(
    name = "unbound",
    author,
    version,
    about = "Manage OPNsense Unbound DNS host overrides",
    rename_all = "kebab-case"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true, value_name = "PATH", default_value_os_t = default_config_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show existing overrides
    Read,
    /// Create or repoint overrides, e.g. --host a.example.com --target 10.0.0.3
    Upsert {
        /// FQDN of an override (repeat, paired with --target by position)
        #[arg(long = "host", value_name = "FQDN")]
        hosts: Vec<String>,
        /// Address for the host at the same position
        #[arg(long = "target", value_name = "ADDR")]
        targets: Vec<String>,
    },
    /// Delete overrides by name
    Delete {
        /// FQDN of an override to delete (repeat for multiple values)
        #[arg(long = "host", value_name = "FQDN")]
        hosts: Vec<String>,
    },
    /// Interactively generate a config file
    Configure,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Configure => {
            init_tracing("info");
            configure(&cli.config)?;
        }
        Command::Read => {
            let provider = connect(&cli.config)?;
            let found = provider.read().await.context("read records")?;
            print_endpoints(&mut io::stdout().lock(), &found)?;
        }
        Command::Upsert { hosts, targets } => {
            let wanted = plan::host_mappings(&hosts, &targets)?;
            let provider = connect(&cli.config)?;
            let existing = provider
                .read()
                .await
                .context("unable to read existing records")?;
            let changes = plan::upsert_changes(&existing, wanted);
            provider.apply(&changes).await.context("apply failed")?;
        }
        Command::Delete { hosts } => {
            let wanted = plan::host_set(&hosts)?;
            let provider = connect(&cli.config)?;
            info!(?wanted, "want to delete");
            let existing = provider
                .read()
                .await
                .context("check existing records")?;
            let changes = plan::delete_changes(&existing, &wanted);
            if !changes.has_changes() {
                println!("No changes needed for delete");
                return Ok(());
            }
            provider.apply(&changes).await.context("apply changes")?;
        }
    }

    Ok(())
}

/// Load the config, start logging at its level and build the provider.
fn connect(config_path: &Path) -> Result<Unbound> {
    let config = AppConfig::load(config_path).context("configuration")?;
    init_tracing(&config.log_directive());
    Unbound::from_config(&config).context("failed to build OPNsense client")
}

fn configure(default_path: &Path) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("config file path")
        .default(default_path.display().to_string())
        .interact_text()?;
    let path = PathBuf::from(path.trim_end());
    println!("{:?} will be used to output the generated config", path);

    let mut config = AppConfig::default();
    config.opnsense.base_url = Input::new()
        .with_prompt("OPNsense BaseURL")
        .interact_text()?;
    config.opnsense.creds = Input::new()
        .with_prompt("OPNsense credentials (apiKey:apiSecret)")
        .interact_text()?;
    config.validate().context("invalid config")?;

    config
        .write_to(&path)
        .with_context(|| format!("write config {}", path.display()))?;
    Ok(())
}

fn print_endpoints(out: &mut impl Write, endpoints: &[Endpoint]) -> io::Result<()> {
    const HEADER: (&str, &str, &str) = ("DNS Name", "Target", "Record Type");

    let rows: Vec<(&str, String, String)> = endpoints
        .iter()
        .map(|ep| {
            (
                ep.dns_name.as_str(),
                ep.targets.join(" "),
                ep.record_type.to_string(),
            )
        })
        .collect();
    let name_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(HEADER.0.len());
    let target_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(HEADER.1.len());

    writeln!(out)?;
    writeln!(out, "{:<name_w$}     {:<target_w$}     {}", HEADER.0, HEADER.1, HEADER.2)?;
    for (name, target, kind) in rows {
        writeln!(out, "{:<name_w$}     {:<target_w$}     {}", name, target, kind)?;
    }
    Ok(())
}

fn init_tracing(default_directive: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}
