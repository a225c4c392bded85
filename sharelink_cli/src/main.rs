use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sharelink_lib::log::LogLevel;
use sharelink_lib::{Client, Inbound, LinkBuilder, DEFAULT_FALLBACK_DOMAIN};

#[derive(Parser)]
#[command(name = "sharelink", about = "Generate share links from persisted inbound records")]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, value_parser = parse_log_level, default_value = "warning")]
    loglevel: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build links for clients of one inbound record
    Links {
        /// Inbound record file (.json or .json5)
        inbound: PathBuf,

        /// Separate client record file; defaults to the clients embedded
        /// in the inbound's settings
        #[arg(short, long)]
        client: Option<PathBuf>,

        /// Only emit links for this client email
        #[arg(short, long)]
        email: Option<String>,

        /// Advertised host used when the config resolves nothing better
        #[arg(long, default_value = DEFAULT_FALLBACK_DOMAIN)]
        fallback_domain: String,

        /// Emit full link bundles as JSON instead of bare links
        #[arg(long)]
        json: bool,
    },
}

fn parse_log_level(raw: &str) -> Result<LogLevel, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .map_err(|_| format!("unknown log level: {raw}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    sharelink_lib::log::init(Some(cli.loglevel), None)?;

    match cli.command {
        Command::Links {
            inbound,
            client,
            email,
            fallback_domain,
            json,
        } => links(inbound, client, email, fallback_domain, json),
    }
}

fn links(
    inbound_path: PathBuf,
    client_path: Option<PathBuf>,
    email: Option<String>,
    fallback_domain: String,
    json: bool,
) -> Result<()> {
    let inbound = Inbound::from_file(&inbound_path)
        .with_context(|| format!("reading inbound record {}", inbound_path.display()))?;

    let builder = LinkBuilder::new(fallback_domain);
    let links = builder.for_inbound(&inbound);

    let mut clients = match client_path {
        Some(path) => {
            let client = Client::from_file(&path)
                .with_context(|| format!("reading client record {}", path.display()))?;
            vec![client]
        }
        None => links.clients(),
    };

    if let Some(email) = email.as_deref() {
        clients.retain(|client| client.email.as_deref() == Some(email));
    }

    if clients.is_empty() {
        bail!("no matching clients in {}", inbound_path.display());
    }

    let bundles: Vec<_> = clients.iter().map(|client| links.build(client)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&bundles)?);
    } else {
        for bundle in &bundles {
            println!("{}", bundle.config_text);
        }
    }

    Ok(())
}
