use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use axiom_oauth1::{
    collect_printing, ApiResponse, App, AssetLocation, BasicMeasurement, Config, NewAsset,
    StdinVerifier,
};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "axiom-oauth1", version)]
#[command(about = "OAuth1 client for the Deere axiom platform API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the authorization handshake even if a token is stored
    Authorize,
    /// Show a user
    User { username: String },
    /// List the organizations of a user
    Organizations { username: String },
    /// Walk every page of the asset catalog
    AssetTypes,
    /// Walk every page of the files collection
    Files,
    /// List the assets of an organization
    Assets { org_id: String },
    /// Show one asset
    Asset { asset_id: String },
    /// Create a sensor asset in an organization
    CreateAsset {
        org_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Record the current location of an asset
    CreateLocation {
        asset_id: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Measurement name
        #[arg(long, requires_all = ["value", "unit"])]
        name: Option<String>,
        #[arg(long, requires = "name")]
        value: Option<String>,
        #[arg(long, requires = "name")]
        unit: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("axiom_oauth1=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    exit_code(run(cli).await)
}

/// Logs a failed run once and maps it to a nonzero status.
fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::new(Config::from_env()?)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = match cli.command {
        Some(command) => command,
        None if app.has_access_token() => {
            let response = app.current_user().await?;
            return print_response(&response, &mut out);
        }
        None => Command::Authorize,
    };

    let gateway = app.gateway();
    match command {
        Command::Authorize => {
            app.authorize(&mut StdinVerifier, &mut out).await?;
        }
        Command::User { username } => {
            print_response(&gateway.user(&username).await?, &mut out)?;
        }
        Command::Organizations { username } => {
            print_response(&gateway.organizations(&username).await?, &mut out)?;
        }
        Command::AssetTypes => {
            let pages = collect_printing(gateway.asset_types(), &mut out).await?;
            info!(pages = pages.len(), "asset catalog walked");
        }
        Command::Files => {
            let path = app.files_path().await?;
            let pages = collect_printing(gateway.pages(&path), &mut out).await?;
            info!(pages = pages.len(), "files walked");
        }
        Command::Assets { org_id } => {
            print_response(&gateway.assets(&org_id).await?, &mut out)?;
        }
        Command::Asset { asset_id } => {
            print_response(&gateway.asset(&asset_id).await?, &mut out)?;
        }
        Command::CreateAsset {
            org_id,
            title,
            text,
        } => {
            let mut asset = NewAsset::sensor(title, text);
            match &app.config().definition_id {
                Some(definition_id) => {
                    asset = asset.contribution_definition(gateway.platform_root(), definition_id)
                }
                None => warn!("JOHN_DEERE_DEFINITION_ID is not set, asset has no definition"),
            }
            let created = gateway.create_asset(&org_id, &asset).await?;
            print_response(&created.response, &mut out)?;
            if let Some(asset_id) = created.asset_id {
                writeln!(out, "asset id: {}", asset_id)?;
            }
        }
        Command::CreateLocation {
            asset_id,
            lat,
            lon,
            name,
            value,
            unit,
        } => {
            let measurements = match (name, value, unit) {
                (Some(name), Some(value), Some(unit)) => {
                    vec![BasicMeasurement::new(name, value, unit)]
                }
                _ => Vec::new(),
            };
            let location = AssetLocation::point(lat, lon, chrono::Utc::now(), measurements);
            print_response(
                &gateway.create_asset_location(&asset_id, &location).await?,
                &mut out,
            )?;
        }
    }
    Ok(())
}

fn print_response<W: Write>(response: &ApiResponse, out: &mut W) -> Result<()> {
    if !response.is_success() {
        warn!(status = response.status.as_u16(), "platform returned an error status");
    }
    writeln!(out, "{}", response.status)?;
    writeln!(out, "{}", response.body)?;
    Ok(())
}
