use clap::Parser;
use copytube::{CopyConfig, RunOutcome};
use std::path::PathBuf;
use yt_data_client::DEFAULT_API_ADDRESS;
use yt_oauth::{FlowMode, InstalledAppFlow};

/// CopyTube - Copy a public YouTube playlist of up to 195 videos into a new
/// private playlist on your channel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the OAuth client secrets JSON downloaded from the Google Cloud console
    #[arg(long, default_value = "client_secret.json")]
    client_secrets: PathBuf,

    /// Path to file containing the developer API key
    #[arg(long)]
    api_key_path: Option<PathBuf>,

    /// Reuse an unexpired OAuth token from this file, saving new tokens there
    #[arg(long)]
    token_path: Option<PathBuf>,

    /// How the authorization code is collected
    #[arg(long, value_enum, default_value_t = FlowMode::Console)]
    oauth_flow: FlowMode,

    /// Refuse plain-http redirect URIs and OAuth endpoints
    #[arg(long)]
    strict_transport: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let api_key = if let Some(api_key_path) = &args.api_key_path {
        tracing::info!(path = %api_key_path.display(), "reading API key");
        let key = std::fs::read_to_string(api_key_path)
            .map_err(|e| {
                format!(
                    "Failed to read API key file '{}': {}",
                    api_key_path.display(),
                    e
                )
            })?
            .trim()
            .to_string();
        Some(key)
    } else {
        None
    };

    // Get REST API address from environment variable or use default
    let api_address =
        std::env::var("REST_API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let config = CopyConfig {
        api_address,
        api_key,
        client_secrets: args.client_secrets,
    };

    // Loopback OAuth redirects are plain http; allowed unless told otherwise.
    let authenticator = InstalledAppFlow::new(args.oauth_flow)
        .allow_insecure_transport(!args.strict_transport)
        .token_cache(args.token_path);

    let outcome = copytube::run(
        &config,
        &authenticator,
        &mut std::io::stdin(),
        &mut std::io::stdout(),
    )
    .await?;

    if let RunOutcome::Copied(summary) = outcome {
        tracing::info!(
            source = %summary.source,
            playlist_id = %summary.playlist_id,
            inserted = summary.inserted,
            "copy complete"
        );
    }

    Ok(())
}
