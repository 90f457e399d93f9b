use clap::Parser;
use std::path::PathBuf;
use yt_oauth::{Authenticator, FlowMode, InstalledAppFlow, YOUTUBE_FORCE_SSL_SCOPE};

/// OAuth 2.0 helper tool: authorize once and save the token for later runs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the OAuth client secrets JSON downloaded from the Google Cloud console
    #[arg(long, default_value = "client_secret.json")]
    client_secrets: PathBuf,

    /// Path to save the OAuth token file
    #[arg(long, required = true)]
    token_path: PathBuf,

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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // A fresh authorization is always requested, so no cache is consulted.
    let flow = InstalledAppFlow::new(args.oauth_flow)
        .allow_insecure_transport(!args.strict_transport);
    let token = flow
        .authenticate(&args.client_secrets, &[YOUTUBE_FORCE_SSL_SCOPE])
        .await?;

    token.save_to_file(&args.token_path)?;

    eprintln!("\nOAuth token saved to: {}", args.token_path.display());
    eprintln!("You can now pass --token-path to copytube");

    Ok(())
}
