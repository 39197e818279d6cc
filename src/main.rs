use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use playlist_converter::flow::select_services;
use playlist_converter::parser::prompt_playlist_id;
use playlist_converter::transfer::print_summary;
use playlist_converter::{
    AuthMode, ClientFactory, Config, PlaylistId, PlaylistTransfer, Prompter, Service, TransferReport,
};

#[derive(Parser)]
#[command(name = "playlist-converter")]
#[command(about = "Copy playlists between Spotify and YouTube")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Match tracks and print the report without creating playlists
    #[arg(long)]
    dry_run: bool,

    /// Paste the authorization code instead of capturing it on a local listener
    #[arg(long, env = "MANUAL_AUTH")]
    manual_auth: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Setup) => show_setup_guide(),
        None => convert(cli.dry_run, cli.manual_auth).await?,
    }

    Ok(())
}

async fn convert(dry_run: bool, manual_auth: bool) -> Result<()> {
    println!("{}", "Playlist Converter".cyan().bold());
    println!("{}", "=".repeat(50));

    if dry_run {
        println!("{}", "DRY RUN MODE - No playlists will be created".yellow());
    }

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if manual_auth {
        config.auth_mode = AuthMode::Prompt;
    }

    // The prompter holds the stdin lock; it must be gone before the auth prompt reads stdin.
    let (source, destination, playlist_id) = {
        let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());

        let (source, destination) = select_services(&mut prompter, config.max_prompt_attempts)
            .context("No valid pair of services was selected")?;

        let missing: Vec<String> = [source, destination]
            .into_iter()
            .flat_map(|service| config.missing_for(service))
            .collect();
        if !missing.is_empty() {
            println!("{}", "Missing configuration:".red());
            for item in &missing {
                println!("   - {}", item);
            }
            println!(
                "\n{}",
                "Please copy .env.example to .env and fill in your credentials, or run `playlist-converter setup`."
                    .yellow()
            );
            std::process::exit(1);
        }

        let playlist_id = prompt_playlist_id(&mut prompter, source, config.max_prompt_attempts)
            .context("No valid playlist link was given")?;

        (source, destination, playlist_id)
    };

    let factory = ClientFactory::new(config);
    let outcome = transfer(&factory, source, destination, &playlist_id, dry_run).await;

    if let Err(e) = factory.logout(&[source, destination]) {
        warn!("Failed to remove cached credentials: {}", e);
    }

    let report = outcome?;
    print_summary(&report);

    if !dry_run && !report.playlist_ids.is_empty() {
        println!("\n{}", "Your playlist has been converted!".green());
    }

    Ok(())
}

async fn transfer(
    factory: &ClientFactory,
    source: Service,
    destination: Service,
    playlist_id: &PlaylistId,
    dry_run: bool,
) -> Result<TransferReport> {
    let reader = factory
        .source(source)
        .await
        .with_context(|| format!("Failed to connect to {}", source))?;
    let writer = factory
        .sink(destination)
        .await
        .with_context(|| format!("Failed to connect to {}", destination))?;

    let report = PlaylistTransfer::new(reader.as_ref(), writer.as_ref())
        .run(playlist_id, dry_run)
        .await
        .context("Playlist transfer failed")?;

    Ok(report)
}

fn show_setup_guide() {
    println!("{}", "Playlist Converter Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");
    println!("   - Add 'http://127.0.0.1:8080/callback' as a redirect URI");

    println!("\n{}", "2. YouTube API Setup".yellow());
    println!("   - Go to https://console.cloud.google.com/");
    println!("   - Create a project and enable the YouTube Data API v3");
    println!("   - Create an OAuth client ID (type: Web application)");
    println!("   - Add 'http://127.0.0.1:8080/callback' as an authorized redirect URI");
    println!("   - Download the client secret JSON as googleClientSecret.json, or copy the ID and secret");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     SPOTIFY_REDIRECT_URI=http://127.0.0.1:8080/callback");
    println!("     YOUTUBE_CLIENT_ID=your_google_client_id");
    println!("     YOUTUBE_CLIENT_SECRET=your_google_client_secret");
    println!("     YOUTUBE_REDIRECT_URI=http://127.0.0.1:8080/callback");
    println!("   - Optional: PLAYLIST_TITLE, CREDENTIALS_DIR, MAX_PROMPT_ATTEMPTS");

    println!("\n{}", "4. Usage".yellow());
    println!("   - playlist-converter --dry-run       (to preview the matches)");
    println!("   - playlist-converter                 (to convert a playlist)");
    println!("   - playlist-converter --manual-auth   (when no browser is available)");

    println!("\n{}", "Ready to start converting!".green());
}
