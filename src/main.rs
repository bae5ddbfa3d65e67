use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rapview::{collectibles::format_thousands, App, Config};

#[derive(Debug, Parser)]
#[command(name = "rapview", about = "Look up a user's collectibles and their Total RAP")]
struct Cli {
    /// YAML config file, every key is optional
    #[arg(long, env = "RAPVIEW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the lookup page (default)
    Serve {
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Run a single lookup and print a summary
    Lookup { user_id: String },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rapview=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Building Runtime {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading Config");
            Config::load(path).await?
        }
        None => Config::default(),
    };

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }

            tracing::info!("Starting");

            let listener = std::net::TcpListener::bind(config.listen)?;
            let app = Arc::new(App::new(config, prometheus::Registry::new())?);

            rapview::server::serve(listener, app, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Waiting for Ctrl-C {:?}", e);
                }
                tracing::info!("Shutting down");
            })
            .await?;
        }
        Command::Lookup { user_id } => {
            let app = App::new(config, prometheus::Registry::new())?;
            let lookup = rapview::lookup::lookup(&app, user_id.trim()).await;

            match &lookup.profile {
                Ok(profile) => println!(
                    "{} ({}) - {}",
                    profile.display_name,
                    profile.handle,
                    profile.status.as_deref().unwrap_or(rapview::render::PLACEHOLDER)
                ),
                Err(_) => println!("{}", rapview::render::PROFILE_ERROR),
            };

            match &lookup.collectibles {
                Ok(summary) if summary.is_empty() => {
                    println!("{}", rapview::render::NO_COLLECTIBLES)
                }
                Ok(summary) => {
                    println!("Total RAP: {}", format_thousands(summary.total_rap));
                    println!("Collectibles Count: {}", summary.total_count);
                    for group in &summary.groups {
                        println!(
                            "  {:>4}x  {:<40} RAP {}",
                            group.quantity,
                            group.item.name.as_deref().unwrap_or("Unknown"),
                            format_thousands(group.item.recent_average_price)
                        );
                    }
                }
                Err(_) => println!("{}", rapview::render::COLLECTIBLES_ERROR),
            };
        }
    };

    Ok(())
}
