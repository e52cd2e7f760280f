use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::LevelFilter;

use slck::domain::traits::Acceptor;
use slck::{Config, Server, TcpAcceptor};

#[derive(Parser)]
#[command(name = "slck")]
#[command(about = "A line-oriented chat server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run {
        /// Address to listen and serve on (overrides config)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { addr } => {
            let (mut config, warning) = load_config(&cli.config);
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            init_logging(&config.logging.level);
            if let Some(warning) = warning {
                tracing::warn!("{}", warning);
            }

            if let Err(e) = run_server(config) {
                tracing::error!("Server failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("slck v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

/// Load the config file, falling back to env/defaults. Logging is not up
/// yet, so a fallback is reported back to the caller.
fn load_config(path: &str) -> (Config, Option<String>) {
    if !std::path::Path::new(path).exists() {
        return (Config::load_env(), None);
    }
    match Config::load(path) {
        Ok(mut config) => {
            config.apply_env();
            (config, None)
        }
        Err(e) => (
            Config::load_env(),
            Some(format!("Failed to load config: {}, using defaults", e)),
        ),
    }
}

fn init_logging(level: &str) {
    let default_level: tracing::Level = level.parse().unwrap_or(tracing::Level::INFO);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn run_server(config: Config) -> Result<(), slck::application::errors::ServerError> {
    config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let acceptor = TcpAcceptor::bind(config.server.addr.as_str()).await?;
        tracing::info!("listen and serve on {}", acceptor.local_addr()?);

        let shutdown = CancellationToken::new();
        let ctrl_c = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            }
            ctrl_c.cancel();
        });

        Server::new(config).run(acceptor, shutdown).await
    })
}

fn init_config() {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => {
            eprintln!("Failed to render default config: {}", e);
            std::process::exit(1);
        }
    }
}
