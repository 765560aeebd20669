mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use azremote_core::config::RemoteConfig;

#[derive(Parser)]
#[command(name = "azremote")]
#[command(about = "Azure Blob Storage remote for data versioning")]
#[command(version)]
struct Cli {
    /// Path to the remote config file (default: ~/.azremote/config.toml, when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Remote root, e.g. azure://container/prefix. Relative paths resolve against it.
    #[arg(long, global = true, env = "AZREMOTE_URL")]
    url: Option<String>,

    /// Storage connection string
    #[arg(
        long,
        global = true,
        env = "AZREMOTE_CONNECTION_STRING",
        hide_env_values = true
    )]
    connection_string: Option<String>,

    /// Storage account name
    #[arg(long, global = true)]
    account: Option<String>,

    /// Storage account key
    #[arg(long, global = true, env = "AZREMOTE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Shared access signature token
    #[arg(long, global = true, env = "AZREMOTE_SAS_TOKEN", hide_env_values = true)]
    sas_token: Option<String>,

    /// Do not draw progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files under a path
    Ls {
        target: String,
        /// Raw prefix scan instead of the children of the path
        #[arg(long)]
        prefix: bool,
    },

    /// Show existence, directory status and content hash of a path
    Stat { target: String },

    /// Upload a local file
    Push {
        local: PathBuf,
        /// Destination; a trailing `/` keeps the local file name
        target: String,
    },

    /// Download a remote file
    Pull {
        target: String,
        /// Destination file, or an existing directory
        local: PathBuf,
    },

    /// Server-side copy between two remote paths
    Cp { source: String, dest: String },

    /// Remove one remote file
    Rm { target: String },

    /// Print a time-limited, read-only download URL
    Url {
        target: String,
        /// Lifetime of the URL in seconds
        #[arg(long, default_value_t = 3600)]
        expires: u64,
    },
}

impl Cli {
    fn overrides(&self) -> RemoteConfig {
        RemoteConfig {
            url: self.url.clone(),
            connection_string: self.connection_string.clone(),
            sas_token: self.sas_token.clone(),
            account: self.account.clone(),
            key: self.key.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("azremote=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.overrides())?;
    let no_progress = cli.no_progress;

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Ls { ref target, prefix } => {
            rt.block_on(commands::ls::run(&config, target, prefix))
        }
        Commands::Stat { ref target } => rt.block_on(commands::stat::run(&config, target)),
        Commands::Push {
            ref local,
            ref target,
        } => rt.block_on(commands::push::run(&config, local, target, no_progress)),
        Commands::Pull {
            ref target,
            ref local,
        } => rt.block_on(commands::pull::run(&config, target, local, no_progress)),
        Commands::Cp {
            ref source,
            ref dest,
        } => rt.block_on(commands::cp::run(&config, source, dest)),
        Commands::Rm { ref target } => rt.block_on(commands::rm::run(&config, target)),
        Commands::Url {
            ref target,
            expires,
        } => rt.block_on(commands::url::run(&config, target, expires)),
    }
}
