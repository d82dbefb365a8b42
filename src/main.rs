use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use sitectl::application::edit::EditRequest;
use sitectl::infrastructure::config::ConfigStore;
use sitectl::infrastructure::tracing::init_tracing;

mod cli;

#[derive(Parser)]
#[command(name = "sitectl")]
#[command(about = "Manage reverse-proxy site definitions with validated reloads")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.sitectl/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// First-run setup - records the base path and creates the data directory
    Init {
        /// Existing directory holding sitectl's data
        #[arg(long)]
        base_path: PathBuf,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Deploy a new proxy site
    Deploy {
        /// Server names; the first one names the site file
        #[arg(required = true)]
        domains: Vec<String>,

        /// Backend port to proxy requests to
        #[arg(long)]
        port: String,

        /// Site type (only "proxy" is supported)
        #[arg(long = "type", default_value = "proxy")]
        site_type: String,

        /// Backend host (default 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Add a hosts file alias for the domain
        #[arg(long)]
        hosts: bool,

        /// IP for the hosts alias (implies --hosts)
        #[arg(long)]
        ip: Option<String>,
    },

    /// List registered configurations
    List,

    /// Show one configuration in detail
    Show {
        /// Number shown by `list`
        selection: usize,
    },

    /// Change domain, port, backend host or alias IP of a configuration
    Edit {
        /// Number shown by `list`
        selection: usize,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long)]
        port: Option<String>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        ip: Option<String>,
    },

    /// Delete a configuration with its link and hosts alias
    Delete {
        /// Number shown by `list`
        selection: usize,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Enable or disable a configuration
    Toggle {
        /// Number shown by `list`
        selection: usize,
    },

    /// Finish a rename that was interrupted
    Resume,

    /// Check service status, configuration syntax and listening ports
    Diagnose {
        /// Print the listening sockets
        #[arg(long)]
        ports: bool,
    },

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };

    match cli.command {
        Commands::Init { base_path, force } => cli::init::execute(base_path, force, &config_path),
        Commands::Deploy {
            domains,
            port,
            site_type,
            host,
            hosts,
            ip,
        } => cli::deploy::execute(
            cli::deploy::DeployArgs {
                domains,
                port,
                site_type,
                backend_host: host,
                hosts,
                ip,
            },
            &config_path,
        ),
        Commands::List => cli::list::execute(&config_path),
        Commands::Show { selection } => cli::list::show(selection, &config_path),
        Commands::Edit {
            selection,
            domain,
            port,
            host,
            ip,
        } => cli::edit::execute(
            selection,
            EditRequest {
                domain,
                port,
                backend_host: host,
                ip,
            },
            &config_path,
        ),
        Commands::Delete { selection, force } => {
            cli::delete::execute(selection, force, &config_path)
        }
        Commands::Toggle { selection } => cli::toggle::execute(selection, &config_path),
        Commands::Resume => cli::resume::execute(&config_path),
        Commands::Diagnose { ports } => cli::diagnose::execute(ports, &config_path),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sitectl",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
