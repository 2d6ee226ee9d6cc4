mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use clawgate_commands::format_result;
use clawgate_config::{
    apply_all_defaults, config_dir, config_file_path, load_and_prepare, write_config, GateConfig,
};
use clawgate_core::Classification;
use clawgate_sandbox::{ExecGateway, ExecSettings};

#[derive(Parser)]
#[command(name = "clawgate")]
#[command(about = "ClawGate: approval gateway for remotely submitted shell commands")]
#[command(version)]
struct Cli {
    /// Config file (default: $CLAWGATE_CONFIG_DIR/config.yaml or ~/.clawgate/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the classification tier of a command
    Classify {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Run a command if policy allows it without approval
    Exec {
        /// Override the configured execution timeout
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Interactive console channel: type chat commands such as `!run ls`
    Shell {
        /// Identity used as requester/approver
        #[arg(long, default_value = "console")]
        user: String,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(|| config_file_path(&config_dir()));

    if let Commands::Init { force } = cli.command {
        if path.exists() && !force {
            bail!("Config already exists at {} (use --force to overwrite)", path.display());
        }
        write_config(&apply_all_defaults(GateConfig::default()), &path).await?;
        println!("Wrote default config to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_and_prepare(&path).await?;
    let level = cli.log_level.as_deref().unwrap_or(config.log_level());
    clawgate_logging::init_logger(config.log_dir(), level);

    let gateway = Arc::new(ExecGateway::new(
        config.approval_config(),
        ExecSettings {
            timeout: config.exec_timeout(),
            max_output_chars: config.max_output_chars(),
        },
    ));
    info!(config = %path.display(), "ClawGate started");

    let code = match cli.command {
        Commands::Classify { command } => {
            println!("{}", gateway.classify(&command.join(" ")));
            ExitCode::SUCCESS
        }
        Commands::Exec { timeout_secs, command } => {
            run_exec(&gateway, &command.join(" "), timeout_secs.map(Duration::from_secs)).await
        }
        Commands::Shell { user } => {
            console::run_shell(gateway.clone(), config.command_prefix(), &user).await?;
            ExitCode::SUCCESS
        }
        Commands::Init { .. } => ExitCode::SUCCESS,
    };

    gateway.shutdown();
    Ok(code)
}

/// One-shot execution. Only commands that need no approval may run here.
async fn run_exec(gateway: &ExecGateway, command: &str, timeout: Option<Duration>) -> ExitCode {
    match gateway.classify(command) {
        Classification::Blocked => {
            eprintln!("🚫 Blocked by policy: {command}");
            ExitCode::from(2)
        }
        Classification::ApprovalRequired => {
            eprintln!("⏳ `{command}` requires approval; submit it through `clawgate shell`");
            ExitCode::from(2)
        }
        Classification::Allowed => {
            let result = gateway.execute(command, timeout).await;
            println!("{}", format_result(&result));
            match u8::try_from(result.exit_code) {
                Ok(code) => ExitCode::from(code),
                Err(_) => ExitCode::FAILURE,
            }
        }
    }
}
