use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tpm::commands::{self, Cli, Commands};
use tpm::config::AppConfig;
use tpm::core::provider::SysinfoProvider;
use tpm::error::TpmError;
use tpm::storage::SnapshotStore;
use tpm::tui;
use tpm::utils::logger::{init_logger, LogTarget};
use tpm::utils::ConfigPaths;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    match main_impl(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = err
                .downcast_ref::<TpmError>()
                .and_then(|e| e.to_user_facing().hint)
            {
                eprintln!("Hint: {hint}");
            }
            ExitCode::from(1)
        }
    }
}

async fn main_impl(cli: Cli) -> Result<()> {
    let mut paths = match &cli.config_dir {
        Some(dir) => ConfigPaths::with_root(dir),
        None => ConfigPaths::new()?,
    };
    let command = cli.command();

    // The TUI owns stdout, so it only logs to a file.
    let target = if command == Commands::Tui {
        LogTarget::File(paths.log_file.clone())
    } else {
        LogTarget::Stderr
    };
    init_logger(cli.log_level.as_deref(), target)?;

    let mut config = AppConfig::load_or_default(&paths.config_file);
    config.apply_env_overrides();
    // An explicit --config-dir keeps data alongside it unless data_dir was set.
    if cli.config_dir.is_none() || config.data_dir != AppConfig::default().data_dir {
        paths.set_data_dir(&config.data_dir());
    }
    paths.ensure_dirs()?;

    match command {
        Commands::Tui => tui::app::run(&paths, config).await,
        other => {
            let mut stdout = io::stdout().lock();
            run_command(other, &paths, &config, &mut stdout)?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}

fn run_command(
    command: Commands,
    paths: &ConfigPaths,
    config: &AppConfig,
    out: &mut impl Write,
) -> Result<()> {
    let store = SnapshotStore::new(&paths.data_dir);
    match command {
        Commands::Tui => {}
        Commands::List {
            sort,
            asc,
            search,
            all,
            limit,
            json,
        } => {
            let options = commands::process::ListOptions {
                sort,
                ascending: asc,
                search,
                include_system: all || config.show_system,
                limit,
                json,
            };
            let provider = SysinfoProvider::new();
            commands::process::list(&provider, &options, out)?;
        }
        Commands::Export { format, output } => {
            let provider = SysinfoProvider::new();
            commands::process::export(&provider, &store, format, output.as_deref(), out)?;
        }
        Commands::Import { file, format } => {
            commands::process::import(&store, &file, format, out)?;
        }
        Commands::Kill { pid, force } => {
            let provider = SysinfoProvider::new();
            commands::process::kill(&provider, pid, force, out)?;
        }
        Commands::Backup(action) => {
            let provider = SysinfoProvider::new();
            commands::backup::execute(
                &action,
                &provider,
                &store,
                config,
                &paths.config_file,
                out,
            )?;
        }
        Commands::Shortcuts(action) => {
            commands::shortcuts::execute(&action, &paths.shortcuts_file, out)?;
        }
        Commands::Config(action) => {
            commands::config::execute(&action, paths, out)?;
        }
    }
    Ok(())
}
