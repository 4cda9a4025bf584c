// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   ChangeAuthor | Sign | Options | ConfigFiles | Version
//! ```

use std::process::ExitCode;

use tiny_git_tools::cli::global::GlobalOptions;
use tiny_git_tools::cli::{self, Command};
use tiny_git_tools::cmd::RunOptions;
use tiny_git_tools::cmd::change_author::run_change_author_command;
use tiny_git_tools::cmd::config::{run_config_files_command, run_options_command};
use tiny_git_tools::cmd::sign::run_sign_command;
use tiny_git_tools::config::loader::ConfigLoader;
use tiny_git_tools::config::{Config, ENV_PREFIX};
use tiny_git_tools::git::Repo;
use tiny_git_tools::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let loader = match build_config_loader(&cli.global) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let config_files = loader.format_loaded_files();
    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config, &config_files)
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build()
}

fn dispatch_command(cli: &cli::Cli, config: &Config, config_files: &[String]) -> ExitCode {
    let options = RunOptions {
        dry_run: cli.global.dry,
        json: cli.global.json,
    };
    let repo_path = cli.global.repo_path.as_path();

    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::ConfigFiles) => {
            run_config_files_command(config_files);
            Ok(())
        }
        Some(Command::ChangeAuthor(args)) => {
            run_change_author_command(args, config, repo_path, options)
        }
        Some(Command::Sign(args)) => run_sign_command(args, config, repo_path, options),
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> tiny_git_tools::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().with_user_config();
    if let Ok(repo) = Repo::discover(&global.repo_path) {
        loader = loader.add_repo_config(repo.path());
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for (key, value) in global.to_config_overrides() {
        loader = loader.set(key, value)?;
    }
    Ok(loader)
}
