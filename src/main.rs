#![forbid(unsafe_code)]

mod cli;
mod output;

use anyhow::{Context, Result};
use std::fs::File;
use std::os::fd::AsFd;
use std::path::Path;
use std::process::ExitCode;

use cli::CliCommand;
use injectcfg::config::{self, structured};
use injectcfg::constants::STRUCTURED_CONFIG_FILE;
use injectcfg::web::{WebConfigServer, WebSettings};

fn main() -> Result<ExitCode> {
    let cli = cli::parse_args()?;
    injectcfg::logging::init(cli.verbose, cli.quiet)?;

    match cli.command {
        CliCommand::Resolve {
            app_name,
            module_dir,
            sandboxed,
            json_output,
        } => resolve(&module_dir, sandboxed, &app_name, json_output),
        CliCommand::Check {
            module_dir,
            json_output,
        } => check(&module_dir, json_output),
        CliCommand::Serve { settings } => serve(settings),
    }
}

fn resolve(
    module_dir: &Path,
    sandboxed: bool,
    app_name: &str,
    json_output: bool,
) -> Result<ExitCode> {
    let resolved = if sandboxed {
        // Mirror the host: only the directory handle is used for reads
        let dir = File::open(module_dir)
            .with_context(|| format!("Failed to open module directory: {}", module_dir.display()))?;
        config::load_config(module_dir, Some(dir.as_fd()), app_name)
    } else {
        config::load_config(module_dir, None, app_name)
    };

    let Some(cfg) = resolved else {
        eprintln!("No configuration for {}", app_name);
        return Ok(ExitCode::FAILURE);
    };

    if json_output {
        println!("{}", output::format_json(&cfg)?);
    } else {
        print!("{}", output::format_human(&cfg));
    }
    Ok(ExitCode::SUCCESS)
}

fn check(module_dir: &Path, json_output: bool) -> Result<ExitCode> {
    let targets = config::reader::try_read_file_content(module_dir, None, STRUCTURED_CONFIG_FILE)
        .and_then(|content| structured::parse_targets(&content));

    match targets {
        Ok(targets) => {
            if json_output {
                println!("{}", output::format_json(&targets)?);
            } else {
                print!("{}", output::format_targets_human(&targets));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn serve(settings: WebSettings) -> Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    runtime.block_on(async move {
        let Some(server) = WebConfigServer::bind(&settings).await? else {
            log::info!("Another instance already serves port {}", settings.port);
            return Ok(ExitCode::SUCCESS);
        };

        tokio::select! {
            result = server.serve() => result.map(|_| ExitCode::SUCCESS),
            _ = tokio::signal::ctrl_c() => {
                log::info!("WebConfig: shutting down");
                Ok(ExitCode::SUCCESS)
            }
        }
    })
}
