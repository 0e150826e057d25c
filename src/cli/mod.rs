//! CLI argument parsing module
//!
//! Handles command-line interface using clap:
//! - `resolve`: resolve the config of one application
//! - `check`: validate the structured config document
//! - `serve`: run the config editor in the foreground
//! - Verbosity and quiet modes

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use injectcfg::constants::{DEFAULT_MODULE_DIR, WEB_DEFAULT_BIND, WEB_DEFAULT_PORT};
use injectcfg::web::WebSettings;

/// Parsed invocation
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub verbose: bool,
    pub quiet: bool,
    pub command: CliCommand,
}

#[derive(Debug, Clone)]
pub enum CliCommand {
    Resolve {
        app_name: String,
        module_dir: PathBuf,
        sandboxed: bool,
        json_output: bool,
    },
    Check {
        module_dir: PathBuf,
        json_output: bool,
    },
    Serve {
        settings: WebSettings,
    },
}

fn module_dir_arg() -> Arg {
    Arg::new("module-dir")
        .short('m')
        .long("module-dir")
        .value_name("DIR")
        .help("Module installation directory")
        .default_value(DEFAULT_MODULE_DIR)
        .value_parser(clap::value_parser!(PathBuf))
}

fn json_arg() -> Arg {
    Arg::new("json")
        .short('j')
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

fn build_command() -> Command {
    Command::new("injectcfg")
        .version(concat!(env!("INJECTCFG_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Resolve per-application library injection config")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug details, including expected misses")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve the injection config of an application")
                .arg(
                    Arg::new("app")
                        .value_name("APP")
                        .help("Application identity (process name)")
                        .required(true),
                )
                .arg(module_dir_arg())
                .arg(
                    Arg::new("sandboxed")
                        .short('s')
                        .long("sandboxed")
                        .help("Read through a directory descriptor instead of paths")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the structured config document")
                .arg(module_dir_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the config editor until interrupted")
                .arg(module_dir_arg())
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help(format!("Port to listen on [default: {}]", WEB_DEFAULT_PORT))
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help(format!("Address to listen on [default: {}]", WEB_DEFAULT_BIND)),
                )
                .arg(
                    Arg::new("settings")
                        .long("settings")
                        .value_name("FILE")
                        .help("TOML settings file")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Parse command line arguments and return configuration
pub fn parse_args() -> Result<CliConfig> {
    from_matches(&build_command().get_matches())
}

fn module_dir(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("module-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_DIR))
}

fn from_matches(matches: &ArgMatches) -> Result<CliConfig> {
    let command = match matches.subcommand() {
        Some(("resolve", sub)) => CliCommand::Resolve {
            app_name: sub.get_one::<String>("app").cloned().unwrap_or_default(),
            module_dir: module_dir(sub),
            sandboxed: sub.get_flag("sandboxed"),
            json_output: sub.get_flag("json"),
        },
        Some(("check", sub)) => CliCommand::Check {
            module_dir: module_dir(sub),
            json_output: sub.get_flag("json"),
        },
        Some(("serve", sub)) => {
            let mut settings = match sub.get_one::<PathBuf>("settings") {
                Some(path) => WebSettings::load_from_file(path)?,
                None => WebSettings::default(),
            };
            // Explicit flags override the settings file
            if sub.value_source("module-dir") == Some(clap::parser::ValueSource::CommandLine)
                || sub.get_one::<PathBuf>("settings").is_none()
            {
                settings.module_dir = module_dir(sub);
            }
            if let Some(port) = sub.get_one::<u16>("port") {
                settings.port = *port;
            }
            if let Some(bind) = sub.get_one::<String>("bind") {
                settings.bind_address = bind.clone();
            }
            settings.validate()?;
            CliCommand::Serve { settings }
        }
        _ => anyhow::bail!("A subcommand is required"),
    };

    Ok(CliConfig {
        verbose: matches.get_flag("verbose"),
        quiet: matches.get_flag("quiet"),
        command,
    })
}
