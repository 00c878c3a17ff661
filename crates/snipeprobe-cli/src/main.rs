//! snipeprobe: run the Snipe-IT asset scenario from the command line
//!
//! ```bash
//! snipeprobe run                              # against demo.snipeitapp.com
//! snipeprobe run --base-url http://localhost  # against a local instance
//! snipeprobe run --headed --seed 42           # watch it, reproducibly
//! snipeprobe config --config probe.yaml       # show the effective config
//! ```

use clap::Parser;
use snipeprobe::logging::{self, LogFormat};
use snipeprobe_cli::{
    load_config, Cli, CliResult, ColorChoice, Commands, ConfigArgs, Reporter, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color = ColorChoice::from(cli.color);
    console::set_colors_enabled(color.should_color());

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(logging::level_for(verbosity.as_level()), format);

    match cli.command {
        Commands::Run(args) => run_probe(&args, verbosity, color),
        Commands::Config(args) => run_config(&args),
    }
}

#[cfg(feature = "browser")]
fn run_probe(args: &RunArgs, verbosity: Verbosity, color: ColorChoice) -> CliResult<()> {
    let config = load_config(&args.source)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(snipeprobe::run_in_browser(&config))?;
    Reporter::new(color.should_color(), verbosity.is_quiet()).report(&report)?;
    Ok(())
}

#[cfg(not(feature = "browser"))]
fn run_probe(args: &RunArgs, _verbosity: Verbosity, _color: ColorChoice) -> CliResult<()> {
    load_config(&args.source)?;
    Err(snipeprobe_cli::CliError::unsupported(
        "Browser support not enabled. Rebuild with --features browser",
    ))
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let config = load_config(&args.source)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
