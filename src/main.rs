use anyhow::Result;
use clap::Parser;

use logbench::config::HarnessConfig;
use logbench::config_file::ConfigFile;
use logbench::logging::init_logging;
use logbench::platform::{ExitCode, SafeStdout, SignalHandler, SHOULD_TERMINATE};
use logbench::runner::{print_generate, print_scan, run_generate, run_scan};

mod cli;

use cli::{Cli, Command};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidUsage
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            code.exit();
        }
    };

    init_logging();

    let _signal_handler = match SignalHandler::new() {
        Ok(handler) => Some(handler),
        Err(e) => {
            tracing::warn!(error = %e, "failed to install signal handlers");
            None
        }
    };

    match run(cli.command) {
        Ok(code) => code.exit(),
        Err(e) => {
            eprintln!("logbench: {:#}", e);
            ExitCode::GeneralError.exit();
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    let (file, loaded) = ConfigFile::load()?;
    let config = HarnessConfig::from_file(&file)?;
    let mut out = SafeStdout::new();

    match command {
        Command::Config => {
            ConfigFile::show_config(&loaded);
            println!("\nResolved configuration:\n{:#?}", config);
            Ok(ExitCode::Success)
        }
        Command::Generate => generate(&config, &mut out),
        Command::Scan => scan(&config, &mut out),
        Command::Run => {
            let code = generate(&config, &mut out)?;
            if code != ExitCode::Success {
                return Ok(code);
            }
            scan(&config, &mut out)
        }
    }
}

fn generate(config: &HarnessConfig, out: &mut SafeStdout) -> Result<ExitCode> {
    let outcome = run_generate(&config.writer, &SHOULD_TERMINATE)?;
    print_generate(out, &outcome)?;

    if outcome.report.failures().next().is_some() {
        return Ok(ExitCode::GeneralError);
    }
    if outcome.report.interrupted() {
        return Ok(ExitCode::for_interrupt());
    }
    Ok(ExitCode::Success)
}

fn scan(config: &HarnessConfig, out: &mut SafeStdout) -> Result<ExitCode> {
    let summary = run_scan(&config.scanner)?;
    print_scan(out, &summary)?;

    if summary.is_complete() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::GeneralError)
    }
}
