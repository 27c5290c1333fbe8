use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "logbench")]
#[command(about = "Concurrent bounded log writer and parallel severity scanner benchmark")]
#[command(
    long_about = "Concurrent bounded log writer and parallel severity scanner benchmark\n\nSettings come from .logbenchrc (project), the user config.ini, or $LOGBENCH_CONFIG.\nRun `logbench config` to see where they are looked up."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fill the log file from concurrent producers until the size budget is reached
    Generate,
    /// Count severities in the log file with parallel workers
    Scan,
    /// Generate, then scan the file that was written
    Run,
    /// Show the resolved configuration and config file search paths
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["logbench", "scan"]).unwrap();
        assert_eq!(cli.command, Command::Scan);
        let cli = Cli::try_parse_from(["logbench", "run"]).unwrap();
        assert_eq!(cli.command, Command::Run);
        assert!(Cli::try_parse_from(["logbench"]).is_err());
        assert!(Cli::try_parse_from(["logbench", "scan", "--workers", "4"]).is_err());
    }
}
