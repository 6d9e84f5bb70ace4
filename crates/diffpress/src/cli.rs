use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "diffpress",
    version,
    about = "Compress staged git diffs into bounded prompts for text-generation tools"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify configuration file path
    #[arg(long, global = true, env = "DIFFPRESS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true, env = "DIFFPRESS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress a diff read from stdin and print it
    Compress(CompressArgs),

    /// Print the full prompt for a diff read from stdin
    Prompt(PromptArgs),

    /// Build the prompt and pass it as the last argument of a command
    Run(RunArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Args)]
pub struct CompressArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print a JSON report instead of the diff
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Compression strategy: stat, compact, filtered, function-context, smart
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Read the diff from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct PromptArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Branch name shown in the prompt (defaults to the current branch)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Ticket identifier (defaults to the one in the branch name)
    #[arg(short, long)]
    pub ticket: Option<String>,

    /// File with instructions to use instead of the built-in ones
    #[arg(long)]
    pub instructions: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Command to run, e.g. `-- claude -p`
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_takes_trailing_command() {
        let cli = Cli::try_parse_from([
            "diffpress",
            "run",
            "--branch",
            "ABC-1-x",
            "-s",
            "stat",
            "--",
            "claude",
            "-p",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.command, vec!["claude", "-p"]);
                assert_eq!(args.prompt.branch.as_deref(), Some("ABC-1-x"));
                assert_eq!(args.prompt.input.strategy.as_deref(), Some("stat"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_command() {
        assert!(Cli::try_parse_from(["diffpress", "run"]).is_err());
    }
}
