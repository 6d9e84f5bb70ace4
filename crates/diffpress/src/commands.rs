use crate::child::{ChildExit, ChildRunner};
use crate::cli::{Command, CompressArgs, InputArgs, PromptArgs, RunArgs};
use crate::git::GitHelper;
use anyhow::{Context, Result};
use diffpress_core::Config;
use diffpress_diff::{
    build_prompt, prepare_diff, resolve_delivery, ticket_from_branch, CompressionConfig,
    DeliveryConfig, DeliveryMode, DiffPayload, FileInclusion, PromptMetadata, Strategy,
    COMMIT_INSTRUCTIONS,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitStatus;

pub fn execute(command: Command, config: &Config) -> Result<u8> {
    match command {
        Command::Compress(args) => cmd_compress(config, &args),
        Command::Prompt(args) => cmd_prompt(config, &args),
        Command::Run(args) => cmd_run(config, &args),
        Command::Config => cmd_config(config),
    }
}

/// Validate compression settings, applying a strategy given on the command line
fn compression_config(config: &Config, strategy: Option<&str>) -> Result<CompressionConfig> {
    let mut settings = config.compression.clone();
    if let Some(strategy) = strategy {
        settings.strategy = strategy.to_string();
    }
    Ok(CompressionConfig::from_settings(&settings)?)
}

fn read_input(input: &InputArgs) -> Result<String> {
    match &input.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read diff from {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read diff from stdin")?;
            Ok(raw)
        }
    }
}

#[derive(Debug, Serialize)]
struct CompressReport<'a> {
    compressed: bool,
    strategy: Option<Strategy>,
    original_size: usize,
    compressed_size: usize,
    files: usize,
    additions: usize,
    deletions: usize,
    summary: Option<String>,
    inclusions: &'a [FileInclusion],
    text: &'a str,
}

fn cmd_compress(config: &Config, args: &CompressArgs) -> Result<u8> {
    let compression = compression_config(config, args.input.strategy.as_deref())?;
    let raw = read_input(&args.input)?;
    let (doc, payload) = prepare_diff(&raw, &compression)?;

    if args.json {
        let compressed = payload.compression();
        let report = CompressReport {
            compressed: compressed.is_some(),
            strategy: compressed.map(|r| r.strategy),
            original_size: doc.total_bytes,
            compressed_size: payload.text().len(),
            files: doc.file_count(),
            additions: doc.total_additions(),
            deletions: doc.total_deletions(),
            summary: compressed.map(|r| r.summary()),
            inclusions: compressed.map(|r| r.files.as_slice()).unwrap_or_default(),
            text: payload.text(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(0);
    }

    print!("{}", payload.text());
    report_summary(&payload);
    Ok(0)
}

fn report_summary(payload: &DiffPayload) {
    if let Some(result) = payload.compression() {
        eprintln!("{}", result.summary());
    }
}

fn prompt_metadata(args: &PromptArgs) -> PromptMetadata {
    let branch = args
        .branch
        .clone()
        .or_else(|| match GitHelper::get_current_branch() {
            Ok(branch) => Some(branch),
            Err(e) => {
                tracing::debug!("no branch for prompt metadata: {:#}", e);
                None
            }
        });
    let ticket = args
        .ticket
        .clone()
        .or_else(|| branch.as_deref().and_then(ticket_from_branch));
    PromptMetadata { branch, ticket }
}

fn load_instructions(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read instructions from {}", path.display())),
        None => Ok(COMMIT_INSTRUCTIONS.to_string()),
    }
}

/// Prompt text for `raw`, with the compression summary on stderr
fn assemble(config: &Config, args: &PromptArgs, raw: &str) -> Result<String> {
    let compression = compression_config(config, args.input.strategy.as_deref())?;
    let instructions = load_instructions(args.instructions.as_deref())?;
    let metadata = prompt_metadata(args);

    let (payload, prompt) = build_prompt(raw, &instructions, &metadata, &compression)?;
    report_summary(&payload);
    if prompt.truncated {
        eprintln!(
            "Warning: prompt truncated, {} characters of diff omitted",
            prompt.omitted_chars
        );
    }
    Ok(prompt.text)
}

fn cmd_prompt(config: &Config, args: &PromptArgs) -> Result<u8> {
    let raw = read_input(&args.input)?;
    print!("{}", assemble(config, args, &raw)?);
    Ok(0)
}

fn cmd_run(config: &Config, args: &RunArgs) -> Result<u8> {
    let raw = read_input(&args.prompt.input)?;
    let work_dir = match GitHelper::get_repo_root() {
        Ok(root) => root,
        Err(_) => std::env::current_dir().context("Failed to get current directory")?,
    };
    run_with_prompt(config, &args.prompt, &raw, &work_dir, &args.command)
}

/// Assemble the prompt, hand it to `command` and remove any prompt file
/// before returning, whatever the outcome. SIGINT and SIGTERM received while
/// the command runs end diffpress with 130 or 143 after the same cleanup.
fn run_with_prompt(
    config: &Config,
    args: &PromptArgs,
    raw: &str,
    work_dir: &Path,
    command: &[String],
) -> Result<u8> {
    let (program, program_args) = command.split_first().context("No command given")?;
    let delivery = DeliveryConfig::from_settings(&config.prompt_file)?;
    let prompt = assemble(config, args, raw)?;
    let mut runner = ChildRunner::new().context("Failed to install signal handlers")?;

    let mut resolved = resolve_delivery(prompt, &delivery, work_dir)?;
    if resolved.decision.mode == DeliveryMode::FileBased {
        if let Some(path) = &resolved.decision.temp_path {
            eprintln!("Prompt written to {}", path.display());
        }
    }

    let mut child_args = program_args.to_vec();
    child_args.push(resolved.prompt.clone());

    tracing::debug!(program = %program, "running command");
    let outcome = runner.run(program, &child_args);

    let cleanup = resolved.cleanup();
    let outcome = outcome.with_context(|| format!("Failed to run {}", program))?;
    cleanup?;

    match outcome {
        ChildExit::Exited(status) => {
            if !status.success() {
                tracing::warn!(program = %program, %status, "command failed");
            }
            Ok(exit_code(status))
        }
        ChildExit::Cancelled(code) => {
            eprintln!("Cancelled");
            Ok(code)
        }
    }
}

/// Exit status to forward; signals and out-of-range codes map to 1
fn exit_code(status: ExitStatus) -> u8 {
    match status.code() {
        Some(code) => u8::try_from(code).unwrap_or(1),
        None => 1,
    }
}

fn cmd_config(config: &Config) -> Result<u8> {
    CompressionConfig::from_settings(&config.compression)?;
    DeliveryConfig::from_settings(&config.prompt_file)?;
    print!("{}", toml::to_string_pretty(config)?);
    if let Some(path) = Config::global_config_path() {
        eprintln!("Global config: {}", path.display());
    }
    Ok(0)
}
