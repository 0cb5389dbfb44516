use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use envloader::{Error, LoadedVariables, Loader, MemoryEnv, Validator};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILE: &str = ".env";

#[derive(Debug, Parser)]
#[command(
    name = "envloader",
    version,
    about = "Run commands with variables loaded from dotenv files"
)]
struct Cli {
    /// Print loader diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Load a dotenv file and execute a command
    Run(RunArgs),
    /// Parse and resolve a dotenv file, printing NAME=VALUE lines
    Check(FileArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct FileArgs {
    /// Candidate dotenv file(s); the first readable one is loaded.
    #[arg(
        short = 'f',
        long = "file",
        value_name = "PATHS",
        value_delimiter = ',',
        default_value = DEFAULT_FILE
    )]
    files: Vec<PathBuf>,

    /// Overwrite variables that already have a non-empty value.
    #[arg(short = 'o', long = "override", visible_alias = "overload")]
    override_existing: bool,

    /// Succeed with no variables when none of the files exist.
    #[arg(short = 'i', long = "ignore-missing")]
    ignore_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct RunArgs {
    #[command(flatten)]
    files: FileArgs,

    /// Fail unless NAME ends up with a non-empty value. May be repeated.
    #[arg(short = 'r', long = "require", value_name = "NAME")]
    require: Vec<String>,

    /// Command to execute, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("envloader: {err:#}");
            1
        }
    };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("envloader=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(command: CliCommand) -> Result<i32> {
    match command {
        CliCommand::Run(args) => execute_run(args),
        CliCommand::Check(args) => {
            let (_, loaded) = load(&args)?;
            for (name, value) in &loaded {
                match value {
                    Some(value) => println!("{name}={value}"),
                    None => println!("{name}"),
                }
            }
            Ok(0)
        }
    }
}

fn load(args: &FileArgs) -> Result<(Loader, LoadedVariables), Error> {
    let mut loader = Loader::new()
        .paths(&args.files)
        .immutable(!args.override_existing)
        .target(MemoryEnv::from_process());

    let loaded = match loader.load() {
        Err(err) if args.ignore_missing && err.is_path_error() => LoadedVariables::new(),
        other => other?,
    };
    Ok((loader, loaded))
}

fn execute_run(args: RunArgs) -> Result<i32> {
    let (loader, loaded) = load(&args.files)?;
    if !args.require.is_empty() {
        Validator::new(&args.require, loader.target_env())?.not_empty()?;
    }

    let Some((program, program_args)) = args.command.split_first() else {
        anyhow::bail!("missing command after `run`");
    };

    let mut command = Command::new(program);
    command.args(program_args);
    for (name, value) in loaded {
        command.env(name, value.unwrap_or_default());
    }

    execute_command(command, program)
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32> {
    let err = command.exec();
    Err(err).with_context(|| format!("failed to execute `{}`", program.to_string_lossy()))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32> {
    let status = command
        .status()
        .with_context(|| format!("failed to execute `{}`", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}
