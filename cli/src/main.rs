use std::path::Path;
use std::process::ExitCode;

use aspect_cli::{
    ClassifiedFlag, PASSTHROUGH_ARGS, Scope, Synthesis, SynthesisOptions, synthesize_flags,
};
use aspect_flags_discovery::{
    BazelSchemaSource, CliConfig, locate_workspace_root, resolve_bazel_binary,
};
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ASPECT_LOG";

#[derive(Debug, Parser)]
#[command(name = "aspect")]
#[command(version)]
#[command(about = "Bazel front-end with Bazel's own flags built in")]
struct Cli {
    #[command(subcommand)]
    command: Verb,
}

#[derive(Debug, Subcommand)]
enum Verb {
    /// Builds the specified targets.
    Build(PassthroughArgs),
    /// Builds and runs the specified test targets.
    Test(PassthroughArgs),
    /// Builds and runs a single target.
    Run(PassthroughArgs),
    /// Generates a code coverage report for the specified test targets.
    Coverage(PassthroughArgs),
    /// Queries the dependency graph.
    Query(PassthroughArgs),
    /// Queries the configured target graph.
    Cquery(PassthroughArgs),
    /// Queries the action graph.
    Aquery(PassthroughArgs),
    /// Removes output files and optionally stops the server.
    Clean(PassthroughArgs),
    /// Displays runtime info about the bazel server.
    Info(PassthroughArgs),
    /// Fetches external repositories.
    Fetch(PassthroughArgs),
    /// Stops the bazel server.
    Shutdown(PassthroughArgs),
    /// Queries and edits the external dependency graph.
    Mod(PassthroughArgs),
    /// Prints the aspect version.
    Version,
    /// Lists the bazel flags known to aspect.
    Flags(FlagsArgs),
}

#[derive(Debug, Args)]
struct PassthroughArgs {
    /// Targets and further arguments, passed to bazel unchanged.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct FlagsArgs {
    /// Print the classified schema as JSON.
    #[arg(long)]
    json: bool,
    /// Include flags hidden from help.
    #[arg(long)]
    all: bool,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<ExitCode, String> {
    let cwd = std::env::current_dir().map_err(|e| format!("cannot read current directory: {e}"))?;
    let workspace = locate_workspace_root(&cwd);
    let config = CliConfig::discover(workspace.as_deref()).map_err(|e| e.to_string())?;
    debug!(workspace = ?workspace, "Loaded configuration");

    let source = BazelSchemaSource::new(workspace.clone(), &config);
    let options = SynthesisOptions::from_config(&config);
    let mut command = Cli::command();
    let mut synthesis =
        synthesize_flags(&mut command, &source, &options).map_err(|e| e.to_string())?;

    let matches = command.get_matches();
    synthesis
        .flags
        .apply_matches(&matches)
        .map_err(|e| e.to_string())?;
    let cli = Cli::from_arg_matches(&matches).map_err(|e| e.to_string())?;

    match cli.command {
        Verb::Version => {
            println!("aspect {PACKAGE_VERSION}");
            Ok(ExitCode::SUCCESS)
        }
        Verb::Flags(args) => {
            print_flags(&synthesis.schema, &args)?;
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let Some((verb, verb_matches)) = matches.subcommand() else {
                return Err("no command given".to_string());
            };
            let root = workspace.unwrap_or(cwd);
            let binary = source
                .binary()
                .map(Path::to_path_buf)
                .or_else(|| resolve_bazel_binary(&config, &root))
                .ok_or_else(|| "no bazel or bazelisk binary found on PATH".to_string())?;
            let argv = bazel_argv(&synthesis, verb, verb_matches);
            exec_bazel(&binary, &root, &argv)
        }
    }
}

/// `<startup flags> <verb> <verb flags> <passthrough args>`.
fn bazel_argv(synthesis: &Synthesis, verb: &str, verb_matches: &ArgMatches) -> Vec<String> {
    let mut argv = synthesis.flags.forwarded_args(&Scope::Root);
    argv.push(verb.to_string());
    argv.extend(synthesis.flags.forwarded_args(&Scope::subcommand(verb)));
    if let Ok(Some(rest)) = verb_matches.try_get_many::<String>(PASSTHROUGH_ARGS) {
        argv.extend(rest.cloned());
    }
    argv
}

fn exec_bazel(binary: &Path, root: &Path, argv: &[String]) -> Result<ExitCode, String> {
    info!(binary = %binary.display(), args = ?argv, "Running bazel");
    let status = std::process::Command::new(binary)
        .args(argv)
        .current_dir(root)
        .status()
        .map_err(|e| format!("failed to run {}: {e}", binary.display()))?;
    let code = status.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

fn print_flags(schema: &[ClassifiedFlag], args: &FlagsArgs) -> Result<(), String> {
    let listed: Vec<&ClassifiedFlag> = schema
        .iter()
        .filter(|flag| args.all || !flag.visibility.is_hidden())
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&listed)
            .map_err(|e| format!("failed to serialize flags: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if listed.is_empty() {
        eprintln!("No bazel flags available (not in a bazel workspace, or bazel not found).");
        return Ok(());
    }
    let width = listed
        .iter()
        .map(|flag| flag.descriptor.name.len())
        .max()
        .unwrap_or(0);
    for flag in listed {
        let commands: Vec<&str> = flag.descriptor.commands.iter().map(String::as_str).collect();
        println!(
            "{:<width$}  {:<14}  {}",
            flag.descriptor.name,
            flag.kind.label(),
            commands.join(",")
        );
    }
    Ok(())
}
