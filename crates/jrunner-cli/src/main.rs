//! jrunner CLI
//!
//! A command-line tool for compiling and running single-file Java submissions.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jrunner::{CodeResponse, Config, EXAMPLE_CONFIG, Runner};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for submissions without a public class
const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "jrunner")]
#[command(about = "Compile and run a single Java source file with timeouts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: jrunner.toml)
        #[arg(short, long, default_value = "jrunner.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Compile and run a submission
    Run {
        /// Source file to run ("-" reads stdin)
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,

        /// Compiler timeout in seconds
        #[arg(long)]
        compile_timeout: Option<f64>,

        /// Program timeout in seconds
        #[arg(long)]
        run_timeout: Option<f64>,
    },

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
    } else {
        debug!("using default configuration");
    }
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Init { output, force } => {
            init_config(&output, force).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            source,
            json,
            compile_timeout,
            run_timeout,
        } => {
            let config = apply_timeouts(config, compile_timeout, run_timeout)?;
            run_submission(config, &source, json).await
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_timeouts(
    mut config: Config,
    compile_timeout: Option<f64>,
    run_timeout: Option<f64>,
) -> Result<Config> {
    if let Some(seconds) = compile_timeout {
        config = config
            .with_compile_timeout(seconds)
            .context("invalid --compile-timeout")?;
    }
    if let Some(seconds) = run_timeout {
        config = config
            .with_run_timeout(seconds)
            .context("invalid --run-timeout")?;
    }
    Ok(config)
}

async fn run_submission(config: Config, source: &Path, json: bool) -> Result<ExitCode> {
    let code = read_source(source).await?;

    info!(source = %source.display(), "running submission");

    let runner = Runner::new(config);
    let result = runner.run(&code).await;

    let exit = match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(ref e) if e.is_input_error() => ExitCode::from(EXIT_INPUT_ERROR),
        Err(_) => ExitCode::FAILURE,
    };

    if json {
        let response = CodeResponse::from(result);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("failed to encode response")?
        );
        return Ok(exit);
    }

    match result {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("{}", result.output);
            }

            // Log execution info via tracing (stderr), keeping stdout clean for piping
            info!(
                time = %result.execution_time,
                memory = result.memory_usage.as_deref().unwrap_or("n/a"),
                "execution result"
            );
        }
        Err(e) => {
            warn!(input_error = e.is_input_error(), "run failed");
            eprintln!("{e}");
        }
    }

    Ok(exit)
}

async fn read_source(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("failed to read source from stdin")?;
        return Ok(code);
    }

    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read source file '{}'", source.display()))
}

fn show_config(config: &Config) {
    println!("Compiler:");
    println!("  Command: {}", config.compiler.command.join(" "));
    println!("  Timeout: {}s", config.compiler.timeout);
    println!("  Line offset: {}", config.compiler.line_offset);
    println!("  Extension: {}", config.compiler.extension);
    println!();
    println!("Runtime:");
    println!("  Command: {}", config.runtime.command.join(" "));
    println!("  Timeout: {}s", config.runtime.timeout);
    println!();
    println!("Workspace:");
    println!("  Prefix: {}", config.workspace.prefix);
    match config.workspace.root {
        Some(ref root) => println!("  Root: {}", root.display()),
        None => println!("  Root: {} (system temp)", std::env::temp_dir().display()),
    }
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
