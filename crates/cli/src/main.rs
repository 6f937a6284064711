use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use timeref_engine::{Engine, EngineConfig};
use timeref_protocol::{serialize_json, tool_catalog, ToolRequest};

#[derive(Parser)]
#[command(name = "timeref")]
#[command(about = "Resolve temporal and entity references against CSV tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (overrides TIMEREF_CONFIG and ./timeref.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the reference tables (overrides TIMEREF_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Re-read tables on every call
    #[arg(long, global = true)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one tool with a JSON argument object
    Call(CallArgs),

    /// Run a `{"tool_name": ..., "arguments": {...}}` request
    Request(RequestArgs),

    /// List tools and their argument schemas
    Tools(ToolsArgs),

    /// Load every configured table and report row counts
    Check,
}

#[derive(Args)]
struct CallArgs {
    /// Tool name, e.g. entity_time_event
    tool: String,

    /// Arguments as a JSON object
    #[arg(long, default_value = "{}")]
    args: String,
}

#[derive(Args)]
struct RequestArgs {
    /// Request JSON, or `-` to read it from stdin
    #[arg(long)]
    json: String,
}

#[derive(Args)]
struct ToolsArgs {
    /// Pretty-print the catalog
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<ExitCode> {
    let mut cli = Cli::parse();

    let json_output = !matches!(cli.command, Commands::Check);
    if json_output && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let Cli {
        command,
        config,
        data_dir,
        no_cache,
        ..
    } = cli;
    let engine = || -> Result<Engine> {
        let cfg = load_config(config.as_deref(), data_dir.as_ref(), no_cache)?;
        Ok(Engine::new(cfg))
    };

    match command {
        Commands::Tools(args) => run_tools(&args),
        Commands::Call(args) => {
            let arguments = serde_json::from_str(&args.args)
                .with_context(|| format!("--args must be a JSON object: {}", args.args))?;
            let request = ToolRequest {
                tool_name: args.tool,
                arguments,
            };
            run_request(&engine()?, request)
        }
        Commands::Request(args) => {
            let request = read_request(&args.json)?;
            run_request(&engine()?, request)
        }
        Commands::Check => Ok(run_check(&engine()?)),
    }
}

fn load_config(
    config: Option<&Path>,
    data_dir: Option<&PathBuf>,
    no_cache: bool,
) -> Result<EngineConfig> {
    let mut cfg = EngineConfig::discover(config)?;
    if let Some(dir) = data_dir {
        cfg.data_dir = dir.clone();
    }
    if no_cache {
        cfg.cache_tables = false;
    }
    log::debug!("Tables under {}", cfg.data_dir.display());
    Ok(cfg)
}

fn run_tools(args: &ToolsArgs) -> Result<ExitCode> {
    let catalog = tool_catalog();
    let out = if args.pretty {
        serde_json::to_string_pretty(&catalog)?
    } else {
        serialize_json(&catalog)?
    };
    println!("{out}");
    Ok(ExitCode::SUCCESS)
}

fn read_request(raw: &str) -> Result<ToolRequest> {
    let body = if raw == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        raw.to_string()
    };
    serde_json::from_str(&body).context("Invalid request JSON")
}

fn run_request(engine: &Engine, request: ToolRequest) -> Result<ExitCode> {
    let response = engine.dispatch(&request);
    println!("{}", serialize_json(&response)?);
    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_check(engine: &Engine) -> ExitCode {
    let mut failed = 0usize;
    for report in engine.check_tables() {
        match &report.rows {
            Ok(rows) => println!(
                "ok    {:<32} {rows:>6} rows  {}",
                report.kind.as_str(),
                report.path.display()
            ),
            Err(err) => {
                failed += 1;
                println!("FAIL  {:<32} {err}", report.kind.as_str());
            }
        }
    }
    if failed > 0 {
        log::warn!("{failed} table(s) failed to load");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
