//! Tessera CLI, the command-line front end of the CGRA mapper.
//!
//! `tessera map` loads a DFG, an MRRG and optional latency and fixed-mapping
//! tables, searches for a placement and routing, and writes the placement and
//! interconnect reports consumed by configuration generation.

#![warn(missing_docs)]

mod map;

use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

/// Tessera, a heuristic CGRA mapper.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera CGRA Mapper")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Map a DFG onto an MRRG and write the reports.
    Map(MapArgs),
}

/// Arguments for the `tessera map` subcommand.
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// DFG description (JSON).
    #[arg(long)]
    pub dfg: String,

    /// MRRG description (JSON).
    #[arg(long)]
    pub mrrg: String,

    /// Per-node latency table (JSON). Unlisted nodes have latency 0.
    #[arg(long)]
    pub latency: Option<String>,

    /// Fixed-mapping table (JSON).
    #[arg(long)]
    pub fixed: Option<String>,

    /// Path to a `tessera.toml` configuration file.
    #[arg(long)]
    pub config: Option<String>,

    /// Initiation interval.
    #[arg(long)]
    pub ii: Option<u32>,

    /// Allowed skew between converging inputs.
    #[arg(long)]
    pub max_delay: Option<u32>,

    /// Seed for reshuffling candidates between attempts.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of attempts before giving up.
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Artifact base name; reports go to `<name>_r.txt` and `<name>_i.txt`.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the outcome as JSON on stdout and diagnostics as JSON lines.
    #[arg(long)]
    pub json: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from the environment.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
    };

    let result = match cli.command {
        Command::Map(ref args) => map::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Explicit `-v`/`-q` flags win over `RUST_LOG`.
fn init_logging(quiet: bool, verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level_for(quiet, verbose) {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}

fn level_for(quiet: bool, verbose: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (true, _) => Some(LevelFilter::Error),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::Debug),
        (false, _) => Some(LevelFilter::Trace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_map_minimal() {
        let cli = Cli::parse_from(["tessera", "map", "--dfg", "k.dfg.json", "--mrrg", "a.json"]);
        let Command::Map(ref args) = cli.command;
        assert_eq!(args.dfg, "k.dfg.json");
        assert_eq!(args.mrrg, "a.json");
        assert!(args.latency.is_none());
        assert!(args.fixed.is_none());
        assert!(args.ii.is_none());
        assert!(!args.json);
    }

    #[test]
    fn parse_map_overrides() {
        let cli = Cli::parse_from([
            "tessera", "map", "--dfg", "d.json", "--mrrg", "m.json", "--latency", "l.json",
            "--fixed", "f.json", "--ii", "2", "--max-delay", "0", "--seed", "7", "--attempts",
            "3", "-o", "out/kernel", "--json",
        ]);
        let Command::Map(ref args) = cli.command;
        assert_eq!(args.latency.as_deref(), Some("l.json"));
        assert_eq!(args.fixed.as_deref(), Some("f.json"));
        assert_eq!(args.ii, Some(2));
        assert_eq!(args.max_delay, Some(0));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.attempts, Some(3));
        assert_eq!(args.output.as_deref(), Some("out/kernel"));
        assert!(args.json);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["tessera", "-vv", "map", "--dfg", "d", "--mrrg", "m"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(level_for(cli.quiet, cli.verbose), Some(LevelFilter::Trace));
        assert_eq!(level_for(false, 1), Some(LevelFilter::Debug));
        assert_eq!(level_for(false, 0), None);
        assert_eq!(level_for(true, 2), Some(LevelFilter::Error));
    }

    #[test]
    fn map_requires_graphs() {
        assert!(Cli::try_parse_from(["tessera", "map", "--dfg", "d.json"]).is_err());
    }

    #[test]
    fn parse_color_never() {
        let cli = Cli::parse_from(["tessera", "--color", "never", "map", "--dfg", "d", "--mrrg", "m"]);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn package_metadata_is_inherited() {
        assert_eq!(env!("CARGO_PKG_REPOSITORY"), "https://github.com/tessera-cgra/tessera");
        assert_eq!(env!("CARGO_PKG_LICENSE"), "MIT OR Apache-2.0");
    }
}
