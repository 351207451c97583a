//! `tessera map`: load, search, report.
//!
//! 1. Load `tessera.toml` (or defaults) and apply flag overrides
//! 2. Load the DFG, MRRG, latency table and fixed mapping
//! 3. Run the mapper
//! 4. Write `<name>_r.txt` and `<name>_i.txt` when a mapping was found
//! 5. Render diagnostics to stderr

use std::path::Path;

use tessera_config::{load_config, validate_config, MapperConfig};
use tessera_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, TerminalRenderer,
};
use tessera_graph::{load_dfg, load_fixed, load_latencies, load_mrrg, FixedMapping};
use tessera_map::{map, write_artifacts, MapOutcome, MappingProblem};

use crate::{GlobalArgs, MapArgs};

/// Runs the `tessera map` command.
///
/// Returns exit code 0 when artifacts were written, 1 when no mapping was
/// found and 2 on an internal mapper error. Load and configuration errors
/// propagate as `Err`.
pub fn run(args: &MapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;

    let dfg = load_dfg(Path::new(&args.dfg))?;
    let mut mrrg = load_mrrg(Path::new(&args.mrrg))?;
    if let Some(path) = &args.latency {
        mrrg.apply_latencies(&load_latencies(Path::new(path))?);
    }
    let fixed = match &args.fixed {
        Some(path) => load_fixed(Path::new(path))?,
        None => FixedMapping::new(),
    };
    let problem = MappingProblem::new(dfg, mrrg, fixed)?;

    if !global.quiet && !args.json {
        eprintln!(
            "     Mapping {} operations onto {} MRRG nodes (II {})",
            problem.dfg.len(),
            problem.mrrg.len(),
            config.mapping.ii
        );
    }

    let sink = DiagnosticSink::new();
    let outcome = match map(&problem, &config.mapping, &sink) {
        Ok(outcome) => outcome,
        Err(e) => {
            render(&sink.take_all(), args, global);
            eprintln!("error: {e}");
            return Ok(2);
        }
    };

    let code = match &outcome {
        MapOutcome::Mapped(mapping) => {
            let base = Path::new(&config.output.name);
            let (placed, ports) =
                write_artifacts(&problem, mapping, base, &config.output.internal_marker)?;
            if !global.quiet && !args.json {
                eprintln!("       Wrote {} and {}", placed.display(), ports.display());
            }
            0
        }
        MapOutcome::Unmapped(_) => 1,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    render(&sink.take_all(), args, global);
    Ok(code)
}

/// Loads the configuration file, if any, and applies flag overrides.
fn resolve_config(args: &MapArgs) -> Result<MapperConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(Path::new(path))?,
        None => MapperConfig::default(),
    };
    let mapping = &mut config.mapping;
    if let Some(ii) = args.ii {
        mapping.ii = ii;
    }
    if let Some(max_delay) = args.max_delay {
        mapping.max_delay = max_delay;
    }
    if let Some(seed) = args.seed {
        mapping.seed = seed;
    }
    if let Some(attempts) = args.attempts {
        mapping.max_attempts = attempts;
    }
    if let Some(name) = &args.output {
        config.output.name = name.clone();
    }
    validate_config(&config)?;
    Ok(config)
}

fn render(diagnostics: &[Diagnostic], args: &MapArgs, global: &GlobalArgs) {
    let shown: Vec<Diagnostic> = diagnostics
        .iter()
        .filter(|d| !global.quiet || d.severity.is_error())
        .cloned()
        .collect();
    let text = if args.json {
        JsonRenderer.render_all(&shown)
    } else {
        TerminalRenderer::new(global.color).render_all(&shown)
    };
    eprint!("{text}");
}
