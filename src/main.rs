mod amd;
mod ast;
mod cjs;
mod cli;
mod config;
mod diagnostics;
mod module_name;
mod output;
mod scope;
mod walker;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser as JsParser;
use oxc_span::SourceType;
use rayon::prelude::*;

use amd::AmdRewriter;
use cjs::graph::{DependencyGraph, NullSink, RecordingSink};
use cjs::CjsRewriter;
use cli::{Cli, Commands};
use config::NormalizeConfig;
use diagnostics::{Diagnostic, Reporter, StderrReporter, VecReporter};
use output::{print_summary, RewriteStats};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Amd { file, stdout } => run_amd(&file, stdout),
        Commands::Cjs {
            file,
            stdout,
            prefix,
            report_deps,
        } => run_cjs(&file, stdout, prefix.as_deref(), report_deps),
        Commands::Normalize { path, verbose, json } => run_normalize(&path, verbose, json),
    }
}

/// Read, parse, rewrite, and emit a single AMD source file.
fn run_amd(file: &Path, stdout: bool) -> Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let source_name = file.display().to_string();

    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file).unwrap_or_default();
    let parse_result = JsParser::new(&allocator, &source, source_type).parse();
    if !parse_result.errors.is_empty() {
        anyhow::bail!("failed to parse {}: {:?}", source_name, parse_result.errors);
    }
    let mut program = parse_result.program;

    let factory = ast::factory::Factory::new(&allocator);
    let mut reporter = StderrReporter::new();
    AmdRewriter::new().rewrite(&factory, &mut program, &source_name, &mut reporter);

    emit(&program, file, stdout)?;

    if reporter.has_errors() {
        anyhow::bail!("{} had unsupported define() signatures", source_name);
    }
    Ok(())
}

/// Read, parse, rewrite, and emit a single CJS source file.
fn run_cjs(file: &Path, stdout: bool, prefix: Option<&str>, report_deps: bool) -> Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let source_name = file.display().to_string();
    let module_path = with_prefix(&source_name, prefix);

    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file).unwrap_or_default();
    let parse_result = JsParser::new(&allocator, &source, source_type).parse();
    if !parse_result.errors.is_empty() {
        anyhow::bail!("failed to parse {}: {:?}", source_name, parse_result.errors);
    }
    let mut program = parse_result.program;

    let factory = ast::factory::Factory::new(&allocator);
    let mut reporter = StderrReporter::new();

    if report_deps {
        let mut graph = DependencyGraph::new();
        CjsRewriter::rewrite(&factory, &mut program, &module_path, &mut graph, &mut reporter, true);
        for dep in graph.requires_of(&module_name::to_module_name(&module_path, None)) {
            eprintln!("require: {dep}");
        }
    } else {
        let mut sink = NullSink;
        CjsRewriter::rewrite(&factory, &mut program, &module_path, &mut sink, &mut reporter, false);
    }

    emit(&program, file, stdout)
}

fn with_prefix(source_name: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) => format!("{}/{}", p.trim_end_matches('/'), source_name),
        None => source_name.to_string(),
    }
}

fn emit(program: &oxc_ast::ast::Program, file: &Path, stdout: bool) -> Result<()> {
    let code = Codegen::new().build(program).code;
    if stdout {
        print!("{code}");
    } else {
        std::fs::write(file, code).with_context(|| format!("writing {}", file.display()))?;
    }
    Ok(())
}

/// Run AMD-to-CJS then CJS-to-Namespaced over every `.js` file under `path`
/// (spec.md §2's ordering rule: a file written in AMD is first reduced to
/// CJS shape, then every file — AMD-originated or already CJS — is
/// namespaced in a second pass).
///
/// Independent scripts are processed in parallel via `rayon` (spec.md §5):
/// each worker owns its own allocator, AST, and pass-local reporter/sink, so
/// nothing is mutated concurrently. The shared dependency graph and stderr
/// reporter are populated afterward by folding each file's collected
/// results in file order.
fn run_normalize(path: &Path, verbose: bool, json: bool) -> Result<()> {
    let start = Instant::now();
    let config = NormalizeConfig::load(path);
    let files = walker::walk_project(path, &config)?;

    let results: Vec<(PathBuf, Result<FileOutcome>)> = files
        .into_par_iter()
        .map(|file| {
            let outcome = normalize_one(&file, path, &config);
            (file, outcome)
        })
        .collect();

    let mut stats = RewriteStats::default();
    let mut graph = DependencyGraph::new();
    let mut reporter = StderrReporter::new();

    for (file, outcome) in results {
        stats.files_scanned += 1;
        match outcome {
            Ok(outcome) => {
                if outcome.amd_rewritten {
                    stats.amd_rewrites += 1;
                }
                stats.cjs_rewrites += 1;
                for diagnostic in outcome.diagnostics {
                    reporter.report(diagnostic);
                }
                outcome.sink.fold_into(&mut graph);
                if verbose {
                    eprintln!("normalized {}", file.display());
                }
            }
            Err(err) => {
                stats.skipped += 1;
                eprintln!("warning: skipping {}: {err}", file.display());
            }
        }
    }

    stats.modules_provided = graph.module_count();
    stats.errors = reporter.error_count();
    stats.warnings = reporter.warning_count();
    stats.elapsed_secs = start.elapsed().as_secs_f64();

    print_summary(&stats, json);
    Ok(())
}

struct FileOutcome {
    amd_rewritten: bool,
    diagnostics: Vec<Diagnostic>,
    sink: RecordingSink,
}

/// Rewrite a single file in isolation: its own allocator, AST, diagnostics
/// collector, and dependency-graph recorder, so this function can run on any
/// rayon worker thread without touching state any other file's worker touches.
fn normalize_one(file: &Path, project_root: &Path, config: &NormalizeConfig) -> Result<FileOutcome> {
    let source = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let relative = file.strip_prefix(project_root).unwrap_or(file);
    let source_name = with_prefix(&relative.display().to_string(), config.filename_prefix.as_deref());

    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file).unwrap_or_default();
    let parse_result = JsParser::new(&allocator, &source, source_type).parse();
    if !parse_result.errors.is_empty() {
        anyhow::bail!("parse error: {:?}", parse_result.errors);
    }
    let mut program = parse_result.program;

    let factory = ast::factory::Factory::new(&allocator);
    let mut reporter = VecReporter::new();
    let amd_rewritten = AmdRewriter::new().rewrite(&factory, &mut program, &source_name, &mut reporter);
    let mut sink = RecordingSink::default();
    CjsRewriter::rewrite(
        &factory,
        &mut program,
        &source_name,
        &mut sink,
        &mut reporter,
        config.report_dependencies,
    );

    let code = Codegen::new().build(&program).code;
    std::fs::write(file, code).with_context(|| format!("writing {}", file.display()))?;

    Ok(FileOutcome {
        amd_rewritten,
        diagnostics: reporter.diagnostics,
        sink,
    })
}
