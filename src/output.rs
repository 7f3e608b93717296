use serde::Serialize;

/// Aggregate statistics produced by a `normalize` run.
#[derive(Debug, Serialize, Default)]
pub struct RewriteStats {
    pub files_scanned: usize,
    /// Files where the AMD pass rewrote at least one `define(...)` call.
    pub amd_rewrites: usize,
    /// Files successfully rewritten by the CJS pass into namespaced form.
    pub cjs_rewrites: usize,
    /// Distinct module identifiers provided across the run.
    pub modules_provided: usize,
    /// Files skipped due to a read or parse failure.
    pub skipped: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Wall-clock time for the run in seconds.
    pub elapsed_secs: f64,
}

/// Print a summary of a `normalize` run.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// If `stats.skipped > 0`, a warning line is written to stderr so stdout
/// stays clean for downstream JSON consumers.
pub fn print_summary(stats: &RewriteStats, json: bool) {
    if json {
        match serde_json::to_string_pretty(stats) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("error serialising stats: {e}"),
        }
        return;
    }

    println!(
        "Normalized {} files in {:.2}s",
        stats.files_scanned, stats.elapsed_secs
    );
    println!(
        "  {} AMD rewrites, {} CJS rewrites, {} modules provided",
        stats.amd_rewrites, stats.cjs_rewrites, stats.modules_provided
    );
    if stats.errors > 0 || stats.warnings > 0 {
        println!("  {} errors, {} warnings", stats.errors, stats.warnings);
    }

    if stats.skipped > 0 {
        eprintln!("  {} files skipped (read or parse errors)", stats.skipped);
    }
}
