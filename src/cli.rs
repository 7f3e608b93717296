use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rewrites AMD and CommonJS JavaScript modules onto a single namespaced
/// form, so a whole-program optimizer can reason about one module system.
#[derive(Parser, Debug)]
#[command(
    name = "modnorm",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite a single AMD module file into CommonJS form.
    Amd {
        /// Path to the `.js` file to rewrite.
        file: PathBuf,

        /// Print the rewritten source to stdout instead of overwriting the file.
        #[arg(long)]
        stdout: bool,
    },

    /// Rewrite a single CommonJS module file into namespaced form.
    Cjs {
        /// Path to the `.js` file to rewrite.
        file: PathBuf,

        /// Print the rewritten source to stdout instead of overwriting the file.
        #[arg(long)]
        stdout: bool,

        /// Prefix prepended to the derived module identifier.
        #[arg(long)]
        prefix: Option<String>,

        /// Print provide/require relationships discovered while rewriting.
        #[arg(long)]
        report_deps: bool,
    },

    /// Run AMD-to-CJS then CJS-to-Namespaced over every `.js` file under `path`.
    Normalize {
        /// Path to the project root to walk.
        path: PathBuf,

        /// Print each file's outcome as it's processed.
        #[arg(short, long)]
        verbose: bool,

        /// Output the run summary as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}
