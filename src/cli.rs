use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Crucible: in-container batch runner for known-answer testing",
    long_about = "Crucible executes a student submission against batched test cases\n\
                  inside a prepared container. The host orchestrator ships a JSON run\n\
                  configuration naming the DUT directory, the build and solution\n\
                  scripts, and the test cases with their runtime allowances; Crucible\n\
                  builds the submission, runs the batches under wall-clock budgets,\n\
                  bisects failing batches to localize offenders, and writes a single\n\
                  JSON report to stdout.\n\n\
                  Example:\n  \
                  crucible /run/config.json > report.json"
)]
pub struct Cli {
    /// Path to the JSON run configuration prepared by the host orchestrator
    pub config: PathBuf,

    /// Emit diagnostic lines to stderr regardless of the config's debug option
    #[arg(long, help = "Force diagnostic output to stderr")]
    pub debug: bool,
}
