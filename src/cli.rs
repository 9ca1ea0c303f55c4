//! CLI struct definitions for the `labgen` binary.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use crate::core::lab::TemplateType;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "labgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "Turn a learning goal into a strictly-typed lab, and re-normalize stored labs.",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Config file (otherwise LABGEN_CONFIG, then ./labgen.toml).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(clap::Args, Debug)]
pub(crate) struct GenerateCli {
    /// Free-text learning goal.
    #[clap(long)]
    pub goal: String,
    /// Extra context passed to both model calls.
    #[clap(long)]
    pub context: Option<String>,
    /// Learner level, used when the content omits a difficulty.
    #[clap(long, value_enum)]
    pub level: Option<LevelArg>,
    /// Target duration in minutes.
    #[clap(long)]
    pub duration: Option<u32>,
    /// JSON array of covered curriculum items to build a scope context from.
    #[clap(long)]
    pub scope_file: Option<PathBuf>,
    /// JSON array of the two raw model responses to replay instead of
    /// calling the configured model command.
    #[clap(long)]
    pub replay: Option<PathBuf>,
    /// Include the normalization report in the output.
    #[clap(long)]
    pub report: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct NormalizeCli {
    /// Template type of the payload.
    #[clap(long, value_enum)]
    pub template: TemplateType,
    /// Payload file; stdin when omitted.
    #[clap(long)]
    pub file: Option<PathBuf>,
    /// Include the normalization report in the output.
    #[clap(long)]
    pub report: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct NormalizeBatchCli {
    /// Directory of stored LabSpec `.json` files.
    #[clap(long)]
    pub dir: PathBuf,
    /// Rewrite files whose normalized form differs.
    #[clap(long)]
    pub write: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct PromptsCli {
    #[clap(subcommand)]
    pub command: PromptsCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum PromptsCommand {
    /// List embedded prompt files.
    List,
    /// Print the rendered content prompt for a template type.
    Show {
        #[clap(long, value_enum)]
        template: TemplateType,
        #[clap(long, value_enum, default_value = "intermediate")]
        level: LevelArg,
        #[clap(long, default_value_t = 45)]
        duration: u32,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct ScopeCli {
    /// JSON array of covered curriculum items.
    #[clap(long)]
    pub file: PathBuf,
    /// JSON array of upcoming curriculum items.
    #[clap(long)]
    pub upcoming: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Generate a lab from a learning goal.
    Generate(GenerateCli),
    /// Normalize one template payload.
    Normalize(NormalizeCli),
    /// Re-normalize a directory of stored LabSpec files.
    NormalizeBatch(NormalizeBatchCli),
    /// Inspect embedded prompts.
    Prompts(PromptsCli),
    /// Build a scope-context block from curriculum items.
    Scope(ScopeCli),
    /// Print the version.
    Version,
}
