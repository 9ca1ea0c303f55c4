//! labgen: learning-goal to lab generation with total schema normalization.
//!
//! A generation makes two sequential model calls. The first picks one of six
//! template shapes (analyze, build, derive, explain, explore, revise); the
//! second writes content for that shape. Model output is untrusted, so the
//! content is coerced into a strictly typed [`core::lab::LabSpec`] that is
//! always structurally valid, however malformed the JSON was.
//!
//! # Crate Structure
//!
//! - [`core`]: extraction, coercion, the LabSpec model, the pipeline, prompts,
//!   model clients, scope context, config and logging
//! - [`templates`]: one normalizer per template shape
//!
//! # Examples
//!
//! ```bash
//! # Generate by replaying two recorded model responses
//! labgen generate --goal "Solve Two Sum" --replay responses.json --report
//!
//! # Re-normalize a stored payload
//! labgen normalize --template build --file payload.json
//!
//! # Re-normalize every stored lab in a directory
//! labgen normalize-batch --dir labs/ --write
//! ```

mod cli;
pub mod core;
pub mod templates;

pub use core::error;

use clap::Parser;
use cli::{Cli, Command, GenerateCli, LevelArg, NormalizeBatchCli, NormalizeCli, PromptsCommand, ScopeCli};
use colored::Colorize;
use core::config::{LabgenConfig, load_config};
use core::error::LabgenError;
use core::extract::try_parse_json;
use core::lab::{Difficulty, LabSpec};
use core::logging::init_logging;
use core::model::{CommandModelClient, ModelClient, ScriptedModelClient};
use core::pipeline::{LabGenerator, LabRequest};
use core::scope::{CurriculumItem, build_scope_context};
use core::time::command_envelope;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

impl From<LevelArg> for Difficulty {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Beginner => Difficulty::Beginner,
            LevelArg::Intermediate => Difficulty::Intermediate,
            LevelArg::Advanced => Difficulty::Advanced,
        }
    }
}

pub fn run() -> Result<(), LabgenError> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Generate(args) => run_generate(args, &config),
        Command::Normalize(args) => run_normalize(args),
        Command::NormalizeBatch(args) => run_normalize_batch(args),
        Command::Prompts(prompts) => match prompts.command {
            PromptsCommand::List => {
                let extra = json!({ "prompts": core::assets::list_prompts() });
                print_json(&command_envelope("prompts.list", "ok", extra))
            }
            PromptsCommand::Show {
                template,
                level,
                duration,
            } => {
                print!("{}", core::prompts::render_for(template, level.into(), duration));
                Ok(())
            }
        },
        Command::Scope(args) => run_scope(args, &config),
    }
}

fn print_json(value: &Value) -> Result<(), LabgenError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String, LabgenError> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(LabgenError::NotFound(path.display().to_string()));
            }
            Ok(fs::read_to_string(path)?)
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn read_items(path: &Path) -> Result<Vec<CurriculumItem>, LabgenError> {
    let content = read_input(Some(path))?;
    serde_json::from_str(&content).map_err(|e| {
        LabgenError::ValidationError(format!(
            "{}: expected a JSON array of curriculum items: {}",
            path.display(),
            e
        ))
    })
}

/// A replay file is a JSON array of raw model responses, in call order.
fn replay_client(path: &Path) -> Result<ScriptedModelClient, LabgenError> {
    let content = read_input(Some(path))?;
    let responses: Vec<String> = serde_json::from_str(&content).map_err(|e| {
        LabgenError::ValidationError(format!(
            "{}: expected a JSON array of response strings: {}",
            path.display(),
            e
        ))
    })?;
    Ok(ScriptedModelClient::new(responses))
}

fn run_generate(args: GenerateCli, config: &LabgenConfig) -> Result<(), LabgenError> {
    let scope_block = match &args.scope_file {
        Some(path) => {
            let items = read_items(path)?;
            Some(build_scope_context(&items, &[], &config.scope).text)
        }
        None => None,
    };

    let client: Box<dyn ModelClient> = match (&args.replay, &config.model.command) {
        (Some(path), _) => Box::new(replay_client(path)?),
        (None, Some(command)) => Box::new(CommandModelClient::new(
            command.clone(),
            config.model.args.clone(),
        )),
        (None, None) => {
            return Err(LabgenError::ConfigError(
                "no model command configured; set [model].command or pass --replay".to_string(),
            ));
        }
    };

    let request = LabRequest {
        goal: args.goal,
        context: args.context,
        user_level: args.level.map(Difficulty::from),
        duration_minutes: args.duration,
        scope_block,
    };
    let generator = LabGenerator::new(client.as_ref(), &config.model);
    let lab = generator.generate(&request)?;

    let mut extra = json!({
        "request_id": lab.request_id,
        "content_hash": lab.spec.content_hash_hex()?,
        "fallbacks": lab.report.len(),
        "lab": lab.spec,
    });
    if args.report {
        extra["report"] = serde_json::to_value(&lab.report)?;
    }
    print_json(&command_envelope("generate", "ok", extra))
}

fn run_normalize(args: NormalizeCli) -> Result<(), LabgenError> {
    let input = read_input(args.file.as_deref())?;
    let value = try_parse_json(&input)
        .map_err(|f| LabgenError::ValidationError(format!("payload is not JSON: {}", f)))?;

    let (payload, report) = templates::normalize_with_report(args.template, &value);
    let mut extra = json!({
        "templateType": args.template,
        "templateData": payload.data_value()?,
        "fallbacks": report.len(),
    });
    if args.report {
        extra["report"] = serde_json::to_value(&report)?;
    }
    print_json(&command_envelope("normalize", "ok", extra))
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_hash: Option<String>,
    changed: bool,
    written: bool,
    fallbacks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn renormalize_file(path: &Path, write: bool) -> Result<BatchEntry, LabgenError> {
    let content = fs::read_to_string(path)?;
    let original: Value = serde_json::from_str(&content)?;
    let (spec, report) = LabSpec::from_value(&original)?;
    let normalized = serde_json::to_value(&spec)?;
    let changed = normalized != original;
    if changed && write {
        fs::write(path, serde_json::to_string_pretty(&normalized)? + "\n")?;
    }
    Ok(BatchEntry {
        file: path.display().to_string(),
        content_hash: Some(spec.content_hash_hex()?),
        changed,
        written: changed && write,
        fallbacks: report.len(),
        error: None,
    })
}

fn run_normalize_batch(args: NormalizeBatchCli) -> Result<(), LabgenError> {
    if !args.dir.is_dir() {
        return Err(LabgenError::NotFound(format!(
            "directory {}",
            args.dir.display()
        )));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(&args.dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let entries: Vec<BatchEntry> = files
        .par_iter()
        .map(|path| {
            renormalize_file(path, args.write).unwrap_or_else(|e| BatchEntry {
                file: path.display().to_string(),
                content_hash: None,
                changed: false,
                written: false,
                fallbacks: 0,
                error: Some(e.to_string()),
            })
        })
        .collect();

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    let changed = entries.iter().filter(|e| e.changed).count();
    eprintln!(
        "{} {} files, {} changed, {} failed",
        "normalize-batch".bold(),
        entries.len(),
        changed.to_string().yellow(),
        failed.to_string().red()
    );

    let status = if failed == 0 { "ok" } else { "partial" };
    let extra = json!({
        "total": entries.len(),
        "changed": changed,
        "failed": failed,
        "files": entries,
    });
    print_json(&command_envelope("normalize-batch", status, extra))
}

fn run_scope(args: ScopeCli, config: &LabgenConfig) -> Result<(), LabgenError> {
    let covered = read_items(&args.file)?;
    let upcoming = match &args.upcoming {
        Some(path) => read_items(path)?,
        None => Vec::new(),
    };
    let scope = build_scope_context(&covered, &upcoming, &config.scope);
    print_json(&command_envelope(
        "scope",
        "ok",
        json!({ "scope": serde_json::to_value(&scope)? }),
    ))
}
