use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;

use sieve_compare::{diff_rendered, render, ComponentChange, CompositeDiff, DiffLine};
use sieve_merge::{CompositeFilter, MergeAction};
use sieve_types::{Arity, Node, Operator};
use sieve_wire::{QueryEncoder, ScalarTypeRegistry};

use crate::cli::*;
use crate::config::SieveConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SieveConfig::load(&cli.config)?;
    match cli.command {
        Command::Replay(args) => cmd_replay(&config, args, cli.format),
        Command::Encode(args) => cmd_encode(&config, args, cli.format),
        Command::Operators => cmd_operators(cli.format),
    }
}

/// One widget update in a replay script.
#[derive(Debug, Deserialize)]
struct ScriptStep {
    #[serde(default)]
    component: Option<String>,
    #[serde(default)]
    condition: Option<Node>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepReport {
    step: usize,
    component: Option<String>,
    action: &'static str,
    changed: bool,
    revision: u64,
    composite: Arc<Node>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn cmd_replay(config: &SieveConfig, args: ReplayArgs, format: OutputFormat) -> anyhow::Result<()> {
    let steps: Vec<ScriptStep> = read_json(&args.script)?;
    let registry = Arc::new(config.registry()?);
    let filter = CompositeFilter::new(config.merger(Arc::clone(&registry)));
    tracing::info!(steps = steps.len(), script = %args.script.display(), "replaying");

    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.into_iter().enumerate() {
        let before = filter.snapshot();
        let outcome = filter
            .update(step.component.as_deref(), step.condition)
            .with_context(|| format!("step {}", index + 1))?;

        if format == OutputFormat::Text {
            print_step(index + 1, step.component.as_deref(), outcome.action, outcome.revision);
            if args.diff && outcome.changed {
                print_diff(&diff_rendered(before.as_deref(), Some(&*outcome.composite)));
            }
        }

        reports.push(StepReport {
            step: index + 1,
            component: step.component,
            action: outcome.action.as_str(),
            changed: outcome.changed,
            revision: outcome.revision,
            composite: outcome.composite,
        });
    }

    let final_composite = filter.snapshot();
    let encoder = QueryEncoder::new(&registry);
    let document = encoder.encode(final_composite.as_deref())?;
    let cache_key = encoder.cache_key(final_composite.as_deref())?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "Composite".bold());
            print!("{}", render(final_composite.as_deref()));
            print_encoded(document.as_ref(), cache_key.as_deref())?;
        }
        OutputFormat::Json => {
            let report = json!({
                "steps": reports,
                "revision": filter.revision(),
                "composite": final_composite,
                "document": document,
                "cacheKey": cache_key,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn cmd_encode(config: &SieveConfig, args: EncodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tree: Node = read_json(&args.tree)?;
    let registry: ScalarTypeRegistry = config.registry()?;
    let encoder = QueryEncoder::new(&registry);
    let document = encoder
        .encode(Some(&tree))
        .with_context(|| format!("failed to encode {}", args.tree.display()))?;
    let cache_key = encoder.cache_key(Some(&tree))?;

    match format {
        OutputFormat::Text => {
            println!("{}", tree.to_string().dimmed());
            print_encoded(document.as_ref(), cache_key.as_deref())?;
        }
        OutputFormat::Json => {
            let report = json!({ "document": document, "cacheKey": cache_key });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn cmd_operators(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for op in Operator::ALL {
                let kind = if op.is_logical() { "logical" } else { "" };
                let arity = op.arity().to_string();
                println!("{:<12} {:<9} {}", op.as_str().bold(), arity, kind.dimmed());
            }
        }
        OutputFormat::Json => {
            let table: Vec<_> = Operator::ALL
                .iter()
                .map(|op| {
                    let arity = match op.arity() {
                        Arity::Variadic => json!("variadic"),
                        Arity::Fixed(n) => json!(n),
                    };
                    json!({ "name": op.as_str(), "arity": arity, "logical": op.is_logical() })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
    }
    Ok(())
}

fn print_step(step: usize, component: Option<&str>, action: MergeAction, revision: u64) {
    let label = match action {
        MergeAction::Unchanged => "unchanged".dimmed(),
        MergeAction::Created | MergeAction::Appended => action.as_str().green(),
        MergeAction::Replaced => action.as_str().yellow(),
    };
    let component = component.unwrap_or("(anonymous)");
    println!("{:>3}  {:<20} {:<10} r{}", step, component.cyan(), label, revision);
}

fn print_diff(diff: &CompositeDiff) {
    for change in &diff.changes {
        let id = change.id().unwrap_or("(anonymous)");
        match change {
            ComponentChange::Added { condition, .. } => {
                println!("     {}", format!("+ component {id:?}").green());
                for line in render(condition.as_ref()).lines() {
                    println!("     {}", format!("+  {line}").green());
                }
            }
            ComponentChange::Removed { .. } => {
                println!("     {}", format!("- component {id:?}").red());
            }
            ComponentChange::Changed { lines, .. } => {
                println!("     {}", format!("~ component {id:?}").cyan());
                for line in lines {
                    match line {
                        DiffLine::Context(text) => println!("        {text}"),
                        DiffLine::Added(text) => println!("     {}", format!("+  {text}").green()),
                        DiffLine::Removed(text) => println!("     {}", format!("-  {text}").red()),
                    }
                }
            }
        }
    }
}

fn print_encoded(
    document: Option<&serde_json::Value>,
    cache_key: Option<&str>,
) -> anyhow::Result<()> {
    match (document, cache_key) {
        (Some(document), Some(key)) => {
            println!("{}", serde_json::to_string_pretty(document)?);
            println!("cache key: {}", key.yellow());
        }
        _ => println!("{}", "(no constraint)".dimmed()),
    }
    Ok(())
}
