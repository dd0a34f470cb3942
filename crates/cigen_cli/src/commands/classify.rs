//! Classify command - Show what an event would deploy.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use cigen_trigger::{TriggerEvent, TriggerStateMachine};

use crate::commands::UsageError;
use crate::config::CigenConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Event name: pull_request, tag_push, release_published or workflow_dispatch
    #[arg(long)]
    event: String,

    /// Tag name for tag_push and release_published
    #[arg(long)]
    tag: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Project root whose cigen.toml is read (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Let hotfix releases skip lint and test
    #[arg(long, env = "CIGEN_EMERGENCY_MODE", value_name = "BOOL")]
    emergency_mode: Option<bool>,
}

pub fn execute(args: ClassifyArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let config = CigenConfig::load(&root)?.with_overrides(args.emergency_mode, None);

    let event = TriggerEvent::from_parts(&args.event, args.tag.as_deref()).ok_or_else(|| {
        UsageError(format!(
            "Unknown event '{}' (tag events also need --tag)",
            args.event
        ))
    })?;

    let classification = TriggerStateMachine::new(config.trigger).classify(&event);
    let intent = &classification.intent;

    match args.format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&classification)?;
            value["environment"] = intent.environment().into();
            value["skip_gates"] = intent.skips_gates().into();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("intent:      {}", intent.as_str());
            println!("environment: {}", intent.environment().unwrap_or("-"));
            println!("skip_gates:  {}", intent.skips_gates());
            if let Some(reason) = &classification.reason {
                println!("reason:      {}", reason);
            }
        }
    }

    Ok(())
}
