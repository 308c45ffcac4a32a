//! Action handlers behind the command line
//!
//! Every handler returns a process exit code. Failures become a single
//! `[ERROR]` line on stderr.

use anyhow::{Context, Result};
use tracing::debug;

use super::commands::CliArgs;
use super::output::{OutputFormat, OutputFormatter, Summary};
use crate::config::ToolConfig;
use crate::dialect::AppDefaults;
use crate::pipeline::Configurator;
use crate::selfcheck;
use crate::update::{Outcome, UpdateMode};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Safe update refused to overwrite the live manifest
pub const EXIT_BLOCKED: i32 = 2;

/// Runs whatever the arguments ask for
pub fn handle(args: &CliArgs) -> i32 {
    match dispatch(args) {
        Ok(code) => code,
        Err(e) => {
            debug!(error = ?e, "Run failed");
            eprintln!("[ERROR] {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn dispatch(args: &CliArgs) -> Result<i32> {
    let tool = ToolConfig::default();
    tool.validate().context("Invalid GRADLECFG_* environment")?;
    debug!("Tool configuration: {:?}", tool);

    if args.show_config {
        return handle_show_config(args, &tool);
    }
    if args.self_check {
        return handle_self_check(args, &tool);
    }
    handle_config(args, tool)
}

fn handle_show_config(args: &CliArgs, tool: &ToolConfig) -> Result<i32> {
    let formatter = OutputFormatter::new(OutputFormat::from(args.output));
    println!("{}", formatter.format_config(tool)?);
    Ok(EXIT_SUCCESS)
}

fn handle_self_check(args: &CliArgs, tool: &ToolConfig) -> Result<i32> {
    let checked = selfcheck::run(&AppDefaults::from(tool)).context("Self-check failed")?;
    if !args.quiet {
        for doc in &checked {
            println!(
                "\u{2713} {} ({}, {} dependencies)",
                doc.name, doc.dialect, doc.dependencies
            );
        }
        println!("Self-check passed");
    }
    Ok(EXIT_SUCCESS)
}

fn handle_config(args: &CliArgs, tool: ToolConfig) -> Result<i32> {
    let config_path = args
        .config
        .as_ref()
        .context("--config is required unless --self-check is given")?;

    let mut configurator = Configurator::new(config_path, args.format.forced(), tool);
    if let Some(project_dir) = &args.project_dir {
        configurator = configurator.with_project_root(project_dir);
    }

    let resolved = configurator.load()?;

    if args.summary || !args.has_action() {
        let formatter = OutputFormatter::new(OutputFormat::from(args.output));
        let summary = Summary::new(configurator.config_path(), &resolved);
        println!("{}", formatter.format_summary(&summary)?);
    }

    if !args.has_action() {
        println!("No action selected: use -g to generate, -u to update or -s for the summary only.");
        return Ok(EXIT_SUCCESS);
    }

    if args.generate {
        let path = configurator.generate(&resolved)?;
        if !args.quiet {
            println!("Generated {}", path.display());
        }
    }

    if args.update {
        let mode = UpdateMode {
            safe: args.safe,
            force: args.force,
        };
        let live = configurator.live_manifest_path();
        match configurator.update(&resolved, mode)? {
            Outcome::Blocked { diff } => {
                print!("{}", diff);
                eprintln!(
                    "[BLOCKED] {} has local changes; rerun with --force to overwrite (a backup is kept)",
                    live.display()
                );
                return Ok(EXIT_BLOCKED);
            }
            outcome => {
                if !args.quiet {
                    println!("Updated {}: {}", live.display(), outcome);
                }
            }
        }
    }

    Ok(EXIT_SUCCESS)
}
