//! Run command implementation
//!
//! This module implements the `run` command, which performs one export run
//! across the configured regions.

use crate::config::parse_config;
use crate::core::export::{Orchestrator, RunErrorType, RunSummary};
use crate::core::state::ExportStatus;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// List the units that would be exported without submitting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Limit the run to these regions (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub region: Vec<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match parse_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.restrict_regions(&self.region) {
            eprintln!("Invalid --region: {e}");
            return Ok(2);
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;

        if !self.yes && !dry_run {
            println!("Run Configuration:");
            for region in &config.regions {
                println!("  {} -> {}", region.region, region.bucket);
            }
            println!("  Destination prefix: {}", config.export.destination_prefix);
            println!("  Progress store: {}", config.store.backend);
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Run cancelled.");
                return Ok(0);
            }
        }

        let orchestrator = match Orchestrator::from_config(&config, shutdown_signal).await {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create orchestrator");
                eprintln!("Failed to initialize run: {e}");
                return Ok(if matches!(e, crate::domain::ArchivistError::Configuration(_)) {
                    2
                } else {
                    4
                });
            }
        };

        if dry_run {
            return Ok(Self::print_plan(&orchestrator).await);
        }

        if let Err(e) = orchestrator.progress().ensure_schema().await {
            tracing::error!(error = %e, "Progress store is not reachable");
            eprintln!("Progress store is not reachable: {e}");
            return Ok(4);
        }

        let window = orchestrator.settings().window;
        println!(
            "Exporting {} .. {}",
            window.from.format("%Y-%m-%d %H:%M UTC"),
            window.to.format("%Y-%m-%d %H:%M UTC")
        );
        println!();

        let summary = orchestrator.execute_run().await;
        print_summary(&summary);

        Ok(exit_code(&summary))
    }

    async fn print_plan(orchestrator: &Orchestrator) -> i32 {
        println!("DRY RUN - no export tasks will be submitted");
        println!();

        match orchestrator.plan().await {
            Ok(units) if units.is_empty() => {
                println!("Nothing to export.");
                0
            }
            Ok(units) => {
                println!("Units in export order:");
                for (i, unit) in units.iter().enumerate() {
                    println!("  {:>4}. {}  {}", i + 1, unit.region, unit.name);
                }
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "Dry run failed");
                eprintln!("Dry run failed: {e}");
                4
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run Summary ({}):", summary.run_id);
    println!("  Units discovered: {}", summary.units_discovered);
    println!("  Submitted: {}", summary.submitted);
    println!("  Completed: {}", summary.completed);
    println!("  Failed: {}", summary.failed);
    println!("  Reconciled: {}", summary.reconciled);
    println!(
        "  Still pending: {}",
        summary.count_with_status(ExportStatus::Pending)
    );
    println!("  Wait cycles: {}", summary.wait_cycles);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

/// Map a run summary to the process exit code
pub fn exit_code(summary: &RunSummary) -> i32 {
    match &summary.abort {
        Some(abort) => match abort.error_type {
            RunErrorType::Timeout => {
                println!("Run timed out. Progress saved; the next run resumes from here.");
                124
            }
            RunErrorType::Interrupted => {
                println!("Run interrupted. Progress saved; the next run resumes from here.");
                130
            }
            RunErrorType::Configuration => 2,
            _ => {
                println!("Run aborted: {}", abort.message);
                5
            }
        },
        None if summary.is_successful() => {
            println!("Run completed successfully!");
            0
        }
        None => {
            println!("Run completed with failed units");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::{RunError, RunPhase};

    fn done_summary(failed: usize) -> RunSummary {
        let mut summary = RunSummary::new("run-1");
        summary.trace = vec![RunPhase::Discover, RunPhase::Select, RunPhase::Done];
        summary.failed = failed;
        summary
    }

    #[test]
    fn test_run_args_defaults() {
        let args = RunArgs::default();
        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(args.region.is_empty());
    }

    #[test]
    fn test_exit_code_success_and_failures() {
        assert_eq!(exit_code(&done_summary(0)), 0);
        assert_eq!(exit_code(&done_summary(2)), 1);
    }

    #[test]
    fn test_exit_code_aborts() {
        let mut summary = done_summary(0);
        summary.abort = Some(RunError::new(RunErrorType::Timeout, "budget"));
        assert_eq!(exit_code(&summary), 124);

        summary.abort = Some(RunError::new(RunErrorType::Interrupted, "SIGTERM"));
        assert_eq!(exit_code(&summary), 130);

        summary.abort = Some(RunError::new(RunErrorType::Persistence, "write failed"));
        assert_eq!(exit_code(&summary), 5);
    }
}
