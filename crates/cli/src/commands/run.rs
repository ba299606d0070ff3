//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        target_class = blueprint.target.class_id,
        lookup = ?blueprint.projection.lookup,
        color_topic = %blueprint.topics.color,
        depth_topic = %blueprint.topics.depth,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        color_hz: args.color_hz,
        depth_hz: args.depth_hz,
        depth_encoding: args.depth_encoding.clone(),
        model_fail_every: args.model_fail_every,
        buffer_size: args.buffer_size,
        ..PipelineConfig::new(blueprint)
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        color_frames = stats.color_frames,
        annotated = stats.correlation.total_frames,
        abandoned = stats.correlation.frames_abandoned,
        reason = %stats.stop_reason,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("Depth fusion finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::FusionBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!(
        "Target: {} (class {})",
        blueprint.target.display_name(),
        blueprint.target.class_id
    );
    println!("Lookup: {:?}", blueprint.projection.lookup);

    println!("\nTopics:");
    for (role, topic) in blueprint.topic_entries() {
        println!("  {role:<18} {topic}");
    }

    println!(
        "\nColor queue: {} ({:?})",
        blueprint.ingestion.color_queue_capacity, blueprint.ingestion.drop_policy
    );

    if blueprint.sinks.is_empty() {
        println!("\nSinks: none");
    } else {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
