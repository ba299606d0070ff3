//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CameraIntrinsics, DepthLookup, DropPolicy, FusionBlueprint};
use projection::ProjectionEngine;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    cameras: CameraInfo,
    target: TargetInfo,
    topics: Vec<TopicInfo>,
    lookup: DepthLookup,
    ingestion: IngestionInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct CameraInfo {
    color: CameraIntrinsics,
    depth: CameraIntrinsics,
    /// Depth pixel the color principal point maps to
    #[serde(skip_serializing_if = "Option::is_none")]
    principal_point_in_depth: Option<(i64, i64)>,
}

#[derive(Serialize)]
struct TargetInfo {
    class_id: i64,
    label: String,
}

#[derive(Serialize)]
struct TopicInfo {
    role: &'static str,
    name: String,
}

#[derive(Serialize)]
struct IngestionInfo {
    color_queue_capacity: usize,
    drop_policy: DropPolicy,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = build_config_info(&blueprint);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &FusionBlueprint) -> ConfigInfo {
    let cameras = blueprint.cameras;
    let engine = ProjectionEngine::new(cameras, blueprint.projection.lookup);
    let principal_point_in_depth = engine.color_to_depth_pixel(
        cameras.color.cx.round() as i64,
        cameras.color.cy.round() as i64,
    );

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        cameras: CameraInfo {
            color: cameras.color,
            depth: cameras.depth,
            principal_point_in_depth,
        },
        target: TargetInfo {
            class_id: blueprint.target.class_id,
            label: blueprint.target.display_name(),
        },
        topics: blueprint
            .topic_entries()
            .into_iter()
            .map(|(role, name)| TopicInfo {
                role,
                name: name.to_string(),
            })
            .collect(),
        lookup: blueprint.projection.lookup,
        ingestion: IngestionInfo {
            color_queue_capacity: blueprint.ingestion.color_queue_capacity,
            drop_policy: blueprint.ingestion.drop_policy,
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect(),
    }
}

fn print_camera(name: &str, k: &CameraIntrinsics, last: bool) {
    let prefix = if last { "└─" } else { "├─" };
    println!(
        "   {prefix} {name}: fx={:.2} fy={:.2} cx={:.2} cy={:.2}",
        k.fx, k.fy, k.cx, k.cy
    );
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Depth Fusion Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📷 Cameras ({})", info.version);
    print_camera("Color", &info.cameras.color, false);
    print_camera("Depth", &info.cameras.depth, info.cameras.principal_point_in_depth.is_none());
    if let Some((x, y)) = info.cameras.principal_point_in_depth {
        println!("   └─ Color principal point -> depth pixel ({x}, {y})");
    }

    println!("\n🎯 Target");
    println!("   ├─ Class: {}", info.target.class_id);
    println!("   └─ Label: {}", info.target.label);

    println!("\n📡 Topics");
    for (i, topic) in info.topics.iter().enumerate() {
        let prefix = if i == info.topics.len() - 1 { "└─" } else { "├─" };
        println!("   {prefix} {}: {}", topic.role, topic.name);
    }

    println!("\n⚙️  Processing");
    println!("   ├─ Depth lookup: {:?}", info.lookup);
    println!(
        "   ├─ Color queue capacity: {}",
        info.ingestion.color_queue_capacity
    );
    println!("   └─ Drop policy: {:?}", info.ingestion.drop_policy);

    if info.sinks.is_empty() {
        println!("\n📤 Sinks: none");
    } else {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i == info.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {prefix} {} ({}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
