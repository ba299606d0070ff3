//! FileSink - writes rendered overlays and correlation metadata to disk
//!
//! Layout under `base_path`:
//! - `annotated/<frame_id>.png` color image with overlays
//! - `meta/<frame_id>.json` correlation summary
//! - `depth/<frame_id>.png` colorized depth with markers (`depth_overlay = "true"`)

use chrono::{SecondsFormat, Utc};
use contracts::{AnnotatedFrame, AnnotationSummary, ContractError, DataSink};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::render;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Also write the colorized depth snapshot
    pub depth_overlay: bool,
}

impl FileSinkConfig {
    /// Read `base_path` (default `./output`) and `depth_overlay` (default off)
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));
        let depth_overlay = params
            .get("depth_overlay")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"));

        Self {
            base_path,
            depth_overlay,
        }
    }
}

#[derive(Serialize)]
struct FrameMetadata<'a> {
    #[serde(flatten)]
    summary: &'a AnnotationSummary,
    located: usize,
    written_at: String,
}

/// Sink that writes annotated frames to disk
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    created_dirs: HashSet<PathBuf>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            created_dirs: HashSet::new(),
        })
    }

    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }
}

fn output_dir(
    base_path: &Path,
    created_dirs: &mut HashSet<PathBuf>,
    kind: &str,
) -> std::io::Result<PathBuf> {
    let dir = base_path.join(kind);
    if !created_dirs.contains(&dir) {
        fs::create_dir_all(&dir)?;
        created_dirs.insert(dir.clone());
    }
    Ok(dir)
}

/// Render, encode and write every output file of one frame
fn write_frame_to_disk(
    config: &FileSinkConfig,
    created_dirs: &mut HashSet<PathBuf>,
    frame: &AnnotatedFrame,
) -> std::io::Result<()> {
    let frame_id = frame.frame_id;
    let base = config.base_path.as_path();

    let rendered = render::render_annotated(frame).map_err(std::io::Error::other)?;
    let path = output_dir(base, created_dirs, "annotated")?.join(format!("{frame_id}.png"));
    rendered.save(&path).map_err(std::io::Error::other)?;

    let summary = frame.summary();
    let metadata = FrameMetadata {
        summary: &summary,
        located: frame.located_count(),
        written_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    let path = output_dir(base, created_dirs, "meta")?.join(format!("{frame_id}.json"));
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &metadata)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if config.depth_overlay {
        if let Some(depth) = render::render_depth(frame) {
            let path = output_dir(base, created_dirs, "depth")?.join(format!("{frame_id}.png"));
            depth.save(&path).map_err(std::io::Error::other)?;
        }
    }

    Ok(())
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id)
    )]
    async fn write(&mut self, frame: &AnnotatedFrame) -> Result<(), ContractError> {
        // Rendering, PNG encoding and file I/O all block
        let config = self.config.clone();
        let mut created_dirs = std::mem::take(&mut self.created_dirs);
        let frame = frame.clone();

        let (created_dirs, result) = tokio::task::spawn_blocking(move || {
            let result = write_frame_to_disk(&config, &mut created_dirs, &frame);
            (created_dirs, result)
        })
        .await
        .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        self.created_dirs = created_dirs;
        result.map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, base_path = %self.config.base_path.display(), "FileSink closed");
        Ok(())
    }
}
