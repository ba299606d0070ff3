//! Pipeline orchestrator - wires ingestion, correlation and dispatch.
//!
//! Streams come from the ingestion mock sources and detections from the mock
//! detector, so a run needs no camera or model.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{DepthEncoding, FusionBlueprint};
use correlator::{DetectionCorrelator, MockDetectionModel};
use dispatcher::{DispatcherBuilder, DispatcherConfig};
use ingestion::{
    BackpressureConfig, IngestionPipeline, MockColorSource, MockDepthSource, MockStreamConfig,
};
use projection::ProjectionEngine;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{PipelineStats, StopReason};
use crate::error::{CliError, Result};

/// Geometry of the mock color stream
pub const COLOR_SIZE: (u32, u32) = (1280, 720);

/// Geometry of the mock depth stream
pub const DEPTH_SIZE: (u32, u32) = (480, 270);

/// How long sinks get to drain after the correlator stops
const DISPATCHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Abandon reason for an annotation task that panicked
const ANNOTATION_TASK_FAILED: &str = "annotation_task";

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub blueprint: FusionBlueprint,

    /// Stop after this many annotated frames
    pub max_frames: Option<u64>,

    /// Stop after this long
    pub timeout: Option<Duration>,

    /// Prometheus endpoint port
    pub metrics_port: Option<u16>,

    pub color_hz: f64,
    pub depth_hz: f64,

    /// Encoding tag reported by the mock depth stream
    pub depth_encoding: String,

    /// Mock detector fails on every n-th frame (0 = never)
    pub model_fail_every: u64,

    /// Correlator -> dispatcher channel capacity
    pub buffer_size: usize,
}

impl PipelineConfig {
    pub fn new(blueprint: FusionBlueprint) -> Self {
        Self {
            blueprint,
            max_frames: None,
            timeout: None,
            metrics_port: None,
            color_hz: 30.0,
            depth_hz: 15.0,
            depth_encoding: DepthEncoding::Mono16Millimeters.tag().to_string(),
            model_fail_every: 0,
            buffer_size: 32,
        }
    }
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the color stream ends, a limit is hit, or `shutdown` resolves.
    ///
    /// Every exit path stops the streams and drains the sinks before returning.
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = self.config;
        let blueprint = &config.blueprint;

        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)?;
            info!(port, "Metrics endpoint available");
        }

        if DepthEncoding::from_tag(&config.depth_encoding).is_none() {
            warn!(
                encoding = %config.depth_encoding,
                "Mock depth encoding is unsupported, every depth frame will be rejected"
            );
        }

        // Ingestion
        let mut ingestion =
            IngestionPipeline::with_config(BackpressureConfig::from(&blueprint.ingestion));
        ingestion.register_depth_source(Box::new(MockDepthSource::new(
            MockStreamConfig {
                stream: blueprint.topics.depth.clone(),
                frequency_hz: config.depth_hz,
                width: DEPTH_SIZE.0,
                height: DEPTH_SIZE.1,
                max_frames: None,
            },
            config.depth_encoding.clone(),
        )));
        ingestion.register_color_source(Box::new(MockColorSource::bgr8(
            &blueprint.topics.color,
            config.color_hz,
            COLOR_SIZE.0,
            COLOR_SIZE.1,
        )));
        let color_rx = ingestion
            .take_color_receiver()
            .ok_or_else(|| CliError::pipeline_execution("color receiver already taken"))?;

        // Correlation
        let model = MockDetectionModel::demo_scene(COLOR_SIZE.0, COLOR_SIZE.1, blueprint.target.class_id)
            .with_failure_every(config.model_fail_every);
        let correlator = Arc::new(DetectionCorrelator::new(
            Arc::new(model),
            ProjectionEngine::new(blueprint.cameras, blueprint.projection.lookup),
            ingestion.store(),
            blueprint.target.clone(),
        ));

        // Dispatch
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - annotated frames will be discarded");
        }
        let (annotated_tx, annotated_rx) = mpsc::channel(config.buffer_size.max(1));
        let dispatcher = DispatcherBuilder::new(
            DispatcherConfig {
                sinks: blueprint.sinks.clone(),
            },
            annotated_rx,
        )
        .with_hook(Arc::new(observability::record_frame_dispatched))
        .build()
        .await?;
        let active_sinks = dispatcher.sink_count();
        let dispatcher_handle = dispatcher.spawn();

        info!(
            target_label = %correlator.target().display_name(),
            lookup = ?blueprint.projection.lookup,
            model = correlator.model_name(),
            active_sinks,
            max_frames = ?config.max_frames,
            "Pipeline running (mock streams)"
        );
        ingestion.start_all();

        let mut stats = PipelineStats::default();
        let deadline = async {
            match config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            let color = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping pipeline");
                    stats.stop_reason = StopReason::Signal;
                    break;
                }
                _ = &mut deadline => {
                    warn!(timeout = ?config.timeout, "Pipeline timed out");
                    stats.stop_reason = StopReason::Timeout;
                    break;
                }
                received = color_rx.recv() => match received {
                    Ok(frame) => frame,
                    Err(_) => {
                        info!("Color stream closed");
                        stats.stop_reason = StopReason::StreamClosed;
                        break;
                    }
                },
            };

            let frame_id = stats.color_frames;
            stats.color_frames += 1;
            observability::record_color_queue_depth(color_rx.len());

            let started = Instant::now();
            // Inference is blocking work
            let task = {
                let correlator = Arc::clone(&correlator);
                tokio::task::spawn_blocking(move || correlator.annotate(frame_id, color))
            };
            match task.await {
                Ok(Ok(annotated)) => {
                    observability::record_correlation_latency_ms(
                        started.elapsed().as_secs_f64() * 1000.0,
                    );
                    observability::record_frame_annotated(&annotated);
                    stats.correlation.update(&annotated);

                    if annotated_tx.send(Arc::new(annotated)).await.is_err() {
                        warn!("Dispatcher channel closed");
                        stats.stop_reason = StopReason::DispatcherClosed;
                        break;
                    }
                }
                Ok(Err(err)) => {
                    // Already logged by the correlator; move on to the next frame
                    observability::record_frame_abandoned(err.kind());
                    stats.correlation.record_abandoned(err.kind());
                }
                Err(err) => {
                    warn!(frame_id, error = %err, "Annotation task failed");
                    observability::record_frame_abandoned(ANNOTATION_TASK_FAILED);
                    stats.correlation.record_abandoned(ANNOTATION_TASK_FAILED);
                }
            }

            if config
                .max_frames
                .is_some_and(|max| stats.correlation.total_frames >= max)
            {
                info!(frames = stats.correlation.total_frames, "Reached max frames limit");
                stats.stop_reason = StopReason::MaxFrames;
                break;
            }
        }

        info!(reason = %stats.stop_reason, "Shutting down pipeline");
        ingestion.stop_all();
        ingestion.close_color_queue();
        drop(annotated_tx);

        match tokio::time::timeout(DISPATCHER_DRAIN_TIMEOUT, dispatcher_handle).await {
            Ok(Ok(sinks)) => stats.sinks = sinks,
            Ok(Err(e)) => warn!(error = %e, "Dispatcher task failed"),
            Err(_) => warn!(
                timeout = ?DISPATCHER_DRAIN_TIMEOUT,
                "Dispatcher did not drain in time"
            ),
        }

        stats.ingestion = ingestion.metrics().snapshot();
        stats.duration = start_time.elapsed();

        debug!(ingestion = ?stats.ingestion, "Final ingestion counters");
        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
