//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! - Sample configuration snapshot
//! - Ingest -> correlate -> dispatch without a camera or model
//! - Depth rejection and color backpressure as seen from the consumer

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{FrameCallback, FrameSource};

    /// Frame source driven by the test itself.
    ///
    /// Frames pushed through the paired [`ManualFeed`] reach the registered
    /// callback synchronously, so ordering is deterministic.
    pub struct ManualSource<T> {
        stream: String,
        callback: Arc<Mutex<Option<FrameCallback<T>>>>,
    }

    pub struct ManualFeed<T> {
        callback: Arc<Mutex<Option<FrameCallback<T>>>>,
    }

    impl<T> ManualSource<T> {
        pub fn new(stream: &str) -> (Self, ManualFeed<T>) {
            let callback = Arc::new(Mutex::new(None));
            (
                Self {
                    stream: stream.to_string(),
                    callback: callback.clone(),
                },
                ManualFeed { callback },
            )
        }
    }

    impl<T> ManualFeed<T> {
        /// Deliver one frame; false when nobody is listening
        pub fn push(&self, frame: T) -> bool {
            let callback = self.callback.lock().unwrap().clone();
            match callback {
                Some(cb) => {
                    cb(frame);
                    true
                }
                None => false,
            }
        }
    }

    impl<T> FrameSource<T> for ManualSource<T> {
        fn stream_name(&self) -> &str {
            &self.stream
        }

        fn listen(&self, callback: FrameCallback<T>) {
            let mut slot = self.callback.lock().unwrap();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }

        fn stop(&self) {
            self.callback.lock().unwrap().take();
        }

        fn is_listening(&self) -> bool {
            self.callback.lock().unwrap().is_some()
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DepthLookup, DropPolicy, SinkType};

    const SAMPLE_CONFIG: &str = include_str!("../../../config.toml");

    #[test]
    fn test_sample_config_loads() {
        let blueprint = ConfigLoader::load_from_str(SAMPLE_CONFIG, ConfigFormat::Toml).unwrap();

        assert_eq!(blueprint.target.class_id, 41);
        assert_eq!(blueprint.target.display_name(), "cup");
        assert_eq!(blueprint.projection.lookup, DepthLookup::DepthPixel);
        assert_eq!(blueprint.ingestion.drop_policy, DropPolicy::DropOldest);
        assert_eq!(blueprint.cameras, contracts::IntrinsicsTable::kinova_reference());

        let kinds: Vec<_> = blueprint.sinks.iter().map(|s| s.sink_type).collect();
        assert_eq!(kinds, vec![SinkType::Log, SinkType::File]);
    }

    #[test]
    fn test_sample_config_survives_toml_round_trip() {
        let blueprint = ConfigLoader::load_from_str(SAMPLE_CONFIG, ConfigFormat::Toml).unwrap();
        let rendered = ConfigLoader::to_toml(&blueprint).unwrap();
        let reloaded = ConfigLoader::load_from_str(&rendered, ConfigFormat::Toml).unwrap();

        assert_eq!(reloaded.cameras, blueprint.cameras);
        assert_eq!(reloaded.topics, blueprint.topics);
        assert_eq!(reloaded.sinks.len(), blueprint.sinks.len());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        ColorFrame, DetectionBox, DropPolicy, IntrinsicsTable, ProjectionResult, RawDepthMessage,
        SinkConfig, SinkType, TargetClass,
    };
    use correlator::{DetectionCorrelator, FrameError, MockDetectionModel};
    use dispatcher::create_dispatcher;
    use ingestion::{synthetic_color, synthetic_depth, BackpressureConfig, IngestionPipeline};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use projection::ProjectionEngine;
    use tokio::sync::mpsc;

    use crate::support::{ManualFeed, ManualSource};

    const COLOR_TOPIC: &str = "/camera/color/image_raw";
    const DEPTH_TOPIC: &str = "/camera/depth/image_raw";

    struct Rig {
        ingestion: IngestionPipeline,
        depth: ManualFeed<RawDepthMessage>,
        color: ManualFeed<ColorFrame>,
    }

    fn rig(config: BackpressureConfig) -> Rig {
        let mut ingestion = IngestionPipeline::with_config(config);
        let (depth_source, depth) = ManualSource::new(DEPTH_TOPIC);
        let (color_source, color) = ManualSource::new(COLOR_TOPIC);
        ingestion.register_depth_source(Box::new(depth_source));
        ingestion.register_color_source(Box::new(color_source));
        ingestion.start_all();
        Rig {
            ingestion,
            depth,
            color,
        }
    }

    /// Target box centred on color pixel (640, 360)
    fn center_cup() -> DetectionBox {
        DetectionBox {
            class_id: 41,
            confidence: 0.9,
            x1: 600.0,
            y1: 340.0,
            x2: 680.0,
            y2: 380.0,
        }
    }

    fn correlator(rig: &Rig, model: MockDetectionModel) -> DetectionCorrelator {
        DetectionCorrelator::new(
            Arc::new(model),
            ProjectionEngine::new(
                IntrinsicsTable::kinova_reference(),
                contracts::DepthLookup::DepthPixel,
            ),
            rig.ingestion.store(),
            TargetClass::default(),
        )
    }

    /// Ingest -> correlate -> FileSink, checking what lands on disk
    #[tokio::test]
    async fn test_e2e_located_frame_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut rig = rig(BackpressureConfig::default());
        let color_rx = rig.ingestion.take_color_receiver().unwrap();
        let correlator = correlator(&rig, MockDetectionModel::fixed(vec![center_cup()]));

        let sink_configs = vec![SinkConfig {
            name: "files".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            params: HashMap::from([
                ("base_path".to_string(), dir.path().display().to_string()),
                ("depth_overlay".to_string(), "true".to_string()),
            ]),
        }];
        let (tx, rx) = mpsc::channel(8);
        let dispatcher_handle = create_dispatcher(sink_configs, rx).await.unwrap().spawn();

        // Frame 0 is correlated before any depth exists, frame 1 after
        assert!(rig.color.push(synthetic_color(1280, 720, 0, 0.0)));
        let annotated = correlator.annotate(0, color_rx.recv().await.unwrap()).unwrap();
        tx.send(Arc::new(annotated)).await.unwrap();

        assert!(rig.depth.push(synthetic_depth(480, 270, "16UC1", 0, 0.01)));
        assert!(rig.color.push(synthetic_color(1280, 720, 1, 0.1)));
        let annotated = correlator.annotate(1, color_rx.recv().await.unwrap()).unwrap();
        tx.send(Arc::new(annotated)).await.unwrap();

        rig.ingestion.stop_all();
        drop(tx);
        let sinks = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle)
            .await
            .expect("dispatcher did not drain")
            .unwrap();
        assert_eq!(sinks[0].1.write_count, 2);
        assert_eq!(sinks[0].1.failure_count, 0);

        let first: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("meta/0.json")).unwrap())
                .unwrap();
        assert_eq!(first["located"], 0);
        assert_eq!(first["correlations"][0]["projection"]["kind"], "no_depth");
        assert!(!dir.path().join("depth/0.png").exists());

        let second: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("meta/1.json")).unwrap())
                .unwrap();
        assert_eq!(second["located"], 1);
        assert_eq!(second["depth_frame_id"], 0);
        let projection = &second["correlations"][0]["projection"];
        assert_eq!(projection["kind"], "located");
        assert_eq!(projection["depth_pixel_x"], 249);
        assert_eq!(projection["depth_pixel_y"], 172);
        let distance = projection["distance_meters"].as_f64().unwrap();
        assert!((distance - 1.2).abs() < 1e-3, "distance {distance}");

        let annotated = image::open(dir.path().join("annotated/1.png")).unwrap();
        assert_eq!((annotated.width(), annotated.height()), (1280, 720));
        let overlay = image::open(dir.path().join("depth/1.png")).unwrap();
        assert_eq!((overlay.width(), overlay.height()), (480, 270));
    }

    #[tokio::test]
    async fn test_unsupported_encoding_keeps_previous_frame() {
        let mut rig = rig(BackpressureConfig::default());
        let color_rx = rig.ingestion.take_color_receiver().unwrap();
        let correlator = correlator(&rig, MockDetectionModel::fixed(vec![center_cup()]));

        rig.depth.push(synthetic_depth(480, 270, "16UC1", 0, 0.0));
        rig.depth.push(synthetic_depth(480, 270, "8UC3", 1, 0.1));
        rig.color.push(synthetic_color(1280, 720, 0, 0.2));

        let annotated = correlator
            .annotate(0, color_rx.recv().await.unwrap())
            .unwrap();

        assert_eq!(annotated.depth.as_ref().and_then(|d| d.frame_id), Some(0));
        assert!(matches!(
            annotated.correlations[0].projection,
            ProjectionResult::Located { .. }
        ));

        let metrics = rig.ingestion.metrics().snapshot();
        assert_eq!(metrics.depth_received, 2);
        assert_eq!(metrics.depth_accepted, 1);
        assert_eq!(metrics.unsupported_encodings, 1);
        assert_eq!(rig.ingestion.store().version(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_skips_only_that_frame() {
        let mut rig = rig(BackpressureConfig::default());
        let color_rx = rig.ingestion.take_color_receiver().unwrap();
        let correlator = correlator(
            &rig,
            MockDetectionModel::fixed(vec![center_cup()]).with_failure_every(2),
        );

        rig.depth.push(synthetic_depth(480, 270, "32FC1", 0, 0.0));
        for i in 0..3 {
            rig.color.push(synthetic_color(1280, 720, i, i as f64 * 0.1));
        }

        let mut outcomes = Vec::new();
        for frame_id in 0..3 {
            let color = color_rx.recv().await.unwrap();
            outcomes.push(correlator.annotate(frame_id, color));
        }

        assert_eq!(outcomes[0].as_ref().unwrap().located_count(), 1);
        assert!(matches!(outcomes[1], Err(FrameError::ModelInvocation(_))));
        assert_eq!(outcomes[2].as_ref().unwrap().located_count(), 1);
    }

    /// Each outcome shows up once, under the `depth_fusion_` names only
    #[tokio::test]
    async fn test_correlation_metrics_counted_once() {
        let mut rig = rig(BackpressureConfig::default());
        let color_rx = rig.ingestion.take_color_receiver().unwrap();
        let correlator = correlator(
            &rig,
            MockDetectionModel::fixed(vec![center_cup()]).with_failure_every(2),
        );

        rig.depth.push(synthetic_depth(480, 270, "32FC1", 0, 0.0));
        let mut frames = Vec::new();
        for i in 0..3 {
            rig.color.push(synthetic_color(1280, 720, i, i as f64 * 0.1));
            frames.push(color_rx.recv().await.unwrap());
        }

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            for (frame_id, frame) in frames.into_iter().enumerate() {
                match correlator.annotate(frame_id as u64, frame) {
                    Ok(annotated) => observability::record_frame_annotated(&annotated),
                    Err(err) => observability::record_frame_abandoned(err.kind()),
                }
            }
        });

        let rendered = handle.render();
        let samples: Vec<&str> = rendered
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        assert!(
            samples.iter().all(|line| line.starts_with("depth_fusion_")),
            "{rendered}"
        );
        assert!(samples.contains(&r#"depth_fusion_detections_total{result="located"} 2"#));
        assert!(samples
            .contains(&r#"depth_fusion_frames_abandoned_total{reason="model_invocation"} 1"#));
        assert!(samples.contains(&"depth_fusion_frames_annotated_total 2"));
    }

    fn queued_ids(rx: &async_channel::Receiver<ColorFrame>) -> Vec<Option<u64>> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|frame| frame.frame_id)
            .collect()
    }

    #[test]
    fn test_drop_oldest_keeps_newest_frames() {
        let mut rig = rig(BackpressureConfig::new(2, DropPolicy::DropOldest));
        let rx = rig.ingestion.take_color_receiver().unwrap();

        for i in 0..5 {
            rig.color.push(synthetic_color(8, 8, i, 0.0));
        }

        assert_eq!(queued_ids(&rx), vec![Some(3), Some(4)]);
        let metrics = rig.ingestion.metrics().snapshot();
        assert_eq!(metrics.color_received, 5);
        assert_eq!(metrics.color_dropped, 3);
    }

    #[test]
    fn test_drop_newest_keeps_oldest_frames() {
        let mut rig = rig(BackpressureConfig::new(2, DropPolicy::DropNewest));
        let rx = rig.ingestion.take_color_receiver().unwrap();

        for i in 0..5 {
            rig.color.push(synthetic_color(8, 8, i, 0.0));
        }

        assert_eq!(queued_ids(&rx), vec![Some(0), Some(1)]);
        assert_eq!(rig.ingestion.metrics().snapshot().color_dropped, 3);
    }
}
