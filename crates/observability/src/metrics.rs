//! Fusion metrics collection
//!
//! Records per-frame correlation metrics and aggregates them in memory for
//! the end-of-run summary.

use contracts::AnnotatedFrame;
use metrics::{counter, gauge, histogram};

/// Record metrics for an annotated frame
///
/// Called once for every frame the correlator completes.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_annotated;
///
/// if let Ok(annotated) = correlator.annotate(frame_id, frame) {
///     record_frame_annotated(&annotated);
///     // ...
/// }
/// ```
pub fn record_frame_annotated(frame: &AnnotatedFrame) {
    counter!("depth_fusion_frames_annotated_total").increment(1);
    gauge!("depth_fusion_last_frame_id").set(frame.frame_id as f64);

    let located = frame.located_count();
    let total = frame.correlations.len();
    counter!("depth_fusion_detections_total", "result" => "located").increment(located as u64);
    counter!("depth_fusion_detections_total", "result" => "no_depth")
        .increment((total - located) as u64);

    for distance in frame
        .correlations
        .iter()
        .filter_map(|c| c.projection.distance())
    {
        histogram!("depth_fusion_distance_m").record(distance as f64);
    }

    match depth_age_ms(frame) {
        Some(age) => histogram!("depth_fusion_depth_age_ms").record(age),
        None => counter!("depth_fusion_frames_without_depth_total").increment(1),
    }
}

/// Record a color frame dropped before annotation
pub fn record_frame_abandoned(reason: &str) {
    counter!(
        "depth_fusion_frames_abandoned_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record annotated frame dispatch
pub fn record_frame_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "depth_fusion_frames_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record time spent correlating one frame
pub fn record_correlation_latency_ms(latency_ms: f64) {
    histogram!("depth_fusion_correlation_latency_ms").record(latency_ms);
}

/// Record color queue depth
pub fn record_color_queue_depth(depth: usize) {
    gauge!("depth_fusion_color_queue_depth").set(depth as f64);
}

/// How much older the depth snapshot is than the color frame (ms).
///
/// Negative when depth was captured after the color frame.
pub fn depth_age_ms(frame: &AnnotatedFrame) -> Option<f64> {
    frame
        .depth
        .as_ref()
        .map(|d| (frame.color.timestamp - d.captured_at) * 1000.0)
}

/// Correlation metrics aggregator
///
/// Aggregates in memory for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct CorrelationStatsAggregator {
    /// Frames annotated
    pub total_frames: u64,

    /// Frames abandoned (model failure, bad buffer)
    pub frames_abandoned: u64,

    /// Frames annotated with no depth frame available
    pub frames_without_depth: u64,

    /// Target detections
    pub total_detections: u64,

    /// Target detections with a distance
    pub located: u64,

    /// Distance statistics (m)
    pub distance_stats: RunningStats,

    /// Depth staleness statistics (ms)
    pub depth_age_stats: RunningStats,

    /// Abandon counts by reason
    pub abandon_reasons: std::collections::HashMap<String, u64>,
}

impl CorrelationStatsAggregator {
    /// Create new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics
    pub fn update(&mut self, frame: &AnnotatedFrame) {
        self.total_frames += 1;
        self.total_detections += frame.correlations.len() as u64;
        self.located += frame.located_count() as u64;

        for distance in frame
            .correlations
            .iter()
            .filter_map(|c| c.projection.distance())
        {
            self.distance_stats.push(distance as f64);
        }

        match depth_age_ms(frame) {
            Some(age) => self.depth_age_stats.push(age),
            None => self.frames_without_depth += 1,
        }
    }

    /// Count an abandoned frame
    pub fn record_abandoned(&mut self, reason: &str) {
        self.frames_abandoned += 1;
        *self.abandon_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    /// Generate summary report
    pub fn summary(&self) -> CorrelationSummary {
        let attempted = self.total_frames + self.frames_abandoned;
        CorrelationSummary {
            total_frames: self.total_frames,
            frames_abandoned: self.frames_abandoned,
            frames_without_depth: self.frames_without_depth,
            total_detections: self.total_detections,
            located: self.located,
            abandon_rate: percent(self.frames_abandoned, attempted),
            located_rate: percent(self.located, self.total_detections),
            distance_m: StatsSummary::from(&self.distance_stats),
            depth_age_ms: StatsSummary::from(&self.depth_age_stats),
            abandon_reasons: self.abandon_reasons.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct CorrelationSummary {
    pub total_frames: u64,
    pub frames_abandoned: u64,
    pub frames_without_depth: u64,
    pub total_detections: u64,
    pub located: u64,
    pub abandon_rate: f64,
    pub located_rate: f64,
    pub distance_m: StatsSummary,
    pub depth_age_ms: StatsSummary,
    pub abandon_reasons: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for CorrelationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Correlation Summary ===")?;
        writeln!(f, "Annotated frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Abandoned frames: {} ({:.2}%)",
            self.frames_abandoned, self.abandon_rate
        )?;
        writeln!(f, "Frames without depth: {}", self.frames_without_depth)?;
        writeln!(
            f,
            "Target detections: {} (located {:.2}%)",
            self.total_detections, self.located_rate
        )?;
        writeln!(f, "Distance (m): {}", self.distance_m)?;
        writeln!(f, "Depth age (ms): {}", self.depth_age_ms)?;

        if !self.abandon_reasons.is_empty() {
            writeln!(f, "Abandon reasons:")?;
            for (reason, count) in &self.abandon_reasons {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
