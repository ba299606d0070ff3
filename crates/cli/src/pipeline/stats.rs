//! Pipeline run statistics.

use std::fmt;
use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::CorrelationStatsAggregator;

/// Why the correlator loop ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Color stream closed
    #[default]
    StreamClosed,
    /// `--max-frames` reached
    MaxFrames,
    /// `--timeout` elapsed
    Timeout,
    /// Ctrl-C / SIGTERM
    Signal,
    /// Dispatcher stopped accepting frames
    DispatcherClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StreamClosed => "color stream closed",
            Self::MaxFrames => "max frames reached",
            Self::Timeout => "timeout",
            Self::Signal => "shutdown signal",
            Self::DispatcherClosed => "dispatcher closed",
        })
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub duration: Duration,

    /// Color frames taken off the queue
    pub color_frames: u64,

    pub stop_reason: StopReason,

    /// Ingestion counters at shutdown
    pub ingestion: IngestionSnapshot,

    /// Per-frame correlation aggregates
    pub correlation: CorrelationStatsAggregator,

    /// Final per-sink counters
    pub sinks: Vec<(String, SinkSnapshot)>,
}

impl PipelineStats {
    /// Annotated frames per second
    pub fn fps(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.correlation.total_frames as f64 / secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Stopped by: {}", self.stop_reason);
        println!("   ├─ Color frames processed: {}", self.color_frames);
        println!("   └─ Annotated FPS: {:.2}", self.fps());

        let ingest = &self.ingestion;
        println!("\n📥 Ingestion");
        println!(
            "   ├─ Depth frames: {} received, {} accepted",
            ingest.depth_received, ingest.depth_accepted
        );
        println!(
            "   ├─ Depth rejected: {} (unsupported encoding {}, decode errors {})",
            ingest.depth_rejected(),
            ingest.unsupported_encodings,
            ingest.decode_errors
        );
        println!(
            "   └─ Color frames: {} received, {} dropped",
            ingest.color_received, ingest.color_dropped
        );

        println!("\n{}", self.correlation.summary());

        if !self.sinks.is_empty() {
            println!("📤 Sinks");
            for (i, (name, snap)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {prefix} {name}: {} written, {} failed, {} dropped, avg {:.2} ms",
                    snap.write_count, snap.failure_count, snap.dropped_count, snap.avg_write_ms
                );
            }
        }

        println!();
    }
}
