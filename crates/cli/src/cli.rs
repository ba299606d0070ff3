//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Depth Fusion - attach metric distance to object detections
#[derive(Parser, Debug)]
#[command(
    name = "depth-fusion",
    author,
    version,
    about = "RGB + depth detection fusion pipeline",
    long_about = "Runs an object detector on a color stream and attaches the distance \n\
                  measured by a separate depth camera to every detection of the \n\
                  target class, then publishes annotated frames to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DEPTH_FUSION_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DEPTH_FUSION_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level used when RUST_LOG is unset
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fusion pipeline on the built-in mock streams
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "DEPTH_FUSION_CONFIG")]
    pub config: PathBuf,

    /// Stop after this many annotated frames (0 = unlimited)
    #[arg(long, default_value = "0", env = "DEPTH_FUSION_MAX_FRAMES")]
    pub max_frames: u64,

    /// Stop after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "DEPTH_FUSION_TIMEOUT")]
    pub timeout: u64,

    /// Prometheus endpoint port (0 = disabled)
    #[arg(long, default_value = "0", env = "DEPTH_FUSION_METRICS_PORT")]
    pub metrics_port: u16,

    /// Mock color stream rate (Hz)
    #[arg(long, default_value = "30", env = "DEPTH_FUSION_COLOR_HZ")]
    pub color_hz: f64,

    /// Mock depth stream rate (Hz)
    #[arg(long, default_value = "15", env = "DEPTH_FUSION_DEPTH_HZ")]
    pub depth_hz: f64,

    /// Encoding tag the mock depth stream reports (16UC1, mono16, 32FC1, ...)
    #[arg(long, default_value = "16UC1")]
    pub depth_encoding: String,

    /// Make the mock detector fail on every n-th frame (0 = never)
    #[arg(long, default_value = "0")]
    pub model_fail_every: u64,

    /// Capacity of the correlator -> dispatcher channel
    #[arg(long, default_value = "32", env = "DEPTH_FUSION_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["depth-fusion", "run"]).unwrap();
        let Commands::Run(ref args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert_eq!(args.max_frames, 0);
        assert_eq!(args.depth_encoding, "16UC1");
        assert!(!args.dry_run);
        assert_eq!(cli.default_log_level(), "info");
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "depth-fusion",
            "-vv",
            "--log-format",
            "json",
            "run",
            "-c",
            "fusion.json",
            "--max-frames",
            "10",
            "--depth-encoding",
            "32FC1",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.default_log_level(), "trace");
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("fusion.json"));
        assert_eq!(args.max_frames, 10);
        assert_eq!(args.depth_encoding, "32FC1");
        assert!(args.dry_run);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["depth-fusion", "-q", "-v", "info"]).is_err());
        let cli = Cli::try_parse_from(["depth-fusion", "-q", "validate", "--json"]).unwrap();
        assert_eq!(cli.default_log_level(), "warn");
    }
}
