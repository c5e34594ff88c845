//! SceneBridge CLI - stdio bridge
//!
//! Reads inbound batches from stdin, one batch per line, and writes
//! outbound batches to stdout, one batch per line. Logs go to stderr and,
//! optionally, to a log file. The process exits when stdin closes.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SCENEBRIDGE_*`)
//! 3. Project config (`.scenebridge/config.toml` in the project directory)
//! 4. Global config (`~/.scenebridge/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `SCENEBRIDGE_DEBUG`: Enable debug mode (`true`/`false`)
//! - `SCENEBRIDGE_MAX_EVENT_COUNT`: Events per outbound batch
//! - `SCENEBRIDGE_TICK_MS`: Pump interval in milliseconds
//! - `SCENEBRIDGE_MAX_EVENT_DEPTH`: Interest event recursion limit
//! - `SCENEBRIDGE_CODEC`: Batch codec (`json` or `lines`)
//! - `SCENEBRIDGE_LOG_FILE`: Enable file logging into this directory

mod tracing_writer;

use anyhow::{Context, Result};
use clap::Parser;
use scenebridge_event::CodecKind;
use scenebridge_runtime::config::{BridgeConfig, ConfigLoader, ConfigResolver};
use scenebridge_runtime::{Bridge, BridgeRunner, ChannelTransport};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// SceneBridge CLI - stdio bridge
#[derive(Parser, Debug)]
#[command(name = "scenebridge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project directory for `.scenebridge/config.toml` (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Ignore `~/.scenebridge/config.toml`
    #[arg(long)]
    no_global_config: bool,

    /// Maximum events per outbound batch (also: SCENEBRIDGE_MAX_EVENT_COUNT)
    #[arg(long, value_name = "N")]
    max_event_count: Option<usize>,

    /// Pump interval in milliseconds (also: SCENEBRIDGE_TICK_MS)
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Interest event recursion limit (also: SCENEBRIDGE_MAX_EVENT_DEPTH)
    #[arg(long, value_name = "N")]
    max_event_depth: Option<usize>,

    /// Batch codec: json or lines (also: SCENEBRIDGE_CODEC)
    #[arg(long, value_name = "CODEC")]
    codec: Option<CodecKind>,

    /// Override log file directory path (also: SCENEBRIDGE_LOG_FILE)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Override file log level (default: debug)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

/// CLI-based configuration resolver.
///
/// Applies CLI argument overrides as the highest-priority layer on top of
/// what [`ConfigLoader`] produced.
struct CliConfigResolver {
    project_root: PathBuf,
    skip_global: bool,
    debug: bool,
    max_event_count: Option<usize>,
    tick_ms: Option<u64>,
    max_event_depth: Option<usize>,
    codec: Option<CodecKind>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                eprintln!("Warning: cannot read current directory ({e}), using '.'");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            skip_global: args.no_global_config,
            debug: args.debug,
            max_event_count: args.max_event_count,
            tick_ms: args.tick_ms,
            max_event_depth: args.max_event_depth,
            codec: args.codec,
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        }
    }

    /// Loads files and environment, then applies the CLI layer.
    fn load(&self) -> Result<BridgeConfig> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if self.skip_global {
            loader = loader.skip_global_config();
        }
        let mut config = loader.load().context("config error")?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut BridgeConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(n) = self.max_event_count {
            config.queue.max_event_count = n;
        }
        if let Some(ms) = self.tick_ms {
            config.pump.tick_ms = ms;
        }
        if let Some(depth) = self.max_event_depth {
            config.interests.max_event_depth = depth;
        }
        if let Some(codec) = self.codec {
            config.transport.codec = codec;
        }
        if let Some(ref p) = self.log_file {
            config.logging.file = true;
            config.logging.file_path = Some(p.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.file_level.clone_from(level);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.load()?;

    // --- Tracing setup: independent terminal and file filters ---
    //
    // Terminal filter: --debug > --verbose > RUST_LOG env > default "warn"
    // File filter:     config.logging.file_level (default "debug")
    let terminal_filter = if args.debug || config.debug {
        EnvFilter::new("debug,tokio=warn")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let terminal_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let log_file = if config.logging.file {
        tracing_writer::open_log_file(&config.logging.resolved_file_path())
    } else {
        None
    };

    if let Some(file) = log_file {
        let file_filter = EnvFilter::new(config.logging.file_filter_directive());
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_writer::LockedMakeWriter::new(file));

        tracing_subscriber::registry()
            .with(terminal_layer.with_filter(terminal_filter))
            .with(file_layer.with_filter(file_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(terminal_layer.with_filter(terminal_filter))
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "SceneBridge CLI");
    info!(path = %resolver.project_root.display(), "Project root");
    if config.logging.file {
        info!(
            path = %config
                .logging
                .resolved_file_path()
                .join(tracing_writer::LOG_FILE_NAME)
                .display(),
            level = %config.logging.file_level,
            "File logging enabled"
        );
    }

    run(config).await
}

/// Bridges stdin/stdout to a [`BridgeRunner`] until stdin closes.
async fn run(config: BridgeConfig) -> Result<()> {
    info!(
        codec = %config.transport.codec,
        max_event_count = config.queue.max_event_count,
        tick_ms = config.pump.tick_ms,
        "starting bridge"
    );
    let bridge = Bridge::new(config).context("cannot start bridge")?;
    let (transport, mut outbound) = ChannelTransport::pair();
    let (runner, handle) = BridgeRunner::new(bridge, transport);
    let runner = tokio::spawn(runner.run());

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(batch) = outbound.recv().await {
            stdout.write_all(batch.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        if handle.send_batch(line).await.is_err() {
            warn!("bridge stopped, discarding remaining input");
            break;
        }
    }
    debug!("stdin closed");
    drop(handle);

    let bridge = runner.await.context("bridge runner panicked")?;
    info!(objects = bridge.registry().len(), "bridge stopped");
    drop(bridge);

    writer
        .await
        .context("stdout writer panicked")?
        .context("writing stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            debug: false,
            verbose: false,
            project: None,
            no_global_config: false,
            max_event_count: None,
            tick_ms: None,
            max_event_depth: None,
            codec: None,
            log_file: None,
            log_level: None,
        }
    }

    #[test]
    fn from_args_defaults() {
        let resolver = CliConfigResolver::from_args(&args());

        assert!(!resolver.debug);
        assert!(!resolver.skip_global);
        assert!(resolver.codec.is_none());
        // project defaults to cwd
        assert!(resolver.project_root.exists());
    }

    #[test]
    fn unset_flags_preserve_loaded_values() {
        let resolver = CliConfigResolver::from_args(&args());
        let mut config = BridgeConfig::default();
        config.pump.tick_ms = 40;
        config.debug = true;

        resolver.apply(&mut config);

        assert_eq!(config.pump.tick_ms, 40);
        assert!(config.debug);
    }

    #[test]
    fn all_flags_override() {
        let resolver = CliConfigResolver::from_args(&Args {
            debug: true,
            max_event_count: Some(3),
            tick_ms: Some(5),
            max_event_depth: Some(2),
            codec: Some(CodecKind::Lines),
            log_file: Some(PathBuf::from("/custom/logs")),
            log_level: Some("trace".into()),
            ..args()
        });
        let mut config = BridgeConfig::default();

        resolver.apply(&mut config);

        assert!(config.debug);
        assert_eq!(config.queue.max_event_count, 3);
        assert_eq!(config.pump.tick_ms, 5);
        assert_eq!(config.interests.max_event_depth, 2);
        assert_eq!(config.transport.codec, CodecKind::Lines);
        assert!(config.logging.file);
        assert_eq!(config.logging.file_path, Some(PathBuf::from("/custom/logs")));
        assert_eq!(config.logging.file_level, "trace");
    }

    #[test]
    fn load_reads_project_config() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = tmp.path().join(".scenebridge");
        std::fs::create_dir_all(&dir).expect("config dir");
        std::fs::write(dir.join("config.toml"), "[queue]\nmax_event_count = 7\n").expect("config file");

        let resolver = CliConfigResolver::from_args(&Args {
            project: Some(tmp.path().to_path_buf()),
            no_global_config: true,
            tick_ms: Some(9),
            ..args()
        });
        let config = resolver.load().expect("valid config");

        assert_eq!(config.queue.max_event_count, 7);
        assert_eq!(config.pump.tick_ms, 9);
    }

    #[test]
    fn args_parse_codec() {
        let parsed = Args::try_parse_from(["scenebridge", "--codec", "lines", "-C", "/tmp"]).expect("valid args");
        assert_eq!(parsed.codec, Some(CodecKind::Lines));
        assert_eq!(parsed.project, Some(PathBuf::from("/tmp")));

        assert!(Args::try_parse_from(["scenebridge", "--codec", "xml"]).is_err());
    }
}
