use crate::config::settings::DebugLogRotation;
use crate::config::Config;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEBUG_LOG_NAME: &str = "raws-search-debug.log";
const DEFAULT_KEEP: usize = 7;

#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize logging.
///
/// Human-readable events always go to stderr (stdout carries JSON output).
/// `RUST_LOG` overrides the default filter. When `debug` is enabled, events
/// are also appended to `raws-search-debug.log` next to the config file
/// unless `debug_log_path` says otherwise.
pub fn init(config: &Config, verbose: bool) -> Result<Option<LogGuard>> {
    let default_directive = if config.debug || verbose {
        "raws_search=debug,warn"
    } else {
        "raws_search=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard, log_path) = if config.debug {
        let path = debug_log_file(config.debug_log_path.as_deref())?;
        let (writer, guard) = tracing_appender::non_blocking(debug_appender(config, &path)?);
        (
            Some(fmt::layer().with_ansi(false).with_target(true).with_writer(writer)),
            Some(LogGuard(guard)),
            Some(path),
        )
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok(); // Already initialized in tests

    if let Some(path) = log_path {
        tracing::info!(
            log_file = %path.display(),
            rotation = ?config.debug_log_rotation.unwrap_or(DebugLogRotation::Daily),
            "debug logging enabled"
        );
    }

    Ok(guard)
}

fn debug_appender(config: &Config, path: &Path) -> Result<RollingFileAppender> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid debug_log_path: no UTF-8 file name")?;

    let rotation = match config.debug_log_rotation.unwrap_or(DebugLogRotation::Daily) {
        DebugLogRotation::None => Rotation::NEVER,
        DebugLogRotation::Daily => Rotation::DAILY,
    };
    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name);
    match config.debug_log_keep.unwrap_or(DEFAULT_KEEP) {
        0 => {}
        keep => builder = builder.max_log_files(keep),
    }

    builder
        .build(dir)
        .with_context(|| format!("Failed to open debug log in {}", dir.display()))
}

/// Debug log location: the configured file, a directory to hold the default
/// file name, or the default file next to config.toml
fn debug_log_file(configured: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = configured else {
        return Ok(crate::config::config_path()?.with_file_name(DEBUG_LOG_NAME));
    };

    let path = match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    };
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(DEBUG_LOG_NAME));
    }
    Ok(path)
}

fn key_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)([?&](?:key|api_key)=)[^&\s"']+"#).expect("valid key parameter pattern")
    })
}

/// Best-effort redaction of credentials in log output: `key=` query
/// parameters and `sk-...` style tokens.
pub fn redact_secrets(input: &str) -> String {
    let input = key_param_pattern().replace_all(input, "${1}***REDACTED***");
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        if input[i..].starts_with("sk-") && i + 3 < input.len() {
            let mut j = i + 3;
            while j < input.len() {
                match bytes[j] {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => j += 1,
                    _ => break,
                }
            }

            // Require a minimum length to reduce false positives.
            if j.saturating_sub(i + 3) >= 8 {
                out.push_str(&input[last..i]);
                out.push_str("sk-***REDACTED***");
                last = j;
                i = j;
                continue;
            }
        }

        let step = input[i..].chars().next().map_or(1, char::len_utf8);
        i += step;
    }

    out.push_str(&input[last..]);
    out
}
