use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::{
    compression::Compression,
    suffix::{AppendCount, FileLimit},
    ContentLimit, FileRotate,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// `off`/`none` disable output; unknown strings mean `info`.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// `target == prefix` or `target` starts with `prefix::`.
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// ---------- rotating file writers ----------

type SharedRotate = Arc<Mutex<FileRotate<AppendCount>>>;

struct RotHandle(Option<SharedRotate>);

impl Write for RotHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(rot) => rot
                .lock()
                .map_err(|_| std::io::Error::other("log writer poisoned"))?
                .write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(rot) => rot
                .lock()
                .map_err(|_| std::io::Error::other("log writer poisoned"))?
                .flush(),
            None => Ok(()),
        }
    }
}

fn open_rotating(
    path: &Path,
    section: &Section,
) -> Result<SharedRotate, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let rot = FileRotate::new(
        path,
        AppendCount::new(backups),
        ContentLimit::BytesSurpassed(usize::try_from(max_bytes)?),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

/// Routes each record to the file of the longest matching subsystem prefix,
/// falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_prefix: Vec<(String, SharedRotate)>,
}

impl FileRouter {
    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<SharedRotate> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_prefix(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> MakeWriter<'a> for FileRouter {
    type Writer = RotHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RotHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RotHandle(self.resolve(meta.target()))
    }
}

// ---------- filters ----------

/// Console filter: default section sets the fallback level, every other
/// section overrides its own target prefix.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.console_level))
        })
}

/// File filter; sections without a file contribute nothing except that the
/// default level applies to them when a default file exists.
fn file_targets(cfg: &LoggingConfig, has_default_file: bool) -> Targets {
    let default = match cfg.get(DEFAULT_SECTION) {
        Some(s) if has_default_file => parse_level(&s.file_level),
        _ => LevelFilter::OFF,
    };

    cfg.iter()
        .filter(|(name, s)| name.as_str() != DEFAULT_SECTION && !s.file.trim().is_empty())
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.file_level))
        })
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    let mut opened: HashMap<PathBuf, SharedRotate> = HashMap::new();

    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        let path = resolve_log_path(&section.file, base_dir);
        let writer = match opened.get(&path) {
            Some(w) => w.clone(),
            None => match open_rotating(&path, section) {
                Ok(w) => {
                    opened.insert(path.clone(), w.clone());
                    w
                }
                Err(e) => {
                    // the subscriber is not installed yet
                    eprintln!("cannot open log file {} ({name}): {e}", path.display());
                    continue;
                }
            },
        };
        if name == DEFAULT_SECTION {
            router.default = Some(writer);
        } else {
            router.by_prefix.push((name.clone(), writer));
        }
    }
    router
}

// ---------- init ----------

/// Install the global subscriber.
///
/// Console output is human readable; file output is JSON, one record per
/// line. Relative log file paths resolve against `base_dir` (the server home).
/// Calling this twice is harmless: the second install is ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    let ansi = std::io::stdout().is_terminal();
    let console = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = build_file_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console).try_init();
        return;
    }

    let file = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router.clone())
        .with_filter(file_targets(cfg, router.default.is_some()));

    let _ = Registry::default().with(console).with(file).try_init();
}
