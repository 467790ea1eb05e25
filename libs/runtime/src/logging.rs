//! Logging sinks driven by the `logging` config section.
//!
//! Every key other than `default` names a subsystem (a target prefix such as
//! `datasource` or `sqlx`) with its own console level and log file. `default`
//! catches whatever no subsystem claims. Console output is human readable,
//! files get one JSON object per line and rotate by size.

use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Metadata;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::{Filter, SubscriberExt},
    util::SubscriberInitExt,
    Layer, Registry,
};

/// A type-erased layer that can be stacked on the root registry.
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_KEY: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// `None` means the sink is switched off. Unknown names fall back to info.
fn level_of(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => None,
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        _ => Some(LevelFilter::INFO),
    }
}

/// `target` is `prefix` itself or one of its `::` children.
fn under_prefix(target: &str, prefix: &str) -> bool {
    match target.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

// ---- files ----

#[derive(Clone)]
struct LogFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl LogFile {
    fn open(path: &Path, max_bytes: usize, max_backups: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }

    /// Open the file a section points at. Empty `file` disables it.
    fn for_section(owner: &str, section: &Section, base_dir: &Path) -> Option<Self> {
        if section.file.trim().is_empty() {
            return None;
        }
        let path = resolve_log_path(&section.file, base_dir);
        let max_mb = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB);
        let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
        match Self::open(&path, (max_mb * 1024 * 1024) as usize, max_backups) {
            Ok(file) => Some(file),
            Err(e) => {
                // no subscriber to report through yet
                eprintln!("log file for '{owner}' at {} unavailable: {e}", path.display());
                None
            }
        }
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Discards records when no file is routed for them.
struct MaybeFile(Option<LogFile>);

impl Write for MaybeFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

/// Picks the subsystem file whose prefix claims the record's target,
/// falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    fallback: Option<LogFile>,
    routes: Vec<(String, LogFile)>,
}

impl FileRouter {
    fn pick(&self, target: &str) -> Option<LogFile> {
        self.routes
            .iter()
            .find(|(prefix, _)| under_prefix(target, prefix))
            .map(|(_, f)| f)
            .or(self.fallback.as_ref())
            .cloned()
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.routes.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeFile;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeFile(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        MaybeFile(self.pick(meta.target()))
    }
}

/// Relative paths live under `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// ---- layer plan ----

struct Plan<'a> {
    default: Option<&'a Section>,
    subsystems: Vec<(&'a str, &'a Section)>,
}

impl<'a> Plan<'a> {
    fn new(cfg: &'a LoggingConfig) -> Self {
        let mut subsystems: Vec<_> = cfg
            .iter()
            .filter(|(k, _)| k.as_str() != DEFAULT_KEY)
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        // longest prefix first so `users::infra` wins over `users`
        subsystems.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        Self {
            default: cfg.get(DEFAULT_KEY),
            subsystems,
        }
    }

    fn prefixes(&self) -> Vec<String> {
        self.subsystems.iter().map(|(n, _)| n.to_string()).collect()
    }

    fn console_targets(&self) -> Targets {
        self.subsystems
            .iter()
            .filter_map(|(name, s)| level_of(&s.console_level).map(|l| (*name, l)))
            .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, l)| {
                t.with_target(name, l)
            })
    }

    fn file_targets(&self) -> Targets {
        self.subsystems
            .iter()
            .filter(|(_, s)| !s.file.trim().is_empty())
            .filter_map(|(name, s)| level_of(&s.file_level).map(|l| (*name, l)))
            .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, l)| {
                t.with_target(name, l)
            })
    }

    fn file_router(&self, base_dir: &Path) -> FileRouter {
        FileRouter {
            fallback: self
                .default
                .and_then(|s| LogFile::for_section(DEFAULT_KEY, s, base_dir)),
            routes: self
                .subsystems
                .iter()
                .filter_map(|(name, s)| {
                    LogFile::for_section(name, s, base_dir).map(|f| (name.to_string(), f))
                })
                .collect(),
        }
    }

    fn layers(&self, base_dir: &Path) -> Vec<BoxedLayer> {
        let ansi = std::io::stdout().is_terminal();
        let files = self.file_router(base_dir);
        let mut layers = vec![console_layer(ansi, self.console_targets())];

        if !files.is_empty() {
            layers.push(json_file_layer(files.clone(), self.file_targets()));
        }

        let Some(default) = self.default else {
            return layers;
        };
        if let Some(level) = level_of(&default.console_level) {
            layers.push(console_layer(ansi, unclaimed(self.prefixes(), level)));
        }
        if files.fallback.is_some() {
            if let Some(level) = level_of(&default.file_level) {
                layers.push(json_file_layer(files, unclaimed(self.prefixes(), level)));
            }
        }
        layers
    }
}

/// Records no subsystem claims, up to `max`.
fn unclaimed(
    prefixes: Vec<String>,
    max: LevelFilter,
) -> FilterFn<impl Fn(&Metadata<'_>) -> bool + Send + Sync + 'static> {
    FilterFn::new(move |meta: &Metadata<'_>| {
        !prefixes.iter().any(|p| under_prefix(meta.target(), p)) && *meta.level() <= max
    })
}

fn console_layer<F>(ansi: bool, filter: F) -> BoxedLayer
where
    F: Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(filter)
        .boxed()
}

fn json_file_layer<F>(writer: FileRouter, filter: F) -> BoxedLayer
where
    F: Filter<Registry> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(writer)
        .with_filter(filter)
        .boxed()
}

/// Install the global subscriber.
///
/// `base_dir` anchors relative log file paths (normally `server.home_dir`);
/// `extra` is stacked on the same registry, e.g. the trace exporter. An empty
/// config logs everything to the console. Only the first call installs
/// anything.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path, extra: Option<BoxedLayer>) {
    // `log` records (sqlx, mongodb) flow into tracing
    let _ = tracing_log::LogTracer::init();

    let mut layers: Vec<BoxedLayer> = extra.into_iter().collect();
    if cfg.is_empty() {
        layers.push(console_layer(std::io::stdout().is_terminal(), LevelFilter::INFO));
    } else {
        layers.extend(Plan::new(cfg).layers(base_dir));
    }

    let _ = Registry::default().with(layers).try_init();
}
