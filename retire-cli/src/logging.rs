use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

use crate::config::LoggingConfig;

const DEFAULT_LEVEL: &str = "info";

// ─── Formatter ──────────────────────────────────────────────────────────────

/// `<local time> <LEVEL> <target>: <fields>`, colored on a terminal.
struct LocalFmt;

impl LocalFmt {
    fn level_color(level: Level) -> &'static str {
        match level {
            Level::ERROR => "\x1b[1;31m",
            Level::WARN => "\x1b[1;33m",
            Level::INFO => "\x1b[1;32m",
            Level::DEBUG => "\x1b[1;34m",
            Level::TRACE => "\x1b[1;35m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{timestamp}\x1b[0m {}{:>5}\x1b[0m \x1b[36m{}\x1b[0m: ",
                Self::level_color(*meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{timestamp} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ─── Late-bound file writer ─────────────────────────────────────────────────

type SharedFile = Arc<Mutex<Option<File>>>;

/// Writes to the log file once one is opened; drops records until then.
#[derive(Clone, Default)]
struct FileSlot(SharedFile);

impl FileSlot {
    fn guard(&self) -> MutexGuard<'_, Option<File>> {
        // A panic mid-write leaves the file usable.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(
        &self,
        file: Option<File>,
    ) {
        *self.guard() = file;
    }
}

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.guard())
    }
}

// ─── Runtime handles ────────────────────────────────────────────────────────

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

struct Handles {
    level: ReloadFn,
    console: ReloadFn,
    file: FileSlot,
}

static HANDLES: OnceLock<Handles> = OnceLock::new();

fn handles() -> Result<&'static Handles> {
    HANDLES.get().ok_or_else(|| anyhow!("logging not yet initialized"))
}

fn reloader<S>(
    handle: reload::Handle<EnvFilter, S>,
    what: &'static str,
) -> ReloadFn
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |filter| {
        handle
            .reload(filter)
            .map_err(|e| anyhow!("{what} filter reload failed: {e}"))
    })
}

/// The explicit level when given, else `RUST_LOG`, else `info`.
fn initial_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => parse_filter(level),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))),
    }
}

fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level '{level}': {e}"))
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Installs the global subscriber from `config`.
///
/// Console output goes to stderr so command output on stdout stays clean.
/// A second call keeps the installed subscriber and only applies the level,
/// console and file settings.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = initial_filter(config.level.as_deref())?;

    match HANDLES.get() {
        Some(handles) => (handles.level)(filter)?,
        None => install(filter),
    }

    if HANDLES.get().is_some() {
        set_console_enabled(config.console)?;
        match &config.file {
            Some(path) => enable_file_logging(path)?,
            None => disable_file_logging(),
        }
    }
    Ok(())
}

fn install(filter: EnvFilter) {
    let file = FileSlot::default();
    let (level_filter, level_handle) = reload::Layer::new(filter);
    // Per-console gate under the global level.
    let (console_gate, console_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_gate);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(file.clone());

    if tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        let _ = HANDLES.set(Handles {
            level: reloader(level_handle, "level"),
            console: reloader(console_handle, "console"),
            file,
        });
    }
}

/// Replaces the active filter. Takes a bare level or a full directive.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter = parse_filter(level)?;
    (handles()?.level)(filter)
}

pub fn set_console_enabled(enabled: bool) -> Result<()> {
    let gate = if enabled { "trace" } else { "off" };
    (handles()?.console)(EnvFilter::new(gate))
}

/// Appends log records to `path`, replacing any open log file. The parent
/// directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let handles = handles()?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow!("cannot open log file '{}': {e}", path.display()))?;
    handles.file.replace(Some(file));
    Ok(())
}

pub fn disable_file_logging() {
    if let Some(handles) = HANDLES.get() {
        handles.file.replace(None);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use pretty_assertions::assert_eq;

    use super::*;

    fn temp_log(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("retire-cli-{}-{name}.log", std::process::id()))
    }

    #[test]
    fn empty_slot_swallows_writes() {
        let slot = FileSlot::default();

        let written = slot.make_writer().write(b"dropped").unwrap();

        assert_eq!(written, 7);
    }

    #[test]
    fn slot_writes_to_open_file() {
        let path = temp_log("slot");
        let slot = FileSlot::default();
        slot.replace(Some(File::create(&path).unwrap()));

        slot.make_writer().write_all(b"hello\n").unwrap();
        slot.replace(None);

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn explicit_level_is_parsed() {
        assert!(initial_filter(Some("debug")).is_ok());
        assert!(initial_filter(Some("retire_core=trace,warn")).is_ok());
    }

    #[test]
    fn bad_level_is_rejected() {
        assert!(initial_filter(Some("retire_core=loud")).is_err());
    }

    #[test]
    fn init_twice_is_harmless() {
        let config = LoggingConfig {
            level: Some("warn".to_string()),
            file: None,
            console: false,
        };

        init(&config).unwrap();
        init(&config).unwrap();

        assert!(set_log_level("error").is_ok());
        assert!(set_log_level("nope=nope").is_err());
    }
}
