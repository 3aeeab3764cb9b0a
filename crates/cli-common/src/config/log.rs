use std::{
    convert::Infallible,
    fmt::{self, Display, Formatter},
    fs::OpenOptions,
    io,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tracing_subscriber::{
    fmt::{format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};

// SAFETY: each output sink is toggled independently from the configuration file.
#[allow(clippy::struct_excessive_bools)]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file_path")]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stdout")]
    pub emit_stdout: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    #[serde(default = "LogConfig::default_log_filters")]
    pub log_filters: String,

    #[serde(default = "LogConfig::default_log_formatter")]
    #[serde_as(as = "DisplayFromStr")]
    pub formatter: LogFormatter,

    /// Emit an event with busy/idle timings whenever a span closes.
    #[serde(default = "LogConfig::default_show_span_latency")]
    pub show_span_latency: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: Self::default_file_path(),
            emit_journald: Self::default_emit_journald(),
            emit_stdout: Self::default_emit_stdout(),
            emit_stderr: Self::default_emit_stderr(),
            log_filters: Self::default_log_filters(),
            formatter: Self::default_log_formatter(),
            show_span_latency: Self::default_show_span_latency(),
        }
    }
}

impl LogConfig {
    #[inline]
    #[must_use]
    pub fn default_log_filters() -> String { "info,ipscope_server=info,tower_http=info".to_string() }

    #[inline]
    #[must_use]
    pub const fn default_file_path() -> Option<PathBuf> { None }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stdout() -> bool { true }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_log_formatter() -> LogFormatter { LogFormatter::Pretty }

    #[inline]
    #[must_use]
    pub const fn default_show_span_latency() -> bool { false }

    /// Sinks enabled by this configuration, in installation order.
    fn sinks(&self) -> Vec<LogSink> {
        let mut sinks = Vec::with_capacity(4);
        if self.emit_journald {
            sinks.push(LogSink::Journald);
        }
        if let Some(path) = &self.file_path {
            sinks.push(LogSink::File(path.clone()));
        }
        if self.emit_stdout {
            sinks.push(LogSink::Stdout);
        }
        if self.emit_stderr {
            sinks.push(LogSink::Stderr);
        }
        sinks
    }

    /// Install the global `tracing` subscriber.
    ///
    /// Sinks that cannot be opened (an unwritable log file, a missing journald
    /// socket) are skipped instead of aborting start-up.
    pub fn init(&self) {
        let filter_layer = tracing_subscriber::filter::EnvFilter::new(self.log_filters.as_str());

        // With span latency enabled every closed span reports
        // `time.busy` and `time.idle`.
        let span_events =
            if self.show_span_latency { FmtSpan::CLOSE } else { FmtSpan::NONE };

        let layers = self
            .sinks()
            .into_iter()
            .filter_map(|sink| sink.layer(self.formatter, span_events.clone()))
            .collect::<Vec<_>>();

        tracing_subscriber::registry().with(filter_layer).with(layers).init();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LogSink {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

impl LogSink {
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self, formatter: LogFormatter, span_events: FmtSpan) -> Option<BoxedLayer<S>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        match self {
            Self::Stdout => Some(formatted_layer(io::stdout, formatter, span_events)),
            Self::Stderr => Some(formatted_layer(io::stderr, formatter, span_events)),
            Self::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                Some(formatted_layer(file, formatter, span_events))
            }
            Self::Journald => Some(tracing_journald::layer().ok()?.boxed()),
        }
    }
}

#[allow(clippy::type_repetition_in_bounds)]
fn formatted_layer<S, W>(writer: W, formatter: LogFormatter, span_events: FmtSpan) -> BoxedLayer<S>
where
    S: tracing::Subscriber,
    for<'a> S: LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let fmt = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(span_events)
        .with_writer(writer);

    match formatter {
        LogFormatter::Pretty => fmt.pretty().boxed(),
        LogFormatter::Json => fmt.json().flatten_event(true).boxed(),
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum LogFormatter {
    Pretty,
    Json,
}

impl FromStr for LogFormatter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            _ => Ok(Self::Pretty),
        }
    }
}

impl Display for LogFormatter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}
