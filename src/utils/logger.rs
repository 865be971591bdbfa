use std::fmt::Write as _;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Output style selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One OpenTelemetry-shaped JSON object per line.
    Json,
    /// Human-readable multi-line output.
    Console,
}

impl LogFormat {
    /// Unknown formats fall back to console output.
    pub fn parse(format: &str) -> Self {
        match format.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Console,
        }
    }
}

pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(format!(
            "Invalid logging.level '{}'. Valid values: trace, debug, info, warn, error",
            level
        )),
    }
}

#[derive(Default)]
struct FieldCollector {
    fields: Map<String, Value>,
}

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

fn severity_number(level: &Level) -> u64 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

/// Where an event came from.
struct Origin<'a> {
    level: Level,
    name: &'a str,
    target: &'a str,
    file: Option<&'a str>,
    line: Option<u32>,
}

impl<'a> From<&'a Metadata<'a>> for Origin<'a> {
    fn from(metadata: &'a Metadata<'a>) -> Self {
        Origin {
            level: *metadata.level(),
            name: metadata.name(),
            target: metadata.target(),
            file: metadata.file(),
            line: metadata.line(),
        }
    }
}

/// Writes events as OpenTelemetry log records.
#[derive(Clone)]
struct OtelJsonEventFormatter {
    resource: Map<String, Value>,
}

impl OtelJsonEventFormatter {
    fn new(config: &LoggingConfig) -> Self {
        let mut resource = Map::new();
        resource.insert("service.name".to_string(), config.service_name.clone().into());
        resource.insert(
            "service.version".to_string(),
            config.service_version.clone().into(),
        );
        OtelJsonEventFormatter { resource }
    }

    /// The record for one event; `spans` lists enclosing spans, outermost first.
    fn record(&self, origin: Origin<'_>, fields: Map<String, Value>, spans: Vec<String>) -> Value {
        let mut attributes = fields;
        let body = match attributes.remove("message") {
            Some(Value::String(message)) => message,
            _ => origin.name.to_string(),
        };
        attributes.insert("code.target".to_string(), origin.target.into());
        if let Some(file) = origin.file {
            attributes.insert("code.filepath".to_string(), file.into());
        }
        if let Some(line) = origin.line {
            attributes.insert("code.lineno".to_string(), line.into());
        }
        if !spans.is_empty() {
            attributes.insert("span.path".to_string(), spans.join("::").into());
        }

        serde_json::json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "severity_text": origin.level.as_str(),
            "severity_number": severity_number(&origin.level),
            "body": body,
            "resource": self.resource.clone(),
            "attributes": attributes,
        })
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonEventFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let spans = ctx
            .event_scope()
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();

        let record = self.record(event.metadata().into(), collector.fields, spans);
        let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writer.write_str(&line)?;
        writer.write_char('\n')
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` directives are layered
/// on top of the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let installed = match LogFormat::parse(&config.format) {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().event_format(OtelJsonEventFormatter::new(config)))
            .try_init(),
        LogFormat::Console => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init(),
    };
    installed.map_err(|e| format!("Could not install logger: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" Debug "), Ok(LevelFilter::DEBUG));
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_unknown_format_is_console() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("fancy"), LogFormat::Console);
    }

    #[test]
    fn test_record_shape() {
        let formatter = OtelJsonEventFormatter::new(&LoggingConfig {
            service_name: "salondesk".to_string(),
            service_version: "0.1.0".to_string(),
            ..LoggingConfig::default()
        });
        let mut fields = Map::new();
        fields.insert("message".to_string(), "signed in".into());
        fields.insert("role".to_string(), "manager".into());

        let origin = Origin {
            level: Level::WARN,
            name: "event src/auth/context.rs:101",
            target: "salondesk::auth",
            file: Some("src/auth/context.rs"),
            line: Some(101),
        };
        let record = formatter.record(origin, fields, vec!["login".to_string()]);
        assert_eq!(record["body"], "signed in");
        assert_eq!(record["severity_text"], "WARN");
        assert_eq!(record["severity_number"], 13);
        assert_eq!(record["resource"]["service.name"], "salondesk");
        assert_eq!(record["attributes"]["role"], "manager");
        assert_eq!(record["attributes"]["code.target"], "salondesk::auth");
        assert_eq!(record["attributes"]["code.lineno"], 101);
        assert_eq!(record["attributes"]["span.path"], "login");
    }
}
