//! Append-only request log.
//!
//! Each caught request becomes one line, `[<timestamp>] <json>\n`, written
//! synchronously to stdout and appended to the log file from a detached task.
//! File errors are reported through tracing and never reach the caller.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, task::JoinHandle};
use tracing::{debug, warn};

use super::record::RequestRecord;

/// Failures while persisting a request line.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to serialize request record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Format a record as a single log line, newline included.
pub fn format_line(record: &RequestRecord, at: DateTime<Utc>) -> Result<String, RecordError> {
    let json = serde_json::to_string(record)?;
    Ok(format!(
        "[{}] {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        json
    ))
}

/// Append a line to a file, creating it if needed.
pub async fn append_line(path: &Path, line: &str) -> Result<(), RecordError> {
    let wrap = |source| RecordError::Append {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(wrap)?;
    file.write_all(line.as_bytes()).await.map_err(wrap)?;
    file.flush().await.map_err(wrap)?;
    Ok(())
}

/// Writes caught requests to stdout and an append-only file.
#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log a record now.
    ///
    /// The stdout write happens before this returns. The file append runs on
    /// the returned task, which callers are free to drop; any failure has
    /// already been reported as `request_log_append_failed` by then.
    pub fn record(&self, record: &RequestRecord) -> JoinHandle<Result<(), RecordError>> {
        let line = match format_line(record, Utc::now()) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "request_log_format_failed");
                return tokio::spawn(async move { Err(e) });
            }
        };

        {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(line.as_bytes()).and_then(|_| stdout.flush()) {
                warn!(error = %e, "request_log_stdout_failed");
            }
        }

        let path = self.path.clone();
        tokio::spawn(async move {
            let result = append_line(&path, &line).await;
            match &result {
                Ok(()) => debug!(path = %path.display(), "request_log_appended"),
                Err(e) => warn!(error = %e, "request_log_append_failed"),
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Map, Value};

    fn sample_record() -> RequestRecord {
        RequestRecord {
            method: "POST".to_string(),
            url: "http://localhost:8080/hook?a=1".to_string(),
            path: "/hook?a=1".to_string(),
            query: json!({"a": "1"}).as_object().cloned().unwrap(),
            headers: Map::new(),
            body: json!({"hello": "world"}),
        }
    }

    #[test]
    fn test_format_line() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        let line = format_line(&sample_record(), at).unwrap();

        assert!(line.starts_with("[2024-05-01T12:30:05.000Z] {\"method\":\"POST\","));
        assert!(line.ends_with("}\n"));
        assert_eq!(line.matches('\n').count(), 1);

        let json_part = line.split_once("] ").unwrap().1.trim_end();
        let parsed: Value = serde_json::from_str(json_part).unwrap();
        let keys: Vec<&str> = parsed.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["method", "url", "path", "query", "headers", "body"]);
    }

    #[tokio::test]
    async fn test_record_appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let log = RequestLog::new(dir.path().join("requests.log"));

        for _ in 0..3 {
            log.record(&sample_record()).await.unwrap().unwrap();
        }

        let contents = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(line.starts_with('['));
            let json_part = line.split_once("] ").unwrap().1;
            let parsed: RequestRecord = serde_json::from_str(json_part).unwrap();
            assert_eq!(parsed, sample_record());
        }
    }

    #[tokio::test]
    async fn test_append_failure_is_reported_by_task() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = RequestLog::new(dir.path());

        let result = log.record(&sample_record()).await.unwrap();
        match result {
            Err(RecordError::Append { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected append error, got {:?}", other),
        }
    }

    /// Collects the message of every event it sees.
    #[derive(Clone, Default)]
    struct Messages(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Messages {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            struct Visitor<'a>(&'a mut Vec<String>);

            impl tracing::field::Visit for Visitor<'_> {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.0.push(format!("{:?}", value));
                    }
                }
            }

            let mut messages = self.0.lock().unwrap();
            event.record(&mut Visitor(&mut messages));
        }
    }

    #[tokio::test]
    async fn test_append_failure_emits_warning() {
        use tracing_subscriber::layer::SubscriberExt;

        let messages = Messages::default();
        let subscriber = tracing_subscriber::registry().with(messages.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempfile::tempdir().unwrap();
        let log = RequestLog::new(dir.path());

        // Current-thread runtime: the append task runs under the same default.
        let result = log.record(&sample_record()).await.unwrap();
        assert!(result.is_err());

        let seen = messages.0.lock().unwrap();
        assert!(
            seen.iter().any(|m| m == "request_log_append_failed"),
            "events: {:?}",
            seen
        );
    }

    #[tokio::test]
    async fn test_append_line_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("requests.log");

        let err = append_line(&missing, "x\n").await.unwrap_err();
        assert!(matches!(err, RecordError::Append { .. }));
        assert!(err.to_string().contains("no-such-dir"));
    }
}
