//! Append-only audit trail for every gateway request.
//!
//! Writes never carry raw prompt or completion content -- only metadata: who,
//! when, which provider, token counts, cost, and a summary of redacted PII
//! entity kinds. Two sinks:
//!
//! - a local JSONL file, one entry per line, for grep-friendly inspection and
//!   for [`AuditLogger::recent`]
//! - an optional SIEM webhook, fired and forgotten: a slow or unreachable SIEM
//!   must never add latency to the request that triggered the log

#![cfg_attr(not(feature = "enabled"), allow(unused))]

#[cfg(feature = "enabled")]
mod logger {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use gateway_types::{AuditEntry, Error, Result};
    use tokio::fs::OpenOptions;
    use tokio::io::AsyncWriteExt as _;

    const SIEM_TIMEOUT: Duration = Duration::from_secs(3);

    /// Writes audit entries to a local JSONL file and, if configured, ships a
    /// copy to a SIEM webhook on a detached task.
    pub struct AuditLogger {
        log_path: PathBuf,
        siem_url: Option<String>,
        http: reqwest::Client,
    }

    impl AuditLogger {
        /// Creates the logger, eagerly creating `log_path`'s parent directory.
        pub fn new(log_path: impl Into<PathBuf>, siem_url: Option<String>) -> Result<Self> {
            let log_path = log_path.into();
            if let Some(parent) = log_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::Io(e.to_string()))?;
                }
            }
            Ok(Self { log_path, siem_url, http: reqwest::Client::new() })
        }

        /// Appends `entry` to the local log and, if a SIEM webhook is configured,
        /// spawns a fire-and-forget POST. Never awaited by the caller: SIEM
        /// unavailability must never add latency to the request path. The file
        /// write itself is async so it never blocks the request task's executor
        /// thread.
        pub async fn log(&self, entry: AuditEntry) -> Result<()> {
            let line = serde_json::to_string(&entry).map_err(|e| Error::Config(e.to_string()))?;

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
                .await
                .map_err(|e| Error::Io(e.to_string()))?;
            file.write_all(format!("{line}\n").as_bytes()).await.map_err(|e| Error::Io(e.to_string()))?;

            if let Some(url) = self.siem_url.clone() {
                let http = self.http.clone();
                tokio::spawn(async move {
                    ship_to_siem(&http, &url, &entry).await;
                });
            }

            Ok(())
        }

        /// Reads up to `limit` most recent entries, most recent first. Lines
        /// that fail to parse (partial writes, corruption) are skipped rather
        /// than failing the whole read.
        pub fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
            if !self.log_path.exists() {
                return Ok(Vec::new());
            }
            let contents = std::fs::read_to_string(&self.log_path).map_err(|e| Error::Io(e.to_string()))?;
            let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
            let start = lines.len().saturating_sub(limit);
            let entries: Vec<AuditEntry> = lines[start..]
                .iter()
                .rev()
                .filter_map(|line| match serde_json::from_str(line) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unparsable audit log line");
                        None
                    }
                })
                .collect();
            Ok(entries)
        }

        pub fn log_path(&self) -> &Path {
            &self.log_path
        }
    }

    async fn ship_to_siem(http: &reqwest::Client, url: &str, entry: &AuditEntry) {
        let payload = serde_json::json!({ "event": entry, "sourcetype": "ai_gateway" });
        let result = http.post(url).timeout(SIEM_TIMEOUT).json(&payload).send().await;
        if let Err(e) = result {
            tracing::debug!(error = %e, "siem webhook delivery failed, dropping");
        }
    }
}

#[cfg(feature = "enabled")]
pub use logger::AuditLogger;

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_types::{AuditEntry, Provider, RequestStatus};

    fn sample_entry(tenant: &str) -> AuditEntry {
        AuditEntry {
            timestamp: chrono::Utc::now(),
            request_id: "req_00000000-0000-0000-0000-000000000000".into(),
            tenant_id: tenant.into(),
            provider_requested: Some(Provider::Anthropic),
            provider_used: Some(Provider::Anthropic),
            model_used: Some("claude-sonnet-4-6".into()),
            prompt_tokens: 10,
            completion_tokens: 20,
            estimated_cost_usd: 0.001,
            pii_entities_redacted: vec!["EMAIL_ADDRESS".into()],
            pii_redaction_count: 1,
            latency_ms: 42,
            fallback_triggered: false,
            fallback_reason: None,
            status: RequestStatus::Success,
            error_message: None,
        }
    }

    #[tokio::test]
    async fn logs_are_appended_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/audit.jsonl");
        let logger = AuditLogger::new(&path, None).unwrap();

        logger.log(sample_entry("acme")).await.unwrap();
        logger.log(sample_entry("globex")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn recent_returns_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = AuditLogger::new(&path, None).unwrap();

        logger.log(sample_entry("first")).await.unwrap();
        logger.log(sample_entry("second")).await.unwrap();
        logger.log(sample_entry("third")).await.unwrap();

        let recent = logger.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tenant_id, "third");
        assert_eq!(recent[1].tenant_id, "second");
    }

    #[test]
    fn recent_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.jsonl");
        let logger = AuditLogger::new(&path, None).unwrap();
        assert!(logger.recent(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_skips_unparsable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = AuditLogger::new(&path, None).unwrap();
        logger.log(sample_entry("acme")).await.unwrap();

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not valid json").unwrap();

        let recent = logger.recent(10).unwrap();
        assert_eq!(recent.len(), 1);
    }
}
