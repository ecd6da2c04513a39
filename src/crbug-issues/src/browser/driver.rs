//! Automation through an external driver process.
//!
//! The driver (for example a small Playwright script) reads one JSON request
//! per line on stdin and answers with one JSON response per line on stdout.
//! Every response echoes the `id` of the request it answers:
//!
//! ```text
//! -> {"id":1,"op":"navigate","url":"https://issues.chromium.org/issues/1","timeout_ms":30000}
//! <- {"id":1,"ok":true}
//! -> {"id":2,"op":"query-text","selector":"h1"}
//! <- {"id":2,"ok":true,"value":"Crash in compositor"}
//! ```
//!
//! A request that times out may still be answered later. Replies whose id does
//! not match the pending request are discarded.

use super::{AutomationSession, BrowserAutomation, BrowserError};
use crate::config::BrowserSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// Extra time granted on top of the navigation bound for the driver to answer.
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// How long a closing driver may take before it is killed.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Launches one driver process per session.
#[derive(Debug, Clone)]
pub struct DriverAutomation {
    command: String,
    args: Vec<String>,
    command_timeout: Duration,
}

impl DriverAutomation {
    /// Creates an automation backend from browser settings.
    #[must_use]
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            command: settings.driver_command.clone(),
            args: settings.driver_args.clone(),
            command_timeout: settings.command_timeout(),
        }
    }

    fn launch(&self) -> Result<DriverSession, BrowserError> {
        debug!(command = %self.command, "Launching browser driver");
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BrowserError::Launch {
                command: self.command.clone(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(BrowserError::DriverExited);
        };

        Ok(DriverSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            command_timeout: self.command_timeout,
            navigation_grace: NAVIGATION_GRACE,
            next_id: 1,
        })
    }
}

#[async_trait]
impl BrowserAutomation for DriverAutomation {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, BrowserError> {
        Ok(Box::new(self.launch()?))
    }
}

/// A driver process plus its protocol pipes.
pub struct DriverSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    command_timeout: Duration,
    navigation_grace: Duration,
    next_id: u64,
}

#[derive(Debug, Serialize)]
struct RequestLine<'a> {
    id: u64,
    #[serde(flatten)]
    request: &'a DriverRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
enum DriverRequest<'a> {
    Navigate { url: &'a str, timeout_ms: u64 },
    QueryText { selector: &'a str },
    QueryAllText { selector: &'a str },
    PageText,
    Close,
}

impl DriverRequest<'_> {
    fn op(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::QueryText { .. } => "query-text",
            Self::QueryAllText { .. } => "query-all-text",
            Self::PageText => "page-text",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriverResponse {
    #[serde(default)]
    id: Option<u64>,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

impl DriverSession {
    async fn exchange(&mut self, id: u64, line: &str) -> Result<DriverResponse, BrowserError> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        loop {
            let reply = self
                .stdout
                .next_line()
                .await?
                .ok_or(BrowserError::DriverExited)?;
            let response: DriverResponse = serde_json::from_str(&reply)?;
            if response.id == Some(id) {
                return Ok(response);
            }
            debug!(expected = id, received = ?response.id, "Discarding stale driver reply");
        }
    }

    async fn call(
        &mut self,
        request: DriverRequest<'_>,
        timeout: Duration,
    ) -> Result<Value, BrowserError> {
        let op = request.op();
        let id = self.next_id;
        self.next_id += 1;
        let mut line = serde_json::to_string(&RequestLine {
            id,
            request: &request,
        })?;
        line.push('\n');

        let response = tokio::time::timeout(timeout, self.exchange(id, &line))
            .await
            .map_err(|_| BrowserError::Timeout {
                op,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        if !response.ok {
            return Err(BrowserError::Driver {
                op,
                message: response
                    .error
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }
        Ok(response.value)
    }
}

#[async_trait]
impl AutomationSession for DriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let bound = timeout + self.navigation_grace;
        self.call(DriverRequest::Navigate { url, timeout_ms }, bound)
            .await?;
        Ok(())
    }

    async fn query_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let timeout = self.command_timeout;
        let value = self
            .call(DriverRequest::QueryText { selector }, timeout)
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn query_all_text(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let timeout = self.command_timeout;
        let value = self
            .call(DriverRequest::QueryAllText { selector }, timeout)
            .await?;
        Ok(value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn page_text(&mut self) -> Result<String, BrowserError> {
        let timeout = self.command_timeout;
        let value = self.call(DriverRequest::PageText, timeout).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        let timeout = self.command_timeout;
        if let Err(e) = self.call(DriverRequest::Close, timeout).await {
            debug!(error = %e, "Driver did not acknowledge close");
        }
        match tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(%status, "Browser driver exited");
                Ok(())
            }
            Err(_) => {
                warn!("Browser driver did not exit, killing it");
                self.child.kill().await?;
                Ok(())
            }
        }
    }

    fn abort(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "Failed to kill browser driver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_kebab_case_ops() {
        let json = serde_json::to_string(&DriverRequest::Navigate {
            url: "https://issues.chromium.org/issues/1",
            timeout_ms: 30_000,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"op":"navigate","url":"https://issues.chromium.org/issues/1","timeout_ms":30000}"#
        );
        assert_eq!(
            serde_json::to_string(&DriverRequest::QueryAllText { selector: "b-comment" }).unwrap(),
            r#"{"op":"query-all-text","selector":"b-comment"}"#
        );
        assert_eq!(
            serde_json::to_string(&DriverRequest::PageText).unwrap(),
            r#"{"op":"page-text"}"#
        );
    }

    #[test]
    fn request_lines_carry_an_id() {
        let line = RequestLine {
            id: 3,
            request: &DriverRequest::QueryText { selector: "h1" },
        };
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"id":3,"op":"query-text","selector":"h1"}"#
        );
        let line = RequestLine {
            id: 4,
            request: &DriverRequest::Close,
        };
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"id":4,"op":"close"}"#
        );
    }

    #[test]
    fn responses_default_missing_fields() {
        let response: DriverResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(response.id.is_none());
        assert!(response.ok);
        assert!(response.value.is_null());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn launch_failure_is_reported() {
        let automation = DriverAutomation::new(&BrowserSettings {
            driver_command: "/nonexistent/crbug-browser-driver".to_string(),
            ..BrowserSettings::default()
        });
        let result = automation.open_session().await;
        assert!(matches!(result, Err(BrowserError::Launch { .. })));
    }

    /// Answers navigation a second late and echoes every selector it is asked for.
    #[cfg(unix)]
    const SLOW_NAVIGATION_DRIVER: &str = r#"
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed -n 's/.*"id":\([0-9]*\).*/\1/p')
  case "$line" in
    *'"op":"navigate"'*)
      sleep 1
      printf '{"id":%s,"ok":true,"value":"navigated"}\n' "$id" ;;
    *'"op":"query-text"'*)
      selector=$(printf '%s\n' "$line" | sed -n 's/.*"selector":"\([^"]*\)".*/\1/p')
      printf '{"id":%s,"ok":true,"value":"text of %s"}\n' "$id" "$selector" ;;
    *'"op":"close"'*)
      printf '{"id":%s,"ok":true}\n' "$id"
      exit 0 ;;
    *)
      printf '{"id":%s,"ok":true}\n' "$id" ;;
  esac
done
"#;

    #[cfg(unix)]
    #[tokio::test]
    async fn late_reply_after_timeout_is_discarded() {
        let automation = DriverAutomation::new(&BrowserSettings {
            driver_command: "sh".to_string(),
            driver_args: vec!["-c".to_string(), SLOW_NAVIGATION_DRIVER.to_string()],
            command_timeout_secs: 5,
            ..BrowserSettings::default()
        });
        let mut session = automation.launch().unwrap();
        session.navigation_grace = Duration::ZERO;

        let error = session
            .navigate("https://issues.chromium.org/issues/1", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(error.is_timeout());

        assert_eq!(
            session.query_text("h1").await.unwrap().as_deref(),
            Some("text of h1")
        );
        assert_eq!(
            session.query_text("h2").await.unwrap().as_deref(),
            Some("text of h2")
        );
        session.close().await.unwrap();
    }
}
