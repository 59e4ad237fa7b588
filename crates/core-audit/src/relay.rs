//! Remote telemetry relay
//!
//! Mirrors every [`QueryEvent`] to a remote monitoring channel as a Markdown
//! chat message. Dispatch is fire-and-forget: each message is sent from a
//! detached task, failures are logged locally and nothing is retried.
//!
//! The channel rejects messages longer than [`MAX_MESSAGE_CHARS`] and any
//! message with an unclosed Markdown entity. At most [`MAX_RELAYED_RECORDS`]
//! records are rendered; a message still over the limit drops trailing
//! records and ends with [`TRUNCATION_MARKER`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::QueryEvent;
use crate::record::LookupRecord;

/// Hard size limit of the remote channel, in characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Records rendered per message
pub const MAX_RELAYED_RECORDS: usize = 15;

/// Characters of the agent string included in a message
pub const AGENT_PREVIEW_CHARS: usize = 50;

/// Suffix of a message cut down to the size limit
pub const TRUNCATION_MARKER: &str = "[message truncated]";

/// Default deadline for one dispatch
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifies the client a relayed event came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Operating system and architecture
    pub platform: String,

    /// Program name and version
    pub agent: String,
}

impl ClientContext {
    pub fn new<P: Into<String>, A: Into<String>>(platform: P, agent: A) -> Self {
        Self {
            platform: platform.into(),
            agent: agent.into(),
        }
    }

    /// Describe the running process
    pub fn detect(program: &str, version: &str) -> Self {
        Self::new(
            format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            format!(
                "{}/{} ({}; {})",
                program,
                version,
                std::env::consts::FAMILY,
                std::env::consts::OS
            ),
        )
    }
}

/// Body posted to the remote channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: String,
    pub disable_web_page_preview: bool,
}

impl TelemetryPayload {
    pub fn markdown(chat_id: &str, text: String) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text,
            parse_mode: "Markdown".to_string(),
            disable_web_page_preview: true,
        }
    }
}

/// Destination for relayed messages
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Sink identifier used in logs
    fn name(&self) -> &'static str;

    /// Deliver one payload
    async fn send(&self, payload: &TelemetryPayload) -> Result<()>;
}

/// Webhook sink posting JSON over HTTP
pub struct HttpTelemetrySink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTelemetrySink {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetrySink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, payload: &TelemetryPayload) -> Result<()> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote_rejected(status.as_u16(), body));
        }
        Ok(())
    }
}

/// Fire-and-forget forwarder of query events
#[derive(Clone)]
pub struct TelemetryRelay {
    sink: Option<Arc<dyn TelemetrySink>>,
    chat_id: String,
    timeout: Duration,
}

impl TelemetryRelay {
    pub fn new(sink: Arc<dyn TelemetrySink>, chat_id: &str) -> Self {
        Self {
            sink: Some(sink),
            chat_id: chat_id.to_string(),
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// Relay that drops every event
    pub fn disabled() -> Self {
        Self {
            sink: None,
            chat_id: String::new(),
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Format `event` and dispatch it from a detached task
    ///
    /// Returns the task handle, which callers are free to drop. Returns
    /// `None` when the relay is disabled or no async runtime is running.
    pub fn relay(&self, event: &QueryEvent, context: &ClientContext) -> Option<JoinHandle<()>> {
        let sink = match &self.sink {
            Some(sink) => sink.clone(),
            None => {
                debug!(id = %event.id, "Telemetry relay disabled, event not forwarded");
                return None;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(id = %event.id, "No async runtime available, telemetry not sent");
                return None;
            }
        };

        let payload = TelemetryPayload::markdown(&self.chat_id, format_message(event, context));
        let timeout = self.timeout;
        let id = event.id;

        Some(runtime.spawn(async move {
            match dispatch(sink.as_ref(), &payload, timeout).await {
                Ok(()) => debug!(%id, sink = sink.name(), "Telemetry delivered"),
                Err(e) => warn!(%id, sink = sink.name(), "Telemetry log failed: {}", e),
            }
        }))
    }
}

async fn dispatch(
    sink: &dyn TelemetrySink,
    payload: &TelemetryPayload,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, sink.send(payload)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}

/// Render the chat message for `event`
///
/// The result never exceeds [`MAX_MESSAGE_CHARS`] characters. Oversized
/// messages lose whole trailing records first; only escaped free text (the
/// error line, an overlong query) is ever cut mid-value, so every Markdown
/// entity stays closed.
pub fn format_message(event: &QueryEvent, context: &ClientContext) -> String {
    let agent: String = context.agent.chars().take(AGENT_PREVIEW_CHARS).collect();
    let time = event.timestamp.with_timezone(&Local);
    let header_with = |query: &str| {
        format!(
            "🚨 *QUERYDESK ALERT* 🚨\n\n\
             🎯 *Query:* `{}`\n\
             📡 *Status:* {}\n\
             📂 *Count:* {}\n\n\
             🌍 *Platform:* {}\n\
             📱 *Agent:* `{}...`\n\
             🕒 *Time:* {}",
            query,
            if event.success { "✅ SUCCESS" } else { "❌ FAILED" },
            event.results_count,
            escape_markdown(&context.platform),
            code_span(&agent),
            time.format("%Y-%m-%d %H:%M:%S"),
        )
    };

    let query = code_span(&event.query);
    let mut header = header_with(&query);
    let overflow = char_len(&header).saturating_sub(HEADER_BUDGET_CHARS);
    let header_cut = overflow > 0;
    if header_cut {
        let keep = char_len(&query).saturating_sub(overflow + 3);
        let clipped: String = query.chars().take(keep).collect();
        header = header_with(&format!("{}...", clipped));
    }

    match event.records() {
        Some(records) if !records.is_empty() => fit_records(&header, &records, header_cut),
        Some(_) => with_marker(header, header_cut),
        None => {
            let line = format!("{}\n\n⛔ *Error:* ", header);
            let error = escape_markdown(&event.details);
            if !header_cut && char_len(&line) + char_len(&error) <= MAX_MESSAGE_CHARS {
                return line + &error;
            }
            let budget = MAX_MESSAGE_CHARS
                .saturating_sub(char_len(&line) + char_len(&marker_line()));
            with_marker(line + &clip_escaped(&error, budget), true)
        }
    }
}

/// Largest header before the query inside it is clipped
const HEADER_BUDGET_CHARS: usize = MAX_MESSAGE_CHARS / 2;

/// Keep as many leading records as fit, naming how many were left out
fn fit_records(header: &str, records: &[LookupRecord], header_cut: bool) -> String {
    let blocks: Vec<String> = records
        .iter()
        .take(MAX_RELAYED_RECORDS)
        .enumerate()
        .map(|(index, record)| record_block(index + 1, record))
        .collect();

    let mut kept = blocks.len();
    loop {
        let mut message = header.to_string();
        if kept > 0 {
            message.push_str("\n\n");
            message.push_str(&blocks[..kept].join("\n\n"));
        }

        let omitted = records.len() - kept;
        if omitted > 0 {
            message.push_str(&format!(
                "\n\n⚠️ *...and {} more records truncated (limit reached).*",
                omitted
            ));
        }

        let message = with_marker(message, header_cut || kept < blocks.len());
        if kept == 0 || char_len(&message) <= MAX_MESSAGE_CHARS {
            return message;
        }
        kept -= 1;
    }
}

fn record_block(number: usize, record: &LookupRecord) -> String {
    let address = if record.address.trim().is_empty() {
        "N/A".to_string()
    } else {
        escape_markdown(&record.address)
    };
    format!(
        "📝 *Record #{}*\n👤 *Name:* {}\n📱 *Mobile:* `{}`\n💳 *CNIC:* `{}`\n📍 *Address:* {}",
        number,
        escape_markdown(&record.name),
        code_span(&record.mobile),
        code_span(&record.cnic),
        address,
    )
}

fn with_marker(mut message: String, cut: bool) -> String {
    if cut {
        message.push_str(&marker_line());
    }
    message
}

fn marker_line() -> String {
    format!("\n{}", escape_markdown(TRUNCATION_MARKER))
}

/// Cut escaped text to `budget` characters without leaving a dangling escape
fn clip_escaped(text: &str, budget: usize) -> String {
    let mut clipped: String = text.chars().take(budget).collect();
    while clipped.ends_with('\\') {
        clipped.pop();
    }
    clipped
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Escape legacy Markdown control characters in free text
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Backticks cannot be escaped inside a code span
fn code_span(text: &str) -> String {
    text.replace('`', "'")
}
