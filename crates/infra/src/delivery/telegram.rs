//! Telegram Bot API report sink.
//!
//! Text goes out via `sendMessage` with HTML parse mode, the dashboard via
//! `sendDocument` as a JSON attachment. Delivery is fan-out with per-chat
//! isolation: a failed chat is logged and counted, the rest still receive
//! the report.

use async_trait::async_trait;
use opspulse_core::{DeliveryReport, ReportSink};
use opspulse_domain::{DashboardSpec, OpsPulseError, Result, TelegramConfig};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, warn};

use crate::http::HttpClient;

pub struct TelegramSink {
    http: HttpClient,
    token: String,
    api_base: String,
}

impl TelegramSink {
    pub fn new(http: HttpClient, config: &TelegramConfig) -> Self {
        Self {
            http,
            token: config.token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, api_method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, api_method)
    }

    async fn deliver_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        let request = self.http.request(Method::POST, self.endpoint("sendMessage")).json(&body);
        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpsPulseError::Delivery(format!(
                "sendMessage returned HTTP {status} for chat {chat_id}"
            )));
        }
        Ok(())
    }

    async fn deliver_document(&self, chat_id: i64, document: &[u8]) -> Result<()> {
        let part = Part::bytes(document.to_vec())
            .file_name("dashboard.json")
            .mime_str("application/json")
            .map_err(|e| OpsPulseError::Internal(format!("invalid attachment mime: {e}")))?;
        let form = Form::new().text("chat_id", chat_id.to_string()).part("document", part);

        let request = self.http.request(Method::POST, self.endpoint("sendDocument")).multipart(form);
        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpsPulseError::Delivery(format!(
                "sendDocument returned HTTP {status} for chat {chat_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportSink for TelegramSink {
    async fn send_text(&self, text: &str, chats: &[i64]) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();
        for &chat_id in chats {
            match self.deliver_text(chat_id, text).await {
                Ok(()) => {
                    debug!(chat_id, "report text delivered");
                    report.delivered += 1;
                }
                Err(err) => {
                    warn!(chat_id, error = %err, "failed to deliver report text");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    async fn send_dashboard(
        &self,
        spec: &DashboardSpec,
        chats: &[i64],
    ) -> Result<DeliveryReport> {
        let document = serde_json::to_vec(spec)
            .map_err(|e| OpsPulseError::Internal(format!("dashboard serialization: {e}")))?;

        let mut report = DeliveryReport::default();
        for &chat_id in chats {
            match self.deliver_document(chat_id, &document).await {
                Ok(()) => {
                    debug!(chat_id, "dashboard delivered");
                    report.delivered += 1;
                }
                Err(err) => {
                    warn!(chat_id, error = %err, "failed to deliver dashboard");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}
