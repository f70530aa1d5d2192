//! Ollama backend implementation
//!
//! HTTP client for the Ollama chat API. The instruction embeds today's date,
//! the known account names, and the category names segmented by kind, and
//! requests strictly-typed JSON output.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::parsing::parse_remote_entry;
use super::types::{RemoteParse, RemoteRequest};
use super::RemoteBackend;

/// Ollama chat backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("JOT_REMOTE_HOST").ok()?;
        let model = std::env::var("JOT_REMOTE_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn build_system_prompt(request: &RemoteRequest) -> String {
        format!(
            r#"You are a bookkeeping entry parser. Given free-form text describing one transaction, extract a structured record.

Today's date is {today}.
Known accounts: {accounts}
Income categories: {income}
Expense categories: {expense}

Respond with a single JSON object containing any of these fields you can determine (omit the rest):
- "amount": non-negative number
- "type": one of "income", "expense", "transfer"
- "accountName": source account, one of the known accounts exactly as written
- "toAccountName": target account for transfers, one of the known accounts
- "categoryName": one of the listed categories exactly as written
- "date": ISO date YYYY-MM-DD
- "description": the text with amount, date, and account words removed

Respond with JSON only, no prose."#,
            today = request.today,
            accounts = request.accounts.join(", "),
            income = request.income_categories.join(", "),
            expense = request.expense_categories.join(", "),
        )
    }
}

/// Request to the Ollama chat API
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Response from the Ollama chat API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[async_trait]
impl RemoteBackend for OllamaBackend {
    async fn parse_entry(&self, request: &RemoteRequest) -> Result<RemoteParse> {
        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: Self::build_system_prompt(request),
                },
                ChatMessage {
                    role: "user",
                    content: request.text.clone(),
                },
            ],
            format: "json",
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&chat_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        let chat_response: ChatResponse = response.json().await?;
        debug!("Remote parse response: {}", chat_response.message.content);

        parse_remote_entry(&chat_response.message.content)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_context() {
        let request = RemoteRequest {
            text: "lunch 180 cash".into(),
            today: "2024-03-15".into(),
            accounts: vec!["Cash".into(), "Bank Account".into()],
            income_categories: vec!["Salary".into()],
            expense_categories: vec!["Food & Dining".into()],
        };
        let prompt = OllamaBackend::build_system_prompt(&request);
        assert!(prompt.contains("2024-03-15"));
        assert!(prompt.contains("Cash, Bank Account"));
        assert!(prompt.contains("Salary"));
        assert!(prompt.contains("Food & Dining"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
    }
}
