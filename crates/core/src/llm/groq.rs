use crate::config::Settings;
use crate::domain::run::Direction;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{Summarizer, NO_RECENT_FEEDS_SENTINEL};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const GAINER_MODEL: &str = "llama3-70b-8192";
const LOSER_MODEL: &str = "llama-3.1-8b-instant";

const MAX_COMPLETION_TOKENS: u32 = 256;
const SAMPLING_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_groq_api_key()?.to_string();
        let base_url =
            std::env::var("GROQ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("GROQ_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Groq http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    fn model_for(direction: Direction) -> &'static str {
        match direction {
            Direction::Gainer => GAINER_MODEL,
            Direction::Loser => LOSER_MODEL,
        }
    }

    fn prompt(stock_name: &str, recent_feeds: &[String], direction: Direction) -> String {
        let closing = match direction {
            Direction::Gainer => "",
            Direction::Loser => {
                " Do not open with phrases like \"here are the reasons\"; return only the summaries."
            }
        };

        format!(
            "You are a financial analyst.\n\n\
             Analyze the following recent news and updates about the NSE-listed company \"{stock_name}\":\n\n\
             {feeds}\n\n\
             From this feed, extract exactly the top 3 reasons why this company may be appearing as a {direction_word} in the stock market.\n\n\
             Only return a numbered list in this exact format:\n\
             1. Title: Short explanation\n\
             2. Title: Short explanation\n\
             3. Title: Short explanation\n\n\
             Do NOT include any introductions, summaries, or extra lines. Be concise (<= 180 characters per reason).{closing}",
            feeds = recent_feeds.join("\n"),
            direction_word = direction.as_str(),
        )
    }

    async fn chat_completion(&self, model: &str, prompt: String) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let req = ChatCompletionRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("Groq request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Groq response body")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError {
                model: model.to_string(),
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|err| LlmDiagnosticsError {
                model: model.to_string(),
                stage: "decode",
                detail: err.to_string(),
                raw_output: Some(text.clone()),
            })?;

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => Err(LlmDiagnosticsError {
                model: model.to_string(),
                stage: "decode",
                detail: "response has no choices".to_string(),
                raw_output: Some(text),
            }
            .into()),
        }
    }
}

#[async_trait::async_trait]
impl Summarizer for GroqClient {
    async fn summarise_feeds(
        &self,
        stock_name: &str,
        recent_feeds: &[String],
        direction: Direction,
    ) -> anyhow::Result<Vec<String>> {
        // Nothing to summarize; skip the round-trip entirely.
        if recent_feeds.is_empty() {
            return Ok(vec![NO_RECENT_FEEDS_SENTINEL.to_string()]);
        }

        let model = Self::model_for(direction);
        let content = self
            .chat_completion(model, Self::prompt(stock_name, recent_feeds, direction))
            .await?;

        // Each line is expected to be a numbered "Title: explanation" entry;
        // whatever count actually came back is passed through verbatim.
        Ok(content
            .trim()
            .split('\n')
            .map(|line| line.to_string())
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String) -> GroqClient {
        GroqClient {
            http: reqwest::Client::new(),
            api_key: "test-key".to_string(),
            base_url,
        }
    }

    #[tokio::test]
    async fn empty_feeds_short_circuit_without_any_call() {
        // An unroutable base URL proves no request is attempted.
        let groq = client("http://127.0.0.1:1".to_string());
        let reasons = groq
            .summarise_feeds("Acme Ltd", &[], Direction::Gainer)
            .await
            .unwrap();
        assert_eq!(reasons, vec![NO_RECENT_FEEDS_SENTINEL.to_string()]);
    }

    #[tokio::test]
    async fn splits_completion_into_lines_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": GAINER_MODEL,
                "max_tokens": 256,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content":
                    "1. Orders: Large export order won\n2. Results: Strong quarter\n3. Upgrade: Broker target raised"
                }}]
            })))
            .mount(&server)
            .await;

        let groq = client(server.uri());
        let feeds = vec!["Large export order".to_string()];
        let reasons = groq
            .summarise_feeds("Acme Ltd", &feeds, Direction::Gainer)
            .await
            .unwrap();

        assert_eq!(
            reasons,
            vec![
                "1. Orders: Large export order won".to_string(),
                "2. Results: Strong quarter".to_string(),
                "3. Upgrade: Broker target raised".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn line_count_is_not_revalidated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"model": LOSER_MODEL})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "1. Only: One reason came back"}}]
            })))
            .mount(&server)
            .await;

        let groq = client(server.uri());
        let feeds = vec!["Profit warning".to_string()];
        let reasons = groq
            .summarise_feeds("Slump Ltd", &feeds, Direction::Loser)
            .await
            .unwrap();
        assert_eq!(reasons.len(), 1);
    }

    #[tokio::test]
    async fn service_errors_surface_with_diagnostics() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("{\"error\":\"rate limited\"}"),
            )
            .mount(&server)
            .await;

        let groq = client(server.uri());
        let feeds = vec!["Anything".to_string()];
        let err = groq
            .summarise_feeds("Acme Ltd", &feeds, Direction::Gainer)
            .await
            .unwrap_err();

        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, "http");
        assert!(diag.raw_output.as_deref().unwrap().contains("rate limited"));
    }
}
