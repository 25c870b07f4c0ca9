use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ChatClient {
    /// Creates a client; `base_url` must end with a slash, e.g. `https://api.openai.com/v1/`.
    pub fn new(api_key: impl Into<String>, base_url: Url, http: Client) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Issues a POST to `chat/completions` and decodes the response.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletion, AdvisorError> {
        let url = self.base_url.join("chat/completions")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        parse_json::<ChatCompletion>(response).await
    }
}

/// Body of a chat completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: Some(content.into()),
        }
    }
}

/// Decoded completion; only the fields the service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatCompletion {
    /// Text of the first choice, if the provider returned one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// Errors produced by the chat client.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

async fn parse_json<T>(response: Response) -> Result<T, AdvisorError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unavailable>"));
        return Err(AdvisorError::Status { status, body });
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(base_url: &Url) -> ChatClient {
        ChatClient::new(
            "sk-test",
            base_url.clone(),
            Client::builder().build().expect("client"),
        )
    }

    fn request() -> ChatCompletionRequest<'static> {
        ChatCompletionRequest {
            model: "gpt-4",
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hello")],
            max_tokens: 150,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn complete_sends_bearer_and_parses_choice() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/v1/")).expect("url");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .json_body_partial(
                        json!({
                            "model": "gpt-4",
                            "max_tokens": 150,
                            "messages": [
                                { "role": "system", "content": "be brief" },
                                { "role": "user", "content": "hello" }
                            ]
                        })
                        .to_string(),
                    );
                then.status(200).json_body(json!({
                    "id": "chatcmpl-1",
                    "choices": [
                        { "index": 0, "message": { "role": "assistant", "content": "hi" } }
                    ]
                }));
            })
            .await;

        let completion = client(&base).complete(&request()).await.expect("complete");
        mock.assert_async().await;
        assert_eq!(completion.first_content(), Some("hi"));
    }

    #[tokio::test]
    async fn missing_choices_yield_no_content() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/v1/")).expect("url");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let completion = client(&base).complete(&request()).await.expect("complete");
        assert!(completion.first_content().is_none());
    }

    #[tokio::test]
    async fn error_status_returns_message() {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.url("/v1/")).expect("url");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let err = client(&base)
            .complete(&request())
            .await
            .expect_err("should error");
        match err {
            AdvisorError::Status { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
