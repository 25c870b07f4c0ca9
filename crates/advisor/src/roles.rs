//! Role recommendations derived from a user's selected career domains.

use genesis_core::naming::display_name;

use crate::chat::{AdvisorError, ChatClient, ChatCompletionRequest, ChatMessage};

const SYSTEM_PROMPT: &str = "You are a career advisor AI that provides specific, actionable role recommendations based on user interests. Focus on modern, in-demand roles that combine multiple domains.";
const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.7;

/// Served whenever the provider is unavailable or fails.
pub const FALLBACK_ROLES: [&str; 5] = [
    "AI Product Manager",
    "Technical Program Manager",
    "Growth Engineer",
    "Developer Advocate",
    "Solutions Architect",
];

/// Asks the chat provider for role names matching a set of domains.
#[derive(Clone)]
pub struct RoleAdvisor {
    client: ChatClient,
    model: String,
}

impl RoleAdvisor {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the provider's suggestions; an empty reply yields an empty list.
    pub async fn recommend_roles(&self, domains: &[String]) -> Result<Vec<String>, AdvisorError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(domains)),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let completion = self.client.complete(&request).await?;
        Ok(completion
            .first_content()
            .map(parse_roles)
            .unwrap_or_default())
    }
}

/// Builds the user prompt from the display names of `domains`.
pub fn build_prompt(domains: &[String]) -> String {
    let names = domains
        .iter()
        .map(|domain| display_name(domain))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Based on the following career domains: {names}, provide 3-5 specific role recommendations that combine these interests. Focus on emerging roles and interdisciplinary opportunities. Return only the role names, separated by commas."
    )
}

/// Splits a comma separated reply into trimmed, non-empty role names.
pub fn parse_roles(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}
