pub mod chat;
pub mod roles;

pub use chat::{
    AdvisorError, ChatClient, ChatCompletion, ChatCompletionRequest, ChatMessage, ChatRole,
};
pub use roles::{build_prompt, parse_roles, RoleAdvisor, FALLBACK_ROLES};
