// ABOUTME: One-shot code review through the mentor prompt of a pill mode
// ABOUTME: Two-message request with no conversation state; failures become apology text

use crate::constants::llm_tuning;
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use socrai_core::errors::AppError;
use socrai_core::models::PillMode;
use std::sync::Arc;
use tracing::{error, info};

/// Analysis request messages: system instructions then the fenced snippet
#[must_use]
pub fn build_analysis_messages(code: &str, pill_mode: PillMode, language: &str) -> Vec<ChatMessage> {
    let mut system = prompts::template(pill_mode).to_owned();
    system.push_str(&prompts::code_analysis_instructions(language));

    vec![
        ChatMessage::system(system),
        ChatMessage::user(prompts::code_analysis_request(code, language)),
    ]
}

/// User-facing text substituted for a failed analysis
#[must_use]
pub fn apology(error: &AppError) -> String {
    format!(
        "I apologize, but I'm having trouble analyzing this code right now. Please try again later. Error: {}",
        error.message
    )
}

/// Reviews standalone snippets
#[derive(Clone)]
pub struct CodeAnalyzer {
    llm: Arc<dyn LlmProvider>,
}

impl CodeAnalyzer {
    /// Create an analyzer over the shared provider
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Review `code`, returning the model's feedback or an apology
    pub async fn analyze(&self, code: &str, pill_mode: PillMode, language: &str) -> String {
        info!(
            pill_mode = %pill_mode,
            language = %language,
            code_len = code.len(),
            "Analyzing code snippet"
        );

        let request = ChatRequest::new(build_analysis_messages(code, pill_mode, language))
            .with_temperature(llm_tuning::ANALYSIS_TEMPERATURE)
            .with_max_tokens(llm_tuning::ANALYSIS_MAX_TOKENS);

        match self.llm.complete(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                error!(provider = self.llm.name(), error = %e, "Error analyzing code");
                apology(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socrai_core::models::MessageRole;

    #[test]
    fn test_analysis_request_is_two_messages() {
        let messages = build_analysis_messages("print(1)", PillMode::Red, "python");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with(prompts::template(PillMode::Red)));
        assert!(messages[0]
            .content
            .contains("You are now analyzing code in python."));
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(messages[1].content.contains("```python\nprint(1)\n```"));
    }
}
