// ABOUTME: Mentoring system prompts for each pill mode, loaded at compile time
// ABOUTME: Also holds the language clause, turn reminder and code-review instructions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # System Prompts
//!
//! One fixed template per pill mode, kept in markdown files next to this
//! module. Lookup by wire value never fails: anything outside the closed
//! enum resolves to the beginner template.

use socrai_core::models::PillMode;

/// Beginner mentor prompt
pub const GREEN_PILL_PROMPT: &str = include_str!("green.md");

/// Intermediate mentor prompt
pub const BLUE_PILL_PROMPT: &str = include_str!("blue.md");

/// Advanced mentor prompt
pub const RED_PILL_PROMPT: &str = include_str!("red.md");

/// System reminder appended after the conversation history on every turn
pub const TURN_REMINDER: &str = "Keep your response concise. Address the user's question directly. Ask at most ONE follow-up question, if necessary.";

/// Template for the given mode
#[must_use]
pub fn template(mode: PillMode) -> &'static str {
    let raw = match mode {
        PillMode::Green => GREEN_PILL_PROMPT,
        PillMode::Blue => BLUE_PILL_PROMPT,
        PillMode::Red => RED_PILL_PROMPT,
    };
    raw.trim_end()
}

/// Template for a raw pill mode value, beginner when unrecognized
#[must_use]
pub fn lookup(mode: &str) -> &'static str {
    template(PillMode::from_str_or_default(mode))
}

/// Clause telling the model which language the learner is using
#[must_use]
pub fn language_clause(language: &str) -> String {
    format!(
        "\n\nThe user is coding in {language}. Provide guidance specific to this language when appropriate."
    )
}

/// Instructions appended to the mode template for one-shot code review
#[must_use]
pub fn code_analysis_instructions(language: &str) -> String {
    format!(
        "\n    \nYou are now analyzing code in {language}. For this code analysis task:\n\
         1. Identify potential bugs, errors, or inefficiencies\n\
         2. Suggest best practices and improvements\n\
         3. Comment on code style and readability\n\
         4. Evaluate the approach taken to solve the problem\n\
         5. Adjust your feedback depth based on the pill mode level\n\
         \n\
         The code to analyze is provided below.\n"
    )
}

/// User message wrapping a snippet in a fenced block
#[must_use]
pub fn code_analysis_request(code: &str, language: &str) -> String {
    format!("Please analyze this {language} code:\n\n```{language}\n{code}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_distinct_template() {
        for mode in PillMode::ALL {
            assert!(!template(mode).is_empty());
            assert!(template(mode).starts_with("You are SocrAI"));
        }
        assert_ne!(template(PillMode::Green), template(PillMode::Blue));
        assert_ne!(template(PillMode::Blue), template(PillMode::Red));
    }

    #[test]
    fn test_lookup_falls_back_to_beginner() {
        assert_eq!(lookup("blue"), template(PillMode::Blue));
        assert_eq!(lookup("red"), template(PillMode::Red));
        for unknown in ["", "purple", "Green", "beginner"] {
            assert_eq!(lookup(unknown), template(PillMode::Green));
        }
    }

    #[test]
    fn test_templates_prohibit_full_solutions() {
        assert!(template(PillMode::Green).contains("NEVER provide complete, ready-to-copy code"));
        assert!(template(PillMode::Blue).contains("NEVER provide direct code solutions"));
        assert!(template(PillMode::Red).contains("NEVER provide code or specific solutions"));
    }

    #[test]
    fn test_code_analysis_instructions_layout() {
        let text = code_analysis_instructions("rust");
        assert!(text.starts_with("\n    \nYou are now analyzing code in rust."));
        assert!(text.contains("\n1. Identify potential bugs, errors, or inefficiencies\n"));
        assert!(text.ends_with("\n\nThe code to analyze is provided below.\n"));
    }

    #[test]
    fn test_code_analysis_request_fences_code() {
        assert_eq!(
            code_analysis_request("fn main() {}", "rust"),
            "Please analyze this rust code:\n\n```rust\nfn main() {}\n```"
        );
    }
}
