//! Tutor prompt templating.
//!
//! A [`PromptBuilder`] owns the fixed instructional text (persona, tasks,
//! constraints and the learning-suggestion rule) and substitutes the child's
//! question into its single `{question}` slot.

use crate::utils::toml_config::ConfigError;

/// Placeholder replaced by the question text.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Built-in kid-friendly tutor template.
pub const TUTOR_TEMPLATE: &str = r#"
You are a fun and friendly tutor for kids from Grade 1 to 5.
Explain the following question in a simple, playful, cartoon-like way with examples:

Purpose:
- Help kids learn by answering questions in a simple, child-friendly way.
- Explain school subjects and general topics they are curious about.
- Encourage further exploration by suggesting related topics and activities.
- Provide a positive, safe, and respectful environment for asking questions.

Tasks:
1. Answer any question a child asks in a clear, fun, and engaging way.
2. Use short sentences, simple words, and relatable examples (e.g., toys, animals, games).
3. Break big topics into small, easy-to-understand parts.
4. Include fun facts, emojis, and playful elements where appropriate.
5. Offer follow-up suggestions: suggest a new topic, ask a simple question back, or share an interesting activity to try.

Constraints:
- Do not use complex or academic vocabulary unless explained clearly.
- Avoid scary, violent, or age-inappropriate content.
- Never pretend to be a human; always maintain that you're a helpful assistant.
- Do not give medical, legal, or harmful advice.
- Avoid sarcasm, negativity, or speaking down to the child.
- Keep responses positive, respectful, and age-appropriate at all times.

Learning Suggestion Rule:
After each answer:
- Offer one or two related topics that the child might enjoy learning next.
- Suggest a simple follow-up activity (like drawing, storytelling, asking a parent, or trying a simple experiment).

Question: {question}

Answer:
"#;

/// Renders the final prompt for a question.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: TUTOR_TEMPLATE.to_string(),
        }
    }
}

impl PromptBuilder {
    /// Create a builder from a custom template.
    ///
    /// # Errors
    ///
    /// The template must contain [`QUESTION_PLACEHOLDER`] exactly once.
    pub fn with_template(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        validate_template(&template)?;
        Ok(Self { template })
    }

    /// Substitute `question` into the template.
    pub fn build(&self, question: &str) -> String {
        // Split instead of `replace` so braces inside the question are never re-expanded.
        match self.template.split_once(QUESTION_PLACEHOLDER) {
            Some((before, after)) => {
                let mut prompt =
                    String::with_capacity(before.len() + question.len() + after.len());
                prompt.push_str(before);
                prompt.push_str(question);
                prompt.push_str(after);
                prompt
            }
            None => format!("{}{}", self.template, question),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Check that a template has exactly one question slot.
pub fn validate_template(template: &str) -> Result<(), ConfigError> {
    match template.matches(QUESTION_PLACEHOLDER).count() {
        1 => Ok(()),
        0 => Err(ConfigError::ValidationError(format!(
            "prompt template must contain the {} placeholder",
            QUESTION_PLACEHOLDER
        ))),
        n => Err(ConfigError::ValidationError(format!(
            "prompt template contains {} placeholder {} times, expected once",
            QUESTION_PLACEHOLDER, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Why is the sky blue?")]
    #[case("How many legs does a spider have?")]
    #[case("What is {question}?")]
    #[case("🦕 Are dinosaurs birds?")]
    fn test_build_contains_question_and_sections(#[case] question: &str) {
        let prompt = PromptBuilder::default().build(question);

        assert!(prompt.contains(&format!("Question: {}\n", question)));
        for section in [
            "Purpose:",
            "Tasks:",
            "Constraints:",
            "Learning Suggestion Rule:",
        ] {
            assert!(prompt.contains(section), "missing section {}", section);
        }
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::default();
        assert_eq!(builder.build("Tell me more"), builder.build("Tell me more"));
    }

    #[test]
    fn test_build_leaves_no_placeholder() {
        let prompt = PromptBuilder::default().build("Why do cats purr?");
        assert!(!prompt.contains(QUESTION_PLACEHOLDER));
    }

    #[test]
    fn test_custom_template() {
        let builder = PromptBuilder::with_template("Q: {question}\nA:").unwrap();
        assert_eq!(builder.build("2+2?"), "Q: 2+2?\nA:");
    }

    #[rstest]
    #[case("no slot here")]
    #[case("{question} and {question}")]
    fn test_invalid_templates_rejected(#[case] template: &str) {
        assert!(matches!(
            PromptBuilder::with_template(template),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_builtin_template_is_valid() {
        assert!(validate_template(TUTOR_TEMPLATE).is_ok());
    }
}
