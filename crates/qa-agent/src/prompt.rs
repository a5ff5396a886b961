//! System prompt composition (spec §4.4).
//!
//! A single exported function substituting into a fixed template. No other
//! runtime data enters the prompt; callers may inject an alternative
//! template for testing.

use chrono::{Datelike, NaiveDate};

use crate::tools::ToolDescriptor;

const DEFAULT_TEMPLATE: &str = "\
You are {persona}.

{description}

Today's date is {date} ({year}). Respond in {language}.

You have access to the following tools:
{tool_list}

Rules you must follow:
- Always call the `think` tool before taking any substantive action, to record your reasoning.
- Classify the query first: static/well-established knowledge, time-sensitive, a reference to internal documents, or exploratory. Prefer not to search when the answer is already well-established.
- Investigate before asserting. Never fabricate facts or sources.
- Respond only in {language}.
";

/// Build the system prompt text. `now` is injected rather than read from the
/// clock so prompt composition stays pure and testable.
pub fn build_system_prompt(
    tools: &[ToolDescriptor],
    language: &str,
    persona: &str,
    description: &str,
    now: NaiveDate,
) -> String {
    build_system_prompt_from_template(DEFAULT_TEMPLATE, tools, language, persona, description, now)
}

/// Same as [`build_system_prompt`] but with an explicit template, for tests
/// that want to exercise substitution without depending on the production
/// wording.
pub fn build_system_prompt_from_template(
    template: &str,
    tools: &[ToolDescriptor],
    language: &str,
    persona: &str,
    description: &str,
    now: NaiveDate,
) -> String {
    let tool_list = tools
        .iter()
        .map(|t| format!("- {}: {}", t.name, first_line(&t.description)))
        .collect::<Vec<_>>()
        .join("\n");

    template
        .replace("{persona}", persona)
        .replace("{description}", description)
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{year}", &now.year().to_string())
        .replace("{language}", language)
        .replace("{tool_list}", &tool_list)
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "think".into(),
                description: "Record a reasoning step.\nDoes not search anything.".into(),
                argument_schema: serde_json::json!({}),
            },
            ToolDescriptor {
                name: "web_search".into(),
                description: "Search the public web.".into(),
                argument_schema: serde_json::json!({}),
            },
        ]
    }

    #[test]
    fn substitutes_all_placeholders() {
        let now = NaiveDate::from_ymd_opt(2026, 7, 31).unwrap();
        let prompt = build_system_prompt(&descriptors(), "French", "a terse assistant", "Answers questions.", now);
        assert!(prompt.contains("a terse assistant"));
        assert!(prompt.contains("Answers questions."));
        assert!(prompt.contains("2026-07-31"));
        assert!(prompt.contains("2026"));
        assert!(prompt.contains("French"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn tool_list_uses_only_the_first_description_line() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let prompt = build_system_prompt(&descriptors(), "English", "p", "d", now);
        assert!(prompt.contains("- think: Record a reasoning step."));
        assert!(!prompt.contains("Does not search anything."));
    }

    #[test]
    fn always_instructs_think_before_action() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let prompt = build_system_prompt(&[], "English", "p", "d", now);
        assert!(prompt.to_lowercase().contains("always call the `think` tool"));
    }
}
