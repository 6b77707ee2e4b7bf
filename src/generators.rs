use crate::inputs::AgeGroup;
use crate::llm::LlmClient;
use crate::prompts;
use crate::repair;
use anyhow::Result;
use log::warn;
use serde_json::Value;

pub const FALLBACK_TITLE: &str = "A Story Yet to be Titled";

/// Generates a story title from the premise and audience. A blank reply falls
/// back to a placeholder rather than failing the pipeline.
pub async fn generate_story_title(
    llm: &dyn LlmClient,
    premise: &str,
    age_group: AgeGroup,
) -> Result<String> {
    let reply = llm
        .chat(
            prompts::TITLE_GENERATOR_SYSTEM,
            &prompts::title_generator(premise, age_group),
        )
        .await?;

    let title = clean_title(&reply);
    if title.is_empty() {
        warn!("Title generator returned nothing usable, using fallback");
        Ok(FALLBACK_TITLE.to_string())
    } else {
        Ok(title)
    }
}

/// Models occasionally wrap the title in quotes or a fence despite
/// instructions; take the first non-empty line and strip the quoting.
fn clean_title(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("```"))
        .unwrap_or("")
        .trim_matches(['"', '\'', '*'])
        .trim()
        .to_string()
}

/// Generates exactly `num_characters` names. The model is asked for a JSON
/// array; failing that, a delimiter split is attempted, and as a last resort
/// generic placeholders fill the gap. The LLM transport error is the only
/// failure that propagates.
pub async fn generate_character_names(
    llm: &dyn LlmClient,
    premise: &str,
    age_group: AgeGroup,
    num_characters: u8,
) -> Result<Vec<String>> {
    let reply = llm
        .chat(
            prompts::NAME_GENERATOR_SYSTEM,
            &prompts::name_generator(premise, age_group, num_characters),
        )
        .await?;

    Ok(extract_names(&reply, num_characters as usize))
}

fn extract_names(reply: &str, expected: usize) -> Vec<String> {
    if let Ok(Value::Array(items)) = repair::parse_json_reply(reply) {
        let names: Vec<String> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => {
                    let s = s.trim().to_string();
                    (!s.is_empty()).then_some(s)
                }
                _ => None,
            })
            .collect();
        if names.len() == expected {
            return names;
        }
        if names.len() > expected {
            return names.into_iter().take(expected).collect();
        }
    }

    // Not a usable list; split the raw text on commas after stripping the
    // bracket-and-quote noise.
    warn!("Name generator reply was not a {expected}-element list, splitting raw text");
    let mut names: Vec<String> = reply
        .trim()
        .trim_matches(['[', ']', '`', '\n', ' '])
        .split(',')
        .map(|name| name.trim().trim_matches(['\'', '"']).trim().to_string())
        .filter(|name| !name.is_empty())
        .take(expected)
        .collect();

    // Last resort: pad with generic placeholders so the pipeline always has
    // exactly the requested count.
    while names.len() < expected {
        names.push(format!("Character {}", names.len() + 1));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct CannedLlm(String);

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_extract_names_json_array() {
        let names = extract_names(r#"["Aria Stormrider", "Zane Emberfall"]"#, 2);
        assert_eq!(names, vec!["Aria Stormrider", "Zane Emberfall"]);
    }

    #[test]
    fn test_extract_names_python_style_list() {
        let names = extract_names("['Elara', 'Kaelen']", 2);
        assert_eq!(names, vec!["Elara", "Kaelen"]);
    }

    #[test]
    fn test_extract_names_fenced() {
        let names = extract_names("```json\n[\"Elara\", \"Kaelen\", \"Mira\"]\n```", 3);
        assert_eq!(names, vec!["Elara", "Kaelen", "Mira"]);
    }

    #[test]
    fn test_extract_names_overlong_list_is_truncated() {
        let names = extract_names(r#"["A", "B", "C", "D"]"#, 2);
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_extract_names_loose_text_split() {
        let names = extract_names("Sure! Here you go: Elara, Kaelen", 2);
        assert_eq!(names, vec!["Sure! Here you go: Elara", "Kaelen"]);
    }

    #[test]
    fn test_extract_names_pads_with_placeholders() {
        let names = extract_names("", 3);
        assert_eq!(names, vec!["Character 1", "Character 2", "Character 3"]);
    }

    #[test]
    fn test_clean_title_strips_quotes_and_fences() {
        assert_eq!(clean_title("\"The Last Spellbinder\""), "The Last Spellbinder");
        assert_eq!(clean_title("```\nCity of Heroes\n```"), "City of Heroes");
        assert_eq!(clean_title("  The Gateway in the Garden  "), "The Gateway in the Garden");
        assert_eq!(clean_title("\n\n"), "");
    }

    #[tokio::test]
    async fn test_title_fallback_on_blank_reply() {
        let llm = CannedLlm(String::new());
        let title = generate_story_title(&llm, "A wizard living in a modern city", AgeGroup::Kids)
            .await
            .unwrap();
        assert_eq!(title, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_generate_names_exact_count() {
        let llm = CannedLlm(r#"["Aria", "Zane", "Mira"]"#.to_string());
        let names = generate_character_names(&llm, "premise text here", AgeGroup::Teens, 3)
            .await
            .unwrap();
        assert_eq!(names.len(), 3);
    }
}
