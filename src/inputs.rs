use serde::{Deserialize, Serialize};

pub const MIN_CHARACTERS: u8 = 1;
pub const MAX_CHARACTERS: u8 = 5;

/// Minimum trimmed premise length before we consider it usable.
const MIN_PREMISE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Kids,
    Teens,
    Adults,
    Seniors,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Kids,
        AgeGroup::Teens,
        AgeGroup::Adults,
        AgeGroup::Seniors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Kids => "Kids",
            AgeGroup::Teens => "Teens",
            AgeGroup::Adults => "Adults",
            AgeGroup::Seniors => "Seniors",
        }
    }
}

/// Generate-or-provide choice, used for both the title and the character names.
/// The wire labels are the exact phrases the conversation offers the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    #[serde(rename = "Generate for me")]
    Generate,
    #[serde(rename = "Provide my own")]
    ProvideOwn,
}

impl Choice {
    pub fn label(self) -> &'static str {
        match self {
            Choice::Generate => "Generate for me",
            Choice::ProvideOwn => "Provide my own",
        }
    }
}

/// The seven collectable fields, in the fixed order the conversation asks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Premise,
    AgeGroup,
    TitleChoice,
    TitleInput,
    NumCharacters,
    NameChoice,
    CharacterNamesInput,
}

/// Story parameters gathered from the user, forward-filled turn by turn and
/// never rolled back. A later field is only ever set once every earlier
/// required field is present and valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_characters: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_names_input: Option<Vec<String>>,
}

impl CollectedInputs {
    /// The earliest missing required field, which is the conversation's current
    /// state. `None` means collection is complete. Derived statelessly from the
    /// field contents; there is no side-channel "last question asked".
    pub fn next_missing(&self) -> Option<Field> {
        if self.premise.is_none() {
            return Some(Field::Premise);
        }
        if self.age_group.is_none() {
            return Some(Field::AgeGroup);
        }
        let title_choice = match self.title_choice {
            Some(c) => c,
            None => return Some(Field::TitleChoice),
        };
        if title_choice == Choice::ProvideOwn && self.title_input.is_none() {
            return Some(Field::TitleInput);
        }
        if self.num_characters.is_none() {
            return Some(Field::NumCharacters);
        }
        let name_choice = match self.name_choice {
            Some(c) => c,
            None => return Some(Field::NameChoice),
        };
        // On the Generate branch the dispatcher fills the names itself before
        // reporting completion, so this state is only reachable for ProvideOwn.
        if name_choice == Choice::ProvideOwn && self.character_names_input.is_none() {
            return Some(Field::CharacterNamesInput);
        }
        None
    }

    pub fn is_complete(&self) -> bool {
        self.next_missing().is_none() && self.character_names_input.is_some()
    }
}

// --- Validators ---
//
// Pure predicates over one raw text value. Pass returns the normalized value,
// fail returns None; the caller re-asks the same field.

pub fn validate_premise(raw: &str) -> Option<String> {
    let premise = raw.trim();
    if premise.chars().count() > MIN_PREMISE_LEN {
        Some(premise.to_string())
    } else {
        None
    }
}

pub fn validate_age_group(raw: &str) -> Option<AgeGroup> {
    // Case-sensitive match against the canonical labels.
    AgeGroup::ALL.into_iter().find(|g| g.label() == raw.trim())
}

pub fn validate_choice(raw: &str) -> Option<Choice> {
    match raw.trim() {
        "Generate for me" => Some(Choice::Generate),
        "Provide my own" => Some(Choice::ProvideOwn),
        _ => None,
    }
}

pub fn validate_title(raw: &str) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

pub fn validate_num_characters(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|n| (MIN_CHARACTERS..=MAX_CHARACTERS).contains(n))
}

/// Splits a comma- or semicolon-separated list of names, trimming each piece
/// and dropping empties. Valid only when the count matches `expected`.
pub fn validate_character_names(raw: &str, expected: usize) -> Option<Vec<String>> {
    let names: Vec<String> = raw
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.len() == expected {
        Some(names)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premise_length_bound() {
        assert!(validate_premise("too short").is_none());
        assert!(validate_premise("   ").is_none());
        let ok = validate_premise("  A wizard living in a modern city  ").unwrap();
        assert_eq!(ok, "A wizard living in a modern city");
    }

    #[test]
    fn test_age_group_enum_is_case_sensitive() {
        assert_eq!(validate_age_group("Teens"), Some(AgeGroup::Teens));
        assert_eq!(validate_age_group("teens"), None);
        assert_eq!(validate_age_group("TEENS"), None);
        assert_eq!(validate_age_group("Toddlers"), None);
        assert_eq!(validate_age_group(""), None);
    }

    #[test]
    fn test_choice_exact_phrases_only() {
        assert_eq!(validate_choice("Generate for me"), Some(Choice::Generate));
        assert_eq!(validate_choice(" Provide my own "), Some(Choice::ProvideOwn));
        assert_eq!(validate_choice("generate"), None);
        assert_eq!(validate_choice("Provide my own title"), None);
    }

    #[test]
    fn test_num_characters_bounds() {
        for n in 1..=5u8 {
            assert_eq!(validate_num_characters(&n.to_string()), Some(n));
        }
        assert_eq!(validate_num_characters("0"), None);
        assert_eq!(validate_num_characters("6"), None);
        assert_eq!(validate_num_characters("-1"), None);
        assert_eq!(validate_num_characters("two"), None);
        assert_eq!(validate_num_characters(" 3 "), Some(3));
    }

    #[test]
    fn test_character_names_splitting() {
        assert_eq!(
            validate_character_names("Ann, Bob ,Cleo", 3),
            Some(vec!["Ann".to_string(), "Bob".to_string(), "Cleo".to_string()])
        );
        assert_eq!(
            validate_character_names("Ann; Bob;Cleo", 3),
            Some(vec!["Ann".to_string(), "Bob".to_string(), "Cleo".to_string()])
        );
        // Count mismatch rejects.
        assert_eq!(validate_character_names("Ann, Bob", 3), None);
        assert_eq!(validate_character_names("Ann,,Bob,", 3), None);
    }

    #[test]
    fn test_validators_are_idempotent() {
        let premise = validate_premise("A detective in a city of heroes").unwrap();
        assert_eq!(validate_premise(&premise), Some(premise.clone()));

        let names = validate_character_names("Ann, Bob ,Cleo", 3).unwrap();
        assert_eq!(validate_character_names(&names.join(", "), 3), Some(names));

        assert_eq!(validate_num_characters("3"), Some(3));
        assert_eq!(validate_num_characters(&3.to_string()), Some(3));
    }

    #[test]
    fn test_next_missing_order() {
        let mut inputs = CollectedInputs::default();
        assert_eq!(inputs.next_missing(), Some(Field::Premise));

        inputs.premise = Some("A wizard living in a modern city".to_string());
        assert_eq!(inputs.next_missing(), Some(Field::AgeGroup));

        inputs.age_group = Some(AgeGroup::Teens);
        assert_eq!(inputs.next_missing(), Some(Field::TitleChoice));

        // Generate skips the explicit title input state.
        inputs.title_choice = Some(Choice::Generate);
        inputs.title_input = Some(String::new());
        assert_eq!(inputs.next_missing(), Some(Field::NumCharacters));

        inputs.num_characters = Some(2);
        assert_eq!(inputs.next_missing(), Some(Field::NameChoice));

        inputs.name_choice = Some(Choice::ProvideOwn);
        assert_eq!(inputs.next_missing(), Some(Field::CharacterNamesInput));

        inputs.character_names_input = Some(vec!["Ann".into(), "Bob".into()]);
        assert_eq!(inputs.next_missing(), None);
        assert!(inputs.is_complete());
    }

    #[test]
    fn test_title_input_requested_only_when_providing_own() {
        let mut inputs = CollectedInputs {
            premise: Some("A wizard living in a modern city".to_string()),
            age_group: Some(AgeGroup::Kids),
            title_choice: Some(Choice::ProvideOwn),
            ..Default::default()
        };
        assert_eq!(inputs.next_missing(), Some(Field::TitleInput));

        inputs.title_input = Some("The Last Spellbinder".to_string());
        assert_eq!(inputs.next_missing(), Some(Field::NumCharacters));
    }

    #[test]
    fn test_choice_wire_labels() {
        let json = serde_json::to_string(&Choice::Generate).unwrap();
        assert_eq!(json, "\"Generate for me\"");
        let parsed: Choice = serde_json::from_str("\"Provide my own\"").unwrap();
        assert_eq!(parsed, Choice::ProvideOwn);
    }
}
