use crate::generators;
use crate::inputs::{
    validate_age_group, validate_character_names, validate_choice, validate_num_characters,
    validate_premise, validate_title, Choice, CollectedInputs, Field,
};
use crate::llm::LlmClient;
use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Continue,
    InvalidInput,
    Complete,
    Error,
}

/// One request/response cycle between the caller and the dispatcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub conversation_history: String,
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub collected_inputs: CollectedInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub status: TurnStatus,
    pub message: String,
    #[serde(default)]
    pub data: CollectedInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_field: Option<Field>,
}

impl TurnResult {
    pub fn error(message: impl Into<String>, data: CollectedInputs) -> Self {
        Self {
            status: TurnStatus::Error,
            message: message.into(),
            data,
            next_field: None,
        }
    }
}

const INITIAL_GREETING: &str = "Hello! I'm Idea Weaver. Let's brainstorm a story concept together. \
    What's your basic premise?\n\
    - A wizard living in a modern city\n\
    - A group of kids who discover a secret portal in their backyard\n\
    - A detective investigating a crime in a city where everyone has a superpower";

const ASK_AGE_GROUP: &str = "Great! Now, who is the target audience for this story? Please choose one:\n\
    - Kids (ages 5\u{2013}12)\n\
    - Teens (ages 13\u{2013}18)\n\
    - Adults (ages 19\u{2013}59)\n\
    - Seniors (60+)";

const ASK_TITLE_CHOICE: &str = "Got it. Would you like to provide your own title, or should I \
    generate one for you based on the premise:\n- Generate for me\n- Provide my own";

const ASK_TITLE_INPUT: &str = "Please provide the title for your story.";

const ASK_NUM_CHARACTERS: &str = "Perfect. How many main characters will be in your story? \
    Please enter a number between 1 and 5.";

const ASK_NAME_CHOICE: &str = "Great! Would you like me to generate names for your characters, \
    or will you provide them?\n- Generate for me\n- Provide my own";

const COMPLETE_MESSAGE: &str =
    "Excellent! I have all the information I need. I will now start weaving your story concept.";

const INVALID_PREMISE: &str = "That doesn't seem like a valid premise. Please provide a more \
    detailed story premise (e.g., 'A wizard living in a modern city').";

const INVALID_AGE_GROUP: &str =
    "That's not a valid age group. Please choose from 'Kids', 'Teens', 'Adults', or 'Seniors'.";

const INVALID_CHOICE: &str =
    "That's not a valid choice. Please choose 'Generate for me' or 'Provide my own'.";

const INVALID_TITLE_INPUT: &str = "Please provide a title for your story.";

const INVALID_NUM_CHARACTERS: &str =
    "That's not a valid number. Please enter a number between 1 and 5.";

const TURN_FAILED_MESSAGE: &str = "An internal error occurred while processing your request. \
    Please try again or restart the conversation.";

/// Drives the input-collection conversation. The current state is always the
/// earliest missing field of the collected inputs; each turn validates the
/// latest utterance against that field and either advances or re-asks it.
pub struct Dispatcher<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> Dispatcher<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Processes one turn. Never fails: internal errors are converted into an
    /// `Error` turn so the conversation loop survives and the user can retry.
    pub async fn handle_turn(&self, request: &TurnRequest) -> TurnResult {
        match self.dispatch(request).await {
            Ok(result) => result,
            Err(e) => {
                error!("Turn dispatch failed: {e:#}");
                TurnResult::error(TURN_FAILED_MESSAGE, request.collected_inputs.clone())
            }
        }
    }

    async fn dispatch(&self, request: &TurnRequest) -> Result<TurnResult> {
        // A fresh conversation gets the static greeting; no model call needed.
        if request.conversation_history.is_empty() && request.user_input.trim().is_empty() {
            return Ok(TurnResult {
                status: TurnStatus::Continue,
                message: INITIAL_GREETING.to_string(),
                data: request.collected_inputs.clone(),
                next_field: Some(Field::Premise),
            });
        }

        let mut inputs = request.collected_inputs.clone();
        let utterance = request.user_input.as_str();

        let Some(field) = inputs.next_missing() else {
            // Everything already collected; just confirm completion.
            return Ok(TurnResult {
                status: TurnStatus::Complete,
                message: COMPLETE_MESSAGE.to_string(),
                data: inputs,
                next_field: None,
            });
        };

        let result = match field {
            Field::Premise => match validate_premise(utterance) {
                Some(premise) => {
                    inputs.premise = Some(premise);
                    continue_with(inputs, ASK_AGE_GROUP, Field::AgeGroup)
                }
                None => reask(inputs, INVALID_PREMISE, field),
            },

            Field::AgeGroup => match validate_age_group(utterance) {
                Some(age_group) => {
                    inputs.age_group = Some(age_group);
                    continue_with(inputs, ASK_TITLE_CHOICE, Field::TitleChoice)
                }
                None => reask(inputs, INVALID_AGE_GROUP, field),
            },

            Field::TitleChoice => match validate_choice(utterance) {
                Some(Choice::ProvideOwn) => {
                    inputs.title_choice = Some(Choice::ProvideOwn);
                    continue_with(inputs, ASK_TITLE_INPUT, Field::TitleInput)
                }
                Some(Choice::Generate) => {
                    inputs.title_choice = Some(Choice::Generate);
                    // Generated later by the pipeline; the explicit input state
                    // is skipped with an empty placeholder.
                    inputs.title_input = Some(String::new());
                    continue_with(inputs, ASK_NUM_CHARACTERS, Field::NumCharacters)
                }
                None => reask(inputs, INVALID_CHOICE, field),
            },

            Field::TitleInput => match validate_title(utterance) {
                Some(title) => {
                    inputs.title_input = Some(title);
                    continue_with(inputs, ASK_NUM_CHARACTERS, Field::NumCharacters)
                }
                None => reask(inputs, INVALID_TITLE_INPUT, field),
            },

            Field::NumCharacters => match validate_num_characters(utterance) {
                Some(n) => {
                    inputs.num_characters = Some(n);
                    continue_with(inputs, ASK_NAME_CHOICE, Field::NameChoice)
                }
                None => reask(inputs, INVALID_NUM_CHARACTERS, field),
            },

            Field::NameChoice => match validate_choice(utterance) {
                Some(Choice::ProvideOwn) => {
                    inputs.name_choice = Some(Choice::ProvideOwn);
                    let n = inputs.num_characters.unwrap_or(0);
                    continue_with(
                        inputs,
                        format!("Please provide {n} character names, separated by commas."),
                        Field::CharacterNamesInput,
                    )
                }
                Some(Choice::Generate) => {
                    inputs.name_choice = Some(Choice::Generate);
                    self.generate_names_and_complete(inputs).await?
                }
                None => reask(inputs, INVALID_CHOICE, field),
            },

            Field::CharacterNamesInput => {
                let expected = inputs.num_characters.unwrap_or(0) as usize;
                match validate_character_names(utterance, expected) {
                    Some(names) => {
                        inputs.character_names_input = Some(names);
                        info!("Input collection complete");
                        TurnResult {
                            status: TurnStatus::Complete,
                            message: COMPLETE_MESSAGE.to_string(),
                            data: inputs,
                            next_field: None,
                        }
                    }
                    None => reask(
                        inputs,
                        format!("Please provide exactly {expected} names, separated by commas."),
                        field,
                    ),
                }
            }
        };

        Ok(result)
    }

    /// The Generate branch for names: invoke the name generator right away and
    /// jump straight to completion. Re-entering this transition re-invokes the
    /// generator and may yield different names; that is accepted behavior.
    async fn generate_names_and_complete(
        &self,
        mut inputs: CollectedInputs,
    ) -> Result<TurnResult> {
        let premise = inputs.premise.clone().context("premise missing")?;
        let age_group = inputs.age_group.context("age group missing")?;
        let n = inputs.num_characters.context("character count missing")?;

        let names = generators::generate_character_names(self.llm, &premise, age_group, n).await?;
        info!("Generated character names: {}", names.join(", "));

        let message = format!(
            "Excellent! I have all the information I need. I've generated names: {}. \
             I will now start weaving your story concept.",
            names.join(", ")
        );
        inputs.character_names_input = Some(names);

        Ok(TurnResult {
            status: TurnStatus::Complete,
            message,
            data: inputs,
            next_field: None,
        })
    }
}

fn continue_with(
    data: CollectedInputs,
    message: impl Into<String>,
    next: Field,
) -> TurnResult {
    TurnResult {
        status: TurnStatus::Continue,
        message: message.into(),
        data,
        next_field: Some(next),
    }
}

fn reask(data: CollectedInputs, message: impl Into<String>, field: Field) -> TurnResult {
    TurnResult {
        status: TurnStatus::InvalidInput,
        message: message.into(),
        data,
        next_field: Some(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::AgeGroup;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct MockLlmClient {
        call_count: Arc<Mutex<usize>>,
        reply: String,
    }

    impl MockLlmClient {
        fn new(reply: &str) -> Self {
            Self {
                call_count: Arc::new(Mutex::new(0)),
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            *self.call_count.lock().unwrap() += 1;
            if self.reply == "FAIL" {
                anyhow::bail!("mock transport failure")
            }
            Ok(self.reply.clone())
        }
    }

    async fn turn(
        dispatcher: &Dispatcher<'_>,
        history: &str,
        input: &str,
        inputs: CollectedInputs,
    ) -> TurnResult {
        dispatcher
            .handle_turn(&TurnRequest {
                conversation_history: history.to_string(),
                user_input: input.to_string(),
                collected_inputs: inputs,
            })
            .await
    }

    #[tokio::test]
    async fn test_initial_turn_asks_for_premise_without_model_call() {
        let llm = MockLlmClient::new("should not be called");
        let dispatcher = Dispatcher::new(&llm);

        let result = turn(&dispatcher, "", "", CollectedInputs::default()).await;

        assert_eq!(result.status, TurnStatus::Continue);
        assert_eq!(result.next_field, Some(Field::Premise));
        assert!(result.message.contains("What's your basic premise?"));
        assert_eq!(*llm.call_count.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_keeps_state_and_field() {
        let llm = MockLlmClient::new("unused");
        let dispatcher = Dispatcher::new(&llm);

        let before = CollectedInputs {
            premise: Some("A wizard living in a modern city".to_string()),
            ..Default::default()
        };
        let result = turn(&dispatcher, "Agent: ...", "Toddlers", before.clone()).await;

        assert_eq!(result.status, TurnStatus::InvalidInput);
        assert_eq!(result.next_field, Some(Field::AgeGroup));
        assert_eq!(result.data, before, "invalid input must not mutate state");
    }

    #[tokio::test]
    async fn test_full_conversation_with_provided_names() {
        let llm = MockLlmClient::new("unused");
        let dispatcher = Dispatcher::new(&llm);

        let mut inputs = CollectedInputs::default();
        let steps = [
            ("A detective in a city where everyone has a superpower", TurnStatus::Continue),
            ("Teens", TurnStatus::Continue),
            ("Generate for me", TurnStatus::Continue),
            ("2", TurnStatus::Continue),
            ("Provide my own", TurnStatus::Continue),
            ("Ann, Bob", TurnStatus::Complete),
        ];

        for (input, expected) in steps {
            let result = turn(&dispatcher, "Agent: ...", input, inputs.clone()).await;
            assert_eq!(result.status, expected, "unexpected status for input {input:?}");
            inputs = result.data;
        }

        assert!(inputs.is_complete());
        assert_eq!(inputs.age_group, Some(AgeGroup::Teens));
        assert_eq!(inputs.title_choice, Some(Choice::Generate));
        assert_eq!(inputs.title_input.as_deref(), Some(""));
        assert_eq!(inputs.num_characters, Some(2));
        assert_eq!(inputs.name_choice, Some(Choice::ProvideOwn));
        assert_eq!(
            inputs.character_names_input,
            Some(vec!["Ann".to_string(), "Bob".to_string()])
        );
        assert_eq!(*llm.call_count.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_names_branch_completes_immediately() {
        let llm = MockLlmClient::new(r#"["Aria Stormrider", "Zane Emberfall"]"#);
        let dispatcher = Dispatcher::new(&llm);

        let inputs = CollectedInputs {
            premise: Some("A wizard living in a modern city".to_string()),
            age_group: Some(AgeGroup::Adults),
            title_choice: Some(Choice::ProvideOwn),
            title_input: Some("The Last Spellbinder".to_string()),
            num_characters: Some(2),
            ..Default::default()
        };

        let result = turn(&dispatcher, "Agent: ...", "Generate for me", inputs).await;

        assert_eq!(result.status, TurnStatus::Complete);
        assert_eq!(
            result.data.character_names_input,
            Some(vec!["Aria Stormrider".to_string(), "Zane Emberfall".to_string()])
        );
        assert!(result.message.contains("Aria Stormrider, Zane Emberfall"));
        assert_eq!(*llm.call_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_becomes_error_turn() {
        let llm = MockLlmClient::new("FAIL");
        let dispatcher = Dispatcher::new(&llm);

        let before = CollectedInputs {
            premise: Some("A wizard living in a modern city".to_string()),
            age_group: Some(AgeGroup::Kids),
            title_choice: Some(Choice::Generate),
            title_input: Some(String::new()),
            num_characters: Some(3),
            ..Default::default()
        };

        let result = turn(&dispatcher, "Agent: ...", "Generate for me", before.clone()).await;

        assert_eq!(result.status, TurnStatus::Error);
        // The caller keeps its prior state and may retry the same turn.
        assert_eq!(result.data, before);
    }

    #[tokio::test]
    async fn test_complete_state_reconfirms() {
        let llm = MockLlmClient::new("unused");
        let dispatcher = Dispatcher::new(&llm);

        let inputs = CollectedInputs {
            premise: Some("A wizard living in a modern city".to_string()),
            age_group: Some(AgeGroup::Kids),
            title_choice: Some(Choice::Generate),
            title_input: Some(String::new()),
            num_characters: Some(1),
            name_choice: Some(Choice::ProvideOwn),
            character_names_input: Some(vec!["Ann".to_string()]),
        };

        let result = turn(&dispatcher, "Agent: ...", "anything", inputs.clone()).await;
        assert_eq!(result.status, TurnStatus::Complete);
        assert_eq!(result.data, inputs);
    }
}
