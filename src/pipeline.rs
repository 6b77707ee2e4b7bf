use crate::generators;
use crate::inputs::{AgeGroup, Choice, CollectedInputs};
use crate::llm::LlmClient;
use crate::prompts;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

/// The final generated bundle, created once per completed conversation and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct StoryArtifact {
    pub premise: String,
    pub age_group: AgeGroup,
    pub title: String,
    pub character_names: Vec<String>,
    pub world_description: String,
    pub character_profiles: String,
    pub narrative_twist: String,
    pub story_summary: String,
}

/// Runs the generation steps against a completed set of collected inputs.
/// Title and name finalization are independent and run concurrently; the
/// world -> characters -> twist -> summary chain is strictly sequential, each
/// step consuming all prior outputs. Any step failure aborts the whole run
/// with a single aggregate error and no partial artifact.
pub struct StoryPipeline<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> StoryPipeline<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, inputs: &CollectedInputs) -> Result<StoryArtifact> {
        let premise = inputs.premise.clone().context("premise not collected")?;
        let age_group = inputs.age_group.context("age group not collected")?;
        let title_choice = inputs.title_choice.context("title choice not collected")?;
        let num_characters = inputs
            .num_characters
            .context("character count not collected")?;
        let name_choice = inputs.name_choice.context("name choice not collected")?;

        // Steps 1-2: finalize title and names. Independent of each other, so
        // they join concurrently; both must land before world building.
        let title_fut = async {
            match title_choice {
                Choice::Generate => {
                    info!("Generating story title");
                    generators::generate_story_title(self.llm, &premise, age_group).await
                }
                Choice::ProvideOwn => inputs
                    .title_input
                    .clone()
                    .filter(|t| !t.is_empty())
                    .context("title choice was ProvideOwn but no title was collected"),
            }
        };
        let names_fut = async {
            match &inputs.character_names_input {
                // The dispatcher's Generate branch already filled the names;
                // reuse them instead of re-rolling the generator.
                Some(names) => Ok(names.clone()),
                None if name_choice == Choice::Generate => {
                    info!("Generating character names");
                    generators::generate_character_names(
                        self.llm,
                        &premise,
                        age_group,
                        num_characters,
                    )
                    .await
                }
                None => anyhow::bail!("name choice was ProvideOwn but no names were collected"),
            }
        };
        let (title, character_names) = tokio::try_join!(title_fut, names_fut)?;

        // Step 3: world description, the root of the sequential chain.
        info!("Generating world description");
        let world_description = self
            .llm
            .chat(
                prompts::WORLD_BUILDER_SYSTEM,
                &prompts::world_builder(&premise, age_group, &character_names),
            )
            .await
            .context("World building step failed")?;

        // Step 4: character profiles from the premise, the world, and the names.
        info!("Generating character profiles");
        let character_profiles = self
            .llm
            .chat(
                prompts::CHARACTER_CREATOR_SYSTEM,
                &prompts::character_creator(&world_description, &character_names, age_group),
            )
            .await
            .context("Character creation step failed")?;

        // Step 5: narrative twist from world plus characters.
        info!("Generating narrative twist");
        let setup = format!("{world_description}\n\n{character_profiles}");
        let narrative_twist = self
            .llm
            .chat(
                prompts::NARRATIVE_NUDGER_SYSTEM,
                &prompts::narrative_nudger(&setup, age_group),
            )
            .await
            .context("Narrative twist step failed")?;

        // Step 6: summary over everything generated so far.
        info!("Generating story summary");
        let full_context =
            format!("{world_description}\n\n{character_profiles}\n\n{narrative_twist}");
        let story_summary = self
            .llm
            .chat(
                prompts::SUMMARY_WRITER_SYSTEM,
                &prompts::story_summary(&full_context, age_group),
            )
            .await
            .context("Summary step failed")?;

        Ok(StoryArtifact {
            premise,
            age_group,
            title,
            character_names,
            world_description,
            character_profiles,
            narrative_twist,
            story_summary,
        })
    }
}
