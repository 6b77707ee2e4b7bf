//! Prompt templates for the generation steps. Each step gets a short system
//! instruction describing the persona and a formatted task prompt.

use crate::inputs::AgeGroup;

pub const WORLD_BUILDER_SYSTEM: &str = "You are an imaginative world builder for fiction. \
    You expand story premises into vivid, coherent settings.";

pub const CHARACTER_CREATOR_SYSTEM: &str = "You are a character designer for fiction. \
    You craft compelling, distinct characters that fit an established world.";

pub const NARRATIVE_NUDGER_SYSTEM: &str = "You are a story consultant who specializes in \
    surprising but logically consistent plot twists.";

pub const SUMMARY_WRITER_SYSTEM: &str = "You are a skilled copywriter who distills story \
    concepts into short, engaging summaries.";

pub const TITLE_GENERATOR_SYSTEM: &str = "You are a master of crafting catchy, imaginative \
    titles for creative works, tuned to the intended audience.";

pub const NAME_GENERATOR_SYSTEM: &str = "You are an expert at crafting memorable and evocative \
    names for fictional characters that fit the genre and tone of a story.";

pub fn world_builder(premise: &str, age_group: AgeGroup, names: &[String]) -> String {
    format!(
        "Expand the following story premise into a vivid and imaginative fictional world.\n\n\
         **Premise**: \"{premise}\"\n\
         **Target Audience**: {audience}\n\
         **Character Names to Incorporate (STRICTLY USE THESE NAMES, DO NOT GENERATE NEW ONES)**: {names}\n\n\
         Describe the setting, the culture, and the central conflict of this world.\n\n\
         **Output Format**: Start with a Markdown heading for the world's name, then the description.",
        audience = age_group.label(),
        names = names.join(", ")
    )
}

pub fn character_creator(
    world_details: &str,
    names: &[String],
    age_group: AgeGroup,
) -> String {
    format!(
        "Create compelling characters for the following story world.\n\n\
         **Story World Details**:\n---\n{world_details}\n---\n\n\
         **Character Names to Use (STRICTLY USE THESE NAMES, DO NOT GENERATE NEW ONES)**: {names}\n\
         **Target Audience**: {audience}\n\n\
         For each character, describe their role in the story, their personality, their \
         motivations, and their potential story arc.\n\n\
         **Output Format**: Your output MUST use the following Markdown structure for EACH \
         character. Do not include any other text or conversational filler.\n\n\
         ## [Character Name]\n\n\
         - **Role in Story**: [Their role, e.g., The Chosen One, The Mentor]\n\
         - **Personality Traits**: [e.g., Brave, curious, cynical]\n\
         - **Motivation/Goal**: [e.g., To find a lost artifact, to avenge their family]\n\
         - **Character Arc**: [e.g., Learns to trust others, overcomes a deep-seated fear]\n\n\
         **Description**:\n\
         [A descriptive paragraph that weaves the above details together into a compelling \
         character sketch.]\n\n\
         (Repeat the above structure for each additional character.)",
        names = names.join(", "),
        audience = age_group.label()
    )
}

pub fn narrative_nudger(world_and_characters: &str, age_group: AgeGroup) -> String {
    format!(
        "Introduce an unexpected narrative twist to the following story.\n\n\
         **Current Story Setup**:\n---\n{world_and_characters}\n---\n\n\
         **Target Audience**: {audience}\n\n\
         The twist should be surprising but logically consistent with the established world \
         and characters.\n\n\
         **Output Format**: Your output MUST use the following Markdown heading:\n\n\
         ## Narrative Twist\n\n\
         [Describe the twist here]",
        audience = age_group.label()
    )
}

pub fn story_summary(full_context: &str, age_group: AgeGroup) -> String {
    format!(
        "Write a short, engaging summary for the following story concept.\n\n\
         **Full Story Context**:\n---\n{full_context}\n---\n\n\
         **Target Audience**: {audience}\n\n\
         The summary should be a single paragraph under 100 words, with no headings and no \
         conversational filler.",
        audience = age_group.label()
    )
}

pub fn title_generator(premise: &str, age_group: AgeGroup) -> String {
    format!(
        "Based on the story premise and target audience below, generate a short and engaging \
         story title.\n\n\
         Premise: \"{premise}\"\n\
         Target Audience: {audience}\n\n\
         Requirements:\n\
         - Title should be no more than 8 words.\n\
         - Make it catchy, imaginative, and relevant to the premise.\n\
         - Avoid generic phrases or clich\u{e9}s.\n\
         - Ensure the tone is appropriate for the target audience.\n\
         - Respond with the title only, no quotes and no extra text.",
        audience = age_group.label()
    )
}

pub fn name_generator(premise: &str, age_group: AgeGroup, num_characters: u8) -> String {
    format!(
        "Generate {num_characters} distinct and fitting character names based on a story \
         premise and target audience.\n\n\
         **Story Premise**: \"{premise}\"\n\
         **Target Audience**: {audience}\n\n\
         **Instructions**:\n\
         1. Generate exactly {num_characters} names.\n\
         2. The names should be creative, memorable, and suitable for the premise.\n\
         3. The names must be unique and not variations of each other.\n\n\
         **Output Format**: Your output MUST be a single, valid JSON array of \
         {num_characters} strings, with no other text, explanation, or markdown.\n\n\
         **Example Output**:\n\
         [\"Aria Stormrider\", \"Zane Emberfall\"]",
        audience = age_group.label()
    )
}
