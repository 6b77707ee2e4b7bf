use crate::pipeline::StoryArtifact;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Drops any conversational preamble before the first Markdown heading, and
/// any `## Narrative Twist` heading line so the document template's own
/// heading is not duplicated.
fn clean_section(text: &str) -> String {
    let without_twist_heading: Vec<&str> = text
        .lines()
        .filter(|line| line.trim() != "## Narrative Twist")
        .collect();

    let first_heading = without_twist_heading
        .iter()
        .position(|line| is_heading(line));

    match first_heading {
        Some(i) => without_twist_heading[i..].join("\n"),
        None => without_twist_heading.join("\n"),
    }
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    hashes > 0 && line[hashes..].starts_with(' ')
}

/// Renders the full story concept document.
pub fn build_markdown(artifact: &StoryArtifact) -> String {
    format!(
        "# {title}\n\
         \n\
         > **Premise**: {premise}\n\
         > **Target Audience**: {audience}\n\
         > **Characters**: {characters}\n\
         \n\
         ---\n\
         \n\
         ## Story Summary\n\
         \n\
         {summary}\n\
         \n\
         ---\n\
         \n\
         {world}\n\
         \n\
         ---\n\
         \n\
         ## Characters\n\
         \n\
         {profiles}\n\
         \n\
         ---\n\
         \n\
         ## Narrative Twist\n\
         \n\
         {twist}\n",
        title = artifact.title,
        premise = artifact.premise,
        audience = artifact.age_group.label(),
        characters = artifact.character_names.join(", "),
        summary = artifact.story_summary.trim(),
        world = clean_section(&artifact.world_description),
        profiles = clean_section(&artifact.character_profiles),
        twist = clean_section(&artifact.narrative_twist),
    )
}

/// Keeps alphanumerics, spaces, hyphens and underscores; spaces become
/// underscores. An empty result falls back to "story".
pub fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim().replace(' ', "_");
    if safe.is_empty() {
        "story".to_string()
    } else {
        safe
    }
}

/// Writes the document to `{output_dir}/{sanitized title}.md`, creating the
/// directory on demand.
pub fn save_markdown(output_dir: &str, title: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {output_dir}"))?;

    let path = Path::new(output_dir).join(format!("{}.md", sanitize_title(title)));
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved story concept to {}", path.display());
    Ok(path)
}
