use anyhow::Result;
use idea_weaver::config::{self, Config};
use idea_weaver::llm;
use idea_weaver::markdown;
use idea_weaver::pipeline::StoryPipeline;
use idea_weaver::ui;
use log::error;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win either way.
    let _ = dotenvy::dotenv();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Startup check failed: {e:#}");
            eprintln!("Please set LLM_PROVIDER and the matching provider variables.");
            return Err(e);
        }
    };

    config::check_ollama_server(&config).await?;

    let llm = llm::create_llm(&config)?;

    println!("\nWelcome to Idea Weaver!");
    println!("Let's build a story concept together. Just give me a starting point.");

    let inputs = ui::run_conversation(llm.as_ref()).await?;

    println!("Weaving your story concept, this may take a moment...");

    let pipeline = StoryPipeline::new(llm.as_ref());
    let artifact = match pipeline.generate(&inputs).await {
        Ok(artifact) => artifact,
        Err(e) => {
            error!("Story generation failed: {e:#}");
            eprintln!("Story generation failed: {e:#}");
            return Err(e);
        }
    };

    let document = markdown::build_markdown(&artifact);
    let path = markdown::save_markdown(&config.output_folder, &artifact.title, &document)?;

    println!("\nStory concept generated successfully!");
    println!("Saved output to: {}", path.display());

    Ok(())
}
