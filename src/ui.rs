use crate::dispatcher::{Dispatcher, TurnRequest, TurnStatus};
use crate::inputs::CollectedInputs;
use crate::llm::LlmClient;
use anyhow::Result;
use inquire::Text;
use std::fmt::Write as _;

/// Runs the interview loop in the terminal until all story parameters are
/// collected, returning the completed inputs. Invalid input and recoverable
/// errors re-ask the same question; collected state is never lost.
pub async fn run_conversation(llm: &dyn LlmClient) -> Result<CollectedInputs> {
    let dispatcher = Dispatcher::new(llm);

    let mut history = String::new();
    let mut inputs = CollectedInputs::default();

    // Opening turn: empty history and input produce the greeting.
    let opening = dispatcher.handle_turn(&TurnRequest::default()).await;
    println!("\n{}\n", opening.message);
    let _ = writeln!(history, "Agent: {}", opening.message);

    loop {
        let user_input = Text::new(">").prompt()?;
        let _ = writeln!(history, "User: {user_input}");

        let result = dispatcher
            .handle_turn(&TurnRequest {
                conversation_history: history.clone(),
                user_input,
                collected_inputs: inputs.clone(),
            })
            .await;

        println!("\n{}\n", result.message);
        let _ = writeln!(history, "Agent: {}", result.message);
        inputs = result.data;

        match result.status {
            TurnStatus::Complete => return Ok(inputs),
            // Same question again; prior progress is kept either way.
            TurnStatus::Continue | TurnStatus::InvalidInput | TurnStatus::Error => {}
        }
    }
}
