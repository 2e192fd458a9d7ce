//! Instructions for the primary CLI tool and prompts for the local model.
//!
//! Every piece of prompt text lives here so wording changes touch one file
//! and tests can inspect prompts without spawning a process or a model.
//!
//! The document text itself is never embedded in the primary tool's
//! instruction: it travels on the child's standard input.

/// Instruction passed to the primary tool for summaries.
pub const PRIMARY_SUMMARY_INSTRUCTION: &str = "Summarize the following text:";

/// Instruction passed to the primary tool for flashcards.
///
/// The `Q: ` / `A: ` markers are what [`crate::pipeline::parse::parse_primary_flashcards`]
/// splits on; keep them in sync.
pub const PRIMARY_FLASHCARD_INSTRUCTION: &str = "Generate flashcards (question and answer pairs) \
from the text provided on standard input. Format each flashcard as 'Q: [Question]\nA: [Answer]'.";

/// System prompt for local chunk summaries.
///
/// `{min}` and `{max}` are replaced with the configured token bounds.
const LOCAL_SUMMARY_SYSTEM: &str = "You are a summarization model. Summarize the user's text \
in plain prose between {min} and {max} tokens. Output only the summary.";

/// System prompt for local flashcard generation.
pub const LOCAL_FLASHCARD_SYSTEM: &str = "You write study flashcards. Reply with exactly one \
pair in the form 'question: <question> answer: <answer>' and nothing else.";

/// Build the local summarization system prompt for the given token bounds.
pub fn local_summary_system(min_tokens: usize, max_tokens: usize) -> String {
    LOCAL_SUMMARY_SYSTEM
        .replace("{min}", &min_tokens.to_string())
        .replace("{max}", &max_tokens.to_string())
}

/// Build the local flashcard prompt for one chunk.
pub fn local_flashcard_prompt(chunk: &str) -> String {
    format!("Generate a question and answer based on this text: {chunk}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_system_fills_bounds() {
        let p = local_summary_system(30, 150);
        assert!(p.contains("between 30 and 150 tokens"));
        assert!(!p.contains('{'));
    }

    #[test]
    fn flashcard_prompt_embeds_chunk() {
        let p = local_flashcard_prompt("Mitochondria make ATP.");
        assert!(p.ends_with("this text: Mitochondria make ATP."));
    }

    #[test]
    fn primary_flashcard_instruction_uses_parser_markers() {
        assert!(PRIMARY_FLASHCARD_INSTRUCTION.contains("Q: "));
        assert!(PRIMARY_FLASHCARD_INSTRUCTION.contains("A: "));
    }
}
