//! Turn raw generator text into [`Flashcard`]s.
//!
//! The two generators answer in different shapes, so each has its own
//! parser:
//!
//! * the primary tool emits many `Q: ... A: ...` blocks;
//! * the local model emits a single `question: ... answer: ...` pair.

use crate::output::Flashcard;

const PRIMARY_QUESTION_MARKER: &str = "Q: ";
const PRIMARY_ANSWER_MARKER: &str = "A: ";
const LOCAL_QUESTION_MARKER: &str = "question:";
const LOCAL_ANSWER_MARKER: &str = "answer:";

/// Parse the primary tool's output.
///
/// Splits on `"Q: "`; every segment containing `"A: "` is split once on it
/// into a trimmed question/answer pair. Segments without an answer marker
/// (including any preamble before the first question) are dropped.
pub fn parse_primary_flashcards(raw: &str) -> Vec<Flashcard> {
    raw.split(PRIMARY_QUESTION_MARKER)
        .filter_map(|segment| segment.split_once(PRIMARY_ANSWER_MARKER))
        .map(|(question, answer)| Flashcard::new(question.trim(), answer.trim()))
        .collect()
}

/// Parse one local-model generation.
///
/// Splits once on `"answer:"`; the left side minus any `"question:"` marker
/// is the question. Returns `None` when the answer marker is missing.
pub fn parse_local_flashcard(raw: &str) -> Option<Flashcard> {
    let (question, answer) = raw.split_once(LOCAL_ANSWER_MARKER)?;
    let question = question.replace(LOCAL_QUESTION_MARKER, "");
    Some(Flashcard::new(question.trim(), answer.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_drops_trailing_segment_without_answer() {
        let cards = parse_primary_flashcards("Q: What is X?\nA: X is Y.\nQ: incomplete");
        assert_eq!(cards, vec![Flashcard::new("What is X?", "X is Y.")]);
    }

    #[test]
    fn primary_parses_several_cards_and_ignores_preamble() {
        let raw = "Here are your flashcards:\n\n\
                   Q: Where does photosynthesis happen?\nA: In chloroplasts.\n\n\
                   Q: What does the Calvin cycle fix?\nA: Carbon dioxide.";
        let cards = parse_primary_flashcards(raw);
        assert_eq!(
            cards,
            vec![
                Flashcard::new("Where does photosynthesis happen?", "In chloroplasts."),
                Flashcard::new("What does the Calvin cycle fix?", "Carbon dioxide."),
            ]
        );
    }

    #[test]
    fn primary_splits_answer_only_once() {
        let cards = parse_primary_flashcards("Q: Grade?\nA: A: excellent");
        assert_eq!(cards, vec![Flashcard::new("Grade?", "A: excellent")]);
    }

    #[test]
    fn primary_empty_output_yields_nothing() {
        assert!(parse_primary_flashcards("").is_empty());
        assert!(parse_primary_flashcards("I cannot help with that.").is_empty());
    }

    #[test]
    fn local_parses_question_and_answer() {
        assert_eq!(
            parse_local_flashcard("question: What? answer: Because."),
            Some(Flashcard::new("What?", "Because."))
        );
    }

    #[test]
    fn local_without_question_marker_still_parses() {
        assert_eq!(
            parse_local_flashcard("Why is the sky blue? answer: Rayleigh scattering"),
            Some(Flashcard::new("Why is the sky blue?", "Rayleigh scattering"))
        );
    }

    #[test]
    fn local_missing_answer_marker_is_none() {
        assert_eq!(parse_local_flashcard("no marker here"), None);
    }

    #[test]
    fn local_markers_are_case_sensitive() {
        assert_eq!(parse_local_flashcard("Question: What? Answer: Because."), None);
    }
}
