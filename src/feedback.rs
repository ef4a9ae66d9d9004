use crate::models::WordRecord;
use crate::practice::{normalize, QuizDirection};
use crate::srs::format_interval;

pub struct FeedbackGenerator;

impl FeedbackGenerator {
    /// Explains a wrong free-text answer. When the input is the answer to a
    /// different word in `pool`, that word is named as the likely confusion.
    pub fn explain_mistake(
        word: &WordRecord,
        user_input: &str,
        direction: QuizDirection,
        pool: &[WordRecord],
    ) -> String {
        let trimmed_input = user_input.trim();
        let expected = direction.answer(word);

        let mut msg = format!(
            "The correct answer for '{}' is '{}'. You typed '{}'.",
            direction.prompt(word),
            expected,
            trimmed_input
        );

        let wanted = normalize(trimmed_input);
        let confused = pool
            .iter()
            .filter(|other| other.id != word.id)
            .find(|other| normalize(direction.answer(other)) == wanted);

        if let Some(confused) = confused {
            msg.push_str(&format!(
                "\n'{}' is the answer for '{}'.",
                trimmed_input,
                direction.prompt(confused)
            ));
        }

        msg
    }

    /// Confirmation shown after a correct answer.
    pub fn praise(word: &WordRecord) -> String {
        format!("Correct! Next review: {}", format_interval(word.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explains_confusion_with_other_word() {
        let target = WordRecord::new("kiri", "left");
        let other = WordRecord::new("kanan", "right");
        let pool = vec![target.clone(), other];

        let msg = FeedbackGenerator::explain_mistake(&target, " Right ", QuizDirection::AToB, &pool);
        assert!(msg.contains("'left'"));
        assert!(msg.contains("is the answer for 'kanan'"));
    }

    #[test]
    fn test_plain_mistake() {
        let target = WordRecord::new("kiri", "left");
        let msg = FeedbackGenerator::explain_mistake(&target, "up", QuizDirection::BToA, &[]);
        assert_eq!(msg, "The correct answer for 'left' is 'kiri'. You typed 'up'.");
    }

    #[test]
    fn test_praise_uses_interval_label() {
        let mut word = WordRecord::new("a", "b");
        word.interval = 14;
        assert_eq!(FeedbackGenerator::praise(&word), "Correct! Next review: 2w");
    }
}
