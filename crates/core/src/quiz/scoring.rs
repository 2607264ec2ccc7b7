use crate::model::Question;

/// Counts answer slots that equal their question's correct option.
///
/// Slots are matched positionally; an unanswered slot (`None`) never counts.
#[must_use]
pub fn count_correct(questions: &[Question], answers: &[Option<usize>]) -> u32 {
    let matches = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.is_correct(**answer))
        .count();
    u32::try_from(matches).unwrap_or(u32::MAX)
}

/// Integer percentage `correct / total * 100`, rounded half up.
///
/// Returns 0 when `total` is 0 and never exceeds 100.
#[must_use]
pub fn score_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    let rounded = (correct * 200 + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}
