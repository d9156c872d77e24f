use crate::error::SurveyError;
use crate::models::{Question, ScoredResponse, StressCategory, SurveyResult};

pub const QUESTION_COUNT: usize = 10;

/// Converts one set of Likert answers into a 0-100 stress score and its
/// category. Answers pair positionally with questions; both sequences must
/// hold exactly [`QUESTION_COUNT`] entries and every answer must be 1-5.
pub fn score(answers: &[i32], questions: &[Question]) -> Result<SurveyResult, SurveyError> {
    if questions.len() != QUESTION_COUNT {
        return Err(SurveyError::InvalidInput(format!(
            "survey must have {QUESTION_COUNT} questions, got {}",
            questions.len()
        )));
    }
    if answers.len() != questions.len() {
        return Err(SurveyError::InvalidInput(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }
    if let Some(bad) = answers.iter().find(|a| !(1..=5).contains(*a)) {
        return Err(SurveyError::InvalidInput(format!(
            "answers must be between 1 and 5, got {bad}"
        )));
    }

    let mut total = 0i64;
    let responses: Vec<ScoredResponse> = questions
        .iter()
        .zip(answers)
        .map(|(question, &answer)| {
            total += point_value(answer, question.reverse_scored) as i64;
            ScoredResponse {
                question: question.text.to_string(),
                answer,
            }
        })
        .collect();

    let stress_score = round_half_up(total as f64 / questions.len() as f64) as i32;

    Ok(SurveyResult {
        responses,
        stress_score,
        category: StressCategory::from_score(stress_score),
    })
}

/// Point contribution of a single answer. Reverse-scored questions invert
/// the mapping; anything outside 1-5 falls through to 0.
pub fn point_value(answer: i32, reverse_scored: bool) -> i32 {
    match (reverse_scored, answer) {
        (false, 1) | (true, 5) => 0,
        (false, 2) | (true, 4) => 25,
        (false, 3) | (true, 3) => 50,
        (false, 4) | (true, 2) => 75,
        (false, 5) | (true, 1) => 100,
        _ => 0,
    }
}

/// Rounds half toward positive infinity, so 42.5 becomes 43.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
