use crate::error::SurveyError;
use crate::models::Question;

/// The daily check-in. Reverse-scored items are phrased positively and have
/// their answers inverted before contributing to the stress score.
pub const SURVEY_QUESTIONS: [Question; 10] = [
    Question {
        text: "I felt overwhelmed by my academic workload this week.",
        reverse_scored: false,
    },
    Question {
        text: "I had difficulty concentrating on my studies.",
        reverse_scored: false,
    },
    Question {
        text: "I experienced adequate sleep quality.",
        reverse_scored: true,
    },
    Question {
        text: "I felt anxious about my future career prospects.",
        reverse_scored: false,
    },
    Question {
        text: "I maintained healthy social connections.",
        reverse_scored: true,
    },
    Question {
        text: "I felt physically tired or exhausted frequently.",
        reverse_scored: false,
    },
    Question {
        text: "I experienced feelings of loneliness or isolation.",
        reverse_scored: false,
    },
    Question {
        text: "I managed my time effectively.",
        reverse_scored: true,
    },
    Question {
        text: "I felt confident about my academic abilities.",
        reverse_scored: true,
    },
    Question {
        text: "I engaged in self-care activities regularly.",
        reverse_scored: true,
    },
];

/// Parses a comma-separated answer list, e.g. "3,1,4,2,5,1,2,3,4,5".
/// Range and count are validated by the scoring engine, not here.
pub fn parse_answers(raw: &str) -> Result<Vec<i32>, SurveyError> {
    raw.split(',')
        .map(|part| {
            part.trim().parse::<i32>().map_err(|_| {
                SurveyError::InvalidInput(format!(
                    "answers must be comma-separated integers, got {:?}",
                    part.trim()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_has_ten_questions_half_reverse_scored() {
        assert_eq!(SURVEY_QUESTIONS.len(), 10);
        let reversed = SURVEY_QUESTIONS.iter().filter(|q| q.reverse_scored).count();
        assert_eq!(reversed, 5);
    }

    #[test]
    fn parse_answers_accepts_whitespace() {
        let parsed = parse_answers("1, 2,3, 4,5,1,2,3,4,5").unwrap();
        assert_eq!(parsed, vec![1, 2, 3, 4, 5, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn parse_answers_rejects_non_integers() {
        let err = parse_answers("1,2,three").unwrap_err();
        assert!(matches!(err, SurveyError::InvalidInput(_)));
    }
}
