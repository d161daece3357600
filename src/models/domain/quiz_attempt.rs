use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{filter::PerformanceBand, parse_timestamp_value};

/// One completed quiz attempt as kept in the local results cache.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawQuizAttemptRecord")]
pub struct QuizAttemptRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub student_name: String,
    pub student_id: String,
    pub quiz_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub time_taken: u64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score_percentage: f64,
}

#[derive(Debug, Deserialize)]
struct RawQuizAttemptRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    student_name: Option<String>,
    #[serde(default)]
    student_id: Option<Value>,
    #[serde(default)]
    quiz_name: Option<String>,
    #[serde(default)]
    completed_at: Option<Value>,
    #[serde(default)]
    time_taken: Option<f64>,
    #[serde(default)]
    total_questions: Option<u32>,
    #[serde(default)]
    correct_answers: Option<u32>,
    #[serde(default)]
    score_percentage: Option<f64>,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl TryFrom<RawQuizAttemptRecord> for QuizAttemptRecord {
    type Error = String;

    fn try_from(raw: RawQuizAttemptRecord) -> Result<Self, Self::Error> {
        let student_name = raw
            .student_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "record is missing student_name".to_string())?;
        let student_id = raw
            .student_id
            .and_then(value_to_string)
            .ok_or_else(|| "record is missing student_id".to_string())?;
        let score_percentage = raw
            .score_percentage
            .filter(|s| s.is_finite())
            .ok_or_else(|| "record is missing score_percentage".to_string())?;

        Ok(QuizAttemptRecord {
            id: raw.id.and_then(value_to_string),
            student_name,
            student_id,
            quiz_name: raw
                .quiz_name
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| "Quiz".to_string()),
            completed_at: raw.completed_at.as_ref().and_then(parse_timestamp_value),
            time_taken: raw
                .time_taken
                .filter(|t| t.is_finite() && *t >= 0.0)
                .map(|t| t.round() as u64)
                .unwrap_or(0),
            total_questions: raw.total_questions.unwrap_or(0),
            correct_answers: raw.correct_answers.unwrap_or(0),
            score_percentage,
        })
    }
}

impl QuizAttemptRecord {
    pub fn new(
        id: &str,
        student_name: &str,
        student_id: &str,
        quiz_name: &str,
        completed_at: DateTime<Utc>,
        score_percentage: f64,
    ) -> Self {
        QuizAttemptRecord {
            id: Some(id.to_string()),
            student_name: student_name.to_string(),
            student_id: student_id.to_string(),
            quiz_name: quiz_name.to_string(),
            completed_at: Some(completed_at),
            time_taken: 0,
            total_questions: 0,
            correct_answers: 0,
            score_percentage,
        }
    }

    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::of(self.score_percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_cached_entry() {
        let record: QuizAttemptRecord = serde_json::from_value(json!({
            "id": 1717000000000i64,
            "student_name": "Priya",
            "student_id": "S100",
            "quiz_name": "Fractions",
            "completed_at": "2024-05-29T16:26:40.000Z",
            "time_taken": 312,
            "total_questions": 10,
            "correct_answers": 8,
            "score_percentage": 80
        }))
        .expect("record should deserialize");

        assert_eq!(record.id.as_deref(), Some("1717000000000"));
        assert_eq!(record.student_id, "S100");
        assert_eq!(record.time_taken, 312);
        assert_eq!(record.score_percentage, 80.0);
        assert!(record.completed_at.is_some());
        assert_eq!(record.band(), PerformanceBand::Excellent);
    }

    #[test]
    fn test_record_defaults_optional_fields() {
        let record: QuizAttemptRecord = serde_json::from_value(json!({
            "student_name": "Tom",
            "student_id": 42,
            "score_percentage": 55.5
        }))
        .expect("record should deserialize");

        assert!(record.id.is_none());
        assert_eq!(record.student_id, "42");
        assert_eq!(record.quiz_name, "Quiz");
        assert_eq!(record.total_questions, 0);
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn test_record_missing_search_fields_is_rejected() {
        let missing_name: Result<QuizAttemptRecord, _> =
            serde_json::from_value(json!({ "student_id": "S1", "score_percentage": 10 }));
        assert!(missing_name.is_err());

        let missing_score: Result<QuizAttemptRecord, _> =
            serde_json::from_value(json!({ "student_name": "A", "student_id": "S1" }));
        assert!(missing_score.is_err());
    }

    #[test]
    fn test_record_survives_its_own_serialization() {
        let record = QuizAttemptRecord::new(
            "r-1",
            "Lena",
            "S300",
            "Algebra",
            Utc::now(),
            72.0,
        );
        let stored = serde_json::to_value(&record).unwrap();
        let parsed: QuizAttemptRecord = serde_json::from_value(stored).unwrap();
        assert_eq!(parsed.student_name, "Lena");
        assert_eq!(parsed.id.as_deref(), Some("r-1"));
    }
}
