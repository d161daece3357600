use chrono::{DateTime, Utc};

use crate::models::domain::{Account, AccountRole, QuizAttemptRecord};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Creates a quiz attempt with the fields the catalog filters on
    pub fn record(
        id: &str,
        student_name: &str,
        student_id: &str,
        score_percentage: f64,
        completed_at: DateTime<Utc>,
    ) -> QuizAttemptRecord {
        let mut record = QuizAttemptRecord::new(
            id,
            student_name,
            student_id,
            "General Knowledge",
            completed_at,
            score_percentage,
        );
        record.total_questions = 20;
        record.correct_answers = (score_percentage / 5.0).round() as u32;
        record.time_taken = 300;
        record
    }

    /// Creates an account with a derived email
    pub fn account(id: &str, display_name: &str, role: AccountRole) -> Account {
        Account::new(
            id,
            display_name,
            &format!("{}@school.test", display_name.to_lowercase().replace(' ', ".")),
            role,
        )
    }

    /// A small mixed directory
    pub fn accounts() -> Vec<Account> {
        vec![
            account("1", "Ada Byron", AccountRole::Teacher),
            account("2", "Ben Ito", AccountRole::Student),
            account("3", "Cleo Park", AccountRole::Student),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_record() {
        let record = record("r1", "Ana", "S1", 80.0, chrono::Utc::now());
        assert_eq!(record.correct_answers, 16);
        assert_eq!(record.total_questions, 20);
    }

    #[test]
    fn test_fixtures_accounts() {
        let accounts = accounts();
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].email, "ada.byron@school.test");
    }
}
