use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::{
    errors::AppResult,
    models::domain::QuizAttemptRecord,
    services::results_query::{grade_for, remark_for},
};

/// A formatted, printable marksheet for one quiz attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDocument {
    pub certificate_id: String,
    pub grade: &'static str,
    pub remark: &'static str,
    pub title: String,
    pub html: String,
}

/// Host capability that displays or prints a finished document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &CertificateDocument) -> AppResult<()>;
}

/// `CERT-` plus a short digest of the record id, or the issue time in
/// milliseconds when the record has no id.
pub fn certificate_id_for(record: &QuizAttemptRecord, issued_at: DateTime<Utc>) -> String {
    match record.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let digest = Sha256::digest(id.as_bytes());
            let hex: String = digest[..5].iter().map(|b| format!("{:02X}", b)).collect();
            format!("CERT-{}", hex)
        }
        None => format!("CERT-{}", issued_at.timestamp_millis()),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_duration(seconds: u64) -> String {
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    if minutes == 0 {
        format!("{}s", seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}

fn format_percentage(percentage: f64) -> String {
    if percentage.fract() == 0.0 {
        format!("{:.0}%", percentage)
    } else {
        format!("{:.1}%", percentage)
    }
}

/// Builds the certificate for `record`. All record text is HTML-escaped.
pub fn render_certificate_document(
    record: &QuizAttemptRecord,
    issued_at: DateTime<Utc>,
) -> CertificateDocument {
    let certificate_id = certificate_id_for(record, issued_at);
    let grade = grade_for(record.score_percentage);
    let remark = remark_for(record.score_percentage);

    let student_name = escape_html(&record.student_name);
    let student_id = escape_html(&record.student_id);
    let quiz_name = escape_html(&record.quiz_name);
    let completed = record
        .completed_at
        .map(|dt| dt.format("%B %-d, %Y %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let wrong_answers = record.total_questions.saturating_sub(record.correct_answers);

    let title = format!("Certificate - {} - {}", record.student_name, record.quiz_name);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  @page {{ size: A4; margin: 16mm; }}
  body {{ font-family: Georgia, 'Times New Roman', serif; color: #1f2937; margin: 0; }}
  .certificate {{ border: 6px double #1e3a8a; padding: 32px 40px; }}
  .header {{ text-align: center; border-bottom: 2px solid #1e3a8a; padding-bottom: 12px; }}
  .header h1 {{ margin: 0; font-size: 30px; letter-spacing: 2px; color: #1e3a8a; }}
  .header p {{ margin: 4px 0 0; font-size: 13px; color: #6b7280; }}
  table {{ width: 100%; border-collapse: collapse; margin-top: 24px; }}
  th, td {{ border: 1px solid #d1d5db; padding: 8px 12px; text-align: left; font-size: 14px; }}
  th {{ background: #eff6ff; width: 40%; }}
  .grade {{ font-size: 48px; font-weight: bold; color: #1e3a8a; text-align: center; margin: 24px 0 4px; }}
  .remark {{ text-align: center; font-style: italic; }}
  .footer {{ display: flex; justify-content: space-between; margin-top: 48px; font-size: 12px; color: #6b7280; }}
  @media print {{ .certificate {{ border-color: #000; }} }}
</style>
</head>
<body>
<div class="certificate">
  <div class="header">
    <h1>Certificate of Achievement</h1>
    <p>Quiz Marksheet</p>
  </div>
  <table>
    <tr><th>Student Name</th><td>{student_name}</td></tr>
    <tr><th>Student ID</th><td>{student_id}</td></tr>
    <tr><th>Quiz</th><td>{quiz_name}</td></tr>
    <tr><th>Completed</th><td>{completed}</td></tr>
    <tr><th>Time Taken</th><td>{time_taken}</td></tr>
    <tr><th>Total Questions</th><td>{total}</td></tr>
    <tr><th>Correct Answers</th><td>{correct}</td></tr>
    <tr><th>Wrong Answers</th><td>{wrong}</td></tr>
    <tr><th>Score</th><td>{score}</td></tr>
  </table>
  <div class="grade">{grade}</div>
  <p class="remark">{remark}</p>
  <div class="footer">
    <span>Certificate ID: {certificate_id}</span>
    <span>Issued: {issued}</span>
  </div>
</div>
</body>
</html>
"#,
        title = escape_html(&title),
        time_taken = format_duration(record.time_taken),
        total = record.total_questions,
        correct = record.correct_answers,
        wrong = wrong_answers,
        score = format_percentage(record.score_percentage),
        issued = issued_at.format("%B %-d, %Y"),
    );

    CertificateDocument {
        certificate_id,
        grade,
        remark,
        title,
        html,
    }
}

pub struct CertificateService {
    renderer: Arc<dyn DocumentRenderer>,
}

impl CertificateService {
    pub fn new(renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { renderer }
    }

    /// Formats the certificate and hands it to the host renderer.
    pub async fn print(&self, record: &QuizAttemptRecord) -> AppResult<CertificateDocument> {
        let document = render_certificate_document(record, Utc::now());
        log::info!(
            "Printing certificate {} for {}",
            document.certificate_id,
            record.student_id
        );
        self.renderer.render(&document).await?;
        Ok(document)
    }
}
