//! Question batches against a running chat endpoint

use anyhow::Context;
use chrono::{DateTime, TimeZone};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_URL: &str = "http://localhost:8000/api/chat";

/// Built-in smoke questions
pub const DEFAULT_QUESTIONS: &[&str] = &[
    "Lấy dữ liệu OHLCV 10 ngày gần nhất HPG?",
    "Lấy giá đóng của của mã VCB từ đầu tháng 11 năm nay theo khung 1d?",
    "Trong các mã BID, TCB và VCB mã nào có giá mở cửa thấp nhất trong 10 ngày qua",
    "Tổng khối lượng giao dịch (volume) của mã VIC trong vòng 10 ngày gần đây",
    "So sánh khối lượng giao dịch của VIC với HPG trong 2 tuần gần đây",
    "Danh sách ban lãnh đạo đang làm việc của VCB",
    "Tính cho tôi SMA9 của mã VIC với timeframe 1d",
    "Tính SMA9 và SMA20 của mã TCB",
];

/// What came back for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answered(String),
    HttpError { status: u16, body: String },
    Failed(String),
}

impl Outcome {
    /// Text recorded in the answer column
    pub fn answer_text(&self) -> String {
        match self {
            Self::Answered(answer) => answer.clone(),
            Self::HttpError { status, body } => format!("Lỗi: {status} - {body}"),
            Self::Failed(error) => format!("Exception: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Answered(_))
    }
}

#[derive(Deserialize)]
struct AnswerBody {
    #[serde(default)]
    answer: String,
}

/// Client for `POST /api/chat`
pub struct ChatClient {
    client: Client,
    url: String,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Ask one question; never fails, every problem becomes an [`Outcome`]
    pub async fn ask(&self, question: &str) -> Outcome {
        let response = match self
            .client
            .post(&self.url)
            .json(&json!({ "question": question }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return Outcome::Failed(err.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Outcome::Failed(err.to_string()),
        };
        debug!(status = status.as_u16(), bytes = body.len(), "Chat response");

        if status != StatusCode::OK {
            return Outcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }
        match serde_json::from_str::<AnswerBody>(&body) {
            Ok(parsed) => Outcome::Answered(parsed.answer),
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }
}

/// One question per line; blank lines and `#` comments are skipped
pub fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `test_results_{YYYYmmdd_HHMMSS}.csv`
pub fn default_output_path<Tz: TimeZone>(now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from(format!("test_results_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

#[derive(Serialize)]
struct ResultRow<'a> {
    question: &'a str,
    answer: &'a str,
}

/// CSV sink flushed after every row, so a crash keeps earlier answers
pub struct ResultWriter {
    writer: csv::Writer<File>,
}

impl ResultWriter {
    /// Create the file with a UTF-8 BOM so spreadsheet tools read Vietnamese correctly
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        file.write_all("\u{feff}".as_bytes())?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
        })
    }

    pub fn record(&mut self, question: &str, answer: &str) -> anyhow::Result<()> {
        self.writer
            .serialize(ResultRow { question, answer })
            .context("csv write failed")?;
        self.writer.flush().context("csv flush failed")?;
        Ok(())
    }
}
