//! Batch probe for the vnstock chat agent
//!
//! Posts each question to `/api/chat` in turn, prints the answer and writes
//! a `question,answer` CSV.

mod probe;

use chrono::Local;
use clap::Parser;
use probe::{ChatClient, DEFAULT_QUESTIONS, DEFAULT_URL, ResultWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Send a batch of questions to the vnstock agent", long_about = None)]
struct Args {
    /// Chat endpoint
    #[arg(short, long, default_value = DEFAULT_URL)]
    url: String,

    /// File with one question per line (defaults to the built-in set)
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// CSV output path (defaults to test_results_<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-question timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::init_tracing("warn");

    let args = Args::parse();

    let questions = match &args.questions {
        Some(path) => probe::parse_questions(&std::fs::read_to_string(path)?),
        None => DEFAULT_QUESTIONS.iter().map(|q| (*q).to_string()).collect(),
    };
    let output = args
        .output
        .unwrap_or_else(|| probe::default_output_path(&Local::now()));
    info!(count = questions.len(), url = %args.url, "Starting probe");

    let client = ChatClient::new(&args.url, Duration::from_secs(args.timeout_secs))?;
    let mut writer = ResultWriter::create(&output)?;

    println!("--- Bắt đầu kiểm thử Agent tại {} ---", args.url);
    for (index, question) in questions.iter().enumerate() {
        println!("\n[Test Case {}]", index + 1);
        println!("Câu hỏi: {question}");

        let outcome = client.ask(question).await;
        let answer = outcome.answer_text();
        if outcome.is_success() {
            println!("Trả lời: {answer}");
            println!("-> Trạng thái: Thành công (200 OK)");
        } else {
            println!("-> {answer}");
        }
        writer.record(question, &answer)?;
    }

    println!("\n--- Kết quả đã được lưu vào file: {} ---", output.display());
    Ok(())
}
