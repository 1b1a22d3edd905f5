//! Interactive component-generation REPL.
//!
//! Usage:
//!   cargo run --example chat
//!   cargo run --example chat -- --blocking --show-files
//!   ANTHROPIC_API_KEY=sk-... cargo run --example chat
//!
//! Without a key the simulated provider answers. Tool calls are applied to an
//! in-memory file map and their results fed back until the turn stops.
//! Ctrl-C or type "exit" / "quit" to leave.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use clap::Parser;
use uigen::config::API_KEY_VAR;
use uigen::{
    build_provider, EditorCommand, FileManagerCommand, FileOperation, FinishReason,
    InferenceProvider, InferenceRequest, InferenceResponse, Message, ProviderConfig,
    StreamEvent, ToolCall, Usage,
};

#[derive(Parser)]
#[command(name = "chat", about = "Generate UI components in a virtual file system")]
struct Cli {
    /// Max model steps per message
    #[arg(long, default_value_t = 10)]
    max_steps: usize,

    /// Use the one-shot call instead of streaming
    #[arg(long)]
    blocking: bool,

    /// Print the file tree after each message
    #[arg(long)]
    show_files: bool,
}

const SYSTEM_PROMPT: &str = "\
You build React components with Tailwind CSS in a virtual file system rooted at '/'.
Every project has a root /App.jsx whose default export is the app; create it first.
Import non-library files through the '@/' alias, e.g. '@/components/Calculator'.
Keep responses brief.";

type Files = BTreeMap<String, String>;

fn apply(files: &mut Files, call: &ToolCall) -> Result<String, String> {
    let op = call.operation().map_err(|e| e.to_string())?;
    match op {
        FileOperation::Editor(EditorCommand::Create { path, file_text }) => {
            files.insert(path.clone(), file_text);
            Ok(format!("File created: {path}"))
        }
        FileOperation::Editor(EditorCommand::StrReplace { path, old_str, new_str }) => {
            let body = files.get_mut(&path).ok_or(format!("no such file: {path}"))?;
            match body.matches(&old_str).count() {
                1 => {
                    *body = body.replacen(&old_str, &new_str, 1);
                    Ok(format!("Replaced text in {path}"))
                }
                0 => Err(format!("text not found in {path}")),
                n => Err(format!("{n} matches in {path}, expected one")),
            }
        }
        FileOperation::Editor(EditorCommand::Insert { path, insert_line, new_str }) => {
            let body = files.get_mut(&path).ok_or(format!("no such file: {path}"))?;
            let mut lines: Vec<&str> = body.lines().collect();
            let at = (insert_line as usize).min(lines.len());
            lines.insert(at, &new_str);
            let updated = lines.join("\n");
            *body = updated;
            Ok(format!("Inserted into {path}"))
        }
        FileOperation::Editor(EditorCommand::View { path, .. }) => {
            files.get(&path).cloned().ok_or(format!("no such file: {path}"))
        }
        FileOperation::FileManager(FileManagerCommand::Rename { path, new_path }) => {
            let body = files.remove(&path).ok_or(format!("no such file: {path}"))?;
            files.insert(new_path.clone(), body);
            Ok(format!("Renamed {path} to {new_path}"))
        }
        FileOperation::FileManager(FileManagerCommand::Delete { path }) => {
            files.remove(&path).ok_or(format!("no such file: {path}"))?;
            Ok(format!("Deleted {path}"))
        }
    }
}

async fn step(
    provider: &dyn InferenceProvider,
    history: &[Message],
    blocking: bool,
) -> Result<InferenceResponse, uigen::InferenceError> {
    let request = InferenceRequest::new(history.to_vec())
        .with_system(SYSTEM_PROMPT)
        .with_tools(uigen::tools::tool_schemas());
    if blocking {
        let resp = provider.generate(request).await?;
        println!("{}", resp.text);
        return Ok(resp);
    }

    let resp = provider
        .stream(request)
        .await?
        .collect_response_with(|event| {
            if let StreamEvent::TextDelta { text_delta } = event {
                print!("{text_delta}");
                io::stdout().flush().ok();
            }
        })
        .await;
    println!();
    resp
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = ProviderConfig::from_env();
    let provider = build_provider(&config);

    eprintln!("uigen chat");
    eprintln!("model: {}", provider.model_id());
    if !config.has_credential() {
        eprintln!("no {API_KEY_VAR} set, answers are canned");
    }
    eprintln!("---");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut history: Vec<Message> = Vec::new();
    let mut files = Files::new();

    loop {
        eprint!("\x1b[1;36myou>\x1b[0m ");
        io::stderr().flush().ok();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "exit" | "quit" | "/q") {
            break;
        }

        history.push(Message::user(trimmed));
        let mut total = Usage::default();

        for _ in 0..cli.max_steps {
            eprint!("\x1b[1;32magent>\x1b[0m ");
            let resp = match step(provider.as_ref(), &history, cli.blocking).await {
                Ok(resp) => resp,
                Err(e) => {
                    eprintln!("\x1b[1;31merror:\x1b[0m {e}");
                    break;
                }
            };

            history.push(Message::assistant_with_tool_calls(&resp.text, &resp.tool_calls));
            for call in &resp.tool_calls {
                let (output, is_error) = match apply(&mut files, call) {
                    Ok(out) => (out, false),
                    Err(out) => (out, true),
                };
                let tag = if is_error { "error" } else { "done" };
                eprintln!("\x1b[33m  [{tag}] {}\x1b[0m", call.status_label());
                history.push(Message::tool_result(&call.id, &call.name, output, is_error));
            }
            total.accumulate(&resp.usage);

            if resp.finish_reason != FinishReason::ToolCalls {
                break;
            }
        }
        eprintln!(
            "\x1b[2m  [{}in / {}out tokens]\x1b[0m",
            total.prompt_tokens, total.completion_tokens
        );

        if cli.show_files {
            for (path, body) in &files {
                eprintln!("\x1b[35m  {path}\x1b[0m ({} lines)", body.lines().count());
            }
        }
    }

    eprintln!("bye.");
}
