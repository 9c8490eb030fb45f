//! The interactive question loop.

use std::ops::ControlFlow;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use studymate_rag::{RagError, Session, StudioOptions};
use tracing::{debug, warn};

use crate::commands::{Command, HELP};
use crate::loader::load_paths;

const PROMPT: &str = "studymate> ";

/// Read lines until `exit`, end of input, or Ctrl-C.
///
/// Command failures are printed and the loop continues; only line
/// editor failures end it with an error.
pub async fn run_console(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    println!("Ask a question about your documents. Type :help for commands, exit to quit.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        remember(&mut editor, &line);

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match execute(session, command).await {
            Ok(ControlFlow::Break(())) => break,
            Ok(ControlFlow::Continue(())) => {}
            Err(e) => {
                warn!(error = %e, "command failed");
                eprintln!("Error: {e:#}");
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// Add a non-blank line to the editor's recall history.
fn remember(editor: &mut DefaultEditor, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    if let Err(e) = editor.add_history_entry(line) {
        debug!(error = %e, "failed to record line history");
    }
}

/// Run one parsed command against the session.
pub async fn execute(session: &mut Session, command: Command) -> Result<ControlFlow<()>> {
    match command {
        Command::Empty => {}
        Command::Exit => return Ok(ControlFlow::Break(())),
        Command::Help => println!("{HELP}"),
        Command::Load(paths) => {
            let documents = load_paths(&paths)?;
            let report = session.ingest(&documents).await?;
            if report.chunks == 0 {
                println!("No text found in {} document(s); nothing to search.", report.documents);
            } else {
                println!(
                    "Indexed {} chunk(s) from {} document(s).",
                    report.chunks, report.documents
                );
            }
        }
        Command::History => {
            if session.history().is_empty() {
                println!("No questions asked yet.");
            }
            for (i, turn) in session.history().iter().enumerate() {
                println!("Q{}: {}\nA{}: {}\n", i + 1, turn.query, i + 1, turn.answer);
            }
        }
        Command::Reset => {
            session.reset();
            println!("Conversation cleared.");
        }
        Command::Studio { kind, language } => {
            let options = language.map(StudioOptions::with_language).unwrap_or_default();
            match session.studio(kind, &options).await {
                Ok(output) => println!("== {} ==\n{}", output.kind, output.content),
                Err(RagError::NotIngested) => println!("Load documents first with :load FILES."),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Ask(query) => match session.ask(&query).await {
            Ok(answer) => println!("{answer}\n"),
            Err(RagError::NotIngested) => println!("Load documents first with :load FILES."),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(ControlFlow::Continue(()))
}
