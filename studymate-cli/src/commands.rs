//! Parsing of console input lines.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use studymate_rag::{ReportKind, SUPPORTED_LANGUAGES};

/// Help text printed by `:help`.
pub const HELP: &str = "\
Type a question to ask about the loaded documents.

Commands:
  :load FILES...            replace the documents with FILES (.txt, .md, .pdf)
  :history                  show the conversation so far
  :reset                    forget the conversation, keep the documents
  :studio KIND [LANGUAGE]   generate audio-overview, video-overview, mind-map,
                            report, flashcards, or quiz
  :help                     show this message
  exit                      quit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// Leave the loop.
    Exit,
    /// Replace the document set.
    Load(Vec<PathBuf>),
    /// Print the history.
    History,
    /// Clear the history.
    Reset,
    /// Generate study material.
    Studio {
        /// What to generate.
        kind: ReportKind,
        /// Output language, for kinds that take one.
        language: Option<String>,
    },
    /// Print [`HELP`].
    Help,
    /// Ask a question.
    Ask(String),
}

impl Command {
    /// Parse a line of input.
    ///
    /// `exit` is matched case-insensitively; lines starting with `:` are
    /// commands; anything else is a question.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if line.eq_ignore_ascii_case("exit") {
            return Ok(Self::Exit);
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Ask(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match name.as_str() {
            "load" => {
                if args.is_empty() {
                    bail!(":load needs at least one file");
                }
                Ok(Self::Load(args.into_iter().map(PathBuf::from).collect()))
            }
            "history" => Ok(Self::History),
            "reset" => Ok(Self::Reset),
            "studio" => parse_studio(&args),
            "help" | "?" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            other => bail!("unknown command ':{other}' (try :help)"),
        }
    }
}

fn parse_studio(args: &[&str]) -> Result<Command> {
    let (kind, language) = match args {
        [] => bail!(":studio needs a kind, e.g. :studio quiz"),
        [kind] => (kind, None),
        [kind, language] => (kind, Some(*language)),
        _ => bail!("usage: :studio KIND [LANGUAGE]"),
    };
    let kind: ReportKind = kind.parse()?;

    let language = language
        .map(|requested| {
            SUPPORTED_LANGUAGES
                .iter()
                .find(|supported| supported.eq_ignore_ascii_case(requested))
                .map(|supported| supported.to_string())
                .ok_or_else(|| {
                    anyhow!(
                        "unsupported language '{requested}' (choose from {})",
                        SUPPORTED_LANGUAGES.join(", ")
                    )
                })
        })
        .transpose()?;

    Ok(Command::Studio { kind, language })
}
