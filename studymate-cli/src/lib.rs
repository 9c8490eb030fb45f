//! # studymate-cli
//!
//! The interactive front end for `studymate-rag`: loads documents from
//! disk, builds a [`Session`](studymate_rag::Session), and answers
//! questions in a read-eval-print loop.

pub mod commands;
pub mod console;
pub mod loader;

pub use commands::Command;
pub use console::run_console;
pub use loader::{load_path, load_paths, split_pages};
