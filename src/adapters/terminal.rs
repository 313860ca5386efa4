//! Terminal dialog adapter
//!
//! Confirmation prompts read a y/N answer from stdin; errors go to stderr.

use crate::ports::dialog::{ConfirmPort, NotifierPort};
use std::io::{self, BufRead, Write};

/// Dialogs on the controlling terminal
#[derive(Debug, Clone, Default)]
pub struct TerminalDialog {
    assume_yes: bool,
}

impl TerminalDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every confirmation with yes without prompting
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }
}

/// Only an explicit yes confirms
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl ConfirmPort for TerminalDialog {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stderr = io::stderr();
        if write!(stderr, "{} [y/N] ", message)
            .and_then(|_| stderr.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                log::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

impl NotifierPort for TerminalDialog {
    fn notify_error(&self, message: &str) {
        eprintln!("error: {} Please try again.", message);
    }
}
