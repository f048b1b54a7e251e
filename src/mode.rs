use std::path::PathBuf;

use crate::line::Line;

/// What a committed prompt should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    CreateDir,
    CreateFile,
    Rename,
    Search { reverse: bool },
}

/// Which batch operation a confirmation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmKind {
    Delete,
    Move,
    Copy,
}

/// Marks placed on the user's behalf by a counted delete; undone on cancel.
#[derive(Debug)]
pub struct TransientMarks {
    pub paths: Vec<PathBuf>,
    pub cursor: usize,
}

pub enum Mode {
    Browse,
    /// Single-line prompt; every key goes to the line editor until
    /// Enter commits or Esc cancels. `origin` is the cursor position the
    /// prompt started from (search prompts jump from and restore to it).
    Prompt {
        kind: PromptKind,
        title: String,
        line: Line,
        origin: usize,
        error: bool,
    },
    Confirm {
        kind: ConfirmKind,
        message: String,
        transient: Option<TransientMarks>,
    },
    /// Read-only scroll over the marked items behind a confirmation. Any
    /// key that isn't popup navigation falls through to the confirm handler.
    Popup {
        kind: ConfirmKind,
        message: String,
        transient: Option<TransientMarks>,
        lines: Vec<String>,
        offset: usize,
    },
}
