//! The event loop: reads one key at a time, resolves it against the current
//! mode and redraws. Numeric prefixes accumulate here and reset after the
//! next non-digit action.

use std::env;
use std::io::Write;
use std::mem;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, Terminal};

use crate::actions;
use crate::app::App;
use crate::line::{Line, Motion};
use crate::mode::{Mode, PromptKind};
use crate::search;
use crate::ui;

/// Rows available to the listing: total height minus header and footer.
fn visible_rows(height: u16) -> usize {
    height.saturating_sub(2).max(1) as usize
}

/// Main loop. Returns on quit; fatal errors (initial listing is handled by
/// the caller, failed refreshes here) propagate out.
pub fn run_app<B: Backend + Write>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut prefix: usize = 0;

    loop {
        let rows = visible_rows(terminal.size()?.height);
        app.scroll(rows);
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match app.mode {
            Mode::Browse => {
                if let KeyCode::Char(c) = key.code {
                    if let Some(digit) = c.to_digit(10) {
                        prefix = prefix.saturating_mul(10).saturating_add(digit as usize);
                        continue;
                    }
                }
                app.message = None;
                let typed = prefix;
                let count = prefix.max(1);
                prefix = 0;
                if !browse_key(terminal, app, key, count, typed)? {
                    return Ok(());
                }
            }
            Mode::Prompt { .. } => {
                app.message = None;
                prefix = 0;
                prompt_key(terminal, app, key)?;
            }
            Mode::Confirm { .. } => {
                app.message = None;
                prefix = 0;
                confirm_key(app, key)?;
            }
            Mode::Popup { .. } => {
                prefix = 0;
                popup_key(app, key)?;
            }
        }
    }
}

fn editor() -> String {
    env::var("EDITOR").unwrap_or_else(|_| "vi".to_string())
}

/// Normal-mode dispatch. Returns `Ok(false)` on quit.
fn browse_key<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    key: KeyEvent,
    count: usize,
    typed: usize,
) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(false),

        KeyCode::Char('j') => app.move_down(count),
        KeyCode::Char('k') => app.move_up(count),
        KeyCode::Char('}') => app.move_down(count.saturating_mul(10)),
        KeyCode::Char('{') => app.move_up(count.saturating_mul(10)),
        KeyCode::Char('g') => app.move_top(),
        KeyCode::Char('G') => app.move_bottom(),

        KeyCode::Char('h') | KeyCode::Backspace => app.leave_to_parent(),
        KeyCode::Char('l') | KeyCode::Enter => open_selected(terminal, app)?,
        KeyCode::Char('e') => {
            if let Some(item) = app.selected() {
                let path = item.path.clone();
                run_program(terminal, app, &editor(), &path)?;
            }
        }
        KeyCode::Char('o') => start_prompt(app, PromptKind::Open, "Open: ", ""),

        KeyCode::Char('~') => {
            if let Some(home) = env::var_os("HOME") {
                app.enter(PathBuf::from(home));
            }
        }
        KeyCode::Char('.') => app.enter(app.start_path.clone()),
        KeyCode::Char('-') => app.enter(app.prev_path.clone()),

        KeyCode::Char('/') => start_prompt(app, PromptKind::Search { reverse: false }, "/", ""),
        KeyCode::Char('?') => start_prompt(app, PromptKind::Search { reverse: true }, "?", ""),
        KeyCode::Char('n') => repeat_search(app, count, false),
        KeyCode::Char('N') => repeat_search(app, count, true),

        KeyCode::Char('d') => start_prompt(app, PromptKind::CreateDir, "Create dir: ", ""),
        KeyCode::Char('f') => start_prompt(app, PromptKind::CreateFile, "Create file: ", ""),

        KeyCode::Char('x') => app.toggle_mark_and_advance(count),
        KeyCode::Char('X') => app.toggle_all_marks(),
        KeyCode::Char('D') => actions::begin_delete(app, typed),
        KeyCode::Char('m') => actions::begin_move(app),
        KeyCode::Char('c') => actions::begin_copy(app),
        KeyCode::Char('r') => {
            if let Some(item) = app.selected() {
                let name = item.name.clone();
                start_prompt(app, PromptKind::Rename, "Rename: ", &name);
            }
        }
        _ => {}
    }
    Ok(true)
}

fn open_selected<B: Backend + Write>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let Some(item) = app.selected() else {
        return Ok(());
    };
    if item.is_dir {
        app.enter_selected();
    } else {
        let path = item.path.clone();
        run_program(terminal, app, &editor(), &path)?;
    }
    Ok(())
}

fn start_prompt(app: &mut App, kind: PromptKind, title: &str, init: &str) {
    app.mode = Mode::Prompt {
        kind,
        title: title.to_string(),
        line: Line::new(init),
        origin: app.cursor,
        error: false,
    };
}

fn repeat_search(app: &mut App, count: usize, flip: bool) {
    if app.search_query.is_empty() {
        return;
    }
    let reverse = app.search_reverse ^ flip;
    if let Some(idx) = search::find_repeated(&app.items, &app.search_query, app.cursor, count, reverse)
    {
        app.cursor = idx;
    }
}

enum PromptOutcome {
    Edited,
    Moved,
    Commit(String),
    Cancel,
    Ignored,
}

fn prompt_key<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    key: KeyEvent,
) -> Result<()> {
    let Mode::Prompt { kind, line, origin, .. } = &mut app.mode else {
        return Ok(());
    };
    let kind = *kind;
    let origin = *origin;

    let outcome = match key.code {
        KeyCode::Esc => PromptOutcome::Cancel,
        KeyCode::Enter => PromptOutcome::Commit(line.text()),
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'a' => {
                line.apply(Motion::Start);
                PromptOutcome::Moved
            }
            'e' => {
                line.apply(Motion::End);
                PromptOutcome::Moved
            }
            'b' => {
                line.apply(Motion::PrevChar);
                PromptOutcome::Moved
            }
            'f' => {
                line.apply(Motion::NextChar);
                PromptOutcome::Moved
            }
            'w' => {
                line.delete_by(Motion::PrevWord);
                PromptOutcome::Edited
            }
            'u' => {
                line.delete_by(Motion::Start);
                PromptOutcome::Edited
            }
            'k' => {
                line.delete_by(Motion::End);
                PromptOutcome::Edited
            }
            _ => PromptOutcome::Ignored,
        },
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => match c {
            'b' => {
                line.apply(Motion::PrevWord);
                PromptOutcome::Moved
            }
            'f' => {
                line.apply(Motion::NextWord);
                PromptOutcome::Moved
            }
            _ => PromptOutcome::Ignored,
        },
        // only printable single bytes reach the buffer
        KeyCode::Char(c) if c.is_ascii() && !c.is_control() => {
            line.insert(c as u8);
            PromptOutcome::Edited
        }
        KeyCode::Backspace => {
            line.delete_by(Motion::PrevChar);
            PromptOutcome::Edited
        }
        KeyCode::Delete => {
            line.delete_by(Motion::NextChar);
            PromptOutcome::Edited
        }
        KeyCode::Left => {
            line.apply(Motion::PrevChar);
            PromptOutcome::Moved
        }
        KeyCode::Right => {
            line.apply(Motion::NextChar);
            PromptOutcome::Moved
        }
        KeyCode::Home => {
            line.apply(Motion::Start);
            PromptOutcome::Moved
        }
        KeyCode::End => {
            line.apply(Motion::End);
            PromptOutcome::Moved
        }
        _ => PromptOutcome::Ignored,
    };

    match outcome {
        PromptOutcome::Edited => {
            if let PromptKind::Search { reverse } = kind {
                live_search(app, reverse, origin);
            }
        }
        PromptOutcome::Commit(text) => {
            app.mode = Mode::Browse;
            match kind {
                PromptKind::Open => {
                    if !text.is_empty() {
                        if let Some(item) = app.selected() {
                            let path = item.path.clone();
                            run_program(terminal, app, &text, &path)?;
                        }
                    }
                }
                PromptKind::CreateDir => actions::commit_create_dir(app, &text)?,
                PromptKind::CreateFile => actions::commit_create_file(app, &text)?,
                PromptKind::Rename => actions::commit_rename(app, &text)?,
                PromptKind::Search { reverse } => {
                    app.search_query = text;
                    app.search_reverse = reverse;
                }
            }
        }
        PromptOutcome::Cancel => {
            if let PromptKind::Search { .. } = kind {
                app.cursor = origin;
            }
            app.mode = Mode::Browse;
        }
        PromptOutcome::Moved | PromptOutcome::Ignored => {}
    }
    Ok(())
}

/// Re-run the search from the prompt's origin after every edit, so removing
/// characters re-anchors instead of drifting. No match leaves the prompt
/// editable in an error style.
fn live_search(app: &mut App, reverse: bool, origin: usize) {
    let query = match &app.mode {
        Mode::Prompt { line, .. } => line.text(),
        _ => return,
    };
    let found = if reverse {
        search::find_backward(&app.items, &query, origin)
    } else {
        search::find_forward(&app.items, &query, origin)
    };
    let error = match found {
        Some(idx) => {
            app.cursor = idx;
            false
        }
        None => {
            app.cursor = origin;
            !query.is_empty()
        }
    };
    if let Mode::Prompt { error: e, .. } = &mut app.mode {
        *e = error;
    }
}

fn confirm_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let Mode::Confirm { kind, message, transient } = mem::replace(&mut app.mode, Mode::Browse)
    else {
        return Ok(());
    };

    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            actions::perform(app, kind)?;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            actions::cancel(app, transient);
        }
        KeyCode::Char('v') if app.marked.len() > 1 => {
            let lines = actions::marked_listing(app);
            app.mode = Mode::Popup {
                kind,
                message,
                transient,
                lines,
                offset: 0,
            };
        }
        _ => {
            app.mode = Mode::Confirm { kind, message, transient };
        }
    }
    Ok(())
}

/// Popup navigation; any other key drops back to the confirmation and is
/// handled there, so `y` inside the popup still confirms.
fn popup_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let Mode::Popup { kind, message, transient, lines, offset } =
        mem::replace(&mut app.mode, Mode::Browse)
    else {
        return Ok(());
    };

    let last = lines.len().saturating_sub(1);
    let new_offset = match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some((offset + 1).min(last)),
        KeyCode::Char('k') | KeyCode::Up => Some(offset.saturating_sub(1)),
        KeyCode::Char('g') => Some(0),
        KeyCode::Char('G') => Some(last),
        _ => None,
    };

    match new_offset {
        Some(offset) => {
            app.mode = Mode::Popup { kind, message, transient, lines, offset };
            Ok(())
        }
        None => {
            app.mode = Mode::Confirm { kind, message, transient };
            confirm_key(app, key)
        }
    }
}

/// Suspend the interface, run `program` on `path`, and take the terminal
/// back once it exits. There is no way to cancel the child from here; the
/// loop resumes when it is done.
fn run_program<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    program: &str,
    path: &Path,
) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let status = Command::new(program).arg(path).status();

    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.hide_cursor()?;
    terminal.clear()?;

    match status {
        Ok(status) if !status.success() => {
            app.message = Some(format!("{program}: {status}"));
        }
        Err(e) => {
            app.message = Some(format!("failed to run {program}: {e}"));
        }
        Ok(_) => {}
    }
    Ok(())
}
