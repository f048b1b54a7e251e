//! Batch operations on marked items and the commit half of every prompt.
//!
//! `begin_*` builds a confirmation; `perform_*` runs it. Recoverable
//! failures become the pending message; a failed refresh afterwards is
//! fatal and propagates.

use std::path::PathBuf;

use crate::app::App;
use crate::fs_utils::{self, FsError};
use crate::mode::{ConfirmKind, Mode, TransientMarks};

/// Paths a batch operation applies to: the marked set, or the item under
/// the cursor when nothing is marked. Iteration order over marks is
/// unspecified.
fn batch_targets(app: &App) -> Vec<PathBuf> {
    if app.marked.is_empty() {
        app.selected().map(|item| item.path.clone()).into_iter().collect()
    } else {
        app.marked.iter().cloned().collect()
    }
}

fn confirm_message(verb: &str, app: &App) -> String {
    if app.marked.len() > 1 {
        format!("{verb} {} items ('v' to list)", app.marked.len())
    } else if let Some(path) = app.marked.iter().next() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        format!("{verb} '{name}'")
    } else {
        let name = app.selected().map(|i| i.name.as_str()).unwrap_or("");
        format!("{verb} '{name}'")
    }
}

/// Marked items as relative paths, sorted, for the confirmation popup.
pub fn marked_listing(app: &App) -> Vec<String> {
    let mut lines: Vec<String> = app
        .marked
        .iter()
        .map(|path| {
            path.strip_prefix(&app.path)
                .map(|rel| rel.display().to_string())
                .unwrap_or_else(|_| path.display().to_string())
        })
        .collect();
    lines.sort();
    lines
}

/// Ask to delete the marked items, or the cursor item when none are marked.
/// A typed count with no marks first marks `count` items from the cursor;
/// those marks are undone if the confirmation is cancelled.
pub fn begin_delete(app: &mut App, typed_count: usize) {
    let mut transient = None;
    if app.marked.is_empty() && typed_count > 0 && !app.items.is_empty() {
        let cursor = app.cursor;
        app.toggle_mark_and_advance(typed_count);
        transient = Some(TransientMarks {
            paths: app.marked.iter().cloned().collect(),
            cursor,
        });
    }
    if app.marked.is_empty() && app.items.is_empty() {
        return;
    }
    app.mode = Mode::Confirm {
        kind: ConfirmKind::Delete,
        message: confirm_message("Delete", app),
        transient,
    };
}

/// Ask to move the marked items (or the cursor item) into the current
/// directory.
pub fn begin_move(app: &mut App) {
    if app.marked.is_empty() && app.items.is_empty() {
        return;
    }
    app.mode = Mode::Confirm {
        kind: ConfirmKind::Move,
        message: confirm_message("Move here", app),
        transient: None,
    };
}

pub fn begin_copy(app: &mut App) {
    if app.marked.is_empty() && app.items.is_empty() {
        return;
    }
    app.mode = Mode::Confirm {
        kind: ConfirmKind::Copy,
        message: confirm_message("Copy here", app),
        transient: None,
    };
}

/// Run the confirmed batch. Stops at the first failure and surfaces it;
/// marks are cleared after any attempt, successful or not.
pub fn perform(app: &mut App, kind: ConfirmKind) -> Result<(), FsError> {
    let targets = batch_targets(app);

    for path in &targets {
        let result = match kind {
            ConfirmKind::Delete => fs_utils::delete(path),
            ConfirmKind::Move => match path.file_name() {
                Some(name) => fs_utils::rename(path, &app.path.join(name)),
                None => Ok(()),
            },
            ConfirmKind::Copy => match path.file_name() {
                Some(name) => {
                    let dst = app.path.join(name);
                    // copying onto itself would truncate the source
                    if dst == *path {
                        Ok(())
                    } else {
                        fs_utils::copy_any(path, &dst)
                    }
                }
                None => Ok(()),
            },
        };
        if let Err(e) = result {
            app.message = Some(e.to_string());
            break;
        }
    }

    app.marked.clear();
    app.mode = Mode::Browse;
    app.refresh()
}

/// Cancel a confirmation, undoing any transient marks it placed.
pub fn cancel(app: &mut App, transient: Option<TransientMarks>) {
    if let Some(t) = transient {
        for path in t.paths {
            app.marked.remove(&path);
        }
        app.cursor = t.cursor;
    }
    app.mode = Mode::Browse;
}

pub fn commit_create_dir(app: &mut App, name: &str) -> Result<(), FsError> {
    if name.is_empty() {
        return Ok(());
    }
    let path = app.path.join(name);
    match fs_utils::create_dir(&path) {
        Err(e) => {
            app.message = Some(e.to_string());
            Ok(())
        }
        Ok(()) => {
            app.refresh()?;
            app.find_exact(name);
            Ok(())
        }
    }
}

pub fn commit_create_file(app: &mut App, name: &str) -> Result<(), FsError> {
    if name.is_empty() {
        return Ok(());
    }
    let path = app.path.join(name);
    match fs_utils::create_file(&path) {
        Err(e) => {
            app.message = Some(e.to_string());
            Ok(())
        }
        Ok(()) => {
            app.refresh()?;
            app.find_exact(name);
            Ok(())
        }
    }
}

pub fn commit_rename(app: &mut App, new_name: &str) -> Result<(), FsError> {
    if new_name.is_empty() {
        return Ok(());
    }
    let Some(item) = app.selected() else {
        return Ok(());
    };
    let old = item.path.clone();
    if let Err(e) = fs_utils::rename(&old, &app.path.join(new_name)) {
        app.message = Some(e.to_string());
    }
    app.refresh()?;
    app.find_exact(new_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            fs::write(temp.path().join(name), "").unwrap();
        }
        let app = App::new(temp.path().to_path_buf()).unwrap();
        (temp, app)
    }

    #[test]
    fn delete_falls_back_to_cursor_item() {
        let (temp, mut app) = fixture();
        app.find_exact("c.txt");
        begin_delete(&mut app, 0);
        assert!(matches!(
            app.mode,
            Mode::Confirm { kind: ConfirmKind::Delete, ref message, .. } if message.contains("c.txt")
        ));

        perform(&mut app, ConfirmKind::Delete).unwrap();
        assert!(!temp.path().join("c.txt").exists());
        assert_eq!(app.items.len(), 4);
    }

    #[test]
    fn delete_removes_every_marked_item() {
        let (temp, mut app) = fixture();
        app.toggle_mark(0);
        app.toggle_mark(2);
        perform(&mut app, ConfirmKind::Delete).unwrap();

        assert!(!temp.path().join("a.txt").exists());
        assert!(!temp.path().join("c.txt").exists());
        assert!(temp.path().join("b.txt").exists());
        assert!(app.marked.is_empty());
    }

    #[test]
    fn counted_delete_marks_transiently_and_cancel_restores() {
        let (_temp, mut app) = fixture();
        app.find_exact("b.txt");
        let cursor_before = app.cursor;
        let marked_before = app.marked.clone();

        begin_delete(&mut app, 3);
        assert_eq!(app.marked.len(), 3);
        let Mode::Confirm { transient, .. } = std::mem::replace(&mut app.mode, Mode::Browse) else {
            panic!("expected confirm mode");
        };

        cancel(&mut app, transient);
        assert_eq!(app.marked, marked_before);
        assert_eq!(app.cursor, cursor_before);
        assert!(matches!(app.mode, Mode::Browse));
    }

    #[test]
    fn cancel_without_transient_keeps_marks() {
        let (_temp, mut app) = fixture();
        app.toggle_mark(0);
        begin_delete(&mut app, 0);
        let Mode::Confirm { transient, .. } = std::mem::replace(&mut app.mode, Mode::Browse) else {
            panic!("expected confirm mode");
        };
        cancel(&mut app, transient);
        assert_eq!(app.marked.len(), 1);
    }

    #[test]
    fn move_brings_marked_items_into_current_dir() {
        let (temp, mut app) = fixture();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.txt"), "x").unwrap();
        app.refresh().unwrap();

        app.marked.insert(sub.join("deep.txt"));
        perform(&mut app, ConfirmKind::Move).unwrap();

        assert!(temp.path().join("deep.txt").exists());
        assert!(!sub.join("deep.txt").exists());
        assert!(app.marked.is_empty());
    }

    #[test]
    fn copy_keeps_the_source() {
        let (temp, mut app) = fixture();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.txt"), "x").unwrap();
        app.refresh().unwrap();

        app.marked.insert(sub.join("deep.txt"));
        perform(&mut app, ConfirmKind::Copy).unwrap();

        assert!(temp.path().join("deep.txt").exists());
        assert!(sub.join("deep.txt").exists());
    }

    #[test]
    fn copy_fallback_onto_itself_keeps_content() {
        let (temp, mut app) = fixture();
        fs::write(temp.path().join("a.txt"), "precious content").unwrap();
        app.find_exact("a.txt");

        perform(&mut app, ConfirmKind::Copy).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("a.txt")).unwrap(),
            "precious content"
        );
        assert!(app.message.is_none());
    }

    #[test]
    fn copy_of_marked_dir_already_in_place_is_skipped() {
        let (temp, mut app) = fixture();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.txt"), "kept").unwrap();
        app.refresh().unwrap();

        app.marked.insert(sub.clone());
        perform(&mut app, ConfirmKind::Copy).unwrap();

        assert_eq!(fs::read_to_string(sub.join("deep.txt")).unwrap(), "kept");
    }

    #[test]
    fn first_failure_stops_the_batch_and_sets_message() {
        let (temp, mut app) = fixture();
        app.marked.insert(temp.path().join("ghost.txt"));
        perform(&mut app, ConfirmKind::Delete).unwrap();
        assert!(app.message.is_some());
        assert!(app.marked.is_empty());
    }

    #[test]
    fn confirm_message_counts_many_marks() {
        let (_temp, mut app) = fixture();
        app.toggle_mark(0);
        app.toggle_mark(1);
        app.toggle_mark(2);
        begin_delete(&mut app, 0);
        let Mode::Confirm { message, .. } = &app.mode else {
            panic!("expected confirm mode");
        };
        assert!(message.contains("3 items"));
    }

    #[test]
    fn marked_listing_is_relative_and_sorted() {
        let (_temp, mut app) = fixture();
        app.find_exact("e.txt");
        app.toggle_mark(app.cursor);
        app.find_exact("a.txt");
        app.toggle_mark(app.cursor);
        assert_eq!(marked_listing(&app), ["a.txt", "e.txt"]);
    }

    #[test]
    fn create_dir_refreshes_and_selects() {
        let (temp, mut app) = fixture();
        commit_create_dir(&mut app, "newdir").unwrap();
        assert!(temp.path().join("newdir").is_dir());
        assert_eq!(app.selected().unwrap().name, "newdir");
    }

    #[test]
    fn create_file_failure_is_a_message_not_an_error() {
        let (_temp, mut app) = fixture();
        commit_create_file(&mut app, "no/such/dir.txt").unwrap();
        assert!(app.message.is_some());
    }

    #[test]
    fn rename_moves_cursor_to_new_name() {
        let (temp, mut app) = fixture();
        app.find_exact("a.txt");
        commit_rename(&mut app, "z.txt").unwrap();
        assert!(temp.path().join("z.txt").exists());
        assert!(!temp.path().join("a.txt").exists());
        assert_eq!(app.selected().unwrap().name, "z.txt");
    }
}
