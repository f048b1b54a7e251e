use std::collections::{HashMap, HashSet};
use std::mem;
use std::path::{Path, PathBuf};

use crate::fs_utils::{self, FsError, Item};
use crate::mode::Mode;

/// The whole navigation state. Owned by the event loop; every render is
/// reproducible from this struct alone.
pub struct App {
    pub path: PathBuf,
    pub prev_path: PathBuf,
    pub start_path: PathBuf,
    pub items: Vec<Item>,
    pub cursor: usize,
    pub anchor: usize,
    pub marked: HashSet<PathBuf>,
    /// Name of the child last selected when leaving each directory.
    pub history: HashMap<PathBuf, String>,
    pub search_query: String,
    pub search_reverse: bool,
    /// Shown once in the footer, cleared on the next key.
    pub message: Option<String>,
    pub mode: Mode,
}

impl App {
    /// List the starting directory. A failure here is fatal: there is no
    /// state to fall back on yet.
    pub fn new(path: PathBuf) -> Result<Self, FsError> {
        let items = fs_utils::list_dir(&path)?;
        Ok(Self {
            prev_path: path.clone(),
            start_path: path.clone(),
            path,
            items,
            cursor: 0,
            anchor: 0,
            marked: HashSet::new(),
            history: HashMap::new(),
            search_query: String::new(),
            search_reverse: false,
            message: None,
            mode: Mode::Browse,
        })
    }

    pub fn selected(&self) -> Option<&Item> {
        self.items.get(self.cursor)
    }

    pub fn move_down(&mut self, count: usize) {
        if !self.items.is_empty() {
            self.cursor = (self.cursor + count.max(1)).min(self.items.len() - 1);
        }
    }

    pub fn move_up(&mut self, count: usize) {
        self.cursor = self.cursor.saturating_sub(count.max(1));
    }

    pub fn move_top(&mut self) {
        self.cursor = 0;
    }

    pub fn move_bottom(&mut self) {
        self.cursor = self.items.len().saturating_sub(1);
    }

    /// Keep the cursor row inside the window of `rows` visible lines.
    /// Recomputed before every draw; never cached across listing changes.
    pub fn scroll(&mut self, rows: usize) {
        let rows = rows.max(1);
        if self.cursor >= self.anchor + rows {
            self.anchor = self.cursor + 1 - rows;
        }
        if self.cursor < self.anchor {
            self.anchor = self.cursor;
        }
    }

    /// Move the cursor to the entry named `name`, if present.
    pub fn find_exact(&mut self, name: &str) {
        if let Some(pos) = self.items.iter().position(|item| item.name == name) {
            self.cursor = pos;
        }
    }

    /// Switch to `target`. On failure the error becomes the pending message
    /// and nothing else changes. On success the cursor lands on the child
    /// recorded when `target` was last left, or at the top.
    pub fn enter(&mut self, target: PathBuf) {
        let items = match fs_utils::list_dir(&target) {
            Ok(items) => items,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };

        if let Some(item) = self.items.get(self.cursor) {
            self.history.insert(self.path.clone(), item.name.clone());
        }
        self.prev_path = mem::replace(&mut self.path, target);
        self.items = items;
        self.cursor = 0;
        self.anchor = 0;

        if let Some(name) = self.history.get(&self.path).cloned() {
            self.find_exact(&name);
        }
    }

    /// Enter the directory under the cursor, if it is one.
    pub fn enter_selected(&mut self) {
        if let Some(item) = self.selected() {
            if item.is_dir {
                self.enter(item.path.clone());
            }
        }
    }

    /// Go up one level, landing on the directory we just left. That child is
    /// guaranteed present in the parent listing, so this beats the generic
    /// history lookup `enter` would do.
    pub fn leave_to_parent(&mut self) {
        let Some(parent) = self.path.parent().map(Path::to_path_buf) else {
            return;
        };
        let child = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        let items = match fs_utils::list_dir(&parent) {
            Ok(items) => items,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };

        if let Some(item) = self.items.get(self.cursor) {
            self.history.insert(self.path.clone(), item.name.clone());
        }
        self.prev_path = mem::replace(&mut self.path, parent);
        self.items = items;
        self.cursor = 0;
        self.anchor = 0;

        if let Some(name) = child {
            self.find_exact(&name);
        }
    }

    /// Re-list the current directory after a mutation. The model just saw
    /// this path exist, so a failure here is fatal and propagates.
    pub fn refresh(&mut self) -> Result<(), FsError> {
        self.items = fs_utils::list_dir(&self.path)?;
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn toggle_mark(&mut self, index: usize) {
        if let Some(item) = self.items.get(index) {
            if !self.marked.remove(&item.path) {
                self.marked.insert(item.path.clone());
            }
        }
    }

    /// Toggle at the cursor up to `max(1, count)` times, advancing after
    /// each toggle and stopping at the end of the listing.
    pub fn toggle_mark_and_advance(&mut self, count: usize) {
        if self.items.is_empty() {
            return;
        }
        for _ in 0..count.max(1) {
            self.toggle_mark(self.cursor);
            if self.cursor + 1 < self.items.len() {
                self.cursor += 1;
            } else {
                break;
            }
        }
    }

    pub fn toggle_all_marks(&mut self) {
        for index in 0..self.items.len() {
            self.toggle_mark(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("docs")).unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("a.txt"), "").unwrap();
        fs::write(temp.path().join("b.txt"), "").unwrap();
        fs::write(temp.path().join("c.txt"), "").unwrap();
        let app = App::new(temp.path().to_path_buf()).unwrap();
        (temp, app)
    }

    #[test]
    fn motions_keep_cursor_in_bounds() {
        let (_temp, mut app) = fixture();
        app.move_up(3);
        assert_eq!(app.cursor, 0);
        app.move_down(100);
        assert_eq!(app.cursor, app.items.len() - 1);
        app.move_down(1);
        assert_eq!(app.cursor, app.items.len() - 1);
        app.move_top();
        assert_eq!(app.cursor, 0);
        app.move_bottom();
        assert_eq!(app.cursor, 4);
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        let (_temp, mut app) = fixture();
        let rows = 2;

        for step in [1usize, 3, 1, 2] {
            app.move_down(step);
            app.scroll(rows);
            assert!(app.anchor <= app.cursor);
            assert!(app.cursor < app.anchor + rows);
        }
        for step in [2usize, 1, 4] {
            app.move_up(step);
            app.scroll(rows);
            assert!(app.anchor <= app.cursor);
            assert!(app.cursor < app.anchor + rows);
        }
    }

    #[test]
    fn enter_then_leave_restores_cursor_to_child() {
        let (_temp, mut app) = fixture();
        app.find_exact("src");
        let src_index = app.cursor;

        app.enter_selected();
        assert!(app.path.ends_with("src"));
        assert_eq!(app.cursor, 0);

        app.leave_to_parent();
        assert_eq!(app.cursor, src_index);
        assert_eq!(app.selected().unwrap().name, "src");
    }

    #[test]
    fn enter_restores_last_visited_child() {
        let (_temp, mut app) = fixture();
        let root = app.path.clone();
        app.find_exact("b.txt");
        app.enter(app.items[0].path.clone()); // into "docs", remembering b.txt
        app.enter(root);
        assert_eq!(app.selected().unwrap().name, "b.txt");
    }

    #[test]
    fn enter_failure_leaves_state_unchanged() {
        let (_temp, mut app) = fixture();
        let before_path = app.path.clone();
        app.move_down(2);
        let before_cursor = app.cursor;

        app.enter(before_path.join("missing"));
        assert!(app.message.is_some());
        assert_eq!(app.path, before_path);
        assert_eq!(app.cursor, before_cursor);
    }

    #[test]
    fn previous_path_tracks_transitions() {
        let (_temp, mut app) = fixture();
        let root = app.path.clone();
        app.find_exact("docs");
        app.enter_selected();
        assert_eq!(app.prev_path, root);

        app.enter(app.prev_path.clone());
        assert!(app.prev_path.ends_with("docs"));
    }

    #[test]
    fn toggling_a_mark_twice_is_identity() {
        let (_temp, mut app) = fixture();
        assert!(app.marked.is_empty());
        app.toggle_mark(1);
        assert_eq!(app.marked.len(), 1);
        app.toggle_mark(1);
        assert!(app.marked.is_empty());
    }

    #[test]
    fn toggle_and_advance_stops_at_listing_end() {
        let (_temp, mut app) = fixture();
        app.cursor = 3;
        app.toggle_mark_and_advance(3);

        assert_eq!(app.cursor, 4);
        assert_eq!(app.marked.len(), 2);
        assert!(app.marked.contains(&app.items[3].path));
        assert!(app.marked.contains(&app.items[4].path));
    }

    #[test]
    fn toggle_all_flips_every_entry() {
        let (_temp, mut app) = fixture();
        app.toggle_mark(0);
        app.toggle_all_marks();
        assert_eq!(app.marked.len(), app.items.len() - 1);
        assert!(!app.marked.contains(&app.items[0].path));
    }

    #[test]
    fn marks_survive_directory_changes() {
        let (_temp, mut app) = fixture();
        app.find_exact("a.txt");
        app.toggle_mark(app.cursor);
        let marked_path = app.selected().unwrap().path.clone();

        app.find_exact("docs");
        app.enter_selected();
        assert!(app.marked.contains(&marked_path));

        app.leave_to_parent();
        assert!(app.marked.contains(&marked_path));
    }

    #[test]
    fn refresh_clamps_cursor_after_shrink() {
        let (temp, mut app) = fixture();
        app.move_bottom();
        fs::remove_file(temp.path().join("b.txt")).unwrap();
        fs::remove_file(temp.path().join("c.txt")).unwrap();
        app.refresh().unwrap();
        assert_eq!(app.cursor, app.items.len() - 1);
    }

    #[test]
    fn empty_directory_keeps_cursor_at_zero() {
        let temp = TempDir::new().unwrap();
        let mut app = App::new(temp.path().to_path_buf()).unwrap();
        assert_eq!(app.cursor, 0);
        app.move_down(5);
        app.move_bottom();
        assert_eq!(app.cursor, 0);
        assert!(app.selected().is_none());
        app.toggle_mark_and_advance(3);
        assert!(app.marked.is_empty());
    }
}
