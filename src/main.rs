mod actions;
mod app;
mod fs_utils;
mod input;
mod line;
mod mode;
mod search;
mod ui;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

/// Keyboard-driven terminal file browser.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Directory to start in.
    path: Option<PathBuf>,

    /// Print the final directory to stdout on exit, for shell wrappers
    /// like `cd "$(tansu --print-path)"`.
    #[arg(long)]
    print_path: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let start = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let start = start
        .canonicalize()
        .wrap_err_with(|| format!("cannot resolve {}", start.display()))?;

    // Fail on an unreadable start directory before touching the terminal.
    let mut app = App::new(start)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = input::run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;

    if cli.print_path {
        println!("{}", app.path.display());
    }
    Ok(())
}
