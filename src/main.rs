use std::{
    env,
    io::{
        self,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use anyhow::Context;
use args::Args;
use bridge::Bridge;
use clap::Parser;
use crossterm::event::{
    self,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    utils::format_file_size,
    BatchDeleter,
    ScanOptions,
    Scanner,
    SizeStrategy,
};
use logging::LogPaneWidget;
use ratatui::layout::{
    Constraint,
    Layout,
};
use ui::AppView;

mod args;
mod bridge;
mod logging;
mod term;
mod ui;
mod utils;

fn print_listing(root_path: &Path, size_strategy: SizeStrategy, json: bool) -> anyhow::Result<()> {
    let mut scanner = Scanner::new(ScanOptions {
        size_strategy,
        ..Default::default()
    });
    let result = scanner.scan(root_path)?;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &result)?;
        writeln!(stdout)?;
        return Ok(());
    }

    for entry in result.entries() {
        writeln!(
            stdout,
            "{:>12}  {:<12}  {:<20}  {}",
            format_file_size(entry.size()),
            entry.kind(),
            entry.name(),
            entry.path().display()
        )?;
    }
    writeln!(
        stdout,
        "{} directories, {} total",
        result.len(),
        format_file_size(result.total_size())
    )?;
    Ok(())
}

fn run_interactive(root_path: PathBuf, args: &Args) -> anyhow::Result<()> {
    let mut terminal = term::setup()?;
    let mut view = AppView::new(root_path, args.size_strategy(), args.dry_run);

    let mut quit_requested = false;
    loop {
        terminal.draw(|frame| {
            if args.ui_logger {
                let layout =
                    Layout::horizontal(&[Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(frame.size());

                frame.render_widget(&view, layout[0]);
                frame.render_widget(LogPaneWidget, layout[1]);
            } else {
                frame.render_widget(&view, frame.size());
            }
        })?;

        view.poll();
        if quit_requested && !view.is_busy() {
            break;
        }

        if event::poll(Duration::from_millis(16))? {
            let event = event::read()?;
            view.handle_event(&event);
            if let event::Event::Key(key) = event {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    if !view.is_busy() {
                        break;
                    }

                    /* never leave while a directory is half deleted */
                    view.cancel();
                    quit_requested = true;
                }
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.ui_logger && !args.list && !args.bridge);

    if args.bridge {
        let selected_root = args
            .root
            .as_ref()
            .map(dunce::canonicalize)
            .transpose()
            .context("invalid root path")?;

        let deleter = BatchDeleter::new().with_dry_run(args.dry_run);
        let mut bridge = Bridge::new(args.size_strategy(), deleter, selected_root);
        return bridge.serve(io::stdin().lock(), &mut io::stdout().lock());
    }

    let root_path = match &args.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("failed to get the working directory")?,
    };
    let root_path = match dunce::canonicalize(root_path) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Invalid root path: {:#}", err);
            return Ok(());
        }
    };
    log::debug!("Root path: {}", root_path.display());

    if args.list {
        return print_listing(&root_path, args.size_strategy(), args.json);
    }

    run_interactive(root_path, &args)
}
