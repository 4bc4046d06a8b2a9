use std::{
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        mpsc::{
            self,
            Receiver,
        },
        Arc,
    },
    thread::{
        self,
        JoinHandle,
    },
    time::Instant,
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    utils::format_file_size,
    BatchDeleter,
    DeleteProgress,
    DeletionOutcome,
    DirectoryEntry,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::{
        Color,
        Style,
        Stylize,
    },
    text::{
        Line,
        Span,
    },
    widgets::{
        Gauge,
        List,
        ListItem,
        Widget,
    },
};

use crate::utils::format_duration;

enum TargetStatus {
    Pending,
    Deleted,
    Failed(String),
}

/// Deletes the confirmed targets on a worker thread and shows the progress.
pub struct SweepingWidget {
    targets: Vec<(DirectoryEntry, TargetStatus)>,
    deleter: BatchDeleter,
    cancel_flag: Arc<AtomicBool>,

    time_started: Instant,
    percent: u8,

    progress_rx: Receiver<DeleteProgress>,
    delete_handle: Option<JoinHandle<Vec<DeletionOutcome>>>,
    outcomes: Option<Vec<DeletionOutcome>>,
}

impl SweepingWidget {
    pub fn new(targets: Vec<DirectoryEntry>, dry_run: bool) -> Self {
        Self::spawn(
            targets,
            BatchDeleter::new().with_dry_run(dry_run),
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn spawn(
        targets: Vec<DirectoryEntry>,
        deleter: BatchDeleter,
        cancel_flag: Arc<AtomicBool>,
    ) -> Self {
        let paths = targets
            .iter()
            .map(|target| target.path().to_owned())
            .collect::<Vec<_>>();

        let deleter = deleter.with_cancel_flag(cancel_flag.clone());
        let (progress_tx, progress_rx) = mpsc::channel();
        let delete_handle = thread::spawn({
            let deleter = deleter.clone();
            move || {
                deleter.delete_many(&paths, &mut |progress: DeleteProgress| {
                    let _ = progress_tx.send(progress);
                })
            }
        });

        Self {
            targets: targets
                .into_iter()
                .map(|target| (target, TargetStatus::Pending))
                .collect(),
            deleter,
            cancel_flag,

            time_started: Instant::now(),
            percent: 0,

            progress_rx,
            delete_handle: Some(delete_handle),
            outcomes: None,
        }
    }

    pub fn poll(&mut self) {
        while let Ok(progress) = self.progress_rx.try_recv() {
            self.percent = progress.percent;
            log::debug!(
                "Deleted {}/{} ({}%)",
                progress.completed,
                progress.total,
                progress.percent
            );
        }

        if !self
            .delete_handle
            .as_ref()
            .map_or(false, |handle| handle.is_finished())
        {
            return;
        }
        let Some(handle) = self.delete_handle.take() else {
            return;
        };

        let outcomes = match handle.join() {
            Ok(outcomes) => outcomes,
            Err(_) => {
                log::error!("Delete worker panicked");
                Vec::new()
            }
        };

        for ((_, status), outcome) in self.targets.iter_mut().zip(&outcomes) {
            *status = match &outcome.error {
                None => TargetStatus::Deleted,
                Some(error) => TargetStatus::Failed(error.clone()),
            };
        }

        let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
        log::info!(
            "Deleted {} of {} directories in {}",
            outcomes.len() - failed,
            outcomes.len(),
            format_duration(&self.time_started.elapsed())
        );
        self.outcomes = Some(outcomes);
    }

    /// True while the worker is still deleting.
    pub fn is_running(&self) -> bool {
        self.outcomes.is_none()
    }

    fn is_cancelling(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Let the directory currently being removed finish and skip all remaining ones.
    pub fn cancel(&self) {
        if !self.is_running() || self.is_cancelling() {
            return;
        }

        log::info!("Cancelling deletion after the current directory");
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else {
            return;
        };

        if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
            self.cancel();
        }
    }
}

impl Widget for &SweepingWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);

        let title = {
            let size_total = self
                .targets
                .iter()
                .map(|(target, _)| target.size())
                .sum::<u64>();

            let prefix = if self.deleter.is_dry_run() {
                "Dry run: deleting"
            } else {
                "Deleting"
            };
            let text = match &self.outcomes {
                None if self.is_cancelling() => {
                    "Cancelling, waiting for the current directory to finish".to_string()
                }
                None => format!(
                    "{} {} directories ({}). Press Esc to cancel.",
                    prefix,
                    self.targets.len(),
                    format_file_size(size_total)
                ),
                Some(outcomes) => {
                    let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
                    format!(
                        "Finished: {} deleted, {} failed. Press q to quit.",
                        outcomes.len() - failed,
                        failed
                    )
                }
            };
            Line::raw(text)
        };

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .percent(self.percent.min(100) as u16);

        let list = List::new(self.targets.iter().map(|(target, status)| {
            let mut segments = vec![
                match status {
                    TargetStatus::Pending => Span::raw("[ ]"),
                    TargetStatus::Deleted => Span::raw("[X]").green(),
                    TargetStatus::Failed(_) => Span::raw("[!]").red(),
                },
                Span::raw(format!(" {:>12} ", format_file_size(target.size()))),
                Span::raw(format!("{}", target.path().display())),
            ];
            if let TargetStatus::Failed(error) = status {
                segments.push(Span::raw(format!(" {}", error)).red());
            }
            ListItem::new(Line::from(segments))
        }));

        title.render(layout[0], buf);
        gauge.render(layout[1], buf);
        list.render(layout[2], buf);
    }
}
