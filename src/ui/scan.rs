use std::{
    path::PathBuf,
    sync::{
        mpsc::Receiver,
        Arc,
        Mutex,
    },
    thread::JoinHandle,
    time::{
        Duration,
        Instant,
    },
};

use crossterm::event::Event;
use dirsweep::{
    DirectoryEntry,
    ScanError,
    ScanOptions,
    ScanReport,
    ScanReportConsumer,
    ScanResult,
    Scanner,
    SizeStrategy,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::Stylize,
    text::{
        Line,
        Span,
    },
    widgets::Widget,
};

use super::TargetSelect;
use crate::utils::format_duration;

#[derive(Debug, Default)]
struct UiReportInfo {
    current_path: Option<PathBuf>,
    measuring: bool,
    error_count: usize,
}

struct UiReportConsumer {
    ui_info: Arc<Mutex<UiReportInfo>>,
}

impl ScanReportConsumer for UiReportConsumer {
    fn consume_report(&mut self, report: ScanReport) {
        let Ok(mut ui_info) = self.ui_info.lock() else {
            return;
        };

        match report {
            ScanReport::StatusInspecting(path) => {
                ui_info.current_path = Some(path);
                ui_info.measuring = false;
            }
            ScanReport::StatusMeasuring(path) => {
                ui_info.current_path = Some(path);
                ui_info.measuring = true;
            }
            ScanReport::ErrorFs { .. } => ui_info.error_count += 1,
        }
    }
}

enum ScanState {
    Running(JoinHandle<Result<ScanResult, ScanError>>),
    Finished,
    Failed(String),
}

/// Runs a scan in the background and lets the user pick from the found directories.
pub struct ScanWidget {
    time_started: Instant,
    time_total: Option<Duration>,

    root_path: PathBuf,

    scan_rx: Receiver<DirectoryEntry>,
    scan_state: ScanState,

    target_select: TargetSelect,
    report_info: Arc<Mutex<UiReportInfo>>,
}

impl ScanWidget {
    pub fn new(root_path: PathBuf, size_strategy: SizeStrategy) -> Self {
        let report_info = Arc::new(Mutex::new(UiReportInfo::default()));
        let scanner = Scanner::new(ScanOptions {
            size_strategy,
            report_consumer: Box::new(UiReportConsumer {
                ui_info: report_info.clone(),
            }),
        });

        let (scan_handle, scan_rx) = scanner.spawn(root_path.clone());
        Self {
            root_path: root_path.clone(),

            time_started: Instant::now(),
            time_total: None,

            scan_rx,
            scan_state: ScanState::Running(scan_handle),

            target_select: TargetSelect::new(Some(root_path)),
            report_info,
        }
    }

    pub fn poll(&mut self) {
        while let Ok(entry) = self.scan_rx.try_recv() {
            self.target_select.add_target(entry);
        }

        let ScanState::Running(handle) = &self.scan_state else {
            return;
        };
        if !handle.is_finished() {
            return;
        }

        let ScanState::Running(handle) =
            std::mem::replace(&mut self.scan_state, ScanState::Finished)
        else {
            return;
        };

        self.time_total = Some(self.time_started.elapsed());
        self.scan_state = match handle.join() {
            Ok(Ok(result)) => {
                log::debug!(
                    "Scan finished with {} directories ({} bytes)",
                    result.len(),
                    result.total_size()
                );
                ScanState::Finished
            }
            Ok(Err(error)) => {
                log::error!("{:#}", error);
                ScanState::Failed(error.to_string())
            }
            Err(_) => ScanState::Failed("scanner thread panicked".to_string()),
        };

        /* entries sent right before the worker exited */
        while let Ok(entry) = self.scan_rx.try_recv() {
            self.target_select.add_target(entry);
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        self.target_select.handle_event(event);
    }

    pub fn selected_target_count(&self) -> usize {
        self.target_select.selected_target_count()
    }

    pub fn selected_target_size(&self) -> u64 {
        self.target_select.selected_target_size()
    }

    pub fn remove_selected_targets(&mut self) -> Vec<DirectoryEntry> {
        self.target_select.remove_selected_targets()
    }
}

impl Widget for &ScanWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical(&[Constraint::Percentage(100), Constraint::Length(1)]).split(area);

        let footer = {
            let time_elapsed = self
                .time_total
                .unwrap_or_else(|| self.time_started.elapsed());

            let mut line_segments = Vec::with_capacity(8);
            line_segments.push(Span::raw(format_duration(&time_elapsed)));

            let (current_path, measuring, error_count) = self
                .report_info
                .lock()
                .map(|info| (info.current_path.clone(), info.measuring, info.error_count))
                .unwrap_or_default();

            match &self.scan_state {
                ScanState::Finished => {
                    line_segments.push(Span::raw(format!(" Finished {}", self.root_path.display())));
                }
                ScanState::Failed(error) => {
                    line_segments.push(Span::raw(format!(" {}", error)));
                }
                ScanState::Running(_) => {
                    let current_path = current_path.unwrap_or_else(|| self.root_path.clone());

                    line_segments.push(if measuring { " Measuring ".into() } else { " Searching ".into() });
                    if let Ok(path) = current_path.strip_prefix(&self.root_path) {
                        line_segments.push(Span::raw(format!("{}", self.root_path.join("").display())));
                        line_segments.push(Span::raw(format!("{}", path.display())).italic());
                    } else {
                        line_segments.push(Span::raw(format!("{}", current_path.display())));
                    }
                }
            }

            if error_count > 0 {
                line_segments.push(Span::raw(format!(" ({} unreadable)", error_count)).yellow());
            }

            let text = Line::from(line_segments);
            match self.scan_state {
                ScanState::Finished => text.green(),
                ScanState::Failed(_) => text.red(),
                ScanState::Running(_) => text.blue(),
            }
        };

        self.target_select.render(layout[0], buf);
        footer.render(layout[1], buf);
    }
}
