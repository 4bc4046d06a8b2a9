use std::path::PathBuf;

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    utils::format_file_size,
    SizeStrategy,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    text::Text,
    widgets::{
        Block,
        Borders,
        Clear,
        Paragraph,
        Widget,
        Wrap,
    },
};

use super::{
    ScanWidget,
    SweepingWidget,
};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    NoSelection,
    ConfirmDelete { count: usize, size: u64 },
}

pub enum AppView {
    TargetSelect {
        view: ScanWidget,
        popup: Option<Popup>,
        dry_run: bool,
    },
    Sweeping {
        view: SweepingWidget,
    },
}

impl AppView {
    pub fn new(root_path: PathBuf, size_strategy: SizeStrategy, dry_run: bool) -> Self {
        Self::TargetSelect {
            view: ScanWidget::new(root_path, size_strategy),
            popup: None,
            dry_run,
        }
    }

    pub fn poll(&mut self) {
        match self {
            Self::TargetSelect { view, .. } => view.poll(),
            Self::Sweeping { view, .. } => view.poll(),
        }
    }

    /// True while directories are being deleted.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Sweeping { view } if view.is_running())
    }

    pub fn cancel(&self) {
        if let Self::Sweeping { view } = self {
            view.cancel();
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match self {
            Self::TargetSelect {
                view,
                popup,
                dry_run,
            } => {
                let Event::Key(key) = event else {
                    return;
                };
                if key.kind != KeyEventKind::Press {
                    if popup.is_none() {
                        view.handle_event(event);
                    }
                    return;
                }

                match (*popup, key.code) {
                    (Some(Popup::NoSelection), KeyCode::Enter | KeyCode::Esc) => *popup = None,
                    (Some(Popup::ConfirmDelete { .. }), KeyCode::Char('y') | KeyCode::Enter) => {
                        let targets = view.remove_selected_targets();
                        log::info!("Deleting {} directories", targets.len());

                        *self = Self::Sweeping {
                            view: SweepingWidget::new(targets, *dry_run),
                        };
                    }
                    (Some(Popup::ConfirmDelete { .. }), KeyCode::Char('n') | KeyCode::Esc) => {
                        *popup = None
                    }
                    (Some(_), _) => {}
                    (None, KeyCode::Enter) => {
                        let count = view.selected_target_count();
                        *popup = Some(if count == 0 {
                            Popup::NoSelection
                        } else {
                            Popup::ConfirmDelete {
                                count,
                                size: view.selected_target_size(),
                            }
                        });
                    }
                    (None, _) => view.handle_event(event),
                }
            }
            Self::Sweeping { view, .. } => view.handle_event(event),
        }
    }
}

impl Widget for &AppView {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        match self {
            AppView::TargetSelect {
                view,
                popup,
                dry_run,
            } => {
                view.render(area, buf);

                let Some(popup) = popup else {
                    return;
                };

                let (title, text) = match popup {
                    Popup::NoSelection => (
                        "No targets".to_string(),
                        "Please select at least one directory to delete".to_string(),
                    ),
                    Popup::ConfirmDelete { count, size } => (
                        if *dry_run {
                            "Confirm deletion (dry run)".to_string()
                        } else {
                            "Confirm deletion".to_string()
                        },
                        format!(
                            "Delete {} directories ({})? This can not be undone. [y/n]",
                            count,
                            format_file_size(*size)
                        ),
                    ),
                };

                let block = Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .on_gray();
                let area = utils::centered_rect(60, 20, area);

                let popup = Paragraph::new(Text::raw(text))
                    .wrap(Wrap { trim: true })
                    .block(block);

                Clear::render(Clear, area, buf);
                popup.render(area, buf);
            }
            AppView::Sweeping { view } => view.render(area, buf),
        }
    }
}
