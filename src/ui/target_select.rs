use std::{
    cell::RefCell,
    path::{
        Path,
        PathBuf,
    },
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    utils::format_file_size,
    DirectoryEntry,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Alignment,
        Constraint,
        Layout,
        Rect,
    },
    style::Stylize,
    text::{
        Line,
        Span,
        Text,
    },
    widgets::{
        Cell,
        Paragraph,
        Row,
        Table,
        Widget,
    },
};

use super::ScrollableText;

struct TargetSelectState {
    entry: DirectoryEntry,
    selected: bool,

    ui_path: ScrollableText,
}

/// Table of found directories, ordered by size (largest first).
pub struct TargetSelect {
    targets: Vec<TargetSelectState>,

    cursor_current: usize,
    view_offset: usize,
    view_height: RefCell<usize>,

    strip_root_path: Option<PathBuf>,

    select_all: bool,
}

impl TargetSelect {
    pub fn new(strip_root_path: Option<PathBuf>) -> Self {
        Self {
            targets: Vec::new(),

            cursor_current: 0,
            view_offset: 0,
            view_height: RefCell::new(100),

            strip_root_path,

            select_all: false,
        }
    }

    pub fn add_target(&mut self, entry: DirectoryEntry) {
        let path_text = match &self.strip_root_path {
            Some(root_path) => match entry.path().strip_prefix(root_path) {
                Ok(path) => format!("{}", Path::new(".").join(path).display()),
                Err(_) => format!("{}", entry.path().display()),
            },
            None => format!("{}", entry.path().display()),
        };

        let index = self
            .targets
            .partition_point(|target| target.entry.size() >= entry.size());

        /* keep the cursor on the same row */
        if index <= self.cursor_current && !self.targets.is_empty() {
            self.cursor_current += 1;
        }

        self.targets.insert(
            index,
            TargetSelectState {
                ui_path: ScrollableText::new(path_text),
                entry,
                selected: false,
            },
        );
    }

    pub fn selected_target_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|target| target.selected)
            .count()
    }

    pub fn selected_target_size(&self) -> u64 {
        self.targets
            .iter()
            .filter(|target| target.selected)
            .map(|target| target.entry.size())
            .sum()
    }

    pub fn remove_selected_targets(&mut self) -> Vec<DirectoryEntry> {
        let (selected, remaining) = self
            .targets
            .drain(..)
            .partition::<Vec<_>, _>(|target| target.selected);

        self.targets = remaining;
        self.cursor_current = 0;
        self.view_offset = 0;

        selected.into_iter().map(|target| target.entry).collect()
    }

    fn cursor_target_mut(&mut self) -> Option<&mut TargetSelectState> {
        self.targets.get_mut(self.cursor_current)
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(event) = event else { return };
        if event.code == KeyCode::Char(' ') && event.kind == KeyEventKind::Press {
            if self.select_all {
                let selected = self
                    .cursor_target_mut()
                    .map_or(false, |target| target.selected);
                for target in self.targets.iter_mut() {
                    target.selected = !selected;
                }
            } else if let Some(target) = self.cursor_target_mut() {
                target.selected = !target.selected;
            }
        }

        if self.targets.is_empty() {
            return;
        }

        if event.code == KeyCode::Down
            && matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
            && self.cursor_current + 1 < self.targets.len()
        {
            self.set_cursor_index(self.cursor_current + 1);
        }

        if event.code == KeyCode::Up
            && matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
            && self.cursor_current > 0
        {
            self.set_cursor_index(self.cursor_current - 1);
        }

        if event.code == KeyCode::PageDown && event.kind == KeyEventKind::Press {
            self.set_cursor_index(self.targets.len());
        }

        if event.code == KeyCode::PageUp && event.kind == KeyEventKind::Press {
            self.set_cursor_index(0);
        }

        if event.code == KeyCode::Char('a') && event.kind == KeyEventKind::Press {
            self.select_all = !self.select_all;
        }
    }

    fn set_cursor_index(&mut self, index: usize) {
        let index = index.min(self.targets.len().saturating_sub(1));
        let view_height = self.view_height.borrow().saturating_sub(1).max(1);

        if index >= self.view_offset + view_height {
            self.view_offset = index + 1 - view_height;
        }
        if index < self.view_offset + 1 {
            self.view_offset = index.saturating_sub(1);
        }

        self.cursor_current = index;
        self.select_all = false;
        if let Some(target) = self.cursor_target_mut() {
            target.ui_path.reset_scroll();
        }
    }
}

impl Widget for &TargetSelect {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
        *self.view_height.borrow_mut() = layout[0].height as usize;

        let content = {
            let mut rows = Vec::with_capacity(layout[0].height as usize);

            let width_layout = Layout::horizontal([
                Constraint::Length(16), // Checkbox + space + size + space
                Constraint::Length(21), // Project name + space
                Constraint::Fill(1),    // Path
                Constraint::Length(14), // Kind + left space
            ])
            .split(layout[0]);

            let max_path_text_width = width_layout[2].width as usize;

            for (index, target) in self.targets.iter().enumerate().skip(self.view_offset) {
                let target_selected = if target.selected { "X" } else { " " };

                let row = Row::new(vec![
                    Cell::new(format!("[{}]", target_selected)),
                    Cell::new(
                        Text::from(format_file_size(target.entry.size())).alignment(Alignment::Right),
                    ),
                    Cell::new(target.entry.name()),
                    Cell::new(if index == self.cursor_current {
                        target.ui_path.display_value(max_path_text_width)
                    } else {
                        target.ui_path.fixed_value(max_path_text_width)
                    }),
                    Cell::new(target.entry.kind().dir_name()),
                ]);
                let row = if index == self.cursor_current || self.select_all {
                    row.on_gray()
                } else {
                    row
                };

                rows.push(row);
            }

            Table::new(
                rows,
                &[
                    Constraint::Length(3),
                    Constraint::Length(12),
                    Constraint::Length(20),
                    Constraint::Fill(1),
                    Constraint::Length(12),
                ],
            )
            .header(Row::new(vec![
                Cell::new(""),
                Cell::new("Size"),
                Cell::new("Project"),
                Cell::new("Path"),
                Cell::new("Type"),
            ]))
        };

        let footer = {
            let size_total = self
                .targets
                .iter()
                .map(|target| target.entry.size())
                .sum::<u64>();

            let count_selected = self.selected_target_count();
            let text_total = Span::raw(format!(
                "{} total {}",
                self.targets.len(),
                format_file_size(size_total),
            ));

            let text_selected = if count_selected == 0 {
                Span::raw("No selection")
            } else {
                Span::raw(format!(
                    "{} selected {}",
                    count_selected,
                    format_file_size(self.selected_target_size()),
                ))
            };
            Paragraph::new(Line::from_iter([
                text_total,
                " | ".into(),
                text_selected,
                " | space select, a all, enter delete, q quit".dark_gray(),
            ]))
        };

        content.render(layout[0], buf);
        footer.render(layout[1], buf);
    }
}
