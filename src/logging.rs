use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{
        Block,
        Borders,
        Widget,
    },
};
use tui_logger::{
    Drain,
    TuiLoggerWidget,
};

/// Initialize the global logger.
///
/// `RUST_LOG` selects the level. With `ui_logger` every record is drained into the
/// split screen log pane instead of being written to stderr, which would corrupt the view.
pub fn init(ui_logger: bool) {
    if ui_logger {
        let tui_log_drain = Drain::new();
        env_logger::builder()
            .format(move |_buf, record| {
                tui_log_drain.log(record);
                Ok(())
            })
            .init();
    } else {
        env_logger::init();
    }
}

pub struct LogPaneWidget;

impl Widget for LogPaneWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block = Block::new().title("Log").borders(Borders::LEFT);
        TuiLoggerWidget::default().block(block).render(area, buf);
    }
}
