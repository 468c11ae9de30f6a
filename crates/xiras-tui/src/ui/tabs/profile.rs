use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use xiras_core::OperationKind;

use crate::app::App;
use crate::ui::styles;

/// Width of the label column ("Email:" plus padding)
const LABEL_WIDTH: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let ctrl = &app.controller;
    let mut lines = vec![Line::from("")];

    if ctrl.is_loading(OperationKind::Profile) {
        lines.push(Line::from(Span::styled(" Fetching data...", styles::highlight_style())));
        lines.push(Line::from(""));
    }

    if let Some(err) = ctrl.error(OperationKind::Profile) {
        lines.push(Line::from(Span::styled(format!(" {}", err), styles::error_style())));
        lines.push(Line::from(""));
    }

    match ctrl.profile() {
        Some(profile) => {
            for (label, value) in profile.display_rows() {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {:<width$}", format!("{}:", label), width = LABEL_WIDTH),
                        styles::label_style(),
                    ),
                    Span::styled(value, styles::list_item_style()),
                ]));
            }
        }
        None if !ctrl.is_loading(OperationKind::Profile) => {
            lines.push(Line::from(vec![
                Span::styled(" No data loaded. Press ", styles::muted_style()),
                Span::styled("r", styles::help_key_style()),
                Span::styled(" to load your data.", styles::muted_style()),
            ]));
        }
        None => {}
    }

    let block = Block::default()
        .title(Span::styled(" Student Information ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
