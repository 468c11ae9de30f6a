use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use xiras_core::utils::truncate_string;
use xiras_core::OperationKind;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let ctrl = &app.controller;

    let title = match ctrl.courses() {
        Some(courses) => format!(" Courses ({}) ", courses.len()),
        None => " Courses ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let mut notices = Vec::new();
    if ctrl.is_loading(OperationKind::Courses) {
        notices.push(Line::from(Span::styled(" Fetching courses...", styles::highlight_style())));
    }
    if let Some(err) = ctrl.error(OperationKind::Courses) {
        notices.push(Line::from(Span::styled(format!(" {}", err), styles::error_style())));
    }

    let courses = match ctrl.courses() {
        Some(courses) if !courses.is_empty() => courses,
        Some(_) => {
            notices.push(Line::from(Span::styled(" No courses found.", styles::muted_style())));
            render_notices(frame, notices, block, area);
            return;
        }
        None => {
            if !ctrl.is_loading(OperationKind::Courses) {
                notices.push(Line::from(vec![
                    Span::styled(" Press ", styles::muted_style()),
                    Span::styled("c", styles::help_key_style()),
                    Span::styled(" to load your courses.", styles::muted_style()),
                ]));
            }
            render_notices(frame, notices, block, area);
            return;
        }
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(notices.len() as u16), Constraint::Min(1)])
        .split(inner);

    frame.render_widget(Paragraph::new(notices), chunks[0]);

    let label_width = (chunks[1].width as usize).saturating_sub(8);
    let items: Vec<ListItem> = courses
        .iter()
        .enumerate()
        .map(|(i, label)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:>3}. ", i + 1), styles::muted_style()),
                Span::styled(truncate_string(label, label_width), styles::list_item_style()),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(styles::selected_style());
    let mut state = ListState::default();
    state.select(Some(app.course_selection));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_notices(frame: &mut Frame, notices: Vec<Line>, block: Block, area: Rect) {
    let mut lines = vec![Line::from("")];
    lines.extend(notices);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
