use crate::domain::Plan;
use crate::ui::styles::{
    orphan_row_style, pane_border_style, pane_title_style, record_row_style, selected_plan_style,
    table_header_style,
};
use crate::view::RecordRow;
use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Row, Table},
    Frame,
};

/// Render the plans table, highlighting the selected plan
pub fn render_plans_table(f: &mut Frame, plans: &[Plan], selected: Option<usize>, area: Rect) {
    let rows = plans.iter().enumerate().map(|(i, plan)| {
        let style = if Some(i) == selected { selected_plan_style() } else { record_row_style() };
        Row::new(vec![plan.id.clone(), plan.name.clone()]).style(style)
    });

    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(8)])
        .header(Row::new(vec!["Id", "Name"]).style(table_header_style()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_border_style(false))
                .title(Span::styled(" Plans ", pane_title_style())),
        );
    f.render_widget(table, area);
}

/// Render the recent records table, newest first
pub fn render_records_table(f: &mut Frame, records: &[RecordRow], area: Rect) {
    let rows = records.iter().map(|record| {
        // Deleted plans leave a blank name
        let style = if record.plan.is_empty() { orphan_row_style() } else { record_row_style() };
        Row::new(vec![
            record.plan.clone(),
            record.duration.clone(),
            record.start.clone(),
            record.stop.clone(),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(8),
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(20),
        ],
    )
    .header(Row::new(vec!["Plan", "Duration", "Start", "Stop"]).style(table_header_style()))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(pane_border_style(false))
            .title(Span::styled(" Recent ", pane_title_style())),
    );
    f.render_widget(table, area);
}
