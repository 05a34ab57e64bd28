use crate::domain::UiMode;
use crate::ui::{
    layout::create_modal_area,
    styles::{error_notice_style, form_accent_style, form_bg_style},
};
use crate::view::{PlanForm, TimelogView};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn field_lines<'a>(label: &'a str, value: &'a str, editing: bool) -> [Line<'a>; 2] {
    let label = if editing {
        Line::raw(format!("{}: (editing)", label))
    } else {
        Line::raw(format!("{}:", label))
    };
    let value = Line::from(vec![
        Span::raw("> "),
        Span::styled(value, form_accent_style()),
        if editing {
            Span::styled("█", form_accent_style()) // Cursor
        } else {
            Span::raw("")
        },
    ]);
    [label, value]
}

/// Render the new/rename plan form
pub fn render_plan_form(f: &mut Frame, view: &TimelogView, area: Rect) {
    let Some(form) = &view.form else {
        return;
    };
    let modal_area = create_modal_area(area, 12);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let renaming = view.ui_mode == UiMode::RenamePlan;
    let title_text = if renaming { " Rename Plan " } else { " New Plan " };

    let mut lines = vec![Line::raw("")];
    lines.extend(form_fields(form, renaming));
    lines.push(Line::raw(""));

    if let Some(feedback) = &form.feedback {
        lines.push(Line::from(Span::styled(feedback.as_str(), error_notice_style())));
    }
    let instructions = if renaming {
        "Enter to save  ·  Esc to cancel"
    } else {
        "Tab to switch fields  ·  Enter to create  ·  Esc to cancel"
    };
    lines.push(Line::raw(instructions));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title_text, form_accent_style()))
                .style(form_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

fn form_fields(form: &PlanForm, renaming: bool) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    if renaming {
        lines.push(Line::raw(format!("Id: {}", form.id)));
    } else {
        lines.extend(field_lines("Id", &form.id, form.editing_field == 0));
    }
    lines.push(Line::raw(""));
    lines.extend(field_lines("Name", &form.name, form.editing_field == 1));
    lines
}
