use crate::domain::UiMode;
use crate::ui::{
    layout::create_modal_area,
    styles::{form_accent_style, form_bg_style},
};
use crate::view::TimelogView;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the delete confirmation modal
pub fn render_confirm_delete_modal(f: &mut Frame, view: &TimelogView, area: Rect) {
    if view.ui_mode != UiMode::ConfirmDelete {
        return;
    }
    let modal_area = create_modal_area(area, 9);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let description = view.fragments().selector.description.clone();
    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  Delete plan {}?", description)),
        Line::raw(""),
        Line::raw("  Records of this plan are kept without a name."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [y]", form_accent_style()),
            Span::raw(" Delete  "),
            Span::styled("[n]", form_accent_style()),
            Span::raw(" Keep  "),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Delete Plan ", form_accent_style()))
                .style(form_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
