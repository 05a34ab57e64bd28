use crate::ui::styles::{error_notice_style, hint_style, info_notice_style};
use crate::view::{NoticeLevel, TimelogView};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" ←/→ plan   "),
        Span::raw("Enter/Space start/stop   "),
        Span::raw("a add   "),
        Span::raw("r rename   "),
        Span::raw("x delete   "),
        Span::raw("l reload   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}

/// Render the status bar: current notice, else the open file
pub fn render_status_bar(f: &mut Frame, view: &TimelogView, area: Rect) {
    let line = match &view.notice {
        Some(notice) => {
            let style = match notice.level {
                NoticeLevel::Info => info_notice_style(),
                NoticeLevel::Error => error_notice_style(),
            };
            Line::from(Span::styled(format!(" {}", notice.message), style))
        }
        None => Line::from(Span::styled(
            format!(" {} · {}", view.state().name(), view.file_label()),
            hint_style(),
        )),
    };

    f.render_widget(Paragraph::new(line), area);
}
