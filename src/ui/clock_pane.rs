use crate::ui::styles::{
    clock_idle_style, clock_running_style, description_style, pane_border_style, pane_title_style,
    selected_plan_style, toggle_style,
};
use crate::view::{ClockFace, SelectorView};
use crate::domain::ToggleAction;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn pane(title: &str, running: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border_style(running))
        .title(Span::styled(title, pane_title_style()))
}

/// Render the clock face: wall clock when idle, elapsed time when running
pub fn render_clock_pane(f: &mut Frame, clock: &ClockFace, area: Rect) {
    let style = if clock.running { clock_running_style() } else { clock_idle_style() };
    let title = if clock.running { " Elapsed " } else { " Now " };

    let lines = vec![
        Line::from(Span::styled(clock.date.as_str(), style)),
        Line::from(Span::styled(clock.time.as_str(), style)),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(pane(title, clock.running));
    f.render_widget(paragraph, area);
}

/// Render the start/stop button
pub fn render_toggle_button(f: &mut Frame, toggle: ToggleAction, area: Rect) {
    let label = Line::from(Span::styled(
        format!("{} {}", toggle.icon(), toggle.label()),
        toggle_style(toggle),
    ));

    let paragraph = Paragraph::new(label)
        .alignment(Alignment::Center)
        .block(pane("", toggle == ToggleAction::Stop));
    f.render_widget(paragraph, area);
}

/// Render the plan selector with its description
pub fn render_selector(f: &mut Frame, selector: &SelectorView, area: Rect) {
    let mut spans = Vec::new();
    for (i, plan) in selector.options.iter().enumerate() {
        if Some(i) == selector.selected {
            spans.push(Span::styled(format!(" {} ", plan.name), selected_plan_style()));
        } else {
            spans.push(Span::raw(format!(" {} ", plan.name)));
        }
    }
    spans.push(Span::styled(format!("  {}", selector.description), description_style()));

    let paragraph = Paragraph::new(Line::from(spans)).block(pane(" Plan ", false));
    f.render_widget(paragraph, area);
}
