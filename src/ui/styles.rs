use crate::domain::ToggleAction;
use ratatui::style::{Color, Modifier, Style};

/// Accent while a plan is running
const RUNNING: Color = Color::LightGreen;
/// Accent while idle
const IDLE: Color = Color::LightBlue;

/// Clock digits showing elapsed time
pub fn clock_running_style() -> Style {
    Style::default().fg(RUNNING).add_modifier(Modifier::BOLD)
}

/// Clock digits showing the wall clock
pub fn clock_idle_style() -> Style {
    Style::default().fg(IDLE)
}

/// Start/stop button: the stop button takes the running accent
pub fn toggle_style(action: ToggleAction) -> Style {
    match action {
        ToggleAction::Start => Style::default().fg(IDLE).add_modifier(Modifier::BOLD),
        ToggleAction::Stop => Style::default().fg(Color::Black).bg(RUNNING).add_modifier(Modifier::BOLD),
    }
}

/// Pane border, tinted while a plan runs
pub fn pane_border_style(running: bool) -> Style {
    Style::default().fg(if running { RUNNING } else { Color::DarkGray })
}

pub fn pane_title_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

/// Selected plan in the selector and the plans table
pub fn selected_plan_style() -> Style {
    Style::default().fg(Color::Black).bg(IDLE)
}

/// "id · name" line next to the selector
pub fn description_style() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

pub fn table_header_style() -> Style {
    Style::default().fg(IDLE).add_modifier(Modifier::UNDERLINED)
}

pub fn record_row_style() -> Style {
    Style::default().fg(Color::White)
}

/// Record whose plan was deleted
pub fn orphan_row_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn form_bg_style() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}

pub fn form_accent_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn info_notice_style() -> Style {
    Style::default().fg(RUNNING)
}

pub fn error_notice_style() -> Style {
    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)
}
