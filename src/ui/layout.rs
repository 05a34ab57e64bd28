use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub clock_area: Rect,
    pub toggle_area: Rect,
    pub selector_area: Rect,
    pub plans_area: Rect,
    pub records_area: Rect,
    pub status_area: Rect,
}

/// Create the main layout
/// - Top bar: keybindings (1 row)
/// - Clock face
/// - Controls: toggle button | plan selector
/// - Tables: plans (35%) | recent records (65%)
/// - Bottom bar: status (1 row)
pub fn create_layout(area: Rect) -> MainLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Length(5), // Clock
            Constraint::Length(3), // Controls
            Constraint::Min(0),    // Tables
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(rows[2]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[3]);

    MainLayout {
        keybindings_area: rows[0],
        clock_area: rows[1],
        toggle_area: controls[0],
        selector_area: controls[1],
        plans_area: tables[0],
        records_area: tables[1],
        status_area: rows[4],
    }
}

/// Create centered modal area for forms and confirmations
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}
