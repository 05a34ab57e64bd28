pub mod clock_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod modal;
pub mod styles;
pub mod tables;

use crate::domain::UiMode;
use crate::view::TimelogView;
use clock_pane::{render_clock_pane, render_selector, render_toggle_button};
use input_form::render_plan_form;
use keybindings::{render_keybindings, render_status_bar};
use layout::create_layout;
use modal::render_confirm_delete_modal;
use ratatui::Frame;
use tables::{render_plans_table, render_records_table};

/// Main render function - draws the entire UI from the latest fragments
pub fn render(f: &mut Frame, view: &TimelogView) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area);

    {
        let fragments = view.fragments();
        render_clock_pane(f, &fragments.clock, layout.clock_area);
        render_toggle_button(f, fragments.toggle, layout.toggle_area);
        render_selector(f, &fragments.selector, layout.selector_area);
        render_plans_table(f, &fragments.plans, fragments.selector.selected, layout.plans_area);
        render_records_table(f, &fragments.records, layout.records_area);
    }

    render_status_bar(f, view, layout.status_area);

    match view.ui_mode {
        UiMode::NewPlan | UiMode::RenamePlan => render_plan_form(f, view, size),
        UiMode::ConfirmDelete => render_confirm_delete_modal(f, view, size),
        UiMode::Normal => {}
    }
}
