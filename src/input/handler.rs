use crate::domain::UiMode;
use crate::view::TimelogView;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the view should quit.
pub fn handle_key(view: &mut TimelogView, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }
    match view.ui_mode {
        UiMode::Normal => handle_normal_mode(view, key),
        UiMode::NewPlan | UiMode::RenamePlan => handle_plan_form_mode(view, key),
        UiMode::ConfirmDelete => handle_confirm_delete_mode(view, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(view: &mut TimelogView, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Plan selection
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            view.select_prev();
            Ok(false)
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('j') => {
            view.select_next();
            Ok(false)
        }

        // Start/stop
        KeyCode::Enter | KeyCode::Char(' ') => {
            view.toggle();
            Ok(false)
        }

        // Plans
        KeyCode::Char('a') | KeyCode::Char('A') => {
            view.open_new_plan_form();
            Ok(false)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            view.open_rename_form();
            Ok(false)
        }
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
            view.request_delete();
            Ok(false)
        }

        // Re-read the file
        KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::F(5) => {
            view.reload();
            Ok(false)
        }

        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Ok(true),

        _ => Ok(false),
    }
}

/// Handle keys in the new/rename plan form
fn handle_plan_form_mode(view: &mut TimelogView, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => view.submit_form(),
        KeyCode::Esc => view.cancel_form(),
        KeyCode::Tab => view.form_toggle_field(),
        KeyCode::Backspace => view.form_backspace(),
        KeyCode::Char(c) => view.form_add_char(c),
        _ => {}
    }
    Ok(false)
}

/// Handle keys in the delete confirmation
fn handle_confirm_delete_mode(view: &mut TimelogView, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => view.confirm_delete(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => view.confirm_delete(false),
        _ => {}
    }
    Ok(false)
}
