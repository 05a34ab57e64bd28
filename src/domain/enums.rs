/// Session state of one timelog, derived from its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No open record
    Idle,
    /// The last record has no stop time yet
    Running,
}

impl SessionState {
    pub fn from_open(is_open: bool) -> Self {
        if is_open {
            Self::Running
        } else {
            Self::Idle
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
        }
    }
}

/// UI mode for the timelog view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    NewPlan,
    RenamePlan,
    ConfirmDelete,
}

/// What the start/stop button does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Start,
    Stop,
}

impl ToggleAction {
    /// Icon shown on the button
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Start => "▶",
            Self::Stop => "■",
        }
    }

    /// Tooltip/label shown next to the icon
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_from_open() {
        assert_eq!(SessionState::from_open(true), SessionState::Running);
        assert_eq!(SessionState::from_open(false), SessionState::Idle);
        assert_eq!(SessionState::Running.name(), "Running");
    }

    #[test]
    fn test_toggle_action_labels() {
        assert_eq!(ToggleAction::Start.icon(), "▶");
        assert_eq!(ToggleAction::Stop.label(), "Stop");
    }
}
