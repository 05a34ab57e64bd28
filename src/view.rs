use crate::clock::Clock;
use crate::config::Settings;
use crate::domain::{
    format_timestamp, plan_name, records_open, split_date_time, time_sub, Plan, Record, SessionState,
    ToggleAction, UiMode, PLAN_ID_FMT, TIME_FMT,
};
use crate::error::TimelogError;
use crate::persistence::{FsVault, Vault};
use crate::reactive::{Binder, Scope, Signal};
use crate::store::{StopOutcome, TimelogStore};
use anyhow::Result;
use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

pub const VIEW_TYPE: &str = "time-log-view";
pub const DISPLAY_NAME: &str = "时光日志";

/// How long a notice stays in the status bar
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Lifecycle a file-backed view goes through while it is hosted
pub trait FileView {
    fn view_type(&self) -> &'static str;

    fn display_text(&self) -> String;

    fn can_accept_extension(&self, extension: &str) -> bool;

    /// A file was opened in this view
    fn on_load_file(&mut self, path: &Path) -> Result<()>;

    /// The view is switching away from its current file
    fn on_unload_file(&mut self);

    /// The view is closing; release every subscription
    fn on_close(&mut self);
}

/// Clock fragment output: wall clock when idle, elapsed time when running
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockFace {
    pub date: String,
    pub time: String,
    pub running: bool,
}

/// Plan selector fragment output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorView {
    pub options: Vec<Plan>,
    pub selected: Option<usize>,
    pub description: String,
}

/// One row of the recent records table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub plan: String,
    pub duration: String,
    pub start: String,
    pub stop: String,
}

/// Latest output of every mounted fragment. The renderer only reads this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub clock: ClockFace,
    pub toggle: ToggleAction,
    pub selector: SelectorView,
    pub plans: Vec<Plan>,
    pub records: Vec<RecordRow>,
}

impl Default for Fragments {
    fn default() -> Self {
        Self {
            clock: ClockFace::default(),
            toggle: ToggleAction::Start,
            selector: SelectorView::default(),
            plans: Vec::new(),
            records: Vec::new(),
        }
    }
}

/// Form for creating or renaming a plan
#[derive(Debug, Clone)]
pub struct PlanForm {
    pub id: String,
    pub name: String,
    /// 0 = id, 1 = name. Renaming only edits the name.
    pub editing_field: usize,
    /// Inline validation message
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking status bar message
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub shown_at: Instant,
}

/// View over one timelog file
pub struct TimelogView<V: Vault + Clone = FsVault> {
    settings: Settings,
    vault: V,
    clock: Rc<dyn Clock>,
    scope: Scope,
    binder: Binder,
    /// Formatted "now", refreshed every tick
    now: Signal<String>,
    /// Plan the next start is attributed to
    selected: Signal<String>,
    store: Option<TimelogStore<V>>,
    fragments: Rc<RefCell<Fragments>>,
    pub ui_mode: UiMode,
    pub form: Option<PlanForm>,
    pub notice: Option<Notice>,
    /// Fragments re-rendered by the last flush
    pub last_rendered: Vec<&'static str>,
}

impl<V: Vault + Clone + 'static> TimelogView<V> {
    pub fn new(settings: Settings, vault: V, clock: Rc<dyn Clock>) -> Self {
        let scope = Scope::new();
        let now = scope.signal(format_timestamp(clock.now()));
        let selected = scope.signal(String::new());
        Self {
            settings,
            vault,
            clock,
            binder: Binder::new(&scope),
            scope,
            now,
            selected,
            store: None,
            fragments: Rc::new(RefCell::new(Fragments::default())),
            ui_mode: UiMode::Normal,
            form: None,
            notice: None,
            last_rendered: Vec::new(),
        }
    }

    pub fn fragments(&self) -> Ref<'_, Fragments> {
        self.fragments.borrow()
    }

    pub fn store(&self) -> Option<&TimelogStore<V>> {
        self.store.as_ref()
    }

    pub fn selected_plan_id(&self) -> String {
        self.selected.peek()
    }

    pub fn state(&self) -> SessionState {
        self.store
            .as_ref()
            .map_or(SessionState::Idle, TimelogStore::state)
    }

    pub fn file_label(&self) -> String {
        self.store
            .as_ref()
            .map(|store| store.path().display().to_string())
            .unwrap_or_default()
    }

    /// Subscribe every fragment to the store's signals
    fn mount_fragments(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let plans = store.plans().clone();
        let records = store.records().clone();
        let binder = &mut self.binder;

        let is_open = {
            let records = records.clone();
            binder.derive("is_open", move || records.with(|r| records_open(r)))
        };

        {
            let (now, is_open, records, out) =
                (self.now.clone(), is_open.clone(), records.clone(), Rc::clone(&self.fragments));
            binder.mount("clock", move || {
                let now = now.get();
                // Records are only a dependency while a session is running
                let elapsed = if is_open.get() {
                    let start = records.with(|r| r.last().map(|last| last.start.clone()).unwrap_or_default());
                    time_sub(&start, &now, TIME_FMT)
                } else {
                    String::new()
                };
                let running = !elapsed.is_empty();
                let shown = if running { elapsed.as_str() } else { now.as_str() };
                let (date, time) = split_date_time(shown);
                out.borrow_mut().clock = ClockFace {
                    date: date.to_string(),
                    time: time.to_string(),
                    running,
                };
            });
        }

        {
            let (is_open, out) = (is_open.clone(), Rc::clone(&self.fragments));
            binder.mount("toggle", move || {
                out.borrow_mut().toggle = if is_open.get() {
                    ToggleAction::Stop
                } else {
                    ToggleAction::Start
                };
            });
        }

        {
            let (plans, records, selected) = (plans.clone(), records.clone(), self.selected.clone());
            // Records version this fragment last adopted a selection from
            let mut seen_records = None;
            binder.mount("default_plan", move || {
                let last_used = records.with(|r| r.last().map(|last| last.id.clone()));
                let records_changed = seen_records.replace(records.version()) != Some(records.version());
                let current = selected.peek();
                // Plan edits only re-validate the current selection
                let next = plans.with(|plans| {
                    let known = |id: &str| plans.iter().any(|p| p.id == id);
                    match last_used {
                        Some(id) if records_changed && known(&id) => id,
                        _ if known(&current) => current.clone(),
                        _ => plans.first().map(|p| p.id.clone()).unwrap_or_default(),
                    }
                });
                selected.set(next);
            });
        }

        {
            let (plans, selected, out) = (plans.clone(), self.selected.clone(), Rc::clone(&self.fragments));
            binder.mount("selector", move || {
                let selected = selected.get();
                let options = plans.get();
                let index = options.iter().position(|p| p.id == selected);
                let description = match index {
                    Some(i) => format!("id {} · {}", options[i].id, options[i].name),
                    None => "no plan selected".to_string(),
                };
                out.borrow_mut().selector = SelectorView {
                    options,
                    selected: index,
                    description,
                };
            });
        }

        {
            let (plans, out) = (plans.clone(), Rc::clone(&self.fragments));
            binder.mount("plans_table", move || {
                out.borrow_mut().plans = plans.get();
            });
        }

        {
            let limit = self.settings.recent_records;
            let out = Rc::clone(&self.fragments);
            binder.mount("records_table", move || {
                let rows = plans.with(|plans| records.with(|records| recent_rows(plans, records, limit)));
                out.borrow_mut().records = rows;
            });
        }

        debug!(fragments = binder.len(), "fragments mounted");
    }

    /// Re-render fragments whose dependencies changed
    pub fn flush(&mut self) -> &[&'static str] {
        self.last_rendered = self.binder.flush();
        if !self.last_rendered.is_empty() {
            trace!(rendered = ?self.last_rendered, "flush");
        }
        &self.last_rendered
    }

    /// One clock tick: refresh "now", pick up external edits, expire notices
    pub fn tick(&mut self) {
        self.now.set(format_timestamp(self.clock.now()));

        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.reload_if_changed() {
                error!("failed to reload timelog: {}", e);
                self.notify_error(format!("Reload failed, showing stale data: {}", e));
            }
        }

        if self.notice.as_ref().is_some_and(|n| n.shown_at.elapsed() >= NOTICE_TTL) {
            self.notice = None;
        }

        self.flush();
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            level: NoticeLevel::Info,
            shown_at: Instant::now(),
        });
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            level: NoticeLevel::Error,
            shown_at: Instant::now(),
        });
    }

    /// Start the selected plan, or stop the running one
    pub fn toggle(&mut self) {
        let selected = self.selected.peek();
        let Some(store) = self.store.as_mut() else {
            return;
        };

        let result = if store.is_open() {
            store.stop_plan().map(|outcome| match outcome {
                StopOutcome::Stopped => Some("Stopped".to_string()),
                StopOutcome::TooShort => Some("Less than a second, still running".to_string()),
                StopOutcome::NotRunning => None,
            })
        } else if selected.is_empty() {
            Ok(Some("Create a plan first (a)".to_string()))
        } else {
            let name = store.plans().peek_with(|plans| plan_name(plans, &selected).to_string());
            store.start_plan(&selected).map(|()| Some(format!("Started {}", name)))
        };

        match result {
            Ok(Some(message)) => self.notify(message),
            Ok(None) => {}
            Err(e) => self.report(e),
        }
        self.flush();
    }

    fn report(&mut self, e: TimelogError) {
        if e.is_validation() {
            self.notify_error(e.to_string());
        } else {
            error!("timelog operation failed: {}", e);
            self.notify_error(format!("{} (changes kept in memory)", e));
        }
    }

    fn select_offset(&mut self, forward: bool) {
        let Some(store) = &self.store else {
            return;
        };
        let ids: Vec<String> = store.plans().peek_with(|plans| plans.iter().map(|p| p.id.clone()).collect());
        if ids.is_empty() {
            return;
        }
        let current = ids.iter().position(|id| *id == self.selected.peek());
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
            (None, _) => 0,
        };
        self.selected.set(ids[next].clone());
        self.flush();
    }

    pub fn select_next(&mut self) {
        self.select_offset(true);
    }

    pub fn select_prev(&mut self) {
        self.select_offset(false);
    }

    pub fn open_new_plan_form(&mut self) {
        self.form = Some(PlanForm {
            id: self.clock.now().format(PLAN_ID_FMT).to_string(),
            name: String::new(),
            editing_field: 1,
            feedback: None,
        });
        self.ui_mode = UiMode::NewPlan;
    }

    pub fn open_rename_form(&mut self) {
        let selected = self.selected.peek();
        let plan = self.store.as_ref().and_then(|store| {
            store
                .plans()
                .peek_with(|plans| plans.iter().find(|p| p.id == selected).cloned())
        });
        let Some(plan) = plan else {
            self.notify_error("No plan selected");
            return;
        };
        self.form = Some(PlanForm {
            id: plan.id,
            name: plan.name,
            editing_field: 1,
            feedback: None,
        });
        self.ui_mode = UiMode::RenamePlan;
    }

    pub fn form_toggle_field(&mut self) {
        if self.ui_mode != UiMode::NewPlan {
            return;
        }
        if let Some(form) = &mut self.form {
            form.editing_field = (form.editing_field + 1) % 2;
        }
    }

    pub fn form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.form {
            match form.editing_field {
                0 => form.id.push(c),
                _ => form.name.push(c),
            }
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(form) = &mut self.form {
            match form.editing_field {
                0 => form.id.pop(),
                _ => form.name.pop(),
            };
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Create or rename the plan in the form. Validation errors stay in the
    /// form; the form closes on success.
    pub fn submit_form(&mut self) {
        let (Some(form), Some(store)) = (self.form.as_mut(), self.store.as_mut()) else {
            return;
        };
        let id = form.id.trim().to_string();
        let name = form.name.trim().to_string();

        let result = match self.ui_mode {
            UiMode::NewPlan => store.create_plan(Plan::new(id.clone(), name.clone())),
            UiMode::RenamePlan => store.rename_plan(&id, &name),
            _ => return,
        };

        match result {
            Ok(()) => {
                let message = match self.ui_mode {
                    UiMode::NewPlan => format!("Created plan {}", name),
                    _ => format!("Renamed plan {} to {}", id, name),
                };
                if self.ui_mode == UiMode::NewPlan {
                    self.selected.set(id);
                }
                self.cancel_form();
                self.notify(message);
            }
            Err(e) if e.is_validation() => form.feedback = Some(e.to_string()),
            Err(e) => {
                self.cancel_form();
                self.report(e);
            }
        }
        self.flush();
    }

    pub fn request_delete(&mut self) {
        if self.selected.peek().is_empty() {
            self.notify_error("No plan selected");
            return;
        }
        self.ui_mode = UiMode::ConfirmDelete;
    }

    /// Delete the selected plan if `confirmed`
    pub fn confirm_delete(&mut self, confirmed: bool) {
        self.ui_mode = UiMode::Normal;
        if !confirmed {
            return;
        }
        let selected = self.selected.peek();
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.delete_plan(&selected) {
            Ok(plan) => {
                info!(id = %plan.id, "plan deleted");
                self.notify(format!("Deleted plan {}", plan.name));
            }
            Err(e) => self.report(e),
        }
        self.flush();
    }

    /// Re-read the file from disk
    pub fn reload(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.load() {
            Ok(_) => self.notify("Reloaded"),
            Err(e) => {
                error!("failed to reload timelog: {}", e);
                self.notify_error(format!("Reload failed, showing stale data: {}", e));
            }
        }
        self.flush();
    }
}

/// The last `limit` records, newest first
pub fn recent_rows(plans: &[Plan], records: &[Record], limit: usize) -> Vec<RecordRow> {
    records
        .iter()
        .rev()
        .take(limit)
        .map(|record| RecordRow {
            plan: plan_name(plans, &record.id).to_string(),
            duration: time_sub(&record.start, &record.stop, TIME_FMT),
            start: record.start.clone(),
            stop: record.stop.clone(),
        })
        .collect()
}

impl<V: Vault + Clone + 'static> FileView for TimelogView<V> {
    fn view_type(&self) -> &'static str {
        VIEW_TYPE
    }

    fn display_text(&self) -> String {
        DISPLAY_NAME.to_string()
    }

    fn can_accept_extension(&self, extension: &str) -> bool {
        extension == self.settings.file_ext
    }

    fn on_load_file(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "opening timelog");
        self.on_unload_file();

        let store = TimelogStore::new(&self.scope, self.vault.clone(), path, Rc::clone(&self.clock));
        self.store = Some(store);
        self.mount_fragments();

        // A file that can't be read still gets a view; it shows the defaults
        // and the error until the file is fixed and reloaded.
        let loaded = self.store.as_mut().map(TimelogStore::load);
        if let Some(Err(e)) = loaded {
            error!("failed to load timelog: {}", e);
            self.notify_error(format!("Could not load {}: {}", path.display(), e));
        }
        self.flush();
        Ok(())
    }

    fn on_unload_file(&mut self) {
        if let Some(store) = self.store.take() {
            debug!(path = %store.path().display(), "unloading timelog");
        }
        self.binder.dispose();
        *self.fragments.borrow_mut() = Fragments::default();
    }

    fn on_close(&mut self) {
        self.on_unload_file();
        self.cancel_form();
        info!("timelog view closed");
    }
}
