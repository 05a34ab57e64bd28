use crate::clock::Clock;
use crate::domain::{format_timestamp, records_open, Plan, Record, SessionState, Timelog};
use crate::error::{TimelogError, TimelogResult};
use crate::persistence::{decode, encode, FsVault, Vault};
use crate::reactive::{Scope, Signal};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The open record was closed and saved
    Stopped,
    /// Nothing was running
    NotRunning,
    /// Stop landed in the same second as the start; the record stays open
    TooShort,
}

/// In-memory timelog bound to one backing file.
///
/// `plans` and `records` are signals so views can subscribe to them; loading
/// replaces their values in place, which keeps those subscriptions alive.
/// Every mutation saves the whole file before returning. Mutations are
/// refused until a load has succeeded, so a file that failed to parse is
/// never overwritten.
pub struct TimelogStore<V: Vault = FsVault> {
    vault: V,
    path: PathBuf,
    clock: Rc<dyn Clock>,
    plans: Signal<Vec<Plan>>,
    records: Signal<Vec<Record>>,
    /// Modification time of the last load attempt or save
    last_modified: Option<SystemTime>,
    /// The backing file's content is what is in memory
    loaded: bool,
}

impl<V: Vault> TimelogStore<V> {
    /// Store holding the default timelog; call `load` to read the file
    pub fn new(scope: &Scope, vault: V, path: impl Into<PathBuf>, clock: Rc<dyn Clock>) -> Self {
        let defaults = Timelog::default();
        Self {
            vault,
            path: path.into(),
            clock,
            plans: scope.signal(defaults.plans),
            records: scope.signal(defaults.records),
            last_modified: None,
            loaded: false,
        }
    }

    /// Create the store and load the file
    pub fn open(scope: &Scope, vault: V, path: impl Into<PathBuf>, clock: Rc<dyn Clock>) -> TimelogResult<Self> {
        let mut store = Self::new(scope, vault, path, clock);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    pub fn plans(&self) -> &Signal<Vec<Plan>> {
        &self.plans
    }

    pub fn records(&self) -> &Signal<Vec<Record>> {
        &self.records
    }

    pub fn now(&self) -> chrono::NaiveDateTime {
        self.clock.now()
    }

    /// Current aggregate, untracked
    pub fn snapshot(&self) -> Timelog {
        Timelog {
            plans: self.plans.peek(),
            records: self.records.peek(),
        }
    }

    /// Whether the last load succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn ensure_loaded(&self) -> TimelogResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(TimelogError::NotLoaded(self.path_str()))
        }
    }

    /// Read the backing file and replace the in-memory timelog.
    /// Errors propagate; the in-memory state is left untouched and mutations
    /// are refused until a later load succeeds.
    pub fn load(&mut self) -> TimelogResult<Timelog> {
        // Taken before reading so a broken file is retried only once it changes
        self.last_modified = self.vault.modified(&self.path).ok().flatten();

        let decoded = self
            .vault
            .read(&self.path)
            .and_then(|content| decode(&self.path_str(), &content));
        let timelog = match decoded {
            Ok(timelog) => timelog,
            Err(e) => {
                self.loaded = false;
                return Err(e);
            }
        };

        self.plans.set(timelog.plans.clone());
        self.records.set(timelog.records.clone());
        self.loaded = true;

        debug!(
            path = %self.path.display(),
            plans = timelog.plans.len(),
            records = timelog.records.len(),
            "timelog loaded"
        );
        Ok(timelog)
    }

    /// Write the whole timelog back to the file
    pub fn save(&mut self) -> TimelogResult<()> {
        self.ensure_loaded()?;
        let content = encode(&self.snapshot())?;
        self.vault.modify(&self.path, &content)?;
        self.last_modified = self.vault.modified(&self.path)?;
        debug!(path = %self.path.display(), bytes = content.len(), "timelog saved");
        Ok(())
    }

    /// Reload when someone else wrote the file since our last load or save
    pub fn reload_if_changed(&mut self) -> TimelogResult<bool> {
        let modified = self.vault.modified(&self.path)?;
        if modified.is_none() || modified == self.last_modified {
            return Ok(false);
        }
        info!(path = %self.path.display(), "timelog changed on disk, reloading");
        self.load()?;
        Ok(true)
    }

    /// True iff the last record is still open
    pub fn is_open(&self) -> bool {
        self.records.peek_with(|records| records_open(records))
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_open(self.is_open())
    }

    /// Open a new record for `plan_id`
    pub fn start_plan(&mut self, plan_id: &str) -> TimelogResult<()> {
        self.ensure_loaded()?;
        if self.is_open() {
            return Err(TimelogError::AlreadyOpen);
        }
        let start = format_timestamp(self.clock.now());
        info!(plan = plan_id, %start, "plan started");
        self.records.update(|records| records.push(Record::open(start, plan_id)));
        self.save()
    }

    /// Close the open record
    pub fn stop_plan(&mut self) -> TimelogResult<StopOutcome> {
        self.ensure_loaded()?;
        if !self.is_open() {
            return Ok(StopOutcome::NotRunning);
        }
        let stop = format_timestamp(self.clock.now());
        let same_tick = self
            .records
            .peek_with(|records| records.last().is_some_and(|last| last.start == stop));
        if same_tick {
            debug!(%stop, "stop within the start second ignored");
            return Ok(StopOutcome::TooShort);
        }

        info!(%stop, "plan stopped");
        self.records.update(|records| {
            if let Some(last) = records.last_mut() {
                last.stop = stop;
            }
        });
        self.save()?;
        Ok(StopOutcome::Stopped)
    }

    /// Add a plan; ids must be unique
    pub fn create_plan(&mut self, plan: Plan) -> TimelogResult<()> {
        self.ensure_loaded()?;
        if plan.id.trim().is_empty() {
            return Err(TimelogError::MissingField("id"));
        }
        if plan.name.trim().is_empty() {
            return Err(TimelogError::MissingField("name"));
        }
        let existing = self
            .plans
            .peek_with(|plans| plans.iter().find(|p| p.id == plan.id).cloned());
        if let Some(existing) = existing {
            return Err(TimelogError::DuplicatePlanId {
                id: existing.id,
                name: existing.name,
            });
        }

        info!(id = %plan.id, name = %plan.name, "plan created");
        self.plans.update(|plans| plans.push(plan));
        self.save()
    }

    /// Change a plan's display name
    pub fn rename_plan(&mut self, id: &str, name: &str) -> TimelogResult<()> {
        self.ensure_loaded()?;
        if name.trim().is_empty() {
            return Err(TimelogError::MissingField("name"));
        }
        if !self.plans.peek_with(|plans| plans.iter().any(|p| p.id == id)) {
            return Err(TimelogError::NotFound(id.to_string()));
        }

        self.plans.update(|plans| {
            if let Some(plan) = plans.iter_mut().find(|p| p.id == id) {
                plan.name = name.to_string();
            }
        });
        self.save()
    }

    /// Remove a plan. Records pointing at it are kept.
    pub fn delete_plan(&mut self, id: &str) -> TimelogResult<Plan> {
        self.ensure_loaded()?;
        let Some(index) = self.plans.peek_with(|plans| plans.iter().position(|p| p.id == id)) else {
            return Err(TimelogError::NotFound(id.to_string()));
        };

        let mut removed = None;
        self.plans.update(|plans| removed = Some(plans.remove(index)));
        self.save()?;
        removed.ok_or_else(|| TimelogError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{time_sub, TIME_FMT};
    use crate::persistence::FailingVault;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, ManualClock, TimelogStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("时光日志.timelog");
        FsVault.create(&path, content).unwrap();
        let clock = ManualClock::at("2024-03-01 09:00:00");
        let store = TimelogStore::open(&Scope::new(), FsVault, path, Rc::new(clock.clone())).unwrap();
        (temp_dir, clock, store)
    }

    fn assert_single_open_at_end(records: &[Record]) {
        let open: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_open())
            .map(|(i, _)| i)
            .collect();
        assert!(open.len() <= 1);
        if let Some(index) = open.first() {
            assert_eq!(*index, records.len() - 1);
        }
    }

    #[test]
    fn test_start_stop_scenario() {
        let (_dir, clock, mut store) = setup("");
        assert_eq!(store.plans().peek().len(), 3);
        assert!(store.records().peek().is_empty());

        store.start_plan("001").unwrap();
        assert_eq!(store.records().peek().len(), 1);
        assert!(store.is_open());
        assert_eq!(store.state(), SessionState::Running);

        clock.advance_secs(5);
        assert_eq!(store.stop_plan().unwrap(), StopOutcome::Stopped);

        let record = &store.records().peek()[0];
        assert_eq!(record.stop, "2024-03-01 09:00:05");
        assert_eq!(time_sub(&record.start, &record.stop, TIME_FMT), "0000-00-00 00:00:05");
        assert!(!store.is_open());
    }

    #[test]
    fn test_zero_duration_stop_is_suppressed() {
        let (_dir, _clock, mut store) = setup("");
        store.start_plan("001").unwrap();
        assert_eq!(store.stop_plan().unwrap(), StopOutcome::TooShort);
        assert!(store.is_open());
        assert_eq!(store.records().peek()[0].stop, "");
    }

    #[test]
    fn test_start_while_open_is_rejected() {
        let (_dir, clock, mut store) = setup("");
        store.start_plan("001").unwrap();
        clock.advance_secs(3);
        let before = store.records().peek();

        let err = store.start_plan("002").unwrap_err();
        assert!(matches!(err, TimelogError::AlreadyOpen));
        assert_eq!(store.records().peek(), before);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (_dir, _clock, mut store) = setup("");
        let version = store.records().version();
        assert_eq!(store.stop_plan().unwrap(), StopOutcome::NotRunning);
        assert!(store.records().peek().is_empty());
        assert_eq!(store.records().version(), version);
    }

    #[test]
    fn test_at_most_one_open_record() {
        let (_dir, clock, mut store) = setup("");
        let plans = ["001", "002", "003"];
        for step in 0..12 {
            clock.advance_secs(step % 3);
            if step % 2 == 0 {
                let _ = store.start_plan(plans[step as usize % 3]);
            } else {
                store.stop_plan().unwrap();
            }
            assert_single_open_at_end(&store.records().peek());
        }
    }

    #[test]
    fn test_duplicate_plan_is_rejected() {
        let (_dir, _clock, mut store) = setup("");
        let before = store.plans().peek();

        let err = store.create_plan(Plan::new("001", "x")).unwrap_err();
        match err {
            TimelogError::DuplicatePlanId { id, name } => {
                assert_eq!(id, "001");
                assert_eq!(name, "背单词");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.plans().peek(), before);

        assert!(matches!(
            store.create_plan(Plan::new("004", " ")),
            Err(TimelogError::MissingField("name"))
        ));
        store.create_plan(Plan::new("004", "读书")).unwrap();
        assert_eq!(store.plans().peek().len(), 4);
    }

    #[test]
    fn test_rename_and_delete_plan() {
        let (_dir, _clock, mut store) = setup("");
        store.rename_plan("002", "游泳").unwrap();
        assert_eq!(store.plans().peek()[1].name, "游泳");

        assert!(matches!(
            store.rename_plan("missing", "x"),
            Err(TimelogError::NotFound(_))
        ));

        let removed = store.delete_plan("003").unwrap();
        assert_eq!(removed, Plan::new("003", "休息"));
        assert!(matches!(store.delete_plan("003"), Err(TimelogError::NotFound(_))));
    }

    #[test]
    fn test_save_then_fresh_load_is_equal() {
        let (dir, clock, mut store) = setup("");
        store.create_plan(Plan::new("20240301090000", "写作")).unwrap();
        store.start_plan("20240301090000").unwrap();
        clock.advance_secs(90);
        store.stop_plan().unwrap();
        store.start_plan("001").unwrap();

        let path = dir.path().join("时光日志.timelog");
        let fresh = TimelogStore::open(&Scope::new(), FsVault, path, Rc::new(clock.clone())).unwrap();
        assert_eq!(fresh.snapshot(), store.snapshot());
        assert!(fresh.is_open());
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let (dir, _clock, mut store) = setup("");
        store.start_plan("001").unwrap();
        let path = dir.path().join("时光日志.timelog");
        std::fs::write(&path, "{ broken").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, TimelogError::Parse { .. }));
        // In-memory state stays as it was
        assert_eq!(store.records().peek().len(), 1);
    }

    #[test]
    fn test_failed_load_refuses_mutations() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("时光日志.timelog");
        let corrupt = r#"{"plans":[{"id":"mine","name":"precious"}],"records":[{"start":"2024-02"#;
        std::fs::write(&path, corrupt).unwrap();

        let clock = ManualClock::at("2024-03-01 09:00:00");
        let mut store = TimelogStore::new(&Scope::new(), FsVault, &path, Rc::new(clock.clone()));
        assert!(matches!(store.load(), Err(TimelogError::Parse { .. })));
        assert!(!store.is_loaded());

        assert!(matches!(store.start_plan("001"), Err(TimelogError::NotLoaded(_))));
        assert!(matches!(store.stop_plan(), Err(TimelogError::NotLoaded(_))));
        assert!(matches!(
            store.create_plan(Plan::new("004", "x")),
            Err(TimelogError::NotLoaded(_))
        ));
        assert!(matches!(store.rename_plan("001", "x"), Err(TimelogError::NotLoaded(_))));
        assert!(matches!(store.delete_plan("001"), Err(TimelogError::NotLoaded(_))));
        assert!(matches!(store.save(), Err(TimelogError::NotLoaded(_))));

        assert!(store.records().peek().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), corrupt);

        // Fixing the file lifts the refusal
        std::fs::write(&path, r#"{"plans":[{"id":"mine","name":"precious"}]}"#).unwrap();
        store.load().unwrap();
        store.start_plan("mine").unwrap();
        assert!(store.is_open());
    }

    #[test]
    fn test_corrupt_file_is_retried_only_after_it_changes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("时光日志.timelog");
        std::fs::write(&path, "{ broken").unwrap();

        let clock = ManualClock::at("2024-03-01 09:00:00");
        let mut store = TimelogStore::new(&Scope::new(), FsVault, &path, Rc::new(clock.clone()));
        assert!(store.load().is_err());

        for _ in 0..3 {
            clock.advance_secs(1);
            assert!(!store.reload_if_changed().unwrap());
        }

        std::fs::write(&path, r#"{"plans":[{"id":"x","name":"y"}]}"#).unwrap();
        let newer = SystemTime::now() + std::time::Duration::from_secs(5);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(newer)
            .unwrap();

        assert!(store.reload_if_changed().unwrap());
        assert!(store.is_loaded());
        assert_eq!(store.plans().peek(), vec![Plan::new("x", "y")]);
    }

    #[test]
    fn test_failed_save_keeps_mutation_in_memory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("时光日志.timelog");
        let vault = FailingVault::default();
        vault.create(&path, "").unwrap();
        let clock = ManualClock::at("2024-03-01 09:00:00");
        let mut store = TimelogStore::open(&Scope::new(), vault.clone(), &path, Rc::new(clock.clone())).unwrap();

        vault.set_fail_writes(true);
        let err = store.start_plan("001").unwrap_err();
        assert!(matches!(err, TimelogError::Storage(_)));
        assert!(store.is_open());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        clock.advance_secs(5);
        let err = store.stop_plan().unwrap_err();
        assert!(matches!(err, TimelogError::Storage(_)));
        assert!(!store.is_open());
        assert_eq!(store.records().peek()[0].stop, "2024-03-01 09:00:05");

        // The next successful save writes everything kept in memory
        vault.set_fail_writes(false);
        store.save().unwrap();
        let fresh = TimelogStore::open(&Scope::new(), FsVault, &path, Rc::new(clock.clone())).unwrap();
        assert_eq!(fresh.snapshot(), store.snapshot());
    }

    #[test]
    fn test_load_keeps_signal_identity() {
        let (dir, _clock, mut store) = setup("");
        let records = store.records().clone();
        let path = dir.path().join("时光日志.timelog");
        std::fs::write(
            &path,
            r#"{"records":[{"start":"2024-02-01 08:00:00","stop":"","id":"002"}]}"#,
        )
        .unwrap();

        store.load().unwrap();
        assert_eq!(records.peek().len(), 1);
        assert!(store.is_open());
        assert_eq!(store.plans().peek().len(), 3);
    }

    #[test]
    fn test_reload_if_changed() {
        let (dir, _clock, mut store) = setup("");
        assert!(!store.reload_if_changed().unwrap());

        // Another writer replaces the file; make sure the mtime moves
        std::thread::sleep(std::time::Duration::from_millis(20));
        let path = dir.path().join("时光日志.timelog");
        std::fs::write(&path, r#"{"plans":[{"id":"x","name":"y"}]}"#).unwrap();
        let newer = SystemTime::now() + std::time::Duration::from_secs(5);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(newer)
            .unwrap();

        assert!(store.reload_if_changed().unwrap());
        assert_eq!(store.plans().peek(), vec![Plan::new("x", "y")]);
    }
}
