//! Fine-grained reactive state for the timelog view.
//!
//! A [`Scope`] hands out [`Signal`]s. Every signal carries a version that is
//! bumped when its value actually changes. [`Binder`] entries record which
//! signal versions they read on their last run; [`Binder::flush`] re-runs only
//! the entries holding a stale version. Dependencies are captured again on
//! every run, so a fragment that reads a signal conditionally only depends on
//! it while the condition holds.
//!
//! Everything lives on the UI thread, hence `Rc` and `RefCell`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{trace, warn};

pub type SignalId = usize;

/// Versions read during one tracked run
type Deps = BTreeMap<SignalId, u64>;

/// Bound on re-run passes per flush; entries that keep invalidating each
/// other stop here
const MAX_FLUSH_PASSES: usize = 8;

#[derive(Default)]
struct Runtime {
    versions: RefCell<Vec<u64>>,
    tracking: RefCell<Vec<Deps>>,
}

impl Runtime {
    fn version(&self, id: SignalId) -> u64 {
        self.versions.borrow().get(id).copied().unwrap_or_default()
    }

    fn bump(&self, id: SignalId) {
        if let Some(version) = self.versions.borrow_mut().get_mut(id) {
            *version += 1;
        }
    }

    fn record_read(&self, id: SignalId) {
        let version = self.version(id);
        if let Some(frame) = self.tracking.borrow_mut().last_mut() {
            frame.insert(id, version);
        }
    }
}

/// Owner of a set of signals
#[derive(Clone, Default)]
pub struct Scope {
    rt: Rc<Runtime>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal holding `value`
    pub fn signal<T>(&self, value: T) -> Signal<T> {
        let id = {
            let mut versions = self.rt.versions.borrow_mut();
            versions.push(0);
            versions.len() - 1
        };
        Signal {
            id,
            value: Rc::new(RefCell::new(value)),
            rt: Rc::clone(&self.rt),
        }
    }

    /// Run `f` and return the signal versions it read
    fn track<R>(&self, f: impl FnOnce() -> R) -> (R, Deps) {
        self.rt.tracking.borrow_mut().push(Deps::new());
        let out = f();
        let deps = self.rt.tracking.borrow_mut().pop().unwrap_or_default();
        (out, deps)
    }

    fn is_stale(&self, deps: &Deps) -> bool {
        deps.iter().any(|(id, seen)| self.rt.version(*id) != *seen)
    }
}

/// Shared observable value. Clones point at the same cell.
pub struct Signal<T> {
    id: SignalId,
    value: Rc<RefCell<T>>,
    rt: Rc<Runtime>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
            rt: Rc::clone(&self.rt),
        }
    }
}

impl<T> Signal<T> {
    /// Times the value has changed since creation
    pub fn version(&self) -> u64 {
        self.rt.version(self.id)
    }

    /// Borrow the value, tracking the read
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.rt.record_read(self.id);
        f(&self.value.borrow())
    }

    /// Borrow the value without tracking
    pub fn peek_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn peek(&self) -> T {
        self.peek_with(T::clone)
    }
}

impl<T: PartialEq> Signal<T> {
    /// Replace the value. Readers are only invalidated if it differs.
    pub fn set(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        *self.value.borrow_mut() = value;
        self.rt.bump(self.id);
        true
    }
}

impl<T: Clone + PartialEq> Signal<T> {
    /// Mutate a copy of the value and store it if anything changed
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.peek();
        f(&mut next);
        self.set(next)
    }
}

struct Entry {
    name: &'static str,
    deps: Deps,
    run: Box<dyn FnMut()>,
}

/// Keeps derived values and rendered fragments in step with their signals
pub struct Binder {
    scope: Scope,
    entries: Vec<Entry>,
}

impl Binder {
    pub fn new(scope: &Scope) -> Self {
        Self {
            scope: scope.clone(),
            entries: Vec::new(),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a value computed from other signals.
    ///
    /// The returned signal only changes version when the computed value
    /// changes, so readers of a derived flag are not woken by unrelated edits
    /// to its inputs. Register derivations before the fragments reading them.
    pub fn derive<T, F>(&mut self, name: &'static str, compute: F) -> Signal<T>
    where
        T: PartialEq + 'static,
        F: Fn() -> T + 'static,
    {
        let (initial, deps) = self.scope.track(&compute);
        let signal = self.scope.signal(initial);
        let target = signal.clone();
        self.entries.push(Entry {
            name,
            deps,
            run: Box::new(move || {
                target.set(compute());
            }),
        });
        signal
    }

    /// Register a fragment and render it once
    pub fn mount(&mut self, name: &'static str, mut render: impl FnMut() + 'static) {
        let ((), deps) = self.scope.track(&mut render);
        trace!(fragment = name, deps = deps.len(), "mounted");
        self.entries.push(Entry {
            name,
            deps,
            run: Box::new(render),
        });
    }

    /// Re-run every entry whose dependencies changed, in registration order,
    /// until nothing is stale. Returns the names of the entries that ran.
    pub fn flush(&mut self) -> Vec<&'static str> {
        let mut ran = Vec::new();
        for _ in 0..MAX_FLUSH_PASSES {
            let mut any = false;
            for entry in &mut self.entries {
                if !self.scope.is_stale(&entry.deps) {
                    continue;
                }
                let run = &mut entry.run;
                let ((), deps) = self.scope.track(|| run());
                entry.deps = deps;
                ran.push(entry.name);
                any = true;
            }
            if !any {
                return ran;
            }
        }
        warn!(passes = MAX_FLUSH_PASSES, "reactive flush did not settle");
        ran
    }

    /// Drop every subscription
    pub fn dispose(&mut self) {
        self.entries.clear();
    }
}
