//! Discovery cache.
//!
//! One slot per marker kind, each filled on first read by scanning the
//! registry's current target and reused until reset or overwritten. Slots are
//! `OnceLock`s: a registry shared between threads scans each slot once even
//! when the first reads race.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::locator::{EntryPoint, locate};
use crate::marker::Marker;
use crate::target::ScanTarget;

/// Lazily discovered middleware, applications and commands for one scan
/// target.
pub struct Registry {
    target: Arc<dyn ScanTarget>,
    middlewares: OnceLock<Vec<EntryPoint>>,
    applications: OnceLock<Vec<EntryPoint>>,
    commands: OnceLock<Vec<EntryPoint>>,
}

impl Registry {
    /// An empty registry. Nothing is scanned until a slot is read.
    pub fn new(target: impl ScanTarget + 'static) -> Self {
        Self::from_arc(Arc::new(target))
    }

    pub fn from_arc(target: Arc<dyn ScanTarget>) -> Self {
        Self {
            target,
            middlewares: OnceLock::new(),
            applications: OnceLock::new(),
            commands: OnceLock::new(),
        }
    }

    pub fn target(&self) -> &dyn ScanTarget { self.target.as_ref() }

    pub fn middlewares(&self) -> &[EntryPoint] { self.slot(Marker::Middleware) }
    pub fn applications(&self) -> &[EntryPoint] { self.slot(Marker::Application) }
    pub fn commands(&self) -> &[EntryPoint] { self.slot(Marker::Command) }

    pub fn set_middlewares(&mut self, entries: Vec<EntryPoint>) { self.set(Marker::Middleware, entries) }
    pub fn set_applications(&mut self, entries: Vec<EntryPoint>) { self.set(Marker::Application, entries) }
    pub fn set_commands(&mut self, entries: Vec<EntryPoint>) { self.set(Marker::Command, entries) }

    /// Looks up a discovered command by bare or full name. The registry only
    /// finds commands; routing and running them is up to the caller.
    pub fn command(&self, name: &str) -> Option<&EntryPoint> {
        self.commands().iter().find(|e| e.is_named(name))
    }

    /// Looks up a discovered application by bare or full name.
    pub fn application(&self, name: &str) -> Option<&EntryPoint> {
        self.applications().iter().find(|e| e.is_named(name))
    }

    /// Scans the current target for all three markers now, replacing
    /// whatever the slots held.
    pub fn populate(&mut self) {
        for marker in Marker::ALL {
            let entries = locate(self.target.as_ref(), marker);
            self.set(marker, entries);
        }
    }

    /// Empties every slot. The next read scans again.
    pub fn reset(&mut self) {
        for marker in Marker::ALL {
            *self.cell_mut(marker) = OnceLock::new();
        }
        debug!(target_name = self.target.name(), "registry reset");
    }

    /// Points later scans at `target`. Slots that are already filled keep
    /// their contents; call [`Registry::reset`] or [`Registry::populate`] to
    /// rescan them.
    pub fn retarget(&mut self, target: impl ScanTarget + 'static) {
        self.target = Arc::new(target);
    }

    fn slot(&self, marker: Marker) -> &[EntryPoint] {
        self.cell(marker).get_or_init(|| {
            debug!(target_name = self.target.name(), %marker, "populating registry slot");
            locate(self.target.as_ref(), marker)
        })
    }

    fn set(&mut self, marker: Marker, entries: Vec<EntryPoint>) {
        debug!(%marker, count = entries.len(), "registry slot set");
        *self.cell_mut(marker) = OnceLock::from(entries);
    }

    fn cell(&self, marker: Marker) -> &OnceLock<Vec<EntryPoint>> {
        match marker {
            Marker::Application => &self.applications,
            Marker::Middleware  => &self.middlewares,
            Marker::Command     => &self.commands,
        }
    }

    fn cell_mut(&mut self, marker: Marker) -> &mut OnceLock<Vec<EntryPoint>> {
        match marker {
            Marker::Application => &mut self.applications,
            Marker::Middleware  => &mut self.middlewares,
            Marker::Command     => &mut self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::{fixture, rstest};

    use super::*;
    use crate::chain::Next;
    use crate::target::{Declaration, Unit};

    /// Wraps a unit and counts how often it is scanned.
    struct Counting {
        unit: Unit,
        scans: Arc<AtomicUsize>,
    }

    impl ScanTarget for Counting {
        fn name(&self) -> &str { self.unit.name() }

        fn declarations(&self) -> Vec<Declaration> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.unit.declarations()
        }
    }

    fn unit() -> Unit {
        Unit::new("app")
            .middleware("log", |req, next: Next<'_>| next.run(req))
            .application("main", |_req| ())
            .command("deploy", |_req| 0)
            .command("status", |_req| 0)
    }

    #[fixture]
    fn counted() -> (Registry, Arc<AtomicUsize>) {
        let scans = Arc::new(AtomicUsize::new(0));
        let target = Counting { unit: unit(), scans: Arc::clone(&scans) };
        (Registry::new(target), scans)
    }

    #[rstest]
    fn nothing_scanned_until_read(counted: (Registry, Arc<AtomicUsize>)) {
        let (_registry, scans) = counted;
        assert_eq!(scans.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn repeated_reads_scan_once(counted: (Registry, Arc<AtomicUsize>)) {
        let (registry, scans) = counted;
        assert_eq!(registry.commands().len(), 2);
        assert_eq!(registry.commands().len(), 2);
        assert_eq!(scans.load(Ordering::SeqCst), 1);

        assert_eq!(registry.applications().len(), 1);
        assert_eq!(scans.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn set_overrides_without_scanning(counted: (Registry, Arc<AtomicUsize>)) {
        let (mut registry, scans) = counted;
        registry.set_applications(Vec::new());
        assert!(registry.applications().is_empty());
        assert_eq!(scans.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn reset_forces_a_rescan(counted: (Registry, Arc<AtomicUsize>)) {
        let (mut registry, scans) = counted;
        registry.set_middlewares(Vec::new());
        registry.reset();
        assert_eq!(registry.middlewares().len(), 1);
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn populate_scans_every_slot(counted: (Registry, Arc<AtomicUsize>)) {
        let (mut registry, scans) = counted;
        registry.populate();
        assert_eq!(scans.load(Ordering::SeqCst), 3);
        registry.middlewares();
        registry.applications();
        registry.commands();
        assert_eq!(scans.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    fn retarget_keeps_filled_slots() {
        let mut registry = Registry::new(unit());
        assert_eq!(registry.applications().len(), 1);

        registry.retarget(Unit::new("other").application("a", |_req| ()).application("b", |_req| ()));
        assert_eq!(registry.applications().len(), 1);
        assert_eq!(registry.commands().len(), 0);

        registry.reset();
        assert_eq!(registry.applications().len(), 2);
    }

    #[rstest]
    fn commands_are_found_by_name() {
        let registry = Registry::new(unit());
        assert_eq!(registry.command("deploy").map(EntryPoint::full_name).as_deref(), Some("app::deploy"));
        assert!(registry.command("app::status").is_some());
        assert!(registry.command("missing").is_none());
        assert!(registry.application("main").is_some());
    }

    #[test]
    fn shared_registry_scans_once_across_threads() {
        let scans = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new(Counting { unit: unit(), scans: Arc::clone(&scans) });

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(registry.applications().len(), 1));
            }
        });
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }
}
