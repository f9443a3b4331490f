//! Entry-point locator.

use tracing::{debug, warn};

use crate::marker::Marker;
use crate::target::{Callable, ScanTarget};

/// A discovered function, tagged with the marker it was found under.
///
/// Identity is the declaring scope plus the function name (and the marker,
/// since the same function can be found under several).
#[derive(Clone, Debug)]
pub struct EntryPoint {
    scope: String,
    name: String,
    marker: Marker,
    callable: Callable,
}

impl EntryPoint {
    pub fn scope(&self) -> &str { &self.scope }
    pub fn name(&self) -> &str { &self.name }
    pub fn marker(&self) -> Marker { self.marker }
    pub fn callable(&self) -> &Callable { &self.callable }

    /// `scope::name`, e.g. `"my_tool::cli::deploy"`.
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.scope, self.name)
    }

    /// Matches either the bare function name or the full name.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
            || name
                .strip_prefix(self.scope.as_str())
                .and_then(|rest| rest.strip_prefix("::"))
                .is_some_and(|rest| rest == self.name)
    }
}

impl PartialEq for EntryPoint {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.name == other.name && self.marker == other.marker
    }
}

impl Eq for EntryPoint {}

/// Returns every declaration in `target` carrying exactly `marker`, in
/// declaration order.
///
/// An empty result is not an error. Declarations whose function shape cannot
/// serve the marker are skipped.
pub fn locate(target: &dyn ScanTarget, marker: Marker) -> Vec<EntryPoint> {
    let found: Vec<EntryPoint> = target
        .declarations()
        .into_iter()
        .filter(|decl| decl.carries(marker))
        .filter_map(|decl| {
            let entry = format!("{}::{}", decl.scope, decl.name);
            if !decl.callable.fits(marker) {
                warn!(
                    target_name = target.name(),
                    %entry,
                    %marker,
                    shape = ?decl.callable,
                    "skipping entry point: function shape does not fit marker"
                );
                return None;
            }
            debug!(%entry, %marker, "located");
            Some(EntryPoint {
                scope: decl.scope,
                name: decl.name,
                marker,
                callable: decl.callable,
            })
        })
        .collect();

    debug!(target_name = target.name(), %marker, count = found.len(), "scan complete");
    found
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::chain::Next;
    use crate::target::{Declaration, Unit};

    #[fixture]
    fn unit() -> Unit {
        Unit::new("app")
            .application("main", |_req| ())
            .middleware("log", |req, next: Next<'_>| next.run(req))
            .command("deploy", |_req| 0)
            .declare(
                Declaration::handler("app", "status", |_req| ())
                    .marked(Marker::Application)
                    .marked(Marker::Command),
            )
            .in_scope("app::admin")
            .command("deploy", |_req| 1)
    }

    fn names(found: &[EntryPoint]) -> Vec<String> {
        found.iter().map(EntryPoint::full_name).collect()
    }

    #[rstest]
    #[case(Marker::Application, &["app::main", "app::status"])]
    #[case(Marker::Middleware, &["app::log"])]
    #[case(Marker::Command, &["app::deploy", "app::status", "app::admin::deploy"])]
    fn exact_marker_in_declaration_order(
        unit: Unit,
        #[case] marker: Marker,
        #[case] expected: &[&str],
    ) {
        let found = locate(&unit, marker);
        assert_eq!(names(&found), expected);
        assert!(found.iter().all(|e| e.marker() == marker));
    }

    #[rstest]
    fn empty_target_yields_nothing() {
        assert!(locate(&Unit::new("empty"), Marker::Application).is_empty());
    }

    #[rstest]
    fn unmarked_declarations_are_invisible() {
        let unit = Unit::new("app").declare(Declaration::handler("app", "helper", |_req| ()));
        for marker in Marker::ALL {
            assert!(locate(&unit, marker).is_empty());
        }
    }

    #[rstest]
    fn mismatched_shape_is_skipped() {
        let unit = Unit::new("app")
            .declare(Declaration::handler("app", "bogus", |_req| ()).marked(Marker::Middleware));
        assert!(locate(&unit, Marker::Middleware).is_empty());
    }

    #[rstest]
    fn names_resolve_bare_or_full(unit: Unit) {
        let commands = locate(&unit, Marker::Command);
        let admin = &commands[2];
        assert!(admin.is_named("deploy"));
        assert!(admin.is_named("app::admin::deploy"));
        assert!(!admin.is_named("app::deploy"));
        assert_ne!(commands[0], commands[2]);
    }
}
