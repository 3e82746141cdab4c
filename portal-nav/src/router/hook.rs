//! Navigation hooks.

use super::table::Match;

/// Code run on every route transition.
///
/// `before_each` runs after the target is resolved and before the router
/// commits it; `after_each` runs once the new location is current. Hooks
/// cannot cancel or redirect a navigation.
pub trait NavigationHook: Send + Sync {
    fn before_each(&self, to: &Match, from: Option<&Match>) {
        let _ = (to, from);
    }

    fn after_each(&self, to: &Match, from: Option<&Match>) {
        let _ = (to, from);
    }
}

/// Hook built from a closure, run before commit.
pub struct BeforeEach<F>(pub F);

impl<F> NavigationHook for BeforeEach<F>
where
    F: Fn(&Match, Option<&Match>) + Send + Sync,
{
    fn before_each(&self, to: &Match, from: Option<&Match>) {
        (self.0)(to, from)
    }
}

/// Hook built from a closure, run after commit.
pub struct AfterEach<F>(pub F);

impl<F> NavigationHook for AfterEach<F>
where
    F: Fn(&Match, Option<&Match>) + Send + Sync,
{
    fn after_each(&self, to: &Match, from: Option<&Match>) {
        (self.0)(to, from)
    }
}
