//! The shared world: process-wide state built once and referenced by every
//! context.
//!
//! The keyword table lives in the parser as a compile-time `phf` map; what
//! remains here is the environment snapshot (captured exactly once, so
//! later changes to the host environment are never observed), the
//! pre-compiled empty regexp and version metadata.

use std::{
    rc::Rc,
    sync::OnceLock,
};

/// The engine version reported by the `adder` global.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Captured once per process; `process.env` is filled from this snapshot.
static ENV_SNAPSHOT: OnceLock<Vec<(String, String)>> = OnceLock::new();

/// The per-thread shared world.
#[derive(Debug)]
pub struct SharedWorld {
    env: &'static [(String, String)],
    empty_regexp: Rc<regress::Regex>,
}

impl SharedWorld {
    /// Gets (building on first use) the shared world of this thread.
    #[must_use]
    pub fn get() -> Rc<Self> {
        thread_local! {
            static SHARED: Rc<SharedWorld> = Rc::new(SharedWorld::build());
        }
        SHARED.with(Rc::clone)
    }

    fn build() -> Self {
        let env = ENV_SNAPSHOT.get_or_init(|| std::env::vars().collect());
        let empty_regexp = regress::Regex::new("(?:)").expect("the empty pattern compiles");
        Self {
            env: env.as_slice(),
            empty_regexp: Rc::new(empty_regexp),
        }
    }

    /// The environment snapshot, in capture order.
    #[must_use]
    pub fn env(&self) -> &[(String, String)] {
        self.env
    }

    /// The shared empty regexp, used by `new RegExp()`.
    #[must_use]
    pub fn empty_regexp(&self) -> Rc<regress::Regex> {
        Rc::clone(&self.empty_regexp)
    }
}
