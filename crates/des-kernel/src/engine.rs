//! The simulation driver.
//!
//! Three operations form the driver surface: [`pre`][Engine::pre]
//! (initialize), [`run`][Engine::run] (advance one event), and
//! [`post`][Engine::post] (finalization hook).  A typical loop:
//!
//! ```rust,ignore
//! let engine = Engine::new();
//! let mut t = engine.pre(&mut root, 0.0);
//! while t < t_end {
//!     t = engine.run(&mut root, t)?;
//! }
//! engine.post(&mut root, t);
//! ```
//!
//! [`simulate`][Engine::simulate] packages that loop with observer hooks.

use std::sync::Arc;

use des_core::{Common, Time};

use crate::error::KernelResult;
use crate::model::Model;
use crate::observer::EngineObserver;

#[cfg(not(feature = "unchecked"))]
use crate::error::KernelError;

/// The simulation driver: owns the shared configuration bag and advances a
/// root model event by event.
pub struct Engine {
    common: Arc<Common>,
}

impl Engine {
    /// An engine with an empty configuration bag.
    pub fn new() -> Self {
        Self::with_common(Common::new())
    }

    /// An engine carrying experiment-wide configuration; the bag is handed
    /// to every model's `init` and retained by executives for runtime
    /// child insertion.
    pub fn with_common(common: Common) -> Self {
        Self {
            common: Arc::new(common),
        }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    /// Initialize the root at `t` and return its first event time.
    pub fn pre<T: Time, V: Clone + Send + 'static>(&self, root: &mut Model<T, V>, t: T) -> T {
        root.start(&self.common, t);
        root.tn
    }

    /// Advance the root through the event at `t`; returns the next event
    /// time.
    ///
    /// `t` must be the root's current `tn`.  Calling with `t = +∞` (a root
    /// with no remaining events) returns `+∞` without side effects.
    pub fn run<T: Time, V: Clone + Send + 'static>(
        &self,
        root: &mut Model<T, V>,
        t: T,
    ) -> KernelResult<T> {
        if !t.is_finite() {
            return Ok(T::INFINITY);
        }
        #[cfg(not(feature = "unchecked"))]
        if t != root.tn {
            return Err(KernelError::sync("engine run", root.tl, t, root.tn));
        }
        root.output(t)?;
        root.transition(t)?;
        root.x.clear();
        Ok(root.tn)
    }

    /// Finalization hook; currently a no-op placeholder.
    pub fn post<T: Time, V: Clone + Send + 'static>(&self, _root: &mut Model<T, V>, _t: T) {}

    /// Drive the root from `t0` until `t_end` or event exhaustion, calling
    /// observer hooks at each event boundary.  Returns the final clock.
    pub fn simulate<T: Time, V: Clone + Send + 'static>(
        &self,
        root: &mut Model<T, V>,
        t0: T,
        t_end: T,
        observer: &mut dyn EngineObserver<T>,
    ) -> KernelResult<T> {
        let mut t = self.pre(root, t0);
        while t.is_finite() && t < t_end {
            observer.on_event_start(t);
            let next = self.run(root, t)?;
            observer.on_event_end(t);
            t = next;
        }
        self.post(root, t);
        observer.on_sim_end(t);
        Ok(t)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
