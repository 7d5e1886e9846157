//! Simulation observer trait for progress reporting and data collection.

use des_core::Time;

/// Callbacks invoked by [`Engine::simulate`][crate::Engine::simulate] at
/// event boundaries.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — event printer
///
/// ```rust,ignore
/// struct EventPrinter;
///
/// impl EngineObserver<f64> for EventPrinter {
///     fn on_event_end(&mut self, t: f64) {
///         println!("processed event at t = {t}");
///     }
/// }
/// ```
pub trait EngineObserver<T: Time> {
    /// Called immediately before the event at `t` is processed.
    fn on_event_start(&mut self, _t: T) {}

    /// Called after the event at `t` has been fully processed.
    fn on_event_end(&mut self, _t: T) {}

    /// Called once when the driver loop ends; `t` is the final clock
    /// (`+∞` if the simulation exhausted its events).
    fn on_sim_end(&mut self, _t: T) {}
}

/// An [`EngineObserver`] that does nothing.  Use when you need to call
/// `simulate` but don't want progress callbacks.
pub struct NoopObserver;

impl<T: Time> EngineObserver<T> for NoopObserver {}
