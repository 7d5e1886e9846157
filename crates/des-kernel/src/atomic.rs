//! Atomic model contract and its kernel-supplied state machine.

use des_core::{Common, PortList, Time};

use crate::error::KernelResult;

#[cfg(not(feature = "unchecked"))]
use crate::error::KernelError;

/// User-defined leaf dynamics — the main extension point for model authors.
///
/// The kernel owns the surrounding state (`tl`, `tn`, port bundles) and
/// calls these hooks at the right moments:
///
/// - [`init`][Self::init] once at simulation start; the returned duration
///   schedules the first internal event.
/// - [`delta`][Self::delta] at every transition.  `e` is the time elapsed
///   since the previous transition.  When `x` is non-empty the transition
///   is external or confluent; when empty, internal.  The returned
///   duration schedules the next internal event (`Time::INFINITY` to
///   become passive).
/// - [`lambda`][Self::lambda] at every internal event, immediately before
///   the transition; writes output values into `y`.
///
/// # Thread safety
///
/// The parallel transition policy may run `delta` for sibling models
/// concurrently, so implementations must be `Send`.  State shared between
/// siblings would break the independence contract; keep per-model state in
/// the implementing type itself.
pub trait AtomicModel<T: Time, V>: Send {
    fn init(&mut self, common: &Common, t: T) -> T;

    fn delta(&mut self, e: T, x: &PortList<V>) -> T;

    fn lambda(&self, y: &mut PortList<V>);
}

// ── Kernel-supplied steps ─────────────────────────────────────────────────────

pub(crate) fn start<T: Time, V>(
    dynamics: &mut dyn AtomicModel<T, V>,
    common: &Common,
    t: T,
    tl: &mut T,
    tn: &mut T,
) {
    *tl = t;
    *tn = t.add(dynamics.init(common, t));
}

pub(crate) fn transition<T: Time, V>(
    dynamics: &mut dyn AtomicModel<T, V>,
    t: T,
    x: &mut PortList<V>,
    tl: &mut T,
    tn: &mut T,
) -> KernelResult<()> {
    #[cfg(not(feature = "unchecked"))]
    {
        if !(*tl <= t && t <= *tn) {
            return Err(KernelError::sync("atomic transition", *tl, t, *tn));
        }
        // Not imminent and nothing received: should not have been scheduled.
        if t < *tn && x.is_empty() {
            return Ok(());
        }
    }
    *tn = t.add(dynamics.delta(t.sub(*tl), x));
    *tl = t;
    x.clear();
    Ok(())
}

pub(crate) fn output<T: Time, V>(
    dynamics: &dyn AtomicModel<T, V>,
    t: T,
    tn: T,
    y: &mut PortList<V>,
) {
    if t == tn {
        dynamics.lambda(y);
    }
}
