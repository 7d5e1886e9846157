//! Coupled model — hierarchical container with a routing function.
//!
//! The kernel drives each event at a coupled model in two sweeps:
//!
//! ```text
//! output(t)      ① collect the imminent set (heap entries with tn == t)
//!                ② fire each imminent child's output, top-down
//!                ③ post: route non-empty outputs to recipients' inputs
//!                ④ clear consumed outputs
//! transition(t)  ① bag := imminent set
//!                ② route own border input via post({SELF}, …)
//!                ③ bag ∪= everyone routing marked as pending input
//!                ④ apply the transition policy over the bag
//!                ⑤ tl := t, tn := heap top
//! ```
//!
//! The pending-input set (`last_output_list`) survives from the output
//! sweep into the transition sweep of the same event time; the bag is fully
//! identified before any member transitions.

use std::collections::BTreeSet;

use slab::Slab;
use std::sync::Arc;

use des_core::{Common, PortList, Time};

use crate::error::KernelResult;
use crate::heap::EventHeap;
use crate::model::{ChildId, Model};
use crate::policy::TransitionPolicy;
use crate::route::RouteCtx;

#[cfg(not(feature = "unchecked"))]
use crate::error::KernelError;

/// User-defined coupled network — children plus routing.
///
/// # Contract
///
/// [`children`][Self::children] is called exactly once, from the kernel's
/// `start`, and transfers ownership of the child models to the kernel; ids
/// are assigned in vector order starting at `ChildId(0)`.
///
/// [`post`][Self::post] is the routing function.  `out` is the set of
/// models whose outputs are pending: child ids for children whose `y` is
/// non-empty, and [`ChildId::SELF`] when the coupled model's own border
/// input is being forwarded (or, on executives, when the executive's own
/// lambda fired).  Implementations read source ports and move values
/// through the [`RouteCtx`]; recipients of values transition at the
/// current event time.  Moving values is what schedules a recipient —
/// inspecting ports does not.
pub trait CoupledModel<T: Time, V>: Send {
    fn children(&mut self, common: &Common) -> Vec<Model<T, V>>;

    fn post(&self, out: &BTreeSet<ChildId>, ctx: &mut RouteCtx<'_, T, V>) -> KernelResult<()>;
}

// ── Kernel state ──────────────────────────────────────────────────────────────

pub(crate) struct CoupledState<T: Time, V> {
    pub(crate) dynamics: Box<dyn CoupledModel<T, V>>,
    pub(crate) children: Slab<Model<T, V>>,
    pub(crate) heap: EventHeap<T>,
    /// Children whose input was filled by routing since the last
    /// transition; merged into the next transition bag.
    pub(crate) last_output_list: BTreeSet<ChildId>,
    pub(crate) policy: TransitionPolicy,
}

impl<T: Time, V> CoupledState<T, V> {
    pub(crate) fn new(dynamics: Box<dyn CoupledModel<T, V>>, policy: TransitionPolicy) -> Self {
        Self {
            dynamics,
            children: Slab::new(),
            heap: EventHeap::new(),
            last_output_list: BTreeSet::new(),
            policy,
        }
    }
}

// ── Kernel steps ──────────────────────────────────────────────────────────────

pub(crate) fn start<T: Time, V: Clone + Send + 'static>(
    state: &mut CoupledState<T, V>,
    common: &Arc<Common>,
    t: T,
    tl: &mut T,
    tn: &mut T,
) {
    for mut child in state.dynamics.children(common) {
        child.start(common, t);
        let key = state.children.insert(child);
        let handle = state.heap.emplace(ChildId(key as u32), state.children[key].tn);
        state.children[key].heapid = handle;
    }
    *tl = t;
    *tn = top_tn(&state.heap);
}

pub(crate) fn output<T: Time, V: Clone + Send + 'static>(
    state: &mut CoupledState<T, V>,
    t: T,
    x: &PortList<V>,
    y: &mut PortList<V>,
    tn: T,
) -> KernelResult<()> {
    #[cfg(not(feature = "unchecked"))]
    if let Some((top, _)) = state.heap.top() {
        if t != top || tn != top {
            return Err(KernelError::sync_top("coupled output", t, tn, top));
        }
    }

    if t == tn && !state.heap.is_empty() {
        let mut imminent = Vec::new();
        state.heap.imminent_into(t, &mut imminent);

        // Fire output functions top-down; remember who actually produced.
        let mut sources = BTreeSet::new();
        for &id in &imminent {
            let child = &mut state.children[id.index()];
            child.output(t)?;
            if !child.y.is_empty() {
                sources.insert(id);
            }
        }

        let CoupledState {
            dynamics,
            children,
            last_output_list,
            ..
        } = state;
        let mut ctx = RouteCtx {
            children,
            own_x: x,
            own_y: y,
            chi_x: None,
            chi_y: None,
            inputs: last_output_list,
        };
        dynamics.post(&sources, &mut ctx)?;

        // Outputs consumed.
        for &id in &sources {
            state.children[id.index()].y.clear();
        }
    }
    Ok(())
}

pub(crate) fn transition<T: Time, V: Clone + Send + 'static>(
    state: &mut CoupledState<T, V>,
    t: T,
    x: &mut PortList<V>,
    y: &mut PortList<V>,
    tl: &mut T,
    tn: &mut T,
) -> KernelResult<()> {
    #[cfg(not(feature = "unchecked"))]
    {
        if !(*tl <= t && t <= *tn) {
            return Err(KernelError::sync("coupled transition", *tl, t, *tn));
        }
        if t < *tn && x.is_empty() {
            return Ok(());
        }
    }

    let mut imminent = Vec::new();
    state.heap.imminent_into(t, &mut imminent);
    let mut bag: BTreeSet<ChildId> = imminent.into_iter().collect();

    // Forward external input down into the network.
    if !x.is_empty() {
        let CoupledState {
            dynamics,
            children,
            last_output_list,
            ..
        } = &mut *state;
        let mut own = BTreeSet::new();
        own.insert(ChildId::SELF);
        let mut ctx = RouteCtx {
            children,
            own_x: x,
            own_y: y,
            chi_x: None,
            chi_y: None,
            inputs: last_output_list,
        };
        dynamics.post(&own, &mut ctx)?;
        x.clear();
    }

    for &id in &state.last_output_list {
        // A plain coupled model cannot be its own recipient.
        debug_assert!(id != ChildId::SELF, "SELF routed into a coupled bag");
        if id != ChildId::SELF {
            bag.insert(id);
        }
    }
    state.last_output_list.clear();

    {
        let CoupledState {
            children,
            heap,
            policy,
            ..
        } = &mut *state;
        policy.apply(children, heap, &bag, t)?;
    }

    *tl = t;
    *tn = top_tn(&state.heap);
    Ok(())
}

/// `tn` of the earliest child, or `+∞` for a childless network.
pub(crate) fn top_tn<T: Time>(heap: &EventHeap<T>) -> T {
    heap.top().map(|(tn, _)| tn).unwrap_or(T::INFINITY)
}
