//! Executive model — a coupled network that schedules itself and may
//! rewrite its own child set during simulation.
//!
//! The executive owns a network exactly like a coupled model, but its heap
//! also carries one entry for the executive itself ([`ChildId::SELF`]),
//! keyed by the executive's own `chi_tn`.  When that entry is imminent the
//! kernel fires the executive's `lambda`/`delta` instead of recursing into
//! a child — and `delta` receives a [`StructureCtx`] through which it may
//! insert or erase children.  The context exists only for the duration of
//! `delta`, so the structural-mutation window is closed by the borrow
//! checker rather than by a runtime flag.
//!
//! Within one event the children's transitions run before the executive's
//! own `delta`; the bag is identified before anything transitions, so a
//! structural change never affects which siblings participate in the
//! current event.

use std::collections::BTreeSet;
use std::sync::Arc;

use slab::Slab;

use des_core::{Common, PortList, Time};

use crate::coupled::top_tn;
use crate::error::KernelResult;
use crate::heap::{EventHeap, Handle};
use crate::model::{ChildId, Model};
use crate::policy::TransitionPolicy;
use crate::route::RouteCtx;

#[cfg(not(feature = "unchecked"))]
use crate::error::KernelError;

/// User-defined executive network.
///
/// Combines the coupled hooks ([`children`][Self::children],
/// [`post`][Self::post] — same contracts as
/// [`CoupledModel`][crate::CoupledModel]) with atomic dynamics for the
/// executive's own scheduled entity.  In `post`, [`ChildId::SELF`] appears
/// in `out` when the border input is being forwarded or when the
/// executive's own `lambda` produced values; `Chi` endpoints address the
/// entity's ports.
pub trait ExecutiveModel<T: Time, V>: Send {
    fn children(&mut self, common: &Common) -> Vec<Model<T, V>>;

    fn post(&self, out: &BTreeSet<ChildId>, ctx: &mut RouteCtx<'_, T, V>) -> KernelResult<()>;

    /// First time advance of the executive's own entity.
    fn init(&mut self, common: &Common, t: T) -> T;

    /// Transition of the executive's own entity.  `x` is the entity input
    /// bundle (`chi_x`); `ctx` grants structural access to the child set.
    fn delta(&mut self, e: T, x: &PortList<V>, ctx: &mut StructureCtx<'_, T, V>) -> T;

    /// Output of the executive's own entity, written into `chi_y`.
    fn lambda(&self, y: &mut PortList<V>);
}

// ── StructureCtx ──────────────────────────────────────────────────────────────

/// Structural capability handed to [`ExecutiveModel::delta`].
///
/// Valid only between the beginning of `delta` and its return.
pub struct StructureCtx<'a, T: Time, V> {
    children: &'a mut Slab<Model<T, V>>,
    heap: &'a mut EventHeap<T>,
    last_output_list: &'a mut BTreeSet<ChildId>,
    common: &'a Arc<Common>,
    /// Start time for inserted children — the executive's `chi_tl`, which
    /// at this point equals the current event time.
    start_time: T,
}

impl<T: Time, V: Clone + Send + 'static> StructureCtx<'_, T, V> {
    /// Attach a new child: start it at the current event time and schedule
    /// it.  It participates in the network from the next event on.
    pub fn insert(&mut self, mut model: Model<T, V>) -> ChildId {
        model.start(self.common, self.start_time);
        let key = self.children.insert(model);
        let handle = self.heap.emplace(ChildId(key as u32), self.children[key].tn);
        self.children[key].heapid = handle;
        ChildId(key as u32)
    }

    /// Detach a child, unscheduling it and returning ownership to the
    /// caller.  Returns `None` for unknown ids.
    pub fn erase(&mut self, id: ChildId) -> Option<Model<T, V>> {
        let mut model = self.children.try_remove(id.index())?;
        self.last_output_list.remove(&id);
        self.heap.erase(model.heapid);
        model.heapid = Handle::INVALID;
        Some(model)
    }

    /// Read access to a current child.
    pub fn child(&self, id: ChildId) -> Option<&Model<T, V>> {
        self.children.get(id.index())
    }

    /// Ids of all current children, in arena order.
    pub fn child_ids(&self) -> Vec<ChildId> {
        self.children
            .iter()
            .map(|(key, _)| ChildId(key as u32))
            .collect()
    }

    /// The configuration bag the simulation was started with.
    pub fn common(&self) -> &Common {
        self.common
    }
}

// ── Kernel state ──────────────────────────────────────────────────────────────

pub(crate) struct ExecutiveState<T: Time, V> {
    pub(crate) dynamics: Box<dyn ExecutiveModel<T, V>>,
    pub(crate) children: Slab<Model<T, V>>,
    pub(crate) heap: EventHeap<T>,
    pub(crate) last_output_list: BTreeSet<ChildId>,
    pub(crate) policy: TransitionPolicy,
    // Schedule state of the executive's own entity.
    pub(crate) chi_tl: T,
    pub(crate) chi_tn: T,
    pub(crate) chi_heapid: Handle,
    pub(crate) chi_x: PortList<V>,
    pub(crate) chi_y: PortList<V>,
    /// Retained so children inserted at runtime start with the same
    /// configuration the network was started with.
    pub(crate) common: Arc<Common>,
}

impl<T: Time, V> ExecutiveState<T, V> {
    pub(crate) fn new(
        dynamics: Box<dyn ExecutiveModel<T, V>>,
        policy: TransitionPolicy,
        chi_x: PortList<V>,
        chi_y: PortList<V>,
    ) -> Self {
        Self {
            dynamics,
            children: Slab::new(),
            heap: EventHeap::new(),
            last_output_list: BTreeSet::new(),
            policy,
            chi_tl: T::NEG_INFINITY,
            chi_tn: T::INFINITY,
            chi_heapid: Handle::INVALID,
            chi_x,
            chi_y,
            common: Arc::new(Common::new()),
        }
    }
}

// ── Kernel steps ──────────────────────────────────────────────────────────────

pub(crate) fn start<T: Time, V: Clone + Send + 'static>(
    state: &mut ExecutiveState<T, V>,
    common: &Arc<Common>,
    t: T,
    x: &mut PortList<V>,
    tl: &mut T,
    tn: &mut T,
) {
    state.common = Arc::clone(common);

    state.chi_tl = t;
    state.chi_tn = t.add(state.dynamics.init(common, t));
    state.chi_heapid = state.heap.emplace(ChildId::SELF, state.chi_tn);

    for mut child in state.dynamics.children(common) {
        child.start(common, t);
        let key = state.children.insert(child);
        let handle = state.heap.emplace(ChildId(key as u32), state.children[key].tn);
        state.children[key].heapid = handle;
    }

    *tl = t;
    *tn = top_tn(&state.heap);
    x.clear();
}

pub(crate) fn output<T: Time, V: Clone + Send + 'static>(
    state: &mut ExecutiveState<T, V>,
    t: T,
    x: &PortList<V>,
    y: &mut PortList<V>,
    tn: T,
) -> KernelResult<()> {
    #[cfg(not(feature = "unchecked"))]
    if let Some((top, _)) = state.heap.top() {
        if t != top || tn != top {
            return Err(KernelError::sync_top("executive output", t, tn, top));
        }
    }

    if t == tn && !state.heap.is_empty() {
        let mut imminent = Vec::new();
        state.heap.imminent_into(t, &mut imminent);

        let mut sources = BTreeSet::new();
        for &id in &imminent {
            if id == ChildId::SELF {
                let ExecutiveState {
                    dynamics, chi_y, ..
                } = &mut *state;
                dynamics.lambda(chi_y);
                if !state.chi_y.is_empty() {
                    sources.insert(id);
                }
            } else {
                let child = &mut state.children[id.index()];
                child.output(t)?;
                if !child.y.is_empty() {
                    sources.insert(id);
                }
            }
        }

        let ExecutiveState {
            dynamics,
            children,
            last_output_list,
            chi_x,
            chi_y,
            ..
        } = state;
        let mut ctx = RouteCtx {
            children,
            own_x: x,
            own_y: y,
            chi_x: Some(chi_x),
            chi_y: Some(chi_y),
            inputs: last_output_list,
        };
        dynamics.post(&sources, &mut ctx)?;

        for &id in &sources {
            if id == ChildId::SELF {
                state.chi_y.clear();
            } else {
                state.children[id.index()].y.clear();
            }
        }
    }
    Ok(())
}

pub(crate) fn transition<T: Time, V: Clone + Send + 'static>(
    state: &mut ExecutiveState<T, V>,
    t: T,
    x: &mut PortList<V>,
    y: &mut PortList<V>,
    tl: &mut T,
    tn: &mut T,
) -> KernelResult<()> {
    #[cfg(not(feature = "unchecked"))]
    {
        if !(*tl <= t && t <= *tn) {
            return Err(KernelError::sync("executive transition", *tl, t, *tn));
        }
        if t < *tn && x.is_empty() {
            return Ok(());
        }
    }

    // Partition imminent entries into the executive's own entry and the
    // children bag.
    let mut imminent = Vec::new();
    state.heap.imminent_into(t, &mut imminent);
    let mut have_chi = false;
    let mut bag = BTreeSet::new();
    for id in imminent {
        if id == ChildId::SELF {
            have_chi = true;
        } else {
            bag.insert(id);
        }
    }

    // Forward external input; recipients may include the entity itself.
    if !x.is_empty() {
        let ExecutiveState {
            dynamics,
            children,
            last_output_list,
            chi_x,
            ..
        } = &mut *state;
        let mut own = BTreeSet::new();
        own.insert(ChildId::SELF);
        let mut ctx = RouteCtx {
            children,
            own_x: x,
            own_y: y,
            chi_x: Some(chi_x),
            chi_y: None,
            inputs: last_output_list,
        };
        dynamics.post(&own, &mut ctx)?;
    }

    for &id in &state.last_output_list {
        if id == ChildId::SELF {
            have_chi = true;
        } else {
            bag.insert(id);
        }
    }
    state.last_output_list.clear();

    // Children transition first.  The executive's own delta runs after the
    // bag has been applied, so structural changes cannot touch this
    // event's participants.
    {
        let ExecutiveState {
            children,
            heap,
            policy,
            ..
        } = &mut *state;
        policy.apply(children, heap, &bag, t)?;
    }

    if have_chi {
        let e = t.sub(state.chi_tl);
        state.chi_tl = t;
        let advance = {
            let ExecutiveState {
                dynamics,
                children,
                heap,
                last_output_list,
                chi_x,
                common,
                ..
            } = &mut *state;
            let mut ctx = StructureCtx {
                children,
                heap,
                last_output_list,
                common,
                start_time: t,
            };
            dynamics.delta(e, chi_x, &mut ctx)
        };
        state.chi_tn = t.add(advance);
        state.chi_x.clear();
        state.heap.update(state.chi_heapid, state.chi_tn);
    }

    *tn = top_tn(&state.heap);
    *tl = t;
    x.clear();
    Ok(())
}
