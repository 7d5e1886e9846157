//! The polymorphic model node.
//!
//! A [`Model`] is one vertex of the simulation hierarchy: a leaf driven by
//! user dynamics, a coupled container, or an executive (a container that is
//! also a scheduled entity of its own network).  The three kinds are closed
//! and known to the kernel, so they live in one tagged enum rather than an
//! open trait hierarchy; the heap and the coordinator manipulate every kind
//! through the same `start` / `transition` / `output` surface.
//!
//! # Ownership
//!
//! A coupled model exclusively owns its children in a `Slab` arena; the
//! event heap and all routing refer to children by [`ChildId`], never by
//! reference, so reallocation and runtime insertion/erasure cannot
//! invalidate anything.  The root model is owned by the driver.

use std::fmt;
use std::sync::Arc;

use des_core::{Common, PortList, Time};

use crate::atomic::{self, AtomicModel};
use crate::coupled::{self, CoupledModel, CoupledState};
use crate::error::KernelResult;
use crate::executive::{self, ExecutiveModel, ExecutiveState};
use crate::heap::Handle;
use crate::policy::TransitionPolicy;

// ── ChildId ───────────────────────────────────────────────────────────────────

/// Index of a child in its parent's arena.
///
/// `ChildId::SELF` denotes the parent itself where children and the parent
/// share an address space: routing endpoints and the executive's own entry
/// in its heap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ChildId(pub u32);

impl ChildId {
    /// Sentinel addressing the enclosing coupled/executive model itself.
    pub const SELF: ChildId = ChildId(u32::MAX);

    /// Cast to `usize` for direct use as an arena key.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ChildId::SELF {
            write!(f, "ChildId(self)")
        } else {
            write!(f, "ChildId({})", self.0)
        }
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// One node of the simulation hierarchy.
///
/// Public state follows the DSDE formalism: input/output port bundles
/// `x`/`y`, time of last transition `tl` (initially `-∞`), and next
/// scheduled event `tn` (initially `+∞`).
pub struct Model<T: Time, V> {
    pub x: PortList<V>,
    pub y: PortList<V>,
    pub tl: T,
    pub tn: T,
    /// Handle into the parent's heap; `INVALID` while unscheduled.
    pub(crate) heapid: Handle,
    pub(crate) kind: ModelKind<T, V>,
}

pub(crate) enum ModelKind<T: Time, V> {
    Atomic(Box<dyn AtomicModel<T, V>>),
    Coupled(CoupledState<T, V>),
    Executive(ExecutiveState<T, V>),
}

impl<T: Time, V: Clone + Send + 'static> Model<T, V> {
    /// Wrap user dynamics into a leaf model with the given port names.
    pub fn atomic(
        dynamics: impl AtomicModel<T, V> + 'static,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Self {
        Self::with_kind(ModelKind::Atomic(Box::new(dynamics)), inputs, outputs)
    }

    /// Wrap a coupled network with the default transition policy.
    pub fn coupled(
        dynamics: impl CoupledModel<T, V> + 'static,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Self {
        Self::coupled_with_policy(dynamics, inputs, outputs, TransitionPolicy::default())
    }

    /// Wrap a coupled network with an explicit transition policy.
    pub fn coupled_with_policy(
        dynamics: impl CoupledModel<T, V> + 'static,
        inputs: &[&str],
        outputs: &[&str],
        policy: TransitionPolicy,
    ) -> Self {
        Self::with_kind(
            ModelKind::Coupled(CoupledState::new(Box::new(dynamics), policy)),
            inputs,
            outputs,
        )
    }

    /// Wrap an executive network with the default transition policy.
    ///
    /// `chi_inputs`/`chi_outputs` name the ports of the executive's own
    /// scheduled entity, distinct from its border ports.
    pub fn executive(
        dynamics: impl ExecutiveModel<T, V> + 'static,
        inputs: &[&str],
        outputs: &[&str],
        chi_inputs: &[&str],
        chi_outputs: &[&str],
    ) -> Self {
        Self::executive_with_policy(
            dynamics,
            inputs,
            outputs,
            chi_inputs,
            chi_outputs,
            TransitionPolicy::default(),
        )
    }

    /// Wrap an executive network with an explicit transition policy.
    pub fn executive_with_policy(
        dynamics: impl ExecutiveModel<T, V> + 'static,
        inputs: &[&str],
        outputs: &[&str],
        chi_inputs: &[&str],
        chi_outputs: &[&str],
        policy: TransitionPolicy,
    ) -> Self {
        Self::with_kind(
            ModelKind::Executive(ExecutiveState::new(
                Box::new(dynamics),
                policy,
                PortList::from_names(chi_inputs),
                PortList::from_names(chi_outputs),
            )),
            inputs,
            outputs,
        )
    }

    fn with_kind(kind: ModelKind<T, V>, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            x: PortList::from_names(inputs),
            y: PortList::from_names(outputs),
            tl: T::NEG_INFINITY,
            tn: T::INFINITY,
            heapid: Handle::INVALID,
            kind,
        }
    }

    // ── Kernel surface ────────────────────────────────────────────────────

    /// Initialize this model (and, recursively, its children) at `t`.
    ///
    /// Called exactly once, before any `output`/`transition`.
    pub fn start(&mut self, common: &Arc<Common>, t: T) {
        let Model { x, tl, tn, kind, .. } = self;
        match kind {
            ModelKind::Atomic(dynamics) => atomic::start(dynamics.as_mut(), common, t, tl, tn),
            ModelKind::Coupled(state) => coupled::start(state, common, t, tl, tn),
            ModelKind::Executive(state) => executive::start(state, common, t, x, tl, tn),
        }
    }

    /// Fire output functions if `t` is this model's event time.
    ///
    /// Must precede `transition` at the same `t`.
    pub fn output(&mut self, t: T) -> KernelResult<()> {
        let Model { x, y, tn, kind, .. } = self;
        match kind {
            ModelKind::Atomic(dynamics) => {
                atomic::output(dynamics.as_ref(), t, *tn, y);
                Ok(())
            }
            ModelKind::Coupled(state) => coupled::output(state, t, x, y, *tn),
            ModelKind::Executive(state) => executive::output(state, t, x, y, *tn),
        }
    }

    /// Advance this model's state to `t`.
    ///
    /// A call with `t < tn` and empty input is a no-op; a call outside
    /// `tl <= t <= tn` is a synchronization error.
    pub fn transition(&mut self, t: T) -> KernelResult<()> {
        let Model { x, y, tl, tn, kind, .. } = self;
        match kind {
            ModelKind::Atomic(dynamics) => atomic::transition(dynamics.as_mut(), t, x, tl, tn),
            ModelKind::Coupled(state) => coupled::transition(state, t, x, y, tl, tn),
            ModelKind::Executive(state) => executive::transition(state, t, x, y, tl, tn),
        }
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Read access to a child of a coupled/executive model.
    ///
    /// Returns `None` for leaf models and unknown ids.
    pub fn child(&self, id: ChildId) -> Option<&Model<T, V>> {
        match &self.kind {
            ModelKind::Atomic(_) => None,
            ModelKind::Coupled(state) => state.children.get(id.index()),
            ModelKind::Executive(state) => state.children.get(id.index()),
        }
    }

    /// Ids of all current children, in arena order.
    pub fn child_ids(&self) -> Vec<ChildId> {
        match &self.kind {
            ModelKind::Atomic(_) => Vec::new(),
            ModelKind::Coupled(state) => state
                .children
                .iter()
                .map(|(key, _)| ChildId(key as u32))
                .collect(),
            ModelKind::Executive(state) => state
                .children
                .iter()
                .map(|(key, _)| ChildId(key as u32))
                .collect(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match &self.kind {
            ModelKind::Atomic(_) => "atomic",
            ModelKind::Coupled(_) => "coupled",
            ModelKind::Executive(_) => "executive",
        }
    }
}

impl<T: Time, V: Clone + Send + 'static> fmt::Debug for Model<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.kind_name())
            .field("tl", &self.tl)
            .field("tn", &self.tn)
            .field("x_pending", &!self.x.is_empty())
            .field("y_pending", &!self.y.is_empty())
            .field("children", &self.child_ids().len())
            .finish()
    }
}
