//! Transition policy — how one event's bag of transitions is applied.
//!
//! Within a single event time, routing has already filled every recipient's
//! input ports before any member of the bag transitions, and no child reads
//! a sibling's state during its own `delta`.  Transitions of distinct bag
//! members are therefore independent and may run concurrently.  Heap
//! updates and input clearing are not independent — the scheduler structure
//! is shared — so both policies defer them to a serial phase that walks the
//! bag in ascending-id order.  That shared serial phase is also what makes
//! the two policies produce identical trajectories.

use std::collections::BTreeSet;

use slab::Slab;

use des_core::Time;

use crate::error::KernelResult;
use crate::heap::EventHeap;
use crate::model::{ChildId, Model};

/// Strategy for applying the per-event transition bag.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TransitionPolicy {
    /// Transition bag members one at a time, in ascending child-id order.
    Sequential,
    /// Transition bag members on Rayon's thread pool, then run the serial
    /// bookkeeping phase.  Without the `parallel` cargo feature this is the
    /// sequential code path under another name.
    Parallel,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        if cfg!(feature = "parallel") {
            TransitionPolicy::Parallel
        } else {
            TransitionPolicy::Sequential
        }
    }
}

impl TransitionPolicy {
    pub(crate) fn apply<T: Time, V: Clone + Send + 'static>(
        self,
        children: &mut Slab<Model<T, V>>,
        heap: &mut EventHeap<T>,
        bag: &BTreeSet<ChildId>,
        t: T,
    ) -> KernelResult<()> {
        // A single-member bag runs inline.
        if bag.len() <= 1 || self == TransitionPolicy::Sequential {
            return sequential(children, heap, bag, t);
        }
        parallel(children, heap, bag, t)
    }
}

fn sequential<T: Time, V: Clone + Send + 'static>(
    children: &mut Slab<Model<T, V>>,
    heap: &mut EventHeap<T>,
    bag: &BTreeSet<ChildId>,
    t: T,
) -> KernelResult<()> {
    for &id in bag {
        let child = &mut children[id.index()];
        child.transition(t)?;
        child.x.clear();
        heap.update(child.heapid, child.tn);
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn parallel<T: Time, V: Clone + Send + 'static>(
    children: &mut Slab<Model<T, V>>,
    heap: &mut EventHeap<T>,
    bag: &BTreeSet<ChildId>,
    t: T,
) -> KernelResult<()> {
    use rayon::prelude::*;

    // Disjoint &mut refs to bag members, ascending id (slab iteration
    // order).  Each id appears in the bag at most once, so the refs are
    // disjoint by construction.
    let mut members: Vec<&mut Model<T, V>> = children
        .iter_mut()
        .filter(|(key, _)| bag.contains(&ChildId(*key as u32)))
        .map(|(_, child)| child)
        .collect();

    // Worker failures surface after the join; the run is then corrupt and
    // the error propagates to the driver.
    let results: Vec<KernelResult<()>> = members
        .par_iter_mut()
        .map(|child| child.transition(t))
        .collect();
    for result in results {
        result?;
    }

    // Serial bookkeeping phase, same order as the sequential policy.
    for child in members {
        child.x.clear();
        heap.update(child.heapid, child.tn);
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn parallel<T: Time, V: Clone + Send + 'static>(
    children: &mut Slab<Model<T, V>>,
    heap: &mut EventHeap<T>,
    bag: &BTreeSet<ChildId>,
    t: T,
) -> KernelResult<()> {
    sequential(children, heap, bag, t)
}
