//! Kernel-mediated routing for `post` implementations.
//!
//! A routing function moves values from output ports to input ports inside
//! one coupled model.  Because children live in an arena owned by the
//! kernel, user code cannot hold simultaneous references into several of
//! them; instead `post` receives a [`RouteCtx`] and describes moves through
//! it.  The context resolves endpoints, clones the values across, and
//! records every recipient that actually received values in the coupled
//! model's pending-input set — the set that decides who transitions at the
//! current event time.
//!
//! # Endpoints
//!
//! [`Src`] and [`Dst`] address the four surfaces a coupled model exposes:
//!
//! | Endpoint       | As source          | As destination        |
//! |----------------|--------------------|-----------------------|
//! | `Own(port)`    | border input `x`   | border output `y`     |
//! | `Child(id, p)` | child's output `y` | child's input `x`     |
//! | `Chi(port)`    | executive's output | executive's input     |
//!
//! `Own` as a source carries the coupled model's external input down into
//! the network; `Own` as a destination carries child output up to the
//! parent.  `Chi` endpoints exist only on executives and address the
//! executive's own scheduled entity.

use std::collections::BTreeSet;

use slab::Slab;

use des_core::{PortList, Time};

use crate::error::{KernelError, KernelResult};
use crate::model::{ChildId, Model};

/// A routing source endpoint.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Src {
    /// The coupled model's own border input port.
    Own(usize),
    /// A child's output port.
    Child(ChildId, usize),
    /// The executive's own output port (`chi_y`).
    Chi(usize),
}

/// A routing destination endpoint.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dst {
    /// The coupled model's own border output port.
    Own(usize),
    /// A child's input port.
    Child(ChildId, usize),
    /// The executive's own input port (`chi_x`).
    Chi(usize),
}

/// Routing capability handed to `post`.
///
/// Lives only for the duration of one routing call.
pub struct RouteCtx<'a, T: Time, V> {
    pub(crate) children: &'a mut Slab<Model<T, V>>,
    pub(crate) own_x: &'a PortList<V>,
    pub(crate) own_y: &'a mut PortList<V>,
    pub(crate) chi_x: Option<&'a mut PortList<V>>,
    pub(crate) chi_y: Option<&'a PortList<V>>,
    pub(crate) inputs: &'a mut BTreeSet<ChildId>,
}

impl<T: Time, V: Clone + Send + 'static> RouteCtx<'_, T, V> {
    /// Read access to a child's ports and schedule state.
    pub fn child(&self, id: ChildId) -> Option<&Model<T, V>> {
        self.children.get(id.index())
    }

    /// The values currently pending on `src`.
    pub fn source(&self, src: Src) -> KernelResult<&[V]> {
        match src {
            Src::Own(port) => Ok(self.own_x.at(port)?),
            Src::Child(id, port) => Ok(self.lookup(id)?.y.at(port)?),
            Src::Chi(port) => match self.chi_y {
                Some(chi_y) => Ok(chi_y.at(port)?),
                None => Err(KernelError::Routing(
                    "chi source on a non-executive model".to_string(),
                )),
            },
        }
    }

    /// Append values from `src` to `dst`.
    ///
    /// When at least one value moves to a `Child` or `Chi` destination, the
    /// recipient is registered as pending input and will transition at the
    /// current event time.  Routing an empty port registers nothing; use
    /// [`touch`][Self::touch] to force a recipient into the transition set.
    pub fn copy(&mut self, src: Src, dst: Dst) -> KernelResult<()> {
        let values = self.source(src)?.to_vec();
        if values.is_empty() {
            return Ok(());
        }
        self.deliver(dst, values)
    }

    /// Append explicit values to `dst`, registering the recipient as with
    /// [`copy`][Self::copy].
    pub fn send(&mut self, dst: Dst, values: impl IntoIterator<Item = V>) -> KernelResult<()> {
        let values: Vec<V> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(());
        }
        self.deliver(dst, values)
    }

    /// Register `id` as a transition recipient without moving any values.
    pub fn touch(&mut self, id: ChildId) {
        self.inputs.insert(id);
    }

    fn deliver(&mut self, dst: Dst, values: Vec<V>) -> KernelResult<()> {
        match dst {
            Dst::Own(port) => {
                self.own_y.at_mut(port)?.extend(values);
            }
            Dst::Child(id, port) => {
                let child = match self.children.get_mut(id.index()) {
                    Some(child) => child,
                    None => return Err(unknown_child(id)),
                };
                child.x.at_mut(port)?.extend(values);
                self.inputs.insert(id);
            }
            Dst::Chi(port) => {
                match self.chi_x.as_mut() {
                    Some(chi_x) => chi_x.at_mut(port)?.extend(values),
                    None => {
                        return Err(KernelError::Routing(
                            "chi destination on a non-executive model".to_string(),
                        ))
                    }
                }
                self.inputs.insert(ChildId::SELF);
            }
        }
        Ok(())
    }

    fn lookup(&self, id: ChildId) -> KernelResult<&Model<T, V>> {
        self.children.get(id.index()).ok_or_else(|| unknown_child(id))
    }
}

fn unknown_child(id: ChildId) -> KernelError {
    KernelError::Routing(format!("no child {id} in this coupled model"))
}
