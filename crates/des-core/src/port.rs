//! Port bundles — the value-carrying surface of every model.
//!
//! A [`PortList`] is an ordered sequence of ports, each port a list of
//! values appended during routing or output.  Ports are created before the
//! simulation starts (either from a name list at model construction or via
//! [`PortList::add`]) and the port count never changes afterwards.
//!
//! # The written-to flag
//!
//! `is_empty()` does not count values; it reports whether any port has been
//! *accessed for writing* since the last `clear()`.  The kernel uses the
//! flag to decide whether a model received input (external transition) or
//! produced output (routing source) without scanning every port.  Mutable
//! access alone raises the flag, matching the contract that a model which
//! touched its ports intends them to be observed.

use std::collections::HashMap;

use crate::error::PortError;

/// Named, indexed bags of per-port value lists.
#[derive(Clone, Debug, Default)]
pub struct PortList<V> {
    ports: Vec<Vec<V>>,
    names: HashMap<String, usize>,
    written: bool,
}

impl<V> PortList<V> {
    /// An empty bundle with no ports.
    pub fn new() -> Self {
        Self {
            ports: Vec::new(),
            names: HashMap::new(),
            written: false,
        }
    }

    /// A bundle with one port per name, indexed in order.
    pub fn from_names(names: &[&str]) -> Self {
        let mut list = Self::new();
        for name in names {
            list.add(name);
        }
        list
    }

    /// Append a new port and return its index.
    ///
    /// Only valid before the simulation begins; the kernel assumes port
    /// counts are stable once a model is started.
    pub fn add(&mut self, name: &str) -> usize {
        let index = self.ports.len();
        self.ports.push(Vec::new());
        self.names.insert(name.to_string(), index);
        index
    }

    /// Number of ports (not values).
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// True iff no port has been written to since the last [`clear`].
    ///
    /// Note this is the written-to flag, not a value count; see the module
    /// docs.
    ///
    /// [`clear`]: PortList::clear
    pub fn is_empty(&self) -> bool {
        !self.written
    }

    /// Empty every port list and reset the written-to flag.
    pub fn clear(&mut self) {
        self.written = false;
        for port in &mut self.ports {
            port.clear();
        }
    }

    /// The values currently on `port`.
    ///
    /// # Panics
    /// Panics if `port` is out of range; use [`at`][PortList::at] for a
    /// checked lookup.
    pub fn values(&self, port: usize) -> &[V] {
        &self.ports[port]
    }

    /// Mutable access to `port`, raising the written-to flag.
    ///
    /// # Panics
    /// Panics if `port` is out of range; use [`at_mut`][PortList::at_mut]
    /// for a checked lookup.
    pub fn port_mut(&mut self, port: usize) -> &mut Vec<V> {
        self.written = true;
        &mut self.ports[port]
    }

    /// Append one value to `port`, raising the written-to flag.
    pub fn push(&mut self, port: usize, value: V) {
        self.port_mut(port).push(value);
    }

    /// Checked read access by index.
    pub fn at(&self, port: usize) -> Result<&[V], PortError> {
        self.ports
            .get(port)
            .map(Vec::as_slice)
            .ok_or(PortError::OutOfRange {
                index: port,
                len: self.ports.len(),
            })
    }

    /// Checked write access by index, raising the written-to flag.
    pub fn at_mut(&mut self, port: usize) -> Result<&mut Vec<V>, PortError> {
        let len = self.ports.len();
        match self.ports.get_mut(port) {
            Some(values) => {
                self.written = true;
                Ok(values)
            }
            None => Err(PortError::OutOfRange { index: port, len }),
        }
    }

    /// Resolve a port name to its index.
    pub fn port_index(&self, name: &str) -> Result<usize, PortError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| PortError::UnknownPort(name.to_string()))
    }

    /// Checked read access by name.
    pub fn by_name(&self, name: &str) -> Result<&[V], PortError> {
        let index = self.port_index(name)?;
        self.at(index)
    }

    /// Checked write access by name, raising the written-to flag.
    pub fn by_name_mut(&mut self, name: &str) -> Result<&mut Vec<V>, PortError> {
        let index = self.port_index(name)?;
        self.at_mut(index)
    }
}
