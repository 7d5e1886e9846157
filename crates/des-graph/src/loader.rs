//! Textual graph loader.
//!
//! # Graph format
//!
//! Whitespace-separated UTF-8 text: a list of atomic dynamics names, a
//! sentinel token beginning with `#`, then one quadruple per connection —
//! `src dst src_port dst_port`, all 0-based indices:
//!
//! ```text
//! Gen
//! Acc
//! #
//! 0 1 0 0
//! ```
//!
//! Children are constructed through a [`Factory`] in listing order, so the
//! first name becomes `ChildId(0)`.  Port indices are validated against
//! the constructed models' port bundles at load time.
//!
//! The loaded [`GraphCoupled`] implements [`CoupledModel`]: wrap it with
//! [`Model::coupled`] and hand it to the engine.  Its routing walks the
//! outputs set and appends every non-empty source port's values to all
//! connected recipients.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;

use des_core::{Common, Time};
use des_kernel::{ChildId, CoupledModel, Dst, KernelResult, Model, RouteCtx, Src};

use crate::error::{GraphError, GraphResult};
use crate::factory::Factory;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a graph description from a file.
pub fn load_graph<T, V>(path: &Path, factory: &Factory<T, V>) -> GraphResult<GraphCoupled<T, V>>
where
    T: Time,
    V: Clone + Send + 'static,
{
    let text = std::fs::read_to_string(path)?;
    GraphCoupled::parse(&text, factory)
}

/// Like [`load_graph`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading embedded
/// descriptions.
pub fn load_graph_reader<T, V, R: Read>(
    mut reader: R,
    factory: &Factory<T, V>,
) -> GraphResult<GraphCoupled<T, V>>
where
    T: Time,
    V: Clone + Send + 'static,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    GraphCoupled::parse(&text, factory)
}

// ── GraphCoupled ──────────────────────────────────────────────────────────────

/// A coupled model whose children and connections come from a textual
/// graph description.
pub struct GraphCoupled<T: Time, V> {
    /// Constructed children, held until the kernel claims them via
    /// `children()`.
    pending: Vec<Model<T, V>>,
    /// Dynamics name of each child, in id order (kept for serialization).
    names: Vec<String>,
    /// `(src, src_port) → [(dst, dst_port)]` connection multimap.
    connections: HashMap<(u32, u32), Vec<(u32, u32)>>,
}

impl<T: Time, V: Clone + Send + 'static> fmt::Debug for GraphCoupled<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCoupled")
            .field("pending", &self.pending)
            .field("names", &self.names)
            .field("connections", &self.connections)
            .finish()
    }
}

impl<T: Time, V: Clone + Send + 'static> GraphCoupled<T, V> {
    /// Parse a graph description, constructing children via `factory`.
    pub fn parse(text: &str, factory: &Factory<T, V>) -> GraphResult<Self> {
        let mut tokens = text.split_whitespace();

        // ── Children: dynamics names until the '#' sentinel ───────────────
        let mut pending = Vec::new();
        let mut names = Vec::new();
        let mut terminated = false;
        for token in tokens.by_ref() {
            if token.starts_with('#') {
                terminated = true;
                break;
            }
            pending.push(factory.build(token)?);
            names.push(token.to_string());
        }
        if !terminated {
            return Err(GraphError::Malformed(
                "missing '#' separator after the dynamics list".to_string(),
            ));
        }

        // ── Connections: src dst src_port dst_port quadruples ─────────────
        let mut connections: HashMap<(u32, u32), Vec<(u32, u32)>> = HashMap::new();
        while let Some(first) = tokens.next() {
            let quad = [
                parse_index(first)?,
                parse_index(next_token(&mut tokens)?)?,
                parse_index(next_token(&mut tokens)?)?,
                parse_index(next_token(&mut tokens)?)?,
            ];
            let [src, dst, src_port, dst_port] = quad;

            if src >= pending.len() {
                return Err(GraphError::ChildIndex {
                    index: src,
                    len: pending.len(),
                });
            }
            if dst >= pending.len() {
                return Err(GraphError::ChildIndex {
                    index: dst,
                    len: pending.len(),
                });
            }
            if src_port >= pending[src].y.len() {
                return Err(GraphError::PortIndex(src_port));
            }
            if dst_port >= pending[dst].x.len() {
                return Err(GraphError::PortIndex(dst_port));
            }

            connections
                .entry((src as u32, src_port as u32))
                .or_default()
                .push((dst as u32, dst_port as u32));
        }

        Ok(Self {
            pending,
            names,
            connections,
        })
    }

    /// Number of children (before the kernel claims them).
    pub fn child_count(&self) -> usize {
        self.names.len()
    }

    /// Total number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }

    /// All connections as `(src, src_port, dst, dst_port)`, sorted.
    pub fn connections(&self) -> Vec<(u32, u32, u32, u32)> {
        let mut all: Vec<(u32, u32, u32, u32)> = self
            .connections
            .iter()
            .flat_map(|(&(src, sport), dsts)| {
                dsts.iter().map(move |&(dst, dport)| (src, sport, dst, dport))
            })
            .collect();
        all.sort_unstable();
        all
    }

    /// Dynamics names in child-id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Serialize back to the textual graph format.
    ///
    /// Reloading the result through the same factory yields a structurally
    /// identical model: same children order, same connection multiset.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for name in &self.names {
            text.push_str(name);
            text.push('\n');
        }
        text.push_str("#\n");
        for (src, sport, dst, dport) in self.connections() {
            text.push_str(&format!("{src} {dst} {sport} {dport}\n"));
        }
        text
    }
}

impl<T: Time, V: Clone + Send + 'static> CoupledModel<T, V> for GraphCoupled<T, V> {
    fn children(&mut self, _common: &Common) -> Vec<Model<T, V>> {
        std::mem::take(&mut self.pending)
    }

    fn post(&self, out: &BTreeSet<ChildId>, ctx: &mut RouteCtx<'_, T, V>) -> KernelResult<()> {
        for &src in out {
            if src == ChildId::SELF {
                // The format describes child-to-child couplings only.
                continue;
            }
            let ports = match ctx.child(src) {
                Some(child) => child.y.len(),
                None => continue,
            };
            for port in 0..ports {
                let Some(recipients) = self.connections.get(&(src.0, port as u32)) else {
                    continue;
                };
                for &(dst, dst_port) in recipients {
                    ctx.copy(
                        Src::Child(src, port),
                        Dst::Child(ChildId(dst), dst_port as usize),
                    )?;
                }
            }
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> GraphResult<&'a str> {
    tokens
        .next()
        .ok_or_else(|| GraphError::Malformed("truncated connection quadruple".to_string()))
}

fn parse_index(token: &str) -> GraphResult<usize> {
    token
        .parse::<usize>()
        .map_err(|_| GraphError::Malformed(format!("expected a non-negative index, got {token:?}")))
}
