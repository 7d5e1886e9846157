//! `des-graph` — build coupled models from textual graph descriptions.
//!
//! A graph description lists atomic dynamics names and index-based
//! connections; the [`Factory`] supplies a constructor per name, and the
//! resulting [`GraphCoupled`] plugs into the kernel as an ordinary coupled
//! model.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut factory: Factory<f64, i32> = Factory::new();
//! factory.register("Gen", || Model::atomic(Gen::default(), &[], &["out"]));
//! factory.register("Acc", || Model::atomic(Acc::default(), &["in"], &[]));
//!
//! let graph = load_graph_reader(Cursor::new("Gen\nAcc\n#\n0 1 0 0\n"), &factory)?;
//! let mut root = Model::coupled(graph, &[], &[]);
//! let t = Engine::new().pre(&mut root, 0.0);
//! ```

pub mod error;
pub mod factory;
pub mod loader;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GraphError, GraphResult};
pub use factory::Factory;
pub use loader::{load_graph, load_graph_reader, GraphCoupled};
