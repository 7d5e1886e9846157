//! `des-kernel` — the DSDE scheduler and coordinator for `rust_des`.
//!
//! Executes hierarchical networks of event-driven models: a global clock
//! advances from event to event, and at every event each coupled model
//! fires the outputs of its imminent children, routes values between
//! ports, and transitions everyone who is imminent or just received input.
//! Executive models additionally rewrite their own child set mid-run.
//!
//! # Event cycle
//!
//! ```text
//! t ← engine.pre(root, t0)                 // start cascade
//! loop:
//!   engine.run(root, t):
//!     root.output(t)                       // lambdas + routing, top-down
//!     root.transition(t)                   // bag transitions, policy-driven
//!   t ← root.tn                            // next event, +∞ when exhausted
//! ```
//!
//! # Modules
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`heap`]      | `EventHeap` — mutable-key event-time priority queue  |
//! | [`model`]     | `Model`, `ChildId` — the polymorphic hierarchy node  |
//! | [`atomic`]    | `AtomicModel` user trait + leaf state machine        |
//! | [`coupled`]   | `CoupledModel` user trait + container coordinator    |
//! | [`executive`] | `ExecutiveModel`, `StructureCtx` — dynamic structure |
//! | [`route`]     | `RouteCtx`, `Src`, `Dst` — the routing contract      |
//! | [`policy`]    | `TransitionPolicy` — sequential / parallel bags      |
//! | [`engine`]    | `Engine` — pre / run / post driver                   |
//! | [`observer`]  | `EngineObserver` progress hooks                      |
//!
//! # Cargo features
//!
//! | Feature     | Effect                                                 |
//! |-------------|--------------------------------------------------------|
//! | `parallel`  | Runs transition bags on Rayon's thread pool.           |
//! | `unchecked` | Compiles out the synchronization invariant checks.     |

pub mod atomic;
pub mod coupled;
pub mod engine;
pub mod error;
pub mod executive;
pub mod heap;
pub mod model;
pub mod observer;
pub mod policy;
pub mod route;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use atomic::AtomicModel;
pub use coupled::CoupledModel;
pub use engine::Engine;
pub use error::{KernelError, KernelResult};
pub use executive::{ExecutiveModel, StructureCtx};
pub use heap::{EventHeap, Handle};
pub use model::{ChildId, Model};
pub use observer::{EngineObserver, NoopObserver};
pub use policy::TransitionPolicy;
pub use route::{Dst, RouteCtx, Src};
