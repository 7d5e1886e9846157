//! Kernel error type.
//!
//! Synchronization errors are programmer errors: an invariant of the
//! scheduler was violated and the run is no longer trustworthy.  They are
//! surfaced as `Err` rather than panics so a driver can report the fault
//! and discard the simulation.  The checks that produce them compile out
//! under the `unchecked` feature.

use std::fmt;

use thiserror::Error;

use des_core::PortError;

#[derive(Debug, Error)]
pub enum KernelError {
    /// `tl <= t <= tn` violated, or the heap top disagrees with the
    /// scheduler's own `tn`.  The simulation state is corrupt; discard it.
    #[error("synchronization error: {0}")]
    Synchronization(String),

    /// A routing endpoint named a model or surface that does not exist in
    /// the coupled model being routed.
    #[error("routing error: {0}")]
    Routing(String),

    /// A routing endpoint named a port outside its bundle.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl KernelError {
    pub(crate) fn sync<T: fmt::Debug>(site: &str, tl: T, t: T, tn: T) -> Self {
        KernelError::Synchronization(format!("{site}: tl={tl:?} t={t:?} tn={tn:?}"))
    }

    pub(crate) fn sync_top<T: fmt::Debug>(site: &str, t: T, tn: T, top: T) -> Self {
        KernelError::Synchronization(format!(
            "{site}: heap top tn={top:?} disagrees with t={t:?}, tn={tn:?}"
        ))
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
