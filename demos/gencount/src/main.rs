//! gencount — smallest example for the rust_des simulation framework.
//!
//! Loads a two-model network (periodic generator → accumulator) from an
//! embedded textual graph description, runs it for a fixed horizon, and
//! prints the event trace.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;

use des_core::{Common, PortList};
use des_graph::{load_graph_reader, Factory};
use des_kernel::{AtomicModel, Engine, EngineObserver, Model};

// ── Constants ─────────────────────────────────────────────────────────────────

const PERIOD: f64 = 1.0;
const HORIZON: f64 = 10.0;

// ── Graph description ─────────────────────────────────────────────────────────

// One generator (child 0) wired to one accumulator (child 1), output port 0
// to input port 0.
const NETWORK: &str = "\
Gen
Acc
#
0 1 0 0
";

// ── Dynamics ──────────────────────────────────────────────────────────────────

/// Emits `1` every `PERIOD` time units.
struct Gen;

impl AtomicModel<f64, i32> for Gen {
    fn init(&mut self, _common: &Common, _t: f64) -> f64 {
        PERIOD
    }

    fn delta(&mut self, _e: f64, _x: &PortList<i32>) -> f64 {
        PERIOD
    }

    fn lambda(&self, y: &mut PortList<i32>) {
        y.push(0, 1);
    }
}

/// Passive accumulator.
struct Acc {
    total: Arc<AtomicUsize>,
}

impl AtomicModel<f64, i32> for Acc {
    fn init(&mut self, _common: &Common, _t: f64) -> f64 {
        f64::INFINITY
    }

    fn delta(&mut self, _e: f64, x: &PortList<i32>) -> f64 {
        let received: i32 = x.values(0).iter().sum();
        self.total.fetch_add(received as usize, Ordering::SeqCst);
        f64::INFINITY
    }

    fn lambda(&self, _y: &mut PortList<i32>) {}
}

// ── Observer ──────────────────────────────────────────────────────────────────

struct EventPrinter {
    events: usize,
}

impl EngineObserver<f64> for EventPrinter {
    fn on_event_end(&mut self, t: f64) {
        self.events += 1;
        println!("  event {:>2} processed at t = {t}", self.events);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== gencount — rust_des ===");
    println!("Period: {PERIOD}  |  Horizon: {HORIZON}");
    println!();

    // 1. Register dynamics constructors.
    let total = Arc::new(AtomicUsize::new(0));
    let mut factory: Factory<f64, i32> = Factory::new();
    factory.register("Gen", || Model::atomic(Gen, &[], &["out"]));
    {
        let total = Arc::clone(&total);
        factory.register("Acc", move || {
            Model::atomic(
                Acc {
                    total: Arc::clone(&total),
                },
                &["in"],
                &[],
            )
        });
    }

    // 2. Load the network from the embedded description.
    let graph = load_graph_reader(Cursor::new(NETWORK), &factory)?;
    println!(
        "Network: {} children, {} connections",
        graph.child_count(),
        graph.connection_count()
    );

    // 3. Run.
    let mut root = Model::coupled(graph, &[], &[]);
    let engine = Engine::new();
    let mut printer = EventPrinter { events: 0 };
    let end = engine.simulate(&mut root, 0.0, HORIZON, &mut printer)?;

    // 4. Summary.
    println!();
    println!("Final clock      : {end}");
    println!("Events processed : {}", printer.events);
    println!("Accumulated total: {}", total.load(Ordering::SeqCst));

    Ok(())
}
