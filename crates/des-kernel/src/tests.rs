//! Integration tests for the des-kernel scheduler and coordinator.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use des_core::{Common, PortList};

use crate::{
    AtomicModel, ChildId, CoupledModel, Dst, Engine, EngineObserver, ExecutiveModel, KernelError,
    KernelResult, Model, RouteCtx, Src, StructureCtx, TransitionPolicy,
};

type M = Model<f64, i32>;

// ── Test dynamics ─────────────────────────────────────────────────────────────

/// Fires every `period`, emitting `payload` on output port 0.
struct Generator {
    period: f64,
    payload: i32,
    fired: Arc<AtomicUsize>,
}

impl Generator {
    fn model(period: f64, payload: i32, fired: Arc<AtomicUsize>) -> M {
        Model::atomic(
            Generator {
                period,
                payload,
                fired,
            },
            &[],
            &["out"],
        )
    }
}

impl AtomicModel<f64, i32> for Generator {
    fn init(&mut self, _common: &Common, _t: f64) -> f64 {
        self.period
    }

    fn delta(&mut self, _e: f64, _x: &PortList<i32>) -> f64 {
        self.fired.fetch_add(1, Ordering::SeqCst);
        self.period
    }

    fn lambda(&self, y: &mut PortList<i32>) {
        y.push(0, self.payload);
    }
}

/// Passive accumulator: sums everything received on input port 0.
struct Counter {
    sum: Arc<AtomicUsize>,
}

impl Counter {
    fn model(sum: Arc<AtomicUsize>) -> M {
        Model::atomic(Counter { sum }, &["in"], &[])
    }
}

impl AtomicModel<f64, i32> for Counter {
    fn init(&mut self, _common: &Common, _t: f64) -> f64 {
        f64::INFINITY
    }

    fn delta(&mut self, _e: f64, x: &PortList<i32>) -> f64 {
        let received: i32 = x.values(0).iter().sum();
        self.sum.fetch_add(received as usize, Ordering::SeqCst);
        f64::INFINITY
    }

    fn lambda(&self, _y: &mut PortList<i32>) {}
}

/// One internal event after `advance`, then passive.  Records every delta
/// as `(elapsed, input_was_nonempty)`.
struct Pulse {
    advance: f64,
    log: Arc<Mutex<Vec<(f64, bool)>>>,
}

impl Pulse {
    fn model(advance: f64, log: Arc<Mutex<Vec<(f64, bool)>>>) -> M {
        Model::atomic(Pulse { advance, log }, &["in"], &["out"])
    }
}

impl AtomicModel<f64, i32> for Pulse {
    fn init(&mut self, _common: &Common, _t: f64) -> f64 {
        self.advance
    }

    fn delta(&mut self, e: f64, x: &PortList<i32>) -> f64 {
        self.log.lock().unwrap().push((e, !x.is_empty()));
        f64::INFINITY
    }

    fn lambda(&self, y: &mut PortList<i32>) {
        y.push(0, 1);
    }
}

/// Coupled network built from a child vector and a static link table.
struct Network {
    build: Vec<M>,
    links: Vec<(Src, Dst)>,
}

impl Network {
    fn model(build: Vec<M>, links: Vec<(Src, Dst)>, inputs: &[&str], outputs: &[&str]) -> M {
        Model::coupled(Network { build, links }, inputs, outputs)
    }
}

impl CoupledModel<f64, i32> for Network {
    fn children(&mut self, _common: &Common) -> Vec<M> {
        std::mem::take(&mut self.build)
    }

    fn post(&self, out: &BTreeSet<ChildId>, ctx: &mut RouteCtx<'_, f64, i32>) -> KernelResult<()> {
        for &(src, dst) in &self.links {
            let hot = match src {
                Src::Own(_) | Src::Chi(_) => out.contains(&ChildId::SELF),
                Src::Child(id, _) => out.contains(&id),
            };
            if hot {
                ctx.copy(src, dst)?;
            }
        }
        Ok(())
    }
}

fn gen_counter_net(
    period: f64,
    fired: Arc<AtomicUsize>,
    sum: Arc<AtomicUsize>,
) -> M {
    Network::model(
        vec![
            Generator::model(period, 1, fired),
            Counter::model(sum),
        ],
        vec![(Src::Child(ChildId(0), 0), Dst::Child(ChildId(1), 0))],
        &[],
        &[],
    )
}

// ── Event heap ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heap_tests {
    use crate::heap::{EventHeap, Handle};
    use crate::ChildId;

    #[test]
    fn top_is_minimum() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        heap.emplace(ChildId(0), 5.0);
        heap.emplace(ChildId(1), 1.0);
        heap.emplace(ChildId(2), 3.0);
        assert_eq!(heap.top(), Some((1.0, ChildId(1))));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn update_reorders() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        let a = heap.emplace(ChildId(0), 5.0);
        let b = heap.emplace(ChildId(1), 1.0);
        heap.update(a, 0.5);
        assert_eq!(heap.top(), Some((0.5, ChildId(0))));
        heap.update(a, 9.0);
        assert_eq!(heap.top(), Some((1.0, ChildId(1))));
        // Handles stay valid across reorders.
        assert_eq!(heap.tn(a), 9.0);
        assert_eq!(heap.tn(b), 1.0);
    }

    #[test]
    fn erase_removes_entry() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        let a = heap.emplace(ChildId(0), 1.0);
        heap.emplace(ChildId(1), 2.0);
        heap.erase(a);
        assert_eq!(heap.top(), Some((2.0, ChildId(1))));
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn slots_are_reused_after_erase() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        let a = heap.emplace(ChildId(0), 1.0);
        heap.erase(a);
        let b = heap.emplace(ChildId(1), 4.0);
        assert_eq!(heap.top(), Some((4.0, ChildId(1))));
        assert_eq!(heap.tn(b), 4.0);
    }

    #[test]
    fn imminent_collects_all_ties() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        heap.emplace(ChildId(0), 2.0);
        heap.emplace(ChildId(1), 1.0);
        heap.emplace(ChildId(2), 1.0);
        heap.emplace(ChildId(3), 3.0);
        heap.emplace(ChildId(4), 1.0);

        let mut out = Vec::new();
        heap.imminent_into(1.0, &mut out);
        out.sort();
        assert_eq!(out, vec![ChildId(1), ChildId(2), ChildId(4)]);
    }

    #[test]
    fn imminent_on_empty_heap_is_empty() {
        let heap: EventHeap<f64> = EventHeap::new();
        let mut out = Vec::new();
        heap.imminent_into(0.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid event-heap handle")]
    fn erase_invalid_handle_is_fatal() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        heap.erase(Handle::INVALID);
    }

    #[test]
    #[should_panic(expected = "invalid event-heap handle")]
    fn erase_twice_is_fatal() {
        let mut heap: EventHeap<f64> = EventHeap::new();
        let a = heap.emplace(ChildId(0), 1.0);
        heap.erase(a);
        heap.erase(a);
    }
}

// ── Scenario 1: trivial generator → counter ───────────────────────────────────

#[cfg(test)]
mod generator_counter {
    use super::*;

    #[test]
    fn five_events_accumulate_five() {
        let fired = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));
        let mut root = gen_counter_net(1.0, Arc::clone(&fired), Arc::clone(&sum));

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        assert_eq!(t, 1.0);

        for _ in 0..5 {
            t = engine.run(&mut root, t).unwrap();
        }
        assert_eq!(t, 6.0);
        assert_eq!(fired.load(Ordering::SeqCst), 5);
        assert_eq!(sum.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn scheduler_invariants_hold_throughout() {
        let fired = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));
        let mut root = gen_counter_net(0.5, fired, sum);

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        for _ in 0..20 {
            let at = t;
            t = engine.run(&mut root, at).unwrap();

            // tl <= tn on every model.
            assert!(root.tl <= root.tn);
            for id in root.child_ids() {
                let child = root.child(id).unwrap();
                assert!(child.tl <= child.tn);
            }

            // The coupled tn is the minimum child tn.
            let min_tn = root
                .child_ids()
                .iter()
                .map(|&id| root.child(id).unwrap().tn)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(root.tn, min_tn);

            // Inputs are consumed and tl records the processed event.
            assert!(root.x.is_empty());
            assert_eq!(root.tl, at);
        }
    }
}

// ── Scenario 2: confluent transition ──────────────────────────────────────────

#[cfg(test)]
mod confluence {
    use super::*;

    #[test]
    fn imminent_model_with_input_transitions_once() {
        // Generator and pulse both hit t = 2.0; the pulse is internally
        // imminent and simultaneously receives the generator's output.
        let fired = Arc::new(AtomicUsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Network::model(
            vec![
                Generator::model(2.0, 7, Arc::clone(&fired)),
                Pulse::model(2.0, Arc::clone(&log)),
            ],
            vec![(Src::Child(ChildId(0), 0), Dst::Child(ChildId(1), 0))],
            &[],
            &[],
        );

        let engine = Engine::new();
        let t = engine.pre(&mut root, 0.0);
        assert_eq!(t, 2.0);
        engine.run(&mut root, t).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1, "confluent delta must run exactly once");
        let (elapsed, had_input) = log[0];
        assert_eq!(elapsed, 2.0);
        assert!(had_input, "confluent delta must see the routed input");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

// ── Scenario 3: synchronization checks ────────────────────────────────────────

#[cfg(test)]
mod synchronization {
    use super::*;

    #[test]
    fn early_transition_with_empty_input_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Pulse::model(1.0, Arc::clone(&log));
        let engine = Engine::new();
        engine.pre(&mut root, 0.0);

        root.transition(0.5).unwrap();
        assert_eq!(root.tl, 0.0);
        assert_eq!(root.tn, 1.0);
        assert!(log.lock().unwrap().is_empty(), "no delta on a no-op call");
    }

    #[test]
    fn late_transition_is_a_synchronization_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Pulse::model(1.0, log);
        let engine = Engine::new();
        engine.pre(&mut root, 0.0);

        let err = root.transition(1.5).unwrap_err();
        assert!(matches!(err, KernelError::Synchronization(_)), "{err}");
    }

    #[test]
    fn engine_run_rejects_wrong_time() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Pulse::model(1.0, log);
        let engine = Engine::new();
        engine.pre(&mut root, 0.0);

        let err = engine.run(&mut root, 0.7).unwrap_err();
        assert!(matches!(err, KernelError::Synchronization(_)));
    }

    #[test]
    fn run_on_exhausted_root_is_idempotent() {
        let sum = Arc::new(AtomicUsize::new(0));
        let mut root = Counter::model(Arc::clone(&sum));
        let engine = Engine::new();
        let t = engine.pre(&mut root, 0.0);
        assert_eq!(t, f64::INFINITY);

        let t = engine.run(&mut root, t).unwrap();
        assert_eq!(t, f64::INFINITY);
        assert_eq!(root.tl, 0.0, "no transition may have happened");
        assert_eq!(sum.load(Ordering::SeqCst), 0);
    }
}

// ── Scenario 4: executive structural changes ──────────────────────────────────

#[cfg(test)]
mod executive {
    use super::*;

    /// Starts with two passive children; at its own event inserts a pulse
    /// whose first event is half a unit later.
    struct Spawner {
        delta_count: Arc<AtomicUsize>,
        pulse_log: Arc<Mutex<Vec<(f64, bool)>>>,
        inserted: bool,
    }

    impl ExecutiveModel<f64, i32> for Spawner {
        fn children(&mut self, _common: &Common) -> Vec<M> {
            let silent = Arc::new(AtomicUsize::new(0));
            vec![
                Counter::model(Arc::clone(&silent)),
                Counter::model(silent),
            ]
        }

        fn post(
            &self,
            _out: &BTreeSet<ChildId>,
            _ctx: &mut RouteCtx<'_, f64, i32>,
        ) -> KernelResult<()> {
            Ok(())
        }

        fn init(&mut self, _common: &Common, _t: f64) -> f64 {
            1.0
        }

        fn delta(
            &mut self,
            _e: f64,
            _x: &PortList<i32>,
            ctx: &mut StructureCtx<'_, f64, i32>,
        ) -> f64 {
            self.delta_count.fetch_add(1, Ordering::SeqCst);
            if !self.inserted {
                self.inserted = true;
                let id = ctx.insert(Pulse::model(0.5, Arc::clone(&self.pulse_log)));
                // The new child starts at the current event time.
                assert_eq!(ctx.child(id).unwrap().tl, 1.0);
                assert_eq!(ctx.child(id).unwrap().tn, 1.5);
            }
            f64::INFINITY
        }

        fn lambda(&self, _y: &mut PortList<i32>) {}
    }

    #[test]
    fn inserted_child_joins_the_imminent_set_once() {
        let delta_count = Arc::new(AtomicUsize::new(0));
        let pulse_log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Model::executive(
            Spawner {
                delta_count: Arc::clone(&delta_count),
                pulse_log: Arc::clone(&pulse_log),
                inserted: false,
            },
            &[],
            &[],
            &[],
            &[],
        );

        let engine = Engine::new();
        let t = engine.pre(&mut root, 0.0);
        assert_eq!(t, 1.0, "the executive's own event comes first");
        assert_eq!(root.child_ids().len(), 2);

        let t = engine.run(&mut root, t).unwrap();
        assert_eq!(t, 1.5, "the inserted pulse is now the earliest event");
        assert_eq!(root.child_ids().len(), 3);

        let t = engine.run(&mut root, t).unwrap();
        assert_eq!(t, f64::INFINITY);

        let log = pulse_log.lock().unwrap();
        assert_eq!(log.len(), 1, "new child transitions exactly once at 1.5");
        assert_eq!(log[0], (0.5, false));
        assert_eq!(delta_count.load(Ordering::SeqCst), 1);
    }

    /// Owns one generator and erases it at its own event.
    struct Eraser {
        fired: Arc<AtomicUsize>,
    }

    impl ExecutiveModel<f64, i32> for Eraser {
        fn children(&mut self, _common: &Common) -> Vec<M> {
            vec![Generator::model(1.0, 1, Arc::clone(&self.fired))]
        }

        fn post(
            &self,
            _out: &BTreeSet<ChildId>,
            _ctx: &mut RouteCtx<'_, f64, i32>,
        ) -> KernelResult<()> {
            Ok(())
        }

        fn init(&mut self, _common: &Common, _t: f64) -> f64 {
            1.5
        }

        fn delta(
            &mut self,
            _e: f64,
            _x: &PortList<i32>,
            ctx: &mut StructureCtx<'_, f64, i32>,
        ) -> f64 {
            let removed = ctx.erase(ChildId(0));
            assert!(removed.is_some());
            f64::INFINITY
        }

        fn lambda(&self, _y: &mut PortList<i32>) {}
    }

    #[test]
    fn erased_child_stops_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut root = Model::executive(
            Eraser {
                fired: Arc::clone(&fired),
            },
            &[],
            &[],
            &[],
            &[],
        );

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        assert_eq!(t, 1.0);

        t = engine.run(&mut root, t).unwrap(); // generator fires at 1.0
        assert_eq!(t, 1.5);
        t = engine.run(&mut root, t).unwrap(); // executive erases it
        assert_eq!(t, f64::INFINITY);
        assert!(root.child_ids().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    /// Routes a generator child's output into its own chi input.
    struct Collector {
        received: Arc<Mutex<Vec<(f64, i32)>>>,
        fired: Arc<AtomicUsize>,
    }

    impl ExecutiveModel<f64, i32> for Collector {
        fn children(&mut self, _common: &Common) -> Vec<M> {
            vec![Generator::model(1.0, 3, Arc::clone(&self.fired))]
        }

        fn post(
            &self,
            out: &BTreeSet<ChildId>,
            ctx: &mut RouteCtx<'_, f64, i32>,
        ) -> KernelResult<()> {
            if out.contains(&ChildId(0)) {
                ctx.copy(Src::Child(ChildId(0), 0), Dst::Chi(0))?;
            }
            Ok(())
        }

        fn init(&mut self, _common: &Common, _t: f64) -> f64 {
            f64::INFINITY
        }

        fn delta(
            &mut self,
            e: f64,
            x: &PortList<i32>,
            _ctx: &mut StructureCtx<'_, f64, i32>,
        ) -> f64 {
            for &value in x.values(0) {
                self.received.lock().unwrap().push((e, value));
            }
            f64::INFINITY
        }

        fn lambda(&self, _y: &mut PortList<i32>) {}
    }

    #[test]
    fn child_output_reaches_the_executive_entity() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut root = Model::executive(
            Collector {
                received: Arc::clone(&received),
                fired,
            },
            &[],
            &[],
            &["in"],
            &[],
        );

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        for _ in 0..2 {
            t = engine.run(&mut root, t).unwrap();
        }

        let received = received.lock().unwrap();
        assert_eq!(&*received, &[(1.0, 3), (1.0, 3)], "one delivery per event");
    }
}

// ── Scenario 5: parallel ≡ sequential ─────────────────────────────────────────

#[cfg(test)]
mod policies {
    use super::*;

    /// Run a three-generator network for `events` events, recording the
    /// `(t, forwarded outputs)` trajectory at the root's border.
    fn trajectory(policy: TransitionPolicy, events: usize) -> Vec<(f64, Vec<i32>)> {
        let sum = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));
        let net = Network {
            build: vec![
                Generator::model(1.0, 1, Arc::clone(&fired)),
                Generator::model(0.5, 2, Arc::clone(&fired)),
                Generator::model(0.25, 3, Arc::clone(&fired)),
                Counter::model(sum),
            ],
            links: vec![
                (Src::Child(ChildId(0), 0), Dst::Child(ChildId(3), 0)),
                (Src::Child(ChildId(0), 0), Dst::Own(0)),
                (Src::Child(ChildId(1), 0), Dst::Child(ChildId(3), 0)),
                (Src::Child(ChildId(1), 0), Dst::Own(0)),
                (Src::Child(ChildId(2), 0), Dst::Child(ChildId(3), 0)),
                (Src::Child(ChildId(2), 0), Dst::Own(0)),
            ],
        };
        let mut root = Model::coupled_with_policy(net, &[], &["out"], policy);

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        let mut trace = Vec::with_capacity(events);
        for _ in 0..events {
            let at = t;
            t = engine.run(&mut root, at).unwrap();
            trace.push((at, root.y.values(0).to_vec()));
            root.y.clear();
        }
        trace
    }

    #[test]
    fn parallel_matches_sequential_over_100_events() {
        let sequential = trajectory(TransitionPolicy::Sequential, 100);
        let parallel = trajectory(TransitionPolicy::Parallel, 100);
        assert_eq!(sequential.len(), 100);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn simultaneous_events_share_one_bag() {
        // At t = 1.0 all three generators are imminent; their outputs land
        // in the same event's trace entry, in link order.
        let trace = trajectory(TransitionPolicy::Sequential, 100);
        let at_one = trace.iter().find(|(t, _)| *t == 1.0).unwrap();
        assert_eq!(at_one.1, vec![1, 2, 3]);
    }
}

// ── Hierarchy and routing ─────────────────────────────────────────────────────

#[cfg(test)]
mod hierarchy {
    use super::*;

    #[test]
    fn child_output_forwards_up_through_border_ports() {
        // inner: generator whose output forwards to the inner border.
        // outer: inner's border output routes into a counter.
        let fired = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));
        let inner = Network::model(
            vec![Generator::model(1.0, 1, fired)],
            vec![(Src::Child(ChildId(0), 0), Dst::Own(0))],
            &[],
            &["out"],
        );
        let mut root = Network::model(
            vec![inner, Counter::model(Arc::clone(&sum))],
            vec![(Src::Child(ChildId(0), 0), Dst::Child(ChildId(1), 0))],
            &[],
            &[],
        );

        let engine = Engine::new();
        let mut t = engine.pre(&mut root, 0.0);
        for _ in 0..3 {
            t = engine.run(&mut root, t).unwrap();
        }
        assert_eq!(t, 4.0);
        assert_eq!(sum.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn external_input_forwards_down_two_levels() {
        let sum = Arc::new(AtomicUsize::new(0));
        let inner = Network::model(
            vec![Counter::model(Arc::clone(&sum))],
            vec![(Src::Own(0), Dst::Child(ChildId(0), 0))],
            &["in"],
            &[],
        );
        let mut root = Network::model(
            vec![inner],
            vec![(Src::Own(0), Dst::Child(ChildId(0), 0))],
            &["in"],
            &[],
        );

        let engine = Engine::new();
        engine.pre(&mut root, 0.0);

        root.x.push(0, 7);
        root.transition(0.5).unwrap();

        assert_eq!(sum.load(Ordering::SeqCst), 7);
        assert!(root.x.is_empty());
        assert_eq!(root.tl, 0.5);
        let inner = root.child(ChildId(0)).unwrap();
        assert_eq!(inner.tl, 0.5);
    }

    #[test]
    fn chi_destination_on_plain_coupled_is_a_routing_error() {
        let mut root = Network::model(
            vec![],
            vec![(Src::Own(0), Dst::Chi(0))],
            &["in"],
            &[],
        );
        let engine = Engine::new();
        engine.pre(&mut root, 0.0);

        root.x.push(0, 1);
        let err = root.transition(0.5).unwrap_err();
        assert!(matches!(err, KernelError::Routing(_)), "{err}");
    }

    #[test]
    fn out_of_range_destination_port_surfaces_as_port_error() {
        let fired = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));
        let mut root = Network::model(
            vec![
                Generator::model(1.0, 1, fired),
                Counter::model(sum),
            ],
            // The counter has exactly one input port; port 5 is invalid.
            vec![(Src::Child(ChildId(0), 0), Dst::Child(ChildId(1), 5))],
            &[],
            &[],
        );

        let engine = Engine::new();
        let t = engine.pre(&mut root, 0.0);
        let err = engine.run(&mut root, t).unwrap_err();
        assert!(matches!(err, KernelError::Port(_)), "{err}");
    }
}

// ── Engine driver loop ────────────────────────────────────────────────────────

#[cfg(test)]
mod driver {
    use super::*;

    struct EventTrace {
        starts: Vec<f64>,
        ends: Vec<f64>,
        final_t: Option<f64>,
    }

    impl EngineObserver<f64> for EventTrace {
        fn on_event_start(&mut self, t: f64) {
            self.starts.push(t);
        }
        fn on_event_end(&mut self, t: f64) {
            self.ends.push(t);
        }
        fn on_sim_end(&mut self, t: f64) {
            self.final_t = Some(t);
        }
    }

    #[test]
    fn simulate_drives_until_horizon() {
        let fired = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));
        let mut root = gen_counter_net(1.0, Arc::clone(&fired), sum);

        let mut trace = EventTrace {
            starts: Vec::new(),
            ends: Vec::new(),
            final_t: None,
        };
        let engine = Engine::new();
        let end = engine.simulate(&mut root, 0.0, 4.5, &mut trace).unwrap();

        assert_eq!(end, 5.0, "first event past the horizon");
        assert_eq!(trace.starts, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(trace.ends, trace.starts);
        assert_eq!(trace.final_t, Some(5.0));
        assert_eq!(fired.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn simulate_stops_at_event_exhaustion() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut root = Pulse::model(1.0, Arc::clone(&log));
        let engine = Engine::new();
        let end = engine
            .simulate(&mut root, 0.0, f64::INFINITY, &mut crate::NoopObserver)
            .unwrap();
        assert_eq!(end, f64::INFINITY);
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
