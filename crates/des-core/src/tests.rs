//! Unit tests for des-core primitives.

#[cfg(test)]
mod port {
    use crate::{PortError, PortList};

    #[test]
    fn starts_empty() {
        let list: PortList<i32> = PortList::from_names(&["a", "b"]);
        assert_eq!(list.len(), 2);
        assert!(list.is_empty());
        assert!(list.values(0).is_empty());
        assert!(list.values(1).is_empty());
    }

    #[test]
    fn push_raises_flag_and_clear_resets() {
        let mut list: PortList<i32> = PortList::from_names(&["a", "b"]);
        list.push(1, 42);
        assert!(!list.is_empty());
        assert_eq!(list.values(1), &[42]);

        list.clear();
        assert!(list.is_empty());
        assert!(list.values(1).is_empty());
    }

    #[test]
    fn mutable_access_alone_raises_flag() {
        // Matches the kernel contract: a model that touched a port for
        // writing counts as having written, even if it pushed nothing.
        let mut list: PortList<i32> = PortList::from_names(&["a"]);
        let _ = list.port_mut(0);
        assert!(!list.is_empty());
    }

    #[test]
    fn add_returns_sequential_indices() {
        let mut list: PortList<i32> = PortList::new();
        assert_eq!(list.add("x"), 0);
        assert_eq!(list.add("y"), 1);
        assert_eq!(list.port_index("y").unwrap(), 1);
    }

    #[test]
    fn name_lookup() {
        let mut list: PortList<i32> = PortList::from_names(&["in", "out"]);
        list.by_name_mut("out").unwrap().push(7);
        assert_eq!(list.by_name("out").unwrap(), &[7]);
        assert_eq!(
            list.by_name("missing").unwrap_err(),
            PortError::UnknownPort("missing".to_string()),
        );
    }

    #[test]
    fn range_checked_access() {
        let mut list: PortList<i32> = PortList::from_names(&["a"]);
        assert!(list.at(0).is_ok());
        assert_eq!(
            list.at(3).unwrap_err(),
            PortError::OutOfRange { index: 3, len: 1 },
        );
        assert!(list.at_mut(3).is_err());
        // A failed checked write must not raise the flag.
        assert!(list.is_empty());
    }
}

#[cfg(test)]
mod time {
    use crate::Time;

    #[test]
    fn sentinels_order() {
        assert!(f64::NEG_INFINITY < 0.0);
        assert!(0.0 < <f64 as Time>::INFINITY);
        assert!(!<f64 as Time>::INFINITY.is_finite());
        assert!(!<f64 as Time>::NEG_INFINITY.is_finite());
    }

    #[test]
    fn passive_advance_stays_infinite() {
        // tn = t + ∞ must be ∞ for any finite t.
        let t = 3.5f64;
        assert_eq!(t.add(<f64 as Time>::INFINITY), f64::INFINITY);
        assert_eq!(t.add(<f64 as Time>::ZERO), t);
    }

    #[test]
    fn elapsed_duration() {
        let tl = 1.25f64;
        let t = 4.0f64;
        assert_eq!(t.sub(tl), 2.75);
    }
}

#[cfg(test)]
mod common {
    use crate::Common;

    #[test]
    fn insert_get_typed() {
        let mut common = Common::new();
        common.insert("threads", 4usize);
        common.insert("label", "run-a".to_string());

        assert_eq!(common.get::<usize>("threads"), Some(&4));
        assert_eq!(common.get::<String>("label").unwrap(), "run-a");
    }

    #[test]
    fn wrong_type_is_none() {
        let mut common = Common::new();
        common.insert("threads", 4usize);
        assert_eq!(common.get::<String>("threads"), None);
        assert_eq!(common.get::<usize>("absent"), None);
    }

    #[test]
    fn clone_shares_entries() {
        let mut common = Common::new();
        common.insert("seed", 42u64);
        let copy = common.clone();
        assert_eq!(copy.get::<u64>("seed"), Some(&42));
        assert_eq!(copy.len(), 1);
    }
}
