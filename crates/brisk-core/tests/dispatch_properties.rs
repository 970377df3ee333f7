//! Property tests for route dispatch
//!
//! - static routes always beat a parameter sibling, and the parameter still
//!   catches everything else
//! - surrounding slashes never change the outcome
//! - the first-byte index agrees with a plain scan of registered literals
//! - the result cache never grows past its configured size
//! - failed branches never leave captures behind

use std::collections::BTreeSet;

use brisk_core::{Method, Router, RouterConfig};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_-]{0,7}"
}

proptest! {
    #[test]
    fn prop_static_beats_param(literal in segment(), other in segment()) {
        prop_assume!(literal != other);

        let router = Router::new();
        router.get("/items/:id", 1u32).unwrap();
        router.get(&format!("/items/{literal}"), 2u32).unwrap();

        let exact = router.find_route(Method::Get, &format!("/items/{literal}")).unwrap();
        prop_assert_eq!(*exact.payload(), 2);
        prop_assert!(exact.params.is_empty());

        let fallback = router.find_route(Method::Get, &format!("/items/{other}")).unwrap();
        prop_assert_eq!(*fallback.payload(), 1);
        prop_assert_eq!(fallback.param("id"), Some(other.as_str()));
    }

    #[test]
    fn prop_slashes_do_not_matter(
        segments in prop::collection::vec(segment(), 1..6),
        leading in any::<bool>(),
        trailing in any::<bool>(),
    ) {
        let canonical = format!("/{}", segments.join("/"));
        let router = Router::new();
        router.get(&canonical, 7u32).unwrap();

        let mut variant = segments.join("/");
        if leading {
            variant.insert(0, '/');
        }
        if trailing {
            variant.push('/');
        }

        let m = router.find_route(Method::Get, &variant);
        prop_assert_eq!(m.map(|m| *m.payload()), Some(7));
    }

    #[test]
    fn prop_static_index_agrees_with_scan(
        literals in prop::collection::btree_set(segment(), 1..40),
        probes in prop::collection::vec(segment(), 1..20),
    ) {
        let router = Router::with_config(RouterConfig::new().cache_enabled(false));
        for (i, literal) in literals.iter().enumerate() {
            router.get(&format!("/dir/{literal}/leaf"), i as u32).unwrap();
        }

        for (i, literal) in literals.iter().enumerate() {
            let m = router.find_route(Method::Get, &format!("/dir/{literal}/leaf"));
            prop_assert_eq!(m.map(|m| *m.payload()), Some(i as u32));
        }
        for probe in probes {
            let m = router.find_route(Method::Get, &format!("/dir/{probe}/leaf"));
            prop_assert_eq!(m.is_some(), literals.contains(&probe));
        }
    }

    #[test]
    fn prop_cache_never_exceeds_max(
        max_size in 1usize..50,
        lookups in prop::collection::vec((0u8..3, segment()), 1..300),
    ) {
        let router = Router::with_config(RouterConfig::new().cache_max_size(max_size));
        router.get("/u/:id", 1u32).unwrap();

        let methods = [Method::Get, Method::Post, Method::Delete];
        for (m, seg) in &lookups {
            router.find_route(methods[*m as usize], &format!("/u/{seg}"));
            prop_assert!(router.stats().cache_size <= max_size);
        }

        let distinct: BTreeSet<_> = lookups.iter().collect();
        prop_assert!(router.stats().cache_size <= distinct.len());
    }

    #[test]
    fn prop_backtracking_leaves_no_captures(
        first in segment(),
        middle in segment(),
        last in segment(),
    ) {
        prop_assume!(last != "end");

        let router = Router::with_config(RouterConfig::new().cache_enabled(false));
        router.get("/a/:x/:y/end", 1u32).unwrap();
        router.get("/a/:x/*", 2u32).unwrap();

        let m = router.find_route(Method::Get, &format!("/a/{first}/{middle}/{last}")).unwrap();
        prop_assert_eq!(*m.payload(), 2);
        prop_assert_eq!(m.to_owned_params(), vec![("x".to_string(), first.clone())]);

        let m = router.find_route(Method::Get, &format!("/a/{first}/{middle}/end")).unwrap();
        prop_assert_eq!(*m.payload(), 1);
        prop_assert_eq!(
            m.to_owned_params(),
            vec![("x".to_string(), first), ("y".to_string(), middle)]
        );
    }
}
