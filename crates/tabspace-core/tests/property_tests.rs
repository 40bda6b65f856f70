//! Sequence properties of the engine

use proptest::prelude::*;
use tabspace_core::{derive_url, OpenOptions, PaneId, WorkspaceEngine};
use tabspace_test_utils::{active_route, assert_invariants, setup_test_engine};

const ROUTES: &[&str] = &[
    "/",
    "/chat",
    "/chat/conv_1",
    "/chat/conv_2",
    "/page",
    "/page/page_1",
    "/page/page_2",
    "/wiki",
    "/wiki/alpha",
    "/person/person_jane",
    "/day",
    "/day/day_2025-12-09",
    "/source/source_gmail",
    "/virtues/sql",
    "/nowhere/at/all",
];

#[derive(Debug, Clone)]
enum Op {
    Open { route: usize, force_new: bool, pane: Option<PaneId> },
    Close(usize),
    Activate(usize),
    Pin(usize),
    Move(usize),
    Split,
    Unsplit,
    Back,
    Forward,
}

fn pane_strategy() -> impl Strategy<Value = Option<PaneId>> {
    prop_oneof![Just(None), Just(Some(PaneId::Left)), Just(Some(PaneId::Right))]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ROUTES.len(), any::<bool>(), pane_strategy())
            .prop_map(|(route, force_new, pane)| Op::Open { route, force_new, pane }),
        3 => (0..16usize).prop_map(Op::Close),
        1 => (0..16usize).prop_map(Op::Activate),
        1 => (0..16usize).prop_map(Op::Pin),
        1 => (0..16usize).prop_map(Op::Move),
        1 => Just(Op::Split),
        1 => Just(Op::Unsplit),
        1 => Just(Op::Back),
        1 => Just(Op::Forward),
    ]
}

fn nth_tab(engine: &WorkspaceEngine, n: usize) -> Option<tabspace_core::TabId> {
    let count = engine.state().tab_count();
    if count == 0 {
        return None;
    }
    engine.state().tabs().nth(n % count).map(|t| t.id)
}

fn apply(engine: &mut WorkspaceEngine, op: &Op) {
    match op {
        Op::Open { route, force_new, pane } => {
            let mut options = pane.map_or_else(OpenOptions::new, OpenOptions::in_pane);
            if *force_new {
                options = options.force_new();
            }
            engine.open_tab_from_route(ROUTES[*route], options);
        }
        Op::Close(n) => {
            if let Some(id) = nth_tab(engine, *n) {
                engine.close_tab(id);
            }
        }
        Op::Activate(n) => {
            if let Some(id) = nth_tab(engine, *n) {
                engine.activate_tab(id);
            }
        }
        Op::Pin(n) => {
            if let Some(id) = nth_tab(engine, *n) {
                engine.toggle_pin(id);
            }
        }
        Op::Move(n) => {
            if let Some(id) = nth_tab(engine, *n) {
                let target = match engine.state().find_tab(id) {
                    Some((PaneId::Left, _)) => PaneId::Right,
                    _ => PaneId::Left,
                };
                engine.move_tab_to_pane(id, target);
            }
        }
        Op::Split => {
            engine.enable_split();
        }
        Op::Unsplit => {
            engine.disable_split();
        }
        Op::Back => {
            engine.go_back();
        }
        Op::Forward => {
            engine.go_forward();
        }
    }
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut engine = setup_test_engine();
        for op in &ops {
            apply(&mut engine, op);
            assert_invariants(engine.state());
            prop_assert_eq!(engine.current_url(), derive_url(engine.state()));
        }
    }

    #[test]
    fn open_close_never_duplicates_tab_ids(
        opens in prop::collection::vec((0..ROUTES.len(), any::<bool>()), 1..40),
        closes in prop::collection::vec(0..16usize, 0..40),
    ) {
        let mut engine = setup_test_engine();
        for (i, (route, force_new)) in opens.iter().enumerate() {
            let options = if *force_new { OpenOptions::new().force_new() } else { OpenOptions::new() };
            engine.open_tab_from_route(ROUTES[*route], options);
            if let Some(n) = closes.get(i) {
                if let Some(id) = nth_tab(&engine, *n) {
                    engine.close_tab(id);
                }
            }
            let ids: Vec<_> = engine.state().tabs().map(|t| t.id).collect();
            let mut unique = ids.clone();
            unique.sort_by_key(|id| id.0);
            unique.dedup();
            prop_assert_eq!(ids.len(), unique.len());
        }
    }

    #[test]
    fn url_round_trip_reproduces_active_routes(
        left in prop_oneof![
            Just("/".to_string()),
            Just("/chat".to_string()),
            (1..50u32).prop_map(|n| format!("/chat/conv_{n}")),
            (1..50u32).prop_map(|n| format!("/page/page_{n}")),
            Just("/day/day_2025-12-10".to_string()),
        ],
        right in prop::option::of(prop_oneof![
            "[a-z]{1,12}".prop_map(|slug| format!("/wiki/{slug}")),
            (1..50u32).prop_map(|n| format!("/person/person_{n}")),
            Just("/virtues/sql".to_string()),
        ]),
    ) {
        let url = match &right {
            Some(right) => format!("{left}?right={right}"),
            None => left.clone(),
        };

        let mut engine = setup_test_engine();
        engine.apply_url(&url);

        prop_assert_eq!(active_route(engine.state(), PaneId::Left), Some(left));
        prop_assert_eq!(active_route(engine.state(), PaneId::Right), right);
        prop_assert_eq!(derive_url(engine.state()), url.clone());
        prop_assert_eq!(engine.current_url(), url);
        assert_invariants(engine.state());
    }
}
