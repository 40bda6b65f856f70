//! End-to-end behavior of the workspace engine

use pretty_assertions::assert_eq;
use tabspace_core::{OpenOptions, PaneId, UrlMode};
use tabspace_test_utils::{active_route, assert_invariants, setup_test_engine};

fn routes(engine: &tabspace_core::WorkspaceEngine, pane: PaneId) -> Vec<String> {
    engine
        .state()
        .pane(pane)
        .map(|p| p.tabs.iter().map(|t| t.route.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn closing_active_tab_activates_neighbor() {
    let mut engine = setup_test_engine();
    engine.reset();
    let t1 = engine.state().active_tab().unwrap().id;
    engine.open_tab_from_route("/page/page_2", OpenOptions::new().force_new());
    let t2 = engine.state().active_tab().unwrap().id;
    engine.activate_tab(t1);

    engine.close_tab(t1);

    let pane = engine.state().pane(PaneId::Left).unwrap();
    assert_eq!(pane.tabs.len(), 1);
    assert_eq!(pane.tabs[0].id, t2);
    assert_eq!(pane.active_tab_id, Some(t2));
    assert_invariants(engine.state());
}

#[test]
fn enabling_split_halves_widths() {
    let mut engine = setup_test_engine();
    let t1 = engine.state().active_tab().unwrap().id;

    engine.enable_split();

    let left = engine.state().pane(PaneId::Left).unwrap();
    let right = engine.state().pane(PaneId::Right).unwrap();
    assert_eq!(left.tabs.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t1]);
    assert!((left.width_percent - 50.0).abs() < f64::EPSILON);
    assert!(right.tabs.is_empty());
    assert!((right.width_percent - 50.0).abs() < f64::EPSILON);
    assert_invariants(engine.state());
}

#[test]
fn split_url_carries_both_routes() {
    let mut engine = setup_test_engine();
    engine.open_tab_from_route("/chat/conv_a", OpenOptions::new());
    engine.enable_split();
    let update = engine
        .open_tab_from_route("/wiki/b", OpenOptions::in_pane(PaneId::Right))
        .unwrap();

    assert_eq!(update.url, "/chat/conv_a?right=/wiki/b");
    assert_eq!(update.mode, UrlMode::Push);
    assert_eq!(engine.snapshot().url, "/chat/conv_a?right=/wiki/b");
}

#[test]
fn reopening_existing_identity_activates_it_once() {
    let mut engine = setup_test_engine();
    engine.open_tab_from_route("/day/day_2025-12-10", OpenOptions::new().force_new());
    let day = engine.state().active_tab().unwrap().id;
    engine.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
    let tabs_before = engine.state().tab_count();
    let history_before = engine.history().len();

    engine.open_tab_from_route("/day/day_2025-12-10", OpenOptions::new());

    assert_eq!(engine.state().tab_count(), tabs_before);
    assert_eq!(engine.state().active_tab().unwrap().id, day);
    assert_eq!(engine.history().len(), history_before + 1);
    assert_eq!(engine.history().current(), Some(day));
}

#[test]
fn bare_day_route_matches_todays_tab() {
    let mut engine = setup_test_engine();
    engine.open_tab_from_route("/day/day_2025-12-10", OpenOptions::new().force_new());
    let day = engine.state().active_tab().unwrap().id;
    engine.open_tab_from_route("/chat", OpenOptions::new().force_new());

    engine.open_tab_from_route("/day", OpenOptions::new());

    assert_eq!(engine.state().active_tab().unwrap().id, day);
}

#[test]
fn closing_only_tab_opens_default() {
    let mut engine = setup_test_engine();
    let only = engine.state().active_tab().unwrap().id;

    engine.close_tab(only);

    let pane = engine.state().pane(PaneId::Left).unwrap();
    assert_eq!(pane.tabs.len(), 1);
    assert_ne!(pane.tabs[0].id, only);
    assert_eq!(pane.active_tab_id, Some(pane.tabs[0].id));
    assert_eq!(pane.tabs[0].route, "/");
    assert_invariants(engine.state());
}

#[test]
fn closing_only_tab_without_default_leaves_empty_pane() {
    let mut engine = tabspace_test_utils::engine_builder()
        .config(tabspace_core::WorkspaceConfig::default().with_open_default_on_empty(false))
        .build()
        .unwrap();
    engine.open_tab_from_route("/chat", OpenOptions::new());
    let only = engine.state().active_tab().unwrap().id;

    engine.close_tab(only);

    let pane = engine.state().pane(PaneId::Left).unwrap();
    assert!(pane.tabs.is_empty());
    assert_eq!(pane.active_tab_id, None);
    assert_eq!(engine.current_url(), "/");
    assert_invariants(engine.state());
}

#[test]
fn closing_last_right_tab_collapses_split() {
    let mut engine = setup_test_engine();
    engine.enable_split();
    engine.open_tab_from_route("/wiki", OpenOptions::in_pane(PaneId::Right));
    let right = engine.state().active_tab().unwrap().id;

    engine.close_tab(right);

    assert!(!engine.state().is_split());
    assert_eq!(engine.current_url(), "/");
    assert_invariants(engine.state());
}

#[test]
fn closing_only_left_tab_beside_empty_right_opens_default() {
    let mut engine = setup_test_engine();
    let only = engine.state().active_tab().unwrap().id;
    engine.enable_split();

    engine.close_tab(only);

    assert!(!engine.state().is_split());
    let pane = engine.state().pane(PaneId::Left).unwrap();
    assert_eq!(pane.tabs.len(), 1);
    assert_ne!(pane.tabs[0].id, only);
    assert_eq!(pane.active_tab_id, Some(pane.tabs[0].id));
    assert_eq!(engine.current_url(), "/");
    assert_invariants(engine.state());
}

#[test]
fn split_round_trip_keeps_tabs_and_active() {
    let mut engine = setup_test_engine();
    engine.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
    engine.open_tab_from_route("/page/page_2", OpenOptions::new().force_new());
    let before = engine.state().clone();

    engine.enable_split();
    engine.disable_split();

    let after = engine.state();
    assert_eq!(
        after.tabs().map(|t| t.id).collect::<Vec<_>>(),
        before.tabs().map(|t| t.id).collect::<Vec<_>>()
    );
    assert_eq!(after.active_tab().map(|t| t.id), before.active_tab().map(|t| t.id));
    assert_invariants(after);
}

#[test]
fn moving_tab_right_and_back() {
    let mut engine = setup_test_engine();
    engine.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
    let page = engine.state().active_tab().unwrap().id;

    engine.enable_split();
    engine.move_tab_to_pane(page, PaneId::Right);
    assert_eq!(routes(&engine, PaneId::Right), vec!["/page/page_1".to_string()]);
    assert_eq!(engine.current_url(), "/?right=/page/page_1");

    engine.move_tab_to_pane(page, PaneId::Left);
    assert!(!engine.state().is_split());
    assert_invariants(engine.state());
}

#[test]
fn deep_link_reproduces_panes() {
    let mut engine = setup_test_engine();

    engine.apply_url("/person/person_jane?right=%2Fpage%2Fpage_9");

    assert_eq!(active_route(engine.state(), PaneId::Left).as_deref(), Some("/person/person_jane"));
    assert_eq!(active_route(engine.state(), PaneId::Right).as_deref(), Some("/page/page_9"));
    assert_eq!(engine.current_url(), "/person/person_jane?right=/page/page_9");
    assert_invariants(engine.state());
}

#[test]
fn pinned_tabs_survive_close_others() {
    let mut engine = setup_test_engine();
    let home = engine.state().active_tab().unwrap().id;
    engine.toggle_pin(home);
    engine.open_tab_from_route("/page/page_1", OpenOptions::new().force_new());
    engine.open_tab_from_route("/page/page_2", OpenOptions::new().force_new());
    let keep = engine.state().active_tab().unwrap().id;

    engine.close_other_tabs(keep);

    let ids: Vec<_> = engine.state().tabs().map(|t| t.id).collect();
    assert_eq!(ids, vec![home, keep]);
    assert_invariants(engine.state());
}
