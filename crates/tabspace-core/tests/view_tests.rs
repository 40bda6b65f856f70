//! View resolution and entity metadata through the engine

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tabspace_cache::{MetadataPatch, ResolveError};
use tabspace_core::{OpenOptions, WorkspaceError};
use tabspace_test_utils::{engine_builder, entity, StaticViewResolver};

fn resolver() -> Arc<StaticViewResolver> {
    Arc::new(StaticViewResolver::new().with_view(
        "view_people",
        "person",
        vec![
            entity("/person/person_jane", "Jane Doe", "person"),
            entity("/person/person_omar", "Omar", "person"),
        ],
    ))
}

#[tokio::test]
async fn resolved_views_are_cached() {
    let resolver = resolver();
    let engine = engine_builder()
        .view_resolver(resolver.clone())
        .build()
        .unwrap();

    let first = engine.resolve_view("view_people", false).await.unwrap();
    let second = engine.resolve_view("view_people", false).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.calls(), 1);

    engine.resolve_view("view_people", true).await.unwrap();
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn namespace_invalidation_forces_refetch() {
    let resolver = resolver();
    let engine = engine_builder()
        .view_resolver(resolver.clone())
        .build()
        .unwrap();
    engine.resolve_view("view_people", false).await.unwrap();

    engine.invalidate_views(Some("page")).await;
    engine.resolve_view("view_people", false).await.unwrap();
    assert_eq!(resolver.calls(), 1);

    engine.invalidate_views(Some("person")).await;
    engine.resolve_view("view_people", false).await.unwrap();
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_entities() {
    let resolver = resolver();
    let engine = engine_builder()
        .view_resolver(resolver.clone())
        .build()
        .unwrap();
    let cached = engine.resolve_view("view_people", false).await.unwrap();

    resolver.fail_with(ResolveError::Network("offline".into()));
    let err = engine.resolve_view("view_people", true).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::View(_)));

    resolver.recover();
    assert_eq!(engine.resolve_view("view_people", false).await.unwrap(), cached);
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn resolved_entities_seed_metadata() {
    let engine = engine_builder().view_resolver(resolver()).build().unwrap();
    assert!(engine.entity_metadata("person_jane").placeholder);

    engine.resolve_view("view_people", false).await.unwrap();

    let jane = engine.entity_metadata("person_jane");
    assert_eq!(jane.name, "Jane Doe");
    assert!(!jane.placeholder);
}

#[test]
fn renaming_entity_relabels_tabs_in_both_panes() {
    let mut engine = engine_builder().build().unwrap();
    engine.open_tab_from_route("/page/page_7", OpenOptions::new().force_new());
    engine.enable_split();
    engine.open_tab_from_route(
        "/page/page_7",
        OpenOptions::in_pane(tabspace_core::PaneId::Right).force_new(),
    );

    engine.rename_entity("page_7", &MetadataPatch::rename("Roadmap").with_icon("ri:map-line"));

    let labels: Vec<_> = engine
        .state()
        .tabs()
        .filter(|t| t.route == "/page/page_7")
        .map(|t| (t.label.as_str(), t.icon.as_str()))
        .collect();
    assert_eq!(labels, vec![("Roadmap", "ri:map-line"), ("Roadmap", "ri:map-line")]);
    assert_eq!(engine.entity_metadata("page_7").name, "Roadmap");
}
