mod common;

use common::*;
use serde_json::json;
use smart_dak::*;
use std::sync::Arc;

#[tokio::test]
async fn test_empty_aggregate_emits_metadata_and_all_nine_arrays() {
    let (factory, _staging) = test_factory();
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    let value = dak.to_json().await.unwrap();
    assert_eq!(value.get("id"), Some(&json!("who.anc-dak")));
    assert_eq!(value.get("status"), Some(&json!("draft")));
    for component_type in ComponentType::all() {
        assert_eq!(
            value.get(component_type.property_name()),
            Some(&json!([])),
            "expected empty array for {component_type}"
        );
    }
}

#[tokio::test]
async fn test_create_from_dak_json_roundtrip() {
    let input = json!({
        "id": "smart.who.int.immunizations",
        "name": "immunizations",
        "title": "WHO Immunizations DAK",
        "version": "1.2.0",
        "status": "active",
        "license": "CC-BY-4.0",
        "personas": [
            {"url": "fsh/actors/Nurse.fsh"},
            {"instance": {"id": "clerk", "responsibilities": ["register patients"]}}
        ],
        "indicators": [
            {"canonical": "http://smart.who.int/immunizations/Measure/IMMZ.IND.08"}
        ]
    });

    let document: DakDocument = serde_json::from_value(input.clone()).unwrap();
    let (factory, _staging) = test_factory();
    let dak = factory
        .create_from_dak_json(document, test_repository())
        .await;

    let output = dak.to_json().await.unwrap();
    for field in ["id", "name", "title", "version", "status", "license"] {
        assert_eq!(output.get(field), input.get(field), "field `{field}`");
    }
    assert_eq!(output.get("personas"), input.get("personas"));
    assert_eq!(output.get("indicators"), input.get("indicators"));
}

#[tokio::test]
async fn test_persona_source_loaded_from_document() {
    let document: DakDocument = serde_json::from_value(json!({
        "id": "smart.who.int.anc",
        "personas": [{"url": "fsh/actors/Nurse.fsh"}]
    }))
    .unwrap();

    let (factory, _staging) = test_factory();
    let dak = factory
        .create_from_dak_json(document, test_repository())
        .await;

    let sources = dak.personas().get_sources().await;
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].reference_string(), "fsh/actors/Nurse.fsh");
    assert_eq!(sources[0].kind(), SourceKind::RelativeUrl);
}

#[tokio::test]
async fn test_each_mutation_persists_full_document_once() {
    let (factory, staging) = test_factory();
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;
    assert_eq!(staging.document_writes(), 0);

    dak.decision_logic()
        .add_source(SourceDescriptor::relative_url("cql/IMMZ.D2.DT.BCG.cql"))
        .await
        .unwrap();
    assert_eq!(staging.document_writes(), 1);

    dak.decision_logic().remove_source(0).await.unwrap();
    assert_eq!(staging.document_writes(), 2);

    let staged = staging.load_document().await.unwrap().unwrap();
    assert!(staged.sources(ComponentType::DecisionLogic).is_empty());
}

#[tokio::test]
async fn test_update_metadata_persists_before_returning() {
    let (factory, staging) = test_factory();
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    dak.update_metadata(MetadataPatch {
        status: Some(DakStatus::Active),
        version: Some("0.2.0".to_string()),
        ..Default::default()
    })
    .await
    .unwrap();

    let staged = staging.load_document().await.unwrap().unwrap();
    assert_eq!(staged.metadata.status, DakStatus::Active);
    assert_eq!(staged.metadata.version.as_deref(), Some("0.2.0"));
}

#[tokio::test]
async fn test_component_lookup_covers_all_nine_types() {
    let (factory, _staging) = test_factory();
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    for component_type in ComponentType::all() {
        let object = dak.component(*component_type).unwrap();
        assert_eq!(object.component_type(), *component_type);
    }
}

#[tokio::test]
async fn test_sequential_canonical_resolves_fetch_once() {
    init_tracing();
    let http = Arc::new(CountingHttpClient::json_ok(r#"{"id": "IMMZ.IND.08"}"#));
    let resolver = Arc::new(
        SourceResolver::new(
            http.clone(),
            Arc::new(MemoryFileLoader::new()),
            ResolverConfig::default(),
        )
        .unwrap(),
    );
    let factory = DakFactory::new(resolver, Arc::new(MemoryStagingGround::new()));
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    dak.indicators()
        .add_source(SourceDescriptor::canonical(
            url::Url::parse("http://example.com/x").unwrap(),
        ))
        .await
        .unwrap();

    let first = dak.indicators().retrieve_all().await;
    let second = dak.indicators().retrieve_all().await;
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(http.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_descriptor_rejected_without_state_change() {
    let (factory, staging) = test_factory();
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    // A raw descriptor with no reference field cannot even deserialize.
    let raw: std::result::Result<SourceDescriptor, _> =
        serde_json::from_value(json!({"metadata": {"addedBy": "editor"}}));
    assert!(raw.is_err());

    // A structurally unsafe one deserializes but is rejected by add_source.
    let unsafe_descriptor: SourceDescriptor =
        serde_json::from_value(json!({"url": "../outside.fsh"})).unwrap();
    let error = dak
        .personas()
        .add_source(unsafe_descriptor)
        .await
        .unwrap_err();

    assert!(matches!(error, DakError::InvalidSource { .. }));
    assert!(dak.personas().get_sources().await.is_empty());
    assert_eq!(staging.document_writes(), 0);
}

#[tokio::test]
async fn test_relative_sources_resolve_through_repository_files() {
    init_tracing();
    let files = MemoryFileLoader::new();
    files
        .put_file(
            "who",
            "anc-dak",
            "main",
            "input/personas/nurse.json",
            r#"{"id": "nurse", "responsibilities": ["triage"]}"#,
        )
        .await;

    let resolver = Arc::new(
        SourceResolver::new(
            Arc::new(CountingHttpClient::json_ok("{}")),
            Arc::new(files),
            ResolverConfig::default(),
        )
        .unwrap(),
    );
    let factory = DakFactory::new(resolver, Arc::new(MemoryStagingGround::new()));
    let dak = factory
        .create_empty(test_repository(), MetadataPatch::default())
        .await;

    dak.personas()
        .add_source(SourceDescriptor::relative_url("personas/nurse.json"))
        .await
        .unwrap();

    let resolved = dak.personas().retrieve_by_id("nurse").await.unwrap();
    assert_eq!(
        resolved.as_json().unwrap().get("responsibilities"),
        Some(&json!(["triage"]))
    );
    assert!(dak.personas().validate_all().await.is_empty());
}
