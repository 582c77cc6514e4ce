// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end runs through [`PipelineService`] against stub and local
//! adapters, exercised with both executors.

use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::local::DictToList;
use crate::backends::stub::{
    CountingAdapter, FailingAdapter, RecordingAdapter, SlowAdapter, StubAdapter,
};
use crate::config::{OperationRegistry, Runtime};
use crate::engine::{LevelByLevelExecutor, RunOptions, SequentialExecutor};
use crate::errors::{FailureStrategy, NodeErrorKind, PipelineError, ValidationError};
use crate::service::PipelineService;
use crate::store::{InMemoryRunStore, NodeStatus, RunFilter, RunId, RunSnapshot, RunStatus};
use crate::traits::{Adapter, DagExecutor};

fn executors() -> Vec<Box<dyn DagExecutor>> {
    vec![
        Box::new(SequentialExecutor::new()),
        Box::new(LevelByLevelExecutor::new(4)),
    ]
}

fn registry(adapters: Vec<(&str, Arc<dyn Adapter>)>) -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    for (name, adapter) in adapters {
        registry.register(name, adapter).unwrap();
    }
    registry
}

fn service(
    registry: OperationRegistry,
    executor: Box<dyn DagExecutor>,
    options: RunOptions,
) -> PipelineService {
    PipelineService::new(Runtime {
        registry,
        executor,
        store: Arc::new(InMemoryRunStore::new()),
        options,
    })
}

async fn wait_until_finished(service: &PipelineService, run_id: RunId) -> RunSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = service.status(run_id).await.unwrap();
            if snapshot.is_finished() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("run did not finish in time")
}

fn status_of(snapshot: &RunSnapshot, id: &str) -> NodeStatus {
    snapshot
        .node(id)
        .unwrap_or_else(|| panic!("no node {}", id))
        .status
}

#[tokio::test]
async fn test_single_operation_succeeds_with_adapter_output() {
    for executor in executors() {
        let strategy = executor.strategy_name();
        let service = service(
            registry(vec![(
                "deploy_model",
                Arc::new(StubAdapter::returning(json!({"service": "m1-service"}))),
            )]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({"raw_input": [{"operation": "deploy_model", "parameters": {"model": "m1"}}]}))
            .await
            .unwrap();

        assert_eq!(snapshot.status, RunStatus::Succeeded, "{}", strategy);
        assert_eq!(snapshot.nodes.len(), 1);
        let node = snapshot.node("deploy_model (1)").unwrap();
        assert_eq!(node.status, NodeStatus::Succeeded);
        assert_eq!(node.output, Some(json!({"service": "m1-service"})));
        assert!(node.started_at.is_some() && node.finished_at.is_some());
    }
}

#[tokio::test]
async fn test_nested_chain_threads_outputs() {
    for executor in executors() {
        let (inference, seen) = RecordingAdapter::new(json!({"results": ["cat", "dog"]}));
        let service = service(
            registry(vec![
                (
                    "import_from_google_drive",
                    Arc::new(StubAdapter::returning(json!({"b.png": "Qg==", "a.png": "QQ=="}))),
                ),
                ("dict_to_list", Arc::new(DictToList)),
                ("model_inference", Arc::new(inference)),
            ]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({
                "raw_input": [{
                    "operation": "model_inference",
                    "parameters": {
                        "model": "m1",
                        "data": {
                            "operation": "dict_to_list",
                            "parameters": {
                                "data": {
                                    "operation": "import_from_google_drive",
                                    "parameters": {"file_id": "abc123"}
                                }
                            }
                        }
                    }
                }]
            }))
            .await
            .unwrap();

        assert_eq!(snapshot.status, RunStatus::Succeeded);
        assert_eq!(
            snapshot.order,
            vec![
                "import_from_google_drive (3)",
                "dict_to_list (2)",
                "model_inference (1)"
            ]
        );
        assert_eq!(snapshot.roots, vec!["model_inference (1)"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("data"), Some(&json!(["QQ==", "Qg=="])));
        assert_eq!(seen[0].get("model"), Some(&json!("m1")));
        assert_eq!(
            snapshot.node("model_inference (1)").unwrap().output,
            Some(json!({"results": ["cat", "dog"]}))
        );
    }
}

#[tokio::test]
async fn test_failed_branch_does_not_stop_siblings() {
    for executor in executors() {
        let service = service(
            registry(vec![
                ("deploy_model", Arc::new(StubAdapter::returning(json!("ok")))),
                ("import_from_s3", Arc::new(FailingAdapter::new("access denied"))),
            ]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({"raw_input": [
                {"operation": "deploy_model", "parameters": {"model": "m1"}},
                {"operation": "import_from_s3", "parameters": {"bucket": "b"}}
            ]}))
            .await
            .unwrap();

        assert_eq!(status_of(&snapshot, "deploy_model (1)"), NodeStatus::Succeeded);
        let import = snapshot.node("import_from_s3 (2)").unwrap();
        assert_eq!(import.status, NodeStatus::Failed);
        let error = import.error.as_ref().unwrap();
        assert_eq!(error.kind, NodeErrorKind::Adapter);
        assert!(error.message.contains("access denied"));
        assert_eq!(snapshot.status, RunStatus::Failed);
        assert!(!snapshot.cancelled);
    }
}

#[tokio::test]
async fn test_unknown_operation_fails_only_its_node() {
    for executor in executors() {
        let service = service(
            registry(vec![("deploy_model", Arc::new(StubAdapter::returning(json!("ok"))))]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({"raw_input": [
                {"operation": "export_to_s3", "parameters": {"inference_results": []}},
                {"operation": "deploy_model", "parameters": {"model": "m1"}}
            ]}))
            .await
            .unwrap();

        let unknown = snapshot.node("export_to_s3 (1)").unwrap();
        assert_eq!(unknown.status, NodeStatus::Failed);
        assert_eq!(
            unknown.error.as_ref().map(|e| e.kind),
            Some(NodeErrorKind::UnknownOperation)
        );
        assert_eq!(status_of(&snapshot, "deploy_model (2)"), NodeStatus::Succeeded);
        assert_eq!(snapshot.status, RunStatus::Failed);
    }
}

#[tokio::test]
async fn test_cycle_is_rejected_before_anything_runs() {
    let (counting, calls) = CountingAdapter::new(json!("ok"));
    let service = service(
        registry(vec![("dict_to_list", Arc::new(counting))]),
        Box::new(SequentialExecutor::new()),
        RunOptions::default(),
    );

    let err = service
        .run(&json!({"raw_input": [
            {"id": "a", "operation": "dict_to_list", "parameters": {"data": {"ref": "b"}}},
            {"id": "b", "operation": "dict_to_list", "parameters": {"data": {"ref": "a"}}}
        ]}))
        .await
        .unwrap_err();

    match err {
        PipelineError::Validation(errors) => assert!(matches!(
            errors.as_slice(),
            [ValidationError::CycleDetected { .. }]
        )),
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(service.list(RunFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_payload_creates_no_run() {
    let service = service(
        OperationRegistry::new(),
        Box::new(SequentialExecutor::new()),
        RunOptions::default(),
    );

    let err = service
        .submit(&json!({"raw_input": [{"parameters": {}}]}))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
    assert!(service.list(RunFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transitive_dependents_are_skipped_without_invocation() {
    for executor in executors() {
        let (counting, calls) = CountingAdapter::new(json!("ok"));
        let service = service(
            registry(vec![
                ("import_from_s3", Arc::new(FailingAdapter::new("no such key"))),
                ("dict_to_list", Arc::new(counting)),
            ]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({"raw_input": [{
                "operation": "dict_to_list",
                "parameters": {"data": {
                    "operation": "dict_to_list",
                    "parameters": {"data": {"operation": "import_from_s3"}}
                }}
            }]}))
            .await
            .unwrap();

        assert_eq!(status_of(&snapshot, "import_from_s3 (3)"), NodeStatus::Failed);
        for id in ["dict_to_list (2)", "dict_to_list (1)"] {
            let node = snapshot.node(id).unwrap();
            assert_eq!(node.status, NodeStatus::Skipped);
            assert!(node.resolved_inputs.is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_identical_submissions_are_independent_runs() {
    let service = service(
        registry(vec![
            ("deploy_model", Arc::new(StubAdapter::returning(json!("ok")))),
            ("import_from_s3", Arc::new(FailingAdapter::new("denied"))),
        ]),
        Box::new(SequentialExecutor::new()),
        RunOptions::default(),
    );
    let payload = json!({"raw_input": [
        {"operation": "deploy_model", "parameters": {"model": "m1"}},
        {"operation": "import_from_s3"}
    ]});

    let first = service.run(&payload).await.unwrap();
    let second = service.run(&payload).await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.order, second.order);
    assert_eq!(first.status, second.status);
    assert_eq!(service.list(RunFilter::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancel_marks_pending_nodes_cancelled() {
    for executor in executors() {
        let service = service(
            registry(vec![
                (
                    "deploy_model",
                    Arc::new(SlowAdapter::new(Duration::from_millis(300), json!("ok"))),
                ),
                ("model_inference", Arc::new(StubAdapter::returning(json!([])))),
            ]),
            executor,
            RunOptions::default(),
        );

        let run_id = service
            .submit(&json!({"raw_input": [
                {"id": "deploy", "operation": "deploy_model", "parameters": {"model": "m1"}},
                {"id": "infer", "operation": "model_inference", "parameters": {"model": {"ref": "deploy"}}},
                {"id": "again", "operation": "model_inference", "parameters": {"model": {"ref": "infer"}}}
            ]}))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(service.cancel(run_id).await);

        let snapshot = wait_until_finished(&service, run_id).await;
        assert_eq!(status_of(&snapshot, "deploy"), NodeStatus::Succeeded);
        assert_eq!(status_of(&snapshot, "infer"), NodeStatus::Cancelled);
        assert_eq!(status_of(&snapshot, "again"), NodeStatus::Cancelled);
        assert!(snapshot.cancelled);
        assert_eq!(snapshot.status, RunStatus::Failed);

        // Finished runs are no longer cancellable.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!service.cancel(run_id).await);
    }
}

#[tokio::test]
async fn test_timeout_fails_the_node() {
    for executor in executors() {
        let service = service(
            registry(vec![(
                "model_inference",
                Arc::new(SlowAdapter::new(Duration::from_millis(500), json!([]))),
            )]),
            executor,
            RunOptions {
                timeout: Some(Duration::from_millis(50)),
                ..RunOptions::default()
            },
        );

        let snapshot = service
            .run(&json!({"raw_input": [{"operation": "model_inference", "parameters": {"model": "m1", "data": []}}]}))
            .await
            .unwrap();

        let node = snapshot.node("model_inference (1)").unwrap();
        assert_eq!(node.status, NodeStatus::Failed);
        assert_eq!(node.error.as_ref().map(|e| e.kind), Some(NodeErrorKind::Timeout));
    }
}

#[tokio::test]
async fn test_fail_fast_skips_everything_not_started() {
    let (counting, calls) = CountingAdapter::new(json!("ok"));
    let service = service(
        registry(vec![
            ("import_from_s3", Arc::new(FailingAdapter::new("denied"))),
            ("deploy_model", Arc::new(counting)),
        ]),
        Box::new(SequentialExecutor::new()),
        RunOptions {
            failure_strategy: FailureStrategy::FailFast,
            ..RunOptions::default()
        },
    );

    let snapshot = service
        .run(&json!({"raw_input": [
            {"operation": "import_from_s3"},
            {"operation": "deploy_model", "parameters": {"model": "m1"}}
        ]}))
        .await
        .unwrap();

    assert_eq!(status_of(&snapshot, "import_from_s3 (1)"), NodeStatus::Failed);
    assert_eq!(status_of(&snapshot, "deploy_model (2)"), NodeStatus::Skipped);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(snapshot.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_missing_required_parameter_fails_the_node() {
    for executor in executors() {
        let service = service(
            registry(vec![(
                "deploy_model",
                Arc::new(StubAdapter::returning(json!("ok")).requiring(&["model"])),
            )]),
            executor,
            RunOptions::default(),
        );

        let snapshot = service
            .run(&json!({"raw_input": [{"operation": "deploy_model", "parameters": {"name": "m1"}}]}))
            .await
            .unwrap();

        let node = snapshot.node("deploy_model (1)").unwrap();
        assert_eq!(node.status, NodeStatus::Failed);
        let error = node.error.as_ref().unwrap();
        assert_eq!(error.kind, NodeErrorKind::MissingParameter);
        assert!(error.message.contains("'model'"));
    }
}

#[tokio::test]
async fn test_runs_in_progress_cannot_be_deleted() {
    let service = service(
        registry(vec![(
            "deploy_model",
            Arc::new(SlowAdapter::new(Duration::from_millis(200), Value::Null)),
        )]),
        Box::new(SequentialExecutor::new()),
        RunOptions::default(),
    );

    let run_id = service
        .submit(&json!({"raw_input": {"operation": "deploy_model"}}))
        .await
        .unwrap();
    assert!(matches!(
        service.delete(run_id).await,
        Err(PipelineError::RunInProgress(id)) if id == run_id
    ));

    wait_until_finished(&service, run_id).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    service.delete(run_id).await.unwrap();
    assert!(matches!(
        service.status(run_id).await,
        Err(PipelineError::Store(_))
    ));
}
