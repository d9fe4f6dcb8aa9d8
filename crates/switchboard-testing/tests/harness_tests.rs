use std::sync::Arc;
use std::time::Duration;
use switchboard_agent::{
    OperationProvider, ProviderState, QueryOutcome, ToolInvoker, TransportConfig,
};
use switchboard_core::{Arguments, InvocationError};
use switchboard_testing::{Harness, MockTool, ScriptedEngine, Step, mock_registry};

fn answered(outcome: QueryOutcome) -> switchboard_agent::TurnReport {
    match outcome {
        QueryOutcome::Answered(report) => report,
        QueryOutcome::Empty => panic!("expected an answer"),
    }
}

#[tokio::test]
async fn harness_routes_calls_to_owning_provider() {
    let left = MockTool::new("left").with_default_response("L");
    let right = MockTool::new("right").with_default_response("R");
    let engine = ScriptedEngine::new(vec![
        Step::call("right", Arguments::new()),
        Step::call("left", Arguments::new()),
        Step::answer_with(|results| results.concat()),
    ]);

    let mut harness = Harness::builder()
        .with_provider("a", mock_registry(std::slice::from_ref(&left)).unwrap())
        .with_provider("b", mock_registry(std::slice::from_ref(&right)).unwrap())
        .build(Arc::new(engine))
        .await
        .unwrap();

    let report = answered(harness.ask("both").await.unwrap());
    assert_eq!(report.answer, "RL");
    assert_eq!(report.tools.to_string(), "[Used tool(s): left, right]");
    assert_eq!(left.call_count(), 1);
    assert_eq!(right.call_count(), 1);

    harness.shutdown().await;
}

#[tokio::test]
async fn dead_provider_is_unavailable_and_degraded() {
    let ping = MockTool::new("ping").with_default_response("pong");
    let echo = MockTool::new("echo");
    let harness = Harness::builder()
        .with_transport(TransportConfig {
            request_timeout_secs: 5,
            ..TransportConfig::default()
        })
        .with_provider("fragile", mock_registry(&[ping]).unwrap())
        .with_provider("sturdy", mock_registry(&[echo]).unwrap())
        .build(Arc::new(ScriptedEngine::answering("ok")))
        .await
        .unwrap();

    let fragile = harness.provider("fragile").unwrap();
    fragile.kill();
    // Let the channel observe the closed pipe.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = harness
        .dispatcher
        .invoke("ping", Arguments::new())
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::ProviderUnavailable { .. }));
    assert!(matches!(fragile.handle.state(), ProviderState::Degraded(_)));

    let echoed = harness
        .dispatcher
        .invoke("echo", Arguments::new().with("x", 1))
        .await
        .unwrap();
    assert_eq!(echoed, serde_json::json!({"x": 1}));
}

#[tokio::test]
async fn duplicate_operations_fail_the_build() {
    let result = Harness::builder()
        .with_provider("one", mock_registry(&[MockTool::new("add")]).unwrap())
        .with_provider("two", mock_registry(&[MockTool::new("add")]).unwrap())
        .build(Arc::new(ScriptedEngine::answering("unused")))
        .await;

    let err = result.err().unwrap();
    assert_eq!(err.error_code(), "DUPLICATE_OPERATION");
}
