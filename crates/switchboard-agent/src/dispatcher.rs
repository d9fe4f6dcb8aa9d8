//! Routes invocations to the owning provider and normalizes the outcome.

use crate::registry::CapabilityRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_core::{
    Arguments, InvocationError, InvocationRequest, InvocationResult, OperationDescriptor,
    OperationName, render_value,
};
use switchboard_protocol::ChannelError;
use tracing::Instrument;

/// Trait for anything that can run operations by name on the engine's behalf.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke an operation by name.
    async fn invoke(&self, name: &str, arguments: Arguments) -> InvocationResult;

    /// Operations available to the engine.
    fn capabilities(&self) -> Vec<OperationDescriptor>;

    /// Invoke and render the outcome as text for the engine. Failures become
    /// `Error: ...` text instead of propagating.
    async fn invoke_text(&self, name: &str, arguments: Arguments) -> String {
        match self.invoke(name, arguments).await {
            Ok(value) => render_value(&value),
            Err(err) => err.to_engine_text(),
        }
    }
}

/// Stateless router over a [`CapabilityRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolInvoker for Dispatcher {
    async fn invoke(&self, name: &str, arguments: Arguments) -> InvocationResult {
        let provider = self.registry.resolve(name)?;
        let request = InvocationRequest::new(OperationName::new_unchecked(name), arguments);

        let span = tracing::info_span!(
            "invoke",
            operation = %request.operation,
            provider = %provider.id(),
            request_id = %request.id,
        );
        async {
            tracing::debug!(arguments = ?request.arguments, "dispatching");
            match provider.call(&request).await {
                Ok(value) => {
                    tracing::debug!("operation succeeded");
                    Ok(value)
                }
                Err(ChannelError::ToolFailed(message)) => {
                    tracing::debug!(%message, "operation reported a failure");
                    Err(InvocationError::ToolExecution {
                        operation: request.operation.clone(),
                        message,
                    })
                }
                Err(ChannelError::Remote { code, message }) => {
                    tracing::debug!(code, %message, "provider rejected the call");
                    Err(InvocationError::ToolExecution {
                        operation: request.operation.clone(),
                        message,
                    })
                }
                Err(ChannelError::Timeout(after)) => Err(InvocationError::Timeout {
                    operation: request.operation.clone(),
                    after,
                }),
                Err(err @ ChannelError::UnexpectedResponse(_)) => {
                    tracing::warn!(error = %err, "malformed result from provider");
                    Err(InvocationError::ToolExecution {
                        operation: request.operation.clone(),
                        message: format!("malformed result from provider: {err}"),
                    })
                }
                Err(err) => {
                    let reason = err.to_string();
                    provider.mark_degraded(&reason);
                    tracing::warn!(%reason, "provider unavailable");
                    Err(InvocationError::ProviderUnavailable {
                        provider: provider.id().clone(),
                        reason,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    fn capabilities(&self) -> Vec<OperationDescriptor> {
        self.registry.descriptors().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{OperationProvider, ProviderState};
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use switchboard_core::{OperationSpec, ProviderId};

    /// Provider whose answer is fixed per test
    struct Fixed {
        id: ProviderId,
        operations: Vec<OperationSpec>,
        answer: fn(&InvocationRequest) -> Result<Value, ChannelError>,
        calls: AtomicUsize,
        state: Mutex<ProviderState>,
    }

    impl Fixed {
        fn new(
            id: &str,
            ops: &[&str],
            answer: fn(&InvocationRequest) -> Result<Value, ChannelError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                id: ProviderId::new_unchecked(id),
                operations: ops
                    .iter()
                    .map(|n| OperationSpec::new(OperationName::new_unchecked(*n), ""))
                    .collect(),
                answer,
                calls: AtomicUsize::new(0),
                state: Mutex::new(ProviderState::Ready),
            })
        }
    }

    #[async_trait]
    impl OperationProvider for Fixed {
        fn id(&self) -> &ProviderId {
            &self.id
        }

        fn operations(&self) -> &[OperationSpec] {
            &self.operations
        }

        async fn call(&self, request: &InvocationRequest) -> Result<Value, ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)(request)
        }

        fn state(&self) -> ProviderState {
            self.state.lock().unwrap().clone()
        }

        fn mark_degraded(&self, reason: &str) {
            *self.state.lock().unwrap() = ProviderState::Degraded(reason.to_string());
        }
    }

    fn dispatcher(providers: Vec<Arc<dyn OperationProvider>>) -> Dispatcher {
        Dispatcher::new(Arc::new(CapabilityRegistry::register(providers).unwrap()))
    }

    #[tokio::test]
    async fn test_success_payload_unchanged() {
        let echo = Fixed::new("echo", &["echo"], |req| Ok(req.arguments.clone().into_value()));
        let dispatcher = dispatcher(vec![echo.clone()]);

        let args = Arguments::new().with("x", json!([1, {"y": null}]));
        let result = dispatcher.invoke("echo", args.clone()).await.unwrap();
        assert_eq!(result, args.into_value());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_operation_contacts_no_provider() {
        let math = Fixed::new("math", &["add"], |_| Ok(json!(0)));
        let dispatcher = dispatcher(vec![math.clone()]);

        let err = dispatcher.invoke("teleport", Arguments::new()).await.unwrap_err();
        assert_eq!(
            err,
            InvocationError::UnknownOperation {
                name: "teleport".into()
            }
        );
        assert_eq!(math.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tool_failure_is_tool_execution_error() {
        let math = Fixed::new("math", &["divide"], |_| {
            Err(ChannelError::ToolFailed(
                "Invalid input: division by zero".into(),
            ))
        });
        let dispatcher = dispatcher(vec![math.clone()]);

        let err = dispatcher.invoke("divide", Arguments::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: division by zero");
        assert_eq!(math.state(), ProviderState::Ready);
        assert_eq!(
            dispatcher.invoke_text("divide", Arguments::new()).await,
            "Error: Invalid input: division by zero"
        );
    }

    #[tokio::test]
    async fn test_rejected_call_does_not_degrade() {
        let math = Fixed::new("math", &["add"], |_| {
            Err(ChannelError::Remote {
                code: -32602,
                message: "unknown operation 'add'".into(),
            })
        });
        let dispatcher = dispatcher(vec![math.clone()]);

        let err = dispatcher.invoke("add", Arguments::new()).await.unwrap_err();
        assert!(matches!(err, InvocationError::ToolExecution { .. }));
        assert_eq!(math.state(), ProviderState::Ready);
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_provider() {
        let broken = Fixed::new("weather", &["get_weather"], |_| Err(ChannelError::Closed));
        let dispatcher = dispatcher(vec![broken.clone()]);

        let err = dispatcher
            .invoke("get_weather", Arguments::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::ProviderUnavailable { .. }));
        assert!(matches!(broken.state(), ProviderState::Degraded(_)));
    }

    #[tokio::test]
    async fn test_timeout_does_not_degrade() {
        let slow = Fixed::new("websearch", &["web_search"], |_| {
            Err(ChannelError::Timeout(Duration::from_secs(30)))
        });
        let dispatcher = dispatcher(vec![slow.clone()]);

        let err = dispatcher
            .invoke("web_search", Arguments::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Timeout { .. }));
        assert_eq!(slow.state(), ProviderState::Ready);
    }

    #[tokio::test]
    async fn test_invoke_text_renders_values() {
        let units = Fixed::new("units", &["unit_conversion"], |_| {
            Ok(json!("10 mile = 16.0934 kilometer"))
        });
        let dispatcher = dispatcher(vec![units]);
        assert_eq!(
            dispatcher
                .invoke_text("unit_conversion", Arguments::new())
                .await,
            "10 mile = 16.0934 kilometer"
        );
        assert_eq!(dispatcher.capabilities().len(), 1);
    }
}
