//! A single routed call from the orchestrator to a provider.

use crate::identifiers::{OperationName, RequestId};
use crate::tool::Arguments;

/// Operation name, arguments and the correlation id of one call.
///
/// Built by the dispatcher for every invocation and consumed by the
/// channel that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub id: RequestId,
    pub operation: OperationName,
    pub arguments: Arguments,
}

impl InvocationRequest {
    pub fn new(operation: OperationName, arguments: Arguments) -> Self {
        Self {
            id: RequestId::next(),
            operation,
            arguments,
        }
    }
}
