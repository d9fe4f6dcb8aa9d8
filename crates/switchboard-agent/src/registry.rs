//! Capability registry: operation name to owning provider.

use crate::provider::OperationProvider;
use std::collections::HashMap;
use std::sync::Arc;
use switchboard_core::{InvocationError, OperationDescriptor, OperationName, RegistryError};

/// Every operation the running providers declared, merged into one
/// read-only map.
///
/// Names are unique across providers. Descriptors are listed in provider
/// order, then declaration order.
pub struct CapabilityRegistry {
    providers: Vec<Arc<dyn OperationProvider>>,
    owners: HashMap<OperationName, usize>,
    descriptors: Vec<OperationDescriptor>,
}

impl CapabilityRegistry {
    /// Merge the providers' declarations.
    ///
    /// Fails with [`RegistryError::DuplicateOperation`] if a name is declared
    /// twice, whether by two providers or by the same one.
    pub fn register(providers: Vec<Arc<dyn OperationProvider>>) -> Result<Self, RegistryError> {
        let mut owners: HashMap<OperationName, usize> = HashMap::new();
        let mut descriptors = Vec::new();

        for (index, provider) in providers.iter().enumerate() {
            for spec in provider.operations() {
                if let Some(&first) = owners.get(&spec.name) {
                    return Err(RegistryError::DuplicateOperation {
                        operation: spec.name.clone(),
                        first: providers[first].id().clone(),
                        second: provider.id().clone(),
                    });
                }
                owners.insert(spec.name.clone(), index);
                descriptors.push(OperationDescriptor::new(spec.clone(), provider.id().clone()));
            }
        }

        tracing::debug!(
            providers = providers.len(),
            operations = descriptors.len(),
            "capability registry built"
        );
        Ok(Self {
            providers,
            owners,
            descriptors,
        })
    }

    /// The provider owning `name`
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn OperationProvider>, InvocationError> {
        OperationName::parse(name)
            .ok()
            .and_then(|name| self.owners.get(&name))
            .map(|&index| &self.providers[index])
            .ok_or_else(|| InvocationError::UnknownOperation {
                name: name.to_string(),
            })
    }

    pub fn descriptors(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn providers(&self) -> &[Arc<dyn OperationProvider>] {
        &self.providers
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field(
                "operations",
                &self
                    .descriptors
                    .iter()
                    .map(|d| (d.name().as_str(), d.provider.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
