//! Model catalog port

use polychat_domain::ModelDescriptor;

/// Read-only source of model descriptors.
///
/// The core only reads; administration of the catalog is an external
/// collaborator's responsibility and never happens on the dispatch path.
pub trait ModelCatalog: Send + Sync {
    /// All catalog entries, active or not
    fn list_models(&self) -> Vec<ModelDescriptor>;

    /// Look up a single model by its public id
    fn find(&self, model_id: &str) -> Option<ModelDescriptor> {
        self.list_models().into_iter().find(|m| m.id == model_id)
    }
}
