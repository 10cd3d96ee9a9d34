//! Reference records used as ground truth.

mod store;

pub use store::ReferenceStore;

use std::collections::HashMap;

use crate::models::record::ReferenceRecord;

/// Trait for identifier-keyed reference data.
pub trait ReferenceLookup {
    /// Find the record for an identifier, compared by exact string equality.
    fn lookup(&self, identifier: &str) -> Option<&ReferenceRecord>;
}

impl ReferenceLookup for HashMap<String, ReferenceRecord> {
    fn lookup(&self, identifier: &str) -> Option<&ReferenceRecord> {
        self.get(identifier)
    }
}

impl<T: ReferenceLookup + ?Sized> ReferenceLookup for &T {
    fn lookup(&self, identifier: &str) -> Option<&ReferenceRecord> {
        (**self).lookup(identifier)
    }
}
