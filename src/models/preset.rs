//! Export preset definition.

/// A named, ordered bundle of entity collections exported together.
///
/// Collections are listed parent-before-child so that foreign keys resolve
/// when the bundle is imported in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPreset {
    /// Preset name, also written as the envelope's `exportType`.
    pub name: &'static str,
    /// Human label shown in the dashboard.
    pub label: &'static str,
    /// Collection names in import order.
    pub collections: &'static [&'static str],
}

impl ExportPreset {
    /// Returns whether the preset declares the given collection.
    #[must_use]
    pub fn declares(&self, collection: &str) -> bool {
        self.collections.contains(&collection)
    }
}
