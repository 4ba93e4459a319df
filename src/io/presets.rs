//! Export preset registry.
//!
//! Presets are static configuration. Each one lists its collections
//! parent-before-child; the loader relies on that order for foreign keys.

use crate::models::ExportPreset;
use crate::{Error, Result};

/// Presets shipped with the dashboard.
pub const BUILTIN_PRESETS: &[ExportPreset] = &[
    ExportPreset {
        name: "task_categories",
        label: "Task categories",
        collections: &["task_categories"],
    },
    ExportPreset {
        name: "tasks",
        label: "Tasks",
        collections: &["task_categories", "tasks"],
    },
    ExportPreset {
        name: "goals",
        label: "Goals & milestones",
        collections: &["goals", "goal_milestones"],
    },
    ExportPreset {
        name: "notes",
        label: "Notes",
        collections: &["note_folders", "notes"],
    },
    ExportPreset {
        name: "devices",
        label: "Device inventory",
        collections: &["device_categories", "devices"],
    },
    ExportPreset {
        name: "support_orgs",
        label: "Support directory",
        collections: &["support_orgs", "support_contacts"],
    },
    ExportPreset {
        name: "full_backup",
        label: "Everything",
        collections: &[
            "task_categories",
            "tasks",
            "goals",
            "goal_milestones",
            "note_folders",
            "notes",
            "device_categories",
            "devices",
            "support_orgs",
            "support_contacts",
        ],
    },
];

/// Lookup over a fixed set of presets.
#[derive(Debug, Clone, Copy)]
pub struct PresetRegistry {
    presets: &'static [ExportPreset],
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetRegistry {
    /// Registry over [`BUILTIN_PRESETS`].
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            presets: BUILTIN_PRESETS,
        }
    }

    /// Registry over a caller-supplied table.
    #[must_use]
    pub const fn with_presets(presets: &'static [ExportPreset]) -> Self {
        Self { presets }
    }

    /// Resolves a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPreset`] if no preset has that name.
    pub fn get(&self, name: &str) -> Result<&'static ExportPreset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPreset(name.to_string()))
    }

    /// Returns every preset in declaration order.
    #[must_use]
    pub const fn list(&self) -> &'static [ExportPreset] {
        self.presets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_preset() {
        let registry = PresetRegistry::builtin();
        let preset = registry.get("tasks").unwrap();
        assert_eq!(preset.collections, &["task_categories", "tasks"]);
        assert_eq!(preset.label, "Tasks");
    }

    #[test]
    fn test_get_unknown_preset() {
        let err = PresetRegistry::builtin().get("unknown_preset").unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(ref n) if n == "unknown_preset"));
    }

    #[test]
    fn test_names_are_unique() {
        let names: std::collections::HashSet<_> =
            BUILTIN_PRESETS.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), BUILTIN_PRESETS.len());
    }

    #[test]
    fn test_full_backup_keeps_parents_first() {
        let full = PresetRegistry::builtin().get("full_backup").unwrap();
        for preset in BUILTIN_PRESETS.iter().filter(|p| p.name != "full_backup") {
            let positions: Vec<_> = preset
                .collections
                .iter()
                .map(|c| full.collections.iter().position(|f| f == c))
                .collect();
            assert!(positions.iter().all(Option::is_some), "{}", preset.name);
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", preset.name);
        }
    }
}
