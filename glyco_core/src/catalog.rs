//! Default catalog of canonical body-metric types.
//!
//! Order matters: it is the tie-break order for classification.

use crate::classify::normalize_label;
use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of body-composition metrics
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalogs.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let entries = [
        ("Peso", "kg"),
        ("IMC", "kg/m²"),
        ("Grasa corporal", "%"),
        ("Masa muscular", "%"),
        ("Grasa visceral", "nivel"),
        ("Agua corporal", "%"),
        ("Metabolismo basal", "kcal"),
        ("Masa ósea", "kg"),
        ("Proteína", "%"),
        ("Edad metabólica", "años"),
        ("Peso sin grasa", "kg"),
        ("Grasa subcutánea", "%"),
    ]
    .into_iter()
    .map(|(name, unit)| CatalogEntry {
        canonical_name: name.into(),
        unit: unit.into(),
    })
    .collect();

    Catalog { entries }
}

impl Catalog {
    /// Look up an entry by canonical name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.canonical_name.eq_ignore_ascii_case(name.trim()))
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        if self.entries.is_empty() {
            errors.push("Catalog has no entries".to_string());
        }

        for entry in &self.entries {
            let normalized = normalize_label(&entry.canonical_name);
            if normalized.is_empty() {
                errors.push(format!(
                    "Catalog entry '{}' normalizes to an empty name",
                    entry.canonical_name
                ));
                continue;
            }
            if !seen.insert(normalized.clone()) {
                errors.push(format!(
                    "Catalog entry '{}' duplicates normalized name '{}'",
                    entry.canonical_name, normalized
                ));
            }
        }

        errors
    }
}
