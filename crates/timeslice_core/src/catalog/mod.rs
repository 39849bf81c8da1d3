//! Read-only option lists backing the entry form.
//!
//! # Responsibility
//! - Hold the backend-supplied lists (team members, categories, projects,
//!   product families) in normalized form.
//! - Answer the membership queries submit validation relies on.
//!
//! # Invariants
//! - Lists are trimmed, blank-free, deduplicated and sorted.
//! - The catalog is never mutated by the reconciler or the renderer.
//! - An empty list disables its membership check: an unreachable backend
//!   must not make the form unsubmittable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalized option lists for the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalog {
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub product_families: Vec<String>,
}

impl OptionCatalog {
    /// Builds a catalog from raw backend lists, normalizing each one.
    pub fn new(
        team_members: Vec<String>,
        categories: Vec<String>,
        projects: Vec<String>,
        product_families: Vec<String>,
    ) -> Self {
        Self {
            team_members: normalize_list(team_members),
            categories: normalize_list(categories),
            projects: normalize_list(projects),
            product_families: normalize_list(product_families),
        }
    }

    /// Re-normalizes a catalog that arrived through deserialization.
    pub fn normalized(self) -> Self {
        Self::new(
            self.team_members,
            self.categories,
            self.projects,
            self.product_families,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.team_members.is_empty()
            && self.categories.is_empty()
            && self.projects.is_empty()
            && self.product_families.is_empty()
    }

    pub fn has_team_member(&self, value: &str) -> bool {
        contains(&self.team_members, value)
    }

    pub fn has_category(&self, value: &str) -> bool {
        contains(&self.categories, value)
    }

    pub fn has_project(&self, value: &str) -> bool {
        contains(&self.projects, value)
    }

    pub fn has_product_family(&self, value: &str) -> bool {
        contains(&self.product_families, value)
    }
}

fn contains(values: &[String], candidate: &str) -> bool {
    let trimmed = candidate.trim();
    values.iter().any(|value| value == trimmed)
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    let unique: BTreeSet<String> = values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    unique.into_iter().collect()
}
