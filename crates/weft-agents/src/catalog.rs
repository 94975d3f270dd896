use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use weft_core::error::Result;
use weft_core::settings::SettingsMap;
use weft_core::traits::DeterministicAgent;
use weft_core::types::{NodeDefinition, NodeKind, NodeSpec, SettingField};

use crate::registry::registry_slug;

/// One catalog row: the authoring surface's view of a deterministic agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Registry identifier, derived from the name exactly once.
    pub identifier: String,
    pub settings_schema: Vec<SettingField>,
}

/// The backing catalog of deterministic agents.
///
/// Node specs reference agents by catalog id; resolution maps that id to
/// the registry identifier. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    entries: BTreeMap<i64, CatalogEntry>,
}

impl AgentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog covering the built-in agent set, ids assigned in
    /// registration order starting at 1.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (i, agent) in crate::builtin::all().into_iter().enumerate() {
            catalog.add((i + 1) as i64, agent.as_ref());
        }
        catalog
    }

    pub fn add(&mut self, id: i64, agent: &dyn DeterministicAgent) {
        self.entries.insert(
            id,
            CatalogEntry {
                id,
                name: agent.name().to_string(),
                description: agent.description().to_string(),
                identifier: registry_slug(agent.name()),
                settings_schema: agent.settings_schema(),
            },
        );
    }

    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a wire-shape node into an executable definition.
    ///
    /// The execution mode is fixed here, once: a node declared
    /// deterministic with a known catalog id gets the entry's registry
    /// identifier; an unknown id stays `Dangling` so dispatch reports
    /// NOT_FOUND at the node's position instead of failing the whole run.
    /// Settings are decoded here and never re-parsed downstream.
    pub fn resolve(&self, spec: NodeSpec) -> Result<NodeDefinition> {
        let settings = SettingsMap::decode(&spec.settings)?;

        let kind = if spec.is_common_agent {
            match spec.common_agent_id {
                Some(id) => match self.get(id) {
                    Some(entry) => NodeKind::Deterministic {
                        identifier: entry.identifier.clone(),
                    },
                    None => NodeKind::Dangling { catalog_id: id },
                },
                // Declared deterministic without a reference: the flag
                // alone does not select the deterministic path.
                None => NodeKind::Generative {
                    prompt: spec.prompt.clone().unwrap_or_default(),
                },
            }
        } else {
            NodeKind::Generative {
                prompt: spec.prompt.clone().unwrap_or_default(),
            }
        };

        Ok(NodeDefinition {
            id: spec.id,
            name: spec.name,
            description: spec.description,
            settings,
            kind,
        })
    }

    pub fn resolve_all(&self, specs: Vec<NodeSpec>) -> Result<Vec<NodeDefinition>> {
        specs.into_iter().map(|s| self.resolve(s)).collect()
    }
}
