//! Hardware limit specs and plans.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A hardware specification family (CPU generation, GPU class, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSpec {
    /// Spec identifier.
    #[serde(default)]
    pub id: String,
    /// CPU description.
    #[serde(default)]
    pub cpu: Value,
    /// Memory description.
    #[serde(default)]
    pub memory: Value,
    /// Extra features (GPU models and the like).
    #[serde(default)]
    pub features: Value,
    /// Whether the spec is disabled for new plans.
    #[serde(default)]
    pub disabled: bool,
}

/// A purchasable plan within a spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitPlan {
    /// Plan identifier, e.g. `std1.large.c2m4`.
    #[serde(default)]
    pub id: String,
    /// The spec this plan belongs to.
    #[serde(default)]
    pub spec: Option<LimitSpec>,
    /// CPU cores.
    #[serde(default)]
    pub cpu: u32,
    /// Memory size, human-readable.
    #[serde(default)]
    pub memory: u32,
    /// Extra features.
    #[serde(default)]
    pub features: Value,
    /// Whether the plan can still be assigned.
    #[serde(default)]
    pub disabled: bool,
}

/// List hardware specs.
pub async fn specs(client: &mut Client) -> Result<Paged<LimitSpec>, ApiError> {
    client.get_paged("limits/specs/").await
}

/// List plans, optionally filtered by spec id, cpu cores and memory (GiB).
pub async fn plans(
    client: &mut Client,
    spec_id: Option<&str>,
    cpu: Option<u32>,
    memory: Option<u32>,
) -> Result<Paged<LimitPlan>, ApiError> {
    let mut path = String::from("limits/plans/");
    let mut sep = '?';
    for (name, value) in [
        ("spec-id", spec_id.map(String::from)),
        ("cpu", cpu.map(|v| v.to_string())),
        ("memory", memory.map(|v| v.to_string())),
    ] {
        if let Some(value) = value {
            path.push(sep);
            path.push_str(&format!("{name}={value}"));
            sep = '&';
        }
    }
    client.get_paged(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_carries_nested_spec() {
        let plan: LimitPlan = serde_json::from_str(
            r#"{"id":"std1.large.c2m4","spec":{"id":"std1"},"cpu":2,"memory":4}"#,
        )
        .expect("plan");
        assert_eq!(plan.spec.expect("spec").id, "std1");
        assert_eq!(plan.cpu, 2);
    }
}
