//! Planner decisions and the strict parsing of planner output.
//!
//! The planner model answers with exactly one of two shapes:
//!
//! ```json
//! { "is_complex": false, "response": "Hello!" }
//! { "objective": "...", "research_plan": ["..."], "clarifications": [] }
//! ```
//!
//! Anything else is a schema violation and never reaches the orchestrator.

use crate::core::error::DomainError;
use crate::core::json::parse_strict;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the planner decided for the current conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannerDecision {
    /// Simple request, answered directly
    DirectAnswer { text: String },
    /// The request is ambiguous; ask the user
    Clarify { questions: Vec<String> },
    /// Complex request with ordered retrieval steps
    Plan { objective: String, steps: Vec<String> },
}

impl PlannerDecision {
    pub fn kind_str(&self) -> &'static str {
        match self {
            PlannerDecision::DirectAnswer { .. } => "direct_answer",
            PlannerDecision::Clarify { .. } => "clarify",
            PlannerDecision::Plan { .. } => "plan",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteOutput {
    is_complex: bool,
    response: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanOutput {
    objective: String,
    research_plan: Vec<String>,
    clarifications: Vec<String>,
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse raw planner output into a [`PlannerDecision`].
pub fn parse_planner_decision(raw: &str) -> Result<PlannerDecision, DomainError> {
    let value: Value = parse_strict(raw, "planner output")?;
    let Some(object) = value.as_object() else {
        return Err(DomainError::schema("planner output: expected a JSON object"));
    };

    if object.contains_key("is_complex") {
        let route: RouteOutput = serde_json::from_value(value)
            .map_err(|e| DomainError::schema(format!("planner route: {e}")))?;
        if route.is_complex {
            return Err(DomainError::schema(
                "planner route: complex request without a research plan",
            ));
        }
        let text = route.response.trim();
        if text.is_empty() {
            return Err(DomainError::schema("planner route: empty response"));
        }
        return Ok(PlannerDecision::DirectAnswer {
            text: text.to_string(),
        });
    }

    let plan: PlanOutput = serde_json::from_value(value)
        .map_err(|e| DomainError::schema(format!("planner plan: {e}")))?;

    let questions = non_blank(plan.clarifications);
    if !questions.is_empty() {
        return Ok(PlannerDecision::Clarify { questions });
    }

    let objective = plan.objective.trim();
    if objective.is_empty() {
        return Err(DomainError::schema("planner plan: empty objective"));
    }
    let steps = non_blank(plan.research_plan);
    if steps.is_empty() {
        return Err(DomainError::schema(
            "planner plan: no research steps and no clarifications",
        ));
    }

    Ok(PlannerDecision::Plan {
        objective: objective.to_string(),
        steps,
    })
}
