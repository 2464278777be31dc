//! JSON output schemas for the structured model calls.
//!
//! The schemas are what completion services enforce; the parsers in
//! `planning`, `synthesis` and `validation` re-check every response locally.

use serde_json::{Value, json};

pub const PLANNER_SCHEMA_NAME: &str = "planner_decision";
pub const SYNTHESIS_SCHEMA_NAME: &str = "synthesis_result";
pub const VALIDATION_SCHEMA_NAME: &str = "validation_result";

/// Either a route `{is_complex, response}` or a plan
/// `{objective, research_plan, clarifications}`.
pub fn planner_schema() -> Value {
    json!({
        "anyOf": [
            {
                "type": "object",
                "properties": {
                    "is_complex": { "type": "boolean" },
                    "response": { "type": "string" }
                },
                "required": ["is_complex", "response"],
                "additionalProperties": false
            },
            {
                "type": "object",
                "properties": {
                    "objective": { "type": "string" },
                    "research_plan": { "type": "array", "items": { "type": "string" } },
                    "clarifications": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["objective", "research_plan", "clarifications"],
                "additionalProperties": false
            }
        ]
    })
}

pub fn synthesis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": { "type": "string", "enum": ["complete", "incomplete"] },
            "summary": { "type": "string" },
            "additional_tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string", "enum": ["search", "scrape"] },
                        "query": { "type": ["string", "null"] },
                        "urls": { "type": ["array", "null"], "items": { "type": "string" } },
                        "use_cache": { "type": ["boolean", "null"] }
                    },
                    "required": ["kind", "query", "urls", "use_cache"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["status", "summary", "additional_tasks"],
        "additionalProperties": false
    })
}

pub fn validation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "claims": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "claim": { "type": "string" },
                        "citation": { "type": ["string", "null"] },
                        "supported": { "type": "boolean" },
                        "note": { "type": ["string", "null"] }
                    },
                    "required": ["claim", "citation", "supported", "note"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["claims"],
        "additionalProperties": false
    })
}

/// Strict mode needs an object at the root; the planner schema is a union.
pub fn supports_strict_mode(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_mode_support() {
        assert!(!supports_strict_mode(&planner_schema()));
        assert!(supports_strict_mode(&synthesis_schema()));
        assert!(supports_strict_mode(&validation_schema()));
    }

    #[test]
    fn test_synthesis_schema_limits_task_kinds() {
        let kinds = &synthesis_schema()["properties"]["additional_tasks"]["items"]["properties"]
            ["kind"]["enum"];
        assert_eq!(kinds, &json!(["search", "scrape"]));
    }
}
