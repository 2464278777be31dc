//! Prompt templates for the planner, synthesis and validation calls

use crate::core::string::truncate;
use crate::retrieval::Evidence;

/// Longest evidence excerpt included in a prompt, in bytes
pub const MAX_EVIDENCE_CHARS: usize = 8_000;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the planner call
    pub fn planner_system() -> &'static str {
        r#"You are a research planner. Read the conversation and decide how to handle the latest request.

If the request is simple (a greeting, small talk, or something you can answer reliably without looking anything up), respond with:
{"is_complex": false, "response": "<your answer>"}

Otherwise respond with:
{"objective": "<one sentence research objective>", "research_plan": ["<step>", ...], "clarifications": []}

Each research step is a single retrieval action: either a web search ("search <query>") or reading a page ("scrape <url>").
Keep the plan short and ordered. If the request is too ambiguous to plan, leave research_plan empty and list your questions in clarifications.
Respond with JSON only."#
    }

    /// User prompt for the planner call
    pub fn planner_prompt(transcript: &str) -> String {
        format!(
            r#"Conversation so far:

{}

Decide how to handle the latest user message."#,
            transcript
        )
    }

    /// System prompt for the synthesis call
    pub fn synthesis_system() -> &'static str {
        r#"You are a research analyst. Combine the numbered evidence into an answer to the objective.

Cite evidence inline with its number, e.g. [1] or [2, 3], and end the summary with a "Sources:" list mapping each number to its source.
Only state what the evidence supports.

If the evidence is sufficient, set status to "complete" and leave additional_tasks empty.
If it is not, set status to "incomplete", write the best partial summary you can, and list the retrieval tasks that would fill the gaps.
Each additional task is {"kind": "search", "query": "..."} or {"kind": "scrape", "urls": ["..."]}.
Respond with JSON only."#
    }

    /// User prompt for the synthesis call
    pub fn synthesis_prompt(
        objective: &str,
        evidence: &[Evidence],
        round: u32,
        max_rounds: u32,
    ) -> String {
        let mut prompt = format!(
            "Objective: {}\n\nRound {} of {}.",
            objective, round, max_rounds
        );
        if round >= max_rounds {
            prompt.push_str(" This is the last round; more retrieval will not be possible.");
        }
        prompt.push_str("\n\n");
        prompt.push_str(&Self::render_evidence(evidence));
        prompt
    }

    /// System prompt for the validation call
    pub fn validation_system() -> &'static str {
        r#"You are a fact checker. For every claim in the summary that carries a citation, check whether the cited evidence supports it.
Also list factual claims that carry no citation and are not supported by any evidence.

Respond with JSON only:
{"claims": [{"claim": "...", "citation": "[n]" or null, "supported": true|false, "note": "..." or null}]}"#
    }

    /// User prompt for the validation call
    pub fn validation_prompt(summary: &str, evidence: &[Evidence]) -> String {
        format!(
            "Summary to check:\n\n{}\n\n{}",
            summary,
            Self::render_evidence(evidence)
        )
    }

    /// Number evidence items from 1 in the order given.
    pub fn render_evidence(evidence: &[Evidence]) -> String {
        if evidence.is_empty() {
            return "Evidence: none could be retrieved.".to_string();
        }
        let mut rendered = String::from("Evidence:\n");
        for (i, item) in evidence.iter().enumerate() {
            rendered.push_str(&format!(
                "\n[{}] {}\n{}\n",
                i + 1,
                item.source.label(),
                truncate(&item.content, MAX_EVIDENCE_CHARS)
            ));
        }
        rendered
    }
}
