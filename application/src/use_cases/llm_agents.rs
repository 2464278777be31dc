//! Model-backed planner, synthesis and validation agents.
//!
//! Each agent is one structured completion call through
//! [`complete_structured`]; all schema enforcement happens in the domain
//! parsers.

use crate::ports::agents::{AgentError, Planner, SynthesisContext, Synthesizer, Validator};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, OutputSchema};
use crate::use_cases::retry::RetryPolicy;
use crate::use_cases::structured::complete_structured;
use async_trait::async_trait;
use std::sync::Arc;
use thinker_domain::prompt::schema;
use thinker_domain::{
    ConversationState, Evidence, Message, PlannerDecision, PromptTemplate, SynthesisResult,
    ValidationResult, extract_citations, parse_planner_decision, parse_synthesis_result,
    parse_validation_result,
};
use tracing::{debug, info};

pub struct LlmPlanner {
    gateway: Arc<dyn CompletionGateway>,
    retry: RetryPolicy,
}

impl LlmPlanner {
    pub fn new(gateway: Arc<dyn CompletionGateway>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, conversation: &ConversationState) -> Result<PlannerDecision, AgentError> {
        let request = CompletionRequest::new(
            PromptTemplate::planner_system(),
            vec![Message::user(PromptTemplate::planner_prompt(
                &conversation.transcript(),
            ))],
            OutputSchema::new(schema::PLANNER_SCHEMA_NAME, schema::planner_schema()),
        );
        let decision = complete_structured(
            self.gateway.as_ref(),
            request,
            &self.retry,
            parse_planner_decision,
        )
        .await?;
        info!("Planner decided: {}", decision.kind_str());
        Ok(decision)
    }
}

pub struct LlmSynthesizer {
    gateway: Arc<dyn CompletionGateway>,
    retry: RetryPolicy,
    default_use_cache: bool,
}

impl LlmSynthesizer {
    /// `default_use_cache` applies to requested scrapes without their own flag.
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        retry: RetryPolicy,
        default_use_cache: bool,
    ) -> Self {
        Self {
            gateway,
            retry,
            default_use_cache,
        }
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(
        &self,
        objective: &str,
        evidence: &[Evidence],
        context: SynthesisContext<'_>,
    ) -> Result<SynthesisResult, AgentError> {
        let mut messages = Vec::new();
        if let Some(request) = context.conversation.last_user_message() {
            messages.push(Message::user(format!("Original request: {}", request.content)));
        }
        messages.push(Message::user(PromptTemplate::synthesis_prompt(
            objective,
            evidence,
            context.round,
            context.max_rounds,
        )));

        let request = CompletionRequest::new(
            PromptTemplate::synthesis_system(),
            messages,
            OutputSchema::new(schema::SYNTHESIS_SCHEMA_NAME, schema::synthesis_schema()),
        );
        let default_use_cache = self.default_use_cache;
        let result = complete_structured(self.gateway.as_ref(), request, &self.retry, |raw| {
            parse_synthesis_result(raw, default_use_cache)
        })
        .await?;
        debug!(
            "Synthesis round {}: {} with {} additional tasks",
            context.round,
            result.status(),
            result.additional_tasks().len()
        );
        Ok(result)
    }
}

pub struct LlmValidator {
    gateway: Arc<dyn CompletionGateway>,
    retry: RetryPolicy,
}

impl LlmValidator {
    pub fn new(gateway: Arc<dyn CompletionGateway>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }
}

#[async_trait]
impl Validator for LlmValidator {
    async fn validate(
        &self,
        summary: &str,
        evidence: &[Evidence],
    ) -> Result<ValidationResult, AgentError> {
        let request = CompletionRequest::new(
            PromptTemplate::validation_system(),
            vec![Message::user(PromptTemplate::validation_prompt(
                summary, evidence,
            ))],
            OutputSchema::new(
                schema::VALIDATION_SCHEMA_NAME,
                schema::validation_schema(),
            ),
        );
        let result = complete_structured(
            self.gateway.as_ref(),
            request,
            &self.retry,
            parse_validation_result,
        )
        .await?;

        // The local citation check runs even when the model saw no problem
        let report = extract_citations(summary);
        Ok(result.merge_citation_report(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::GatewayError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use thinker_domain::{SynthesisStatus, TaskPayload, Verdict};

    struct ScriptedGateway {
        responses: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGateway {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("no more responses".into()))
        }
    }

    #[tokio::test]
    async fn test_planner_sends_transcript_and_schema() {
        let gateway = ScriptedGateway::new(&[
            r#"{"objective": "Compare runtimes", "research_plan": ["search tokio"], "clarifications": []}"#,
        ]);
        let planner = LlmPlanner::new(gateway.clone(), RetryPolicy::none());

        let decision = planner
            .plan(&ConversationState::from_request("Compare Rust async runtimes"))
            .await
            .unwrap();

        assert!(matches!(decision, PlannerDecision::Plan { .. }));
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0].schema.name, schema::PLANNER_SCHEMA_NAME);
        assert!(requests[0].messages[0].content.contains("Compare Rust async runtimes"));
    }

    #[tokio::test]
    async fn test_synthesizer_applies_default_use_cache() {
        let gateway = ScriptedGateway::new(&[
            r#"{"status": "incomplete", "summary": "partial", "additional_tasks": [{"kind": "scrape", "query": null, "urls": ["https://tokio.rs"], "use_cache": null}]}"#,
        ]);
        let synthesizer = LlmSynthesizer::new(gateway.clone(), RetryPolicy::none(), false);
        let conversation = ConversationState::from_request("question");

        let result = synthesizer
            .synthesize(
                "objective",
                &[],
                SynthesisContext {
                    conversation: &conversation,
                    round: 1,
                    max_rounds: 3,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status(), SynthesisStatus::Incomplete);
        assert_eq!(
            result.additional_tasks(),
            &[TaskPayload::scrape(vec!["https://tokio.rs".to_string()], false)]
        );
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[0].messages[0].content, "Original request: question");
    }

    #[tokio::test]
    async fn test_validator_merges_local_citation_check() {
        let gateway = ScriptedGateway::new(&[
            r#"{"claims": [{"claim": "Tokio is popular", "citation": "[1]", "supported": true, "note": null}]}"#,
        ]);
        let validator = LlmValidator::new(gateway, RetryPolicy::none());
        let summary = "Tokio is popular [1]. It is fast [2].\n\nSources:\n1. https://tokio.rs\n";

        let result = validator.validate(summary, &[]).await.unwrap();

        assert_eq!(result.verdict(), Verdict::IssuesFound);
        assert_eq!(result.flagged(), &["Citation [2]".to_string()]);
    }

    #[tokio::test]
    async fn test_validator_schema_violation_after_correction() {
        let gateway = ScriptedGateway::new(&["not json", r#"{"verdict": "ok"}"#]);
        let validator = LlmValidator::new(gateway, RetryPolicy::none());

        let error = validator.validate("summary", &[]).await.unwrap_err();
        assert!(matches!(error, AgentError::SchemaViolation(_)));
    }
}
