use super::*;
use crate::ports::agents::AgentError;
use crate::ports::collaborators::CollaboratorError;
use crate::ports::page_cache::CacheError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thinker_domain::{
    CacheEntry, CacheKey, ClaimCheck, Evidence, EvidenceSource, FetchError, OutputFormat,
    PageContent, SearchHit, SynthesisResult, Task, TaskKind, TaskStatus, ValidationResult,
    Verdict,
};

// ==================== Test Doubles ====================

struct MockPlanner {
    decision: Mutex<Option<Result<PlannerDecision, AgentError>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockPlanner {
    fn new(decision: Result<PlannerDecision, AgentError>) -> Arc<Self> {
        Arc::new(Self {
            decision: Mutex::new(Some(decision)),
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn plan(steps: &[&str]) -> Arc<Self> {
        Self::new(Ok(PlannerDecision::Plan {
            objective: "Compare Rust async runtimes".to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }))
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            decision: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }
}

#[async_trait]
impl Planner for MockPlanner {
    async fn plan(&self, _conversation: &ConversationState) -> Result<PlannerDecision, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.decision
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(AgentError::SchemaViolation("no decision".into())))
    }
}

/// Retriever that answers every URL unless told to fail it
#[derive(Default)]
struct MockRetriever {
    failing_urls: Vec<String>,
    cache_error: Option<CacheError>,
    search_delay: Option<Duration>,
    fetch_delay: Option<Duration>,
    searches: Mutex<Vec<String>>,
    scrapes: Mutex<Vec<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockRetriever {
    fn new() -> Self {
        Self::default()
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing_urls.push(url.to_string());
        self
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn retrieval_calls(&self) -> usize {
        self.searches.lock().unwrap().len() + self.scrapes.lock().unwrap().len()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        self.enter();
        self.searches.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        self.leave();
        Ok(vec![SearchHit::new(
            format!("Result for {query}"),
            "https://example.com/result",
            "snippet",
        )])
    }

    async fn retrieve(
        &self,
        urls: &[String],
        _use_cache: bool,
    ) -> Result<Vec<Result<PageContent, FetchError>>, CacheError> {
        self.enter();
        self.scrapes.lock().unwrap().push(urls.to_vec());
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.leave();
        if let Some(error) = &self.cache_error {
            return Err(error.clone());
        }
        Ok(urls
            .iter()
            .map(|url| {
                if self.failing_urls.contains(url) {
                    return Err(FetchError::new(url, "HTTP 404", false));
                }
                let key = CacheKey::new(url, OutputFormat::Markdown)
                    .map_err(|e| FetchError::new(url, e.to_string(), false))?;
                Ok(PageContent::fetched(
                    &key,
                    CacheEntry::new(format!("content of {url}")),
                ))
            })
            .collect())
    }
}

/// Synthesizer that plays a script, then keeps asking for one more search
struct MockSynthesizer {
    script: Mutex<VecDeque<Result<SynthesisResult, AgentError>>>,
    seen_evidence: Mutex<Vec<Vec<Evidence>>>,
    seen_rounds: Mutex<Vec<(u32, u32)>>,
}

impl MockSynthesizer {
    fn new(script: Vec<Result<SynthesisResult, AgentError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen_evidence: Mutex::new(Vec::new()),
            seen_rounds: Mutex::new(Vec::new()),
        })
    }

    fn complete() -> Arc<Self> {
        Self::new(vec![Ok(SynthesisResult::complete(
            "Tokio is the most used runtime [1].\n\nSources:\n1. https://tokio.rs\n",
        ))])
    }

    fn calls(&self) -> usize {
        self.seen_evidence.lock().unwrap().len()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        _objective: &str,
        evidence: &[Evidence],
        context: SynthesisContext<'_>,
    ) -> Result<SynthesisResult, AgentError> {
        self.seen_evidence.lock().unwrap().push(evidence.to_vec());
        self.seen_rounds
            .lock()
            .unwrap()
            .push((context.round, context.max_rounds));
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        SynthesisResult::incomplete(
            format!("draft {}", context.round),
            vec![TaskPayload::search(format!("more detail {}", context.round))],
        )
        .map_err(|e| AgentError::SchemaViolation(e.to_string()))
    }
}

struct MockValidator {
    result: Result<ValidationResult, AgentError>,
    calls: AtomicUsize,
}

impl MockValidator {
    fn verified() -> Arc<Self> {
        Arc::new(Self {
            result: Ok(ValidationResult::from_checks(vec![ClaimCheck::supported(
                "Tokio is the most used runtime",
                "[1]",
            )])),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: Err(AgentError::SchemaViolation("claims missing".into())),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Validator for MockValidator {
    async fn validate(
        &self,
        _summary: &str,
        _evidence: &[Evidence],
    ) -> Result<ValidationResult, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[derive(Default)]
struct RecordingProgress {
    phases: Mutex<Vec<RunPhase>>,
    rounds: Mutex<Vec<(u32, usize)>>,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl ProgressNotifier for RecordingProgress {
    fn on_phase_change(&self, phase: RunPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_round_start(&self, round: u32, _max_rounds: u32, pending_tasks: usize) {
        self.rounds.lock().unwrap().push((round, pending_tasks));
    }

    fn on_task_start(&self, _task: &Task) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_complete(&self, _task: &Task) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<&'static str>>,
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

// ==================== Helpers ====================

fn use_case(
    planner: Arc<MockPlanner>,
    retriever: Arc<MockRetriever>,
    synthesizer: Arc<MockSynthesizer>,
    validator: Arc<MockValidator>,
    config: OrchestratorConfig,
) -> RunResearchUseCase {
    RunResearchUseCase::new(planner, retriever, synthesizer, validator, config)
}

fn request(text: &str) -> ConversationState {
    ConversationState::from_request(text)
}

fn report(outcome: RunOutcome) -> thinker_domain::ResearchReport {
    match outcome {
        RunOutcome::Report(report) => report,
        other => panic!("expected a report, got {:?}", other),
    }
}

fn assert_all_terminal(state: &RunState) {
    for task in state.queue().tasks() {
        assert!(
            task.status().is_terminal(),
            "task {} left in {}",
            task.id(),
            task.status()
        );
    }
}

// ==================== Direct answers and clarification ====================

#[tokio::test]
async fn test_greeting_is_answered_directly() {
    let planner = MockPlanner::new(Ok(PlannerDecision::DirectAnswer {
        text: "Hello! How can I help?".into(),
    }));
    let retriever = Arc::new(MockRetriever::new());
    let synthesizer = MockSynthesizer::complete();
    let validator = MockValidator::verified();
    let uc = use_case(
        planner,
        retriever.clone(),
        synthesizer.clone(),
        validator.clone(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Hey there"), &NoProgress).await;

    assert_eq!(state.history(), &[RunPhase::Planning, RunPhase::Done]);
    assert!(state.queue().is_empty());
    assert_eq!(retriever.retrieval_calls(), 0);
    assert_eq!(synthesizer.calls(), 0);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    match state.into_result().unwrap() {
        RunOutcome::DirectAnswer { text } => assert_eq!(text, "Hello! How can I help?"),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_clarification_ends_in_awaiting_user() {
    let planner = MockPlanner::new(Ok(PlannerDecision::Clarify {
        questions: vec!["Which runtimes?".into()],
    }));
    let retriever = Arc::new(MockRetriever::new());
    let uc = use_case(
        planner,
        retriever.clone(),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare them"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::AwaitingUser);
    assert!(state.queue().is_empty());
    assert_eq!(retriever.retrieval_calls(), 0);
    match state.into_result().unwrap() {
        RunOutcome::Clarification { questions } => {
            assert_eq!(questions, vec!["Which runtimes?".to_string()])
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_planner_failure_fails_run() {
    let planner = MockPlanner::new(Err(AgentError::SchemaViolation("not json".into())));
    let uc = use_case(
        planner,
        Arc::new(MockRetriever::new()),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(state.history(), &[RunPhase::Planning, RunPhase::Failed]);
    let error = state.into_result().unwrap_err();
    assert_eq!(error.kind, RunErrorKind::PlannerFailed);
}

// ==================== Research runs ====================

#[tokio::test]
async fn test_two_step_plan_single_round() {
    let retriever = Arc::new(MockRetriever::new());
    let synthesizer = MockSynthesizer::complete();
    let progress = RecordingProgress::default();
    let logger = Arc::new(RecordingLogger::default());
    let uc = use_case(
        MockPlanner::plan(&["search tokio vs async-std", "scrape https://tokio.rs"]),
        retriever.clone(),
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    )
    .with_conversation_logger(logger.clone());

    let state = uc.run(&request("Compare Rust async runtimes"), &progress).await;

    assert_eq!(
        state.history(),
        &[
            RunPhase::Planning,
            RunPhase::Retrieving,
            RunPhase::Synthesizing,
            RunPhase::Validating,
            RunPhase::Done
        ]
    );
    assert_eq!(state.queue().retrieval_count(TaskStatus::Done), 2);
    assert_eq!(synthesizer.calls(), 1);
    assert_eq!(synthesizer.seen_evidence.lock().unwrap()[0].len(), 2);
    assert_eq!(*progress.phases.lock().unwrap(), state.history());
    assert_eq!(*progress.rounds.lock().unwrap(), vec![(1, 2)]);
    assert_eq!(
        progress.started.load(Ordering::SeqCst),
        progress.completed.load(Ordering::SeqCst)
    );
    assert_all_terminal(&state);

    let events = logger.events.lock().unwrap().clone();
    assert_eq!(events.first(), Some(&"planner_decision"));
    assert_eq!(events.last(), Some(&"run_completed"));

    let report = report(state.into_result().unwrap());
    assert_eq!(report.objective, "Compare Rust async runtimes");
    assert_eq!(report.rounds, 1);
    assert!(!report.possibly_incomplete);
    assert_eq!(report.validation.as_ref().unwrap().verdict(), Verdict::Verified);
    assert_eq!(report.sources(), vec!["tokio vs async-std", "https://tokio.rs/"]);
}

#[tokio::test]
async fn test_failed_scrape_does_not_fail_run() {
    let retriever = Arc::new(MockRetriever::new().failing("https://down.example"));
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["search tokio", "scrape https://down.example"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Failed), 1);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Done), 1);
    let failed = state
        .queue()
        .tasks()
        .iter()
        .find(|t| t.status() == TaskStatus::Failed)
        .unwrap();
    assert!(failed.error().unwrap().contains("HTTP 404"));
    assert_eq!(synthesizer.seen_evidence.lock().unwrap()[0].len(), 1);
}

#[tokio::test]
async fn test_partial_scrape_keeps_successful_pages() {
    let retriever = Arc::new(MockRetriever::new().failing("https://down.example"));
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["scrape https://tokio.rs and https://down.example"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    let task = &state.queue().tasks()[0];
    assert_eq!(task.status(), TaskStatus::Done);
    match task.output() {
        Some(TaskOutput::Pages { pages, failures }) => {
            assert_eq!(pages.len(), 1);
            assert_eq!(failures.len(), 1);
        }
        other => panic!("unexpected output {:?}", other),
    }
    assert_eq!(synthesizer.seen_evidence.lock().unwrap()[0].len(), 1);
}

#[tokio::test]
async fn test_incomplete_synthesis_triggers_second_round() {
    let synthesizer = MockSynthesizer::new(vec![
        SynthesisResult::incomplete(
            "draft",
            vec![TaskPayload::scrape(vec!["https://async.rs".into()], true)],
        )
        .map_err(|e| AgentError::SchemaViolation(e.to_string())),
        Ok(SynthesisResult::complete("final answer")),
    ]);
    let retriever = Arc::new(MockRetriever::new());
    let progress = RecordingProgress::default();
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        retriever.clone(),
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &progress).await;

    assert_eq!(
        state.history(),
        &[
            RunPhase::Planning,
            RunPhase::Retrieving,
            RunPhase::Synthesizing,
            RunPhase::Retrieving,
            RunPhase::Synthesizing,
            RunPhase::Validating,
            RunPhase::Done
        ]
    );
    assert_eq!(synthesizer.calls(), 2);
    assert_eq!(*synthesizer.seen_rounds.lock().unwrap(), vec![(1, 3), (2, 3)]);
    assert_eq!(retriever.retrieval_calls(), 2);
    assert_eq!(*progress.rounds.lock().unwrap(), vec![(1, 1), (2, 1)]);

    // Second synthesis sees evidence from both rounds
    assert_eq!(synthesizer.seen_evidence.lock().unwrap()[1].len(), 2);

    let requested = state
        .queue()
        .tasks()
        .iter()
        .find(|t| t.origin() == TaskOrigin::Synthesis { round: 1 })
        .unwrap();
    assert_eq!(requested.status(), TaskStatus::Done);

    let report = report(state.into_result().unwrap());
    assert_eq!(report.summary, "final answer");
    assert_eq!(report.rounds, 2);
}

#[tokio::test]
async fn test_round_ceiling_forces_validation() {
    let synthesizer = MockSynthesizer::new(Vec::new());
    let validator = MockValidator::verified();
    let retriever = Arc::new(MockRetriever::new());
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        retriever.clone(),
        synthesizer.clone(),
        validator.clone(),
        OrchestratorConfig::default().with_max_rounds(3),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(synthesizer.calls(), 3);
    assert_eq!(retriever.retrieval_calls(), 3);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.rounds(), 3);
    assert!(state.possibly_incomplete());
    assert_all_terminal(&state);

    let report = report(state.into_result().unwrap());
    assert!(report.possibly_incomplete);
    assert_eq!(report.summary, "draft 3");
}

#[tokio::test]
async fn test_single_round_limit() {
    let synthesizer = MockSynthesizer::new(Vec::new());
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        Arc::new(MockRetriever::new()),
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default().with_max_rounds(1),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(synthesizer.calls(), 1);
    assert!(report(state.into_result().unwrap()).possibly_incomplete);
}

#[tokio::test]
async fn test_non_retrieval_additional_task_is_rejected() {
    let synthesizer = MockSynthesizer::new(vec![
        SynthesisResult::incomplete("draft", vec![TaskPayload::Validate])
            .map_err(|e| AgentError::SchemaViolation(e.to_string())),
    ]);
    let retriever = Arc::new(MockRetriever::new());
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        retriever.clone(),
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(synthesizer.calls(), 1);
    assert_eq!(retriever.retrieval_calls(), 1);
    let rejected = state
        .queue()
        .tasks()
        .iter()
        .find(|t| t.origin() == TaskOrigin::Synthesis { round: 1 })
        .unwrap();
    assert_eq!(rejected.kind(), TaskKind::Validate);
    assert_eq!(rejected.status(), TaskStatus::Failed);
    assert!(state.possibly_incomplete());
    assert_eq!(state.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_mixed_additional_tasks_keep_retrieval_ones() {
    let synthesizer = MockSynthesizer::new(vec![
        SynthesisResult::incomplete(
            "draft",
            vec![
                TaskPayload::Synthesize { round: 0 },
                TaskPayload::search("async-std status"),
            ],
        )
        .map_err(|e| AgentError::SchemaViolation(e.to_string())),
        Ok(SynthesisResult::complete("done")),
    ]);
    let retriever = Arc::new(MockRetriever::new());
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        retriever.clone(),
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(synthesizer.calls(), 2);
    assert_eq!(
        *retriever.searches.lock().unwrap(),
        vec!["tokio".to_string(), "async-std status".to_string()]
    );
    assert!(!state.possibly_incomplete());
}

#[tokio::test]
async fn test_synthesis_failure_without_draft_fails_run() {
    let synthesizer = MockSynthesizer::new(vec![Err(AgentError::SchemaViolation(
        "bad json".into(),
    ))]);
    let validator = MockValidator::verified();
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        Arc::new(MockRetriever::new()),
        synthesizer,
        validator.clone(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    assert_all_terminal(&state);
    assert_eq!(
        state.into_result().unwrap_err().kind,
        RunErrorKind::SynthesisFailed
    );
}

#[tokio::test]
async fn test_synthesis_failure_after_draft_keeps_draft() {
    let synthesizer = MockSynthesizer::new(vec![
        SynthesisResult::incomplete("first draft", vec![TaskPayload::search("more")])
            .map_err(|e| AgentError::SchemaViolation(e.to_string())),
        Err(AgentError::SchemaViolation("bad json".into())),
    ]);
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        Arc::new(MockRetriever::new()),
        synthesizer,
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    let report = report(state.into_result().unwrap());
    assert_eq!(report.summary, "first draft");
    assert!(report.possibly_incomplete);
}

#[tokio::test]
async fn test_validation_failure_is_advisory() {
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        Arc::new(MockRetriever::new()),
        MockSynthesizer::complete(),
        MockValidator::failing(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Done);
    let validate_task = state
        .queue()
        .tasks()
        .iter()
        .find(|t| t.kind() == TaskKind::Validate)
        .unwrap();
    assert_eq!(validate_task.status(), TaskStatus::Failed);

    let report = report(state.into_result().unwrap());
    assert!(report.validation.is_none());
    assert!(report.validation_error.unwrap().contains("claims missing"));
}

// ==================== Retrieval batches ====================

#[tokio::test]
async fn test_batch_respects_concurrency_limit() {
    let retriever = Arc::new(MockRetriever {
        search_delay: Some(Duration::from_millis(20)),
        ..MockRetriever::new()
    });
    let uc = use_case(
        MockPlanner::plan(&["search a", "search b", "search c", "search d", "search e"]),
        retriever.clone(),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        OrchestratorConfig::default().with_retrieval_concurrency(2),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.queue().retrieval_count(TaskStatus::Done), 5);
    assert!(retriever.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_evidence_follows_task_order() {
    // The search finishes last but was created first
    let retriever = Arc::new(MockRetriever {
        search_delay: Some(Duration::from_millis(30)),
        ..MockRetriever::new()
    });
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["search tokio", "scrape https://tokio.rs"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    uc.run(&request("Compare runtimes"), &NoProgress).await;

    let evidence = synthesizer.seen_evidence.lock().unwrap()[0].clone();
    assert!(matches!(evidence[0].source, EvidenceSource::Search { .. }));
    assert!(matches!(evidence[1].source, EvidenceSource::Page { .. }));
}

#[tokio::test]
async fn test_cache_failure_fails_run_after_batch_drains() {
    let retriever = Arc::new(MockRetriever {
        cache_error: Some(CacheError::Corrupted("bad cache file".into())),
        ..MockRetriever::new()
    });
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["search tokio", "scrape https://tokio.rs"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(synthesizer.calls(), 0);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Done), 1);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Failed), 1);
    assert_all_terminal(&state);
    assert_eq!(
        state.into_result().unwrap_err().kind,
        RunErrorKind::CacheCorrupted
    );
}

#[tokio::test]
async fn test_cache_io_error_only_fails_its_task() {
    let retriever = Arc::new(MockRetriever {
        cache_error: Some(CacheError::Io("read pages.json: permission denied".into())),
        ..MockRetriever::new()
    });
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["search tokio", "scrape https://tokio.rs"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(synthesizer.calls(), 1);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Failed), 1);
    assert_all_terminal(&state);
}

#[tokio::test]
async fn test_zero_concurrency_still_runs_tasks() {
    let config = OrchestratorConfig {
        retrieval_concurrency: 0,
        run_timeout: Some(Duration::from_secs(5)),
        ..OrchestratorConfig::default()
    };
    let uc = use_case(
        MockPlanner::plan(&["search tokio", "search async-std"]),
        Arc::new(MockRetriever::new()),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        config,
    );

    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;

    assert_eq!(state.phase(), RunPhase::Done);
    assert_eq!(state.queue().retrieval_count(TaskStatus::Done), 2);
}

// ==================== Cancellation and deadlines ====================

#[tokio::test]
async fn test_pre_cancelled_run_does_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let planner = MockPlanner::plan(&["search tokio"]);
    let uc = use_case(
        planner.clone(),
        Arc::new(MockRetriever::new()),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    )
    .with_cancellation(token);

    let error = uc.execute(&request("Compare runtimes")).await.unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(planner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_during_retrieval() {
    let token = CancellationToken::new();
    let retriever = Arc::new(MockRetriever {
        search_delay: Some(Duration::from_secs(30)),
        ..MockRetriever::new()
    });
    let synthesizer = MockSynthesizer::complete();
    let uc = use_case(
        MockPlanner::plan(&["search tokio"]),
        retriever,
        synthesizer.clone(),
        MockValidator::verified(),
        OrchestratorConfig::default(),
    )
    .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });
    let state = uc.run(&request("Compare runtimes"), &NoProgress).await;
    canceller.await.unwrap();

    assert_eq!(state.phase(), RunPhase::Failed);
    assert_eq!(synthesizer.calls(), 0);
    assert_all_terminal(&state);
    assert!(state.into_result().unwrap_err().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_run_deadline() {
    let uc = use_case(
        MockPlanner::slow(Duration::from_secs(120)),
        Arc::new(MockRetriever::new()),
        MockSynthesizer::complete(),
        MockValidator::verified(),
        OrchestratorConfig::default().with_run_timeout(Some(Duration::from_secs(5))),
    );

    let error = uc.execute(&request("Compare runtimes")).await.unwrap_err();

    assert_eq!(error.kind, RunErrorKind::TimedOut);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let run = || async {
        let uc = use_case(
            MockPlanner::plan(&["search tokio", "scrape https://tokio.rs"]),
            Arc::new(MockRetriever::new()),
            MockSynthesizer::complete(),
            MockValidator::verified(),
            OrchestratorConfig::default(),
        );
        let state = uc.run(&request("Compare runtimes"), &NoProgress).await;
        let kinds: Vec<_> = state
            .queue()
            .tasks()
            .iter()
            .map(|t| (t.id(), t.kind(), t.status()))
            .collect();
        (state.history().to_vec(), kinds)
    };

    assert_eq!(run().await, run().await);
}
