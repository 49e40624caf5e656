//! Run Synthesis use case
//!
//! Orchestrates the fan-out + merge flow: access filtering, chunked
//! concurrent dispatch, partial-failure aggregation, cost-tier synthesis
//! model selection, and the single final synthesis call.

use crate::ports::audit_sink::{AuditEvent, AuditSink};
use crate::ports::chat_gateway::{ChatGateway, GatewayError};
use crate::ports::identity::IdentityProvider;
use crate::ports::model_catalog::ModelCatalog;
use crate::ports::time::Sleeper;
use crate::use_cases::shared;
use polychat_domain::{
    DispatchResult, Message, ModelAnswer, PromptTemplate, SynthesisOutcome, Tier,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during a synthesis run
#[derive(Error, Debug)]
pub enum RunSynthesisError {
    #[error("No models available: every requested model was filtered out by access policy")]
    NoModelsAvailable,

    #[error("All models failed to respond")]
    AllModelsFailed,

    #[error("Synthesis step failed: {0}")]
    SynthesisFailed(#[source] GatewayError),
}

/// Tunables of the fan-out flow
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// Peak concurrency: calls per chunk
    pub chunk_size: usize,
    /// Pause between chunks, to soften burst load on upstream rate limiters
    pub inter_chunk_pause: Duration,
    /// Synthesis model when every requested target is free tier
    pub free_synthesis_model: String,
    /// Synthesis model when any requested target is premium tier
    pub premium_synthesis_model: String,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            inter_chunk_pause: Duration::from_millis(250),
            free_synthesis_model: "qwen/qwen-2.5-72b-instruct:free".to_string(),
            premium_synthesis_model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Input for the RunSynthesis use case
#[derive(Debug, Clone)]
pub struct RunSynthesisInput {
    pub user_prompt: String,
    pub history: Vec<Message>,
    pub target_model_ids: Vec<String>,
}

impl RunSynthesisInput {
    pub fn new(user_prompt: impl Into<String>, target_model_ids: Vec<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            history: Vec::new(),
            target_model_ids,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// Use case for fanning a prompt out to several models and merging the
/// surviving answers into one
pub struct RunSynthesisUseCase<G: ChatGateway> {
    gateway: Arc<G>,
    catalog: Arc<dyn ModelCatalog>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditSink>,
    sleeper: Arc<dyn Sleeper>,
    settings: SynthesisSettings,
}

impl<G: ChatGateway> RunSynthesisUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        catalog: Arc<dyn ModelCatalog>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<dyn AuditSink>,
        sleeper: Arc<dyn Sleeper>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            gateway,
            catalog,
            identity,
            audit,
            sleeper,
            settings,
        }
    }

    pub async fn execute(
        &self,
        input: RunSynthesisInput,
    ) -> Result<SynthesisOutcome, RunSynthesisError> {
        let caller = self.identity.current_caller();

        // Access filtering happens before any dispatch; a fully filtered-out
        // request fails fast without touching the network.
        let allowed: Vec<String> = input
            .target_model_ids
            .iter()
            .filter(|id| {
                let decision = shared::access_for(self.catalog.as_ref(), &caller, id);
                if !decision.is_allowed() {
                    warn!(model_id = %id, "target filtered out by access policy");
                }
                decision.is_allowed()
            })
            .cloned()
            .collect();

        if allowed.is_empty() {
            return Err(RunSynthesisError::NoModelsAvailable);
        }

        info!(
            targets = allowed.len(),
            chunk_size = self.settings.chunk_size,
            "starting synthesis fan-out"
        );

        let mut full_history = input.history.clone();
        full_history.push(Message::user(&input.user_prompt));
        let outbound = shared::outbound_messages(&full_history);

        let results = self.dispatch_chunked(&allowed, &outbound).await;

        let per_model_responses: Vec<ModelAnswer> = results
            .into_iter()
            .filter(DispatchResult::is_usable)
            .map(|r| ModelAnswer {
                model_id: r.model_id,
                content: r.content,
            })
            .collect();

        if per_model_responses.is_empty() {
            return Err(RunSynthesisError::AllModelsFailed);
        }

        // Every completed call leaves an audit record, not just the final
        // synthesis call.
        for answer in &per_model_responses {
            self.audit.record(AuditEvent::new(
                &input.user_prompt,
                &answer.content,
                &answer.model_id,
                caller.email.clone(),
            ));
        }

        // Cost control: the premium synthesis model is only ever spent when
        // the ORIGINALLY REQUESTED set contained a premium target.
        let synthesis_model = self.select_synthesis_model(&input.target_model_ids);
        info!(model_id = %synthesis_model, "synthesizing final answer");

        let synthesis_prompt =
            PromptTemplate::synthesis_prompt(&input.user_prompt, &per_model_responses);
        let synthesis_messages =
            shared::outbound_messages(&[Message::user(&synthesis_prompt)]);

        let synthesis_reply = self
            .gateway
            .send(synthesis_model, &synthesis_messages)
            .await
            .map_err(RunSynthesisError::SynthesisFailed)?;

        self.audit.record(AuditEvent::new(
            &input.user_prompt,
            &synthesis_reply.content,
            synthesis_model,
            caller.email.clone(),
        ));

        Ok(SynthesisOutcome {
            per_model_responses,
            synthesis: synthesis_reply.content,
        })
    }

    /// Dispatch the targets in fixed-size chunks. Within a chunk all calls
    /// run concurrently; chunk i+1 never starts before every call of chunk i
    /// has settled, which bounds peak concurrency to the chunk size.
    async fn dispatch_chunked(
        &self,
        model_ids: &[String],
        messages: &[Message],
    ) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(model_ids.len());

        for (index, chunk) in model_ids.chunks(self.settings.chunk_size.max(1)).enumerate() {
            if index > 0 {
                self.sleeper.sleep(self.settings.inter_chunk_pause).await;
            }
            debug!(chunk = index, size = chunk.len(), "dispatching chunk");

            let calls = chunk.iter().map(|id| self.dispatch_one(id, messages));
            results.extend(futures::future::join_all(calls).await);
        }

        results
    }

    /// One fan-out call. Failures are folded into the result; they never
    /// abort the batch.
    async fn dispatch_one(&self, model_id: &str, messages: &[Message]) -> DispatchResult {
        match self.gateway.send(model_id, messages).await {
            Ok(reply) => {
                info!(model_id, "model responded");
                DispatchResult::success(model_id, reply.content)
            }
            Err(e) => {
                warn!(model_id, error = %e, "model failed, continuing without it");
                DispatchResult::failure(model_id, e.into_error_kind())
            }
        }
    }

    fn select_synthesis_model(&self, requested: &[String]) -> &str {
        let any_premium = requested.iter().any(|id| {
            self.catalog
                .find(id)
                .is_some_and(|d| d.tier() == Tier::Premium)
        });

        if any_premium {
            &self.settings.premium_synthesis_model
        } else {
            &self.settings.free_synthesis_model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::audit_sink::NoAudit;
    use crate::ports::time::NoSleep;
    use async_trait::async_trait;
    use polychat_domain::{Caller, ErrorKind, ModelDescriptor, ModelReply, RestrictionClass};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Gateway stub that logs start/end events per call and fails for a
    /// configured set of model ids. The yield between start and end lets
    /// concurrent calls within a chunk interleave on the test runtime.
    struct ScriptedGateway {
        events: Arc<Mutex<Vec<String>>>,
        failing: HashSet<String>,
    }

    impl ScriptedGateway {
        fn new(events: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                events,
                failing: HashSet::new(),
            }
        }

        fn failing_for(events: Arc<Mutex<Vec<String>>>, ids: &[&str]) -> Self {
            Self {
                events,
                failing: ids.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn send(
            &self,
            model_id: &str,
            _messages: &[Message],
        ) -> Result<ModelReply, GatewayError> {
            self.events.lock().unwrap().push(format!("start:{}", model_id));
            tokio::task::yield_now().await;
            self.events.lock().unwrap().push(format!("end:{}", model_id));

            if self.failing.contains(model_id) {
                return Err(GatewayError::Upstream {
                    model_id: model_id.to_string(),
                    kind: ErrorKind::UpstreamServerError { status: 502 },
                });
            }
            Ok(ModelReply {
                content: format!("answer from {}", model_id),
                model: model_id.to_string(),
                usage: None,
            })
        }
    }

    /// Sleeper that records each pause into the shared event log
    struct RecordingSleeper(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0
                .lock()
                .unwrap()
                .push(format!("pause:{}ms", duration.as_millis()));
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl AuditSink for RecordingAudit {
        fn record(&self, event: AuditEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct FixedCatalog(Vec<ModelDescriptor>);

    impl ModelCatalog for FixedCatalog {
        fn list_models(&self) -> Vec<ModelDescriptor> {
            self.0.clone()
        }
    }

    struct FixedIdentity(Caller);

    impl IdentityProvider for FixedIdentity {
        fn current_caller(&self) -> Caller {
            self.0.clone()
        }
    }

    fn model(id: &str, price: f64) -> ModelDescriptor {
        ModelDescriptor {
            id: id.into(),
            display_name: id.into(),
            provider: "openrouter".into(),
            input_price_per_million: price,
            output_price_per_million: price,
            context_window_tokens: 128_000,
            is_active: true,
            restriction: RestrictionClass::None,
        }
    }

    fn use_case(
        gateway: ScriptedGateway,
        sleeper: Arc<dyn Sleeper>,
        models: Vec<ModelDescriptor>,
        caller: Caller,
    ) -> RunSynthesisUseCase<ScriptedGateway> {
        RunSynthesisUseCase::new(
            Arc::new(gateway),
            Arc::new(FixedCatalog(models)),
            Arc::new(FixedIdentity(caller)),
            Arc::new(NoAudit),
            sleeper,
            SynthesisSettings::default(),
        )
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn seven_targets_dispatch_as_three_chunks_that_settle_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::new(Arc::clone(&events));
        let sleeper = Arc::new(RecordingSleeper(Arc::clone(&events)));
        let targets = ids(&["m1", "m2", "m3", "m4", "m5", "m6", "m7"]);

        let uc = use_case(gateway, sleeper, vec![], Caller::anonymous());
        uc.execute(RunSynthesisInput::new("q", targets)).await.unwrap();

        let log = events.lock().unwrap().clone();
        let pauses: Vec<usize> = log
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("pause"))
            .map(|(i, _)| i)
            .collect();
        // Two pauses separate the three chunks of the fan-out (the final
        // synthesis call follows the last chunk without a pause).
        assert_eq!(pauses.len(), 2);

        // All of chunk 1 (m1..m3) settles before any of chunk 2 starts.
        let chunk1 = &log[..pauses[0]];
        assert_eq!(chunk1.iter().filter(|e| e.starts_with("start")).count(), 3);
        assert_eq!(chunk1.iter().filter(|e| e.starts_with("end")).count(), 3);

        let chunk2 = &log[pauses[0] + 1..pauses[1]];
        assert_eq!(chunk2.iter().filter(|e| e.starts_with("start")).count(), 3);
        assert_eq!(chunk2.iter().filter(|e| e.starts_with("end")).count(), 3);

        // Last chunk holds the single remaining target plus the synthesis call.
        let tail = &log[pauses[1] + 1..];
        assert!(tail.contains(&"start:m7".to_string()));
        assert!(tail.iter().any(|e| e.starts_with("start:qwen/")));
    }

    #[tokio::test]
    async fn partial_failures_are_tolerated() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::failing_for(Arc::clone(&events), &["m2", "m4"]);
        let targets = ids(&["m1", "m2", "m3", "m4", "m5"]);

        let uc = use_case(gateway, Arc::new(NoSleep), vec![], Caller::anonymous());
        let outcome = uc.execute(RunSynthesisInput::new("q", targets)).await.unwrap();

        assert_eq!(outcome.per_model_responses.len(), 3);
        assert!(!outcome.synthesis.is_empty());
        let surviving: Vec<&str> = outcome
            .per_model_responses
            .iter()
            .map(|a| a.model_id.as_str())
            .collect();
        assert_eq!(surviving, vec!["m1", "m3", "m5"]);
    }

    #[tokio::test]
    async fn all_failures_surface_as_all_models_failed() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::failing_for(Arc::clone(&events), &["m1", "m2"]);

        let uc = use_case(gateway, Arc::new(NoSleep), vec![], Caller::anonymous());
        let err = uc
            .execute(RunSynthesisInput::new("q", ids(&["m1", "m2"])))
            .await
            .unwrap_err();
        assert!(matches!(err, RunSynthesisError::AllModelsFailed));
    }

    #[tokio::test]
    async fn all_free_targets_use_the_free_synthesis_model() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::new(Arc::clone(&events));
        let models = vec![model("free-a", 0.0), model("free-b", 0.0)];

        let uc = use_case(gateway, Arc::new(NoSleep), models, Caller::anonymous());
        uc.execute(RunSynthesisInput::new("q", ids(&["free-a", "free-b"])))
            .await
            .unwrap();

        let log = events.lock().unwrap().clone();
        let last_start = log.iter().rev().find(|e| e.starts_with("start")).unwrap();
        assert_eq!(last_start, "start:qwen/qwen-2.5-72b-instruct:free");
    }

    #[tokio::test]
    async fn any_premium_target_selects_the_premium_synthesis_model() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::new(Arc::clone(&events));
        let models = vec![model("free-a", 0.0), model("paid-b", 3.0)];

        let uc = use_case(
            gateway,
            Arc::new(NoSleep),
            models,
            Caller::authenticated_user("u@example.com"),
        );
        uc.execute(RunSynthesisInput::new("q", ids(&["free-a", "paid-b"])))
            .await
            .unwrap();

        let log = events.lock().unwrap().clone();
        let last_start = log.iter().rev().find(|e| e.starts_with("start")).unwrap();
        assert_eq!(last_start, "start:gemini-2.0-flash");
    }

    #[tokio::test]
    async fn fully_filtered_request_fails_fast_without_dispatch() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::new(Arc::clone(&events));
        let models = vec![model("paid-a", 3.0), model("paid-b", 5.0)];

        // Anonymous caller requesting only premium targets.
        let uc = use_case(gateway, Arc::new(NoSleep), models, Caller::anonymous());
        let err = uc
            .execute(RunSynthesisInput::new("q", ids(&["paid-a", "paid-b"])))
            .await
            .unwrap_err();

        assert!(matches!(err, RunSynthesisError::NoModelsAvailable));
        assert!(events.lock().unwrap().is_empty(), "no network calls expected");
    }

    #[tokio::test]
    async fn every_completed_call_is_audited_not_just_the_synthesis() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gateway = ScriptedGateway::failing_for(Arc::clone(&events), &["m2"]);
        let audit = Arc::new(RecordingAudit::default());

        let uc = RunSynthesisUseCase::new(
            Arc::new(gateway),
            Arc::new(FixedCatalog(vec![])),
            Arc::new(FixedIdentity(Caller::authenticated_user("u@example.com"))),
            Arc::clone(&audit) as Arc<dyn AuditSink>,
            Arc::new(NoSleep),
            SynthesisSettings::default(),
        );
        uc.execute(RunSynthesisInput::new("q", ids(&["m1", "m2", "m3"])))
            .await
            .unwrap();

        let recorded = audit.events.lock().unwrap();
        let audited: Vec<&str> = recorded.iter().map(|e| e.model_id.as_str()).collect();
        // One record per surviving fan-out call, then one for the synthesis
        // call. The failed target leaves no record.
        assert_eq!(
            audited,
            vec!["m1", "m3", "qwen/qwen-2.5-72b-instruct:free"]
        );
        assert!(recorded
            .iter()
            .all(|e| e.owner_email.as_deref() == Some("u@example.com")));
        assert!(recorded.iter().all(|e| e.prompt == "q"));
    }

    #[tokio::test]
    async fn synthesis_step_failure_propagates() {
        let events = Arc::new(Mutex::new(Vec::new()));
        // The fan-out target succeeds; the free synthesis model fails.
        let gateway = ScriptedGateway::failing_for(
            Arc::clone(&events),
            &["qwen/qwen-2.5-72b-instruct:free"],
        );

        let uc = use_case(gateway, Arc::new(NoSleep), vec![], Caller::anonymous());
        let err = uc
            .execute(RunSynthesisInput::new("q", ids(&["m1"])))
            .await
            .unwrap_err();
        assert!(matches!(err, RunSynthesisError::SynthesisFailed(_)));
    }
}
