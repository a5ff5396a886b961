//! The ReAct state machine (spec §4.5) — the heart of this crate.
//!
//! Grounded in the teacher's `agent/tool_loop.rs`: an async loop that opens
//! an LLM stream, buffers text until the turn's finish reason is known,
//! dispatches any tool calls through the registry, and re-enters the loop
//! until a `stop` finish reason or a bound is hit. The event emission is
//! pushed onto a bounded `mpsc` channel read by [`crate::stream`], mirroring
//! the teacher's channel-fed SSE writer rather than returning a boxed
//! `Stream` directly — this keeps the state machine a plain `async fn` task
//! instead of a hand-written `Stream` impl.

mod cancellation;

pub use cancellation::CancellationHandle;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::error::ToolError;
use crate::events::{AgentEvent, ErrorCategory};
use crate::llm::{FinishReason, LLMChunk, LLMClient, ToolCallAssembler};
use crate::message::{Message, ToolCall};
use crate::prompt::build_system_prompt;
use crate::session::SessionStore;
use crate::tools::ToolRegistry;

/// Everything a run needs that outlives a single request. Cheap to clone —
/// every field is an `Arc`, matching the teacher's `AgentSystem` collaborator
/// bundle.
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LLMClient>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<dyn SessionStore>,
    language: String,
    persona: String,
    description: String,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        tools: Arc<ToolRegistry>,
        sessions: Arc<dyn SessionStore>,
        language: impl Into<String>,
        persona: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            tools,
            sessions,
            language: language.into(),
            persona: persona.into(),
            description: description.into(),
        }
    }

    /// Drive one request to completion, emitting events onto the returned
    /// channel as they happen. `session_id` of `None` generates a fresh UUID
    /// v4 (spec §6).
    pub fn run(
        &self,
        question: String,
        session_id: Option<String>,
        run_config: RunConfig,
    ) -> mpsc::Receiver<AgentEvent> {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let (tx, rx) = mpsc::channel(64);
        let this = self.clone();
        let span = info_span!("agent_run", session_id = %session_id);
        tokio::spawn(async move { this.drive(question, session_id, run_config, tx).await }.instrument(span));
        rx
    }

    async fn drive(
        &self,
        question: String,
        session_id: String,
        run_config: RunConfig,
        tx: mpsc::Sender<AgentEvent>,
    ) {
        if run_config.cancellation.is_cancelled() {
            return;
        }

        let history = self.sessions.get_messages(&session_id).await;
        let system_prompt = build_system_prompt(
            &self.tools.descriptors(),
            &self.language,
            &self.persona,
            &self.description,
            current_date(),
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(history);
        messages.push(Message::user(question.clone()));

        let mut step = 0usize;
        let mut final_text = String::new();
        let schemas = self.tools.schemas();

        loop {
            if run_config.cancellation.is_cancelled() {
                return;
            }

            let stream_result = self.llm.stream(&messages, &schemas, &run_config).await;
            let mut llm_stream = match stream_result {
                Ok(s) => s,
                Err(e) => {
                    emit_error_then_done(&tx, e.category, e.message, &session_id).await;
                    return;
                }
            };

            let mut turn_fragments: Vec<String> = Vec::new();
            let mut assembler = ToolCallAssembler::new();
            let finish_reason;

            tracing::debug!(step, "opened llm stream");

            loop {
                tokio::select! {
                    biased;
                    _ = run_config.cancellation.cancelled() => return,
                    next = llm_stream.recv() => {
                        match next {
                            None => {
                                emit_error_then_done(
                                    &tx,
                                    ErrorCategory::Transport,
                                    "LLM stream closed without an End chunk".to_string(),
                                    &session_id,
                                )
                                .await;
                                return;
                            }
                            Some(Err(e)) => {
                                tracing::warn!(category = ?e.category, "llm stream errored mid-turn");
                                emit_error_then_done(&tx, e.category, e.message, &session_id).await;
                                return;
                            }
                            Some(Ok(LLMChunk::TextDelta(text))) => {
                                turn_fragments.push(text);
                            }
                            Some(Ok(LLMChunk::ToolCallDelta { id, name, arguments_fragment })) => {
                                assembler.push(id, name, arguments_fragment);
                            }
                            Some(Ok(LLMChunk::End(reason))) => {
                                finish_reason = reason;
                                break;
                            }
                        }
                    }
                }
            }

            tracing::debug!(step, ?finish_reason, "turn finished");

            match finish_reason {
                FinishReason::Stop => {
                    for fragment in turn_fragments {
                        final_text.push_str(&fragment);
                        if fragment.is_empty() {
                            continue;
                        }
                        if tx.send(AgentEvent::Token { text: fragment }).await.is_err() {
                            return;
                        }
                    }
                    break;
                }
                FinishReason::ToolCalls => {
                    let tool_calls = assembler.finish();
                    if run_config.cancellation.is_cancelled() {
                        return;
                    }
                    tracing::info!(step, count = tool_calls.len(), "dispatching tool calls");
                    match self.dispatch(&tool_calls, &run_config, &tx).await {
                        Ok(results) => {
                            if run_config.cancellation.is_cancelled() {
                                return;
                            }
                            messages.push(Message::assistant_tool_calls(tool_calls));
                            for (call_id, text) in results {
                                messages.push(Message::tool_result(call_id, text));
                            }
                        }
                        Err((category, detail)) => {
                            emit_error_then_done(&tx, category, detail, &session_id).await;
                            return;
                        }
                    }

                    step += 1;
                    if step >= run_config.max_steps {
                        tracing::warn!(step, max_steps = run_config.max_steps, "recursion limit reached");
                        emit_error_then_done(
                            &tx,
                            ErrorCategory::RecursionLimit,
                            format!("reached max_steps={}", run_config.max_steps),
                            &session_id,
                        )
                        .await;
                        return;
                    }
                }
                FinishReason::Length => {
                    emit_error_then_done(&tx, ErrorCategory::Timeout, "hit max_output_tokens".to_string(), &session_id).await;
                    return;
                }
                FinishReason::ContentFilter => {
                    emit_error_then_done(&tx, ErrorCategory::Filtered, "provider content filter triggered".to_string(), &session_id).await;
                    return;
                }
                FinishReason::Error => {
                    emit_error_then_done(&tx, ErrorCategory::Transport, "provider reported an error finish reason".to_string(), &session_id).await;
                    return;
                }
            }
        }

        if run_config.cancellation.is_cancelled() {
            return;
        }

        match self.sessions.append(&session_id, Message::user(question), final_text).await {
            Ok(()) => {
                let _ = tx.send(AgentEvent::Done { session_id }).await;
            }
            Err(e) => {
                emit_error_then_done(&tx, ErrorCategory::Storage, e.to_string(), &session_id).await;
            }
        }
    }

    /// Invoke every pending tool call, in emission order, returning
    /// `(tool_call_id, result_text)` pairs to append as `ToolResult`s.
    /// `think` calls emit `Thought` only; everything else emits
    /// `Action`/`Observation`.
    ///
    /// Two `ToolError` variants are terminal rather than becoming an
    /// `Observation` (spec §7): `unknown_tool` (an orchestrator invariant
    /// violation — `internal`) and `malformed_arguments` (the LLM emitted
    /// arguments the schema cannot bind — `malformed`). Both happen before
    /// the tool's own `invoke()` runs. Everything `invoke()` itself returns
    /// is, by construction, recoverable and becomes an `Observation`.
    async fn dispatch(
        &self,
        tool_calls: &[ToolCall],
        run_config: &RunConfig,
        tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<Vec<(String, String)>, (ErrorCategory, String)> {
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            if run_config.cancellation.is_cancelled() {
                return Ok(results);
            }

            let tool = match self.tools.get(&call.name) {
                Some(t) => t,
                None => {
                    return Err((ErrorCategory::Internal, format!("unknown tool: {}", call.name)));
                }
            };

            if call.name == "think" {
                let outcome = tokio::select! {
                    biased;
                    _ = run_config.cancellation.cancelled() => return Ok(results),
                    outcome = tool.invoke(call.arguments.clone(), run_config.cancellation.child()) => outcome,
                };
                let text = match outcome {
                    Ok(text) => text,
                    Err(ToolError::MalformedArguments(msg)) => {
                        return Err((ErrorCategory::Malformed, format!("malformed think arguments: {msg}")));
                    }
                    Err(other) => other.to_observation_text(),
                };
                if tx.send(AgentEvent::Thought { text: text.clone() }).await.is_err() {
                    return Ok(results);
                }
                results.push((call.id.clone(), text));
                continue;
            }

            if tx
                .send(AgentEvent::Action { tool: call.name.clone(), arguments: call.arguments.clone() })
                .await
                .is_err()
            {
                return Ok(results);
            }

            let outcome = tokio::select! {
                biased;
                _ = run_config.cancellation.cancelled() => return Ok(results),
                outcome = tool.invoke(call.arguments.clone(), run_config.cancellation.child()) => outcome,
            };
            let text = match outcome {
                Ok(text) => text,
                Err(ToolError::MalformedArguments(msg)) => {
                    return Err((ErrorCategory::Malformed, format!("malformed arguments for {}: {msg}", call.name)));
                }
                Err(e) => e.to_observation_text(),
            };

            if tx
                .send(AgentEvent::Observation { tool: call.name.clone(), text: text.clone() })
                .await
                .is_err()
            {
                return Ok(results);
            }
            results.push((call.id.clone(), text));
        }

        Ok(results)
    }
}

async fn emit_error_then_done(
    tx: &mpsc::Sender<AgentEvent>,
    category: ErrorCategory,
    detail: String,
    session_id: &str,
) {
    let _ = tx.send(AgentEvent::Error { category, detail }).await;
    let _ = tx.send(AgentEvent::Done { session_id: session_id.to_string() }).await;
}

fn current_date() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
