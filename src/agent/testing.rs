//! Mock collaborators for agent and tool tests

use crate::external::{
    Clock, Document, ExternalError, ExternalResult, SqlEngine, VectorStore,
};
use crate::llm::{ChatRequest, ChatResponse, LlmError, LlmService, ModelInvoker, Usage};
use crate::store::ToolCall;
use crate::tools::ToolContext;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A final answer with no tool calls
pub fn final_answer(text: &str) -> ChatResponse {
    ChatResponse {
        content: text.to_string(),
        tool_calls: vec![],
        usage: Usage::default(),
    }
}

/// An assistant response requesting the given tool calls
pub fn calls_response(tool_calls: Vec<ToolCall>) -> ChatResponse {
    ChatResponse {
        content: String::new(),
        tool_calls,
        usage: Usage::default(),
    }
}

/// LLM service that plays back a scripted sequence of responses
#[derive(Clone)]
pub struct ScriptedLlm {
    state: Arc<Mutex<ScriptState>>,
}

struct ScriptState {
    responses: VecDeque<Result<ChatResponse, LlmError>>,
    calls: usize,
    last_request: Option<ChatRequest>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                responses: script.into(),
                calls: 0,
                last_request: None,
            })),
        }
    }

    pub fn into_service(self) -> Arc<dyn LlmService> {
        Arc::new(self)
    }

    /// Total number of chat calls made
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Text of the final message in the most recent request
    pub fn last_request_text(&self) -> String {
        let state = self.state.lock().unwrap();
        state
            .last_request
            .as_ref()
            .and_then(|r| r.messages.last())
            .map(|m| m.text().to_string())
            .unwrap_or_default()
    }

    /// Message count of the most recent request
    pub fn last_request_len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .last_request
            .as_ref()
            .map(|r| r.messages.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.last_request = Some(request.clone());
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::unknown("scripted responses exhausted")))
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }
}

/// Vector store returning a fixed document list
#[derive(Clone)]
pub struct MockVectorStore {
    docs: Vec<Document>,
    failing: bool,
    last_query: Arc<Mutex<Option<(String, usize)>>>,
}

impl MockVectorStore {
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            failing: false,
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(vec![])
        }
    }

    pub fn last_query(&self) -> Option<(String, usize)> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn similarity_search(&self, query: &str, k: usize) -> ExternalResult<Vec<Document>> {
        *self.last_query.lock().unwrap() = Some((query.to_string(), k));
        if self.failing {
            return Err(ExternalError::Malformed("vector store offline".into()));
        }
        Ok(self.docs.clone())
    }
}

/// Relational engine returning a fixed result for every query
#[derive(Clone)]
pub struct MockSqlEngine {
    result: String,
    failing: bool,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockSqlEngine {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            failing: false,
            executed: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new("")
        }
    }

    /// Queries passed to `execute`, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlEngine for MockSqlEngine {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    async fn table_info(&self) -> ExternalResult<String> {
        Ok(
            "CREATE TABLE timetable (cinema TEXT, title TEXT, language TEXT, link TEXT, \
             date DATE, time TIME)"
                .to_string(),
        )
    }

    async fn execute(&self, query: &str) -> ExternalResult<String> {
        self.executed.lock().unwrap().push(query.to_string());
        if self.failing {
            return Err(ExternalError::Malformed("relational engine offline".into()));
        }
        Ok(self.result.clone())
    }
}

/// Clock pinned to Thursday 2026-08-06 18:45 local time
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, 18, 45, 0).unwrap()
    }
}

/// Tool context wired with the given collaborators
pub fn context_with(
    llm: ScriptedLlm,
    vectors: MockVectorStore,
    sql: MockSqlEngine,
    clock: FixedClock,
) -> ToolContext {
    ToolContext {
        invoker: ModelInvoker::new(llm.into_service()),
        clock: Arc::new(clock),
        vectors: Arc::new(vectors),
        sql: Arc::new(sql),
    }
}

pub fn context_with_llm(llm: ScriptedLlm) -> ToolContext {
    context_with(llm, MockVectorStore::empty(), MockSqlEngine::new(""), FixedClock)
}

pub fn context_with_vectors(vectors: MockVectorStore) -> ToolContext {
    context_with(ScriptedLlm::new(vec![]), vectors, MockSqlEngine::new(""), FixedClock)
}

/// Inert context for tools that touch no collaborators
pub fn test_context() -> ToolContext {
    context_with_llm(ScriptedLlm::new(vec![]))
}
