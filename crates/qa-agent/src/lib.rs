//! A ReAct-style conversational QA agent core: session memory, a
//! provider-agnostic streaming LLM client, a tool registry, prompt
//! composition, and the orchestrator loop tying them together. HTTP
//! framing, concrete LLM SDKs, and concrete search backends live outside
//! this crate.

pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod stream;
pub mod tools;

pub use config::{RunConfig, ServiceConfig};
pub use error::{AgentError, LLMError, StorageError, ToolError};
pub use events::{AgentEvent, ErrorCategory};
pub use message::{Message, ToolCall};
pub use orchestrator::{CancellationHandle, Orchestrator};
pub use session::{InMemorySessionStore, SessionStore};
