pub mod agent;
pub mod chat;
pub mod memory;
pub mod result;
pub mod steps;

pub use agent::{Agent, AgentStrategy};
pub use chat::{ChatModel, ChatResponse};
pub use memory::AgentMemory;
pub use result::{RunResult, TokenUsage};
pub use steps::AgentStep;
