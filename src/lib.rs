//! sprout-smoke: end-to-end checks that a development environment can talk to
//! an LLM provider.
//!
//! Secrets are read from a local `.env/sprout.env` file without overriding
//! anything already exported. A single chat call, a tool-using agent and an
//! in-memory vector store are then run against the configured provider.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sprout_smoke::{
//!     load_local_environment, Agent, AgentStrategy, ChatModel, FunctionFactory, ProcessEnv,
//!     ProviderConfig, SeedlingFactTool,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     load_local_environment(&mut ProcessEnv);
//!     let config = ProviderConfig::from_env(&ProcessEnv)?;
//!
//!     let tools = FunctionFactory::new().with_tool(SeedlingFactTool::new());
//!     let agent = Agent::initialize(
//!         tools,
//!         ChatModel::from_config(&config),
//!         AgentStrategy::FunctionCalling,
//!     );
//!
//!     let answer = agent.run("Tell me a fact about seedlings.").await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod config;
pub mod core;
pub mod env;
pub mod error;
pub(crate) mod services;
pub mod tools;
pub mod vector;

pub use config::{Provider, ProviderConfig};
pub use core::{
    Agent, AgentMemory, AgentStep, AgentStrategy, ChatModel, ChatResponse, RunResult, TokenUsage,
};
pub use env::{
    load_env_file, load_local_environment, EnvStore, LoadReport, MemoryEnv, ProcessEnv,
    LOCAL_ENV_PATH,
};
pub use error::{Result, SproutError};
pub use tools::{FnTool, FunctionFactory, SeedlingFactTool, Tool};
pub use vector::{Document, Embeddings, InMemoryVectorStore, OpenAIEmbeddings, DEFAULT_K};

#[cfg(feature = "cli")]
pub mod cli;
