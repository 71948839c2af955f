//! The smoke checks themselves: one chat call, one agent run and one vector
//! search, each built from a [`ProviderConfig`].

use crate::{
    config::ProviderConfig,
    core::{Agent, AgentStrategy, ChatModel, RunResult},
    error::Result,
    tools::{FunctionFactory, SeedlingFactTool},
    vector::{Document, InMemoryVectorStore, OpenAIEmbeddings},
};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_LLM_PROMPT: &str = "Say hello and describe what seedlings are.";
pub const DEFAULT_AGENT_INSTRUCTION: &str = "Tell me a fact about seedlings.";
pub const DEFAULT_VECTOR_QUERY: &str = "What do seedlings need?";

/// Documents indexed by the vector check
pub const SEEDLING_DOCUMENTS: [&str; 3] = [
    "Seedlings need light, water, and nutrients to grow.",
    "Mature plants have established root systems.",
    "Germination is the process where seeds begin to sprout.",
];

/// Call the chat model once and return its reply text
pub async fn llm_check(config: &ProviderConfig, prompt: &str) -> Result<String> {
    let llm = ChatModel::from_config(config);
    info!(provider = %config.provider, model = %llm.model(), "Running LLM check");

    let response = llm.invoke(prompt).await?;
    Ok(response.content)
}

/// Run the seedling agent on `instruction`
pub async fn agent_check(
    config: &ProviderConfig,
    instruction: &str,
    strategy: AgentStrategy,
    max_iterations: usize,
) -> Result<RunResult> {
    let tools = FunctionFactory::new().with_tool(SeedlingFactTool::new());
    let llm = ChatModel::from_config(config);
    info!(provider = %config.provider, model = %llm.model(), %strategy, "Running agent check");

    let agent = Agent::initialize(tools, llm, strategy).with_max_iterations(max_iterations);
    agent.run_with_steps(instruction).await
}

/// Index the seedling documents and return the `k` best matches for `query`
pub async fn vector_check(config: &ProviderConfig, query: &str, k: usize) -> Result<Vec<Document>> {
    let embeddings = OpenAIEmbeddings::from_config(config);
    info!(provider = %config.provider, model = %embeddings.model(), "Running vector check");

    let store = InMemoryVectorStore::from_texts(SEEDLING_DOCUMENTS, Arc::new(embeddings)).await?;
    store.similarity_search(query, k).await
}
