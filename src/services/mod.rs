pub(crate) mod execution;
pub mod openai_client;
pub(crate) mod prompts;
pub(crate) mod react;
pub(crate) mod tool_call_utils;
