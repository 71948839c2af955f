//! Provider embeddings and an in-memory vector store over them

pub mod embeddings;
pub mod store;

pub use embeddings::{Embeddings, OpenAIEmbeddings};
pub use store::{cosine_similarity, Document, InMemoryVectorStore, DEFAULT_K};
