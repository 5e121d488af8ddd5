// Free-form chat: forwards a user message plus prior turns to the completion
// service under the fixed travel system prompt.
// All LLM calls go through llm_client; no direct HTTP calls here.

pub mod handlers;
pub mod models;
pub mod transport;
