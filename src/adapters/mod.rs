// Adapters layer: concrete implementations for external systems (filesystem, HTTP, LLM APIs, Telegram).

pub mod http;
pub mod llm;
pub mod storage;
pub mod telegram;
