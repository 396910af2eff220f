mod ollama;

pub use ollama::OllamaLanguageModel;
