use crate::errors::RagResult;
use crate::models::{ChatMessage, Role, ServiceStatus};
use crate::stream::TextStream;

/// Generative model gateway.
pub trait ILanguageModel: Send + Sync {
    /// Generate a complete response. `system` may be empty.
    fn generate(&self, prompt: &str, system: &str) -> RagResult<String>;

    /// Generate a response as a lazy chunk stream.
    fn generate_stream(&self, prompt: &str, system: &str) -> RagResult<TextStream>;

    fn health(&self) -> ServiceStatus;

    /// Multi-turn generation. The default folds the transcript into a single
    /// prompt; adapters with a native chat endpoint override it.
    fn chat(&self, messages: &[ChatMessage]) -> RagResult<String> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let transcript: Vec<String> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect();
        self.generate(&transcript.join("\n\n"), &system.join("\n\n"))
    }
}
