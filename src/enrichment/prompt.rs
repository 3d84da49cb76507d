//! Building the enrichment request and reading its result.

use crate::llm::Message;

/// Instruction used to seed new users and when a user has no stored prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that enriches a user's thought based on their provided memory context (entities). Your goal is to add depth and connection without altering the core meaning of the original thought.

Follow these rules:
1.  Analyze the user's thought in the context of their existing memories (entities).
2.  Identify key entities mentioned or implied in the thought.
3.  If entities from memory are relevant, briefly incorporate information about them into the enrichment.
4.  If new, un-memorized entities are mentioned, simply acknowledge them.
5.  Keep the enriched thought concise and preserve the original meaning.
6.  Do NOT repeat the original thought verbatim. Focus on adding context or connections.

Example:
- User Thought: "Thinking about my trip to Paris"
- User Memory: "Paris: Capital of France, known for Eiffel Tower"
- Enriched Output: "Recalling the trip to Paris, the city of lights and the iconic Eiffel Tower."

Example 2:
- User Thought: "My dog Max is playful"
- User Memory: "Max: Golden Retriever, loves fetch"
- Enriched Output: "Max, the energetic Golden Retriever who loves playing fetch, is certainly playful.""#;

/// Rendered in place of the entity list when the user has none.
pub const NO_ENTITIES_MARKER: &str = "No entities defined yet.";

/// Stored when the model answers with nothing usable.
pub const EMPTY_COMPLETION_TEXT: &str = "Could not enrich thought.";

/// Render the memory section: entity names joined by `", "`.
pub fn render_entity_names<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return NO_ENTITIES_MARKER.to_string();
    }
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compose the system directive and the user message for one thought.
pub fn compose_messages<S: AsRef<str>>(
    system_prompt: &str,
    original_content: &str,
    entity_names: &[S],
) -> Vec<Message> {
    let memory = render_entity_names(entity_names);
    let user = format!(
        "User's thought: \"{original_content}\"\n\nUser's memory (entities): {memory}\n\nEnriched thought:"
    );
    vec![Message::system(system_prompt), Message::user(user)]
}

/// Trim the model output, substituting a placeholder when it is empty or absent.
pub fn extract_enrichment(content: Option<String>) -> String {
    content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| EMPTY_COMPLETION_TEXT.to_string())
}
