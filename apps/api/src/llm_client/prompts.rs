// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-text rewrites that must come back as bare prose.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a concise professional writing assistant. \
    Respond with the requested text only. \
    Do NOT add headings, bullet points, quotes, or commentary.";
