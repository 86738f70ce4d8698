// LLM prompt templates for the resume builder.

/// Entry rewrite prompt. Replace `{entry_type}`, `{industry}`, `{current}` before sending.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"As an expert resume writer, improve the following {entry_type} description for a {industry} professional.
Make it more impactful, quantifiable, and aligned with industry standards.
Current content: "{current}"

Requirements:
1. Use action verbs
2. Include metrics and results where possible
3. Highlight relevant technical skills
4. Keep it concise but detailed
5. Focus on achievements over responsibilities
6. Use industry-specific keywords

Format the response as a single paragraph without any additional text or explanations."#;
