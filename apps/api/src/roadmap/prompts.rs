// LLM prompt templates for roadmap generation.

/// Roadmap generation prompt. Replace `{title}` before sending.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"
Generate a detailed, advanced, step-by-step career roadmap for a {title} in JSON format, with possible branches and labels for each step. Each step should have an id, label, and optionally a next array (with id and label for each branch). Example format:
[
  { "id": "A", "label": "Start", "next": [{ "id": "B", "label": "Option 1" }, { "id": "C", "label": "Option 2" }] },
  { "id": "B", "label": "Step 1" },
  { "id": "C", "label": "Step 2" }
]
"#;

pub fn build_roadmap_prompt(title: &str) -> String {
    ROADMAP_PROMPT_TEMPLATE.replace("{title}", title)
}
