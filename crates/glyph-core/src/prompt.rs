//! Instruction text sent with every conversion request.
//!
//! Centralising the prompts here keeps them a single source of truth and
//! lets unit tests inspect them without a live provider. Callers can
//! override the system prompt via `[prompt] system_file` in the config;
//! the constants below are used when no override is provided.

/// Default system prompt describing the desired Markdown conventions.
///
/// The output language follows the language of this prompt, except literal
/// data extracted from the image (table contents, labels), which keeps its
/// source language.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Analyze the image content and convert it into a structured markdown representation that preserves its data and relationships.
Follow these conversion guidelines based on content type:

1. Content Type:
   - Identify whether it's a table, graph, chart, formula, flowchart, diagram, process flow, technical diagram or combination

2. For Tables:
   - Create an exact markdown representation of the table using pipe syntax (|column1|column2|)
   - Create a separator row (|---|---|) after the header
   - Transcribe all values exactly as they appear, including units and decimals
   - After the table, add a brief description of column headers and their meaning
   - Identify key trends or important values in the data

3. For Graphs and Charts:
   - Identify the graph type (bar, line, pie, scatter, etc.)
   - Describe axes, their units, and ranges
   - Record maximums, minimums, and important values
   - Describe the relationship pattern (linear, exponential, cyclical, etc.)

4. For Formulas:
   - Transcribe the formula into LaTeX notation within markdown delimiters:
     inline as $formula$, display as $$formula$$ (for example: $$ y = mx + b $$)
   - Identify variables and their meaning
   - Describe the mathematical context of the formula

5. For Flowcharts and Diagrams:
   - Convert to mermaid flowchart syntax when possible:
     ```mermaid
     flowchart TD
         A[Start] --> B{Decision}
         B -->|Yes| C[Process]
         B -->|No| D[End]
     ```
   - Quote labels containing spaces or special characters

6. For Process Flows:
   - Create a numbered list with clear step progression and any branching conditions

7. For Technical Diagrams:
   - Create a hierarchical structure using markdown headers
   - List components and their relationships
   - Preserve any measurements, tolerances, or specifications in tables

Additional Guidelines:
- Maintain numerical precision exactly as shown
- Preserve all labels and annotations as markdown text
- Keep extracted text in its original language (do not translate)
- Mark unclear or partially visible content with [unclear]
- Structure the output to prioritize machine readability
- Preserve relationships between data elements using markdown hierarchy"#;

/// Fixed user-turn instruction accompanying the image in each request.
pub const USER_PROMPT: &str =
    "Analyze this image containing structured data and create a detailed markdown description.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_covers_core_conventions() {
        for needle in ["markdown", "LaTeX", "mermaid", "|---|"] {
            assert!(
                DEFAULT_SYSTEM_PROMPT.contains(needle),
                "system prompt lost the '{needle}' convention"
            );
        }
    }

    #[test]
    fn user_prompt_is_nonempty() {
        assert!(!USER_PROMPT.trim().is_empty());
    }
}
