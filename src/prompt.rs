/// The `PromptBuilder` struct constructs the summarization prompt for one
/// case. The instruction template is fixed; the case text is embedded
/// verbatim and unmodified.
pub struct PromptBuilder {
    /// The case text to be summarized.
    case_text: String,
}

impl PromptBuilder {
    /// Creates a new `PromptBuilder` for the given case text.
    ///
    /// # Arguments
    ///
    /// * `case_text` - The extracted case text.
    ///
    /// # Returns
    ///
    /// A new instance of `PromptBuilder`.
    pub fn new(case_text: impl Into<String>) -> Self {
        Self {
            case_text: case_text.into(),
        }
    }

    /// Builds the prompt string: the instruction template with the case text
    /// appended verbatim.
    ///
    /// # Returns
    ///
    /// A formatted prompt string.
    pub fn build(&self) -> String {
        format!(
            "You are an Indian legal AI assistant. Summarize the following court case \
             with high accuracy, using only the provided text.\n\
             Do NOT add assumptions or external knowledge on your own.\n\
             \n\
             Include:\n\
             - Case Title (if available)\n\
             - Key Dates (case, judgement, arrested, seen, call, evidence, person, action time and date.)\n\
             - Laws, Acts, or Articles cited (verbatim)\n\
             - Main Legal Issue (in brief)\n\
             - Court's Decision & Reasoning (without opinion)\n\
             - Precedent or Impact (if mentioned in the case text)\n\
             \n\
             Ensure the summary remains neutral, concise, and fact-based.\n\
             \n\
             Case Text: {}",
            self.case_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the case text is embedded verbatim and unmodified.
    #[test]
    fn test_case_text_embedded_verbatim() {
        let case_text = "On 12 March 1998 the appellant was seen near the godown.\n\
                         Section 302 IPC was invoked.";
        let prompt = PromptBuilder::new(case_text).build();

        assert!(prompt.contains(case_text));
        assert!(prompt.ends_with(case_text));
    }

    /// Tests that the structural asks are present in the template.
    #[test]
    fn test_template_structure() {
        let prompt = PromptBuilder::new("Some case text").build();

        assert!(prompt.contains("Indian legal AI assistant"));
        assert!(prompt.contains("Do NOT add assumptions or external knowledge"));
        assert!(prompt.contains("Laws, Acts, or Articles cited (verbatim)"));
        assert!(prompt.contains("Court's Decision & Reasoning"));
        assert!(prompt.contains("Precedent or Impact"));
    }

    /// Tests that identical input yields an identical prompt.
    #[test]
    fn test_prompt_is_deterministic() {
        let first = PromptBuilder::new("fixed text").build();
        let second = PromptBuilder::new("fixed text").build();

        assert_eq!(first, second);
    }
}
