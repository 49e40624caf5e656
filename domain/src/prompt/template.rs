//! Prompt templates for chat and synthesis turns

use crate::dispatch::value_objects::ModelAnswer;

/// Templates for generating the fixed prompt parts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt prepended to every outbound conversation
    pub fn default_system() -> &'static str {
        "You are a helpful AI assistant. Respond concisely and accurately."
    }

    /// Instruction template for the synthesis step
    pub fn synthesis_system() -> &'static str {
        r#"You are an expert synthesizer and data analyst. You will receive responses from multiple AI models to the same user question.
Your task is to create a comprehensive synthesis that adds meta-analysis of the model responses.

Structure your response as follows:
1. **Master Synthesis**: A comprehensive final answer that resolves contradictions and provides the most accurate conclusion.
2. **Model Comparison Analysis**:
   - **Similarities**: Key points that all or most models agreed upon.
   - **Differences**: Unique insights or different perspectives provided by specific models.
3. **Conflict & Ratio**: If models provide conflicting information, explicitly state the ratio (e.g., "3 out of 5 models (60%) suggest X, while 2 models (40%) suggest Y").
4. **Key Takeaways**: A quick summary of the most critical facts identified across the responses.

Ensure the final result is easy to read using Markdown tables, lists, and bold text. The language of the response should match the language of the user's question."#
    }

    /// Build the single synthesis prompt: instruction template, the original
    /// question, and each surviving answer labelled by its model id.
    pub fn synthesis_prompt(question: &str, answers: &[ModelAnswer]) -> String {
        let mut prompt = format!(
            "{}\n\nUser Question: {}\n\nModel Responses:\n",
            Self::synthesis_system(),
            question
        );

        for answer in answers {
            prompt.push_str(&format!("\n### {}\n{}\n", answer.model_id, answer.content));
        }

        prompt.push_str("\nPlease synthesize the above responses into a comprehensive answer.");
        prompt
    }
}
