use crate::schemas::Guardrail;

/// A unit of work for an agent, optionally guarded by an output check.
#[derive(Debug, Clone)]
pub struct Task {
    description: String,
    expected_output: String,
    context: Vec<String>,
    guardrail: Option<Guardrail>,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            context: Vec::new(),
            guardrail: None,
        }
    }

    pub fn with_guardrail(mut self, guardrail: Guardrail) -> Self {
        self.guardrail = Some(guardrail);
        self
    }

    /// Attach the output of an earlier task.
    pub fn with_context(mut self, label: &str, output: &str) -> Self {
        self.context.push(format!("{label}:\n{}", output.trim()));
        self
    }

    pub fn guardrail(&self) -> Option<&Guardrail> {
        self.guardrail.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The user turn that opens the task.
    pub fn prompt(&self) -> String {
        let mut prompt = self.description.trim().to_string();

        if !self.context.is_empty() {
            prompt.push_str("\n\nContext from previous steps:\n\n");
            prompt.push_str(&self.context.join("\n\n"));
        }

        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&self.expected_output);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let task = Task::new("Remove breakfast", "JSON block with action: remove_items.")
            .with_context("Research", "  Beach cafes  ")
            .with_guardrail(Guardrail::remove_items());

        let prompt = task.prompt();
        assert!(prompt.starts_with("Remove breakfast"));
        assert!(prompt.contains("Context from previous steps:\n\nResearch:\nBeach cafes"));
        assert!(prompt.ends_with("Expected output: JSON block with action: remove_items."));
        assert_eq!(task.guardrail().map(Guardrail::action), Some("remove_items"));
    }
}
