//! Interactive augmentation setup backed by terminal prompts.
//!
//! Walks the user through:
//! 1. Deciding whether to augment the tracker at all
//! 2. Selecting a registered method
//! 3. Pointing at the folder with the method's results
//! 4. Entering the bias ratio
//!
//! The validation and retry rules live in `augmot_core::init`; this module
//! only moves text between the terminal and the core.

use augmot_core::{AugmentError, SetupPrompter};
use dialoguer::{Input, Select};

/// [`SetupPrompter`] that reads from the terminal with `dialoguer`.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl SetupPrompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> augmot_core::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AugmentError::prompt(e.to_string()))
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> augmot_core::Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| AugmentError::prompt(e.to_string()))
    }

    fn notify(&mut self, message: &str) {
        println!("  {}", message.replace('\n', "\n  "));
    }
}

/// Summary lines printed after setup completes.
pub fn describe_method(method: &dyn augmot_core::AugmentationMethod) -> Vec<String> {
    let Some(name) = method.name() else {
        return vec!["Augmentation: none".to_string()];
    };
    let mut lines = vec![
        format!("Augmentation: {} ({})", name, method.identifier()),
        format!("Bias ratio:   {}", method.bias_ratio()),
    ];
    if let Some(folder) = method.folder() {
        lines.push(format!("Folder:       {}", folder.display()));
    }
    for (class, ratio) in method.map_ratios() {
        lines.push(format!("Map ratio:    {} = {}", class, ratio));
    }
    lines
}
