use colored::*;
use serde_json::{Map, Value};

use crate::llm::Usage;

/// Console handles all terminal output with colored formatting
pub struct Console {
    tool_color: Color,
    answer_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            tool_color: Color::Magenta,
            answer_color: Color::Green,
        }
    }

    /// Announce a tool call by name only
    pub fn print_tool_call(&self, name: &str) {
        println!(" - Calling function: {}", name.color(self.tool_color));
    }

    /// Announce a tool call with its arguments
    pub fn print_tool_call_verbose(&self, name: &str, args: &Map<String, Value>) {
        println!(
            "Calling function: {}({})",
            name.color(self.tool_color).bold(),
            Value::Object(args.clone())
        );
    }

    /// Print the envelope a tool sent back to the model
    pub fn print_tool_response(&self, response: &Value) {
        println!("{} {}", "->".bright_black(), response);
    }

    /// Print the model's final answer
    pub fn print_final(&self, text: &str) {
        println!("{}", text.color(self.answer_color));
    }

    /// Print a fatal error; messages already carry their own wording
    pub fn print_error(&self, error: &str) {
        eprintln!("{}", error.red().bold());
    }

    /// Print a notice that is not an error but should not go to stdout
    pub fn print_notice(&self, message: &str) {
        eprintln!("{} {}", "Notice:".yellow().bold(), message);
    }

    /// Print the verbose run summary
    pub fn print_summary(&self, prompt: &str, usage: Option<Usage>) {
        println!("User prompt: {}", prompt);
        if let Some(usage) = usage {
            println!("Prompt tokens: {}", usage.prompt_tokens);
            println!("Response tokens: {}", usage.response_tokens);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
