//! Turning an engine transcript into what the user sees.

use std::collections::BTreeSet;
use std::fmt;
use switchboard_core::Message;

/// Answer printed when no message in the transcript carries content
pub const NO_ANSWER: &str = "No answer found.";

/// Width of the separator printed after every answer
pub const SEPARATOR_WIDTH: usize = 100;

/// Content of the last message that has any, scanning from the end.
pub fn final_answer(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|message| message.has_content())
        .map(|message| message.content.clone())
        .unwrap_or_else(|| NO_ANSWER.to_string())
}

/// Set of operation names used while answering one query.
///
/// Collected from the `tool_name` of tool results and the names of requested
/// tool calls. Order and repetition are not kept; names list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolUsage(BTreeSet<String>);

impl ToolUsage {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut names = BTreeSet::new();
        for message in messages {
            if let Some(name) = &message.tool_name {
                names.insert(name.clone());
            }
            names.extend(message.tool_calls.iter().map(|call| call.name.clone()));
        }
        Self(names)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ToolUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[Response from model only]");
        }
        let names: Vec<&str> = self.names().collect();
        write!(f, "[Used tool(s): {}]", names.join(", "))
    }
}

/// Outcome of one query cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub tools: ToolUsage,
    pub answer: String,
}

impl TurnReport {
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            tools: ToolUsage::from_messages(messages),
            answer: final_answer(messages),
        }
    }
}

impl fmt::Display for TurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.tools)?;
        writeln!(f, "Answer: {}", self.answer)?;
        writeln!(f, "{}", "-".repeat(SEPARATOR_WIDTH))
    }
}
