//! Grep — counted pattern search with optional context lines.

use std::collections::VecDeque;

use serde_json::{json, Value};

use super::map;
use crate::error::ToolError;
use crate::filter;
use crate::reader;
use crate::state::EngineState;

struct GrepExample {
    line_number: u64,
    line: String,
    before: Vec<String>,
    after: Vec<String>,
}

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(_state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    let pattern = map::required_str(args, "pattern")?;
    let max_examples = map::u64_arg(args, "max_examples")
        .map(|v| v as usize)
        .unwrap_or(map::DEFAULT_GREP_EXAMPLES);
    let context_lines = map::u64_arg(args, "context_lines")
        .map(|v| v as usize)
        .unwrap_or(map::DEFAULT_CONTEXT_LINES);

    let matcher = filter::compile(pattern)?;

    let mut lines = reader::open_lines(&path).await?;
    let mut total: u64 = 0;
    let mut examples: Vec<GrepExample> = Vec::new();
    let mut recent: VecDeque<String> = VecDeque::with_capacity(context_lines);
    // (example index, lines still owed) for open after-context windows.
    let mut open_after: Vec<(usize, usize)> = Vec::new();
    let mut line_number: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;

        open_after.retain_mut(|(idx, remaining)| {
            examples[*idx].after.push(line.clone());
            *remaining -= 1;
            *remaining > 0
        });

        if matcher.is_match(&line) {
            total += 1;
            if examples.len() < max_examples {
                examples.push(GrepExample {
                    line_number,
                    line: line.clone(),
                    before: recent.iter().cloned().collect(),
                    after: Vec::new(),
                });
                if context_lines > 0 {
                    open_after.push((examples.len() - 1, context_lines));
                }
            }
        }

        if context_lines > 0 {
            if recent.len() == context_lines {
                recent.pop_front();
            }
            recent.push_back(line);
        }
    }

    let shown = examples.len() as u64;
    let example_docs: Vec<Value> = examples
        .into_iter()
        .map(|e| {
            json!({
                "line_number": e.line_number,
                "line": e.line,
                "context_before": e.before,
                "context_after": e.after,
            })
        })
        .collect();

    let hint = if total > shown {
        Some(format!(
            "{total} matches total, showing {shown}; use fetch with a filter to page through the rest"
        ))
    } else {
        None
    };

    Ok(json!({
        "file": path.display().to_string(),
        "pattern": pattern,
        "total_matches": total,
        "examples": example_docs,
        "hint": hint,
    }))
}
