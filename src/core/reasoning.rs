//! Separates `<think>` traces from the visible answer.

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedAnswer {
    pub answer: String,
    pub reasoning: String,
}

/// Split raw model output into answer text and reasoning trace.
///
/// Every closed `<think>…</think>` region is removed from the answer. The
/// trimmed inner text of each region becomes the reasoning, with multiple
/// regions joined by a blank line. An opening tag without a matching close
/// is left in the answer verbatim, as is a stray closing tag.
pub fn split_reasoning(raw: &str) -> ParsedAnswer {
    let mut answer = String::with_capacity(raw.len());
    let mut traces: Vec<&str> = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find(THINK_OPEN) {
        let inner_start = open + THINK_OPEN.len();
        let Some(close) = rest[inner_start..].find(THINK_CLOSE) else {
            break;
        };
        answer.push_str(&rest[..open]);
        let inner = rest[inner_start..inner_start + close].trim();
        if !inner.is_empty() {
            traces.push(inner);
        }
        rest = &rest[inner_start + close + THINK_CLOSE.len()..];
    }
    answer.push_str(rest);

    ParsedAnswer {
        answer: answer.trim().to_string(),
        reasoning: traces.join("\n\n"),
    }
}
