//! Best-effort recovery of model replies into structured records.
//!
//! The remote generator is the unreliable boundary: it is asked for strict
//! JSON but may wrap it in code fences, leave literal newlines inside string
//! values, double the outer braces, or quote with single quotes. The repair
//! steps here are enumerable and order-fixed, applied at most once, and only
//! re-shape syntax; they never invent field data.

use crate::dispatcher::TurnResult;
use crate::inputs::CollectedInputs;
use anyhow::{Context, Result};
use log::warn;
use serde_json::Value;

const UNREADABLE_MESSAGE: &str = "The AI returned an unreadable response. Please try again.";

/// Parses model output as JSON, running the repair pipeline when the direct
/// parse fails. The terminal failure is an error; callers decide how to
/// surface it.
pub fn parse_json_reply(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    warn!("Direct JSON parse failed, attempting repair");

    // 1. Pull the payload out of a fenced code block if there is one.
    let mut candidate = extract_fenced_block(trimmed)
        .unwrap_or(trimmed)
        .to_string();

    // 2. Escape literal newlines that sit inside string values.
    candidate = escape_newlines_in_strings(&candidate);

    // 3. Un-double `{{ ... }}` wrapping (template-engine residue).
    candidate = strip_doubled_braces(&candidate).to_string();

    if let Ok(value) = serde_json::from_str(&candidate) {
        return Ok(value);
    }

    // 4. One permissive pass: tolerate single-quoted keys and strings.
    let relaxed = rewrite_single_quotes(&candidate);
    serde_json::from_str(&relaxed).context("Model reply is not recoverable JSON")
}

/// Recovers a structured turn record from model text. Never fails and is not
/// retried further: an unrecoverable reply becomes a single terminal `Error`
/// turn the caller surfaces to the user.
pub fn parse_turn_reply(raw: &str) -> TurnResult {
    match parse_json_reply(raw).and_then(|value| {
        serde_json::from_value::<TurnResult>(value).context("Reply is missing status or message")
    }) {
        Ok(result) => result,
        Err(e) => {
            warn!("Unreadable model reply: {e:#}");
            TurnResult::error(UNREADABLE_MESSAGE, CollectedInputs::default())
        }
    }
}

/// Returns the contents of the first fenced code block, tolerating an
/// optional language tag (```json, ```python, bare ```).
fn extract_fenced_block(s: &str) -> Option<&str> {
    let open = s.find("```")?;
    let after_ticks = &s[open + 3..];
    // Skip the language tag up to the first newline.
    let body_start = after_ticks.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_ticks[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Single left-to-right pass replacing literal newlines inside double-quoted
/// strings with the two-character escape. String state toggles on an
/// unescaped `"`.
fn escape_newlines_in_strings(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut prev = '\0';
    for c in s.chars() {
        if c == '"' && prev != '\\' {
            in_string = !in_string;
        }
        if c == '\n' && in_string {
            out.push_str("\\n");
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

/// Strips one layer of doubled outer braces: `{{ ... }}` becomes `{ ... }`.
fn strip_doubled_braces(s: &str) -> &str {
    let t = s.trim();
    if t.starts_with("{{") && t.ends_with("}}") && t.len() >= 4 {
        t[1..t.len() - 1].trim()
    } else {
        t
    }
}

/// Rewrites single-quoted strings to double-quoted ones, escaping any double
/// quotes they contain. Deliberately not a JSON5 parser; just enough for the
/// Python-literal style lists some models emit.
fn rewrite_single_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '"' if in_single => {
                out.push('\\');
                out.push('"');
            }
            '"' if prev != '\\' => {
                in_double = !in_double;
                out.push(c);
            }
            '\'' if !in_double && prev != '\\' => {
                in_single = !in_single;
                out.push('"');
            }
            _ => out.push(c),
        }
        prev = c;
    }
    out
}
