//! Line patterns recognized by the parser.

use regex::Regex;
use std::sync::LazyLock;

pub(super) static AGENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*agent\s+(\w+)\s*\{").expect("valid agent pattern"));

/// A type name, with generic arguments separated by commas.
const TYPE_EXPR: &str = r"[\w\[\]<>.]+(?:,\s*[\w\[\]<>.]+)*";

pub(super) static TOOL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*tool\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*({}))?\s*\{{",
        TYPE_EXPR
    ))
    .expect("valid tool pattern")
});

pub(super) static EVENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*on\s+(\w+)\s*\{").expect("valid event pattern"));

pub(super) static STATE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*state\s*\{").expect("valid state pattern"));

pub(super) static TYPE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*type\s+(\w+)\s*\{").expect("valid type pattern"));

pub(super) static STATE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(\w+)(\?)?\s*:\s*({})", TYPE_EXPR))
        .expect("valid state field pattern")
});

pub(super) static TYPE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(\w+)\s*:\s*({})", TYPE_EXPR)).expect("valid type field pattern")
});

// Quoted values: non-greedy up to the next quote of either kind, no escapes.
pub(super) static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"description:\s*["'](.+?)["']"#).expect("valid description pattern")
});

pub(super) static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version:\s*["'](.+?)["']"#).expect("valid version pattern"));

pub(super) static PROVIDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"provider:\s*["'](.+?)["']"#).expect("valid provider pattern")
});

pub(super) static MODEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name:\s*["'](.+?)["']"#).expect("valid name pattern"));

/// Whether the line starts an agent member or a new top-level entity.
pub(super) fn opens_entity(line: &str) -> bool {
    TOOL_HEADER.is_match(line)
        || EVENT_HEADER.is_match(line)
        || STATE_HEADER.is_match(line)
        || AGENT_HEADER.is_match(line)
        || TYPE_HEADER.is_match(line)
}

/// First capture group of `re` in `line`, if any.
pub(super) fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
