//! Line-oriented parser that extracts agents, tools, event handlers, state blocks
//! and type declarations from SAG source text.
//!
//! The parser is best-effort: it never fails. Lines that match no rule are
//! skipped, and structural problems (stray braces, unclosed blocks, entities
//! declared outside an agent) are reported as [`Diagnostic`]s on the result.
//!
//! Attachment of tools, handlers and state blocks is decided by an explicit
//! stack of open scopes, one frame per unclosed `{`, so an entity always belongs
//! to the innermost agent that structurally encloses it.

mod lexer;
mod patterns;
mod scope;

use crate::model::{
    Diagnostic, EventType, ModelRef, ParseResult, ParsedAgent, ParsedEvent, ParsedState,
    ParsedTool, ParsedType, SourcePosition, StateField, TypeField,
};
use ahash::AHashSet;
use lexer::{brace_delta, closes_block, mask_literals, split_fields};
use patterns::*;
use scope::{Scope, ScopeStack};
use tracing::{debug, trace};

/// Lines scanned after an agent header for `description`, `version` and `model`.
/// The scan also ends at the agent's closing brace; member bodies are skipped.
pub const AGENT_LOOKAHEAD: usize = 20;
/// Lines scanned after a tool header for its `description`.
pub const TOOL_LOOKAHEAD: usize = 5;

/// Parses SAG source text into its entities.
///
/// # Example
///
/// ```
/// use sagflow::parser::parse;
/// use sagflow::model::EventType;
///
/// let result = parse("agent Greeter {\n  on user_message {\n  }\n}\n");
/// assert_eq!(result.agents[0].name, "Greeter");
/// assert_eq!(result.events[0].event_type, EventType::Input);
/// assert!(result.diagnostics.is_empty());
/// ```
pub fn parse(text: &str) -> ParseResult {
    DslParser::new(text).run()
}

struct DslParser<'a> {
    lines: Vec<&'a str>,
    stack: ScopeStack,
    result: ParseResult,
    agent_names: AHashSet<String>,
    // (agent, "tool" | "event", member name)
    members: AHashSet<(String, &'static str, String)>,
}

impl<'a> DslParser<'a> {
    fn new(text: &'a str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: text.lines().collect(),
            stack: ScopeStack::default(),
            result: ParseResult::default(),
            agent_names: AHashSet::new(),
            members: AHashSet::new(),
        }
    }

    fn run(mut self) -> ParseResult {
        for index in 0..self.lines.len() {
            let raw = self.lines[index];
            self.scan_line(index, raw);
        }
        self.close_remaining();
        self.result.diagnostics.sort_by_key(|d| d.line);

        debug!(
            agents = self.result.agents.len(),
            tools = self.result.tools.len(),
            events = self.result.events.len(),
            states = self.result.states.len(),
            types = self.result.types.len(),
            diagnostics = self.result.diagnostics.len(),
            "parsed SAG document"
        );
        self.result
    }

    fn scan_line(&mut self, index: usize, raw: &str) {
        let masked = mask_literals(raw);
        self.scan_segment(index, raw, &masked, 0);
    }

    /// Scans `raw` (and its masked twin) starting `prefix` characters into the
    /// line. A header's remainder is scanned again, so `agent A { state {` on one
    /// line opens both scopes.
    fn scan_segment(&mut self, index: usize, raw: &str, masked: &str, prefix: usize) {
        let line = index + 1;

        // Inside a state or type body only fields and braces are meaningful.
        if self.collecting_fields() {
            self.consume_body(masked, line);
            return;
        }

        let column = prefix + leading_column(raw);

        let header_end = if let Some(caps) = AGENT_HEADER.captures(raw) {
            let header_end = caps.get(0).map_or(raw.len(), |m| m.end());
            let inline = raw.get(header_end..).unwrap_or("");
            self.open_agent(caps[1].to_string(), inline, index, column);
            header_end
        } else if let Some(caps) = TOOL_HEADER.captures(raw) {
            let header_end = caps.get(0).map_or(raw.len(), |m| m.end());
            let name = caps[1].to_string();
            let params = caps[2].trim().to_string();
            let return_type = caps.get(3).map(|m| m.as_str().to_string());
            let inline = raw.get(header_end..).unwrap_or("");
            self.open_tool(name, params, return_type, inline, index, column);
            header_end
        } else if let Some(caps) = EVENT_HEADER.captures(raw) {
            self.open_event(caps[1].to_string(), line, column);
            caps.get(0).map_or(raw.len(), |m| m.end())
        } else if let Some(m) = STATE_HEADER.find(raw) {
            self.open_state(line, column);
            m.end()
        } else if let Some(caps) = TYPE_HEADER.captures(raw) {
            self.stack.push(Scope::Type {
                name: caps[1].to_string(),
                line,
                column,
                fields: Vec::new(),
            });
            caps.get(0).map_or(raw.len(), |m| m.end())
        } else {
            self.consume_body(masked, line);
            return;
        };

        let rest = raw.get(header_end..).unwrap_or("");
        let masked_rest = rest_of(masked, header_end);
        if opens_entity(rest) {
            let prefix = prefix + raw[..header_end].chars().count();
            self.scan_segment(index, rest, masked_rest, prefix);
        } else {
            self.consume_body(masked_rest, line);
        }
    }

    fn collecting_fields(&mut self) -> bool {
        matches!(
            self.stack.top_mut(),
            Some(Scope::State { .. } | Scope::Type { .. })
        )
    }

    fn open_agent(&mut self, name: String, inline: &str, index: usize, column: usize) {
        let line = index + 1;
        if !self.agent_names.insert(name.clone()) {
            self.warn(line, format!("agent '{}' is declared more than once", name));
        }

        let (description, version, model) = self.agent_lookahead(inline, index);
        trace!(agent = %name, line, "agent header");
        self.result.agents.push(ParsedAgent {
            name: name.clone(),
            description,
            version,
            model,
            position: SourcePosition::new(line, column),
        });
        self.stack.push(Scope::Agent { name, line });
    }

    fn open_tool(
        &mut self,
        name: String,
        params: String,
        return_type: Option<String>,
        inline: &str,
        index: usize,
        column: usize,
    ) {
        let line = index + 1;
        match self.stack.enclosing_agent().map(str::to_string) {
            Some(agent_name) => {
                self.check_member(&agent_name, "tool", &name, line);
                let description = capture(&DESCRIPTION, inline).or_else(|| {
                    // A body closed on the header line has nothing further to scan.
                    (brace_delta(inline) >= 0)
                        .then(|| self.tool_lookahead(index))
                        .flatten()
                });
                trace!(agent = %agent_name, tool = %name, line, "tool header");
                self.result.tools.push(ParsedTool {
                    name,
                    params,
                    return_type,
                    description,
                    agent_name,
                    position: SourcePosition::new(line, column),
                });
            }
            None => self.warn(line, format!("tool '{}' is declared outside of an agent", name)),
        }
        self.stack.push(Scope::Block { line });
    }

    fn open_event(&mut self, name: String, line: usize, column: usize) {
        match self.stack.enclosing_agent().map(str::to_string) {
            Some(agent_name) => {
                self.check_member(&agent_name, "event", &name, line);
                trace!(agent = %agent_name, event = %name, line, "event handler");
                self.result.events.push(ParsedEvent {
                    event_type: EventType::classify(&name),
                    name,
                    agent_name,
                    position: SourcePosition::new(line, column),
                });
            }
            None => self.warn(
                line,
                format!("event handler '{}' is declared outside of an agent", name),
            ),
        }
        self.stack.push(Scope::Block { line });
    }

    fn open_state(&mut self, line: usize, column: usize) {
        let owner = self.stack.enclosing_agent().map(str::to_string);
        if owner.is_none() {
            self.warn(line, "state block is declared outside of an agent");
        }
        self.stack.push(Scope::State {
            owner,
            line,
            column,
            fields: Vec::new(),
        });
    }

    /// Feeds masked body text through the scope stack: braces open and close
    /// scopes, the text between them is offered to a collecting state/type block.
    fn consume_body(&mut self, content: &str, line: usize) {
        let mut segment = String::new();
        for ch in content.chars() {
            match ch {
                '{' => {
                    self.collect_fields(&segment);
                    segment.clear();
                    self.stack.push(Scope::Block { line });
                }
                '}' => {
                    self.collect_fields(&segment);
                    segment.clear();
                    self.close_scope(line);
                }
                _ => segment.push(ch),
            }
        }
        self.collect_fields(&segment);
    }

    fn collect_fields(&mut self, segment: &str) {
        match self.stack.top_mut() {
            Some(Scope::State { fields, .. }) => {
                for piece in split_fields(segment) {
                    if let Some(caps) = STATE_FIELD.captures(piece) {
                        fields.push(StateField {
                            name: caps[1].to_string(),
                            type_name: caps[3].to_string(),
                            optional: caps.get(2).is_some(),
                        });
                    }
                }
            }
            Some(Scope::Type { fields, .. }) => {
                for piece in split_fields(segment) {
                    if let Some(caps) = TYPE_FIELD.captures(piece) {
                        fields.push(TypeField {
                            name: caps[1].to_string(),
                            type_name: caps[2].to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    fn close_scope(&mut self, line: usize) {
        match self.stack.pop() {
            None => self.error(line, "unexpected '}' with no open block"),
            Some(Scope::Agent { name, .. }) => trace!(agent = %name, line, "agent closed"),
            Some(scope) => self.commit(scope, line),
        }
    }

    /// Records the entity a state or type scope collected.
    fn commit(&mut self, scope: Scope, closed_at: usize) {
        match scope {
            Scope::State {
                owner: Some(agent_name),
                line,
                column,
                fields,
            } => {
                if self.result.state_of(&agent_name).is_some() {
                    self.warn(
                        closed_at,
                        format!("agent '{}' declares more than one state block", agent_name),
                    );
                }
                self.result.states.push(ParsedState {
                    agent_name,
                    fields,
                    position: SourcePosition::new(line, column),
                });
            }
            Scope::Type {
                name,
                line,
                column,
                fields,
            } => {
                self.result.types.push(ParsedType {
                    name,
                    fields,
                    position: SourcePosition::new(line, column),
                });
            }
            _ => {}
        }
    }

    fn close_remaining(&mut self) {
        let open: Vec<Scope> = self.stack.drain_open().collect();
        let last_line = self.lines.len();
        for scope in open {
            self.error(
                scope.line(),
                format!(
                    "{} opened on line {} is never closed",
                    scope.describe(),
                    scope.line()
                ),
            );
            self.commit(scope, last_line);
        }
    }

    /// Agent-level fields from the header's remainder and the lines after it.
    ///
    /// Only text at the agent's own level counts: lines inside a tool, handler,
    /// state or nested entity body are skipped, while `model { .. }` is read.
    fn agent_lookahead(
        &self,
        inline: &str,
        index: usize,
    ) -> (Option<String>, Option<String>, Option<ModelRef>) {
        let mut description = None;
        let mut version = None;
        let mut model: Option<ModelRef> = None;

        let following = self.lines.iter().skip(index + 1).take(AGENT_LOOKAHEAD).copied();
        let mut depth = 0;
        // Depth at which the member body being skipped was opened.
        let mut member: Option<i32> = None;
        for line in std::iter::once(inline).chain(following) {
            // Agents do not nest; another header means this one was never closed.
            if member.is_none() && AGENT_HEADER.is_match(line) {
                break;
            }
            let opens_member = member.is_none() && opens_entity(line);
            if member.is_none() && !opens_member {
                if let Some(found) = capture(&DESCRIPTION, line) {
                    description = Some(found);
                }
                if let Some(found) = capture(&VERSION, line) {
                    version = Some(found);
                }
                let provider = capture(&PROVIDER, line);
                let name = capture(&MODEL_NAME, line);
                if provider.is_some() || name.is_some() {
                    let model = model.get_or_insert_with(ModelRef::default);
                    if provider.is_some() {
                        model.provider = provider;
                    }
                    if name.is_some() {
                        model.name = name;
                    }
                }
            }
            if opens_member {
                member = Some(depth);
            }
            depth += brace_delta(line);
            if member.is_some_and(|floor| depth <= floor) {
                member = None;
            }
            if depth < 0 {
                break;
            }
        }
        (description, version, model)
    }

    fn tool_lookahead(&self, index: usize) -> Option<String> {
        for line in self.lines.iter().skip(index + 1).take(TOOL_LOOKAHEAD) {
            if opens_entity(line) {
                break;
            }
            if let Some(found) = capture(&DESCRIPTION, line) {
                return Some(found);
            }
            if closes_block(line) {
                break;
            }
        }
        None
    }

    fn check_member(&mut self, agent_name: &str, kind: &'static str, name: &str, line: usize) {
        let key = (agent_name.to_string(), kind, name.to_string());
        if !self.members.insert(key) {
            self.warn(
                line,
                format!("agent '{}' declares {} '{}' more than once", agent_name, kind, name),
            );
        }
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.result.diagnostics.push(Diagnostic::warning(line, message));
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.result.diagnostics.push(Diagnostic::error(line, message));
    }
}

/// 1-based column of the first non-whitespace character.
fn leading_column(raw: &str) -> usize {
    raw.chars().take_while(|c| c.is_whitespace()).count() + 1
}

fn rest_of(masked: &str, offset: usize) -> &str {
    masked.get(offset..).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_column() {
        assert_eq!(leading_column("agent A {"), 1);
        assert_eq!(leading_column("    tool t() {"), 5);
    }

    #[test]
    fn test_header_remainder_is_parsed_as_body() {
        let result = parse("agent A {\n  state { lastCity?: string, count: number }\n}\n");
        let state = &result.states[0];
        assert_eq!(state.fields.len(), 2);
        assert!(state.fields[0].optional);
        assert_eq!(state.fields[1].name, "count");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_stray_closing_brace_is_reported() {
        let result = parse("}\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].is_error());
        assert_eq!(result.diagnostics[0].line, 1);
    }
}
