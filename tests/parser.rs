//! Tests for the SAG text parser.
mod common;
use common::*;
use sagflow::prelude::*;

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn test_weather_sample_entities() {
        let result = parse(WEATHER_SAG);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

        assert_eq!(result.agents.len(), 1);
        let agent = &result.agents[0];
        assert_eq!(agent.name, "WeatherAgent");
        assert_eq!(
            agent.description.as_deref(),
            Some("An agent that provides weather information")
        );
        assert_eq!(agent.version.as_deref(), Some("1.0.0"));
        let model = agent.model.as_ref().expect("model block");
        assert_eq!(model.provider.as_deref(), Some("anthropic"));
        assert_eq!(model.name.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(agent.position.line, 1);

        assert_eq!(result.tools.len(), 1);
        let tool = &result.tools[0];
        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.params, "city: string");
        assert_eq!(tool.return_type.as_deref(), Some("WeatherData"));
        assert_eq!(
            tool.description.as_deref(),
            Some("Get current weather for a city")
        );
        assert_eq!(tool.agent_name, "WeatherAgent");

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].name, "user_message");
        assert_eq!(result.events[0].event_type, EventType::Input);

        let state = result.state_of("WeatherAgent").expect("state block");
        assert_eq!(state.fields.len(), 1);
        assert_eq!(state.fields[0].to_string(), "lastCity?: string");

        assert_eq!(result.types.len(), 1);
        let fields: Vec<String> = result.types[0].fields.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            fields,
            vec!["temperature: number", "humidity: number", "description: string"]
        );
    }

    #[test]
    fn test_event_classification() {
        let result = parse(
            "agent A {\n  on user_message {\n  }\n  on shutdown {\n  }\n  on foo {\n  }\n}\n",
        );
        let kinds: Vec<_> = result.events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![EventType::Input, EventType::Stop, EventType::Custom]
        );
    }

    #[test]
    fn test_closing_tool_body_keeps_agent_open() {
        let text = "agent A {\n  tool t() {\n  }\n  on start {\n  }\n  state {\n    n: number\n  }\n}\n";
        let result = parse(text);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.events[0].agent_name, "A");
        assert_eq!(result.states[0].agent_name, "A");
    }

    #[test]
    fn test_members_attach_to_their_own_agent() {
        let text = "agent A {\n  tool a_tool() {\n  }\n}\nagent B {\n  tool b_tool() {\n  }\n}\n";
        let result = parse(text);
        assert_eq!(result.tools_of("A").count(), 1);
        assert_eq!(result.tools_of("B").next().map(|t| t.name.as_str()), Some("b_tool"));
    }

    #[test]
    fn test_tool_description_is_not_taken_by_agent() {
        let text = "agent A {\n  tool t() {\n    description: \"tool only\"\n  }\n}\n";
        let result = parse(text);
        assert_eq!(result.agents[0].description, None);
        assert_eq!(result.tools[0].description.as_deref(), Some("tool only"));
    }

    #[test]
    fn test_inline_tool_description_and_single_quotes() {
        let text = "agent A {\n  description: 'single'\n  tool t(x: number) { description: \"inline\" }\n}\n";
        let result = parse(text);
        assert_eq!(result.agents[0].description.as_deref(), Some("single"));
        assert_eq!(result.tools[0].description.as_deref(), Some("inline"));
        assert_eq!(result.tools[0].return_type, None);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = "agent A {\n  description: \"uses {curly} braces\"\n  tool t() {\n    log(\"}\")\n  }\n  on start {\n  }\n}\n";
        let result = parse(text);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.events[0].agent_name, "A");
    }

    #[test]
    fn test_comment_braces_are_ignored() {
        let text = "agent A { // {\n  on start {\n  } // }\n}\n";
        let result = parse(text);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.events.len(), 1);
    }

    #[test]
    fn test_type_fields_have_no_optional_marker() {
        let result = parse("type Point {\n  x: number\n  y: number\n}\n");
        assert_eq!(result.types[0].name, "Point");
        assert_eq!(result.types[0].fields.len(), 2);
        assert_eq!(result.types[0].fields[1].type_name, "number");
        assert!(result.agents.is_empty());
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        let result = parse("hello world\n\n  random: text\n");
        assert!(result.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let result = parse("");
        assert!(result.is_empty());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_tool_outside_agent_is_reported() {
        let result = parse("tool orphan() {\n}\n");
        assert!(result.tools.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.line, 1);
        assert!(diagnostic.message.contains("orphan"));
    }

    #[test]
    fn test_state_outside_agent_is_reported() {
        let result = parse("state {\n  x: number\n}\n");
        assert!(result.states.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_unclosed_agent_is_an_error() {
        let result = parse("agent A {\n  tool t() {\n  }\n");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].line, 1);
        assert!(result.diagnostics[0].message.contains("never closed"));
        assert_eq!(result.tools.len(), 1);
    }

    #[test]
    fn test_unclosed_state_is_still_recorded() {
        let result = parse("agent A {\n  state {\n    x: number\n");
        assert_eq!(result.states.len(), 1);
        assert_eq!(result.states[0].fields.len(), 1);
        assert_eq!(
            result.diagnostics.iter().filter(|d| d.is_error()).count(),
            2
        );
    }

    #[test]
    fn test_duplicates_are_reported() {
        let text = "agent A {\n  tool t() {\n  }\n  tool t() {\n  }\n  state {\n  }\n  state {\n  }\n}\nagent A {\n}\n";
        let result = parse(text);
        let lines: Vec<usize> = result.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 9, 11]);
        assert!(!result.has_errors());
        assert_eq!(result.agents.len(), 2);
    }

    #[test]
    fn test_diagnostics_are_sorted_by_line() {
        let result = parse("}\nagent A {\n");
        let lines: Vec<usize> = result.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_agent_fields_after_one_line_members() {
        let result = parse("agent A {\n  state { x: number }\n  description: \"d\"\n}\n");
        assert_eq!(result.agents[0].description.as_deref(), Some("d"));

        let result = parse("agent A {\n  tool t() { }\n  version: \"2\"\n}\n");
        assert_eq!(result.agents[0].version.as_deref(), Some("2"));
        assert_eq!(result.tools[0].description, None);
    }

    #[test]
    fn test_agent_fields_after_model_block_and_member_bodies() {
        let text = "\
agent A {
  model {
    provider: \"openai\"
    name: \"gpt-4o\"
  }
  tool t() {
    description: \"tool\"
  }
  on start {
    description: \"handler\"
  }
  description: \"agent\"
}
";
        let result = parse(text);
        let agent = &result.agents[0];
        assert_eq!(agent.description.as_deref(), Some("agent"));
        let model = agent.model.as_ref().expect("model block");
        assert_eq!(model.provider.as_deref(), Some("openai"));
        assert_eq!(model.name.as_deref(), Some("gpt-4o"));
        assert_eq!(result.tools[0].description.as_deref(), Some("tool"));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_agent_lookahead_window() {
        let within = format!("agent A {{\n{}  version: \"1\"\n}}\n", "  // note\n".repeat(19));
        assert_eq!(parse(&within).agents[0].version.as_deref(), Some("1"));

        let beyond = format!("agent A {{\n{}  version: \"1\"\n}}\n", "  // note\n".repeat(20));
        let result = parse(&beyond);
        assert_eq!(result.agents[0].version, None);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_agent_lookahead_stops_at_agent_close() {
        let result = parse("agent A {\n}\ndescription: \"loose\"\nagent B {\n  description: \"b\"\n}\n");
        assert_eq!(result.agents[0].description, None);
        assert_eq!(result.agents[1].description.as_deref(), Some("b"));
    }

    #[test]
    fn test_tool_lookahead_window() {
        let within = format!(
            "agent A {{\n  tool t() {{\n{}    description: \"found\"\n  }}\n}}\n",
            "    // step\n".repeat(4)
        );
        assert_eq!(parse(&within).tools[0].description.as_deref(), Some("found"));

        let beyond = format!(
            "agent A {{\n  tool t() {{\n{}    description: \"found\"\n  }}\n}}\n",
            "    // step\n".repeat(5)
        );
        let result = parse(&beyond);
        assert_eq!(result.tools[0].description, None);
        assert_eq!(result.agents[0].description, None);
    }

    #[test]
    fn test_generic_field_types_keep_their_arguments() {
        let text = "\
type Lookup {
  entries: Map<string, number>
}

agent A {
  state { cache?: Map<string, List<number>>, hits: number }
  tool get() -> Map<string, number> {
  }
}
";
        let result = parse(text);
        assert_eq!(result.types[0].fields[0].type_name, "Map<string, number>");
        let state = &result.states[0];
        assert_eq!(state.fields.len(), 2);
        assert_eq!(state.fields[0].type_name, "Map<string, List<number>>");
        assert_eq!(state.fields[1].name, "hits");
        assert_eq!(result.tools[0].return_type.as_deref(), Some("Map<string, number>"));

        let regenerated = generate(&layout(&result));
        assert!(regenerated.contains("    cache?: Map<string, List<number>>\n"));
        assert!(regenerated.contains("  tool get() -> Map<string, number> {"));
    }

    #[test]
    fn test_headers_after_an_opening_brace_on_the_same_line() {
        let result = parse("agent A { state { x: number } }\n");
        assert_eq!(result.states.len(), 1);
        assert_eq!(result.states[0].agent_name, "A");
        assert_eq!(result.states[0].fields[0].name, "x");
        assert_eq!(result.states[0].position.column, 11);
        assert!(result.diagnostics.is_empty());

        let result = parse("agent B { tool t() { description: \"inline\" } }\n");
        assert_eq!(result.tools[0].agent_name, "B");
        assert_eq!(result.tools[0].description.as_deref(), Some("inline"));
        assert_eq!(result.agents[0].description, None);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let result = parse("\u{feff}agent A {\n}\n");
        assert_eq!(result.agents.len(), 1);
        assert_eq!(result.agents[0].name, "A");
        assert_eq!(result.agents[0].position.column, 1);
    }
}
