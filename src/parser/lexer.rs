/// Blanks out string literal contents and trailing `//` comments so that braces
/// inside them are not counted as structure.
///
/// The result has the same byte length as `line` up to the start of a comment,
/// so byte offsets taken from the raw line stay valid on the masked one.
pub(super) fn mask_literals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                    push_blank(&mut out, ch);
                } else if ch == '\\' {
                    escaped = true;
                    push_blank(&mut out, ch);
                } else if ch == q {
                    quote = None;
                    out.push(ch);
                } else {
                    push_blank(&mut out, ch);
                }
            }
            None => match ch {
                '"' | '\'' | '`' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '/' if chars.peek() == Some(&'/') => break,
                _ => out.push(ch),
            },
        }
    }
    out
}

fn push_blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

/// Net change in brace depth across a line, ignoring literals and comments.
pub(super) fn brace_delta(line: &str) -> i32 {
    mask_literals(line).chars().fold(0, |depth, ch| match ch {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

/// Whether a line closes a block without opening one, ignoring literals.
pub(super) fn closes_block(line: &str) -> bool {
    let masked = mask_literals(line);
    masked.contains('}') && !masked.contains('{')
}

/// Splits a field list on `,` and `;` outside of `<>`, `[]` and `()`.
pub(super) fn split_fields(segment: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (offset, ch) in segment.char_indices() {
        match ch {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            ',' | ';' if depth <= 0 => {
                pieces.push(&segment[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    pieces.push(&segment[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braces_in_strings_are_masked() {
        let masked = mask_literals(r#"  description: "uses {city}" {"#);
        assert_eq!(brace_delta(&masked), 1);
        assert_eq!(masked.len(), r#"  description: "uses {city}" {"#.len());
    }

    #[test]
    fn test_template_literal_is_masked() {
        let masked = mask_literals("let url = `https://x/${city}`");
        assert_eq!(brace_delta(&masked), 0);
        assert!(!masked.contains('{'));
    }

    #[test]
    fn test_comment_is_dropped() {
        let masked = mask_literals("  } // closes { the agent");
        assert_eq!(masked.trim_end(), "  }");
        assert_eq!(brace_delta(&masked), -1);
    }

    #[test]
    fn test_closes_block() {
        assert!(closes_block("  }"));
        assert!(!closes_block("  } else {"));
        assert!(!closes_block(r#"  description: "}""#));
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let masked = mask_literals(r#"x = "a \" {" }"#);
        assert_eq!(brace_delta(&masked), -1);
    }

    #[test]
    fn test_split_fields_keeps_generic_arguments() {
        assert_eq!(
            split_fields("a: Map<string, number>, b: string[]; c: Pair<x, List<y, z>>"),
            vec!["a: Map<string, number>", " b: string[]", " c: Pair<x, List<y, z>>"]
        );
        assert_eq!(split_fields("  x: number"), vec!["  x: number"]);
    }
}
