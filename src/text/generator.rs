use super::value::{element_value_to_value, Value};
use crate::consts::choice_name_for_tag;
use crate::model::Profile;

/// Renders a [`Profile`] back to value notation text.
///
/// Output is pretty-printed for readability; the crate's text round-trip
/// property is defined under [`super::normalize`], so exact whitespace here
/// is not significant. Each Profile Element becomes its own `valueN
/// ProfileElement ::= choice-name : body` statement, the surface form the
/// format's own value notation uses — `N` is a 1-based positional counter
/// with no meaning beyond telling statements apart.
pub struct Generator;

impl Generator {
    #[must_use]
    pub fn generate(profile: &Profile) -> String {
        let mut out = String::new();
        for (i, element) in profile.elements.iter().enumerate() {
            let name = choice_name_for_tag(element.tag).map(str::to_string).unwrap_or_else(|| format!("tag_{}", element.tag));
            let value = element_value_to_value(&element.value);
            out.push_str(&format!("value{} ProfileElement ::= {} : ", i + 1, name));
            write_value(&mut out, &value, 0);
            out.push('\n');
        }
        out
    }
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Hex(bytes) => {
            out.push('\'');
            for b in bytes {
                out.push_str(&format!("{b:02X}"));
            }
            out.push_str("'H");
        }
        Value::Str(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        Value::List(items) => {
            if items.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            let last = items.len() - 1;
            for (i, item) in items.iter().enumerate() {
                write_indent(out, depth + 1);
                write_value(out, item, depth + 1);
                if i != last {
                    out.push(',');
                }
                out.push('\n');
            }
            write_indent(out, depth);
            out.push('}');
        }
        Value::Fields(fields) => {
            let visible: Vec<_> = fields.iter().filter(|(_, v)| !matches!(v, Value::Null)).collect();
            if visible.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            let last = visible.len() - 1;
            for (i, (name, field_value)) in visible.iter().enumerate() {
                write_indent(out, depth + 1);
                out.push_str(name);
                out.push_str(" : ");
                write_value(out, field_value, depth + 1);
                if i != last {
                    out.push(',');
                }
                out.push('\n');
            }
            write_indent(out, depth);
            out.push('}');
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
