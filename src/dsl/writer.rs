//! Netlist writer: the inverse of [`parse`](super::parse).

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::circuit::{Circuit, Lifecycle, Node};

/// Render a circuit as netlist text.
///
/// Dead components are skipped. Every parameter is written explicitly, so
/// parsing the output rebuilds an equivalent circuit even if defaults change.
pub fn write(circuit: &Circuit) -> String {
    let mut out = String::new();

    for component in circuit.components() {
        if component.lifecycle() == Lifecycle::Dead {
            continue;
        }
        let _ = write!(
            out,
            "{} {}",
            component.kind.component_type().keyword(),
            quote(&component.name)
        );
        for (key, value) in component.kind.params() {
            let _ = write!(out, " {}={}", key, value);
        }
        let (x, y) = component.position;
        let _ = writeln!(out, " x={} y={}", x, y);
    }

    let mut wires = circuit.wires().peekable();
    if wires.peek().is_some() {
        out.push('\n');
    }
    for wire in wires {
        let (Ok((from, from_pin)), Ok((to, to_pin))) = (circuit.pin_label(wire.from), circuit.pin_label(wire.to)) else {
            continue;
        };
        let _ = write!(
            out,
            ".wire {} {} {} {} delay={}",
            quote(from),
            from_pin,
            quote(to),
            to_pin,
            wire.delay
        );
        if let Some(color) = &wire.color {
            let _ = write!(out, " color={}", quote(color));
        }
        out.push('\n');
    }

    let nodes = circuit.nodes();
    let mut annotations = String::new();
    for node in &nodes {
        if let Some(line) = annotation(circuit, node, ".force", node.forced_value().map(|v| v.to_string())) {
            annotations.push_str(&line);
        }
    }
    for node in &nodes {
        let color = node.color.as_deref().map(|c| quote(c).into_owned());
        if let Some(line) = annotation(circuit, node, ".color", color) {
            annotations.push_str(&line);
        }
    }
    if !annotations.is_empty() {
        out.push('\n');
        out.push_str(&annotations);
    }

    out
}

fn annotation(circuit: &Circuit, node: &Node, directive: &str, value: Option<String>) -> Option<String> {
    let value = value?;
    let (component, pin) = circuit.pin_label(node.id).ok()?;
    Some(format!("{} {} {} {}\n", directive, quote(component), pin, value))
}

/// Quote `text` unless the lexer reads it back as one bare identifier.
fn quote(text: &str) -> Cow<'_, str> {
    let bare = text.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !text.chars().all(|c| c.is_ascii_digit());
    if bare {
        return Cow::Borrowed(text);
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}
