use gate_data::GateTarget;

use crate::circuit::Circuit;
use crate::error::CircuitError;

/// Parses the full text grammar:
/// `NAME[(a1,a2,...)] [TAG] t1 t2 ... tk`, comments (`#...`), blank
/// lines, and nested `REPEAT n { ... }` blocks with the brace allowed
/// on the `REPEAT` line or its own following line.
pub fn parse_circuit_text(text: &str) -> Result<Circuit, CircuitError> {
    let lines = preprocess_lines(text);
    let mut pos = 0;
    let circuit = parse_block(&lines, &mut pos)?;
    if pos != lines.len() {
        return Err(CircuitError::UnmatchedClosingBrace);
    }
    Ok(circuit)
}

/// One logical source line, already comment-stripped and brace-split:
/// `"REPEAT 3 {"` becomes two entries, `"REPEAT 3"` and `"{"`.
fn preprocess_lines(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let without_comment = match raw_line.find('#') {
            Some(i) => &raw_line[..i],
            None => raw_line,
        };
        let spaced = without_comment.replace('{', " { ").replace('}', " } ");
        for piece in split_on_braces(&spaced) {
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
    out
}

/// Splits a brace-spaced line into segments so that `{`/`}` always
/// start their own logical line, while everything else on the original
/// line (e.g. `REPEAT 3`) stays together as one.
fn split_on_braces(spaced_line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for token in spaced_line.split_whitespace() {
        if token == "{" || token == "}" {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            segments.push(token.to_string());
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(token);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn parse_block(lines: &[String], pos: &mut usize) -> Result<Circuit, CircuitError> {
    let mut circuit = Circuit::new();
    while *pos < lines.len() {
        if lines[*pos] == "}" {
            return Ok(circuit);
        }
        let line = lines[*pos].clone();
        *pos += 1;
        if let Some(rest) = line.strip_prefix("REPEAT") {
            let count = parse_repeat_count(rest.trim())?;
            if *pos >= lines.len() || lines[*pos] != "{" {
                return Err(CircuitError::UnterminatedRepeatBlock);
            }
            *pos += 1;
            let body = parse_block(lines, pos)?;
            if *pos >= lines.len() || lines[*pos] != "}" {
                return Err(CircuitError::UnterminatedRepeatBlock);
            }
            *pos += 1;
            circuit.append_repeat_block(count, body)?;
        } else {
            parse_instruction_line(&line, &mut circuit)?;
        }
    }
    Ok(circuit)
}

fn parse_repeat_count(text: &str) -> Result<u64, CircuitError> {
    text.parse::<u64>().map_err(|_| CircuitError::MalformedLine { line: format!("REPEAT {text}") })
}

fn parse_instruction_line(line: &str, circuit: &mut Circuit) -> Result<(), CircuitError> {
    let line = line.trim();
    let name_end = line.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() {
        return Err(CircuitError::MalformedLine { line: line.to_string() });
    }
    let mut rest = &line[name_end..];

    let mut args = Vec::new();
    if let Some(after_paren) = rest.strip_prefix('(') {
        let close = after_paren.find(')').ok_or_else(|| CircuitError::MalformedLine { line: line.to_string() })?;
        let arg_str = &after_paren[..close];
        for part in arg_str.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value: f64 = part.parse().map_err(|_| CircuitError::MalformedLine { line: line.to_string() })?;
            args.push(value);
        }
        rest = &after_paren[close + 1..];
    }

    rest = rest.trim_start();
    let mut tag = None;
    if let Some(after_bracket) = rest.strip_prefix('[') {
        let close = after_bracket.find(']').ok_or_else(|| CircuitError::MalformedLine { line: line.to_string() })?;
        tag = Some(&after_bracket[..close]);
        rest = &after_bracket[close + 1..];
    }

    let mut targets = Vec::new();
    for token in rest.split_whitespace() {
        for piece in token.split('*') {
            targets.push(parse_target(piece, line)?);
        }
    }

    circuit.append(name, &targets, &args, tag)
}

fn parse_target(token: &str, line: &str) -> Result<GateTarget, CircuitError> {
    let malformed = || CircuitError::MalformedLine { line: line.to_string() };

    let (inverted, token) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    if let Some(inner) = token.strip_prefix("rec[-").and_then(|s| s.strip_suffix(']')) {
        let k: i64 = inner.parse().map_err(|_| malformed())?;
        if k <= 0 {
            return Err(CircuitError::NonPositiveRecordIndex(k));
        }
        return Ok(GateTarget::measurement_record(k as u32));
    }
    if let Some(inner) = token.strip_prefix("sweep[").and_then(|s| s.strip_suffix(']')) {
        let k: i64 = inner.parse().map_err(|_| malformed())?;
        if k <= 0 {
            return Err(CircuitError::NonPositiveRecordIndex(k));
        }
        return Ok(GateTarget::sweep(k as u32));
    }
    if let Some(digits) = token.strip_prefix('X') {
        let qubit: u32 = digits.parse().map_err(|_| malformed())?;
        return Ok(GateTarget::pauli_x(qubit).with_inverted(inverted));
    }
    if let Some(digits) = token.strip_prefix('Y') {
        let qubit: u32 = digits.parse().map_err(|_| malformed())?;
        return Ok(GateTarget::pauli_y(qubit).with_inverted(inverted));
    }
    if let Some(digits) = token.strip_prefix('Z') {
        let qubit: u32 = digits.parse().map_err(|_| malformed())?;
        return Ok(GateTarget::pauli_z(qubit).with_inverted(inverted));
    }
    let qubit: u32 = token.parse().map_err(|_| malformed())?;
    Ok(if inverted { GateTarget::inverted_qubit(qubit) } else { GateTarget::qubit(qubit) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bell_pair_circuit() {
        let circuit = parse_circuit_text("H 0\nCX 0 1\nM 0 1\n").unwrap();
        assert_eq!(circuit.instruction_count(), 3);
    }

    #[test]
    fn parses_args_and_tag() {
        let circuit = parse_circuit_text("X_ERROR(0.1)[noisy] 0 1\n").unwrap();
        assert_eq!(circuit.instruction_count(), 1);
    }

    #[test]
    fn parses_repeat_with_brace_on_same_line() {
        let circuit = parse_circuit_text("REPEAT 3 {\n    X 0\n}\n").unwrap();
        assert_eq!(circuit.instruction_count(), 1);
    }

    #[test]
    fn parses_repeat_with_brace_on_next_line() {
        let circuit = parse_circuit_text("REPEAT 2\n{\nX 0\n}\n").unwrap();
        assert_eq!(circuit.instruction_count(), 1);
    }

    #[test]
    fn rejects_record_target_with_zero_lookback() {
        let err = parse_circuit_text("DETECTOR rec[-0]\n").unwrap_err();
        assert_eq!(err, CircuitError::NonPositiveRecordIndex(0));
    }

    #[test]
    fn rejects_unterminated_repeat() {
        let err = parse_circuit_text("REPEAT 2 {\nX 0\n").unwrap_err();
        assert_eq!(err, CircuitError::UnterminatedRepeatBlock);
    }

    #[test]
    fn rejects_stray_closing_brace() {
        let err = parse_circuit_text("X 0\n}\n").unwrap_err();
        assert_eq!(err, CircuitError::UnmatchedClosingBrace);
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let circuit = parse_circuit_text("# a comment\n\nH 0 # trailing\n").unwrap();
        assert_eq!(circuit.instruction_count(), 1);
    }
}
