//! The DEM text format: one instruction per line, `error(p) T1 T2 ...`,
//! `detector(x,y,...) D<id>`, `logical_observable L<id>`,
//! `shift_detectors(dx,dy,...) k`, and `repeat k { ... }` blocks. The
//! tokenizer mirrors `circuit::parse`'s brace-splitting line
//! preprocessor.

use crate::error::AnalysisError;
use crate::model::{DemInstruction, DetectorErrorModel};
use crate::target::DemTarget;

pub fn parse_dem_text(text: &str) -> Result<DetectorErrorModel, AnalysisError> {
    let lines = preprocess_lines(text);
    let mut pos = 0;
    let dem = parse_block(&lines, &mut pos)?;
    if pos != lines.len() {
        return Err(AnalysisError::UnmatchedClosingBrace);
    }
    Ok(dem)
}

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

fn parse_block(lines: &[String], pos: &mut usize) -> Result<DetectorErrorModel, AnalysisError> {
    let mut dem = DetectorErrorModel::new();
    while *pos < lines.len() {
        if lines[*pos] == "}" {
            return Ok(dem);
        }
        let line = lines[*pos].clone();
        *pos += 1;
        if let Some(rest) = line.strip_prefix("repeat") {
            let count = parse_repeat_count(rest.trim(), &line)?;
            if *pos >= lines.len() || lines[*pos] != "{" {
                return Err(AnalysisError::UnterminatedRepeatBlock);
            }
            *pos += 1;
            let body = parse_block(lines, pos)?;
            if *pos >= lines.len() || lines[*pos] != "}" {
                return Err(AnalysisError::UnterminatedRepeatBlock);
            }
            *pos += 1;
            dem.push(DemInstruction::Repeat { count, body });
        } else {
            dem.push(parse_instruction_line(&line)?);
        }
    }
    Ok(dem)
}

fn parse_repeat_count(text: &str, line: &str) -> Result<u64, AnalysisError> {
    text.parse::<u64>().map_err(|_| AnalysisError::MalformedLine { line: line.to_string() })
}

fn parse_instruction_line(line: &str) -> Result<DemInstruction, AnalysisError> {
    let malformed = || AnalysisError::MalformedLine { line: line.to_string() };
    let name_end = line.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(line.len());
    let name = &line[..name_end];
    let mut rest = &line[name_end..];

    let mut args = Vec::new();
    if let Some(after_paren) = rest.strip_prefix('(') {
        let close = after_paren.find(')').ok_or_else(malformed)?;
        for part in after_paren[..close].split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            args.push(part.parse::<f64>().map_err(|_| malformed())?);
        }
        rest = &after_paren[close + 1..];
    }
    rest = rest.trim_start();

    match name {
        "error" => {
            let probability = *args.first().ok_or_else(malformed)?;
            let targets = rest.split_whitespace().map(|tok| parse_dem_target(tok, line)).collect::<Result<_, _>>()?;
            Ok(DemInstruction::Error { probability, targets })
        }
        "detector" => {
            let token = rest.split_whitespace().next().ok_or_else(malformed)?;
            let target = parse_dem_target(token, line)?;
            if !target.is_detector() {
                return Err(malformed());
            }
            Ok(DemInstruction::Detector { coords: args, id: target.id() })
        }
        "logical_observable" => {
            let token = rest.split_whitespace().next().ok_or_else(malformed)?;
            let target = parse_dem_target(token, line)?;
            if !target.is_observable() {
                return Err(malformed());
            }
            Ok(DemInstruction::LogicalObservable { id: target.id() })
        }
        "shift_detectors" => {
            let shift = rest.split_whitespace().next().ok_or_else(malformed)?.parse::<u64>().map_err(|_| malformed())?;
            Ok(DemInstruction::ShiftDetectors { coords: args, shift })
        }
        other => Err(AnalysisError::UnknownInstruction { name: other.to_string() }),
    }
}

fn parse_dem_target(token: &str, line: &str) -> Result<DemTarget, AnalysisError> {
    let malformed = || AnalysisError::MalformedLine { line: line.to_string() };
    if token == "^" {
        return Ok(DemTarget::separator());
    }
    if let Some(digits) = token.strip_prefix('D') {
        return digits.parse::<u64>().map(DemTarget::detector).map_err(|_| malformed());
    }
    if let Some(digits) = token.strip_prefix('L') {
        return digits.parse::<u64>().map(DemTarget::observable).map_err(|_| malformed());
    }
    Err(malformed())
}

#[must_use]
pub fn write_dem_text(dem: &DetectorErrorModel) -> String {
    let mut out = String::new();
    write_block(dem, 0, &mut out);
    out
}

fn write_block(dem: &DetectorErrorModel, indent: usize, out: &mut String) {
    let pad = "    ".repeat(indent);
    for instr in dem.instructions() {
        out.push_str(&pad);
        match instr {
            DemInstruction::Error { probability, targets } => {
                out.push_str(&format!("error({probability})"));
                for t in targets {
                    out.push(' ');
                    out.push_str(&t.to_string());
                }
                out.push('\n');
            }
            DemInstruction::Detector { coords, id } => {
                out.push_str("detector");
                write_coords(coords, out);
                out.push_str(&format!(" D{id}\n"));
            }
            DemInstruction::LogicalObservable { id } => {
                out.push_str(&format!("logical_observable L{id}\n"));
            }
            DemInstruction::ShiftDetectors { coords, shift } => {
                out.push_str("shift_detectors");
                write_coords(coords, out);
                out.push_str(&format!(" {shift}\n"));
            }
            DemInstruction::Repeat { count, body } => {
                out.push_str(&format!("repeat {count} {{\n"));
                write_block(body, indent + 1, out);
                out.push_str(&pad);
                out.push_str("}\n");
            }
        }
    }
}

fn write_coords(coords: &[f64], out: &mut String) {
    if coords.is_empty() {
        return;
    }
    out.push('(');
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&c.to_string());
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn parses_and_rewrites_a_simple_dem() {
        let text = "error(0.1) D0 D1\ndetector(0,0) D0\nlogical_observable L0\n";
        let dem = parse_dem_text(text).unwrap();
        expect![[r#"
            error(0.1) D0 D1
            detector(0,0) D0
            logical_observable L0
        "#]]
        .assert_eq(&write_dem_text(&dem));
    }

    #[test]
    fn round_trips_repeat_blocks() {
        let text = "repeat 3 {\n    error(0.2) D0 D1\n    shift_detectors(1) 2\n}\n";
        let dem = parse_dem_text(text).unwrap();
        assert_eq!(write_dem_text(&dem), text);
    }

    #[test]
    fn decomposition_separator_round_trips() {
        let text = "error(0.05) D0 D1 ^ D2 D3\n";
        let dem = parse_dem_text(text).unwrap();
        assert_eq!(write_dem_text(&dem), text);
    }

    #[test]
    fn rejects_unknown_instruction_name() {
        let err = parse_dem_text("frobnicate 1\n").unwrap_err();
        assert_eq!(err, AnalysisError::UnknownInstruction { name: "frobnicate".into() });
    }
}
