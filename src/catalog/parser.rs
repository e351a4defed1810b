use serde::Deserialize;

use super::error::ParseError;
use super::record::OrbitalElementRecord;

/// Columns 3-7 of either element line hold the catalog number.
const CATALOG_COLUMNS: std::ops::Range<usize> = 2..7;
const ELEMENT_LINE_LEN: usize = 69;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only the catalog number is checked; lines are stored as received.
    #[default]
    Permissive,
    /// Line numbers, line length, checksums and matching catalog numbers are enforced.
    Strict,
}

/// Parses repeating name / line 1 / line 2 blocks. Trailing blank lines and a trailing partial
/// block are ignored; any malformed block fails the whole payload.
pub fn parse_feed(
    content: &str,
    mode: ValidationMode,
) -> Result<Vec<OrbitalElementRecord>, ParseError> {
    let mut lines: Vec<&str> = content.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    lines
        .chunks_exact(3)
        .enumerate()
        .map(|(block, chunk)| parse_block(block, chunk[0], chunk[1], chunk[2], mode))
        .collect()
}

fn parse_block(
    block: usize,
    name: &str,
    line1: &str,
    line2: &str,
    mode: ValidationMode,
) -> Result<OrbitalElementRecord, ParseError> {
    let err = |reason: String| ParseError { block, reason };

    let catalog_id = catalog_number(line1).map_err(err)?;

    if mode == ValidationMode::Strict {
        check_line(line1, '1').map_err(|r| err(format!("line 1 {}", r)))?;
        check_line(line2, '2').map_err(|r| err(format!("line 2 {}", r)))?;
        let second = catalog_number(line2).map_err(err)?;
        if second != catalog_id {
            return Err(err(format!(
                "catalog number mismatch: line 1 has {}, line 2 has {}",
                catalog_id, second
            )));
        }
    }

    Ok(OrbitalElementRecord {
        catalog_id,
        name: name.trim().to_string(),
        line1: line1.to_string(),
        line2: line2.to_string(),
    })
}

fn catalog_number(line: &str) -> Result<u32, String> {
    let field = line
        .get(CATALOG_COLUMNS)
        .ok_or_else(|| format!("element line too short: {:?}", line))?
        .trim();
    field
        .parse()
        .map_err(|_| format!("catalog number {:?} is not numeric", field))
}

fn check_line(line: &str, number: char) -> Result<(), String> {
    let mut chars = line.chars();
    if chars.next() != Some(number) || chars.next() != Some(' ') {
        return Err(format!("must start with '{} '", number));
    }
    if !line.is_ascii() || line.len() != ELEMENT_LINE_LEN {
        return Err(format!(
            "must be {} ASCII characters, got {}",
            ELEMENT_LINE_LEN,
            line.chars().count()
        ));
    }

    let (body, check) = line.split_at(ELEMENT_LINE_LEN - 1);
    let expected = check
        .parse::<u32>()
        .map_err(|_| format!("checksum {:?} is not a digit", check))?;
    let actual = checksum(body);
    if actual != expected {
        return Err(format!("checksum mismatch: expected {}, computed {}", expected, actual));
    }
    Ok(())
}

/// Modulo-10 sum of digits, with '-' counting as one.
fn checksum(body: &str) -> u32 {
    body.chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}
