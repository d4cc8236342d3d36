//! Textual vertex format used by plot records: `[x,z][x,z]...`.

use std::fmt;

use crate::grid_point::GridPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexParseError {
    /// Input is not wrapped in `[` ... `]`.
    MissingBrackets(String),
    /// A vertex did not contain exactly one `,`.
    MalformedPair(String),
    /// A coordinate was not a finite number.
    InvalidNumber(String),
}

impl fmt::Display for VertexParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexParseError::MissingBrackets(s) => write!(f, "vertex list not bracketed: {s:?}"),
            VertexParseError::MalformedPair(s) => write!(f, "malformed vertex: {s:?}"),
            VertexParseError::InvalidNumber(s) => write!(f, "invalid coordinate: {s:?}"),
        }
    }
}

impl std::error::Error for VertexParseError {}

/// Write vertices as `[x,z]` integer pairs, no separators.
pub fn serialize_vertices(vertices: &[GridPoint]) -> String {
    let mut out = String::with_capacity(vertices.len() * 10);
    for v in vertices {
        let (x, z) = v.block();
        out.push_str(&format!("[{x},{z}]"));
    }
    out
}

/// Parse the `[x,z][x,z]...` form. Decimal coordinates are truncated to
/// whole blocks. Empty (or whitespace-only) input yields no vertices.
pub fn parse_vertices(text: &str) -> Result<Vec<GridPoint>, VertexParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| VertexParseError::MissingBrackets(trimmed.to_string()))?;

    inner.split("][").map(parse_pair).collect()
}

fn parse_pair(pair: &str) -> Result<GridPoint, VertexParseError> {
    let (x, z) = pair
        .split_once(',')
        .ok_or_else(|| VertexParseError::MalformedPair(pair.to_string()))?;
    Ok(GridPoint::new(parse_coord(x)?, parse_coord(z)?))
}

fn parse_coord(raw: &str) -> Result<f64, VertexParseError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| VertexParseError::InvalidNumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(VertexParseError::InvalidNumber(raw.to_string()));
    }
    Ok(value.trunc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_format() {
        let vertices = vec![
            GridPoint::from_block(0, 0),
            GridPoint::from_block(0, 10),
            GridPoint::from_block(-10, 10),
        ];
        assert_eq!(serialize_vertices(&vertices), "[0,0][0,10][-10,10]");
        assert_eq!(serialize_vertices(&[]), "");
    }

    #[test]
    fn test_parse_round_trip() {
        let vertices = vec![
            GridPoint::from_block(3, -4),
            GridPoint::from_block(3, 20),
            GridPoint::from_block(27, 20),
        ];
        let text = serialize_vertices(&vertices);
        assert_eq!(parse_vertices(&text).unwrap(), vertices);
    }

    #[test]
    fn test_parse_single_vertex() {
        assert_eq!(
            parse_vertices("[5,6]").unwrap(),
            vec![GridPoint::from_block(5, 6)]
        );
    }

    #[test]
    fn test_parse_truncates_decimals() {
        let parsed = parse_vertices("[1.9,-2.7][ 4 , 5 ]").unwrap();
        assert!(parsed[0].coincides(GridPoint::new(1.0, -2.0)));
        assert!(parsed[1].coincides(GridPoint::new(4.0, 5.0)));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_vertices("").unwrap().is_empty());
        assert!(parse_vertices("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_vertices("1,2"),
            Err(VertexParseError::MissingBrackets(_))
        ));
        assert!(matches!(
            parse_vertices("[1;2]"),
            Err(VertexParseError::MalformedPair(_))
        ));
        assert!(matches!(
            parse_vertices("[1,x]"),
            Err(VertexParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_vertices("[1,2]x[3,4]"),
            Err(VertexParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_vertices("[1,NaN]"),
            Err(VertexParseError::InvalidNumber(_))
        ));
    }
}
