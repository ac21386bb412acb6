//! Persisted keyframe rows and their on-disk CSV encoding.
//!
//! Parsing is permissive: a field that does not start with a number becomes
//! NaN instead of failing the load. JSON carries NaN as `null`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Video identifier to persisted rows, in identifier order.
pub type Catalog = BTreeMap<String, Vec<Row>>;

/// One persisted keyframe: `[t, left, top, right, bottom]` as fractions.
///
/// Rows read from disk may be shorter or longer than five fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<f64>);

impl Row {
    pub fn new(fields: Vec<f64>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Time component, NaN when absent or unparseable.
    pub fn time(&self) -> f64 {
        self.get(0).unwrap_or(f64::NAN)
    }

    /// False for rows whose time would be sent as `null`.
    pub fn has_time(&self) -> bool {
        !self.time().is_nan()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields: Vec<Option<f64>> = self
            .0
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(Self(
            fields
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
        ))
    }
}

/// Drops rows whose time is missing; the store never keeps untimed rows.
pub fn retain_timed(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter().filter(Row::has_time).collect()
}

/// Parses CSV text into rows. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Vec<Row> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| Row(line.split(',').map(parse_float_prefix).collect()))
        .collect()
}

/// Encodes rows as comma-separated lines with no trailing newline.
/// NaN becomes an empty field.
pub fn encode_csv(rows: &[Row]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, value) in row.0.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            write_field(&mut out, *value);
        }
    }
    out
}

fn write_field(out: &mut String, value: f64) {
    if value.is_nan() {
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    // Writing into a String cannot fail.
    let _ = write!(out, "{value}");
}

/// Reads the longest numeric prefix of `field`, ignoring leading whitespace.
///
/// `"12.5px"` reads as 12.5, `"abc"` and `""` as NaN.
pub fn parse_float_prefix(field: &str) -> f64 {
    let s = field.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        end = j;
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < len && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_prefix() {
        assert!((parse_float_prefix("0.5") - 0.5).abs() < f64::EPSILON);
        assert!((parse_float_prefix("  12.5px") - 12.5).abs() < f64::EPSILON);
        assert!((parse_float_prefix("-3") + 3.0).abs() < f64::EPSILON);
        assert!((parse_float_prefix(".25") - 0.25).abs() < f64::EPSILON);
        assert!((parse_float_prefix("1.") - 1.0).abs() < f64::EPSILON);
        assert!((parse_float_prefix("2e3") - 2000.0).abs() < f64::EPSILON);
        assert!((parse_float_prefix("2e") - 2.0).abs() < f64::EPSILON);
        assert!((parse_float_prefix("0.75\r") - 0.75).abs() < f64::EPSILON);
        assert_eq!(parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_prefix("").is_nan());
        assert!(parse_float_prefix("abc").is_nan());
        assert!(parse_float_prefix("-").is_nan());
        assert!(parse_float_prefix(".").is_nan());
        assert!(parse_float_prefix("nan").is_nan());
    }

    #[test]
    fn test_parse_csv_is_permissive() {
        let rows = parse_csv("0,0.1,0.1,0.2,0.2\n0.5,oops,0.1,0.2,0.2\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields().len(), 5);
        assert!(rows[1].get(1).unwrap().is_nan());
        assert!((rows[1].time() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_encode_csv() {
        let rows = vec![
            Row::new(vec![0.0, 0.25, 0.5, 1.0, 1.0]),
            Row::new(vec![1.0, f64::NAN, 0.5]),
        ];
        assert_eq!(encode_csv(&rows), "0,0.25,0.5,1,1\n1,,0.5");
        assert_eq!(encode_csv(&[]), "");
    }

    #[test]
    fn test_csv_roundtrip_keeps_nan_fields() {
        let text = "0,0.1,,0.3,0.4\n1,0.5,0.6,0.7,0.8";
        let rows = parse_csv(text);
        assert!(rows[0].get(2).unwrap().is_nan());
        assert_eq!(encode_csv(&rows), text);
    }

    #[test]
    fn test_json_null_is_nan() {
        let rows: Vec<Row> = serde_json::from_str("[[0.5,null,1],[null,1,2,3,4]]").unwrap();
        assert!(rows[0].get(1).unwrap().is_nan());
        assert!(!rows[1].has_time());
        assert_eq!(serde_json::to_string(&rows).unwrap(), "[[0.5,null,1.0],[null,1.0,2.0,3.0,4.0]]");
    }

    #[test]
    fn test_retain_timed() {
        let rows = vec![
            Row::new(vec![0.0, 1.0]),
            Row::new(vec![f64::NAN, 1.0]),
            Row::new(vec![]),
        ];
        assert_eq!(retain_timed(rows).len(), 1);
    }
}
