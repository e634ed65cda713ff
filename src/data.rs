//! JSON loading for $P gesture template libraries.
//!
//! Grounded on `load_graphics_json` in the teacher crate: same
//! `serde_json::Value`-walking style, generalized from a per-character list
//! of preprocessed stroke features to a named gesture's list of raw
//! example strokes, which callers normalize themselves via
//! [`crate::dollarp::DpContext::add_template`].

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::DataError;
use crate::stroke::Stroke;

/// A loaded template library: gesture name paired with every example
/// stroke recorded for it. A name may repeat with several strokes so a
/// caller can register multiple variations under the same template name.
pub type GestureLibrary = Vec<(String, Vec<Stroke>)>;

/// Loads a gesture template library from a JSON file.
///
/// Format: `[[name, [[[x0,y0,t0],[x1,y1,t1],...], ...]], ...]` -- a name
/// paired with a list of example strokes, each stroke a list of
/// `[x, y, t]` triples.
pub fn load_templates_json<P: AsRef<Path>>(path: P) -> Result<GestureLibrary, DataError> {
    let content = fs::read_to_string(path)?;
    parse_templates(&content)
}

fn parse_templates(content: &str) -> Result<GestureLibrary, DataError> {
    let data: Value = serde_json::from_str(content)?;

    let mut result = Vec::new();
    let entries = data
        .as_array()
        .ok_or_else(|| DataError::Malformed("top level must be an array".into()))?;

    for entry in entries {
        let pair = entry
            .as_array()
            .ok_or_else(|| DataError::Malformed("entry must be a [name, strokes] pair".into()))?;
        if pair.len() != 2 {
            return Err(DataError::Malformed(
                "entry must have exactly 2 elements".into(),
            ));
        }

        let name = pair[0]
            .as_str()
            .ok_or_else(|| DataError::Malformed("template name must be a string".into()))?
            .to_string();

        let stroke_list = pair[1]
            .as_array()
            .ok_or_else(|| DataError::Malformed("strokes must be an array".into()))?;

        let mut strokes = Vec::with_capacity(stroke_list.len());
        for stroke_val in stroke_list {
            let points = stroke_val
                .as_array()
                .ok_or_else(|| DataError::Malformed("stroke must be an array of points".into()))?;
            let mut stroke = Stroke::create(points.len());
            for point in points {
                let triple = point
                    .as_array()
                    .ok_or_else(|| DataError::Malformed("point must be [x, y, t]".into()))?;
                if triple.len() != 3 {
                    return Err(DataError::Malformed("point must have 3 values".into()));
                }
                let x = triple[0]
                    .as_i64()
                    .ok_or_else(|| DataError::Malformed("x must be an integer".into()))?;
                let y = triple[1]
                    .as_i64()
                    .ok_or_else(|| DataError::Malformed("y must be an integer".into()))?;
                let t = triple[2]
                    .as_i64()
                    .ok_or_else(|| DataError::Malformed("t must be an integer".into()))?;
                stroke.append(x, y, t);
            }
            strokes.push(stroke);
        }

        result.push((name, strokes));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_templates_round_trips_points() {
        let json = r#"[["circle", [[[0,0,0],[10,0,10],[10,10,20]]]], ["line", [[[0,0,0],[100,0,100]]]]]"#;
        let lib = parse_templates(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib[0].0, "circle");
        assert_eq!(lib[0].1.len(), 1);
        assert_eq!(lib[0].1[0].len(), 3);
        assert_eq!(lib[0].1[0].get(1).unwrap().x, 10);
        assert_eq!(lib[1].0, "line");
    }

    #[test]
    fn test_multiple_strokes_per_name() {
        let json = r#"[["tap", [[[0,0,0]], [[1,1,0]]]]]"#;
        let lib = parse_templates(json).unwrap();
        assert_eq!(lib[0].1.len(), 2);
    }

    #[test]
    fn test_malformed_entry_errors() {
        assert!(parse_templates(r#"[["circle"]]"#).is_err());
        assert!(parse_templates(r#"[[1, []]]"#).is_err());
        assert!(parse_templates(r#"{"not": "an array"}"#).is_err());
    }
}
