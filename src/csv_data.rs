//! CSV (de)serialization for $P gesture template libraries, a faster-to-parse
//! alternative to [`crate::data::load_templates_json`].
//!
//! Grounded on `json_to_csv`/`load_graphics_csv` in the teacher crate: same
//! tab-delimited-rows/comma-delimited-fields layout, generalized from
//! preprocessed stroke feature vectors to raw `(x, y, t)` point lists.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::data::GestureLibrary;
use crate::error::DataError;
use crate::stroke::Stroke;

/// Converts a JSON template library to CSV.
///
/// Format: `name\tx0,y0,t0;x1,y1,t1;...\tx0,y0,t0;...\n` -- one row per
/// template name, one tab-separated field per example stroke, points
/// within a stroke separated by `;` and each point's three values by `,`.
pub fn json_to_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    json_path: P,
    csv_path: Q,
) -> Result<(), DataError> {
    let library = crate::data::load_templates_json(json_path)?;
    let mut file = fs::File::create(csv_path)?;

    for (name, strokes) in library {
        write!(file, "{name}")?;
        for stroke in strokes {
            write!(file, "\t")?;
            for (i, p) in stroke.points().iter().enumerate() {
                if i > 0 {
                    write!(file, ";")?;
                }
                write!(file, "{},{},{}", p.x, p.y, p.t)?;
            }
        }
        writeln!(file)?;
    }

    Ok(())
}

/// Loads a gesture template library from the CSV format [`json_to_csv`]
/// writes.
pub fn load_templates_csv<P: AsRef<Path>>(path: P) -> Result<GestureLibrary, DataError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut result = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');

        let name = fields
            .next()
            .ok_or_else(|| DataError::Malformed("missing name column".into()))?
            .to_string();

        let mut strokes = Vec::new();
        for stroke_field in fields {
            if stroke_field.is_empty() {
                strokes.push(Stroke::create(0));
                continue;
            }
            let mut stroke = Stroke::create(stroke_field.matches(';').count() + 1);
            for point_str in stroke_field.split(';') {
                let mut values = point_str.split(',');
                let x = parse_field(values.next(), "x")?;
                let y = parse_field(values.next(), "y")?;
                let t = parse_field(values.next(), "t")?;
                stroke.append(x, y, t);
            }
            strokes.push(stroke);
        }

        result.push((name, strokes));
    }

    Ok(result)
}

fn parse_field(field: Option<&str>, name: &str) -> Result<i64, DataError> {
    field
        .ok_or_else(|| DataError::Malformed(format!("missing {name} value")))?
        .parse::<i64>()
        .map_err(|_| DataError::Malformed(format!("invalid {name} value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_round_trips_a_single_stroke() {
        let line = "circle\t0,0,0;10,0,10;10,10,20\n";
        let mut tmp = std::env::temp_dir();
        tmp.push(format!("strokeshapes_csv_test_{}.csv", std::process::id()));
        fs::write(&tmp, line).unwrap();

        let lib = load_templates_csv(&tmp).unwrap();
        fs::remove_file(&tmp).ok();

        assert_eq!(lib.len(), 1);
        assert_eq!(lib[0].0, "circle");
        assert_eq!(lib[0].1.len(), 1);
        assert_eq!(lib[0].1[0].len(), 3);
        assert_eq!(lib[0].1[0].get(2).unwrap().x, 10);
        assert_eq!(lib[0].1[0].get(2).unwrap().y, 10);
    }

    #[test]
    fn test_malformed_field_errors() {
        let line = "circle\tnotanumber,0,0\n";
        let mut tmp = std::env::temp_dir();
        tmp.push(format!(
            "strokeshapes_csv_test_bad_{}.csv",
            std::process::id()
        ));
        fs::write(&tmp, line).unwrap();

        let result = load_templates_csv(&tmp);
        fs::remove_file(&tmp).ok();
        assert!(result.is_err());
    }
}
