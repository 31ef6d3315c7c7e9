use sgp4::{Constants, Elements};

use crate::catalog::error::CatalogError;
use crate::catalog::TleEntry;

const TLE_LINE_LEN: usize = 69;

/// Mod-10 checksum over the first 68 columns: digits at face value, '-'
/// counts as 1, everything else as 0.
pub fn line_checksum(line: &str) -> u32 {
    line.chars()
        .take(TLE_LINE_LEN - 1)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

fn validate_element_line(
    object: &str,
    line_no: usize,
    which: u8,
    line: &str,
) -> Result<(), CatalogError> {
    let parse_err = |message: String| CatalogError::Parse {
        object: object.to_string(),
        line: line_no,
        message,
    };

    if line.len() != TLE_LINE_LEN {
        return Err(parse_err(format!(
            "element line must be {TLE_LINE_LEN} characters, got {}",
            line.len()
        )));
    }
    let expected_prefix = format!("{which} ");
    if !line.starts_with(&expected_prefix) {
        return Err(parse_err(format!("expected element line {which}")));
    }
    if let Some(bad) = line
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, ' ' | '.' | '+' | '-'))
    {
        return Err(parse_err(format!("invalid character {bad:?}")));
    }

    let computed = line_checksum(line);
    let stated = line
        .chars()
        .nth(TLE_LINE_LEN - 1)
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| parse_err("checksum column is not a digit".to_string()))?;
    if computed != stated {
        return Err(parse_err(format!(
            "checksum mismatch: computed {computed}, line says {stated}"
        )));
    }
    Ok(())
}

/// Parse a catalog of repeated 3-line groups: a name line followed by the two
/// element lines. Blank lines between groups are tolerated; anything else is
/// rejected.
pub fn parse_catalog_text(text: &str) -> Result<Vec<TleEntry>, CatalogError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end()))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let (name_no, name_line) = lines[i];
        if name_line.starts_with("1 ") || name_line.starts_with("2 ") {
            return Err(CatalogError::Parse {
                object: name_line.to_string(),
                line: name_no,
                message: "expected an object name line before the element lines".to_string(),
            });
        }
        let name = name_line.trim().to_string();

        let Some(&(l1_no, line1)) = lines.get(i + 1) else {
            return Err(CatalogError::Parse {
                object: name,
                line: name_no,
                message: "truncated group: missing element lines".to_string(),
            });
        };
        let Some(&(l2_no, line2)) = lines.get(i + 2) else {
            return Err(CatalogError::Parse {
                object: name,
                line: l1_no,
                message: "truncated group: missing second element line".to_string(),
            });
        };

        validate_element_line(&name, l1_no, 1, line1)?;
        validate_element_line(&name, l2_no, 2, line2)?;

        let elements = Elements::from_tle(Some(name.clone()), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| CatalogError::Parse {
            object: name.clone(),
            line: l1_no,
            message: e.to_string(),
        })?;
        let constants = Constants::from_elements(&elements).map_err(|e| CatalogError::Parse {
            object: name.clone(),
            line: l1_no,
            message: e.to_string(),
        })?;

        entries.push(TleEntry {
            name,
            elements,
            constants,
        });
        i += 3;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures::{ISS_CATALOG, ISS_LINE1, ISS_LINE2};

    #[test]
    fn checksum_reproduces_the_trailing_digit() {
        for line in [ISS_LINE1, ISS_LINE2] {
            let stated = line.chars().nth(68).unwrap().to_digit(10).unwrap();
            assert_eq!(line_checksum(line), stated, "line {line:?}");
        }
    }

    #[test]
    fn well_formed_catalog_parses() {
        let entries = parse_catalog_text(ISS_CATALOG).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "ISS (ZARYA)");
        assert_eq!(entries[0].elements.norad_id, 25544);
    }

    #[test]
    fn checksum_mismatch_is_a_parse_error() {
        let mut line1 = ISS_LINE1.to_string();
        let wrong = if line1.ends_with('7') { '8' } else { '7' };
        line1.pop();
        line1.push(wrong);
        let text = format!("ISS (ZARYA)\n{line1}\n{ISS_LINE2}\n");

        let err = parse_catalog_text(&text).unwrap_err();
        match err {
            CatalogError::Parse { object, message, .. } => {
                assert_eq!(object, "ISS (ZARYA)");
                assert!(message.contains("checksum"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn diagnostics_carry_the_real_line_number() {
        // A blank line inside the group is tolerated, so line 2 sits at
        // physical line 4; its checksum error must say so.
        let mut line2 = ISS_LINE2.to_string();
        let wrong = if line2.ends_with('7') { '8' } else { '7' };
        line2.pop();
        line2.push(wrong);
        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n\n{line2}\n");

        match parse_catalog_text(&text).unwrap_err() {
            CatalogError::Parse { line, message, .. } => {
                assert_eq!(line, 4);
                assert!(message.contains("checksum"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_element_line_is_a_parse_error() {
        let text = format!("ISS (ZARYA)\n1 25544U\n{ISS_LINE2}\n");
        let err = parse_catalog_text(&text).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }), "{err}");
    }

    #[test]
    fn missing_name_line_is_a_parse_error() {
        let text = format!("{ISS_LINE1}\n{ISS_LINE2}\n");
        let err = parse_catalog_text(&text).unwrap_err();
        match err {
            CatalogError::Parse { message, .. } => {
                assert!(message.contains("name line"), "{message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_group_is_a_parse_error() {
        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n");
        let err = parse_catalog_text(&text).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }), "{err}");
    }

    #[test]
    fn invalid_character_is_a_parse_error() {
        let mut line1: Vec<char> = ISS_LINE1.chars().collect();
        line1[10] = '*';
        let line1: String = line1.into_iter().collect();
        let text = format!("ISS (ZARYA)\n{line1}\n{ISS_LINE2}\n");
        let err = parse_catalog_text(&text).unwrap_err();
        match err {
            CatalogError::Parse { message, .. } => {
                assert!(message.contains("invalid character"), "{message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
