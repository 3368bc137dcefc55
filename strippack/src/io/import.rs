use crate::entities::SPInstance;
use crate::error::{Error, Result};
use std::path::Path;

/// Line holding the strip width (first run of digits)
const WIDTH_LINE: usize = 0;
/// Line holding the heights of the rectangles, as `[h0,h1,...]`
const HEIGHTS_LINE: usize = 4;
/// Line holding the widths of the rectangles, as `[w0,w1,...]`
const WIDTHS_LINE: usize = 6;

/// Parses an instance in the line-oriented text format:
///
/// ```text
/// w = 8;
/// n = 4;
/// ...
/// ...
/// d = [3, 5, 3, 5];
/// ...
/// r = [3, 3, 5, 5];
/// ```
pub fn parse_instance(text: &str) -> Result<SPInstance> {
    let lines: Vec<&str> = text.lines().collect();
    let line = |index: usize| {
        lines.get(index).copied().ok_or_else(|| {
            Error::InputFormat(format!(
                "expected at least {} lines, found {}",
                index + 1,
                lines.len()
            ))
        })
    };

    let width = first_integer(line(WIDTH_LINE)?)
        .ok_or_else(|| Error::InputFormat(format!("line {}: no strip width", WIDTH_LINE + 1)))?;
    let heights = integer_list(line(HEIGHTS_LINE)?, HEIGHTS_LINE)?;
    let widths = integer_list(line(WIDTHS_LINE)?, WIDTHS_LINE)?;

    SPInstance::new(width, &widths, &heights)
}

/// Reads and parses an instance file.
pub fn read_instance(path: &Path) -> Result<SPInstance> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::InputFormat(format!("could not read instance file {}: {e}", path.display()))
    })?;
    parse_instance(&text).map_err(|e| match e {
        Error::InputFormat(msg) => Error::InputFormat(format!("{}: {msg}", path.display())),
        other => other,
    })
}

fn first_integer(line: &str) -> Option<u64> {
    let digits: String = line
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn integer_list(line: &str, index: usize) -> Result<Vec<u64>> {
    let malformed = |what: &str| {
        Error::InputFormat(format!("line {}: {what} in '{}'", index + 1, line.trim()))
    };
    let inner = line
        .split_once('[')
        .and_then(|(_, rest)| rest.split_once(']'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| malformed("no bracketed list"))?;

    inner
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<u64>()
                .map_err(|_| malformed(&format!("invalid integer '{}'", n.trim())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INS: &str = "w = 8;\nn = 4;\n\n% dimensions\nd = [3, 5, 3, 5];\n\nr = [3,3,5,5];\n";

    #[test]
    fn parses_width_heights_and_widths() {
        let instance = parse_instance(INS).unwrap();
        assert_eq!(instance.width, 8);
        assert_eq!(instance.n_items(), 4);
        assert_eq!(instance.base_heights().collect::<Vec<_>>(), vec![3, 5, 3, 5]);
        assert_eq!(instance.base_widths().collect::<Vec<_>>(), vec![3, 3, 5, 5]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse_instance("w = 8;\n"), Err(Error::InputFormat(_))));
        let no_list = INS.replace("d = [3, 5, 3, 5];", "d = 3, 5;");
        assert!(parse_instance(&no_list).is_err());
        let bad_int = INS.replace("[3,3,5,5]", "[3,x,5,5]");
        assert!(parse_instance(&bad_int).is_err());
        let mismatch = INS.replace("[3,3,5,5]", "[3,3,5]");
        assert!(parse_instance(&mismatch).is_err());
        let no_width = INS.replace("w = 8;", "w = ;");
        assert!(parse_instance(&no_width).is_err());
    }
}
