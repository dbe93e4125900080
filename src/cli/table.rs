//! Plain-text table rendering.

use std::io::{self, Write};

const COLUMN_GAP: usize = 2;

/// Write `rows` under `cols`, left-aligned, columns padded to their widest cell.
pub(crate) fn print_table<W: Write>(
    out: &mut W,
    cols: &[&str],
    rows: &[Vec<String>],
) -> io::Result<()> {
    let mut widths: Vec<usize> = cols.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
    write_row(out, &widths, &header)?;
    for row in rows {
        write_row(out, &widths, row)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        line.push_str(cell);
        if i < last {
            let pad = widths[i].saturating_sub(cell.chars().count()) + COLUMN_GAP;
            line.push_str(&" ".repeat(pad));
        }
    }
    writeln!(out, "{}", line)
}

/// Truncate to `length` characters, ending in `...` when shortened.
pub(crate) fn limit_string(s: &str, length: usize) -> String {
    if s.chars().count() > length && length > 3 {
        let kept: String = s.chars().take(length - 3).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_string() {
        assert_eq!(limit_string("short", 50), "short");
        assert_eq!(limit_string("abcdefghij", 8), "abcde...");
        assert_eq!(limit_string("abcdef", 3), "abcdef");
        assert_eq!(limit_string("ééééé", 4), "é...");
    }

    #[test]
    fn test_print_table_alignment() {
        let mut out = Vec::new();
        let rows = vec![
            vec!["ctx".to_string(), "installed".to_string()],
            vec!["whoami".to_string(), "available".to_string()],
        ];
        print_table(&mut out, &["NAME", "STATUS"], &rows).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "NAME    STATUS\nctx     installed\nwhoami  available\n"
        );
    }
}
