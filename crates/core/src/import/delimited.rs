//! Delimited text (CSV/TSV) reading.

use super::error::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads delimited text into raw rows.
///
/// When `delimiter` is `None` it is sniffed from the first non-empty line.
///
/// # Errors
///
/// Returns `ImportError::Malformed` if the text is not valid UTF-8 or the
/// reader fails.
pub fn read_rows(bytes: &[u8], delimiter: Option<u8>) -> Result<Vec<Vec<String>>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(bytes));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Picks the most frequent of `,` `;` and tab in the first non-empty line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or_default();

    [b',', b';', b'\t']
        .into_iter()
        .map(|candidate| {
            let count = first_line.iter().filter(|b| **b == candidate).count();
            (candidate, count)
        })
        .fold((b',', 0), |best, current| {
            if current.1 > best.1 { current } else { best }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter(b"a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter(b"\n\na\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter(b"single"), b',');
    }

    #[test]
    fn test_read_rows_skips_blank_lines_and_bom() {
        let data = b"\xEF\xBB\xBFCode,Name\n\n1000 , Cash \n,,\n";
        let rows = read_rows(data, None).expect("rows");
        assert_eq!(rows, vec![vec!["Code", "Name"], vec!["1000", "Cash"]]);
    }

    #[test]
    fn test_read_rows_handles_quoted_amounts() {
        let data = b"Account;Debit;Credit\n\"Cash; petty\";\"1.000,00\";\n";
        let rows = read_rows(data, None).expect("rows");
        assert_eq!(rows[1], vec!["Cash; petty", "1.000,00", ""]);
    }

    #[test]
    fn test_read_rows_rejects_invalid_utf8() {
        let data = b"Account,Debit\n\xFF\xFE,10\n";
        assert!(matches!(
            read_rows(data, None),
            Err(ImportError::Malformed(_))
        ));
    }
}
