/// Split `text` into rows on line-break sequences, keeping each terminator attached to the
/// row it closes (a trailing `\r\n` or `\n` is part of that row's content, never the next).
pub(crate) fn split_rows(text: &str) -> Vec<String> {
    let mut rows = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            rows.push(text[start..=i].to_string());
            start = i + 1;
        } else if bytes[i] == b'\r' {
            let end = if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                i + 1
            } else {
                i
            };
            rows.push(text[start..=end].to_string());
            start = end + 1;
            i = end;
        }
        i += 1;
    }
    if start < bytes.len() {
        rows.push(text[start..].to_string());
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

#[cfg(test)]
mod __tests__ {
    use super::split_rows;

    #[test]
    fn splits_and_reattaches_line_feeds() {
        let rows = split_rows("foo = 42\n");
        assert_eq!(rows, vec!["foo = 42\n".to_string()]);
    }

    #[test]
    fn splits_multiple_rows() {
        let rows = split_rows("a\nb\r\nc");
        assert_eq!(
            rows,
            vec!["a\n".to_string(), "b\r\n".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_single_empty_row() {
        assert_eq!(split_rows(""), vec![String::new()]);
    }
}
