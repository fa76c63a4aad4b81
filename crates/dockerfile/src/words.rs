//! Quote-aware word splitting for instruction arguments.

/// Splits `input` on unquoted whitespace, removing quotes.
///
/// Single quotes are literal. Inside double quotes and outside quotes the
/// escape character makes the following character literal.
pub(crate) fn split_words(input: &str, escape: char) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some(q) => {
                if c == escape {
                    match chars.next() {
                        Some(next) if next == q || next == escape => current.push(next),
                        Some(next) => {
                            current.push(c);
                            current.push(next);
                        }
                        None => current.push(c),
                    }
                } else if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => {
                if c.is_whitespace() {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                    continue;
                }
                in_word = true;
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == escape {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                } else {
                    current.push(c);
                }
            }
        }
    }

    if in_word {
        words.push(current);
    }
    words
}

/// Strips one pair of matching surrounding quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_words() {
        assert_eq!(split_words("A=1  B=2", '\\'), vec!["A=1", "B=2"]);
        assert!(split_words("   ", '\\').is_empty());
    }

    #[test]
    fn test_split_keeps_quoted_spaces() {
        assert_eq!(
            split_words(r#"vendor="Acme Corp" version='1.0 beta'"#, '\\'),
            vec!["vendor=Acme Corp", "version=1.0 beta"]
        );
    }

    #[test]
    fn test_split_escapes() {
        assert_eq!(split_words(r#"A="say \"hi\"""#, '\\'), vec![r#"A=say "hi""#]);
        assert_eq!(split_words(r"A=one\ two", '\\'), vec!["A=one two"]);
        assert_eq!(split_words(r#"A="x`"y""#, '`'), vec![r#"A=x"y"#]);
    }

    #[test]
    fn test_split_empty_quoted_value() {
        assert_eq!(split_words(r#"A="" B=2"#, '\\'), vec!["A=", "B=2"]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""Acme Corp""#), "Acme Corp");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote(r#""mismatch'"#), r#""mismatch'"#);
        assert_eq!(unquote("\""), "\"");
    }
}
