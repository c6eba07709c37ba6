//! Line-oriented config tokenizer
//!
//! Part configs, session files and the legacy editor config share one text
//! format: everything after `;` is a comment, and fields are separated by
//! spaces, tabs or `=`. `POS = 1 2 3` therefore reads as
//! `["POS", "1", "2", "3"]`.

/// Delimiters used when none are given
pub const DEFAULT_DELIMITERS: &[char] = &[' ', '\t', '='];

/// Reads tokenized lines from text, tracking 1-based line numbers
#[derive(Debug, Clone)]
pub struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line_number: usize,
    delimiters: &'a [char],
}

impl<'a> LineReader<'a> {
    /// Reader splitting on [`DEFAULT_DELIMITERS`]
    pub fn new(text: &'a str) -> Self {
        Self::with_delimiters(text, DEFAULT_DELIMITERS)
    }

    /// Reader splitting on a custom delimiter set
    pub fn with_delimiters(text: &'a str, delimiters: &'a [char]) -> Self {
        Self {
            lines: text.lines(),
            line_number: 0,
            delimiters,
        }
    }

    /// Tokens of the next line, or `None` at end of input.
    ///
    /// Blank and comment-only lines yield an empty token list.
    pub fn next_tokens(&mut self) -> Option<Vec<&'a str>> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some(tokenize(line, self.delimiters))
    }

    /// Line number of the line last returned (0 before the first read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Split one line into tokens, dropping any `;` comment
pub fn tokenize<'t>(line: &'t str, delimiters: &[char]) -> Vec<&'t str> {
    let content = match line.find(';') {
        Some(comment) => &line[..comment],
        None => line,
    };
    content
        .split(|c: char| delimiters.contains(&c))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parse exactly the first `N` fields as floats.
///
/// Returns `None` when there are fewer than `N` fields or one of them is
/// not a number. Extra fields are ignored.
pub fn parse_floats<const N: usize>(fields: &[&str]) -> Option<[f32; N]> {
    if fields.len() < N {
        return None;
    }
    let mut values = [0.0; N];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field.parse().ok()?;
    }
    Some(values)
}
