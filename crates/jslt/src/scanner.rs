//! Top-level text scanning shared by every evaluator.
//!
//! Expressions are recognized from raw text, so each evaluator needs the same
//! notion of "top level": outside string literals and not nested inside
//! `()`, `[]` or `{}`. [`TopLevel`] walks a string and yields only the
//! characters that sit at that level; the helpers below build on it.

/// Iterator over `(byte_offset, char)` pairs at nesting depth zero.
///
/// Opening brackets are yielded when they leave depth zero, closing brackets
/// when they return to it, and string literals are reported by their opening
/// quote only.
pub struct TopLevel<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> TopLevel<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_string(&mut self, quote: char) {
        while let Some(c) = self.advance() {
            if c == '\\' {
                self.advance();
            } else if c == quote {
                return;
            }
        }
    }
}

impl Iterator for TopLevel<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.pos;
            let c = self.advance()?;
            match c {
                '"' | '\'' => {
                    self.skip_string(c);
                    if self.depth == 0 {
                        return Some((start, c));
                    }
                }
                '(' | '[' | '{' => {
                    self.depth += 1;
                    if self.depth == 1 {
                        return Some((start, c));
                    }
                }
                ')' | ']' | '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some((start, c));
                    }
                }
                _ if self.depth == 0 => return Some((start, c)),
                _ => {}
            }
        }
    }
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Returns the byte offset of the bracket closing the one at `open_pos`.
pub fn matching_close(input: &str, open_pos: usize) -> Option<usize> {
    let tail = &input[open_pos..];
    let close = closer_for(tail.chars().next()?)?;
    let mut scan = TopLevel::new(tail);
    scan.next()?;
    match scan.next() {
        Some((pos, c)) if c == close => Some(open_pos + pos),
        _ => None,
    }
}

/// True when `input` opens with `open` and its matching bracket is the last
/// character.
pub fn is_enclosed(input: &str, open: char) -> bool {
    input.starts_with(open)
        && matching_close(input, 0).is_some_and(|end| end + 1 == input.len())
}

/// Splits `input` at every top-level `delim`, trimming each part.
///
/// A single trailing delimiter is tolerated; interior empty parts are kept so
/// callers can report them.
pub fn split_top_level(input: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (pos, c) in TopLevel::new(input) {
        if c == delim {
            parts.push(input[start..pos].trim());
            start = pos + c.len_utf8();
        }
    }
    let last = input[start..].trim();
    if !last.is_empty() || parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// True when `input` begins with the word `kw` followed by a non-identifier
/// character (or the end of input).
pub fn starts_with_keyword(input: &str, kw: &str) -> bool {
    input.starts_with(kw) && !input[kw.len()..].starts_with(is_ident_char)
}

/// True when the word `kw` sits at `pos` with word boundaries on both sides.
///
/// A preceding `.` or `$` makes it a field or variable name, not a keyword.
pub fn keyword_at(input: &str, pos: usize, kw: &str) -> bool {
    let before_ok = input[..pos]
        .chars()
        .next_back()
        .map_or(true, |c| !is_ident_char(c) && c != '.' && c != '$');
    before_ok && starts_with_keyword(&input[pos..], kw)
}

/// Length of the identifier at the start of `input` (zero if none).
pub fn ident_len(input: &str) -> usize {
    match input.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' => input
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(input.len()),
        _ => 0,
    }
}

/// Finds the `else` belonging to an `if` whose branches start `rest`.
///
/// Nested top-level `if`s claim the nearest `else` first.
pub fn find_else(rest: &str) -> Option<usize> {
    let mut pending = 0usize;
    for (pos, _) in TopLevel::new(rest) {
        if keyword_at(rest, pos, "if") {
            pending += 1;
        } else if keyword_at(rest, pos, "else") {
            if pending == 0 {
                return Some(pos);
            }
            pending -= 1;
        }
    }
    None
}

const OPERATOR_CHARS: &[char] = &['+', '=', '<', '>', '!', ',', ':'];

/// True when `text` is a complete expression prefix, i.e. it cannot be
/// continued by whatever follows it.
fn is_complete(text: &str) -> bool {
    if text.is_empty() || text.ends_with(OPERATOR_CHARS) {
        return false;
    }
    let last_word_start = text.trim_end_matches(is_ident_char).len();
    if matches!(&text[last_word_start..], "else" | "in")
        && keyword_at(text, last_word_start, &text[last_word_start..])
    {
        return false;
    }
    for kw in ["if", "for"] {
        if starts_with_keyword(text, kw) {
            let head = text[kw.len()..].trim_start();
            if !head.starts_with('(') {
                return false;
            }
            let offset = text.len() - head.len();
            return matching_close(text, offset)
                .is_some_and(|close| !text[close + 1..].trim().is_empty());
        }
    }
    true
}

/// True when `input` starts with an object key followed by `:`.
fn starts_with_key(input: &str) -> bool {
    let key_len = match input.chars().next() {
        Some('"' | '\'') => {
            let mut scan = TopLevel::new(input);
            scan.next();
            match scan.next() {
                Some((pos, _)) => pos,
                None => return false,
            }
        }
        _ => ident_len(input),
    };
    key_len > 0 && input[key_len..].trim_start().starts_with(':')
}

/// Splits the text following `let name =` into the bound value and the body.
///
/// The value ends at the first top-level token that can only start a new
/// construct: `{`, `[`, another `let`, `if`, `for`, an object key, the
/// explicit `in` keyword, or anything on a new line once the value is
/// complete.
pub fn split_let(rest: &str) -> (&str, Option<&str>) {
    for (pos, c) in TopLevel::new(rest) {
        let gap = &rest[..pos];
        let gap_ws = gap.len() - gap.trim_end().len();
        if pos == 0 || gap_ws == 0 || c.is_whitespace() {
            continue;
        }
        let prefix = gap.trim();
        if !is_complete(prefix) {
            continue;
        }
        if keyword_at(rest, pos, "else") {
            continue;
        }
        let tail = &rest[pos..];
        if keyword_at(rest, pos, "in") {
            return (prefix, Some(tail[2..].trim()));
        }
        let new_line = gap[gap.len() - gap_ws..].contains('\n');
        let starts_construct = matches!(c, '{' | '[')
            || ["let", "if", "for"]
                .iter()
                .any(|kw| keyword_at(rest, pos, kw))
            || starts_with_key(tail);
        if starts_construct || (new_line && !tail.starts_with(OPERATOR_CHARS)) {
            return (prefix, Some(tail.trim()));
        }
    }
    (rest.trim(), None)
}
