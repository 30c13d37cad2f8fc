//! Tokenizer and token stream for command input.
//!
//! Splits a command line into words with support for:
//! - Quoted strings (single and double quotes)
//! - Escape sequences within quotes
//!
//! The resulting [`TokenStream`] is consumed front to back by the parsers.

/// A FIFO of command tokens with a read cursor.
///
/// Tokens are consumed strictly left to right. Consumption only moves the cursor,
/// so a parser that fails can restore the stream to its pre-call state with
/// [`TokenStream::rewind_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<String>,
    position: usize,
}

impl TokenStream {
    /// Creates a stream from already-split tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }

    /// Tokenizes a raw command line into a stream.
    pub fn from_line(line: &str) -> Self {
        Self::new(tokenize(line))
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// Returns the token `offset` places ahead of the cursor without consuming anything.
    pub fn peek_nth(&self, offset: usize) -> Option<&str> {
        self.tokens.get(self.position + offset).map(String::as_str)
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    /// Consumes `count` tokens, stopping at the end of the stream.
    pub fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.tokens.len());
    }

    /// Current cursor position, usable with [`TokenStream::rewind_to`].
    pub fn position(&self) -> usize {
        self.position
    }

    /// Restores the cursor to an earlier position.
    pub fn rewind_to(&mut self, position: usize) {
        self.position = position.min(self.position);
    }

    /// Number of unconsumed tokens.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Returns true if every token has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unconsumed tokens.
    pub fn remaining_tokens(&self) -> &[String] {
        &self.tokens[self.position..]
    }
}

/// Tokenizes a command line.
///
/// Handles:
/// - Whitespace-separated tokens
/// - Double-quoted strings: `"hello world"` → `hello world`
/// - Single-quoted strings: `'hello world'` → `hello world`
/// - Escape sequences in quotes: `"say \"hi\""` → `say "hi"`
/// - Quotes inside a word: `name="John Doe"` → `name=John Doe`
/// - Empty quotes produce an empty token: `""` → ``
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let (word, quoted) = collect_word_or_quoted(&mut chars);
        if word.is_empty() && !quoted {
            continue;
        }
        tokens.push(word);
    }

    tokens
}

/// Collects a word, handling quoted sections. Returns the word and whether it
/// contained a quoted section.
fn collect_word_or_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> (String, bool) {
    let mut result = String::new();
    let mut quoted = false;

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }

        chars.next();
        if c == '"' || c == '\'' {
            quoted = true;
            result.push_str(&collect_quoted(chars, c));
            continue;
        }

        result.push(c);
    }

    (result, quoted)
}

/// Collects characters inside quotes, handling escape sequences.
fn collect_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, quote: char) -> String {
    let mut result = String::new();
    let mut escaped = false;

    for c in chars.by_ref() {
        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                '\\' => result.push('\\'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                _ => {
                    // Unknown escape, keep as-is
                    result.push('\\');
                    result.push(c);
                }
            }
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
            continue;
        }

        if c == quote {
            break;
        }

        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_words() {
        assert_eq!(tokenize("give steve 64"), vec!["give", "steve", "64"]);
    }

    #[test]
    fn test_extra_whitespace() {
        assert_eq!(tokenize("  give \t steve   64 "), vec!["give", "steve", "64"]);
    }

    #[test]
    fn test_double_quoted_string() {
        assert_eq!(tokenize("say \"hello world\""), vec!["say", "hello world"]);
    }

    #[test]
    fn test_single_quoted_string() {
        assert_eq!(tokenize("say 'hello world'"), vec!["say", "hello world"]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(tokenize(r#"say "say \"hi\"""#), vec!["say", "say \"hi\""]);
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(tokenize(r#""line1\nline2\ttab""#), vec!["line1\nline2\ttab"]);
    }

    #[test]
    fn test_quote_inside_word() {
        assert_eq!(tokenize("name=\"John Doe\""), vec!["name=John Doe"]);
    }

    #[test]
    fn test_empty_quotes_keep_token() {
        assert_eq!(tokenize("say \"\""), vec!["say", ""]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("say \"oops"), vec!["say", "oops"]);
    }

    #[test]
    fn test_stream_consumes_front_to_back() {
        let mut stream = TokenStream::from_line("a b c");
        assert_eq!(stream.remaining(), 3);
        assert_eq!(stream.peek(), Some("a"));
        assert_eq!(stream.peek_nth(2), Some("c"));
        assert_eq!(stream.next_token(), Some("a"));
        assert_eq!(stream.next_token(), Some("b"));
        assert_eq!(stream.remaining_tokens(), &["c".to_string()]);
        assert_eq!(stream.next_token(), Some("c"));
        assert_eq!(stream.next_token(), None);
        assert!(stream.is_empty());
    }

    #[test]
    fn test_stream_rewind() {
        let mut stream = TokenStream::new(["1", "2", "3"]);
        let mark = stream.position();
        stream.advance(2);
        assert_eq!(stream.peek(), Some("3"));
        stream.rewind_to(mark);
        assert_eq!(stream.peek(), Some("1"));
        assert_eq!(stream.remaining(), 3);
    }

    #[test]
    fn test_stream_rewind_never_moves_forward() {
        let mut stream = TokenStream::new(["1", "2"]);
        stream.rewind_to(5);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_stream_advance_is_bounded() {
        let mut stream = TokenStream::new(["1"]);
        stream.advance(10);
        assert!(stream.is_empty());
        assert_eq!(stream.position(), 1);
    }
}
