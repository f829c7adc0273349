use super::token::{SelectorToken, Token};

/// Selector tokenizer following the consume-a-token structure of
/// [CSS Syntax § 4.3](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms).
pub struct SelectorTokenizer {
    /// The input string being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Collected tokens
    tokens: Vec<Token>,
}

impl SelectorTokenizer {
    /// Create a new selector tokenizer with the given input.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always [`SelectorToken::EOF`].
    pub fn run(&mut self) {
        loop {
            let start = self.position;
            let kind = self.consume_token();
            let is_eof = kind.is_eof();
            self.tokens.push(Token {
                kind,
                start,
                end: self.position,
            });
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The source text between two character offsets.
    pub fn source(&self, start: usize, end: usize) -> String {
        self.input[start.min(self.input.len())..end.min(self.input.len())]
            .iter()
            .collect()
    }

    fn consume_token(&mut self) -> SelectorToken {
        self.consume_comments();

        let Some(c) = self.consume() else {
            return SelectorToken::EOF;
        };

        match c {
            c if is_whitespace(c) => {
                self.consume_whitespace();
                SelectorToken::Whitespace
            }

            '"' | '\'' => self.consume_string_token(c),

            '#' => {
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    SelectorToken::Hash(self.consume_ident_sequence())
                } else {
                    SelectorToken::Delim('#')
                }
            }

            '(' => SelectorToken::LeftParen,
            ')' => SelectorToken::RightParen,
            ',' => SelectorToken::Comma,
            ':' => SelectorToken::Colon,
            '[' => SelectorToken::LeftBracket,
            ']' => SelectorToken::RightBracket,

            '\\' if is_valid_escape(Some('\\'), self.peek()) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            c if is_ident_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            c => SelectorToken::Delim(c),
        }
    }

    /// Comments are allowed anywhere whitespace is and are dropped.
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            let _ = self.consume(); // /
            let _ = self.consume(); // *

            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume(); // /
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// Unlike a stylesheet tokenizer, EOF inside a string is a bad string:
    /// a selector with an unterminated string must not match anything.
    fn consume_string_token(&mut self, ending_code_point: char) -> SelectorToken {
        let mut value = String::new();

        loop {
            match self.consume() {
                Some(c) if c == ending_code_point => return SelectorToken::String(value),
                None => return SelectorToken::BadString,
                Some('\n') => {
                    self.reconsume();
                    return SelectorToken::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn consume_ident_like_token(&mut self) -> SelectorToken {
        let name = self.consume_ident_sequence();
        if self.peek() == Some('(') {
            let _ = self.consume();
            SelectorToken::Function(name)
        } else {
            SelectorToken::Ident(name)
        }
    }

    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();

        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point());
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    match self.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            let _ = self.consume();
                        }
                        _ => break,
                    }
                }
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                if code_point == 0 || (0xD800..=0xDFFF).contains(&code_point) {
                    '\u{FFFD}'
                } else {
                    char::from_u32(code_point).unwrap_or('\u{FFFD}')
                }
            }
            None => '\u{FFFD}',
            Some(c) => c,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    const fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second.is_some_and(|c| c != '\n')
}

/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// Ident code points, with digits allowed in the leading position so that
/// `An+B` arguments (`2n`, `-n`) tokenize as identifiers.
const fn is_ident_code_point(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SelectorToken> {
        let mut tokenizer = SelectorTokenizer::new(input);
        tokenizer.run();
        tokenizer.into_tokens().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_compound_with_pseudo_function() {
        assert_eq!(
            kinds("a.b:is(c)"),
            vec![
                SelectorToken::Ident("a".into()),
                SelectorToken::Delim('.'),
                SelectorToken::Ident("b".into()),
                SelectorToken::Colon,
                SelectorToken::Function("is".into()),
                SelectorToken::Ident("c".into()),
                SelectorToken::RightParen,
                SelectorToken::EOF,
            ]
        );
    }

    #[test]
    fn test_attribute_tokens() {
        assert_eq!(
            kinds("[lang|='en' i]"),
            vec![
                SelectorToken::LeftBracket,
                SelectorToken::Ident("lang".into()),
                SelectorToken::Delim('|'),
                SelectorToken::Delim('='),
                SelectorToken::String("en".into()),
                SelectorToken::Whitespace,
                SelectorToken::Ident("i".into()),
                SelectorToken::RightBracket,
                SelectorToken::EOF,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_bad() {
        assert_eq!(
            kinds("[a=\"x"),
            vec![
                SelectorToken::LeftBracket,
                SelectorToken::Ident("a".into()),
                SelectorToken::Delim('='),
                SelectorToken::BadString,
                SelectorToken::EOF,
            ]
        );
    }

    #[test]
    fn test_escapes_and_hash() {
        assert_eq!(
            kinds("#a\\:b .\\31 0"),
            vec![
                SelectorToken::Hash("a:b".into()),
                SelectorToken::Whitespace,
                SelectorToken::Delim('.'),
                SelectorToken::Ident("10".into()),
                SelectorToken::EOF,
            ]
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(
            kinds("a/* x */>b"),
            vec![
                SelectorToken::Ident("a".into()),
                SelectorToken::Delim('>'),
                SelectorToken::Ident("b".into()),
                SelectorToken::EOF,
            ]
        );
    }

    #[test]
    fn test_token_spans() {
        let mut tokenizer = SelectorTokenizer::new("nth-child(2n + 1)");
        tokenizer.run();
        let tokens = tokenizer.tokens();
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 10);
        assert_eq!(tokenizer.source(tokens[1].start, tokens[5].end), "2n + 1");
    }
}
