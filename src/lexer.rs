use crate::error::{LexError, Position, Span};
use std::fmt;

const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '=', '<', '>', '!', '&', '|', '^', '%'];
const DELIMITER_CHARS: &[char] = &['(', ')', '{', '}', '[', ']', ',', ';', ':'];

const DEVANAGARI_DIGIT_ZERO: u32 = 0x0966;
const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Reserved words. Every keyword has a Latin and a Devanagari spelling that
/// lex to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Fn,
    Let,
    Const,
    If,
    Else,
    While,
    For,
    Return,
    Async,
    Await,
    Match,
    Tensor,
    Type,
    Interface,
    Import,
    Export,
    Try,
    Catch,
    Throw,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        Some(match word {
            "fn" | "कार्य" => Keyword::Fn,
            "let" | "चर" => Keyword::Let,
            "const" | "स्थिर" => Keyword::Const,
            "if" | "यदि" => Keyword::If,
            "else" | "अन्यथा" => Keyword::Else,
            "while" | "यावत्" => Keyword::While,
            "for" | "प्रति" => Keyword::For,
            "return" | "प्रतिफल" => Keyword::Return,
            "async" | "असमकालिक" => Keyword::Async,
            "await" | "प्रतीक्षा" => Keyword::Await,
            "match" | "मेल" => Keyword::Match,
            "tensor" | "टेन्सर" => Keyword::Tensor,
            "type" | "प्रकार" => Keyword::Type,
            "interface" | "अन्तरापृष्ठ" => Keyword::Interface,
            "import" | "आयात" => Keyword::Import,
            "export" | "निर्यात" => Keyword::Export,
            "try" | "प्रयास" => Keyword::Try,
            "catch" | "ग्रहण" => Keyword::Catch,
            "throw" | "क्षेप" => Keyword::Throw,
            _ => return None,
        })
    }

    /// The Latin spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Fn => "fn",
            Keyword::Let => "let",
            Keyword::Const => "const",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::Return => "return",
            Keyword::Async => "async",
            Keyword::Await => "await",
            Keyword::Match => "match",
            Keyword::Tensor => "tensor",
            Keyword::Type => "type",
            Keyword::Interface => "interface",
            Keyword::Import => "import",
            Keyword::Export => "export",
            Keyword::Try => "try",
            Keyword::Catch => "catch",
            Keyword::Throw => "throw",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,
    String,
    Operator,
    Delimiter,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Keyword(_) => write!(f, "keyword"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Operator => write!(f, "operator"),
            TokenKind::Delimiter => write!(f, "delimiter"),
            TokenKind::EndOfInput => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub position: Position,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, position: Position, span: Span) -> Self {
        Self {
            kind,
            value,
            position,
            span,
        }
    }

    /// Source text for words, operators and delimiters; the unescaped
    /// contents for strings; empty for numbers and end of input.
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Text(text) => text,
            TokenValue::Number(_) => "",
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self.value {
            TokenValue::Number(value) => Some(value),
            TokenValue::Text(_) => None,
        }
    }

    /// Text to show in diagnostics.
    pub fn lexeme(&self) -> String {
        match &self.value {
            TokenValue::Number(value) => value.to_string(),
            TokenValue::Text(_) if self.kind == TokenKind::EndOfInput => "<eof>".to_string(),
            TokenValue::Text(text) => text.clone(),
        }
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text() == text
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword(keyword) => write!(
                f,
                "{}:{} Keyword({}) '{}'",
                self.position.line,
                self.position.column,
                keyword.as_str(),
                self.text()
            ),
            TokenKind::String => write!(
                f,
                "{}:{} String {:?}",
                self.position.line,
                self.position.column,
                self.text()
            ),
            kind => write!(
                f,
                "{}:{} {:?} '{}'",
                self.position.line,
                self.position.column,
                kind,
                self.lexeme()
            ),
        }
    }
}

pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || devanagari_digit_value(c).is_some()
}

fn devanagari_digit_value(c: char) -> Option<u32> {
    let offset = (c as u32).checked_sub(DEVANAGARI_DIGIT_ZERO)?;
    (offset < 10).then_some(offset)
}

/// Rewrites Devanagari digits to ASCII; everything else passes through.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match devanagari_digit_value(c) {
            Some(value) => char::from_digit(value, 10).unwrap_or(c),
            None => c,
        })
        .collect()
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c == '_'
        || is_devanagari(c)
        || c == ZERO_WIDTH_JOINER
        || c == ZERO_WIDTH_NON_JOINER
}

pub fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// On-demand tokenizer. Once the source is exhausted every further call to
/// `next_token` yields another `EndOfInput` token.
pub struct Lexer {
    source: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Rewinds to the start of the source.
    pub fn reset(&mut self) {
        self.current = 0;
        self.line = 1;
        self.column = 1;
    }

    /// Collects every token up to and including the first `EndOfInput`.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = self.current;
        let position = self.position();

        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(Token::new(
                    TokenKind::EndOfInput,
                    TokenValue::Text(String::new()),
                    position,
                    Span::new(start, start),
                ))
            }
        };

        // Digits come first: the Devanagari digits sit inside the letter block.
        if is_digit(c) {
            return Ok(self.number(start, position));
        }
        if is_identifier_start(c) {
            return Ok(self.identifier(start, position));
        }
        if c == '"' || c == '\'' {
            return Ok(self.string(start, position));
        }
        if OPERATOR_CHARS.contains(&c) {
            return Ok(self.operator(start, position));
        }
        if DELIMITER_CHARS.contains(&c) {
            self.advance();
            return Ok(self.token(TokenKind::Delimiter, c.to_string(), start, position));
        }

        Err(LexError {
            character: c,
            position,
            span: Span::single(start),
        })
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    // An unterminated block comment runs to the end of input.
                    while let Some(c) = self.advance() {
                        if c == '*' && self.peek() == Some('/') {
                            self.advance();
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn number(&mut self, start: usize, position: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|&c| is_digit(c) || c == '.') {
            text.push(c);
            self.advance();
        }

        // Every point is consumed; a malformed run such as "1.2.3" is NaN.
        let value = normalize_digits(&text).parse::<f64>().unwrap_or(f64::NAN);

        Token::new(
            TokenKind::Number,
            TokenValue::Number(value),
            position,
            Span::new(start, self.current),
        )
    }

    fn identifier(&mut self, start: usize, position: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|&c| is_identifier_continue(c)) {
            text.push(c);
            self.advance();
        }

        let kind = match Keyword::from_word(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };

        self.token(kind, text, start, position)
    }

    /// Unterminated strings run to the end of input without an error.
    fn string(&mut self, start: usize, position: Position) -> Token {
        let quote = self.advance();
        let mut value = String::new();

        while let Some(c) = self.advance() {
            if Some(c) == quote {
                break;
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            match self.advance() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(escaped) => value.push(escaped),
                None => break,
            }
        }

        self.token(TokenKind::String, value, start, position)
    }

    /// At most two characters: `op=`, `&&` or `||`.
    fn operator(&mut self, start: usize, position: Position) -> Token {
        let mut text = String::new();
        if let Some(first) = self.advance() {
            text.push(first);
            if let Some(next) = self.peek() {
                let doubled = (first == '&' || first == '|') && next == first;
                if next == '=' || doubled {
                    text.push(next);
                    self.advance();
                }
            }
        }

        self.token(TokenKind::Operator, text, start, position)
    }

    fn token(&self, kind: TokenKind, text: String, start: usize, position: Position) -> Token {
        Token::new(
            kind,
            TokenValue::Text(text),
            position,
            Span::new(start, self.current),
        )
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source.get(self.current).copied()?;
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }
}
