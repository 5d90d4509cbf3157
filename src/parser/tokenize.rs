use super::location::{DisplaySelection, Location, Region};
use super::tokens::{Comment, Token};

#[derive(Debug)]
pub struct Tokens {
    pub tokens: Vec<(Token, Location)>,
    pub comments: Vec<(Comment, Location)>,
    saw_unknown: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("found {count} unrecognized token(s)")]
pub struct UnknownTokensError {
    pub count: usize,
}

impl Tokens {
    #[cfg(test)]
    pub fn has_unknown(&self) -> bool {
        self.saw_unknown
    }

    pub fn get_error(&self) -> Result<(), UnknownTokensError> {
        if self.saw_unknown {
            let count = self
                .tokens
                .iter()
                .filter(|(t, _)| matches!(t, Token::Unknown(_)))
                .count();
            Err(UnknownTokensError { count })
        } else {
            Ok(())
        }
    }

    // Show where in the file the bad tokens were found
    pub fn display_unknown(&self) -> Vec<DisplaySelection> {
        if !self.saw_unknown {
            return Vec::new();
        }

        self.tokens
            .iter()
            .filter_map(|(tok, loc)| match tok {
                Token::Unknown(s) => {
                    let region = Region::for_word(*loc, s);
                    Some(region.to_display_selection(2))
                }
                _ => None,
            })
            .collect()
    }
}

// Longest first, so the first match is the maximal munch
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ";", ".", ":",
];

pub fn tokenize(text: &str) -> Tokens {
    let mut scanner = Scanner::new(text);
    scanner.run();
    Tokens {
        tokens: scanner.tokens,
        comments: scanner.comments,
        saw_unknown: scanner.saw_unknown,
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    // Location of chars[pos]
    location: Location,
    tokens: Vec<(Token, Location)>,
    comments: Vec<(Comment, Location)>,
    saw_unknown: bool,
}

impl Scanner {
    fn new(text: &str) -> Self {
        // A byte order mark is only allowed as the first character
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Scanner {
            chars: text.chars().collect(),
            pos: 0,
            location: Location::new(),
            tokens: Vec::new(),
            comments: Vec::new(),
            saw_unknown: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.location = self.location.update(c);
        Some(c)
    }

    fn push(&mut self, token: Token, location: Location) {
        self.tokens.push((token, location));
    }

    fn push_unknown(&mut self, text: String, location: Location) {
        self.saw_unknown = true;
        self.tokens.push((Token::Unknown(text), location));
    }

    // Automatic semicolon insertion: a line break ends the statement when
    // the last token on the line could end one.
    fn end_line(&mut self, location: Location) {
        let ends = match self.tokens.last() {
            Some((token, _)) => token.ends_statement(),
            None => false,
        };
        if ends {
            self.push(Token::Semicolon, location);
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.location;
            match c {
                '\n' => {
                    self.bump();
                    self.end_line(start);
                }
                _ if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => self.line_comment(start),
                '/' if self.peek_at(1) == Some('*') => self.block_comment(start),
                '"' => self.quoted('"', start),
                '\'' => self.quoted('\'', start),
                '`' => self.raw_string(start),
                '.' if self.peek_at(1).map_or(false, |n| n.is_ascii_digit()) => {
                    self.number(start)
                }
                _ if c.is_ascii_digit() => self.number(start),
                _ if c.is_alphabetic() || c == '_' => self.word(start),
                _ => self.operator(start),
            }
        }

        let end = self.location;
        self.end_line(end);
    }

    fn line_comment(&mut self, start: Location) {
        self.bump();
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.comments.push((Comment::LineComment(text), start));
    }

    fn block_comment(&mut self, start: Location) {
        self.bump();
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    // Block comment was never closed
                    self.push_unknown(format!("/*{}", text), start);
                    return;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    break;
                }
                Some(c) => text.push(c),
            }
        }

        let spans_lines = text.contains('\n');
        self.comments.push((Comment::BlockComment(text), start));
        if spans_lines {
            self.end_line(start);
        }
    }

    // Interpreted strings and rune literals
    fn quoted(&mut self, quote: char, start: Location) {
        let mut text = String::new();
        if let Some(c) = self.bump() {
            text.push(c);
        }

        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.push_unknown(text, start);
                    return;
                }
                Some('\\') => {
                    self.bump();
                    text.push('\\');
                    match self.peek() {
                        None | Some('\n') => {
                            self.push_unknown(text, start);
                            return;
                        }
                        Some(escaped) => {
                            self.bump();
                            text.push(escaped);
                        }
                    }
                }
                Some(c) => {
                    self.bump();
                    text.push(c);
                    if c == quote {
                        break;
                    }
                }
            }
        }

        let token = if quote == '"' {
            Token::StringLiteral(text)
        } else {
            Token::RuneLiteral(text)
        };
        self.push(token, start);
    }

    fn raw_string(&mut self, start: Location) {
        let mut text = String::new();
        if let Some(c) = self.bump() {
            text.push(c);
        }

        loop {
            match self.bump() {
                None => {
                    self.push_unknown(text, start);
                    return;
                }
                Some(c) => {
                    text.push(c);
                    if c == '`' {
                        break;
                    }
                }
            }
        }
        self.push(Token::StringLiteral(text), start);
    }

    // Integers, floats, and imaginary numbers in any base. The text is kept
    // as written, since declarations never need the value.
    fn number(&mut self, start: Location) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            let is_exponent_sign = (c == '+' || c == '-') && self.follows_exponent(&text);
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || is_exponent_sign {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(Token::NumberLiteral(text), start);
    }

    fn follows_exponent(&self, text: &str) -> bool {
        let is_hex = text.starts_with("0x") || text.starts_with("0X");
        match text.chars().last() {
            Some('e') | Some('E') => !is_hex,
            Some('p') | Some('P') => is_hex,
            _ => false,
        }
    }

    fn word(&mut self, start: Location) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(name_token(text), start);
    }

    fn operator(&mut self, start: Location) {
        let ahead: String = self.chars[self.pos..].iter().take(3).collect();
        if let Some(op) = OPERATORS.iter().find(|op| ahead.starts_with(*op)) {
            for _ in 0..op.len() {
                self.bump();
            }
            self.push(operator_token(op), start);
            return;
        }

        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || "()[]{},;".contains(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.push_unknown(text, start);
    }
}

fn operator_token(op: &str) -> Token {
    match op {
        "," => Token::Comma,
        "." => Token::Dot,
        "..." => Token::Ellipsis,
        ";" => Token::Semicolon,
        ":" => Token::Colon,
        "*" => Token::Star,
        "=" => Token::Equals,
        "~" => Token::Tilde,
        "<-" => Token::Arrow,
        "(" => Token::LParen,
        ")" => Token::RParen,
        "[" => Token::LBracket,
        "]" => Token::RBracket,
        "{" => Token::LBrace,
        "}" => Token::RBrace,
        _ => Token::Operator(op.to_string()),
    }
}

fn name_token(name: String) -> Token {
    match name.len() {
        2 => match name.as_str() {
            "go" => Token::KeywordGo,
            "if" => Token::KeywordIf,
            _ => Token::Ident(name),
        },
        3 => match name.as_str() {
            "for" => Token::KeywordFor,
            "map" => Token::KeywordMap,
            "var" => Token::KeywordVar,
            _ => Token::Ident(name),
        },
        4 => match name.as_str() {
            "case" => Token::KeywordCase,
            "chan" => Token::KeywordChan,
            "else" => Token::KeywordElse,
            "func" => Token::KeywordFunc,
            "goto" => Token::KeywordGoto,
            "type" => Token::KeywordType,
            _ => Token::Ident(name),
        },
        5 => match name.as_str() {
            "break" => Token::KeywordBreak,
            "const" => Token::KeywordConst,
            "defer" => Token::KeywordDefer,
            "range" => Token::KeywordRange,
            _ => Token::Ident(name),
        },
        6 => match name.as_str() {
            "import" => Token::KeywordImport,
            "return" => Token::KeywordReturn,
            "select" => Token::KeywordSelect,
            "struct" => Token::KeywordStruct,
            "switch" => Token::KeywordSwitch,
            _ => Token::Ident(name),
        },
        7 => match name.as_str() {
            "default" => Token::KeywordDefault,
            "package" => Token::KeywordPackage,
            _ => Token::Ident(name),
        },
        8 => match name.as_str() {
            "continue" => Token::KeywordContinue,
            _ => Token::Ident(name),
        },
        9 => match name.as_str() {
            "interface" => Token::KeywordInterface,
            _ => Token::Ident(name),
        },
        11 => match name.as_str() {
            "fallthrough" => Token::KeywordFallthrough,
            _ => Token::Ident(name),
        },
        _ => Token::Ident(name),
    }
}
