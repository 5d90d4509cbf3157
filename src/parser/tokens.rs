use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Bad tokens:
    Unknown(String),

    Comma,
    Dot,
    Ellipsis,
    Semicolon,
    Colon,

    Star,
    Equals,
    Tilde,
    Arrow,
    // Every other operator, kept as its source text
    Operator(String),

    LBrace,
    LBracket,
    LParen,
    RBrace,
    RBracket,
    RParen,

    KeywordBreak,
    KeywordCase,
    KeywordChan,
    KeywordConst,
    KeywordContinue,
    KeywordDefault,
    KeywordDefer,
    KeywordElse,
    KeywordFallthrough,
    KeywordFor,
    KeywordFunc,
    KeywordGo,
    KeywordGoto,
    KeywordIf,
    KeywordImport,
    KeywordInterface,
    KeywordMap,
    KeywordPackage,
    KeywordRange,
    KeywordReturn,
    KeywordSelect,
    KeywordStruct,
    KeywordSwitch,
    KeywordType,
    KeywordVar,

    Ident(String),

    NumberLiteral(String),
    StringLiteral(String),
    RuneLiteral(String),
}

impl Token {
    // Whether a newline directly after this token ends the statement
    pub fn ends_statement(&self) -> bool {
        use Token::*;
        match self {
            Ident(_) | NumberLiteral(_) | StringLiteral(_) | RuneLiteral(_) => true,
            KeywordBreak | KeywordContinue | KeywordFallthrough | KeywordReturn => true,
            RParen | RBracket | RBrace => true,
            Operator(op) => op == "++" || op == "--",
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;
        let s = match self {
            Unknown(s) => s.as_str(),
            Comma => ",",
            Dot => ".",
            Ellipsis => "...",
            Semicolon => ";",
            Colon => ":",
            Star => "*",
            Equals => "=",
            Tilde => "~",
            Arrow => "<-",
            Operator(s) => s.as_str(),
            LBrace => "{",
            LBracket => "[",
            LParen => "(",
            RBrace => "}",
            RBracket => "]",
            RParen => ")",
            KeywordBreak => "break",
            KeywordCase => "case",
            KeywordChan => "chan",
            KeywordConst => "const",
            KeywordContinue => "continue",
            KeywordDefault => "default",
            KeywordDefer => "defer",
            KeywordElse => "else",
            KeywordFallthrough => "fallthrough",
            KeywordFor => "for",
            KeywordFunc => "func",
            KeywordGo => "go",
            KeywordGoto => "goto",
            KeywordIf => "if",
            KeywordImport => "import",
            KeywordInterface => "interface",
            KeywordMap => "map",
            KeywordPackage => "package",
            KeywordRange => "range",
            KeywordReturn => "return",
            KeywordSelect => "select",
            KeywordStruct => "struct",
            KeywordSwitch => "switch",
            KeywordType => "type",
            KeywordVar => "var",
            Ident(s) => s.as_str(),
            NumberLiteral(s) => s.as_str(),
            StringLiteral(s) => s.as_str(),
            RuneLiteral(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comment {
    LineComment(String),
    BlockComment(String),
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comment::LineComment(text) => write!(f, "//{}", text),
            Comment::BlockComment(text) => write!(f, "/*{}*/", text),
        }
    }
}
