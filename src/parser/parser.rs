use super::ast::*;
use super::location::Location;
use super::tokenize::Tokens;
use super::tokens::Token;


// Marker for an error that has already been recorded on the SourceFile
#[derive(Debug)]
pub struct Reported;

type ParseResult<T> = Result<T, Reported>;

pub fn parse(filename: &str, tokens: &Tokens) -> SourceFile {
    let mut parser = Parser::new(filename, tokens);
    parser.parse_file();
    parser.file
}

pub struct Parser<'a> {
    tokens: &'a [(Token, Location)],
    pos: usize,
    pub file: SourceFile,
}

impl<'a> Parser<'a> {
    pub fn new(filename: &str, tokens: &'a Tokens) -> Self {
        Parser {
            tokens: &tokens.tokens,
            pos: 0,
            file: SourceFile::new(filename.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[cfg(test)]
    pub fn show_errors(&self) -> Vec<String> {
        self.file.errors.clone()
    }

    // Only top-level declarations are parsed. Function bodies, values of
    // constants and variables, and the insides of struct and interface types
    // are skipped over by matching brackets.
    pub fn parse_file(&mut self) {
        self.skip_semicolons();
        if self.parse_package_clause().is_err() {
            self.recover();
        }

        while !self.is_done() {
            if self.is_next(&Token::Semicolon) {
                self.pos += 1;
                continue;
            }
            if self.parse_declaration().is_err() {
                self.recover();
            }
        }
    }

    fn parse_package_clause(&mut self) -> ParseResult<()> {
        self.expect(Token::KeywordPackage)?;
        let name = self.expect_ident()?;
        self.file.package_name = Some(name);
        self.expect_semicolon()
    }

    pub fn parse_declaration(&mut self) -> ParseResult<()> {
        let location = self.location();
        match self.peek() {
            Some(Token::KeywordImport) => {
                self.pos += 1;
                self.parse_group(|p| p.parse_import_spec())
            }
            Some(Token::KeywordConst) => {
                self.pos += 1;
                self.parse_group(|p| p.parse_value_spec().map(Declaration::Const))
            }
            Some(Token::KeywordVar) => {
                self.pos += 1;
                self.parse_group(|p| p.parse_value_spec().map(Declaration::Var))
            }
            Some(Token::KeywordType) => {
                self.pos += 1;
                self.parse_group(|p| p.parse_type_spec())
            }
            Some(Token::KeywordFunc) => {
                self.pos += 1;
                let decl = self.parse_func_decl(location)?;
                self.file.add_declaration(Declaration::Function(decl));
                self.expect_semicolon()
            }
            _ => Err(self.unexpected("declaration")),
        }
    }

    // Either a single spec or a parenthesized list of them
    fn parse_group<F>(&mut self, parse_spec: F) -> ParseResult<()>
    where
        F: Fn(&mut Self) -> ParseResult<Declaration>,
    {
        if !self.is_next(&Token::LParen) {
            let decl = parse_spec(self)?;
            self.file.add_declaration(decl);
            return self.expect_semicolon();
        }

        self.pos += 1;
        loop {
            self.skip_semicolons();
            if self.is_next(&Token::RParen) {
                self.pos += 1;
                break;
            }
            if self.is_done() {
                return Err(self.unexpected("')'"));
            }
            let decl = parse_spec(self)?;
            self.file.add_declaration(decl);
            self.expect_semicolon()?;
        }
        self.expect_semicolon()
    }

    fn parse_import_spec(&mut self) -> ParseResult<Declaration> {
        let position = self.position();
        let alias = match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Some(name.clone())
            }
            Some(Token::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };

        match self.peek() {
            Some(Token::StringLiteral(text)) => {
                self.pos += 1;
                let path = text.trim_matches(|c| c == '"' || c == '`').to_string();
                Ok(Declaration::Import(ImportSpec {
                    alias,
                    path,
                    position,
                }))
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn parse_value_spec(&mut self) -> ParseResult<ValueSpec> {
        let position = self.position();
        let mut names = vec![self.expect_ident()?];
        while self.is_next(&Token::Comma) {
            self.pos += 1;
            names.push(self.expect_ident()?);
        }
        self.skip_to_spec_end();
        Ok(ValueSpec { names, position })
    }

    fn parse_type_spec(&mut self) -> ParseResult<Declaration> {
        let position = self.position();
        let name = self.expect_ident()?;

        let has_type_params = self.is_next(&Token::LBracket) && self.looks_like_type_params();
        if has_type_params {
            self.skip_balanced()?;
        }

        let is_alias = self.is_next(&Token::Equals);
        if is_alias {
            self.pos += 1;
        }

        let definition = self.parse_type()?;
        Ok(Declaration::Type(TypeSpec {
            name,
            is_alias,
            has_type_params,
            definition,
            position,
        }))
    }

    // `type A[T any] ...` declares type parameters, `type A [N]T` an array.
    // Go needs the whole expression to tell these apart; looking at the two
    // tokens after the bracket covers the forms seen in practice.
    fn looks_like_type_params(&self) -> bool {
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(Token::Ident(_)), Some(next)) => matches!(
                next,
                Token::Ident(_)
                    | Token::Comma
                    | Token::Tilde
                    | Token::KeywordInterface
                    | Token::KeywordFunc
                    | Token::KeywordMap
                    | Token::KeywordChan
                    | Token::KeywordStruct
            ),
            _ => false,
        }
    }

    fn parse_func_decl(&mut self, location: Location) -> ParseResult<FuncDecl> {
        let position = Position {
            file: self.file.filename.clone(),
            location,
        };

        let receiver = if self.is_next(&Token::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.expect_ident()?;

        if self.is_next(&Token::LBracket) {
            // type parameters
            self.skip_balanced()?;
        }

        if !self.is_next(&Token::LParen) {
            return Err(self.unexpected("'('"));
        }
        self.skip_balanced()?;
        self.skip_result()?;

        // Functions implemented outside Go have no body
        let has_body = self.is_next(&Token::LBrace);
        if has_body {
            self.skip_balanced()?;
        }

        Ok(FuncDecl {
            name,
            receiver,
            has_body,
            position,
        })
    }

    fn parse_receiver(&mut self) -> ParseResult<Receiver> {
        self.expect(Token::LParen)?;
        if self.is_next(&Token::RParen) {
            self.pos += 1;
            return Ok(Receiver {
                name: None,
                type_expr: None,
            });
        }

        // In `(t T)` the first identifier names the receiver; in `(T)`,
        // `(pkg.T)`, and `(T[K])` it starts the type.
        let name = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(name)), Some(next))
                if !matches!(
                    next,
                    Token::RParen | Token::Dot | Token::LBracket | Token::Comma
                ) =>
            {
                self.pos += 1;
                Some(name.clone())
            }
            _ => None,
        };

        let type_expr = self.parse_type()?;
        if self.is_next(&Token::Comma) {
            self.pos += 1;
        }
        self.expect(Token::RParen)?;

        Ok(Receiver {
            name,
            type_expr: Some(type_expr),
        })
    }

    // A result is either a parenthesized list or a single type
    fn skip_result(&mut self) -> ParseResult<()> {
        if self.is_next(&Token::LParen) {
            self.skip_balanced()
        } else if self.starts_type() {
            self.parse_type().map(|_| ())
        } else {
            Ok(())
        }
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Ident(_))
                | Some(Token::Star)
                | Some(Token::LParen)
                | Some(Token::LBracket)
                | Some(Token::Arrow)
                | Some(Token::KeywordMap)
                | Some(Token::KeywordChan)
                | Some(Token::KeywordFunc)
                | Some(Token::KeywordStruct)
                | Some(Token::KeywordInterface)
        )
    }

    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(self.unexpected("type")),
        };

        match token {
            Token::Ident(name) => {
                self.pos += 1;
                let base = if self.is_next(&Token::Dot) {
                    self.pos += 1;
                    let member = self.expect_ident()?;
                    TypeExpr::Qualified(name.clone(), member)
                } else {
                    TypeExpr::Name(name.clone())
                };

                if self.is_next(&Token::LBracket) {
                    self.pos += 1;
                    let args = self.parse_type_args()?;
                    Ok(TypeExpr::Generic(Box::new(base), args))
                } else {
                    Ok(base)
                }
            }
            Token::Star => {
                self.pos += 1;
                let inner = self.parse_type()?;
                Ok(TypeExpr::Pointer(Box::new(inner)))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.parse_type()?;
                self.expect(Token::RParen)?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            Token::LBracket => {
                if self.peek_at(1) == Some(&Token::RBracket) {
                    self.pos += 2;
                    let elem = self.parse_type()?;
                    return Ok(TypeExpr::Slice(Box::new(elem)));
                }
                let len = self.bracket_text()?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Array(len, Box::new(elem)))
            }
            Token::KeywordMap => {
                self.pos += 1;
                self.expect(Token::LBracket)?;
                let key = self.parse_type()?;
                self.expect(Token::RBracket)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            Token::KeywordChan => {
                self.pos += 1;
                if self.is_next(&Token::Arrow) {
                    self.pos += 1;
                }
                let elem = self.parse_type()?;
                Ok(TypeExpr::Chan(Box::new(elem)))
            }
            Token::Arrow => {
                self.pos += 1;
                self.expect(Token::KeywordChan)?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Chan(Box::new(elem)))
            }
            Token::KeywordFunc => {
                self.pos += 1;
                if !self.is_next(&Token::LParen) {
                    return Err(self.unexpected("'('"));
                }
                self.skip_balanced()?;
                self.skip_result()?;
                Ok(TypeExpr::Func)
            }
            Token::KeywordStruct => {
                self.pos += 1;
                self.skip_braces()?;
                Ok(TypeExpr::Struct)
            }
            Token::KeywordInterface => {
                self.pos += 1;
                self.skip_braces()?;
                Ok(TypeExpr::Interface)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    // After the opening bracket of `T[A, B]`
    fn parse_type_args(&mut self) -> ParseResult<Vec<TypeExpr>> {
        let mut args = Vec::new();
        while !self.is_next(&Token::RBracket) {
            args.push(self.parse_type()?);
            if self.is_next(&Token::Comma) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        Ok(args)
    }

    fn skip_braces(&mut self) -> ParseResult<()> {
        if !self.is_next(&Token::LBrace) {
            return Err(self.unexpected("'{'"));
        }
        self.skip_balanced()
    }

    // Consumes a bracketed array length and returns its text
    fn bracket_text(&mut self) -> ParseResult<String> {
        let start = self.pos;
        self.skip_balanced()?;
        let text = self.tokens[start + 1..self.pos - 1]
            .iter()
            .map(|(token, _)| token.to_string())
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }

    // The next token must open a bracket. Consumes through the matching
    // close, ignoring everything in between.
    fn skip_balanced(&mut self) -> ParseResult<()> {
        let open_location = self.location();
        let mut stack = Vec::new();
        loop {
            let token = match self.peek() {
                Some(token) => token,
                None => {
                    let message = format!("unclosed bracket opened at {}", open_location);
                    return Err(self.error(message));
                }
            };

            match token {
                Token::LParen => stack.push(Token::RParen),
                Token::LBracket => stack.push(Token::RBracket),
                Token::LBrace => stack.push(Token::RBrace),
                Token::RParen | Token::RBracket | Token::RBrace => match stack.pop() {
                    Some(expected) if expected == *token => {}
                    Some(expected) => {
                        let wanted = format!("'{}'", expected);
                        return Err(self.unexpected(&wanted));
                    }
                    None => return Err(self.unexpected("opening bracket")),
                },
                _ => {}
            }
            self.pos += 1;

            if stack.is_empty() {
                return Ok(());
            }
        }
    }

    // Skips an initializer up to the `;` (or group-closing `)`) ending the spec
    fn skip_to_spec_end(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Semicolon if depth == 0 => return,
                Token::RParen | Token::RBracket | Token::RBrace if depth == 0 => return,
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    // Skip past the end of the broken declaration
    fn recover(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            self.pos += 1;
            match token {
                Token::Semicolon if depth == 0 => return,
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
        }
    }

    fn skip_semicolons(&mut self) {
        while self.is_next(&Token::Semicolon) {
            self.pos += 1;
        }
    }

    fn expect_semicolon(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(Token::Semicolon) => {
                self.pos += 1;
                Ok(())
            }
            // The semicolon may be left out before a closing `)` or `}`
            Some(Token::RParen) | Some(Token::RBrace) | None => Ok(()),
            _ => Err(self.unexpected("';' or newline")),
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.is_next(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn is_next(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|(token, _)| token)
    }

    fn location(&self) -> Location {
        match self.tokens.get(self.pos) {
            Some((_, location)) => *location,
            None => self
                .tokens
                .last()
                .map(|(_, location)| *location)
                .unwrap_or_default(),
        }
    }

    fn position(&self) -> Position {
        Position {
            file: self.file.filename.clone(),
            location: self.location(),
        }
    }

    fn unexpected(&mut self, wanted: &str) -> Reported {
        let found = match self.peek() {
            Some(Token::Semicolon) => "';' or newline".to_string(),
            Some(token) => format!("'{}'", token),
            None => "end of file".to_string(),
        };
        self.error(format!("expected {}, found {}", wanted, found))
    }

    fn error(&mut self, message: String) -> Reported {
        let location = self.location();
        self.file.add_error(format!("{}: {}", location, message));
        Reported
    }
}
