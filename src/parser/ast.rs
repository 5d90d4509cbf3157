use std::fmt;

use super::location::Location;

#[cfg(test)]
pub fn inspect<T>(value: &T) -> Result<String, fmt::Error>
where
    T: Inspect,
{
    let mut result = String::new();
    value.inspect(&mut result)?;
    Ok(result)
}

// Inspection trait for debugging the parser
#[cfg(test)]
pub trait Inspect {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result;
}

// SourceFile contains the results of parsing one file
#[derive(Debug)]
pub struct SourceFile {
    pub filename: String,
    pub package_name: Option<String>,
    pub declarations: Vec<Declaration>,
    pub errors: Vec<String>,
}

impl SourceFile {
    pub fn new(filename: String) -> Self {
        SourceFile {
            filename,
            package_name: None,
            declarations: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_declaration(&mut self, decl: Declaration) {
        self.declarations.push(decl);
    }
}

// Where a declaration was found
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub file: String,
    pub location: Location,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.location.display_line())
    }
}

/// One top-level declaration. Grouped declarations such as `type ( ... )`
/// are flattened into one `Declaration` per spec.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Import(ImportSpec),
    Const(ValueSpec),
    Var(ValueSpec),
    Type(TypeSpec),
    Function(FuncDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Import,
    Const,
    Var,
    Type,
    Function,
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Import(_) => DeclarationKind::Import,
            Declaration::Const(_) => DeclarationKind::Const,
            Declaration::Var(_) => DeclarationKind::Var,
            Declaration::Type(_) => DeclarationKind::Type,
            Declaration::Function(_) => DeclarationKind::Function,
        }
    }

    // What the declaration declares, for logging
    pub fn describe(&self) -> String {
        match self {
            Declaration::Import(spec) => match &spec.alias {
                Some(alias) => format!("{} \"{}\"", alias, spec.path),
                None => format!("\"{}\"", spec.path),
            },
            Declaration::Const(spec) | Declaration::Var(spec) => spec.names.join(", "),
            Declaration::Type(spec) => spec.name.clone(),
            Declaration::Function(decl) => decl.name.clone(),
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            Declaration::Import(spec) => &spec.position,
            Declaration::Const(spec) | Declaration::Var(spec) => &spec.position,
            Declaration::Type(spec) => &spec.position,
            Declaration::Function(decl) => &decl.position,
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationKind::Import => "import",
            DeclarationKind::Const => "const",
            DeclarationKind::Var => "var",
            DeclarationKind::Type => "type",
            DeclarationKind::Function => "func",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
impl Inspect for Declaration {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result {
        use Declaration::*;
        match self {
            Import(spec) => match &spec.alias {
                Some(alias) => write!(f, "(import {} {})", alias, spec.path),
                None => write!(f, "(import {})", spec.path),
            },
            Const(spec) | Var(spec) => {
                write!(f, "({}", self.kind())?;
                for name in spec.names.iter() {
                    write!(f, " {}", name)?;
                }
                write!(f, ")")
            }
            Type(spec) => spec.inspect(f),
            Function(decl) => decl.inspect(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    // Without the surrounding quotes
    pub path: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub is_alias: bool,
    pub has_type_params: bool,
    pub definition: TypeExpr,
    pub position: Position,
}

#[cfg(test)]
impl Inspect for TypeSpec {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let keyword = if self.is_alias { "alias" } else { "type" };
        write!(f, "({} {}", keyword, self.name)?;
        if self.has_type_params {
            write!(f, " [..]")?;
        }
        write!(f, " ")?;
        self.definition.inspect(f)?;
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub has_body: bool,
    pub position: Position,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
impl Inspect for FuncDecl {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "(func ")?;
        if let Some(receiver) = &self.receiver {
            receiver.inspect(f)?;
            write!(f, " ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.has_body {
            write!(f, " no-body")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<String>,
    // Missing for the (invalid) empty receiver list `func () M()`
    pub type_expr: Option<TypeExpr>,
}

#[cfg(test)]
impl Inspect for Receiver {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "(recv")?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        if let Some(type_expr) = &self.type_expr {
            write!(f, " ")?;
            type_expr.inspect(f)?;
        }
        write!(f, ")")
    }
}

/// A type expression. Only the outer shape is kept for function types and
/// struct and interface literals.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    Qualified(String, String),
    Pointer(Box<TypeExpr>),
    Paren(Box<TypeExpr>),
    Generic(Box<TypeExpr>, Vec<TypeExpr>),
    // The length is kept as source text
    Array(String, Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Chan(Box<TypeExpr>),
    Func,
    Struct,
    Interface,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TypeExpr::*;
        match self {
            Name(name) => write!(f, "{}", name),
            Qualified(package, name) => write!(f, "{}.{}", package, name),
            Pointer(inner) => write!(f, "*{}", inner),
            Paren(inner) => write!(f, "({})", inner),
            Generic(base, args) => {
                write!(f, "{}[", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, "]")
            }
            Array(len, elem) => write!(f, "[{}]{}", len, elem),
            Slice(elem) => write!(f, "[]{}", elem),
            Map(key, value) => write!(f, "map[{}]{}", key, value),
            Chan(elem) => write!(f, "chan {}", elem),
            Func => write!(f, "func(...)"),
            Struct => write!(f, "struct{{...}}"),
            Interface => write!(f, "interface{{...}}"),
        }
    }
}

#[cfg(test)]
impl Inspect for TypeExpr {
    fn inspect(&self, f: &mut impl fmt::Write) -> fmt::Result {
        use TypeExpr::*;
        match self {
            Name(name) => write!(f, "{}", name),
            Qualified(package, name) => write!(f, "(sel {} {})", package, name),
            Pointer(inner) => {
                write!(f, "(ptr ")?;
                inner.inspect(f)?;
                write!(f, ")")
            }
            Paren(inner) => {
                write!(f, "(paren ")?;
                inner.inspect(f)?;
                write!(f, ")")
            }
            Generic(base, args) => {
                write!(f, "(generic ")?;
                base.inspect(f)?;
                for arg in args.iter() {
                    write!(f, " ")?;
                    arg.inspect(f)?;
                }
                write!(f, ")")
            }
            Array(len, elem) => {
                write!(f, "(array {} ", len)?;
                elem.inspect(f)?;
                write!(f, ")")
            }
            Slice(elem) => {
                write!(f, "(slice ")?;
                elem.inspect(f)?;
                write!(f, ")")
            }
            Map(key, value) => {
                write!(f, "(map ")?;
                key.inspect(f)?;
                write!(f, " ")?;
                value.inspect(f)?;
                write!(f, ")")
            }
            Chan(elem) => {
                write!(f, "(chan ")?;
                elem.inspect(f)?;
                write!(f, ")")
            }
            Func => write!(f, "func"),
            Struct => write!(f, "struct"),
            Interface => write!(f, "interface"),
        }
    }
}
