// mod package
use std::collections::HashMap;

use tracing::{trace, warn};

use super::parser::ast::{Declaration, FuncDecl, TypeExpr, TypeSpec};

/// Why a method's receiver could not be tied to a type in the package.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("method has no receiver type")]
    MissingReceiver,
    #[error("receiver type {0} has more than one level of pointer indirection")]
    MultiplePointers(TypeExpr),
    #[error("receiver type {0} is a generic instantiation")]
    Generic(TypeExpr),
    #[error("receiver type {0} names a type from another package")]
    Qualified(TypeExpr),
    #[error("receiver type {0} is not a type name")]
    NotNamed(TypeExpr),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TypeEntry {
    // None until the type's own declaration is seen
    pub definition: Option<TypeSpec>,
    pub methods: HashMap<String, FuncDecl>,
}

impl TypeEntry {
    pub fn is_declared(&self) -> bool {
        self.definition.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedMethod {
    pub decl: FuncDecl,
    pub error: ResolutionError,
}

/// The top-level functions, types, and methods of one package.
///
/// Declarations can be recorded in any order: a method seen before its
/// type's declaration creates the type's entry, and the declaration fills
/// it in later.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub functions: HashMap<String, FuncDecl>,
    pub types: HashMap<String, TypeEntry>,
    pub unresolved: Vec<UnresolvedMethod>,
}

impl Package {
    pub fn new(name: String) -> Self {
        Package {
            name,
            functions: HashMap::new(),
            types: HashMap::new(),
            unresolved: Vec::new(),
        }
    }

    pub fn aggregate<I>(name: String, declarations: I) -> Self
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut package = Package::new(name);
        for decl in declarations {
            package.record_declaration(decl);
        }
        package
    }

    pub fn record_declaration(&mut self, decl: Declaration) {
        match decl {
            Declaration::Function(func) if func.is_method() => {
                // Failures are kept in `unresolved`; the rest of the
                // package is still recorded.
                self.record_method(func).ok();
            }
            Declaration::Function(func) => self.record_function(func),
            Declaration::Type(spec) => self.record_type(spec),
            Declaration::Import(_) | Declaration::Const(_) | Declaration::Var(_) => {
                trace!(
                    package = %self.name,
                    kind = %decl.kind(),
                    declares = %decl.describe(),
                    position = %decl.position(),
                    "discarding declaration"
                );
            }
        }
    }

    pub fn record_function(&mut self, decl: FuncDecl) {
        trace!(
            package = %self.name,
            function = %decl.name,
            has_body = decl.has_body,
            "recording function"
        );
        self.functions.insert(decl.name.clone(), decl);
    }

    pub fn record_type(&mut self, decl: TypeSpec) {
        trace!(
            package = %self.name,
            type_name = %decl.name,
            alias = decl.is_alias,
            generic = decl.has_type_params,
            "recording type"
        );
        let name = decl.name.clone();
        self.type_entry(&name).definition = Some(decl);
    }

    pub fn record_method(&mut self, decl: FuncDecl) -> Result<(), ResolutionError> {
        let receiver_type = decl
            .receiver
            .as_ref()
            .and_then(|receiver| receiver.type_expr.as_ref());

        match owning_type_name(receiver_type).map(str::to_string) {
            Ok(type_name) => {
                let receiver_name = decl.receiver.as_ref().and_then(|r| r.name.as_deref());
                trace!(
                    package = %self.name,
                    type_name = %type_name,
                    method = %decl.name,
                    receiver = receiver_name.unwrap_or("_"),
                    "recording method"
                );
                self.type_entry(&type_name)
                    .methods
                    .insert(decl.name.clone(), decl);
                Ok(())
            }
            Err(error) => {
                warn!(
                    package = %self.name,
                    method = %decl.name,
                    position = %decl.position,
                    "cannot resolve receiver: {}",
                    error
                );
                self.unresolved.push(UnresolvedMethod {
                    decl,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    // Shared by types and methods, since either can be the first mention of
    // a type name.
    fn type_entry(&mut self, name: &str) -> &mut TypeEntry {
        self.types.entry(name.to_string()).or_default()
    }

    pub fn method_count(&self) -> usize {
        self.types.values().map(|entry| entry.methods.len()).sum()
    }

    // Types that only appear as method receivers
    pub fn undeclared_count(&self) -> usize {
        self.types.values().filter(|entry| !entry.is_declared()).count()
    }
}

/// Receivers are `T` or `*T`; anything else is an error.
pub fn owning_type_name(receiver_type: Option<&TypeExpr>) -> Result<&str, ResolutionError> {
    let receiver_type = receiver_type.ok_or(ResolutionError::MissingReceiver)?;

    let named = match receiver_type {
        TypeExpr::Pointer(pointee) => pointee.as_ref(),
        other => other,
    };

    match named {
        TypeExpr::Name(name) => Ok(name.as_str()),
        TypeExpr::Pointer(_) => Err(ResolutionError::MultiplePointers(receiver_type.clone())),
        TypeExpr::Generic(_, _) => Err(ResolutionError::Generic(receiver_type.clone())),
        TypeExpr::Qualified(_, _) => Err(ResolutionError::Qualified(receiver_type.clone())),
        _ => Err(ResolutionError::NotNamed(receiver_type.clone())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::ast::{Position, Receiver, ValueSpec};
    use crate::parser::location::Location;
    use crate::parser::parser::parse;
    use crate::parser::tokenize::tokenize;

    fn position(line: u32) -> Position {
        Position {
            file: "test.go".to_string(),
            location: Location { line, col: 0 },
        }
    }

    fn name(n: &str) -> TypeExpr {
        TypeExpr::Name(n.to_string())
    }

    fn pointer(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Pointer(Box::new(inner))
    }

    fn func_at(n: &str, line: u32) -> Declaration {
        Declaration::Function(FuncDecl {
            name: n.to_string(),
            receiver: None,
            has_body: true,
            position: position(line),
        })
    }

    fn func(n: &str) -> Declaration {
        func_at(n, 0)
    }

    fn method(receiver_type: TypeExpr, n: &str) -> Declaration {
        Declaration::Function(FuncDecl {
            name: n.to_string(),
            receiver: Some(Receiver {
                name: Some("r".to_string()),
                type_expr: Some(receiver_type),
            }),
            has_body: true,
            position: position(0),
        })
    }

    fn type_decl(n: &str) -> Declaration {
        Declaration::Type(TypeSpec {
            name: n.to_string(),
            is_alias: false,
            has_type_params: false,
            definition: TypeExpr::Struct,
            position: position(0),
        })
    }

    fn constant(n: &str) -> Declaration {
        Declaration::Const(ValueSpec {
            names: vec![n.to_string()],
            position: position(0),
        })
    }

    fn method_names(package: &Package, type_name: &str) -> Vec<String> {
        let mut names: Vec<String> = package.types[type_name].methods.keys().cloned().collect();
        names.sort();
        names
    }

    #[test]
    fn test_example_package() {
        let decls = vec![
            func("F"),
            method(name("T"), "M1"),
            method(pointer(name("T")), "M2"),
            type_decl("T"),
            constant("C"),
        ];
        let package = Package::aggregate("p".to_string(), decls);

        assert_eq!(1, package.functions.len());
        assert!(package.functions.contains_key("F"));
        assert_eq!(1, package.types.len());
        assert!(package.types["T"].is_declared());
        assert_eq!(vec!["M1", "M2"], method_names(&package, "T"));
        assert!(package.unresolved.is_empty());
    }

    #[test]
    fn test_example_package_from_source() {
        let source = r#"
package p

func F() {}
func (t T) M1() {}
func (t *T) M2() {}
type T struct{}
const C = 1
"#;
        let file = parse("p.go", &tokenize(source));
        assert!(!file.has_errors());
        let package = Package::aggregate("p".to_string(), file.declarations);

        assert_eq!(vec!["F"], package.functions.keys().collect::<Vec<_>>());
        assert_eq!(vec!["T"], package.types.keys().collect::<Vec<_>>());
        assert!(package.types["T"].is_declared());
        assert_eq!(vec!["M1", "M2"], method_names(&package, "T"));
    }

    #[test]
    fn test_every_function_recorded_once() {
        let decls = vec![
            func("A"),
            func("B"),
            method(name("T"), "M"),
            method(name("U"), "M"),
            method(pointer(name("U")), "N"),
            method(pointer(pointer(name("T"))), "Bad"),
            type_decl("T"),
        ];
        let function_count = decls
            .iter()
            .filter(|decl| matches!(decl, Declaration::Function(_)))
            .count();

        let package = Package::aggregate("p".to_string(), decls);

        let recorded = package.functions.len() + package.method_count() + package.unresolved.len();
        assert_eq!(function_count, recorded);
        assert!(!package.functions.contains_key("M"));
        assert!(!package.functions.contains_key("Bad"));
        assert!(package.types.values().all(|entry| !entry.methods.contains_key("Bad")));
    }

    #[test]
    fn test_order_independence() {
        let method_first = Package::aggregate(
            "p".to_string(),
            vec![method(name("T"), "M"), type_decl("T")],
        );
        let type_first = Package::aggregate(
            "p".to_string(),
            vec![type_decl("T"), method(name("T"), "M")],
        );

        assert_eq!(method_first.types["T"], type_first.types["T"]);
        assert_eq!(method_first, type_first);
    }

    #[test]
    fn test_method_creates_type_entry() {
        let package = Package::aggregate("p".to_string(), vec![method(pointer(name("U")), "M")]);

        let entry = &package.types["U"];
        assert!(!entry.is_declared());
        assert_eq!(None, entry.definition);
        assert!(entry.methods.contains_key("M"));
    }

    #[test]
    fn test_type_without_methods() {
        let package = Package::aggregate("p".to_string(), vec![type_decl("T")]);
        assert!(package.types["T"].is_declared());
        assert!(package.types["T"].methods.is_empty());
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let package = Package::aggregate("p".to_string(), vec![func_at("F", 1), func_at("F", 9)]);
        assert_eq!(1, package.functions.len());
        assert_eq!(9, package.functions["F"].position.location.line);

        let mut package = Package::new("p".to_string());
        package.record_declaration(method(name("T"), "M"));
        package.record_declaration(method(pointer(name("T")), "M"));
        assert_eq!(1, package.types["T"].methods.len());
        let receiver = package.types["T"].methods["M"].receiver.as_ref().unwrap();
        assert_eq!(Some(pointer(name("T"))), receiver.type_expr);
    }

    #[test]
    fn test_type_redeclaration_keeps_methods() {
        let mut package = Package::new("p".to_string());
        package.record_declaration(type_decl("T"));
        package.record_declaration(method(name("T"), "M"));
        package.record_declaration(type_decl("T"));
        assert_eq!(1, package.types.len());
        assert!(package.types["T"].methods.contains_key("M"));
    }

    #[test]
    fn test_pointer_receiver_resolves_like_value_receiver() {
        let by_value = Package::aggregate("p".to_string(), vec![method(name("T"), "M")]);
        let by_pointer = Package::aggregate("p".to_string(), vec![method(pointer(name("T")), "M")]);

        assert_eq!(
            by_value.types.keys().collect::<Vec<_>>(),
            by_pointer.types.keys().collect::<Vec<_>>()
        );
        assert!(by_pointer.types["T"].methods.contains_key("M"));
    }

    #[test]
    fn test_non_functions_discarded() {
        let import = Declaration::Import(crate::parser::ast::ImportSpec {
            alias: None,
            path: "fmt".to_string(),
            position: position(0),
        });
        let var = Declaration::Var(ValueSpec {
            names: vec!["v".to_string()],
            position: position(0),
        });
        let package = Package::aggregate("p".to_string(), vec![import, constant("C"), var]);

        assert_eq!(Package::new("p".to_string()), package);
    }

    #[test]
    fn test_owning_type_name() {
        assert_eq!(Ok("T"), owning_type_name(Some(&name("T"))));
        assert_eq!(Ok("T"), owning_type_name(Some(&pointer(name("T")))));
        assert_eq!(Err(ResolutionError::MissingReceiver), owning_type_name(None));

        let double = pointer(pointer(name("T")));
        assert_eq!(
            Err(ResolutionError::MultiplePointers(double.clone())),
            owning_type_name(Some(&double))
        );

        let generic = pointer(TypeExpr::Generic(Box::new(name("List")), vec![name("T")]));
        assert_eq!(
            Err(ResolutionError::Generic(generic.clone())),
            owning_type_name(Some(&generic))
        );

        let qualified = TypeExpr::Qualified("pkg".to_string(), "T".to_string());
        assert_eq!(
            Err(ResolutionError::Qualified(qualified.clone())),
            owning_type_name(Some(&qualified))
        );

        let paren = TypeExpr::Paren(Box::new(pointer(name("T"))));
        assert_eq!(
            Err(ResolutionError::NotNamed(paren.clone())),
            owning_type_name(Some(&paren))
        );
    }

    #[test]
    fn test_unresolved_method_does_not_stop_aggregation() {
        let generic = TypeExpr::Generic(Box::new(name("List")), vec![name("T")]);
        let decls = vec![
            method(pointer(generic), "Len"),
            func("F"),
            type_decl("List"),
            method(name("List"), "Ok"),
        ];
        let package = Package::aggregate("p".to_string(), decls);

        assert_eq!(1, package.unresolved.len());
        assert_eq!("Len", package.unresolved[0].decl.name);
        assert_eq!(
            "receiver type *List[T] is a generic instantiation",
            package.unresolved[0].error.to_string()
        );
        assert!(package.functions.contains_key("F"));
        assert_eq!(vec!["Ok"], method_names(&package, "List"));
    }

    #[test]
    fn test_record_method_reports_error() {
        let mut package = Package::new("p".to_string());
        let decl = FuncDecl {
            name: "M".to_string(),
            receiver: Some(Receiver {
                name: None,
                type_expr: None,
            }),
            has_body: true,
            position: position(0),
        };
        assert_eq!(Err(ResolutionError::MissingReceiver), package.record_method(decl));
        assert!(package.types.is_empty());
        assert_eq!(1, package.unresolved.len());
    }
}
