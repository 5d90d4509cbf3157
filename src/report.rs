use std::fmt::{self, Write};

use itertools::Itertools;

use super::package::Package;
use super::parser::ast::Position;

#[derive(Debug, Default, Clone)]
pub struct ReportOptions {
    // Follow each entry with the file and line it was declared at
    pub positions: bool,
}

pub fn render_all(packages: &[Package], options: &ReportOptions) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for package in packages.iter().sorted_by(|a, b| a.name.cmp(&b.name)) {
        write_package(&mut out, package, options)?;
    }
    Ok(out)
}

#[cfg(test)]
pub fn render(package: &Package, options: &ReportOptions) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_package(&mut out, package, options)?;
    Ok(out)
}

// Names are sorted within each section so output is stable
fn write_package(f: &mut impl Write, package: &Package, options: &ReportOptions) -> fmt::Result {
    writeln!(f, "Package: {}", package.name)?;

    writeln!(f, "\nFuncs: -\n")?;
    for (name, decl) in package.functions.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)) {
        write!(f, "{}", name)?;
        write_position(f, &decl.position, options)?;
        writeln!(f)?;
    }

    writeln!(f, "\nTypes: -\n")?;
    for (name, entry) in package.types.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)) {
        write!(f, "{}", name)?;
        match &entry.definition {
            Some(definition) => write_position(f, &definition.position, options)?,
            None => write!(f, " (undeclared)")?,
        }
        writeln!(f)?;

        for (method_name, decl) in entry.methods.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)) {
            write!(f, "- {}", method_name)?;
            write_position(f, &decl.position, options)?;
            writeln!(f)?;
        }
        writeln!(f)?;
    }

    if !package.unresolved.is_empty() {
        writeln!(f, "Unresolved: -\n")?;
        let unresolved = package
            .unresolved
            .iter()
            .sorted_by(|a, b| a.decl.name.cmp(&b.decl.name));
        for method in unresolved {
            write!(f, "{}", method.decl.name)?;
            write_position(f, &method.decl.position, options)?;
            writeln!(f, ": {}", method.error)?;
        }
        writeln!(f)?;
    }

    Ok(())
}

fn write_position(f: &mut impl Write, position: &Position, options: &ReportOptions) -> fmt::Result {
    if options.positions {
        write!(f, " [{}]", position)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parser::parse;
    use crate::parser::tokenize::tokenize;

    use regex::Regex;

    fn package_from(name: &str, source: &str) -> Package {
        let tokens = tokenize(source);
        let file = parse(&format!("{}.go", name), &tokens);
        assert!(!file.has_errors(), "{:?}", file.errors);
        Package::aggregate(name.to_string(), file.declarations)
    }

    const SOURCE: &str = r#"
package shapes

import "math"

const Pi = math.Pi

func New() *Circle { return &Circle{} }
func (c *Circle) Area() float64 { return Pi * c.R * c.R }
func (c Circle) Perimeter() float64 { return 2 * Pi * c.R }
type Circle struct{ R float64 }
func (s *Square) Area() float64 { return 0 }
type Empty struct{}
func Abs(x float64) float64 { return math.Abs(x) }
"#;

    #[test]
    fn test_render_package() {
        let package = package_from("shapes", SOURCE);
        let report = render(&package, &ReportOptions::default()).unwrap();

        let expected = "Package: shapes\n\
                        \n\
                        Funcs: -\n\
                        \n\
                        Abs\n\
                        New\n\
                        \n\
                        Types: -\n\
                        \n\
                        Circle\n\
                        - Area\n\
                        - Perimeter\n\
                        \n\
                        Empty\n\
                        \n\
                        Square (undeclared)\n\
                        - Area\n\
                        \n";
        assert_eq!(expected, report);
    }

    #[test]
    fn test_render_empty_package() {
        let package = Package::new("empty".to_string());
        let report = render(&package, &ReportOptions::default()).unwrap();
        assert_eq!("Package: empty\n\nFuncs: -\n\n\nTypes: -\n\n", report);
    }

    #[test]
    fn test_render_positions() {
        let package = package_from("shapes", SOURCE);
        let options = ReportOptions { positions: true };
        let report = render(&package, &options).unwrap();

        let entry = Regex::new(r"(?m)^(- )?\w+ \[shapes\.go:\d+\]$").unwrap();
        assert_eq!(7, entry.find_iter(&report).count(), "{}", report);
        assert!(report.contains("New [shapes.go:8]\n"));
        assert!(report.contains("Circle [shapes.go:11]\n"));
        assert!(report.contains("Square (undeclared)\n"));
    }

    #[test]
    fn test_render_unresolved() {
        let source = "package list\n\ntype List[T any] struct{}\n\nfunc (l *List[T]) Len() int { return 0 }\n";
        let package = package_from("list", source);
        let report = render(&package, &ReportOptions::default()).unwrap();

        assert!(report.contains("List\n\nUnresolved: -\n\n"), "{}", report);
        assert!(report.ends_with("Len: receiver type *List[T] is a generic instantiation\n\n"));
    }

    #[test]
    fn test_render_all_sorts_packages() {
        let packages = vec![
            package_from("zeta", "package zeta\n"),
            package_from("alpha", "package alpha\n"),
        ];
        let report = render_all(&packages, &ReportOptions::default()).unwrap();

        let headers = Regex::new(r"(?m)^Package: (\w+)$").unwrap();
        let names: Vec<&str> = headers
            .captures_iter(&report)
            .map(|captures| captures.get(1).unwrap().as_str())
            .collect();
        assert_eq!(vec!["alpha", "zeta"], names);
    }
}
