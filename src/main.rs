use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use tracing::{debug, Level};

mod args;
mod loader;
mod package;
mod parser;
mod report;

use args::Args;
use loader::LoadOptions;
use package::Package;
use report::ReportOptions;

fn main() {
    let args = Args::parse();
    init_logging(args.log_level());

    if let Err(error) = run(&args) {
        eprintln!("{:#}", error);
        process::exit(1);
    }
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let load_options = LoadOptions {
        skip_tests: args.skip_tests,
    };
    let report_options = ReportOptions {
        positions: args.positions,
    };
    let report = build_report(Path::new(&args.pkg), &load_options, &report_options)?;
    print!("{}", report);
    Ok(())
}

// Nothing is rendered unless every file parsed
fn build_report(
    dir: &Path,
    load_options: &LoadOptions,
    report_options: &ReportOptions,
) -> Result<String> {
    let parsed = loader::load_dir(dir, load_options)
        .with_context(|| format!("cannot read package directory {}", dir.display()))?;

    let packages: Vec<Package> = parsed
        .into_iter()
        .map(|parsed_package| {
            debug!(
                package = %parsed_package.package_name,
                files = parsed_package.files.len(),
                declarations = parsed_package.declaration_count(),
                "aggregating"
            );
            let name = parsed_package.package_name.clone();
            let package = Package::aggregate(name, parsed_package.into_declarations());
            debug!(
                package = %package.name,
                functions = package.functions.len(),
                types = package.types.len(),
                undeclared_types = package.undeclared_count(),
                methods = package.method_count(),
                unresolved = package.unresolved.len(),
                "aggregated"
            );
            package
        })
        .collect();

    let report = report::render_all(&packages, report_options)?;
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut tmp_file = File::create(dir.join(name)).unwrap();
        write!(tmp_file, "{}", contents).unwrap();
    }

    const LIST: &str = r#"
package list

func (l *List) Push(v int) { l.items = append(l.items, v) }

func New() *List { return &List{} }

type List struct {
	items []int
}

func (l List) Len() int { return len(l.items) }
"#;

    const LIST_TEST: &str = r#"
package list

import "testing"

func TestPush(t *testing.T) {}
"#;

    #[test]
    fn test_report_for_directory() {
        let tmp_dir = tempdir::TempDir::new("gopkgdecls-tests").unwrap();
        write_file(tmp_dir.path(), "list.go", LIST);
        write_file(tmp_dir.path(), "list_test.go", LIST_TEST);

        let report = build_report(
            tmp_dir.path(),
            &LoadOptions::default(),
            &ReportOptions::default(),
        )
        .unwrap();

        let expected = "Package: list\n\
                        \n\
                        Funcs: -\n\
                        \n\
                        New\n\
                        TestPush\n\
                        \n\
                        Types: -\n\
                        \n\
                        List\n\
                        - Len\n\
                        - Push\n\
                        \n";
        assert_eq!(expected, report);

        let options = LoadOptions { skip_tests: true };
        let report = build_report(tmp_dir.path(), &options, &ReportOptions::default()).unwrap();
        assert!(!report.contains("TestPush"), "{}", report);
    }

    #[test]
    fn test_broken_file_means_no_report() {
        let tmp_dir = tempdir::TempDir::new("gopkgdecls-tests").unwrap();
        write_file(tmp_dir.path(), "list.go", LIST);
        write_file(tmp_dir.path(), "zz_broken.go", "package list\n\ntype = int\n");

        let error = build_report(
            tmp_dir.path(),
            &LoadOptions::default(),
            &ReportOptions::default(),
        )
        .unwrap_err();

        let message = format!("{:#}", error);
        assert!(message.starts_with("cannot read package directory "), "{}", message);
        assert!(message.contains("zz_broken.go:\nline 3, column 6"), "{}", message);
        assert!(!message.contains("Package:"), "{}", message);
    }
}
