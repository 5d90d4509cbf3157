use std::io::{self, Write};
use std::process;

use argparse::{ArgumentParser, Store, StoreTrue};
use tracing::Level;

pub struct Args {
    pub pkg: String,
    pub skip_tests: bool,
    pub positions: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Args {
    pub fn new() -> Self {
        Args {
            pkg: String::new(),
            skip_tests: false,
            positions: false,
            verbose: false,
            quiet: false,
        }
    }

    // Parse CLI arguments. This may exit.
    pub fn parse() -> Self {
        let argv: Vec<String> = std::env::args().collect();
        match Args::parse_from(argv, &mut io::stdout(), &mut io::stderr()) {
            Ok(args) => args,
            Err(code) => process::exit(code),
        }
    }

    // On failure, returns the exit code to use. A code of 0 means --help
    // was printed.
    pub fn parse_from(
        argv: Vec<String>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Self, i32> {
        let program = argv
            .first()
            .cloned()
            .unwrap_or_else(|| "gopkgdecls".to_string());
        let mut args = Args::new();

        {
            let ap = argument_parser(&mut args);
            ap.parse(argv, stdout, stderr)?;
        }

        if args.pkg.is_empty() {
            let mut defaults = Args::new();
            let _ = argument_parser(&mut defaults).print_usage(&program, stderr);
            let _ = writeln!(stderr, "--pkg argument is required");
            return Err(1);
        }

        Ok(args)
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}

fn argument_parser(args: &mut Args) -> ArgumentParser<'_> {
    let mut ap = ArgumentParser::new();
    ap.set_description("List the functions, types, and methods declared by a Go package");
    ap.refer(&mut args.pkg)
        .add_option(&["-p", "--pkg"], Store, "path to the package directory");
    ap.refer(&mut args.skip_tests)
        .add_option(&["--skip-tests"], StoreTrue, "Ignore _test.go files");
    ap.refer(&mut args.positions).add_option(
        &["--positions"],
        StoreTrue,
        "Show the file and line of each declaration",
    );
    ap.refer(&mut args.verbose)
        .add_option(&["-v", "--verbose"], StoreTrue, "Log what is being read");
    ap.refer(&mut args.quiet)
        .add_option(&["-q", "--quiet"], StoreTrue, "Only log errors");
    ap
}
