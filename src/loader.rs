use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::parser::ast::{Declaration, SourceFile};
use super::parser::parser::parse;
use super::parser::tokenize::{tokenize, UnknownTokensError};


/// Reasons a package directory cannot be turned into declarations. Any of
/// these stops the whole run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{}: no such directory", .0.display())]
    NotFound(PathBuf),
    #[error("{}: not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("error listing {}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("error reading {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("no Go files in {}", .0.display())]
    NoGoFiles(PathBuf),
    // The excerpt has to follow the count, so the count is not the source
    #[error("{}: {}\n{}", .path.display(), .error, .excerpt)]
    UnknownTokens {
        path: PathBuf,
        error: UnknownTokensError,
        excerpt: String,
    },
    #[error("{}:\n{}", .path.display(), .messages.join("\n"))]
    Syntax { path: PathBuf, messages: Vec<String> },
}

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    // Leave out `_test.go` files
    pub skip_tests: bool,
}

pub struct ParsedPackage {
    pub package_name: String,
    pub files: Vec<SourceFile>,
}

impl ParsedPackage {
    pub fn declaration_count(&self) -> usize {
        self.files.iter().map(|file| file.declarations.len()).sum()
    }

    pub fn into_declarations(self) -> impl Iterator<Item = Declaration> {
        self.files.into_iter().flat_map(|file| file.declarations)
    }
}

// Parses every Go file directly inside `dir`, grouped by the name in each
// file's package clause and sorted by that name. Subdirectories are other
// packages and are not read.
pub fn load_dir(dir: &Path, options: &LoadOptions) -> Result<Vec<ParsedPackage>, SourceError> {
    if !dir.exists() {
        return Err(SourceError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }

    let paths = find_go_files(dir, options)?;
    if paths.is_empty() {
        return Err(SourceError::NoGoFiles(dir.to_path_buf()));
    }

    let mut parsed = Vec::new();
    for path in paths.iter() {
        parsed.push(parse_path(path)?);
    }

    let packages: Vec<ParsedPackage> = parsed
        .into_iter()
        .into_group_map()
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(package_name, files)| ParsedPackage {
            package_name,
            files,
        })
        .collect();

    info!(
        dir = %dir.display(),
        files = paths.len(),
        packages = packages.len(),
        "loaded package directory"
    );
    Ok(packages)
}

fn find_go_files(dir: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>, SourceError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| SourceError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || !is_go_file(path) {
            continue;
        }
        if options.skip_tests && is_test_file(path) {
            debug!(file = %path.display(), "skipping test file");
            continue;
        }
        paths.push(path.to_path_buf());
    }
    Ok(paths)
}

fn is_go_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "go")
}

fn is_test_file(path: &Path) -> bool {
    file_name(path).ends_with("_test.go")
}

fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

// Returns the file's package name along with its declarations
fn parse_path(path: &Path) -> Result<(String, SourceFile), SourceError> {
    let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let tokens = tokenize(&contents);
    if let Err(error) = tokens.get_error() {
        let excerpt = tokens
            .display_unknown()
            .iter()
            .map(|selection| selection.render_selection(&contents))
            .join("\n");
        return Err(SourceError::UnknownTokens {
            path: path.to_path_buf(),
            error,
            excerpt,
        });
    }

    let file = parse(&file_name(path), &tokens);
    if file.has_errors() {
        return Err(SourceError::Syntax {
            path: path.to_path_buf(),
            messages: file.errors,
        });
    }

    // The parser reports a missing package clause as a syntax error
    let package_name = file.package_name.clone().unwrap_or_default();
    debug!(
        file = %path.display(),
        package = %package_name,
        declarations = file.declarations.len(),
        comments = tokens.comments.len(),
        "parsed file"
    );
    Ok((package_name, file))
}
