use std::cmp::{min, Ord, Ordering, PartialOrd};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub col: u32,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Location,
    pub end: Location,
}

// Used to describe a part of a file that should be shown
#[derive(Debug)]
pub struct DisplaySelection {
    // Region of text to highlight
    pub highlight: Region,
    // How many lines before and after to also render
    context: u32,
}

impl Location {
    pub fn new() -> Self {
        Self { col: 0, line: 0 }
    }

    pub fn update(&self, c: char) -> Self {
        let mut new_location = *self;
        if c == '\n' {
            new_location.line += 1;
            new_location.col = 0;
        } else {
            new_location.col += 1;
        }
        new_location
    }

    // Line number as editors show it
    pub fn display_line(&self) -> u32 {
        self.line + 1
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.display_line(), self.col + 1)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl Region {
    pub fn new(start: Location, end: Location) -> Self {
        Region { start, end }
    }

    // Highlights at most the rest of the starting line; tokens that span
    // lines (raw strings, block comments) are cut off there.
    pub fn for_word(start: Location, text: &str) -> Self {
        let length = text.chars().take_while(|c| *c != '\n').count().max(1);
        let end = Location {
            line: start.line,
            col: start.col + (length as u32),
        };
        Region::new(start, end)
    }

    pub fn to_display_selection(self, context: u32) -> DisplaySelection {
        DisplaySelection::new(self, context)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} to {}", self.start, self.end)
    }
}

impl DisplaySelection {
    pub fn new(highlight: Region, context: u32) -> Self {
        DisplaySelection { highlight, context }
    }

    pub fn render_selection(&self, file: &str) -> String {
        let lines: Vec<&str> = file.lines().collect();
        if lines.is_empty() {
            return String::new();
        }
        let last_line = lines.len() as u32 - 1;

        let mut result = String::new();

        let start = min(self.highlight.start.line, last_line);
        for line in (start - min(start, self.context))..start {
            result += lines[line as usize];
            result += "\n";
        }

        // The highlight is always on a single line
        result += lines[start as usize];
        result += "\n";
        for _ in 0..self.highlight.start.col {
            result += " ";
        }
        for _ in self.highlight.start.col..self.highlight.end.col {
            result += "^";
        }
        result += "\n";

        let context_end = min(start + self.context, last_line);
        for line in (start + 1)..=context_end {
            result += lines[line as usize];
            result += "\n";
        }

        result
    }
}

impl fmt::Display for DisplaySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.highlight)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EXAMPLE_FILE: &str = r#"
package main

import "fmt"

func main() {
	a, b := 1, 0
	for a < 200 {
		fmt.Println(a)
		a, b = a+b, a
	}
}
"#;

    // Clean up leading newline
    fn trim(text: &str) -> &str {
        let to_trim: &[_] = &['\n'];
        text.trim_start_matches(to_trim)
    }

    #[test]
    fn test_render_selection_word() {
        let start = Location { line: 6, col: 1 };
        let region = Region::for_word(start, "for");
        let selection = region.to_display_selection(2);

        let result = selection.render_selection(trim(EXAMPLE_FILE));

        let expected = "func main() {\n\
                        \ta, b := 1, 0\n\
                        \tfor a < 200 {\n \
                        ^^^\n\
                        \t\tfmt.Println(a)\n\
                        \t\ta, b = a+b, a\n";

        assert_eq!(expected, result);
    }

    #[test]
    fn test_render_selection_at_file_edges() {
        let region = Region::for_word(Location::new(), "package");
        let result = region.to_display_selection(1).render_selection("package main\n");
        assert_eq!("package main\n^^^^^^^\n", result);
    }

    #[test]
    fn test_multiline_word_is_cut_at_newline() {
        let region = Region::for_word(Location { line: 2, col: 4 }, "`abc\ndef");
        assert_eq!(Location { line: 2, col: 8 }, region.end);
    }

    #[test]
    fn test_display() {
        let location = Location { line: 0, col: 0 }.update('a').update('\n').update('b');
        assert_eq!(Location { line: 1, col: 1 }, location);
        assert_eq!("line 2, column 2", location.to_string());
    }

    #[test]
    fn test_ordering() {
        let l0c0 = Location { line: 0, col: 0 };
        let l0c3 = Location { line: 0, col: 3 };
        let l2c0 = Location { line: 2, col: 0 };

        use Ordering::*;

        assert_eq!(Equal, l0c0.cmp(&l0c0));
        assert_eq!(Less, l0c0.cmp(&l0c3));
        assert_eq!(Less, l0c3.cmp(&l2c0));
        assert_eq!(Greater, l2c0.cmp(&l0c3));
    }
}
