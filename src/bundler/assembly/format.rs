//! Source re-indentation for the assembled artifact.
//!
//! Indentation is recomputed from bracket nesting with one tab per level.
//! Lines that start inside a template literal, string continuation or block
//! comment are copied verbatim, since their leading whitespace is content.
//! Runs of blank lines collapse to a single blank line.

/// Reformats `text`. Idempotent: `format(&format(x)) == format(x)`.
pub fn format(text: &str) -> String {
    let mut scanner = Scanner::default();
    let mut out: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');

        if scanner.mode.is_verbatim() {
            scanner.scan_line(raw);
            out.push(raw.to_string());
            previous_blank = false;
            continue;
        }

        let content = raw.trim_start();
        let indent = scanner.depth.saturating_sub(leading_closers(content));
        scanner.scan_line(content);

        // Trailing whitespace belongs to the string when the line ends inside one.
        let content = if scanner.mode.is_verbatim() {
            content
        } else {
            content.trim_end()
        };

        if content.is_empty() {
            if !previous_blank {
                out.push(String::new());
            }
            previous_blank = true;
            continue;
        }

        out.push(format!("{}{}", "\t".repeat(indent), content));
        previous_blank = false;
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    let mut formatted = out.join("\n");
    formatted.push('\n');
    formatted
}

/// Counts closing brackets at the start of a trimmed line.
fn leading_closers(content: &str) -> usize {
    content
        .chars()
        .take_while(|c| matches!(c, '}' | ']' | ')') || c.is_whitespace())
        .filter(|c| !c.is_whitespace())
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Code,
    Str(char),
    Template,
    BlockComment,
    Regex {
        in_class: bool,
    },
}

impl Mode {
    fn is_verbatim(self) -> bool {
        matches!(self, Mode::Str(_) | Mode::Template | Mode::BlockComment)
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "do", "else", "in", "of", "new", "delete", "void",
    "throw", "yield", "await",
];

/// Lexical state carried across lines.
#[derive(Debug, Default)]
struct Scanner {
    mode: Mode,
    depth: usize,
    /// Depths at which `${` substitutions were opened inside template literals.
    substitutions: Vec<usize>,
    last_significant: Option<char>,
    last_word: String,
    in_word: bool,
}

impl Scanner {
    fn scan_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        self.in_word = false;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            match self.mode {
                Mode::Code => match c {
                    '/' if next == Some('/') => return,
                    '/' if next == Some('*') => {
                        self.mode = Mode::BlockComment;
                        i += 1;
                    }
                    '/' if self.regex_allowed() => self.mode = Mode::Regex { in_class: false },
                    '\'' | '"' => self.mode = Mode::Str(c),
                    '`' => self.mode = Mode::Template,
                    '{' | '[' | '(' => {
                        self.depth += 1;
                        self.significant(c);
                    }
                    '}' if self.substitutions.last() == Some(&self.depth) => {
                        self.substitutions.pop();
                        self.depth = self.depth.saturating_sub(1);
                        self.mode = Mode::Template;
                    }
                    '}' | ']' | ')' => {
                        self.depth = self.depth.saturating_sub(1);
                        self.significant(c);
                    }
                    c if c.is_whitespace() => self.in_word = false,
                    c => self.significant(c),
                },
                Mode::Str(quote) => match c {
                    '\\' => i += 1,
                    c if c == quote => self.close_literal(),
                    _ => {}
                },
                Mode::Template => match c {
                    '\\' => i += 1,
                    '`' => self.close_literal(),
                    '$' if next == Some('{') => {
                        self.depth += 1;
                        self.substitutions.push(self.depth);
                        self.mode = Mode::Code;
                        self.last_significant = Some('{');
                        self.last_word.clear();
                        self.in_word = false;
                        i += 1;
                    }
                    _ => {}
                },
                Mode::BlockComment => {
                    if c == '*' && next == Some('/') {
                        self.mode = Mode::Code;
                        i += 1;
                    }
                }
                Mode::Regex { in_class } => match c {
                    '\\' => i += 1,
                    '[' => self.mode = Mode::Regex { in_class: true },
                    ']' => self.mode = Mode::Regex { in_class: false },
                    '/' if !in_class => self.close_literal(),
                    _ => {}
                },
            }
            i += 1;
        }

        // An unterminated regex cannot span lines.
        if matches!(self.mode, Mode::Regex { .. }) {
            self.close_literal();
        }
    }

    fn significant(&mut self, c: char) {
        if is_word_char(c) {
            if !self.in_word {
                self.last_word.clear();
            }
            self.last_word.push(c);
            self.in_word = true;
        } else {
            self.last_word.clear();
            self.in_word = false;
        }
        self.last_significant = Some(c);
    }

    /// A closed literal behaves like an operand.
    fn close_literal(&mut self) {
        self.mode = Mode::Code;
        self.last_significant = Some(')');
        self.last_word.clear();
        self.in_word = false;
    }

    fn regex_allowed(&self) -> bool {
        match self.last_significant {
            None => true,
            Some(c) if is_word_char(c) => {
                REGEX_KEYWORDS.contains(&self.last_word.as_str())
            }
            Some(')' | ']' | '}') => false,
            Some(_) => true,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
