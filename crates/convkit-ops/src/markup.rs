//! CSS and SQL formatting.
//!
//! Both are whitespace rewriters, not parsers: they never reject input and
//! never reorder tokens.

use convkit_core::{Descriptor, FieldSpec, InputKind, Operation, OptionsExt, Registry};

const CSS_CATEGORY: &str = "css-tools";
const SQL_CATEGORY: &str = "database-tools";

pub(crate) fn register(registry: &mut Registry) {
    registry.register(Operation::text(
        Descriptor::new("css-minify", "CSS Minifier", CSS_CATEGORY)
            .description("Minify CSS by removing whitespace and comments")
            .tags(["css", "minify", "compress"])
            .input_kind(InputKind::Multiline)
            .placeholder("Enter your CSS code here...")
            .input_label("CSS Input")
            .output_label("Minified CSS"),
        |input, _| Ok(minify_css(input)),
    ));

    registry.register(Operation::text(
        Descriptor::new("css-format", "CSS Formatter", CSS_CATEGORY)
            .description("Format and beautify CSS code")
            .tags(["css", "format", "beautify"])
            .input_kind(InputKind::Multiline)
            .placeholder("Enter your minified CSS here...")
            .input_label("CSS Input")
            .output_label("Formatted CSS")
            .field(
                FieldSpec::range("indentSize", "Indent Size", 2..=8, 2)
                    .description("Number of spaces for indentation"),
            ),
        |input, opts| {
            let indent = " ".repeat(opts.int_in("indentSize", 2, 2..=8) as usize);
            Ok(format_css(input, &indent))
        },
    ));

    registry.register(Operation::text(
        Descriptor::new("sql-format", "SQL Formatter", SQL_CATEGORY)
            .description("Format and beautify SQL queries")
            .tags(["sql", "format", "database"])
            .input_kind(InputKind::Multiline)
            .placeholder("Enter your SQL query here...")
            .input_label("SQL Input")
            .output_label("Formatted SQL")
            .field(
                FieldSpec::checkbox("uppercase", "Uppercase Keywords", true)
                    .description("Convert SQL keywords to uppercase"),
            ),
        |input, opts| Ok(format_sql(input, opts.bool_or("uppercase", true))),
    ));
}

// ============================================
// CSS
// ============================================

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            // Unterminated comments run to end of input.
            None => rest = "",
        }
    }
    out.push_str(rest);
    out
}

fn is_css_punct(c: char) -> bool {
    matches!(c, '{' | '}' | ':' | ';' | ',' | '>' | '+' | '~')
}

fn minify_css(input: &str) -> String {
    let source = strip_comments(input);
    let mut out = String::with_capacity(source.len());
    let mut pending_space = false;

    for c in source.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !is_css_punct(c) && !out.ends_with(is_css_punct) && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        if c == '}' && out.ends_with(';') {
            out.pop();
        }
        out.push(c);
    }
    out
}

fn format_css(input: &str, indent: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    let mut depth = 0usize;

    for token in split_keep(input, |c| matches!(c, '{' | '}' | ':' | ';')) {
        let token = token.trim();
        match token {
            "" => {}
            "{" => {
                out.push_str(" {\n");
                depth += 1;
                out.push_str(&indent.repeat(depth));
            }
            "}" => {
                depth = depth.saturating_sub(1);
                let trimmed = out.trim_end().len();
                out.truncate(trimmed);
                out.push('\n');
                out.push_str(&indent.repeat(depth));
                out.push_str("}\n");
                out.push_str(&indent.repeat(depth));
            }
            ";" => {
                out.push_str(";\n");
                out.push_str(&indent.repeat(depth));
            }
            ":" => out.push_str(": "),
            text => {
                if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
    }

    out.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on single-char delimiters, yielding delimiters as their own tokens.
fn split_keep(input: &str, is_delim: impl Fn(char) -> bool) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if is_delim(c) {
            tokens.push(&input[start..i]);
            tokens.push(&input[i..i + c.len_utf8()]);
            start = i + c.len_utf8();
        }
    }
    tokens.push(&input[start..]);
    tokens
}

// ============================================
// SQL
// ============================================

const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "ON",
    "AND", "OR", "NOT", "IN", "EXISTS", "BETWEEN", "LIKE", "IS", "NULL", "INSERT", "INTO",
    "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "TABLE", "ALTER", "DROP", "INDEX", "PRIMARY",
    "KEY", "FOREIGN", "REFERENCES", "GROUP", "BY", "HAVING", "ORDER", "ASC", "DESC", "LIMIT",
    "OFFSET", "UNION", "ALL", "DISTINCT", "AS", "CASE", "WHEN", "THEN", "ELSE", "END",
];

const JOIN_MODIFIERS: &[&str] = &["INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS"];

#[derive(Debug, PartialEq)]
enum SqlToken<'a> {
    Word(&'a str),
    Quoted(&'a str),
    Punct(char),
    Space,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize_sql(input: &str) -> Vec<SqlToken<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            tokens.push(SqlToken::Space);
        } else if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some((i, c)) = chars.next_if(|(_, c)| is_word_char(*c)) {
                end = i + c.len_utf8();
            }
            tokens.push(SqlToken::Word(&input[start..end]));
        } else if c == '\'' || c == '"' || c == '`' {
            let mut end = input.len();
            for (i, next) in chars.by_ref() {
                if next == c {
                    end = i + next.len_utf8();
                    break;
                }
            }
            tokens.push(SqlToken::Quoted(&input[start..end]));
        } else {
            tokens.push(SqlToken::Punct(c));
        }
    }
    tokens
}

fn word_at<'a>(tokens: &[SqlToken<'a>], index: usize) -> Option<&'a str> {
    match tokens.get(index) {
        Some(SqlToken::Word(w)) => Some(*w),
        _ => None,
    }
}

/// Nearest word before `index`, skipping whitespace.
fn prev_word<'a>(tokens: &[SqlToken<'a>], index: usize) -> Option<&'a str> {
    tokens[..index]
        .iter()
        .rev()
        .find(|t| **t != SqlToken::Space)
        .and_then(|t| match t {
            SqlToken::Word(w) => Some(*w),
            _ => None,
        })
}

/// Nearest word after `index`, skipping whitespace.
fn next_word<'a>(tokens: &[SqlToken<'a>], index: usize) -> Option<&'a str> {
    tokens[index + 1..]
        .iter()
        .find(|t| **t != SqlToken::Space)
        .and_then(|t| match t {
            SqlToken::Word(w) => Some(*w),
            _ => None,
        })
}

fn is_any(word: &str, set: &[&str]) -> bool {
    set.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Whether the word at `index` begins a clause that goes on its own line.
fn starts_clause(tokens: &[SqlToken<'_>], index: usize) -> bool {
    let Some(word) = word_at(tokens, index) else {
        return false;
    };
    let prev_is_modifier = prev_word(tokens, index).is_some_and(|w| is_any(w, JOIN_MODIFIERS));

    if is_any(word, &["FROM", "WHERE", "HAVING"]) {
        true
    } else if is_any(word, &["ORDER", "GROUP"]) {
        next_word(tokens, index).is_some_and(|w| w.eq_ignore_ascii_case("BY"))
    } else if word.eq_ignore_ascii_case("JOIN") {
        !prev_is_modifier
    } else if is_any(word, JOIN_MODIFIERS) {
        !prev_is_modifier
            && next_word(tokens, index)
                .is_some_and(|w| w.eq_ignore_ascii_case("JOIN") || is_any(w, JOIN_MODIFIERS))
    } else {
        false
    }
}

/// One select-list item per line and each major clause on its own line.
fn format_sql(input: &str, uppercase: bool) -> String {
    let tokens = tokenize_sql(input);
    let mut out = String::with_capacity(input.len() + 16);

    for (index, token) in tokens.iter().enumerate() {
        match token {
            SqlToken::Space => {
                if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                    out.push(' ');
                }
            }
            SqlToken::Punct(',') => {
                out.truncate(out.trim_end_matches(' ').len());
                out.push_str(",\n  ");
            }
            SqlToken::Punct(c) => out.push(*c),
            SqlToken::Quoted(text) => out.push_str(text),
            SqlToken::Word(word) => {
                if starts_clause(&tokens, index) && !out.is_empty() {
                    out.truncate(out.trim_end().len());
                    out.push('\n');
                }
                if uppercase && is_any(word, SQL_KEYWORDS) {
                    out.push_str(&word.to_ascii_uppercase());
                } else {
                    out.push_str(word);
                }
            }
        }
    }

    out.trim().to_string()
}
