//! Instruction model and the Dockerfile lexer that produces it.
//!
//! Only the instructions that carry documentation (`ARG`, `ENV`, `LABEL`,
//! `EXPOSE`) are kept. Every other instruction still takes part in comment
//! bookkeeping: it consumes the comment run above it, so a comment block
//! sitting on top of `RUN` never leaks onto a later `ENV`.
//!
//! Comment rules follow BuildKit:
//! - a comment run is the set of `#` lines directly above an instruction
//! - a blank line ends the run
//! - comments and blank lines inside a line continuation are skipped
//! - `# escape=` and `# syntax=` directives are only recognized at the top
//! - heredoc bodies of `RUN`, `COPY` and `ADD` are not instructions

use crate::types::ItemType;
use crate::words::{split_words, unquote};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::trace;

const DEFAULT_ESCAPE: char = '\\';
const BYTE_ORDER_MARK: char = '\u{feff}';
const HEREDOC_INSTRUCTIONS: [&str; 3] = ["RUN", "COPY", "ADD"];

static HEREDOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<<(-?)["']?([A-Za-z_][A-Za-z0-9_]*)["']?"#).expect("heredoc pattern is valid")
});

/// One `key[=value]` argument as written in the Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArg {
    pub key: String,
    pub value: Option<String>,
}

impl RawArg {
    fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A recognized instruction with its raw arguments and the comment lines
/// immediately preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub kind: ItemType,
    pub args: Vec<RawArg>,
    pub preceding_comments: Vec<String>,
    /// Index of the instruction among all instructions of the file,
    /// including the ones that are not kept.
    pub position: usize,
    /// 1-based line where the instruction starts.
    pub line: usize,
}

/// Lexes Dockerfile text into the flat, source-ordered instruction list.
///
/// Instructions from all build stages end up in the same sequence.
pub fn parse_instructions(content: &str) -> Vec<Instruction> {
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
    let lines: Vec<&str> = content.lines().collect();
    let (escape, mut index) = read_directives(&lines);

    let mut instructions = Vec::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut position = 0;

    while index < lines.len() {
        let trimmed = lines[index].trim();

        if trimmed.is_empty() {
            pending_comments.clear();
            index += 1;
            continue;
        }

        if trimmed.starts_with('#') {
            pending_comments.push(trimmed.to_string());
            index += 1;
            continue;
        }

        let start_line = index + 1;
        let (logical, next_index) = join_continuation(&lines, index, escape);
        index = next_index;

        let comments = std::mem::take(&mut pending_comments);
        let current_position = position;
        position += 1;

        let (keyword, rest) = split_keyword(&logical);
        if HEREDOC_INSTRUCTIONS
            .iter()
            .any(|name| keyword.eq_ignore_ascii_case(name))
        {
            index = skip_heredoc_bodies(&lines, index, rest);
        }

        let Ok(kind) = ItemType::from_str(keyword) else {
            trace!(keyword, line = start_line, "skipping undocumented instruction");
            continue;
        };

        let args = match kind {
            ItemType::Arg => parse_arg_args(rest, escape),
            ItemType::Env | ItemType::Label => parse_key_value_args(rest, escape),
            ItemType::Expose => parse_expose_args(rest, escape),
        };

        instructions.push(Instruction {
            kind,
            args,
            preceding_comments: comments,
            position: current_position,
            line: start_line,
        });
    }

    instructions
}

/// Reads leading parser directives and returns the escape character plus
/// the index of the first line after the directive block.
fn read_directives(lines: &[&str]) -> (char, usize) {
    let mut escape = DEFAULT_ESCAPE;
    let mut index = 0;

    while index < lines.len() {
        let Some(body) = lines[index].trim().strip_prefix('#') else {
            break;
        };
        let Some((key, value)) = body.split_once('=') else {
            break;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() || key.contains(char::is_whitespace) {
            break;
        }

        match key.as_str() {
            "escape" => match value.trim() {
                "`" => escape = '`',
                "\\" => escape = '\\',
                other => trace!(value = other, "ignoring unsupported escape directive"),
            },
            "syntax" | "check" => {}
            _ => break,
        }
        index += 1;
    }

    (escape, index)
}

/// Joins a logical line starting at `start`, following continuations.
fn join_continuation(lines: &[&str], start: usize, escape: char) -> (String, usize) {
    let mut logical = String::new();
    let mut index = start;

    loop {
        let line = lines[index].trim_end();
        index += 1;

        match line.strip_suffix(escape) {
            Some(head) => {
                logical.push_str(head);
                while index < lines.len() {
                    let next = lines[index].trim();
                    if next.is_empty() || next.starts_with('#') {
                        index += 1;
                    } else {
                        break;
                    }
                }
                if index >= lines.len() {
                    break;
                }
            }
            None => {
                logical.push_str(line);
                break;
            }
        }
    }

    (logical, index)
}

/// Skips the bodies of the heredocs opened in `rest`, in order, and returns
/// the index of the first line after the last terminator.
fn skip_heredoc_bodies(lines: &[&str], mut index: usize, rest: &str) -> usize {
    for heredoc in HEREDOC.captures_iter(rest) {
        let strip_tabs = !heredoc[1].is_empty();
        let word = &heredoc[2];
        while index < lines.len() {
            let line = lines[index].trim_end_matches('\r');
            let line = if strip_tabs {
                line.trim_start_matches('\t')
            } else {
                line
            };
            index += 1;
            if line == word {
                break;
            }
        }
    }
    index
}

fn split_keyword(logical: &str) -> (&str, &str) {
    let trimmed = logical.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(end) => (&trimmed[..end], trimmed[end..].trim()),
        None => (trimmed, ""),
    }
}

fn parse_arg_args(rest: &str, escape: char) -> Vec<RawArg> {
    split_words(rest, escape)
        .into_iter()
        .map(|word| match word.split_once('=') {
            Some((key, value)) => RawArg::new(key, Some(value.to_string())),
            None => RawArg::new(word, None),
        })
        .collect()
}

/// Handles both `KEY=value ...` and the legacy `KEY value with spaces` form
/// shared by `ENV` and `LABEL`.
fn parse_key_value_args(rest: &str, escape: char) -> Vec<RawArg> {
    let words = split_words(rest, escape);
    let Some(first) = words.first() else {
        return Vec::new();
    };

    if first.contains('=') {
        return words
            .into_iter()
            .map(|word| match word.split_once('=') {
                Some((key, value)) => RawArg::new(key, Some(value.to_string())),
                None => RawArg::new(word, None),
            })
            .collect();
    }

    let remainder = rest
        .find(char::is_whitespace)
        .map(|end| rest[end..].trim())
        .unwrap_or("");
    let value = if remainder.is_empty() {
        None
    } else {
        Some(unquote(remainder).to_string())
    };
    vec![RawArg::new(first.clone(), value)]
}

fn parse_expose_args(rest: &str, escape: char) -> Vec<RawArg> {
    split_words(rest, escape)
        .into_iter()
        .map(|token| RawArg::new(token.clone(), Some(token)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(instruction: &Instruction) -> Vec<&str> {
        instruction.args.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn test_recognized_instructions_only() {
        let instructions = parse_instructions(
            "FROM alpine\nRUN echo hi\nARG A\nenv B=1\nLabel c=d\nEXPOSE 80\nCMD [\"x\"]\n",
        );
        let kinds: Vec<ItemType> = instructions.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ItemType::Arg, ItemType::Env, ItemType::Label, ItemType::Expose]
        );
        assert_eq!(instructions[0].position, 2);
        assert_eq!(instructions[0].line, 3);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let instructions = parse_instructions("\u{feff}ARG BASE=alpine\nFROM ${BASE}\nARG B\n");
        let names: Vec<&str> = instructions.iter().flat_map(keys).collect();
        assert_eq!(names, vec!["BASE", "B"]);

        let instructions = parse_instructions("\u{feff}# @description: Base image\nARG BASE=alpine\n");
        assert_eq!(
            instructions[0].preceding_comments,
            vec!["# @description: Base image"]
        );
    }

    #[test]
    fn test_heredoc_bodies_are_skipped() {
        let content = "FROM alpine\n\
            RUN <<EOF\n\
            # @description: not a magic comment\n\
            ENV INSIDE=1\n\
            EOF\n\
            # @description: real\n\
            ENV OUTSIDE=1\n";
        let instructions = parse_instructions(content);
        assert_eq!(instructions.len(), 1);
        assert_eq!(keys(&instructions[0]), vec!["OUTSIDE"]);
        assert_eq!(instructions[0].preceding_comments, vec!["# @description: real"]);
    }

    #[test]
    fn test_multiple_and_indented_heredocs() {
        let content = "COPY <<-\"A\" /a <<B /b\n\tARG IN_A\n\tA\nARG IN_B\nB\nARG AFTER\n";
        let instructions = parse_instructions(content);
        assert_eq!(instructions.len(), 1);
        assert_eq!(keys(&instructions[0]), vec!["AFTER"]);
    }

    #[test]
    fn test_shift_operator_is_not_a_heredoc() {
        let instructions = parse_instructions("RUN echo $((1<<2))\nARG A\n");
        assert_eq!(keys(&instructions[0]), vec!["A"]);
    }

    #[test]
    fn test_comments_attach_to_next_instruction() {
        let instructions = parse_instructions("# one\n# two\nARG A\n");
        assert_eq!(instructions[0].preceding_comments, vec!["# one", "# two"]);
    }

    #[test]
    fn test_blank_line_breaks_comment_run() {
        let instructions = parse_instructions("# detached\n\n# attached\nARG A\n");
        assert_eq!(instructions[0].preceding_comments, vec!["# attached"]);
    }

    #[test]
    fn test_other_instruction_consumes_comments() {
        let instructions = parse_instructions("# for run\nRUN true\nENV A=1\n");
        assert!(instructions[0].preceding_comments.is_empty());
    }

    #[test]
    fn test_line_continuation_skips_inner_comments() {
        let instructions =
            parse_instructions("ENV A=1 \\\n    # inner comment\n    B=2 \\\n\n    C=3\nARG D\n");
        assert_eq!(instructions.len(), 2);
        assert_eq!(keys(&instructions[0]), vec!["A", "B", "C"]);
        assert_eq!(instructions[1].line, 6);
    }

    #[test]
    fn test_escape_directive() {
        let instructions = parse_instructions("# escape=`\nFROM scratch\nENV A=1 `\n  B=2\n");
        assert_eq!(keys(&instructions[0]), vec!["A", "B"]);
        assert!(instructions[0].preceding_comments.is_empty());
    }

    #[test]
    fn test_directive_not_collected_as_comment() {
        let instructions = parse_instructions("# syntax=docker/dockerfile:1\nARG A\n");
        assert!(instructions[0].preceding_comments.is_empty());
    }

    #[test]
    fn test_legacy_env_form() {
        let instructions = parse_instructions("ENV GREETING hello brave world\n");
        assert_eq!(
            instructions[0].args,
            vec![RawArg::new("GREETING", Some("hello brave world".to_string()))]
        );
    }

    #[test]
    fn test_label_quotes_stripped() {
        let instructions =
            parse_instructions(r#"LABEL "com.example.vendor"="ACME" version="1.0 rc""#);
        assert_eq!(
            instructions[0].args,
            vec![
                RawArg::new("com.example.vendor", Some("ACME".to_string())),
                RawArg::new("version", Some("1.0 rc".to_string())),
            ]
        );
    }

    #[test]
    fn test_arg_with_and_without_default() {
        let instructions = parse_instructions("ARG A=1 B\n");
        assert_eq!(
            instructions[0].args,
            vec![RawArg::new("A", Some("1".to_string())), RawArg::new("B", None)]
        );
    }

    #[test]
    fn test_expose_tokens_keep_protocol() {
        let instructions = parse_instructions("EXPOSE 80 443/tcp 53/udp\n");
        assert_eq!(keys(&instructions[0]), vec!["80", "443/tcp", "53/udp"]);
        assert_eq!(instructions[0].args[2].value.as_deref(), Some("53/udp"));
    }

    #[test]
    fn test_multi_stage_is_flattened() {
        let instructions = parse_instructions(
            "FROM golang AS build\nARG GO_VERSION\nFROM alpine\nARG APP_HOME=/app\n",
        );
        assert_eq!(instructions.len(), 2);
        assert!(instructions[0].position < instructions[1].position);
    }

    #[test]
    fn test_crlf_input() {
        let instructions = parse_instructions("# @name: X\r\nARG A=1\r\n");
        assert_eq!(instructions[0].preceding_comments, vec!["# @name: X"]);
        assert_eq!(instructions[0].args[0].value.as_deref(), Some("1"));
    }
}
