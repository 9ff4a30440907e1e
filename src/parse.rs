//! Parser for build manifests.
//!
//! A manifest is a sequence of newline-terminated declarations:
//!
//! ```text
//! rule <name>
//! command <command text to end of line>
//!
//! build <in> <in> ... : <rulename> <out> <out> ...
//! ```
//!
//! To avoid allocations the parser returns statements that borrow the input
//! text, marked with the lifetime `'text`.

use crate::eval::Template;
use crate::scanner::{ParseError, ParseResult, Scanner};

#[derive(Debug)]
pub struct Rule<'text> {
    pub name: &'text str,
    pub command: Template<&'text str>,
}

#[derive(Debug)]
pub struct Build<'text> {
    pub ins: Vec<&'text str>,
    pub rule: &'text str,
    pub outs: Vec<&'text str>,
}

#[derive(Debug)]
pub enum Statement<'text> {
    Rule(Rule<'text>),
    Build(Build<'text>),
}

fn is_ident_char(c: char) -> bool {
    // Identifiers double as paths, so path punctuation is allowed.
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-' | '/')
}

pub struct Parser<'text> {
    scanner: Scanner<'text>,
}

impl<'text> Parser<'text> {
    pub fn new(buf: &'text [u8]) -> Parser<'text> {
        Parser {
            scanner: Scanner::new(buf),
        }
    }

    pub fn format_parse_error(&self, err: ParseError) -> String {
        err.format()
    }

    /// Read the next statement, or None at end of input.
    pub fn read(&mut self) -> ParseResult<Option<Statement<'text>>> {
        loop {
            self.scanner.skip_spaces();
            match self.scanner.peek() {
                '\0' => return Ok(None),
                '\n' => self.scanner.next(),
                _ => {
                    let start = self.scanner.ofs;
                    let ident = self.read_ident()?;
                    match ident {
                        "rule" => return Ok(Some(Statement::Rule(self.read_rule()?))),
                        "build" => return Ok(Some(Statement::Build(self.read_build()?))),
                        ident => {
                            return self
                                .scanner
                                .parse_error_at(start, format!("unknown token: {}", ident))
                        }
                    }
                }
            }
        }
    }

    fn read_ident(&mut self) -> ParseResult<&'text str> {
        let start = self.scanner.ofs;
        while is_ident_char(self.scanner.read()) {}
        self.scanner.back();
        let end = self.scanner.ofs;
        if end == start {
            return self.scanner.parse_error("expected identifier");
        }
        Ok(self.scanner.slice(start, end))
    }

    /// Consume the rest of the line, not including its terminating newline.
    fn read_to_newline(&mut self) -> ParseResult<&'text str> {
        let start = self.scanner.ofs;
        loop {
            match self.scanner.peek() {
                '\0' => return self.scanner.parse_error("expected newline"),
                '\n' => break,
                _ => self.scanner.next(),
            }
        }
        let text = self.scanner.slice(start, self.scanner.ofs);
        self.scanner.next();
        Ok(text)
    }

    fn read_rule(&mut self) -> ParseResult<Rule<'text>> {
        self.scanner.skip_spaces();
        let name = self.read_ident()?;
        self.scanner.skip_spaces();
        self.scanner.expect('\n')?;
        self.scanner.skip_spaces();
        let keyword_start = self.scanner.ofs;
        let keyword = self.read_ident()?;
        if keyword != "command" {
            return self.scanner.parse_error_at(keyword_start, "expected command");
        }
        self.scanner.skip_spaces();
        let command_start = self.scanner.ofs;
        let text = self.read_to_newline()?;
        let command = Template::parse(text)
            .map_err(|err| self.scanner.error_at(command_start + err.ofs, err.msg))?;
        Ok(Rule { name, command })
    }

    fn read_build(&mut self) -> ParseResult<Build<'text>> {
        let mut ins = Vec::new();
        loop {
            self.scanner.skip_spaces();
            match self.scanner.peek() {
                ':' => {
                    self.scanner.next();
                    break;
                }
                '\n' | '\0' => return self.scanner.parse_error("expected ':'"),
                _ => ins.push(self.read_ident()?),
            }
        }
        self.scanner.skip_spaces();
        let rule = self.read_ident()?;
        let mut outs = Vec::new();
        loop {
            self.scanner.skip_spaces();
            match self.scanner.peek() {
                '\n' | '\0' => break,
                _ => outs.push(self.read_ident()?),
            }
        }
        self.scanner.expect('\n')?;
        Ok(Build { ins, rule, outs })
    }
}
