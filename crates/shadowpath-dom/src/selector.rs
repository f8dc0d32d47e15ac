//! CSS selector parsing.
//!
//! Supports selector lists, compound selectors (type, universal, id, class,
//! attribute) and the descendant, child, adjacent-sibling and
//! general-sibling combinators. Pseudo-classes are rejected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported selector '{selector}': {reason}")]
pub struct SelectorParseError {
    pub selector: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOperator {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrCondition {
    /// Lowercased attribute name.
    pub name: String,
    pub operator: AttrOperator,
    pub case_insensitive: bool,
}

impl AttrCondition {
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };
        let actual = fold(value);

        match &self.operator {
            AttrOperator::Exists => true,
            AttrOperator::Equals(expected) => actual == fold(expected),
            AttrOperator::Includes(expected) => {
                let expected = fold(expected);
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && actual.split_ascii_whitespace().any(|word| word == expected)
            }
            AttrOperator::DashMatch(expected) => {
                let expected = fold(expected);
                actual == expected || actual.starts_with(&format!("{}-", expected))
            }
            AttrOperator::Prefix(expected) => {
                !expected.is_empty() && actual.starts_with(&fold(expected))
            }
            AttrOperator::Suffix(expected) => {
                !expected.is_empty() && actual.ends_with(&fold(expected))
            }
            AttrOperator::Substring(expected) => {
                !expected.is_empty() && actual.contains(&fold(expected))
            }
        }
    }
}

/// Conditions a single element must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Lowercased tag name; `None` for `*` or when omitted.
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPart {
    pub compound: Compound,
    /// Relation to the part on the left; `None` for the leftmost part.
    pub combinator: Option<Combinator>,
}

/// One comma-free selector, parts ordered left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<SelectorPart>,
}

/// A comma separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorParseError> {
        Parser::new(input).parse_list()
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorParseError {
        SelectorParseError {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorParseError> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(self.error(format!("expected '{}' but found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}' but input ended", expected))),
        }
    }

    /// Returns whether any whitespace was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorParseError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(ch) => return Err(self.error(format!("unexpected '{}'", ch))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorParseError> {
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::AdjacentSibling,
                Some('~') => Combinator::GeneralSibling,
                Some(_) if had_space => {
                    parts.push(SelectorPart {
                        compound: self.parse_compound()?,
                        combinator: Some(Combinator::Descendant),
                    });
                    continue;
                }
                Some(ch) => return Err(self.error(format!("unexpected '{}'", ch))),
            };
            self.pos += 1;
            self.skip_whitespace();
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorParseError> {
        let mut compound = Compound::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(ch) if is_ident_start(ch) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.parse_ident()?;
                    if compound.id.replace(id).is_some() {
                        return Err(self.error("more than one id in a compound selector"));
                    }
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                Some('*') => return Err(self.error("misplaced '*'")),
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(ch) => self.error(format!("expected a selector but found '{}'", ch)),
                None => self.error("expected a selector but input ended"),
            });
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorParseError> {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                ident.push(self.parse_escape()?);
            } else if is_ident_char(ch) {
                ident.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn parse_attr(&mut self) -> Result<AttrCondition, SelectorParseError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrCondition {
                    name,
                    operator: AttrOperator::Exists,
                    case_insensitive: false,
                });
            }
            Some('=') => None,
            Some(ch @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                Some(ch)
            }
            Some(ch) => return Err(self.error(format!("unexpected '{}' in attribute", ch))),
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.expect('=')?;
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.pos += 1;
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_whitespace();
        }
        self.expect(']')?;

        let operator = match op {
            None => AttrOperator::Equals(value),
            Some('~') => AttrOperator::Includes(value),
            Some('|') => AttrOperator::DashMatch(value),
            Some('^') => AttrOperator::Prefix(value),
            Some('$') => AttrOperator::Suffix(value),
            _ => AttrOperator::Substring(value),
        };
        Ok(AttrCondition {
            name,
            operator,
            case_insensitive,
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => {
                    // An escaped newline continues the string.
                    if self.peek() == Some('\r') {
                        self.pos += 1;
                        if self.peek() == Some('\n') {
                            self.pos += 1;
                        }
                    } else if matches!(self.peek(), Some('\n' | '\x0c')) {
                        self.pos += 1;
                    } else {
                        value.push(self.parse_escape()?);
                    }
                }
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Decode the escape following a backslash: up to six hex digits and one
    /// optional whitespace, or any other single character taken literally.
    fn parse_escape(&mut self) -> Result<char, SelectorParseError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|ch| ch.is_ascii_hexdigit()) {
            self.pos += 1;
        }

        if self.pos == start {
            return match self.bump() {
                Some('\n' | '\r' | '\x0c') => Err(self.error("escaped newline")),
                Some(ch) => Ok(ch),
                None => Err(self.error("dangling escape")),
            };
        }

        let digits: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            Some('\r') => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            Some(' ' | '\t' | '\n' | '\x0c') => self.pos += 1,
            _ => {}
        }

        // Zero, surrogates and values past U+10FFFF decode to U+FFFD.
        let code = u32::from_str_radix(&digits, 16).unwrap_or(0);
        Ok(match code {
            0 => char::REPLACEMENT_CHARACTER,
            _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
        })
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}
