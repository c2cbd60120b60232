//! Minimal reader for Valve's KeyValues text format (`.vdf` / `.acf`).
//!
//! Handles quoted strings with escapes, bare tokens, nested blocks, `//`
//! comments and trailing `[$PLATFORM]` conditionals. Keys are matched
//! case-insensitively the way Steam does.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VdfError {
    #[error("unterminated string starting on line {0}")]
    UnterminatedString(usize),
    #[error("unexpected '{found}' on line {line}")]
    Unexpected { found: String, line: usize },
    #[error("key {0:?} has no value")]
    MissingValue(String),
    #[error("unexpected end of input, {0} block(s) left open")]
    UnclosedBlock(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum VdfValue {
    Str(String),
    Block(VdfBlock),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VdfBlock {
    entries: Vec<(String, VdfValue)>,
}

impl VdfBlock {
    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            VdfValue::Str(value) => Some(value),
            VdfValue::Block(_) => None,
        }
    }

    pub fn get_block(&self, key: &str) -> Option<&VdfBlock> {
        match self.get(key)? {
            VdfValue::Block(block) => Some(block),
            VdfValue::Str(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VdfValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Text(String),
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek().copied() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() != Some(&'/') {
                        return;
                    }
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>, VdfError> {
        loop {
            self.skip_trivia();
            let line = self.line;
            let token = match self.chars.peek().copied() {
                None => return Ok(None),
                Some('{') => {
                    self.bump();
                    Token::Open
                }
                Some('}') => {
                    self.bump();
                    Token::Close
                }
                Some('"') => {
                    self.bump();
                    Token::Text(self.quoted(line)?)
                }
                Some(_) => {
                    let bare = self.bare();
                    if bare.starts_with('[') && bare.ends_with(']') {
                        continue;
                    }
                    Token::Text(bare)
                }
            };
            return Ok(Some((token, line)));
        }
    }

    fn quoted(&mut self, start_line: usize) -> Result<String, VdfError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(VdfError::UnterminatedString(start_line)),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(VdfError::UnterminatedString(start_line)),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn bare(&mut self) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }
}

pub fn parse(input: &str) -> Result<VdfBlock, VdfError> {
    let mut lexer = Lexer::new(input);
    parse_block(&mut lexer, 0)
}

fn parse_block(lexer: &mut Lexer<'_>, depth: usize) -> Result<VdfBlock, VdfError> {
    let mut block = VdfBlock::default();
    loop {
        let key = match lexer.next_token()? {
            None if depth == 0 => return Ok(block),
            None => return Err(VdfError::UnclosedBlock(depth)),
            Some((Token::Close, _)) if depth > 0 => return Ok(block),
            Some((Token::Text(key), _)) => key,
            Some((token, line)) => {
                return Err(VdfError::Unexpected {
                    found: token_label(&token),
                    line,
                })
            }
        };

        let value = match lexer.next_token()? {
            Some((Token::Text(value), _)) => VdfValue::Str(value),
            Some((Token::Open, _)) => VdfValue::Block(parse_block(lexer, depth + 1)?),
            Some((Token::Close, _)) | None => return Err(VdfError::MissingValue(key)),
        };
        block.entries.push((key, value));
    }
}

fn token_label(token: &Token) -> String {
    match token {
        Token::Open => "{".to_string(),
        Token::Close => "}".to_string(),
        Token::Text(text) => text.clone(),
    }
}
