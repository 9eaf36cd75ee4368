//! Token — typed atoms produced by splitting a log line.
//!
//! A *word* is a maximal run of `[A-Za-z0-9_]`; a *delimiter* is a maximal
//! run of whitespace or a maximal run of other characters. Concatenating
//! token texts always reproduces the input exactly.

/// Words shorter than this carry too little information to anchor a match.
pub const SIGNIFICANT_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub is_delimiter: bool,
}

impl Token {
    /// A word token long enough to anchor a matching block.
    pub fn is_significant(&self) -> bool {
        !self.is_delimiter && self.text.len() >= SIGNIFICANT_LEN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        // Non-ASCII letters land here too; they still round-trip intact.
        CharClass::Other
    }
}

/// Split `s` into maximal same-class runs.
pub fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (idx, ch) in s.char_indices() {
        let class = classify(ch);
        match current {
            Some(c) if c == class => {}
            Some(c) => {
                tokens.push(Token {
                    text: s[start..idx].to_string(),
                    is_delimiter: c != CharClass::Word,
                });
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }

    if let Some(c) = current {
        tokens.push(Token {
            text: s[start..].to_string(),
            is_delimiter: c != CharClass::Word,
        });
    }

    tokens
}
