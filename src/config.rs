use crate::error::ParseError;

/// Input bounds checked before any parsing happens.
///
/// Parsing and evaluation both recurse over the tree, so these keep the stack
/// use proportional to a small, known depth.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input length in bytes.
    pub max_length: usize,
    /// Maximum nesting: bracket depth plus any run of prefix `+ - ~`.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_length: 4096,
            max_depth: 100,
        }
    }
}

impl Limits {
    pub fn check(&self, input: &str) -> Result<(), ParseError> {
        if input.len() > self.max_length {
            return Err(ParseError::syntax(format!(
                "expression is too long ({} bytes, limit {})",
                input.len(),
                self.max_length
            )));
        }

        let depth = nesting_depth(input);
        if depth > self.max_depth {
            return Err(ParseError::syntax(format!(
                "expression is nested too deeply (depth {}, limit {})",
                depth, self.max_depth
            )));
        }

        Ok(())
    }
}

/// Deepest point of bracket nesting plus prefix-operator runs, skipping quoted text.
fn nesting_depth(input: &str) -> usize {
    let mut max_depth = 0;
    let mut brackets = 0usize;
    let mut run = 0usize;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '(' | '[' | '{' => {
                brackets += 1;
                run = 0;
            }
            ')' | ']' | '}' => {
                brackets = brackets.saturating_sub(1);
                run = 0;
            }
            '+' | '-' | '~' => run += 1,
            '\'' | '"' => {
                run = 0;
                let mut escaped = false;
                for inner in chars.by_ref() {
                    match inner {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        _ if inner == c => break,
                        _ => {}
                    }
                }
            }
            c if c.is_whitespace() => {}
            _ => run = 0,
        }
        max_depth = max_depth.max(brackets + run);
    }

    max_depth
}
