use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

/// Parse-time failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The text is not valid arithmetic syntax.
    #[error("invalid syntax: {0}")]
    SyntaxError(String),

    /// The text is valid in the broader expression grammar but uses a construct
    /// outside the arithmetic whitelist. Carries the construct's name.
    #[error("{0} is not allowed")]
    DisallowedConstruct(String),
}

impl ParseError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    pub fn disallowed(construct: impl Into<String>) -> Self {
        Self::DisallowedConstruct(construct.into())
    }
}

/// Evaluation-time failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl EvalError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Flat view of [`CalcError`] for front ends that only branch on the kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    DisallowedConstruct,
    DivisionByZero,
    InvalidOperation,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Parse(ParseError::SyntaxError(_)) => ErrorKind::Syntax,
            CalcError::Parse(ParseError::DisallowedConstruct(_)) => ErrorKind::DisallowedConstruct,
            CalcError::Eval(EvalError::DivisionByZero) => ErrorKind::DivisionByZero,
            CalcError::Eval(EvalError::InvalidOperation(_)) => ErrorKind::InvalidOperation,
        }
    }
}
