use miette::{Diagnostic, NamedSource, SourceSpan};
use std::{fmt, path::PathBuf};
use thiserror::Error;

pub type BindingResult<T> = Result<T, BindingError>;

/// The kind registry a tag is looked up in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// C bindings against the runtime's own ABI.
    Ompi,
    /// C bindings against the standard ABI.
    Standard,
    /// Fortran 2008 bindings and their C trampolines.
    Fortran,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Ompi => f.write_str("ompi"),
            Axis::Standard => f.write_str("standard"),
            Axis::Fortran => f.write_str("fortran"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum BindingError {
    #[error("{path}: {message}")]
    #[diagnostic(code(bindgen::template))]
    TemplateParse {
        path: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },
    #[error("unknown parameter kind `{kind}` for the {axis} bindings")]
    #[diagnostic(code(bindgen::kind))]
    KindNotFound { kind: String, axis: Axis },
    #[error("invalid prototype `{prototype}`, parameter `{parameter}`: {detail}")]
    #[diagnostic(code(bindgen::dependency))]
    Dependency {
        prototype: String,
        parameter: String,
        detail: DependencyDetail,
    },
    #[error("failed to access {}: {source}", path.display())]
    #[diagnostic(code(bindgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed prototype list {}: {message}", path.display())]
    #[diagnostic(code(bindgen::prototypes))]
    PrototypeList { path: PathBuf, message: String },
    #[error("malformed configuration {}: {message}", path.display())]
    #[diagnostic(code(bindgen::config))]
    Config { path: PathBuf, message: String },
}

/// Why a dependent-parameter declaration was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DependencyDetail {
    InvalidRoles {
        kind: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    MissingSibling { role: String, sibling: String },
}

impl fmt::Display for DependencyDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyDetail::InvalidRoles {
                kind,
                expected,
                found,
            } => write!(
                f,
                "invalid dependent parameter keys for type {kind}: expected [{}], found [{}]",
                expected.join(", "),
                found.join(", ")
            ),
            DependencyDetail::MissingSibling { role, sibling } => write!(
                f,
                "dependent parameter `{sibling}` (role `{role}`) is not declared"
            ),
        }
    }
}

impl BindingError {
    pub fn template(
        path: impl Into<String>,
        source: &str,
        message: impl Into<String>,
        span: (usize, usize),
    ) -> Self {
        let path = path.into();
        Self::TemplateParse {
            src: NamedSource::new(path.clone(), source.to_string()),
            path,
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn kind_not_found(kind: impl Into<String>, axis: Axis) -> Self {
        Self::KindNotFound {
            kind: kind.into(),
            axis,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
