//! A small statement tree for generated C code.
//!
//! Kind rules return `Block`s instead of pre-indented text. Indentation is
//! applied once, by [`render`], so nested conversions compose without each
//! rule having to know how deep it sits in the function body.

pub const INDENT: &str = "    ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// A single line, emitted at the current depth.
    Stmt(String),
    /// `if (a) { .. } else if (b) { .. } else { .. }`
    If {
        arms: Vec<(String, Vec<Block>)>,
        otherwise: Option<Vec<Block>>,
    },
    /// `for (int i = 0; i < bound; ++i) { .. }`
    For {
        counter: String,
        bound: String,
        body: Vec<Block>,
    },
    /// `switch (value) { case ..: .. default: .. }`
    Switch {
        value: String,
        cases: Vec<(String, Vec<Block>)>,
        default: Option<Vec<Block>>,
    },
}

impl Block {
    pub fn stmt(text: impl Into<String>) -> Self {
        Block::Stmt(text.into())
    }

    pub fn if_then(cond: impl Into<String>, body: Vec<Block>) -> Self {
        Block::If {
            arms: vec![(cond.into(), body)],
            otherwise: None,
        }
    }

    pub fn if_else(cond: impl Into<String>, then: Vec<Block>, otherwise: Vec<Block>) -> Self {
        Block::If {
            arms: vec![(cond.into(), then)],
            otherwise: Some(otherwise),
        }
    }

    pub fn for_range(
        counter: impl Into<String>,
        bound: impl Into<String>,
        body: Vec<Block>,
    ) -> Self {
        Block::For {
            counter: counter.into(),
            bound: bound.into(),
            body,
        }
    }

    /// Collects the statement text of this block and every nested block.
    ///
    /// Control-flow headers are included in the form they are rendered in,
    /// which keeps searches in tests independent of indentation.
    pub fn flatten(&self) -> Vec<String> {
        render(std::slice::from_ref(self), 0)
            .into_iter()
            .map(|line| line.trim().to_string())
            .collect()
    }
}

/// Renders blocks to lines, indenting by [`INDENT`] per level starting at `depth`.
pub fn render(blocks: &[Block], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        render_into(block, depth, &mut lines);
    }
    lines
}

fn render_into(block: &Block, depth: usize, lines: &mut Vec<String>) {
    let prefix = INDENT.repeat(depth);
    match block {
        Block::Stmt(text) => lines.push(format!("{prefix}{text}")),
        Block::If { arms, otherwise } => {
            for (idx, (cond, body)) in arms.iter().enumerate() {
                if idx == 0 {
                    lines.push(format!("{prefix}if ({cond}) {{"));
                } else {
                    lines.push(format!("{prefix}}} else if ({cond}) {{"));
                }
                for inner in body {
                    render_into(inner, depth + 1, lines);
                }
            }
            if let Some(body) = otherwise {
                lines.push(format!("{prefix}}} else {{"));
                for inner in body {
                    render_into(inner, depth + 1, lines);
                }
            }
            lines.push(format!("{prefix}}}"));
        }
        Block::For {
            counter,
            bound,
            body,
        } => {
            lines.push(format!(
                "{prefix}for (int {counter} = 0; {counter} < {bound}; ++{counter}) {{"
            ));
            for inner in body {
                render_into(inner, depth + 1, lines);
            }
            lines.push(format!("{prefix}}}"));
        }
        Block::Switch {
            value,
            cases,
            default,
        } => {
            lines.push(format!("{prefix}switch ({value}) {{"));
            let case_prefix = INDENT.repeat(depth + 1);
            for (label, body) in cases {
                lines.push(format!("{case_prefix}case {label}:"));
                for inner in body {
                    render_into(inner, depth + 2, lines);
                }
            }
            if let Some(body) = default {
                lines.push(format!("{case_prefix}default:"));
                for inner in body {
                    render_into(inner, depth + 2, lines);
                }
            }
            lines.push(format!("{prefix}}}"));
        }
    }
}
