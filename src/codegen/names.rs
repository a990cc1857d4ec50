use std::collections::HashMap;

pub const BIGCOUNT_SUFFIX: &str = "_c";
pub const PROFILING_PREFIX: &str = "P";

pub fn bigcount_suffix(bigcount: bool) -> &'static str {
    if bigcount { BIGCOUNT_SUFFIX } else { "" }
}

/// Uppercases the first character and lowercases the rest (`comm_SIZE` -> `Comm_size`).
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// `send` -> `MPI_Send`
pub fn mpi_fn_name(base_name: &str) -> String {
    format!("MPI_{}", capitalize(base_name))
}

pub fn abi_internal_name(name: &str) -> String {
    format!("{name}_ABI_INTERNAL")
}

pub fn profiling_name(name: &str) -> String {
    format!("{PROFILING_PREFIX}{name}")
}

/// External C API name, e.g. `MPI_Send_c`.
pub fn ext_api_func_name(base_name: &str, bigcount: bool) -> String {
    format!("{}{}", mpi_fn_name(base_name), bigcount_suffix(bigcount))
}

/// Profiling C API name, e.g. `PMPI_Send_c`.
pub fn ext_api_func_name_profile(base_name: &str, bigcount: bool) -> String {
    profiling_name(&ext_api_func_name(base_name, bigcount))
}

/// Fortran 2008 subroutine name, e.g. `MPI_Send_f08_c`.
pub fn fortran_f08_name(base_name: &str, bigcount: bool) -> String {
    format!("{}_f08{}", mpi_fn_name(base_name), bigcount_suffix(bigcount))
}

/// Name of the C trampoline called from the Fortran subroutine.
pub fn fortran_wrapper_name(base_name: &str, bigcount: bool) -> String {
    format!("ompi_{base_name}_wrapper_f08{}", bigcount_suffix(bigcount))
}

/// How standard-ABI type and constant names are spelled in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mangle {
    /// Names inside the runtime, suffixed so they cannot clash with its own.
    Internal,
    /// Names as seen by applications including the external header.
    External,
}

impl Mangle {
    pub fn apply(self, name: &str) -> String {
        match self {
            Mangle::Internal => abi_internal_name(name),
            Mangle::External => name.to_string(),
        }
    }
}

/// Hands out loop counters that are unique within one generated function.
#[derive(Debug, Default)]
pub struct TempNames {
    counters: HashMap<String, usize>,
}

impl TempNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `{param}_i_{n}`, bumping `n` for the next request on `param`.
    pub fn counter(&mut self, param: &str) -> String {
        let next = self.counters.entry(param.to_string()).or_insert(0);
        let name = format!("{param}_i_{next}");
        *next += 1;
        name
    }
}

/// Breaks a Fortran parameter list across `&`-continued lines.
///
/// Parameters are packed onto a line while it stays within `width`
/// columns; continuation lines are aligned under the first parameter.
pub fn break_param_lines_fortran(
    start: &str,
    params: &[String],
    end: &str,
    width: usize,
) -> Vec<String> {
    let continuation = " ".repeat(start.len());
    let mut lines = Vec::new();
    let mut current = start.to_string();
    let mut on_line = 0usize;
    for (idx, param) in params.iter().enumerate() {
        let last = idx + 1 == params.len();
        let piece = if last {
            param.clone()
        } else {
            format!("{param},")
        };
        // Leave room for a trailing " &" when the line has to be continued.
        if on_line > 0 && current.len() + 1 + piece.len() + 2 > width {
            current.push_str(" &");
            lines.push(std::mem::replace(&mut current, continuation.clone()));
            on_line = 0;
        }
        if on_line > 0 {
            current.push(' ');
        }
        current.push_str(&piece);
        on_line += 1;
    }
    current.push_str(end);
    lines.push(current);
    lines
}
