//! Parameter kinds of the C templates and their per-ABI code generation rules.

use super::consts::{IGNORED_STATUS_HANDLES, convert, convert_to_standard};
use crate::{
    codegen::{Block, Mangle, TempNames},
    errors::{Axis, BindingError, BindingResult},
};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CKind {
    ErrorClass,
    Buffer,
    BufferOut,
    Count,
    CountArray,
    DisplArray,
    Int,
    Aint,
    IntOut,
    Double,
    Argv,
    Datatype,
    DatatypeArray,
    Op,
    Rank,
    Tag,
    Comm,
    CommOut,
    Win,
    Request,
    RequestInout,
    StatusOut,
    Fint,
    String,
    StringOut,
    Info,
    FileOut,
}

const TAGS: &[(CKind, &str)] = &[
    (CKind::ErrorClass, "ERROR_CLASS"),
    (CKind::Buffer, "BUFFER"),
    (CKind::BufferOut, "BUFFER_OUT"),
    (CKind::Count, "COUNT"),
    (CKind::CountArray, "COUNT_ARRAY"),
    (CKind::DisplArray, "DISPL_ARRAY"),
    (CKind::Int, "INT"),
    (CKind::Aint, "AINT"),
    (CKind::IntOut, "INT_OUT"),
    (CKind::Double, "DOUBLE"),
    (CKind::Argv, "ARGV"),
    (CKind::Datatype, "DATATYPE"),
    (CKind::DatatypeArray, "DATATYPE_ARRAY"),
    (CKind::Op, "OP"),
    (CKind::Rank, "RANK"),
    (CKind::Tag, "TAG"),
    (CKind::Comm, "COMM"),
    (CKind::CommOut, "COMM_OUT"),
    (CKind::Win, "WIN"),
    (CKind::Request, "REQUEST"),
    (CKind::RequestInout, "REQUEST_INOUT"),
    (CKind::StatusOut, "STATUS_OUT"),
    (CKind::Fint, "FINT"),
    (CKind::String, "STRING"),
    (CKind::StringOut, "STRING_OUT"),
    (CKind::Info, "INFO"),
    (CKind::FileOut, "FILE_OUT"),
];

impl CKind {
    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, tag)| *tag)
            .unwrap_or("UNKNOWN")
    }

    /// Counting kinds switch to a wide integer type in the bigcount variant.
    pub fn is_count(self) -> bool {
        matches!(self, CKind::Count | CKind::CountArray | CKind::DisplArray)
    }
}

impl FromStr for CKind {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        TAGS.iter()
            .find(|(_, name)| *name == tag)
            .map(|(kind, _)| *kind)
            .ok_or(())
    }
}

impl fmt::Display for CKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The view of a parameter a rule generates code for.
#[derive(Clone, Copy, Debug)]
pub struct CParam<'a> {
    pub name: &'a str,
    pub count_param: Option<&'a str>,
    pub mangle: Mangle,
}

impl<'a> CParam<'a> {
    pub fn new(name: &'a str, count_param: Option<&'a str>, mangle: Mangle) -> Self {
        Self {
            name,
            count_param,
            mangle,
        }
    }

    /// Return values have no name of their own.
    pub fn returned(mangle: Mangle) -> Self {
        Self::new("", None, mangle)
    }

    fn tmp_name(&self) -> String {
        format!("{}_tmp", self.name)
    }
}

/// Joins a type and a declarator, without a space after a pointer star.
pub fn declare(type_text: &str, name: &str) -> String {
    if type_text.ends_with('*') {
        format!("{type_text}{name}")
    } else {
        format!("{type_text} {name}")
    }
}

/// Code generation rules for one kind on one ABI.
pub trait CTypeRules: Sync {
    fn type_text(&self, param: &CParam<'_>, bigcount: bool) -> String;

    fn parameter(&self, param: &CParam<'_>, bigcount: bool) -> String {
        declare(&self.type_text(param, bigcount), param.name)
    }

    /// Type of the local that receives a converted value.
    fn tmp_type_text(&self, param: &CParam<'_>, bigcount: bool) -> String {
        self.type_text(param, bigcount)
    }

    /// Statements run before the internal call.
    fn init_code(&self, _param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        Vec::new()
    }

    /// Statements run after the internal call.
    fn final_code(&self, _param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        Vec::new()
    }

    fn return_code(&self, _param: &CParam<'_>, value: &str) -> Vec<Block> {
        vec![Block::stmt(format!("return {value};"))]
    }

    /// Expression passed to the internal function.
    fn argument(&self, param: &CParam<'_>) -> String {
        param.name.to_string()
    }
}

/// Kinds spelled the same way on both ABIs, with no conversion.
struct Plain(&'static str);

impl CTypeRules for Plain {
    fn type_text(&self, _param: &CParam<'_>, _bigcount: bool) -> String {
        self.0.to_string()
    }
}

struct ErrorClass;

impl CTypeRules for ErrorClass {
    fn type_text(&self, _param: &CParam<'_>, _bigcount: bool) -> String {
        "int".into()
    }

    fn return_code(&self, _param: &CParam<'_>, value: &str) -> Vec<Block> {
        vec![Block::stmt(format!("return {}({value});", convert::ERROR_CLASS))]
    }
}

/// Scalar and array counting kinds: `(narrow, wide)` element types.
struct CountLike {
    narrow: &'static str,
    wide: &'static str,
    array: bool,
}

impl CountLike {
    fn element(&self, bigcount: bool) -> &'static str {
        if bigcount { self.wide } else { self.narrow }
    }
}

impl CTypeRules for CountLike {
    fn type_text(&self, _param: &CParam<'_>, bigcount: bool) -> String {
        if self.array {
            format!("{} *", self.element(bigcount))
        } else {
            self.element(bigcount).to_string()
        }
    }

    fn parameter(&self, param: &CParam<'_>, bigcount: bool) -> String {
        if self.array {
            format!("const {} {}[]", self.element(bigcount), param.name)
        } else {
            declare(self.element(bigcount), param.name)
        }
    }
}

/// Output arrays sized by a sibling when `count_param` is set (`int *x` or `int x[]`).
struct ScalarOrArray(&'static str);

impl CTypeRules for ScalarOrArray {
    fn type_text(&self, _param: &CParam<'_>, _bigcount: bool) -> String {
        format!("{} *", self.0)
    }

    fn parameter(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        match param.count_param {
            Some(_) => format!("{} {}[]", self.0, param.name),
            None => format!("{} *{}", self.0, param.name),
        }
    }
}

struct DatatypeArray;

impl CTypeRules for DatatypeArray {
    fn type_text(&self, _param: &CParam<'_>, _bigcount: bool) -> String {
        "MPI_Datatype".into()
    }

    fn parameter(&self, param: &CParam<'_>, bigcount: bool) -> String {
        format!("const {} {}[]", self.type_text(param, bigcount), param.name)
    }
}

/// Standard-ABI handles converted into a `{name}_tmp` local before the call.
struct ConvertedHandle {
    handle: &'static str,
    convert: &'static str,
}

impl CTypeRules for ConvertedHandle {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        param.mangle.apply(self.handle)
    }

    fn init_code(&self, param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!(
            "{} {} = {}({});",
            self.handle,
            param.tmp_name(),
            self.convert,
            param.name
        ))]
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        param.tmp_name()
    }
}

struct StandardComm;

impl CTypeRules for StandardComm {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        param.mangle.apply("MPI_Comm")
    }

    fn tmp_type_text(&self, _param: &CParam<'_>, _bigcount: bool) -> String {
        "MPI_Comm".into()
    }

    fn init_code(&self, param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!(
            "MPI_Comm {} = {}({});",
            param.tmp_name(),
            convert::COMM,
            param.name
        ))]
    }

    fn return_code(&self, _param: &CParam<'_>, value: &str) -> Vec<Block> {
        vec![Block::stmt(format!(
            "return {}({value});",
            convert_to_standard::COMM
        ))]
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        param.tmp_name()
    }
}

struct StandardCommOut;

impl CTypeRules for StandardCommOut {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        format!("{} *", param.mangle.apply("MPI_Comm"))
    }

    fn final_code(&self, param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!(
            "*{name} = {}((MPI_Comm) *{name});",
            convert_to_standard::COMM,
            name = param.name
        ))]
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        format!("(MPI_Comm *) {}", param.name)
    }
}

struct StandardRequest;

impl CTypeRules for StandardRequest {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        param.mangle.apply("MPI_Request")
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        format!("(MPI_Request) {}", param.name)
    }
}

struct StandardRequestInout;

impl CTypeRules for StandardRequestInout {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        format!("{} *", param.mangle.apply("MPI_Request"))
    }

    fn parameter(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        let handle = param.mangle.apply("MPI_Request");
        match param.count_param {
            Some(_) => format!("{handle} {}[]", param.name),
            None => format!("{handle} *{}", param.name),
        }
    }

    fn final_code(&self, param: &CParam<'_>, names: &mut TempNames) -> Vec<Block> {
        match param.count_param {
            None => vec![Block::stmt(format!("{}({});", convert::REQUEST, param.name))],
            Some(count) => {
                let i = names.counter(param.name);
                vec![Block::for_range(
                    i.clone(),
                    count,
                    vec![Block::stmt(format!(
                        "{}(&{}[{i}]);",
                        convert::REQUEST,
                        param.name
                    ))],
                )]
            }
        }
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        format!("(MPI_Request *) {}", param.name)
    }
}

/// Statuses are produced by the runtime in its own layout and copied out
/// unless the caller passed one of the ignore sentinels.
struct StandardStatusOut;

impl StandardStatusOut {
    fn should_set(param: &CParam<'_>) -> String {
        IGNORED_STATUS_HANDLES
            .iter()
            .map(|sentinel| format!("{} != {}", param.mangle.apply(sentinel), param.name))
            .collect::<Vec<_>>()
            .join(" && ")
    }

    fn arg_name(param: &CParam<'_>) -> String {
        format!("{}_arg", param.name)
    }
}

impl CTypeRules for StandardStatusOut {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        format!("{} *", param.mangle.apply("MPI_Status"))
    }

    fn parameter(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        let status = param.mangle.apply("MPI_Status");
        match param.count_param {
            Some(_) => format!("{status} {}[]", param.name),
            None => format!("{status} *{}", param.name),
        }
    }

    fn init_code(&self, param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        let arg = Self::arg_name(param);
        let tmp = param.tmp_name();
        let mut code = vec![Block::stmt(format!("MPI_Status *{arg} = NULL;"))];
        match param.count_param {
            Some(count) => {
                code.push(Block::stmt(format!("MPI_Status *{tmp} = NULL;")));
                code.push(Block::if_else(
                    Self::should_set(param),
                    vec![
                        Block::stmt(format!("{tmp} = malloc({count} * sizeof(MPI_Status));")),
                        Block::stmt(format!("{arg} = {tmp};")),
                    ],
                    vec![Block::stmt(format!("{arg} = MPI_STATUSES_IGNORE;"))],
                ));
            }
            None => {
                code.push(Block::stmt(format!("MPI_Status {tmp};")));
                code.push(Block::if_else(
                    Self::should_set(param),
                    vec![Block::stmt(format!("{arg} = &{tmp};"))],
                    vec![Block::stmt(format!("{arg} = MPI_STATUS_IGNORE;"))],
                ));
            }
        }
        code
    }

    fn final_code(&self, param: &CParam<'_>, names: &mut TempNames) -> Vec<Block> {
        let tmp = param.tmp_name();
        let body = match param.count_param {
            None => vec![Block::stmt(format!(
                "{}({}, &{tmp});",
                convert::STATUS,
                param.name
            ))],
            Some(count) => {
                let i = names.counter(param.name);
                vec![
                    Block::for_range(
                        i.clone(),
                        count,
                        vec![Block::stmt(format!(
                            "{}(&{}[{i}], &{tmp}[{i}]);",
                            convert::STATUS,
                            param.name
                        ))],
                    ),
                    Block::stmt(format!("free({tmp});")),
                ]
            }
        };
        vec![Block::if_then(Self::should_set(param), body)]
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        Self::arg_name(param)
    }
}

struct StandardFileOut;

impl CTypeRules for StandardFileOut {
    fn type_text(&self, param: &CParam<'_>, _bigcount: bool) -> String {
        format!("{} *", param.mangle.apply("MPI_File"))
    }

    fn final_code(&self, param: &CParam<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!("{}({});", convert::FILE, param.name))]
    }

    fn argument(&self, param: &CParam<'_>) -> String {
        format!("(MPI_File *) {}", param.name)
    }
}

static ERROR_CLASS: ErrorClass = ErrorClass;
static BUFFER: Plain = Plain("const void *");
static BUFFER_OUT: Plain = Plain("void *");
static COUNT: CountLike = CountLike {
    narrow: "int",
    wide: "MPI_Count",
    array: false,
};
static COUNT_ARRAY: CountLike = CountLike {
    narrow: "int",
    wide: "MPI_Count",
    array: true,
};
static DISPL_ARRAY: CountLike = CountLike {
    narrow: "int",
    wide: "MPI_Aint",
    array: true,
};
static INT: Plain = Plain("int");
static AINT: Plain = Plain("MPI_Aint");
static INT_OUT: ScalarOrArray = ScalarOrArray("int");
static DOUBLE: Plain = Plain("double");
static ARGV: Plain = Plain("char ***");
static FINT: Plain = Plain("MPI_Fint");
static STRING: Plain = Plain("const char *");
static STRING_OUT: Plain = Plain("char *");

static OMPI_DATATYPE: Plain = Plain("MPI_Datatype");
static OMPI_DATATYPE_ARRAY: DatatypeArray = DatatypeArray;
static OMPI_OP: Plain = Plain("MPI_Op");
static OMPI_COMM: Plain = Plain("MPI_Comm");
static OMPI_COMM_OUT: Plain = Plain("MPI_Comm *");
static OMPI_WIN: Plain = Plain("MPI_Win");
static OMPI_REQUEST: Plain = Plain("MPI_Request");
static OMPI_REQUEST_INOUT: Plain = Plain("MPI_Request *");
static OMPI_STATUS_OUT: ScalarOrArray = ScalarOrArray("MPI_Status");
static OMPI_INFO: Plain = Plain("MPI_Info");
static OMPI_FILE_OUT: Plain = Plain("MPI_File *");

static STANDARD_DATATYPE: ConvertedHandle = ConvertedHandle {
    handle: "MPI_Datatype",
    convert: convert::DATATYPE,
};
static STANDARD_OP: ConvertedHandle = ConvertedHandle {
    handle: "MPI_Op",
    convert: convert::OP,
};
static STANDARD_WIN: ConvertedHandle = ConvertedHandle {
    handle: "MPI_Win",
    convert: convert::WIN,
};
static STANDARD_INFO: ConvertedHandle = ConvertedHandle {
    handle: "MPI_Info",
    convert: convert::INFO,
};
static STANDARD_COMM: StandardComm = StandardComm;
static STANDARD_COMM_OUT: StandardCommOut = StandardCommOut;
static STANDARD_REQUEST: StandardRequest = StandardRequest;
static STANDARD_REQUEST_INOUT: StandardRequestInout = StandardRequestInout;
static STANDARD_STATUS_OUT: StandardStatusOut = StandardStatusOut;
static STANDARD_FILE_OUT: StandardFileOut = StandardFileOut;

/// Looks up the rules for `kind` on the given ABI.
pub fn resolve(axis: Axis, kind: CKind) -> BindingResult<&'static dyn CTypeRules> {
    let shared: Option<&'static dyn CTypeRules> = match kind {
        CKind::ErrorClass => Some(&ERROR_CLASS),
        CKind::Buffer => Some(&BUFFER),
        CKind::BufferOut => Some(&BUFFER_OUT),
        CKind::Count => Some(&COUNT),
        CKind::CountArray => Some(&COUNT_ARRAY),
        CKind::DisplArray => Some(&DISPL_ARRAY),
        CKind::Int | CKind::Rank | CKind::Tag => Some(&INT),
        CKind::Aint => Some(&AINT),
        CKind::IntOut => Some(&INT_OUT),
        CKind::Double => Some(&DOUBLE),
        CKind::Argv => Some(&ARGV),
        CKind::Fint => Some(&FINT),
        CKind::String => Some(&STRING),
        CKind::StringOut => Some(&STRING_OUT),
        _ => None,
    };
    if let Some(rules) = shared {
        if axis != Axis::Fortran {
            return Ok(rules);
        }
    }
    let rules: &'static dyn CTypeRules = match (axis, kind) {
        (Axis::Ompi, CKind::Datatype) => &OMPI_DATATYPE,
        (Axis::Ompi, CKind::DatatypeArray) => &OMPI_DATATYPE_ARRAY,
        (Axis::Ompi, CKind::Op) => &OMPI_OP,
        (Axis::Ompi, CKind::Comm) => &OMPI_COMM,
        (Axis::Ompi, CKind::CommOut) => &OMPI_COMM_OUT,
        (Axis::Ompi, CKind::Win) => &OMPI_WIN,
        (Axis::Ompi, CKind::Request) => &OMPI_REQUEST,
        (Axis::Ompi, CKind::RequestInout) => &OMPI_REQUEST_INOUT,
        (Axis::Ompi, CKind::StatusOut) => &OMPI_STATUS_OUT,
        (Axis::Ompi, CKind::Info) => &OMPI_INFO,
        (Axis::Ompi, CKind::FileOut) => &OMPI_FILE_OUT,
        (Axis::Standard, CKind::Datatype) => &STANDARD_DATATYPE,
        (Axis::Standard, CKind::Op) => &STANDARD_OP,
        (Axis::Standard, CKind::Comm) => &STANDARD_COMM,
        (Axis::Standard, CKind::CommOut) => &STANDARD_COMM_OUT,
        (Axis::Standard, CKind::Win) => &STANDARD_WIN,
        (Axis::Standard, CKind::Request) => &STANDARD_REQUEST,
        (Axis::Standard, CKind::RequestInout) => &STANDARD_REQUEST_INOUT,
        (Axis::Standard, CKind::StatusOut) => &STANDARD_STATUS_OUT,
        (Axis::Standard, CKind::Info) => &STANDARD_INFO,
        (Axis::Standard, CKind::FileOut) => &STANDARD_FILE_OUT,
        _ => return Err(BindingError::kind_not_found(kind.tag(), axis)),
    };
    Ok(rules)
}
