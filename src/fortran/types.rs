//! Parameter kinds of the Fortran 2008 bindings.
//!
//! Every kind has a payload type implementing [`FortranTypeRules`]. Kinds
//! that need other parameters of the same prototype (a buffer needs its
//! count, datatype and communicator) carry a fixed dependency record with
//! the sibling indices, filled in once when the prototype list is loaded.

use super::{C_ERROR_NAME, C_ERROR_TMP_NAME, IGNORE_TKR_PREDECL, IGNORE_TKR_TYPE, TYPES_MODULE};
use super::prototype::FortranParameter;
use crate::{
    codegen::{Block, TempNames, names},
    errors::BindingResult,
};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FortranKind {
    Buffer,
    BufferAsync,
    BufferOut,
    BufferAsyncOut,
    VBuffer,
    VBufferOut,
    WBuffer,
    WBufferOut,
    Count,
    Datatype,
    DatatypeArray,
    Int,
    Rank,
    Tag,
    IndexOut,
    LogicalOut,
    Comm,
    Status,
    ShortcutCount,
    Request,
    RequestArray,
    StatusArray,
    IntArray,
}

const TAGS: &[(FortranKind, &str)] = &[
    (FortranKind::Buffer, "BUFFER"),
    (FortranKind::BufferAsync, "BUFFER_ASYNC"),
    (FortranKind::BufferOut, "BUFFER_OUT"),
    (FortranKind::BufferAsyncOut, "BUFFER_ASYNC_OUT"),
    (FortranKind::VBuffer, "VBUFFER"),
    (FortranKind::VBufferOut, "VBUFFER_OUT"),
    (FortranKind::WBuffer, "WBUFFER"),
    (FortranKind::WBufferOut, "WBUFFER_OUT"),
    (FortranKind::Count, "COUNT"),
    (FortranKind::Datatype, "DATATYPE"),
    (FortranKind::DatatypeArray, "DATATYPE_ARRAY"),
    (FortranKind::Int, "INT"),
    (FortranKind::Rank, "RANK"),
    (FortranKind::Tag, "TAG"),
    (FortranKind::IndexOut, "INDEX_OUT"),
    (FortranKind::LogicalOut, "LOGICAL_OUT"),
    (FortranKind::Comm, "COMM"),
    (FortranKind::Status, "STATUS"),
    (FortranKind::ShortcutCount, "SHORTCUT_COUNT"),
    (FortranKind::Request, "REQUEST"),
    (FortranKind::RequestArray, "REQUEST_ARRAY"),
    (FortranKind::StatusArray, "STATUS_ARRAY"),
    (FortranKind::IntArray, "INT_ARRAY"),
];

impl FortranKind {
    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, tag)| *tag)
            .unwrap_or("UNKNOWN")
    }

    /// The exact set of dependent-parameter roles this kind requires.
    pub fn roles(self) -> &'static [Role] {
        use FortranKind::*;
        match self {
            Buffer | BufferAsync | BufferOut | BufferAsyncOut => {
                &[Role::Count, Role::Type, Role::Comm]
            }
            VBuffer => &[Role::Counts, Role::Displs, Role::Type, Role::Comm],
            VBufferOut => &[Role::Type, Role::Comm],
            WBuffer | WBufferOut => &[Role::Counts, Role::Displs, Role::Types, Role::Comm],
            RequestArray | StatusArray => &[Role::Count],
            IntArray => &[Role::Comm],
            _ => &[],
        }
    }
}

impl FromStr for FortranKind {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        TAGS.iter()
            .find(|(_, name)| *name == tag)
            .map(|(kind, _)| *kind)
            .ok_or(())
    }
}

impl fmt::Display for FortranKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Role keys of `dep_params` in the prototype list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Count,
    Counts,
    Displs,
    Type,
    Types,
    Comm,
}

impl Role {
    pub fn key(self) -> &'static str {
        match self {
            Role::Count => "count",
            Role::Counts => "counts",
            Role::Displs => "displs",
            Role::Type => "type",
            Role::Types => "types",
            Role::Comm => "comm",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Ok(match key {
            "count" => Role::Count,
            "counts" => Role::Counts,
            "displs" => Role::Displs,
            "type" => Role::Type,
            "types" => Role::Types,
            "comm" => Role::Comm,
            _ => return Err(()),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDeps {
    pub count: usize,
    pub datatype: usize,
    pub comm: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VBufferDeps {
    pub counts: usize,
    pub displs: usize,
    pub datatype: usize,
    pub comm: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VBufferOutDeps {
    pub datatype: usize,
    pub comm: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WBufferDeps {
    pub counts: usize,
    pub displs: usize,
    pub types: usize,
    pub comm: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountDeps {
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommDeps {
    pub comm: usize,
}

/// Intent and asynchrony of a contiguous choice buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferMode {
    In,
    Async,
    Out,
    AsyncOut,
}

/// A resolved parameter kind with its dependency record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FortranType {
    Buffer(BufferType),
    VBuffer(VBufferType),
    VBufferOut(VBufferOutType),
    WBuffer(WBufferType),
    Count(CountType),
    Datatype(DatatypeType),
    DatatypeArray(DatatypeArrayType),
    Int(IntType),
    IndexOut(IndexOutType),
    LogicalOut(LogicalOutType),
    Comm(CommType),
    Status(StatusType),
    ShortcutCount(ShortcutCountType),
    Request(RequestType),
    RequestArray(RequestArrayType),
    StatusArray(StatusArrayType),
    IntArray(IntArrayType),
}

impl FortranType {
    /// Builds the payload for `kind`, asking `sibling` for the index of
    /// each role the kind depends on.
    pub fn build(
        kind: FortranKind,
        mut sibling: impl FnMut(Role) -> BindingResult<usize>,
    ) -> BindingResult<Self> {
        use FortranKind as K;
        Ok(match kind {
            K::Buffer | K::BufferAsync | K::BufferOut | K::BufferAsyncOut => {
                let mode = match kind {
                    K::BufferAsync => BufferMode::Async,
                    K::BufferOut => BufferMode::Out,
                    K::BufferAsyncOut => BufferMode::AsyncOut,
                    _ => BufferMode::In,
                };
                FortranType::Buffer(BufferType {
                    mode,
                    deps: BufferDeps {
                        count: sibling(Role::Count)?,
                        datatype: sibling(Role::Type)?,
                        comm: sibling(Role::Comm)?,
                    },
                })
            }
            K::VBuffer => FortranType::VBuffer(VBufferType {
                deps: VBufferDeps {
                    counts: sibling(Role::Counts)?,
                    displs: sibling(Role::Displs)?,
                    datatype: sibling(Role::Type)?,
                    comm: sibling(Role::Comm)?,
                },
            }),
            K::VBufferOut => FortranType::VBufferOut(VBufferOutType {
                deps: VBufferOutDeps {
                    datatype: sibling(Role::Type)?,
                    comm: sibling(Role::Comm)?,
                },
            }),
            K::WBuffer | K::WBufferOut => FortranType::WBuffer(WBufferType {
                out: kind == K::WBufferOut,
                deps: WBufferDeps {
                    counts: sibling(Role::Counts)?,
                    displs: sibling(Role::Displs)?,
                    types: sibling(Role::Types)?,
                    comm: sibling(Role::Comm)?,
                },
            }),
            K::Count => FortranType::Count(CountType),
            K::Datatype => FortranType::Datatype(DatatypeType),
            K::DatatypeArray => FortranType::DatatypeArray(DatatypeArrayType),
            K::Int | K::Rank | K::Tag => FortranType::Int(IntType),
            K::IndexOut => FortranType::IndexOut(IndexOutType),
            K::LogicalOut => FortranType::LogicalOut(LogicalOutType),
            K::Comm => FortranType::Comm(CommType),
            K::Status => FortranType::Status(StatusType),
            K::ShortcutCount => FortranType::ShortcutCount(ShortcutCountType),
            K::Request => FortranType::Request(RequestType),
            K::RequestArray => FortranType::RequestArray(RequestArrayType {
                deps: CountDeps {
                    count: sibling(Role::Count)?,
                },
            }),
            K::StatusArray => FortranType::StatusArray(StatusArrayType {
                deps: CountDeps {
                    count: sibling(Role::Count)?,
                },
            }),
            K::IntArray => FortranType::IntArray(IntArrayType {
                deps: CommDeps {
                    comm: sibling(Role::Comm)?,
                },
            }),
        })
    }

    pub fn rules(&self) -> &dyn FortranTypeRules {
        match self {
            FortranType::Buffer(t) => t,
            FortranType::VBuffer(t) => t,
            FortranType::VBufferOut(t) => t,
            FortranType::WBuffer(t) => t,
            FortranType::Count(t) => t,
            FortranType::Datatype(t) => t,
            FortranType::DatatypeArray(t) => t,
            FortranType::Int(t) => t,
            FortranType::IndexOut(t) => t,
            FortranType::LogicalOut(t) => t,
            FortranType::Comm(t) => t,
            FortranType::Status(t) => t,
            FortranType::ShortcutCount(t) => t,
            FortranType::Request(t) => t,
            FortranType::RequestArray(t) => t,
            FortranType::StatusArray(t) => t,
            FortranType::IntArray(t) => t,
        }
    }

    /// Whether this parameter reads the size of the communicator at `comm`.
    fn uses_comm_size(&self, comm: usize, ts: bool) -> bool {
        match self {
            FortranType::WBuffer(t) => t.deps.comm == comm,
            FortranType::VBuffer(t) => ts && t.deps.comm == comm,
            _ => false,
        }
    }

    fn is_buffer_of(&self, datatype: usize) -> bool {
        matches!(self, FortranType::Buffer(t) if t.deps.datatype == datatype)
    }
}

/// What the rules of one binding can see: its function and all parameters.
#[derive(Clone, Copy, Debug)]
pub struct Scope<'a> {
    pub fn_name: &'a str,
    pub bigcount: bool,
    pub ts: bool,
    pub params: &'a [FortranParameter],
}

/// One parameter seen through its binding, with access to its siblings.
#[derive(Clone, Copy, Debug)]
pub struct ParamRef<'a> {
    scope: Scope<'a>,
    index: usize,
}

impl<'a> ParamRef<'a> {
    pub fn new(scope: Scope<'a>, index: usize) -> Self {
        Self { scope, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'a str {
        &self.scope.params[self.index].name
    }

    pub fn ty(&self) -> &'a FortranType {
        &self.scope.params[self.index].ty
    }

    pub fn sibling(&self, index: usize) -> ParamRef<'a> {
        ParamRef::new(self.scope, index)
    }

    pub fn bigcount(&self) -> bool {
        self.scope.bigcount
    }

    pub fn ts(&self) -> bool {
        self.scope.ts
    }

    /// C temporary holding the converted value.
    pub fn tmp_name(&self) -> String {
        format!("c_{}", self.name())
    }

    pub fn tmp_name2(&self) -> String {
        format!("c_{}2", self.name())
    }

    /// C temporary holding the size of a communicator parameter.
    pub fn comm_size(&self) -> String {
        format!("c_{}_size", self.name())
    }

    /// Upper-case C API name used in error reports, e.g. `MPI_SEND_C`.
    pub fn fn_api_name(&self) -> String {
        names::ext_api_func_name(self.scope.fn_name, self.scope.bigcount).to_uppercase()
    }

    pub fn c_argument(&self) -> String {
        self.ty().rules().c_argument(self)
    }

    /// The first contiguous buffer typed by this datatype. Under TS it
    /// derives `c_{name}2` from its descriptor; later buffers must be
    /// contiguous.
    fn converting_buffer(&self) -> Option<usize> {
        self.scope
            .params
            .iter()
            .position(|param| param.ty.is_buffer_of(self.index))
    }

    fn needs_comm_size(&self) -> bool {
        self.scope
            .params
            .iter()
            .any(|param| param.ty.uses_comm_size(self.index, self.scope.ts))
    }
}

/// Code generation rules of one Fortran kind.
///
/// The first group of methods produces the Fortran subroutine and its
/// `BIND(C)` interface; the `c_` methods produce the C trampoline.
pub trait FortranTypeRules {
    /// Extra declaration needed before `declare` in interface blocks.
    fn interface_predeclare(&self, _p: &ParamRef<'_>) -> Option<String> {
        None
    }

    fn declare(&self, p: &ParamRef<'_>) -> String;

    /// Fortran temporaries of the subroutine.
    fn declare_tmp(&self, _p: &ParamRef<'_>) -> Option<String> {
        None
    }

    /// Declaration inside the `BIND(C)` interface of the trampoline.
    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        self.declare(p)
    }

    /// Actual argument passed to the trampoline from Fortran.
    fn argument(&self, p: &ParamRef<'_>) -> String {
        p.name().to_string()
    }

    /// `(module, name)` pairs to import.
    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Fortran statements run after the trampoline returns.
    fn post(&self, _p: &ParamRef<'_>) -> Option<String> {
        None
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String;

    fn c_declare_tmp(&self, _p: &ParamRef<'_>) -> Vec<Block> {
        Vec::new()
    }

    /// When true, the trampoline returns early without calling the C API.
    fn c_shortcut_condition(&self, _p: &ParamRef<'_>) -> Option<String> {
        None
    }

    /// Output values set by another parameter's shortcut.
    fn c_shortcut_code(&self, _p: &ParamRef<'_>) -> Vec<Block> {
        Vec::new()
    }

    fn c_prepare(&self, _p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        Vec::new()
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.name().to_string()
    }

    fn c_post(&self, _p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        Vec::new()
    }
}

/// Stores the error, invokes the communicator's error handler and returns.
fn fail_on_error(comm_tmp: &str, fn_api_name: &str) -> Block {
    Block::if_then(
        format!("MPI_SUCCESS != {C_ERROR_TMP_NAME}"),
        vec![
            Block::stmt(format!(
                "*{C_ERROR_NAME} = OMPI_INT_2_FINT({C_ERROR_TMP_NAME});"
            )),
            Block::stmt(format!(
                "OMPI_ERRHANDLER_INVOKE({comm_tmp}, {C_ERROR_TMP_NAME}, \"{fn_api_name}\");"
            )),
            Block::stmt("return;"),
        ],
    )
}

fn check_contiguous(name: &str, comm_tmp: &str, fn_api_name: &str) -> Vec<Block> {
    vec![
        Block::stmt(format!(
            "OMPI_CFI_CHECK_CONTIGUOUS({name}, {C_ERROR_TMP_NAME});"
        )),
        fail_on_error(comm_tmp, fn_api_name),
    ]
}

/// `malloc` with the out-of-memory path of the trampolines.
fn allocate_array(name: &str, size: &str, fn_api_name: &str) -> Vec<Block> {
    vec![
        Block::stmt(format!("{name} = malloc({size});")),
        Block::if_then(
            format!("NULL == {name}"),
            vec![
                Block::stmt(format!(
                    "{C_ERROR_TMP_NAME} = OMPI_ERRHANDLER_NOHANDLE_INVOKE(MPI_ERR_NO_MEM, \"{fn_api_name}\");"
                )),
                Block::stmt(format!(
                    "*{C_ERROR_NAME} = OMPI_INT_2_FINT({C_ERROR_TMP_NAME});"
                )),
                Block::stmt("return;"),
            ],
        ),
    ]
}

fn on_success(body: Vec<Block>) -> Block {
    Block::if_then(format!("MPI_SUCCESS == {C_ERROR_TMP_NAME}"), body)
}

fn choice_buffer(intent_in: bool, asynchronous: bool) -> String {
    let mut decl = IGNORE_TKR_TYPE.to_string();
    if intent_in {
        decl.push_str(", INTENT(IN)");
    }
    if asynchronous {
        decl.push_str(" OMPI_ASYNCHRONOUS");
    }
    decl
}

fn ignore_tkr(p: &ParamRef<'_>) -> Option<String> {
    Some(format!("{IGNORE_TKR_PREDECL} {}", p.name()))
}

fn buffer_c_parameter(p: &ParamRef<'_>) -> String {
    if p.ts() {
        format!("CFI_cdesc_t *{}", p.name())
    } else {
        format!("char *{}", p.name())
    }
}

/// Buffer address as seen by C: the descriptor's base address under TS.
fn buffer_address(p: &ParamRef<'_>) -> String {
    if p.ts() {
        p.tmp_name()
    } else {
        p.name().to_string()
    }
}

fn fint_pointer(p: &ParamRef<'_>) -> String {
    format!("MPI_Fint *{}", p.name())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferType {
    pub mode: BufferMode,
    pub deps: BufferDeps,
}

impl FortranTypeRules for BufferType {
    fn interface_predeclare(&self, p: &ParamRef<'_>) -> Option<String> {
        ignore_tkr(p)
    }

    fn declare(&self, p: &ParamRef<'_>) -> String {
        let (intent_in, asynchronous) = match self.mode {
            BufferMode::In => (true, false),
            BufferMode::Async => (true, true),
            BufferMode::Out => (false, false),
            BufferMode::AsyncOut => (false, true),
        };
        format!("{} :: {}", choice_buffer(intent_in, asynchronous), p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        buffer_c_parameter(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        vec![Block::stmt(format!(
            "void *{} = {}->base_addr;",
            p.tmp_name(),
            p.name()
        ))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        let datatype = p.sibling(self.deps.datatype);
        let count = p.sibling(self.deps.count);
        let comm = p.sibling(self.deps.comm);
        if datatype.converting_buffer() != Some(p.index()) {
            return check_contiguous(p.name(), &comm.tmp_name(), &p.fn_api_name());
        }
        vec![
            Block::stmt(format!(
                "OMPI_CFI_2_C({}, {}, {}, {}, {C_ERROR_TMP_NAME});",
                p.name(),
                count.tmp_name(),
                datatype.tmp_name(),
                datatype.tmp_name2()
            )),
            fail_on_error(&comm.tmp_name(), &p.fn_api_name()),
        ]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("OMPI_F2C_BOTTOM({})", buffer_address(p))
    }
}

/// Send buffer of the `MPI_*v` collectives, possibly `MPI_IN_PLACE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VBufferType {
    pub deps: VBufferDeps,
}

impl FortranTypeRules for VBufferType {
    fn interface_predeclare(&self, p: &ParamRef<'_>) -> Option<String> {
        ignore_tkr(p)
    }

    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("{} :: {}", choice_buffer(true, false), p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        buffer_c_parameter(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        vec![Block::stmt(format!(
            "char *{} = {}->base_addr;",
            p.tmp_name(),
            p.name()
        ))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        let comm = p.sibling(self.deps.comm);
        let size = comm.comm_size();
        let mut then = check_contiguous(p.name(), &comm.tmp_name(), &p.fn_api_name());
        for array in [self.deps.counts, self.deps.displs] {
            then.push(Block::stmt(format!(
                "OMPI_ARRAY_FINT_2_INT({}, {size});",
                p.sibling(array).name()
            )));
        }
        vec![Block::if_else(
            format!(
                "OMPI_COMM_IS_INTER({}) || !OMPI_IS_FORTRAN_IN_PLACE({})",
                comm.tmp_name(),
                p.tmp_name()
            ),
            then,
            vec![Block::stmt(format!("{} = MPI_IN_PLACE;", p.tmp_name()))],
        )]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        if p.ts() {
            format!("OMPI_F2C_BOTTOM({})", p.tmp_name())
        } else {
            format!("OMPI_F2C_BOTTOM(OMPI_F2C_IN_PLACE({}))", p.name())
        }
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        [self.deps.counts, self.deps.displs]
            .into_iter()
            .map(|array| {
                Block::stmt(format!(
                    "OMPI_ARRAY_FINT_2_INT_CLEANUP({});",
                    p.sibling(array).name()
                ))
            })
            .collect()
    }
}

/// Receive buffer of the `MPI_*v` collectives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VBufferOutType {
    pub deps: VBufferOutDeps,
}

impl FortranTypeRules for VBufferOutType {
    fn interface_predeclare(&self, p: &ParamRef<'_>) -> Option<String> {
        ignore_tkr(p)
    }

    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("{} :: {}", choice_buffer(false, false), p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        buffer_c_parameter(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        vec![Block::stmt(format!(
            "char *{} = {}->base_addr;",
            p.tmp_name(),
            p.name()
        ))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        let comm = p.sibling(self.deps.comm);
        check_contiguous(p.name(), &comm.tmp_name(), &p.fn_api_name())
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("OMPI_F2C_BOTTOM({})", buffer_address(p))
    }
}

/// Buffers of the `MPI_*w` collectives, with one datatype per peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WBufferType {
    pub out: bool,
    pub deps: WBufferDeps,
}

impl FortranTypeRules for WBufferType {
    fn interface_predeclare(&self, p: &ParamRef<'_>) -> Option<String> {
        ignore_tkr(p)
    }

    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("{} :: {}", choice_buffer(!self.out, false), p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        buffer_c_parameter(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        let mut code = vec![Block::stmt(format!(
            "MPI_Datatype *{} = NULL;",
            p.sibling(self.deps.types).tmp_name()
        ))];
        if p.ts() {
            code.push(Block::stmt(format!(
                "char *{} = {}->base_addr;",
                p.tmp_name(),
                p.name()
            )));
        }
        code
    }

    fn c_prepare(&self, p: &ParamRef<'_>, names: &mut TempNames) -> Vec<Block> {
        let comm = p.sibling(self.deps.comm);
        let types = p.sibling(self.deps.types);
        let size = comm.comm_size();
        let fn_api_name = p.fn_api_name();

        let mut code = Vec::new();
        if p.ts() {
            code.extend(check_contiguous(p.name(), &comm.tmp_name(), &fn_api_name));
        }

        let mut convert = allocate_array(
            &types.tmp_name(),
            &format!("{size} * sizeof(MPI_Datatype)"),
            &fn_api_name,
        );
        let i = names.counter(types.name());
        convert.push(Block::for_range(
            i.clone(),
            size.clone(),
            vec![Block::stmt(format!(
                "{}[{i}] = PMPI_Type_f2c({}[{i}]);",
                types.tmp_name(),
                types.name()
            ))],
        ));
        for array in [self.deps.counts, self.deps.displs] {
            convert.push(Block::stmt(format!(
                "OMPI_ARRAY_FINT_2_INT({}, {size});",
                p.sibling(array).name()
            )));
        }

        if self.out {
            code.extend(convert);
        } else {
            code.push(Block::if_then(
                format!("!OMPI_IS_FORTRAN_IN_PLACE({})", buffer_address(p)),
                convert,
            ));
        }
        code
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        if self.out {
            format!("OMPI_F2C_BOTTOM({})", buffer_address(p))
        } else {
            format!("OMPI_F2C_BOTTOM(OMPI_F2C_IN_PLACE({}))", buffer_address(p))
        }
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        let mut cleanup = vec![Block::stmt(format!(
            "free({});",
            p.sibling(self.deps.types).tmp_name()
        ))];
        for array in [self.deps.counts, self.deps.displs] {
            cleanup.push(Block::stmt(format!(
                "OMPI_ARRAY_FINT_2_INT_CLEANUP({});",
                p.sibling(array).name()
            )));
        }
        if self.out {
            cleanup
        } else {
            vec![Block::if_then(
                format!("!OMPI_IS_FORTRAN_IN_PLACE({})", buffer_address(p)),
                cleanup,
            )]
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountType;

impl FortranTypeRules for CountType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        if p.bigcount() {
            format!("INTEGER(KIND=MPI_COUNT_KIND), INTENT(IN) :: {}", p.name())
        } else {
            format!("INTEGER, INTENT(IN) :: {}", p.name())
        }
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_COUNT_KIND")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        let ty = if p.bigcount() { "MPI_Count" } else { "MPI_Fint" };
        format!("{ty} *{}", p.name())
    }

    /// Under TS the buffer conversion needs the count as a C value.
    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        let init = if p.bigcount() {
            format!("MPI_Count {} = *{};", p.tmp_name(), p.name())
        } else {
            format!("int {} = OMPI_FINT_2_INT(*{});", p.tmp_name(), p.name())
        };
        vec![Block::stmt(init)]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        match (p.ts(), p.bigcount()) {
            (true, _) => p.tmp_name(),
            (false, true) => format!("*{}", p.name()),
            (false, false) => format!("OMPI_FINT_2_INT(*{})", p.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatatypeType;

impl FortranTypeRules for DatatypeType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Datatype), INTENT(IN) :: {}", p.name())
    }

    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(IN) :: {}", p.name())
    }

    fn argument(&self, p: &ParamRef<'_>) -> String {
        format!("{}%MPI_VAL", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Datatype")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    /// Under TS `c_{name}2` is what the C API receives. It stays the plain
    /// handle unless a buffer descriptor derives a new type into it.
    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        if !p.ts() {
            return Vec::new();
        }
        vec![Block::stmt(format!(
            "MPI_Datatype {tmp} = PMPI_Type_f2c(*{}), {} = {tmp};",
            p.name(),
            p.tmp_name2(),
            tmp = p.tmp_name(),
        ))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if p.ts() {
            return Vec::new();
        }
        vec![Block::stmt(format!(
            "MPI_Datatype {} = PMPI_Type_f2c(*{});",
            p.tmp_name(),
            p.name()
        ))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        if p.ts() { p.tmp_name2() } else { p.tmp_name() }
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        if !p.ts() || p.converting_buffer().is_none() {
            return Vec::new();
        }
        let (tmp, tmp2) = (p.tmp_name(), p.tmp_name2());
        vec![Block::if_then(
            format!("{tmp2} != {tmp}"),
            vec![Block::stmt(format!("ompi_datatype_destroy(&{tmp2});"))],
        )]
    }
}

/// Converted by the `WBUFFER` that depends on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatatypeArrayType;

impl FortranTypeRules for DatatypeArrayType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Datatype), INTENT(IN) :: {}(*)", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Datatype")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }
}

/// `INT`, `RANK` and `TAG`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntType;

impl FortranTypeRules for IntType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(IN) :: {}", p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("OMPI_FINT_2_INT(*{})", p.name())
    }
}

/// Zero-based index returned by C, one-based in Fortran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOutType;

impl FortranTypeRules for IndexOutType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(OUT) :: {}", p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("int {};", p.tmp_name()))]
    }

    fn c_shortcut_code(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!(
            "*{} = OMPI_INT_2_FINT(MPI_UNDEFINED);",
            p.name()
        ))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("&{}", p.tmp_name())
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        let tmp = p.tmp_name();
        vec![Block::if_then(
            format!("MPI_SUCCESS == {C_ERROR_TMP_NAME} && MPI_UNDEFINED != {tmp}"),
            vec![
                Block::stmt(format!("{tmp} += 1;")),
                Block::stmt(format!("*{} = OMPI_INT_2_FINT({tmp});", p.name())),
            ],
        )]
    }
}

/// LOGICAL does not cross the language boundary reliably, so an INTEGER
/// temporary is passed and the flag is set from it afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalOutType;

impl FortranTypeRules for LogicalOutType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("LOGICAL, INTENT(OUT) :: {}", p.name())
    }

    fn declare_tmp(&self, p: &ParamRef<'_>) -> Option<String> {
        Some(format!("INTEGER :: {} = 0", p.tmp_name()))
    }

    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(OUT) :: {}", p.name())
    }

    fn argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }

    fn post(&self, p: &ParamRef<'_>) -> Option<String> {
        Some(format!("{} = {} /= 0", p.name(), p.tmp_name()))
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("int {};", p.tmp_name()))]
    }

    fn c_shortcut_code(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("*{} = OMPI_INT_2_FINT(1);", p.name()))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("&{}", p.tmp_name())
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!(
            "*{} = OMPI_INT_2_FINT({});",
            p.name(),
            p.tmp_name()
        ))]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommType;

impl FortranTypeRules for CommType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Comm), INTENT(IN) :: {}", p.name())
    }

    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(IN) :: {}", p.name())
    }

    fn argument(&self, p: &ParamRef<'_>) -> String {
        format!("{}%MPI_VAL", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Comm")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        let tmp = p.tmp_name();
        let mut code = vec![Block::stmt(format!(
            "MPI_Comm {tmp} = PMPI_Comm_f2c(*{});",
            p.name()
        ))];
        if p.needs_comm_size() {
            code.push(Block::stmt(format!(
                "int {} = OMPI_COMM_IS_INTER({tmp}) ? ompi_comm_remote_size({tmp}) : ompi_comm_size({tmp});",
                p.comm_size()
            )));
        }
        code
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusType;

impl FortranTypeRules for StatusType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Status), INTENT(OUT) :: {}", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Status")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        let (tmp, tmp2) = (p.tmp_name(), p.tmp_name2());
        vec![
            Block::stmt(format!("OMPI_FORTRAN_STATUS_DECLARATION({tmp}, {tmp2});")),
            Block::stmt(format!(
                "OMPI_FORTRAN_STATUS_SET_POINTER({tmp}, {tmp2}, {});",
                p.name()
            )),
        ]
    }

    fn c_shortcut_code(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!(
            "PMPI_Status_c2f(&ompi_status_empty, {});",
            p.name()
        ))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![Block::stmt(format!(
            "OMPI_FORTRAN_STATUS_RETURN({}, {}, {}, {C_ERROR_TMP_NAME});",
            p.tmp_name(),
            p.tmp_name2(),
            p.name()
        ))]
    }
}

/// A count that, when zero, completes the call without entering C.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutCountType;

impl FortranTypeRules for ShortcutCountType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(IN) :: {}", p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_shortcut_condition(&self, p: &ParamRef<'_>) -> Option<String> {
        Some(format!("OPAL_UNLIKELY(0 == OMPI_FINT_2_INT(*{}))", p.name()))
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("OMPI_FINT_2_INT(*{})", p.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestType;

impl FortranTypeRules for RequestType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Request), INTENT(OUT) :: {}", p.name())
    }

    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(OUT) :: {}", p.name())
    }

    fn argument(&self, p: &ParamRef<'_>) -> String {
        format!("{}%MPI_VAL", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Request")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("MPI_Request {};", p.tmp_name()))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("&{}", p.tmp_name())
    }

    fn c_post(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        vec![on_success(vec![Block::stmt(format!(
            "*{} = PMPI_Request_c2f({});",
            p.name(),
            p.tmp_name()
        ))])]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestArrayType {
    pub deps: CountDeps,
}

impl FortranTypeRules for RequestArrayType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!(
            "TYPE(MPI_Request), INTENT(INOUT) :: {}({})",
            p.name(),
            p.sibling(self.deps.count).name()
        )
    }

    fn declare_cbinding_fortran(&self, p: &ParamRef<'_>) -> String {
        format!(
            "INTEGER, INTENT(INOUT) :: {}({})",
            p.name(),
            p.sibling(self.deps.count).name()
        )
    }

    fn argument(&self, p: &ParamRef<'_>) -> String {
        format!("{}(:)%MPI_VAL", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Request")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("MPI_Request *{} = NULL;", p.tmp_name()))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, names: &mut TempNames) -> Vec<Block> {
        let tmp = p.tmp_name();
        let count = p.sibling(self.deps.count).c_argument();
        let mut code = allocate_array(
            &tmp,
            &format!("{count} * sizeof(MPI_Request)"),
            &p.fn_api_name(),
        );
        let i = names.counter(p.name());
        code.push(Block::for_range(
            i.clone(),
            count,
            vec![Block::stmt(format!(
                "{tmp}[{i}] = PMPI_Request_f2c({}[{i}]);",
                p.name()
            ))],
        ));
        code
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }

    fn c_post(&self, p: &ParamRef<'_>, names: &mut TempNames) -> Vec<Block> {
        let tmp = p.tmp_name();
        let i = names.counter(p.name());
        vec![
            on_success(vec![Block::for_range(
                i.clone(),
                p.sibling(self.deps.count).c_argument(),
                vec![Block::stmt(format!(
                    "{}[{i}] = {tmp}[{i}]->req_f_to_c_index;",
                    p.name()
                ))],
            )]),
            Block::stmt(format!("free({tmp});")),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusArrayType {
    pub deps: CountDeps,
}

impl FortranTypeRules for StatusArrayType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("TYPE(MPI_Status), INTENT(OUT) :: {}(*)", p.name())
    }

    fn uses(&self) -> &'static [(&'static str, &'static str)] {
        &[(TYPES_MODULE, "MPI_Status")]
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("MPI_Status *{} = NULL;", p.tmp_name()))]
    }

    fn c_prepare(&self, p: &ParamRef<'_>, _names: &mut TempNames) -> Vec<Block> {
        allocate_array(
            &p.tmp_name(),
            &format!(
                "{} * sizeof(MPI_Status)",
                p.sibling(self.deps.count).c_argument()
            ),
            &p.fn_api_name(),
        )
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        p.tmp_name()
    }

    fn c_post(&self, p: &ParamRef<'_>, names: &mut TempNames) -> Vec<Block> {
        let (name, tmp) = (p.name(), p.tmp_name());
        let i = names.counter(name);
        let copy_out = Block::if_then(
            format!(
                "!OMPI_IS_FORTRAN_STATUSES_IGNORE({name}) && !OMPI_IS_FORTRAN_STATUS_IGNORE(&{name}[{i}])"
            ),
            vec![Block::stmt(format!(
                "PMPI_Status_c2f(&{tmp}[{i}], &{name}[{i} * (sizeof(MPI_Status) / sizeof(int))]);"
            ))],
        );
        vec![
            on_success(vec![Block::for_range(
                i.clone(),
                p.sibling(self.deps.count).c_argument(),
                vec![copy_out],
            )]),
            Block::stmt(format!("free({tmp});")),
        ]
    }
}

/// Integer arrays of the `MPI_*v` collectives; converted by their buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntArrayType {
    pub deps: CommDeps,
}

impl FortranTypeRules for IntArrayType {
    fn declare(&self, p: &ParamRef<'_>) -> String {
        format!("INTEGER, INTENT(IN) :: {}(*)", p.name())
    }

    fn c_parameter(&self, p: &ParamRef<'_>) -> String {
        fint_pointer(p)
    }

    fn c_declare_tmp(&self, p: &ParamRef<'_>) -> Vec<Block> {
        vec![Block::stmt(format!("OMPI_ARRAY_NAME_DECL({});", p.name()))]
    }

    fn c_argument(&self, p: &ParamRef<'_>) -> String {
        format!("OMPI_ARRAY_NAME_CONVERT({})", p.name())
    }
}
