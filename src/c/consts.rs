//! Fixed names shared by the generated C sources and the ABI header.
//!
//! The order of every constant list is part of the binary contract between
//! the two ABIs: header defines are numbered from 1 in declaration order.

pub const INLINE_ATTRS: &str = "static inline";

/// Standard ABI -> runtime conversion functions, emitted into the internal header.
pub mod convert {
    pub const ERROR_CLASS: &str = "ompi_convert_abi_error_intern_error";
    pub const COMM: &str = "ompi_convert_abi_comm_intern_comm";
    pub const INFO: &str = "ompi_convert_abi_info_intern_info";
    pub const FILE: &str = "ompi_convert_intern_file_abi_file";
    pub const DATATYPE: &str = "ompi_convert_abi_datatype_intern_datatype";
    pub const OP: &str = "ompi_convert_abi_op_intern_op";
    pub const WIN: &str = "ompi_convert_abi_win_intern_win";
    pub const REQUEST: &str = "ompi_convert_ompi_request_abi_request";
    pub const STATUS: &str = "ompi_convert_intern_status_abi_status";
}

/// Runtime -> standard ABI conversion functions.
pub mod convert_to_standard {
    pub const COMM: &str = "ompi_convert_comm_ompi_to_standard";
}

pub const ERROR_CLASSES: &[&str] = &[
    "MPI_SUCCESS",
    "MPI_ERR_BUFFER",
    "MPI_ERR_COUNT",
    "MPI_ERR_TYPE",
    "MPI_ERR_TAG",
    "MPI_ERR_COMM",
    "MPI_ERR_RANK",
    "MPI_ERR_REQUEST",
    "MPI_ERR_ROOT",
    "MPI_ERR_GROUP",
    "MPI_ERR_OP",
    "MPI_ERR_TOPOLOGY",
    "MPI_ERR_DIMS",
    "MPI_ERR_ARG",
    "MPI_ERR_UNKNOWN",
    "MPI_ERR_TRUNCATE",
    "MPI_ERR_OTHER",
    "MPI_ERR_INTERN",
    "MPI_ERR_IN_STATUS",
    "MPI_ERR_PENDING",
    "MPI_ERR_ACCESS",
    "MPI_ERR_AMODE",
    "MPI_ERR_ASSERT",
    "MPI_ERR_BAD_FILE",
    "MPI_ERR_BASE",
    "MPI_ERR_CONVERSION",
    "MPI_ERR_DISP",
    "MPI_ERR_DUP_DATAREP",
    "MPI_ERR_FILE_EXISTS",
    "MPI_ERR_FILE_IN_USE",
    "MPI_ERR_FILE",
    "MPI_ERR_INFO_KEY",
    "MPI_ERR_INFO_NOKEY",
    "MPI_ERR_INFO_VALUE",
    "MPI_ERR_INFO",
    "MPI_ERR_IO",
    "MPI_ERR_KEYVAL",
    "MPI_ERR_LOCKTYPE",
    "MPI_ERR_NAME",
    "MPI_ERR_NO_MEM",
    "MPI_ERR_NOT_SAME",
    "MPI_ERR_NO_SPACE",
    "MPI_ERR_NO_SUCH_FILE",
    "MPI_ERR_PORT",
    "MPI_ERR_QUOTA",
    "MPI_ERR_READ_ONLY",
    "MPI_ERR_RMA_CONFLICT",
    "MPI_ERR_RMA_SYNC",
    "MPI_ERR_SERVICE",
    "MPI_ERR_SIZE",
    "MPI_ERR_SPAWN",
    "MPI_ERR_UNSUPPORTED_DATAREP",
    "MPI_ERR_UNSUPPORTED_OPERATION",
    "MPI_ERR_WIN",
    "MPI_T_ERR_MEMORY",
    "MPI_T_ERR_NOT_INITIALIZED",
    "MPI_T_ERR_CANNOT_INIT",
    "MPI_T_ERR_INVALID_INDEX",
    "MPI_T_ERR_INVALID_ITEM",
    "MPI_T_ERR_INVALID_HANDLE",
    "MPI_T_ERR_OUT_OF_HANDLES",
    "MPI_T_ERR_OUT_OF_SESSIONS",
    "MPI_T_ERR_INVALID_SESSION",
    "MPI_T_ERR_CVAR_SET_NOT_NOW",
    "MPI_T_ERR_CVAR_SET_NEVER",
    "MPI_T_ERR_PVAR_NO_STARTSTOP",
    "MPI_T_ERR_PVAR_NO_WRITE",
    "MPI_T_ERR_PVAR_NO_ATOMIC",
    "MPI_ERR_RMA_RANGE",
    "MPI_ERR_RMA_ATTACH",
    "MPI_ERR_RMA_FLAVOR",
    "MPI_ERR_RMA_SHARED",
    "MPI_T_ERR_INVALID",
    "MPI_T_ERR_INVALID_NAME",
    "MPI_ERR_PROC_ABORTED",
    "MPI_ERR_PROC_FAILED",
    "MPI_ERR_PROC_FAILED_PENDING",
    "MPI_ERR_REVOKED",
    "MPI_ERR_SESSION",
    "MPI_ERR_VALUE_TOO_LARGE",
    "MPI_ERR_ERRHANDLER",
    "MPI_ERR_LASTCODE",
];

pub const PREDEFINED_DATATYPES: &[&str] = &[
    "MPI_DATATYPE_NULL",
    "MPI_CHAR",
    "MPI_SIGNED_CHAR",
    "MPI_UNSIGNED_CHAR",
    "MPI_BYTE",
    "MPI_SHORT",
    "MPI_UNSIGNED_SHORT",
    "MPI_INT",
    "MPI_UNSIGNED",
    "MPI_LONG",
    "MPI_UNSIGNED_LONG",
    "MPI_LONG_LONG_INT",
    "MPI_UNSIGNED_LONG_LONG",
    "MPI_FLOAT",
    "MPI_DOUBLE",
    "MPI_LONG_DOUBLE",
    "MPI_WCHAR",
    "MPI_C_BOOL",
    "MPI_INT8_T",
    "MPI_INT16_T",
    "MPI_INT32_T",
    "MPI_INT64_T",
    "MPI_UINT8_T",
    "MPI_UINT16_T",
    "MPI_UINT32_T",
    "MPI_UINT64_T",
    "MPI_AINT",
    "MPI_COUNT",
    "MPI_OFFSET",
    "MPI_C_COMPLEX",
    "MPI_C_FLOAT_COMPLEX",
    "MPI_C_DOUBLE_COMPLEX",
    "MPI_C_LONG_DOUBLE_COMPLEX",
    "MPI_CXX_BOOL",
    "MPI_CXX_FLOAT_COMPLEX",
    "MPI_CXX_DOUBLE_COMPLEX",
    "MPI_CXX_LONG_DOUBLE_COMPLEX",
    "MPI_FLOAT_INT",
    "MPI_DOUBLE_INT",
    "MPI_LONG_INT",
    "MPI_2INT",
    "MPI_SHORT_INT",
    "MPI_LONG_DOUBLE_INT",
    "MPI_PACKED",
];

pub const COLLECTIVE_OPERATIONS: &[&str] = &[
    "MPI_MAX",
    "MPI_MIN",
    "MPI_SUM",
    "MPI_PROD",
    "MPI_MAXLOC",
    "MPI_MINLOC",
    "MPI_BAND",
    "MPI_BOR",
    "MPI_BXOR",
    "MPI_LAND",
    "MPI_LOR",
    "MPI_LXOR",
    "MPI_REPLACE",
    "MPI_NO_OP",
];

pub const RESERVED_COMMUNICATORS: &[&str] = &["MPI_COMM_NULL", "MPI_COMM_WORLD", "MPI_COMM_SELF"];

pub const RESERVED_REQUESTS: &[&str] = &["MPI_REQUEST_NULL"];

pub const RESERVED_WINDOWS: &[&str] = &["MPI_WIN_NULL"];

pub const RESERVED_INFOS: &[&str] = &["MPI_INFO_ENV", "MPI_INFO_NULL"];

pub const RESERVED_FILES: &[&str] = &["MPI_FILE_NULL"];

pub const IGNORED_STATUS_HANDLES: &[&str] = &["MPI_STATUSES_IGNORE", "MPI_STATUS_IGNORE"];

pub const COMMUNICATOR_SPLIT_TYPES: &[&str] = &[
    "MPI_COMM_TYPE_SHARED",
    "MPI_COMM_TYPE_HW_UNGUIDED",
    "MPI_COMM_TYPE_HW_GUIDED",
];

/// Plain integer constants that keep their value across both ABIs.
pub const VARIOUS_CONSTANTS: &[(&str, i64)] = &[
    ("MPI_MAX_PROCESSOR_NAME", 256),
    ("MPI_MAX_LIBRARY_VERSION_STRING", 8192),
    ("MPI_MAX_ERROR_STRING", 512),
    ("MPI_MAX_DATAREP_STRING", 128),
    ("MPI_MAX_INFO_KEY", 256),
    ("MPI_MAX_INFO_VAL", 1024),
    ("MPI_MAX_OBJECT_NAME", 128),
    ("MPI_MAX_PORT_NAME", 1024),
    ("MPI_MAX_PSET_NAME_LEN", 256),
    ("MPI_MAX_STRINGTAG_LEN", 1024),
    ("MPI_ANY_SOURCE", -1),
    ("MPI_PROC_NULL", -2),
    ("MPI_ROOT", -3),
    ("MPI_ANY_TAG", -4),
    ("MPI_UNDEFINED", -32766),
    ("MPI_BSEND_OVERHEAD", 512),
];

/// Scalar typedefs of the standard ABI.
pub const C_OPAQUE_TYPES: &[(&str, &str)] = &[
    ("MPI_Aint", "intptr_t"),
    ("MPI_Offset", "int64_t"),
    ("MPI_Count", "int64_t"),
    ("MPI_Fint", "int"),
];

/// Opaque handle types, declared as pointers to incomplete structs.
pub const C_HANDLES: &[&str] = &[
    "MPI_Comm",
    "MPI_Datatype",
    "MPI_Errhandler",
    "MPI_File",
    "MPI_Group",
    "MPI_Info",
    "MPI_Message",
    "MPI_Op",
    "MPI_Request",
    "MPI_Session",
    "MPI_Win",
];
