use super::consts::{self, INLINE_ATTRS, convert, convert_to_standard};
use crate::{
    codegen::{Block, Mangle, names},
    errors::{Axis, BindingResult},
    output::LineSink,
    prototype::Prototype,
};

const CPP_OPEN: &[&str] = &[
    "#if defined(c_plusplus) || defined(__cplusplus)",
    "extern \"C\" {",
    "#endif",
];

const CPP_CLOSE: &[&str] = &["#if defined(c_plusplus) || defined(__cplusplus)", "}", "#endif"];

const CAST_CONSTANT: &[&str] = &[
    "#if defined(c_plusplus) || defined(__cplusplus)",
    "#define OMPI_CAST_CONSTANT(type, value) (static_cast<type> (static_cast<void *> (value)))",
    "#else",
    "#define OMPI_CAST_CONSTANT(type, value) ((type) ((void *) value))",
    "#endif",
];

/// Builds the standard ABI header, either the internal one used by the
/// wrappers (names suffixed with `_ABI_INTERNAL`, plus conversion helpers)
/// or the external one installed for applications.
#[derive(Debug)]
pub struct AbiHeaderBuilder {
    mangle: Mangle,
    signatures: Vec<String>,
}

impl AbiHeaderBuilder {
    pub fn new(prototypes: &[Prototype], external: bool) -> BindingResult<Self> {
        let mangle = if external {
            Mangle::External
        } else {
            Mangle::Internal
        };
        let mut signatures = Vec::new();
        for prototype in prototypes {
            let base_name = names::mpi_fn_name(&prototype.name);
            let mut variants = vec![false];
            if prototype.need_bigcount() {
                variants.push(true);
            }
            for bigcount in variants {
                let fn_name = format!("{base_name}{}", names::bigcount_suffix(bigcount));
                let profiled = names::profiling_name(&fn_name);
                for name in [&fn_name, &profiled] {
                    signatures.push(prototype.signature(Axis::Standard, name, bigcount, mangle)?);
                }
            }
        }
        Ok(Self { mangle, signatures })
    }

    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    fn is_external(&self) -> bool {
        self.mangle == Mangle::External
    }

    fn name(&self, name: &str) -> String {
        self.mangle.apply(name)
    }

    fn guard(&self) -> &'static str {
        if self.is_external() {
            "_MPI_ABI_"
        } else {
            "_ABI_INTERNAL_"
        }
    }

    fn define_all(&self, type_name: &str, constants: &[&str], out: &mut impl LineSink) {
        let type_name = self.name(type_name);
        for (idx, constant) in constants.iter().enumerate() {
            out.dump(&format!(
                "#define {} OMPI_CAST_CONSTANT({type_name}, {})",
                self.name(constant),
                idx + 1
            ));
        }
        out.blank();
    }

    pub fn dump_header(&self, out: &mut impl LineSink) {
        let guard = self.guard();
        out.dump(&format!("#ifndef {guard}"));
        out.dump(&format!("#define {guard}"));
        out.blank();
        out.dump("#include <stddef.h>");
        out.dump("#include <stdint.h>");
        out.blank();
        out.dump_all(CPP_OPEN);
        out.blank();
        out.dump_all(CAST_CONSTANT);
        out.blank();

        for (idx, error) in consts::ERROR_CLASSES.iter().enumerate() {
            out.dump(&format!("#define {} {}", self.name(error), idx + 1));
        }
        out.blank();

        self.define_all("MPI_Datatype", consts::PREDEFINED_DATATYPES, out);
        self.define_all("MPI_Op", consts::COLLECTIVE_OPERATIONS, out);
        self.define_all("MPI_Comm", consts::RESERVED_COMMUNICATORS, out);
        self.define_all("MPI_Request", consts::RESERVED_REQUESTS, out);
        self.define_all("MPI_Win", consts::RESERVED_WINDOWS, out);
        self.define_all("MPI_Info", consts::RESERVED_INFOS, out);
        self.define_all("MPI_File", consts::RESERVED_FILES, out);

        for (name, value) in consts::VARIOUS_CONSTANTS {
            out.dump(&format!("#define {} {value}", self.name(name)));
        }
        out.blank();

        let status_ptr = format!("{} *", self.name("MPI_Status"));
        for (idx, sentinel) in consts::IGNORED_STATUS_HANDLES.iter().enumerate() {
            out.dump(&format!(
                "#define {} OMPI_CAST_CONSTANT({status_ptr}, {})",
                self.name(sentinel),
                idx + 1
            ));
        }
        out.blank();

        for (idx, split_type) in consts::COMMUNICATOR_SPLIT_TYPES.iter().enumerate() {
            out.dump(&format!("#define {} {}", self.name(split_type), idx + 1));
        }
        out.blank();

        for (mpi_type, c_type) in consts::C_OPAQUE_TYPES {
            out.dump(&format!("typedef {c_type} {};", self.name(mpi_type)));
        }
        out.blank();

        for handle in consts::C_HANDLES {
            let tag = handle.replacen("MPI_", "MPI_ABI_", 1);
            out.dump(&format!(
                "typedef struct {} *{};",
                self.name(&tag),
                self.name(handle)
            ));
        }
        out.blank();

        let status_struct = self.name("MPI_Status_ABI");
        out.dump(&format!("struct {status_struct} {{"));
        out.dump("    int MPI_SOURCE;");
        out.dump("    int MPI_TAG;");
        out.dump("    int MPI_ERROR;");
        out.dump("    int mpi_abi_private[5];");
        out.dump("};");
        out.dump(&format!(
            "typedef struct {status_struct} {};",
            self.name("MPI_Status")
        ));
        out.blank();

        for signature in &self.signatures {
            out.dump(&format!("{signature};"));
        }
        out.dump(&format!(
            "int MPI_Abi_details(int *buflen, char *details, {} *info);",
            self.name("MPI_Info")
        ));
        out.dump("int MPI_Abi_supported(int *flag);");
        out.dump("int MPI_Abi_version(int *abi_major, int *abi_minor);");

        if !self.is_external() {
            out.blank();
            self.error_convert_fn(out);
            self.handle_convert_fn(
                convert::COMM,
                "comm",
                "MPI_Comm",
                consts::RESERVED_COMMUNICATORS,
                out,
            );
            self.handle_convert_reverse_fn(
                convert_to_standard::COMM,
                "comm",
                "MPI_Comm",
                consts::RESERVED_COMMUNICATORS,
                out,
            );
            self.handle_convert_fn(convert::INFO, "info", "MPI_Info", consts::RESERVED_INFOS, out);
            self.pointer_convert_fn(convert::FILE, "MPI_File", consts::RESERVED_FILES, out);
            self.handle_convert_fn(
                convert::DATATYPE,
                "datatype",
                "MPI_Datatype",
                consts::PREDEFINED_DATATYPES,
                out,
            );
            self.handle_convert_fn(convert::OP, "op", "MPI_Op", consts::COLLECTIVE_OPERATIONS, out);
            self.handle_convert_fn(convert::WIN, "win", "MPI_Win", consts::RESERVED_WINDOWS, out);
            self.pointer_convert_fn(
                convert::REQUEST,
                "MPI_Request",
                consts::RESERVED_REQUESTS,
                out,
            );
            self.status_convert_fn(out);
        }

        out.blank();
        out.dump_all(CPP_CLOSE);
        out.dump(&format!("#endif /* {guard} */"));
    }

    fn function(&self, signature: String, body: Vec<Block>, out: &mut impl LineSink) {
        out.dump(&format!("{INLINE_ATTRS} {signature}"));
        out.dump("{");
        out.dump_blocks(&body, 1);
        out.dump("}");
        out.blank();
    }

    /// Error classes are looked up in a table; unknown codes pass through.
    fn error_convert_fn(&self, out: &mut impl LineSink) {
        let cases = consts::ERROR_CLASSES
            .iter()
            .map(|error| {
                (
                    self.name(error),
                    vec![Block::stmt(format!("return {error};"))],
                )
            })
            .collect();
        let switch = Block::Switch {
            value: "error_class".into(),
            cases,
            default: Some(vec![Block::stmt("return error_class;")]),
        };
        self.function(
            format!("int {}(int error_class)", convert::ERROR_CLASS),
            vec![switch],
            out,
        );
    }

    /// Standard handle -> runtime handle. Reserved handles map onto their
    /// runtime counterparts, anything else is already a runtime pointer.
    fn handle_convert_fn(
        &self,
        fn_name: &str,
        param: &str,
        type_name: &str,
        values: &[&str],
        out: &mut impl LineSink,
    ) {
        let arms = values
            .iter()
            .map(|value| {
                (
                    format!("{} == {param}", self.name(value)),
                    vec![Block::stmt(format!("return {value};"))],
                )
            })
            .collect();
        let body = vec![
            Block::If {
                arms,
                otherwise: None,
            },
            Block::stmt(format!("return ({type_name}) {param};")),
        ];
        self.function(
            format!("{type_name} {fn_name}({} {param})", self.name(type_name)),
            body,
            out,
        );
    }

    fn handle_convert_reverse_fn(
        &self,
        fn_name: &str,
        param: &str,
        type_name: &str,
        values: &[&str],
        out: &mut impl LineSink,
    ) {
        let abi_type = self.name(type_name);
        let arms = values
            .iter()
            .map(|value| {
                (
                    format!("{value} == {param}"),
                    vec![Block::stmt(format!("return {};", self.name(value)))],
                )
            })
            .collect();
        let body = vec![
            Block::If {
                arms,
                otherwise: None,
            },
            Block::stmt(format!("return ({abi_type}) {param};")),
        ];
        self.function(
            format!("{abi_type} {fn_name}({type_name} {param})"),
            body,
            out,
        );
    }

    /// Rewrites a runtime handle in place when it is one of the reserved values.
    fn pointer_convert_fn(
        &self,
        fn_name: &str,
        type_name: &str,
        values: &[&str],
        out: &mut impl LineSink,
    ) {
        let arms = values
            .iter()
            .map(|value| {
                (
                    format!("{value} == ({type_name}) *ptr"),
                    vec![Block::stmt(format!("*ptr = {};", self.name(value)))],
                )
            })
            .collect();
        self.function(
            format!("void {fn_name}({} *ptr)", self.name(type_name)),
            vec![Block::If {
                arms,
                otherwise: None,
            }],
            out,
        );
    }

    /// Copies the public status fields; the private area is left untouched.
    fn status_convert_fn(&self, out: &mut impl LineSink) {
        let body = vec![
            Block::stmt("out->MPI_SOURCE = inp->MPI_SOURCE;"),
            Block::stmt("out->MPI_TAG = inp->MPI_TAG;"),
            Block::stmt(format!(
                "out->MPI_ERROR = {}(inp->MPI_ERROR);",
                convert::ERROR_CLASS
            )),
        ];
        self.function(
            format!(
                "void {}({} *out, MPI_Status *inp)",
                convert::STATUS,
                self.name("MPI_Status")
            ),
            body,
            out,
        );
    }
}
