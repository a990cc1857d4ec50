use super::{
    C_ERROR_NAME, C_ERROR_TMP_NAME, FORTRAN_ERROR_NAME,
    prototype::FortranPrototype,
    types::{ParamRef, Scope},
};
use crate::{
    codegen::{Block, TempNames, names},
    config::GeneratorConfig,
    output::LineSink,
};
use std::collections::{BTreeMap, BTreeSet};

const INDENT: &str = "    ";

/// One Fortran entry point (plain or `_c`) and the C trampoline it calls.
#[derive(Debug)]
pub struct FortranBinding<'a> {
    prototype: &'a FortranPrototype,
    bigcount: bool,
    ts: bool,
    width: usize,
}

impl<'a> FortranBinding<'a> {
    pub fn new(prototype: &'a FortranPrototype, bigcount: bool, config: &GeneratorConfig) -> Self {
        Self {
            prototype,
            bigcount,
            ts: config.ts,
            width: config.fortran_line_width,
        }
    }

    fn scope(&self) -> Scope<'a> {
        Scope {
            fn_name: &self.prototype.name,
            bigcount: self.bigcount,
            ts: self.ts,
            params: &self.prototype.parameters,
        }
    }

    fn params(&self) -> impl Iterator<Item = ParamRef<'a>> + 'a {
        let scope = self.scope();
        (0..scope.params.len()).map(move |index| ParamRef::new(scope, index))
    }

    pub fn fortran_name(&self) -> String {
        names::fortran_f08_name(&self.prototype.name, self.bigcount)
    }

    pub fn c_func_name(&self) -> String {
        names::fortran_wrapper_name(&self.prototype.name, self.bigcount)
    }

    /// `use` lines grouped per module, in sorted order.
    fn use_stmts(&self) -> Vec<String> {
        let mut modules: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for param in self.params() {
            for &(module, name) in param.ty().rules().uses() {
                modules.entry(module).or_default().insert(name);
            }
        }
        modules
            .into_iter()
            .map(|(module, names)| {
                let names: Vec<&str> = names.into_iter().collect();
                format!("use :: {module}, only: {}", names.join(", "))
            })
            .collect()
    }

    fn dummy_names(&self) -> Vec<String> {
        self.params()
            .map(|param| param.name().to_string())
            .chain(std::iter::once(FORTRAN_ERROR_NAME.to_string()))
            .collect()
    }

    fn dump_indented(out: &mut impl LineSink, depth: usize, line: &str) {
        out.dump(&format!("{}{line}", INDENT.repeat(depth)));
    }

    fn print_subroutine_start(&self, out: &mut impl LineSink) {
        let start = format!("subroutine {}(", self.fortran_name());
        out.dump_all(names::break_param_lines_fortran(
            &start,
            &self.dummy_names(),
            ")",
            self.width,
        ));
    }

    fn print_header(&self, is_interface: bool, out: &mut impl LineSink) {
        for stmt in self.use_stmts() {
            Self::dump_indented(out, 1, &stmt);
        }
        Self::dump_indented(out, 1, "implicit none");
        for param in self.params() {
            let rules = param.ty().rules();
            if is_interface {
                if let Some(predeclare) = rules.interface_predeclare(&param) {
                    Self::dump_indented(out, 1, &predeclare);
                }
            }
            Self::dump_indented(out, 1, &rules.declare(&param));
        }
        Self::dump_indented(
            out,
            1,
            &format!("INTEGER, OPTIONAL, INTENT(OUT) :: {FORTRAN_ERROR_NAME}"),
        );
    }

    /// The `BIND(C)` interface of the trampoline, nested in the subroutine.
    fn print_c_interface(&self, out: &mut impl LineSink) {
        let c_name = self.c_func_name();
        Self::dump_indented(out, 1, "interface");
        let start = format!("{INDENT}{INDENT}subroutine {c_name}(");
        out.dump_all(names::break_param_lines_fortran(
            &start,
            &self.dummy_names(),
            ") &",
            self.width,
        ));
        Self::dump_indented(out, 3, &format!("BIND(C, name=\"{c_name}\")"));
        for stmt in self.use_stmts() {
            Self::dump_indented(out, 3, &stmt);
        }
        Self::dump_indented(out, 3, "implicit none");
        for param in self.params() {
            Self::dump_indented(out, 3, &param.ty().rules().declare_cbinding_fortran(&param));
        }
        Self::dump_indented(out, 3, &format!("INTEGER, INTENT(OUT) :: {FORTRAN_ERROR_NAME}"));
        Self::dump_indented(out, 2, &format!("end subroutine {c_name}"));
        Self::dump_indented(out, 1, "end interface");
    }

    /// The Fortran 2008 subroutine forwarding to the C trampoline.
    pub fn print_f_source(&self, out: &mut impl LineSink) {
        self.print_subroutine_start(out);
        self.print_header(false, out);
        Self::dump_indented(out, 1, &format!("INTEGER :: {C_ERROR_TMP_NAME}"));
        for param in self.params() {
            if let Some(tmp) = param.ty().rules().declare_tmp(&param) {
                Self::dump_indented(out, 1, &tmp);
            }
        }
        out.blank();
        self.print_c_interface(out);
        out.blank();

        let args: Vec<String> = self
            .params()
            .map(|param| param.ty().rules().argument(&param))
            .chain(std::iter::once(C_ERROR_TMP_NAME.to_string()))
            .collect();
        let start = format!("{INDENT}call {}(", self.c_func_name());
        out.dump_all(names::break_param_lines_fortran(&start, &args, ")", self.width));
        Self::dump_indented(
            out,
            1,
            &format!("if (present({FORTRAN_ERROR_NAME})) {FORTRAN_ERROR_NAME} = {C_ERROR_TMP_NAME}"),
        );
        for param in self.params() {
            if let Some(post) = param.ty().rules().post(&param) {
                Self::dump_indented(out, 1, &post);
            }
        }
        out.dump(&format!("end subroutine {}", self.fortran_name()));
    }

    /// The C function the Fortran subroutine calls through `BIND(C)`.
    pub fn print_c_source(&self, out: &mut impl LineSink) {
        let c_name = self.c_func_name();
        let params: Vec<String> = self
            .params()
            .map(|param| param.ty().rules().c_parameter(&param))
            .chain(std::iter::once(format!("MPI_Fint *{C_ERROR_NAME}")))
            .collect();
        let signature = format!("void {c_name}({})", params.join(", "));
        out.dump(&format!("{signature};"));
        out.dump(&signature);
        out.dump("{");

        let mut temps = TempNames::new();
        let mut body = vec![Block::stmt(format!("int {C_ERROR_TMP_NAME};"))];
        for param in self.params() {
            body.extend(param.ty().rules().c_declare_tmp(&param));
        }
        for param in self.params() {
            let Some(cond) = param.ty().rules().c_shortcut_condition(&param) else {
                continue;
            };
            let mut shortcut = vec![Block::stmt(format!(
                "*{C_ERROR_NAME} = OMPI_INT_2_FINT(MPI_SUCCESS);"
            ))];
            for other in self.params().filter(|other| other.index() != param.index()) {
                shortcut.extend(other.ty().rules().c_shortcut_code(&other));
            }
            shortcut.push(Block::stmt("return;"));
            body.push(Block::if_then(cond, shortcut));
        }
        for param in self.params() {
            body.extend(param.ty().rules().c_prepare(&param, &mut temps));
        }

        let args: Vec<String> = self.params().map(|param| param.c_argument()).collect();
        body.push(Block::stmt(format!(
            "{C_ERROR_TMP_NAME} = {}({});",
            names::ext_api_func_name_profile(&self.prototype.name, self.bigcount),
            args.join(", ")
        )));
        body.push(Block::stmt(format!(
            "*{C_ERROR_NAME} = OMPI_INT_2_FINT({C_ERROR_TMP_NAME});"
        )));
        for param in self.params() {
            body.extend(param.ty().rules().c_post(&param, &mut temps));
        }

        out.dump_blocks(&body, 1);
        out.dump("}");
    }

    /// The subroutine as listed inside a generic `interface` block.
    pub fn print_interface(&self, out: &mut impl LineSink) {
        self.print_subroutine_start(out);
        self.print_header(true, out);
        out.dump(&format!("end subroutine {}", self.fortran_name()));
    }
}
