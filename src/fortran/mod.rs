//! Fortran 2008 (`mpi_f08`) bindings: the Fortran subroutines, their
//! generic interfaces, and the C trampolines that call the C API.

pub mod binding;
pub mod prototype;
pub mod types;

use crate::{
    codegen::{GENERATED_MESSAGE, names},
    config::GeneratorConfig,
    output::LineSink,
};
use binding::FortranBinding;
use prototype::FortranPrototype;
use tracing::info;

pub const FORTRAN_ERROR_NAME: &str = "ierror";
pub const C_ERROR_NAME: &str = "ierr";
pub const C_ERROR_TMP_NAME: &str = "c_ierr";

/// Turns off type/kind/rank checks of choice buffers in interfaces.
pub const IGNORE_TKR_PREDECL: &str = "!GCC$ ATTRIBUTES NO_ARG_CHECK ::";
pub const IGNORE_TKR_TYPE: &str = "type(*), dimension(*)";

pub const TYPES_MODULE: &str = "mpi_f08_types";

const C_INCLUDES: &[&str] = &[
    "#include \"ompi_config.h\"",
    "#include \"mpi.h\"",
    "#include \"ompi/errhandler/errhandler.h\"",
    "#include \"ompi/mpi/fortran/mpif-h/status-conversion.h\"",
    "#include \"ompi/mpi/fortran/base/constants.h\"",
    "#include \"ompi/mpi/fortran/base/fint_2_int.h\"",
    "#include \"ompi/request/request.h\"",
    "#include \"ompi/communicator/communicator.h\"",
];

const TS_INCLUDES: &[&str] = &["#include <ISO_Fortran_binding.h>", "#include \"ts.h\""];

/// Which half of the bindings a source file holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FortranLang {
    /// The `.F90` file with the `mpi_f08` subroutines.
    Fortran,
    /// The `.c` file with the trampolines.
    C,
}

fn bindings<'a>(
    prototype: &'a FortranPrototype,
    config: &GeneratorConfig,
) -> Vec<FortranBinding<'a>> {
    let mut variants = vec![FortranBinding::new(prototype, false, config)];
    if prototype.has_bigcount() {
        variants.push(FortranBinding::new(prototype, true, config));
    }
    variants
}

/// Without weak symbols, the profiling build compiles the subroutines
/// under their `P` names.
fn print_profiling_rename_macros(
    prototypes: &[FortranPrototype],
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) {
    out.dump(&format!("#if {}", config.profiling_macro));
    for prototype in prototypes {
        for binding in bindings(prototype, config) {
            let name = binding.fortran_name();
            out.dump(&format!("#define {name} {}", names::profiling_name(&name)));
        }
    }
    out.dump(&format!("#endif /* {} */", config.profiling_macro));
    out.blank();
}

fn print_source(binding: &FortranBinding<'_>, lang: FortranLang, out: &mut impl LineSink) {
    match lang {
        FortranLang::Fortran => binding.print_f_source(out),
        FortranLang::C => binding.print_c_source(out),
    }
}

/// Generates the Fortran subroutines or their C trampolines.
pub fn generate_code(
    prototypes: &[FortranPrototype],
    lang: FortranLang,
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) {
    info!(
        prototypes = prototypes.len(),
        ?lang,
        ts = config.ts,
        "generating Fortran bindings"
    );
    match lang {
        FortranLang::Fortran => {
            out.dump(&format!("! {GENERATED_MESSAGE}"));
            out.dump("#include \"ompi/mpi/fortran/configure-fortran-output.h\"");
            out.blank();
            print_profiling_rename_macros(prototypes, config, out);
        }
        FortranLang::C => {
            out.dump(&format!("/* {GENERATED_MESSAGE} */"));
            if config.ts {
                out.dump_all(TS_INCLUDES);
            }
            out.dump_all(C_INCLUDES);
        }
    }

    for prototype in prototypes {
        let mut variants = bindings(prototype, config).into_iter();
        if let Some(plain) = variants.next() {
            out.blank();
            print_source(&plain, lang, out);
        }
        for bigcount in variants {
            out.blank();
            out.dump(&format!("#if {}", config.bigcount_macro));
            print_source(&bigcount, lang, out);
            out.dump(&format!("#endif /* {} */", config.bigcount_macro));
        }
    }
}

/// Generates the generic `interface MPI_X` blocks of the `mpi_f08` module.
pub fn generate_interface(
    prototypes: &[FortranPrototype],
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) {
    info!(prototypes = prototypes.len(), "generating Fortran interfaces");
    out.dump(&format!("! {GENERATED_MESSAGE}"));
    for prototype in prototypes {
        let generic = names::mpi_fn_name(&prototype.name);
        out.blank();
        out.dump(&format!("interface {generic}"));
        let mut variants = bindings(prototype, config).into_iter();
        if let Some(plain) = variants.next() {
            plain.print_interface(out);
        }
        for bigcount in variants {
            out.blank();
            out.dump(&format!("#if {}", config.bigcount_macro));
            bigcount.print_interface(out);
            out.dump(&format!("#endif /* {} */", config.bigcount_macro));
        }
        out.dump(&format!("end interface {generic}"));
    }
}

#[cfg(test)]
mod tests;
