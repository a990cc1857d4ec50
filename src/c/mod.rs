//! C entry points for the runtime's native ABI and for the standard ABI.

pub mod consts;
pub mod header;
pub mod types;

use crate::{
    codegen::{Block, GENERATED_MESSAGE, Mangle, TempNames, names},
    config::GeneratorConfig,
    errors::{Axis, BindingResult},
    output::LineSink,
    prototype::Prototype,
    template::SourceTemplate,
};
use consts::INLINE_ATTRS;
use header::AbiHeaderBuilder;
use tracing::{debug, info};
use types::{CParam, resolve};

/// Emits the weak-symbol alias that lets `PMPI_X` carry the implementation
/// of `MPI_X` when profiling is enabled.
pub fn print_profiling_header(fn_name: &str, config: &GeneratorConfig, out: &mut impl LineSink) {
    let profiled = names::profiling_name(fn_name);
    out.dump(&format!("#if {}", config.profiling_macro));
    out.dump(&format!("#if {}", config.weak_symbols_macro));
    out.dump(&format!("#pragma weak {fn_name} = {profiled}"));
    out.dump("#endif");
    out.dump(&format!("#define {fn_name} {profiled}"));
    out.dump("#endif");
}

/// Native ABI: the template body is the implementation, emitted once per
/// count width.
pub fn ompi_abi(
    base_name: &str,
    template: &SourceTemplate,
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) -> BindingResult<()> {
    let prototype = &template.prototype;
    prototype.validate(Axis::Ompi)?;

    template.print_header(out);
    print_profiling_header(base_name, config, out);
    out.dump(&prototype.signature(Axis::Ompi, base_name, false, Mangle::Internal)?);
    template.print_body(base_name, out);

    if prototype.need_bigcount() {
        let base_name_c = format!("{base_name}{}", names::BIGCOUNT_SUFFIX);
        out.dump(&format!("#if {}", config.bigcount_macro));
        print_profiling_header(&base_name_c, config, out);
        out.dump(&prototype.signature(Axis::Ompi, &base_name_c, true, Mangle::Internal)?);
        template.print_body(&base_name_c, out);
        out.dump(&format!("#endif /* {} */", config.bigcount_macro));
    }
    Ok(())
}

/// Name of the static helper holding the template body in standard-ABI sources.
pub fn internal_fn_name(prototype: &Prototype) -> String {
    format!("ompi_abi_{}", prototype.name)
}

/// Standard ABI: the body becomes a static helper taking native handles,
/// wrapped by public functions that convert handles in and out.
pub fn standard_abi(
    base_name: &str,
    template: &SourceTemplate,
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) -> BindingResult<()> {
    let prototype = &template.prototype;
    prototype.validate(Axis::Ompi)?;
    prototype.validate(Axis::Standard)?;

    template.print_header(out);
    out.dump(&format!("#include \"{}\"", config.abi_internal_header));

    let internal_name = internal_fn_name(prototype);
    let internal_sig = prototype.signature(Axis::Ompi, &internal_name, true, Mangle::Internal)?;
    out.dump(&format!("{INLINE_ATTRS} {internal_sig}"));
    template.print_body(base_name, out);

    standard_wrapper(prototype, base_name, &internal_name, false, config, out)?;
    if prototype.need_bigcount() {
        let base_name_c = format!("{base_name}{}", names::BIGCOUNT_SUFFIX);
        out.dump(&format!("#if {}", config.bigcount_macro));
        standard_wrapper(prototype, &base_name_c, &internal_name, true, config, out)?;
        out.dump(&format!("#endif /* {} */", config.bigcount_macro));
    }
    Ok(())
}

fn standard_wrapper(
    prototype: &Prototype,
    fn_name: &str,
    internal_name: &str,
    bigcount: bool,
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) -> BindingResult<()> {
    let mangle = Mangle::Internal;
    let mut temps = TempNames::new();
    let ret = resolve(Axis::Standard, prototype.return_kind)?;
    let ret_param = CParam::returned(mangle);

    let mut init = Vec::new();
    let mut args = Vec::new();
    let mut fini = Vec::new();
    for param in &prototype.parameters {
        let rules = resolve(Axis::Standard, param.kind)?;
        let view = param.view(mangle);
        init.extend(rules.init_code(&view, &mut temps));
        args.push(rules.argument(&view));
        fini.extend(rules.final_code(&view, &mut temps));
    }

    let mut body = vec![Block::stmt(format!(
        "{} ret_value;",
        ret.tmp_type_text(&ret_param, bigcount)
    ))];
    body.extend(init);
    body.push(Block::stmt(format!(
        "ret_value = {internal_name}({});",
        args.join(", ")
    )));
    body.extend(fini);
    body.extend(ret.return_code(&ret_param, "ret_value"));

    print_profiling_header(fn_name, config, out);
    out.dump(&prototype.signature(Axis::Standard, fn_name, bigcount, mangle)?);
    out.dump("{");
    out.dump_blocks(&body, 1);
    out.dump("}");
    Ok(())
}

/// The binary interface a C source file is generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CAbi {
    Ompi,
    Standard,
}

impl CAbi {
    pub fn axis(self) -> Axis {
        match self {
            CAbi::Ompi => Axis::Ompi,
            CAbi::Standard => Axis::Standard,
        }
    }
}

/// Generates one C source file from a template for the given ABI.
pub fn generate_source(
    template: &SourceTemplate,
    abi: CAbi,
    config: &GeneratorConfig,
    out: &mut impl LineSink,
) -> BindingResult<()> {
    let base_name = names::mpi_fn_name(&template.prototype.name);
    info!(
        function = %base_name,
        abi = %abi.axis(),
        bigcount = template.prototype.need_bigcount(),
        "generating C source"
    );
    out.dump(&format!("/* {GENERATED_MESSAGE} */"));
    match abi {
        CAbi::Ompi => ompi_abi(&base_name, template, config, out),
        CAbi::Standard => standard_abi(&base_name, template, config, out),
    }
}

/// Generates the standard ABI header for a batch of templates.
pub fn generate_header(
    prototypes: &[Prototype],
    external: bool,
    out: &mut impl LineSink,
) -> BindingResult<()> {
    let builder = AbiHeaderBuilder::new(prototypes, external)?;
    debug!(
        prototypes = prototypes.len(),
        signatures = builder.signatures().len(),
        external,
        "generating ABI header"
    );
    out.dump(&format!("/* {GENERATED_MESSAGE} */"));
    builder.dump_header(out);
    Ok(())
}
