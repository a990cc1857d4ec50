use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output},
};

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_mpi-bindgen")
}

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn scratch(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("mpi-bindgen-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .current_dir(root())
        .args(args)
        .output()
        .expect("failed to run mpi-bindgen")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "mpi-bindgen failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn ompi_source_is_written_to_the_output_file() {
    let dir = scratch("ompi");
    let target = dir.join("send.c");
    let output = run(&[
        "--output",
        target.to_str().expect("utf-8 path"),
        "c",
        "source",
        "ompi",
        "templates/send.c.in",
    ]);
    assert_success(&output);

    let text = fs::read_to_string(&target).expect("generated file");
    assert!(text.starts_with("/* "));
    assert!(text.contains("#pragma weak MPI_Send = PMPI_Send"));
    assert!(text.contains("#if OMPI_BIGCOUNT"));
    assert!(text.contains("OMPI_ERRHANDLER_RETURN(rc, comm, rc, \"MPI_Send_c\");"));
    assert!(!dir.join("send.c.tmp").exists());
}

#[test]
fn standard_source_uses_the_configured_header() {
    let dir = scratch("standard");
    let config = dir.join("bindgen.toml");
    fs::write(&config, "abi_internal_header = \"my/abi.h\"\n").expect("config");
    let target = dir.join("comm_size.c");
    let output = run(&[
        "--output",
        target.to_str().expect("utf-8 path"),
        "--config",
        config.to_str().expect("utf-8 path"),
        "c",
        "source",
        "standard",
        "templates/comm_size.c.in",
    ]);
    assert_success(&output);

    let text = fs::read_to_string(&target).expect("generated file");
    assert!(text.contains("#include \"my/abi.h\""));
    assert!(text.contains("static inline int ompi_abi_comm_size("));
    assert!(!text.contains("OMPI_BIGCOUNT"));
}

#[test]
fn header_collects_every_template() {
    let dir = scratch("header");
    let target = dir.join("abi.h");
    let output = run(&[
        "--output",
        target.to_str().expect("utf-8 path"),
        "c",
        "header",
        "--srcdir",
        "templates",
        "send.c.in",
        "comm_size.c.in",
    ]);
    assert_success(&output);

    let text = fs::read_to_string(&target).expect("generated file");
    assert!(text.contains("#ifndef _ABI_INTERNAL_"));
    assert!(text.contains("int PMPI_Send_c("));
    assert!(text.contains("int MPI_Comm_size(MPI_Comm_ABI_INTERNAL comm, int *size);"));
}

#[test]
fn fortran_code_and_interfaces() {
    let dir = scratch("fortran");
    let f90 = dir.join("api_f08_generated.F90");
    assert_success(&run(&[
        "--output",
        f90.to_str().expect("utf-8 path"),
        "fortran",
        "--prototypes",
        "templates/prototypes.json",
        "code",
        "fortran",
    ]));
    let text = fs::read_to_string(&f90).expect("generated file");
    assert!(text.starts_with("! "));
    assert!(text.contains("subroutine MPI_Waitany_f08("));
    assert!(text.contains("end subroutine MPI_Send_f08_c"));

    let trampolines = dir.join("api_f08_ts_generated.c");
    assert_success(&run(&[
        "--output",
        trampolines.to_str().expect("utf-8 path"),
        "fortran",
        "--prototypes",
        "templates/prototypes.json",
        "--ts",
        "code",
        "c",
    ]));
    let text = fs::read_to_string(&trampolines).expect("generated file");
    assert!(text.contains("#include <ISO_Fortran_binding.h>"));
    assert!(text.contains("void ompi_send_wrapper_f08(CFI_cdesc_t *buf,"));

    let interfaces = dir.join("mpi-f08-interfaces-generated.h");
    assert_success(&run(&[
        "--output",
        interfaces.to_str().expect("utf-8 path"),
        "fortran",
        "--prototypes",
        "templates/prototypes.json",
        "interface",
    ]));
    let text = fs::read_to_string(&interfaces).expect("generated file");
    assert!(text.contains("interface MPI_Comm_test_inter"));
    assert!(text.contains("end interface MPI_Send"));
}

#[test]
fn template_errors_fail_without_writing_output() {
    let dir = scratch("broken");
    let target = dir.join("barrier.c");
    let output = run(&[
        "--output",
        target.to_str().expect("utf-8 path"),
        "c",
        "source",
        "ompi",
        "templates/broken.c.in",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("WIDGET"), "{stderr}");
    assert!(!target.exists());
}

#[test]
fn dependency_errors_name_the_missing_sibling() {
    let dir = scratch("deps");
    let prototypes = dir.join("prototypes.json");
    fs::write(
        &prototypes,
        r#"[{"name": "send", "parameters": [
            {"type": "BUFFER", "name": "buf",
             "dep_params": {"count": "count", "type": "dtype", "comm": "comm"}},
            {"type": "COUNT", "name": "count"},
            {"type": "COMM", "name": "comm"}
        ]}]"#,
    )
    .expect("prototypes");
    let target = dir.join("out.F90");
    let output = run(&[
        "--output",
        target.to_str().expect("utf-8 path"),
        "fortran",
        "--prototypes",
        prototypes.to_str().expect("utf-8 path"),
        "interface",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("buf"), "{stderr}");
    assert!(stderr.contains("dtype"), "{stderr}");
    assert!(!target.exists());
}
