use super::prototype::{FortranPrototype, parse_prototypes};
use super::*;
use crate::errors::{Axis, BindingError, DependencyDetail};
use std::path::Path;

const SEND: &str = r#"[{"name": "send", "parameters": [
    {"type": "BUFFER", "name": "buf",
     "dep_params": {"count": "count", "type": "datatype", "comm": "comm"}},
    {"type": "COUNT", "name": "count"},
    {"type": "DATATYPE", "name": "datatype"},
    {"type": "RANK", "name": "dest"},
    {"type": "TAG", "name": "tag"},
    {"type": "COMM", "name": "comm"}
]}]"#;

const WAITANY: &str = r#"[{"name": "waitany", "parameters": [
    {"type": "SHORTCUT_COUNT", "name": "count"},
    {"type": "REQUEST_ARRAY", "name": "array_of_requests", "dep_params": {"count": "count"}},
    {"type": "INDEX_OUT", "name": "index"},
    {"type": "STATUS", "name": "status"}
]}]"#;

const TEST_INTER: &str = r#"[{"name": "comm_test_inter", "parameters": [
    {"type": "COMM", "name": "comm"},
    {"type": "LOGICAL_OUT", "name": "flag"}
]}]"#;

const ALLTOALLW: &str = r#"[{"name": "alltoallw", "parameters": [
    {"type": "WBUFFER", "name": "sendbuf",
     "dep_params": {"counts": "sendcounts", "displs": "sdispls", "types": "sendtypes", "comm": "comm"}},
    {"type": "INT_ARRAY", "name": "sendcounts", "dep_params": {"comm": "comm"}},
    {"type": "INT_ARRAY", "name": "sdispls", "dep_params": {"comm": "comm"}},
    {"type": "DATATYPE_ARRAY", "name": "sendtypes"},
    {"type": "WBUFFER_OUT", "name": "recvbuf",
     "dep_params": {"counts": "recvcounts", "displs": "rdispls", "types": "recvtypes", "comm": "comm"}},
    {"type": "INT_ARRAY", "name": "recvcounts", "dep_params": {"comm": "comm"}},
    {"type": "INT_ARRAY", "name": "rdispls", "dep_params": {"comm": "comm"}},
    {"type": "DATATYPE_ARRAY", "name": "recvtypes"},
    {"type": "COMM", "name": "comm"}
]}]"#;

const ALLREDUCE: &str = r#"[{"name": "allreduce", "parameters": [
    {"type": "BUFFER", "name": "sendbuf",
     "dep_params": {"count": "count", "type": "datatype", "comm": "comm"}},
    {"type": "BUFFER_OUT", "name": "recvbuf",
     "dep_params": {"count": "count", "type": "datatype", "comm": "comm"}},
    {"type": "COUNT", "name": "count"},
    {"type": "DATATYPE", "name": "datatype"},
    {"type": "COMM", "name": "comm"}
]}]"#;

const TYPE_COMMIT: &str = r#"[{"name": "type_commit", "parameters": [
    {"type": "DATATYPE", "name": "datatype"}
]}]"#;

const SCATTERV: &str = r#"[{"name": "scatterv", "parameters": [
    {"type": "VBUFFER", "name": "sendbuf",
     "dep_params": {"counts": "sendcounts", "displs": "displs", "type": "sendtype", "comm": "comm"}},
    {"type": "INT_ARRAY", "name": "sendcounts", "dep_params": {"comm": "comm"}},
    {"type": "INT_ARRAY", "name": "displs", "dep_params": {"comm": "comm"}},
    {"type": "DATATYPE", "name": "sendtype"},
    {"type": "BUFFER_OUT", "name": "recvbuf",
     "dep_params": {"count": "recvcount", "type": "recvtype", "comm": "comm"}},
    {"type": "COUNT", "name": "recvcount"},
    {"type": "DATATYPE", "name": "recvtype"},
    {"type": "RANK", "name": "root"},
    {"type": "COMM", "name": "comm"}
]}]"#;

const GATHERV: &str = r#"[{"name": "gatherv", "parameters": [
    {"type": "BUFFER", "name": "sendbuf",
     "dep_params": {"count": "sendcount", "type": "sendtype", "comm": "comm"}},
    {"type": "COUNT", "name": "sendcount"},
    {"type": "DATATYPE", "name": "sendtype"},
    {"type": "VBUFFER_OUT", "name": "recvbuf", "dep_params": {"type": "recvtype", "comm": "comm"}},
    {"type": "INT_ARRAY", "name": "recvcounts", "dep_params": {"comm": "comm"}},
    {"type": "INT_ARRAY", "name": "displs", "dep_params": {"comm": "comm"}},
    {"type": "DATATYPE", "name": "recvtype"},
    {"type": "RANK", "name": "root"},
    {"type": "COMM", "name": "comm"}
]}]"#;

fn load(json: &str) -> Vec<FortranPrototype> {
    parse_prototypes(Path::new("prototypes.json"), json).expect("prototypes")
}

fn generate(json: &str, lang: FortranLang, ts: bool) -> Vec<String> {
    let config = GeneratorConfig::default().with_ts(ts);
    let mut out: Vec<String> = Vec::new();
    generate_code(&load(json), lang, &config, &mut out);
    out
}

fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{}", lines.join("\n")))
}

fn count_containing(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|line| line.contains(needle)).count()
}

/// The lines of the first trampoline, before any bigcount variant.
fn first_variant(lines: &[String]) -> &[String] {
    match lines.iter().position(|line| line == "#if OMPI_BIGCOUNT") {
        Some(end) => &lines[..end],
        None => lines,
    }
}

fn dependency_detail(err: BindingError) -> (String, String, DependencyDetail) {
    match err {
        BindingError::Dependency {
            prototype,
            parameter,
            detail,
        } => (prototype, parameter, detail),
        other => panic!("expected a dependency error, got {other:?}"),
    }
}

#[test]
fn counts_make_a_bigcount_variant() {
    assert!(load(SEND)[0].has_bigcount());
    assert!(!load(WAITANY)[0].has_bigcount());
}

#[test]
fn missing_sibling_names_parameter_and_sibling() {
    let json = SEND.replace(r#""type": "datatype""#, r#""type": "dtype""#);
    let err = parse_prototypes(Path::new("prototypes.json"), &json).unwrap_err();
    let (prototype, parameter, detail) = dependency_detail(err);
    assert_eq!(prototype, "send");
    assert_eq!(parameter, "buf");
    assert_eq!(
        detail,
        DependencyDetail::MissingSibling {
            role: "type".into(),
            sibling: "dtype".into(),
        }
    );
}

#[test]
fn role_keys_must_match_the_kind() {
    let json = r#"[{"name": "f", "parameters": [
        {"type": "BUFFER", "name": "buf", "dep_params": {"count": "n"}},
        {"type": "COUNT", "name": "n"}
    ]}]"#;
    let err = parse_prototypes(Path::new("prototypes.json"), json).unwrap_err();
    let (_, parameter, detail) = dependency_detail(err);
    assert_eq!(parameter, "buf");
    assert_eq!(
        detail,
        DependencyDetail::InvalidRoles {
            kind: "BUFFER".into(),
            expected: vec!["comm".into(), "count".into(), "type".into()],
            found: vec!["count".into()],
        }
    );

    let json = r#"[{"name": "f", "parameters": [
        {"type": "COUNT", "name": "n", "dep_params": {"comm": "n"}}
    ]}]"#;
    let err = parse_prototypes(Path::new("prototypes.json"), json).unwrap_err();
    assert!(matches!(
        dependency_detail(err).2,
        DependencyDetail::InvalidRoles { .. }
    ));
}

#[test]
fn unknown_kinds_and_bad_json_are_reported() {
    let err = parse_prototypes(
        Path::new("prototypes.json"),
        r#"[{"name": "f", "parameters": [{"type": "WIDGET", "name": "w"}]}]"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BindingError::KindNotFound { ref kind, axis: Axis::Fortran } if kind == "WIDGET"
    ));

    let err = parse_prototypes(Path::new("prototypes.json"), "[{\"name\": 1}]").unwrap_err();
    assert!(matches!(err, BindingError::PrototypeList { .. }));
}

#[test]
fn fortran_source_forwards_to_the_trampoline() {
    let lines = generate(SEND, FortranLang::Fortran, false);
    assert_eq!(lines[1], "#include \"ompi/mpi/fortran/configure-fortran-output.h\"");
    position(&lines, "#define MPI_Send_f08 PMPI_Send_f08");
    position(&lines, "#define MPI_Send_f08_c PMPI_Send_f08_c");

    let start = position(
        &lines,
        "subroutine MPI_Send_f08(buf, count, datatype, dest, tag, comm, ierror)",
    );
    assert_eq!(
        lines[start + 1],
        "    use :: mpi_f08_types, only: MPI_COUNT_KIND, MPI_Comm, MPI_Datatype"
    );
    assert_eq!(lines[start + 2], "    implicit none");
    assert_eq!(lines[start + 3], "    type(*), dimension(*), INTENT(IN) :: buf");
    assert_eq!(lines[start + 4], "    INTEGER, INTENT(IN) :: count");
    assert_eq!(lines[start + 5], "    TYPE(MPI_Datatype), INTENT(IN) :: datatype");

    let bind = position(&lines, "BIND(C, name=\"ompi_send_wrapper_f08\")");
    assert!(lines[bind - 1].ends_with(") &"));
    assert_eq!(lines[bind + 5], "            INTEGER, INTENT(IN) :: datatype");
    let call = position(
        &lines,
        "    call ompi_send_wrapper_f08(buf, count, datatype%MPI_VAL, dest, tag, &",
    );
    assert_eq!(lines[call + 1].trim(), "comm%MPI_VAL, c_ierr)");
    assert_eq!(lines[call + 2], "    if (present(ierror)) ierror = c_ierr");
    assert_eq!(lines[call + 3], "end subroutine MPI_Send_f08");

    let guard = position(&lines, "#if OMPI_BIGCOUNT");
    assert!(guard > call);
    position(&lines, "    INTEGER(KIND=MPI_COUNT_KIND), INTENT(IN) :: count");
    assert_eq!(lines.last().map(String::as_str), Some("#endif /* OMPI_BIGCOUNT */"));
}

#[test]
fn trampoline_converts_handles_and_counts() {
    let lines = generate(SEND, FortranLang::C, false);
    assert!(lines[0].starts_with("/* "));
    assert_eq!(lines[1], "#include \"ompi_config.h\"");
    assert_eq!(count_containing(&lines, "ISO_Fortran_binding.h"), 0);

    position(
        &lines,
        "void ompi_send_wrapper_f08(char *buf, MPI_Fint *count, MPI_Fint *datatype, MPI_Fint *dest, MPI_Fint *tag, MPI_Fint *comm, MPI_Fint *ierr);",
    );
    let comm = position(&lines, "    MPI_Comm c_comm = PMPI_Comm_f2c(*comm);");
    let datatype = position(&lines, "    MPI_Datatype c_datatype = PMPI_Type_f2c(*datatype);");
    let call = position(
        &lines,
        "    c_ierr = PMPI_Send(OMPI_F2C_BOTTOM(buf), OMPI_FINT_2_INT(*count), c_datatype, OMPI_FINT_2_INT(*dest), OMPI_FINT_2_INT(*tag), c_comm);",
    );
    assert!(comm < datatype && datatype < call);
    assert_eq!(lines[call + 1], "    *ierr = OMPI_INT_2_FINT(c_ierr);");
    assert_eq!(count_containing(&lines, "c_comm_size"), 0);

    position(&lines, "MPI_Count *count");
    position(&lines, "    c_ierr = PMPI_Send_c(OMPI_F2C_BOTTOM(buf), *count, c_datatype,");
}

#[test]
fn shortcut_returns_before_the_c_call() {
    let lines = generate(WAITANY, FortranLang::C, false);
    let shortcut = position(&lines, "    if (OPAL_UNLIKELY(0 == OMPI_FINT_2_INT(*count))) {");
    assert_eq!(lines[shortcut + 1], "        *ierr = OMPI_INT_2_FINT(MPI_SUCCESS);");
    assert_eq!(lines[shortcut + 2], "        *index = OMPI_INT_2_FINT(MPI_UNDEFINED);");
    assert_eq!(
        lines[shortcut + 3],
        "        PMPI_Status_c2f(&ompi_status_empty, status);"
    );
    assert_eq!(lines[shortcut + 4], "        return;");
    assert_eq!(lines[shortcut + 5], "    }");

    let malloc = position(&lines, "c_array_of_requests = malloc(");
    let call = position(&lines, "c_ierr = PMPI_Waitany(");
    assert!(shortcut < malloc && malloc < call);
    position(&lines, "OMPI_ERRHANDLER_NOHANDLE_INVOKE(MPI_ERR_NO_MEM, \"MPI_WAITANY\");");
    position(&lines, "OMPI_FORTRAN_STATUS_RETURN(c_status, c_status2, status, c_ierr);");
    position(&lines, "if (MPI_SUCCESS == c_ierr && MPI_UNDEFINED != c_index) {");
}

#[test]
fn loop_counters_are_unique_per_function() {
    let lines = generate(WAITANY, FortranLang::C, false);
    position(&lines, "for (int array_of_requests_i_0 = 0;");
    position(&lines, "for (int array_of_requests_i_1 = 0;");

    let lines = generate(ALLTOALLW, FortranLang::C, false);
    position(&lines, "for (int sendtypes_i_0 = 0; sendtypes_i_0 < c_comm_size;");
    position(&lines, "for (int recvtypes_i_0 = 0; recvtypes_i_0 < c_comm_size;");
}

#[test]
fn typed_buffers_declare_the_communicator_size_once() {
    let lines = generate(ALLTOALLW, FortranLang::C, false);
    assert_eq!(
        count_containing(
            &lines,
            "int c_comm_size = OMPI_COMM_IS_INTER(c_comm) ? ompi_comm_remote_size(c_comm) : ompi_comm_size(c_comm);"
        ),
        1
    );
    let in_place = position(&lines, "if (!OMPI_IS_FORTRAN_IN_PLACE(sendbuf)) {");
    assert!(lines[in_place + 1].contains("c_sendtypes = malloc(c_comm_size * sizeof(MPI_Datatype));"));
    position(&lines, "OMPI_F2C_BOTTOM(OMPI_F2C_IN_PLACE(sendbuf))");
    position(&lines, "OMPI_ARRAY_NAME_CONVERT(sendcounts)");
    position(&lines, "free(c_recvtypes);");
    position(&lines, "OMPI_ARRAY_FINT_2_INT_CLEANUP(rdispls);");
}

#[test]
fn logical_out_goes_through_an_integer() {
    let lines = generate(TEST_INTER, FortranLang::Fortran, false);
    position(&lines, "    LOGICAL, INTENT(OUT) :: flag");
    position(&lines, "    INTEGER :: c_flag = 0");
    position(&lines, "            INTEGER, INTENT(OUT) :: flag");
    let call = position(&lines, "call ompi_comm_test_inter_wrapper_f08(comm%MPI_VAL, c_flag, c_ierr)");
    assert_eq!(lines[call + 2], "    flag = c_flag /= 0");
    assert_eq!(count_containing(&lines, "#if OMPI_BIGCOUNT"), 0);

    let lines = generate(TEST_INTER, FortranLang::C, false);
    position(&lines, "    int c_flag;");
    position(&lines, "    *flag = OMPI_INT_2_FINT(c_flag);");
}

#[test]
fn ts_buffers_use_array_descriptors() {
    let lines = generate(SEND, FortranLang::C, true);
    assert_eq!(lines[1], "#include <ISO_Fortran_binding.h>");
    assert_eq!(lines[2], "#include \"ts.h\"");
    position(&lines, "void ompi_send_wrapper_f08(CFI_cdesc_t *buf,");
    position(&lines, "    void *c_buf = buf->base_addr;");
    position(&lines, "    int c_count = OMPI_FINT_2_INT(*count);");
    position(&lines, "    MPI_Count c_count = *count;");
    position(
        &lines,
        "    MPI_Datatype c_datatype = PMPI_Type_f2c(*datatype), c_datatype2 = c_datatype;",
    );
    let cfi = position(&lines, "    OMPI_CFI_2_C(buf, c_count, c_datatype, c_datatype2, c_ierr);");
    assert_eq!(lines[cfi + 1], "    if (MPI_SUCCESS != c_ierr) {");
    assert_eq!(
        lines[cfi + 3],
        "        OMPI_ERRHANDLER_INVOKE(c_comm, c_ierr, \"MPI_SEND\");"
    );
    position(&lines, "PMPI_Send(OMPI_F2C_BOTTOM(c_buf), c_count, c_datatype2,");
    position(&lines, "ompi_datatype_destroy(&c_datatype2);");
    position(&lines, "OMPI_ERRHANDLER_INVOKE(c_comm, c_ierr, \"MPI_SEND_C\");");
}

#[test]
fn ts_buffers_sharing_a_datatype_convert_it_once() {
    let all = generate(ALLREDUCE, FortranLang::C, true);
    let lines = first_variant(&all);

    let decl = "    MPI_Datatype c_datatype = PMPI_Type_f2c(*datatype), c_datatype2 = c_datatype;";
    assert_eq!(count_containing(lines, "MPI_Datatype c_datatype"), 1);
    position(lines, decl);
    position(lines, "    void *c_sendbuf = sendbuf->base_addr;");
    position(lines, "    void *c_recvbuf = recvbuf->base_addr;");

    assert_eq!(count_containing(lines, "OMPI_CFI_2_C("), 1);
    let cfi = position(
        lines,
        "    OMPI_CFI_2_C(sendbuf, c_count, c_datatype, c_datatype2, c_ierr);",
    );
    let contiguous = position(lines, "    OMPI_CFI_CHECK_CONTIGUOUS(recvbuf, c_ierr);");
    assert_eq!(lines[contiguous + 1], "    if (MPI_SUCCESS != c_ierr) {");
    assert_eq!(
        lines[contiguous + 3],
        "        OMPI_ERRHANDLER_INVOKE(c_comm, c_ierr, \"MPI_ALLREDUCE\");"
    );
    assert_eq!(lines[contiguous + 4], "        return;");

    let call = position(
        lines,
        "    c_ierr = PMPI_Allreduce(OMPI_F2C_BOTTOM(c_sendbuf), OMPI_F2C_BOTTOM(c_recvbuf), c_count, c_datatype2, c_comm);",
    );
    assert!(cfi < contiguous && contiguous < call);

    assert_eq!(count_containing(lines, "ompi_datatype_destroy"), 1);
    let destroy = position(lines, "    if (c_datatype2 != c_datatype) {");
    assert_eq!(lines[destroy + 1], "        ompi_datatype_destroy(&c_datatype2);");
    assert!(call < destroy);

    assert_eq!(count_containing(&all, "MPI_Datatype c_datatype"), 2);
}

#[test]
fn ts_datatype_without_a_buffer_is_passed_unchanged() {
    let lines = generate(TYPE_COMMIT, FortranLang::C, true);
    let decl = position(
        &lines,
        "    MPI_Datatype c_datatype = PMPI_Type_f2c(*datatype), c_datatype2 = c_datatype;",
    );
    let call = position(&lines, "    c_ierr = PMPI_Type_commit(c_datatype2);");
    assert!(decl < call);
    assert_eq!(count_containing(&lines, "ompi_datatype_destroy"), 0);
    assert_eq!(count_containing(&lines, "OMPI_CFI"), 0);

    let lines = generate(TYPE_COMMIT, FortranLang::C, false);
    position(&lines, "    MPI_Datatype c_datatype = PMPI_Type_f2c(*datatype);");
    position(&lines, "    c_ierr = PMPI_Type_commit(c_datatype);");
}

#[test]
fn ts_vbuffer_may_be_in_place() {
    let all = generate(SCATTERV, FortranLang::C, true);
    let lines = first_variant(&all);

    position(lines, "    char *c_sendbuf = sendbuf->base_addr;");
    position(
        lines,
        "    MPI_Datatype c_sendtype = PMPI_Type_f2c(*sendtype), c_sendtype2 = c_sendtype;",
    );
    let comm = position(lines, "    MPI_Comm c_comm = PMPI_Comm_f2c(*comm);");
    assert_eq!(
        lines[comm + 1],
        "    int c_comm_size = OMPI_COMM_IS_INTER(c_comm) ? ompi_comm_remote_size(c_comm) : ompi_comm_size(c_comm);"
    );
    assert_eq!(count_containing(lines, "int c_comm_size"), 1);

    let branch = position(
        lines,
        "    if (OMPI_COMM_IS_INTER(c_comm) || !OMPI_IS_FORTRAN_IN_PLACE(c_sendbuf)) {",
    );
    assert!(comm < branch);
    assert_eq!(lines[branch + 1], "        OMPI_CFI_CHECK_CONTIGUOUS(sendbuf, c_ierr);");
    assert_eq!(lines[branch + 2], "        if (MPI_SUCCESS != c_ierr) {");
    assert_eq!(lines[branch + 5], "            return;");
    assert_eq!(lines[branch + 7], "        OMPI_ARRAY_FINT_2_INT(sendcounts, c_comm_size);");
    assert_eq!(lines[branch + 8], "        OMPI_ARRAY_FINT_2_INT(displs, c_comm_size);");
    assert_eq!(lines[branch + 9], "    } else {");
    assert_eq!(lines[branch + 10], "        c_sendbuf = MPI_IN_PLACE;");

    let call = position(lines, "    c_ierr = PMPI_Scatterv(OMPI_F2C_BOTTOM(c_sendbuf),");
    assert!(lines[call].contains("c_sendtype2"));
    position(lines, "    OMPI_ARRAY_FINT_2_INT_CLEANUP(sendcounts);");

    // Only the receive type is derived from a descriptor.
    assert_eq!(count_containing(lines, "ompi_datatype_destroy"), 1);
    position(lines, "        ompi_datatype_destroy(&c_recvtype2);");
}

#[test]
fn ts_vbuffer_out_returns_when_not_contiguous() {
    let all = generate(GATHERV, FortranLang::C, true);
    let lines = first_variant(&all);

    position(lines, "    char *c_recvbuf = recvbuf->base_addr;");
    position(
        lines,
        "    MPI_Datatype c_recvtype = PMPI_Type_f2c(*recvtype), c_recvtype2 = c_recvtype;",
    );
    let check = position(lines, "    OMPI_CFI_CHECK_CONTIGUOUS(recvbuf, c_ierr);");
    assert_eq!(lines[check + 1], "    if (MPI_SUCCESS != c_ierr) {");
    assert_eq!(lines[check + 2], "        *ierr = OMPI_INT_2_FINT(c_ierr);");
    assert_eq!(
        lines[check + 3],
        "        OMPI_ERRHANDLER_INVOKE(c_comm, c_ierr, \"MPI_GATHERV\");"
    );
    assert_eq!(lines[check + 4], "        return;");
    assert_eq!(lines[check + 5], "    }");

    let call = position(lines, "    c_ierr = PMPI_Gatherv(");
    assert!(check < call);
    assert!(lines[call].contains("OMPI_F2C_BOTTOM(c_recvbuf)"));
    assert!(lines[call].contains("c_recvtype2"));
    assert_eq!(count_containing(lines, "c_comm_size"), 0);
    assert_eq!(count_containing(lines, "ompi_datatype_destroy(&c_recvtype2)"), 0);
    position(lines, "        ompi_datatype_destroy(&c_sendtype2);");
}

#[test]
fn ts_typed_buffers_check_contiguity_first() {
    let lines = generate(ALLTOALLW, FortranLang::C, true);
    position(&lines, "void ompi_alltoallw_wrapper_f08(CFI_cdesc_t *sendbuf,");
    position(&lines, "    char *c_sendbuf = sendbuf->base_addr;");
    position(&lines, "    char *c_recvbuf = recvbuf->base_addr;");

    let send_check = position(&lines, "    OMPI_CFI_CHECK_CONTIGUOUS(sendbuf, c_ierr);");
    let in_place = position(&lines, "    if (!OMPI_IS_FORTRAN_IN_PLACE(c_sendbuf)) {");
    let recv_check = position(&lines, "    OMPI_CFI_CHECK_CONTIGUOUS(recvbuf, c_ierr);");
    let call = position(&lines, "    c_ierr = PMPI_Alltoallw(");
    assert!(send_check < in_place && in_place < recv_check && recv_check < call);
    assert!(lines[call].contains("OMPI_F2C_BOTTOM(OMPI_F2C_IN_PLACE(c_sendbuf))"));
    assert!(lines[call].contains("OMPI_F2C_BOTTOM(c_recvbuf)"));
    assert_eq!(
        count_containing(&lines, "OMPI_ERRHANDLER_INVOKE(c_comm, c_ierr, \"MPI_ALLTOALLW\");"),
        2
    );
    assert_eq!(count_containing(&lines, "int c_comm_size"), 1);
}

#[test]
fn interfaces_list_both_variants() {
    let config = GeneratorConfig::default();
    let mut out: Vec<String> = Vec::new();
    generate_interface(&load(SEND), &config, &mut out);

    let open = position(&out, "interface MPI_Send");
    let predecl = position(&out, "    !GCC$ ATTRIBUTES NO_ARG_CHECK :: buf");
    let decl = position(&out, "    type(*), dimension(*), INTENT(IN) :: buf");
    assert!(open < predecl && predecl + 1 == decl);
    assert_eq!(count_containing(&out, "!GCC$ ATTRIBUTES NO_ARG_CHECK :: buf"), 2);
    let guard = position(&out, "#if OMPI_BIGCOUNT");
    assert!(out[guard + 1].starts_with("subroutine MPI_Send_f08_c("));
    assert_eq!(out.last().map(String::as_str), Some("end interface MPI_Send"));
    assert_eq!(count_containing(&out, "BIND(C"), 0);
}

#[test]
fn long_parameter_lists_are_continued() {
    let config = GeneratorConfig {
        fortran_line_width: 40,
        ..GeneratorConfig::default()
    };
    let mut out: Vec<String> = Vec::new();
    generate_interface(&load(SEND), &config, &mut out);
    let start = position(&out, "subroutine MPI_Send_f08(");
    assert!(out[start].ends_with(" &"));
    assert!(out[start + 1].starts_with("                        "));
}
