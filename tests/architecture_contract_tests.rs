//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_except_files,
    find_non_export_lines_in_mod_files, path_exists,
};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "diesel::",
            "clap::",
            "tracing::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "use crate::adapter",
            "use crate::infrastructure",
            "use crate::application",
            "diesel::",
        ],
    );

    assert!(hits.is_empty(), "found outer imports in ports: {hits:#?}");
}

#[test]
fn application_has_no_storage_or_cli_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::infrastructure", "diesel::", "clap::", "owo_colors::"],
    );

    assert!(
        hits.is_empty(),
        "found storage or CLI imports in application layer: {hits:#?}"
    );
}

#[test]
fn cli_reaches_infrastructure_only_through_run() {
    let hits = find_lines_containing_except_files(
        "src/adapter/inbound/cli",
        &["crate::infrastructure", "crate::adapter::outbound"],
        &["src/adapter/inbound/cli/run.rs"],
    );

    assert!(
        hits.is_empty(),
        "found direct infrastructure imports in CLI handlers: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn schema_and_migrations_live_where_diesel_expects() {
    assert!(path_exists("diesel.toml"));
    assert!(path_exists("src/adapter/outbound/sqlite/database/schema.rs"));
    assert!(path_exists("migrations"));
}
