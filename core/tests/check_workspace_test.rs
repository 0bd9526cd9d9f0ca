use assert_fs::prelude::*;
use assert_fs::TempDir;
use quarry_core::{Checker, Config, Diagnostic, PlanningFlow};

/// Builds the manifest set for a vendored Google API client tree: a uri-template helper, the
/// core client support types, the generated-code support helpers, and two generated service
/// clients, plus two vendored external repositories.
///
fn vendor_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();

    dir.child("Workspace.toml")
        .write_str(
            r#"
            [workspace]
            name = "esp-vendor"
            test_patterns = ["*_test.go"]

            [external.org_golang_x_net]
            path = "vendor/golang.org/x/net"
            url = "https://github.com/golang/net"

            [external.org_golang_google_api]
            path = "vendor/google.golang.org/api"
            "#,
        )
        .unwrap();

    dir.child("vendor/golang.org/x/net/context/context.go")
        .write_str("package context\n")
        .unwrap();
    dir.child("vendor/google.golang.org/api/LICENSE")
        .write_str("Apache-2.0\n")
        .unwrap();

    dir.child("googleapi/internal/uritemplates/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "uritemplates"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            visibility = ["//googleapi"]
            "#,
        )
        .unwrap();
    dir.child("googleapi/internal/uritemplates/uritemplates.go")
        .write_str("package uritemplates\n")
        .unwrap();
    dir.child("googleapi/internal/uritemplates/utils.go")
        .write_str("package uritemplates\n")
        .unwrap();
    dir.child("googleapi/internal/uritemplates/uritemplates_test.go")
        .write_str("package uritemplates\n")
        .unwrap();

    dir.child("googleapi/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "googleapi"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = ["//googleapi/internal/uritemplates:uritemplates"]
            "#,
        )
        .unwrap();
    dir.child("googleapi/googleapi.go")
        .write_str("package googleapi\n")
        .unwrap();
    dir.child("googleapi/types.go")
        .write_str("package googleapi\n")
        .unwrap();

    dir.child("gensupport/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "gensupport"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = [
              "//googleapi:googleapi",
              "@org_golang_x_net//context:context",
            ]
            "#,
        )
        .unwrap();
    dir.child("gensupport/buffer.go")
        .write_str("package gensupport\n")
        .unwrap();
    dir.child("gensupport/json.go")
        .write_str("package gensupport\n")
        .unwrap();

    dir.child("logging/v2beta1/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "logging"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = [
              "//gensupport:gensupport",
              "//googleapi:googleapi",
              "@org_golang_x_net//context:context",
            ]
            "#,
        )
        .unwrap();
    dir.child("logging/v2beta1/logging-gen.go")
        .write_str("package logging\n")
        .unwrap();

    dir.child("servicemanagement/v1/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "servicemanagement"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = [
              "//gensupport:gensupport",
              "//googleapi:googleapi",
              "@org_golang_x_net//context:context",
            ]
            "#,
        )
        .unwrap();
    dir.child("servicemanagement/v1/servicemanagement-gen.go")
        .write_str("package servicemanagement\n")
        .unwrap();

    dir
}

fn config_for(dir: &TempDir) -> Config {
    Config::builder()
        .invocation_dir(dir.path())
        .build()
        .unwrap()
}

#[tokio::test]
async fn a_well_formed_vendor_tree_checks_clean() {
    let dir = vendor_workspace();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    assert_eq!(outcome.workspace().name(), "esp-vendor");
    assert_eq!(outcome.registry().len(), 5);
    assert!(
        outcome.report().is_clean(),
        "expected no diagnostics, found: {:?}",
        outcome.report().diagnostics()
    );
}

#[tokio::test]
async fn the_plan_orders_support_modules_before_generated_clients() {
    let dir = vendor_workspace();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();
    let plan = match outcome.planner().plan() {
        PlanningFlow::Planned { plan } => plan,
        flow => panic!("expected a plan, got {:?}", flow),
    };

    let batches: Vec<Vec<String>> = plan
        .batches()
        .iter()
        .map(|b| b.iter().map(|l| l.to_string()).collect())
        .collect();

    assert_eq!(
        batches,
        vec![
            vec!["//googleapi/internal/uritemplates:uritemplates".to_string()],
            vec!["//googleapi:googleapi".to_string()],
            vec!["//gensupport:gensupport".to_string()],
            vec![
                "//logging/v2beta1:logging".to_string(),
                "//servicemanagement/v1:servicemanagement".to_string(),
            ],
        ]
    );
}

#[tokio::test]
async fn a_missing_dependency_is_reported() {
    let dir = vendor_workspace();
    dir.child("googleapi/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "googleapi"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = ["//googleapi/internal/uritemplates:uritemplates", "//transport:transport"]
            "#,
        )
        .unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    let unresolved: Vec<_> = outcome
        .report()
        .diagnostics()
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnresolvedDependency { .. }))
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert!(outcome.report().blocks_planning());
}

#[tokio::test]
async fn an_undeclared_external_alias_is_reported() {
    let dir = vendor_workspace();
    dir.child("gensupport/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "gensupport"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            deps = ["//googleapi:googleapi", "@com_github_golang_glog//:glog"]
            "#,
        )
        .unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    assert!(outcome.report().diagnostics().iter().any(|d| matches!(
        d,
        Diagnostic::UnknownExternalRepository { repo, .. } if repo == "com_github_golang_glog"
    )));
}

#[tokio::test]
async fn a_dependency_cycle_is_reported() {
    let dir = vendor_workspace();
    dir.child("googleapi/internal/uritemplates/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "uritemplates"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            visibility = ["//googleapi"]
            deps = ["//gensupport:gensupport"]
            "#,
        )
        .unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    let cycle = outcome
        .report()
        .diagnostics()
        .iter()
        .find_map(|d| match d {
            Diagnostic::DependencyCycle { members } => Some(members),
            _ => None,
        })
        .expect("expected a dependency cycle diagnostic");
    assert_eq!(cycle.len(), 3);

    match outcome.planner().plan() {
        PlanningFlow::CyclicDependency { members } => assert_eq!(members.len(), 3),
        flow => panic!("expected a cycle, got {:?}", flow),
    }
}

#[tokio::test]
async fn leaked_test_sources_and_empty_globs_are_linted() {
    let dir = vendor_workspace();
    dir.child("googleapi/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "googleapi"
            srcs = ["*.go"]
            deps = ["//googleapi/internal/uritemplates:uritemplates"]

            [[target]]
            name = "docs"
            srcs = ["*.md"]
            "#,
        )
        .unwrap();
    dir.child("googleapi/googleapi_test.go")
        .write_str("package googleapi\n")
        .unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    assert!(outcome.report().diagnostics().iter().any(|d| matches!(
        d,
        Diagnostic::TestSourcesIncluded { files, .. }
            if files == &[std::path::PathBuf::from("googleapi_test.go")]
    )));
    assert!(outcome
        .report()
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::EmptySourceGlob { target } if target.to_string() == "//googleapi:docs")));

    // lints fail the check but not the plan
    assert!(!outcome.report().is_clean());
    assert!(!outcome.report().blocks_planning());
}

#[tokio::test]
async fn private_targets_are_shielded_from_other_packages() {
    let dir = vendor_workspace();
    dir.child("googleapi/internal/uritemplates/Build.toml")
        .write_str(
            r#"
            [[target]]
            name = "uritemplates"
            srcs = ["*.go"]
            exclude = ["*_test.go"]
            visibility = "private"
            "#,
        )
        .unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    assert!(outcome.report().diagnostics().iter().any(|d| matches!(
        d,
        Diagnostic::VisibilityViolation { target, dep }
            if target.to_string() == "//googleapi:googleapi"
                && dep.to_string() == "//googleapi/internal/uritemplates:uritemplates"
    )));
}

#[tokio::test]
async fn a_missing_vendored_checkout_is_reported() {
    let dir = vendor_workspace();
    std::fs::remove_dir_all(dir.path().join("vendor/google.golang.org/api")).unwrap();

    let outcome = Checker::new(config_for(&dir)).check().await.unwrap();

    assert!(outcome.report().diagnostics().iter().any(|d| matches!(
        d,
        Diagnostic::MissingExternalRepository { alias, .. } if alias == "org_golang_google_api"
    )));
}

#[tokio::test]
async fn running_outside_a_workspace_is_a_load_error() {
    let dir = TempDir::new().unwrap();

    let config = Config::builder()
        .invocation_dir(dir.path())
        .search_stop_path(dir.path())
        .build()
        .unwrap();

    assert!(Checker::new(config).check().await.is_err());
}
