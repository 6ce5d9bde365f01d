//! In-memory integration tests for the target registration lifecycle.

use super::helpers::{Registrar, installed_platform, registrar, registrar_with, request};
use chrono::Utc;
use rstest::rstest;
use runner_registrar::{
    bootstrap::{BootstrapConfig, render_bootstrap_script},
    target::{
        domain::{ParamMergePolicy, ResourceType, Scope, TargetStatus},
        ports::TargetRepository,
        services::{RegistrationErrorKind, RegistrationSettings},
    },
};
use secrecy::ExposeSecret;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_and_organization_scopes_register_independently(registrar: Registrar) {
    let repo_view = registrar
        .service
        .register(request("octo/app"))
        .await
        .expect("repository registration should succeed");
    let org_view = registrar
        .service
        .register(request("octo"))
        .await
        .expect("organization registration should succeed");

    assert_ne!(repo_view.id, org_view.id);
    assert_eq!(repo_view.scope, "octo/app");
    assert_eq!(org_view.scope, "octo");
    assert_eq!(registrar.repository.len().expect("len"), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_credential_is_the_issued_installation_token(registrar: Registrar) {
    let view = registrar
        .service
        .register(request("octo/app"))
        .await
        .expect("registration should succeed");

    let stored = registrar
        .repository
        .find_by_id(view.id)
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    assert_eq!(
        stored.credential().token().expose_secret(),
        "ghs_memory_41_1"
    );
    assert_eq!(stored.credential().expires_at(), view.credential_expires_at);

    let body = serde_json::to_string(&view).expect("view serializes");
    assert!(!body.contains("ghs_memory"));
    assert!(!body.contains("ghp_integration"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_and_reregister_keeps_identifier_and_stored_params(registrar: Registrar) {
    let first = registrar
        .service
        .register(
            request("octo/app")
                .with_resource_type("large")
                .with_provider_url("https://provider.internal"),
        )
        .await
        .expect("initial registration should succeed");

    registrar
        .repository
        .update_status(first.id, TargetStatus::Deleted, Utc::now())
        .await
        .expect("deletion should succeed");

    let second = registrar
        .service
        .register(request("octo/app").with_resource_type("small"))
        .await
        .expect("re-registration should succeed");

    assert_eq!(second.id, first.id);
    assert_eq!(second.status, TargetStatus::Active);
    assert_eq!(second.resource_type, Some(ResourceType::Small));
    assert_eq!(
        second.provider_url.as_deref(),
        Some("https://provider.internal")
    );
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(registrar.repository.len().expect("len"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replace_policy_discards_unsupplied_params_on_resurrection() {
    let registrar = registrar_with(
        installed_platform(),
        RegistrationSettings {
            merge_policy: ParamMergePolicy::Replace,
            ..RegistrationSettings::default()
        },
    );
    let first = registrar
        .service
        .register(request("octo").with_provider_url("https://provider.internal"))
        .await
        .expect("initial registration should succeed");
    registrar
        .repository
        .update_status(first.id, TargetStatus::Deleted, Utc::now())
        .await
        .expect("deletion should succeed");

    let second = registrar
        .service
        .register(request("octo"))
        .await
        .expect("re-registration should succeed");

    assert_eq!(second.id, first.id);
    assert_eq!(second.provider_url, None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_registrations_admit_exactly_one(registrar: Registrar) {
    let (left, right) = tokio::join!(
        registrar.service.register(request("octo/app")),
        registrar.service.register(request("octo/app")),
    );

    let outcomes = [left, right];
    let admitted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(admitted, 1);
    let rejected = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one registration should fail");
    assert_eq!(rejected.kind(), RegistrationErrorKind::Conflict);

    let scope = Scope::new("octo/app").expect("valid scope");
    let stored = registrar
        .repository
        .find_by_scope(&scope)
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    assert_eq!(stored.status(), TargetStatus::Active);
    assert_eq!(registrar.repository.len().expect("len"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_registration_leaves_no_record(registrar: Registrar) {
    let err = registrar
        .service
        .register(request("octo/missing"))
        .await
        .expect_err("uninstalled scope should fail");

    assert_eq!(err.kind(), RegistrationErrorKind::AppNotInstalled);
    assert!(registrar.repository.is_empty().expect("is_empty"));
    assert_eq!(registrar.platform.calls().issue_installation_token, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_target_renders_a_bootstrap_script(registrar: Registrar) {
    let view = registrar
        .service
        .register(request("octo/app").with_runner_user("builder"))
        .await
        .expect("registration should succeed");
    let stored = registrar
        .repository
        .find_by_id(view.id)
        .await
        .expect("lookup should succeed")
        .expect("record should exist");

    let script = render_bootstrap_script(&BootstrapConfig::from_target(&stored))
        .expect("script should render");

    assert!(script.contains("octo/app"));
    assert!(script.contains("ghs_memory_41_1"));
    assert!(script.contains("builder"));
}
