//! Unit tests for target domain types.

use super::clock::SteppingClock;
use crate::target::domain::{
    InstallationToken, NewTarget, ParamMergePolicy, PersistedTargetData, PlatformHost,
    ProvisioningParams, ResourceType, Scope, ScopeKind, ScopeResolveError, Target,
    TargetDomainError, TargetStatus, TargetView, endpoint_for,
};
use chrono::{DateTime, Utc};
use rstest::rstest;
use secrecy::{ExposeSecret, SecretString};

fn token() -> InstallationToken {
    InstallationToken::new(
        SecretString::from("ghs_super_secret".to_owned()),
        DateTime::<Utc>::UNIX_EPOCH,
    )
}

fn target_on(platform: PlatformHost) -> Target {
    Target::new(
        NewTarget {
            scope: Scope::new("acme/widgets").expect("valid scope"),
            platform,
            credential: token(),
            params: ProvisioningParams::new(Some(ResourceType::Small), None),
            runner_user: None,
        },
        &SteppingClock::new(),
    )
}

// ── Scope classification ───────────────────────────────────────────

#[rstest]
#[case("acme", ScopeKind::Organization)]
#[case("acme/widgets", ScopeKind::Repository)]
#[case("a/b/c", ScopeKind::Invalid)]
#[case("a/b/c/d", ScopeKind::Invalid)]
#[case("", ScopeKind::Organization)]
fn scopes_classify_by_slash_count(#[case] raw: &str, #[case] expected: ScopeKind) {
    assert_eq!(ScopeKind::classify(raw), expected);
}

#[rstest]
fn scope_is_trimmed_and_split() {
    let scope = Scope::new("  acme/widgets ").expect("valid scope");
    assert_eq!(scope.as_str(), "acme/widgets");
    assert_eq!(scope.owner(), "acme");
    assert_eq!(scope.repository(), Some("widgets"));
    assert_eq!(scope.kind(), ScopeKind::Repository);
}

#[rstest]
#[case("", TargetDomainError::EmptyScope)]
#[case("   ", TargetDomainError::EmptyScope)]
#[case("a/b/c", TargetDomainError::InvalidScope("a/b/c".to_owned()))]
#[case("acme/", TargetDomainError::EmptyScopeSegment("acme/".to_owned()))]
#[case("/widgets", TargetDomainError::EmptyScopeSegment("/widgets".to_owned()))]
#[case(
    "acme\ntouch pwned #",
    TargetDomainError::InvalidScopeCharacter("acme\ntouch pwned #".to_owned())
)]
#[case("acme/wid gets", TargetDomainError::InvalidScopeCharacter("acme/wid gets".to_owned()))]
#[case("acme/$(id)", TargetDomainError::InvalidScopeCharacter("acme/$(id)".to_owned()))]
fn malformed_scopes_are_rejected(#[case] raw: &str, #[case] expected: TargetDomainError) {
    assert_eq!(Scope::new(raw), Err(expected));
}

// ── Endpoint derivation ────────────────────────────────────────────

#[rstest]
#[case::public_org("acme", None, false, "https://api.github.com/orgs/acme")]
#[case::public_repo("acme/widgets", None, false, "https://api.github.com/repos/acme/widgets")]
#[case::public_ignores_host(
    "acme",
    Some("https://ghe.example.com"),
    false,
    "https://api.github.com/orgs/acme"
)]
#[case::enterprise_org(
    "acme",
    Some("https://ghe.example.com"),
    true,
    "https://ghe.example.com/api/orgs/acme"
)]
#[case::enterprise_repo_trailing_slash(
    "acme/widgets",
    Some("https://ghe.example.com/"),
    true,
    "https://ghe.example.com/api/repos/acme/widgets"
)]
fn endpoints_follow_scope_kind_and_host(
    #[case] scope: &str,
    #[case] host: Option<&str>,
    #[case] is_enterprise: bool,
    #[case] expected: &str,
) {
    let url = endpoint_for(scope, host, is_enterprise).expect("endpoint resolves");
    assert_eq!(url.as_str(), expected);
}

#[rstest]
fn invalid_scope_has_no_endpoint() {
    assert_eq!(
        endpoint_for("a/b/c", None, false),
        Err(ScopeResolveError::InvalidScope("a/b/c".to_owned()))
    );
}

#[rstest]
#[case::missing(None)]
#[case::unparseable(Some("not a url"))]
fn enterprise_mode_requires_a_parseable_host(#[case] host: Option<&str>) {
    let result = endpoint_for("acme", host, true);
    assert!(matches!(result, Err(ScopeResolveError::MalformedHost { .. })));
}

#[rstest]
#[case("https://github.com", true)]
#[case("https://github.com/", true)]
#[case("https://ghe.example.com", false)]
fn configured_platform_distinguishes_public_from_enterprise(
    #[case] raw: &str,
    #[case] public: bool,
) {
    let host = PlatformHost::parse(raw).expect("host parses");
    assert_eq!(host.is_public(), public);
}

#[rstest]
fn enterprise_rest_root_is_versioned() {
    let host = PlatformHost::parse("https://ghe.example.com").expect("host parses");
    let url = host
        .api_url(&["app", "installations", "3"])
        .expect("url builds");
    assert_eq!(
        url.as_str(),
        "https://ghe.example.com/api/v3/app/installations/3"
    );
}

// ── Provisioning parameters ────────────────────────────────────────

#[rstest]
#[case("nano", ResourceType::Nano)]
#[case("xlarge", ResourceType::XLarge)]
#[case("4xlarge", ResourceType::XLarge4)]
fn resource_types_parse_from_their_names(#[case] raw: &str, #[case] expected: ResourceType) {
    assert_eq!(ResourceType::try_from(raw), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_resource_type_is_rejected() {
    let result = ProvisioningParams::parse(Some("huge"), None);
    assert_eq!(
        result,
        Err(TargetDomainError::UnknownResourceType("huge".to_owned()))
    );
}

#[rstest]
fn blank_provider_url_is_rejected() {
    let result = ProvisioningParams::parse(None, Some("   "));
    assert_eq!(result, Err(TargetDomainError::BlankProviderUrl));
}

#[rstest]
#[case::keep_fills_gaps(
    ParamMergePolicy::KeepWhenAbsent,
    ProvisioningParams::new(Some(ResourceType::Large), None),
    ProvisioningParams::new(Some(ResourceType::Large), Some("https://old.example".to_owned()))
)]
#[case::replace_clears_absent(
    ParamMergePolicy::Replace,
    ProvisioningParams::new(Some(ResourceType::Large), None),
    ProvisioningParams::new(Some(ResourceType::Large), None)
)]
#[case::keep_with_nothing_requested(
    ParamMergePolicy::KeepWhenAbsent,
    ProvisioningParams::default(),
    ProvisioningParams::new(Some(ResourceType::Small), Some("https://old.example".to_owned()))
)]
fn merge_policy_controls_resurrected_params(
    #[case] policy: ParamMergePolicy,
    #[case] requested: ProvisioningParams,
    #[case] expected: ProvisioningParams,
) {
    let stored = ProvisioningParams::new(
        Some(ResourceType::Small),
        Some("https://old.example".to_owned()),
    );
    assert_eq!(stored.merged_with(&requested, policy), expected);
}

// ── Target aggregate and view ──────────────────────────────────────

#[rstest]
fn new_target_is_active_with_equal_timestamps() {
    let target = target_on(PlatformHost::Public);
    assert_eq!(target.status(), TargetStatus::Active);
    assert_eq!(target.created_at(), target.updated_at());
    assert_eq!(target.enterprise_host(), None);
}

#[rstest]
fn enterprise_target_records_configured_host() {
    let host = PlatformHost::parse("https://ghe.example.com/").expect("host parses");
    let target = target_on(host);
    assert_eq!(target.enterprise_host(), Some("https://ghe.example.com"));
}

fn deleted(target: Target) -> Target {
    Target::from_persisted(PersistedTargetData {
        id: target.id(),
        scope: target.scope().clone(),
        enterprise_host: target.enterprise_host().map(str::to_owned),
        credential: target.credential().clone(),
        params: target.params().clone(),
        runner_user: Some("runner".to_owned()),
        status: TargetStatus::Deleted,
        created_at: target.created_at(),
        updated_at: target.updated_at(),
    })
}

#[rstest]
fn resurrection_replaces_credential_and_params_in_place() {
    let mut target = deleted(target_on(PlatformHost::Public));
    let id = target.id();
    let created = target.created_at();
    let later = created + chrono::Duration::minutes(5);
    let fresh = InstallationToken::new(SecretString::from("ghs_fresh".to_owned()), later);
    let params = ProvisioningParams::new(Some(ResourceType::Large), None);

    target
        .resurrect(fresh, params.clone(), later)
        .expect("deleted target resurrects");

    assert_eq!(target.id(), id);
    assert_eq!(target.status(), TargetStatus::Active);
    assert_eq!(target.credential().token().expose_secret(), "ghs_fresh");
    assert_eq!(target.credential().expires_at(), later);
    assert_eq!(target.params(), &params);
    assert_eq!(target.runner_user(), Some("runner"));
    assert_eq!(target.created_at(), created);
    assert_eq!(target.updated_at(), later);
}

#[rstest]
fn live_target_cannot_be_resurrected() {
    let mut target = target_on(PlatformHost::Public);
    let before = target.clone();

    let result = target.resurrect(token(), ProvisioningParams::default(), Utc::now());

    assert_eq!(result, Err(TargetDomainError::NotDeleted(before.id())));
    assert_eq!(target, before);
}

#[rstest]
fn view_serialisation_omits_the_credential() {
    let target = target_on(PlatformHost::Public);
    let json = serde_json::to_value(TargetView::from(&target)).expect("view serialises");

    let rendered = json.to_string();
    assert!(!rendered.contains("ghs_super_secret"));
    assert!(json.get("credential").is_none());
    assert_eq!(json["scope"], "acme/widgets");
    assert_eq!(json["status"], "active");
    assert_eq!(json["resourceType"], "small");
    assert!(json.get("providerURL").is_some());
}

#[rstest]
#[case("active", TargetStatus::Active)]
#[case(" Deleted ", TargetStatus::Deleted)]
fn statuses_parse_case_insensitively(#[case] raw: &str, #[case] expected: TargetStatus) {
    assert_eq!(TargetStatus::try_from(raw), Ok(expected));
}
