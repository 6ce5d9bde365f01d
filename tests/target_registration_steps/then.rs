//! Then steps for target registration BDD scenarios.

use super::world::RegistrationWorld;
use rstest_bdd_macros::then;
use runner_registrar::target::{
    domain::{ResourceType, TargetStatus, TargetView},
    services::RegistrationErrorKind,
};

fn registered_view(world: &RegistrationWorld) -> Result<&TargetView, eyre::Report> {
    match world.last_result()? {
        Ok(view) => Ok(view),
        Err(err) => Err(eyre::eyre!("expected registration to succeed, got {err}")),
    }
}

fn parse_kind(raw: &str) -> Result<RegistrationErrorKind, eyre::Report> {
    match raw {
        "validation" => Ok(RegistrationErrorKind::Validation),
        "scope_invalid" => Ok(RegistrationErrorKind::ScopeInvalid),
        "app_not_installed" => Ok(RegistrationErrorKind::AppNotInstalled),
        "credential_rejected" => Ok(RegistrationErrorKind::CredentialRejected),
        "conflict" => Ok(RegistrationErrorKind::Conflict),
        "upstream" => Ok(RegistrationErrorKind::Upstream),
        "storage" => Ok(RegistrationErrorKind::Storage),
        other => Err(eyre::eyre!("unknown error kind '{other}'")),
    }
}

#[then(r#"the registration succeeds with status "{status}""#)]
fn registration_succeeds(world: &RegistrationWorld, status: String) -> Result<(), eyre::Report> {
    let view = registered_view(world)?;
    let expected = TargetStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    if view.status != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            view.status
        ));
    }
    Ok(())
}

#[then("the registration response carries no credential")]
fn response_has_no_credential(world: &RegistrationWorld) -> Result<(), eyre::Report> {
    let view = registered_view(world)?;
    let body = serde_json::to_string(view)?;
    if body.contains("ghs_memory") || body.contains("ghp_scenario") {
        return Err(eyre::eyre!("response leaked a credential: {body}"));
    }
    Ok(())
}

#[then(r#"the registration fails with kind "{kind}""#)]
fn registration_fails(world: &RegistrationWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = parse_kind(&kind)?;
    match world.last_result()? {
        Ok(view) => Err(eyre::eyre!(
            "expected {expected:?} failure, registered {}",
            view.id
        )),
        Err(err) if err.kind() == expected => Ok(()),
        Err(err) => Err(eyre::eyre!(
            "expected {expected:?} failure, got {:?}: {err}",
            err.kind()
        )),
    }
}

#[then("the target keeps its original identifier")]
fn keeps_identifier(world: &RegistrationWorld) -> Result<(), eyre::Report> {
    let view = registered_view(world)?;
    let seeded = world
        .seeded_id
        .ok_or_else(|| eyre::eyre!("no seeded target in scenario world"))?;
    if view.id != seeded {
        return Err(eyre::eyre!("expected id {seeded}, found {}", view.id));
    }
    Ok(())
}

#[then(r#"the target resource type is "{resource_type}""#)]
fn resource_type_is(world: &RegistrationWorld, resource_type: String) -> Result<(), eyre::Report> {
    let view = registered_view(world)?;
    let expected = ResourceType::try_from(resource_type.as_str())
        .map_err(|err| eyre::eyre!("invalid resource type in scenario: {err}"))?;
    if view.resource_type != Some(expected) {
        return Err(eyre::eyre!(
            "expected resource type {expected}, found {:?}",
            view.resource_type
        ));
    }
    Ok(())
}

#[then("the store holds {count:usize} records")]
fn store_holds(world: &RegistrationWorld, count: usize) -> Result<(), eyre::Report> {
    let stored = world
        .repository
        .len()
        .map_err(|err| eyre::eyre!("store length failed: {err}"))?;
    if stored != count {
        return Err(eyre::eyre!("expected {count} records, found {stored}"));
    }
    Ok(())
}

#[then("no installation token was issued")]
fn no_token_issued(world: &RegistrationWorld) -> Result<(), eyre::Report> {
    let issued = world.platform.calls().issue_installation_token;
    if issued != 0 {
        return Err(eyre::eyre!("expected no token exchange, saw {issued}"));
    }
    Ok(())
}

#[then("no platform calls were made")]
fn no_platform_calls(world: &RegistrationWorld) -> Result<(), eyre::Report> {
    let total = world.platform.calls().total();
    if total != 0 {
        return Err(eyre::eyre!("expected no platform calls, saw {total}"));
    }
    Ok(())
}
