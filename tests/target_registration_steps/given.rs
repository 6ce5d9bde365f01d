//! Given steps for target registration BDD scenarios.

use super::world::{RegistrationWorld, build_request, run_async};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use runner_registrar::target::{
    domain::{InstallationId, TargetStatus},
    ports::TargetRepository,
};

#[given(r#"the App is installed on "{scope}""#)]
fn app_installed_on(world: &mut RegistrationWorld, scope: String) {
    world.platform =
        std::mem::take(&mut world.platform).with_installed_scope(&scope, InstallationId::new(7));
}

#[given(r#"the scope "{scope}" exists without the App"#)]
fn scope_without_app(world: &mut RegistrationWorld, scope: String) {
    world.platform = std::mem::take(&mut world.platform).with_uninstalled_scope(&scope);
}

#[given(r#"a target is already registered for "{scope}""#)]
fn target_already_registered(
    world: &mut RegistrationWorld,
    scope: String,
) -> Result<(), eyre::Report> {
    let view = run_async(world.service().register(build_request(&scope)))
        .wrap_err("register existing target for conflict scenario")?;
    world.seeded_id = Some(view.id);
    Ok(())
}

#[given(r#"a deleted target for "{scope}" with resource type "{resource_type}""#)]
fn deleted_target(
    world: &mut RegistrationWorld,
    scope: String,
    resource_type: String,
) -> Result<(), eyre::Report> {
    let request = build_request(&scope).with_resource_type(resource_type);
    let view = run_async(world.service().register(request))
        .wrap_err("register target before deleting it")?;
    run_async(
        world
            .repository
            .update_status(view.id, TargetStatus::Deleted, Utc::now()),
    )
    .wrap_err("mark seeded target deleted")?;
    world.seeded_id = Some(view.id);
    Ok(())
}
