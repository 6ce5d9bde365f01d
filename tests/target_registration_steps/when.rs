//! When steps for target registration BDD scenarios.

use super::world::{RegistrationWorld, build_request, run_async};
use rstest_bdd_macros::when;

#[when(r#"a target is registered for "{scope}""#)]
fn register_target(world: &mut RegistrationWorld, scope: String) {
    let outcome = run_async(world.service().register(build_request(&scope)));
    world.last_result = Some(outcome);
}
