//! BDD scenarios for target registration.

mod target_registration_steps;

use rstest_bdd_macros::scenario;
use target_registration_steps::world::{RegistrationWorld, world};

#[scenario(
    path = "tests/features/target_registration.feature",
    name = "Register a new repository scope"
)]
#[tokio::test(flavor = "multi_thread")]
async fn register_new_repository_scope(world: RegistrationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_registration.feature",
    name = "Registering an active scope is a conflict"
)]
#[tokio::test(flavor = "multi_thread")]
async fn active_scope_conflict(world: RegistrationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_registration.feature",
    name = "Registering a deleted scope resurrects it"
)]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_scope_resurrection(world: RegistrationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_registration.feature",
    name = "Scope without the App installed"
)]
#[tokio::test(flavor = "multi_thread")]
async fn scope_without_app_installed(world: RegistrationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_registration.feature",
    name = "Malformed scope is rejected before any platform call"
)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_scope_rejected(world: RegistrationWorld) {
    let _ = world;
}
