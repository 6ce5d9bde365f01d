//! Hosting-platform REST adapters.
//!
//! [`GitHubPlatformClient`] talks to the platform with the caller's
//! long-lived credential; [`GitHubApp`] authenticates as the App to locate
//! installations and exchange them for installation tokens.

mod app;
mod client;
mod http;

pub use app::GitHubApp;
pub use client::GitHubPlatformClient;
pub use http::build_http_client;
