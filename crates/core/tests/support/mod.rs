//! Shared test helpers for `soundcheck-core` integration tests.
//!
//! Lightweight in-memory fakes for the core ports so flow tests can focus on
//! behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fakes;

use soundcheck_domain::Profile;

/// Minimal profile as the provider would return it
pub fn profile(id: &str, display_name: &str) -> Profile {
    serde_json::from_value(serde_json::json!({ "id": id, "display_name": display_name }))
        .expect("valid profile fixture")
}

/// Pull a query parameter out of an authorize URL
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
