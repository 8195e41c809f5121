use super::handlers::{auth::session, health, profile, slack};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new JSON endpoints here via `.routes(routes!(...))` so they are both
/// served and documented. HTML pages and the OAuth redirect routes are wired
/// separately and intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(session::session))
        .routes(routes!(session::logout))
        .routes(routes!(profile::get_my))
        .routes(routes!(profile::complete))
        .routes(routes!(slack::send_message));

    let mut portal_tag = Tag::new("qportal");
    portal_tag.description = Some("Portal infrastructure".to_string());

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Session inspection and logout".to_string());

    let mut profile_tag = Tag::new("profile");
    profile_tag.description = Some("Member profile onboarding".to_string());

    let mut slack_tag = Tag::new("slack");
    slack_tag.description = Some("Slack notifications".to_string());

    router.get_openapi_mut().tags = Some(vec![portal_tag, auth_tag, profile_tag, slack_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    OpenApiBuilder::new().info(info).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            spec.info.description.as_deref(),
            Some(env!("CARGO_PKG_DESCRIPTION"))
        );
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "auth"));
        assert!(tags.iter().any(|tag| tag.name == "profile"));
        assert!(spec.paths.paths.contains_key("/api/profile/complete"));
        assert!(spec.paths.paths.contains_key("/api/slack/message"));
        assert!(spec.paths.paths.contains_key("/api/auth/session"));
    }
}
