//! Tags at scope operations

use reqwest::Method;

use super::{
    TAGS_API_VERSION, TAGS_SERVICE, TagsPatchOperation, TagsPatchResource, TagsProperties,
    TagsResource,
};
use crate::clients::arm::{ArmClient, Conditions};
use crate::error::Result;
use crate::traits::{ErrorContext, ProviderErrorMapper};
use crate::types::Tags;

/// Client for the `Microsoft.Resources/tags/default` resource of a scope.
///
/// A scope is an ARM resource path such as `/subscriptions/{id}`; the leading
/// slash is optional.
#[derive(Debug, Clone)]
pub struct TagsClient {
    arm: ArmClient,
}

impl ProviderErrorMapper for TagsClient {
    fn service_name(&self) -> &'static str {
        TAGS_SERVICE
    }
}

impl TagsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn tags_url(&self, scope: &str) -> Result<String> {
        let scope = scope.trim().trim_matches('/');
        if scope.is_empty() {
            return Err(self.invalid_parameter("scope", "must not be empty"));
        }
        let path = format!("/{scope}/providers/Microsoft.Resources/tags/default");
        Ok(self.arm.url(&path, TAGS_API_VERSION, &[]))
    }

    /// Gets the tags of a scope.
    pub async fn get_at_scope(&self, scope: &str) -> Result<TagsResource> {
        let url = self.tags_url(scope)?;
        self.arm
            .get_json(TAGS_SERVICE, &url, ErrorContext::resource(scope))
            .await
    }

    /// Replaces all tags of a scope.
    pub async fn create_or_update_at_scope(
        &self,
        scope: &str,
        tags: &Tags,
    ) -> Result<TagsResource> {
        let url = self.tags_url(scope)?;
        let body = TagsResource::new(tags.clone());
        self.arm
            .send_json(
                TAGS_SERVICE,
                Method::PUT,
                &url,
                Some(&body),
                Conditions::NONE,
                ErrorContext::resource(scope),
            )
            .await
    }

    /// Merges, replaces or removes tags of a scope.
    pub async fn update_at_scope(
        &self,
        scope: &str,
        operation: TagsPatchOperation,
        tags: &Tags,
    ) -> Result<TagsResource> {
        let url = self.tags_url(scope)?;
        let body = TagsPatchResource {
            operation,
            properties: TagsProperties {
                tags: Some(tags.clone()),
            },
        };
        self.arm
            .send_json(
                TAGS_SERVICE,
                Method::PATCH,
                &url,
                Some(&body),
                Conditions::NONE,
                ErrorContext::resource(scope),
            )
            .await
    }

    /// Removes all tags of a scope.
    pub async fn delete_at_scope(&self, scope: &str) -> Result<()> {
        let url = self.tags_url(scope)?;
        let response = self
            .arm
            .send(TAGS_SERVICE, Method::DELETE, &url, None, Conditions::NONE)
            .await?;
        ArmClient::check(TAGS_SERVICE, response, ErrorContext::resource(scope))?;
        Ok(())
    }
}
