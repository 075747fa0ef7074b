//! User tools. Every one of these reads the authenticated account; none
//! accepts a username argument, so there is nothing to scope-check.

use crate::GithubContext;
use crate::args::*;
use crate::transport::GithubRequest;
use async_trait::async_trait;
use octoagent_core::{Tool, ToolError, ToolResult};
use serde_json::{Value, json};
use std::sync::Arc;

fn paging_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "page": { "type": "integer", "minimum": 1 },
            "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
        }
    })
}

/// GET /user — the token owner's profile.
pub struct GetAuthenticatedUserTool {
    ctx: Arc<GithubContext>,
}

impl GetAuthenticatedUserTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetAuthenticatedUserTool {
    fn name(&self) -> &str {
        "get_authenticated_user"
    }

    fn description(&self) -> &str {
        "Fetch the profile of the token owner (login, id, email, etc.)"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        let payload = self.ctx.transport.execute(GithubRequest::get("/user")).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /users/{me} — the identity's public profile.
pub struct GetUserTool {
    ctx: Arc<GithubContext>,
}

impl GetUserTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetUserTool {
    fn name(&self) -> &str {
        "get_user"
    }

    fn description(&self) -> &str {
        "Fetch the authenticated user's public profile only"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        let request = GithubRequest::get(format!("/users/{}", self.ctx.scope.owner()));
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /users/{me}/followers
pub struct ListFollowersTool {
    ctx: Arc<GithubContext>,
}

impl ListFollowersTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListFollowersTool {
    fn name(&self) -> &str {
        "list_followers"
    }

    fn description(&self) -> &str {
        "List followers of the authenticated user only"
    }

    fn parameters_schema(&self) -> Value {
        paging_schema()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let request = page_params(
            GithubRequest::get(format!("/users/{}/followers", self.ctx.scope.owner())),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /users/{me}/following
pub struct ListFollowingTool {
    ctx: Arc<GithubContext>,
}

impl ListFollowingTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListFollowingTool {
    fn name(&self) -> &str {
        "list_following"
    }

    fn description(&self) -> &str {
        "List accounts the authenticated user is following"
    }

    fn parameters_schema(&self) -> Value {
        paging_schema()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let request = page_params(
            GithubRequest::get(format!("/users/{}/following", self.ctx.scope.owner())),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /users/{me}/repos
pub struct ListUserReposTool {
    ctx: Arc<GithubContext>,
}

impl ListUserReposTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListUserReposTool {
    fn name(&self) -> &str {
        "list_user_repos"
    }

    fn description(&self) -> &str {
        "List repositories owned by the authenticated user only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "all, owner, member" },
                "sort": { "type": "string", "description": "created, updated, pushed, full_name" },
                "direction": { "type": "string", "description": "asc or desc" },
                "page": { "type": "integer", "minimum": 1 },
                "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let request = page_params(
            GithubRequest::get(format!("/users/{}/repos", self.ctx.scope.owner()))
                .maybe_query("type", optional_str(&arguments, "type"))
                .maybe_query("sort", optional_str(&arguments, "sort"))
                .maybe_query("direction", optional_str(&arguments, "direction")),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

pub(crate) fn tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetAuthenticatedUserTool::new(ctx.clone())),
        Box::new(GetUserTool::new(ctx.clone())),
        Box::new(ListFollowersTool::new(ctx.clone())),
        Box::new(ListFollowingTool::new(ctx.clone())),
        Box::new(ListUserReposTool::new(ctx.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeGuard;
    use crate::transport::testing::RecordingTransport;

    fn context() -> (Arc<GithubContext>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new(json!({"login": "alice"})));
        let ctx = Arc::new(GithubContext {
            transport: transport.clone(),
            scope: ScopeGuard::new("alice"),
        });
        (ctx, transport)
    }

    #[tokio::test]
    async fn authenticated_user_hits_slash_user() {
        let (ctx, transport) = context();
        let tool = GetAuthenticatedUserTool::new(ctx);

        let result = tool.execute(json!({})).await.unwrap();
        assert!(result.success);
        assert_eq!(transport.recorded()[0].path, "/user");
    }

    #[tokio::test]
    async fn get_user_is_always_the_identity() {
        let (ctx, transport) = context();
        let tool = GetUserTool::new(ctx);

        tool.execute(json!({})).await.unwrap();
        assert_eq!(transport.recorded()[0].path, "/users/alice");
    }

    #[tokio::test]
    async fn followers_paginate() {
        let (ctx, transport) = context();
        let tool = ListFollowersTool::new(ctx);

        tool.execute(json!({"page": 3, "perPage": 10})).await.unwrap();
        let request = &transport.recorded()[0];
        assert_eq!(request.path, "/users/alice/followers");
        assert!(request.query.contains(&("page".into(), "3".into())));
        assert!(request.query.contains(&("per_page".into(), "10".into())));
    }

    #[tokio::test]
    async fn repo_listing_passes_filters() {
        let (ctx, transport) = context();
        let tool = ListUserReposTool::new(ctx);

        tool.execute(json!({"type": "owner", "sort": "updated", "direction": "desc"}))
            .await
            .unwrap();
        let query = &transport.recorded()[0].query;
        assert!(query.contains(&("type".into(), "owner".into())));
        assert!(query.contains(&("sort".into(), "updated".into())));
        assert!(query.contains(&("direction".into(), "desc".into())));
    }
}
