//! Issue tools.

use crate::GithubContext;
use crate::args::*;
use crate::transport::GithubRequest;
use async_trait::async_trait;
use octoagent_core::{Tool, ToolError, ToolResult};
use serde_json::{Value, json};
use std::sync::Arc;

/// POST /repos/{me}/{repo}/issues
pub struct CreateIssueTool {
    ctx: Arc<GithubContext>,
}

impl CreateIssueTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CreateIssueTool {
    fn name(&self) -> &str {
        "create_issue"
    }

    fn description(&self) -> &str {
        "Open a new issue in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "title": { "type": "string", "description": "Issue title" },
                "body": { "type": "string", "description": "Markdown body" },
                "labels": { "type": "array", "items": { "type": "string" } },
                "assignees": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["repo", "title"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let title = required_str(&arguments, "title")?;

        // Absent optionals stay out of the body entirely.
        let mut body = json!({"title": title});
        if let Some(text) = optional_str(&arguments, "body") {
            body["body"] = json!(text);
        }
        if let Some(labels) = optional_str_array(&arguments, "labels") {
            body["labels"] = json!(labels);
        }
        if let Some(assignees) = optional_str_array(&arguments, "assignees") {
            body["assignees"] = json!(assignees);
        }

        let request = GithubRequest::post(
            format!("/repos/{}/{repo}/issues", self.ctx.scope.owner()),
            Some(body),
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /repos/{me}/{repo}/issues/{number}
pub struct GetIssueTool {
    ctx: Arc<GithubContext>,
}

impl GetIssueTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetIssueTool {
    fn name(&self) -> &str {
        "get_issue"
    }

    fn description(&self) -> &str {
        "Retrieve a single issue by number from the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "number": { "type": "integer", "minimum": 1, "description": "Issue number" }
            },
            "required": ["repo", "number"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let number = required_u64(&arguments, "number")?;

        let request = GithubRequest::get(format!(
            "/repos/{}/{repo}/issues/{number}",
            self.ctx.scope.owner()
        ));
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /repos/{me}/{repo}/issues
pub struct ListIssuesTool {
    ctx: Arc<GithubContext>,
}

impl ListIssuesTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListIssuesTool {
    fn name(&self) -> &str {
        "list_issues"
    }

    fn description(&self) -> &str {
        "List issues in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "state": { "type": "string", "description": "open, closed, all" },
                "assignee": { "type": "string" },
                "labels": { "type": "string", "description": "CSV list of label names" },
                "page": { "type": "integer", "minimum": 1 },
                "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["repo"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;

        let request = page_params(
            GithubRequest::get(format!("/repos/{}/{repo}/issues", self.ctx.scope.owner()))
                .maybe_query("state", optional_str(&arguments, "state"))
                .maybe_query("assignee", optional_str(&arguments, "assignee"))
                .maybe_query("labels", optional_str(&arguments, "labels")),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// PATCH /repos/{me}/{repo}/issues/{number} with state=closed
pub struct CloseIssueTool {
    ctx: Arc<GithubContext>,
}

impl CloseIssueTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CloseIssueTool {
    fn name(&self) -> &str {
        "close_issue"
    }

    fn description(&self) -> &str {
        "Close an issue in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "number": { "type": "integer", "minimum": 1 }
            },
            "required": ["repo", "number"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let number = required_u64(&arguments, "number")?;

        let request = GithubRequest::patch(
            format!("/repos/{}/{repo}/issues/{number}", self.ctx.scope.owner()),
            json!({"state": "closed"}),
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// POST /repos/{me}/{repo}/issues/{number}/comments
pub struct CommentIssueTool {
    ctx: Arc<GithubContext>,
}

impl CommentIssueTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CommentIssueTool {
    fn name(&self) -> &str {
        "comment_issue"
    }

    fn description(&self) -> &str {
        "Add a comment to an issue in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "number": { "type": "integer", "minimum": 1 },
                "body": { "type": "string", "description": "Markdown comment body" }
            },
            "required": ["repo", "number", "body"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let number = required_u64(&arguments, "number")?;
        let body = required_str(&arguments, "body")?;

        let request = GithubRequest::post(
            format!(
                "/repos/{}/{repo}/issues/{number}/comments",
                self.ctx.scope.owner()
            ),
            Some(json!({"body": body})),
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /search/issues — scoped to the identity via the query text, with an
/// optional repo qualifier that is owner-checked first.
pub struct SearchIssuesTool {
    ctx: Arc<GithubContext>,
}

impl SearchIssuesTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchIssuesTool {
    fn name(&self) -> &str {
        "search_issues"
    }

    fn description(&self) -> &str {
        "Search issues and pull requests in the authenticated user's repositories only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search keywords" },
                "repo": { "type": "string", "description": "Repo name to scope the search" },
                "inTitle": { "type": "boolean", "description": "Restrict to title text" },
                "state": { "type": "string", "description": "open or closed" },
                "page": { "type": "integer", "minimum": 1 },
                "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;

        let mut qs = self.ctx.scope.scope_query(query);
        if let Some(repo) = optional_str(&arguments, "repo") {
            let name = self.ctx.scope.repo_name(repo)?;
            qs.push_str(&format!(" repo:{}/{name}", self.ctx.scope.owner()));
        }
        if optional_bool(&arguments, "inTitle").unwrap_or(false) {
            qs.push_str(" in:title");
        }
        if let Some(state) = optional_str(&arguments, "state") {
            qs.push_str(&format!(" state:{state}"));
        }

        let request = page_params(
            GithubRequest::get("/search/issues").query("q", qs),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

pub(crate) fn tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CreateIssueTool::new(ctx.clone())),
        Box::new(GetIssueTool::new(ctx.clone())),
        Box::new(ListIssuesTool::new(ctx.clone())),
        Box::new(CloseIssueTool::new(ctx.clone())),
        Box::new(CommentIssueTool::new(ctx.clone())),
        Box::new(SearchIssuesTool::new(ctx.clone())),
    ]
}
