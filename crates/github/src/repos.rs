//! Repository tools.
//!
//! All paths are owner-rebound through the scope guard; search scopes by
//! query text. File content crosses the Contents API base64-encoded.

use crate::GithubContext;
use crate::args::*;
use crate::transport::GithubRequest;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use octoagent_core::{Tool, ToolError, ToolResult};
use serde_json::{Value, json};
use std::sync::Arc;

/// POST /user/repos — create a repository under the authenticated user.
pub struct CreateRepositoryTool {
    ctx: Arc<GithubContext>,
}

impl CreateRepositoryTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CreateRepositoryTool {
    fn name(&self) -> &str {
        "create_repository"
    }

    fn description(&self) -> &str {
        "Create a new GitHub repository under the authenticated user's account"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Repo name" },
                "description": { "type": "string" },
                "private": { "type": "boolean", "default": false },
                "autoInit": { "type": "boolean", "description": "Init with README", "default": false }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let name = required_str(&arguments, "name")?;
        let mut body = json!({
            "name": name,
            "private": optional_bool(&arguments, "private").unwrap_or(false),
            "auto_init": optional_bool(&arguments, "autoInit").unwrap_or(false),
        });
        if let Some(description) = optional_str(&arguments, "description") {
            body["description"] = json!(description);
        }

        let request = GithubRequest::post("/user/repos", Some(body));
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// PUT /repos/{me}/{repo}/contents/{path} — create or update one file.
pub struct CreateOrUpdateFileTool {
    ctx: Arc<GithubContext>,
}

impl CreateOrUpdateFileTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CreateOrUpdateFileTool {
    fn name(&self) -> &str {
        "create_or_update_file"
    }

    fn description(&self) -> &str {
        "Create or update a single file in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "path": { "type": "string", "description": "File path in repo" },
                "message": { "type": "string", "description": "Commit message" },
                "content": { "type": "string", "description": "File content (plain text)" },
                "branch": { "type": "string" },
                "sha": { "type": "string", "description": "Blob SHA when updating an existing file" }
            },
            "required": ["repo", "path", "message", "content"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let path = required_str(&arguments, "path")?;
        let message = required_str(&arguments, "message")?;
        let content = required_str(&arguments, "content")?;

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let Some(branch) = optional_str(&arguments, "branch") {
            body["branch"] = json!(branch);
        }
        if let Some(sha) = optional_str(&arguments, "sha") {
            body["sha"] = json!(sha);
        }

        let request = GithubRequest::put(
            format!("/repos/{}/{repo}/contents/{path}", self.ctx.scope.owner()),
            body,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// DELETE /repos/{me}/{repo}/contents/{path} — delete one file.
pub struct DeleteFileTool {
    ctx: Arc<GithubContext>,
}

impl DeleteFileTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a single file from the authenticated user's repository. Requires the file's SHA."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "path": { "type": "string", "description": "Path of the file to delete" },
                "message": { "type": "string", "description": "Commit message for the deletion" },
                "sha": { "type": "string", "description": "SHA of the file being deleted" },
                "branch": { "type": "string", "description": "Branch the file is on; defaults to the default branch" }
            },
            "required": ["repo", "path", "message", "sha"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let path = required_str(&arguments, "path")?;

        let mut body = json!({
            "message": required_str(&arguments, "message")?,
            "sha": required_str(&arguments, "sha")?,
        });
        if let Some(branch) = optional_str(&arguments, "branch") {
            body["branch"] = json!(branch);
        }

        let request = GithubRequest::delete(
            format!("/repos/{}/{repo}/contents/{path}", self.ctx.scope.owner()),
            Some(body),
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /repos/{me}/{repo}/contents/{path} — file metadata + Base64 content.
pub struct GetFileContentsTool {
    ctx: Arc<GithubContext>,
}

impl GetFileContentsTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetFileContentsTool {
    fn name(&self) -> &str {
        "get_file_contents"
    }

    fn description(&self) -> &str {
        "Retrieve file metadata plus Base64 content from the authenticated user's repositories only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "path": { "type": "string", "description": "File path in repo" },
                "ref": { "type": "string", "description": "Branch, tag, or SHA" }
            },
            "required": ["repo", "path"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let path = required_str(&arguments, "path")?;

        let request = GithubRequest::get(format!(
            "/repos/{}/{repo}/contents/{path}",
            self.ctx.scope.owner()
        ))
        .maybe_query("ref", optional_str(&arguments, "ref"));

        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// POST /repos/{me}/{repo}/git/refs — create a branch from a base SHA.
pub struct CreateBranchTool {
    ctx: Arc<GithubContext>,
}

impl CreateBranchTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CreateBranchTool {
    fn name(&self) -> &str {
        "create_branch"
    }

    fn description(&self) -> &str {
        "Create a new branch from a SHA in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "branch": { "type": "string", "description": "New branch name" },
                "sha": { "type": "string", "description": "Base commit SHA" }
            },
            "required": ["repo", "branch", "sha"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;
        let branch = required_str(&arguments, "branch")?;
        let sha = required_str(&arguments, "sha")?;

        let request = GithubRequest::post(
            format!("/repos/{}/{repo}/git/refs", self.ctx.scope.owner()),
            Some(json!({
                "ref": format!("refs/heads/{branch}"),
                "sha": sha,
            })),
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /repos/{me}/{repo}/branches
pub struct ListBranchesTool {
    ctx: Arc<GithubContext>,
}

impl ListBranchesTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListBranchesTool {
    fn name(&self) -> &str {
        "list_branches"
    }

    fn description(&self) -> &str {
        "List branches in the authenticated user's repository only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "page": { "type": "integer", "minimum": 1 },
                "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["repo"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;

        let request = page_params(
            GithubRequest::get(format!(
                "/repos/{}/{repo}/branches",
                self.ctx.scope.owner()
            )),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// POST /repos/{me}/{repo}/forks
pub struct ForkRepositoryTool {
    ctx: Arc<GithubContext>,
}

impl ForkRepositoryTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ForkRepositoryTool {
    fn name(&self) -> &str {
        "fork_repository"
    }

    fn description(&self) -> &str {
        "Fork a repository owned by the authenticated user only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo": { "type": "string" },
                "organization": { "type": "string", "description": "Target org" }
            },
            "required": ["repo"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let repo = self.ctx.scope.repo_name(required_str(&arguments, "repo")?)?;

        let body = optional_str(&arguments, "organization")
            .map(|org| json!({"organization": org}));
        let request = GithubRequest::post(
            format!("/repos/{}/{repo}/forks", self.ctx.scope.owner()),
            body,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

/// GET /search/repositories — scoped to the identity via the query text.
pub struct SearchRepositoriesTool {
    ctx: Arc<GithubContext>,
}

impl SearchRepositoriesTool {
    pub fn new(ctx: Arc<GithubContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchRepositoriesTool {
    fn name(&self) -> &str {
        "search_repositories"
    }

    fn description(&self) -> &str {
        "Search repositories owned by the authenticated user only"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search keywords" },
                "sort": { "type": "string" },
                "order": { "type": "string" },
                "page": { "type": "integer", "minimum": 1 },
                "perPage": { "type": "integer", "minimum": 1, "maximum": 100 }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;

        let request = page_params(
            GithubRequest::get("/search/repositories")
                .query("q", self.ctx.scope.scope_query(query))
                .maybe_query("sort", optional_str(&arguments, "sort"))
                .maybe_query("order", optional_str(&arguments, "order")),
            &arguments,
        );
        let payload = self.ctx.transport.execute(request).await?;
        Ok(ToolResult::ok(payload))
    }
}

pub(crate) fn tools(ctx: &Arc<GithubContext>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CreateRepositoryTool::new(ctx.clone())),
        Box::new(CreateOrUpdateFileTool::new(ctx.clone())),
        Box::new(DeleteFileTool::new(ctx.clone())),
        Box::new(GetFileContentsTool::new(ctx.clone())),
        Box::new(CreateBranchTool::new(ctx.clone())),
        Box::new(ListBranchesTool::new(ctx.clone())),
        Box::new(ForkRepositoryTool::new(ctx.clone())),
        Box::new(SearchRepositoriesTool::new(ctx.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeGuard;
    use crate::transport::Method;
    use crate::transport::testing::RecordingTransport;

    fn context() -> (Arc<GithubContext>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::ok());
        let ctx = Arc::new(GithubContext {
            transport: transport.clone(),
            scope: ScopeGuard::new("alice"),
        });
        (ctx, transport)
    }

    #[tokio::test]
    async fn create_repository_shapes_the_body() {
        let (ctx, transport) = context();
        let tool = CreateRepositoryTool::new(ctx);

        tool.execute(json!({"name": "demo", "private": true}))
            .await
            .unwrap();

        let requests = transport.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/user/repos");
        assert_eq!(
            requests[0].body.as_ref().unwrap(),
            &json!({"name": "demo", "private": true, "auto_init": false})
        );
    }

    #[tokio::test]
    async fn create_or_update_file_encodes_base64() {
        let (ctx, transport) = context();
        let tool = CreateOrUpdateFileTool::new(ctx);

        tool.execute(json!({
            "repo": "demo",
            "path": "docs/README.md",
            "message": "add readme",
            "content": "hello world",
            "branch": "main"
        }))
        .await
        .unwrap();

        let requests = transport.recorded();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path, "/repos/alice/demo/contents/docs/README.md");
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["content"], "aGVsbG8gd29ybGQ=");
        assert_eq!(body["branch"], "main");
        assert!(body.get("sha").is_none());
    }

    #[tokio::test]
    async fn delete_file_requires_sha() {
        let (ctx, transport) = context();
        let tool = DeleteFileTool::new(ctx);

        let err = tool
            .execute(json!({"repo": "demo", "path": "a.txt", "message": "rm"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn create_branch_builds_the_ref() {
        let (ctx, transport) = context();
        let tool = CreateBranchTool::new(ctx);

        tool.execute(json!({"repo": "demo", "branch": "feature", "sha": "abc123"}))
            .await
            .unwrap();

        let requests = transport.recorded();
        assert_eq!(requests[0].path, "/repos/alice/demo/git/refs");
        assert_eq!(
            requests[0].body.as_ref().unwrap(),
            &json!({"ref": "refs/heads/feature", "sha": "abc123"})
        );
    }

    #[tokio::test]
    async fn list_branches_paginates() {
        let (ctx, transport) = context();
        let tool = ListBranchesTool::new(ctx);

        tool.execute(json!({"repo": "demo", "page": 2, "perPage": 50}))
            .await
            .unwrap();

        let requests = transport.recorded();
        assert_eq!(requests[0].path, "/repos/alice/demo/branches");
        assert!(requests[0].query.contains(&("page".into(), "2".into())));
        assert!(requests[0].query.contains(&("per_page".into(), "50".into())));
    }

    #[tokio::test]
    async fn search_repositories_scopes_the_query() {
        let (ctx, transport) = context();
        let tool = SearchRepositoriesTool::new(ctx);

        tool.execute(json!({"query": "wireframe"})).await.unwrap();

        let requests = transport.recorded();
        assert_eq!(requests[0].path, "/search/repositories");
        assert!(
            requests[0]
                .query
                .contains(&("q".into(), "wireframe user:alice".into()))
        );
    }

    #[tokio::test]
    async fn foreign_owner_is_rejected_before_any_call() {
        let (ctx, transport) = context();
        let tool = ListBranchesTool::new(ctx);

        let err = tool
            .execute(json!({"repo": "other/demo"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ScopeViolation { .. }));
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn own_qualified_repo_is_accepted() {
        let (ctx, transport) = context();
        let tool = ListBranchesTool::new(ctx);

        tool.execute(json!({"repo": "alice/demo"})).await.unwrap();
        assert_eq!(transport.recorded()[0].path, "/repos/alice/demo/branches");
    }

    #[tokio::test]
    async fn fork_without_org_sends_no_body() {
        let (ctx, transport) = context();
        let tool = ForkRepositoryTool::new(ctx);

        tool.execute(json!({"repo": "demo"})).await.unwrap();
        let requests = transport.recorded();
        assert_eq!(requests[0].path, "/repos/alice/demo/forks");
        assert!(requests[0].body.is_none());
    }
}
