//! Tool execution.
//!
//! Each tool validates its arguments completely before touching the store,
//! so a malformed call never leaves a partial record behind. Successful
//! calls return a [`ToolCallResult`] of text content; failures return a
//! [`ToolError`] that the dispatcher reports as an execution error.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::content;
use crate::error::ToolError;
use crate::mcp::tools::{Tool, DEFAULT_CATEGORY_LIMIT, DEFAULT_LIST_LIMIT};
use crate::store::{Collection, ContentStore, NewRecord, Record, RecordId, RecordPatch, Status};

/// Default upper bound applied to `limit` arguments.
pub const DEFAULT_MAX_LIST_LIMIT: usize = 100;

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }

    /// Text of the first content block.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

/// Settings that shape tool behaviour.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Public site URL used to print page links. No links when unset.
    pub site_url: Option<String>,
    /// Upper bound for `limit` arguments.
    pub max_list_limit: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            site_url: None,
            max_list_limit: DEFAULT_MAX_LIST_LIMIT,
        }
    }
}

impl ToolSettings {
    fn page_url(&self, slug: &str) -> Option<String> {
        self.site_url
            .as_deref()
            .map(|base| format!("{}/{slug}", base.trim_end_matches('/')))
    }
}

/// Everything a tool needs to run.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    /// Backing store.
    pub store: &'a dyn ContentStore,
    /// Behaviour settings.
    pub settings: &'a ToolSettings,
}

/// Typed access to a tool's argument object.
struct Arguments<'a> {
    tool: Tool,
    map: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    fn new(tool: Tool, value: &'a Value, empty: &'a Map<String, Value>) -> Result<Self, ToolError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => empty,
            _ => return Err(invalid(tool, "arguments must be an object")),
        };
        Ok(Self { tool, map })
    }

    fn optional_str(&self, name: &str) -> Result<Option<&'a str>, ToolError> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(invalid(self.tool, format!("Parameter '{name}' must be a string"))),
        }
    }

    fn required_str(&self, name: &str) -> Result<&'a str, ToolError> {
        self.optional_str(name)?
            .ok_or_else(|| invalid(self.tool, format!("Missing required parameter: {name}")))
    }

    /// Record IDs may arrive as integers or as numeric strings.
    fn required_id(&self) -> Result<RecordId, ToolError> {
        let bad = || invalid(self.tool, "Parameter 'id' must be an integer");
        match self.map.get("id") {
            None | Some(Value::Null) => {
                Err(invalid(self.tool, "Missing required parameter: id"))
            }
            Some(Value::Number(n)) => n.as_i64().ok_or_else(bad),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| bad()),
            Some(_) => Err(bad()),
        }
    }

    fn limit(&self, default: usize, max: usize) -> Result<usize, ToolError> {
        let requested = match self.map.get("limit") {
            None | Some(Value::Null) => default,
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    invalid(self.tool, "Parameter 'limit' must be a non-negative integer")
                })?,
        };
        Ok(requested.min(max))
    }
}

fn invalid(tool: Tool, message: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool: tool.name(),
        message: message.into(),
    }
}

/// Validated fields of an update call.
struct UpdateFields<'a> {
    id: RecordId,
    title: Option<&'a str>,
    slug: Option<&'a str>,
    content: Option<&'a str>,
}

impl<'a> UpdateFields<'a> {
    fn parse(args: &Arguments<'a>) -> Result<Self, ToolError> {
        let fields = Self {
            id: args.required_id()?,
            title: args.optional_str("title")?,
            slug: args.optional_str("slug")?,
            content: args.optional_str("content")?,
        };
        if fields.title.is_none() && fields.slug.is_none() && fields.content.is_none() {
            return Err(invalid(
                args.tool,
                "At least one of title, slug or content must be provided",
            ));
        }
        Ok(fields)
    }
}

impl Tool {
    /// Runs the tool with the given arguments.
    ///
    /// `arguments` may be `null`, which is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] before any store access when
    /// the arguments are malformed, [`ToolError::NotFound`] for unknown
    /// record IDs, and [`ToolError::Store`] when the store fails.
    pub fn execute(self, arguments: &Value, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
        let empty = Map::new();
        let args = Arguments::new(self, arguments, &empty)?;

        match self {
            Self::ListPages => list(&args, ctx, Collection::Pages, DEFAULT_LIST_LIMIT),
            Self::ListPosts => list(&args, ctx, Collection::Posts, DEFAULT_LIST_LIMIT),
            Self::ListCategories => list(&args, ctx, Collection::Categories, DEFAULT_CATEGORY_LIMIT),
            Self::CreatePage => create_page(&args, ctx),
            Self::CreatePost => create_post(&args, ctx),
            Self::CreateCategory => create_category(&args, ctx),
            Self::UpdatePage => update_page(&args, ctx),
            Self::UpdatePost => update_post(&args, ctx),
            Self::GetPost => get_post(&args, ctx),
            Self::DeletePage => delete(&args, ctx, Collection::Pages),
            Self::DeletePost => delete(&args, ctx, Collection::Posts),
            Self::DeleteCategory => delete(&args, ctx, Collection::Categories),
        }
    }
}

fn list(
    args: &Arguments<'_>,
    ctx: ToolContext<'_>,
    collection: Collection,
    default_limit: usize,
) -> Result<ToolCallResult, ToolError> {
    let limit = args.limit(default_limit, ctx.settings.max_list_limit)?;
    let records = ctx.store.recent(collection, Status::Published, limit)?;

    if records.is_empty() {
        return Ok(ToolCallResult::text(format!("No {collection} found.")));
    }

    let heading = match collection {
        Collection::Pages => "Pages",
        Collection::Posts => "Blog Posts",
        Collection::Categories => "Categories",
    };

    let mut text = format!("{heading}:\n\n");
    for record in &records {
        let _ = writeln!(text, "- {}", record.title);
        let _ = writeln!(text, "  ID: {}", record.id);
        let _ = writeln!(text, "  Slug: {}", record.slug);
        if collection == Collection::Pages {
            if let Some(url) = ctx.settings.page_url(&record.slug) {
                let _ = writeln!(text, "  URL: {url}");
            }
        }
        text.push('\n');
    }

    Ok(ToolCallResult::text(text))
}

fn created_text(ctx: ToolContext<'_>, collection: Collection, id: RecordId, title: &str, slug: &str) -> String {
    let mut text = format!(
        "{} created successfully!\nID: {id}\nTitle: {title}\nSlug: {slug}",
        collection.noun()
    );
    if collection == Collection::Pages {
        if let Some(url) = ctx.settings.page_url(slug) {
            let _ = write!(text, "\nURL: {url}");
        }
    }
    text
}

fn create_page(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let title = args.required_str("title")?;
    let slug = args.required_str("slug")?;
    let body = args.required_str("content")?;

    let record = NewRecord {
        slug: slug.to_string(),
        title: title.to_string(),
        document: Some(content::page_layout(title, body)),
        hero: Some(content::page_hero()),
        meta: Some(content::meta(title, body)),
        status: Status::Published,
    };
    let id = ctx.store.insert(Collection::Pages, record)?;
    tracing::info!(id, slug, "Page created");

    Ok(ToolCallResult::text(created_text(ctx, Collection::Pages, id, title, slug)))
}

fn create_post(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let title = args.required_str("title")?;
    let slug = args.required_str("slug")?;
    let body = args.required_str("content")?;

    let record = NewRecord {
        slug: slug.to_string(),
        title: title.to_string(),
        document: Some(content::post_body(body)),
        hero: None,
        meta: Some(content::meta(title, body)),
        status: Status::Published,
    };
    let id = ctx.store.insert(Collection::Posts, record)?;
    tracing::info!(id, slug, "Post created");

    Ok(ToolCallResult::text(created_text(ctx, Collection::Posts, id, title, slug)))
}

fn create_category(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let title = args.required_str("title")?;
    let slug = match args.optional_str("slug")? {
        Some(slug) => slug.to_string(),
        None => content::slugify(title),
    };
    if slug.is_empty() {
        return Err(invalid(
            args.tool,
            "Cannot derive a slug from the title; provide one explicitly",
        ));
    }

    let record = NewRecord {
        slug: slug.clone(),
        title: title.to_string(),
        document: None,
        hero: None,
        meta: None,
        status: Status::Published,
    };
    let id = ctx.store.insert(Collection::Categories, record)?;
    tracing::info!(id, slug = %slug, "Category created");

    Ok(ToolCallResult::text(created_text(ctx, Collection::Categories, id, title, &slug)))
}

fn fetch(ctx: ToolContext<'_>, collection: Collection, id: RecordId) -> Result<Record, ToolError> {
    ctx.store
        .get(collection, id)?
        .ok_or(ToolError::NotFound { collection, id })
}

fn get_post(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let id = args.required_id()?;
    let post = fetch(ctx, Collection::Posts, id)?;

    let mut text = format!(
        "Title: {}\nID: {}\nSlug: {}\nStatus: {}\nCreated: {}\nUpdated: {}",
        post.title,
        post.id,
        post.slug,
        post.status.as_str(),
        post.created_at,
        post.updated_at
    );
    if let Some(summary) = post.description() {
        let _ = write!(text, "\nSummary: {summary}");
    }

    Ok(ToolCallResult::text(text))
}

fn post_text(document: Option<&Value>) -> Option<&str> {
    document?.pointer("/root/children/0/children/0/text")?.as_str()
}

fn update_page(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let fields = UpdateFields::parse(args)?;
    let existing = fetch(ctx, Collection::Pages, fields.id)?;

    let mut patch = RecordPatch {
        slug: fields.slug.map(str::to_string),
        title: fields.title.map(str::to_string),
        ..RecordPatch::default()
    };

    // The heading repeats the title, so either change rebuilds the layout
    if fields.title.is_some() || fields.content.is_some() {
        let title = fields.title.unwrap_or(&existing.title);
        let body = fields
            .content
            .or_else(|| existing.document.as_ref().and_then(content::layout_body))
            .or_else(|| existing.description())
            .unwrap_or_default();
        patch.document = Some(content::page_layout(title, body));
        patch.meta = Some(content::meta(title, body));
    }

    apply_update(ctx, Collection::Pages, existing, patch)
}

fn update_post(args: &Arguments<'_>, ctx: ToolContext<'_>) -> Result<ToolCallResult, ToolError> {
    let fields = UpdateFields::parse(args)?;
    let existing = fetch(ctx, Collection::Posts, fields.id)?;

    let mut patch = RecordPatch {
        slug: fields.slug.map(str::to_string),
        title: fields.title.map(str::to_string),
        ..RecordPatch::default()
    };

    if let Some(body) = fields.content {
        patch.document = Some(content::post_body(body));
    }
    if fields.title.is_some() || fields.content.is_some() {
        let title = fields.title.unwrap_or(&existing.title);
        let body = fields
            .content
            .or_else(|| post_text(existing.document.as_ref()))
            .or_else(|| existing.description())
            .unwrap_or_default();
        patch.meta = Some(content::meta(title, body));
    }

    apply_update(ctx, Collection::Posts, existing, patch)
}

fn apply_update(
    ctx: ToolContext<'_>,
    collection: Collection,
    existing: Record,
    patch: RecordPatch,
) -> Result<ToolCallResult, ToolError> {
    let id = existing.id;
    let title = patch.title.clone().unwrap_or(existing.title);
    let slug = patch.slug.clone().unwrap_or(existing.slug);

    if !ctx.store.update(collection, id, patch)? {
        return Err(ToolError::NotFound { collection, id });
    }
    tracing::info!(%collection, id, "Record updated");

    Ok(ToolCallResult::text(format!(
        "{} updated successfully!\nID: {id}\nTitle: {title}\nSlug: {slug}",
        collection.noun()
    )))
}

fn delete(args: &Arguments<'_>, ctx: ToolContext<'_>, collection: Collection) -> Result<ToolCallResult, ToolError> {
    let id = args.required_id()?;

    if !ctx.store.delete(collection, id)? {
        return Err(ToolError::NotFound { collection, id });
    }
    tracing::info!(%collection, id, "Record deleted");

    Ok(ToolCallResult::text(format!(
        "{} {id} deleted.",
        collection.noun()
    )))
}
