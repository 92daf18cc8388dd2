//! Tool declarations.
//!
//! The set of tools is closed: every tool the server knows is a variant of
//! [`Tool`], and every `match` over it is exhaustive. Names arriving over the
//! wire that match no variant are handled by the dispatcher, not here.

use serde::Serialize;
use serde_json::{json, Value};

/// Default number of pages/posts returned by the list tools.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Default number of categories returned by `list_categories`.
pub const DEFAULT_CATEGORY_LIMIT: usize = 20;

/// A tool definition for the tools/list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Every tool the server can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// List published pages.
    ListPages,
    /// Create and publish a page.
    CreatePage,
    /// Change a page's title, slug or content.
    UpdatePage,
    /// Remove a page.
    DeletePage,
    /// List published posts.
    ListPosts,
    /// Fetch a single post.
    GetPost,
    /// Create and publish a post.
    CreatePost,
    /// Change a post's title, slug or content.
    UpdatePost,
    /// Remove a post.
    DeletePost,
    /// List categories.
    ListCategories,
    /// Create a category.
    CreateCategory,
    /// Remove a category.
    DeleteCategory,
}

impl Tool {
    /// All tools in declaration order. This is the order of `tools/list`.
    pub const ALL: [Self; 12] = [
        Self::ListPages,
        Self::CreatePage,
        Self::UpdatePage,
        Self::DeletePage,
        Self::ListPosts,
        Self::GetPost,
        Self::CreatePost,
        Self::UpdatePost,
        Self::DeletePost,
        Self::ListCategories,
        Self::CreateCategory,
        Self::DeleteCategory,
    ];

    /// Wire name of the tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListPages => "list_pages",
            Self::CreatePage => "create_page",
            Self::UpdatePage => "update_page",
            Self::DeletePage => "delete_page",
            Self::ListPosts => "list_posts",
            Self::GetPost => "get_post",
            Self::CreatePost => "create_post",
            Self::UpdatePost => "update_post",
            Self::DeletePost => "delete_post",
            Self::ListCategories => "list_categories",
            Self::CreateCategory => "create_category",
            Self::DeleteCategory => "delete_category",
        }
    }

    /// Looks up a tool by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Human-readable description shown to clients.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ListPages => {
                "List published pages, most recent first. Returns title, slug, ID and \
                 (when a site URL is configured) the public URL of each page."
            }
            Self::CreatePage => {
                "Create a new page with content. The content is stored as a single \
                 paragraph under an h1 heading with the title, and the page is \
                 published immediately."
            }
            Self::UpdatePage => {
                "Update an existing page. Any of title, slug and content may be \
                 changed; omitted fields are left as they are."
            }
            Self::DeletePage => "Delete a page by ID.",
            Self::ListPosts => "List published blog posts, most recent first.",
            Self::GetPost => "Get a single blog post by ID, including its summary.",
            Self::CreatePost => {
                "Create a new blog post. The content is stored as a single paragraph \
                 and the post is published immediately."
            }
            Self::UpdatePost => {
                "Update an existing blog post. Any of title, slug and content may be \
                 changed; omitted fields are left as they are."
            }
            Self::DeletePost => "Delete a blog post by ID.",
            Self::ListCategories => "List post categories, most recent first.",
            Self::CreateCategory => {
                "Create a post category. The slug is derived from the title when not given."
            }
            Self::DeleteCategory => "Delete a post category by ID.",
        }
    }

    /// JSON Schema describing the tool's arguments.
    #[must_use]
    pub fn input_schema(self) -> Value {
        match self {
            Self::ListPages => list_schema("pages", DEFAULT_LIST_LIMIT),
            Self::ListPosts => list_schema("posts", DEFAULT_LIST_LIMIT),
            Self::ListCategories => list_schema("categories", DEFAULT_CATEGORY_LIMIT),
            Self::CreatePage => create_schema("Page"),
            Self::CreatePost => create_schema("Post"),
            Self::UpdatePage => update_schema("page"),
            Self::UpdatePost => update_schema("post"),
            Self::GetPost => id_schema("post"),
            Self::DeletePage => id_schema("page"),
            Self::DeletePost => id_schema("post"),
            Self::DeleteCategory => id_schema("category"),
            Self::CreateCategory => json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Category title"
                    },
                    "slug": {
                        "type": "string",
                        "description": "Optional: URL slug (default: derived from the title)"
                    }
                },
                "required": ["title"]
            }),
        }
    }

    /// Full descriptor for `tools/list`.
    #[must_use]
    pub fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn list_schema(noun: &str, default: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "description": format!("Number of {noun} to return"),
                "default": default
            }
        }
    })
}

fn create_schema(noun: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": format!("{noun} title")
            },
            "slug": {
                "type": "string",
                "description": "URL slug"
            },
            "content": {
                "type": "string",
                "description": format!("{noun} content")
            }
        },
        "required": ["title", "slug", "content"]
    })
}

fn update_schema(noun: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": ["integer", "string"],
                "description": format!("ID of the {noun} to update")
            },
            "title": {
                "type": "string",
                "description": "Optional: new title"
            },
            "slug": {
                "type": "string",
                "description": "Optional: new URL slug"
            },
            "content": {
                "type": "string",
                "description": "Optional: new content"
            }
        },
        "required": ["id"]
    })
}

fn id_schema(noun: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {
                "type": ["integer", "string"],
                "description": format!("ID of the {noun}")
            }
        },
        "required": ["id"]
    })
}
