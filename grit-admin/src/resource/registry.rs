//! Built-in resource catalogue and lookup

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use super::definition::*;
use super::{ColumnDefinition, ColumnFormat, FieldDefinition, FieldType, SelectOption};

/// Immutable set of resource definitions, constructed once at startup
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDefinition>,
}

impl ResourceRegistry {
    pub fn new(resources: Vec<ResourceDefinition>) -> Result<Self> {
        for resource in &resources {
            for issue in resource.lint() {
                if issue.is_fatal() {
                    anyhow::bail!("Resource '{}': {}", resource.slug, issue);
                }
                warn!("Resource '{}': {}", resource.slug, issue);
            }
        }
        Ok(Self { resources })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(builtin_resources())
    }

    /// Built-in resources plus any `*.toml` definitions found in `dir`.
    /// A file whose slug matches a built-in replaces it.
    pub fn with_directory(dir: &Path) -> Result<Self> {
        let mut resources = builtin_resources();
        if dir.is_dir() {
            let mut paths: Vec<_> = fs::read_dir(dir)
                .with_context(|| format!("Failed to read resource directory: {}", dir.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
                .collect();
            paths.sort();

            for path in paths {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read resource file: {}", path.display()))?;
                let config: ResourceConfig = toml::from_str(&content)
                    .with_context(|| format!("Invalid resource definition: {}", path.display()))?;
                let definition = define_resource(config);
                debug!("Loaded resource '{}' from {}", definition.slug, path.display());
                resources.retain(|r| r.slug != definition.slug);
                resources.push(definition);
            }
        }
        Self::new(resources)
    }

    /// Page size for every resource that does not declare its own
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        if size == 0 {
            return self;
        }
        for resource in self.resources.iter_mut().filter(|r| !r.table.page_size_declared) {
            resource.table.page_size = size;
        }
        self
    }

    pub fn get(&self, slug: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.slug == slug)
    }

    pub fn get_by_endpoint(&self, endpoint: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.endpoint == endpoint)
    }

    /// Lookup by slug with a user-facing error listing the known slugs
    pub fn require(&self, slug: &str) -> Result<&ResourceDefinition> {
        self.get(slug).ok_or_else(|| {
            let known: Vec<&str> = self.resources.iter().map(|r| r.slug.as_str()).collect();
            anyhow::anyhow!("Unknown resource '{}'. Available: {}", slug, known.join(", "))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.iter()
    }
}

fn role_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("Admin", "ADMIN"),
        SelectOption::new("Editor", "EDITOR"),
        SelectOption::new("User", "USER"),
    ]
}

fn board_filters() -> Vec<FilterDefinition> {
    vec![
        FilterDefinition::new("is_pinned", "Pinned", FilterType::Boolean),
        FilterDefinition::new("is_archived", "Archived", FilterType::Boolean),
        FilterDefinition::new("is_trashed", "Trashed", FilterType::Boolean),
    ]
}

fn board_flag_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("is_pinned", "Pinned").format(ColumnFormat::Boolean),
        ColumnDefinition::new("is_archived", "Archived").format(ColumnFormat::Boolean),
        ColumnDefinition::new("is_trashed", "Trashed").format(ColumnFormat::Boolean),
        ColumnDefinition::new("created_at", "Created")
            .format(ColumnFormat::Relative)
            .sortable(),
    ]
}

fn board_flag_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("is_pinned", "Pinned", FieldType::Toggle).default_value(false),
        FieldDefinition::new("is_archived", "Archived", FieldType::Toggle).default_value(false),
    ]
}

fn id_column() -> ColumnDefinition {
    ColumnDefinition::new("id", "ID").sortable().width("80px")
}

fn created_desc() -> Option<DefaultSort> {
    Some(DefaultSort {
        key: "created_at".into(),
        direction: SortDirection::Desc,
    })
}

fn total_widget(label: &str, endpoint: &str) -> DashboardDefinition {
    DashboardDefinition {
        widgets: vec![WidgetDefinition::stat(
            label,
            &format!("{}?page_size=1", endpoint),
            "accent",
        )],
    }
}

fn users() -> ResourceDefinition {
    let columns = vec![
        id_column(),
        ColumnDefinition::new("first_name", "First Name").sortable().searchable(),
        ColumnDefinition::new("last_name", "Last Name").sortable().searchable(),
        ColumnDefinition::new("email", "Email").sortable().searchable(),
        ColumnDefinition::new("role", "Role")
            .sortable()
            .badge("ADMIN", "accent", "Admin")
            .badge("EDITOR", "info", "Editor")
            .badge("USER", "muted", "User"),
        ColumnDefinition::new("job_title", "Job Title"),
        ColumnDefinition::new("active", "Status").format(ColumnFormat::Boolean),
        ColumnDefinition::new("created_at", "Created")
            .format(ColumnFormat::Relative)
            .sortable(),
    ];

    define_resource(ResourceConfig {
        name: "User".into(),
        slug: "users".into(),
        endpoint: "/api/users".into(),
        icon: Some("Users".into()),
        label: Some(ResourceLabel {
            singular: "User".into(),
            plural: "Users".into(),
        }),
        table: TableConfig {
            columns,
            filters: vec![
                FilterDefinition::new("role", "Role", FilterType::Select).options(role_options()),
                FilterDefinition::new("active", "Status", FilterType::Boolean),
            ],
            search_placeholder: Some("Search by name or email...".into()),
            bulk_actions: vec![BulkAction::Delete],
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            layout: Some(FormLayout::TwoColumn),
            fields: vec![
                FieldDefinition::new("first_name", "First Name", FieldType::Text)
                    .required()
                    .placeholder("Enter first name"),
                FieldDefinition::new("last_name", "Last Name", FieldType::Text)
                    .required()
                    .placeholder("Enter last name"),
                FieldDefinition::new("email", "Email", FieldType::Text)
                    .required()
                    .placeholder("user@example.com"),
                FieldDefinition::new("password", "Password", FieldType::Text)
                    .placeholder("Enter password")
                    .description("Required when creating a new user"),
                FieldDefinition::new("role", "Role", FieldType::Select)
                    .required()
                    .options(role_options())
                    .default_value("USER"),
                FieldDefinition::new("job_title", "Job Title", FieldType::Text)
                    .placeholder("e.g. Software Engineer"),
                FieldDefinition::new("avatar", "Avatar", FieldType::Image)
                    .description("Profile picture")
                    .col_span(2),
                FieldDefinition::new("active", "Active", FieldType::Toggle)
                    .default_value(true)
                    .description("Whether this user can log in"),
            ],
            ..Default::default()
        },
        dashboard: Some(DashboardDefinition {
            widgets: vec![
                WidgetDefinition::stat("Total Users", "/api/users?page_size=1", "accent"),
                WidgetDefinition::stat(
                    "Active Users",
                    "/api/users?active=true&page_size=1",
                    "success",
                ),
            ],
        }),
        ..Default::default()
    })
}

fn blogs() -> ResourceDefinition {
    define_resource(ResourceConfig {
        name: "Blog".into(),
        slug: "blogs".into(),
        endpoint: "/api/admin/blogs".into(),
        icon: Some("FileText".into()),
        table: TableConfig {
            columns: vec![
                id_column(),
                ColumnDefinition::new("title", "Title").sortable().searchable(),
                ColumnDefinition::new("slug", "Slug"),
                ColumnDefinition::new("image", "Image").format(ColumnFormat::Image),
                ColumnDefinition::new("published", "Status")
                    .badge("true", "success", "Published")
                    .badge("false", "muted", "Draft"),
                ColumnDefinition::new("published_at", "Published At")
                    .format(ColumnFormat::Relative)
                    .sortable(),
                ColumnDefinition::new("created_at", "Created")
                    .format(ColumnFormat::Relative)
                    .sortable(),
            ],
            filters: vec![
                FilterDefinition::new("published", "Status", FilterType::Select).options(vec![
                    SelectOption::new("Published", "true"),
                    SelectOption::new("Draft", "false"),
                ]),
            ],
            search_placeholder: Some("Search blogs by title...".into()),
            bulk_actions: vec![BulkAction::Delete],
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            fields: vec![
                FieldDefinition::new("title", "Title", FieldType::Text)
                    .required()
                    .placeholder("Enter blog title"),
                FieldDefinition::new("excerpt", "Excerpt", FieldType::Textarea)
                    .placeholder("Brief summary of the blog post"),
                FieldDefinition::new("content", "Content", FieldType::Richtext),
                FieldDefinition::new("image", "Cover Image", FieldType::Image),
                FieldDefinition::new("published", "Published", FieldType::Toggle),
            ],
            ..Default::default()
        },
        ..Default::default()
    })
}

fn labels() -> ResourceDefinition {
    define_resource(ResourceConfig {
        name: "Label".into(),
        slug: "labels".into(),
        endpoint: "/api/labels".into(),
        icon: Some("Tag".into()),
        table: TableConfig {
            columns: vec![
                id_column(),
                ColumnDefinition::new("name", "Name").sortable().searchable(),
                ColumnDefinition::new("slug", "Slug").sortable(),
                ColumnDefinition::new("color", "Color").format(ColumnFormat::Color),
                ColumnDefinition::new("created_at", "Created")
                    .format(ColumnFormat::Relative)
                    .sortable(),
            ],
            search_placeholder: Some("Search labels...".into()),
            actions: Some(vec![TableAction::Create, TableAction::Edit, TableAction::Delete]),
            default_sort: Some(DefaultSort {
                key: "name".into(),
                direction: SortDirection::Asc,
            }),
            ..Default::default()
        },
        form: FormConfig {
            fields: vec![
                FieldDefinition::new("name", "Name", FieldType::Text)
                    .required()
                    .placeholder("Enter label name"),
                FieldDefinition::new("color", "Color", FieldType::Text)
                    .placeholder("#6c5ce7")
                    .default_value("#6c5ce7")
                    .description("Hex color code (e.g., #6c5ce7)"),
            ],
            ..Default::default()
        },
        dashboard: Some(total_widget("Total Labels", "/api/labels")),
        ..Default::default()
    })
}

fn notes() -> ResourceDefinition {
    let mut columns = vec![
        id_column(),
        ColumnDefinition::new("title", "Title").sortable().searchable(),
        ColumnDefinition::new("body", "Body"),
    ];
    columns.extend(board_flag_columns());

    let mut fields = vec![
        FieldDefinition::new("title", "Title", FieldType::Text).placeholder("Note title"),
        FieldDefinition::new("body", "Body", FieldType::Textarea)
            .rows(10)
            .placeholder("Note content..."),
        FieldDefinition::new("color", "Color", FieldType::Text)
            .placeholder("#ffffff")
            .default_value("#ffffff"),
        FieldDefinition::new("labels", "Labels", FieldType::MultiRelationshipSelect)
            .related("/api/labels", "name")
            .relationship_key("labels"),
    ];
    fields.extend(board_flag_fields());

    define_resource(ResourceConfig {
        name: "Note".into(),
        slug: "notes".into(),
        endpoint: "/api/notes".into(),
        icon: Some("FileText".into()),
        table: TableConfig {
            columns,
            filters: board_filters(),
            search_placeholder: Some("Search notes...".into()),
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            fields,
            ..Default::default()
        },
        dashboard: Some(DashboardDefinition {
            widgets: vec![
                WidgetDefinition::stat("Total Notes", "/api/notes?page_size=1", "accent"),
                WidgetDefinition::stat(
                    "Pinned Notes",
                    "/api/notes?is_pinned=true&page_size=1",
                    "info",
                ),
            ],
        }),
        ..Default::default()
    })
}

fn links() -> ResourceDefinition {
    let mut columns = vec![
        id_column(),
        ColumnDefinition::new("title", "Title").sortable().searchable(),
        ColumnDefinition::new("url", "URL").format(ColumnFormat::Link),
    ];
    columns.extend(board_flag_columns());

    let mut fields = vec![
        FieldDefinition::new("url", "URL", FieldType::Text)
            .required()
            .placeholder("https://example.com"),
        FieldDefinition::new("title", "Title", FieldType::Text).placeholder("Link title"),
        FieldDefinition::new("description", "Description", FieldType::Textarea)
            .rows(4)
            .placeholder("Link description..."),
        FieldDefinition::new("thumbnail_url", "Thumbnail URL", FieldType::Text)
            .placeholder("https://example.com/image.jpg"),
        FieldDefinition::new("favicon_url", "Favicon URL", FieldType::Text)
            .placeholder("https://example.com/favicon.ico"),
    ];
    fields.extend(board_flag_fields());

    define_resource(ResourceConfig {
        name: "Link".into(),
        slug: "links".into(),
        endpoint: "/api/links".into(),
        icon: Some("Link".into()),
        table: TableConfig {
            columns,
            filters: board_filters(),
            search_placeholder: Some("Search links...".into()),
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            fields,
            ..Default::default()
        },
        dashboard: Some(total_widget("Total Links", "/api/links")),
        ..Default::default()
    })
}

fn images() -> ResourceDefinition {
    let mut columns = vec![
        id_column(),
        ColumnDefinition::new("title", "Title").sortable().searchable(),
        ColumnDefinition::new("url", "Preview").format(ColumnFormat::Image),
        ColumnDefinition::new("mime_type", "Type"),
        ColumnDefinition::new("size_bytes", "Size"),
    ];
    columns.extend(board_flag_columns());

    let mut fields =
        vec![FieldDefinition::new("title", "Title", FieldType::Text).placeholder("Image title")];
    fields.extend(board_flag_fields());

    define_resource(ResourceConfig {
        name: "Image".into(),
        slug: "images".into(),
        endpoint: "/api/images".into(),
        icon: Some("Image".into()),
        table: TableConfig {
            columns,
            filters: board_filters(),
            search_placeholder: Some("Search images...".into()),
            actions: Some(vec![TableAction::View, TableAction::Edit, TableAction::Delete]),
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            fields,
            ..Default::default()
        },
        dashboard: Some(total_widget("Total Images", "/api/images")),
        ..Default::default()
    })
}

fn files() -> ResourceDefinition {
    let mut columns = vec![
        id_column(),
        ColumnDefinition::new("title", "Title").sortable().searchable(),
        ColumnDefinition::new("original_name", "Filename").searchable(),
        ColumnDefinition::new("extension", "Type"),
        ColumnDefinition::new("size_bytes", "Size"),
    ];
    columns.extend(board_flag_columns());

    let mut fields =
        vec![FieldDefinition::new("title", "Title", FieldType::Text).placeholder("File title")];
    fields.extend(board_flag_fields());

    define_resource(ResourceConfig {
        name: "File".into(),
        slug: "files".into(),
        endpoint: "/api/files".into(),
        icon: Some("File".into()),
        table: TableConfig {
            columns,
            filters: board_filters(),
            search_placeholder: Some("Search files...".into()),
            actions: Some(vec![
                TableAction::View,
                TableAction::Edit,
                TableAction::Delete,
                TableAction::Export,
            ]),
            default_sort: created_desc(),
            ..Default::default()
        },
        form: FormConfig {
            fields,
            ..Default::default()
        },
        dashboard: Some(total_widget("Total Files", "/api/files")),
        ..Default::default()
    })
}

pub fn builtin_resources() -> Vec<ResourceDefinition> {
    vec![users(), blogs(), labels(), notes(), links(), images(), files()]
}
