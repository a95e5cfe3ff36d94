//! Reply rendering.
//!
//! Handlers describe a reply as a [`Document`]: sections with an optional
//! heading and a body of labeled fields, list items or free text. A single
//! renderer turns a document into plain text or an HTML fragment.
//!
//! Host-supplied content is written verbatim, without escaping.

use repobot_core::{
    ActionKind, Branch, CommitSummary, Error, IssueSummary, Readme, RepoLink, RepoRef, Repository,
    ResponseFormat, UserProfile,
};

/// Placeholder for values the host did not supply.
const NOT_AVAILABLE: &str = "N/A";

/// An inline value: plain text or a link.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Link { label: String, url: String },
}

impl Inline {
    fn text(value: impl ToString) -> Self {
        Inline::Text(value.to_string())
    }

    fn optional(value: Option<impl ToString>) -> Self {
        value.map_or_else(|| Inline::text(NOT_AVAILABLE), Inline::text)
    }

    fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Inline::Link {
            label: label.into(),
            url: url.into(),
        }
    }

    fn render(&self, format: ResponseFormat) -> String {
        match (self, format) {
            (Inline::Text(text), _) => text.clone(),
            (Inline::Link { label, url }, ResponseFormat::Text) => format!("{} ({})", label, url),
            (Inline::Link { label, url }, ResponseFormat::Html) => {
                format!("<a href=\"{}\">{}</a>", url, label)
            }
        }
    }
}

/// Content of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Fields(Vec<(String, Inline)>),
    Items(Vec<Inline>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: Option<String>,
    pub body: Body,
}

/// A structured reply, independent of presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// A document holding one line of text.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            sections: vec![Section {
                heading: None,
                body: Body::Text(text.into()),
            }],
        }
    }

    /// Append a section.
    pub fn section(mut self, heading: impl Into<String>, body: Body) -> Self {
        self.sections.push(Section {
            heading: Some(heading.into()),
            body,
        });
        self
    }

    pub fn render(&self, format: ResponseFormat) -> String {
        match format {
            ResponseFormat::Text => self
                .sections
                .iter()
                .map(render_text_section)
                .collect::<Vec<_>>()
                .join("\n\n"),
            ResponseFormat::Html => self.sections.iter().map(render_html_section).collect(),
        }
    }
}

fn render_text_section(section: &Section) -> String {
    let mut lines = Vec::new();

    if let Some(heading) = &section.heading {
        lines.push(format!("{}:", heading));
    }

    match &section.body {
        Body::Empty => {}
        Body::Fields(fields) => lines.extend(fields.iter().map(|(label, value)| {
            format!("- {}: {}", label, value.render(ResponseFormat::Text))
        })),
        Body::Items(items) => lines.extend(
            items
                .iter()
                .map(|item| format!("- {}", item.render(ResponseFormat::Text))),
        ),
        Body::Text(text) => lines.push(text.clone()),
    }

    lines.join("\n")
}

fn render_html_section(section: &Section) -> String {
    let mut out = String::new();

    if let Some(heading) = &section.heading {
        out.push_str(&format!("<h3>{}</h3>", heading));
    }

    match &section.body {
        Body::Empty => {}
        Body::Fields(fields) => {
            out.push_str("<ul>");
            for (label, value) in fields {
                out.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>",
                    label,
                    value.render(ResponseFormat::Html)
                ));
            }
            out.push_str("</ul>");
        }
        Body::Items(items) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str(&format!("<li>{}</li>", item.render(ResponseFormat::Html)));
            }
            out.push_str("</ul>");
        }
        Body::Text(text) => out.push_str(&text.lines().collect::<Vec<_>>().join("<br>")),
    }

    out
}

// =============================================================================
// Per-action documents
// =============================================================================

fn field(label: &str, value: Inline) -> (String, Inline) {
    (label.to_string(), value)
}

fn repo_fields(repo: &Repository) -> Vec<(String, Inline)> {
    vec![
        field("Description", Inline::optional(repo.description.as_ref())),
        field("Stars", Inline::text(repo.stars)),
        field("Forks", Inline::text(repo.forks)),
        field("Open Issues", Inline::text(repo.open_issues)),
    ]
}

pub fn repo_details(repo: &Repository) -> Document {
    let mut fields = vec![field("Name", Inline::text(&repo.name))];
    fields.extend(repo_fields(repo));

    Document::default().section("Repository Details", Body::Fields(fields))
}

pub fn comparison(first: &Repository, second: &Repository) -> Document {
    Document::default()
        .section("Comparison of Repositories", Body::Empty)
        .section(
            format!("Repo 1 - {}", first.name),
            Body::Fields(repo_fields(first)),
        )
        .section(
            format!("Repo 2 - {}", second.name),
            Body::Fields(repo_fields(second)),
        )
}

pub fn issue_created() -> Document {
    Document::message("Issue created successfully.")
}

pub fn issues(repo: &RepoRef, issues: &[IssueSummary]) -> Document {
    if issues.is_empty() {
        return Document::message("No issues found in the repository.");
    }

    let items = issues
        .iter()
        .map(|issue| Inline::Text(format!("#{}: {}", issue.number, issue.title)))
        .collect();

    Document::default().section(format!("Issues in {}", repo), Body::Items(items))
}

pub fn readme(readme: &Readme) -> Document {
    Document::default().section("README Content", Body::Text(readme.content.clone()))
}

pub fn collaborator_added() -> Document {
    Document::message("Collaborator added successfully.")
}

pub fn collaborator_removed() -> Document {
    Document::message("Collaborator removed successfully.")
}

pub fn commits(repo: &RepoRef, commits: &[CommitSummary]) -> Document {
    if commits.is_empty() {
        return Document::message("No commits found in the repository.");
    }

    let items = commits
        .iter()
        .map(|commit| Inline::Text(format!("{} - {}", commit.sha, commit.summary())))
        .collect();

    Document::default().section(format!("Commits in {}", repo), Body::Items(items))
}

pub fn branches(repo: &RepoRef, branches: &[Branch]) -> Document {
    if branches.is_empty() {
        return Document::message("No branches found in the repository.");
    }

    let items = branches.iter().map(|b| Inline::text(&b.name)).collect();

    Document::default().section(format!("Branches in {}", repo), Body::Items(items))
}

pub fn user_info(user: &UserProfile, repos: &[RepoLink]) -> Document {
    let fields = vec![
        field("Name", Inline::optional(user.name.as_ref())),
        field("Company", Inline::optional(user.company.as_ref())),
        field("Location", Inline::optional(user.location.as_ref())),
        field("Bio", Inline::optional(user.bio.as_ref())),
        field("Followers", Inline::optional(user.followers)),
        field("Following", Inline::optional(user.following)),
        field("Public Repos", Inline::optional(user.public_repos)),
        field(
            "Twitter",
            Inline::optional(user.twitter_username.as_ref().map(|t| format!("@{}", t))),
        ),
        field("GitHub Profile", Inline::link("Visit Profile", &user.html_url)),
    ];

    let repositories = if repos.is_empty() {
        Body::Text("No public repositories.".to_string())
    } else {
        Body::Items(
            repos
                .iter()
                .map(|r| Inline::link(&r.name, &r.html_url))
                .collect(),
        )
    };

    Document::default()
        .section(format!("GitHub User Info: {}", user.login), Body::Fields(fields))
        .section("Repositories", repositories)
}

/// Reply for a failed action: the operation plus the error detail.
pub fn failure(kind: ActionKind, error: &Error) -> String {
    let operation = match kind {
        ActionKind::GetDetails | ActionKind::Compare => "fetch repository details",
        ActionKind::CreateIssue => "create issue",
        ActionKind::ListIssues => "list issues",
        ActionKind::GetReadme => "fetch README",
        ActionKind::AddCollaborator => "add collaborator",
        ActionKind::RemoveCollaborator => "remove collaborator",
        ActionKind::GetCommits => "list commits",
        ActionKind::GetBranches => "list branches",
        ActionKind::GetUserInfo => "fetch user info",
    };

    format!("Failed to {}: {}", operation, error.detail())
}
