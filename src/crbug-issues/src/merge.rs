//! Combines partial records from several strategies into one issue.
//!
//! Records are absorbed in the order their strategies ran. Later scalar
//! values replace earlier ones, except that a placeholder-looking title never
//! replaces a real one and the first description wins.

use crate::cross_refs::ChangeIdSet;
use crate::decode::text::{is_migration_artifact, is_substantive, title_from_content};
use crate::model::{
    Comment, Issue, IssueType, PartialRecord, Priority, Provenance, SchemaDrift, Severity, Status,
};

/// Substrings that mark a generic upstream title such as `Issue 40063133`.
const PLACEHOLDER_TITLE_MARKERS: &[&str] = &["Issue ", "Unknown"];

/// Returns true for titles that look like upstream placeholders.
///
/// This is a heuristic: a real title containing one of the markers is
/// treated as a placeholder too.
#[must_use]
pub fn is_placeholder_title(title: &str) -> bool {
    PLACEHOLDER_TITLE_MARKERS
        .iter()
        .any(|marker| title.contains(marker))
}

/// Accumulates partial records under the merge precedence rules.
#[derive(Debug, Clone)]
pub struct ResultMerger {
    id: String,
    title: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
    issue_type: Option<IssueType>,
    severity: Option<Severity>,
    reporter: Option<String>,
    assignee: Option<String>,
    created: Option<String>,
    modified: Option<String>,
    description: Option<String>,
    comments: Vec<Comment>,
    change_ids: ChangeIdSet,
    schema_drift: Vec<SchemaDrift>,
    last_absorbed: Option<Provenance>,
    last_contributor: Option<Provenance>,
}

impl ResultMerger {
    /// Starts a merge for the given issue id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            status: None,
            priority: None,
            issue_type: None,
            severity: None,
            reporter: None,
            assignee: None,
            created: None,
            modified: None,
            description: None,
            comments: Vec::new(),
            change_ids: ChangeIdSet::new(),
            schema_drift: Vec::new(),
            last_absorbed: None,
            last_contributor: None,
        }
    }

    /// Absorbs the record of the next strategy in run order.
    pub fn absorb(&mut self, source: Provenance, record: PartialRecord) -> &mut Self {
        self.last_absorbed = Some(source);
        if !record.is_empty() {
            self.last_contributor = Some(source);
        }

        for text in record
            .title
            .iter()
            .chain(record.description.iter())
            .chain(record.comments.iter().map(|comment| &comment.content))
        {
            self.change_ids.extend_from_text(text);
        }
        for id in record.related_change_ids {
            self.change_ids.insert(id);
        }

        if let Some(title) = record.title {
            let keep_existing = self.title.is_some() && is_placeholder_title(&title);
            if !keep_existing {
                self.title = Some(title);
            }
        }
        if self.description.is_none() {
            self.description = record.description;
        }

        overwrite(&mut self.status, record.status);
        overwrite(&mut self.priority, record.priority);
        overwrite(&mut self.issue_type, record.issue_type);
        overwrite(&mut self.severity, record.severity);
        overwrite(&mut self.reporter, record.reporter);
        overwrite(&mut self.assignee, record.assignee);
        overwrite(&mut self.created, record.created);
        overwrite(&mut self.modified, record.modified);

        self.comments.extend(
            record
                .comments
                .into_iter()
                .filter(|comment| !is_migration_artifact(&comment.content)),
        );
        self.schema_drift.extend(record.schema_drift);
        self
    }

    /// Returns true once any absorbed record carried a usable field.
    #[must_use]
    pub fn has_contributions(&self) -> bool {
        self.last_contributor.is_some()
    }

    /// Returns true when the data gathered so far is enough to stop early:
    /// at least one comment, or a description longer than the comment
    /// threshold.
    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        !self.comments.is_empty()
            || self
                .description
                .as_deref()
                .is_some_and(is_substantive)
    }

    /// Produces the canonical issue.
    ///
    /// A missing description is taken from the first substantive comment.
    /// When the title was missing as well, that comment's first line becomes
    /// the title if it is title-sized.
    #[must_use]
    pub fn finish(mut self) -> Issue {
        if self.description.is_none() {
            if let Some(first) = self
                .comments
                .iter()
                .find(|comment| is_substantive(&comment.content))
            {
                if self.title.is_none() {
                    self.title = title_from_content(&first.content);
                }
                self.description = Some(first.content.clone());
            }
        }

        Issue {
            id: self.id,
            title: self.title,
            status: self.status.unwrap_or(Status::Unset),
            priority: self.priority.unwrap_or(Priority::Unset),
            issue_type: self.issue_type.unwrap_or(IssueType::Unset),
            severity: self.severity.unwrap_or(Severity::Unset),
            reporter: self.reporter,
            assignee: self.assignee,
            created: self.created,
            modified: self.modified,
            description: self.description,
            comments: self.comments,
            related_change_ids: self.change_ids.into_vec(),
            provenance: self
                .last_contributor
                .or(self.last_absorbed)
                .unwrap_or(Provenance::Direct),
            schema_drift: self.schema_drift,
        }
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Merges records given in strategy run order.
#[must_use]
pub fn merge(
    id: impl Into<String>,
    records: impl IntoIterator<Item = (Provenance, PartialRecord)>,
) -> Issue {
    let mut merger = ResultMerger::new(id);
    for (source, record) in records {
        merger.absorb(source, record);
    }
    merger.finish()
}
