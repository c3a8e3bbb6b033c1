use std::fmt;

use serde::Serialize;

/// What a single applied fix did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixKind {
    RenamedGenericSchema,
    PrunedUnusedSchema,
    PrunedEmptyPath,
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixKind::RenamedGenericSchema => "renamed-generic-schema",
            FixKind::PrunedUnusedSchema => "pruned-unused-schema",
            FixKind::PrunedEmptyPath => "pruned-empty-path",
        };
        f.write_str(label)
    }
}

/// One change made to the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFix {
    pub kind: FixKind,
    /// Dotted location in the document, e.g. `components.schemas.Page[User]`.
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl fmt::Display for AppliedFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path, self.description)
    }
}

/// Accumulated outcome of a fix pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixResult {
    pub fixes: Vec<AppliedFix>,
    pub success: bool,
}

impl Default for FixResult {
    fn default() -> Self {
        Self {
            fixes: Vec::new(),
            success: true,
        }
    }
}

impl FixResult {
    pub fn push(&mut self, fix: AppliedFix) {
        log::debug!("{fix}");
        self.fixes.push(fix);
    }

    pub fn count(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn of_kind(&self, kind: FixKind) -> impl Iterator<Item = &AppliedFix> {
        self.fixes.iter().filter(move |f| f.kind == kind)
    }
}
