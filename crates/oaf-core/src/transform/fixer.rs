use crate::config::FixConfig;
use crate::error::FixError;
use crate::parse::spec::{Document, Variant};
use crate::refs::{RenameMap, rewrite_document};

use super::name_normalizer::{GenericNaming, plan_renames};
use super::prune::{prune_empty_paths, prune_unused_schemas};
use super::result::{AppliedFix, FixKind, FixResult};

/// Which fixes a [`Fixer`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    pub rename_generic_schemas: bool,
    pub prune_unused_schemas: bool,
    pub prune_empty_paths: bool,
    pub naming: GenericNaming,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            rename_generic_schemas: true,
            prune_unused_schemas: true,
            prune_empty_paths: false,
            naming: GenericNaming::default(),
        }
    }
}

impl From<&FixConfig> for FixOptions {
    fn from(config: &FixConfig) -> Self {
        Self {
            rename_generic_schemas: config.fixes.rename_generic_schemas,
            prune_unused_schemas: config.fixes.prune_unused_schemas,
            prune_empty_paths: config.fixes.prune_empty_paths,
            naming: config.naming,
        }
    }
}

/// Runs the fix pipeline over a document.
///
/// [`Fixer::fix`] leaves its input untouched and returns a fixed copy;
/// [`Fixer::fix_in_place`] mutates the caller's document.
#[derive(Debug, Clone, Default)]
pub struct Fixer {
    options: FixOptions,
}

impl Fixer {
    pub fn new(options: FixOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FixOptions {
        &self.options
    }

    /// Fix a copy of `doc`.
    pub fn fix(&self, doc: &Document) -> Result<(Document, FixResult), FixError> {
        check_variant(doc)?;
        let mut fixed = doc.clone();
        let result = self.run(&mut fixed);
        Ok((fixed, result))
    }

    /// Fix `doc` itself.
    pub fn fix_in_place(&self, doc: &mut Document) -> Result<FixResult, FixError> {
        check_variant(doc)?;
        Ok(self.run(doc))
    }

    fn run(&self, doc: &mut Document) -> FixResult {
        let mut result = FixResult::default();

        // Phase 1: rename generic-style schemas and rewrite their pointers
        if self.options.rename_generic_schemas {
            rename_generic_schemas(doc, self.options.naming, &mut result);
        }

        // Phase 2: drop path items that hold nothing
        if self.options.prune_empty_paths {
            prune_empty_paths(doc, &mut result);
        }

        // Phase 3: drop schemas nothing reaches
        if self.options.prune_unused_schemas {
            prune_unused_schemas(doc, &mut result);
        }

        log::info!(
            "applied {} fix(es) to {} document '{}'",
            result.count(),
            doc.variant(),
            doc.info().title
        );
        result
    }
}

/// The declared version must agree with the shape the document was parsed as.
fn check_variant(doc: &Document) -> Result<(), FixError> {
    let variant = doc.variant();
    let expected = match variant {
        Variant::Legacy => "2.",
        Variant::Modern => "3.",
    };
    if doc.version().starts_with(expected) {
        Ok(())
    } else {
        Err(FixError::IndeterminateVariant {
            variant,
            version: doc.version().to_string(),
        })
    }
}

fn rename_generic_schemas(doc: &mut Document, naming: GenericNaming, result: &mut FixResult) {
    let Some(schemas) = doc.schemas() else {
        return;
    };
    let renames = plan_renames(schemas.keys().map(String::as_str), naming);
    if renames.is_empty() {
        return;
    }

    apply_renames(doc, &renames);
    let rewritten = rewrite_document(doc, &renames);

    let location = doc.schemas_location();
    for (old, new) in &renames {
        let updated = rewritten
            .iter()
            .filter(|r| r.schema == *old)
            .count();
        result.push(AppliedFix {
            kind: FixKind::RenamedGenericSchema,
            path: format!("{location}.{old}"),
            description: format!(
                "renamed schema '{old}' to '{new}' ({updated} reference(s) updated)"
            ),
            before: Some(old.clone()),
            after: Some(new.clone()),
        });
    }
}

/// Re-key renamed schemas, keeping each one at its position in the map.
fn apply_renames(doc: &mut Document, renames: &RenameMap) {
    let Some(schemas) = doc.schemas_mut() else {
        return;
    };
    *schemas = std::mem::take(schemas)
        .into_iter()
        .map(|(name, schema)| match renames.get(&name) {
            Some(new) => (new.clone(), schema),
            None => (name, schema),
        })
        .collect();
}
