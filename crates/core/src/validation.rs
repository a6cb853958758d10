//! Document validation: gates saving and forward tab navigation.
//!
//! Validation distinguishes hard errors (missing required scalar fields,
//! which always block save) from soft warnings (missing permit coverage or
//! an empty relation list, which block forward navigation unless the caller
//! passes the tolerant-save flag). The validator returns a structured
//! report and never panics; presentation is entirely the caller's business.

use crate::document::Document;
use crate::entities::Catalogs;
use crate::permits::derive_required_permits;

/// Form tabs of the document editor, in navigation order.
///
/// The report points at the lowest tab owning a problem so the UI can jump
/// the user straight to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentTab {
    GeneralInfo,
    Risques,
    Dispositifs,
    Permits,
    AnalysesDeRisque,
}

impl DocumentTab {
    /// Zero-based tab index as laid out in the editor.
    pub fn index(self) -> usize {
        match self {
            DocumentTab::GeneralInfo => 0,
            DocumentTab::Risques => 1,
            DocumentTab::Dispositifs => 2,
            DocumentTab::Permits => 3,
            DocumentTab::AnalysesDeRisque => 4,
        }
    }
}

/// How severe a validation finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Blocks save unconditionally.
    Error,
    /// Blocks forward navigation unless the tolerant-save flag is set.
    Warning,
}

/// One validation finding, attached to the tab that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub tab: DocumentTab,
    pub message: String,
}

/// The full validation outcome for one document snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// No hard errors. Warnings do not affect this.
    pub is_valid: bool,
    pub has_warnings: bool,
    /// Lowest tab owning a hard error; with warnings only, the lowest
    /// warning-owning tab; `None` when the report is clean.
    pub first_error_tab: Option<DocumentTab>,
    /// Saving is allowed: no errors, and warnings only under the tolerant
    /// flag.
    pub save_allowed: bool,
    /// Forward navigation is allowed; same gating as `save_allowed`.
    pub navigation_allowed: bool,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>, allow_tolerant_save: bool) -> Self {
        let has_errors = issues.iter().any(|i| i.severity == Severity::Error);
        let has_warnings = issues.iter().any(|i| i.severity == Severity::Warning);

        let first_of = |severity: Severity| {
            issues
                .iter()
                .filter(|i| i.severity == severity)
                .map(|i| i.tab)
                .min()
        };
        let first_error_tab = if has_errors {
            first_of(Severity::Error)
        } else {
            first_of(Severity::Warning)
        };

        let unblocked = !has_errors && (!has_warnings || allow_tolerant_save);

        Self {
            issues,
            is_valid: !has_errors,
            has_warnings,
            first_error_tab,
            save_allowed: unblocked,
            navigation_allowed: unblocked,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }
}

/// Validates a document snapshot against its catalogs.
///
/// Hard errors: missing name, missing chantier, missing entreprise
/// extérieure. Soft warnings: no active relations at all, and each derived
/// permit requirement left uncovered. `allow_tolerant_save` lets warnings
/// through; it never excuses hard errors.
pub fn validate(
    document: &Document,
    catalogs: &Catalogs,
    allow_tolerant_save: bool,
) -> ValidationReport {
    let mut issues = Vec::new();

    let mut require = |present: bool, message: &str| {
        if !present {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                tab: DocumentTab::GeneralInfo,
                message: message.to_owned(),
            });
        }
    };
    require(document.nom.is_some(), "missing document name");
    require(document.chantier_id.is_some(), "missing associated chantier");
    require(
        document.entreprise_exterieure_id.is_some(),
        "missing associated entreprise extérieure",
    );

    if document.relations.active_count() == 0 {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            tab: DocumentTab::Risques,
            message: "document has no linked entities".to_owned(),
        });
    }

    for group in derive_required_permits(&document.relations, catalogs) {
        if !group.is_linked {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                tab: DocumentTab::Permits,
                message: format!(
                    "no {} permit linked ({} risk(s) require one)",
                    group.permit_type,
                    group.risks.len()
                ),
            });
        }
    }

    ValidationReport::from_issues(issues, allow_tolerant_save)
}
