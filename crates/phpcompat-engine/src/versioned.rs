//! Shared engine for table-driven version checks
//!
//! A rule supplies the checkpoint interpretation and a message template;
//! the engine walks the checkpoints against the target range, composes the
//! message and code, and emits. Rules that need more than the base template
//! override the two filter hooks.

use crate::feature::FeatureEntry;
use crate::rule::RuleContext;
use phpcompat_core::{error_code, Version, VersionGate};

/// How the boolean checkpoints of an entry are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoints {
    /// `false` = not yet available, `true` = available.
    Introduced,

    /// `false` = deprecated, `true` = removed.
    Withdrawn,

    /// `true` = required, `false` = optional.
    RequiredUntil,
}

/// Outcome of walking an entry's checkpoints against the range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Absent in `version` (and everything below it)
    NotIntroduced { version: Version },

    /// Required up to and including `version`
    Required { version: Version },

    /// Deprecated and/or removed within the range
    Withdrawn {
        deprecated: Option<Version>,
        removed: Option<Version>,
    },
}

impl Verdict {
    /// Default severity: anything that breaks is an error, deprecation warns
    pub fn is_error(&self) -> bool {
        match self {
            Verdict::NotIntroduced { .. } | Verdict::Required { .. } => true,
            Verdict::Withdrawn { removed, .. } => removed.is_some(),
        }
    }
}

/// Walk `entry` against `gate`. `None` means the range is unaffected.
pub fn assess(strategy: Checkpoints, entry: &FeatureEntry, gate: &VersionGate) -> Option<Verdict> {
    if gate.is_inert() {
        return None;
    }

    match strategy {
        Checkpoints::Introduced => entry
            .checkpoints()
            .iter()
            .find(|&&(version, present)| !present && gate.includes_at_or_below(version))
            .map(|&(version, _)| Verdict::NotIntroduced { version }),

        Checkpoints::RequiredUntil => entry
            .checkpoints()
            .iter()
            .rev()
            .find(|&&(version, required)| required && gate.includes_at_or_below(version))
            .map(|&(version, _)| Verdict::Required { version }),

        Checkpoints::Withdrawn => {
            let mut deprecated = None;
            let mut removed = None;

            for &(version, is_removed) in entry.checkpoints() {
                if !gate.includes_at_or_above(version) {
                    continue;
                }
                if is_removed {
                    removed.get_or_insert(version);
                } else {
                    deprecated.get_or_insert(version);
                }
            }

            if deprecated.is_none() && removed.is_none() {
                None
            } else {
                Some(Verdict::Withdrawn { deprecated, removed })
            }
        }
    }
}

/// The thing a rule matched, as it appears in messages and codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Leading template data, before any version
    pub data: Vec<String>,

    /// Normalised code base the verdict suffix is appended to
    pub code: String,
}

impl Item {
    /// A single-name item: data `[name]`, code derived from `name`
    pub fn named(name: &str) -> Self {
        Self {
            data: vec![name.to_string()],
            code: error_code(name),
        }
    }

    /// Custom data with a code derived from `code_base`
    pub fn new(data: Vec<String>, code_base: &str) -> Self {
        Self {
            data,
            code: error_code(code_base),
        }
    }
}

/// A table-driven rule built on the shared engine
pub trait VersionedFeature {
    const CHECKPOINTS: Checkpoints;

    /// Base message.
    ///
    /// For [`Checkpoints::Introduced`] and [`Checkpoints::RequiredUntil`] the
    /// template ends with the version placeholder. For
    /// [`Checkpoints::Withdrawn`] it is the prefix the "deprecated since" and
    /// "removed since" clauses are appended to.
    fn template(&self) -> &'static str;

    fn filter_message(&self, message: String, _entry: &FeatureEntry, _item: &Item) -> String {
        message
    }

    fn filter_data(&self, data: Vec<String>, _entry: &FeatureEntry, _item: &Item) -> Vec<String> {
        data
    }

    fn is_error(&self, verdict: &Verdict, _item: &Item) -> bool {
        verdict.is_error()
    }

    fn code(&self, verdict: &Verdict, item: &Item) -> String {
        match verdict {
            Verdict::NotIntroduced { .. } => format!("{}Found", item.code),
            Verdict::Required { .. } => format!("{}Missing", item.code),
            Verdict::Withdrawn { deprecated, removed } => {
                let mut code = item.code.clone();
                if deprecated.is_some() {
                    code.push_str("Deprecated");
                }
                if removed.is_some() {
                    code.push_str("Removed");
                }
                code
            }
        }
    }
}

/// Assess `entry` and emit at `index` when the range is affected.
///
/// Returns whether anything was emitted.
pub fn check_feature<F>(feature: &F, ctx: &mut RuleContext<'_>, index: usize, entry: &FeatureEntry, item: &Item) -> bool
where
    F: VersionedFeature + ?Sized,
{
    let Some(verdict) = assess(F::CHECKPOINTS, entry, ctx.gate()) else {
        return false;
    };

    let (template, data) = compose(feature.template(), &verdict, item);
    let template = feature.filter_message(template, entry, item);
    let data = feature.filter_data(data, entry, item);

    let is_error = feature.is_error(&verdict, item);
    let code = feature.code(&verdict, item);
    ctx.emit(template, index, is_error, code, data);
    true
}

/// Base template plus version clauses, and the matching data
pub fn compose(base: &str, verdict: &Verdict, item: &Item) -> (String, Vec<String>) {
    let mut template = base.to_string();
    let mut data = item.data.clone();

    match *verdict {
        Verdict::NotIntroduced { version } | Verdict::Required { version } => {
            data.push(version.to_string());
        }
        Verdict::Withdrawn { deprecated, removed } => {
            if let Some(version) = deprecated {
                template.push_str("deprecated since PHP %s and ");
                data.push(version.to_string());
            }
            if let Some(version) = removed {
                template.push_str("removed since PHP %s and ");
                data.push(version.to_string());
            }
            if template.ends_with(" and ") {
                template.truncate(template.len() - " and ".len());
            }
        }
    }

    (template, data)
}

/// `filter_message` helper for entries carrying an `alternative`
pub fn with_alternative_message(message: String, entry: &FeatureEntry) -> String {
    match entry.alternative() {
        Some(_) => message + "; Use %s instead",
        None => message,
    }
}

/// `filter_data` helper matching [`with_alternative_message`]
pub fn with_alternative_data(mut data: Vec<String>, entry: &FeatureEntry) -> Vec<String> {
    if let Some(alternative) = entry.alternative() {
        data.push(alternative.to_string());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Finding;
    use phpcompat_core::{format_message, TargetRange};
    use phpcompat_tokens::Lexer;
    use pretty_assertions::assert_eq;

    fn gate(range: &str) -> VersionGate {
        VersionGate::new(TargetRange::parse(range).unwrap())
    }

    fn v(major: u32, minor: u32) -> Version {
        Version::new(major, minor)
    }

    struct Removed;

    impl VersionedFeature for Removed {
        const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

        fn template(&self) -> &'static str {
            "Function %s() is "
        }

        fn filter_message(&self, message: String, entry: &FeatureEntry, _item: &Item) -> String {
            with_alternative_message(message, entry)
        }

        fn filter_data(&self, data: Vec<String>, entry: &FeatureEntry, _item: &Item) -> Vec<String> {
            with_alternative_data(data, entry)
        }
    }

    #[test]
    fn inert_gate_never_assesses() {
        let entry = FeatureEntry::new("f", [(v(5, 1), false), (v(5, 2), true)]);
        let inert = VersionGate::default();
        for strategy in [Checkpoints::Introduced, Checkpoints::Withdrawn, Checkpoints::RequiredUntil] {
            assert_eq!(assess(strategy, &entry, &inert), None);
        }
    }

    #[test]
    fn introduced_reports_the_lowest_boundary_once() {
        let entry = FeatureEntry::new("f", [(v(5, 1), false), (v(5, 2), true)]);
        assert_eq!(
            assess(Checkpoints::Introduced, &entry, &gate("5.0")),
            Some(Verdict::NotIntroduced { version: v(5, 1) })
        );
        assert_eq!(assess(Checkpoints::Introduced, &entry, &gate("5.2")), None);

        let staged = FeatureEntry::new("g", [(v(5, 3), false), (v(5, 4), false), (v(5, 5), true)]);
        assert_eq!(
            assess(Checkpoints::Introduced, &staged, &gate("5.0-8.0")),
            Some(Verdict::NotIntroduced { version: v(5, 3) })
        );
    }

    #[test]
    fn withdrawn_stages() {
        let entry = FeatureEntry::new("f", [(v(5, 5), false), (v(5, 6), true)]);

        assert_eq!(
            assess(Checkpoints::Withdrawn, &entry, &gate("-7.0")),
            Some(Verdict::Withdrawn { deprecated: Some(v(5, 5)), removed: Some(v(5, 6)) })
        );
        assert_eq!(
            assess(Checkpoints::Withdrawn, &entry, &gate("-5.5")),
            Some(Verdict::Withdrawn { deprecated: Some(v(5, 5)), removed: None })
        );
        assert_eq!(assess(Checkpoints::Withdrawn, &entry, &gate("-5.4")), None);
    }

    #[test]
    fn required_until_takes_the_last_required_checkpoint() {
        let entry = FeatureEntry::new("f", [(v(5, 2), true), (v(5, 3), true), (v(5, 4), false)]);
        assert_eq!(
            assess(Checkpoints::RequiredUntil, &entry, &gate("5.0-")),
            Some(Verdict::Required { version: v(5, 3) })
        );
        assert_eq!(assess(Checkpoints::RequiredUntil, &entry, &gate("5.4-")), None);
    }

    #[test]
    fn composes_removed_message_with_alternative() {
        let entry = FeatureEntry::new("ereg", [(v(5, 3), false), (v(7, 0), true)])
            .with_metadata("alternative", "preg_match()");
        let stream = Lexer::new("<?php ereg();").tokenize().unwrap();
        let range = gate("5.6-7.4");
        let mut findings: Vec<Finding> = Vec::new();

        let mut ctx = RuleContext::new("RemovedFunctions", &stream, &range, &mut findings);
        assert!(check_feature(&Removed, &mut ctx, 1, &entry, &Item::named("ereg")));

        let finding = &findings[0];
        assert_eq!(
            finding.template,
            "Function %s() is deprecated since PHP %s and removed since PHP %s; Use %s instead"
        );
        assert_eq!(finding.code, "eregDeprecatedRemoved");
        assert!(finding.is_error);
        assert_eq!(
            format_message(&finding.template, &finding.data),
            "Function ereg() is deprecated since PHP 5.3 and removed since PHP 7.0; Use preg_match() instead"
        );
    }

    #[test]
    fn deprecation_alone_is_a_warning() {
        let entry = FeatureEntry::new("each", [(v(7, 2), false), (v(8, 0), true)]);
        let stream = Lexer::new("<?php each($a);").tokenize().unwrap();
        let range = gate("7.2");
        let mut findings: Vec<Finding> = Vec::new();

        let mut ctx = RuleContext::new("RemovedFunctions", &stream, &range, &mut findings);
        check_feature(&Removed, &mut ctx, 1, &entry, &Item::named("each"));

        assert_eq!(findings[0].template, "Function %s() is deprecated since PHP %s");
        assert_eq!(findings[0].code, "eachDeprecated");
        assert!(!findings[0].is_error);
    }
}
