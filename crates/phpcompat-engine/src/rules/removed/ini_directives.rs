use crate::feature::{FeatureEntry, FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::{called_function, literal_argument, INI_FUNCTIONS};
use crate::versioned::{check_feature, with_alternative_data, Checkpoints, Item, Verdict, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/removed_ini_directives.json");

/// INI directives read or written after they were retired
#[derive(Debug)]
pub struct RemovedIniDirectives {
    table: FeatureTable,
}

struct IniCall {
    getter: bool,
}

impl VersionedFeature for IniCall {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "INI directive '%s' is "
    }

    fn filter_message(&self, message: String, entry: &FeatureEntry, _item: &Item) -> String {
        match entry.alternative() {
            Some(_) => message + "; Use '%s' instead",
            None => message,
        }
    }

    fn filter_data(&self, data: Vec<String>, entry: &FeatureEntry, _item: &Item) -> Vec<String> {
        with_alternative_data(data, entry)
    }

    fn is_error(&self, verdict: &Verdict, _item: &Item) -> bool {
        verdict.is_error() && !self.getter
    }
}

impl Rule for RemovedIniDirectives {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedIniDirectives",
            description: "Detects INI directives that are deprecated or removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("removed_ini_directives", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        let Some(function) = called_function(stream, index) else {
            return;
        };
        if !INI_FUNCTIONS.contains(&function.as_str()) {
            return;
        }

        let Some((argument, directive)) = literal_argument(stream, index, 1) else {
            return;
        };
        if let Some(entry) = self.table.get(&directive) {
            let call = IniCall {
                getter: function == "ini_get",
            };
            check_feature(&call, ctx, argument.start, entry, &Item::named(&directive));
        }
    }
}
