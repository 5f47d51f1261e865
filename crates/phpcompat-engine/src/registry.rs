//! Rule catalogue and the token-kind dispatch table

use crate::feature::TableError;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::rules::forbidden::{
    ForbiddenBreakContinueVariableArguments, ForbiddenNames, ForbiddenNamesAsDeclared, ForbiddenNegativeBitshift,
};
use crate::rules::new::{
    NewClasses, NewExecutionDirectives, NewFunctionParameters, NewFunctions, NewHashAlgorithms, NewIniDirectives,
    NewInterfaces, NewKeywords, NewMagicMethods, NewOperators, NewShortArray, RequiredToOptionalFunctionParameters,
};
use crate::rules::removed::{
    DeprecatedMagicAutoload, OptionalToRequiredFunctionParameters, RemovedFunctionParameters, RemovedFunctions,
    RemovedGlobalVariables, RemovedHashAlgorithms, RemovedIniDirectives, RemovedNonCryptoHash, RemovedTypeCasts,
};
use phpcompat_core::RuleSelection;
use phpcompat_tokens::TokenKind;
use std::collections::HashMap;
use tracing::debug;

macro_rules! define_rules {
    ($($variant:ident),* $(,)?) => {
        /// Every rule the engine ships
        #[derive(Debug)]
        pub enum AnyRule {$(
            $variant($variant),
        )*}

        impl AnyRule {
            /// Metadata of every known rule, in catalogue order
            pub fn catalogue() -> Vec<&'static RuleMeta> {
                vec![$($variant::meta(),)*]
            }

            /// Build every rule `selection` leaves enabled
            pub fn build_enabled(selection: &RuleSelection) -> Result<Vec<Self>, TableError> {
                let mut rules = Vec::new();
                $(
                    if selection.is_enabled($variant::meta().name) {
                        rules.push(AnyRule::$variant($variant::build()?));
                    }
                )*
                Ok(rules)
            }

            #[inline]
            pub fn meta(&self) -> &'static RuleMeta {
                match self {
                    $( AnyRule::$variant(_) => $variant::meta(), )*
                }
            }

            #[inline]
            pub fn name(&self) -> &'static str {
                self.meta().name
            }

            #[inline]
            pub fn targets(&self) -> &'static [TokenKind] {
                match self {
                    $( AnyRule::$variant(_) => $variant::targets(), )*
                }
            }

            #[inline]
            pub fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
                match self {
                    $( AnyRule::$variant(rule) => rule.check(ctx, index), )*
                }
            }
        }
    };
}

define_rules! {
    NewFunctions,
    NewClasses,
    NewInterfaces,
    NewIniDirectives,
    NewFunctionParameters,
    NewHashAlgorithms,
    NewKeywords,
    NewOperators,
    NewShortArray,
    NewMagicMethods,
    NewExecutionDirectives,
    RequiredToOptionalFunctionParameters,
    RemovedFunctions,
    RemovedFunctionParameters,
    OptionalToRequiredFunctionParameters,
    RemovedIniDirectives,
    RemovedHashAlgorithms,
    RemovedGlobalVariables,
    RemovedTypeCasts,
    RemovedNonCryptoHash,
    DeprecatedMagicAutoload,
    ForbiddenNames,
    ForbiddenNamesAsDeclared,
    ForbiddenNegativeBitshift,
    ForbiddenBreakContinueVariableArguments,
}

/// Built rules plus the kind → rules dispatch table
#[derive(Debug)]
pub struct Registry {
    rules: Vec<AnyRule>,
    dispatch: HashMap<TokenKind, Vec<usize>>,
}

impl Registry {
    /// Build every rule `selection` leaves enabled
    pub fn new(selection: &RuleSelection) -> Result<Self, TableError> {
        Ok(Self::from_rules(AnyRule::build_enabled(selection)?))
    }

    /// Build the full catalogue
    pub fn all() -> Result<Self, TableError> {
        Self::new(&RuleSelection::default())
    }

    pub fn from_rules(rules: Vec<AnyRule>) -> Self {
        let mut dispatch: HashMap<TokenKind, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for &kind in rule.targets() {
                dispatch.entry(kind).or_default().push(index);
            }
        }

        debug!(rules = rules.len(), kinds = dispatch.len(), "Built rule dispatch table");

        Self { rules, dispatch }
    }

    pub fn rules(&self) -> &[AnyRule] {
        &self.rules
    }

    /// Rules listening for `kind`, in registration order
    pub fn rules_for(&self, kind: TokenKind) -> impl Iterator<Item = &AnyRule> {
        self.dispatch
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|&index| &self.rules[index])
    }

    pub fn get(&self, name: &str) -> Option<&AnyRule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
