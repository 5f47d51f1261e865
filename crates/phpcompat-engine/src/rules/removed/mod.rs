//! Features deprecated or removed in newer PHP versions

mod function_parameters;
mod functions;
mod global_variables;
mod hash_algorithms;
mod ini_directives;
mod magic_autoload;
mod non_crypto_hash;
mod optional_to_required;
mod type_casts;

pub use function_parameters::RemovedFunctionParameters;
pub use functions::RemovedFunctions;
pub use global_variables::RemovedGlobalVariables;
pub use hash_algorithms::RemovedHashAlgorithms;
pub use ini_directives::RemovedIniDirectives;
pub use magic_autoload::DeprecatedMagicAutoload;
pub use non_crypto_hash::RemovedNonCryptoHash;
pub use optional_to_required::OptionalToRequiredFunctionParameters;
pub use type_casts::RemovedTypeCasts;
