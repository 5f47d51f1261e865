//! Features that older PHP versions do not have

mod classes;
mod execution_directives;
mod function_parameters;
mod functions;
mod hash_algorithms;
mod ini_directives;
mod interfaces;
mod keywords;
mod magic_methods;
mod operators;
mod required_to_optional;
mod short_array;

pub use classes::NewClasses;
pub use execution_directives::NewExecutionDirectives;
pub use function_parameters::NewFunctionParameters;
pub use functions::NewFunctions;
pub use hash_algorithms::NewHashAlgorithms;
pub use ini_directives::NewIniDirectives;
pub use interfaces::NewInterfaces;
pub use keywords::NewKeywords;
pub use magic_methods::NewMagicMethods;
pub use operators::NewOperators;
pub use required_to_optional::RequiredToOptionalFunctionParameters;
pub use short_array::NewShortArray;
