//! Names and constructs that specific PHP versions reject outright

mod break_continue;
mod names;
mod names_as_declared;
mod negative_bitshift;

pub use break_continue::ForbiddenBreakContinueVariableArguments;
pub use names::ForbiddenNames;
pub use names_as_declared::ForbiddenNamesAsDeclared;
pub use negative_bitshift::ForbiddenNegativeBitshift;
