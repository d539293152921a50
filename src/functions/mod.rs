//! Callable functions offered to participants during their turn.

pub mod arguments;
pub mod function;
pub mod registry;
pub mod types;
pub mod validation;

pub use arguments::FunctionArguments;
pub use function::{Function, FunctionContext, FunctionDefinition};
pub use registry::FunctionRegistry;
pub use types::FunctionParameters;
