//! Tools module containing tool abstractions and built-in tools

pub mod fn_tool;
pub mod function_factory;
pub mod seedling;
pub mod tool;

pub use fn_tool::FnTool;
pub use function_factory::FunctionFactory;
pub use seedling::SeedlingFactTool;
pub use tool::{Tool, ToolRegistry};
