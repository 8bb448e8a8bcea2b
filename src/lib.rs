pub mod ast;
pub mod builtins;
pub mod executor;
pub mod parser;
pub mod signals;
pub mod state;

// Re-export commonly used items
pub use ast::Command;
pub use executor::execute;
pub use parser::parse_line;
pub use state::ShellState;
