/// A fully parsed command line, ready for dispatch.
///
/// `args` is never empty by the time dispatch happens: blank lines and
/// comment lines never produce a `Command` in the first place.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Program name followed by its arguments, in order.
    pub args: Vec<String>,
    /// Redirection target for stdin (`< file`), if requested.
    pub input: Option<String>,
    /// Redirection target for stdout (`> file`), if requested.
    pub output: Option<String>,
    /// Whether the command runs asynchronously (`&`). Already coerced to
    /// false if the shell was in foreground-only mode at parse time.
    pub background: bool,
}

impl Command {
    pub fn program(&self) -> &str {
        &self.args[0]
    }
}
