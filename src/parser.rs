use crate::ast::Command;
use nix::unistd::Pid;

/// Expand every adjacent `$$` pair into the shell's pid, rendered in
/// decimal. Builds a fresh string in a single left-to-right scan; a lone
/// `$` passes through untouched, and `$$$` expands the first pair only.
fn expand_pid(line: &str, shell_pid: Pid) -> String {
    let pid = shell_pid.as_raw().to_string();
    let mut result = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'$') {
            chars.next();
            result.push_str(&pid);
        } else {
            result.push(c);
        }
    }
    result
}

/// Turn one raw input line into a `Command`, or `None` for lines that need
/// no dispatch (blank lines, comment lines, lines with no arguments left
/// once the operators are stripped).
///
/// Grammar, such as it is:
/// - tokens are maximal runs of non-whitespace; no quoting
/// - a first token starting with `#` makes the whole line a comment
/// - a trailing `&` token requests background execution, ignored while the
///   shell is in foreground-only mode
/// - the argument list ends at the first `<` or `>`; the token after `<`
///   names stdin, the token after `>` names stdout. The first occurrence of
///   each operator wins; later repeats are ignored.
pub fn parse_line(line: &str, shell_pid: Pid, foreground_only: bool) -> Option<Command> {
    let expanded = expand_pid(line, shell_pid);
    let mut tokens: Vec<&str> = expanded.split_whitespace().collect();

    let first = tokens.first()?;
    if first.starts_with('#') {
        return None;
    }

    let mut background = false;
    if tokens.last() == Some(&"&") {
        background = true;
        tokens.pop();
    }
    if foreground_only {
        background = false;
    }

    let cutoff = tokens
        .iter()
        .position(|t| *t == "<" || *t == ">")
        .unwrap_or(tokens.len());
    let args: Vec<String> = tokens[..cutoff].iter().map(|t| t.to_string()).collect();
    if args.is_empty() {
        return None;
    }

    let mut input = None;
    let mut output = None;
    let mut i = cutoff;
    while i < tokens.len() {
        match tokens[i] {
            "<" if input.is_none() => {
                if let Some(path) = tokens.get(i + 1) {
                    input = Some(path.to_string());
                    i += 1;
                }
            }
            ">" if output.is_none() => {
                if let Some(path) = tokens.get(i + 1) {
                    output = Some(path.to_string());
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    Some(Command {
        args,
        input,
        output,
        background,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PID: Pid = Pid::from_raw(4242);

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("", PID, false), None);
        assert_eq!(parse_line("   \t  ", PID, false), None);
        assert_eq!(parse_line("# a comment", PID, false), None);
        assert_eq!(parse_line("#no-space-comment ls", PID, false), None);
    }

    #[test]
    fn test_simple_command() {
        let cmd = parse_line("ls -la", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["ls", "-la"]);
        assert_eq!(cmd.input, None);
        assert_eq!(cmd.output, None);
        assert!(!cmd.background);
    }

    #[test]
    fn test_pid_expansion() {
        let cmd = parse_line("echo $$", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["echo", "4242"]);

        let cmd = parse_line("echo a$$b$$c", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["echo", "a4242b4242c"]);
    }

    #[test]
    fn test_lone_dollar_untouched() {
        let cmd = parse_line("echo $ $HOME", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["echo", "$", "$HOME"]);

        // Only the adjacent pair expands; the odd one out stays literal.
        let cmd = parse_line("echo $$$", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["echo", "4242$"]);
    }

    #[test]
    fn test_output_redirection() {
        let cmd = parse_line("ls -la > out.txt", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["ls", "-la"]);
        assert_eq!(cmd.output.as_deref(), Some("out.txt"));
        assert_eq!(cmd.input, None);
        assert!(!cmd.background);
    }

    #[test]
    fn test_both_redirections() {
        let cmd = parse_line("wc -l < words.txt > count.txt", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["wc", "-l"]);
        assert_eq!(cmd.input.as_deref(), Some("words.txt"));
        assert_eq!(cmd.output.as_deref(), Some("count.txt"));
    }

    #[test]
    fn test_first_redirection_wins() {
        let cmd = parse_line("sort > first > second", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["sort"]);
        assert_eq!(cmd.output.as_deref(), Some("first"));
    }

    #[test]
    fn test_dangling_operator_ignored() {
        let cmd = parse_line("cat file >", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["cat", "file"]);
        assert_eq!(cmd.output, None);
    }

    #[test]
    fn test_background_flag() {
        let cmd = parse_line("sleep 5 &", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["sleep", "5"]);
        assert!(cmd.background);

        // An `&` anywhere but last is an ordinary argument.
        let cmd = parse_line("echo & hi", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["echo", "&", "hi"]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_foreground_only_coerces_background() {
        let cmd = parse_line("echo foo &", PID, false).unwrap();
        assert!(cmd.background);

        let cmd = parse_line("echo foo &", PID, true).unwrap();
        assert_eq!(cmd.args, vec!["echo", "foo"]);
        assert!(!cmd.background);
    }

    #[test]
    fn test_background_with_redirection() {
        let cmd = parse_line("sort < in.txt > out.txt &", PID, false).unwrap();
        assert_eq!(cmd.args, vec!["sort"]);
        assert_eq!(cmd.input.as_deref(), Some("in.txt"));
        assert_eq!(cmd.output.as_deref(), Some("out.txt"));
        assert!(cmd.background);
    }

    #[test]
    fn test_operators_alone_are_noops() {
        assert_eq!(parse_line("&", PID, false), None);
        assert_eq!(parse_line("> out.txt", PID, false), None);
    }
}
