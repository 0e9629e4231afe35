// src/process/args.rs

//! Argument formatting for human-readable status output.

/// Join arguments into a single command-line string, quoting the ones that
/// would otherwise be split or mangled by a shell.
///
/// Quoting follows the MSVC command-line rules: embedded `"` are escaped with
/// a backslash, and backslashes are doubled only when they precede a quote
/// (including the closing one).
pub fn escape_and_concatenate<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| escape_single_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_single_arg(arg: &str) -> String {
    if !needs_quotes(arg) {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');

    let mut backslashes = 0usize;
    for ch in arg.chars() {
        match ch {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            other => {
                out.extend(std::iter::repeat_n('\\', backslashes));
                out.push(other);
                backslashes = 0;
            }
        }
    }

    // Trailing backslashes sit in front of the closing quote.
    out.extend(std::iter::repeat_n('\\', backslashes * 2));
    out.push('"');
    out
}

fn needs_quotes(arg: &str) -> bool {
    arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"')
}
