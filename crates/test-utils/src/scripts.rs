use procstream::command::CommandSpec;

/// `sh -c <script>`.
pub fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").arg("-c").arg(script)
}

/// A script printing each line to stdout, in order.
pub fn print_stdout_lines<S: AsRef<str>>(lines: &[S]) -> CommandSpec {
    sh(&printf_lines(lines, ""))
}

/// A script printing each line to stderr, in order.
pub fn print_stderr_lines<S: AsRef<str>>(lines: &[S]) -> CommandSpec {
    sh(&printf_lines(lines, " >&2"))
}

/// A script printing `count` numbered lines (`line1`, `line2`, ...) with a
/// pause of `pause_secs` between them.
pub fn slow_counter(count: usize, pause_secs: f32) -> CommandSpec {
    sh(&format!(
        "i=1; while [ $i -le {count} ]; do echo line$i; i=$((i+1)); sleep {pause_secs}; done"
    ))
}

fn printf_lines<S: AsRef<str>>(lines: &[S], redirect: &str) -> String {
    lines
        .iter()
        .map(|l| format!("printf '%s\\n' {}{redirect}", quote(l.as_ref())))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Single-quote `s` for `sh`.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
