/// Split a package description into its synopsis line and its dedented body.
pub fn split_description(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((short, long)) => (short.to_string(), dedent(long)),
        None => (text.to_string(), String::new()),
    }
}

fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
