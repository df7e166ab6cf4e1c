//! artifact::fragment
//!
//! Splicing generated text between `<name>: BEGIN` and `<name>: END` lines.

/// Replace the lines strictly between a fragment's markers with `body`.
///
/// The marker lines, the block comments wrapping them, and everything
/// outside are kept byte-for-byte. Returns `None` when either marker is
/// missing or `END` does not follow `BEGIN`.
///
/// # Example
///
/// ```
/// use apiconf::artifact::fragment::replace_fragment;
///
/// let header = "/*\n * keys: BEGIN\n */\nold\n/*\n * keys: END\n */\n";
/// let spliced = replace_fragment(header, "keys", "new\n").unwrap();
/// assert_eq!(spliced, "/*\n * keys: BEGIN\n */\nnew\n/*\n * keys: END\n */\n");
/// ```
pub fn replace_fragment(text: &str, fragment: &str, body: &str) -> Option<String> {
    let begin_marker = format!("{fragment}: BEGIN");
    let end_marker = format!("{fragment}: END");
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let begin = lines.iter().position(|line| line.contains(&begin_marker))?;
    let end_marker_line = lines[begin + 1..]
        .iter()
        .position(|line| line.contains(&end_marker))
        .map(|offset| begin + 1 + offset)?;
    let begin_close = (begin..end_marker_line)
        .find(|&index| lines[index].contains("*/"))
        .unwrap_or(begin);
    let end = opening_comment(&lines, begin_close + 1, end_marker_line);

    let mut out = String::with_capacity(text.len() + body.len());
    for line in &lines[..=begin_close] {
        out.push_str(line);
    }
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    for line in &lines[end..] {
        out.push_str(line);
    }
    Some(out)
}

/// The line that opens the comment holding the `END` marker, searched
/// back from `end` but never before `floor`.
fn opening_comment(lines: &[&str], floor: usize, end: usize) -> usize {
    if lines[end].contains("/*") {
        return end;
    }
    (floor..end)
        .rev()
        .find(|&index| lines[index].contains("/*"))
        .filter(|&index| !lines[index..end].iter().any(|line| line.contains("*/")))
        .unwrap_or(end)
}
