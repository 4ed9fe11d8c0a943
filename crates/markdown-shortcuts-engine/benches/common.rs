// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_keystrokes(lines: usize) -> String {
    let base = concat!(
        "# Heading line\n",
        "* bold words here\n",
        "** accent text\n",
        "*** underlined\n",
        "plain paragraph text\n",
    );
    base.repeat(lines)
}

#[allow(dead_code)]
pub fn generate_document_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {i} with a little bit of text"))
        .collect::<Vec<_>>()
        .join("\n")
}
