//! Splitting of response lines into atoms.
//!
//! Server lines such as `wn "WordNet (r) 3.0 (2006)"` carry a mix of bare words and
//! double-quoted strings. [`split_atoms`] turns such a line into its fields.

/// Split a single response line into atoms.
///
/// Runs of non-whitespace are atoms on their own. A double-quoted run is a single
/// atom with the quotes removed and any inner whitespace kept verbatim. An
/// unterminated quote swallows the rest of the line.
///
/// ```rust
/// use dictum::protocol::split_atoms;
///
/// let atoms = split_atoms(r#"abc def "gh i" jkl"#);
/// assert_eq!(atoms, vec!["abc", "def", "gh i", "jkl"]);
/// ```
pub fn split_atoms(line: &str) -> Vec<String> {
    let mut atoms = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !current.is_empty() {
                    atoms.push(std::mem::take(&mut current));
                }
                let quoted: String = chars.by_ref().take_while(|&c| c != '"').collect();
                atoms.push(quoted);
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    atoms.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        atoms.push(current);
    }

    atoms
}
