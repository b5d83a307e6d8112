pub const GHOST_OPEN: &str = "<!--";
pub const GHOST_CLOSE: &str = "-->";

/// A note split into the prose the writer typed and the ghost prompts embedded above it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredContent {
    pub prose: String,
    pub ghosts: Vec<String>,
}

impl FilteredContent {
    pub fn word_count(&self) -> u64 {
        count_words(&self.prose)
    }
}

/// Returns the ghost text of a line, if the whole line is a single-line comment.
///
/// Comments that are opened on one line and closed on another are prose.
fn ghost_text(line: &str) -> Option<&str> {
    // Stripping the markers one after another keeps `<!-->` from counting as a comment.
    let inner = line
        .trim()
        .strip_prefix(GHOST_OPEN)?
        .strip_suffix(GHOST_CLOSE)?;
    Some(inner.trim())
}

/// Separates ghost lines from prose. Lines that only contain a comment are removed, and their
/// non-empty text is collected in order of appearance.
pub fn filter_content(raw: &str) -> FilteredContent {
    let mut prose = Vec::new();
    let mut ghosts = Vec::new();

    for line in raw.split('\n') {
        match ghost_text(line) {
            Some(text) => {
                if !text.is_empty() {
                    ghosts.push(text.to_string());
                }
            }
            None => prose.push(line),
        }
    }

    FilteredContent {
        prose: prose.join("\n"),
        ghosts,
    }
}

/// Number of whitespace separated tokens.
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Word count of a raw note with ghost text excluded.
pub fn note_word_count(raw: &str) -> u64 {
    filter_content(raw).word_count()
}
