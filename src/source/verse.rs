//! Random verse picker over a flat, line-oriented corpus.
//!
//! The corpus is plain UTF-8 text. A line starting with an ASCII digit opens
//! a new verse and following non-blank lines extend it. A chapter heading is
//! a single non-blank line framed by blank lines (`blank / heading / blank`);
//! each heading closes an entry pairing it with the current verse.
//!
//! Headings are not required to alternate with verses, so two headings in a
//! row yield two entries carrying the same verse text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ContentProvider;
use crate::error::ProviderError;

/// Marker glyph prepended to every relayed verse.
pub const VERSE_MARKER: &str = "📖 ";

/// A chapter heading paired with the verse text current when it was seen.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VerseEntry {
    pub heading: String,
    pub verse: String,
}

impl VerseEntry {
    /// Chat rendering: marker, heading, then the verse lines.
    pub fn render(&self) -> String {
        format!("{VERSE_MARKER}{}\n{}", self.heading, self.verse)
    }
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Scan corpus text into entries, in corpus order.
pub fn parse_verses(text: &str) -> Vec<VerseEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();
    let mut verse = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if starts_with_digit(line) {
            verse.clear();
            verse.push_str(line);
            verse.push('\n');
        } else if line.is_empty() {
            let heading = lines.get(i + 1).copied().unwrap_or_default();
            let closed = lines.get(i + 2).is_some_and(|l| l.is_empty());
            if !heading.is_empty() && closed {
                entries.push(VerseEntry {
                    heading: heading.to_string(),
                    verse: verse.clone(),
                });
                // A digit heading still starts the next verse.
                if starts_with_digit(heading) {
                    verse.clear();
                    verse.push_str(heading);
                    verse.push('\n');
                }
                // The heading is consumed; the closing blank is rescanned
                // so it can open the next boundary.
                i += 2;
                continue;
            }
        } else {
            verse.push_str(line);
            verse.push('\n');
        }

        i += 1;
    }

    entries
}

/// Read and parse a corpus file.
pub async fn load_verses(path: &Path) -> Result<Vec<VerseEntry>, ProviderError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parse_verses(&text))
}

/// Pick one entry uniformly at random.
///
/// The generator is seeded from OS entropy on every call.
pub fn pick_random(entries: &[VerseEntry]) -> Result<&VerseEntry, ProviderError> {
    if entries.is_empty() {
        return Err(ProviderError::EmptyCorpus);
    }
    let mut rng = StdRng::from_entropy();
    let index = rng.gen_range(0..entries.len());
    Ok(&entries[index])
}

/// Relays a random verse from a corpus file on disk.
///
/// The file is re-read on every call so edits show up without a restart.
pub struct VerseProvider {
    label: String,
    path: PathBuf,
}

impl VerseProvider {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl ContentProvider for VerseProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        let entries = load_verses(&self.path).await?;
        tracing::debug!(provider = %self.label, entries = entries.len(), "verse corpus loaded");
        Ok(pick_random(&entries)?.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "1:1\nIn the beginning...\n\nGenesis 1\n\n2:1\n...\n";

    #[test]
    fn single_boundary_yields_one_entry() {
        let entries = parse_verses(GENESIS);
        assert_eq!(
            entries,
            vec![VerseEntry {
                heading: "Genesis 1".into(),
                verse: "1:1\nIn the beginning...\n".into(),
            }]
        );
    }

    #[test]
    fn single_entry_is_always_picked() {
        let entries = parse_verses(GENESIS);
        for _ in 0..1000 {
            assert_eq!(pick_random(&entries).unwrap(), &entries[0]);
        }
    }

    #[test]
    fn picks_stay_in_range() {
        // Two-line verses so no verse line is itself framed by blanks.
        let corpus = "1:1 a\nmore\n\nOne\n\n2:1 b\nmore\n\nTwo\n\n3:1 c\nmore\n\nThree\n\n";
        let entries = parse_verses(corpus);
        assert_eq!(entries.len(), 3);

        let mut seen = [false; 3];
        for _ in 0..10_000 {
            let picked = pick_random(&entries).unwrap();
            let idx = entries.iter().position(|e| e == picked).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s), "every entry should be drawn");
    }

    #[test]
    fn single_line_verse_between_blanks_reads_as_heading() {
        let corpus = "1:1 a\n\nOne\n\n2:1 b\n\nTwo\n\n";
        let entries = parse_verses(corpus);
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.heading.as_str(), e.verse.as_str()))
            .collect();
        // The digit heading closes the old verse and starts the next one.
        assert_eq!(
            pairs,
            [("One", "1:1 a\n"), ("2:1 b", "1:1 a\n"), ("Two", "2:1 b\n")]
        );
    }

    #[test]
    fn digit_line_resets_the_verse() {
        let corpus = "1:1 first\ncontinued\n2:1 second\n\nChapter\n\n";
        let entries = parse_verses(corpus);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].verse, "2:1 second\n");
    }

    #[test]
    fn consecutive_headings_repeat_the_verse() {
        let corpus = "1:1 only\n\nFirst\n\nSecond\n\n";
        let entries = parse_verses(corpus);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].heading, "First");
        assert_eq!(entries[1].heading, "Second");
        assert_eq!(entries[0].verse, entries[1].verse);
    }

    #[test]
    fn heading_needs_closing_blank() {
        // Two non-blank lines after the blank: not a heading.
        let corpus = "1:1 a\n\nNot\na heading\n";
        assert!(parse_verses(corpus).is_empty());
        // Heading at end of file without a closing blank line.
        assert!(parse_verses("1:1 a\n\nDangling").is_empty());
    }

    #[test]
    fn empty_corpus_fails_selection() {
        let entries = parse_verses("");
        assert!(entries.is_empty());
        assert!(matches!(pick_random(&entries), Err(ProviderError::EmptyCorpus)));
    }

    #[test]
    fn render_prefixes_marker() {
        let entry = VerseEntry {
            heading: "Genesis 1".into(),
            verse: "1:1 text\n".into(),
        };
        assert_eq!(entry.render(), "📖 Genesis 1\n1:1 text\n");
    }

    #[tokio::test]
    async fn missing_corpus_is_io_error() {
        let provider = VerseProvider::new("verse", "/definitely/not/here.txt");
        let err = provider.produce().await.unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
    }

    #[tokio::test]
    async fn provider_reads_corpus_from_disk() {
        let path = std::env::temp_dir().join(format!("relaybot-verse-{}.txt", std::process::id()));
        tokio::fs::write(&path, GENESIS).await.unwrap();

        let provider = VerseProvider::new("verse", &path);
        let text = provider.produce().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(text, "📖 Genesis 1\n1:1\nIn the beginning...\n");
    }

    #[tokio::test]
    async fn provider_reports_empty_corpus() {
        let path = std::env::temp_dir().join(format!("relaybot-empty-{}.txt", std::process::id()));
        tokio::fs::write(&path, "no headings here\n").await.unwrap();

        let provider = VerseProvider::new("verse", &path);
        let err = provider.produce().await.unwrap_err();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(err, ProviderError::EmptyCorpus));
    }
}
