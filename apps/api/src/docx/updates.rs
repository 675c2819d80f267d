//! Parser for the POSITION_UPDATES block emitted by the completion service.
//!
//! Expected shape:
//!
//! ```text
//! ANALYSIS:
//! ...free text, ignored...
//!
//! POSITION_UPDATES:
//! Senior Backend Engineer
//! Acme Corp | January 2020 - Present
//! - Optimized bullet one
//! - Optimized bullet two
//! Staff Engineer
//! Globex | March 2017 - December 2019
//! - Another bullet
//! ```
//!
//! A group may carry several heading lines (position title, then company and
//! dates); all of them are kept so a document paragraph can match on either.

const UPDATES_MARKER: &str = "POSITION_UPDATES:";

/// One position's replacement bullets, keyed by its heading lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub headings: Vec<String>,
    pub bullets: Vec<String>,
}

impl PositionUpdate {
    /// True when any heading line keys to the given paragraph key.
    pub fn matches(&self, paragraph_key: &str) -> bool {
        self.headings
            .iter()
            .any(|h| position_key(h) == paragraph_key)
    }
}

/// Extracts position updates from suggestion text. Returns an empty list
/// when no `POSITION_UPDATES:` marker is present (free-form suggestions).
pub fn parse_position_updates(suggestions: &str) -> Vec<PositionUpdate> {
    let mut updates: Vec<PositionUpdate> = Vec::new();
    let mut in_updates = false;

    for line in suggestions.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == UPDATES_MARKER {
            in_updates = true;
            continue;
        }
        if !in_updates {
            continue;
        }

        if let Some(bullet) = line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
            let bullet = bullet.trim();
            if let Some(current) = updates.last_mut() {
                if !bullet.is_empty() {
                    current.bullets.push(bullet.to_string());
                }
            }
        } else {
            match updates.last_mut() {
                // Heading lines stack until the group's first bullet arrives.
                Some(current) if current.bullets.is_empty() => {
                    current.headings.push(line.to_string());
                }
                _ => updates.push(PositionUpdate {
                    headings: vec![line.to_string()],
                    bullets: Vec::new(),
                }),
            }
        }
    }

    updates.retain(|u| !u.bullets.is_empty());
    updates
}

/// Normalizes a heading for matching: the text before the first `|`,
/// lowercased.
pub fn position_key(heading: &str) -> String {
    heading
        .split('|')
        .next()
        .unwrap_or(heading)
        .trim()
        .to_lowercase()
}
