//! Rich-document (.docx) extraction and structural merge.
//!
//! The merge walks the original paragraph sequence and rewrites only the
//! text content of `Text` runs, so run properties, paragraph properties,
//! styles, and section nodes survive untouched. The document is never
//! regenerated from plain text.

use std::collections::HashMap;
use std::io::Cursor;

use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, RunContent};
use docx_rust::{Docx, DocxFile};
use tracing::debug;

use crate::errors::AppError;

pub mod updates;

use updates::{parse_position_updates, position_key, PositionUpdate};

const MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Verbs that mark a resume achievement line when no bullet glyph is present.
const ACTION_VERBS: &[&str] = &[
    "increased",
    "decreased",
    "improved",
    "achieved",
    "launched",
    "created",
    "developed",
    "implemented",
    "managed",
    "led",
    "built",
    "rebuilt",
];

/// Extracts the plain text of a document: non-empty paragraph texts joined
/// by newlines.
pub fn extract_text(bytes: &[u8]) -> Result<String, AppError> {
    let file = parse_file(bytes)?;
    let docx = parse_docx(&file)?;

    let mut lines = Vec::new();
    for content in &docx.document.body.content {
        if let BodyContent::Paragraph(paragraph) = content {
            let text = paragraph_text(paragraph);
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }
    Ok(lines.join("\n"))
}

/// Merges suggestion text into the original document and returns the new
/// binary. The input buffer is left untouched.
///
/// Replace-or-append policy: bullets from a matched `POSITION_UPDATES` group
/// replace that position's existing achievement paragraphs in order; bullets
/// left over once the position's paragraphs run out are appended as new
/// paragraphs right after the last touched one. Suggestions without a
/// `POSITION_UPDATES` block are appended to the end of the document so
/// content is never dropped.
pub fn merge_suggestions(original: &[u8], suggestions: &str) -> Result<Vec<u8>, AppError> {
    let file = parse_file(original)?;
    let mut docx = parse_docx(&file)?;

    let updates = parse_position_updates(suggestions);
    if updates.is_empty() {
        debug!("No POSITION_UPDATES block; appending suggestions verbatim");
        for line in suggestions.lines().map(str::trim).filter(|l| !l.is_empty()) {
            docx.document
                .push(Paragraph::default().push_text(line.to_string()));
        }
    } else {
        let plan = plan_updates(&docx, &updates);
        debug!(
            "Applying {} replacements and {} appended paragraphs",
            plan.replacements.len(),
            plan.insertions.len()
        );
        apply_plan(&mut docx, plan);
    }

    let cursor = docx
        .write(Cursor::new(Vec::new()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write document: {e:?}")))?;
    Ok(cursor.into_inner())
}

fn parse_file(bytes: &[u8]) -> Result<DocxFile, AppError> {
    DocxFile::from_reader(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::UnsupportedFormat(format!("Could not read document: {e:?}")))
}

fn parse_docx<'a>(file: &'a DocxFile) -> Result<Docx<'a>, AppError> {
    file.parse()
        .map_err(|e| AppError::UnsupportedFormat(format!("Could not parse document: {e:?}")))
}

/// Concatenated text of a paragraph's runs, trimmed.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for content in &paragraph.content {
        if let ParagraphContent::Run(run) = content {
            for piece in &run.content {
                if let RunContent::Text(text) = piece {
                    out.push_str(&text.text);
                }
            }
        }
    }
    out.trim().to_string()
}

/// A paragraph that introduces a position: "Title | Company | January 2020".
fn is_position_heading(text: &str) -> bool {
    text.contains('|') && MONTHS.iter().any(|m| text.contains(m))
}

/// A paragraph that carries an achievement line for the current position.
fn is_achievement_line(text: &str) -> bool {
    if text.starts_with('•') || text.starts_with('-') {
        return true;
    }
    let lowered = text.to_lowercase();
    ACTION_VERBS
        .iter()
        .any(|verb| lowered.split_whitespace().next() == Some(*verb))
}

struct MergePlan {
    /// body index → replacement text
    replacements: Vec<(usize, String)>,
    /// insert after body index → new paragraph texts, in order
    insertions: Vec<(usize, Vec<String>)>,
}

/// Read-only pass over the paragraph sequence deciding which paragraphs get
/// rewritten and where leftover bullets are appended.
fn plan_updates(docx: &Docx, updates: &[PositionUpdate]) -> MergePlan {
    let paragraphs: Vec<(usize, String)> = docx
        .document
        .body
        .content
        .iter()
        .enumerate()
        .filter_map(|(idx, content)| match content {
            BodyContent::Paragraph(p) => Some((idx, paragraph_text(p))),
            _ => None,
        })
        .collect();

    let mut processed = vec![false; updates.len()];
    let mut current: Option<usize> = None;
    let mut bullet_idx = 0;
    let mut last_touched: Option<usize> = None;
    let mut used_bullet_glyph = false;

    let mut replacements = Vec::new();
    let mut insertions = Vec::new();

    let flush_leftovers = |current: Option<usize>,
                               bullet_idx: usize,
                               last_touched: Option<usize>,
                               used_glyph: bool,
                               insertions: &mut Vec<(usize, Vec<String>)>| {
        if let (Some(u), Some(after)) = (current, last_touched) {
            let leftover = &updates[u].bullets[bullet_idx.min(updates[u].bullets.len())..];
            if !leftover.is_empty() {
                let lines = leftover
                    .iter()
                    .map(|b| {
                        if used_glyph {
                            format!("• {b}")
                        } else {
                            b.clone()
                        }
                    })
                    .collect();
                insertions.push((after, lines));
            }
        }
    };

    for (body_idx, text) in &paragraphs {
        if text.is_empty() {
            continue;
        }

        if is_position_heading(text) {
            flush_leftovers(current, bullet_idx, last_touched, used_bullet_glyph, &mut insertions);
            current = None;
            bullet_idx = 0;
            used_bullet_glyph = false;

            let key = position_key(text);
            if let Some(u) = (0..updates.len()).find(|&i| !processed[i] && updates[i].matches(&key))
            {
                processed[u] = true;
                current = Some(u);
                last_touched = Some(*body_idx);
            }
            continue;
        }

        if let Some(u) = current {
            if bullet_idx < updates[u].bullets.len() && is_achievement_line(text) {
                let bullet = &updates[u].bullets[bullet_idx];
                let replacement = if text.starts_with('•') {
                    used_bullet_glyph = true;
                    format!("• {bullet}")
                } else {
                    bullet.clone()
                };
                replacements.push((*body_idx, replacement));
                last_touched = Some(*body_idx);
                bullet_idx += 1;
            }
        }
    }
    flush_leftovers(current, bullet_idx, last_touched, used_bullet_glyph, &mut insertions);

    MergePlan {
        replacements,
        insertions,
    }
}

fn apply_plan(docx: &mut Docx, plan: MergePlan) {
    let replacements: HashMap<usize, String> = plan.replacements.into_iter().collect();

    for (idx, content) in docx.document.body.content.iter_mut().enumerate() {
        if let BodyContent::Paragraph(paragraph) = content {
            if let Some(text) = replacements.get(&idx) {
                replace_paragraph_text(paragraph, text);
            }
        }
    }

    // Insert back-to-front so earlier body indices stay valid.
    let mut insertions = plan.insertions;
    insertions.sort_by(|a, b| b.0.cmp(&a.0));
    for (after_idx, lines) in insertions {
        for line in lines.into_iter().rev() {
            docx.document.body.content.insert(
                after_idx + 1,
                BodyContent::Paragraph(Paragraph::default().push_text(line)),
            );
        }
    }
}

/// Rewrites a paragraph's text in place: the first `Text` run receives the
/// new content, remaining `Text` runs are emptied. Run properties stay as
/// they are, so fonts, sizes, and colors carry over.
fn replace_paragraph_text(paragraph: &mut Paragraph, new_text: &str) {
    let mut replaced = false;
    for content in paragraph.content.iter_mut() {
        if let ParagraphContent::Run(run) = content {
            for piece in run.content.iter_mut() {
                if let RunContent::Text(text) = piece {
                    if replaced {
                        text.text = std::borrow::Cow::Owned(String::new());
                    } else {
                        text.text = std::borrow::Cow::Owned(new_text.to_string());
                        replaced = true;
                    }
                }
            }
        }
    }
}
