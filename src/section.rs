//! Locating the argument section among a document's text blocks.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::errors::{BriefError, BriefResult};
use crate::layout::TextBlock;

/// The blocks of one section, in reading order, without its headings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// The heading line that opened the section, as written.
    pub heading: String,
    pub blocks: Vec<TextBlock>,
    pub start_page: u32,
    pub end_page: u32,
}

/// Position of a heading line: block index and line index.
type LinePosition = (usize, usize);

/// Find the section opened by one of the configured start headings.
///
/// Start headings are tried in order as whole lines (case-insensitive),
/// then the start prefix as the first word of a line. The section ends
/// before the first later line matching an end heading, or runs to the end
/// of the document.
pub fn locate_section(blocks: &[TextBlock], config: &PipelineConfig) -> BriefResult<Section> {
    let bounds = SectionBounds {
        starts: &config.start_headings,
        prefix: Some(config.start_prefix.as_str()),
        ends: &config.end_headings,
    };
    bounds.locate(blocks).ok_or_else(|| {
        let mut headings = config.start_headings.clone();
        headings.push(format!("{}...", config.start_prefix));
        BriefError::SectionNotFound { headings }
    })
}

/// Find the table of authorities, if the document has one.
///
/// Only whole-line headings open it. It ends at the first authority
/// subsection other than cases (statutes, rules) or at the next brief
/// section.
pub fn locate_authorities(blocks: &[TextBlock], config: &PipelineConfig) -> Option<Section> {
    SectionBounds {
        starts: &config.authorities_headings,
        prefix: None,
        ends: &config.authorities_end_headings,
    }
    .locate(blocks)
}

struct SectionBounds<'a> {
    starts: &'a [String],
    prefix: Option<&'a str>,
    ends: &'a [String],
}

impl SectionBounds<'_> {
    fn locate(&self, blocks: &[TextBlock]) -> Option<Section> {
        let mut ordered: Vec<&TextBlock> = blocks.iter().collect();
        ordered.sort_by(|a, b| {
            a.page
                .cmp(&b.page)
                .then(a.top_y.total_cmp(&b.top_y))
                .then(a.left_x.total_cmp(&b.left_x))
        });

        let (start_block, start_line) = self
            .starts
            .iter()
            .find_map(|heading| find_line(&ordered, (0, 0), |line| line.eq_ignore_ascii_case(heading)))
            .or_else(|| {
                let prefix = self.prefix?;
                find_line(&ordered, (0, 0), |line| starts_with_word(line, prefix))
            })?;

        let heading = ordered[start_block]
            .content
            .lines()
            .nth(start_line)
            .unwrap_or_default()
            .trim()
            .to_string();

        let end = find_line(&ordered, (start_block, start_line + 1), |line| {
            self.ends.iter().any(|end| line.eq_ignore_ascii_case(end))
        });

        let mut section_blocks = Vec::new();
        let last_block = end.map_or(ordered.len().saturating_sub(1), |(b, _)| b);
        for (b, block) in ordered.iter().enumerate().take(last_block + 1).skip(start_block) {
            let first_line = if b == start_block { start_line + 1 } else { 0 };
            let lines: Vec<&str> = block.content.lines().collect();
            let end_line = match end {
                Some((end_block, end_line)) if end_block == b => end_line,
                _ => lines.len(),
            };
            if first_line >= end_line {
                continue;
            }

            let content = lines[first_line..end_line].join("\n");
            if content.trim().is_empty() {
                continue;
            }
            section_blocks.push(TextBlock {
                content,
                ..(*block).clone()
            });
        }

        let heading_page = ordered[start_block].page;
        let start_page = section_blocks.first().map_or(heading_page, |b| b.page);
        let end_page = section_blocks.last().map_or(heading_page, |b| b.page);
        log::debug!(
            "section {:?}: {} blocks, pages {}-{}",
            heading,
            section_blocks.len(),
            start_page,
            end_page
        );

        Some(Section {
            heading,
            blocks: section_blocks,
            start_page,
            end_page,
        })
    }
}

/// First line at or after `from` that satisfies `matches` once trimmed.
fn find_line(
    blocks: &[&TextBlock],
    from: LinePosition,
    matches: impl Fn(&str) -> bool,
) -> Option<LinePosition> {
    blocks.iter().enumerate().skip(from.0).find_map(|(b, block)| {
        let skip = if b == from.0 { from.1 } else { 0 };
        block
            .content
            .lines()
            .enumerate()
            .skip(skip)
            .find(|(_, line)| matches(line.trim()))
            .map(|(l, _)| (b, l))
    })
}

fn starts_with_word(line: &str, word: &str) -> bool {
    if word.is_empty() || line.len() < word.len() || !line.is_char_boundary(word.len()) {
        return false;
    }
    line[..word.len()].eq_ignore_ascii_case(word)
        && line[word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
}
