//! Section segmentation.
//!
//! Groups a flat [`TextBlock`] stream into [`Section`]s with a two-state
//! machine:
//!
//! - **No section open**: body text accumulates into a preamble buffer. A
//!   heading flushes a non-empty preamble as an untitled section and opens a
//!   section titled with the heading text.
//! - **Section open**: body text is appended to the open section; a heading
//!   emits it and opens the next one.
//!
//! At end of input the open section (or a non-empty preamble) is emitted.
//! Sections are never reordered or merged.

use crate::model::section::push_joined;
use crate::model::{Section, TextBlock};

/// Options controlling segmentation output.
#[derive(Debug, Clone, Default)]
pub struct SegmentOptions {
    /// Drop sections whose content ends up empty
    pub drop_empty: bool,
}

impl SegmentOptions {
    /// Create new segment options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop sections without content (e.g. a heading directly followed by another).
    pub fn with_drop_empty(mut self, drop: bool) -> Self {
        self.drop_empty = drop;
        self
    }
}

#[derive(Debug)]
enum State {
    NoSection { preamble: String },
    InSection { open: Section },
}

impl Default for State {
    fn default() -> Self {
        State::NoSection {
            preamble: String::new(),
        }
    }
}

/// Incremental section segmenter.
///
/// Feed blocks with [`push`](Segmenter::push) and call
/// [`finish`](Segmenter::finish) once the input is exhausted.
#[derive(Debug, Default)]
pub struct Segmenter {
    state: State,
    last_order: Option<u64>,
}

impl Segmenter {
    /// Create a segmenter in its initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one block, returning a section if the block closed one.
    pub fn push(&mut self, block: TextBlock) -> Option<Section> {
        debug_assert!(
            self.last_order.map_or(true, |last| block.order > last),
            "text blocks must arrive in document order"
        );
        self.last_order = Some(block.order);

        let title = block.is_heading().then(|| block.text.trim().to_string());
        match (&mut self.state, title) {
            (State::NoSection { preamble }, None) => {
                push_joined(preamble, &block.text);
                None
            }
            (State::InSection { open }, None) => {
                open.append_content(&block.text);
                None
            }
            (state, Some(title)) => {
                let previous = std::mem::replace(
                    state,
                    State::InSection {
                        open: Section::titled(title),
                    },
                );
                match previous {
                    State::NoSection { preamble } if preamble.is_empty() => None,
                    State::NoSection { preamble } => Some(Section::new(String::new(), preamble)),
                    State::InSection { open } => Some(open),
                }
            }
        }
    }

    /// Signal end of input and return the last pending section, if any.
    pub fn finish(self) -> Option<Section> {
        match self.state {
            State::NoSection { preamble } if preamble.is_empty() => None,
            State::NoSection { preamble } => Some(Section::new(String::new(), preamble)),
            State::InSection { open } => Some(open),
        }
    }
}

/// Segment a block sequence into sections.
pub fn segment<I>(blocks: I, options: &SegmentOptions) -> Vec<Section>
where
    I: IntoIterator<Item = TextBlock>,
{
    let mut segmenter = Segmenter::new();
    let mut sections: Vec<Section> = blocks
        .into_iter()
        .filter_map(|block| segmenter.push(block))
        .collect();
    sections.extend(segmenter.finish());

    if options.drop_empty {
        let before = sections.len();
        sections.retain(|s| !s.is_empty());
        if sections.len() != before {
            log::debug!("Dropped {} empty sections", before - sections.len());
        }
    }

    sections
}
