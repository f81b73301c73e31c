//! Segmenter properties over the public API.

use docsect::{segment, SegmentOptions, Section, Segmenter, StyleHint, TextBlock};

/// Deterministic pseudo-random block sequences (xorshift).
fn sequences() -> Vec<Vec<TextBlock>> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..200)
        .map(|_| {
            let len = (next() % 12) as usize;
            (0..len)
                .map(|i| {
                    let r = next();
                    let hint = if r % 3 == 0 {
                        StyleHint::Heading
                    } else {
                        StyleHint::Body
                    };
                    let words = 1 + (r >> 8) % 4;
                    let text: Vec<String> = (0..words).map(|w| format!("w{}_{}", i, w)).collect();
                    TextBlock::new(text.join(" "), hint, i as u64)
                })
                .collect()
        })
        .collect()
}

fn tokens<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    texts.flat_map(str::split_whitespace).collect()
}

#[test]
fn test_coverage_no_loss_no_duplication() {
    for blocks in sequences() {
        let sections = segment(blocks.clone(), &SegmentOptions::default());

        let input = tokens(blocks.iter().map(|b| b.text.as_str()));
        let output = tokens(
            sections
                .iter()
                .flat_map(|s| [s.title.as_str(), s.content.as_str()]),
        );
        assert_eq!(input, output);
    }
}

#[test]
fn test_one_section_per_heading() {
    for blocks in sequences() {
        let headings = blocks.iter().filter(|b| b.is_heading()).count();
        let leading_body = blocks.first().is_some_and(|b| !b.is_heading());

        let sections = segment(blocks, &SegmentOptions::default());
        assert_eq!(sections.len(), headings + usize::from(leading_body));
        // only the first section can be untitled
        assert!(sections.iter().skip(1).all(|s| !s.title.is_empty()));
    }
}

#[test]
fn test_drop_empty_removes_only_empty() {
    for blocks in sequences() {
        let all = segment(blocks.clone(), &SegmentOptions::default());
        let kept = segment(blocks, &SegmentOptions::new().with_drop_empty(true));

        let expected: Vec<Section> = all.into_iter().filter(|s| !s.content.is_empty()).collect();
        assert_eq!(kept, expected);
    }
}

#[test]
fn test_incremental_matches_batch() {
    for blocks in sequences() {
        let mut segmenter = Segmenter::new();
        let mut sections = Vec::new();
        for block in blocks.clone() {
            sections.extend(segmenter.push(block));
        }
        sections.extend(segmenter.finish());

        assert_eq!(sections, segment(blocks, &SegmentOptions::default()));
    }
}
