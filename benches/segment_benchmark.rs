//! Benchmarks for docsect.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use docsect::parser::{classify, BodyStyle, HeadingThresholds, LineMetrics, PageMargins};
use docsect::{segment, DocumentFormat, SegmentOptions, TextBlock};

/// Blocks alternating one heading with `per_section` body paragraphs.
fn synthetic_blocks(count: usize, per_section: usize) -> Vec<TextBlock> {
    (0..count)
        .map(|i| {
            if i % (per_section + 1) == 0 {
                TextBlock::heading(format!("Section {}", i), i as u64)
            } else {
                TextBlock::body(
                    format!("Paragraph {} with a few words of ordinary body text.", i),
                    i as u64,
                )
            }
        })
        .collect()
}

/// Minimal PDF with one text line per page.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::from("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 4)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));
    content.push_str(
        "3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n",
    );

    let mut next_obj = 4;
    for i in 0..page_count {
        let (page_obj, content_obj) = (next_obj, next_obj + 1);
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));
        let text = format!(
            "BT /F1 18 Tf 72 720 Td (Heading {}) Tj ET BT /F1 11 Tf 72 690 Td (Body text of page {} for benchmarking.) Tj ET",
            i + 1,
            i + 1
        );
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    for count in [100usize, 1_000, 10_000] {
        let blocks = synthetic_blocks(count, 5);
        group.bench_with_input(BenchmarkId::from_parameter(count), &blocks, |b, blocks| {
            b.iter(|| segment(black_box(blocks.clone()), &SegmentOptions::default()));
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let body = BodyStyle {
        size: 11.0,
        bold: false,
        font: "Times-Roman".to_string(),
    };
    let page = PageMargins::new(72.0, 540.0);
    let thresholds = HeadingThresholds::default();
    let line = LineMetrics {
        font_size: 16.0,
        bold: true,
        font_name: "Times-Bold",
        char_count: 24,
        x0: 72.0,
        x1: 260.0,
        page: &page,
        body: &body,
    };

    c.bench_function("classify_line", |b| {
        b.iter(|| classify(black_box(&line), &thresholds));
    });
}

fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);

    c.bench_function("detect_pdf", |b| {
        b.iter(|| docsect::detect_format_from_bytes(black_box(&pdf_data)).is_ok());
    });
}

fn bench_pdf_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_parsing");

    for page_count in [1usize, 10, 50] {
        let data = create_test_pdf(page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            // Synthetic xref offsets are placeholders, so errors are ignored
            b.iter(|| docsect::parse_bytes(DocumentFormat::Pdf, black_box(&data)).ok());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_segment,
    bench_classify,
    bench_format_detection,
    bench_pdf_parsing,
);
criterion_main!(benches);
