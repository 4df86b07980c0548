//! Benchmarks for normalization, rendering and sanitizing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lessonmark::render::{self, RenderOptions};
use lessonmark::AuthoredDocument;

/// Build a synthetic lesson with the given number of sections.
fn create_test_lesson(section_count: usize) -> String {
    let mut content = String::from("Introduction à la leçon.\n\n");

    for i in 0..section_count {
        match i % 4 {
            0 => content.push_str(&format!("\\section{{Définition {}}}\n", i)),
            1 => content.push_str(&format!("\\section{{Théorème {}}}\n", i)),
            2 => content.push_str(&format!("\\subsection{{Exemple {}}}\n", i)),
            _ => content.push_str(&format!("\\section{{Exercice {}}}\n", i)),
        }
        content.push_str(
            "Soit \\(f(x) = x^2 + 1\\) une fonction. On a \\textbf{toujours} $f(x) > 0$.\\\\\n",
        );
        content.push_str("\\[\\int_0^1 f(x)\\,dx = \\frac{4}{3}\\]\n");
        content.push_str("\\begin{itemize}\\item premier point\\item second point\\end{itemize}\n");
        content.push_str(&format!("\\image{{figure{}.png}}{{width=0.5\\textwidth}}\n\n", i));
    }

    content
}

/// Benchmark the delimiter and macro normalizers.
fn bench_normalize(c: &mut Criterion) {
    let text = create_test_lesson(20);

    c.bench_function("normalize_text", |b| {
        b.iter(|| lessonmark::normalize::normalize_text(black_box(&text)));
    });
}

/// Benchmark rendering at various sizes.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let options = RenderOptions::default();

    for section_count in [1, 10, 50].iter() {
        let doc = AuthoredDocument::text(create_test_lesson(*section_count));

        group.bench_function(format!("{}_sections", section_count), |b| {
            b.iter(|| render::to_html(black_box(&doc), &options));
        });
    }

    group.finish();
}

/// Benchmark sanitizing generated content.
fn bench_sanitize(c: &mut Criterion) {
    let text = create_test_lesson(20).replace("\\frac", "\x0Crac") + "{ $x";

    c.bench_function("sanitize", |b| {
        b.iter(|| lessonmark::sanitize(black_box(&text)));
    });
}

/// Benchmark parallel batch rendering.
fn bench_batch(c: &mut Criterion) {
    let docs: Vec<AuthoredDocument> = (0..32)
        .map(|_| AuthoredDocument::text(create_test_lesson(5)))
        .collect();
    let options = RenderOptions::default();

    c.bench_function("render_batch_32", |b| {
        b.iter(|| render::render_batch(black_box(&docs), &options));
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_render,
    bench_sanitize,
    bench_batch,
);
criterion_main!(benches);
