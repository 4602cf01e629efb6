use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};

use forgepoint::config::Rules;
use forgepoint::corpus::{SourceFile, lint_corpus};
use forgepoint::parser::parse_document;
use forgepoint::schema::SchemaRegistry;

fn generate_story(id: usize, sections: usize) -> String {
    let mut text = format!(
        "= Generated Story {id}\n:forgepoint-type: story\n:id: story-{id}\n\
         :schema-version: 1.0\n:status: draft\n\n\
         == Narrative\n\nAs a user I want generated content.\n\n\
         == Acceptance Criteria\n\n* [ ] behaves\n* [x] reviewed\n"
    );
    for s in 0..sections {
        text.push_str(&format!(
            "\n== Extra Section {s}\n\n\
             Paragraph referencing xref:story:story-{}[].\n\n\
             |===\n| Name | Value\n| metric-{s} | {s}\n|===\n",
            (id + s) % 64
        ));
    }
    text
}

fn generate_corpus(size: usize) -> Vec<SourceFile> {
    (0..size)
        .map(|i| SourceFile {
            path: PathBuf::from(format!("doc-{i:03}.adoc")),
            text: generate_story(i % 64, 4),
        })
        .collect()
}

fn bench_parse_document(c: &mut Criterion) {
    let small = generate_story(1, 2);
    let large = generate_story(1, 40);

    c.bench_function("parse_small_document", |b| {
        b.iter(|| parse_document(std::hint::black_box(&small), &PathBuf::from("bench.adoc")))
    });
    c.bench_function("parse_large_document", |b| {
        b.iter(|| parse_document(std::hint::black_box(&large), &PathBuf::from("bench.adoc")))
    });
}

fn bench_lint_corpus(c: &mut Criterion) {
    let registry = SchemaRegistry::embedded();
    let rules = Rules::default();

    let mut group = c.benchmark_group("lint_corpus");
    for size in [16, 64, 256] {
        let files = generate_corpus(size);
        group.bench_function(format!("{size}_documents"), |b| {
            b.iter(|| lint_corpus(std::hint::black_box(&files), &registry, &rules))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_document, bench_lint_corpus);
criterion_main!(benches);
