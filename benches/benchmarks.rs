use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use lazyboot::dom::{HtmlParser, Viewport};
use lazyboot::lazy::collect_candidates;
use lazyboot::{Capabilities, Environment, LazyConfig, Page};

/// A long article with media every few hundred pixels
fn article(images: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><style critical>body{}</style></head><body>");
    for i in 0..images {
        html.push_str(&format!(
            r#"<p>Paragraph {i} with enough text to wrap across a couple of lines.</p>
            <img data-src="img{i}.jpg" data-srcset="img{i}.jpg 1x, img{i}@2x.jpg 2x" height="240">
            <div data-bg="bg{i}.jpg"></div>"#
        ));
    }
    html.push_str("</body></html>");
    html
}

fn page(html: &str, capabilities: Capabilities) -> Page {
    let environment = Environment {
        capabilities,
        ..Environment::default()
    };
    Page::from_html(html, Viewport::new(390.0, 844.0), environment, LazyConfig::default())
        .expect("benchmark page parses")
}

/// Parsing and candidate collection
fn benchmark_document(c: &mut Criterion) {
    let html = article(200);
    let mut group = c.benchmark_group("document");

    group.bench_function("parse", |b| {
        b.iter(|| black_box(HtmlParser::new().parse(black_box(&html))))
    });

    let doc = HtmlParser::new().parse(&html).expect("benchmark page parses");
    group.bench_function("collect_candidates", |b| {
        b.iter(|| black_box(collect_candidates(black_box(&doc))))
    });

    group.finish();
}

/// Boot plus a full scroll through the article, per strategy
fn benchmark_scroll_through(c: &mut Criterion) {
    let html = article(200);
    let mut group = c.benchmark_group("scroll_through");

    for (name, capabilities) in [
        ("intersection", Capabilities::modern()),
        ("polling", Capabilities::legacy()),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || page(&html, capabilities),
                |mut page| {
                    page.boot();
                    page.settle();
                    while !page.engine().is_some_and(|e| e.is_complete()) {
                        page.scroll_by(600.0);
                        page.render_frame();
                    }
                    black_box(page)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_document, benchmark_scroll_through);
criterion_main!(benches);
