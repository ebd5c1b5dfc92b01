use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowmap::config::LayoutConfig;
use flowmap::ir::Orientation;
use flowmap::layout::compute_layout;
use flowmap::parser::{InputFormat, parse};
use flowmap::render::render_svg;
use flowmap::theme::Theme;
use std::hint::black_box;

fn outline_source(steps: usize) -> String {
    let mut out = String::new();
    for i in 0..steps {
        out.push_str(&format!("{}. Step {} of the import job\n", i + 1, i));
    }
    out
}

fn chain_source(nodes: usize) -> String {
    let mut out = String::from("flowchart LR\n");
    for i in 0..nodes {
        out.push_str(&format!("  N{}[Node {}]\n", i, i));
    }
    for i in 0..nodes.saturating_sub(1) {
        out.push_str(&format!("  N{} --> N{}\n", i, i + 1));
    }
    out
}

/// Balanced tree of decisions with `fanout` children each.
fn branchy_source(nodes: usize, fanout: usize) -> String {
    let mut out = String::from("flowchart TD\n");
    for i in 0..nodes {
        out.push_str(&format!("  N{}{{Check {}?}}\n", i, i));
    }
    for child in 1..nodes {
        let parent = (child - 1) / fanout.max(1);
        let label = if child % 2 == 0 { "Yes" } else { "No" };
        out.push_str(&format!("  N{} -->|{}| N{}\n", parent, label, child));
    }
    out
}

fn sources() -> Vec<(String, String, InputFormat)> {
    let mut out = Vec::new();
    for steps in [8usize, 24] {
        out.push((
            format!("outline_{steps}"),
            outline_source(steps),
            InputFormat::Outline,
        ));
    }
    for nodes in [12usize, 40] {
        out.push((format!("chain_{nodes}"), chain_source(nodes), InputFormat::Arrows));
    }
    for (nodes, fanout) in [(20usize, 2usize), (40, 3), (60, 5)] {
        out.push((
            format!("branchy_{nodes}_{fanout}"),
            branchy_source(nodes, fanout),
            InputFormat::Arrows,
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input, format) in sources() {
        group.bench_with_input(BenchmarkId::from_parameter(&name), &input, |b, data| {
            b.iter(|| {
                let parsed = parse(black_box(data), format).expect("parse failed");
                black_box(parsed.graph.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    for (name, input, format) in sources() {
        let parsed = parse(&input, format).expect("parse failed");
        for orientation in [Orientation::LeftRight, Orientation::TopBottom] {
            group.bench_with_input(
                BenchmarkId::new(orientation.suffix(), &name),
                &parsed.graph,
                |b, graph| {
                    b.iter(|| {
                        let layout = compute_layout(black_box(graph), orientation, &theme, &config)
                            .expect("layout failed");
                        black_box(layout.nodes.len());
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    for (name, input, format) in sources() {
        let parsed = parse(&input, format).expect("parse failed");
        let orientation = parsed.orientation.unwrap_or_default();
        let layout =
            compute_layout(&parsed.graph, orientation, &theme, &config).expect("layout failed");
        group.bench_with_input(BenchmarkId::from_parameter(&name), &layout, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_render);
criterion_main!(benches);
