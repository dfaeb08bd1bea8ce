use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use riact_core::{longest_increasing_subsequence, App, Element, MemoryHost};

const LIST_SIZES: &[usize] = &[16, 64, 256, 1024];

fn keyed_list(keys: &[usize]) -> Element {
    Element::new("ul").children(
        keys.iter()
            .map(|key| Element::new("li").key(*key).child(key.to_string())),
    )
}

fn mount(keys: &[usize]) -> App<MemoryHost> {
    let mut host = MemoryHost::new();
    let container = host.create_root("body");
    App::mount(host, container, keyed_list(keys)).expect("mount")
}

/// Keys `0..len` with every fourth pair swapped and the last item moved to the front.
fn shuffled(len: usize) -> Vec<usize> {
    let mut keys: Vec<usize> = (0..len).collect();
    for index in (0..len.saturating_sub(1)).step_by(4) {
        keys.swap(index, index + 1);
    }
    keys.rotate_right(1);
    keys
}

fn bench_keyed_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_reorder");
    for &len in LIST_SIZES {
        let ordered: Vec<usize> = (0..len).collect();
        let forward = keyed_list(&shuffled(len));
        let back = keyed_list(&ordered);
        group.bench_with_input(BenchmarkId::new("items", len), &len, |b, _| {
            let mut app = mount(&ordered);
            b.iter(|| {
                app.render(forward.clone()).expect("render");
                app.render(back.clone()).expect("render");
            });
        });
    }
    group.finish();
}

fn bench_diff_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_diff");
    for &len in LIST_SIZES {
        let ordered: Vec<usize> = (0..len).collect();
        let app = mount(&ordered);
        let next = keyed_list(&shuffled(len));
        group.bench_with_input(BenchmarkId::new("items", len), &len, |b, _| {
            b.iter(|| black_box(app.diff(&next).expect("diff")));
        });
    }
    group.finish();
}

fn bench_lis(c: &mut Criterion) {
    let sequence: Vec<isize> = shuffled(4096).into_iter().map(|key| key as isize).collect();
    c.bench_function("lis_4096", |b| {
        b.iter(|| black_box(longest_increasing_subsequence(black_box(&sequence))));
    });
}

criterion_group!(reconcile, bench_keyed_reorder, bench_diff_only, bench_lis);
criterion_main!(reconcile);
