use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mailrc_core::{ConfigDef, ConfigSet, SubsetId, TypeTag};

fn config() -> ConfigSet {
    let mut cs = ConfigSet::new();
    cs.register((0..200).map(|i| ConfigDef::new(format!("var_{i}"), TypeTag::STRING)))
        .unwrap();
    cs
}

fn string_set_benchmark(c: &mut Criterion) {
    c.bench_function("ConfigSet::string_set", |b| {
        let mut cs = config();
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let text = if flip { "on" } else { "off" };
            cs.string_set(black_box("var_100"), black_box(text)).unwrap();
        })
    });
}

fn inherited_get_benchmark(c: &mut Criterion) {
    // Read through eight levels of scopes to the global value
    c.bench_function("ConfigSet::string_get (8 scopes deep)", |b| {
        let mut cs = config();
        let mut parent = SubsetId::ROOT;
        for depth in 0..8 {
            parent = cs.subset_new(&format!("level{depth}"), parent).unwrap();
        }
        cs.string_set("var_7", "global").unwrap();

        b.iter(|| cs.string_get(black_box("level7:var_7")).unwrap())
    });
}

criterion_group!(benches, string_set_benchmark, inherited_get_benchmark);
criterion_main!(benches);
