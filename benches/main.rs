#[macro_use]
extern crate criterion;

mod skiplist;

criterion_group!(
    benches,
    crate::skiplist::insert_equal,
    crate::skiplist::lower_bound,
    crate::skiplist::iter,
    crate::skiplist::extract_merge,
    crate::btreemap::insert_equal,
    crate::btreemap::lower_bound,
    crate::btreemap::iter
);
criterion_main!(benches);
