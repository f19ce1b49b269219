mod common;

use std::{sync::Arc, thread};

use common::{documents, fi_families, make_rng, seeked, sorted_postings, Group};
use shard_rollup::{
    Document, FieldIndexRollup, MemorySource, RollupOptions, SortedSource, SourceError,
};

fn drain(rollup: &FieldIndexRollup, source: &mut MemorySource) -> Vec<Group> {
    let mut groups = Vec::new();
    while source.has_current() {
        let mut document = Document::new();
        let key = rollup
            .apply(source, Some(&mut document), None)
            .expect("rollup");
        groups.push(Group::from_document(key, &document));
    }
    groups
}

#[test]
fn forks_roll_up_independently_across_threads() {
    let mut rng = make_rng();
    let keys = sorted_postings(&documents(&mut rng, 48));
    let mut source = seeked(&keys, &fi_families(), true);
    let options = Arc::new(RollupOptions::default().max_next_count(2));
    let rollup = FieldIndexRollup::with_shared(Arc::clone(&options));

    // Consume a few groups before forking so forks start mid-scan.
    for _ in 0..3 {
        rollup.apply_key_only(&mut source).expect("rollup");
    }
    let mut reference = source.fork().expect("fork");
    let expected = drain(&rollup, &mut reference);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mut fork = source.fork().expect("fork");
            let rollup = FieldIndexRollup::with_shared(Arc::clone(&options));
            thread::spawn(move || drain(&rollup, &mut fork))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("fork thread"), expected);
    }

    // The parent cursor never moved.
    assert_eq!(drain(&rollup, &mut source), expected);
    assert!(Arc::ptr_eq(rollup.shared_options(), &options));
}

#[test]
fn fork_before_seek_is_rejected() {
    let mut rng = make_rng();
    let keys = sorted_postings(&documents(&mut rng, 2));
    let source = MemorySource::from_keys(keys);
    assert!(matches!(source.fork(), Err(SourceError::Unopened)));
}
