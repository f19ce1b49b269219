//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;

use bytes::Bytes;
use shard_rollup::{
    key::{event_key, field_index_key, term_frequency_key},
    rollup::PROVENANCE_FIELD,
    Document, KeyRange, MemorySource, RecordKey, SortedSource,
};

const RNG_SEED: u64 = 0x5eed_0421;

pub const FIELDS: &[&str] = &["BODY", "NAME", "TITLE"];
pub const VALUES: &[&str] = &["alpha", "bravo", "charlie", "delta"];
pub const DATATYPES: &[&str] = &["email", "wiki"];
pub const PARTITIONS: &[&str] = &["20260101_0", "20260101_1"];

pub fn make_rng() -> fastrand::Rng {
    fastrand::Rng::with_seed(RNG_SEED)
}

/// One logical document and the postings written for it.
#[derive(Clone, Debug)]
pub struct Doc {
    pub partition: &'static str,
    pub datatype: &'static str,
    pub root: String,
    /// `(uid, field, value)` per child record, the root included.
    pub entries: Vec<(String, &'static str, &'static str)>,
}

impl Doc {
    pub fn postings(&self) -> Vec<RecordKey> {
        let mut keys = Vec::new();
        for (uid, field, value) in &self.entries {
            keys.push(field_index_key(
                self.partition,
                field,
                value,
                self.datatype,
                uid,
            ));
            keys.push(term_frequency_key(
                self.partition,
                self.datatype,
                uid,
                value,
                field,
            ));
            keys.push(event_key(self.partition, self.datatype, uid, field, value));
        }
        keys
    }
}

/// Documents with a few nested children each.
///
/// Top-level uids draw their first two segments from a tiny pool and end in an
/// unpadded counter, so roots such as `0.1.1` and `0.1.12` sit next to each
/// other in key order.
pub fn documents(rng: &mut fastrand::Rng, count: usize) -> Vec<Doc> {
    (0..count)
        .map(|i| {
            let root = format!("{:x}.{:x}.{i}", rng.u8(..2), rng.u8(..2));
            let mut uids = vec![root.clone()];
            for child in 0..rng.usize(0..4) {
                let uid = format!("{root}.{child}");
                if rng.bool() {
                    uids.push(format!("{uid}.{}", rng.usize(0..3)));
                }
                uids.push(uid);
            }
            let mut entries = Vec::new();
            for uid in uids {
                for _ in 0..rng.usize(1..=3) {
                    entries.push((
                        uid.clone(),
                        FIELDS[rng.usize(..FIELDS.len())],
                        VALUES[rng.usize(..VALUES.len())],
                    ));
                }
            }
            Doc {
                partition: PARTITIONS[rng.usize(..PARTITIONS.len())],
                datatype: DATATYPES[rng.usize(..DATATYPES.len())],
                root,
                entries,
            }
        })
        .collect()
}

/// Every posting of `docs` in key order.
pub fn sorted_postings(docs: &[Doc]) -> Vec<RecordKey> {
    let keys: BTreeSet<RecordKey> = docs.iter().flat_map(Doc::postings).collect();
    keys.into_iter().collect()
}

pub fn seeked(keys: &[RecordKey], families: &[Bytes], inclusive: bool) -> MemorySource {
    let mut source = MemorySource::from_keys(keys.iter().cloned());
    source
        .seek(KeyRange::all(), families, inclusive)
        .expect("memory seek");
    source
}

pub fn fi_families() -> Vec<Bytes> {
    FIELDS
        .iter()
        .map(|field| Bytes::from(format!("fi\0{field}")))
        .collect()
}

pub fn tf_families() -> Vec<Bytes> {
    vec![Bytes::from_static(b"tf")]
}

fn parts(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| *b == 0)
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect()
}

/// A posting read back by splitting on NUL, independent of the crate codec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed {
    pub partition: String,
    pub field: String,
    pub value: String,
    pub datatype: String,
    pub uid: String,
}

impl Parsed {
    pub fn field_index(key: &RecordKey) -> Self {
        let family = parts(key.family());
        let qualifier = parts(key.qualifier());
        Self {
            partition: String::from_utf8_lossy(key.partition()).into_owned(),
            field: family[1].clone(),
            value: qualifier[0].clone(),
            datatype: qualifier[1].clone(),
            uid: qualifier[2].clone(),
        }
    }

    pub fn term_frequency(key: &RecordKey) -> Self {
        let qualifier = parts(key.qualifier());
        Self {
            partition: String::from_utf8_lossy(key.partition()).into_owned(),
            datatype: qualifier[0].clone(),
            uid: qualifier[1].clone(),
            value: qualifier[2].clone(),
            field: qualifier[3].clone(),
        }
    }

    pub fn root(&self) -> String {
        self.uid.splitn(4, '.').take(3).collect::<Vec<_>>().join(".")
    }

    pub fn group_id(&self) -> (String, String, String) {
        (self.partition.clone(), self.datatype.clone(), self.root())
    }
}

/// What one rollup call is expected to produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub key: RecordKey,
    pub pairs: BTreeSet<(String, Vec<u8>)>,
    pub provenance: Option<RecordKey>,
}

impl Group {
    pub fn from_document(key: RecordKey, document: &Document) -> Self {
        let pairs = document
            .fields()
            .filter(|field| *field != PROVENANCE_FIELD)
            .flat_map(|field| {
                document
                    .get(field)
                    .map(|attribute| (attribute.field().to_string(), attribute.value().to_vec()))
            })
            .collect();
        Self {
            key,
            pairs,
            provenance: document.provenance().cloned(),
        }
    }
}

/// Contiguous runs of `postings` sharing partition, datatype and root uid.
///
/// `parse` reads a posting; `collect` decides whether its pair reaches the
/// document.
pub fn expected_groups(
    postings: &[RecordKey],
    parse: fn(&RecordKey) -> Parsed,
    collect: impl Fn(&Parsed) -> bool,
) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut index = 0;
    while index < postings.len() {
        let head = parse(&postings[index]);
        let mut pairs = BTreeSet::new();
        let mut provenance = None;
        let mut last_sub_id = None;
        let mut last = head.clone();
        let mut last_key = &postings[index];
        while index < postings.len() {
            let key = &postings[index];
            let parsed = parse(key);
            if parsed.group_id() != head.group_id() {
                break;
            }
            if collect(&parsed) {
                pairs.insert((parsed.field.clone(), parsed.value.clone().into_bytes()));
            }
            let sub_id = (parsed.datatype.clone(), parsed.uid.clone());
            if last_sub_id.as_ref() != Some(&sub_id) {
                provenance = Some(key.clone());
                last_sub_id = Some(sub_id);
            }
            last = parsed;
            last_key = key;
            index += 1;
        }
        let key = RecordKey::from_parts(
            head.partition.clone(),
            format!("{}\0{}", head.datatype, head.root()),
            format!("{}\0{}", last.field, last.value),
            last_key.visibility().to_vec(),
            last_key.timestamp(),
        );
        groups.push(Group {
            key,
            pairs,
            provenance,
        });
    }
    groups
}
