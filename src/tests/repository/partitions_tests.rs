use super::*;
use crate::model::DreamStatus;

fn dream(id: &str, status: DreamStatus) -> Dream {
    let mut d = Dream::placeholder(format!("dream {}", id), "", status, vec![]);
    d.id = DreamId::from(id);
    d
}

fn assert_exactly_once(p: &DreamPartitions, id: &str) {
    let id = DreamId::from(id);
    let hits = p
        .pending
        .iter()
        .chain(p.completed.iter())
        .filter(|d| d.id == id)
        .count();
    assert_eq!(hits, 1, "{} should be in exactly one partition", id);
}

#[test]
fn from_dreams_splits_by_status() {
    let p = DreamPartitions::from_dreams(vec![
        dream("1", DreamStatus::Pending),
        dream("2", DreamStatus::Processing),
        dream("3", DreamStatus::Completed),
        dream("4", DreamStatus::Failed),
    ]);
    assert_eq!(p.pending.len(), 2);
    assert_eq!(p.completed.len(), 2);
    assert_eq!(p.len(), 4);
}

#[test]
fn upsert_moves_between_partitions_without_duplicates() {
    let prior_states = [
        DreamPartitions::default(),
        DreamPartitions::from_dreams(vec![dream("d1", DreamStatus::Pending)]),
        DreamPartitions::from_dreams(vec![dream("d1", DreamStatus::Processing)]),
        DreamPartitions::from_dreams(vec![dream("d0", DreamStatus::Completed)]),
    ];
    for prior in prior_states {
        for status in [
            DreamStatus::Processing,
            DreamStatus::Completed,
            DreamStatus::Failed,
        ] {
            let mut p = prior.clone();
            p.upsert(dream("d1", status));
            assert_exactly_once(&p, "d1");
            let stored = p.get(&DreamId::from("d1")).expect("present");
            assert_eq!(stored.status, status);
            assert_eq!(
                p.completed.iter().any(|d| d.id.as_str() == "d1"),
                status.is_terminal()
            );
        }
    }
}

#[test]
fn upsert_never_reverts_a_terminal_dream() {
    let mut p = DreamPartitions::from_dreams(vec![dream("d1", DreamStatus::Completed)]);
    let stored = p.upsert(dream("d1", DreamStatus::Processing));
    assert_eq!(stored.status, DreamStatus::Completed);
    assert!(p.pending.is_empty());
    assert_exactly_once(&p, "d1");
}

#[test]
fn remove_returns_entry_from_either_partition() {
    let mut p = DreamPartitions::from_dreams(vec![
        dream("a", DreamStatus::Pending),
        dream("b", DreamStatus::Failed),
    ]);
    assert!(p.remove(&DreamId::from("b")).is_some());
    assert!(p.remove(&DreamId::from("b")).is_none());
    assert!(p.remove(&DreamId::from("a")).is_some());
    assert!(p.is_empty());
}

#[test]
fn replace_with_keeps_unknown_local_placeholders_when_asked() {
    let local = Dream::placeholder("offline", "", DreamStatus::Processing, vec![]);
    let local_id = local.id.clone();
    let mut p = DreamPartitions::from_dreams(vec![local, dream("old", DreamStatus::Pending)]);

    let mut strict = p.clone();
    strict.replace_with(vec![dream("1", DreamStatus::Completed)], false);
    assert!(!strict.contains(&local_id));
    assert!(!strict.contains(&DreamId::from("old")));

    p.replace_with(vec![dream("1", DreamStatus::Completed)], true);
    assert!(p.contains(&local_id));
    assert!(!p.contains(&DreamId::from("old")));
    assert_exactly_once(&p, "1");
}

#[test]
fn replace_with_dedupes_server_listing() {
    let mut p = DreamPartitions::default();
    p.replace_with(
        vec![
            dream("1", DreamStatus::Processing),
            dream("1", DreamStatus::Completed),
        ],
        false,
    );
    assert_exactly_once(&p, "1");
    assert_eq!(p.completed.len(), 1);
}

#[test]
fn replace_with_drops_samples_but_keeps_local_placeholders() {
    let mut sample = dream("s", DreamStatus::Completed);
    sample.id = DreamId::sample();
    let local = Dream::placeholder("offline", "", DreamStatus::Processing, vec![]);
    let mut p = DreamPartitions::from_dreams(vec![sample, local.clone()]);

    p.replace_with(vec![dream("1", DreamStatus::Pending)], true);
    assert_eq!(p.len(), 2);
    assert!(p.contains(&local.id));
    assert!(p.contains(&DreamId::from("1")));
}
