use thicket::models::{PostKind, TOMBSTONE_MESSAGE};
use thicket::repo::{inmem::InMemRepo, RepoError};
use thicket::repo::{AccountRepo, PostRepo, StatsRepo};

/// Repository with two accounts, "alice" and "bob".
fn repo() -> InMemRepo {
    let r = InMemRepo::new();
    r.create_account("alice", "").unwrap();
    r.create_account("bob", "").unwrap();
    r
}

#[test]
fn message_length_boundaries() {
    let r = repo();
    assert!(matches!(r.create_post("alice", "").unwrap_err(), RepoError::InvalidPost));
    assert!(matches!(r.create_post("alice", &"m".repeat(101)).unwrap_err(), RepoError::InvalidPost));
    r.create_post("alice", &"m".repeat(100)).unwrap();
    assert!(matches!(r.create_post("ghost", "hi").unwrap_err(), RepoError::HandleNotFound));
    assert_eq!(r.total_original_posts(), 1);
}

#[test]
fn post_ids_shared_across_kinds() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    let c = r.comment_post("bob", p, "hi").unwrap();
    let e = r.endorse_post("bob", p).unwrap();
    assert_eq!((p, c, e), (1, 2, 3));

    assert_eq!(r.get_post(c).unwrap().kind, PostKind::Comment { reference: p });
    assert_eq!(r.get_post(e).unwrap().kind, PostKind::Endorsement { reference: p });
}

#[test]
fn endorsement_message_quotes_target() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    let e = r.endorse_post("bob", p).unwrap();
    let view = r.get_post(e).unwrap();
    assert_eq!(view.message, "EP@alice: hello");
    assert_eq!(view.handle.as_deref(), Some("bob"));
}

#[test]
fn double_endorsement_from_two_accounts() {
    let r = repo();
    r.create_account("carol", "").unwrap();
    let p = r.create_post("alice", "hello").unwrap();
    let e1 = r.endorse_post("bob", p).unwrap();
    let e2 = r.endorse_post("carol", p).unwrap();
    assert_ne!(e1, e2);
    assert_eq!(r.get_post(p).unwrap().endorsement_count, 2);
    assert_eq!(r.find_by_handle("alice").unwrap().endorsement_count, 2);
}

#[test]
fn endorsements_are_not_actionable() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    let e = r.endorse_post("bob", p).unwrap();

    assert!(matches!(r.endorse_post("alice", e).unwrap_err(), RepoError::NotActionable));
    assert!(matches!(r.comment_post("alice", e, "no").unwrap_err(), RepoError::NotActionable));
    assert!(matches!(r.show_post_children_details(e).unwrap_err(), RepoError::NotActionable));
    // failed calls allocate nothing
    assert_eq!(r.create_post("alice", "next").unwrap(), 3);
}

#[test]
fn error_precedence_on_comment() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    assert!(matches!(r.comment_post("ghost", 99, "").unwrap_err(), RepoError::HandleNotFound));
    assert!(matches!(r.comment_post("bob", 99, "").unwrap_err(), RepoError::PostIdNotFound));
    assert!(matches!(r.comment_post("bob", p, "").unwrap_err(), RepoError::InvalidPost));
    assert!(matches!(r.endorse_post("bob", 99).unwrap_err(), RepoError::PostIdNotFound));
}

#[test]
fn comments_nest_and_can_be_endorsed() {
    let r = repo();
    let p = r.create_post("alice", "root").unwrap();
    let c1 = r.comment_post("bob", p, "reply").unwrap();
    let c2 = r.comment_post("alice", c1, "reply to reply").unwrap();
    r.endorse_post("alice", c1).unwrap();

    assert_eq!(r.get_post(p).unwrap().comment_count, 1);
    assert_eq!(r.get_post(c1).unwrap().comment_count, 1);
    assert_eq!(r.get_post(c1).unwrap().endorsement_count, 1);
    assert_eq!(r.get_post(c2).unwrap().comment_count, 0);
    // comments are not original posts
    assert_eq!(r.find_by_handle("bob").unwrap().post_count, 0);
    assert_eq!(r.find_by_handle("bob").unwrap().endorsement_count, 1);
    assert_eq!(r.total_comment_posts(), 2);
}

#[test]
fn replies_attach_under_tombstones() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    r.delete_post(p).unwrap();

    let late = r.comment_post("bob", p, "late").unwrap();
    let e = r.endorse_post("bob", p).unwrap();
    let tomb = r.get_post(p).unwrap();
    assert_eq!(tomb.message, TOMBSTONE_MESSAGE);
    assert_eq!(tomb.comment_count, 1);
    assert_eq!(tomb.endorsement_count, 1);
    assert_eq!(r.get_post(e).unwrap().kind, PostKind::Endorsement { reference: p });

    let thread = r.show_post_children_details(p).unwrap();
    let rule = "-".repeat(TOMBSTONE_MESSAGE.len());
    assert!(thread.starts_with(&format!("{rule}\n{TOMBSTONE_MESSAGE}\n{rule}\n|\n")));
    assert!(thread.contains(&format!("| > ID: {late}\n    Account: bob")));
    assert!(thread.ends_with("    late"));
}

#[test]
fn show_individual_post_layout() {
    let r = repo();
    let p = r.create_post("alice", "hello").unwrap();
    r.comment_post("bob", p, "hi").unwrap();
    r.endorse_post("bob", p).unwrap();
    assert_eq!(
        r.show_individual_post(p).unwrap(),
        "ID: 1\nAccount: alice\nNo. endorsements: 1 | No. comments: 1\nhello"
    );
    assert!(matches!(r.show_individual_post(77).unwrap_err(), RepoError::PostIdNotFound));
}
