mod common;

use common::{at, TestRepo};
use commitpulse::git::{list_commits, AuthorFilter, GitRepo};
use commitpulse::{ReportError, TimeWindow};
use pretty_assertions::assert_eq;
use std::fs;

fn january() -> TimeWindow {
    TimeWindow::custom("2024-01-10", "2024-01-20").unwrap()
}

fn messages(commits: &[commitpulse::Commit]) -> Vec<&str> {
    commits.iter().map(|c| c.message.as_str()).collect()
}

#[test]
fn test_commits_newest_first_with_short_hash() {
    let repo = TestRepo::new();
    repo.commit("Alice", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "first");
    let second = repo.commit(
        "Bob",
        at(2024, 1, 12, 14, 30, 45),
        &[("b.txt", "b\n")],
        &[],
        "  second change  \n\nwith a longer body",
    );

    let commits = list_commits(repo.path(), &january(), None).unwrap();
    assert_eq!(messages(&commits), vec!["second change", "first"]);

    let newest = &commits[0];
    assert_eq!(newest.hash, &second.to_string()[..7]);
    assert_eq!(newest.author, "Bob");
    assert_eq!(newest.timestamp, "2024-01-12 14:30");
    assert_eq!(newest.origin, ".");
}

#[test]
fn test_window_bounds_are_inclusive() {
    let repo = TestRepo::new();
    repo.commit("Alice", at(2024, 1, 9, 23, 59, 59), &[("a.txt", "0\n")], &[], "before");
    repo.commit("Alice", at(2024, 1, 10, 0, 0, 0), &[("a.txt", "1\n")], &[], "first instant");
    repo.commit("Alice", at(2024, 1, 20, 23, 59, 59), &[("a.txt", "2\n")], &[], "last instant");
    repo.commit("Alice", at(2024, 1, 21, 0, 0, 0), &[("a.txt", "3\n")], &[], "after");

    let commits = list_commits(repo.path(), &january(), None).unwrap();
    assert_eq!(messages(&commits), vec!["last instant", "first instant"]);
}

#[test]
fn test_merge_commits_are_excluded() {
    let repo = TestRepo::new();
    let base = repo.commit("Alice", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "base");
    repo.commit("Bob", at(2024, 1, 12, 9, 0, 0), &[("b.txt", "b\n")], &[], "feature");
    repo.merge(base, at(2024, 1, 13, 9, 0, 0), "Merge branch 'feature'");

    let commits = list_commits(repo.path(), &january(), None).unwrap();
    assert_eq!(messages(&commits), vec!["feature", "base"]);
}

#[test]
fn test_blank_messages_are_dropped() {
    let repo = TestRepo::new();
    repo.commit("Alice", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "kept");
    repo.commit("Alice", at(2024, 1, 12, 9, 0, 0), &[("b.txt", "b\n")], &[], "  \n\n ");

    let commits = list_commits(repo.path(), &january(), None).unwrap();
    assert_eq!(messages(&commits), vec!["kept"]);
}

#[test]
fn test_author_substring_ignores_case() {
    let repo = TestRepo::new();
    repo.commit("Alice Liddell", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "one");
    repo.commit("Bob Builder", at(2024, 1, 12, 9, 0, 0), &[("b.txt", "b\n")], &[], "two");
    repo.commit("alicia keys", at(2024, 1, 13, 9, 0, 0), &[("c.txt", "c\n")], &[], "three");

    let commits = list_commits(repo.path(), &january(), Some("ALIC")).unwrap();
    assert_eq!(messages(&commits), vec!["three", "one"]);
}

#[test]
fn test_me_resolves_to_configured_user_exactly() {
    let repo = TestRepo::new();
    repo.set_user_name("Alice Liddell");
    repo.commit("Alice Liddell", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "mine");
    repo.commit("Alice Liddell Jr", at(2024, 1, 12, 9, 0, 0), &[("b.txt", "b\n")], &[], "not mine");
    repo.commit("Bob", at(2024, 1, 13, 9, 0, 0), &[("c.txt", "c\n")], &[], "also not mine");

    let commits = list_commits(repo.path(), &january(), Some("me")).unwrap();
    assert_eq!(messages(&commits), vec!["mine"]);
}

#[test]
fn test_open_from_subdirectory() {
    let repo = TestRepo::new();
    repo.commit("Alice", at(2024, 1, 11, 9, 0, 0), &[("src/lib.rs", "fn a() {}\n")], &[], "lib");

    let nested = repo.path().join("src");
    let opened = GitRepo::open(&nested).unwrap();
    let commits = opened.list_commits(&january(), None).unwrap();
    assert_eq!(messages(&commits), vec!["lib"]);
}

#[test]
fn test_non_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let plain = dir.path().join("plain");
    fs::create_dir_all(&plain).unwrap();

    match list_commits(&plain, &january(), None) {
        Err(ReportError::RepositoryNotFound { path }) => assert!(path.ends_with("plain")),
        other => panic!("Expected RepositoryNotFound, got {:?}", other),
    }
}

#[test]
fn test_unborn_repository_is_empty() {
    let repo = TestRepo::new();
    let commits = list_commits(repo.path(), &january(), None).unwrap();
    assert!(commits.is_empty());
}

#[test]
fn test_authors_sorted_and_distinct() {
    let repo = TestRepo::new();
    repo.commit("Carol", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "one");
    repo.commit("Alice", at(2024, 1, 12, 9, 0, 0), &[("b.txt", "b\n")], &[], "two");
    repo.commit("Carol", at(2024, 1, 13, 9, 0, 0), &[("c.txt", "c\n")], &[], "three");

    let opened = GitRepo::open(repo.path()).unwrap();
    assert_eq!(opened.authors(&january()).unwrap(), vec!["Alice", "Carol"]);
}

#[test]
fn test_author_filter_parse_round_trip_through_repo() {
    let repo = TestRepo::new();
    repo.commit("Dana", at(2024, 1, 11, 9, 0, 0), &[("a.txt", "a\n")], &[], "one");

    let opened = GitRepo::open(repo.path()).unwrap();
    let filter = AuthorFilter::parse(Some("nobody"));
    assert!(opened.list_commits(&january(), filter.as_ref()).unwrap().is_empty());
}
