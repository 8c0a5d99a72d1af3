//! Colored terminal rendering for the interactive commands.

use super::CommitGroup;
use crate::git::{Commit, RepoStats, StatsDelta};
use crate::window::TimeWindow;
use colored::*;
use std::fmt::Write;

const NO_COMMITS: &str = "No commits found.";

pub fn header(title: &str, window: &TimeWindow, count: usize) -> String {
    format!(
        "{} {} ({} {})\n{}\n",
        title.bright_cyan().bold(),
        window.to_string().bright_white(),
        count,
        if count == 1 { "entry" } else { "entries" },
        "-".repeat(60).dimmed()
    )
}

/// One line per commit, prefixed with its origin when `show_origin` is set.
pub fn commit_lines(commits: &[Commit], show_origin: bool) -> String {
    if commits.is_empty() {
        return format!("{}\n", NO_COMMITS.yellow());
    }

    let mut out = String::new();
    for commit in commits {
        let origin = if show_origin {
            format!("[{}] ", commit.origin).bright_magenta().to_string()
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{} {} {}{} {}",
            commit.hash.yellow(),
            commit.timestamp.dimmed(),
            origin,
            commit.author.bright_blue(),
            commit.message
        );
    }
    out
}

/// Non-empty groups in order, each followed by its commits.
pub fn group_lines(groups: &[CommitGroup], show_origin: bool) -> String {
    let mut out = String::new();
    for group in groups.iter().filter(|g| !g.commits.is_empty()) {
        let _ = writeln!(
            out,
            "\n{} ({})",
            group.name.bright_white().bold(),
            group.commits.len()
        );
        out.push_str(&commit_lines(&group.commits, show_origin));
    }
    if out.is_empty() {
        out = format!("{}\n", NO_COMMITS.yellow());
    }
    out
}

/// Totals followed by the `top` busiest authors.
pub fn stats_summary(stats: &RepoStats, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Commits:       {}", stats.total_commits.to_string().bright_white());
    let _ = writeln!(out, "Authors:       {}", stats.total_authors.to_string().bright_white());
    let _ = writeln!(
        out,
        "Files changed: {}",
        stats.total_files_changed.to_string().bright_white()
    );
    let _ = writeln!(
        out,
        "Lines:         {} / {} (net {})",
        format!("+{}", stats.total_insertions).green(),
        format!("-{}", stats.total_deletions).red(),
        signed(stats.net_lines)
    );

    if stats.author_stats.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\n{}", "Top contributors".bright_cyan().bold());
    for author in stats.get_top_contributors(top) {
        let _ = writeln!(
            out,
            "  {:<24} {:>5} commits {:>5} files {} {} (net {})",
            author.author.bright_blue(),
            author.total_commits,
            author.files_changed,
            format!("+{}", author.insertions).green(),
            format!("-{}", author.deletions).red(),
            signed(author.net_lines)
        );
    }
    out
}

pub fn comparison_table(before: &RepoStats, after: &RepoStats, delta: &StatsDelta) -> String {
    let rows = [
        ("Commits", before.total_commits as i64, after.total_commits as i64, delta.commits),
        ("Authors", before.total_authors as i64, after.total_authors as i64, delta.authors),
        (
            "Files changed",
            before.total_files_changed as i64,
            after.total_files_changed as i64,
            delta.files_changed,
        ),
        (
            "Insertions",
            before.total_insertions as i64,
            after.total_insertions as i64,
            delta.insertions,
        ),
        (
            "Deletions",
            before.total_deletions as i64,
            after.total_deletions as i64,
            delta.deletions,
        ),
        ("Net lines", before.net_lines, after.net_lines, delta.net_lines),
    ];

    let mut out = format!("{:<14} {:>10} {:>10} {:>10}\n", "", "previous", "current", "change");
    for (label, previous, current, change) in rows {
        let _ = writeln!(
            out,
            "{:<14} {:>10} {:>10} {:>10}",
            label,
            previous,
            current,
            signed(change)
        );
    }
    out
}

/// Author names, team members marked with `*`.
pub fn author_lines(authors: &[String], members: &[String]) -> String {
    let mut out = String::new();
    for name in authors {
        let marker = if members.contains(name) {
            "*".bright_green()
        } else {
            " ".normal()
        };
        let _ = writeln!(out, "{} {}", marker, name);
    }
    out
}

fn signed(value: i64) -> ColoredString {
    match value {
        v if v > 0 => format!("+{}", v).green(),
        v if v < 0 => v.to_string().red(),
        v => v.to_string().normal(),
    }
}
