#![allow(dead_code)]

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway repository whose commits carry controlled timestamps.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn set_user_name(&self, name: &str) {
        self.repo.config().unwrap().set_str("user.name", name).unwrap();
    }

    /// Writes `files`, removes `removed`, and commits on HEAD.
    pub fn commit(
        &self,
        author: &str,
        when: NaiveDateTime,
        files: &[(&str, &str)],
        removed: &[&str],
        message: &str,
    ) -> Oid {
        let workdir = self.repo.workdir().unwrap().to_path_buf();
        let mut index = self.repo.index().unwrap();

        for (name, content) in files {
            let path = workdir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        for name in removed {
            fs::remove_file(workdir.join(name)).unwrap();
            index.remove_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = signature(author, when);

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Deletes the loose object of `path` as committed in `commit`.
    pub fn remove_blob(&self, commit: Oid, path: &str) {
        let tree = self.repo.find_commit(commit).unwrap().tree().unwrap();
        let id = tree.get_path(Path::new(path)).unwrap().id().to_string();
        let object = self.repo.path().join("objects").join(&id[..2]).join(&id[2..]);
        fs::remove_file(object).unwrap();
    }

    /// Commits the current tree with HEAD and `other` as parents.
    pub fn merge(&self, other: Oid, when: NaiveDateTime, message: &str) -> Oid {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let other = self.repo.find_commit(other).unwrap();
        let tree = head.tree().unwrap();
        let sig = signature("Merger", when);

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &other])
            .unwrap()
    }
}

pub fn signature(author: &str, when: NaiveDateTime) -> Signature<'static> {
    let seconds = Local
        .from_local_datetime(&when)
        .earliest()
        .unwrap()
        .timestamp();
    let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
    Signature::new(author, &email, &Time::new(seconds, 0)).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

/// Initializes an empty repository at `path`, creating directories.
pub fn init_at(path: &Path) -> PathBuf {
    fs::create_dir_all(path).unwrap();
    Repository::init(path).unwrap();
    path.to_path_buf()
}
