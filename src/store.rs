use crate::calc::{self, ClassStats};
use crate::student::Student;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATA_FILE: &str = "studentMarks.txt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Student Code already exists.")]
    DuplicateCode(String),

    #[error("New Student Code is already taken.")]
    CodeTaken(String),

    #[error("Original record not found.")]
    OriginalNotFound(String),

    #[error("Student Code not found.")]
    NotFound(String),

    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Stable code for the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateCode(_) => "duplicate_code",
            StoreError::CodeTaken(_) => "code_taken",
            StoreError::OriginalNotFound(_) | StoreError::NotFound(_) => "not_found",
            StoreError::Load { .. } => "load_failed",
            StoreError::Save { .. } => "save_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Code,
    Name,
    Percentage,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "code" => Some(SortKey::Code),
            "name" => Some(SortKey::Name),
            "percentage" => Some(SortKey::Percentage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub created_placeholder: bool,
}

/// The student collection and the flat file it is mirrored to.
///
/// File layout: a count line, then one `Student::to_line` per record. Every
/// successful add/update/delete rewrites the whole file before returning.
#[derive(Debug)]
pub struct StudentStore {
    path: PathBuf,
    students: Vec<Student>,
}

impl StudentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StudentStore {
            path: path.into(),
            students: Vec::new(),
        }
    }

    /// Constructs the store and loads it straight away.
    pub fn open(path: impl Into<PathBuf>) -> (Self, Result<LoadReport, StoreError>) {
        let mut store = StudentStore::new(path);
        let report = store.load();
        (store, report)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn load(&mut self) -> Result<LoadReport, StoreError> {
        self.students.clear();

        if !self.path.exists() {
            self.write_placeholder()?;
            tracing::warn!(
                "data file {} missing; created an empty one",
                self.path.display()
            );
            return Ok(LoadReport {
                created_placeholder: true,
                ..LoadReport::default()
            });
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            tracing::error!("failed to read {}: {source}", self.path.display());
            StoreError::Load {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut report = LoadReport::default();
        // Line 0 is the record count; it is informational only.
        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match Student::parse_line(line) {
                Some(s) => self.students.push(s),
                None => {
                    report.skipped += 1;
                    tracing::warn!(
                        "{}:{}: skipping malformed record",
                        self.path.display(),
                        idx + 1
                    );
                }
            }
        }
        report.loaded = self.students.len();
        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "loaded {}",
            self.path.display()
        );
        if self.is_empty() && report.skipped > 0 {
            tracing::warn!("no usable records in {}", self.path.display());
        }
        Ok(report)
    }

    fn write_placeholder(&self) -> Result<(), StoreError> {
        let save_err = |source| StoreError::Save {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(save_err)?;
            }
        }
        std::fs::write(&self.path, "0\n").map_err(save_err)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let mut out = format!("{}\n", self.students.len());
        for s in &self.students {
            out.push_str(&s.to_line());
        }
        std::fs::write(&self.path, out).map_err(|source| {
            tracing::error!("failed to write {}: {source}", self.path.display());
            StoreError::Save {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// A failed save leaves the in-memory change in place.
    pub fn add(&mut self, student: Student) -> Result<&'static str, StoreError> {
        if self.position(student.code()).is_some() {
            return Err(StoreError::DuplicateCode(student.code().to_string()));
        }
        tracing::debug!("adding student {}", student.code());
        self.students.push(student);
        self.save()?;
        Ok("Student added successfully.")
    }

    pub fn update(
        &mut self,
        original_code: &str,
        student: Student,
    ) -> Result<&'static str, StoreError> {
        let original_code = original_code.trim();
        if original_code != student.code() && self.position(student.code()).is_some() {
            return Err(StoreError::CodeTaken(student.code().to_string()));
        }
        let Some(idx) = self.position(original_code) else {
            return Err(StoreError::OriginalNotFound(original_code.to_string()));
        };
        tracing::debug!("updating student {original_code} -> {}", student.code());
        self.students[idx] = student;
        self.save()?;
        Ok("Student updated successfully.")
    }

    pub fn delete(&mut self, code: &str) -> Result<&'static str, StoreError> {
        let code = code.trim();
        let Some(idx) = self.position(code) else {
            return Err(StoreError::NotFound(code.to_string()));
        };
        tracing::debug!("deleting student {code}");
        self.students.remove(idx);
        self.save()?;
        Ok("Student deleted.")
    }

    pub fn find(&self, code: &str) -> Option<&Student> {
        let code = code.trim();
        self.students.iter().find(|s| s.code() == code)
    }

    /// First record with the greatest overall total.
    pub fn highest(&self) -> Option<&Student> {
        self.students.iter().reduce(|best, s| {
            if s.total_overall() > best.total_overall() {
                s
            } else {
                best
            }
        })
    }

    /// First record with the smallest overall total.
    pub fn lowest(&self) -> Option<&Student> {
        self.students.iter().reduce(|best, s| {
            if s.total_overall() < best.total_overall() {
                s
            } else {
                best
            }
        })
    }

    /// Stable in-memory reorder; equal keys keep their relative order in both
    /// directions. Not written to disk.
    pub fn sort(&mut self, key: SortKey, descending: bool) {
        let cmp = |a: &Student, b: &Student| -> Ordering {
            match key {
                SortKey::Code => a.code().cmp(b.code()),
                SortKey::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
                SortKey::Percentage => a.percentage().total_cmp(&b.percentage()),
            }
        };
        if descending {
            self.students.sort_by(|a, b| cmp(b, a));
        } else {
            self.students.sort_by(cmp);
        }
    }

    pub fn average_percentage(&self) -> f64 {
        calc::mean_percent(self.students.iter().map(Student::percentage))
    }

    pub fn stats(&self) -> ClassStats {
        ClassStats::from_percents(self.students.iter().map(Student::percentage))
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.students.iter().position(|s| s.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::Grade;

    fn store_in(dir: &tempfile::TempDir) -> StudentStore {
        StudentStore::new(dir.path().join(DEFAULT_DATA_FILE))
    }

    fn codes(store: &StudentStore) -> Vec<&str> {
        store.students().iter().map(Student::code).collect()
    }

    #[test]
    fn missing_file_creates_placeholder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("marks.txt");
        let (store, report) = StudentStore::open(&path);
        let report = report.expect("load");
        assert!(report.created_placeholder);
        assert_eq!(report.loaded, 0);
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "0\n");
    }

    #[test]
    fn load_ignores_count_line_and_skips_bad_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        std::fs::write(
            store.path(),
            "7\n1001,Ada,20,20,20,100\nbroken line\n\n1002,Bob,1,2,x,4\n1003,Cy,0,0,0,0\n",
        )
        .expect("seed");
        let report = store.load().expect("load");
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 2);
        assert!(!report.created_placeholder);
        assert_eq!(codes(&store), vec!["1001", "1003"]);
    }

    #[test]
    fn oversized_marks_are_skipped_not_summed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        std::fs::write(
            store.path(),
            "2\n1001,Ada,9223372036854775807,1,0,0\n1002,Bob,10,10,10,50\n",
        )
        .expect("seed");
        let report = store.load().expect("load");
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.highest().map(Student::total_overall), Some(80));
        assert_eq!(store.lowest().map(Student::code), Some("1002"));
        assert_eq!(store.average_percentage(), 50.0);
    }

    #[test]
    fn empty_file_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        std::fs::write(store.path(), "").expect("seed");
        let report = store.load().expect("load");
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn unreadable_path_reports_load_failure_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory exists at the path but cannot be read as text.
        let mut store = StudentStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert_eq!(err.code(), "load_failed");
        assert!(store.is_empty());
    }

    #[test]
    fn save_writes_count_then_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        store
            .add(Student::new("1001", "Ada", 20, 20, 20, 100))
            .expect("add");
        store
            .add(Student::new("1002", "Bob", 0, 0, 0, 0))
            .expect("add");
        let text = std::fs::read_to_string(store.path()).expect("read");
        assert_eq!(text, "2\n1001,Ada,20,20,20,100\n1002,Bob,0,0,0,0\n");
    }

    #[test]
    fn add_rejects_duplicate_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        let ada = Student::new("1001", "Ada", 1, 2, 3, 4);
        assert_eq!(
            store.add(ada.clone()).expect("add"),
            "Student added successfully."
        );
        let err = store
            .add(Student::new("1001", "Other", 0, 0, 0, 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "Student Code already exists.");
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("1001"), Some(&ada));
    }

    #[test]
    fn update_replaces_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        store.add(Student::new("1001", "Ada", 1, 1, 1, 1)).expect("add");
        store.add(Student::new("1002", "Bob", 2, 2, 2, 2)).expect("add");
        store.add(Student::new("1003", "Cy", 3, 3, 3, 3)).expect("add");

        let msg = store
            .update("1002", Student::new("1002", "Robert", 20, 20, 20, 90))
            .expect("update");
        assert_eq!(msg, "Student updated successfully.");
        assert_eq!(store.len(), 3);
        assert_eq!(store.students()[1].name(), "Robert");

        store
            .update("1002", Student::new("2002", "Robert", 20, 20, 20, 90))
            .expect("rename code");
        assert_eq!(codes(&store), vec!["1001", "2002", "1003"]);

        let mut reloaded = store_in(&dir);
        reloaded.load().expect("reload");
        assert_eq!(reloaded.students(), store.students());
    }

    #[test]
    fn update_rejects_taken_code_and_missing_original() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        let ada = Student::new("1001", "Ada", 1, 1, 1, 1);
        let bob = Student::new("1002", "Bob", 2, 2, 2, 2);
        store.add(ada.clone()).expect("add");
        store.add(bob.clone()).expect("add");

        let err = store
            .update("1001", Student::new("1002", "Ada", 5, 5, 5, 5))
            .unwrap_err();
        assert_eq!(err.code(), "code_taken");
        assert_eq!(store.find("1001"), Some(&ada));
        assert_eq!(store.find("1002"), Some(&bob));

        let err = store
            .update("9999", Student::new("9999", "Nobody", 0, 0, 0, 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "Original record not found.");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        store.add(Student::new("1001", "Ada", 1, 1, 1, 1)).expect("add");
        store.add(Student::new("1002", "Bob", 2, 2, 2, 2)).expect("add");

        assert!(store.delete("1001").is_ok());
        assert_eq!(codes(&store), vec!["1002"]);
        let err = store.delete("1001").unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert_eq!(store.len(), 1);
        assert_eq!(
            std::fs::read_to_string(store.path()).expect("read"),
            "1\n1002,Bob,2,2,2,2\n"
        );
    }

    #[test]
    fn failed_save_keeps_memory_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocked = dir.path().join("blocked");
        std::fs::create_dir_all(&blocked).expect("mkdir");
        let mut store = StudentStore::new(&blocked);
        let err = store
            .add(Student::new("1001", "Ada", 1, 1, 1, 1))
            .unwrap_err();
        assert_eq!(err.code(), "save_failed");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn extremes_prefer_first_on_ties() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        assert!(store.highest().is_none());
        assert!(store.lowest().is_none());
        store.load().expect("load");
        store.add(Student::new("1001", "A", 10, 10, 10, 50)).expect("add");
        store.add(Student::new("1002", "B", 20, 20, 20, 100)).expect("add");
        store.add(Student::new("1003", "C", 20, 20, 20, 100)).expect("add");
        store.add(Student::new("1004", "D", 0, 0, 0, 5)).expect("add");
        store.add(Student::new("1005", "E", 5, 0, 0, 0)).expect("add");

        assert_eq!(store.highest().map(Student::code), Some("1002"));
        assert_eq!(store.lowest().map(Student::code), Some("1004"));
        let top = store.highest().expect("highest").total_overall();
        assert!(store.students().iter().all(|s| top >= s.total_overall()));
    }

    #[test]
    fn sort_by_each_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        store.load().expect("load");
        store.add(Student::new("1003", "carol", 10, 10, 10, 50)).expect("add");
        store.add(Student::new("1001", "Bob", 20, 20, 20, 100)).expect("add");
        store.add(Student::new("1002", "alice", 10, 10, 10, 50)).expect("add");
        let on_disk = std::fs::read_to_string(store.path()).expect("read");

        store.sort(SortKey::Code, false);
        assert_eq!(codes(&store), vec!["1001", "1002", "1003"]);

        store.sort(SortKey::Name, false);
        assert_eq!(codes(&store), vec!["1002", "1001", "1003"]);

        store.sort(SortKey::Name, true);
        assert_eq!(codes(&store), vec!["1003", "1001", "1002"]);

        // 1003 and 1002 tie; they keep their current relative order.
        store.sort(SortKey::Percentage, true);
        assert_eq!(codes(&store), vec!["1001", "1003", "1002"]);
        store.sort(SortKey::Percentage, false);
        assert_eq!(codes(&store), vec!["1003", "1002", "1001"]);

        assert_eq!(
            std::fs::read_to_string(store.path()).expect("read"),
            on_disk
        );
    }

    #[test]
    fn average_and_stats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(&dir);
        assert_eq!(store.average_percentage(), 0.0);
        store.load().expect("load");
        store.add(Student::new("1001", "Top", 20, 20, 20, 100)).expect("add");
        store.add(Student::new("1002", "Low", 0, 0, 0, 0)).expect("add");
        assert_eq!(store.average_percentage(), 50.0);

        let stats = store.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.distribution.count(Grade::A), 1);
        assert_eq!(stats.distribution.count(Grade::F), 1);

        store.sort(SortKey::Percentage, true);
        assert_eq!(codes(&store), vec!["1001", "1002"]);
    }

    #[test]
    fn parse_sort_key() {
        assert_eq!(SortKey::parse("code"), Some(SortKey::Code));
        assert_eq!(SortKey::parse("name"), Some(SortKey::Name));
        assert_eq!(SortKey::parse("percentage"), Some(SortKey::Percentage));
        assert_eq!(SortKey::parse("grade"), None);
    }
}
