use crate::calc::{self, Grade, COURSEWORK_COUNT};
use serde::Serialize;
use std::fmt;

/// One student's marks. Fields are fixed at construction; an update builds a
/// new record and the owning store swaps it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    code: String,
    name: String,
    coursework: [i64; COURSEWORK_COUNT],
    exam: i64,
}

impl Student {
    pub fn new(code: &str, name: &str, cw1: i64, cw2: i64, cw3: i64, exam: i64) -> Self {
        Student {
            code: code.trim().to_string(),
            name: name.trim().to_string(),
            coursework: [cw1, cw2, cw3],
            exam,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coursework(&self) -> [i64; COURSEWORK_COUNT] {
        self.coursework
    }

    pub fn exam(&self) -> i64 {
        self.exam
    }

    pub fn total_coursework(&self) -> i64 {
        self.coursework
            .iter()
            .fold(0i64, |acc, &v| acc.saturating_add(v))
    }

    pub fn total_overall(&self) -> i64 {
        self.total_coursework().saturating_add(self.exam)
    }

    pub fn percentage(&self) -> f64 {
        calc::percent_of_total(self.total_overall())
    }

    pub fn grade(&self) -> Grade {
        calc::grade_for_percent(self.percentage())
    }

    /// `code,name,cw1,cw2,cw3,exam` plus a trailing newline.
    ///
    /// Commas inside `name` are written as-is and will not survive a reload.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}\n",
            self.code,
            self.name,
            self.coursework[0],
            self.coursework[1],
            self.coursework[2],
            self.exam
        )
    }

    /// Parses one data line. `None` unless the line has exactly six fields and
    /// the four mark fields are integers that fit in an `i32`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.trim().split(',').collect();
        if parts.len() != 6 {
            return None;
        }
        let mark = |s: &str| s.trim().parse::<i32>().ok().map(i64::from);
        Some(Student::new(
            parts[0],
            parts[1],
            mark(parts[2])?,
            mark(parts[3])?,
            mark(parts[4])?,
            mark(parts[5])?,
        ))
    }

    pub fn view(&self) -> StudentView {
        StudentView {
            code: self.code.clone(),
            name: self.name.clone(),
            coursework: self.coursework(),
            exam: self.exam(),
            total_coursework: self.total_coursework(),
            total_overall: self.total_overall(),
            percentage: self.percentage(),
            grade: self.grade(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Row shape handed to the UI: stored fields plus every derived metric.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub code: String,
    pub name: String,
    pub coursework: [i64; COURSEWORK_COUNT],
    pub exam: i64,
    pub total_coursework: i64,
    pub total_overall: i64,
    pub percentage: f64,
    pub grade: Grade,
}
