use crate::calc::{COURSEWORK_MAX, EXAM_MAX};
use crate::student::Student;
use thiserror::Error;

pub const CODE_MIN: i64 = 1000;
pub const CODE_MAX: i64 = 9999;

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct StudentInput {
    pub code: String,
    pub name: String,
    pub cw1: String,
    pub cw2: String,
    pub cw3: String,
    pub exam: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Code and Name are required.")]
    Required,

    #[error("Code must be a number between 1000 and 9999.")]
    CodeRange,

    #[error("Marks must be numeric integers.")]
    NotInteger,

    #[error("Coursework marks must be between 0 and 20.")]
    CourseworkRange,

    #[error("Exam mark must be between 0 and 100.")]
    ExamRange,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required => "required",
            ValidationError::CodeRange => "code",
            ValidationError::NotInteger => "marks",
            ValidationError::CourseworkRange => "coursework",
            ValidationError::ExamRange => "exam",
        }
    }
}

impl StudentInput {
    /// Checks run in the same order the entry form reports them; the first
    /// failure wins.
    pub fn validate(&self) -> Result<Student, ValidationError> {
        let code = self.code.trim();
        let name = self.name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(ValidationError::Required);
        }

        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::CodeRange);
        }
        match code.parse::<i64>() {
            Ok(n) if (CODE_MIN..=CODE_MAX).contains(&n) => {}
            _ => return Err(ValidationError::CodeRange),
        }

        let mark = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::NotInteger)
        };
        let cw1 = mark(&self.cw1)?;
        let cw2 = mark(&self.cw2)?;
        let cw3 = mark(&self.cw3)?;
        let exam = mark(&self.exam)?;

        if [cw1, cw2, cw3]
            .iter()
            .any(|v| !(0..=COURSEWORK_MAX).contains(v))
        {
            return Err(ValidationError::CourseworkRange);
        }
        if !(0..=EXAM_MAX).contains(&exam) {
            return Err(ValidationError::ExamRange);
        }

        Ok(Student::new(code, name, cw1, cw2, cw3, exam))
    }
}
