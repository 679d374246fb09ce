use serde::Serialize;
use std::fmt;

pub const COURSEWORK_COUNT: usize = 3;
pub const COURSEWORK_MAX: i64 = 20;
pub const EXAM_MAX: i64 = 100;
/// 3 x 20 coursework + 100 exam.
pub const TOTAL_MAX: i64 = COURSEWORK_COUNT as i64 * COURSEWORK_MAX + EXAM_MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn letter(self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
            Grade::F => 'F',
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Percentage of the fixed 160-mark maximum.
///
/// Multiplies before dividing so integer totals on a grade boundary
/// (112, 96, 80, 64) land exactly on 70/60/50/40.
pub fn percent_of_total(total_overall: i64) -> f64 {
    (total_overall as f64) * 100.0 / (TOTAL_MAX as f64)
}

pub fn grade_for_percent(p: f64) -> Grade {
    if p >= 70.0 {
        Grade::A
    } else if p >= 60.0 {
        Grade::B
    } else if p >= 50.0 {
        Grade::C
    } else if p >= 40.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Arithmetic mean; 0 for an empty input.
pub fn mean_percent<I>(percents: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut n: usize = 0;
    let mut sum = 0.0;
    for p in percents {
        n += 1;
        sum += p;
    }
    if n > 0 {
        sum / (n as f64)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "B")]
    pub b: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "D")]
    pub d: usize,
    #[serde(rename = "F")]
    pub f: usize,
}

impl GradeDistribution {
    pub fn from_grades<I>(grades: I) -> Self
    where
        I: IntoIterator<Item = Grade>,
    {
        let mut out = Self::default();
        for g in grades {
            *out.slot_mut(g) += 1;
        }
        out
    }

    #[cfg(test)]
    pub fn count(&self, grade: Grade) -> usize {
        match grade {
            Grade::A => self.a,
            Grade::B => self.b,
            Grade::C => self.c,
            Grade::D => self.d,
            Grade::F => self.f,
        }
    }

    fn slot_mut(&mut self, grade: Grade) -> &mut usize {
        match grade {
            Grade::A => &mut self.a,
            Grade::B => &mut self.b,
            Grade::C => &mut self.c,
            Grade::D => &mut self.d,
            Grade::F => &mut self.f,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub count: usize,
    pub average_percentage: f64,
    pub distribution: GradeDistribution,
}

impl ClassStats {
    pub fn from_percents<I>(percents: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let percents: Vec<f64> = percents.into_iter().collect();
        ClassStats {
            count: percents.len(),
            average_percentage: mean_percent(percents.iter().copied()),
            distribution: GradeDistribution::from_grades(
                percents.iter().copied().map(grade_for_percent),
            ),
        }
    }
}
