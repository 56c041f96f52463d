use serde::Serialize;

use crate::model::Grade;

/// One-decimal rounding used for every displayed average:
/// `floor(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn percent(g: &Grade) -> Option<f64> {
    if g.max_score > 0.0 {
        Some(100.0 * g.score / g.max_score)
    } else {
        None
    }
}

fn mean_percent<'a, I>(grades: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Grade>,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for g in grades {
        if let Some(p) = percent(g) {
            sum += p;
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some(round_off_1_decimal(sum / n as f64))
    }
}

/// Mean percentage across all grades, to one decimal. None when there is
/// nothing to average.
pub fn overall_average(grades: &[Grade]) -> Option<f64> {
    mean_percent(grades)
}

pub fn subject_average(grades: &[Grade], subject: &str) -> Option<f64> {
    mean_percent(grades.iter().filter(|g| g.subject == subject))
}

/// Distinct subjects in first-seen order, for the per-subject breakdown.
pub fn subjects(grades: &[Grade]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for g in grades {
        if !out.iter().any(|s| s == &g.subject) {
            out.push(g.subject.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
}

/// Letter band for a percentage, used to group rows for display.
pub fn letter_band(percent: f64) -> &'static str {
    if percent >= 90.0 {
        "A"
    } else if percent >= 80.0 {
        "B"
    } else if percent >= 70.0 {
        "C"
    } else if percent >= 60.0 {
        "D"
    } else {
        "F"
    }
}

/// Count of grades per letter band; zero-max rows carry no percentage and
/// are left out.
pub fn band_counts(grades: &[Grade]) -> Vec<(&'static str, usize)> {
    let mut counts = [("A", 0usize), ("B", 0), ("C", 0), ("D", 0), ("F", 0)];
    for g in grades {
        if let Some(p) = percent(g) {
            let band = letter_band(p);
            if let Some(slot) = counts.iter_mut().find(|(b, _)| *b == band) {
                slot.1 += 1;
            }
        }
    }
    counts.into_iter().filter(|(_, n)| *n > 0).collect()
}

/// Per-subject percentage averages over the collection.
pub fn subject_averages(grades: &[Grade]) -> Vec<SubjectAverage> {
    subjects(grades)
        .into_iter()
        .filter_map(|subject| {
            subject_average(grades, &subject).map(|average| SubjectAverage { subject, average })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(id: i64, subject: &str, score: f64, max: f64) -> Grade {
        Grade {
            id,
            student_id: 1,
            student_name: "Test Student".to_string(),
            subject: subject.to_string(),
            assessment: "Quiz".to_string(),
            grade: "B".to_string(),
            score,
            max_score: max,
            date: "2025-03-01".to_string(),
            teacher: String::new(),
        }
    }

    #[test]
    fn rounding_matches_display_convention() {
        assert_eq!(round_off_1_decimal(87.25), 87.3);
        assert_eq!(round_off_1_decimal(87.24), 87.2);
        assert_eq!(round_off_1_decimal(100.0), 100.0);
    }

    #[test]
    fn overall_average_is_mean_of_percentages() {
        let grades = vec![grade(1, "Maths", 80.0, 100.0), grade(2, "Physics", 45.0, 50.0)];
        // (80 + 90) / 2
        assert_eq!(overall_average(&grades), Some(85.0));
        assert_eq!(overall_average(&[]), None);
    }

    #[test]
    fn subject_average_ignores_other_subjects_and_zero_max() {
        let grades = vec![
            grade(1, "Maths", 80.0, 100.0),
            grade(2, "Maths", 70.0, 100.0),
            grade(3, "Physics", 50.0, 50.0),
            grade(4, "Maths", 10.0, 0.0),
        ];
        assert_eq!(subject_average(&grades, "Maths"), Some(75.0));
        assert_eq!(subject_average(&grades, "Biology"), None);
        let per = subject_averages(&grades);
        assert_eq!(per.len(), 2);
        assert_eq!(per[0].subject, "Maths");
        assert_eq!(per[1].average, 100.0);
    }

    #[test]
    fn letter_bands_group_at_decade_boundaries() {
        assert_eq!(letter_band(90.0), "A");
        assert_eq!(letter_band(89.9), "B");
        assert_eq!(letter_band(70.0), "C");
        assert_eq!(letter_band(64.5), "D");
        assert_eq!(letter_band(12.0), "F");

        let grades = vec![
            grade(1, "Maths", 95.0, 100.0),
            grade(2, "Maths", 72.0, 100.0),
            grade(3, "Physics", 71.0, 100.0),
            grade(4, "Maths", 10.0, 0.0),
        ];
        assert_eq!(band_counts(&grades), vec![("A", 1), ("C", 2)]);
    }
}
