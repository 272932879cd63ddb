use tracing::{debug, warn};

use crate::models::{SubjectPerformance, SubjectWeight};

/// Total questions in a generated quiz.
pub const TOTAL_QUESTIONS: usize = 25;

/// Additive base so perfect-scoring subjects still receive a nonzero share.
pub const BASE_WEIGHT: f64 = 20.0;

/// Convert a student's per-subject mark history into an integer allocation
/// of the quiz total, weighted toward weak subjects.
///
/// Every subject in the input gets at least one question, and the counts sum
/// to `TOTAL_QUESTIONS` — unless there are more subjects than questions, in
/// which case the per-subject floor wins and the total overshoots (logged).
pub fn plan(subjects: &[SubjectPerformance]) -> Vec<SubjectWeight> {
    if subjects.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = subjects
        .iter()
        .map(|s| (s.total_marks - s.marks_obtained).max(0.0) + BASE_WEIGHT)
        .collect();
    let total_weight: f64 = weights.iter().sum();

    // Proportional floor shares.
    let mut counts: Vec<usize> = weights
        .iter()
        .map(|w| ((w / total_weight) * TOTAL_QUESTIONS as f64).floor() as usize)
        .collect();

    // Minimum representation: every subject with a recorded exam gets a question.
    for count in counts.iter_mut() {
        if *count == 0 {
            *count = 1;
        }
    }

    reconcile(&mut counts, &weights);

    debug!(
        subject_count = subjects.len(),
        distributed = counts.iter().sum::<usize>(),
        "Question distribution planned"
    );

    subjects
        .iter()
        .zip(weights.iter().zip(counts.iter()))
        .map(|(s, (&weight, &count))| SubjectWeight {
            subject: s.subject.clone(),
            weight,
            count,
            marks: s.marks_obtained,
            total: s.total_marks,
        })
        .collect()
}

/// Adjust floored counts so they sum to `TOTAL_QUESTIONS` exactly.
///
/// Deficit goes to the weakest subjects first; surplus comes off the
/// strongest first, never pushing a subject below one question.
fn reconcile(counts: &mut [usize], weights: &[f64]) {
    let distributed: usize = counts.iter().sum();

    if distributed < TOTAL_QUESTIONS {
        // Stable sort: equal weights keep insertion order.
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

        let mut deficit = TOTAL_QUESTIONS - distributed;
        while deficit > 0 {
            for &i in &order {
                if deficit == 0 {
                    break;
                }
                counts[i] += 1;
                deficit -= 1;
            }
        }
    } else if distributed > TOTAL_QUESTIONS {
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| weights[a].total_cmp(&weights[b]));

        let mut surplus = distributed - TOTAL_QUESTIONS;
        while surplus > 0 {
            let mut removed_this_pass = false;
            for &i in &order {
                if surplus == 0 {
                    break;
                }
                if counts[i] > 1 {
                    counts[i] -= 1;
                    surplus -= 1;
                    removed_this_pass = true;
                }
            }
            if !removed_this_pass {
                // Every subject is at the floor of one question. The floor
                // wins over the quiz total; callers see more questions.
                warn!(
                    surplus,
                    subject_count = counts.len(),
                    "More subjects than quiz slots; keeping one question per subject"
                );
                break;
            }
        }
    }
}

/// Human-readable distribution block embedded verbatim into the generation
/// prompt, one line per subject.
pub fn render_distribution(weights: &[SubjectWeight]) -> String {
    weights
        .iter()
        .map(|w| {
            format!(
                "- {}: {} questions (Marks: {}/{})",
                w.subject, w.count, w.marks, w.total
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
