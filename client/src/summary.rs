//! Results screen helpers.

/// Whole-number percentage, rounded half away from zero. Zero when there were no questions.
pub fn percentage(score: u32, total_questions: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    (f64::from(score) * 100.0 / f64::from(total_questions)).round() as u32
}

pub fn performance_feedback(percentage: u32) -> &'static str {
    match percentage {
        90.. => "¡Excelente! You are a true Colombia expert! Your knowledge is impressive.",
        75..=89 => "Great job! You have solid knowledge about Colombia's culture and geography.",
        60..=74 => "Good work! You know quite a bit about Colombia. Keep learning!",
        _ => "Nice try! Colombia is fascinating - there's always more to discover!",
    }
}

pub fn share_text(score: u32, total_questions: u32) -> String {
    format!(
        "I just scored {}/{} ({}%) on the Discover Colombia Quiz! 🇨🇴 Test your knowledge too!",
        score,
        total_questions,
        percentage(score, total_questions)
    )
}
