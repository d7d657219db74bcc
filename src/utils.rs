//! Utility functions for reporting ratings

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a rating for display (one decimal place)
pub fn display_rating(rating: f64) -> f64 {
    round_to(rating, 1)
}

/// Round a probability for display (four decimal places)
pub fn display_probability(probability: f64) -> f64 {
    round_to(probability, 4)
}
