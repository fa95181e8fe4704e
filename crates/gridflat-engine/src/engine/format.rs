/// Format a number as formula source text.
///
/// Uses the shortest representation that reads back to the same value, so
/// integers print without a fractional part (`5`, not `5.0`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0 into 0.
        "0".to_string()
    } else {
        n.to_string()
    }
}
