//! Line width parsed from free-text comments.

/// Extracts a width from comments such as `"5m wide"` or `"cleared 5-10m"`.
///
/// The number is the last whitespace-separated token before the first `m`.
/// A range `a-b` gives its midpoint. Returns `None` when there is no `m` or
/// the token is not a number.
#[must_use]
pub fn extract_width_from_comments(comments: &str) -> Option<f64> {
    let (before, _) = comments.split_once('m')?;
    let token = before.split_whitespace().last()?;

    match token.split_once('-') {
        Some((a, b)) => {
            let a: f64 = a.parse().ok()?;
            let b: f64 = b.parse().ok()?;
            Some(f64::midpoint(a, b))
        }
        None => token.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_width() {
        assert_eq!(extract_width_from_comments("5m wide guard"), Some(5.0));
        assert_eq!(extract_width_from_comments("approx 7.5 m"), Some(7.5));
    }

    #[test]
    fn range_is_averaged() {
        assert_eq!(extract_width_from_comments("machine line 5-10m"), Some(7.5));
    }

    #[test]
    fn only_the_first_m_counts() {
        // "from" holds the first "m", leaving "fro" as the token.
        assert_eq!(extract_width_from_comments("Trail from 5m"), None);
    }

    #[test]
    fn no_width() {
        assert_eq!(extract_width_from_comments(""), None);
        assert_eq!(extract_width_from_comments("no units here"), None);
        assert_eq!(extract_width_from_comments("m"), None);
        assert_eq!(extract_width_from_comments("-5m"), None);
    }
}
