//! Classify raw executor diagnostics into user-facing failure messages.
//!
//! The engine reports failures as free-form text; this maps them onto a fixed
//! set of messages by substring match. Priority order matters: the first
//! matching pattern wins.

/// Map a raw failure diagnostic to a user-facing message.
/// `None` or an empty diagnostic maps to the unknown-error message.
pub fn classify_failure(raw: Option<&str>) -> &'static str {
    let Some(msg) = raw else {
        return "Unknown error occurred.";
    };
    if msg.is_empty() {
        return "Unknown error occurred.";
    }
    if msg.to_ascii_lowercase().contains("canceled") {
        return "Canceled by user.";
    }
    if msg.contains("Private video") {
        return "This video is private.";
    }
    if msg.contains("unavailable") {
        return "Media is unavailable or has been removed.";
    }
    if msg.contains("Sign in") {
        return "This content requires login to access.";
    }
    if msg.contains("ETIMEDOUT") {
        return "Connection timed out. Check your internet.";
    }
    if msg.contains("ENOTFOUND") {
        return "Network error. Check your internet connection.";
    }
    if msg.contains("Unsupported URL") {
        return "This URL or site is not supported.";
    }
    if msg.contains("timed out") {
        return "Download timed out. Please try again.";
    }
    if msg.contains("429") {
        return "Too many requests. Please wait and try again.";
    }
    "Download failed. The media may be unavailable."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_signal_is_unknown() {
        assert_eq!(classify_failure(None), "Unknown error occurred.");
        assert_eq!(classify_failure(Some("")), "Unknown error occurred.");
    }

    #[test]
    fn each_category_matches() {
        assert_eq!(classify_failure(Some("transfer canceled")), "Canceled by user.");
        assert_eq!(
            classify_failure(Some("ERROR: Private video")),
            "This video is private."
        );
        assert_eq!(
            classify_failure(Some("This video is unavailable")),
            "Media is unavailable or has been removed."
        );
        assert_eq!(
            classify_failure(Some("Sign in to confirm your age")),
            "This content requires login to access."
        );
        assert_eq!(
            classify_failure(Some("connect ETIMEDOUT 1.2.3.4:443")),
            "Connection timed out. Check your internet."
        );
        assert_eq!(
            classify_failure(Some("getaddrinfo ENOTFOUND example.com")),
            "Network error. Check your internet connection."
        );
        assert_eq!(
            classify_failure(Some("ERROR: Unsupported URL: ftp://x")),
            "This URL or site is not supported."
        );
        assert_eq!(
            classify_failure(Some("operation timed out")),
            "Download timed out. Please try again."
        );
        assert_eq!(
            classify_failure(Some("HTTP Error 429")),
            "Too many requests. Please wait and try again."
        );
        assert_eq!(
            classify_failure(Some("exit code 1")),
            "Download failed. The media may be unavailable."
        );
    }

    #[test]
    fn first_match_wins() {
        // cancellation marker outranks everything
        assert_eq!(
            classify_failure(Some("canceled after HTTP Error 429")),
            "Canceled by user."
        );
        // operation-timeout outranks rate limiting
        assert_eq!(
            classify_failure(Some("request timed out with status 429")),
            "Download timed out. Please try again."
        );
    }
}
