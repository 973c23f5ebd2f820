//! Page/limit clamping shared by paginated list endpoints.

/// Clamp a user-provided page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Number of pages needed to show `total` items at `limit` per page.
///
/// Zero items yield zero pages, matching `Math.ceil(0 / limit)`.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}
