//! Plain CRUD operations over a `DatabaseConnection`.
//!
//! Each function checks ownership where the operation needs it and maps
//! storage errors into `ServiceError`.

pub mod user_service;
pub mod follow_service;
pub mod post_service;
pub mod comment_service;
pub mod like_service;
pub mod messaging_service;
pub mod listing_service;
pub mod favorite_service;

use sea_orm::sea_query::LikeExpr;

/// Case-insensitive substring match for `q`, with `%`, `_` and `\` taken literally.
/// Compare against a lowercased column.
pub(crate) fn contains_ci(q: &str) -> LikeExpr {
    LikeExpr::new(contains_pattern(q)).escape('\\')
}

fn contains_pattern(q: &str) -> String {
    let mut out = String::with_capacity(q.len() + 2);
    out.push('%');
    for c in q.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
