//! Error taxonomy and small guards shared by every resource repository.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepoError {
    /// The identifier is not a UUID. Nothing was sent to the store.
    #[error(transparent)]
    InvalidId(#[from] uuid::Error),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Uuid },

    /// The store reported success but touched or returned no rows.
    #[error("{op}: store reported success but no rows were affected")]
    ZeroRows { op: &'static str },

    /// Whatever the store reported, unchanged.
    #[error(transparent)]
    Store(#[from] DbErr),
}

impl RepoError {
    /// A write collided with a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Store(e) => matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
            _ => false,
        }
    }
}

/// Parse a client-supplied identifier.
pub fn parse_id(raw: &str) -> Result<Uuid, RepoError> {
    Ok(Uuid::parse_str(raw)?)
}

/// Turn "success with zero affected rows" into [`RepoError::ZeroRows`].
pub fn ensure_affected(op: &'static str, rows_affected: u64) -> Result<u64, RepoError> {
    if rows_affected == 0 {
        return Err(RepoError::ZeroRows { op });
    }
    Ok(rows_affected)
}

/// Turn an empty result set into [`RepoError::ZeroRows`].
pub fn ensure_rows<T>(op: &'static str, rows: Vec<T>) -> Result<Vec<T>, RepoError> {
    if rows.is_empty() {
        return Err(RepoError::ZeroRows { op });
    }
    Ok(rows)
}

const LIKE_ESCAPE: char = '\\';

/// Case-insensitive, literal substring match of `keyword` against `column`.
///
/// `%` and `_` in the keyword match themselves. Both sides are lowercased so
/// backends with case-sensitive `LIKE` behave like those without.
pub fn substring_match<C: ColumnTrait>(column: C, keyword: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_is_passed_through_unchanged() {
        let direct = Uuid::parse_str("not-a-uuid").unwrap_err();
        let err = parse_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, RepoError::InvalidId(_)));
        assert_eq!(err.to_string(), direct.to_string());
    }

    #[test]
    fn zero_rows_guards() {
        assert_eq!(ensure_affected("users.save", 1).unwrap(), 1);
        assert!(matches!(
            ensure_affected("users.save", 0),
            Err(RepoError::ZeroRows { op: "users.save" })
        ));
        assert!(ensure_rows("users.search", vec![1]).is_ok());
        assert!(ensure_rows::<u8>("users.search", vec![]).is_err());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ali"), "ali");
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn store_errors_keep_their_message() {
        let err = RepoError::from(DbErr::Custom("disk full".into()));
        assert_eq!(err.to_string(), DbErr::Custom("disk full".into()).to_string());
        assert!(!err.is_unique_violation());
    }
}
