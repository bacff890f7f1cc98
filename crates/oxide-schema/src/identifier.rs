//! Table-name derivation and identifier checks.

/// Derives a table name from a fully-qualified Rust type name.
///
/// Generic arguments are stripped, the last `::` segment is kept and
/// lower-cased: `app::models::User` becomes `user`.
#[must_use]
pub fn derive_table_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let segment = base.rsplit("::").next().unwrap_or(base);
    segment.trim().to_lowercase()
}

/// Derives the table name of `T` from its type name.
#[must_use]
pub fn table_name_of<T: ?Sized + 'static>() -> String {
    derive_table_name(std::any::type_name::<T>())
}

/// Checks that `name` can be quoted as a SQL identifier.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("identifier is empty".to_string());
    }
    if name.contains('\0') {
        return Err(format!("identifier '{}' contains a NUL byte", name.escape_debug()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Invoice;
    #[allow(dead_code)]
    struct Wrapper<T>(T);

    #[test]
    fn test_last_segment_lowercased() {
        assert_eq!(derive_table_name("app::models::User"), "user");
        assert_eq!(derive_table_name("User"), "user");
        assert_eq!(derive_table_name("billing::LineItem"), "lineitem");
    }

    #[test]
    fn test_generic_arguments_stripped() {
        assert_eq!(derive_table_name("a::Wrapper<b::Inner>"), "wrapper");
        assert_eq!(table_name_of::<Wrapper<Invoice>>(), "wrapper");
    }

    #[test]
    fn test_derivation_is_stable() {
        assert_eq!(table_name_of::<Invoice>(), "invoice");
        assert_eq!(table_name_of::<Invoice>(), table_name_of::<Invoice>());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("user").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("  ").is_err());
        assert!(validate_identifier("bad\0name").is_err());
    }
}
