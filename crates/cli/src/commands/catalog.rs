//! Product catalog file.
//!
//! The catalog is a JSON array of `{id, name, price}` entries, one per
//! "add to cart" control on the site.

use std::io::Write;
use std::path::Path;

use alyssa_loops_core::catalog::Catalog;
use alyssa_loops_core::types::price::format_whole_dollars;

use super::CommandError;

/// Load the catalog at `path`.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a valid catalog.
pub fn load(path: &Path) -> Result<Catalog, CommandError> {
    let file_error = |message: String| CommandError::CatalogFile {
        path: path.to_path_buf(),
        message,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    let catalog = Catalog::from_json(&raw).map_err(|e| file_error(e.to_string()))?;
    tracing::debug!(path = %path.display(), products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Print every product.
///
/// # Errors
///
/// Returns error if output cannot be written.
pub fn list<W: Write>(catalog: &Catalog, out: &mut W) -> Result<(), CommandError> {
    if catalog.is_empty() {
        writeln!(out, "The catalog is empty.")?;
    }
    for product in catalog.products() {
        writeln!(
            out,
            "{}  {}  {}",
            product.id,
            product.name,
            format_whole_dollars(product.price.amount())
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": "bunny", "name": "Crochet Bunny", "price": 25},
                {"id": "bee", "name": "Bumble Bee Keychain", "price": 7}]"#,
        )
        .unwrap();

        let catalog = load(&path).unwrap();
        let mut out = Vec::new();
        list(&catalog, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "bunny  Crochet Bunny  $25\nbee  Bumble Bee Keychain  $7\n"
        );
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "name": "A", "price": 1}, {"id": "a", "name": "B", "price": 2}]"#,
        )
        .unwrap();

        assert!(matches!(load(&path), Err(CommandError::CatalogFile { .. })));
    }
}
