use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Error;
use crate::value::{Bindings, Param, Params};

/// Quoted strings, quoted identifiers and comments are matched so they pass through
/// untouched; only the last branch, `:name`, captures a placeholder.
const PLACEHOLDER: &str = concat!(
    r"'(?:[^'\\]|\\(?s:.)|'')*'",
    r#"|"(?:[^"\\]|\\(?s:.)|"")*""#,
    r"|`(?:[^`]|``)*`",
    r"|--[^\n]*",
    r"|/\*(?s:.*?)\*/",
    r"|::",
    r"|:([a-zA-Z0-9_]+)",
);

static PLACEHOLDER_REGEX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(PLACEHOLDER));

fn placeholder_regex() -> crate::Result<&'static Regex> {
    PLACEHOLDER_REGEX.as_ref().map_err(|e| Error::Parse(e.clone()))
}

/// Rewrites every placeholder through `rewrite`, which receives the name without the `:`.
fn replace_placeholders(template: &str, mut rewrite: impl FnMut(&str) -> String) -> crate::Result<String> {
    let replaced = placeholder_regex()?.replace_all(template, |caps: &Captures| match caps.get(1) {
        Some(name) => rewrite(name.as_str()),
        None => caps[0].to_owned(),
    });
    Ok(replaced.into_owned())
}

/// A query whose list parameters have been expanded into scalar placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedQuery {
    pub sql: String,
    pub bind: Bindings,
}

/// Converts named placeholders (`:name`) to positional placeholders (`?`).
///
/// # Examples
///
/// ```
/// use sqlx_pdo_driver::builder::build_query;
///
/// let sql = build_query("SELECT * FROM users WHERE id = :id AND name = :name")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name = ?");
/// # Ok::<(), sqlx_pdo_driver::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<String> {
    replace_placeholders(template, |_| "?".to_owned())
}

/// Placeholder names in the order they appear, repeats included, without the `:`.
pub fn placeholder_order(template: &str) -> crate::Result<Vec<String>> {
    let order = placeholder_regex()?
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_owned())
        .collect();
    Ok(order)
}

/// Expands list parameters into comma-separated scalar placeholders.
///
/// Each list bound under `name` replaces every `:name` token with
/// `:name_0, :name_1, ...` and binds `name_i` to the i-th element. Scalars pass through.
/// Only whole tokens are rewritten, so `:id` never touches `:id_type`. Text inside quotes
/// and comments is never treated as a placeholder.
///
/// # Errors
///
/// Returns [`Error::EmptyListBind`] when a list has no elements, and
/// [`Error::DuplicateBind`] when an expanded name is already bound as a scalar.
///
/// # Examples
///
/// ```
/// use sqlx_pdo_driver::{prepare_bind, Params, Value};
///
/// let params = Params::new().bind_list("ids", [4, 8]).bind("status", "active");
/// let query = prepare_bind("SELECT * FROM users WHERE id IN (:ids) AND status = :status", &params)?;
///
/// assert_eq!(query.sql, "SELECT * FROM users WHERE id IN (:ids_0, :ids_1) AND status = :status");
/// assert_eq!(query.bind.get("ids_1"), Some(&Value::Int(8)));
/// assert!(!query.bind.contains_key("ids"));
/// # Ok::<(), sqlx_pdo_driver::Error>(())
/// ```
pub fn prepare_bind(sql: &str, bind: &Params) -> crate::Result<ExpandedQuery> {
    if let Some((name, _)) = bind
        .iter()
        .find(|(_, param)| matches!(param, Param::List(values) if values.is_empty()))
    {
        return Err(Error::EmptyListBind {
            name: name.clone(),
            sql: sql.to_owned(),
            bind: bind.clone(),
        });
    }

    let expanded_sql = replace_placeholders(sql, |name| match bind.get(name) {
        Some(Param::List(values)) => (0..values.len())
            .map(|i| format!(":{name}_{i}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => format!(":{name}"),
    })?;

    let mut expanded = Bindings::new();
    for (name, param) in bind.iter() {
        match param {
            Param::Value(value) => insert_unique(&mut expanded, name.clone(), value.clone())?,
            Param::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    insert_unique(&mut expanded, format!("{name}_{i}"), value.clone())?;
                }
            }
        }
    }

    Ok(ExpandedQuery {
        sql: expanded_sql,
        bind: expanded,
    })
}

fn insert_unique(bindings: &mut Bindings, name: String, value: crate::Value) -> crate::Result<()> {
    if bindings.contains_key(&name) {
        return Err(Error::DuplicateBind(name));
    }
    bindings.insert(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_build_query_single_param() {
        let result = build_query("SELECT * FROM users WHERE id = :id").unwrap();
        assert_eq!(result, "SELECT * FROM users WHERE id = ?");
    }

    #[test]
    fn test_build_query_repeated_params() {
        let result = build_query("SELECT * FROM users WHERE id = :id OR user_id = :id").unwrap();
        assert_eq!(result, "SELECT * FROM users WHERE id = ? OR user_id = ?");
    }

    #[test]
    fn test_build_query_no_params() {
        let result = build_query("SELECT * FROM users").unwrap();
        assert_eq!(result, "SELECT * FROM users");
    }

    #[test]
    fn test_build_query_skips_quoted_literals() {
        let result = build_query(
            "INSERT INTO ev (at, note, `a:b`) VALUES ('2024-01-01 10:30:00', \"x:y\", :note)",
        )
        .unwrap();
        assert_eq!(
            result,
            "INSERT INTO ev (at, note, `a:b`) VALUES ('2024-01-01 10:30:00', \"x:y\", ?)"
        );
    }

    #[test]
    fn test_build_query_skips_escaped_quotes_and_comments() {
        let sql = "SELECT 'it''s :a', 'back\\' :b' -- trailing :c\n FROM t /* :d */ WHERE x = :e";
        assert_eq!(
            build_query(sql).unwrap(),
            "SELECT 'it''s :a', 'back\\' :b' -- trailing :c\n FROM t /* :d */ WHERE x = ?"
        );
        assert_eq!(placeholder_order(sql).unwrap(), vec!["e"]);
    }

    #[test]
    fn test_placeholder_order_ignores_literals() {
        let order = placeholder_order("SELECT * FROM ev WHERE at > '10:30' AND id = :id AND tag = ':tag'").unwrap();
        assert_eq!(order, vec!["id"]);
    }

    #[test]
    fn test_placeholder_order_keeps_repeats() {
        let order = placeholder_order("SELECT * FROM users WHERE id = :id OR parent_id = :id AND name = :name").unwrap();
        assert_eq!(order, vec!["id", "id", "name"]);
    }

    #[test]
    fn test_prepare_bind_expands_list() {
        let params = Params::new().bind_list("ids", [1, 2, 3]);
        let query = prepare_bind("SELECT * FROM users WHERE id IN (:ids)", &params).unwrap();

        assert_eq!(query.sql, "SELECT * FROM users WHERE id IN (:ids_0, :ids_1, :ids_2)");
        assert_eq!(query.bind.len(), 3);
        assert_eq!(query.bind["ids_0"], Value::Int(1));
        assert_eq!(query.bind["ids_2"], Value::Int(3));
    }

    #[test]
    fn test_prepare_bind_scalars_pass_through() {
        let params = Params::new().bind("id", 7).bind("name", "Alice");
        let query = prepare_bind("SELECT * FROM users WHERE id = :id AND name = :name", &params).unwrap();

        assert_eq!(query.sql, "SELECT * FROM users WHERE id = :id AND name = :name");
        assert_eq!(query.bind["id"], Value::Int(7));
        assert_eq!(query.bind["name"], Value::from("Alice"));
    }

    #[test]
    fn test_prepare_bind_empty_list_fails() {
        let params = Params::new().bind("status", 1).bind_list("ids", Vec::<i64>::new());
        let err = prepare_bind("SELECT * FROM users WHERE id IN (:ids)", &params).unwrap_err();

        match err {
            Error::EmptyListBind { name, sql, bind } => {
                assert_eq!(name, "ids");
                assert_eq!(sql, "SELECT * FROM users WHERE id IN (:ids)");
                assert_eq!(bind, params);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_bind_matches_whole_tokens_only() {
        let params = Params::new().bind_list("id", [1, 2]).bind("id_type", "user");
        let query = prepare_bind(
            "SELECT * FROM refs WHERE id IN (:id) AND id_type = :id_type",
            &params,
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM refs WHERE id IN (:id_0, :id_1) AND id_type = :id_type"
        );
        assert_eq!(query.bind["id_type"], Value::from("user"));
    }

    #[test]
    fn test_prepare_bind_repeated_list_placeholder() {
        let params = Params::new().bind_list("ids", [5, 6]);
        let query = prepare_bind("SELECT * FROM a WHERE x IN (:ids) OR y IN (:ids)", &params).unwrap();

        assert_eq!(query.sql, "SELECT * FROM a WHERE x IN (:ids_0, :ids_1) OR y IN (:ids_0, :ids_1)");
        assert_eq!(query.bind.len(), 2);
    }

    #[test]
    fn test_prepare_bind_leaves_literals_alone() {
        let params = Params::new().bind_list("ids", [1, 2]);
        let query = prepare_bind("SELECT * FROM a WHERE note = ':ids' AND id IN (:ids)", &params).unwrap();

        assert_eq!(query.sql, "SELECT * FROM a WHERE note = ':ids' AND id IN (:ids_0, :ids_1)");
    }

    #[test]
    fn test_prepare_bind_detects_collision() {
        let params = Params::new().bind_list("ids", [1, 2]).bind("ids_1", 9);
        let err = prepare_bind("SELECT * FROM a WHERE x IN (:ids) OR y = :ids_1", &params).unwrap_err();

        assert!(matches!(err, Error::DuplicateBind(name) if name == "ids_1"));
    }
}
