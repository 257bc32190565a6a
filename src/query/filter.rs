use crate::errors::QueryError;
use bson::{Bson, Document as BsonDocument};
use regex::Regex;

use super::mapper::FieldRef;
use super::{MAX_IN_SET, MAX_PATTERN_LEN};

/// Leaf operator vocabulary of the canonical predicate, each variant
/// carrying its typed operand. `regex` and `glob` literals are compiled to
/// matcher-ready patterns here, once, at filter-compile time.
#[derive(Debug, Clone)]
pub enum Operator {
    Eq(Bson),
    Ne(Bson),
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    Regex(Regex),
    Glob(Regex),
}

/// Canonical predicate tree. Nested field documents are flattened into
/// dotted leaf paths; sibling keys at any level combine under `And`.
#[derive(Debug, Clone)]
pub enum Predicate {
    And(Vec<Predicate>),
    Leaf { field: FieldRef, op: Operator },
    ElemMatch { field: FieldRef, inner: Box<Predicate> },
}

impl Predicate {
    /// The empty filter: matches everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::And(Vec::new())
    }
}

const OPERATOR_KEYS: &[&str] =
    &["eq", "ne", "in", "nin", "gt", "gte", "lt", "lte", "regex", "glob", "elemMatch"];

#[must_use]
pub fn is_operator_key(key: &str) -> bool {
    OPERATOR_KEYS.contains(&key)
}

/// Compiles a nested filter document into one canonical predicate; the top
/// level is an implicit conjunction over all keys.
///
/// # Errors
/// Fails only on a malformed `regex`/`glob` literal or a malformed operator
/// operand. These are configuration errors and are never swallowed.
pub fn compile_filter(filter: &BsonDocument) -> Result<Predicate, QueryError> {
    let mut preds = Vec::new();
    for (key, value) in filter {
        if is_operator_key(key) {
            return Err(QueryError::MalformedFilter(format!(
                "operator `{key}` at top level has no field"
            )));
        }
        compile_field(key, value, &mut preds)?;
    }
    Ok(Predicate::And(preds))
}

fn compile_field(path: &str, value: &Bson, out: &mut Vec<Predicate>) -> Result<(), QueryError> {
    let Bson::Document(doc) = value else {
        // shorthand: a bare literal under a field key is equality
        out.push(Predicate::Leaf { field: FieldRef::body(path), op: Operator::Eq(value.clone()) });
        return Ok(());
    };
    // an empty document would constrain nothing; refuse rather than
    // silently matching everything
    if doc.is_empty() {
        return Err(QueryError::MalformedFilter(format!("empty document under `{path}`")));
    }
    for (key, v) in doc {
        if key == "elemMatch" {
            let Bson::Document(inner) = v else {
                return Err(QueryError::MalformedFilter(format!(
                    "elemMatch at `{path}` requires a document"
                )));
            };
            out.push(Predicate::ElemMatch {
                field: FieldRef::body(path),
                inner: Box::new(compile_filter(inner)?),
            });
        } else if is_operator_key(key) {
            out.push(Predicate::Leaf {
                field: FieldRef::body(path),
                op: compile_operator(path, key, v)?,
            });
        } else {
            compile_field(&format!("{path}.{key}"), v, out)?;
        }
    }
    Ok(())
}

fn compile_operator(path: &str, key: &str, value: &Bson) -> Result<Operator, QueryError> {
    Ok(match key {
        "eq" => Operator::Eq(value.clone()),
        "ne" => Operator::Ne(value.clone()),
        "gt" => Operator::Gt(value.clone()),
        "gte" => Operator::Gte(value.clone()),
        "lt" => Operator::Lt(value.clone()),
        "lte" => Operator::Lte(value.clone()),
        "in" | "nin" => {
            let Bson::Array(vals) = value else {
                return Err(QueryError::MalformedFilter(format!(
                    "`{key}` at `{path}` requires an array"
                )));
            };
            let vals: Vec<Bson> = vals.iter().take(MAX_IN_SET).cloned().collect();
            if key == "in" { Operator::In(vals) } else { Operator::Nin(vals) }
        }
        "regex" => Operator::Regex(compile_pattern(path, "regex", value, |p| p.to_string())?),
        "glob" => Operator::Glob(compile_pattern(path, "glob", value, glob_to_regex)?),
        other => {
            return Err(QueryError::MalformedFilter(format!("unknown operator `{other}` at `{path}`")));
        }
    })
}

fn compile_pattern(
    path: &str,
    operator: &'static str,
    value: &Bson,
    translate: impl Fn(&str) -> String,
) -> Result<Regex, QueryError> {
    let Bson::String(pattern) = value else {
        return Err(QueryError::MalformedFilter(format!(
            "`{operator}` at `{path}` requires a string literal"
        )));
    };
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(QueryError::MalformedFilter(format!(
            "`{operator}` pattern at `{path}` exceeds {MAX_PATTERN_LEN} bytes"
        )));
    }
    Regex::new(&translate(pattern)).map_err(|source| QueryError::BadPattern { operator, source })
}

/// Glob to anchored regex: `*` spans any run, `?` one character, the rest
/// matches literally.
fn glob_to_regex(glob: &str) -> String {
    let mut re = String::with_capacity(glob.len() + 8);
    re.push('^');
    for c in glob.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');
    re
}

/// # Errors
/// Returns an error if the JSON string is not a valid filter document.
pub fn parse_filter_json(json: &str) -> Result<BsonDocument, QueryError> {
    Ok(serde_json::from_str(json)?)
}
