//! Filter evaluation for the in-memory store.
//!
//! Implements the subset of the document store's query language the catalog
//! relies on:
//! - implicit equality on dotted paths (array fields match on any element)
//! - comparison operators: `$eq $ne $gt $gte $lt $lte $in $nin $exists`
//! - logical operators: `$and $or $nor`
//!
//! Values are ordered the way the store orders them: missing/null first,
//! then numbers, strings, documents, arrays, binary, object ids, booleans,
//! dates. Range operators only compare values inside the same bracket.

use std::cmp::Ordering;

use bson::{Bson, Document};
use rayon::prelude::*;

use crate::error::{Result, StoreError};

// =============================================================================
// Paths
// =============================================================================

/// Look up a (possibly dotted) path inside a document.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = doc.get(first)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            Bson::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a (possibly dotted) path, creating intermediate documents as needed.
pub fn set_path(doc: &mut Document, path: &str, value: Bson) -> Result<()> {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !doc.contains_key(head) {
                doc.insert(head, Document::new());
            }
            match doc.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(StoreError::InvalidQuery(format!(
                    "cannot create field '{rest}' inside non-document '{head}'"
                ))),
            }
        }
    }
}

/// Remove a (possibly dotted) path, returning the removed value.
pub fn remove_path(doc: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head) {
            Some(Bson::Document(inner)) => remove_path(inner, rest),
            _ => None,
        },
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Position of a value's type in the store's cross-type sort order.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        Some(Bson::MinKey) => 0,
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 2,
        Some(Bson::String(_) | Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::RegularExpression(_)) => 11,
        Some(Bson::MaxKey) => 13,
        Some(_) => 12,
    }
}

/// Numeric view of a value, if it is a number.
pub fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn as_str(value: &Bson) -> Option<&str> {
    match value {
        Bson::String(s) => Some(s),
        Bson::Symbol(s) => Some(s),
        _ => None,
    }
}

/// Total order over values, treating a missing field as null.
pub fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };
    match rank_a {
        2 => {
            let (x, y) = (as_f64(a).unwrap_or(0.0), as_f64(b).unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        3 => as_str(a).cmp(&as_str(b)),
        4 => match (a, b) {
            (Bson::Document(x), Bson::Document(y)) => compare_documents(x, y),
            _ => Ordering::Equal,
        },
        5 => match (a, b) {
            (Bson::Array(x), Bson::Array(y)) => {
                for (left, right) in x.iter().zip(y.iter()) {
                    let ord = compare_values(Some(left), Some(right));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                x.len().cmp(&y.len())
            }
            _ => Ordering::Equal,
        },
        _ => match (a, b) {
            (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
            (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
            (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
            (Bson::Timestamp(x), Bson::Timestamp(y)) => {
                (x.time, x.increment).cmp(&(y.time, y.increment))
            }
            _ => Ordering::Equal,
        },
    }
}

fn compare_documents(a: &Document, b: &Document) -> Ordering {
    for ((key_a, val_a), (key_b, val_b)) in a.iter().zip(b.iter()) {
        let ord = compare_values(Some(val_a), Some(val_b)).then_with(|| key_a.cmp(key_b));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Equality as the store sees it: `1`, `1i64` and `1.0` are all equal.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    let rank = type_rank(Some(a));
    if rank != type_rank(Some(b)) {
        return false;
    }
    match rank {
        2..=5 | 7..=10 => compare_values(Some(a), Some(b)) == Ordering::Equal,
        _ => a == b,
    }
}

/// Truthiness of an operand (`$exists`, projection flags).
pub fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null | Bson::Undefined => false,
        other => as_f64(other).map(|n| n != 0.0).unwrap_or(true),
    }
}

// =============================================================================
// Matching
// =============================================================================

/// Does `doc` satisfy `filter`?
pub fn matches(doc: &Document, filter: &Document) -> Result<bool> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for clause in clauses(key, condition)? {
                    if matches(doc, clause)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            op if op.starts_with('$') => {
                return Err(StoreError::UnsupportedOperator(op.to_string()));
            }
            path => field_matches(get_path(doc, path), condition)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keep the documents that satisfy `filter`, preserving their order.
///
/// Evaluation is spread across the rayon thread pool; the filter is applied
/// to every document so an unsupported operator is reported even when an
/// early document would have short-circuited.
pub fn filter_documents(docs: Vec<Document>, filter: &Document) -> Result<Vec<Document>> {
    if filter.is_empty() {
        return Ok(docs);
    }
    let verdicts: Vec<bool> = docs
        .par_iter()
        .map(|doc| matches(doc, filter))
        .collect::<Result<Vec<bool>>>()?;

    Ok(docs
        .into_iter()
        .zip(verdicts)
        .filter_map(|(doc, keep)| keep.then_some(doc))
        .collect())
}

fn clauses<'a>(op: &str, condition: &'a Bson) -> Result<Vec<&'a Document>> {
    let Bson::Array(items) = condition else {
        return Err(StoreError::InvalidQuery(format!("{op} expects an array")));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(clause) => Ok(clause),
            _ => Err(StoreError::InvalidQuery(format!(
                "{op} expects an array of documents"
            ))),
        })
        .collect()
}

fn is_operator_document(condition: &Bson) -> bool {
    match condition {
        Bson::Document(inner) => inner.keys().next().is_some_and(|k| k.starts_with('$')),
        _ => false,
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> Result<bool> {
    if !is_operator_document(condition) {
        return Ok(equals_or_contains(value, condition));
    }
    let Bson::Document(operators) = condition else {
        return Ok(false);
    };
    for (op, operand) in operators {
        let satisfied = match op.as_str() {
            "$eq" => equals_or_contains(value, operand),
            "$ne" => !equals_or_contains(value, operand),
            "$gt" => range_matches(value, operand, |o| o == Ordering::Greater),
            "$gte" => range_matches(value, operand, |o| o != Ordering::Less),
            "$lt" => range_matches(value, operand, |o| o == Ordering::Less),
            "$lte" => range_matches(value, operand, |o| o != Ordering::Greater),
            "$in" => in_list(value, operand, op)?,
            "$nin" => !in_list(value, operand, op)?,
            "$exists" => value.is_some() == is_truthy(operand),
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn equals_or_contains(value: Option<&Bson>, target: &Bson) -> bool {
    match value {
        None => matches!(target, Bson::Null),
        Some(Bson::Array(items)) => {
            items.iter().any(|item| values_equal(item, target))
                || values_equal(&Bson::Array(items.clone()), target)
        }
        Some(v) => values_equal(v, target),
    }
}

fn range_matches(value: Option<&Bson>, operand: &Bson, accept: fn(Ordering) -> bool) -> bool {
    let compare = |v: &Bson| {
        type_rank(Some(v)) == type_rank(Some(operand))
            && accept(compare_values(Some(v), Some(operand)))
    };
    match value {
        None => false,
        Some(Bson::Array(items)) => items.iter().any(compare),
        Some(v) => compare(v),
    }
}

fn in_list(value: Option<&Bson>, operand: &Bson, op: &str) -> Result<bool> {
    let Bson::Array(candidates) = operand else {
        return Err(StoreError::InvalidQuery(format!("{op} expects an array")));
    };
    Ok(candidates
        .iter()
        .any(|candidate| equals_or_contains(value, candidate)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_as_f64_reads_every_numeric_type() {
        assert_eq!(as_f64(&Bson::Int32(1995)), Some(1995.0));
        assert_eq!(as_f64(&Bson::Int64(2001)), Some(2001.0));
        assert_eq!(as_f64(&Bson::Double(7.5)), Some(7.5));
        assert_eq!(as_f64(&Bson::String("1995".into())), None);
    }

    fn movie() -> Document {
        doc! {
            "title": "Heat",
            "year": 1995,
            "rated": "R",
            "genres": ["Action", "Crime"],
            "imdb": { "rating": 8.2 },
            "awards": { "wins": 12 },
            "boxOffice": 187.4,
        }
    }

    #[test]
    fn test_dotted_path_lookup() {
        let doc = movie();
        assert_eq!(get_path(&doc, "imdb.rating"), Some(&Bson::Double(8.2)));
        assert_eq!(get_path(&doc, "genres.1"), Some(&Bson::String("Crime".into())));
        assert!(get_path(&doc, "imdb.votes").is_none());
        assert!(get_path(&doc, "title.length").is_none());
    }

    #[test]
    fn test_implicit_equality_and_array_membership() {
        let doc = movie();
        assert!(matches(&doc, &doc! { "year": 1995 }).unwrap());
        assert!(matches(&doc, &doc! { "year": 1995.0 }).unwrap());
        assert!(matches(&doc, &doc! { "genres": "Crime" }).unwrap());
        assert!(!matches(&doc, &doc! { "genres": "Comedy" }).unwrap());
        assert!(matches(&doc, &doc! {}).unwrap());
    }

    #[test]
    fn test_range_operators_stay_within_type_bracket() {
        let doc = movie();
        assert!(matches(&doc, &doc! { "imdb.rating": { "$gte": 7, "$lte": 10 } }).unwrap());
        assert!(!matches(&doc, &doc! { "imdb.rating": { "$gt": 9 } }).unwrap());
        // A string never satisfies a numeric bound
        assert!(!matches(&doc, &doc! { "rated": { "$gte": 0 } }).unwrap());
        // Missing fields never satisfy a range
        assert!(!matches(&doc, &doc! { "metacritic": { "$gte": 0 } }).unwrap());
    }

    #[test]
    fn test_negative_operators_match_missing_fields() {
        let doc = movie();
        assert!(matches(&doc, &doc! { "rated": { "$nin": ["G", "PG"] } }).unwrap());
        assert!(!matches(&doc, &doc! { "rated": { "$nin": ["R"] } }).unwrap());
        assert!(matches(&doc, &doc! { "metacritic": { "$ne": 50 } }).unwrap());
        assert!(matches(&doc, &doc! { "boxOffice": { "$ne": 100.0 } }).unwrap());
        assert!(matches(&doc, &doc! { "metacritic": { "$exists": false } }).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let doc = movie();
        let filter = doc! { "$or": [ { "year": 2001 }, { "genres": { "$in": ["Action"] } } ] };
        assert!(matches(&doc, &filter).unwrap());
        let filter = doc! { "$and": [ { "year": 1995 }, { "rated": "PG" } ] };
        assert!(!matches(&doc, &filter).unwrap());
    }

    #[test]
    fn test_unknown_operator_is_an_error() {
        let doc = movie();
        let result = matches(&doc, &doc! { "title": { "$regex": "^H" } });
        assert!(matches!(result, Err(StoreError::UnsupportedOperator(op)) if op == "$regex"));
    }

    #[test]
    fn test_missing_sorts_with_null_below_numbers() {
        let ten = Bson::Int32(10);
        assert_eq!(compare_values(None, Some(&ten)), Ordering::Less);
        assert_eq!(compare_values(Some(&Bson::Null), None), Ordering::Equal);
        assert_eq!(
            compare_values(Some(&Bson::Int64(3)), Some(&Bson::Double(2.5))),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(Some(&Bson::String("a".into())), Some(&ten)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_set_and_remove_path() {
        let mut doc = movie();
        set_path(&mut doc, "imdb.votes", Bson::Int32(500)).unwrap();
        set_path(&mut doc, "tomatoes.critic.rating", Bson::Double(7.5)).unwrap();
        assert_eq!(get_path(&doc, "imdb.votes"), Some(&Bson::Int32(500)));
        assert_eq!(get_path(&doc, "tomatoes.critic.rating"), Some(&Bson::Double(7.5)));
        assert!(set_path(&mut doc, "title.sub", Bson::Null).is_err());

        assert_eq!(remove_path(&mut doc, "imdb.votes"), Some(Bson::Int32(500)));
        assert!(get_path(&doc, "imdb.votes").is_none());
    }

    #[test]
    fn test_filter_documents_preserves_order() {
        let docs: Vec<Document> = (0..50).map(|i| doc! { "n": i, "even": i % 2 == 0 }).collect();
        let kept = filter_documents(docs, &doc! { "even": true }).unwrap();
        let ns: Vec<i32> = kept.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, (0..50).filter(|i| i % 2 == 0).collect::<Vec<_>>());
    }
}
