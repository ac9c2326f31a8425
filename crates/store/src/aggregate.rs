//! Aggregation pipeline execution for the in-memory store.
//!
//! Supported stages: `$match`, `$group`, `$project`, `$sort`, `$skip`,
//! `$limit`, `$count`. `$group` accumulators: `$first`, `$last`, `$sum`,
//! `$min`, `$max`, `$push`.

use std::collections::HashMap;

use bson::{Bson, Document};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::query::{as_f64, compare_values, filter_documents, get_path, is_truthy, remove_path, set_path};

/// Run every stage of `pipeline` over `docs` in order.
pub fn run_pipeline(docs: Vec<Document>, pipeline: &[Document]) -> Result<Vec<Document>> {
    let mut current = docs;
    for stage in pipeline {
        let (name, spec) = single_entry(stage)?;
        let input = current.len();
        current = match name {
            "$match" => filter_documents(current, as_document(name, spec)?)?,
            "$group" => group(current, as_document(name, spec)?)?,
            "$project" => project(current, as_document(name, spec)?)?,
            "$sort" => sort(current, as_document(name, spec)?)?,
            "$skip" => current.into_iter().skip(as_count(name, spec)?).collect(),
            "$limit" => {
                let limit = as_count(name, spec)?;
                if limit == 0 {
                    return Err(StoreError::InvalidQuery("$limit must be positive".into()));
                }
                current.into_iter().take(limit).collect()
            }
            "$count" => count(current, spec)?,
            other => return Err(StoreError::UnsupportedStage(other.to_string())),
        };
        debug!("Stage {} (input count: {}, output count: {})", name, input, current.len());
    }
    Ok(current)
}

fn single_entry(stage: &Document) -> Result<(&str, &Bson)> {
    let mut entries = stage.iter();
    match (entries.next(), entries.next()) {
        (Some((name, spec)), None) => Ok((name.as_str(), spec)),
        _ => Err(StoreError::InvalidQuery(
            "a pipeline stage must have exactly one field".into(),
        )),
    }
}

fn as_document<'a>(name: &str, spec: &'a Bson) -> Result<&'a Document> {
    match spec {
        Bson::Document(doc) => Ok(doc),
        _ => Err(StoreError::InvalidQuery(format!("{name} expects a document"))),
    }
}

fn as_count(name: &str, spec: &Bson) -> Result<usize> {
    match as_f64(spec) {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as usize),
        _ => Err(StoreError::InvalidQuery(format!(
            "{name} expects a non-negative integer"
        ))),
    }
}

/// Evaluate a field path (`"$title"`), a nested expression document, or a literal.
fn evaluate(doc: &Document, expr: &Bson) -> Option<Bson> {
    match expr {
        Bson::String(s) if s.starts_with('$') => get_path(doc, &s[1..]).cloned(),
        Bson::Document(fields) => {
            let mut out = Document::new();
            for (key, value) in fields {
                if let Some(v) = evaluate(doc, value) {
                    out.insert(key.clone(), v);
                }
            }
            Some(Bson::Document(out))
        }
        literal => Some(literal.clone()),
    }
}

// =============================================================================
// $group
// =============================================================================

enum Accumulator {
    First(Option<Bson>),
    Last(Bson),
    Sum { total: f64, integral: bool },
    Min(Option<Bson>),
    Max(Option<Bson>),
    Push(Vec<Bson>),
}

impl Accumulator {
    fn new(op: &str) -> Result<Self> {
        Ok(match op {
            "$first" => Accumulator::First(None),
            "$last" => Accumulator::Last(Bson::Null),
            "$sum" => Accumulator::Sum {
                total: 0.0,
                integral: true,
            },
            "$min" => Accumulator::Min(None),
            "$max" => Accumulator::Max(None),
            "$push" => Accumulator::Push(Vec::new()),
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        })
    }

    fn accept(&mut self, value: Option<Bson>) {
        match self {
            Accumulator::First(slot) => {
                if slot.is_none() {
                    *slot = Some(value.unwrap_or(Bson::Null));
                }
            }
            Accumulator::Last(slot) => *slot = value.unwrap_or(Bson::Null),
            Accumulator::Sum { total, integral } => {
                if let Some(v) = value.as_ref() {
                    if let Some(n) = as_f64(v) {
                        *total += n;
                        *integral &= !matches!(v, Bson::Double(_));
                    }
                }
            }
            Accumulator::Min(slot) => keep_extreme(slot, value, std::cmp::Ordering::Less),
            Accumulator::Max(slot) => keep_extreme(slot, value, std::cmp::Ordering::Greater),
            Accumulator::Push(items) => {
                if let Some(v) = value {
                    items.push(v);
                }
            }
        }
    }

    fn finish(self) -> Bson {
        match self {
            Accumulator::First(slot) => slot.unwrap_or(Bson::Null),
            Accumulator::Last(value) => value,
            Accumulator::Sum { total, integral } => {
                if !integral {
                    Bson::Double(total)
                } else if total.abs() <= f64::from(i32::MAX) {
                    Bson::Int32(total as i32)
                } else {
                    Bson::Int64(total as i64)
                }
            }
            Accumulator::Min(slot) | Accumulator::Max(slot) => slot.unwrap_or(Bson::Null),
            Accumulator::Push(items) => Bson::Array(items),
        }
    }
}

fn keep_extreme(slot: &mut Option<Bson>, value: Option<Bson>, wanted: std::cmp::Ordering) {
    let Some(candidate) = value else { return };
    if matches!(candidate, Bson::Null) {
        return;
    }
    let replace = match slot {
        None => true,
        Some(current) => compare_values(Some(&candidate), Some(current)) == wanted,
    };
    if replace {
        *slot = Some(candidate);
    }
}

struct Group {
    key: Bson,
    accumulators: Vec<(String, Accumulator)>,
}

/// Group documents by the `_id` expression, keeping groups in first-seen order.
fn group(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let key_expr = spec
        .get("_id")
        .ok_or_else(|| StoreError::InvalidQuery("$group requires an _id expression".into()))?;

    let mut fields: Vec<(&str, &str, &Bson)> = Vec::new();
    for (name, accumulator) in spec.iter().filter(|(name, _)| name.as_str() != "_id") {
        let (op, expr) = match accumulator {
            Bson::Document(acc) => single_entry(acc)?,
            _ => {
                return Err(StoreError::InvalidQuery(format!(
                    "$group field '{name}' must be an accumulator"
                )))
            }
        };
        fields.push((name.as_str(), op, expr));
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for doc in &docs {
        let key = evaluate(doc, key_expr).unwrap_or(Bson::Null);
        let slot = key.clone().into_relaxed_extjson().to_string();
        let index = match positions.get(&slot) {
            Some(index) => *index,
            None => {
                let mut accumulators = Vec::with_capacity(fields.len());
                for (name, op, _) in &fields {
                    accumulators.push((name.to_string(), Accumulator::new(op)?));
                }
                groups.push(Group { key, accumulators });
                positions.insert(slot, groups.len() - 1);
                groups.len() - 1
            }
        };
        for ((_, accumulator), (_, _, expr)) in groups[index].accumulators.iter_mut().zip(&fields) {
            accumulator.accept(evaluate(doc, expr));
        }
    }

    Ok(groups
        .into_iter()
        .map(|group| {
            let mut out = Document::new();
            out.insert("_id", group.key);
            for (name, accumulator) in group.accumulators {
                out.insert(name, accumulator.finish());
            }
            out
        })
        .collect())
}

// =============================================================================
// $project
// =============================================================================

fn project(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let include_id = spec.get("_id").map(is_truthy).unwrap_or(true);
    let fields: Vec<(&String, &Bson)> = spec.iter().filter(|(k, _)| k.as_str() != "_id").collect();

    let inclusion = fields
        .iter()
        .any(|(_, v)| is_truthy(v) || matches!(v, Bson::String(_) | Bson::Document(_)));
    let exclusion = fields.iter().any(|(_, v)| !is_truthy(v));
    if inclusion && exclusion {
        return Err(StoreError::InvalidQuery(
            "cannot mix inclusion and exclusion in $project".into(),
        ));
    }

    docs.into_iter()
        .map(|doc| {
            if !inclusion {
                let mut out = doc;
                for (path, _) in &fields {
                    remove_path(&mut out, path);
                }
                if !include_id {
                    out.remove("_id");
                }
                return Ok(out);
            }

            let mut out = Document::new();
            if include_id {
                if let Some(id) = doc.get("_id") {
                    out.insert("_id", id.clone());
                }
            }
            for (path, value) in &fields {
                let projected = match value {
                    Bson::String(_) | Bson::Document(_) => evaluate(&doc, value),
                    _ => get_path(&doc, path).cloned(),
                };
                if let Some(v) = projected {
                    set_path(&mut out, path, v)?;
                }
            }
            Ok(out)
        })
        .collect()
}

// =============================================================================
// $sort / $count
// =============================================================================

fn sort(mut docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let mut keys: Vec<(&str, bool)> = Vec::with_capacity(spec.len());
    for (path, direction) in spec {
        let descending = match as_f64(direction) {
            Some(d) if d == 1.0 => false,
            Some(d) if d == -1.0 => true,
            _ => {
                return Err(StoreError::InvalidQuery(format!(
                    "$sort direction for '{path}' must be 1 or -1"
                )))
            }
        };
        keys.push((path.as_str(), descending));
    }
    if keys.is_empty() {
        return Err(StoreError::InvalidQuery("$sort requires at least one key".into()));
    }

    // Vec::sort_by is stable, so ties keep their incoming order
    docs.sort_by(|a, b| {
        keys.iter()
            .map(|(path, descending)| {
                let ord = compare_values(get_path(a, path), get_path(b, path));
                if *descending { ord.reverse() } else { ord }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(docs)
}

fn count(docs: Vec<Document>, spec: &Bson) -> Result<Vec<Document>> {
    let Bson::String(field) = spec else {
        return Err(StoreError::InvalidQuery("$count expects a field name".into()));
    };
    if docs.is_empty() {
        return Ok(Vec::new());
    }
    let total = i64::try_from(docs.len()).unwrap_or(i64::MAX);
    let mut out = Document::new();
    match i32::try_from(total) {
        Ok(n) => out.insert(field.clone(), n),
        Err(_) => out.insert(field.clone(), total),
    };
    Ok(vec![out])
}
