//! Per-rule inclusion and value resolution
//!
//! Given one sealed attribute rule and an adapted source, the resolver
//! decides whether the attribute appears in the output at all and, if so,
//! computes its resolved value: a direct read (with the declared default
//! standing in for an absent key), a caller-supplied function, or dispatch
//! through a nested schema. Failures are wrapped with the offending
//! attribute's name.

use serde_json::Value;

use crate::record::FieldValue;
use crate::schema::rule::{AttrDefault, AttrRule, Mapping};
use crate::schema::Schema;
use crate::source::Source;
use crate::{Error, Result};

/// Resolve one rule against a source
///
/// `Ok(None)` means the attribute is omitted entirely: no key, no null
/// placeholder.
pub(crate) fn resolve(rule: &AttrRule, source: &Source<'_>) -> Result<Option<FieldValue>> {
    if rule.optional() && !source.has(rule.source_key()) {
        return Ok(None);
    }
    if let Some(predicate) = rule.include_if() {
        let included =
            predicate(source, rule.params()).map_err(|e| e.for_attribute(rule.name()))?;
        if !included {
            return Ok(None);
        }
    }
    resolve_value(rule, source)
        .map(Some)
        .map_err(|e| e.for_attribute(rule.name()))
}

fn resolve_value(rule: &AttrRule, source: &Source<'_>) -> Result<FieldValue> {
    match rule.mapping() {
        Mapping::Read => read_or_default(rule, source).map(FieldValue::Plain),
        Mapping::Function(mapper) => mapper(source, rule.params()).map(FieldValue::Plain),
        Mapping::Nested(inner) => resolve_nested(rule, inner, source),
    }
}

/// The built-in read: the declared default is produced iff the key is
/// absent, never when a present value is falsy or empty.
fn read_or_default(rule: &AttrRule, source: &Source<'_>) -> Result<Value> {
    if source.has(rule.source_key()) {
        Ok(source.get(rule.source_key()).unwrap_or(Value::Null))
    } else {
        produce_default(rule, source)
    }
}

fn resolve_nested(rule: &AttrRule, inner: &Schema, source: &Source<'_>) -> Result<FieldValue> {
    if source.has(rule.source_key()) {
        let value = source.get(rule.source_key()).unwrap_or(Value::Null);
        nested_value(inner, &value)
    } else {
        // An absent key with a declared default resolves to the default
        // value directly; it is not re-transformed through the inner schema.
        produce_default(rule, source).map(FieldValue::Plain)
    }
}

/// Transform a read value through a nested schema, element-wise over
/// sequences (recursively, so sequences of sequences keep their shape)
fn nested_value(schema: &Schema, value: &Value) -> Result<FieldValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| nested_value(schema, item))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::Seq),
        other => super::transform_value(schema, other).map(FieldValue::Record),
    }
}

fn produce_default(rule: &AttrRule, source: &Source<'_>) -> Result<Value> {
    match rule.default() {
        Some(AttrDefault::Literal(value)) => Ok(value.clone()),
        Some(AttrDefault::Producer(producer)) => producer(source, rule.params()),
        None => Err(Error::AttributeNotPresent {
            key: rule.source_key().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::rule::Attr;
    use serde_json::json;

    fn rule(name: &str, params: Attr) -> AttrRule {
        AttrRule::seal(name, params)
    }

    fn source_of(value: &Value) -> Source<'_> {
        Source::from_value(value).unwrap()
    }

    #[test]
    fn test_direct_read() {
        let value = json!({"a": 1});
        let resolved = resolve(&rule("a", Attr::new()), &source_of(&value)).unwrap();
        assert_eq!(resolved, Some(FieldValue::Plain(json!(1))));
    }

    #[test]
    fn test_read_from_other_key() {
        let value = json!({"username": "John"});
        let resolved = resolve(&rule("name", Attr::new().from("username")), &source_of(&value));
        assert_eq!(resolved.unwrap(), Some(FieldValue::Plain(json!("John"))));
    }

    #[test]
    fn test_missing_required_attribute() {
        let value = json!({});
        let err = resolve(&rule("a", Attr::new()), &source_of(&value)).unwrap_err();
        assert!(matches!(err, Error::AttributeTransform { ref attribute, .. } if attribute == "a"));
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().contains("not present"));
    }

    #[test]
    fn test_default_used_only_when_absent() {
        let r = rule("a", Attr::new().default_value(json!(1)));

        let absent = json!({});
        assert_eq!(
            resolve(&r, &source_of(&absent)).unwrap(),
            Some(FieldValue::Plain(json!(1)))
        );

        // A present falsy value is read, not defaulted.
        let present = json!({"a": 0});
        assert_eq!(
            resolve(&r, &source_of(&present)).unwrap(),
            Some(FieldValue::Plain(json!(0)))
        );

        let null_present = json!({"a": null});
        assert_eq!(
            resolve(&r, &source_of(&null_present)).unwrap(),
            Some(FieldValue::Plain(json!(null)))
        );
    }

    #[test]
    fn test_default_producer_runs_when_absent() {
        let r = rule("a", Attr::new().default_with(|| json!("produced")));
        let value = json!({});
        assert_eq!(
            resolve(&r, &source_of(&value)).unwrap(),
            Some(FieldValue::Plain(json!("produced")))
        );
    }

    #[test]
    fn test_optional_omits_absent_attribute() {
        let r = rule("a", Attr::new().optional(true));

        let absent = json!({});
        assert_eq!(resolve(&r, &source_of(&absent)).unwrap(), None);

        let present = json!({"a": 2});
        assert_eq!(
            resolve(&r, &source_of(&present)).unwrap(),
            Some(FieldValue::Plain(json!(2)))
        );
    }

    #[test]
    fn test_predicate_controls_inclusion() {
        let r = rule(
            "b",
            Attr::new().when(|src: &Source| Ok(src.get("a").is_some_and(|v| v == json!(1)))),
        );

        let included = json!({"a": 1, "b": 2});
        assert_eq!(
            resolve(&r, &source_of(&included)).unwrap(),
            Some(FieldValue::Plain(json!(2)))
        );

        let excluded = json!({"a": 2, "b": 2});
        assert_eq!(resolve(&r, &source_of(&excluded)).unwrap(), None);
    }

    #[test]
    fn test_function_mapper_receives_source() {
        let r = rule(
            "b",
            Attr::new().using(|src: &Source| Ok(src.get("a").unwrap_or(Value::Null))),
        );
        let value = json!({"a": 1});
        assert_eq!(
            resolve(&r, &source_of(&value)).unwrap(),
            Some(FieldValue::Plain(json!(1)))
        );
    }

    #[test]
    fn test_function_mapper_receives_params() {
        let r = rule(
            "name",
            Attr::new()
                .from("username")
                .using_with(|src, params| Ok(src.get(&params.from).unwrap_or(Value::Null))),
        );
        let value = json!({"username": "John"});
        assert_eq!(
            resolve(&r, &source_of(&value)).unwrap(),
            Some(FieldValue::Plain(json!("John")))
        );
    }

    #[test]
    fn test_mapper_error_names_the_attribute() {
        let r = rule(
            "b",
            Attr::new().using(|_: &Source| Err(anyhow::anyhow!("boom").into())),
        );
        let value = json!({});
        let err = resolve(&r, &source_of(&value)).unwrap_err();
        assert!(matches!(err, Error::AttributeTransform { ref attribute, .. } if attribute == "b"));
    }

    #[test]
    fn test_nested_single_value() {
        let inner = Schema::builder("Inner")
            .attribute("c", Attr::new())
            .unwrap()
            .build();
        let r = rule("b", Attr::new().using_schema(&inner));

        let value = json!({"b": {"c": 2}});
        let resolved = resolve(&r, &source_of(&value)).unwrap().unwrap();
        let record = resolved.as_record().unwrap();
        assert_eq!(record.to_plain(), json!({"c": 2}));
    }

    #[test]
    fn test_nested_sequence_preserves_order_and_count() {
        let inner = Schema::builder("Inner")
            .attribute("c", Attr::new())
            .unwrap()
            .build();
        let r = rule("b", Attr::new().using_schema(&inner));

        let value = json!({"b": [{"c": 1}, {"c": 2}, {"c": 3}]});
        let resolved = resolve(&r, &source_of(&value)).unwrap().unwrap();
        assert_eq!(resolved.to_plain(), json!([{"c": 1}, {"c": 2}, {"c": 3}]));
    }

    #[test]
    fn test_nested_missing_key_fails() {
        let inner = Schema::builder("Inner")
            .attribute("c", Attr::new())
            .unwrap()
            .build();
        let r = rule("b", Attr::new().using_schema(&inner));

        let value = json!({});
        let err = resolve(&r, &source_of(&value)).unwrap_err();
        assert!(matches!(err, Error::AttributeTransform { ref attribute, .. } if attribute == "b"));
    }

    #[test]
    fn test_nested_missing_key_with_default() {
        let inner = Schema::builder("Inner")
            .attribute("c", Attr::new())
            .unwrap()
            .build();
        let r = rule("b", Attr::new().using_schema(&inner).default_value(json!([])));

        let value = json!({});
        let resolved = resolve(&r, &source_of(&value)).unwrap();
        assert_eq!(resolved, Some(FieldValue::Plain(json!([]))));
    }

    #[test]
    fn test_nested_scalar_element_fails_with_inner_schema_name() {
        let inner = Schema::builder("Inner")
            .attribute("c", Attr::new())
            .unwrap()
            .build();
        let r = rule("b", Attr::new().using_schema(&inner));

        let value = json!({"b": 42});
        let err = resolve(&r, &source_of(&value)).unwrap_err();
        let mut chain = Vec::new();
        let mut current: Option<&dyn std::error::Error> = Some(&err);
        while let Some(e) = current {
            chain.push(e.to_string());
            current = e.source();
        }
        assert!(chain.iter().any(|m| m.contains("Inner")));
        assert!(chain.iter().any(|m| m.contains("number")));
    }
}
