//! Typed default templates.
//!
//! Section defaults in `site.json` and `aboutbuilder.json` may reference the
//! build context or the project identity. They are parsed once into a
//! [`Template`] tree and evaluated by [`Template::eval`]:
//!
//! | JSON form                    | Parsed as              |
//! |------------------------------|------------------------|
//! | `"$ctx.builder.name"`        | `Ref::ContextPath`     |
//! | `"project.locality"`         | `Ref::ProjectPath`     |
//! | `{"$value": <any>}`          | `Ref::Literal` (as is) |
//! | `{"$spread": "<path ref>"}`  | `Ref::Spread`          |
//! | anything else                | `Ref::Literal`         |

use crate::error::{ContentError, ContentResult};
use serde_json::{Map, Value};

const CONTEXT_PREFIX: &str = "$ctx.";
const PROJECT_PREFIX: &str = "project.";
const VALUE_KEY: &str = "$value";
const SPREAD_KEY: &str = "$spread";

/// A reference inside a default template
#[derive(Debug, Clone, PartialEq)]
pub enum Ref {
    /// Literal value, never interpreted
    Literal(Value),
    /// Path into the build context (`site`, `builder`)
    ContextPath(Vec<String>),
    /// Path into the project identity
    ProjectPath(Vec<String>),
    /// Object merged into the enclosing object
    Spread(Box<Ref>),
}

impl Ref {
    /// Parse a string leaf
    fn parse_str(raw: &str) -> ContentResult<Self> {
        if let Some(path) = raw.strip_prefix(CONTEXT_PREFIX) {
            Ok(Self::ContextPath(split_path(raw, path)?))
        } else if let Some(path) = raw.strip_prefix(PROJECT_PREFIX) {
            Ok(Self::ProjectPath(split_path(raw, path)?))
        } else {
            Ok(Self::Literal(Value::String(raw.to_string())))
        }
    }
}

fn split_path(raw: &str, path: &str) -> ContentResult<Vec<String>> {
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(ContentError::InvalidTemplate {
            reason: format!("empty path segment in {:?}", raw),
        });
    }
    Ok(segments)
}

/// Values a template is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// `{ "site": ..., "builder": ... }`
    pub context: &'a Value,
    /// Project identity object
    pub project: &'a Value,
}

/// Evaluate a single reference
///
/// Unresolvable paths yield `Value::Null`.
///
/// # Errors
///
/// Returns error if a spread is evaluated outside an object
pub fn interpret(reference: &Ref, scope: &Scope<'_>) -> ContentResult<Value> {
    match reference {
        Ref::Literal(value) => Ok(value.clone()),
        Ref::ContextPath(path) => Ok(lookup(scope.context, path)),
        Ref::ProjectPath(path) => Ok(lookup(scope.project, path)),
        Ref::Spread(_) => Err(ContentError::InvalidTemplate {
            reason: "spread used outside an object".to_string(),
        }),
    }
}

fn lookup(root: &Value, path: &[String]) -> Value {
    let mut current = root;
    for segment in path {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Parsed default template
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Leaf reference
    Ref(Ref),
    /// Object with spreads applied before explicit fields
    Object {
        /// Spread sources in declaration order
        spreads: Vec<Ref>,
        /// Explicit fields
        fields: Vec<(String, Template)>,
    },
    /// Array of templates
    Array(Vec<Template>),
}

impl Template {
    /// Parse a JSON value into a template
    ///
    /// # Errors
    ///
    /// Returns error on malformed `$value`/`$spread` usage or empty path segments
    pub fn parse(value: &Value) -> ContentResult<Self> {
        match value {
            Value::String(raw) => Ok(Self::Ref(Ref::parse_str(raw)?)),
            Value::Array(items) => Ok(Self::Array(
                items.iter().map(Self::parse).collect::<ContentResult<_>>()?,
            )),
            Value::Object(map) => Self::parse_object(map),
            other => Ok(Self::Ref(Ref::Literal(other.clone()))),
        }
    }

    fn parse_object(map: &Map<String, Value>) -> ContentResult<Self> {
        if let Some(literal) = map.get(VALUE_KEY) {
            if map.len() != 1 {
                return Err(ContentError::InvalidTemplate {
                    reason: format!("{} must be the only key of its object", VALUE_KEY),
                });
            }
            return Ok(Self::Ref(Ref::Literal(literal.clone())));
        }

        let mut spreads = Vec::new();
        let mut fields = Vec::new();
        for (key, value) in map {
            if key == SPREAD_KEY {
                let sources: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    single => vec![single],
                };
                for source in sources {
                    let Value::String(raw) = source else {
                        return Err(ContentError::InvalidTemplate {
                            reason: format!("{} expects a path string", SPREAD_KEY),
                        });
                    };
                    match Ref::parse_str(raw)? {
                        path @ (Ref::ContextPath(_) | Ref::ProjectPath(_)) => {
                            spreads.push(Ref::Spread(Box::new(path)));
                        }
                        _ => {
                            return Err(ContentError::InvalidTemplate {
                                reason: format!("{} source {:?} is not a path", SPREAD_KEY, raw),
                            });
                        }
                    }
                }
            } else {
                fields.push((key.clone(), Self::parse(value)?));
            }
        }
        Ok(Self::Object { spreads, fields })
    }

    /// Evaluate the template
    ///
    /// Keys and array elements that evaluate to `null` are dropped.
    ///
    /// # Errors
    ///
    /// Returns error if a spread source resolves to a non-object
    pub fn eval(&self, scope: &Scope<'_>) -> ContentResult<Value> {
        match self {
            Self::Ref(reference) => interpret(reference, scope),
            Self::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let value = item.eval(scope)?;
                    if !value.is_null() {
                        out.push(value);
                    }
                }
                Ok(Value::Array(out))
            }
            Self::Object { spreads, fields } => {
                let mut out = Map::new();
                for spread in spreads {
                    let Ref::Spread(inner) = spread else {
                        continue;
                    };
                    match interpret(inner, scope)? {
                        Value::Object(map) => out.extend(map),
                        Value::Null => {}
                        other => {
                            return Err(ContentError::InvalidTemplate {
                                reason: format!("cannot spread non-object value {}", other),
                            });
                        }
                    }
                }
                for (key, template) in fields {
                    let value = template.eval(scope)?;
                    if value.is_null() {
                        out.remove(key);
                    } else {
                        out.insert(key.clone(), value);
                    }
                }
                Ok(Value::Object(out))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Value {
        json!({
            "site": {"siteName": "PropYouLike"},
            "builder": {"name": "Acme Developers", "contact": {"phone": "123", "email": "a@acme.in"}}
        })
    }

    fn project() -> Value {
        json!({"projectName": "Lakeview", "locality": "Whitefield", "tags": ["lake", "east"]})
    }

    fn eval(raw: Value) -> ContentResult<Value> {
        let context = context();
        let project = project();
        Template::parse(&raw)?.eval(&Scope {
            context: &context,
            project: &project,
        })
    }

    #[test]
    fn test_parse_leaf_refs() {
        assert_eq!(
            Template::parse(&json!("$ctx.builder.name")).unwrap(),
            Template::Ref(Ref::ContextPath(vec!["builder".into(), "name".into()]))
        );
        assert_eq!(
            Template::parse(&json!("project.locality")).unwrap(),
            Template::Ref(Ref::ProjectPath(vec!["locality".into()]))
        );
        assert_eq!(
            Template::parse(&json!(42)).unwrap(),
            Template::Ref(Ref::Literal(json!(42)))
        );
    }

    #[test]
    fn test_eval_paths() {
        let value = eval(json!({
            "title": "project.projectName",
            "by": "$ctx.builder.name",
            "firstTag": "project.tags.0",
            "plain": "Hello"
        }))
        .unwrap();
        assert_eq!(
            value,
            json!({"title": "Lakeview", "by": "Acme Developers", "firstTag": "lake", "plain": "Hello"})
        );
    }

    #[test]
    fn test_unresolved_path_drops_key() {
        let value = eval(json!({"missing": "project.nope", "kept": 1, "list": ["project.nope", "x"]}))
            .unwrap();
        assert_eq!(value, json!({"kept": 1, "list": ["x"]}));
    }

    #[test]
    fn test_value_escape_is_not_interpreted() {
        let value = eval(json!({"raw": {"$value": "project.projectName"}})).unwrap();
        assert_eq!(value, json!({"raw": "project.projectName"}));
        assert!(eval(json!({"$value": 1, "other": 2})).is_err());
    }

    #[test]
    fn test_spread_then_explicit_keys_win() {
        let value = eval(json!({"$spread": "$ctx.builder.contact", "phone": "999"})).unwrap();
        assert_eq!(value, json!({"phone": "999", "email": "a@acme.in"}));
    }

    #[test]
    fn test_spread_errors() {
        assert!(eval(json!({"$spread": "$ctx.builder.name"})).is_err());
        assert!(eval(json!({"$spread": "literal"})).is_err());
        assert!(eval(json!({"$spread": 3})).is_err());
        assert_eq!(eval(json!({"$spread": "project.absent"})).unwrap(), json!({}));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(Template::parse(&json!("$ctx.builder..name")).is_err());
    }

    #[test]
    fn test_interpret_rejects_bare_spread() {
        let context = context();
        let project = project();
        let scope = Scope {
            context: &context,
            project: &project,
        };
        let spread = Ref::Spread(Box::new(Ref::ProjectPath(vec!["tags".into()])));
        assert!(interpret(&spread, &scope).is_err());
    }
}
