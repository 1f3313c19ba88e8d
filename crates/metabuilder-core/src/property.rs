//! String-keyed property store and the composite value grammar.
//!
//! Every element carries a [`Properties`] bag. Values are plain strings; a
//! few well-known keys hold composite text that is parsed on demand:
//!
//! - attribute lists: `name:type; other:type`
//! - method lists: `area(scale:double, unit:Unit):double; reset():void`
//! - enumeration literals: `RED; GREEN` or one literal per line
//!
//! The grammar is lenient. A missing type or parameter list reads as an
//! empty string and never fails; extra colons after the first belong to the
//! type (`map:Map<K:V>` has type `Map<K:V>`).

use indexmap::IndexMap;
use winnow::{
    Parser as _,
    combinator::{delimited, opt, preceded, separated},
    error::{ContextError, ModalResult},
    token::{rest, take_till},
};

/// Well-known property keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const ATTRIBUTES: &str = "attributes";
    pub const METHODS: &str = "methods";
    pub const LITERALS: &str = "literals";
    pub const START_LABEL: &str = "startLabel";
    pub const MIDDLE_LABEL: &str = "midLabel";
    pub const END_LABEL: &str = "endLabel";
    pub const DIRECTION: &str = "direction";
}

/// Ordered map from property name to string value.
///
/// Insertion order is preserved so that property editors and serializers
/// see keys in the order the element kind declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: IndexMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value stored under `key`, or the empty string.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Overwrites an existing property.
    ///
    /// Returns `false` and leaves the map untouched when `key` is unknown.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Removes `key`, keeping the order of the remaining properties.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    /// Removes `key`, returning the index it had and its value.
    pub fn remove_full(&mut self, key: &str) -> Option<(usize, String)> {
        self.values
            .shift_remove_full(key)
            .map(|(index, _, value)| (index, value))
    }

    /// Stores `value` under `key` at `index`, shifting later properties.
    ///
    /// An index past the end appends.
    pub fn insert_at(&mut self, index: usize, key: impl Into<String>, value: impl Into<String>) {
        let index = index.min(self.values.len());
        self.values.shift_insert(index, key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A `name:type` pair from an attribute list or a parameter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    type_name: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// A method signature: name, parameters and return type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Method {
    name: String,
    parameters: Vec<Attribute>,
    return_type: String,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Attribute>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Attribute] {
        &self.parameters
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }
}

type PResult<O> = ModalResult<O, ContextError>;

/// Splits `input` on `separator`, keeping empty pieces.
fn entries<'a>(separator: char) -> impl FnMut(&mut &'a str) -> PResult<Vec<&'a str>> {
    move |input: &mut &'a str| {
        separated(0.., take_till(0.., separator), separator).parse_next(input)
    }
}

/// `name` optionally followed by `:type`, where `type` swallows the rest.
fn attribute(input: &mut &str) -> PResult<Attribute> {
    (take_till(0.., ':'), opt(preceded(':', rest)))
        .map(|(name, type_name): (&str, Option<&str>)| {
            Attribute::new(name.trim(), type_name.unwrap_or_default().trim())
        })
        .parse_next(input)
}

/// `name(params):type` where every part after the name may be missing.
fn method(input: &mut &str) -> PResult<Method> {
    (
        take_till(0.., ['(', ':']),
        opt(delimited('(', take_till(0.., ')'), opt(')'))),
        take_till(0.., ':'),
        opt(preceded(':', rest)),
    )
        .map(
            |(name, parameters, _, return_type): (&str, Option<&str>, &str, Option<&str>)| {
                Method::new(
                    name.trim(),
                    parse_parameters(parameters.unwrap_or_default()),
                    return_type.unwrap_or_default().trim(),
                )
            },
        )
        .parse_next(input)
}

/// Splits a composite value into non-blank entries.
fn split_entries(text: &str, separator: char) -> Vec<String> {
    let flattened = text.replace(['\n', '\r'], "");
    entries(separator)
        .parse(flattened.as_str())
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_attribute(entry: &str) -> Attribute {
    attribute
        .parse(entry)
        .unwrap_or_else(|_| Attribute::new(entry.trim(), ""))
}

fn parse_parameters(text: &str) -> Vec<Attribute> {
    split_entries(text, ',')
        .iter()
        .map(|entry| parse_attribute(entry))
        .collect()
}

/// Parses an attribute list such as `x:int; y:int`.
///
/// # Examples
///
/// ```
/// # use metabuilder_core::property::parse_attributes;
/// let attributes = parse_attributes("x:int;label");
/// assert_eq!(attributes[0].type_name(), "int");
/// assert_eq!(attributes[1].name(), "label");
/// assert_eq!(attributes[1].type_name(), "");
/// ```
pub fn parse_attributes(text: &str) -> Vec<Attribute> {
    split_entries(text, ';')
        .iter()
        .map(|entry| parse_attribute(entry))
        .collect()
}

/// Parses a method list such as `area():double; scale(f:double):void`.
pub fn parse_methods(text: &str) -> Vec<Method> {
    split_entries(text, ';')
        .iter()
        .map(|entry| {
            method
                .parse(entry.as_str())
                .unwrap_or_else(|_| Method::new(entry.trim(), Vec::new(), ""))
        })
        .collect()
}

/// Parses enumeration literals separated by `;` or line breaks.
pub fn parse_literals(text: &str) -> Vec<String> {
    text.split([';', '\n'])
        .map(str::trim)
        .filter(|literal| !literal.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_preserve_order() {
        let mut properties = Properties::new();
        properties.put(keys::NAME, "");
        properties.put(keys::ATTRIBUTES, "");
        properties.put(keys::METHODS, "");

        let keys: Vec<_> = properties.keys().collect();
        assert_eq!(keys, vec!["name", "attributes", "methods"]);
    }

    #[test]
    fn test_properties_set_only_existing() {
        let mut properties = Properties::from_iter([(keys::NAME, "Shape")]);
        assert!(properties.set(keys::NAME, "Circle"));
        assert!(!properties.set("color", "red"));
        assert_eq!(properties.value(keys::NAME), "Circle");
        assert_eq!(properties.get("color"), None);
        assert_eq!(properties.value("color"), "");
    }

    #[test]
    fn test_properties_put_returns_previous() {
        let mut properties = Properties::new();
        assert_eq!(properties.put("k", "a"), None);
        assert_eq!(properties.put("k", "b"), Some("a".to_string()));
        assert_eq!(properties.len(), 1);
    }

    #[test]
    fn test_parse_attributes() {
        let attributes = parse_attributes("width : int; height:int");
        assert_eq!(
            attributes,
            vec![Attribute::new("width", "int"), Attribute::new("height", "int")]
        );
    }

    #[test]
    fn test_parse_attributes_missing_type() {
        let attributes = parse_attributes("name;");
        assert_eq!(attributes, vec![Attribute::new("name", "")]);
    }

    #[test]
    fn test_parse_attributes_rejoins_extra_colons() {
        let attributes = parse_attributes("lookup:Map<K:V>");
        assert_eq!(attributes[0].type_name(), "Map<K:V>");
    }

    #[test]
    fn test_parse_attributes_ignores_line_breaks() {
        let attributes = parse_attributes("x:int;\ny:int\n");
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1], Attribute::new("y", "int"));
    }

    #[test]
    fn test_parse_attributes_empty() {
        assert!(parse_attributes("").is_empty());
        assert!(parse_attributes(" ; ;").is_empty());
    }

    #[test]
    fn test_parse_methods() {
        let methods = parse_methods("scale(factor:double, origin:Point):void;area():double");
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name(), "scale");
        assert_eq!(
            methods[0].parameters(),
            &[
                Attribute::new("factor", "double"),
                Attribute::new("origin", "Point")
            ]
        );
        assert_eq!(methods[0].return_type(), "void");
        assert!(methods[1].parameters().is_empty());
        assert_eq!(methods[1].return_type(), "double");
    }

    #[test]
    fn test_parse_methods_missing_parts() {
        let methods = parse_methods("reset;draw(:Canvas;size():");
        assert_eq!(methods[0], Method::new("reset", Vec::new(), ""));
        assert_eq!(methods[1].name(), "draw");
        assert_eq!(methods[1].parameters(), &[Attribute::new("", "Canvas")]);
        assert_eq!(methods[1].return_type(), "");
        assert_eq!(methods[2], Method::new("size", Vec::new(), ""));
    }

    #[test]
    fn test_parse_methods_without_parentheses() {
        let methods = parse_methods("count:int");
        assert_eq!(methods[0], Method::new("count", Vec::new(), "int"));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_literals("RED; GREEN\nBLUE\n\n"), vec!["RED", "GREEN", "BLUE"]);
        assert!(parse_literals("").is_empty());
    }
}
