//! Renders the instruction text sent to the model.

use serde_json::Value;

const RULE_FOLLOW_PROMPT: &str = "You will follow the prompt strictly";
const RULE_FORMAT: &str = "You will adhere to output format strictly";
const RULE_OUTPUT_TAG: &str = "Output in provided format should be provided in <output></output> with strict json format with nothing more than pure json. No backquotes and no explanations. Always return json in provided format";
const RULE_THINKING: &str = "Think before you perform the action, think through the <prompt> in chain of thought manner and clearly outline your thinking process in <thinking></thinking> tag";

/// Template variables, kept in insertion order.
///
/// Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(Vec<(String, String)>);

impl Variables {
    /// An empty set of variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, or replaces the value of an existing one without moving it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Name and value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.into_iter()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

impl IntoIterator for Variables {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

type PairRef<'a> = fn(&'a (String, String)) -> (&'a str, &'a str);

fn as_pair(entry: &(String, String)) -> (&str, &str) {
    (entry.0.as_str(), entry.1.as_str())
}

impl<'a> IntoIterator for &'a Variables {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (String, String)>, PairRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(as_pair as PairRef<'a>)
    }
}

/// Renders the full instruction: rules, prompt, variables and the output format hint.
///
/// Every field is announced as a `"string"` regardless of its real type. The
/// output is a pure function of the arguments.
pub fn render_prompt(
    template: &str,
    vars: &Variables,
    field_names: &[String],
    include_reasoning: bool,
) -> String {
    let mut rules = vec![RULE_FOLLOW_PROMPT, RULE_FORMAT, RULE_OUTPUT_TAG];
    if include_reasoning {
        rules.push(RULE_THINKING);
    }
    let rules_str = rules
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    let variable_str = vars
        .iter()
        .map(|(key, value)| format!("<{key}>\n{value}\n</{key}>"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<rules>\n{rules_str}\n</rules>\n\n\
         <prompt>\n{template}\n</prompt>\n\n\
         <variables>\n{variable_str}\n</variables>\n\n\
         <output_format_instructions>\n{}\n</output_format_instructions>\n",
        output_format(field_names)
    )
}

/// `{"a": "string", "b": "string"}`, keys in schema order.
fn output_format(field_names: &[String]) -> String {
    let entries = field_names
        .iter()
        .map(|name| format!("{}: \"string\"", Value::String(name.clone())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", entries)
}
