//! Reader for the Python-literal text stored in the dataset's detail columns,
//! e.g. `{'Current Price': '$1,299.00', 'Was': None}` or `['Free shipping']`.
//!
//! Only the literal subset that shows up in exports is understood: quoted
//! strings, numbers, `True`/`False`/`None`, lists, tuples and string-keyed
//! dicts. Anything else makes the whole value unreadable.

use serde_json::{Map, Number, Value};

/// Deepest list/dict nesting accepted before the value counts as unreadable.
const MAX_DEPTH: usize = 32;

pub(crate) fn parse_literal(text: &str) -> Option<Value> {
    let mut cursor = Cursor::new(text);
    let value = cursor.value()?;
    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return None;
    }
    Some(value)
}

/// Parses a dict literal, returning `None` for anything that is not a dict.
pub(crate) fn parse_map(text: &str) -> Option<Map<String, Value>> {
    match parse_literal(text)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Parses a list literal of scalars, stringifying each element.
pub(crate) fn parse_string_list(text: &str) -> Option<Vec<String>> {
    match parse_literal(text)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        _ => None,
    }
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            depth: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '{' => self.nested(Self::dict),
            '[' => self.nested(|cursor| cursor.sequence('[', ']')),
            '(' => self.nested(|cursor| cursor.sequence('(', ')')),
            '\'' | '"' => self.string().map(Value::String),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Value>) -> Option<Value> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn dict(&mut self) -> Option<Value> {
        self.chars.next();
        let mut map = Map::new();
        loop {
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(key) => key,
                Value::Number(number) => number.to_string(),
                _ => return None,
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            if !self.eat(',') {
                return self.eat('}').then_some(Value::Object(map));
            }
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Option<Value> {
        debug_assert_eq!(self.peek(), Some(open));
        self.chars.next();
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(Value::Array(items));
            }
            items.push(self.value()?);
            if !self.eat(',') {
                return self.eat(close).then_some(Value::Array(items));
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                raw.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float = raw.parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_quoted_price_map() {
        let map = parse_map("{'Current Price': '$1,299.00', 'Original Price': 'Not Available'}")
            .expect("dict parses");
        assert_eq!(map["Current Price"], json!("$1,299.00"));
        assert_eq!(map["Original Price"], json!("Not Available"));
    }

    #[test]
    fn parses_nested_values_and_keywords() {
        let value = parse_literal(
            "{\"Overall Rating\": \"4.5/5 (116 reviews)\", 'Stars': {5: 80, 4: 20}, 'Verified': True, 'Note': None}",
        )
        .expect("nested dict parses");
        assert_eq!(value["Stars"]["5"], json!(80));
        assert_eq!(value["Verified"], json!(true));
        assert_eq!(value["Note"], Value::Null);
    }

    #[test]
    fn keeps_escaped_quotes_inside_strings() {
        let map = parse_map(r#"{'AI Summary': 'Users say it\'s "quiet"'}"#).expect("parses");
        assert_eq!(map["AI Summary"], json!("Users say it's \"quiet\""));
    }

    #[test]
    fn parses_lists_with_trailing_commas() {
        let promos = parse_string_list("['Free shipping', 'Save 10%',]").expect("list parses");
        assert_eq!(promos, vec!["Free shipping", "Save 10%"]);
    }

    #[test]
    fn rejects_plain_text_and_truncated_literals() {
        assert!(parse_map("$899.99").is_none());
        assert!(parse_map("-").is_none());
        assert!(parse_map("{'Current Price': '$1'").is_none());
        assert!(parse_map("['a']").is_none());
        assert!(parse_string_list("{'a': 'b'}").is_none());
        assert!(parse_literal("{'a': 'b'} trailing").is_none());
    }

    #[test]
    fn deeply_nested_literals_are_unreadable() {
        assert!(parse_literal(&"[".repeat(200_000)).is_none());
        assert!(parse_literal(&"{'a': ".repeat(50_000)).is_none());

        let nested = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(parse_literal(&nested).is_none());
        let shallow = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&shallow).is_some());
    }
}
