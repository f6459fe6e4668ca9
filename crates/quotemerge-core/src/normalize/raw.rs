use serde_json::{Map, Value};

use crate::ValidationError;

const CODE_KEYS: [&str; 4] = ["f12", "code", "symbol", "secu_code"];
const NAME_KEYS: [&str; 4] = ["f14", "name", "stock_name", "证券名称"];
const EXCHANGE_PREFIXES: [&str; 3] = ["sh", "sz", "bj"];

/// Read-only view over one provider payload.
///
/// Every lookup tries its keys in order. `null`, `""` and `"-"` count as
/// missing, and a value that does not parse moves on to the next key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawQuote<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawQuote<'a> {
    pub(crate) fn new(value: &'a Value) -> Result<Self, ValidationError> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or(ValidationError::NotAnObject)
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(text) if text.is_empty() || text == "-" => None,
            value => Some(value),
        }
    }

    pub(crate) fn float(&self, keys: &[&str]) -> f64 {
        keys.iter()
            .filter_map(|key| self.lookup(key).and_then(number))
            .next()
            .unwrap_or(0.0)
    }

    /// Integer count truncated toward zero; a negative count is rejected.
    pub(crate) fn count(&self, field: &'static str, keys: &[&str]) -> Result<u64, ValidationError> {
        let value = self.float(keys).trunc();
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
        Ok(value as u64)
    }

    pub(crate) fn text(&self, keys: &[&str]) -> String {
        keys.iter()
            .filter_map(|key| self.lookup(key).and_then(text))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// Provider-supplied boolean, given either as JSON bool or `"true"`/`"false"`.
    pub(crate) fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(value) => Some(*value),
            Value::String(text) => Some(text.trim().eq_ignore_ascii_case("true")),
            _ => None,
        }
    }

    /// Instrument code with any `sh`/`sz`/`bj` exchange prefix removed.
    pub(crate) fn code(&self) -> Result<String, ValidationError> {
        let raw = self.text(&CODE_KEYS);
        if raw.is_empty() {
            return Err(ValidationError::MissingCode);
        }
        Ok(strip_exchange_prefix(&raw).to_owned())
    }

    pub(crate) fn name(&self) -> String {
        self.text(&NAME_KEYS)
    }
}

/// Code for diagnostics; never fails.
pub(crate) fn code_for_report(value: &Value) -> String {
    RawQuote::new(value)
        .and_then(|raw| raw.code())
        .unwrap_or_else(|_| String::from("unknown"))
}

fn strip_exchange_prefix(code: &str) -> &str {
    if code.chars().count() <= 6 {
        return code;
    }
    let head = code.get(..2).map(str::to_ascii_lowercase);
    match head {
        Some(head) if EXCHANGE_PREFIXES.contains(&head.as_str()) => &code[2..],
        _ => code,
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn float_skips_placeholders_and_unparsable_values() {
        let payload = json!({"a": null, "b": "-", "c": "", "d": "n/a", "e": "12.5", "f": 3});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.float(&["a", "b", "c", "d", "e"]), 12.5);
        assert_eq!(raw.float(&["a", "f"]), 3.0);
        assert_eq!(raw.float(&["missing"]), 0.0);
    }

    #[test]
    fn float_ignores_non_finite_strings() {
        let payload = json!({"a": "NaN", "b": "inf", "c": 7});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.float(&["a", "b", "c"]), 7.0);
    }

    #[test]
    fn count_truncates_and_rejects_negative() {
        let payload = json!({"v": "1234.9", "n": -3});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.count("volume", &["v"]), Ok(1234));
        assert_eq!(
            raw.count("volume", &["n"]),
            Err(ValidationError::NegativeValue { field: "volume" })
        );
    }

    #[test]
    fn code_is_taken_in_key_order_and_unprefixed() {
        let payload = json!({"symbol": "sh600000", "secu_code": "000001"});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.code(), Ok(String::from("600000")));

        let payload = json!({"f12": "", "code": " SZ000001 "});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.code(), Ok(String::from("000001")));

        let payload = json!({"code": "sh6000"});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.code(), Ok(String::from("sh6000")));
    }

    #[test]
    fn missing_code_is_reported() {
        let payload = json!({"name": "平安银行"});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.code(), Err(ValidationError::MissingCode));
        assert_eq!(code_for_report(&payload), "unknown");
        assert_eq!(code_for_report(&json!("oops")), "unknown");
    }

    #[test]
    fn name_and_flags() {
        let payload = json!({"stock_name": " 平安银行 ", "is_chinext": "True", "other": 1});
        let raw = RawQuote::new(&payload).expect("object");
        assert_eq!(raw.name(), "平安银行");
        assert_eq!(raw.flag("is_chinext"), Some(true));
        assert_eq!(raw.flag("other"), None);
        assert_eq!(raw.flag("absent"), None);
    }
}
