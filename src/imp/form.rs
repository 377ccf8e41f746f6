use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Bytes kept verbatim in `application/x-www-form-urlencoded` values.  Space
/// is encoded as `+` separately.
const FORM_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An ordered list of key/value pairs to be sent as a form body.  Keys may
/// repeat and the order of pairs is kept as pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> FormBody {
        FormBody::default()
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[cfg(test)]
    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    #[cfg(test)]
    pub fn decode(body: &str) -> anyhow::Result<FormBody> {
        use anyhow::Context;
        use percent_encoding::percent_decode_str;

        fn decode_component(s: &str) -> anyhow::Result<String> {
            let s = s.replace('+', " ");
            let decoded = percent_decode_str(&s)
                .decode_utf8()
                .with_context(|| format!("`{}` is not valid utf-8 after decoding", s))?;
            Ok(decoded.into_owned())
        }

        let mut form = FormBody::new();
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let mut kv = pair.splitn(2, '=');
            let key = decode_component(kv.next().unwrap_or(""))?;
            let value = decode_component(kv.next().unwrap_or(""))?;
            form.push(key, value);
        }

        Ok(form)
    }
}

fn encode_component(s: &str) -> String {
    // every `%` in the output starts an escape, so `%20` can only be a space
    utf8_percent_encode(s, FORM_ESCAPE)
        .to_string()
        .replace("%20", "+")
}

impl fmt::Display for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i != 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_component(key), encode_component(value))?;
        }

        Ok(())
    }
}
