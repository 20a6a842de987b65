use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub continent: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

/// Reports whether the provider key is present without revealing it.
#[derive(Debug, Serialize)]
pub struct EnvCheckResponse {
    #[serde(rename = "hasGEMINI_API_KEY")]
    pub has_key: bool,
    #[serde(rename = "keyLength")]
    pub key_length: usize,
    pub note: &'static str,
}

impl EnvCheckResponse {
    pub fn from_key(key: Option<&str>) -> Self {
        let key_length = key.map(str::len).unwrap_or(0);
        Self {
            has_key: key_length > 10,
            key_length,
            note: "This does not print the key, only whether it exists.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keys_do_not_count_as_configured() {
        let check = EnvCheckResponse::from_key(Some("short"));
        assert!(!check.has_key);
        assert_eq!(check.key_length, 5);

        let check = EnvCheckResponse::from_key(Some("AIzaSyExampleExample"));
        assert!(check.has_key);

        let json = serde_json::to_value(EnvCheckResponse::from_key(None)).unwrap();
        assert_eq!(json["hasGEMINI_API_KEY"], false);
        assert_eq!(json["keyLength"], 0);
    }
}
