use serde::{Deserialize, Deserializer};
use url::Url;

use crate::Error;

/// Appends `path` to `base`, keeping every segment that is already part of
/// `base` (unlike `Url::join`, which drops the last one without a trailing slash)
pub fn service_url(base: &str, path: &str) -> Result<Url, Error> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    Ok(Url::parse(&joined)?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Services send ids either as strings or as numbers, this always yields
/// the string form so ids can be compared by string equality
pub fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    };

    Ok(id)
}
