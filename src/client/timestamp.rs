// The service encodes timestamps as epoch seconds, sometimes fractional.
// Some compatible backends answer with RFC 3339 strings instead, so the
// deserializers accept all three shapes.

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTimestamp {
    fn into_datetime<E: de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            RawTimestamp::Int(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| E::custom(format!("timestamp out of range: {}", secs))),
            RawTimestamp::Float(secs) => {
                let millis = (secs * 1000.0).round() as i64;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| E::custom(format!("timestamp out of range: {}", secs)))
            }
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("invalid timestamp '{}': {}", text, e))),
        }
    }
}

/// Epoch seconds, with millisecond precision when the instant has one.
fn to_epoch(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0
}

pub mod epoch_seconds {
    use super::*;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let epoch = to_epoch(value);
        if epoch.fract() == 0.0 {
            serializer.serialize_i64(value.timestamp())
        } else {
            serializer.serialize_f64(epoch)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTimestamp::deserialize(deserializer)?.into_datetime()
    }
}

pub mod option_epoch_seconds {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => epoch_seconds::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::into_datetime)
            .transpose()
    }
}

pub mod vec_epoch_seconds {
    use super::*;

    struct Epoch<'a>(&'a DateTime<Utc>);

    impl Serialize for Epoch<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            epoch_seconds::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S>(values: &[DateTime<Utc>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(Epoch))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<RawTimestamp>::deserialize(deserializer)?
            .into_iter()
            .map(RawTimestamp::into_datetime)
            .collect()
    }
}
