//! Serde helpers shared by the harness crates.

/// (De)serializes a [`Duration`](std::time::Duration) as whole milliseconds.
///
/// Use with `#[serde(with = "wisent_domain::serde_util::duration_millis")]`.
pub mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes the duration as milliseconds, saturating at `u64::MAX`.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Reads milliseconds into a duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an unsigned integer.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timed {
        #[serde(with = "super::duration_millis")]
        elapsed: Duration,
    }

    #[test]
    fn test_duration_as_millis() {
        let timed = Timed {
            elapsed: Duration::from_micros(1_500_900),
        };
        assert_eq!(serde_json::to_string(&timed).unwrap(), r#"{"elapsed":1500}"#);

        let parsed: Timed = serde_json::from_str(r#"{"elapsed":250}"#).unwrap();
        assert_eq!(parsed.elapsed, Duration::from_millis(250));
        assert!(serde_json::from_str::<Timed>(r#"{"elapsed":-1}"#).is_err());
    }
}
