//! Outbound Google Maps directions link.

use url::Url;

/// Base path of the directions endpoint.
pub const MAPS_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

/// Maps URLs API version.
pub const MAPS_API_VERSION: &str = "1";

/// Travel mode passed to the directions endpoint.
pub const TRAVEL_MODE: &str = "driving";

/// Build a directions link from `start` to `end`.
///
/// Returns an empty string when either address is blank; callers must not
/// render a link in that case. Addresses are percent-encoded as given, so
/// decoding the `origin`/`destination` parameters yields them back exactly.
pub fn build(start: &str, end: &str) -> String {
    if start.trim().is_empty() || end.trim().is_empty() {
        return String::new();
    }
    format!(
        "{}?api={}&origin={}&destination={}&travelmode={}",
        MAPS_DIRECTIONS_URL,
        MAPS_API_VERSION,
        urlencoding::encode(start),
        urlencoding::encode(end),
        TRAVEL_MODE
    )
}

/// Extract the decoded `(origin, destination)` pair from a directions link.
pub fn decode_query(link: &str) -> Option<(String, String)> {
    let url = Url::parse(link).ok()?;
    let mut origin = None;
    let mut destination = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "origin" => origin = Some(value.into_owned()),
            "destination" => destination = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((origin?, destination?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple_addresses() {
        let link = build("123 Main St", "456 Oak Ave");
        assert_eq!(
            link,
            "https://www.google.com/maps/dir/?api=1&origin=123%20Main%20St&destination=456%20Oak%20Ave&travelmode=driving"
        );
    }

    #[test]
    fn test_build_empty_start_returns_empty() {
        assert_eq!(build("", "456 Oak Ave"), "");
        assert_eq!(build("   ", "456 Oak Ave"), "");
    }

    #[test]
    fn test_build_empty_end_returns_empty() {
        assert_eq!(build("123 Main St", ""), "");
        assert_eq!(build("123 Main St", "\t"), "");
    }

    #[test]
    fn test_build_escapes_reserved_characters() {
        let link = build("A&B=C/D", "x?y#z+w");
        assert!(link.contains("origin=A%26B%3DC%2FD&"));
        assert!(link.contains("destination=x%3Fy%23z%2Bw&"));
        assert!(link.ends_with("&travelmode=driving"));
    }

    #[test]
    fn test_build_round_trips_through_decoding() {
        let cases = [
            ("123 Main St", "456 Oak Ave"),
            ("Unit 4/5, Dock & Co. = best", "50% off; \"quoted\" 'single'"),
            ("Straße 1, München", "東京都千代田区"),
            ("a+b c", "#1 (rear) @ gate!"),
        ];
        for (start, end) in cases {
            let link = build(start, end);
            let (origin, destination) = decode_query(&link).unwrap();
            assert_eq!(origin, start);
            assert_eq!(destination, end);
        }
    }

    #[test]
    fn test_build_keeps_untrimmed_addresses() {
        let link = build(" 1 Quay Rd ", "2 Dock Ln");
        let (origin, _) = decode_query(&link).unwrap();
        assert_eq!(origin, " 1 Quay Rd ");
    }

    #[test]
    fn test_fixed_parameters_present_once() {
        let link = build("a", "b");
        assert_eq!(link.matches("api=1").count(), 1);
        assert_eq!(link.matches("travelmode=driving").count(), 1);
        assert!(link.starts_with(MAPS_DIRECTIONS_URL));
    }

    #[test]
    fn test_decode_query_rejects_non_links() {
        assert!(decode_query("not a url").is_none());
        assert!(decode_query("https://www.google.com/maps/dir/?api=1").is_none());
    }
}
