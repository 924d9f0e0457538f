// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2026 traderepublic-rs contributors. All rights reserved.
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Set-Cookie parsing for session extraction.
//!
//! The session flows care only about the `name=value` prefix of each cookie;
//! attributes are discarded. Parsing must cope with both delivery shapes:
//! repeated `Set-Cookie` headers, and a single header whose value joins
//! several cookies with `,` (where a comma may also legitimately appear inside
//! a quoted cookie value or an `expires=Wed, 21 Oct …` attribute).

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Extracts session cookies from response headers as `name=value` pairs.
///
/// Every `Set-Cookie` header is considered; each header value is additionally
/// split on cookie boundaries via [`split_set_cookie`], so servers that join
/// cookies into one header are handled identically to servers that repeat the
/// header.
#[must_use]
pub fn extract_cookies(headers: &HeaderMap) -> Vec<String> {
    let mut cookies = Vec::new();
    for value in headers.get_all(SET_COOKIE) {
        let value = String::from_utf8_lossy(value.as_bytes());
        for cookie in split_set_cookie(&value) {
            if let Some(pair) = name_value(&cookie) {
                cookies.push(pair);
            }
        }
    }
    cookies
}

/// Splits a possibly comma-joined `Set-Cookie` value into individual cookies.
///
/// A `,` is a boundary only when it is outside `"`-quoted regions and the
/// text after it looks like the start of a new cookie (`name=`, where `name`
/// is not a weekday token from an `expires=` date).
#[must_use]
pub fn split_set_cookie(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes && is_cookie_boundary(&value[i + 1..]) => {
                parts.push(value[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Whether `rest` (the text after a candidate `,`) begins a new cookie.
fn is_cookie_boundary(rest: &str) -> bool {
    let rest = rest.trim_start();
    let name_len = rest
        .find(|c: char| c == '=' || c == ';' || c.is_whitespace())
        .unwrap_or(rest.len());
    if name_len == 0 {
        return false;
    }
    let name = &rest[..name_len];
    if !rest[name_len..].trim_start().starts_with('=') {
        return false;
    }
    !is_weekday(name)
}

fn is_weekday(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "mon"
            | "tue"
            | "wed"
            | "thu"
            | "fri"
            | "sat"
            | "sun"
            | "monday"
            | "tuesday"
            | "wednesday"
            | "thursday"
            | "friday"
            | "saturday"
            | "sunday"
    )
}

/// Returns the `name=value` prefix of a cookie, discarding attributes.
fn name_value(cookie: &str) -> Option<String> {
    let prefix = cookie.split(';').next()?.trim();
    if prefix.is_empty() || !prefix.contains('=') {
        return None;
    }
    Some(prefix.to_string())
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_split_honors_expires_date() {
        let value = "session=abc; expires=Wed, 21 Oct 2025 07:28:00 GMT, user=xyz; path=/";
        let parts = split_set_cookie(value);
        assert_eq!(
            parts,
            vec![
                "session=abc; expires=Wed, 21 Oct 2025 07:28:00 GMT".to_string(),
                "user=xyz; path=/".to_string(),
            ]
        );
    }

    #[rstest]
    fn test_split_honors_quoted_commas() {
        let value = "data={\"name\":\"John, Doe\"}; path=/, token=12345";
        let parts = split_set_cookie(value);
        assert_eq!(
            parts,
            vec![
                "data={\"name\":\"John, Doe\"}; path=/".to_string(),
                "token=12345".to_string(),
            ]
        );
    }

    #[rstest]
    fn test_extract_discards_attributes() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static(
                "session=abc; expires=Wed, 21 Oct 2025 07:28:00 GMT, user=xyz; path=/",
            ),
        );
        assert_eq!(extract_cookies(&headers), vec!["session=abc", "user=xyz"]);
    }

    #[rstest]
    fn test_extract_keeps_quoted_value_intact() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("data={\"name\":\"John, Doe\"}; path=/, token=12345"),
        );
        assert_eq!(
            extract_cookies(&headers),
            vec!["data={\"name\":\"John, Doe\"}", "token=12345"]
        );
    }

    #[rstest]
    fn test_individual_and_joined_headers_are_equivalent() {
        let mut individual = HeaderMap::new();
        individual.append(
            SET_COOKIE,
            HeaderValue::from_static("session=abc; expires=Wed, 21 Oct 2025 07:28:00 GMT"),
        );
        individual.append(SET_COOKIE, HeaderValue::from_static("user=xyz; path=/"));

        let mut joined = HeaderMap::new();
        joined.append(
            SET_COOKIE,
            HeaderValue::from_static(
                "session=abc; expires=Wed, 21 Oct 2025 07:28:00 GMT, user=xyz; path=/",
            ),
        );

        assert_eq!(extract_cookies(&individual), extract_cookies(&joined));
    }

    #[rstest]
    fn test_weekday_named_cookie_is_not_a_boundary() {
        // A bare weekday before '=' is assumed to belong to a date attribute
        let parts = split_set_cookie("a=1; expires=Thursday, Wed=oops");
        assert_eq!(parts, vec!["a=1; expires=Thursday, Wed=oops".to_string()]);
    }

    #[rstest]
    fn test_junk_without_equals_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("not-a-cookie"));
        assert!(extract_cookies(&headers).is_empty());
    }

    #[rstest]
    fn test_empty_header_map() {
        assert!(extract_cookies(&HeaderMap::new()).is_empty());
    }
}
