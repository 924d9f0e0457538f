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

//! Textual delta reconstruction for subscription documents.
//!
//! Delta frames patch the *raw text* of the previous snapshot rather than the
//! parsed JSON tree: the server's edit positions refer to the exact characters
//! it serialized, so the stored snapshot must never be normalized through a
//! local JSON encoder or subsequent deltas would misalign.
//!
//! A delta is a whitespace-separated token sequence:
//!
//! | Token   | Meaning                                               |
//! |---------|-------------------------------------------------------|
//! | `=N`    | Copy the next `N` characters of the previous snapshot |
//! | `-N`    | Skip the next `N` characters of the previous snapshot |
//! | `+TEXT` | Insert the literal characters `TEXT`                  |

use thiserror::Error;

/// Errors raised while applying a delta script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
    /// A token was not one of `=N`, `-N`, or `+TEXT`.
    #[error("Invalid delta token: `{0}`")]
    InvalidToken(String),
    /// A copy or skip ran past the end of the previous snapshot.
    #[error("Token `{0}` overruns the end of the previous snapshot")]
    OutOfRange(String),
}

/// Applies a delta script to the previous snapshot text, returning the new
/// document text.
///
/// Counts are in characters. The cursor is not required to end at the end of
/// `previous`; trailing characters are implicitly discarded. An empty delta
/// therefore yields an empty document.
///
/// Pure: `previous` is never mutated, and a failed apply leaves no partial
/// state behind for the caller to observe.
///
/// # Errors
///
/// Returns an error on a malformed token or when a copy/skip overruns the end
/// of `previous`.
pub fn apply_delta(previous: &str, delta: &str) -> Result<String, DeltaError> {
    let mut rest = previous.chars();
    let mut out = String::with_capacity(previous.len());

    for token in delta.split_whitespace() {
        if let Some(text) = token.strip_prefix('+') {
            out.push_str(text);
        } else if let Some(count) = token.strip_prefix('=') {
            let count = parse_count(token, count)?;
            for _ in 0..count {
                let c = rest
                    .next()
                    .ok_or_else(|| DeltaError::OutOfRange(token.to_string()))?;
                out.push(c);
            }
        } else if let Some(count) = token.strip_prefix('-') {
            let count = parse_count(token, count)?;
            for _ in 0..count {
                rest.next()
                    .ok_or_else(|| DeltaError::OutOfRange(token.to_string()))?;
            }
        } else {
            return Err(DeltaError::InvalidToken(token.to_string()));
        }
    }

    Ok(out)
}

fn parse_count(token: &str, digits: &str) -> Result<usize, DeltaError> {
    digits
        .parse::<usize>()
        .map_err(|_| DeltaError::InvalidToken(token.to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Hello", "=5 +World", "HelloWorld")]
    #[case("Hello World", "=5 -6", "Hello")]
    #[case("Hello World", "=11", "Hello World")]
    #[case("Hello World", "", "")]
    fn test_apply_scenarios(#[case] previous: &str, #[case] delta: &str, #[case] expected: &str) {
        assert_eq!(apply_delta(previous, delta).unwrap(), expected);
    }

    #[rstest]
    fn test_skip_in_the_middle() {
        assert_eq!(apply_delta("abcdef", "=2 -2 =2").unwrap(), "abef");
    }

    #[rstest]
    fn test_insert_between_copies() {
        assert_eq!(
            apply_delta("{\"a\":1,\"b\":2}", "=11 +9}").unwrap(),
            "{\"a\":1,\"b\":9}"
        );
    }

    #[rstest]
    fn test_trailing_characters_are_discarded() {
        assert_eq!(apply_delta("Hello World", "=5").unwrap(), "Hello");
    }

    #[rstest]
    fn test_zero_counts_are_noops() {
        assert_eq!(apply_delta("abc", "=0 -0 =3").unwrap(), "abc");
    }

    #[rstest]
    fn test_bare_plus_inserts_nothing() {
        assert_eq!(apply_delta("abc", "=1 + =1").unwrap(), "ab");
    }

    #[rstest]
    fn test_counts_are_characters_not_bytes() {
        assert_eq!(apply_delta("héllo", "=2").unwrap(), "hé");
        assert_eq!(apply_delta("héllo", "-2 =3").unwrap(), "llo");
    }

    #[rstest]
    #[case("=x")]
    #[case("-")]
    #[case("=-1")]
    #[case("copy5")]
    fn test_invalid_tokens(#[case] token: &str) {
        let err = apply_delta("Hello", token).unwrap_err();
        assert_eq!(err, DeltaError::InvalidToken(token.to_string()));
    }

    #[rstest]
    fn test_copy_past_end_fails() {
        let err = apply_delta("abc", "=4").unwrap_err();
        assert_eq!(err, DeltaError::OutOfRange("=4".to_string()));
    }

    #[rstest]
    fn test_skip_past_end_fails() {
        let err = apply_delta("abc", "=3 -1").unwrap_err();
        assert_eq!(err, DeltaError::OutOfRange("-1".to_string()));
    }

    #[rstest]
    fn test_apply_is_pure() {
        let previous = "Hello World";
        let first = apply_delta(previous, "=5 +!").unwrap();
        let second = apply_delta(previous, "=5 +!").unwrap();
        assert_eq!(first, second);
        assert_eq!(previous, "Hello World");
    }

    #[rstest]
    fn test_reconstruction_round_trip() {
        // An edit script from one realistic document text to another
        let previous = "{\"bid\":{\"price\":101.5},\"ask\":{\"price\":101.9}}";
        let delta = "=16 -5 +102.25 =17 -5 +102.4 =2";
        let expected = "{\"bid\":{\"price\":102.25},\"ask\":{\"price\":102.4}}";
        assert_eq!(apply_delta(previous, delta).unwrap(), expected);
    }
}
