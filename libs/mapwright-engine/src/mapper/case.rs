use mapwright_api::mapping::CaseDirective;

/// Apply a case directive to a single key.
pub fn apply_directive(directive: CaseDirective, key: &str) -> String {
    match directive {
        CaseDirective::ToCamelCase => to_camel_case(key),
        // Upper-cases despite the name; see `CaseDirective::ToLowercase`.
        CaseDirective::ToLowercase => key.to_uppercase(),
    }
}

/// `last_name` → `lastName`. The first word is kept verbatim, the rest are
/// title-cased and joined.
pub fn to_camel_case(key: &str) -> String {
    let mut words = key.split('_');
    let mut out = words.next().unwrap_or_default().to_string();
    for word in words {
        out.push_str(&title_case(word));
    }
    out
}

/// Upper-case the first cased character of every run of cased characters,
/// lower-case the rest. Digits and punctuation start a new run.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut previous_cased = false;
    for c in word.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && previous_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_basic() {
        assert_eq!(to_camel_case("last_name"), "lastName");
        assert_eq!(to_camel_case("a_b_c"), "aBC");
        assert_eq!(to_camel_case("plain"), "plain");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn camel_case_keeps_first_word_and_lowers_tail() {
        assert_eq!(to_camel_case("Bb_CC"), "BbCc");
        assert_eq!(to_camel_case("ssss_ttt"), "ssssTtt");
        assert_eq!(to_camel_case("utc_2nd_try"), "utc2NdTry");
    }

    #[test]
    fn camel_case_edge_underscores() {
        assert_eq!(to_camel_case("_private"), "Private");
        assert_eq!(to_camel_case("double__under"), "doubleUnder");
        assert_eq!(to_camel_case("trailing_"), "trailing");
    }

    #[test]
    fn lowercase_directive_upper_cases() {
        assert_eq!(apply_directive(CaseDirective::ToLowercase, "abc"), "ABC");
        assert_eq!(apply_directive(CaseDirective::ToLowercase, "b.c"), "B.C");
        assert_eq!(apply_directive(CaseDirective::ToCamelCase, "bb_cc"), "bbCc");
    }
}
