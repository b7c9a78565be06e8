//! Postcode Area/District Extraction

/// Outward-code components of a UK postcode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostcodeParts<'a> {
    /// One or two leading letters, e.g. "SW"
    pub area: Option<&'a str>,
    /// One or two digits following the area, e.g. "1"
    pub district: Option<&'a str>,
}

impl<'a> PostcodeParts<'a> {
    /// Split a postcode into area and district
    ///
    /// Matching is anchored at the start of the string. Either part is
    /// `None` when its pattern does not match.
    pub fn parse(postcode: &'a str) -> Self {
        let area_len = leading_len(postcode, 0, |b| b.is_ascii_alphabetic());
        if area_len == 0 {
            return Self::default();
        }

        let digits_len = leading_len(postcode, area_len, |b| b.is_ascii_digit());
        Self {
            area: Some(&postcode[..area_len]),
            district: (digits_len > 0).then(|| &postcode[area_len..area_len + digits_len]),
        }
    }
}

/// Length (at most 2) of the run of matching ASCII bytes starting at `start`
fn leading_len(s: &str, start: usize, pred: impl Fn(u8) -> bool) -> usize {
    s.as_bytes()[start..]
        .iter()
        .take(2)
        .take_while(|&&b| pred(b))
        .count()
}
