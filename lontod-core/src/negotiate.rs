//! HTTP content negotiation over stored media types.

use std::cmp::Ordering;

use crate::error::NotAcceptable;
use crate::format::Format;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main: String,
    pub sub: String,
    /// Parameters other than `q`, lowercased names.
    pub params: Vec<(String, String)>,
    pub quality: f32,
}

impl MediaRange {
    /// Parse an `Accept` header into its ranges, in header order.
    ///
    /// Malformed entries are skipped. A missing or blank header accepts
    /// everything.
    pub fn parse_accept(header: Option<&str>) -> Vec<MediaRange> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return vec![MediaRange::any()];
        }
        header.split(',').filter_map(MediaRange::parse).collect()
    }

    /// `*/*;q=1`
    pub fn any() -> Self {
        Self {
            main: "*".into(),
            sub: "*".into(),
            params: Vec::new(),
            quality: 1.0,
        }
    }

    fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.split(';');
        let (main, sub) = parts.next()?.trim().split_once('/')?;
        let (main, sub) = (main.trim().to_ascii_lowercase(), sub.trim().to_ascii_lowercase());
        if main.is_empty() || sub.is_empty() || (main == "*" && sub != "*") {
            return None;
        }

        let mut quality = 1.0;
        let mut params = Vec::new();
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if name == "q" {
                quality = value.parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?;
            } else {
                params.push((name, value));
            }
        }

        Some(Self {
            main,
            sub,
            params,
            quality,
        })
    }

    /// How well `mime` fits this range, or `None` if it does not match.
    fn fitness(&self, mime: &Mime) -> Option<f32> {
        let base = if self.main == "*" {
            0.25
        } else if self.main != mime.main {
            return None;
        } else if self.sub == "*" {
            0.5
        } else if self.sub == mime.sub {
            1.0
        } else {
            return None;
        };

        let mismatched = self
            .params
            .iter()
            .filter(|(name, _)| name != "charset")
            .filter(|(name, value)| {
                mime.params
                    .iter()
                    .find(|(n, _)| n == name)
                    .is_none_or(|(_, v)| !v.eq_ignore_ascii_case(value))
            })
            .count();

        Some((base - 0.1 * mismatched as f32).max(0.01))
    }
}

/// An available media type split into comparable parts.
struct Mime {
    main: String,
    sub: String,
    params: Vec<(String, String)>,
}

impl Mime {
    fn parse(mime: &str) -> Option<Self> {
        let range = MediaRange::parse(mime)?;
        Some(Self {
            main: range.main,
            sub: range.sub,
            params: range.params,
        })
    }
}

/// Pick the best of `available` for the given `Accept` ranges.
///
/// An `override_type` naming one of `available` exactly wins outright. Each
/// type's quality comes from the most specific range matching it; the score
/// is quality times fitness, and ties go to the output format order.
pub fn negotiate<'a>(
    accept: &[MediaRange],
    available: &'a [String],
    override_type: Option<&str>,
) -> Result<&'a str, NotAcceptable> {
    if let Some(found) = override_type.and_then(|wanted| available.iter().find(|mime| *mime == wanted)) {
        return Ok(found.as_str());
    }

    let mut best: Option<(f32, &'a str)> = None;
    for candidate in available {
        let Some(mime) = Mime::parse(candidate) else {
            continue;
        };

        let matched = accept
            .iter()
            .filter_map(|range| range.fitness(&mime).map(|fitness| (fitness, range.quality)))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let Some((fitness, quality)) = matched else {
            continue;
        };

        let score = quality * fitness;
        if score <= 0.0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((top, current)) => match score.partial_cmp(&top) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => preference_key(candidate) < preference_key(current),
                _ => false,
            },
        };
        if better {
            best = Some((score, candidate.as_str()));
        }
    }

    best.map(|(_, mime)| mime).ok_or(NotAcceptable)
}

fn preference_key(mime: &str) -> (usize, &str) {
    let rank = Format::from_mime_type(mime)
        .and_then(Format::preference)
        .unwrap_or(usize::MAX);
    (rank, mime)
}
