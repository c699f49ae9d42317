//! Narration and noise extraction over the raw assistant buffer.
//!
//! Always re-derived from the full buffer, never patched incrementally: a
//! delimiter can straddle two fragments, so any incremental scheme would
//! miss spans that only become well-formed once the next fragment lands.

use std::sync::OnceLock;

use regex::Regex;

pub const NARRATION_OPEN: &str = "<thinking>";
pub const NARRATION_CLOSE: &str = "</thinking>";

/// Display text and narration re-derived from one raw buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub display: String,
    pub narration: Option<String>,
}

fn noise_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        // Stray follow-up closers and leaked perception payload blocks.
        Regex::new(r"(?s)</follow-?ups?>|<perception>.*?</perception>")
            .expect("noise regex must compile")
    })
}

/// Split the raw buffer into display text and narration.
///
/// Closed narration spans are removed wholesale and the most recent one
/// supplies the narration; an unclosed trailing open tag claims everything
/// after it. Known noise patterns are stripped from the display text.
pub fn split_narration(raw: &str) -> Extraction {
    let mut display = String::with_capacity(raw.len());
    let mut narration = None;
    let mut rest = raw;

    while let Some(open) = rest.find(NARRATION_OPEN) {
        display.push_str(&rest[..open]);
        let after_open = &rest[open + NARRATION_OPEN.len()..];

        match after_open.find(NARRATION_CLOSE) {
            Some(close) => {
                narration = Some(after_open[..close].to_string());
                rest = &after_open[close + NARRATION_CLOSE.len()..];
            }
            None => {
                narration = Some(after_open.to_string());
                rest = "";
            }
        }
    }
    display.push_str(rest);

    let display = noise_regex().replace_all(&display, "").trim().to_string();

    Extraction { display, narration }
}
