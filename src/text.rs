//! Plate text normalisation and similarity scoring.

/// Sentinel written by the recogniser when no plate text was read.
pub const NO_PLATE_SENTINEL: &str = "-";

/// Normalise plate text for comparison.
///
/// `None`, the empty string and the `"-"` sentinel all map to `""`
/// ("no plate text"). Anything else is uppercased, trimmed, and internal
/// whitespace runs are collapsed to a single space. The sentinel check runs
/// on the collapsed text so that `" - "` also means "no plate" and the
/// function stays idempotent.
pub fn normalize_plate_text(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(s) => normalize(s),
    }
}

/// [`normalize_plate_text`] for text that is known to be present.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed == NO_PLATE_SENTINEL {
        return String::new();
    }
    collapsed
}

/// Levenshtein distance (single-character insert, delete, substitute).
///
/// Works on Unicode scalar values. Uses two rolling rows sized by the shorter
/// input, so memory is O(min(len(a), len(b))).
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Shorter string drives the inner loop
    let (long, short) = if a.len() < b.len() { (&b, &a) } else { (&a, &b) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Character error rate of `pred` against `gt`.
///
/// Both inputs are normalised first. An empty ground truth scores 0.0 when
/// the prediction is empty too, and 1.0 otherwise. The result is not clamped:
/// a prediction much longer than the ground truth can score above 1.0.
pub fn character_error_rate(pred: Option<&str>, gt: Option<&str>) -> f64 {
    let pred = normalize_plate_text(pred);
    let gt = normalize_plate_text(gt);

    if gt.is_empty() {
        return if pred.is_empty() { 0.0 } else { 1.0 };
    }

    levenshtein_distance(&pred, &gt) as f64 / gt.chars().count() as f64
}

/// Whether `pred` and `gt` are equal after normalisation.
pub fn is_exact_match(pred: Option<&str>, gt: Option<&str>) -> bool {
    normalize_plate_text(pred) == normalize_plate_text(gt)
}
