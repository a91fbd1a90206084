use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Last path segment of a hierarchical id such as `/bm/cpu/0`.
pub fn short_name(id: &str) -> &str {
    id.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(id)
}

/// Symptom text arrives with `<br>` separators; one entry per symptom.
pub fn symptom_lines(symptoms: &str) -> Vec<&str> {
    symptoms
        .split("<br>")
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
