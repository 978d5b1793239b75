use std::collections::BTreeSet;

/// Case-insensitive, order-insensitive token-set similarity in [0, 1].
///
/// Token-set construction: split both sides into lowercase alphanumeric
/// tokens, build the sorted intersection and the two sorted differences, join
/// each combination back into a string, and score the three pairings with a
/// normalized indel ratio, taking the maximum. A quote whose tokens are a
/// subset of the chunk's tokens scores 1.0, which is exactly the behavior the
/// quote-reconciliation step relies on.
pub fn token_set_ratio(a: &str, b: &str) -> f32 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a
        .intersection(&tokens_b)
        .map(String::as_str)
        .collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

    let sect = intersection.join(" ");
    let sect_plus_a = join_nonempty(&sect, &only_a.join(" "));
    let sect_plus_b = join_nonempty(&sect, &only_b.join(" "));

    let r1 = indel_ratio(&sect, &sect_plus_a);
    let r2 = indel_ratio(&sect, &sect_plus_b);
    let r3 = indel_ratio(&sect_plus_a, &sect_plus_b);
    r1.max(r2).max(r3)
}

fn tokenize(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Normalized indel similarity: `2 * LCS(a, b) / (|a| + |b|)`, i.e. one minus
/// the insertion/deletion distance over the combined length.
fn indel_ratio(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // Rolling single-row LCS table.
    let mut row = vec![0usize; b_chars.len() + 1];
    for &ca in a_chars.iter() {
        let mut prev_diag = 0usize;
        for (j, &cb) in b_chars.iter().enumerate() {
            let tmp = row[j + 1];
            row[j + 1] = if ca == cb {
                prev_diag + 1
            } else {
                row[j + 1].max(row[j])
            };
            prev_diag = tmp;
        }
    }

    let lcs = row[b_chars.len()];
    (2.0 * lcs as f32) / ((a_chars.len() + b_chars.len()) as f32)
}
