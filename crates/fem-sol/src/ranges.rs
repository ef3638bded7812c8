//! Compact run-length encoding for id sets.
//!
//! Members are either a literal id or an inclusive run written `a - b`.

/// Shortest run written in `a - b` form.
const MIN_RUN: usize = 3;

/// Encodes ids as comma-separated members, collapsing runs of three or more
/// consecutive ids. Input order does not matter; duplicates are dropped.
pub fn encode_id_ranges(ids: &[i32]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut members = Vec::new();
    let mut i = 0usize;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[j] + 1 {
            j += 1;
        }
        if j - i + 1 >= MIN_RUN {
            members.push(format!("{} - {}", sorted[i], sorted[j]));
        } else {
            members.extend(sorted[i..=j].iter().map(|id| id.to_string()));
        }
        i = j + 1;
    }

    members.join(", ")
}

/// Expands member tokens back into ids. Returns a message describing the first
/// bad token on failure.
pub fn decode_id_members<S: AsRef<str>>(members: &[S]) -> Result<Vec<i32>, String> {
    let mut ids = Vec::new();
    for member in members {
        let token = member.as_ref().trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_id(start)?;
                let end = parse_id(end)?;
                if start > end {
                    return Err(format!("descending range '{token}'"));
                }
                ids.extend(start..=end);
            }
            None => ids.push(parse_id(token)?),
        }
    }
    Ok(ids)
}

fn parse_id(raw: &str) -> Result<i32, String> {
    let raw = raw.trim();
    raw.parse::<i32>()
        .map_err(|_| format!("invalid set member '{raw}'"))
}
