/// Simple word-wrap helper.
/// Uses `chars().count()` for the width check so multi-byte UTF-8 strings
/// are measured in characters, not bytes. Words longer than `max_width`
/// are split.
pub(crate) fn word_wrap(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            for piece in split_long(word, max_width) {
                if current.is_empty() {
                    current = piece;
                } else if current.chars().count() + 1 + piece.chars().count() <= max_width {
                    current.push(' ');
                    current.push_str(&piece);
                } else {
                    result.push(std::mem::replace(&mut current, piece));
                }
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

fn split_long(word: &str, max_width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max_width).map(|c| c.iter().collect()).collect()
}

/// Pad or cut `s` to exactly `width` chars
pub(crate) fn fit(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count > width {
        s.chars().take(width).collect()
    } else {
        format!("{}{}", s, " ".repeat(width - count))
    }
}

/// Pretty-print `s` if it holds a JSON object or array
pub(crate) fn try_pretty_json(s: &str) -> Option<String> {
    let trimmed = s.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(s).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
