/// Maximum caption chunk length, in characters.
pub const WRAP_WIDTH: usize = 40;

/// Split long caption lines into chunks of at most [`WRAP_WIDTH`] characters.
///
/// Lines are trimmed; short lines pass through, long lines are broken greedily at whitespace and
/// their words re-joined with single spaces. A word longer than the width is cut at character
/// boundaries. Empty results are dropped.
pub fn wrap_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if line.chars().count() <= WRAP_WIDTH {
            out.push(line.to_string());
            continue;
        }
        wrap_one(line, &mut out);
    }
    out
}

fn wrap_one(line: &str, out: &mut Vec<String>) {
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > WRAP_WIDTH {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(WRAP_WIDTH).peekable();
            while let Some(piece) = pieces.next() {
                let piece: String = piece.iter().collect();
                if pieces.peek().is_some() {
                    out.push(piece);
                } else {
                    // The tail can still share a chunk with following words.
                    cur_len = piece.chars().count();
                    cur = piece;
                }
            }
            continue;
        }

        let needed = if cur.is_empty() {
            word_len
        } else {
            cur_len + 1 + word_len
        };
        if needed > WRAP_WIDTH {
            out.push(std::mem::take(&mut cur));
            cur.push_str(word);
            cur_len = word_len;
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
            cur_len = needed;
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/wrap.rs"]
mod tests;
