use super::NamingContext;

/// Minimum-token partition of `run` into dictionary words.
///
/// `best[j]` holds the fewest tokens that cover `run[..j]` together with the
/// offset the last token starts at. Ties keep the first partition found
/// (left to right, shorter words first). `run` is ASCII by the time it gets
/// here, so byte offsets are char offsets.
pub(super) fn segment<'a>(run: &'a str, ctx: &NamingContext) -> Option<Vec<&'a str>> {
    if ctx.word_count() == 0 || run.is_empty() {
        return None;
    }

    let n = run.len();
    let longest = ctx.longest_word().min(n);
    let mut best: Vec<Option<(usize, usize)>> = vec![None; n + 1];
    best[0] = Some((0, 0));

    for start in 0..n {
        let Some((count, _)) = best[start] else { continue };
        for end in start + 1..=(start + longest).min(n) {
            if !ctx.contains_word(&run[start..end]) {
                continue;
            }
            let candidate = count + 1;
            if best[end].is_none_or(|(current, _)| candidate < current) {
                best[end] = Some((candidate, start));
            }
        }
    }

    best[n]?;
    let mut tokens = Vec::new();
    let mut end = n;
    while end > 0 {
        let (_, start) = best[end]?;
        tokens.push(&run[start..end]);
        end = start;
    }
    tokens.reverse();
    Some(tokens)
}
