//! Match delimiter openers with closers
//!
//! Closers look back for the nearest compatible opener. `openers_bottom`
//! keeps the lowest index worth searching per marker, closer flavour and
//! run length modulo 3, and `jumps` skips already matched ranges, so the
//! pass stays linear on inputs like `*_*_*_*_`.

use std::collections::HashMap;

use super::{Delimiter, InlineState};

fn process(delimiters: &mut [Delimiter]) {
    let max = delimiters.len();
    if max == 0 {
        return;
    }

    let mut openers_bottom: HashMap<u8, [isize; 6]> = HashMap::new();
    let mut header_idx = 0;
    let mut last_token_idx: isize = -2;
    let mut jumps: Vec<usize> = Vec::with_capacity(max);

    for closer_idx in 0..max {
        jumps.push(0);
        let closer_token = delimiters[closer_idx].token as isize;
        // one run: adjacent tokens with the same marker
        if delimiters[header_idx].marker != delimiters[closer_idx].marker
            || last_token_idx != closer_token - 1
        {
            header_idx = closer_idx;
        }
        last_token_idx = closer_token;

        let closer = delimiters[closer_idx].clone();
        if !closer.close {
            continue;
        }

        let bucket = (if closer.open { 3 } else { 0 }) + closer.length % 3;
        let bottoms = openers_bottom.entry(closer.marker).or_insert([-1; 6]);
        let min_opener_idx = bottoms[bucket];

        let mut opener_idx = header_idx as isize - jumps[header_idx] as isize - 1;
        let mut new_min_opener_idx = opener_idx;

        while opener_idx > min_opener_idx {
            let oi = opener_idx as usize;
            let opener = &delimiters[oi];
            if opener.marker == closer.marker && opener.open && opener.end.is_none() {
                // rule of three
                let odd_match = (opener.close || closer.open)
                    && (opener.length + closer.length) % 3 == 0
                    && (opener.length % 3 != 0 || closer.length % 3 != 0);

                if !odd_match {
                    // a preceding non-opener lets later searches skip the
                    // whole sequence
                    let last_jump = if oi > 0 && !delimiters[oi - 1].open {
                        jumps[oi - 1] + 1
                    } else {
                        0
                    };
                    jumps[closer_idx] = closer_idx - oi + last_jump;
                    jumps[oi] = last_jump;

                    delimiters[closer_idx].open = false;
                    delimiters[oi].end = Some(closer_idx);
                    delimiters[oi].close = false;
                    new_min_opener_idx = -1;
                    last_token_idx = -2;
                    break;
                }
            }
            opener_idx -= jumps[oi] as isize + 1;
        }

        if new_min_opener_idx != -1 {
            // nothing matched; later closers of this kind need not look
            // further back than here
            let bucket = (if delimiters[closer_idx].open { 3 } else { 0 }) + closer.length % 3;
            if let Some(bottoms) = openers_bottom.get_mut(&closer.marker) {
                bottoms[bucket] = new_min_opener_idx;
            }
        }
    }
}

pub fn rule(state: &mut InlineState) {
    process(&mut state.delimiters);
    for list in state.tokens_meta.iter_mut().flatten() {
        process(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delim(token: usize, open: bool, close: bool) -> Delimiter {
        Delimiter {
            marker: b'*',
            length: 1,
            token,
            end: None,
            open,
            close,
        }
    }

    #[test]
    fn test_pairs_nearest_opener() {
        let mut list = vec![delim(0, true, false), delim(2, true, false), delim(4, false, true)];
        process(&mut list);
        assert_eq!(list[0].end, None);
        assert_eq!(list[1].end, Some(2));
    }

    #[test]
    fn test_unmatched_closer_leaves_list_untouched() {
        let mut list = vec![delim(0, false, true), delim(2, false, true)];
        process(&mut list);
        assert!(list.iter().all(|d| d.end.is_none()));
    }
}
