use sb_core::LyricsFragment;
use tracing::trace;

/// Push chords apart so that neighbours keep at least `space_width` between
/// them. Text starting at or after a shifted chord moves along with it.
///
/// Both slices must be sorted by `x`. Returns the number of shifts applied.
pub fn resolve_chord_overlaps(
    chords: &mut [LyricsFragment],
    texts: &mut [LyricsFragment],
    space_width: f32,
) -> usize {
    let mut shifts = 0;
    for index in 1..chords.len() {
        let previous = &chords[index - 1];
        let anchor = chords[index].x;
        let delta = previous.x + previous.width + space_width - anchor;
        if delta <= 0.0 {
            continue;
        }
        trace!(chord = %chords[index].text, delta, "shifting overlapping chord");
        for chord in &mut chords[index..] {
            chord.x += delta;
        }
        for text in texts.iter_mut().filter(|text| text.x >= anchor) {
            text.x += delta;
        }
        shifts += 1;
    }
    shifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spaced_chords_are_untouched() {
        let mut chords = vec![
            LyricsFragment::chord("a F", 3.0).at(4.0),
            LyricsFragment::chord("C", 1.0).at(8.0),
        ];
        let mut texts = vec![
            LyricsFragment::text("here", 4.0),
            LyricsFragment::text("goes", 4.0).at(4.0),
            LyricsFragment::text("accent", 6.0).at(8.0),
        ];
        assert_eq!(resolve_chord_overlaps(&mut chords, &mut texts, 1.0), 0);
        assert_eq!(chords[1].x, 8.0);
        assert_eq!(texts[2].x, 8.0);
    }

    #[test]
    fn overlapping_chord_and_following_text_shift_right() {
        let mut chords = vec![
            LyricsFragment::chord("Cmaj7", 5.0).at(0.0),
            LyricsFragment::chord("G", 1.0).at(2.0),
            LyricsFragment::chord("D", 1.0).at(9.0),
        ];
        let mut texts = vec![
            LyricsFragment::text("la", 2.0),
            LyricsFragment::text("lala", 4.0).at(2.0),
            LyricsFragment::text("lo", 2.0).at(6.0),
        ];
        assert_eq!(resolve_chord_overlaps(&mut chords, &mut texts, 1.0), 1);
        let chord_xs: Vec<f32> = chords.iter().map(|chord| chord.x).collect();
        assert_eq!(chord_xs, vec![0.0, 6.0, 13.0]);
        let text_xs: Vec<f32> = texts.iter().map(|text| text.x).collect();
        assert_eq!(text_xs, vec![0.0, 6.0, 10.0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_neighbours_keep_a_space_apart(
            layout in prop::collection::vec((0u8..6, 1u8..6), 1..12),
            space in 0.5f32..2.0,
        ) {
            let mut x = 0.0;
            let mut chords = Vec::new();
            for (advance, width) in layout {
                x += f32::from(advance);
                chords.push(LyricsFragment::chord("C", f32::from(width)).at(x));
            }
            let mut texts = Vec::new();
            resolve_chord_overlaps(&mut chords, &mut texts, space);
            for pair in chords.windows(2) {
                prop_assert!(pair[1].x + 1e-3 >= pair[0].x + pair[0].width + space);
            }
        }
    }
}
