//! Property-based tests using proptest
//!
//! Ruby recognition must never panic, never leak scanner state into the
//! output, and never change text that contains no ruby markers.

use furimark::ruby::apply_mono_ruby;
use furimark::{Options, parse_document, to_html, to_html_with_options};
use proptest::prelude::*;

fn all_options() -> Options {
    Options {
        use_sutegana: true,
        use_rp_tag: true,
        mono_ruby: true,
    }
}

proptest! {
    /// Without `｜《》` no option changes the output.
    #[test]
    fn test_marker_free_input_is_unaffected(
        input in "[a-zA-Z0-9 *_`\\\\&;#\n漢字仮名かなょカナッ。、ｸﾞ]{0,64}"
    ) {
        let html = to_html(&input);
        prop_assert!(!html.contains("<ruby>"));
        prop_assert_eq!(to_html_with_options(&input, &all_options()), html);
    }

    /// Arbitrary marker soup renders balanced ruby markup.
    #[test]
    fn test_marker_soup_is_balanced(
        input in "[｜《》\\\\*_` \n漢字かなカナabc]{0,64}"
    ) {
        let html = to_html_with_options(&input, &Options { use_rp_tag: true, ..Options::default() });
        let rubies = html.matches("<ruby>").count();
        prop_assert_eq!(rubies, html.matches("</ruby>").count());
        prop_assert_eq!(rubies, html.matches("<rt>").count());
        prop_assert_eq!(rubies * 2, html.matches("<rp>").count());
    }

    /// Every ruby node carries exactly one ruby text.
    #[test]
    fn test_document_counts_match_rubies(
        input in "[｜《》\\\\*` \n漢字かなabc]{0,64}"
    ) {
        let doc = parse_document(&input, &Options::default());
        prop_assert_eq!(doc.ruby_nodes().count(), doc.visible_character_counts().count());
    }

    /// Mono-ruby tolerates any HTML-ish input.
    #[test]
    fn test_mono_ruby_never_panics(
        html in "(<ruby>|</ruby>|<rt>|</rt>|<rp>|</rp>|<em>|</em>|<br>|&amp;|&|<|>| |漢|字|か|a){0,32}"
    ) {
        let out = apply_mono_ruby(&html);
        if !html.contains("<ruby>") {
            prop_assert_eq!(out, html);
        }
    }

    /// Mono-ruby over rendered output keeps one `<rt>` per base character.
    #[test]
    fn test_mono_ruby_splits_evenly(base in "[漢字仮名]{1,6}") {
        let chars = base.chars().count();
        let reading = vec!["よ"; chars].join(" ");
        let html = to_html_with_options(
            &format!("{base}《{reading}》"),
            &Options { mono_ruby: true, ..Options::default() },
        );
        prop_assert_eq!(html.matches("<rt>").count(), chars);
    }
}
