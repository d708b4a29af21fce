use furimark::ruby::apply_mono_ruby;
use furimark::{Options, to_html_with_options};

fn mono_html(input: &str) -> String {
    let options = Options {
        mono_ruby: true,
        ..Options::default()
    };
    to_html_with_options(input, &options)
}

#[test]
fn test_one_segment_per_character() {
    assert_eq!(
        mono_html("漢字《かん じ》"),
        "<p><ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby></p>\n"
    );
}

#[test]
fn test_off_by_default() {
    assert_eq!(
        to_html_with_options("漢字《かん じ》", &Options::default()),
        "<p><ruby>漢字<rt>かん じ</rt></ruby></p>\n"
    );
}

#[test]
fn test_segment_count_mismatch_is_unchanged() {
    assert_eq!(
        mono_html("漢字《かんじ》"),
        "<p><ruby>漢字<rt>かんじ</rt></ruby></p>\n"
    );
    assert_eq!(
        mono_html("漢字《か ん じ》"),
        "<p><ruby>漢字<rt>か ん じ</rt></ruby></p>\n"
    );
}

#[test]
fn test_with_parentheses() {
    let options = Options {
        mono_ruby: true,
        use_rp_tag: true,
        ..Options::default()
    };
    assert_eq!(
        to_html_with_options("漢字《かん じ》", &options),
        "<p><ruby>漢<rp>(</rp><rt>かん</rt><rp>)</rp>字<rp>(</rp><rt>じ</rt><rp>)</rp></ruby></p>\n"
    );
}

#[test]
fn test_with_sutegana() {
    let options = Options {
        mono_ruby: true,
        use_sutegana: true,
        ..Options::default()
    };
    assert_eq!(
        to_html_with_options("拡張《かく ちょう》", &options),
        "<p><ruby>拡<rt>かく</rt>張<rt>ちよう</rt></ruby></p>\n"
    );
}

#[test]
fn test_strong_base_is_split() {
    assert_eq!(
        mono_html("｜**漢字**《かん じ》"),
        "<p><ruby><strong>漢</strong><rt>かん</rt><strong>字</strong><rt>じ</rt></ruby></p>\n"
    );
}

#[test]
fn test_markup_in_ruby_text_is_dropped() {
    assert_eq!(
        mono_html("漢字《**かん** じ》"),
        "<p><ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby></p>\n"
    );
}

#[test]
fn test_entity_in_base_counts_once() {
    assert_eq!(
        mono_html("｜A&amp;B《えー あんど びー》"),
        "<p><ruby>A<rt>えー</rt>&amp;<rt>あんど</rt>B<rt>びー</rt></ruby></p>\n"
    );
}

#[test]
fn test_escaped_tags_are_not_groups() {
    assert_eq!(
        mono_html("&lt;ruby&gt;漢字&lt;/ruby&gt;"),
        "<p>&lt;ruby&gt;漢字&lt;/ruby&gt;</p>\n"
    );
}

#[test]
fn test_only_qualifying_groups_change() {
    assert_eq!(
        mono_html("漢字《かん じ》と仮名《かな》"),
        "<p><ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>と<ruby>仮名<rt>かな</rt></ruby></p>\n"
    );
}

#[test]
fn test_direct_call_on_foreign_html() {
    let html = "<div><ruby><span class=\"k\">東京</span><rt>とう きょう</rt></ruby></div>";
    assert_eq!(
        apply_mono_ruby(html),
        "<div><ruby><span class=\"k\">東</span><rt>とう</rt><span class=\"k\">京</span><rt>きょう</rt></ruby></div>"
    );
}

#[test]
fn test_direct_call_without_groups() {
    let html = "<p>no ruby here</p>\n";
    assert_eq!(apply_mono_ruby(html), html);
    assert_eq!(apply_mono_ruby(""), "");
}
