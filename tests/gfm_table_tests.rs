//! GFM table tests.

use runemark::Markdown;

fn to_html(src: &str) -> String {
    Markdown::gfm().convert(src).expect("convert")
}

#[test]
fn basic_table() {
    let input = "| a | b |\n|---|---|\n| 1 | 2 |\n";
    let expected = "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td>2</td>\n</tr>\n</tbody>\n</table>\n";
    assert_eq!(to_html(input), expected);
}

#[test]
fn alignment_attributes() {
    let input = "| a | b | c |\n| :- | :-: | -: |\n| 1 | 2 | 3 |\n";
    let html = to_html(input);
    assert!(html.contains("<th align=\"left\">a</th>"));
    assert!(html.contains("<th align=\"center\">b</th>"));
    assert!(html.contains("<th align=\"right\">c</th>"));
    assert!(html.contains("<td align=\"center\">2</td>"));
}

#[test]
fn escaped_pipe_in_cell() {
    let input = "| f\\|oo |\n| --- |\n| `\\|` |\n";
    let html = to_html(input);
    assert!(html.contains("<th>f|oo</th>"));
    assert!(html.contains("<td><code>|</code></td>"));
}

#[test]
fn header_only_table_has_no_tbody() {
    let input = "| a | b |\n| --- | --- |\n";
    let html = to_html(input);
    assert!(html.contains("<thead>"));
    assert!(!html.contains("<tbody>"));
}

#[test]
fn cell_count_mismatch_is_not_a_table() {
    let input = "| a | b |\n| --- |\n";
    let html = to_html(input);
    assert!(!html.contains("<table>"));
    assert!(html.contains("<p>"));
}

#[test]
fn short_rows_pad_and_long_rows_truncate() {
    let input = "| a | b |\n| --- | --- |\n| 1 |\n| 1 | 2 | 3 |\n";
    let html = to_html(input);
    assert!(html.contains("<td>1</td>\n<td></td>"));
    assert!(!html.contains("<td>3</td>"));
}

#[test]
fn blank_line_ends_table() {
    let input = "| a |\n| --- |\n| 1 |\n\nafter\n";
    let html = to_html(input);
    assert!(html.contains("</table>\n<p>after</p>\n"));
}

#[test]
fn block_quote_ends_table() {
    let input = "| a |\n| --- |\n| 1 |\n> q\n";
    let html = to_html(input);
    assert!(html.contains("</table>\n<blockquote>"));
}

#[test]
fn inline_markup_inside_cells() {
    let input = "| *em* |\n| --- |\n| **st** |\n";
    let html = to_html(input);
    assert!(html.contains("<th><em>em</em></th>"));
    assert!(html.contains("<td><strong>st</strong></td>"));
}

#[test]
fn pipeless_line_continues_body() {
    let input = "| a | b |\n| --- | --- |\n| 1 | 2 |\nplain\n";
    let html = to_html(input);
    assert!(html.contains("<td>plain</td>"));
}
