use std::io::Write;

use goldenfile::Mint;

/// Compares `content` against the golden file at `testdata/golden/<golden_path>`.
pub fn golden_test(golden_path: &str, content: &str) {
    let mut mint = Mint::new("testdata/golden");
    let differ = Box::new(goldenfile::differs::text_diff);
    let mut out = mint
        .new_goldenfile_with_differ(golden_path, differ)
        .expect("new goldenfile");
    out.write_all(content.as_bytes()).expect("write output");
}

/// Parses dedented Ledger text.
pub fn parse_ledger(s: &str) -> ledger_parser::Ledger {
    ledger_parser::parse(textwrap::dedent(s).as_ref()).expect("test input did not parse")
}

#[macro_export]
macro_rules! assert_text_eq {
    ($want:expr, $got:expr, $($context_arg:expr),*) => {
        let (want, got) = ($want, $got);
        let want_str: &str = want.as_ref();
        let got_str: &str = got.as_ref();
        if want_str != got_str {
            eprintln!($($context_arg,)*);
            text_diff::assert_diff(want_str, got_str, "\n", 0);
        }
    };
    ($want:expr, $got:expr) => {
        let (want, got) = ($want, $got);
        let want_str: &str = want.as_ref();
        let got_str: &str = got.as_ref();
        if want_str != got_str {
            text_diff::assert_diff(want_str, got_str, "\n", 0);
        }
    };
}
