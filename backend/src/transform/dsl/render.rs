//! awk rendering of generated statements.
//!
//! All scratch names used by generated code start with `VAWK_` so they do not
//! collide with variables in user scripts.

use super::operations::{KeyBinding, Statement};

/// Field and output separator of every generated program.
pub const FIELD_SEPARATOR: &str = "\t";

/// Separator between INFO entries.
pub const INFO_SEPARATOR: &str = ";";

/// Separator between FORMAT keys and between sample values.
pub const FORMAT_SEPARATOR: &str = ":";

/// Sample name -> column index, filled from the `#` header line.
pub const COLUMN_MAP: &str = "VAWK_COL";

const FORMAT_ARRAY: &str = "VAWK_FMT";
const FORMAT_COUNT: &str = "VAWK_NFMT";
const INFO_ARRAY: &str = "VAWK_INFO";
const INFO_COUNT: &str = "VAWK_NINFO";
const PAIR_ARRAY: &str = "VAWK_KV";
const PAIR_COUNT: &str = "VAWK_NKV";
const SAMPLE_ARRAY: &str = "VAWK_SAMP";
const INDEX: &str = "VAWK_I";
const COLUMN: &str = "VAWK_C";
const KEY_POSITION: &str = "VAWK_K";
const JOINER: &str = "VAWK_SEP";
const VALUE: &str = "VAWK_V";

/// Quote `s` as an awk string literal.
pub fn awk_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Statement {
    /// awk text for this statement; may span several lines.
    pub fn render(&self) -> String {
        match self {
            Statement::Reset { var } => format!("{}=\"\"", var),
            Statement::SplitFormat { column } => format!(
                "{}=split(${},{},{})",
                FORMAT_COUNT,
                column,
                FORMAT_ARRAY,
                awk_string(FORMAT_SEPARATOR)
            ),
            Statement::ScanAndMatch { column, bindings } => render_scan(*column, bindings),
            Statement::Bind {
                var,
                sample,
                subfield,
            } => render_bind(var, sample, subfield.as_deref()),
            Statement::LoopConcat {
                var,
                first_column,
                subfield,
            } => render_concat(var, *first_column, subfield.as_deref()),
            Statement::HeaderDispatch { first_column, echo } => {
                render_dispatch(*first_column, *echo)
            }
        }
    }
}

/// Render statements one after another, newline separated.
pub fn render_block<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> String {
    statements
        .into_iter()
        .map(Statement::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `split` results compare as numbers when they look numeric, so plain
/// `KEY=VALUE` entries take the split value; only values that themselves
/// contain `=` fall back to `substr`.
fn render_scan(column: usize, bindings: &[KeyBinding]) -> String {
    let matches: Vec<String> = bindings
        .iter()
        .map(|b| {
            format!(
                "    if ({kv}[1]=={key}) {{ if ({n}==1) {{ {var}=1 }} else if ({n}==2) {{ {var}={kv}[2] }} else {{ {var}=substr({entry},{start}) }} }}",
                kv = PAIR_ARRAY,
                key = awk_string(&b.key),
                n = PAIR_COUNT,
                var = b.var,
                entry = format!("{}[{}]", INFO_ARRAY, INDEX),
                start = b.key.len() + 2,
            )
        })
        .collect();

    format!(
        "{count}=split(${column},{array},{sep})\nfor ({i}=1;{i}<={count};++{i}) {{\n    {n}=split({array}[{i}],{kv},\"=\")\n{body}\n}}",
        count = INFO_COUNT,
        column = column,
        array = INFO_ARRAY,
        sep = awk_string(INFO_SEPARATOR),
        i = INDEX,
        n = PAIR_COUNT,
        kv = PAIR_ARRAY,
        body = matches.join("\n"),
    )
}

/// Loop over the FORMAT keys looking for `field`, running `on_match` with
/// the position in `VAWK_I`.
fn format_lookup(field: &str, on_match: &str) -> String {
    format!(
        "for ({i}=1;{i}<={count};++{i}) if ({fmt}[{i}]=={field}) {{ {on_match}; break }}",
        i = INDEX,
        count = FORMAT_COUNT,
        fmt = FORMAT_ARRAY,
        field = awk_string(field),
        on_match = on_match,
    )
}

fn render_bind(var: &str, sample: &str, subfield: Option<&str>) -> String {
    let name = awk_string(sample);
    let column = format!("$({}[{}])", COLUMN_MAP, name);
    match subfield {
        None => format!("if ({} in {}) {}={}", name, COLUMN_MAP, var, column),
        Some(field) => format!(
            "if ({name} in {map}) {{ split({column},{samp},{sep}); {lookup} }}",
            name = name,
            map = COLUMN_MAP,
            column = column,
            samp = SAMPLE_ARRAY,
            sep = awk_string(FORMAT_SEPARATOR),
            lookup = format_lookup(field, &format!("{}={}[{}]", var, SAMPLE_ARRAY, INDEX)),
        ),
    }
}

/// Whole-column and subfield wildcards share this one loop; only the value
/// taken from each column differs. Values are joined by a single tab with
/// nothing before the first or after the last.
fn render_concat(var: &str, first_column: usize, subfield: Option<&str>) -> String {
    let mut lines = Vec::new();
    let value = match subfield {
        None => format!("{}=${}", VALUE, COLUMN),
        Some(field) => {
            lines.push(format!("{}=0", KEY_POSITION));
            lines.push(format_lookup(field, &format!("{}={}", KEY_POSITION, INDEX)));
            format!(
                "{v}=\"\"; if ({k}) {{ split(${c},{samp},{sep}); {v}={samp}[{k}] }}",
                v = VALUE,
                k = KEY_POSITION,
                c = COLUMN,
                samp = SAMPLE_ARRAY,
                sep = awk_string(FORMAT_SEPARATOR),
            )
        }
    };
    lines.push(format!("{}=\"\"; {}=\"\"", var, JOINER));
    lines.push(format!(
        "for ({c}={first};{c}<=NF;++{c}) {{ {value}; {var}={var} {sep} {v}; {sep}={tab} }}",
        c = COLUMN,
        first = first_column,
        value = value,
        var = var,
        sep = JOINER,
        v = VALUE,
        tab = awk_string("\t"),
    ));
    lines.join("\n")
}

fn render_dispatch(first_column: usize, echo: bool) -> String {
    let emit = if echo { "print; " } else { "" };
    format!(
        "if ($0 ~ /^##/) {{ {emit}next }}\nif ($0 ~ /^#/) {{ for ({c}={first};{c}<=NF;++{c}) {map}[${c}]={c}; {emit}next }}",
        emit = emit,
        c = COLUMN,
        first = first_column,
        map = COLUMN_MAP,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_awk_string_escapes() {
        assert_eq!(awk_string("GT"), "\"GT\"");
        assert_eq!(awk_string("a\"b\\c\t"), r#""a\"b\\c\t""#);
    }

    #[test]
    fn test_render_reset_and_split() {
        assert_eq!(Statement::Reset { var: "INFO_AF".into() }.render(), "INFO_AF=\"\"");
        assert_eq!(
            Statement::SplitFormat { column: 9 }.render(),
            "VAWK_NFMT=split($9,VAWK_FMT,\":\")"
        );
    }

    #[test]
    fn test_render_scan() {
        let stmt = Statement::ScanAndMatch {
            column: 8,
            bindings: vec![KeyBinding::new("AF", "INFO_AF"), KeyBinding::new("DB", "INFO_DB")],
        };
        let text = stmt.render();
        assert!(text.starts_with("VAWK_NINFO=split($8,VAWK_INFO,\";\")"));
        assert!(text.contains("VAWK_NKV=split(VAWK_INFO[VAWK_I],VAWK_KV,\"=\")"));
        assert!(text.contains("if (VAWK_KV[1]==\"AF\") { if (VAWK_NKV==1) { INFO_AF=1 }"));
        assert!(text.contains("else if (VAWK_NKV==2) { INFO_AF=VAWK_KV[2] }"));
        assert!(text.contains("else { INFO_AF=substr(VAWK_INFO[VAWK_I],4) } }"));
        assert!(text.contains("if (VAWK_KV[1]==\"DB\")"));
    }

    #[test]
    fn test_render_bind_whole_is_guarded() {
        let text = Statement::Bind {
            var: "SAMPLE_NA1_ALL".into(),
            sample: "NA1".into(),
            subfield: None,
        }
        .render();
        assert_eq!(text, "if (\"NA1\" in VAWK_COL) SAMPLE_NA1_ALL=$(VAWK_COL[\"NA1\"])");
    }

    #[test]
    fn test_render_bind_subfield() {
        let text = Statement::Bind {
            var: "SAMPLE_NA1_GT".into(),
            sample: "NA1".into(),
            subfield: Some("GT".into()),
        }
        .render();
        assert!(text.contains("split($(VAWK_COL[\"NA1\"]),VAWK_SAMP,\":\")"));
        assert!(text.contains("if (VAWK_FMT[VAWK_I]==\"GT\") { SAMPLE_NA1_GT=VAWK_SAMP[VAWK_I]; break }"));
    }

    #[test]
    fn test_wildcards_share_one_join() {
        let whole = Statement::LoopConcat {
            var: "ALLSAMPLES_ALL".into(),
            first_column: 10,
            subfield: None,
        }
        .render();
        let sub = Statement::LoopConcat {
            var: "ALLSAMPLES_DP".into(),
            first_column: 10,
            subfield: Some("DP".into()),
        }
        .render();

        let join = |var: &str| format!("{var}={var} VAWK_SEP VAWK_V; VAWK_SEP=\"\\t\" }}");
        assert!(whole.contains(&join("ALLSAMPLES_ALL")));
        assert!(sub.contains(&join("ALLSAMPLES_DP")));
        assert!(whole.contains("for (VAWK_C=10;VAWK_C<=NF;++VAWK_C)"));
        assert!(sub.contains("for (VAWK_C=10;VAWK_C<=NF;++VAWK_C)"));

        // the subfield position is looked up again on every record
        assert!(sub.starts_with("VAWK_K=0\n"));
        assert!(!whole.contains("VAWK_K"));
    }

    #[test]
    fn test_render_dispatch() {
        let quiet = Statement::HeaderDispatch {
            first_column: 10,
            echo: false,
        }
        .render();
        assert!(quiet.contains("if ($0 ~ /^##/) { next }"));
        assert!(quiet.contains("VAWK_COL[$VAWK_C]=VAWK_C; next }"));
        assert!(!quiet.contains("print"));

        let echo = Statement::HeaderDispatch {
            first_column: 10,
            echo: true,
        }
        .render();
        assert!(echo.contains("if ($0 ~ /^##/) { print; next }"));
        assert!(echo.contains("VAWK_COL[$VAWK_C]=VAWK_C; print; next }"));
    }
}
