use std::sync::LazyLock;

use regex::Regex;

static COOR_MACHINE_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^=+Coordinator Machine Information=+").unwrap());
static COOR_CLUSTER_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^=+Coordinator GBase Cluster Information=+").unwrap());
static COOR_VARIABLES_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"={10,}Coordinator GBase Cluster variables={10,}").unwrap());
static COOR_VARIABLES_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GBase 8a Cluster Coordinator Inscpection End now").unwrap());
static VC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=+ Data Machine Information\s+'([^']+)'").unwrap());

/// The text strictly between two anchor patterns, trimmed. `None` means
/// "this file carries no such section", never an error.
pub fn between<'a>(text: &'a str, begin: &Regex, end: &Regex) -> Option<&'a str> {
    let b = begin.find(text)?;
    let rest = &text[b.end()..];
    let e = end.find(rest)?;
    Some(rest[..e.start()].trim())
}

/// System name: the first line up to the literal `GBase 8a Cluster`,
/// right-trimmed.
pub fn system_name(text: &str) -> String {
    let first = text.lines().next().unwrap_or("");
    first
        .split("GBase 8a Cluster")
        .next()
        .unwrap_or("")
        .trim_end()
        .to_string()
}

/// Virtual-cluster names, in the order their machine blocks appear.
pub fn vc_names(text: &str) -> Vec<String> {
    VC_NAME_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

pub fn coor_machine(text: &str) -> Option<&str> {
    between(text, &COOR_MACHINE_BEGIN, &COOR_CLUSTER_BEGIN)
}

pub fn coor_cluster(text: &str) -> Option<&str> {
    between(text, &COOR_CLUSTER_BEGIN, &COOR_VARIABLES_BEGIN)
}

pub fn coor_variables(text: &str) -> Option<&str> {
    between(text, &COOR_VARIABLES_BEGIN, &COOR_VARIABLES_END)
}

pub fn data_machine<'a>(text: &'a str, vc: &str) -> Option<&'a str> {
    let vc = regex::escape(vc);
    let begin = Regex::new(&format!(r"=+ Data Machine Information\s+'{vc}'\s+=+")).unwrap();
    let end = Regex::new(&format!(r"=+ Data GBase Cluster Information\s+'{vc}'\s+=+")).unwrap();
    between(text, &begin, &end)
}

pub fn data_cluster<'a>(text: &'a str, vc: &str) -> Option<&'a str> {
    let vc = regex::escape(vc);
    let begin = Regex::new(&format!(r"=+ Data GBase Cluster Information\s+'{vc}'\s+=+")).unwrap();
    // the variables header drops the quotes around the VC name
    let end = Regex::new(&format!(r"=+ Data GBase Cluster variables\s+{vc}\s+=+")).unwrap();
    between(text, &begin, &end)
}

pub fn data_variables<'a>(text: &'a str, vc: &str) -> Option<&'a str> {
    let vc = regex::escape(vc);
    let begin = Regex::new(&format!(r"=+ Data GBase Cluster variables\s+{vc}\s+=+")).unwrap();
    let end = Regex::new(&format!(
        r"GBase 8a Cluster Data Cluster '{vc}' Inscpection End"
    ))
    .unwrap();
    between(text, &begin, &end)
}

/// Whether a line introduces a new field. Labels look like `* 标签：`;
/// crontab entries may start with `* *` but a label never does.
fn is_label_line(line: &str) -> bool {
    let t = line.trim_start();
    match t.strip_prefix("* ") {
        Some(rest) => !rest.trim_start().starts_with('*'),
        None => false,
    }
}

/// The text following a label line, up to the next label line or the end of
/// the section, trimmed. The label is matched as a line prefix so the
/// trailing-colon variants of the same label all resolve.
pub fn field(section: &str, label: &str) -> Option<String> {
    let mut lines = section.lines();
    lines.by_ref().find(|l| l.trim_start().starts_with(label))?;

    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if is_label_line(line) {
            break;
        }
        out.push(line);
    }
    Some(out.join("\n").trim().to_string()).filter(|s| !s.is_empty())
}

/// For each keyword, the trimmed line following the first line containing
/// it; empty when the keyword is missing or sits on the last line.
pub fn next_line_values(text: &str, keywords: &[&str]) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    keywords
        .iter()
        .map(|kw| {
            lines
                .iter()
                .position(|l| l.contains(kw))
                .and_then(|i| lines.get(i + 1))
                .map(|l| l.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

// ── Tests ──
