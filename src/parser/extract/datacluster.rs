use std::sync::LazyLock;

use regex::Regex;

use crate::db::DataClusterRow;
use crate::parser::sections;

static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CLUSTER STATE:\s*(\S+)").unwrap());
static MODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"VIRTUAL CLUSTER MODE:\s*(\S+)").unwrap());
static EVENT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Data Cluster DDL&DML&DMLSTORAGE Event信息：\s*\n([^\n]*)").unwrap());
static EVENT_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Vc event count:(\d+)").unwrap());

const COUNT_KEYWORDS: [&str; 5] = ["库的个数", "表的个数", "视图的个数", "存储过程的个数", "函数的个数"];

/// Summary of one virtual cluster: state, mode, object counts, and the
/// DDL/DML/DMLSTORAGE event counters.
pub fn extract(section: &str, system: &str, vc: &str) -> DataClusterRow {
    let first = |re: &Regex| {
        re.captures(section)
            .map(|c| c[1].to_string())
            .unwrap_or_default()
    };

    let counts = sections::next_line_values(section, &COUNT_KEYWORDS);

    let events: Vec<String> = EVENT_LINE_RE
        .captures(section)
        .map(|c| {
            EVENT_COUNT_RE
                .captures_iter(&c[1])
                .map(|e| e[1].to_string())
                .collect()
        })
        .unwrap_or_default();
    let event = |i: usize| events.get(i).cloned().unwrap_or_default();

    DataClusterRow {
        system_name: system.to_string(),
        cluster_name: vc.to_string(),
        cluster_state: first(&STATE_RE),
        cluster_mode: first(&MODE_RE),
        databases_count: counts[0].clone(),
        tables_count: counts[1].clone(),
        views_count: counts[2].clone(),
        procs_count: counts[3].clone(),
        funcs_count: counts[4].clone(),
        ddl_event: event(0),
        dml_event: event(1),
        dmlstorage_event: event(2),
    }
}

// ── Tests ──
