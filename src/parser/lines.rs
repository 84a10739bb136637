use std::sync::LazyLock;

use regex::Regex;

static TAG_IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+(\d{1,3}(?:\.\d{1,3}){3}):\s*(.*)$").unwrap());
static MEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+):\s*Mem:\s*(.+)").unwrap());
static SWAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+):\s*Swap:\s*(.+)").unwrap());
static IP_REST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+):\s*(.+)").unwrap());
static DASH_IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-+\s*(\d+\.\d+\.\d+\.\d+)\s*-+$").unwrap());
static DU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+):\s+(\S+)\s+(.+)").unwrap());
static IP_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+):\s+(.*)").unwrap());
static BARE_IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:\.\d{1,3}){3}):").unwrap());
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>>\s*([A-Za-z0-9_]+)=([^\s:]+):").unwrap());
static ACTUAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)\s+(\d+\.\d+\.\d+\.\d+):(?:\s*([^:]*):)?\s*#?([A-Za-z0-9_]+)=(\S+)")
        .unwrap()
});
static NODE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\| *NodeName *\|.*\| *DataState *\|").unwrap());

/// `<tag> <ip>: <value>` — tag is the cluster role prefix, value may be empty.
#[derive(Debug, Clone)]
pub struct TagIpRow {
    pub tag: String,
    pub value: String,
    pub ip: String,
}

pub fn tag_ip_rows(text: &str) -> Vec<TagIpRow> {
    text.lines()
        .filter_map(|line| TAG_IP_RE.captures(line.trim()))
        .map(|c| TagIpRow {
            tag: c[1].to_string(),
            value: c[3].trim().to_string(),
            ip: c[2].to_string(),
        })
        .collect()
}

/// Bare IPs found as `<ip>:` anywhere in the text, deduplicated and sorted.
pub fn listed_ips(text: &str) -> Vec<String> {
    let mut ips: Vec<String> = BARE_IP_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();
    ips.sort();
    ips.dedup();
    ips
}

/// Whitespace-split stat fields keyed by IP.
#[derive(Debug, Clone)]
pub struct StatRow {
    pub fields: Vec<String>,
    pub ip: String,
}

fn stat_rows(text: &str, re: &Regex) -> Vec<StatRow> {
    text.lines()
        .filter_map(|line| re.captures(line))
        .map(|c| StatRow {
            fields: c[2].split_whitespace().map(str::to_string).collect(),
            ip: c[1].to_string(),
        })
        .collect()
}

/// `<ip>: Mem: total used free shared buff/cache available` rows.
pub fn mem_rows(text: &str) -> Vec<StatRow> {
    stat_rows(text, &MEM_RE)
}

/// `<ip>: Swap: total used free` rows.
pub fn swap_rows(text: &str) -> Vec<StatRow> {
    stat_rows(text, &SWAP_RE)
}

/// One `df` output row keyed by IP.
#[derive(Debug, Clone)]
pub struct DfRow {
    pub filesystem: String,
    pub size: String,
    pub used: String,
    pub avail: String,
    pub use_per: String,
    pub mounted: String,
    pub ip: String,
}

/// `<ip>: <df row>` — rows with fewer than six fields are malformed df
/// output and dropped.
pub fn df_rows(text: &str) -> Vec<DfRow> {
    text.lines()
        .filter_map(|line| IP_REST_RE.captures(line))
        .filter_map(|c| {
            let fields: Vec<&str> = c[2].split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            Some(DfRow {
                filesystem: fields[0].to_string(),
                size: fields[1].to_string(),
                used: fields[2].to_string(),
                avail: fields[3].to_string(),
                use_per: fields[4].to_string(),
                mounted: fields[5].to_string(),
                ip: c[1].to_string(),
            })
        })
        .collect()
}

/// `-----<ip>-----` headers set the current IP; every following non-empty
/// line is attributed to it.
pub fn dashed_ip_lines(text: &str) -> Vec<(String, String)> {
    let mut current: Option<String> = None;
    let mut out = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(caps) = DASH_IP_RE.captures(line) {
            current = Some(caps[1].to_string());
            continue;
        }
        if let (Some(ip), false) = (&current, line.is_empty()) {
            out.push((ip.clone(), line.to_string()));
        }
    }
    out
}

/// The command field of a `ps -ef` line: everything after the seventh
/// whitespace-delimited field. Shorter lines are not process rows.
pub fn ps_command(line: &str) -> Option<&str> {
    let mut rest = line.trim();
    for _ in 0..7 {
        let idx = rest.find(char::is_whitespace)?;
        rest = rest[idx..].trim_start();
        if rest.is_empty() {
            return None;
        }
    }
    Some(rest)
}

/// `<ip>: <ps -ef line>` rows, one observed process per line.
pub fn ip_ps_rows(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| IP_CMD_RE.captures(line))
        .filter_map(|c| {
            let cmd = ps_command(&c[2])?;
            Some((c[1].to_string(), cmd.to_string()))
        })
        .collect()
}

/// One `du` observation.
#[derive(Debug, Clone)]
pub struct DuRow {
    pub ip: String,
    pub size: String,
    pub path: String,
}

/// `<ip>: <size> <path>` rows; paths the remote shell could not stat are
/// dropped.
pub fn du_rows(text: &str) -> Vec<DuRow> {
    text.lines()
        .filter(|line| !line.contains("No such file or directory"))
        .filter_map(|line| DU_RE.captures(line))
        .map(|c| DuRow {
            ip: c[1].to_string(),
            size: c[2].to_string(),
            path: c[3].trim().to_string(),
        })
        .collect()
}

/// `<ip>: <command>` rows (data-cluster autostart dumps).
pub fn ip_command_rows(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| IP_CMD_RE.captures(line))
        .map(|c| (c[1].to_string(), c[2].trim().to_string()))
        .collect()
}

pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").to_string()
}

/// Cells of a `| a | b |` table row; `None` for rules and non-table lines.
pub fn pipe_cells(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    if !line.starts_with('|') || !line.ends_with('|') {
        return None;
    }
    let inner = line.trim_matches('|');
    if inner.chars().all(|c| matches!(c, '-' | '=' | '|' | ' ')) {
        return None;
    }
    Some(
        inner
            .split('|')
            .map(|p| p.trim().to_string())
            .collect(),
    )
}

/// A gcware member row from the coordinator topology output.
#[derive(Debug, Clone)]
pub struct GcwareRow {
    pub name: String,
    pub ip: String,
    pub state: String,
}

/// A coordinator member row from the coordinator topology output.
#[derive(Debug, Clone)]
pub struct CoordRow {
    pub name: String,
    pub ip: String,
    pub state: String,
    pub datastate: String,
}

/// The coordinator topology text carries three pipe sub-tables introduced by
/// GCWARE / COORDINATOR / VIRTUAL CLUSTER header lines. Rows are attributed
/// to the sub-table they appear under.
pub fn topology_tables(text: &str) -> (Vec<GcwareRow>, Vec<CoordRow>) {
    let mut gcware = Vec::new();
    let mut coordinators = Vec::new();
    let mut in_gcware = false;
    let mut in_coordinator = false;

    for line in text.lines() {
        let line = strip_ansi(line.trim());

        if line.contains("GBASE GCWARE CLUSTER INFORMATION") {
            in_gcware = true;
            in_coordinator = false;
            continue;
        } else if line.contains("GBASE COORDINATOR CLUSTER INFORMATION") {
            in_gcware = false;
            in_coordinator = true;
            continue;
        } else if line.contains("GBASE VIRTUAL CLUSTER INFORMATION") {
            in_gcware = false;
            in_coordinator = false;
            continue;
        }

        let Some(parts) = pipe_cells(&line) else {
            continue;
        };
        if in_gcware && parts.len() >= 3 && parts[0].starts_with("gcware") {
            gcware.push(GcwareRow {
                name: parts[0].clone(),
                ip: parts[1].clone(),
                state: parts[2].clone(),
            });
        } else if in_coordinator && parts.len() >= 4 && parts[0].starts_with("coordinator") {
            coordinators.push(CoordRow {
                name: parts[0].clone(),
                ip: parts[1].clone(),
                state: parts[2].clone(),
                datastate: parts[3].clone(),
            });
        }
    }

    (gcware, coordinators)
}

/// A data-node row from the header-indexed topology table.
#[derive(Debug, Clone)]
pub struct NodeRow {
    pub name: String,
    pub ip: String,
    pub gnode: String,
    pub syncserver: String,
    pub datastate: String,
}

/// Header-indexed pipe table: the `| NodeName | ... | DataState |` row maps
/// column names to positions (case-insensitively); data rows that do not
/// resolve every required column are skipped.
pub fn node_table(text: &str) -> Vec<NodeRow> {
    let clean = strip_ansi(text);
    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for line in clean.lines() {
        let line = line.trim();

        if NODE_HEADER_RE.is_match(line) {
            headers = pipe_cells(line)
                .unwrap_or_default()
                .iter()
                .map(|h| h.to_lowercase())
                .collect();
            continue;
        }
        if headers.is_empty() {
            continue;
        }
        let Some(parts) = pipe_cells(line) else {
            continue;
        };

        let col = |name: &str| -> Option<&String> {
            headers.iter().position(|h| h == name).and_then(|i| parts.get(i))
        };
        let (Some(name), Some(ip), Some(gnode), Some(syncserver), Some(datastate)) = (
            col("nodename"),
            col("ipaddress"),
            col("gnode"),
            col("syncserver"),
            col("datastate"),
        ) else {
            continue;
        };
        if name.starts_with("node") {
            rows.push(NodeRow {
                name: name.clone(),
                ip: ip.clone(),
                gnode: gnode.clone(),
                syncserver: syncserver.clone(),
                datastate: datastate.clone(),
            });
        }
    }

    rows
}

/// One parameter comparison extracted from a variables block.
#[derive(Debug, Clone)]
pub struct ParamRow {
    pub ip: String,
    pub name: String,
    pub reference: String,
    pub config_file: String,
    pub actual: String,
}

/// Two-line protocol: `>> name=value:` sets the active reference; following
/// `<tag> <ip>: [path:]name=value` lines are accepted only when their name
/// matches it. Commented-out values are skipped.
pub fn param_rows(text: &str) -> Vec<ParamRow> {
    let mut current: Option<(String, String)> = None;
    let mut out = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = REF_RE.captures(line) {
            current = Some((caps[1].to_string(), caps[2].to_string()));
            continue;
        }

        let Some(caps) = ACTUAL_RE.captures(line) else {
            continue;
        };
        let Some((ref_name, ref_value)) = &current else {
            continue;
        };
        // `#param=value` in the value position means the setting is disabled
        if line
            .rsplit(':')
            .next()
            .is_some_and(|v| v.trim_start().starts_with('#'))
        {
            continue;
        }
        if &caps[4] != ref_name.as_str() {
            continue;
        }
        out.push(ParamRow {
            ip: caps[2].to_string(),
            name: caps[4].to_string(),
            reference: ref_value.clone(),
            config_file: caps.get(3).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            actual: caps[5].to_string(),
        });
    }

    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ip() {
        let rows = tag_ip_rows("coor 10.0.0.1: CentOS Linux release 7.9\nnoise line\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tag, "coor");
        assert_eq!(rows[0].ip, "10.0.0.1");
        assert_eq!(rows[0].value, "CentOS Linux release 7.9");
    }

    #[test]
    fn tag_ip_empty_value() {
        let rows = tag_ip_rows("vc1 10.0.0.2:");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].value.is_empty());
    }

    #[test]
    fn listed_ips_dedup_sorted() {
        let ips = listed_ips("coor 10.0.0.2: x\ncoor 10.0.0.1: y\ncoor 10.0.0.2: z");
        assert_eq!(ips, vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]);
    }

    #[test]
    fn mem_swap() {
        let text = "coor 10.0.0.1: Mem: 257676 80921 1335 4013 175419 170773\n\
                    coor 10.0.0.1: Swap: 16383 0 16383";
        let mem = mem_rows(text);
        assert_eq!(mem.len(), 1);
        assert_eq!(mem[0].fields.len(), 6);
        assert_eq!(mem[0].ip, "10.0.0.1");
        let swap = swap_rows(text);
        assert_eq!(swap[0].fields, vec!["16383", "0", "16383"]);
    }

    #[test]
    fn df_short_rows_dropped() {
        let text = "coor 10.0.0.1: /dev/mapper/vg-root 500G 200G 300G 40% /opt\n\
                    coor 10.0.0.1: too few fields";
        let rows = df_rows(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, "500G");
        assert_eq!(rows[0].mounted, "/opt");
    }

    #[test]
    fn dashed_blocks() {
        let text = "-----10.0.0.1-----\ncmd one\n\ncmd two\n-----10.0.0.2-----\ncmd three";
        let rows = dashed_ip_lines(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ("10.0.0.1".into(), "cmd one".into()));
        assert_eq!(rows[2], ("10.0.0.2".into(), "cmd three".into()));
    }

    #[test]
    fn ps_field_eight() {
        let line = "gbase 12345 1 0 Jan01 ?        00:10:00 /opt/gcluster/server/bin/gclusterd --defaults-file=/opt/gcluster/config/my.cnf";
        let cmd = ps_command(line).unwrap();
        assert!(cmd.starts_with("/opt/gcluster/server/bin/gclusterd"));
        assert!(ps_command("only four fields here").is_none());
    }

    #[test]
    fn ip_ps() {
        let text = "vc1 10.0.0.2: gbase 999 1 0 Jan01 ? 00:00:00 /opt/gnode/server/bin/gbased\nvc1 10.0.0.2: short line";
        let rows = ip_ps_rows(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "/opt/gnode/server/bin/gbased");
    }

    #[test]
    fn du_not_found_dropped() {
        let text = "coor 10.0.0.1: 5.3M /opt/gcluster/log/gcluster/system.log\n\
                    coor 10.0.0.1: du: cannot access '/opt/x': No such file or directory";
        let rows = du_rows(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, "5.3M");
        assert_eq!(rows[0].path, "/opt/gcluster/log/gcluster/system.log");
    }

    #[test]
    fn ansi_stripped() {
        assert_eq!(strip_ansi("\x1b[32mOPEN\x1b[0m"), "OPEN");
    }

    #[test]
    fn pipe_cells_skip_rules() {
        assert!(pipe_cells("|---|---|").is_none());
        assert!(pipe_cells("| === | === |").is_none());
        assert_eq!(
            pipe_cells("| a | b |").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn topology() {
        let text = "\
====================================\n\
|  GBASE GCWARE CLUSTER INFORMATION |\n\
====================================\n\
| gcware1 | 10.0.0.1 | \x1b[32mOPEN\x1b[0m |\n\
=========================================\n\
| GBASE COORDINATOR CLUSTER INFORMATION |\n\
=========================================\n\
| coordinator1 | 10.0.0.1 | OPEN | 0 |\n\
====================================\n\
|  GBASE VIRTUAL CLUSTER INFORMATION |\n\
====================================\n\
| vc1 | something | x |\n";
        let (gcware, coord) = topology_tables(text);
        assert_eq!(gcware.len(), 1);
        assert_eq!(gcware[0].state, "OPEN");
        assert_eq!(coord.len(), 1);
        assert_eq!(coord[0].datastate, "0");
    }

    #[test]
    fn node_rows_by_header() {
        let text = "\
| NodeName | IpAddress | gnode | syncserver | DataState |\n\
|----------|-----------|-------|------------|-----------|\n\
| node1    | 10.0.0.2  | OPEN  | OPEN       | 0         |\n\
| total    | -         | -     | -          | -         |\n";
        let rows = node_table(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ip, "10.0.0.2");
        assert_eq!(rows[0].gnode, "OPEN");
    }

    #[test]
    fn params_match_reference() {
        let text = "\
>> gbase_memory_limit=30G:\n\
coor 10.0.0.1: /opt/gcluster/config/my.cnf:gbase_memory_limit=30G\n\
coor 10.0.0.2: gbase_memory_limit=28G\n\
coor 10.0.0.3: other_param=5\n\
>> gbase_buffer_pool=8G:\n\
coor 10.0.0.1: #gbase_buffer_pool=8G\n";
        let rows = param_rows(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].config_file, "/opt/gcluster/config/my.cnf");
        assert_eq!(rows[0].reference, "30G");
        assert_eq!(rows[1].actual, "28G");
        assert_eq!(rows[1].config_file, "");
    }

    #[test]
    fn params_without_reference_skipped() {
        let rows = param_rows("coor 10.0.0.1: a=1\n");
        assert!(rows.is_empty());
    }
}
